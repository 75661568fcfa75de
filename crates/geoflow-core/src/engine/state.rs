use crate::core::forcefield::term::EnergyTerm;
use serde::Serialize;

/// Energies and surface diagnostics of one outer iteration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IterationRecord {
    pub iteration: usize,
    pub energy: EnergyTerm,
    pub area: f64,
    pub volume: f64,
    pub attractive_integral: f64,
}

impl IterationRecord {
    #[inline]
    pub fn electrostatic(&self) -> f64 {
        self.energy.electrostatic
    }

    #[inline]
    pub fn nonpolar(&self) -> f64 {
        self.energy.nonpolar()
    }

    #[inline]
    pub fn total(&self) -> f64 {
        self.energy.total()
    }
}

/// Append-only log of iteration records.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct EnergyHistory {
    records: Vec<IterationRecord>,
}

impl EnergyHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: IterationRecord) {
        self.records.push(record);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[inline]
    pub fn last(&self) -> Option<&IterationRecord> {
        self.records.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, IterationRecord> {
        self.records.iter()
    }

    pub fn as_slice(&self) -> &[IterationRecord] {
        &self.records
    }

    /// Absolute change of the total energy between the two most recent records.
    pub fn latest_change(&self) -> Option<f64> {
        match self.records.as_slice() {
            [.., previous, current] => Some((current.total() - previous.total()).abs()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConvergenceStatus {
    Continue,
    Converged { change: f64 },
    /// The iteration cap was reached without meeting the tolerance.
    Exhausted,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConvergenceCriteria {
    pub tolerance: f64,
    pub max_iterations: usize,
}

impl ConvergenceCriteria {
    pub fn new(tolerance: f64, max_iterations: usize) -> Self {
        Self {
            tolerance,
            max_iterations,
        }
    }

    /// Strict comparison: a change equal to the tolerance keeps the loop going.
    pub fn check(&self, history: &EnergyHistory) -> ConvergenceStatus {
        if let Some(change) = history.latest_change() {
            if change < self.tolerance {
                return ConvergenceStatus::Converged { change };
            }
        }
        if history.len() >= self.max_iterations {
            ConvergenceStatus::Exhausted
        } else {
            ConvergenceStatus::Continue
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(iteration: usize, total: f64) -> IterationRecord {
        IterationRecord {
            iteration,
            energy: EnergyTerm::new(total, 0.0, 0.0, 0.0),
            area: 0.0,
            volume: 0.0,
            attractive_integral: 0.0,
        }
    }

    fn run(totals: &[f64], criteria: ConvergenceCriteria) -> (usize, ConvergenceStatus) {
        let mut history = EnergyHistory::new();
        for (i, &total) in totals.iter().enumerate() {
            history.push(record(i + 1, total));
            let status = criteria.check(&history);
            if status != ConvergenceStatus::Continue {
                return (history.len(), status);
            }
        }
        (history.len(), ConvergenceStatus::Continue)
    }

    #[test]
    fn latest_change_needs_two_records() {
        let mut history = EnergyHistory::new();
        assert_eq!(history.latest_change(), None);
        history.push(record(1, -10.0));
        assert_eq!(history.latest_change(), None);
        history.push(record(2, -10.5));
        assert_eq!(history.latest_change(), Some(0.5));
    }

    #[test]
    fn single_iteration_never_converges_before_the_cap() {
        let criteria = ConvergenceCriteria::new(0.01, 5);
        let mut history = EnergyHistory::new();
        history.push(record(1, 0.0));
        assert_eq!(criteria.check(&history), ConvergenceStatus::Continue);
    }

    #[test]
    fn stops_at_first_sub_tolerance_change() {
        let criteria = ConvergenceCriteria::new(0.01, 20);
        let (iterations, status) = run(&[-5.0, -6.0, -6.5, -6.505, -6.506], criteria);
        assert_eq!(iterations, 4);
        assert!(matches!(status, ConvergenceStatus::Converged { change } if (change - 0.005).abs() < 1e-12));
    }

    #[test]
    fn change_equal_to_tolerance_does_not_converge() {
        let criteria = ConvergenceCriteria::new(0.5, 20);
        let (iterations, status) = run(&[1.0, 1.5, 1.75], criteria);
        assert_eq!(iterations, 3);
        assert!(matches!(status, ConvergenceStatus::Converged { .. }));
    }

    #[test]
    fn stops_at_the_cap_when_never_converging() {
        let criteria = ConvergenceCriteria::new(1e-6, 3);
        let (iterations, status) = run(&[1.0, 2.0, 3.0, 4.0], criteria);
        assert_eq!(iterations, 3);
        assert_eq!(status, ConvergenceStatus::Exhausted);
    }

    #[test]
    fn convergence_on_the_last_allowed_iteration_wins_over_the_cap() {
        let criteria = ConvergenceCriteria::new(0.1, 2);
        let (_, status) = run(&[1.0, 1.05], criteria);
        assert!(matches!(status, ConvergenceStatus::Converged { .. }));
    }

    #[test]
    fn record_accessors_delegate_to_energy_terms() {
        let rec = IterationRecord {
            iteration: 1,
            energy: EnergyTerm::new(-2.0, 0.5, 0.25, -0.25),
            area: 10.0,
            volume: 20.0,
            attractive_integral: -1.0,
        };
        assert_eq!(rec.electrostatic(), -2.0);
        assert_eq!(rec.nonpolar(), 0.5);
        assert_eq!(rec.total(), -1.5);
    }
}
