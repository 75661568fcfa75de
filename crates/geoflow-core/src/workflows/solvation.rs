use crate::core::forcefield::params::DispersionParams;
use crate::core::forcefield::potentials::ELECTROSTATIC_ENERGY_UNIT;
use crate::core::forcefield::term::EnergyTerm;
use crate::core::models::atom::AtomSet;
use crate::core::models::field::GridField;
use crate::core::models::grid::GridFrame;
use crate::engine::charge::{ChargeDistributor, ChargeTable};
use crate::engine::config::{GeoflowConfig, TimeIntegration};
use crate::engine::error::EngineError;
use crate::engine::poisson::{PoissonAssembler, dielectric_field};
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::solver::{BiCgStab, LinearSolver};
use crate::engine::state::{
    ConvergenceCriteria, ConvergenceStatus, EnergyHistory, IterationRecord,
};
use crate::engine::surface::{self, SurfaceDiagnostics, SurfaceEvolver};
use nalgebra::{DVector, Vector3};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

/// Final energies of a solvation run, in kcal/mol, with the geometry of the
/// converged surface and the per-iteration log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolvationResult {
    pub total: f64,
    pub electrostatic: f64,
    pub nonpolar: f64,
    pub area: f64,
    pub volume: f64,
    pub attractive_integral: f64,
    pub iterations: usize,
    pub converged: bool,
    pub grid_dimensions: [usize; 3],
    pub energy: EnergyTerm,
    pub history: EnergyHistory,
}

/// Fixed-point coupling of the surface flow with the Poisson solve.
pub struct SolvationEngine<S: LinearSolver = BiCgStab> {
    config: GeoflowConfig,
    solver: S,
}

impl SolvationEngine<BiCgStab> {
    pub fn new(config: GeoflowConfig) -> Self {
        Self::with_solver(config, BiCgStab::new())
    }
}

impl<S: LinearSolver> SolvationEngine<S> {
    pub fn with_solver(config: GeoflowConfig, solver: S) -> Self {
        Self { config, solver }
    }

    #[inline]
    pub fn config(&self) -> &GeoflowConfig {
        &self.config
    }

    #[instrument(skip_all, name = "solvation_workflow", fields(atoms = atoms.len()))]
    pub fn run(
        &self,
        atoms: &AtomSet,
        reporter: &ProgressReporter,
    ) -> Result<SolvationResult, EngineError> {
        let config = &self.config;

        // === Phase 0: Validation and grid setup ===
        reporter.report(Progress::PhaseStart {
            name: "Preparation",
        });
        config.validate()?;
        if config.flow.time_integration == TimeIntegration::Adi {
            return Err(EngineError::unimplemented("ADI time integration"));
        }
        if atoms.is_empty() {
            return Err(EngineError::EmptyAtomSet);
        }

        let atoms = atoms.with_model_radii(config.model.force_field, config.model.radius_scale);
        let frame = GridFrame::from_atoms(
            &atoms,
            Vector3::from(config.grid.spacing),
            config.grid.padding,
        )
        .ok_or(EngineError::EmptyAtomSet)?;
        info!(
            dims = ?frame.dims(),
            spacing = ?config.grid.spacing,
            "Constructed grid around {} atoms.",
            atoms.len()
        );

        let charges = ChargeDistributor::new(&frame).distribute(&atoms)?;
        let params = DispersionParams::derive(&atoms, &config.solvent_model());
        let evolver = SurfaceEvolver::new(&frame, &atoms, &params);
        let assembler = PoissonAssembler::new(&frame);
        let rhs = assembler.rhs(
            &atoms,
            &charges,
            config.physics.solvent_dielectric,
            config.physics.boundary_condition,
        )?;
        reporter.report(Progress::PhaseFinish);

        // === Phase 1: Reference potential in a uniform solute dielectric ===
        reporter.report(Progress::PhaseStart {
            name: "Reference Potential",
        });
        let uniform = GridField::filled(frame.dims(), config.physics.solute_dielectric);
        let reference = self.solve_potential(&assembler, &uniform, &rhs, frame.dims())?;
        reporter.report(Progress::PhaseFinish);

        // === Phase 2: Coupled flow / Poisson iterations ===
        reporter.report(Progress::PhaseStart {
            name: "Geometric Flow",
        });
        reporter.report(Progress::TaskStart {
            total_steps: config.convergence.max_iterations as u64,
        });

        let criteria = ConvergenceCriteria::new(
            config.convergence.solvation_tolerance,
            config.convergence.max_iterations,
        );
        let physics = &config.physics;
        let mut history = EnergyHistory::new();
        let mut previous: Option<GridField<f64>> = None;
        let mut force: Option<GridField<f64>> = None;
        let mut converged = false;
        let mut diagnostics = SurfaceDiagnostics::default();

        for iteration in 1..=config.convergence.max_iterations {
            let mut working = match &previous {
                Some(prev) if config.flow.inherit_surface => prev.clone(),
                _ => evolver.indicator().clone(),
            };
            let driving = evolver.driving_field(physics, force.as_ref());
            let time = (config.flow.total_time - iteration as f64 + 1.0).max(1.0);
            evolver.evolve(&mut working, &driving, time);

            let current = match &previous {
                Some(prev) => surface::relax(prev, &working, config.flow.relaxation),
                None => working,
            };
            diagnostics = evolver.diagnostics(&current);

            let dielectric = dielectric_field(
                &current,
                physics.solute_dielectric,
                physics.solvent_dielectric,
            );
            let solvated = self.solve_potential(&assembler, &dielectric, &rhs, frame.dims())?;
            let electrostatic = reaction_energy(&charges, &solvated, &reference);

            force = Some(surface::electrostatic_force(
                &frame,
                &solvated,
                physics.solute_dielectric,
                physics.solvent_dielectric,
                physics.gamma,
            ));

            let energy = EnergyTerm::new(
                electrostatic,
                physics.gamma * diagnostics.area,
                physics.pressure * diagnostics.volume,
                physics.bulk_density * diagnostics.attractive_integral,
            );
            history.push(IterationRecord {
                iteration,
                energy,
                area: diagnostics.area,
                volume: diagnostics.volume,
                attractive_integral: diagnostics.attractive_integral,
            });
            previous = Some(current);

            info!(
                iteration,
                total = energy.total(),
                electrostatic,
                nonpolar = energy.nonpolar(),
                area = diagnostics.area,
                volume = diagnostics.volume,
                "Completed solvation iteration."
            );
            reporter.report(Progress::TaskIncrement);
            reporter.report(Progress::IterationFinish {
                iteration,
                total_energy: energy.total(),
                change: history.latest_change(),
            });

            match criteria.check(&history) {
                ConvergenceStatus::Continue => {}
                ConvergenceStatus::Converged { change } => {
                    info!(iteration, change, "Solvation energy converged.");
                    converged = true;
                    break;
                }
                ConvergenceStatus::Exhausted => {
                    warn!(
                        iterations = history.len(),
                        change = ?history.latest_change(),
                        "Solvation energy did not converge; returning the last iterate."
                    );
                    break;
                }
            }
        }

        reporter.report(Progress::TaskFinish);
        reporter.report(Progress::PhaseFinish);

        let last = history
            .last()
            .copied()
            .ok_or_else(|| EngineError::Internal("solvation loop ran no iterations".to_string()))?;
        let result = SolvationResult {
            total: last.total(),
            electrostatic: last.electrostatic(),
            nonpolar: last.nonpolar(),
            area: diagnostics.area,
            volume: diagnostics.volume,
            attractive_integral: diagnostics.attractive_integral,
            iterations: history.len(),
            converged,
            grid_dimensions: frame.dims(),
            energy: last.energy,
            history,
        };

        info!(
            total = result.total,
            electrostatic = result.electrostatic,
            nonpolar = result.nonpolar,
            "Workflow complete after {} iteration(s).",
            result.iterations
        );
        Ok(result)
    }

    fn solve_potential(
        &self,
        assembler: &PoissonAssembler,
        dielectric: &GridField<f64>,
        rhs: &DVector<f64>,
        dims: [usize; 3],
    ) -> Result<GridField<f64>, EngineError> {
        let matrix = assembler.matrix(dielectric);
        let report = self.solver.solve(
            &matrix,
            rhs,
            self.config.convergence.solver_tolerance,
            self.config.convergence.solver_max_iterations,
        )?;
        if report.converged {
            debug!(
                iterations = report.iterations,
                residual = report.residual,
                "Poisson solve converged."
            );
        } else {
            warn!(
                iterations = report.iterations,
                residual = report.residual,
                "Poisson solve did not reach the tolerance; using the last iterate."
            );
        }
        let values = report.solution.as_slice().to_vec();
        GridField::from_vec(dims, values).ok_or_else(|| {
            EngineError::Internal(format!(
                "solver returned {} values for a grid of {:?}",
                report.solution.len(),
                dims
            ))
        })
    }
}

/// Half the charge-weighted difference between the solvated and reference potentials.
fn reaction_energy(
    charges: &ChargeTable,
    solvated: &GridField<f64>,
    reference: &GridField<f64>,
) -> f64 {
    0.5 * ELECTROSTATIC_ENERGY_UNIT
        * charges.weighted_sum(|[i, j, k]| solvated.get(i, j, k) - reference.get(i, j, k))
}

/// Runs a solvation calculation with the default BiCGSTAB solver.
pub fn run(
    atoms: &AtomSet,
    config: &GeoflowConfig,
    reporter: &ProgressReporter,
) -> Result<SolvationResult, EngineError> {
    SolvationEngine::new(*config).run(atoms, reporter)
}
