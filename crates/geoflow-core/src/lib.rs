//! # GeoFlow Core Library
//!
//! Solvation free energies from a geometric-flow model of the solute-solvent boundary
//! coupled to a variable-dielectric Poisson equation.
//!
//! ## Architectural Philosophy
//!
//! The library keeps a strict three-layer architecture.
//!
//! - **[`core`]: The Foundation.** Stateless data models (`AtomSet`, `GridFrame`, `GridField`),
//!   atom file I/O, the solute-solvent dispersion potentials and grid quadrature.
//!
//! - **[`engine`]: The Logic Core.** Charge distribution, surface evolution, Poisson assembly,
//!   the pluggable linear solver and convergence tracking.
//!
//! - **[`workflows`]: The Public API.** [`workflows::solvation`] runs the fixed-point loop
//!   from a set of atoms and a [`engine::config::GeoflowConfig`] to a
//!   [`workflows::solvation::SolvationResult`].

pub mod core;
pub mod engine;
pub mod workflows;
