//! # Core Module
//!
//! Stateless building blocks of the solvation model: data models, file I/O, the
//! solute-solvent force field and grid quadrature.
//!
//! - **Models** ([`models`]) - Atoms, grid geometry and grid-valued fields
//! - **File I/O** ([`io`]) - Reading and writing atom record files
//! - **Force Field** ([`forcefield`]) - Dispersion kernels and parameter derivation
//! - **Integration** ([`integration`]) - Volume quadrature over the grid

pub mod forcefield;
pub mod integration;
pub mod io;
pub mod models;
