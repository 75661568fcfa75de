//! # Force Field Module
//!
//! Pair potentials and parameter derivation for the solute-solvent interaction.
//!
//! ## Key Components
//!
//! - [`potentials`] - Lennard-Jones and Weeks-Chandler-Andersen split kernels, Coulomb potential
//! - [`params`] - Per-atom solvent interaction parameters for the ZAP-9 and OPLS conventions
//! - [`term`] - Decomposition of a solvation free energy into its contributions

pub mod params;
pub mod potentials;
pub mod term;
