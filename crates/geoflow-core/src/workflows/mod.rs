//! # Workflows Module
//!
//! End-to-end entry points that tie the `core` models and the `engine` together.
//!
//! - **Solvation Workflow** ([`solvation`]) - Coupled geometric-flow and Poisson iteration
//!   producing electrostatic, nonpolar and total solvation free energies.

pub mod solvation;
