//! # Engine Module
//!
//! Stateful machinery of a solvation run: configuration, charge discretization, the
//! level-set surface flow, assembly and solution of the Poisson system, and the
//! bookkeeping that decides when the coupled iteration has converged.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Immutable run parameters, builder and selectors
//! - **Charges** ([`charge`]) - Trilinear-inverse distribution of point charges onto grid nodes
//! - **Surface** ([`surface`]) - Sphere rasterization, driving field and upwind evolution
//! - **Poisson** ([`poisson`]) - Variable-dielectric 7-point operator and right-hand side
//! - **Solver** ([`solver`]) - Pluggable sparse linear solver with a BiCGSTAB default
//! - **State Tracking** ([`state`]) - Per-iteration energy records and the convergence test
//! - **Progress Monitoring** ([`progress`]) - Progress events for front ends
//! - **Error Handling** ([`error`]) - Engine-level error type

pub mod charge;
pub mod config;
pub mod error;
pub mod poisson;
pub mod progress;
pub mod solver;
pub mod state;
pub mod surface;
