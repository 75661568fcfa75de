//! Provides input/output functionality for atom coordinate files.
//!
//! File formats implement the [`traits::AtomFile`] trait, which offers a uniform
//! reader/writer API plus path-based convenience methods.

pub mod traits;
pub mod xyzr;
