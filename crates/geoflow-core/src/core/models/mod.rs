//! # Core Models Module
//!
//! Plain data types shared by every stage of a solvation run.
//!
//! ## Key Components
//!
//! - [`atom`] - Atoms, atom sets and the force-field radius convention
//! - [`grid`] - Grid geometry: axes, spacing and index/coordinate mapping
//! - [`field`] - Dense node-valued fields addressed by 1-based grid indices
//!
//! ```ignore
//! use geoflow::core::models::{atom::{Atom, AtomSet}, grid::GridFrame};
//! use nalgebra::{Point3, Vector3};
//!
//! let atoms: AtomSet = [Atom::new(Point3::origin(), 2.0, 0.0)].into_iter().collect();
//! let frame = GridFrame::from_atoms(&atoms, Vector3::repeat(0.25), 1.9).unwrap();
//! ```

pub mod atom;
pub mod field;
pub mod grid;
