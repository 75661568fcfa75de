use crate::core::io::traits::AtomFile;
use crate::core::models::atom::{Atom, AtomSet};
use nalgebra::Point3;
use std::io::{self, BufRead, Write};
use thiserror::Error;

const FIELD_NAMES: [&str; 6] = ["x", "y", "z", "radius", "charge", "epsilon"];
const MIN_FIELDS: usize = 5;

#[derive(Debug, Error)]
pub enum XyzrError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse {
        line: usize,
        kind: XyzrParseErrorKind,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum XyzrParseErrorKind {
    #[error("Expected at least 5 fields (x y z r q), found {found}")]
    TooFewFields { found: usize },
    #[error("Invalid float for field '{field}' (value: '{value}')")]
    InvalidFloat { field: &'static str, value: String },
}

/// Whitespace-delimited atom records, one atom per line: `x y z r q [epsilon]`.
///
/// Lines with five fields carry no Lennard-Jones well depth and default it to zero;
/// fields beyond the sixth are ignored. Blank lines are skipped.
pub struct XyzrFile;

impl XyzrFile {
    fn parse_line(line: &str, line_num: usize) -> Result<Option<Atom>, XyzrError> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.is_empty() {
            return Ok(None);
        }
        if fields.len() < MIN_FIELDS {
            return Err(XyzrError::Parse {
                line: line_num,
                kind: XyzrParseErrorKind::TooFewFields {
                    found: fields.len(),
                },
            });
        }

        let mut values = [0.0_f64; 6];
        for (idx, raw) in fields.iter().take(values.len()).enumerate() {
            values[idx] = raw.parse::<f64>().map_err(|_| XyzrError::Parse {
                line: line_num,
                kind: XyzrParseErrorKind::InvalidFloat {
                    field: FIELD_NAMES[idx],
                    value: raw.to_string(),
                },
            })?;
        }

        let [x, y, z, radius, charge, lj_epsilon] = values;
        Ok(Some(
            Atom::new(Point3::new(x, y, z), radius, charge).with_lj_epsilon(lj_epsilon),
        ))
    }
}

impl AtomFile for XyzrFile {
    type Error = XyzrError;

    fn read_from(reader: &mut impl BufRead) -> Result<AtomSet, Self::Error> {
        let mut atoms = AtomSet::new();
        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            if let Some(atom) = Self::parse_line(&line, line_num + 1)? {
                atoms.push(atom);
            }
        }
        Ok(atoms)
    }

    fn write_to(atoms: &AtomSet, writer: &mut impl Write) -> Result<(), Self::Error> {
        for atom in atoms {
            writeln!(
                writer,
                "{:.6}\t{:.6}\t{:.6}\t{:.6}\t{:.6}\t{:.6}",
                atom.position.x,
                atom.position.y,
                atom.position.z,
                atom.radius,
                atom.charge,
                atom.lj_epsilon
            )?;
        }
        Ok(())
    }
}
