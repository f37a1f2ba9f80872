//! Power fraction to drive level lookup table.

use std::io::Read;
use std::path::Path;

use tracing::{debug, info};

use crate::error::{message, message_fmt, CalibrationError};

/// One calibration point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationEntry {
    /// Normalized power fraction in [0, 1].
    pub fraction: f64,
    /// Normalized drive level in [0, 1].
    pub level: f64,
}

impl CalibrationEntry {
    /// Create a new calibration entry.
    pub const fn new(fraction: f64, level: f64) -> Self {
        Self { fraction, level }
    }
}

/// Piecewise-linear mapping from power fraction to modulator drive level.
///
/// Entries are strictly increasing in fraction, span [0, 1] and have
/// non-decreasing levels. A malformed table is rejected at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationTable {
    entries: Vec<CalibrationEntry>,
}

impl CalibrationTable {
    /// Build a table from entries, validating ordering and range.
    ///
    /// # Errors
    ///
    /// Returns an error if the table is empty, has values outside [0, 1],
    /// is not strictly increasing in fraction, has decreasing levels, or
    /// does not start at 0 and end at 1.
    pub fn new(entries: Vec<CalibrationEntry>) -> Result<Self, CalibrationError> {
        let (first, last) = match (entries.first(), entries.last()) {
            (Some(first), Some(last)) => (first.fraction, last.fraction),
            _ => return Err(CalibrationError::Empty),
        };

        for (index, entry) in entries.iter().enumerate() {
            for value in [entry.fraction, entry.level] {
                if !(0.0..=1.0).contains(&value) {
                    return Err(CalibrationError::EntryOutOfRange { index, value });
                }
            }
        }

        for (index, pair) in entries.windows(2).enumerate() {
            if pair[1].fraction <= pair[0].fraction {
                return Err(CalibrationError::NotIncreasing { index: index + 1 });
            }
            if pair[1].level < pair[0].level {
                return Err(CalibrationError::LevelsDecreasing { index: index + 1 });
            }
        }

        if first != 0.0 || last != 1.0 {
            return Err(CalibrationError::DoesNotSpan { first, last });
        }

        debug!(entries = entries.len(), "calibration table validated");
        Ok(Self { entries })
    }

    /// Build a table from `(fraction, level)` pairs.
    pub fn from_pairs(pairs: &[(f64, f64)]) -> Result<Self, CalibrationError> {
        Self::new(
            pairs
                .iter()
                .map(|&(fraction, level)| CalibrationEntry::new(fraction, level))
                .collect(),
        )
    }

    /// Identity table: drive level equals power fraction.
    pub fn linear() -> Self {
        Self {
            entries: vec![CalibrationEntry::new(0.0, 0.0), CalibrationEntry::new(1.0, 1.0)],
        }
    }

    /// Load a table from a delimited text file.
    ///
    /// The file has one header row followed by two comma-separated numeric
    /// columns: power fraction and drive level, ascending by fraction.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CalibrationError> {
        let path = path.as_ref();
        let file =
            std::fs::File::open(path).map_err(|e| CalibrationError::Io(message(&e.to_string())))?;
        let table = Self::from_reader(file)?;
        info!(path = %path.display(), entries = table.len(), "loaded calibration table");
        Ok(table)
    }

    /// Read a table from any CSV source with a header row.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CalibrationError> {
        let mut csv = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut entries = Vec::new();
        // Rows are positional; header names are not interpreted.
        for (i, record) in csv.deserialize::<(f64, f64)>().enumerate() {
            let (fraction, level) = record.map_err(|e| CalibrationError::Parse {
                row: i + 1,
                msg: message_fmt(format_args!("{}", e)),
            })?;
            entries.push(CalibrationEntry::new(fraction, level));
        }

        Self::new(entries)
    }

    /// Map a power fraction to a drive level.
    ///
    /// Exact table fractions return their level exactly; values between two
    /// entries are linearly interpolated.
    ///
    /// # Errors
    ///
    /// Returns `CalibrationError::OutOfRange` if `fraction` is outside [0, 1].
    pub fn lookup(&self, fraction: f64) -> Result<f64, CalibrationError> {
        if !(0.0..=1.0).contains(&fraction) {
            return Err(CalibrationError::OutOfRange { fraction });
        }

        // First entry with fraction >= input; exists because the last is 1.0.
        let upper = self.entries.partition_point(|e| e.fraction < fraction);
        let hi = self.entries[upper];
        if hi.fraction == fraction || upper == 0 {
            return Ok(hi.level);
        }

        let lo = self.entries[upper - 1];
        let t = (fraction - lo.fraction) / (hi.fraction - lo.fraction);
        Ok(lo.level + t * (hi.level - lo.level))
    }

    /// Table entries in ascending fraction order.
    pub fn entries(&self) -> &[CalibrationEntry] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false for a validated table.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
