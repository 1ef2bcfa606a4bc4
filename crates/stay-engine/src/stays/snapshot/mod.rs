//! CSV exports of a property's reservations, seasonal rates and fees.

mod parser;

use crate::stays::domain::{FeeSchedule, RatePeriod, ReservedStay, StayError};
use std::fs::File;
use std::io::Read;
use std::path::Path;

#[derive(Debug)]
pub enum SnapshotImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    Stay(StayError),
    InvalidAmount { field: &'static str, value: String },
    MissingFeeRow,
}

impl std::fmt::Display for SnapshotImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SnapshotImportError::Io(err) => write!(f, "failed to read property export: {}", err),
            SnapshotImportError::Csv(err) => write!(f, "invalid property CSV data: {}", err),
            SnapshotImportError::Stay(err) => write!(f, "invalid property record: {}", err),
            SnapshotImportError::InvalidAmount { field, value } => {
                write!(f, "column '{}' holds non-numeric value '{}'", field, value)
            }
            SnapshotImportError::MissingFeeRow => {
                write!(f, "fee schedule export contains no data row")
            }
        }
    }
}

impl std::error::Error for SnapshotImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SnapshotImportError::Io(err) => Some(err),
            SnapshotImportError::Csv(err) => Some(err),
            SnapshotImportError::Stay(err) => Some(err),
            SnapshotImportError::InvalidAmount { .. } | SnapshotImportError::MissingFeeRow => None,
        }
    }
}

impl From<std::io::Error> for SnapshotImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for SnapshotImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

impl From<StayError> for SnapshotImportError {
    fn from(err: StayError) -> Self {
        Self::Stay(err)
    }
}

/// Loads provider exports into the shapes the availability and pricing core consume.
pub struct PropertySnapshotImporter;

impl PropertySnapshotImporter {
    pub fn reserved_stays_from_path<P: AsRef<Path>>(
        path: P,
    ) -> Result<Vec<ReservedStay>, SnapshotImportError> {
        Self::reserved_stays_from_reader(File::open(path)?)
    }

    pub fn reserved_stays_from_reader<R: Read>(
        reader: R,
    ) -> Result<Vec<ReservedStay>, SnapshotImportError> {
        parser::parse_reserved_stays(reader)
    }

    pub fn rate_periods_from_path<P: AsRef<Path>>(
        path: P,
    ) -> Result<Vec<RatePeriod>, SnapshotImportError> {
        Self::rate_periods_from_reader(File::open(path)?)
    }

    pub fn rate_periods_from_reader<R: Read>(
        reader: R,
    ) -> Result<Vec<RatePeriod>, SnapshotImportError> {
        parser::parse_rate_periods(reader)
    }

    pub fn fee_schedule_from_path<P: AsRef<Path>>(
        path: P,
    ) -> Result<FeeSchedule, SnapshotImportError> {
        Self::fee_schedule_from_reader(File::open(path)?)
    }

    pub fn fee_schedule_from_reader<R: Read>(reader: R) -> Result<FeeSchedule, SnapshotImportError> {
        parser::parse_fee_schedule(reader)
    }
}
