//! Snapshot output for ensemble state
//!
//! The ensemble hands a flat list of [`PhaseSpaceRecord`]s to a
//! [`SnapshotSink`]; what happens to them (memory, CSV, nothing) is up to the
//! sink.

use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use serde::Serialize;

use crate::error::SinkError;
use crate::simulation::ensemble::Particle;

/// One particle's phase-space coordinates at the time of the snapshot
#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
pub struct PhaseSpaceRecord {
    pub index: usize,
    pub position: [f64; 3],
    pub velocity: [f64; 3],
    pub active: bool,
}

impl From<Particle<'_>> for PhaseSpaceRecord {
    fn from(p: Particle<'_>) -> Self {
        let (x, v) = (p.position(), p.velocity());
        Self {
            index: p.index(),
            position: [x.x, x.y, x.z],
            velocity: [v.x, v.y, v.z],
            active: p.is_active(),
        }
    }
}

pub trait SnapshotSink {
    fn write_snapshot(&mut self, tag: &str, records: &[PhaseSpaceRecord]) -> Result<(), SinkError>;
}

/// Keeps every snapshot in memory, in the order written
#[derive(Debug, Default)]
pub struct MemorySink {
    snapshots: Vec<(String, Vec<PhaseSpaceRecord>)>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, tag: &str) -> Option<&[PhaseSpaceRecord]> {
        self.snapshots
            .iter()
            .find(|(t, _)| t == tag)
            .map(|(_, records)| records.as_slice())
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.snapshots.iter().map(|(t, _)| t.as_str())
    }
}

impl SnapshotSink for MemorySink {
    fn write_snapshot(&mut self, tag: &str, records: &[PhaseSpaceRecord]) -> Result<(), SinkError> {
        self.snapshots.push((tag.to_string(), records.to_vec()));
        Ok(())
    }
}

/// Writes `<dir>/<tag>.csv` with fixed-precision numeric fields
#[derive(Debug, Clone)]
pub struct CsvSink {
    dir: PathBuf,
    precision: usize,
}

impl CsvSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            precision: 6,
        }
    }

    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    pub fn path_for(&self, tag: &str) -> PathBuf {
        self.dir.join(format!("{tag}.csv"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl SnapshotSink for CsvSink {
    fn write_snapshot(&mut self, tag: &str, records: &[PhaseSpaceRecord]) -> Result<(), SinkError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(tag);
        let mut wtr = csv::Writer::from_path(&path)?;
        wtr.write_record(["index", "x", "y", "z", "vx", "vy", "vz", "active"])?;

        let p = self.precision;
        for r in records {
            let mut row = Vec::with_capacity(8);
            row.push(r.index.to_string());
            row.extend(r.position.iter().map(|c| format!("{c:.p$}")));
            row.extend(r.velocity.iter().map(|c| format!("{c:.p$}")));
            row.push(r.active.to_string());
            wtr.write_record(&row)?;
        }
        wtr.flush()?;
        info!("wrote {} records to {}", records.len(), path.display());
        Ok(())
    }
}
