// crates/flt2vhs-core/src/model/mod.rs

pub mod entity;
pub mod globals;
pub mod index;

use log::{trace, warn};
use serde::Serialize;

use crate::error::{ConversionError, Result};
use crate::flt::catalog::{Record, RecordBody, RecordType};
use crate::flt::reader::RecordReader;

pub use entity::{Entity, EntityClass};
pub use globals::{Globals, Timed};
pub use index::EntityIndex;

/// Records read, per type.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RecordCounts([usize; RecordType::COUNT]);

impl RecordCounts {
    #[inline]
    pub fn bump(&mut self, ty: RecordType) {
        self.0[ty.tag() as usize] += 1;
    }

    pub fn get(&self, ty: RecordType) -> usize {
        self.0[ty.tag() as usize]
    }

    pub fn total(&self) -> usize {
        self.0.iter().sum()
    }

    /// Types with at least one record, in tag order.
    pub fn nonzero(&self) -> impl Iterator<Item = (RecordType, usize)> + '_ {
        RecordType::ALL
            .iter()
            .map(|&ty| (ty, self.get(ty)))
            .filter(|&(_, n)| n > 0)
    }
}

/// Time of the first record read and the latest time seen after it
/// (TodOffset records excluded).
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct TimeSpan {
    pub start: f32,
    pub end: f32,
}

/// Where parsing stopped on a cut-short recording.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Truncation {
    pub offset: usize,
    pub needed: usize,
    /// Trailing bytes that were not converted.
    pub skipped: usize,
}

/// The whole in-memory model for one conversion.
#[derive(Clone, Debug, Default)]
pub struct FlightModel {
    pub entities: EntityIndex,
    pub globals: Globals,
    pub span: Option<TimeSpan>,
    pub counts: RecordCounts,
    pub truncation: Option<Truncation>,
}

impl FlightModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads every record in `bytes` into a fresh model.
    ///
    /// A truncated trailing record ends parsing with a warning and the model
    /// keeps everything read before it. Any other parse error is returned.
    pub fn ingest(bytes: &[u8]) -> Result<Self> {
        let mut model = Self::new();
        for record in RecordReader::new(bytes) {
            match record {
                Ok(record) => model.apply(&record),
                Err(ConversionError::TruncatedRecord {
                    offset,
                    needed,
                    available,
                }) => {
                    warn!(
                        "Reached end of file in the middle of a record at offset {offset} \
                         (needed {needed} bytes, had {available}); skipping {available} bytes"
                    );
                    model.truncation = Some(Truncation {
                        offset,
                        needed,
                        skipped: available,
                    });
                }
                Err(e) => return Err(e),
            }
        }
        Ok(model)
    }

    /// Dispatches one record to the entity index or the global collections.
    pub fn apply(&mut self, record: &Record<'_>) {
        let ty = record.record_type();
        self.counts.bump(ty);
        trace!("{}: {:?}", ty.name(), record);

        if !matches!(record.body, RecordBody::TodOffset) {
            self.widen_span(record.time);
        }

        if !self.entities.apply(record) {
            self.globals.apply(record);
        }
    }

    fn widen_span(&mut self, time: f32) {
        self.span = Some(match self.span {
            None => TimeSpan {
                start: time,
                end: time,
            },
            Some(s) => TimeSpan {
                start: s.start,
                end: s.end.max(time),
            },
        });
    }
}
