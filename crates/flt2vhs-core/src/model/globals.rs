// crates/flt2vhs-core/src/model/globals.rs

use log::{trace, warn};
use serde::Serialize;

use crate::flt::catalog::{
    Callsign, MovingSfxData, Record, RecordBody, StationarySfxData, TracerData,
};

/// A non-entity event and the time it happened.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct Timed<T> {
    pub time: f32,
    #[serde(flatten)]
    pub data: T,
}

/// Data that belongs to the flight rather than to any entity.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Globals {
    pub tracers: Vec<Timed<TracerData>>,
    pub stationary_sfx: Vec<Timed<StationarySfxData>>,
    pub moving_sfx: Vec<Timed<MovingSfxData>>,
    /// Last TodOffset record wins.
    pub tod_offset: Option<f32>,
    /// Last CallsignList record wins.
    pub callsigns: Option<Vec<Callsign>>,
}

impl Globals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn callsigns(&self) -> &[Callsign] {
        self.callsigns.as_deref().unwrap_or(&[])
    }

    /// Appends a global record. Returns false for entity-scoped records.
    pub fn apply(&mut self, record: &Record<'_>) -> bool {
        let time = record.time;
        match &record.body {
            RecordBody::TracerStart(t) => self.tracers.push(Timed { time, data: *t }),
            RecordBody::StationarySfx(s) => self.stationary_sfx.push(Timed { time, data: *s }),
            RecordBody::MovingSfx(m) => self.moving_sfx.push(Timed { time, data: *m }),
            RecordBody::TodOffset => {
                if let Some(previous) = self.tod_offset {
                    trace!("time of day offset {previous} replaced by {time}");
                }
                self.tod_offset = Some(time);
            }
            RecordBody::CallsignList(list) => {
                if self.callsigns.is_some() {
                    warn!("Multiple callsign lists found, using the latest");
                }
                self.callsigns = Some(list.iter().collect());
            }
            _ => return false,
        }
        true
    }
}
