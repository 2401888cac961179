// crates/flt2vhs-core/src/convert.rs

use std::time::Instant;

use log::debug;

use crate::assemble::assemble;
use crate::error::Result;
use crate::model::{FlightModel, RecordCounts, TimeSpan, Truncation};
use crate::vhs;

/// What a conversion saw and produced.
#[derive(Clone, Debug, PartialEq)]
pub struct ConversionReport {
    pub input_bytes: usize,
    pub output_bytes: usize,
    pub records: RecordCounts,
    /// Rows in the tape's entity table.
    pub entity_count: usize,
    /// Rows in the tape's feature table.
    pub feature_count: usize,
    /// Entities left out because they never got a position.
    pub unplaced_count: usize,
    /// Status changes left out because their entity is not a feature.
    pub stray_status_count: usize,
    pub tracer_count: usize,
    pub stationary_sfx_count: usize,
    pub moving_sfx_count: usize,
    pub callsign_count: usize,
    pub span: Option<TimeSpan>,
    pub truncation: Option<Truncation>,
}

impl ConversionReport {
    pub fn truncated(&self) -> bool {
        self.truncation.is_some()
    }
}

/// Converts an FLT buffer into a VHS tape.
pub fn convert(input: &[u8]) -> Result<Vec<u8>> {
    convert_with_report(input).map(|(out, _)| out)
}

pub fn convert_with_report(input: &[u8]) -> Result<(Vec<u8>, ConversionReport)> {
    let started = Instant::now();
    let mut model = FlightModel::ingest(input)?;
    debug!(
        "Parsed {} records in {:?}",
        model.counts.total(),
        started.elapsed()
    );

    let started = Instant::now();
    let timeline = assemble(&mut model)?;
    debug!("Assembled in {:?}", started.elapsed());

    let started = Instant::now();
    let layout = vhs::Layout::new(&timeline)?;
    let out = layout.encode()?;
    debug!("Encoded {} bytes in {:?}", out.len(), started.elapsed());

    let (entity_count, feature_count) = (layout.entities.len(), layout.features.len());
    let (unplaced_count, stray_status_count) = (layout.unplaced.len(), layout.stray_statuses);
    let g = &model.globals;
    let report = ConversionReport {
        input_bytes: input.len(),
        output_bytes: out.len(),
        records: model.counts,
        entity_count,
        feature_count,
        unplaced_count,
        stray_status_count,
        tracer_count: g.tracers.len(),
        stationary_sfx_count: g.stationary_sfx.len(),
        moving_sfx_count: g.moving_sfx.len(),
        callsign_count: g.callsigns().len(),
        span: model.span,
        truncation: model.truncation,
    };
    Ok((out, report))
}
