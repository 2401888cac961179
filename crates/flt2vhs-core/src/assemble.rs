// crates/flt2vhs-core/src/assemble.rs

//! Turns the flat-ingested model into the order the VHS tape wants.
//!
//! Each entity's sequences get a stable sort by time (equal times keep input
//! order, since several attributes can change in one frame). Entities are
//! then ordered by first appearance, ties broken by ascending id. Global
//! collections keep their append order.

use log::debug;

use crate::error::{ConversionError, Result};
use crate::model::{Entity, FlightModel, Globals, TimeSpan, Truncation};

/// Read-only, ordered view over an assembled model.
#[derive(Clone, Debug)]
pub struct Timeline<'m> {
    pub entities: Vec<&'m Entity>,
    pub globals: &'m Globals,
    pub span: Option<TimeSpan>,
    pub truncation: Option<Truncation>,
}

pub fn assemble(model: &mut FlightModel) -> Result<Timeline<'_>> {
    model.entities.sort_all_chronologically();

    let model: &FlightModel = model;
    let mut ordered = Vec::with_capacity(model.entities.len());
    for (&id, entity) in model.entities.iter() {
        if entity.id != id {
            return Err(ConversionError::InconsistentAssembly(format!(
                "entity {} filed under id {}",
                entity.id, id
            )));
        }
        let first = entity.first_appearance().ok_or_else(|| {
            ConversionError::InconsistentAssembly(format!("entity {id} has no records"))
        })?;
        if !entity.is_chronological() {
            return Err(ConversionError::InconsistentAssembly(format!(
                "entity {id} is out of order after sorting"
            )));
        }
        ordered.push((first, entity));
    }

    ordered.sort_by(|(ta, a), (tb, b)| ta.total_cmp(tb).then(a.id.cmp(&b.id)));

    debug!(
        "Assembled {} entities, {} tracers, {} stationary and {} moving effects",
        ordered.len(),
        model.globals.tracers.len(),
        model.globals.stationary_sfx.len(),
        model.globals.moving_sfx.len()
    );

    Ok(Timeline {
        entities: ordered.into_iter().map(|(_, e)| e).collect(),
        globals: &model.globals,
        span: model.span,
        truncation: model.truncation,
    })
}
