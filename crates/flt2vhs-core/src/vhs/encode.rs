// crates/flt2vhs-core/src/vhs/encode.rs

use std::cmp::Ordering;
use std::collections::HashMap;

use log::{debug, warn};
use rayon::prelude::*;

use crate::assemble::Timeline;
use crate::error::{ConversionError, Result};
use crate::flt::catalog::RecordType;
use crate::model::{Entity, EntityClass, Globals, TimeSpan};
use crate::vhs::decode::{TapeEvent, TapeGeneralEvent};
use crate::vhs::*;
use crate::wire::{put_f32, put_i32, put_u32, put_u8};

/// Which entities go in which table, and where every section starts.
///
/// Built from an assembled timeline before anything is written, so the
/// output can be allocated once at its final size.
#[derive(Clone, Debug)]
pub struct Layout<'m> {
    /// Placed entities that are not features, in assembled order.
    pub entities: Vec<&'m Entity>,
    /// Feature entities, in assembled order.
    pub features: Vec<&'m Entity>,
    /// Entities that never received a position; a tape row needs one.
    pub unplaced: Vec<&'m Entity>,
    /// Status changes on entities outside the feature table.
    pub stray_statuses: usize,
    globals: &'m Globals,
    span: Option<TimeSpan>,
    position_count: u32,
    entity_event_count: u32,
    general_event_count: u32,
    feature_event_count: u32,
    feature_offset: u32,
    position_offset: u32,
    entity_event_offset: u32,
    general_event_offset: u32,
    trailer_offset: u32,
    feature_event_offset: u32,
    text_event_offset: u32,
    file_len: u32,
}

fn too_big(what: &str) -> ConversionError {
    ConversionError::InconsistentAssembly(format!("{what} do not fit the 32-bit tape format"))
}

fn count(n: usize, what: &str) -> Result<u32> {
    u32::try_from(n).map_err(|_| too_big(what))
}

/// Running offset that refuses to pass 4 GiB.
struct Cursor(u32);

impl Cursor {
    fn skip(&mut self, rows: u32, row_len: u32, what: &str) -> Result<u32> {
        let start = self.0;
        self.0 = rows
            .checked_mul(row_len)
            .and_then(|n| n.checked_add(start))
            .ok_or_else(|| too_big(what))?;
        Ok(start)
    }
}

impl<'m> Layout<'m> {
    pub fn new(t: &Timeline<'m>) -> Result<Self> {
        let mut entities = Vec::new();
        let mut features = Vec::new();
        let mut unplaced = Vec::new();
        for &e in &t.entities {
            match e.class {
                EntityClass::Unplaced => unplaced.push(e),
                EntityClass::Feature => features.push(e),
                _ => entities.push(e),
            }
            if e.class != EntityClass::Unplaced && e.positions.is_empty() {
                return Err(ConversionError::InconsistentAssembly(format!(
                    "entity {} is {:?} but has no positions",
                    e.id, e.class
                )));
            }
        }

        let stray_statuses = entities.iter().map(|e| e.statuses.len()).sum::<usize>();
        if !unplaced.is_empty() {
            warn!(
                "{} entities never got a position and are left out, with their {} records",
                unplaced.len(),
                unplaced.iter().map(|e| e.record_count()).sum::<usize>()
            );
        }
        if stray_statuses > 0 {
            warn!("{stray_statuses} status changes belong to entities that are not features; left out");
        }

        let rows = || entities.iter().chain(features.iter());
        let position_count = count(rows().map(|e| e.positions.len()).sum(), "positions")?;
        let entity_event_count = count(
            rows().map(|e| e.switches.len() + e.dofs.len()).sum(),
            "entity events",
        )?;
        let g = t.globals;
        let general_event_count = count(
            g.tracers.len() + g.stationary_sfx.len() + g.moving_sfx.len(),
            "general events",
        )?;
        let feature_event_count = count(
            features.iter().map(|e| e.statuses.len()).sum(),
            "feature events",
        )?;
        let callsign_count = count(g.callsigns().len(), "callsigns")?;

        let mut at = Cursor(HEADER_LEN);
        at.skip(count(entities.len(), "entities")?, ENTITY_ROW_LEN, "entities")?;
        let feature_offset = at.skip(count(features.len(), "features")?, ENTITY_ROW_LEN, "features")?;
        let position_offset = at.skip(position_count, UPDATE_LEN, "positions")?;
        let entity_event_offset = at.skip(entity_event_count, UPDATE_LEN, "entity events")?;
        let general_event_offset =
            at.skip(general_event_count, GENERAL_EVENT_LEN, "general events")?;
        let trailer_offset = at.skip(general_event_count, TRAILER_LEN, "trailers")?;
        let feature_event_offset =
            at.skip(feature_event_count, FEATURE_EVENT_LEN, "feature events")?;
        let text_event_offset = at.skip(1, 4, "callsign count")?;
        at.skip(callsign_count, CALLSIGN_LEN, "callsigns")?;

        Ok(Self {
            entities,
            features,
            unplaced,
            stray_statuses,
            globals: g,
            span: t.span,
            position_count,
            entity_event_count,
            general_event_count,
            feature_event_count,
            feature_offset,
            position_offset,
            entity_event_offset,
            general_event_offset,
            trailer_offset,
            feature_event_offset,
            text_event_offset,
            file_len: at.0,
        })
    }

    /// Exact size of the encoded tape.
    pub fn file_len(&self) -> usize {
        self.file_len as usize
    }

    /// Writes the tape. One allocation, one forward pass.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut b = Vec::with_capacity(self.file_len());
        self.put_header(&mut b);
        check(&b, HEADER_LEN, "entities")?;

        let entity_rows: HashMap<i32, i32> = index_by_id(&self.entities);
        let feature_rows: HashMap<i32, i32> = index_by_id(&self.features);
        let lead_of = |e: &Entity| {
            e.feature.map_or((NO_INDEX, 0, 0), |l| {
                let lead = feature_rows.get(&l.lead_id).copied().unwrap_or(NO_INDEX);
                (lead, l.slot, l.special_flags)
            })
        };

        let mut position_at = self.position_offset;
        let mut event_at = self.entity_event_offset;
        let mut kind_indexes: HashMap<i32, i32> = HashMap::new();
        for &e in &self.entities {
            let kind = e.base_type.unwrap_or(0);
            let kind_index = kind_indexes.entry(kind).or_insert(1);
            put_row(&mut b, e, *kind_index, lead_of(e), position_at, event_at);
            *kind_index += 1;
            position_at += UPDATE_LEN * e.positions.len() as u32;
            event_at += UPDATE_LEN * (e.switches.len() + e.dofs.len()) as u32;
        }
        check(&b, self.feature_offset, "features")?;
        for &e in &self.features {
            put_row(&mut b, e, 0, lead_of(e), position_at, event_at);
            position_at += UPDATE_LEN * e.positions.len() as u32;
            event_at += UPDATE_LEN * (e.switches.len() + e.dofs.len()) as u32;
        }

        check(&b, self.position_offset, "positions")?;
        for e in self.entities.iter().chain(&self.features) {
            put_linked(&mut b, &e.positions, |b, p| {
                put_f32(b, p.time);
                put_u8(b, TAG_POSITION);
                for v in [p.x, p.y, p.z, p.pitch, p.roll, p.yaw] {
                    put_f32(b, v);
                }
                put_i32(b, entity_rows.get(&p.radar_target).copied().unwrap_or(NO_INDEX));
            });
        }

        check(&b, self.entity_event_offset, "entity events")?;
        for e in self.entities.iter().chain(&self.features) {
            put_linked(&mut b, &merged_events(e), |b, ev| {
                put_f32(b, ev.time());
                match ev {
                    TapeEvent::Switch(s) => {
                        put_u8(b, TAG_SWITCH);
                        put_i32(b, s.number);
                        put_i32(b, s.value);
                        put_i32(b, s.previous);
                    }
                    TapeEvent::Dof(d) => {
                        put_u8(b, TAG_DOF);
                        put_i32(b, d.number);
                        put_f32(b, d.value);
                        put_f32(b, d.previous);
                    }
                }
                b.extend_from_slice(&[0u8; 16]);
            });
        }

        check(&b, self.general_event_offset, "general events")?;
        let events = general_events(self.globals);
        for ev in &events {
            put_general_event(&mut b, ev);
        }

        check(&b, self.trailer_offset, "general event trailers")?;
        let mut trailers: Vec<(f32, u32)> = events.iter().map(|e| (e.stop, e.index)).collect();
        trailers.par_sort_by(|x, y| x.0.total_cmp(&y.0));
        for (stop, index) in trailers {
            put_f32(&mut b, stop);
            put_u32(&mut b, index);
        }

        check(&b, self.feature_event_offset, "feature events")?;
        let mut statuses: Vec<(i32, _)> = self
            .features
            .iter()
            .zip(0..)
            .flat_map(|(e, row)| e.statuses.iter().map(move |s| (row, s)))
            .collect();
        statuses.par_sort_by(|x, y| x.1.time.total_cmp(&y.1.time));
        for (row, s) in statuses {
            put_f32(&mut b, s.time);
            put_i32(&mut b, row);
            put_i32(&mut b, s.new_status);
            put_i32(&mut b, s.previous_status);
        }

        check(&b, self.text_event_offset, "callsigns")?;
        let callsigns = self.globals.callsigns();
        put_u32(&mut b, callsigns.len() as u32);
        for c in callsigns {
            c.encode(&mut b);
        }

        check(&b, self.file_len, "end of file")?;
        debug!("File size: {}", b.len());
        Ok(b)
    }

    fn put_header(&self, b: &mut Vec<u8>) {
        let (start, end) = self.span.map_or((0.0, 0.0), |s| (s.start, s.end));
        let tod_offset = self.globals.tod_offset.unwrap_or(0.0);
        debug!(
            "Entities: {}, features: {}, positions: {}, entity events: {}",
            self.entities.len(),
            self.features.len(),
            self.position_count,
            self.entity_event_count
        );
        debug!(
            "General events: {}, feature events: {}, text event offset: {}",
            self.general_event_count, self.feature_event_count, self.text_event_offset
        );
        debug!("Start time: {start}, total play time: {}", end - start);
        debug!("Time of day offset: {tod_offset}");

        b.extend_from_slice(MAGIC);
        put_u32(b, self.text_event_offset);
        put_u32(b, self.entities.len() as u32);
        put_u32(b, self.features.len() as u32);
        put_u32(b, HEADER_LEN);
        put_u32(b, self.feature_offset);
        put_u32(b, self.position_count);
        put_u32(b, self.position_offset);
        put_u32(b, self.entity_event_offset);
        put_u32(b, self.general_event_offset);
        put_u32(b, self.trailer_offset);
        put_u32(b, self.text_event_offset);
        put_u32(b, self.feature_event_offset);
        put_u32(b, self.general_event_count);
        put_u32(b, self.entity_event_count);
        // Text events are never recorded.
        put_u32(b, 0);
        put_u32(b, self.feature_event_count);
        put_f32(b, start);
        put_f32(b, end - start);
        put_f32(b, tod_offset);
    }
}

fn check(b: &[u8], expected: u32, section: &str) -> Result<()> {
    if b.len() != expected as usize {
        return Err(ConversionError::InconsistentAssembly(format!(
            "{section} should start at {expected}, writer is at {}",
            b.len()
        )));
    }
    Ok(())
}

fn index_by_id(rows: &[&Entity]) -> HashMap<i32, i32> {
    rows.iter().zip(0..).map(|(e, row)| (e.id, row)).collect()
}

fn put_row(
    b: &mut Vec<u8>,
    e: &Entity,
    kind_index: i32,
    (lead, slot, special_flags): (i32, i32, u32),
    first_position: u32,
    first_event: u32,
) {
    put_i32(b, e.id);
    put_i32(b, e.base_type.unwrap_or(0));
    put_i32(b, kind_index);
    put_u32(b, e.class.tape_flags());
    put_i32(b, lead);
    put_i32(b, slot);
    put_u32(b, special_flags);
    put_u32(b, first_position);
    let has_events = !(e.switches.is_empty() && e.dofs.is_empty());
    put_u32(b, if has_events { first_event } else { 0 });
}

/// Writes `items` as contiguous update rows chained by next/prev offsets.
/// `body` writes the first 33 bytes of each row.
fn put_linked<T>(b: &mut Vec<u8>, items: &[T], mut body: impl FnMut(&mut Vec<u8>, &T)) {
    let mut prev = 0u32;
    for (n, item) in items.iter().enumerate() {
        let here = b.len() as u32;
        body(b, item);
        let next = if n + 1 < items.len() {
            here + UPDATE_LEN
        } else {
            0
        };
        put_u32(b, next);
        put_u32(b, prev);
        prev = here;
    }
}

/// Switch and DOF changes in one time-ordered list; a switch goes first when
/// both share a timestamp.
fn merged_events(e: &Entity) -> Vec<TapeEvent> {
    let mut out = Vec::with_capacity(e.switches.len() + e.dofs.len());
    let mut switches = e.switches.iter().peekable();
    let mut dofs = e.dofs.iter().peekable();
    loop {
        let switch_first = match (switches.peek(), dofs.peek()) {
            (Some(s), Some(d)) => s.time.total_cmp(&d.time) != Ordering::Greater,
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (None, None) => break,
        };
        let next = if switch_first {
            switches.next().map(|s| TapeEvent::Switch(*s))
        } else {
            dofs.next().map(|d| TapeEvent::Dof(*d))
        };
        out.extend(next);
    }
    out
}

/// Tracers, then stationary effects, then moving effects, each in append
/// order, numbered in that order.
fn general_events(g: &Globals) -> Vec<TapeGeneralEvent> {
    let blank = TapeGeneralEvent {
        type_byte: 0,
        index: 0,
        start: 0.0,
        stop: 0.0,
        kind: 0,
        user: 0,
        flags: 0,
        scale: 0.0,
        x: 0.0,
        y: 0.0,
        z: 0.0,
        dx: 0.0,
        dy: 0.0,
        dz: 0.0,
        roll: 0.0,
        pitch: 0.0,
        yaw: 0.0,
    };

    let tracers = g.tracers.iter().map(|t| TapeGeneralEvent {
        type_byte: RecordType::TracerStart.tag(),
        start: t.time,
        stop: t.time + TRACER_LIFETIME,
        x: t.data.x,
        y: t.data.y,
        z: t.data.z,
        dx: t.data.dx,
        dy: t.data.dy,
        dz: t.data.dz,
        ..blank
    });
    let stationary = g.stationary_sfx.iter().map(|s| TapeGeneralEvent {
        type_byte: RecordType::StationarySfx.tag(),
        start: s.time,
        stop: s.time + s.data.ttl,
        kind: s.data.sfx_type,
        scale: s.data.scale,
        x: s.data.x,
        y: s.data.y,
        z: s.data.z,
        ..blank
    });
    let moving = g.moving_sfx.iter().map(|m| TapeGeneralEvent {
        type_byte: RecordType::MovingSfx.tag(),
        start: m.time,
        stop: m.time + m.data.ttl,
        kind: m.data.sfx_type,
        user: m.data.user,
        flags: m.data.flags,
        scale: m.data.scale,
        x: m.data.x,
        y: m.data.y,
        z: m.data.z,
        dx: m.data.dx,
        dy: m.data.dy,
        dz: m.data.dz,
        ..blank
    });

    tracers
        .chain(stationary)
        .chain(moving)
        .zip(0u32..)
        .map(|(ev, index)| TapeGeneralEvent { index, ..ev })
        .collect()
}

fn put_general_event(b: &mut Vec<u8>, e: &TapeGeneralEvent) {
    put_u8(b, e.type_byte);
    put_u32(b, e.index);
    put_f32(b, e.start);
    put_f32(b, e.stop);
    put_i32(b, e.kind);
    put_i32(b, e.user);
    put_u32(b, e.flags);
    put_f32(b, e.scale);
    for v in [e.x, e.y, e.z, e.dx, e.dy, e.dz, e.roll, e.pitch, e.yaw] {
        put_f32(b, v);
    }
}

/// Exact size of the encoded tape.
pub fn encoded_len(t: &Timeline<'_>) -> Result<usize> {
    Layout::new(t).map(|l| l.file_len())
}

/// Serializes an assembled timeline.
pub fn encode(t: &Timeline<'_>) -> Result<Vec<u8>> {
    Layout::new(t)?.encode()
}
