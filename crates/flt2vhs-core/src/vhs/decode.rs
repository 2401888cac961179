// crates/flt2vhs-core/src/vhs/decode.rs

//! Read-only decoder for VHS tapes, used for inspection and tests.
//!
//! Sections are read in file order and each one must start where the header
//! says it does. Entity and feature rows are then joined with their update
//! rows by walking the linked lists from each row's head offsets.

use log::warn;
use serde::Serialize;

use crate::error::{ConversionError, Result};
use crate::flt::catalog::{Callsign, LABEL_LEN};
use crate::model::entity::{DofChange, SwitchChange};
use crate::vhs::*;
use crate::wire::{read_array, read_f32, read_i32, read_u32, read_u8};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TapeHeader {
    /// Second header word; writers store the callsign offset here.
    pub file_len: u32,
    pub entity_count: u32,
    pub feature_count: u32,
    pub entity_offset: u32,
    pub feature_offset: u32,
    pub position_count: u32,
    pub position_offset: u32,
    pub entity_event_offset: u32,
    pub general_event_offset: u32,
    pub general_event_trailer_offset: u32,
    pub text_event_offset: u32,
    pub feature_event_offset: u32,
    pub general_event_count: u32,
    pub entity_event_count: u32,
    pub text_event_count: u32,
    pub feature_event_count: u32,
    pub start_time: f32,
    pub total_time: f32,
    pub tod_offset: f32,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct TapePosition {
    pub time: f32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub pitch: f32,
    pub roll: f32,
    pub yaw: f32,
    /// Entity-table row of the radar target, or -1.
    pub radar_index: i32,
}

/// A switch or DOF change from the entity event section.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum TapeEvent {
    Switch(SwitchChange),
    Dof(DofChange),
}

impl TapeEvent {
    pub fn time(&self) -> f32 {
        match self {
            TapeEvent::Switch(s) => s.time,
            TapeEvent::Dof(d) => d.time,
        }
    }
}

/// One entity or feature row with its update chains resolved.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TapeEntity {
    pub uid: i32,
    pub kind: i32,
    pub kind_index: i32,
    pub flags: u32,
    pub lead_index: i32,
    pub slot: i32,
    pub special_flags: u32,
    pub first_position_offset: u32,
    pub first_event_offset: u32,
    pub positions: Vec<TapePosition>,
    pub events: Vec<TapeEvent>,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct TapeGeneralEvent {
    /// Source record tag: tracer, stationary or moving effect.
    pub type_byte: u8,
    pub index: u32,
    pub start: f32,
    pub stop: f32,
    pub kind: i32,
    pub user: i32,
    pub flags: u32,
    pub scale: f32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub dx: f32,
    pub dy: f32,
    pub dz: f32,
    pub roll: f32,
    pub pitch: f32,
    pub yaw: f32,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct TapeTrailer {
    pub stop: f32,
    pub index: u32,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct TapeFeatureEvent {
    pub time: f32,
    pub feature_index: i32,
    pub new_status: i32,
    pub previous_status: i32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TapeCallsign {
    pub label: String,
    pub team_color: i32,
}

impl From<Callsign> for TapeCallsign {
    fn from(c: Callsign) -> Self {
        Self {
            label: c.label_text(),
            team_color: c.team_color,
        }
    }
}

/// A fully decoded VHS tape.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Tape {
    pub header: TapeHeader,
    pub entities: Vec<TapeEntity>,
    pub features: Vec<TapeEntity>,
    pub general_events: Vec<TapeGeneralEvent>,
    pub trailers: Vec<TapeTrailer>,
    pub feature_events: Vec<TapeFeatureEvent>,
    pub callsigns: Vec<TapeCallsign>,
}

fn bad(msg: impl Into<String>) -> ConversionError {
    ConversionError::VhsFormat(msg.into())
}

/// An update row before it is attached to its owner.
struct Linked<T> {
    item: T,
    next: u32,
    prev: u32,
}

struct Row {
    uid: i32,
    kind: i32,
    kind_index: i32,
    flags: u32,
    lead_index: i32,
    slot: i32,
    special_flags: u32,
    first_position_offset: u32,
    first_event_offset: u32,
}

fn expect_at(what: &str, declared: u32, at: usize) -> Result<()> {
    if declared as usize != at {
        return Err(bad(format!(
            "expected {what} to start at {declared}, currently at {at}"
        )));
    }
    Ok(())
}

/// Caps a declared row count by what the remaining bytes could hold, so a
/// corrupt count cannot force a huge allocation.
fn read_rows<T>(
    bytes: &[u8],
    i: &mut usize,
    count: u32,
    row_len: u32,
    mut read_one: impl FnMut(&[u8], &mut usize) -> Result<T>,
) -> Result<Vec<T>> {
    let room = bytes.len().saturating_sub(*i) / row_len as usize;
    let mut out = Vec::with_capacity((count as usize).min(room));
    for _ in 0..count {
        out.push(read_one(bytes, i)?);
    }
    Ok(out)
}

fn read_header(b: &[u8], i: &mut usize) -> Result<TapeHeader> {
    Ok(TapeHeader {
        file_len: read_u32(b, i)?,
        entity_count: read_u32(b, i)?,
        feature_count: read_u32(b, i)?,
        entity_offset: read_u32(b, i)?,
        feature_offset: read_u32(b, i)?,
        position_count: read_u32(b, i)?,
        position_offset: read_u32(b, i)?,
        entity_event_offset: read_u32(b, i)?,
        general_event_offset: read_u32(b, i)?,
        general_event_trailer_offset: read_u32(b, i)?,
        text_event_offset: read_u32(b, i)?,
        feature_event_offset: read_u32(b, i)?,
        general_event_count: read_u32(b, i)?,
        entity_event_count: read_u32(b, i)?,
        text_event_count: read_u32(b, i)?,
        feature_event_count: read_u32(b, i)?,
        start_time: read_f32(b, i)?,
        total_time: read_f32(b, i)?,
        tod_offset: read_f32(b, i)?,
    })
}

fn read_row(b: &[u8], i: &mut usize) -> Result<Row> {
    Ok(Row {
        uid: read_i32(b, i)?,
        kind: read_i32(b, i)?,
        kind_index: read_i32(b, i)?,
        flags: read_u32(b, i)?,
        lead_index: read_i32(b, i)?,
        slot: read_i32(b, i)?,
        special_flags: read_u32(b, i)?,
        first_position_offset: read_u32(b, i)?,
        first_event_offset: read_u32(b, i)?,
    })
}

fn read_links<T>(b: &[u8], i: &mut usize, item: T) -> Result<Linked<T>> {
    Ok(Linked {
        item,
        next: read_u32(b, i)?,
        prev: read_u32(b, i)?,
    })
}

fn read_position(b: &[u8], i: &mut usize) -> Result<Linked<TapePosition>> {
    let at = *i;
    let time = read_f32(b, i)?;
    let tag = read_u8(b, i)?;
    if tag != TAG_POSITION {
        return Err(bad(format!("position row at {at} has tag {tag}")));
    }
    let item = TapePosition {
        time,
        x: read_f32(b, i)?,
        y: read_f32(b, i)?,
        z: read_f32(b, i)?,
        pitch: read_f32(b, i)?,
        roll: read_f32(b, i)?,
        yaw: read_f32(b, i)?,
        radar_index: read_i32(b, i)?,
    };
    read_links(b, i, item)
}

fn read_event(b: &[u8], i: &mut usize) -> Result<Linked<TapeEvent>> {
    let at = *i;
    let time = read_f32(b, i)?;
    let item = match read_u8(b, i)? {
        TAG_SWITCH => TapeEvent::Switch(SwitchChange {
            time,
            number: read_i32(b, i)?,
            value: read_i32(b, i)?,
            previous: read_i32(b, i)?,
        }),
        TAG_DOF => TapeEvent::Dof(DofChange {
            time,
            number: read_i32(b, i)?,
            value: read_f32(b, i)?,
            previous: read_f32(b, i)?,
        }),
        tag => return Err(bad(format!("event row at {at} has tag {tag}"))),
    };
    // Union padding left over from the position layout.
    read_array::<16>(b, i)?;
    read_links(b, i, item)
}

fn read_general_event(b: &[u8], i: &mut usize) -> Result<TapeGeneralEvent> {
    Ok(TapeGeneralEvent {
        type_byte: read_u8(b, i)?,
        index: read_u32(b, i)?,
        start: read_f32(b, i)?,
        stop: read_f32(b, i)?,
        kind: read_i32(b, i)?,
        user: read_i32(b, i)?,
        flags: read_u32(b, i)?,
        scale: read_f32(b, i)?,
        x: read_f32(b, i)?,
        y: read_f32(b, i)?,
        z: read_f32(b, i)?,
        dx: read_f32(b, i)?,
        dy: read_f32(b, i)?,
        dz: read_f32(b, i)?,
        roll: read_f32(b, i)?,
        pitch: read_f32(b, i)?,
        yaw: read_f32(b, i)?,
    })
}

/// Follows a linked list of update rows that starts at absolute offset
/// `head` inside a section beginning at `base`. A head of 0 is an empty list.
fn walk<T: Copy>(what: &str, head: u32, base: u32, rows: &[Linked<T>]) -> Result<Vec<T>> {
    let mut out = Vec::new();
    let mut at = head;
    let mut prev = 0u32;
    while at != 0 {
        let slot = at
            .checked_sub(base)
            .filter(|d| d % UPDATE_LEN == 0)
            .map(|d| (d / UPDATE_LEN) as usize)
            .filter(|&n| n < rows.len())
            .ok_or_else(|| bad(format!("{what} link {at} points outside its section")))?;
        let row = &rows[slot];
        if row.prev != prev {
            return Err(bad(format!(
                "{what} row at {at} links back to {}, expected {prev}",
                row.prev
            )));
        }
        if out.len() == rows.len() {
            return Err(bad(format!("{what} list starting at {head} loops")));
        }
        out.push(row.item);
        prev = at;
        at = row.next;
    }
    Ok(out)
}

pub fn decode(bytes: &[u8]) -> Result<Tape> {
    if bytes.len() < HEADER_LEN as usize {
        return Err(bad(format!("vhs too small ({} bytes)", bytes.len())));
    }
    if &bytes[0..4] != MAGIC {
        warn!(
            "Expected magic bytes 'EPAT', got {:?} ({})",
            &bytes[0..4],
            String::from_utf8_lossy(&bytes[0..4])
        );
    }

    let mut i = 4usize;
    let header = read_header(bytes, &mut i)?;

    expect_at("entities", header.entity_offset, i)?;
    let entity_rows = read_rows(bytes, &mut i, header.entity_count, ENTITY_ROW_LEN, read_row)?;

    expect_at("features", header.feature_offset, i)?;
    let feature_rows = read_rows(bytes, &mut i, header.feature_count, ENTITY_ROW_LEN, read_row)?;

    expect_at("position updates", header.position_offset, i)?;
    let positions = read_rows(
        bytes,
        &mut i,
        header.position_count,
        UPDATE_LEN,
        read_position,
    )?;

    expect_at("entity events", header.entity_event_offset, i)?;
    let events = read_rows(
        bytes,
        &mut i,
        header.entity_event_count,
        UPDATE_LEN,
        read_event,
    )?;

    expect_at("general events", header.general_event_offset, i)?;
    let general_events = read_rows(
        bytes,
        &mut i,
        header.general_event_count,
        GENERAL_EVENT_LEN,
        read_general_event,
    )?;

    expect_at("general event trailers", header.general_event_trailer_offset, i)?;
    let trailers = read_rows(
        bytes,
        &mut i,
        header.general_event_count,
        TRAILER_LEN,
        |b, i| {
            Ok(TapeTrailer {
                stop: read_f32(b, i)?,
                index: read_u32(b, i)?,
            })
        },
    )?;

    expect_at("feature events", header.feature_event_offset, i)?;
    let feature_events = read_rows(
        bytes,
        &mut i,
        header.feature_event_count,
        FEATURE_EVENT_LEN,
        |b, i| {
            Ok(TapeFeatureEvent {
                time: read_f32(b, i)?,
                feature_index: read_i32(b, i)?,
                new_status: read_i32(b, i)?,
                previous_status: read_i32(b, i)?,
            })
        },
    )?;

    // The callsign count sits in front of its block, not in the header.
    expect_at("callsigns", header.text_event_offset, i)?;
    let callsign_count = read_i32(bytes, &mut i)?;
    let callsign_count = u32::try_from(callsign_count)
        .map_err(|_| bad(format!("negative ({callsign_count}) callsign count")))?;
    let callsigns = read_rows(bytes, &mut i, callsign_count, CALLSIGN_LEN, |b, i| {
        let label = read_array::<LABEL_LEN>(b, i)?;
        let team_color = read_i32(b, i)?;
        Ok(TapeCallsign::from(Callsign { label, team_color }))
    })?;

    if i != bytes.len() {
        return Err(bad(format!(
            "{} trailing bytes after the callsigns",
            bytes.len() - i
        )));
    }

    let attach = |rows: Vec<Row>| -> Result<Vec<TapeEntity>> {
        rows.into_iter()
            .map(|r| {
                Ok(TapeEntity {
                    positions: walk(
                        "position",
                        r.first_position_offset,
                        header.position_offset,
                        &positions,
                    )?,
                    events: walk(
                        "event",
                        r.first_event_offset,
                        header.entity_event_offset,
                        &events,
                    )?,
                    uid: r.uid,
                    kind: r.kind,
                    kind_index: r.kind_index,
                    flags: r.flags,
                    lead_index: r.lead_index,
                    slot: r.slot,
                    special_flags: r.special_flags,
                    first_position_offset: r.first_position_offset,
                    first_event_offset: r.first_event_offset,
                })
            })
            .collect()
    };
    let entities = attach(entity_rows)?;
    let features = attach(feature_rows)?;

    Ok(Tape {
        header,
        entities,
        features,
        general_events,
        trailers,
        feature_events,
        callsigns,
    })
}
