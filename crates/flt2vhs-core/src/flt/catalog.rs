// crates/flt2vhs-core/src/flt/catalog.rs

//! Tags and byte layouts of every FLT record type.
//!
//! Every record starts with a five byte header (`tag: u8`, `time: f32`).
//! The payload length is implied by the tag; nothing in the stream says how
//! long a record is. All fields are packed little-endian `i32`/`u32`/`f32`.
//!
//! Adding a record type means touching this file only: the tag, its
//! [`PayloadLen`], a payload struct, and the decode/encode arms.

use serde::Serialize;

use crate::wire::{put_f32, put_i32, put_u32, put_u8, Fields};

/// Tag byte + time stamp.
pub const HEADER_LEN: usize = 5;

/// Bytes in the fixed-width callsign label.
pub const LABEL_LEN: usize = 16;

/// One callsign entry: label + team color.
pub const CALLSIGN_LEN: usize = LABEL_LEN + 4;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum RecordType {
    GenPosition = 0,
    MissilePosition = 1,
    FeaturePosition = 2,
    AircraftPosition = 3,
    TracerStart = 4,
    StationarySfx = 5,
    MovingSfx = 6,
    Switch = 7,
    Dof = 8,
    ChaffPosition = 9,
    FlarePosition = 10,
    TodOffset = 11,
    FeatureStatus = 12,
    CallsignList = 13,
}

/// How many payload bytes follow the record header.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PayloadLen {
    Fixed(usize),
    /// An `i32` element count of `prefix` bytes, then that many elements.
    Counted { prefix: usize, element: usize },
}

impl RecordType {
    pub const COUNT: usize = 14;

    pub const ALL: [RecordType; RecordType::COUNT] = [
        RecordType::GenPosition,
        RecordType::MissilePosition,
        RecordType::FeaturePosition,
        RecordType::AircraftPosition,
        RecordType::TracerStart,
        RecordType::StationarySfx,
        RecordType::MovingSfx,
        RecordType::Switch,
        RecordType::Dof,
        RecordType::ChaffPosition,
        RecordType::FlarePosition,
        RecordType::TodOffset,
        RecordType::FeatureStatus,
        RecordType::CallsignList,
    ];

    #[inline]
    pub fn from_tag(tag: u8) -> Option<Self> {
        Self::ALL.get(tag as usize).copied()
    }

    #[inline]
    pub fn tag(self) -> u8 {
        self as u8
    }

    pub fn payload_len(self) -> PayloadLen {
        use RecordType::*;
        match self {
            GenPosition | MissilePosition | ChaffPosition | FlarePosition => PayloadLen::Fixed(32),
            AircraftPosition => PayloadLen::Fixed(36),
            FeaturePosition => PayloadLen::Fixed(44),
            TracerStart => PayloadLen::Fixed(24),
            StationarySfx => PayloadLen::Fixed(24),
            MovingSfx => PayloadLen::Fixed(44),
            Switch | Dof => PayloadLen::Fixed(20),
            TodOffset => PayloadLen::Fixed(0),
            FeatureStatus => PayloadLen::Fixed(12),
            CallsignList => PayloadLen::Counted {
                prefix: 4,
                element: CALLSIGN_LEN,
            },
        }
    }

    pub fn name(self) -> &'static str {
        use RecordType::*;
        match self {
            GenPosition => "gen-position",
            MissilePosition => "missile-position",
            FeaturePosition => "feature-position",
            AircraftPosition => "aircraft-position",
            TracerStart => "tracer-start",
            StationarySfx => "stationary-sfx",
            MovingSfx => "moving-sfx",
            Switch => "switch",
            Dof => "dof",
            ChaffPosition => "chaff-position",
            FlarePosition => "flare-position",
            TodOffset => "tod-offset",
            FeatureStatus => "feature-status",
            CallsignList => "callsign-list",
        }
    }
}

/// Shared by general, missile, aircraft, chaff and flare positions.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct PositionData {
    pub base_type: i32,
    pub id: i32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub yaw: f32,
    pub pitch: f32,
    pub roll: f32,
}

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct FeaturePositionData {
    pub base_type: i32,
    pub id: i32,
    /// Lead component of a multi-part feature (bridges, bases).
    pub lead_id: i32,
    pub slot: i32,
    pub special_flags: u32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub yaw: f32,
    pub pitch: f32,
    pub roll: f32,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize)]
pub struct TracerData {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub dx: f32,
    pub dy: f32,
    pub dz: f32,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize)]
pub struct StationarySfxData {
    pub sfx_type: i32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub ttl: f32,
    pub scale: f32,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize)]
pub struct MovingSfxData {
    pub sfx_type: i32,
    pub user: i32,
    pub flags: u32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub dx: f32,
    pub dy: f32,
    pub dz: f32,
    pub ttl: f32,
    pub scale: f32,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SwitchData {
    pub base_type: i32,
    pub id: i32,
    pub number: i32,
    pub value: i32,
    pub previous: i32,
}

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct DofData {
    pub base_type: i32,
    pub id: i32,
    pub number: i32,
    pub value: f32,
    pub previous: f32,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FeatureStatusData {
    pub id: i32,
    pub new_status: i32,
    pub previous_status: i32,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Callsign {
    pub label: [u8; LABEL_LEN],
    pub team_color: i32,
}

impl Callsign {
    /// Builds a callsign from text, truncating to the label width.
    pub fn new(label: &str, team_color: i32) -> Self {
        let mut buf = [0u8; LABEL_LEN];
        let n = label.len().min(LABEL_LEN);
        buf[..n].copy_from_slice(&label.as_bytes()[..n]);
        Self {
            label: buf,
            team_color,
        }
    }

    /// Label up to the first NUL, lossily decoded.
    pub fn label_text(&self) -> String {
        let end = self
            .label
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(LABEL_LEN);
        String::from_utf8_lossy(&self.label[..end]).into_owned()
    }

    fn decode(entry: &[u8]) -> Self {
        let mut label = [0u8; LABEL_LEN];
        label.copy_from_slice(&entry[..LABEL_LEN]);
        let team_color = Fields::new(&entry[LABEL_LEN..]).i32();
        Self { label, team_color }
    }

    pub(crate) fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.label);
        put_i32(out, self.team_color);
    }
}

/// Borrowed view of a callsign list's entries, still in the input buffer.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CallsignList<'a> {
    entries: &'a [u8],
}

impl<'a> CallsignList<'a> {
    /// `entries` must hold whole [`CALLSIGN_LEN`] entries; a trailing partial
    /// entry is ignored.
    pub fn from_entries(entries: &'a [u8]) -> Self {
        let whole = entries.len() - entries.len() % CALLSIGN_LEN;
        Self {
            entries: &entries[..whole],
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len() / CALLSIGN_LEN
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = Callsign> + 'a {
        self.entries.chunks_exact(CALLSIGN_LEN).map(Callsign::decode)
    }

    pub fn raw(&self) -> &'a [u8] {
        self.entries
    }
}

/// Packs callsigns into the entry layout a [`CallsignList`] views.
pub fn pack_callsigns(callsigns: &[Callsign]) -> Vec<u8> {
    let mut out = Vec::with_capacity(callsigns.len() * CALLSIGN_LEN);
    for c in callsigns {
        c.encode(&mut out);
    }
    out
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum RecordBody<'a> {
    GenPosition(PositionData),
    MissilePosition(PositionData),
    FeaturePosition(FeaturePositionData),
    AircraftPosition {
        position: PositionData,
        radar_target: i32,
    },
    TracerStart(TracerData),
    StationarySfx(StationarySfxData),
    MovingSfx(MovingSfxData),
    Switch(SwitchData),
    Dof(DofData),
    ChaffPosition(PositionData),
    FlarePosition(PositionData),
    /// The header time is the offset itself.
    TodOffset,
    FeatureStatus(FeatureStatusData),
    CallsignList(CallsignList<'a>),
}

impl<'a> RecordBody<'a> {
    pub fn record_type(&self) -> RecordType {
        match self {
            RecordBody::GenPosition(_) => RecordType::GenPosition,
            RecordBody::MissilePosition(_) => RecordType::MissilePosition,
            RecordBody::FeaturePosition(_) => RecordType::FeaturePosition,
            RecordBody::AircraftPosition { .. } => RecordType::AircraftPosition,
            RecordBody::TracerStart(_) => RecordType::TracerStart,
            RecordBody::StationarySfx(_) => RecordType::StationarySfx,
            RecordBody::MovingSfx(_) => RecordType::MovingSfx,
            RecordBody::Switch(_) => RecordType::Switch,
            RecordBody::Dof(_) => RecordType::Dof,
            RecordBody::ChaffPosition(_) => RecordType::ChaffPosition,
            RecordBody::FlarePosition(_) => RecordType::FlarePosition,
            RecordBody::TodOffset => RecordType::TodOffset,
            RecordBody::FeatureStatus(_) => RecordType::FeatureStatus,
            RecordBody::CallsignList(_) => RecordType::CallsignList,
        }
    }

    /// The entity this record belongs to, if it is entity-scoped.
    pub fn entity_id(&self) -> Option<i32> {
        match self {
            RecordBody::GenPosition(p)
            | RecordBody::MissilePosition(p)
            | RecordBody::ChaffPosition(p)
            | RecordBody::FlarePosition(p)
            | RecordBody::AircraftPosition { position: p, .. } => Some(p.id),
            RecordBody::FeaturePosition(f) => Some(f.id),
            RecordBody::Switch(s) => Some(s.id),
            RecordBody::Dof(d) => Some(d.id),
            RecordBody::FeatureStatus(s) => Some(s.id),
            RecordBody::TracerStart(_)
            | RecordBody::StationarySfx(_)
            | RecordBody::MovingSfx(_)
            | RecordBody::TodOffset
            | RecordBody::CallsignList(_) => None,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Record<'a> {
    pub time: f32,
    pub body: RecordBody<'a>,
}

impl<'a> Record<'a> {
    pub fn new(time: f32, body: RecordBody<'a>) -> Self {
        Self { time, body }
    }

    pub fn record_type(&self) -> RecordType {
        self.body.record_type()
    }

    /// Total encoded size, header included.
    pub fn encoded_len(&self) -> usize {
        HEADER_LEN
            + match self.record_type().payload_len() {
                PayloadLen::Fixed(n) => n,
                PayloadLen::Counted { prefix, .. } => match &self.body {
                    RecordBody::CallsignList(list) => prefix + list.raw().len(),
                    _ => prefix,
                },
            }
    }

    /// Appends the FLT encoding of this record to `out`.
    pub fn encode(&self, out: &mut Vec<u8>) {
        put_u8(out, self.record_type().tag());
        put_f32(out, self.time);
        match &self.body {
            RecordBody::GenPosition(p)
            | RecordBody::MissilePosition(p)
            | RecordBody::ChaffPosition(p)
            | RecordBody::FlarePosition(p) => encode_position(p, out),
            RecordBody::AircraftPosition {
                position,
                radar_target,
            } => {
                encode_position(position, out);
                put_i32(out, *radar_target);
            }
            RecordBody::FeaturePosition(f) => {
                put_i32(out, f.base_type);
                put_i32(out, f.id);
                put_i32(out, f.lead_id);
                put_i32(out, f.slot);
                put_u32(out, f.special_flags);
                for v in [f.x, f.y, f.z, f.yaw, f.pitch, f.roll] {
                    put_f32(out, v);
                }
            }
            RecordBody::TracerStart(t) => {
                for v in [t.x, t.y, t.z, t.dx, t.dy, t.dz] {
                    put_f32(out, v);
                }
            }
            RecordBody::StationarySfx(s) => {
                put_i32(out, s.sfx_type);
                for v in [s.x, s.y, s.z, s.ttl, s.scale] {
                    put_f32(out, v);
                }
            }
            RecordBody::MovingSfx(m) => {
                put_i32(out, m.sfx_type);
                put_i32(out, m.user);
                put_u32(out, m.flags);
                for v in [m.x, m.y, m.z, m.dx, m.dy, m.dz, m.ttl, m.scale] {
                    put_f32(out, v);
                }
            }
            RecordBody::Switch(s) => {
                for v in [s.base_type, s.id, s.number, s.value, s.previous] {
                    put_i32(out, v);
                }
            }
            RecordBody::Dof(d) => {
                put_i32(out, d.base_type);
                put_i32(out, d.id);
                put_i32(out, d.number);
                put_f32(out, d.value);
                put_f32(out, d.previous);
            }
            RecordBody::TodOffset => {}
            RecordBody::FeatureStatus(s) => {
                put_i32(out, s.id);
                put_i32(out, s.new_status);
                put_i32(out, s.previous_status);
            }
            RecordBody::CallsignList(list) => {
                put_i32(out, list.len() as i32);
                out.extend_from_slice(list.raw());
            }
        }
    }
}

fn encode_position(p: &PositionData, out: &mut Vec<u8>) {
    put_i32(out, p.base_type);
    put_i32(out, p.id);
    for v in [p.x, p.y, p.z, p.yaw, p.pitch, p.roll] {
        put_f32(out, v);
    }
}

fn decode_position(f: &mut Fields<'_>) -> PositionData {
    PositionData {
        base_type: f.i32(),
        id: f.i32(),
        x: f.f32(),
        y: f.f32(),
        z: f.f32(),
        yaw: f.f32(),
        pitch: f.f32(),
        roll: f.f32(),
    }
}

/// Decodes a payload of exactly the length [`RecordType::payload_len`] asks
/// for. For counted payloads `payload` includes the count prefix.
pub(crate) fn decode_body(ty: RecordType, payload: &[u8]) -> RecordBody<'_> {
    let mut f = Fields::new(payload);
    match ty {
        RecordType::GenPosition => RecordBody::GenPosition(decode_position(&mut f)),
        RecordType::MissilePosition => RecordBody::MissilePosition(decode_position(&mut f)),
        RecordType::ChaffPosition => RecordBody::ChaffPosition(decode_position(&mut f)),
        RecordType::FlarePosition => RecordBody::FlarePosition(decode_position(&mut f)),
        RecordType::AircraftPosition => {
            let position = decode_position(&mut f);
            RecordBody::AircraftPosition {
                position,
                radar_target: f.i32(),
            }
        }
        RecordType::FeaturePosition => RecordBody::FeaturePosition(FeaturePositionData {
            base_type: f.i32(),
            id: f.i32(),
            lead_id: f.i32(),
            slot: f.i32(),
            special_flags: f.u32(),
            x: f.f32(),
            y: f.f32(),
            z: f.f32(),
            yaw: f.f32(),
            pitch: f.f32(),
            roll: f.f32(),
        }),
        RecordType::TracerStart => RecordBody::TracerStart(TracerData {
            x: f.f32(),
            y: f.f32(),
            z: f.f32(),
            dx: f.f32(),
            dy: f.f32(),
            dz: f.f32(),
        }),
        RecordType::StationarySfx => RecordBody::StationarySfx(StationarySfxData {
            sfx_type: f.i32(),
            x: f.f32(),
            y: f.f32(),
            z: f.f32(),
            ttl: f.f32(),
            scale: f.f32(),
        }),
        RecordType::MovingSfx => RecordBody::MovingSfx(MovingSfxData {
            sfx_type: f.i32(),
            user: f.i32(),
            flags: f.u32(),
            x: f.f32(),
            y: f.f32(),
            z: f.f32(),
            dx: f.f32(),
            dy: f.f32(),
            dz: f.f32(),
            ttl: f.f32(),
            scale: f.f32(),
        }),
        RecordType::Switch => RecordBody::Switch(SwitchData {
            base_type: f.i32(),
            id: f.i32(),
            number: f.i32(),
            value: f.i32(),
            previous: f.i32(),
        }),
        RecordType::Dof => RecordBody::Dof(DofData {
            base_type: f.i32(),
            id: f.i32(),
            number: f.i32(),
            value: f.f32(),
            previous: f.f32(),
        }),
        RecordType::TodOffset => RecordBody::TodOffset,
        RecordType::FeatureStatus => RecordBody::FeatureStatus(FeatureStatusData {
            id: f.i32(),
            new_status: f.i32(),
            previous_status: f.i32(),
        }),
        RecordType::CallsignList => {
            RecordBody::CallsignList(CallsignList::from_entries(&payload[4..]))
        }
    }
}
