// crates/flt2vhs-core/src/vhs/mod.rs

//! The VHS ("EPAT") tape format read by replay viewers.
//!
//! Layout (little-endian, packed), sections in file order:
//! ```text
//! header          80 bytes: magic "EPAT", offset/count table, start, total, tod
//! entities        36 bytes each  { uid kind kind_index flags lead slot special
//!                                  first_position first_event }
//! features        36 bytes each  (same row, flags = 2)
//! positions       41 bytes each  { time tag=0 x y z pitch roll yaw radar next prev }
//! entity events   41 bytes each  { time tag=1|2 number new prev [16 zero] next prev }
//! general events  65 bytes each  { type index start stop kind user flags scale
//!                                  x y z dx dy dz roll pitch yaw }
//! trailers         8 bytes each  { stop index } sorted by stop
//! feature events  16 bytes each  { time feature_index new prev }
//! callsigns       count:u32 then 20 bytes each { label[16] team_color }
//! ```
//! Position and event rows of one entity are contiguous and form a doubly
//! linked list through absolute `next`/`prev` offsets (0 ends the list).
//! The header's second word repeats the callsign offset rather than the file
//! length; viewers expect that.

pub mod decode;
pub mod encode;

pub use decode::{
    decode, Tape, TapeCallsign, TapeEntity, TapeEvent, TapeFeatureEvent, TapeGeneralEvent,
    TapeHeader, TapePosition, TapeTrailer,
};
pub use encode::{encode, encoded_len, Layout};

pub const MAGIC: &[u8; 4] = b"EPAT";

pub const HEADER_LEN: u32 = 80;
pub const ENTITY_ROW_LEN: u32 = 36;
pub const UPDATE_LEN: u32 = 41;
pub const GENERAL_EVENT_LEN: u32 = 65;
pub const TRAILER_LEN: u32 = 8;
pub const FEATURE_EVENT_LEN: u32 = 16;
pub const CALLSIGN_LEN: u32 = crate::flt::catalog::CALLSIGN_LEN as u32;

/// Union tags of a 41-byte update row.
pub const TAG_POSITION: u8 = 0;
pub const TAG_SWITCH: u8 = 1;
pub const TAG_DOF: u8 = 2;

/// Seconds a tracer stays on screen.
pub const TRACER_LIFETIME: f32 = 5.0;

/// Row index written where a referenced entity or feature is not in the file.
pub const NO_INDEX: i32 = -1;

/// 128-bit blake3 fingerprint of a VHS buffer as 32 hex digits.
pub fn content_id_hex(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex()[..32].to_owned()
}
