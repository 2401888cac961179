//! The FLT side: record layouts and the stream reader.

pub mod catalog;
pub mod reader;

pub use catalog::{Callsign, CallsignList, Record, RecordBody, RecordType};
pub use reader::RecordReader;
