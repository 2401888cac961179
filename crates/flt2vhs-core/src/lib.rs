pub mod error;
pub mod wire;

pub mod flt;
pub mod model;
pub mod assemble;
pub mod vhs;
pub mod convert;
pub mod io;

pub use crate::assemble::{assemble, Timeline};
pub use crate::convert::{convert, convert_with_report, ConversionReport};
pub use crate::error::{ConversionError, Result};
pub use crate::model::FlightModel;
