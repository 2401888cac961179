// crates/flt2vhs-core/src/io.rs

//! File-backed entry points: map the input, convert, write the output.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use log::debug;
use memmap2::Mmap;

use crate::convert::{convert_with_report, ConversionReport};
use crate::error::Result;

/// Runs `f` over the bytes of `path`, memory-mapped read-only.
///
/// The mapping lives only for the duration of the call. Empty files are
/// not mapped (zero-length maps are rejected by some platforms).
pub fn with_mapped<T>(path: &Path, f: impl FnOnce(&[u8]) -> Result<T>) -> Result<T> {
    let file = File::open(path)?;
    let len = file.metadata()?.len();
    if len == 0 {
        debug!("{} is empty", path.display());
        return f(&[]);
    }
    // SAFETY: the map is read-only and dropped before returning. FLT files
    // are finished by the time they are converted; a concurrent truncation
    // by another process would be a caller error.
    let map = unsafe { Mmap::map(&file)? };
    debug!("Mapped {} ({} bytes)", path.display(), map.len());
    f(&map)
}

/// Converts the FLT at `input` and writes the VHS to `output`.
pub fn convert_file(input: &Path, output: &Path) -> Result<ConversionReport> {
    let (bytes, report) = with_mapped(input, convert_with_report)?;
    let mut out = File::create(output)?;
    out.write_all(&bytes)?;
    out.flush()?;
    debug!("Wrote {} bytes to {}", bytes.len(), output.display());
    Ok(report)
}
