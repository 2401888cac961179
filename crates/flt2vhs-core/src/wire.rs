// crates/flt2vhs-core/src/wire.rs
//
// Little-endian primitives shared by the FLT catalog and the VHS codec.

use crate::error::{ConversionError, Result};

#[inline]
pub fn put_u8(out: &mut Vec<u8>, v: u8) {
    out.push(v);
}

#[inline]
pub fn put_u32(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_le_bytes());
}

#[inline]
pub fn put_i32(out: &mut Vec<u8>, v: i32) {
    out.extend_from_slice(&v.to_le_bytes());
}

#[inline]
pub fn put_f32(out: &mut Vec<u8>, v: f32) {
    out.extend_from_slice(&v.to_le_bytes());
}

/// Infallible field cursor over a payload whose length was checked up front.
pub(crate) struct Fields<'a> {
    bytes: &'a [u8],
    at: usize,
}

impl<'a> Fields<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, at: 0 }
    }

    #[inline]
    fn take4(&mut self) -> [u8; 4] {
        let b = &self.bytes[self.at..self.at + 4];
        self.at += 4;
        [b[0], b[1], b[2], b[3]]
    }

    #[inline]
    pub(crate) fn i32(&mut self) -> i32 {
        i32::from_le_bytes(self.take4())
    }

    #[inline]
    pub(crate) fn u32(&mut self) -> u32 {
        u32::from_le_bytes(self.take4())
    }

    #[inline]
    pub(crate) fn f32(&mut self) -> f32 {
        f32::from_le_bytes(self.take4())
    }
}

fn need(bytes: &[u8], i: usize, n: usize) -> Result<()> {
    if bytes.len() < i + n {
        return Err(ConversionError::VhsFormat(format!(
            "unexpected eof at {i} (wanted {n} bytes, {} total)",
            bytes.len()
        )));
    }
    Ok(())
}

pub fn read_u8(bytes: &[u8], i: &mut usize) -> Result<u8> {
    need(bytes, *i, 1)?;
    let v = bytes[*i];
    *i += 1;
    Ok(v)
}

fn read4(bytes: &[u8], i: &mut usize) -> Result<[u8; 4]> {
    need(bytes, *i, 4)?;
    let v = [bytes[*i], bytes[*i + 1], bytes[*i + 2], bytes[*i + 3]];
    *i += 4;
    Ok(v)
}

pub fn read_u32(bytes: &[u8], i: &mut usize) -> Result<u32> {
    read4(bytes, i).map(u32::from_le_bytes)
}

pub fn read_i32(bytes: &[u8], i: &mut usize) -> Result<i32> {
    read4(bytes, i).map(i32::from_le_bytes)
}

pub fn read_f32(bytes: &[u8], i: &mut usize) -> Result<f32> {
    read4(bytes, i).map(f32::from_le_bytes)
}

pub fn read_array<const N: usize>(bytes: &[u8], i: &mut usize) -> Result<[u8; N]> {
    need(bytes, *i, N)?;
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes[*i..*i + N]);
    *i += N;
    Ok(out)
}
