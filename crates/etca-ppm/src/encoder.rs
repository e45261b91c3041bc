/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use alloc::format;
use alloc::vec::Vec;
use core::fmt::{Debug, Formatter};

use etca_core::bytestream::ByteWriter;

/// Errors occurring during encoding
pub enum PPMEncodeErrors {
    /// The pixel slice does not hold `width * height * 3` bytes
    WrongInputSize(usize, usize),
    ZeroDimensions(u32, u32)
}

impl Debug for PPMEncodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            PPMEncodeErrors::WrongInputSize(expected, found) => {
                writeln!(f, "Expected input of length {expected} but found {found}")
            }
            PPMEncodeErrors::ZeroDimensions(width, height) => {
                writeln!(f, "Cannot encode a {width}x{height} image")
            }
        }
    }
}

impl core::fmt::Display for PPMEncodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for PPMEncodeErrors {}

/// A binary PPM (P6) encoder over interleaved RGB bytes
///
/// # Example
/// ```
/// use etca_ppm::PPMEncoder;
///
/// let pixels = [0_u8; 2 * 2 * 3];
/// let bytes = PPMEncoder::new(&pixels, 2, 2).encode().unwrap();
/// assert!(bytes.starts_with(b"P6"));
/// ```
pub struct PPMEncoder<'a> {
    data:   &'a [u8],
    width:  u32,
    height: u32
}

impl<'a> PPMEncoder<'a> {
    /// Create a new encoder over `width * height * 3` interleaved bytes
    pub fn new(data: &'a [u8], width: u32, height: u32) -> PPMEncoder<'a> {
        PPMEncoder {
            data,
            width,
            height
        }
    }

    /// Write the header and payload into a fresh byte vector
    pub fn encode(&self) -> Result<Vec<u8>, PPMEncodeErrors> {
        if self.width == 0 || self.height == 0 {
            return Err(PPMEncodeErrors::ZeroDimensions(self.width, self.height));
        }

        let expected = (self.width as usize) * (self.height as usize) * 3;
        if self.data.len() != expected {
            return Err(PPMEncodeErrors::WrongInputSize(expected, self.data.len()));
        }

        let header = format!("P6\n{} {}\n255\n", self.width, self.height);
        let mut stream = ByteWriter::with_capacity(header.len() + expected);

        stream.write_all(header.as_bytes());
        stream.write_all(self.data);

        Ok(stream.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PPMDecoder;

    #[test]
    fn encode_then_decode_round_trips() {
        let pixels = [10, 20, 30, 40, 50, 60, 70, 80, 90, 100, 110, 120];
        let bytes = PPMEncoder::new(&pixels, 2, 2).encode().unwrap();

        let mut decoder = PPMDecoder::new(&bytes);
        assert_eq!(decoder.decode().unwrap(), pixels);
        assert_eq!(decoder.dimensions(), Some((2, 2)));
    }

    #[test]
    fn wrong_payload_size_is_rejected() {
        let pixels = [0_u8; 5];
        assert!(matches!(
            PPMEncoder::new(&pixels, 2, 2).encode(),
            Err(PPMEncodeErrors::WrongInputSize(12, 5))
        ));
    }
}
