/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use alloc::format;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt::{Debug, Formatter};

use etca_core::bytestream::{ByteIoError, ByteReader};
use etca_core::options::DecompressorOptions;
use log::trace;

/// Decoding errors that may occur
pub enum PPMDecodeErrors {
    Generic(String),
    GenericStatic(&'static str),
    /// There is a problem with the header of the ppm file
    InvalidHeader(String),
    /// The file is a PPM variant this library does not read
    UnsupportedImpl(String),
    /// The file has larger dimensions than the configured limit
    ///
    /// # Arguments
    /// - 1st argument is the configured limit
    /// - 2nd argument is the dimension found
    LargeDimensions(usize, usize),
    /// The pixel payload holds fewer bytes than the header promises
    InsufficientData(usize, usize),
    IoErrors(ByteIoError)
}

impl From<ByteIoError> for PPMDecodeErrors {
    fn from(value: ByteIoError) -> Self {
        PPMDecodeErrors::IoErrors(value)
    }
}

impl Debug for PPMDecodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Generic(val) => writeln!(f, "{val}"),
            Self::GenericStatic(val) => writeln!(f, "{val}"),
            Self::InvalidHeader(val) => {
                writeln!(f, "Invalid header, reason: {val}")
            }
            Self::UnsupportedImpl(val) => {
                writeln!(f, "Unsupported file, reason: {val}")
            }
            Self::LargeDimensions(expected, found) => {
                writeln!(
                    f,
                    "Too large dimensions, expected a value less than {expected} but found {found}"
                )
            }
            Self::InsufficientData(expected, found) => {
                writeln!(f, "Insufficient data, required {expected} but found {found}")
            }
            Self::IoErrors(err) => writeln!(f, "{:?}", err)
        }
    }
}

impl core::fmt::Display for PPMDecodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for PPMDecodeErrors {}

/// A binary PPM (P6) decoder
///
/// The decoder is initialized with the file's bytes; [`decode_headers`]
/// parses the text header, after which [`dimensions`] is live, and
/// [`decode`] returns the interleaved RGB payload.
///
/// [`decode_headers`]: PPMDecoder::decode_headers
/// [`dimensions`]: PPMDecoder::dimensions
/// [`decode`]: PPMDecoder::decode
pub struct PPMDecoder<'a> {
    width:           u32,
    height:          u32,
    decoded_headers: bool,
    stream:          ByteReader<'a>,
    options:         DecompressorOptions
}

impl<'a> PPMDecoder<'a> {
    /// Create a new ppm decoder with default limits
    ///
    /// # Example
    /// ```
    /// use etca_ppm::PPMDecoder;
    /// let mut decoder = PPMDecoder::new(b"NOT VALID PPM");
    ///
    /// assert!(decoder.decode().is_err());
    /// ```
    pub fn new(data: &'a [u8]) -> PPMDecoder<'a> {
        PPMDecoder::new_with_options(data, DecompressorOptions::default())
    }

    /// Create a decoder honoring the dimension limits in `options`
    pub fn new_with_options(data: &'a [u8], options: DecompressorOptions) -> PPMDecoder<'a> {
        PPMDecoder {
            width: 0,
            height: 0,
            decoded_headers: false,
            stream: ByteReader::new(data),
            options
        }
    }

    /// Parse the text header and store dimensions in the decoder
    ///
    /// # Returns
    /// - `Ok(())`: the file is a P6 this library reads
    /// - `Err`: why the header was rejected
    pub fn decode_headers(&mut self) -> Result<(), PPMDecodeErrors> {
        let magic = self.stream.get_fixed_bytes_or_err::<2>()?;

        if magic[0] != b'P' {
            let msg = format!("Expected P as first PPM byte but got '{}'", magic[0] as char);
            return Err(PPMDecodeErrors::InvalidHeader(msg));
        }
        if magic[1] != b'6' {
            let msg = format!(
                "Unsupported PPM version `{}`, only binary P6 is read",
                magic[1] as char
            );
            return Err(PPMDecodeErrors::UnsupportedImpl(msg));
        }

        let width = self.read_header_integer()?;
        let height = self.read_header_integer()?;

        if width as usize > self.options.max_width() {
            return Err(PPMDecodeErrors::LargeDimensions(
                self.options.max_width(),
                width as usize
            ));
        }
        if height as usize > self.options.max_height() {
            return Err(PPMDecodeErrors::LargeDimensions(
                self.options.max_height(),
                height as usize
            ));
        }
        if width == 0 || height == 0 {
            let msg = format!("Invalid PPM dimensions {width}x{height}");
            return Err(PPMDecodeErrors::InvalidHeader(msg));
        }

        let max_value = self.read_header_integer()?;
        if max_value != 255 {
            let msg = format!("PPM max color value must be 255, got {max_value}");
            return Err(PPMDecodeErrors::UnsupportedImpl(msg));
        }
        // exactly one whitespace byte separates the header from the payload
        self.stream.get_u8_err()?;

        self.width = width;
        self.height = height;
        self.decoded_headers = true;

        trace!("Image width: {:?}", self.width);
        trace!("Image height: {:?}", self.height);

        Ok(())
    }

    /// Skip whitespace and `#` comment lines, then read an ASCII integer
    fn read_header_integer(&mut self) -> Result<u32, PPMDecodeErrors> {
        loop {
            match self.stream.peek_at(0) {
                Some(byte) if byte.is_ascii_whitespace() => self.stream.skip(1),
                Some(b'#') => {
                    // comment runs to the end of the line
                    while let Some(byte) = self.stream.peek_at(0) {
                        self.stream.skip(1);
                        if byte == b'\n' {
                            break;
                        }
                    }
                }
                _ => break
            }
        }

        let mut value: u32 = 0;
        let mut digits = 0;

        while let Some(byte) = self.stream.peek_at(0) {
            if !byte.is_ascii_digit() {
                break;
            }
            value = value
                .wrapping_mul(10)
                .wrapping_add(u32::from(byte - b'0'));
            digits += 1;
            self.stream.skip(1);
        }

        if digits == 0 {
            return Err(PPMDecodeErrors::GenericStatic(
                "Expected an integer in the PPM header"
            ));
        }
        Ok(value)
    }

    /// Number of bytes a decoded frame occupies
    ///
    /// # Returns
    /// - `Some(size)`: width × height × 3
    /// - `None`: headers have not been decoded
    pub fn output_buffer_size(&self) -> Option<usize> {
        if self.decoded_headers {
            Some((self.width as usize) * (self.height as usize) * 3)
        } else {
            None
        }
    }

    /// Return the image dimensions, or `None` before header decoding
    pub const fn dimensions(&self) -> Option<(u32, u32)> {
        if self.decoded_headers {
            Some((self.width, self.height))
        } else {
            None
        }
    }

    /// Decode the pixel payload as interleaved `r g b` rows
    pub fn decode(&mut self) -> Result<Vec<u8>, PPMDecodeErrors> {
        if !self.decoded_headers {
            self.decode_headers()?;
        }
        let expected = self.output_buffer_size().unwrap();

        if self.stream.remaining() < expected {
            return Err(PPMDecodeErrors::InsufficientData(
                expected,
                self.stream.remaining()
            ));
        }

        let mut pixels = vec![0; expected];
        self.stream.read_exact_bytes(&mut pixels)?;

        Ok(pixels)
    }
}
