/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use alloc::string::String;
/// Errors possible when reading or writing the container.
use core::fmt::{Debug, Display, Formatter};

use etca_core::bytestream::ByteIoError;

/// Possible errors that may occur during decoding
///
/// These all come from the strict container layer; the payload decoder
/// below it reconstructs best-effort and never fails.
pub enum EtcaErrors {
    /// The file does not start with the magic bytes `ETCA`
    WrongMagicBytes,
    /// The header names a format version this library does not read
    UnsupportedVersion(u8),
    /// The header declares a zero width or height
    ZeroDimensions(u32, u32),
    /// A declared dimension exceeds the configured decoder limit
    ///
    /// # Arguments
    /// - 1st argument is the configured limit
    /// - 2nd argument is the dimension actually declared
    TooLargeDimensions(usize, usize),
    /// The input ended before the fixed header was complete
    ///
    /// # Arguments
    /// - 1st argument is the number of bytes needed
    /// - 2nd argument is the number of bytes present
    TruncatedHeader(usize, usize),
    /// The header promised more metadata bytes than the input holds
    TruncatedMetadata(usize, usize),
    /// Generic message
    Generic(String),
    /// Generic message that does not need heap allocation
    GenericStatic(&'static str),
    IoErrors(ByteIoError)
}

impl Debug for EtcaErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            EtcaErrors::WrongMagicBytes => {
                writeln!(f, "Wrong magic bytes, expected `ETCA` as file start")
            }
            EtcaErrors::UnsupportedVersion(version) => {
                writeln!(f, "Unsupported format version {version}, this library reads version 1")
            }
            EtcaErrors::ZeroDimensions(width, height) => {
                writeln!(f, "Invalid image dimensions {width}x{height}")
            }
            EtcaErrors::TooLargeDimensions(limit, found) => {
                writeln!(
                    f,
                    "Declared dimension {found} greater than max configured dimension {limit}"
                )
            }
            EtcaErrors::TruncatedHeader(expected, found) => {
                writeln!(f, "Truncated header, required {expected} bytes but found {found}")
            }
            EtcaErrors::TruncatedMetadata(expected, found) => {
                writeln!(
                    f,
                    "Truncated metadata, header declared {expected} bytes but {found} remain"
                )
            }
            EtcaErrors::Generic(val) => {
                writeln!(f, "{val}")
            }
            EtcaErrors::GenericStatic(val) => {
                writeln!(f, "{val}")
            }
            EtcaErrors::IoErrors(value) => {
                writeln!(f, "I/O error {:?}", value)
            }
        }
    }
}

impl Display for EtcaErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        writeln!(f, "{:?}", self)
    }
}

impl From<&'static str> for EtcaErrors {
    fn from(r: &'static str) -> Self {
        Self::GenericStatic(r)
    }
}

impl From<ByteIoError> for EtcaErrors {
    fn from(value: ByteIoError) -> Self {
        EtcaErrors::IoErrors(value)
    }
}

/// Errors encountered during encoding
pub enum EtcaEncodeErrors {
    /// The built tree has more tiles than a 16-bit tile index can address
    ///
    /// The argument is the number of tiles the tree holds; the wire format
    /// can carry at most 65536.
    TooManyTiles(usize),
    /// A metadata key or value contains a byte the `key=value` line
    /// grammar reserves
    InvalidMetadata(&'static str),
    Generic(&'static str)
}

impl Debug for EtcaEncodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            EtcaEncodeErrors::TooManyTiles(found) => {
                writeln!(
                    f,
                    "Tree has {found} tiles, more than the 65536 the tile index can address; raise the variance threshold or lower the depth cap"
                )
            }
            EtcaEncodeErrors::InvalidMetadata(reason) => {
                writeln!(f, "{reason}")
            }
            EtcaEncodeErrors::Generic(val) => {
                writeln!(f, "{val}")
            }
        }
    }
}

impl Display for EtcaEncodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        writeln!(f, "{:?}", self)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for EtcaErrors {}

#[cfg(feature = "std")]
impl std::error::Error for EtcaEncodeErrors {}
