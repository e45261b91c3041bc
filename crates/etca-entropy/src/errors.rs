/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */
//! Errors possible when decoding a tagged entropy stream

use alloc::vec::Vec;
use core::fmt::{Debug, Formatter};

/// A struct returned when entropy decoding fails
///
/// Decoding is best-effort: the coder stops at the first anomaly and the
/// bytes recovered before it are carried in `data`, so lenient callers can
/// keep them and strict callers can discard them.
pub struct EntropyDecodeErrors {
    /// Reason why decoding stopped
    pub error: DecodeErrorStatus,
    /// Bytes successfully decoded before the anomaly
    pub data:  Vec<u8>
}

impl EntropyDecodeErrors {
    /// Create a new decode error wrapper carrying the bytes decoded
    /// before the failure
    pub fn new(error: DecodeErrorStatus, data: Vec<u8>) -> EntropyDecodeErrors {
        EntropyDecodeErrors { error, data }
    }

    /// Create a new decode error wrapper with no recovered bytes
    pub fn new_with_error(error: DecodeErrorStatus) -> EntropyDecodeErrors {
        EntropyDecodeErrors::new(error, Vec::new())
    }
}

impl Debug for EntropyDecodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        writeln!(f, "{:?}", self.error)
    }
}

pub enum DecodeErrorStatus {
    /// The stream ended inside an escape or record
    TruncatedRecord,
    /// The stream's tag byte does not match the coder asked to decode it
    ///
    /// The argument is the tag actually found.
    WrongTag(u8),
    /// A match record points further back than the bytes produced so far
    ///
    /// First argument is the requested distance, second the output
    /// length at that point.
    CorruptDistance(usize, usize),
    Generic(&'static str)
}

impl Debug for DecodeErrorStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::TruncatedRecord => writeln!(f, "Stream ended inside a record"),
            Self::WrongTag(tag) => writeln!(f, "Unexpected codec tag {tag:#04X}"),
            Self::CorruptDistance(distance, produced) => writeln!(
                f,
                "Match distance {distance} exceeds the {produced} bytes produced so far"
            ),
            Self::Generic(reason) => writeln!(f, "{reason}")
        }
    }
}

impl core::fmt::Display for EntropyDecodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for EntropyDecodeErrors {}
