/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */
//! The closed set of entropy coder tags

use alloc::vec::Vec;
use core::fmt::{Display, Formatter};

use crate::stats::CompressionStats;

/// Identifies which coder wrote a byte stream
///
/// The variant discriminants are the wire tag bytes; the universe is closed
/// by the one-byte tag, which is why this is an enum and not an open trait.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum EntropyCodec {
    /// Identity coding, the payload follows the tag verbatim
    #[default]
    None      = 0x00,
    /// Run-length coding
    Rle       = 0x01,
    /// Sliding-window LZ77
    Lz77      = 0x02,
    /// Byte-delta pre-pass over LZ77
    DeltaLz77 = 0x03
}

impl EntropyCodec {
    /// The wire tag for this coder
    #[inline]
    pub const fn to_tag(self) -> u8 {
        self as u8
    }

    /// Map a wire tag back to a coder
    ///
    /// # Returns
    /// - `Some(codec)`: the tag names a known coder
    /// - `None`: the tag is outside the closed set; callers treat the
    ///   stream as untagged
    pub const fn from_tag(tag: u8) -> Option<EntropyCodec> {
        match tag {
            0x00 => Some(EntropyCodec::None),
            0x01 => Some(EntropyCodec::Rle),
            0x02 => Some(EntropyCodec::Lz77),
            0x03 => Some(EntropyCodec::DeltaLz77),
            _ => None
        }
    }
}

impl Display for EntropyCodec {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            EntropyCodec::None => write!(f, "none"),
            EntropyCodec::Rle => write!(f, "rle"),
            EntropyCodec::Lz77 => write!(f, "lz77"),
            EntropyCodec::DeltaLz77 => write!(f, "delta+lz77")
        }
    }
}

/// The identity coder, tag byte `0x00`
///
/// The payload follows the tag verbatim. Exists so untagged data and the
/// empty stream still travel through the shared framing.
#[derive(Default)]
pub struct NoneCodec {
    stats: CompressionStats
}

impl NoneCodec {
    pub fn new() -> NoneCodec {
        NoneCodec::default()
    }

    /// Statistics for the most recent [`encode`](Self::encode) call
    pub const fn stats(&self) -> CompressionStats {
        self.stats
    }

    /// Prefix `input` with the identity tag
    pub fn encode(&mut self, input: &[u8]) -> Vec<u8> {
        let mut output = Vec::with_capacity(input.len() + 1);
        output.push(EntropyCodec::None.to_tag());
        output.extend_from_slice(input);

        self.stats = CompressionStats::new(input.len(), output.len(), EntropyCodec::None);
        output
    }

    /// Strip the tag and return the payload
    pub fn decode(input: &[u8]) -> Vec<u8> {
        input.get(1..).unwrap_or_default().to_vec()
    }
}
