/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */
//! Byte-delta pre-pass over the LZ77 coder
//!
//! Slowly-varying data such as serialized tile colors turns into long runs
//! of small values under a first-difference transform, which the LZ77 stage
//! then picks up. The record stream is identical to the plain LZ77 framing;
//! only the leading tag byte differs, carrying `0x03` instead of `0x02`.

use alloc::vec::Vec;

use crate::codec::EntropyCodec;
use crate::errors::{DecodeErrorStatus, EntropyDecodeErrors};
use crate::lz77::Lz77Codec;
use crate::stats::CompressionStats;

fn delta_encode(input: &[u8]) -> Vec<u8> {
    let mut encoded = Vec::with_capacity(input.len());

    if let Some(&first) = input.first() {
        encoded.push(first);

        for pair in input.windows(2) {
            encoded.push(pair[1].wrapping_sub(pair[0]));
        }
    }
    encoded
}

fn delta_decode_in_place(deltas: &mut [u8]) {
    for i in 1..deltas.len() {
        deltas[i] = deltas[i - 1].wrapping_add(deltas[i]);
    }
}

/// The delta-prefixed sliding-window coder, tag byte `0x03`
#[derive(Default)]
pub struct DeltaLz77Codec {
    stats: CompressionStats
}

impl DeltaLz77Codec {
    pub fn new() -> DeltaLz77Codec {
        DeltaLz77Codec::default()
    }

    /// Statistics for the most recent [`encode`](Self::encode) call
    pub const fn stats(&self) -> CompressionStats {
        self.stats
    }

    /// Encode `input` as first differences, then LZ77
    pub fn encode(&mut self, input: &[u8]) -> Vec<u8> {
        let deltas = delta_encode(input);
        let output = Lz77Codec::new().encode_with_tag(&deltas, EntropyCodec::DeltaLz77);

        self.stats = CompressionStats::new(input.len(), output.len(), EntropyCodec::DeltaLz77);
        output
    }

    /// Decode a tagged delta+LZ77 stream
    ///
    /// # Returns
    /// - `Ok(bytes)`: the decoded payload
    /// - `Err(e)`: the anomaly that stopped the LZ77 stage; `e.data` holds
    ///   the partial payload with the delta transform already reversed
    pub fn decode(input: &[u8]) -> Result<Vec<u8>, EntropyDecodeErrors> {
        match input.first() {
            Some(&tag) if tag == EntropyCodec::DeltaLz77.to_tag() => {}
            Some(&tag) => {
                return Err(EntropyDecodeErrors::new_with_error(
                    DecodeErrorStatus::WrongTag(tag)
                ))
            }
            None => {
                return Err(EntropyDecodeErrors::new_with_error(
                    DecodeErrorStatus::TruncatedRecord
                ))
            }
        }

        match Lz77Codec::decode_records(&input[1..]) {
            Ok(mut deltas) => {
                delta_decode_in_place(&mut deltas);
                Ok(deltas)
            }
            Err(mut err) => {
                // the prefix that did decode is still meaningful once the
                // transform is undone
                delta_decode_in_place(&mut err.data);
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gradients_become_runs() {
        // a pure ramp differences into a constant stream
        let input: Vec<u8> = (0..=255).collect();
        let mut codec = DeltaLz77Codec::new();
        let encoded = codec.encode(&input);

        assert!(encoded.len() < input.len() / 4);
        assert_eq!(DeltaLz77Codec::decode(&encoded).unwrap(), input);
    }

    #[test]
    fn wrap_around_differences_round_trip() {
        let input = [250u8, 5, 250, 5, 250, 5, 250, 5, 250, 5];
        let mut codec = DeltaLz77Codec::new();
        let encoded = codec.encode(&input);
        assert_eq!(DeltaLz77Codec::decode(&encoded).unwrap(), input);
    }

    #[test]
    fn tag_byte_is_delta() {
        let encoded = DeltaLz77Codec::new().encode(b"hello");
        assert_eq!(encoded[0], 0x03);
    }

    #[test]
    fn empty_input_is_just_the_tag() {
        let mut codec = DeltaLz77Codec::new();
        let encoded = codec.encode(&[]);
        assert_eq!(encoded, [0x03]);
        assert!(DeltaLz77Codec::decode(&encoded).unwrap().is_empty());
    }
}
