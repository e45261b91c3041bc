/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */
//! Best-of-N selection over the tagged coders

use alloc::vec;
use alloc::vec::Vec;

use log::{trace, warn};

use crate::codec::{EntropyCodec, NoneCodec};
use crate::delta::DeltaLz77Codec;
use crate::errors::EntropyDecodeErrors;
use crate::lz77::Lz77Codec;
use crate::rle::RleCodec;
use crate::stats::CompressionStats;

/// Runs the eligible coders over an input and keeps the smallest output
///
/// RLE always runs; the LZ77 and delta+LZ77 coders only run when the
/// selector was not asked to prefer speed. Size ties resolve to the coder
/// with the lowest tag. The winning stream, tag included, is returned and
/// the selection is recorded in [`stats`](Self::stats).
pub struct AdaptiveEncoder {
    prefer_speed: bool,
    stats:        CompressionStats
}

impl AdaptiveEncoder {
    /// Create a selector
    ///
    /// # Arguments
    /// - `prefer_speed`: when true only the cheap run-length coder is tried
    pub fn new(prefer_speed: bool) -> AdaptiveEncoder {
        AdaptiveEncoder {
            prefer_speed,
            stats: CompressionStats::default()
        }
    }

    /// Statistics for the most recent [`encode`](Self::encode) call
    pub const fn stats(&self) -> CompressionStats {
        self.stats
    }

    /// Encode `input` with every eligible coder and return the smallest
    /// tagged stream
    pub fn encode(&mut self, input: &[u8]) -> Vec<u8> {
        if input.is_empty() {
            self.stats = CompressionStats {
                original_size:     0,
                compressed_size:   1,
                compression_ratio: 0.0,
                codec_used:        EntropyCodec::None
            };
            return vec![EntropyCodec::None.to_tag()];
        }

        let mut rle = RleCodec::new();
        let mut best = rle.encode(input);
        let mut best_stats = rle.stats();

        if !self.prefer_speed {
            let mut lz77 = Lz77Codec::new();
            let candidate = lz77.encode(input);

            if candidate.len() < best.len() {
                best = candidate;
                best_stats = lz77.stats();
            }

            let mut delta = DeltaLz77Codec::new();
            let candidate = delta.encode(input);

            if candidate.len() < best.len() {
                best = candidate;
                best_stats = delta.stats();
            }
        }

        trace!(
            "entropy selector chose {} ({} -> {} bytes)",
            best_stats.codec_used,
            best_stats.original_size,
            best_stats.compressed_size
        );
        self.stats = best_stats;

        best
    }

    /// Decode a tagged stream, dispatching on its leading tag byte
    ///
    /// This is deliberately lenient. A stream carrying an unknown tag is
    /// treated as untagged identity data, and a stream that stops inside a
    /// record yields whatever decoded before the anomaly.
    pub fn decode(input: &[u8]) -> Vec<u8> {
        let Some(&tag) = input.first() else {
            return Vec::new();
        };

        let result = match EntropyCodec::from_tag(tag) {
            Some(EntropyCodec::None) | None => return NoneCodec::decode(input),
            Some(EntropyCodec::Rle) => RleCodec::decode(input),
            Some(EntropyCodec::Lz77) => Lz77Codec::decode(input),
            Some(EntropyCodec::DeltaLz77) => DeltaLz77Codec::decode(input)
        };

        result.unwrap_or_else(|e: EntropyDecodeErrors| {
            warn!("entropy stream stopped early: {:?}", e.error);
            e.data
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_is_identity() {
        let input = b"the quick brown fox jumps over the lazy dog";
        let mut encoder = AdaptiveEncoder::new(false);
        let encoded = encoder.encode(input);
        assert_eq!(AdaptiveEncoder::decode(&encoded), input);
    }

    #[test]
    fn prefer_speed_always_picks_rle() {
        let input: Vec<u8> = (0..=255).cycle().take(1024).collect();
        let mut encoder = AdaptiveEncoder::new(true);
        let encoded = encoder.encode(&input);

        assert_eq!(encoded[0], EntropyCodec::Rle.to_tag());
        assert_eq!(AdaptiveEncoder::decode(&encoded), input);
    }

    #[test]
    fn repetitive_input_beats_rle_with_lz77() {
        let input: Vec<u8> = (0..=255).cycle().take(4096).collect();
        let mut encoder = AdaptiveEncoder::new(false);
        let encoded = encoder.encode(&input);

        assert_ne!(encoded[0], EntropyCodec::Rle.to_tag());
        assert!(encoded.len() < input.len());
        assert_eq!(AdaptiveEncoder::decode(&encoded), input);
    }

    #[test]
    fn empty_input_yields_a_lone_tag() {
        let mut encoder = AdaptiveEncoder::new(false);
        let encoded = encoder.encode(&[]);

        assert_eq!(encoded, [EntropyCodec::None.to_tag()]);
        assert_eq!(encoder.stats().compressed_size, 1);
        assert_eq!(encoder.stats().compression_ratio, 0.0);
        assert!(AdaptiveEncoder::decode(&encoded).is_empty());
    }

    #[test]
    fn unknown_tags_decode_as_untagged() {
        let stream = [0x7E, 1, 2, 3];
        assert_eq!(AdaptiveEncoder::decode(&stream), [1, 2, 3]);
    }
}
