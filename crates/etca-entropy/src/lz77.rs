/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */
//! Sliding-window LZ77 with marker framing
//!
//! The wire grammar after the tag byte is
//!
//! - `b` for any literal `b != 0xFF`
//! - `FF FF` for a literal `0xFF`
//! - `FF len_hi len_lo dist_hi dist_lo` for a back-reference
//!
//! A match record is unambiguous against the escape because match lengths
//! are capped at 258, so `len_hi` is never `0xFF`.
//!
//! The matcher searches a 32 KiB window for the longest match of at least
//! three bytes; equal-length candidates resolve to the most recent one.
//! Matches may run past the cursor (`length > distance`), which the decoder
//! honors by copying forward one byte at a time.
//!
//! Candidates are found through a three-byte hash chain walked newest to
//! oldest, the structure every deflate-family matcher uses, rather than a
//! linear window scan. The chain preserves the most-recent-longest rule:
//! the first candidate to reach a given length wins ties, and the walk
//! stops early once no candidate can do better.

use alloc::vec;
use alloc::vec::Vec;

use crate::codec::EntropyCodec;
use crate::constants::{LZ_HASH_SIZE, LZ_MAX_MATCH, LZ_MIN_MATCH, LZ_WINDOW_SIZE, MARKER};
use crate::errors::{DecodeErrorStatus, EntropyDecodeErrors};
use crate::stats::CompressionStats;

/// Sentinel for an empty hash chain slot
const NO_POSITION: usize = usize::MAX;

#[inline(always)]
fn hash3(data: &[u8], pos: usize) -> usize {
    let triple = (u32::from(data[pos]) << 16)
        | (u32::from(data[pos + 1]) << 8)
        | u32::from(data[pos + 2]);

    (triple.wrapping_mul(2654435761) >> 17) as usize & (LZ_HASH_SIZE - 1)
}

/// Newest-first chains of previous positions sharing a three-byte prefix
struct MatchTable {
    head: Vec<usize>,
    prev: Vec<usize>
}

impl MatchTable {
    fn new(input_len: usize) -> MatchTable {
        MatchTable {
            head: vec![NO_POSITION; LZ_HASH_SIZE],
            prev: vec![NO_POSITION; input_len]
        }
    }

    /// Record `pos` as the newest occurrence of its three-byte prefix
    #[inline]
    fn insert(&mut self, data: &[u8], pos: usize) {
        if pos + LZ_MIN_MATCH > data.len() {
            return;
        }
        let slot = hash3(data, pos);
        self.prev[pos] = self.head[slot];
        self.head[slot] = pos;
    }

    /// Find the longest match for `pos`, most recent on ties
    ///
    /// Returns `(length, distance)`, or `(0, 0)` when nothing in the
    /// window reaches the minimum match length.
    fn find_match(&self, data: &[u8], pos: usize) -> (usize, usize) {
        if pos + LZ_MIN_MATCH > data.len() {
            return (0, 0);
        }
        let window_start = pos.saturating_sub(LZ_WINDOW_SIZE);
        let longest_possible = LZ_MAX_MATCH.min(data.len() - pos);

        let mut best_len = 0;
        let mut best_dist = 0;
        let mut candidate = self.head[hash3(data, pos)];

        while candidate != NO_POSITION && candidate >= window_start {
            let mut len = 0;

            // the candidate may overlap the cursor; compare against the
            // input directly, which is what the decoder will have produced
            while len < longest_possible && data[candidate + len] == data[pos + len] {
                len += 1;
            }

            if len > best_len {
                best_len = len;
                best_dist = pos - candidate;

                if best_len == longest_possible {
                    break;
                }
            }
            candidate = self.prev[candidate];
        }

        if best_len >= LZ_MIN_MATCH {
            (best_len, best_dist)
        } else {
            (0, 0)
        }
    }
}

/// The sliding-window coder, tag byte `0x02`
#[derive(Default)]
pub struct Lz77Codec {
    stats: CompressionStats
}

impl Lz77Codec {
    pub fn new() -> Lz77Codec {
        Lz77Codec::default()
    }

    /// Statistics for the most recent [`encode`](Self::encode) call
    pub const fn stats(&self) -> CompressionStats {
        self.stats
    }

    /// Encode `input` into a tagged LZ77 stream
    pub fn encode(&mut self, input: &[u8]) -> Vec<u8> {
        let output = self.encode_with_tag(input, EntropyCodec::Lz77);
        self.stats = CompressionStats::new(input.len(), output.len(), EntropyCodec::Lz77);
        output
    }

    /// Shared body for the plain and delta-prefixed framings; the two
    /// streams differ only in the leading tag byte
    pub(crate) fn encode_with_tag(&mut self, input: &[u8], codec: EntropyCodec) -> Vec<u8> {
        let mut output = Vec::with_capacity(input.len() / 2 + 16);
        output.push(codec.to_tag());

        if input.is_empty() {
            return output;
        }
        let mut table = MatchTable::new(input.len());
        let mut pos = 0;

        while pos < input.len() {
            let (match_len, distance) = table.find_match(input, pos);

            let advance = if match_len > 0 {
                output.push(MARKER);
                output.push((match_len >> 8) as u8);
                output.push((match_len & 0xFF) as u8);
                output.push((distance >> 8) as u8);
                output.push((distance & 0xFF) as u8);
                match_len
            } else {
                let literal = input[pos];

                if literal == MARKER {
                    output.push(MARKER);
                }
                output.push(literal);
                1
            };

            for covered in pos..pos + advance {
                table.insert(input, covered);
            }
            pos += advance;
        }
        output
    }

    /// Decode a tagged LZ77 stream
    ///
    /// # Returns
    /// - `Ok(bytes)`: the decoded payload
    /// - `Err(e)`: the stream was mis-tagged, ended inside a record, or a
    ///   match pointed before the start of the output; `e.data` holds
    ///   everything decoded before the anomaly
    pub fn decode(input: &[u8]) -> Result<Vec<u8>, EntropyDecodeErrors> {
        match input.first() {
            Some(&tag) if tag == EntropyCodec::Lz77.to_tag() => {}
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
        Self::decode_records(&input[1..])
    }

    /// Decode the record stream after the tag byte
    pub(crate) fn decode_records(input: &[u8]) -> Result<Vec<u8>, EntropyDecodeErrors> {
        let mut decoded = Vec::with_capacity(input.len() * 2);
        let mut i = 0;

        while i < input.len() {
            let byte = input[i];

            if byte != MARKER {
                decoded.push(byte);
                i += 1;
                continue;
            }

            if i + 1 >= input.len() {
                return Err(EntropyDecodeErrors::new(
                    DecodeErrorStatus::TruncatedRecord,
                    decoded
                ));
            }

            if input[i + 1] == MARKER {
                decoded.push(MARKER);
                i += 2;
                continue;
            }

            if i + 4 >= input.len() {
                return Err(EntropyDecodeErrors::new(
                    DecodeErrorStatus::TruncatedRecord,
                    decoded
                ));
            }
            let length = (usize::from(input[i + 1]) << 8) | usize::from(input[i + 2]);
            let distance = (usize::from(input[i + 3]) << 8) | usize::from(input[i + 4]);

            if distance == 0 || distance > decoded.len() {
                return Err(EntropyDecodeErrors::new(
                    DecodeErrorStatus::CorruptDistance(distance, decoded.len()),
                    decoded
                ));
            }
            // forward copy, byte by byte, so a match may overlap its own
            // output when length > distance
            let src = decoded.len() - distance;

            for k in 0..length {
                let value = decoded[src + k];
                decoded.push(value);
            }
            i += 5;
        }

        Ok(decoded)
    }
}
