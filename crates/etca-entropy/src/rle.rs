/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */
//! Run-length coding with a reserved marker byte
//!
//! The wire grammar after the tag byte is
//!
//! - `b` for any literal `b != 0xFF`
//! - `FF FF` for a literal `0xFF`
//! - `FF v k` for a run of `k` copies of `v`
//!
//! Runs shorter than [`RLE_MIN_RUN`](crate::constants::RLE_MIN_RUN) are
//! cheaper as literals and stay literals; runs longer than 255 split into
//! consecutive records. A run of the marker byte itself is never emitted as
//! a record: `FF FF k` would be indistinguishable from an escaped literal
//! followed by a literal `k`, so marker bytes always travel as escape pairs.

use alloc::vec::Vec;

use crate::codec::EntropyCodec;
use crate::constants::{MARKER, RLE_MAX_RUN, RLE_MIN_RUN};
use crate::errors::{DecodeErrorStatus, EntropyDecodeErrors};
use crate::stats::CompressionStats;

/// The run-length coder, tag byte `0x01`
#[derive(Default)]
pub struct RleCodec {
    stats: CompressionStats
}

impl RleCodec {
    pub fn new() -> RleCodec {
        RleCodec::default()
    }

    /// Statistics for the most recent [`encode`](Self::encode) call
    pub const fn stats(&self) -> CompressionStats {
        self.stats
    }

    /// Encode `input` into a tagged run-length stream
    pub fn encode(&mut self, input: &[u8]) -> Vec<u8> {
        let mut output = Vec::with_capacity(input.len() / 2 + 16);
        output.push(EntropyCodec::Rle.to_tag());

        let mut i = 0;

        while i < input.len() {
            let current = input[i];
            let mut run = 1;

            while i + run < input.len() && input[i + run] == current && run < RLE_MAX_RUN {
                run += 1;
            }

            if current == MARKER {
                output.push(MARKER);
                output.push(MARKER);
                i += 1;
            } else if run >= RLE_MIN_RUN {
                output.push(MARKER);
                output.push(current);
                output.push(run as u8);
                i += run;
            } else {
                output.push(current);
                i += 1;
            }
        }
        self.stats = CompressionStats::new(input.len(), output.len(), EntropyCodec::Rle);

        output
    }

    /// Decode a tagged run-length stream
    ///
    /// # Returns
    /// - `Ok(bytes)`: the decoded payload
    /// - `Err(e)`: the stream was mis-tagged or ended inside a record;
    ///   `e.data` holds everything decoded before the anomaly
    pub fn decode(input: &[u8]) -> Result<Vec<u8>, EntropyDecodeErrors> {
        match input.first() {
            Some(&tag) if tag == EntropyCodec::Rle.to_tag() => {}
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
        let mut decoded = Vec::with_capacity(input.len() * 2);
        let mut i = 1;

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
            } else if i + 2 < input.len() {
                let value = input[i + 1];
                let count = usize::from(input[i + 2]);

                decoded.resize(decoded.len() + count, value);
                i += 3;
            } else {
                return Err(EntropyDecodeErrors::new(
                    DecodeErrorStatus::TruncatedRecord,
                    decoded
                ));
            }
        }

        Ok(decoded)
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    #[test]
    fn short_runs_stay_literal() {
        let mut codec = RleCodec::new();
        let encoded = codec.encode(b"aabbcc");
        assert_eq!(&encoded, b"\x01aabbcc");
        assert_eq!(RleCodec::decode(&encoded).unwrap(), b"aabbcc");
    }

    #[test]
    fn long_runs_become_records() {
        let input = [7u8; 300];
        let mut codec = RleCodec::new();
        let encoded = codec.encode(&input);
        // tag + two records, 255 + 45
        assert_eq!(encoded, vec![0x01, 0xFF, 7, 255, 0xFF, 7, 45]);
        assert_eq!(RleCodec::decode(&encoded).unwrap(), input);
    }

    #[test]
    fn marker_bytes_round_trip_as_escapes() {
        let input = [0xFFu8; 6];
        let mut codec = RleCodec::new();
        let encoded = codec.encode(&input);
        assert_eq!(encoded.len(), 1 + 2 * input.len());
        assert_eq!(RleCodec::decode(&encoded).unwrap(), input);
    }

    #[test]
    fn empty_input_is_just_the_tag() {
        let mut codec = RleCodec::new();
        let encoded = codec.encode(&[]);
        assert_eq!(encoded, vec![0x01]);
        assert_eq!(codec.stats().compressed_size, 1);
        assert!(RleCodec::decode(&encoded).unwrap().is_empty());
    }

    #[test]
    fn truncated_record_keeps_partial_output() {
        // tag, literal 'a', then a record cut off after the value byte
        let err = RleCodec::decode(&[0x01, b'a', 0xFF, 0x05]).unwrap_err();
        assert_eq!(err.data, b"a");
    }
}
