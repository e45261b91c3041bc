/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use crate::codec::EntropyCodec;

/// A record of what one encode call achieved
#[derive(Copy, Clone, Debug, Default)]
pub struct CompressionStats {
    /// Length of the input handed to the coder
    pub original_size:     usize,
    /// Length of the tagged output, tag byte included
    pub compressed_size:   usize,
    /// `original_size / compressed_size`, or 0 for empty input
    pub compression_ratio: f32,
    /// Which coder produced the output
    pub codec_used:        EntropyCodec
}

impl CompressionStats {
    /// Build the stats record for a finished encode
    pub(crate) fn new(
        original_size: usize, compressed_size: usize, codec_used: EntropyCodec
    ) -> CompressionStats {
        let compression_ratio = if original_size == 0 {
            0.0
        } else {
            original_size as f32 / compressed_size.max(1) as f32
        };

        CompressionStats {
            original_size,
            compressed_size,
            compression_ratio,
            codec_used
        }
    }
}
