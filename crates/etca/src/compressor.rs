/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */
//! The compression pipeline: build the tree, serialize it, entropy-code it

use alloc::vec::Vec;

use etca_core::buffer::PixelBuffer;
use etca_core::options::CompressorOptions;
use etca_entropy::{AdaptiveEncoder, CompressionStats};
use log::trace;

use crate::errors::EtcaEncodeErrors;
use crate::serialize::serialize_tree;
use crate::tree::TileTree;

/// An entropy-coded tile tree plus the dimensions needed to re-rasterize it
#[derive(Clone, Debug)]
pub struct CompressedImage {
    pub width:  u32,
    pub height: u32,
    /// The options the image was compressed with
    pub options: CompressorOptions,
    /// The payload; the first byte is an entropy codec tag
    pub data:   Vec<u8>
}

/// What the tree stage of the last compression produced
#[derive(Copy, Clone, Debug, Default)]
pub struct TreeStats {
    /// Tiles in the tree, internal nodes included
    pub tile_count:      usize,
    /// Unsubdivided tiles, the ones that carry pixels
    pub leaf_count:      usize,
    /// Deepest level the recursion reached
    pub max_depth:       u8,
    /// Raw RGB size over a ~10-bytes-per-tile estimate, before entropy
    /// coding; the entropy stats hold the real ratio
    pub estimated_ratio: f64
}

/// One-call compression façade
///
/// ```
/// use etca::Compressor;
/// use etca_core::buffer::PixelBuffer;
/// use etca_core::options::CompressorOptions;
///
/// let image = PixelBuffer::new(16, 16);
/// let mut compressor = Compressor::new(CompressorOptions::default());
/// let compressed = compressor.compress(&image).unwrap();
/// assert_eq!(compressor.tree_stats().leaf_count, 1);
/// ```
pub struct Compressor {
    options:       CompressorOptions,
    tree_stats:    TreeStats,
    entropy_stats: CompressionStats
}

impl Compressor {
    /// Create a compressor with the given options
    pub fn new(options: CompressorOptions) -> Compressor {
        Compressor {
            options,
            tree_stats: TreeStats::default(),
            entropy_stats: CompressionStats::default()
        }
    }

    /// Compress `image` into an entropy-coded tile tree
    ///
    /// Deterministic: the same image and options always produce the same
    /// bytes.
    ///
    /// # Returns
    /// - `Ok(compressed)`: the coded payload with its dimensions
    /// - `Err`: the tree outgrew the serializer's 16-bit tile index
    pub fn compress(&mut self, image: &PixelBuffer) -> Result<CompressedImage, EtcaEncodeErrors> {
        let (width, height) = image.dimensions();

        let mut tree = TileTree::new(width, height);
        tree.build(
            image,
            self.options.variance_threshold(),
            self.options.max_depth()
        );

        let tile_count = tree.tile_count();
        let original_size = (width as usize) * (height as usize) * 3;

        self.tree_stats = TreeStats {
            tile_count,
            leaf_count: tree.leaves().len(),
            max_depth: tree.max_depth(),
            estimated_ratio: original_size as f64 / (tile_count * 10).max(1) as f64
        };
        trace!(
            "built tree: {} tiles, {} leaves, depth {}",
            self.tree_stats.tile_count,
            self.tree_stats.leaf_count,
            self.tree_stats.max_depth
        );

        let serialized = serialize_tree(&tree)?;

        let mut selector = AdaptiveEncoder::new(self.options.prefer_speed());
        let data = selector.encode(&serialized);
        self.entropy_stats = selector.stats();

        Ok(CompressedImage {
            width,
            height,
            options: self.options,
            data
        })
    }

    /// Tree statistics from the most recent [`compress`](Self::compress)
    pub const fn tree_stats(&self) -> TreeStats {
        self.tree_stats
    }

    /// Entropy statistics from the most recent [`compress`](Self::compress)
    pub const fn entropy_stats(&self) -> CompressionStats {
        self.entropy_stats
    }
}
