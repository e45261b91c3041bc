/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */
//! The decompression pipeline: entropy-decode, rebuild the tree, rasterize
//!
//! Every stage here is lenient. Damaged entropy streams yield their decoded
//! prefix, damaged tree streams yield the tiles parsed so far, and whatever
//! tree results is painted onto a black canvas. The worst a corrupt payload
//! can do is leave parts of the image black.

use etca_core::buffer::PixelBuffer;
use etca_core::color::Rgb;
use etca_core::options::DecompressorOptions;
use etca_entropy::AdaptiveEncoder;
use log::trace;

use crate::compressor::CompressedImage;
use crate::partition::locate;
use crate::serialize::deserialize_tree;
use crate::tree::TileTree;

/// What the tree stage of the last decompression recovered
#[derive(Copy, Clone, Debug, Default)]
pub struct DecompressStats {
    /// Tiles recovered from the payload
    pub tile_count: usize,
    /// Leaves painted into the output
    pub leaf_count: usize,
    /// Deepest recovered tile
    pub max_depth:  u8
}

/// One-call decompression façade
pub struct Decompressor {
    options: DecompressorOptions,
    stats:   DecompressStats
}

impl Decompressor {
    /// Create a decompressor with the given options
    pub fn new(options: DecompressorOptions) -> Decompressor {
        Decompressor {
            options,
            stats: DecompressStats::default()
        }
    }

    /// Reconstruct the image a [`CompressedImage`] describes
    ///
    /// Never fails; see the module notes on leniency.
    pub fn decompress(&mut self, compressed: &CompressedImage) -> PixelBuffer {
        let serialized = AdaptiveEncoder::decode(&compressed.data);
        let tree = deserialize_tree(&serialized, compressed.width, compressed.height);

        self.stats = DecompressStats {
            tile_count: tree.tile_count(),
            leaf_count: tree.leaves().len(),
            max_depth:  tree.max_depth()
        };
        trace!(
            "recovered tree: {} tiles, {} leaves, depth {}",
            self.stats.tile_count,
            self.stats.leaf_count,
            self.stats.max_depth
        );

        let mut image = rasterize(&tree);

        if self.options.apply_interpolation() {
            apply_interpolation(&mut image);
        }
        image
    }

    /// Statistics from the most recent [`decompress`](Self::decompress)
    pub const fn stats(&self) -> DecompressStats {
        self.stats
    }
}

/// Paint every leaf's rectangle with its color
///
/// A leaf's rectangle comes from walking its address down from the root
/// rectangle; leaf rectangles partition the image, so paint order does not
/// matter.
fn rasterize(tree: &TileTree) -> PixelBuffer {
    let (width, height) = tree.dimensions();
    let mut image = PixelBuffer::new(width, height);

    for leaf_id in tree.leaves() {
        let Some(tile) = tree.tile(leaf_id) else {
            continue;
        };
        let Some(address) = tree.address(leaf_id) else {
            continue;
        };

        let bounds = locate(width, height, address);
        let color = tile.color();

        let end_x = (bounds.x + bounds.width).min(width);
        let end_y = (bounds.y + bounds.height).min(height);

        for y in bounds.y..end_y {
            for x in bounds.x..end_x {
                image.set(x, y, color);
            }
        }
    }
    image
}

/// 3×3 smoothing pass over tile boundaries
///
/// The center keeps half its weight, the rest is split across whichever of
/// the eight neighbors exist; the sum renormalizes at edges and corners.
/// Reads come from the unfiltered image, writes go to a copy that replaces
/// it.
fn apply_interpolation(image: &mut PixelBuffer) {
    const BLEND_STRENGTH: f32 = 0.5;
    const NEIGHBOR_WEIGHT: f32 = BLEND_STRENGTH / 8.0;

    const NEIGHBORS: [(i64, i64); 8] = [
        (-1, -1),
        (0, -1),
        (1, -1),
        (-1, 0),
        (1, 0),
        (-1, 1),
        (0, 1),
        (1, 1)
    ];

    let (width, height) = image.dimensions();
    let mut smoothed = image.clone();

    for y in 0..height {
        for x in 0..width {
            let center = image.get(x, y);

            let mut blend_r = f32::from(center.r) * (1.0 - BLEND_STRENGTH);
            let mut blend_g = f32::from(center.g) * (1.0 - BLEND_STRENGTH);
            let mut blend_b = f32::from(center.b) * (1.0 - BLEND_STRENGTH);
            let mut weight_sum = 1.0 - BLEND_STRENGTH;

            for (dx, dy) in NEIGHBORS {
                let nx = i64::from(x) + dx;
                let ny = i64::from(y) + dy;

                if nx >= 0 && nx < i64::from(width) && ny >= 0 && ny < i64::from(height) {
                    let neighbor = image.get(nx as u32, ny as u32);

                    blend_r += f32::from(neighbor.r) * NEIGHBOR_WEIGHT;
                    blend_g += f32::from(neighbor.g) * NEIGHBOR_WEIGHT;
                    blend_b += f32::from(neighbor.b) * NEIGHBOR_WEIGHT;
                    weight_sum += NEIGHBOR_WEIGHT;
                }
            }

            smoothed.set(
                x,
                y,
                Rgb::new(
                    (blend_r / weight_sum) as u8,
                    (blend_g / weight_sum) as u8,
                    (blend_b / weight_sum) as u8
                )
            );
        }
    }

    *image = smoothed;
}
