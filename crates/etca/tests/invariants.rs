/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */
//! Structural invariants of built trees, checked over randomized images

use etca::partition::{child_bounds, locate};
use etca::serialize::{deserialize_tree, serialize_tree};
use etca::{Compressor, Decompressor, TileTree};
use etca_core::buffer::PixelBuffer;
use etca_core::color::Rgb;
use etca_core::options::{CompressorOptions, DecompressorOptions};
use nanorand::Rng;

fn random_image(width: u32, height: u32, seed: u64) -> PixelBuffer {
    let mut rng = nanorand::WyRand::new_seed(seed);
    let mut image = PixelBuffer::new(width, height);

    for y in 0..height {
        for x in 0..width {
            image.set(
                x,
                y,
                Rgb::new(rng.generate(), rng.generate(), rng.generate())
            );
        }
    }
    image
}

/// A blocky image: random 4x4 color patches, smooth inside, sharp between
fn blocky_image(width: u32, height: u32, seed: u64) -> PixelBuffer {
    let mut rng = nanorand::WyRand::new_seed(seed);
    let mut image = PixelBuffer::new(width, height);

    for by in 0..height.div_ceil(4) {
        for bx in 0..width.div_ceil(4) {
            let color = Rgb::new(rng.generate(), rng.generate(), rng.generate());
            for y in by * 4..((by + 1) * 4).min(height) {
                for x in bx * 4..((bx + 1) * 4).min(width) {
                    image.set(x, y, color);
                }
            }
        }
    }
    image
}

fn sample_trees() -> Vec<(PixelBuffer, TileTree)> {
    let mut out = Vec::new();

    for (image, threshold, max_depth) in [
        (random_image(16, 16, 1), 0.05, 6),
        (random_image(17, 13, 2), 0.1, 5),
        (blocky_image(32, 32, 3), 0.02, 8),
        (blocky_image(9, 21, 4), 0.0, 4),
        (random_image(1, 1, 5), 0.0, 3),
    ] {
        let (w, h) = image.dimensions();
        let mut tree = TileTree::new(w, h);
        tree.build(&image, threshold, max_depth);
        out.push((image, tree));
    }
    out
}

#[test]
fn leaf_rectangles_partition_the_image() {
    for (image, tree) in sample_trees() {
        let (width, height) = image.dimensions();
        let mut coverage = vec![0u8; (width * height) as usize];

        for leaf_id in tree.leaves() {
            let bounds = locate(width, height, tree.address(leaf_id).unwrap());

            for y in bounds.y..bounds.y + bounds.height {
                for x in bounds.x..bounds.x + bounds.width {
                    coverage[(y * width + x) as usize] += 1;
                }
            }
        }
        // exhaustive and disjoint: every pixel painted exactly once
        assert!(coverage.iter().all(|&count| count == 1));
    }
}

#[test]
fn addresses_recompose_through_the_partition_rule() {
    for (image, tree) in sample_trees() {
        let (width, height) = image.dimensions();

        for id in tree.all_tiles() {
            let tile = tree.tile(id).unwrap();
            let address = tree.address(id).unwrap();
            assert_eq!(address.depth(), usize::from(tile.depth()));

            if tile.parent_id() == 0 {
                continue;
            }
            // the child's located rect equals its parent's rect refined by
            // the child's last address segment
            let parent_rect = locate(width, height, tree.address(tile.parent_id()).unwrap());
            let child_rect = locate(width, height, address);
            let segment = *address.segments().last().unwrap();
            let relative = child_bounds(parent_rect.width, parent_rect.height, segment);

            assert_eq!(child_rect.x, parent_rect.x + relative.x);
            assert_eq!(child_rect.y, parent_rect.y + relative.y);
            assert_eq!(child_rect.width, relative.width);
            assert_eq!(child_rect.height, relative.height);
        }
    }
}

#[test]
fn internal_tiles_have_four_children_leaves_none() {
    for (_, tree) in sample_trees() {
        for id in tree.all_tiles() {
            let tile = tree.tile(id).unwrap();
            assert!(tile.children().len() == 0 || tile.children().len() == 4);

            // parent back-references agree with the child lists
            for (position, child_id) in tile.children().iter().enumerate() {
                let child = tree.tile(*child_id).unwrap();
                assert_eq!(child.parent_id(), id);
                assert_eq!(child.depth(), tile.depth() + 1);
                assert_eq!(
                    tree.address(*child_id).unwrap().segments().last(),
                    Some(&(position as u32))
                );
            }
        }
    }
}

#[test]
fn serializer_round_trips_random_trees() {
    for (image, tree) in sample_trees() {
        let (width, height) = image.dimensions();
        let bytes = serialize_tree(&tree).unwrap();
        let rebuilt = deserialize_tree(&bytes, width, height);

        assert_eq!(rebuilt.tile_count(), tree.tile_count());
        assert_eq!(rebuilt.max_depth(), tree.max_depth());

        for id in tree.all_tiles() {
            let original = tree.tile(id).unwrap();
            let restored = rebuilt.tile(id).unwrap();
            assert_eq!(original.depth(), restored.depth());
            assert_eq!(original.parent_id(), restored.parent_id());
            assert_eq!(original.color(), restored.color());
            assert_eq!(original.children(), restored.children());
            assert_eq!(tree.address(id), rebuilt.address(id));
        }
    }
}

#[test]
fn raising_the_threshold_never_adds_leaves() {
    let image = random_image(24, 24, 42);
    let mut previous = usize::MAX;

    for threshold in [0.0, 0.02, 0.05, 0.1, 0.2, 0.5, 1.0] {
        let mut tree = TileTree::new(24, 24);
        tree.build(&image, threshold, 6);
        let leaves = tree.leaves().len();

        assert!(leaves <= previous, "threshold {threshold} grew the tree");
        previous = leaves;
    }
}

#[test]
fn raising_the_depth_cap_never_removes_leaves() {
    let image = random_image(24, 24, 43);
    let mut previous = 0;

    for max_depth in 0..8 {
        let mut tree = TileTree::new(24, 24);
        tree.build(&image, 0.05, max_depth);
        let leaves = tree.leaves().len();

        assert!(leaves >= previous, "depth {max_depth} shrank the tree");
        previous = leaves;
    }
}

#[test]
fn leaf_colors_are_region_means() {
    for (image, tree) in sample_trees() {
        let (width, height) = image.dimensions();

        for leaf_id in tree.leaves() {
            let bounds = locate(width, height, tree.address(leaf_id).unwrap());
            let region = image.extract(bounds.x, bounds.y, bounds.width, bounds.height);

            assert_eq!(tree.tile(leaf_id).unwrap().color(), region.mean());
        }
    }
}

fn round_trip(image: &PixelBuffer, options: CompressorOptions) -> PixelBuffer {
    let compressed = Compressor::new(options).compress(image).unwrap();
    Decompressor::new(DecompressorOptions::default()).decompress(&compressed)
}

#[test]
fn zero_threshold_with_room_to_recurse_is_exact() {
    // with a zero threshold every non-uniform region splits, bottoming
    // out at uniform or single-pixel leaves, so reconstruction is exact
    let options = CompressorOptions::default()
        .set_variance_threshold(0.0)
        .set_max_depth(6);

    for seed in [7, 8] {
        let image = random_image(20, 20, seed);
        assert_eq!(round_trip(&image, options), image);
    }
}

#[test]
fn reencoding_a_decode_is_idempotent() {
    // the first pass quantizes each 8x8 quadrant of the gradient to its
    // mean; those four plateaus stay far enough apart that the second
    // pass rebuilds the identical partition
    let mut image = PixelBuffer::new(16, 16);
    for y in 0..16u32 {
        for x in 0..16u32 {
            let v = (16 * x + y) as u8;
            image.set(x, y, Rgb::new(v, v, v));
        }
    }

    let options = CompressorOptions::default()
        .set_variance_threshold(0.15)
        .set_max_depth(4);

    let once = round_trip(&image, options);
    assert_ne!(once, image);

    let twice = round_trip(&once, options);
    assert_eq!(once, twice);
}
