/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */
//! Tree serialization to and from the compact indexed wire format
//!
//! All integers are big-endian. The stream opens with a 14-byte header
//!
//! ```text
//! width(4) | height(4) | tile_count(4) | max_depth(2)
//! ```
//!
//! followed by one record per tile, tiles enumerated in ascending-id order
//! and addressed by their dense position in that enumeration:
//!
//! ```text
//! index(2) | depth(1) | parent_index(2) | r(1) g(1) b(1) | child_count(1) | child_index(2)...
//! ```
//!
//! `0xFFFF` as a parent index marks the root. Ids themselves never hit the
//! wire; the decoder re-derives them as `index + 1`, which reproduces the
//! builder's allocation order.
//!
//! Deserialization is best-effort and never fails: a record cut short stops
//! the parse with the tiles assembled so far, and a header whose dimensions
//! disagree with the caller's yields an empty tree, which rasterizes to a
//! black image.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use etca_core::bytestream::{ByteReader, ByteWriter};
use etca_core::color::Rgb;
use log::warn;

use crate::address::TileAddress;
use crate::errors::EtcaEncodeErrors;
use crate::tile::{TileId, NO_PARENT};
use crate::tree::TileTree;

/// Bytes in the tree header
const TREE_HEADER_SIZE: usize = 14;

/// Fixed bytes in a tile record before its child indices
const TILE_RECORD_BASE_SIZE: usize = 9;

/// The parent index the root carries on the wire
const NO_PARENT_INDEX: u16 = 0xFFFF;

/// Most tiles a tree may hold and still be indexable by `u16`
const MAX_TILE_COUNT: usize = 65536;

/// Serialize a tree into the indexed wire format
///
/// # Returns
/// - `Ok(bytes)`: the serialized stream
/// - `Err`: the tree holds more tiles than the 16-bit index can address
pub fn serialize_tree(tree: &TileTree) -> Result<Vec<u8>, EtcaEncodeErrors> {
    let all_tiles = tree.all_tiles();

    if all_tiles.len() > MAX_TILE_COUNT {
        return Err(EtcaEncodeErrors::TooManyTiles(all_tiles.len()));
    }

    let (width, height) = tree.dimensions();
    let mut stream =
        ByteWriter::with_capacity(TREE_HEADER_SIZE + all_tiles.len() * (TILE_RECORD_BASE_SIZE + 8));

    stream.write_u32_be(width);
    stream.write_u32_be(height);
    stream.write_u32_be(all_tiles.len() as u32);
    stream.write_u16_be(u16::from(tree.max_depth()));

    let id_to_index: BTreeMap<TileId, u16> = all_tiles
        .iter()
        .enumerate()
        .map(|(index, id)| (*id, index as u16))
        .collect();

    for tile_id in &all_tiles {
        // every id in all_tiles resolves; the map and the enumeration are
        // the same collection
        let Some(tile) = tree.tile(*tile_id) else {
            continue;
        };

        stream.write_u16_be(id_to_index[tile_id]);
        stream.write_u8(tile.depth());

        let parent_index = match tile.parent_id() {
            NO_PARENT => NO_PARENT_INDEX,
            parent_id => id_to_index
                .get(&parent_id)
                .copied()
                .unwrap_or(NO_PARENT_INDEX)
        };
        stream.write_u16_be(parent_index);

        let color = tile.color();
        stream.write_u8(color.r);
        stream.write_u8(color.g);
        stream.write_u8(color.b);

        stream.write_u8(tile.children().len() as u8);
        for child_id in tile.children() {
            let child_index = id_to_index
                .get(child_id)
                .copied()
                .unwrap_or(NO_PARENT_INDEX);
            stream.write_u16_be(child_index);
        }
    }

    Ok(stream.into_inner())
}

/// Rebuild a tree from the indexed wire format
///
/// `width` and `height` are the dimensions the caller expects, normally
/// from the container header; a stream disagreeing with them produces an
/// empty tree rather than an error.
pub fn deserialize_tree(data: &[u8], width: u32, height: u32) -> TileTree {
    let mut tree = TileTree::new(width, height);

    if data.len() < TREE_HEADER_SIZE {
        return tree;
    }
    let mut stream = ByteReader::new(data);

    let stored_width = stream.get_u32_be();
    let stored_height = stream.get_u32_be();
    let tile_count = stream.get_u32_be();
    // max_depth is re-derived from the records
    stream.skip(2);

    if stored_width != width || stored_height != height {
        warn!(
            "tree stream is {stored_width}x{stored_height} but the container says {width}x{height}"
        );
        return tree;
    }

    // child id -> (parent id, position among the parent's children)
    let mut parent_links: BTreeMap<TileId, (TileId, u32)> = BTreeMap::new();
    let mut parsed = 0;

    while parsed < tile_count && stream.remaining() >= TILE_RECORD_BASE_SIZE {
        let tile_index = stream.get_u16_be();
        let tile_id = TileId::from(tile_index) + 1;

        let depth = stream.get_u8();
        let parent_index = stream.get_u16_be();
        let parent_id = match parent_index {
            NO_PARENT_INDEX => NO_PARENT,
            index => TileId::from(index) + 1
        };

        let r = stream.get_u8();
        let g = stream.get_u8();
        let b = stream.get_u8();

        let child_count = usize::from(stream.get_u8());

        if stream.remaining() < child_count * 2 {
            // record cut short; keep what was assembled so far
            break;
        }

        let mut children = Vec::with_capacity(child_count);
        for position in 0..child_count {
            let child_index = stream.get_u16_be();
            let child_id = match child_index {
                NO_PARENT_INDEX => NO_PARENT,
                index => TileId::from(index) + 1
            };

            children.push(child_id);
            parent_links.insert(child_id, (tile_id, position as u32));
        }

        tree.insert_deserialized(tile_id, depth, parent_id, Rgb::new(r, g, b), children);
        parsed += 1;
    }

    rebuild_addresses(&mut tree, &parent_links);

    tree
}

/// Recover every tile's address by walking its parent links to the root
/// and reversing the collected child positions
fn rebuild_addresses(tree: &mut TileTree, parent_links: &BTreeMap<TileId, (TileId, u32)>) {
    'tiles: for &tile_id in parent_links.keys() {
        let mut path = Vec::new();
        let mut current = tile_id;

        while let Some(&(parent_id, position)) = parent_links.get(&current) {
            // a corrupt stream can link tiles into a cycle; the path of a
            // well-formed tile is never longer than the link map
            if path.len() > parent_links.len() {
                warn!("parent links of tile {tile_id} form a cycle, keeping placeholder address");
                continue 'tiles;
            }
            path.push(position);
            current = parent_id;
        }
        path.reverse();

        tree.set_address(tile_id, TileAddress::from_segments(path));
    }
}

#[cfg(test)]
mod tests {
    use etca_core::buffer::PixelBuffer;

    use super::*;
    use crate::tree::ROOT_ID;

    fn build_sample_tree() -> TileTree {
        let mut image = PixelBuffer::new(4, 4);
        for y in 0..4 {
            for x in 0..4 {
                image.set(x, y, Rgb::new((x * 60) as u8, (y * 60) as u8, 128));
            }
        }

        let mut tree = TileTree::new(4, 4);
        tree.build(&image, 0.05, 3);
        assert!(tree.tile_count() > 1, "sample tree should subdivide");
        tree
    }

    #[test]
    fn single_leaf_stream_layout() {
        let mut image = PixelBuffer::new(4, 4);
        image.fill(Rgb::new(128, 128, 128));

        let mut tree = TileTree::new(4, 4);
        tree.build(&image, 0.1, 4);

        let bytes = serialize_tree(&tree).unwrap();
        // header + one childless record
        assert_eq!(bytes.len(), 14 + 9);

        let mut stream = ByteReader::new(&bytes);
        assert_eq!(stream.get_u32_be(), 4);
        assert_eq!(stream.get_u32_be(), 4);
        assert_eq!(stream.get_u32_be(), 1);
        assert_eq!(stream.get_u16_be(), 0);

        assert_eq!(stream.get_u16_be(), 0); // self index
        assert_eq!(stream.get_u8(), 0); // depth
        assert_eq!(stream.get_u16_be(), NO_PARENT_INDEX);
        assert_eq!(
            [stream.get_u8(), stream.get_u8(), stream.get_u8()],
            [128, 128, 128]
        );
        assert_eq!(stream.get_u8(), 0); // child count
        assert!(stream.eof());
    }

    #[test]
    fn round_trip_preserves_structure_colors_and_addresses() {
        let tree = build_sample_tree();
        let bytes = serialize_tree(&tree).unwrap();
        let rebuilt = deserialize_tree(&bytes, 4, 4);

        assert_eq!(rebuilt.tile_count(), tree.tile_count());
        assert_eq!(rebuilt.max_depth(), tree.max_depth());
        assert_eq!(rebuilt.all_tiles(), tree.all_tiles());
        assert_eq!(rebuilt.leaves(), tree.leaves());

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

    #[test]
    fn dimension_mismatch_yields_an_empty_tree() {
        let tree = build_sample_tree();
        let bytes = serialize_tree(&tree).unwrap();

        let rebuilt = deserialize_tree(&bytes, 8, 8);
        assert_eq!(rebuilt.tile_count(), 1);
        assert!(rebuilt.tile(ROOT_ID).unwrap().is_leaf());
    }

    #[test]
    fn truncated_records_keep_the_parsed_prefix() {
        let tree = build_sample_tree();
        let bytes = serialize_tree(&tree).unwrap();

        // cut inside the second record
        let cut = &bytes[..TREE_HEADER_SIZE + 17 + 4];
        let rebuilt = deserialize_tree(cut, 4, 4);

        assert!(rebuilt.tile_count() >= 1);
        assert!(rebuilt.tile_count() < tree.tile_count());
    }

    #[test]
    fn garbage_shorter_than_the_header_is_ignored() {
        let rebuilt = deserialize_tree(&[1, 2, 3], 4, 4);
        assert_eq!(rebuilt.tile_count(), 1);
    }

    #[test]
    fn cyclic_parent_links_keep_placeholder_addresses() {
        // two records naming each other as parent and child; no encoder
        // emits this, a corrupt stream can
        let mut stream = ByteWriter::new();
        stream.write_u32_be(4); // width
        stream.write_u32_be(4); // height
        stream.write_u32_be(2); // tile count
        stream.write_u16_be(1); // max depth

        for (index, other) in [(0u16, 1u16), (1, 0)] {
            stream.write_u16_be(index);
            stream.write_u8(1); // depth
            stream.write_u16_be(other); // parent
            stream.write_u8(10);
            stream.write_u8(20);
            stream.write_u8(30);
            stream.write_u8(1); // child count
            stream.write_u16_be(other);
        }

        // the address walk must terminate instead of chasing the cycle,
        // leaving both tiles on their depth-many-zeros placeholder addresses
        let rebuilt = deserialize_tree(&stream.into_inner(), 4, 4);

        assert_eq!(rebuilt.tile_count(), 2);
        for id in [1, 2] {
            assert_eq!(rebuilt.address(id).unwrap().segments(), [0]);
        }
    }
}
