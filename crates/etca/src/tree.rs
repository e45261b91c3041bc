/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */
//! The adaptive tile tree
//!
//! The tree owns every tile, keyed by id, plus the id-to-address map. It is
//! populated either by [`build`](TileTree::build), which recursively splits
//! regions whose color variance crosses a threshold, or by the serializer
//! during decode.
//!
//! Ids are dense and allocated from a counter scoped to the tree instance,
//! so two trees built concurrently can never alias ids. The root is always
//! id 1 with the empty address.

use alloc::collections::BTreeMap;
use alloc::vec;
use alloc::vec::Vec;

use etca_core::buffer::PixelBuffer;
use etca_core::color::Rgb;
use log::warn;

use crate::address::TileAddress;
use crate::partition::{child_bounds, CHILDREN_PER_TILE};
use crate::tile::{Tile, TileId, NO_PARENT};
use crate::variance::should_subdivide;

/// The id every tree gives its root
pub const ROOT_ID: TileId = 1;

/// A partition tree over a `width × height` image
pub struct TileTree {
    width:     u32,
    height:    u32,
    max_depth: u8,
    next_id:   TileId,
    tiles:     BTreeMap<TileId, Tile>,
    addresses: BTreeMap<TileId, TileAddress>
}

impl TileTree {
    /// Create a tree holding only an unsubdivided root tile
    pub fn new(width: u32, height: u32) -> TileTree {
        let mut tree = TileTree {
            width,
            height,
            max_depth: 0,
            next_id: ROOT_ID,
            tiles: BTreeMap::new(),
            addresses: BTreeMap::new()
        };
        tree.reset();
        tree
    }

    fn reset(&mut self) {
        self.tiles.clear();
        self.addresses.clear();
        self.max_depth = 0;

        self.tiles.insert(ROOT_ID, Tile::new(ROOT_ID, 0, NO_PARENT));
        self.addresses.insert(ROOT_ID, TileAddress::root());
        self.next_id = ROOT_ID + 1;
    }

    /// Image dimensions this tree partitions, as `(width, height)`
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub const fn root_id(&self) -> TileId {
        ROOT_ID
    }

    /// Deepest depth any tile reached
    pub const fn max_depth(&self) -> u8 {
        self.max_depth
    }

    /// Total number of tiles, internal nodes included
    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Look up a tile by id
    pub fn tile(&self, id: TileId) -> Option<&Tile> {
        self.tiles.get(&id)
    }

    /// Look up a tile's address
    pub fn address(&self, id: TileId) -> Option<&TileAddress> {
        self.addresses.get(&id)
    }

    /// Look up a tile by its address
    pub fn tile_by_address(&self, address: &TileAddress) -> Option<&Tile> {
        self.addresses
            .iter()
            .find(|(_, addr)| *addr == address)
            .and_then(|(id, _)| self.tiles.get(id))
    }

    /// Ids of every tile, ascending; the order the serializer indexes
    pub fn all_tiles(&self) -> Vec<TileId> {
        self.tiles.keys().copied().collect()
    }

    /// Ids of every unsubdivided tile, ascending
    pub fn leaves(&self) -> Vec<TileId> {
        self.tiles
            .iter()
            .filter(|(_, tile)| tile.is_leaf())
            .map(|(id, _)| *id)
            .collect()
    }

    /// Build the tree for `image` with variance-driven subdivision
    ///
    /// Deterministic: the same image and parameters always produce the same
    /// tree, ids included. Building again discards any previous content.
    ///
    /// # Arguments
    /// - `image`: pixel data whose dimensions match the tree's
    /// - `variance_threshold`: normalized threshold in `[0, 1]`; a region
    ///   is split while its variance strictly exceeds this
    /// - `max_depth`: hard cap on the depth of the recursion
    pub fn build(&mut self, image: &PixelBuffer, variance_threshold: f64, max_depth: u8) {
        if image.dimensions() != (self.width, self.height) {
            warn!(
                "building a {}x{} tree from a {}x{} buffer",
                self.width,
                self.height,
                image.width(),
                image.height()
            );
        }
        self.reset();
        self.build_recursive(
            ROOT_ID,
            image,
            &TileAddress::root(),
            variance_threshold,
            0,
            max_depth
        );
    }

    fn build_recursive(
        &mut self, tile_id: TileId, region: &PixelBuffer, address: &TileAddress,
        variance_threshold: f64, depth: u8, max_depth: u8
    ) {
        if depth > self.max_depth {
            self.max_depth = depth;
        }

        let color = region.mean();
        if let Some(tile) = self.tiles.get_mut(&tile_id) {
            tile.set_color(color);
        }

        if depth >= max_depth || !should_subdivide(region, variance_threshold) {
            // leaf; the mean color above is what survives
            return;
        }

        let mut child_ids = [NO_PARENT; CHILDREN_PER_TILE];

        for slot in child_ids.iter_mut() {
            let child_id = self.next_id;
            self.next_id += 1;

            self.tiles
                .insert(child_id, Tile::new(child_id, depth + 1, tile_id));
            *slot = child_id;
        }

        if let Some(tile) = self.tiles.get_mut(&tile_id) {
            for &child_id in &child_ids {
                tile.add_child(child_id);
            }
        }

        for (index, &child_id) in child_ids.iter().enumerate() {
            let bounds = child_bounds(region.width(), region.height(), index as u32);
            let child_region = region.extract(bounds.x, bounds.y, bounds.width, bounds.height);
            let child_address = address.child(index as u32);

            self.addresses.insert(child_id, child_address.clone());
            self.build_recursive(
                child_id,
                &child_region,
                &child_address,
                variance_threshold,
                depth + 1,
                max_depth
            );
        }
    }

    /// Bulk-insert a tile parsed by the deserializer
    ///
    /// The address map receives a placeholder of `depth` zero segments;
    /// once all parent/child links are known the deserializer overwrites it
    /// through [`set_address`](Self::set_address).
    pub fn insert_deserialized(
        &mut self, id: TileId, depth: u8, parent_id: TileId, color: Rgb, children: Vec<TileId>
    ) {
        let mut tile = Tile::new(id, depth, parent_id);
        tile.set_color(color);

        for child_id in children {
            tile.add_child(child_id);
        }

        self.tiles.insert(id, tile);
        self.addresses
            .insert(id, TileAddress::from_segments(vec![0; usize::from(depth)]));

        if depth > self.max_depth {
            self.max_depth = depth;
        }
        self.next_id = self.next_id.max(id.saturating_add(1));
    }

    /// Overwrite the address recorded for `id`
    pub fn set_address(&mut self, id: TileId, address: TileAddress) {
        self.addresses.insert(id, address);
    }
}

#[cfg(test)]
mod tests {
    use etca_core::color::Rgb;

    use super::*;

    fn checker_2x2() -> PixelBuffer {
        let mut buf = PixelBuffer::new(2, 2);
        buf.set(0, 0, Rgb::BLACK);
        buf.set(1, 0, Rgb::new(255, 255, 255));
        buf.set(0, 1, Rgb::new(255, 255, 255));
        buf.set(1, 1, Rgb::BLACK);
        buf
    }

    #[test]
    fn uniform_image_stays_a_single_leaf() {
        let mut buf = PixelBuffer::new(4, 4);
        buf.fill(Rgb::new(128, 128, 128));

        let mut tree = TileTree::new(4, 4);
        tree.build(&buf, 0.1, 4);

        assert_eq!(tree.tile_count(), 1);
        assert_eq!(tree.leaves(), [ROOT_ID]);
        assert_eq!(tree.max_depth(), 0);
        assert_eq!(tree.tile(ROOT_ID).unwrap().color(), Rgb::new(128, 128, 128));
    }

    #[test]
    fn checker_splits_into_exact_pixels() {
        let buf = checker_2x2();
        let mut tree = TileTree::new(2, 2);
        tree.build(&buf, 0.1, 2);

        assert_eq!(tree.tile_count(), 5);
        assert_eq!(tree.max_depth(), 1);

        let root = tree.tile(ROOT_ID).unwrap();
        assert!(root.is_subdivided());
        assert_eq!(root.children(), [2, 3, 4, 5]);

        // leaves carry the input pixels, in child-index order
        let expected = [
            Rgb::BLACK,
            Rgb::new(255, 255, 255),
            Rgb::new(255, 255, 255),
            Rgb::BLACK
        ];
        for (child_id, want) in root.children().iter().zip(expected) {
            let child = tree.tile(*child_id).unwrap();
            assert!(child.is_leaf());
            assert_eq!(child.depth(), 1);
            assert_eq!(child.color(), want);
        }
    }

    #[test]
    fn zero_threshold_does_not_split_uniform_regions() {
        let mut buf = PixelBuffer::new(5, 5);
        buf.fill(Rgb::new(50, 100, 150));

        let mut tree = TileTree::new(5, 5);
        tree.build(&buf, 0.0, 3);

        assert_eq!(tree.tile_count(), 1);
    }

    #[test]
    fn depth_cap_stops_subdivision() {
        let buf = checker_2x2();
        let mut tree = TileTree::new(2, 2);
        tree.build(&buf, 0.1, 0);

        assert_eq!(tree.tile_count(), 1);
        assert!(tree.tile(ROOT_ID).unwrap().is_leaf());
    }

    #[test]
    fn addresses_follow_the_recursion() {
        let buf = checker_2x2();
        let mut tree = TileTree::new(2, 2);
        tree.build(&buf, 0.1, 2);

        assert!(tree.address(ROOT_ID).unwrap().is_root());

        for (index, child_id) in tree.tile(ROOT_ID).unwrap().children().iter().enumerate() {
            let address = tree.address(*child_id).unwrap();
            assert_eq!(address.segments(), [index as u32]);
            assert_eq!(tree.tile_by_address(address).unwrap().id(), *child_id);
        }
    }

    #[test]
    fn rebuilding_resets_ids() {
        let buf = checker_2x2();
        let mut tree = TileTree::new(2, 2);
        tree.build(&buf, 0.1, 2);
        tree.build(&buf, 0.1, 2);

        assert_eq!(tree.tile_count(), 5);
        assert_eq!(tree.all_tiles(), [1, 2, 3, 4, 5]);
    }
}
