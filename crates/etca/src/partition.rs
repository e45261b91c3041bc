/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */
//! The deterministic 2×2 partition rule
//!
//! A parent rectangle splits into four children covering it exactly, with
//! no overlap. Odd dimensions give the extra pixel to the top/left half,
//! so a child may end up with zero width or height on narrow regions at
//! high depth; such children are representable and cover no pixels.

use crate::address::TileAddress;

/// Children a tile splits into
pub const CHILDREN_PER_TILE: usize = 4;

/// A half-open pixel region `[x, x + width) × [y, y + height)`
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Rect {
    pub x:      u32,
    pub y:      u32,
    pub width:  u32,
    pub height: u32
}

impl Rect {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Rect {
        Rect {
            x,
            y,
            width,
            height
        }
    }

    /// True if the rectangle covers no pixels
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// The child rectangle at `child_index`, relative to the parent's origin
///
/// Index 0 is top-left, 1 top-right, 2 bottom-left, 3 bottom-right.
/// Indices outside the partition arity map to an empty rectangle.
pub fn child_bounds(parent_width: u32, parent_height: u32, child_index: u32) -> Rect {
    // ceil halves; the extra pixel of an odd dimension lands top/left
    let left_width = parent_width.div_ceil(2);
    let right_width = parent_width - left_width;
    let top_height = parent_height.div_ceil(2);
    let bottom_height = parent_height - top_height;

    match child_index {
        0 => Rect::new(0, 0, left_width, top_height),
        1 => Rect::new(left_width, 0, right_width, top_height),
        2 => Rect::new(0, top_height, left_width, bottom_height),
        3 => Rect::new(left_width, top_height, right_width, bottom_height),
        _ => Rect::new(0, 0, 0, 0)
    }
}

/// Walk an address down from the root rectangle to the region it names
///
/// Applies [`child_bounds`] once per segment, accumulating offsets, which
/// is exactly how the build recursion carved the image up.
pub fn locate(root_width: u32, root_height: u32, address: &TileAddress) -> Rect {
    let mut region = Rect::new(0, 0, root_width, root_height);

    for &segment in address.segments() {
        let child = child_bounds(region.width, region.height, segment);

        region = Rect::new(
            region.x + child.x,
            region.y + child.y,
            child.width,
            child.height
        );
    }
    region
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn children_partition_the_parent() {
        for (w, h) in [(4, 4), (5, 5), (7, 3), (1, 1), (1, 6), (640, 480)] {
            let rects: [Rect; 4] =
                core::array::from_fn(|i| child_bounds(w, h, i as u32));

            // total area is preserved
            let area: u64 = rects
                .iter()
                .map(|r| u64::from(r.width) * u64::from(r.height))
                .sum();
            assert_eq!(area, u64::from(w) * u64::from(h), "area lost for {w}x{h}");

            // every pixel falls in exactly one child
            for px in 0..w {
                for py in 0..h {
                    let owners = rects
                        .iter()
                        .filter(|r| {
                            px >= r.x && px < r.x + r.width && py >= r.y && py < r.y + r.height
                        })
                        .count();
                    assert_eq!(owners, 1, "pixel ({px},{py}) of {w}x{h}");
                }
            }
        }
    }

    #[test]
    fn odd_dimensions_favor_top_left() {
        let top_left = child_bounds(5, 3, 0);
        assert_eq!(top_left, Rect::new(0, 0, 3, 2));

        let bottom_right = child_bounds(5, 3, 3);
        assert_eq!(bottom_right, Rect::new(3, 2, 2, 1));
    }

    #[test]
    fn narrow_regions_produce_empty_children() {
        // a 1-wide parent has no right half
        let right = child_bounds(1, 4, 1);
        assert!(right.is_empty());
        assert_eq!(right.x, 1);
    }

    #[test]
    fn locate_walks_nested_offsets() {
        use crate::address::TileAddress;

        let address = TileAddress::root().child(3).child(0);
        // 8x8 -> bottom-right 4x4 at (4,4) -> its top-left 2x2
        assert_eq!(locate(8, 8, &address), Rect::new(4, 4, 2, 2));

        assert_eq!(locate(8, 8, &TileAddress::root()), Rect::new(0, 0, 8, 8));
    }
}
