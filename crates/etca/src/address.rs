/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */
//! Hierarchical tile addresses
//!
//! A tile is located by the path of child indices walked from the root to
//! reach it; the root's address is the empty path. Addresses are what the
//! decompressor turns back into pixel rectangles, so they have to survive
//! serialization exactly.

use alloc::vec::Vec;
use core::fmt::{Display, Formatter};

/// A root-to-tile path of child indices
#[derive(Clone, Debug, Default, Eq, PartialEq, PartialOrd, Ord, Hash)]
pub struct TileAddress {
    segments: Vec<u32>
}

impl TileAddress {
    /// The root address, an empty path
    pub const fn root() -> TileAddress {
        TileAddress { segments: Vec::new() }
    }

    /// Build an address from an explicit path of child indices
    pub fn from_segments(segments: Vec<u32>) -> TileAddress {
        TileAddress { segments }
    }

    /// The child indices from root to tile, in walk order
    pub fn segments(&self) -> &[u32] {
        &self.segments
    }

    /// Number of segments, equal to the tile's depth
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// True for the empty root address
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// The address of this tile's child at `segment`
    pub fn child(&self, segment: u32) -> TileAddress {
        let mut segments = self.segments.clone();
        segments.push(segment);
        TileAddress { segments }
    }

    /// The address of this tile's parent; the root is its own parent
    pub fn parent(&self) -> TileAddress {
        let mut segments = self.segments.clone();
        segments.pop();
        TileAddress { segments }
    }

    /// True if `self` sits strictly below `ancestor` in the tree
    ///
    /// Descendance is strict prefix containment; an address is not its own
    /// descendant.
    pub fn is_descendant_of(&self, ancestor: &TileAddress) -> bool {
        ancestor.segments.len() < self.segments.len()
            && self.segments.starts_with(&ancestor.segments)
    }
}

impl Display for TileAddress {
    /// Renders as dot-separated segments, the root as a lone `.`
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        if self.segments.is_empty() {
            return write!(f, ".");
        }

        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use alloc::format;
    use alloc::vec;

    use super::*;

    #[test]
    fn child_and_parent_invert() {
        let root = TileAddress::root();
        let addr = root.child(2).child(0).child(3);

        assert_eq!(addr.segments(), &[2, 0, 3]);
        assert_eq!(addr.depth(), 3);
        assert_eq!(addr.parent().segments(), &[2, 0]);
        assert_eq!(root.parent(), root);
    }

    #[test]
    fn descendance_is_strict_prefix_containment() {
        let root = TileAddress::root();
        let child = root.child(1);
        let grandchild = child.child(3);

        assert!(child.is_descendant_of(&root));
        assert!(grandchild.is_descendant_of(&root));
        assert!(grandchild.is_descendant_of(&child));
        assert!(!child.is_descendant_of(&grandchild));
        assert!(!child.is_descendant_of(&child));
        // sibling paths do not contain each other
        assert!(!root.child(2).is_descendant_of(&child));
    }

    #[test]
    fn display_renders_dotted_path() {
        assert_eq!(format!("{}", TileAddress::root()), ".");
        assert_eq!(
            format!("{}", TileAddress::from_segments(vec![0, 3, 1])),
            "0.3.1"
        );
    }
}
