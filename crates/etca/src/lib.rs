/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */
//! Decoding and encoding the `.etca` tile-tree image format
//!
//! The codec partitions an image into a tree of rectangular tiles, splitting
//! a tile into four whenever the color variance inside it crosses a
//! threshold, and stores one mean color per leaf. The serialized tree is
//! then run through the adaptive entropy layer from `etca-entropy` and
//! wrapped in a small container with a fixed header and optional `key=value`
//! metadata.
//!
//! # Encoding an image
//! ```
//! use etca::EtcaEncoder;
//! use etca_core::buffer::PixelBuffer;
//! use etca_core::options::CompressorOptions;
//!
//! let image = PixelBuffer::new(32, 32);
//! let mut encoder = EtcaEncoder::new(&image, CompressorOptions::default());
//! let file = encoder.encode().unwrap();
//! assert_eq!(&file[..4], b"ETCA");
//! ```
//!
//! # Decoding a file
//! ```no_run
//! use etca::EtcaDecoder;
//!
//! let data = std::fs::read("image.etca").unwrap();
//! let mut decoder = EtcaDecoder::new(&data);
//! let pixels = decoder.decode().unwrap();
//! ```
//!
//! Decoding splits into a strict and a lenient half: the container layer
//! rejects bad magic, versions and dimensions, while the payload decoder
//! never fails, reconstructing as much of the image as the bytes support
//! and leaving the rest black.
extern crate alloc;

pub use etca_core;
pub use etca_entropy;

pub use crate::compressor::{CompressedImage, Compressor, TreeStats};
pub use crate::decompressor::{DecompressStats, Decompressor};
pub use crate::errors::{EtcaEncodeErrors, EtcaErrors};
pub use crate::format::{
    CompressionMode, EtcaDecoder, EtcaEncoder, EtcaHeader, EtcaMetadata, ETCA_MAGIC
};
pub use crate::tile::{Tile, TileId};
pub use crate::tree::{TileTree, ROOT_ID};

pub mod address;
mod compressor;
mod decompressor;
mod errors;
mod format;
pub mod partition;
pub mod serialize;
mod tile;
mod tree;
pub mod variance;
