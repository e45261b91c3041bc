/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */
//! Byte-stream entropy coders behind a one-byte self-describing tag
//!
//! Every stream this crate produces starts with a tag byte naming the coder
//! that wrote it, so a decoder can dispatch without out-of-band information:
//!
//! | Tag | Coder |
//! |-----|-------|
//! | `0x00` | identity, payload follows verbatim |
//! | `0x01` | run-length coding with an escaped `0xFF` marker |
//! | `0x02` | sliding-window LZ77 with marker framing |
//! | `0x03` | byte-delta pre-pass over the LZ77 coder |
//!
//! The usual entry point is the adaptive selector, which runs the eligible
//! coders and keeps whichever output is smallest:
//!
//! ```
//! use etca_entropy::AdaptiveEncoder;
//!
//! let data = b"aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
//! let mut encoder = AdaptiveEncoder::new(false);
//! let encoded = encoder.encode(data);
//! assert!(encoded.len() < data.len());
//! assert_eq!(AdaptiveEncoder::decode(&encoded), data);
//! ```
//!
//! Decoding is lenient by design: a truncated escape or match record stops
//! the decoder, and the bytes recovered up to that point are returned inside
//! the error. The adaptive decoder swallows such errors and hands back the
//! partial data, because the codec above it prefers a best-effort
//! reconstruction over a hard failure.
#![cfg_attr(not(feature = "std"), no_std)]
extern crate alloc;

pub use crate::adaptive::AdaptiveEncoder;
pub use crate::codec::{EntropyCodec, NoneCodec};
pub use crate::delta::DeltaLz77Codec;
pub use crate::lz77::Lz77Codec;
pub use crate::rle::RleCodec;
pub use crate::stats::CompressionStats;

mod adaptive;
mod codec;
mod constants;
mod delta;
pub mod errors;
mod lz77;
mod rle;
mod stats;
