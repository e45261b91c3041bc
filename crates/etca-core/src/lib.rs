/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */
//! Core routines shared by the etca codec crates
//!
//! This crate provides the small set of primitives every other crate in the
//! workspace builds on
//!
//! - A bytestream reader and writer with big-endian aware reads and writes
//! - An RGB color type and an owned pixel buffer with region extraction
//! - Compressor and decompressor options
//!
//! The library is `#[no_std]` with the `alloc` crate needed for `Vec`,
//! which backs the pixel buffer and the byte writer.
//!
//! # Features
//! - `std`: Implements `std::error::Error` for the error types (default)
#![cfg_attr(not(feature = "std"), no_std)]
extern crate alloc;

pub mod buffer;
pub mod bytestream;
pub mod color;
pub mod options;
