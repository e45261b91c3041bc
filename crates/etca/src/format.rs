/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */
//! The `.etca` container: fixed header, optional metadata, coded payload
//!
//! The layout is bit-exact and must stay compatible with existing files:
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0      | 4    | Magic `ETCA` |
//! | 4      | 1    | Format version, 0x01 |
//! | 5      | 1    | Mode: 0x00 lossy, 0x01 lossless |
//! | 6      | 4    | Width, big-endian |
//! | 10     | 4    | Height, big-endian |
//! | 14     | 1    | Color depth, 0x18 |
//! | 15     | 4    | Metadata byte length, big-endian |
//! | 19     | 1    | Reserved, 0x00 |
//!
//! Metadata, when present, is a UTF-8 block of `key=value` lines. The
//! container layer is the strict half of the decoder: magic, version and
//! dimension checks error out here, everything past the header decodes
//! best-effort.

use alloc::borrow::ToOwned;
use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use etca_core::buffer::PixelBuffer;
use etca_core::bytestream::{ByteReader, ByteWriter};
use etca_core::options::{CompressorOptions, DecompressorOptions};
use etca_entropy::CompressionStats;
use log::trace;

use crate::compressor::{CompressedImage, Compressor, TreeStats};
use crate::decompressor::Decompressor;
use crate::errors::{EtcaEncodeErrors, EtcaErrors};

/// The four bytes every `.etca` file starts with
pub const ETCA_MAGIC: [u8; 4] = *b"ETCA";

/// The only format version this library reads and writes
pub const ETCA_VERSION: u8 = 0x01;

/// The only color depth the format carries, 24-bit RGB
pub const COLOR_DEPTH_RGB24: u8 = 24;

/// Bytes in the fixed container header
pub const HEADER_SIZE: usize = 20;

/// The mode byte at offset 5
///
/// Lossless only selects a more aggressive threshold/depth preset; leaves
/// are still quantized to a mean color, so it is not a bit-exactness
/// guarantee.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CompressionMode {
    Lossy,
    Lossless
}

impl CompressionMode {
    pub const fn to_u8(self) -> u8 {
        match self {
            CompressionMode::Lossy => 0x00,
            CompressionMode::Lossless => 0x01
        }
    }

    /// Any byte other than 0x01 reads as lossy; the mode only picks
    /// encoder presets, so there is nothing to reject
    pub const fn from_u8(value: u8) -> CompressionMode {
        match value {
            0x01 => CompressionMode::Lossless,
            _ => CompressionMode::Lossy
        }
    }
}

/// The parsed fixed header of a `.etca` file
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct EtcaHeader {
    pub version:       u8,
    pub mode:          CompressionMode,
    pub width:         u32,
    pub height:        u32,
    pub color_depth:   u8,
    pub metadata_size: u32
}

impl EtcaHeader {
    /// Serialize into the fixed 20-byte layout
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut data = [0; HEADER_SIZE];

        data[0..4].copy_from_slice(&ETCA_MAGIC);
        data[4] = self.version;
        data[5] = self.mode.to_u8();
        data[6..10].copy_from_slice(&self.width.to_be_bytes());
        data[10..14].copy_from_slice(&self.height.to_be_bytes());
        data[14] = self.color_depth;
        data[15..19].copy_from_slice(&self.metadata_size.to_be_bytes());
        // data[19] reserved, already zero

        data
    }

    /// Parse and validate the fixed header
    ///
    /// # Returns
    /// - `Ok(header)`: magic, version and dimensions all check out
    /// - `Err`: the reason the file was rejected; see [`EtcaErrors`]
    pub fn from_bytes(data: &[u8]) -> Result<EtcaHeader, EtcaErrors> {
        if data.len() < HEADER_SIZE {
            return Err(EtcaErrors::TruncatedHeader(HEADER_SIZE, data.len()));
        }
        let mut stream = ByteReader::new(data);

        let magic = stream.get_fixed_bytes_or_err::<4>()?;
        if magic != ETCA_MAGIC {
            return Err(EtcaErrors::WrongMagicBytes);
        }

        let version = stream.get_u8();
        if version != ETCA_VERSION {
            return Err(EtcaErrors::UnsupportedVersion(version));
        }

        let mode = CompressionMode::from_u8(stream.get_u8());
        let width = stream.get_u32_be();
        let height = stream.get_u32_be();
        let color_depth = stream.get_u8();
        let metadata_size = stream.get_u32_be();

        if width == 0 || height == 0 {
            return Err(EtcaErrors::ZeroDimensions(width, height));
        }

        Ok(EtcaHeader {
            version,
            mode,
            width,
            height,
            color_depth,
            metadata_size
        })
    }
}

/// Key/value metadata carried between the header and the payload
///
/// Keys are unique and serialize sorted, one `key=value` line each. Keys
/// may not contain `=` or newlines, values may not contain either; the
/// encoder enforces this, the parser is lenient and skips lines it cannot
/// split.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct EtcaMetadata {
    entries: BTreeMap<String, String>
}

impl EtcaMetadata {
    pub fn new() -> EtcaMetadata {
        EtcaMetadata::default()
    }

    /// Insert or replace a key
    pub fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_owned(), value.to_owned());
    }

    /// Look up a key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn has(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Serialize as `key=value` lines, keys sorted
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = String::new();

        for (key, value) in &self.entries {
            out.push_str(key);
            out.push('=');
            out.push_str(value);
            out.push('\n');
        }
        out.into_bytes()
    }

    /// Parse a metadata block, skipping lines without a `=`
    ///
    /// The final line may or may not carry a trailing newline; invalid
    /// UTF-8 is replaced rather than rejected.
    pub fn from_bytes(data: &[u8]) -> EtcaMetadata {
        let mut metadata = EtcaMetadata::new();
        let text = String::from_utf8_lossy(data);

        for line in text.lines() {
            if line.is_empty() {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                metadata.set(key, value);
            }
        }
        metadata
    }

    fn validate(&self) -> Result<(), EtcaEncodeErrors> {
        for (key, value) in &self.entries {
            if key.contains('=') || key.contains('\n') {
                return Err(EtcaEncodeErrors::InvalidMetadata(
                    "metadata keys may not contain `=` or newlines"
                ));
            }
            if value.contains('=') || value.contains('\n') {
                return Err(EtcaEncodeErrors::InvalidMetadata(
                    "metadata values may not contain `=` or newlines"
                ));
            }
        }
        Ok(())
    }
}

/// A `.etca` container encoder
///
/// Wraps the compression pipeline and writes the fixed header, the
/// metadata block and the coded payload into one byte vector.
///
/// # Example
/// ```
/// use etca::{CompressionMode, EtcaEncoder, EtcaMetadata};
/// use etca_core::buffer::PixelBuffer;
/// use etca_core::options::CompressorOptions;
///
/// let image = PixelBuffer::new(8, 8);
/// let mut metadata = EtcaMetadata::new();
/// metadata.set("author", "me");
///
/// let mut encoder = EtcaEncoder::new(&image, CompressorOptions::default())
///     .set_metadata(metadata);
/// let file = encoder.encode().unwrap();
/// ```
pub struct EtcaEncoder<'a> {
    image:    &'a PixelBuffer,
    options:  CompressorOptions,
    mode:     CompressionMode,
    metadata: EtcaMetadata,
    stats:    Option<(TreeStats, CompressionStats)>
}

impl<'a> EtcaEncoder<'a> {
    /// Create a lossy encoder for `image` with explicit options
    pub fn new(image: &'a PixelBuffer, options: CompressorOptions) -> EtcaEncoder<'a> {
        EtcaEncoder {
            image,
            options,
            mode: CompressionMode::Lossy,
            metadata: EtcaMetadata::new(),
            stats: None
        }
    }

    /// Create an encoder using the aggressive lossless preset
    pub fn new_lossless(image: &'a PixelBuffer) -> EtcaEncoder<'a> {
        EtcaEncoder {
            image,
            options: CompressorOptions::new_lossless(),
            mode: CompressionMode::Lossless,
            metadata: EtcaMetadata::new(),
            stats: None
        }
    }

    /// Attach a metadata block to be written after the header
    pub fn set_metadata(mut self, metadata: EtcaMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Override the mode byte written to the header
    ///
    /// The mode is informational; the compression itself is driven by the
    /// options the encoder was created with.
    pub fn set_mode(mut self, mode: CompressionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Compress the image and assemble the container
    pub fn encode(&mut self) -> Result<Vec<u8>, EtcaEncodeErrors> {
        self.metadata.validate()?;

        let mut compressor = Compressor::new(self.options);
        let compressed = compressor.compress(self.image)?;
        self.stats = Some((compressor.tree_stats(), compressor.entropy_stats()));

        let metadata_bytes = self.metadata.to_bytes();
        let header = EtcaHeader {
            version:       ETCA_VERSION,
            mode:          self.mode,
            width:         compressed.width,
            height:        compressed.height,
            color_depth:   COLOR_DEPTH_RGB24,
            metadata_size: metadata_bytes.len() as u32
        };

        let mut stream =
            ByteWriter::with_capacity(HEADER_SIZE + metadata_bytes.len() + compressed.data.len());
        stream.write_all(&header.to_bytes());
        stream.write_all(&metadata_bytes);
        stream.write_all(&compressed.data);

        Ok(stream.into_inner())
    }

    /// Tree statistics from the most recent [`encode`](Self::encode)
    pub fn tree_stats(&self) -> Option<TreeStats> {
        self.stats.as_ref().map(|(tree, _)| *tree)
    }

    /// Entropy statistics from the most recent [`encode`](Self::encode)
    pub fn entropy_stats(&self) -> Option<CompressionStats> {
        self.stats.as_ref().map(|(_, entropy)| *entropy)
    }
}

/// A `.etca` container decoder
///
/// The decoder is initialized with the file's bytes and either of
/// [`decode_headers`] to parse the header and metadata, or [`decode`] to
/// reconstruct pixels. Dimensions, mode and metadata are accessible after
/// the headers are decoded.
///
/// [`decode_headers`]: EtcaDecoder::decode_headers
/// [`decode`]: EtcaDecoder::decode
pub struct EtcaDecoder<'a> {
    stream:          ByteReader<'a>,
    options:         DecompressorOptions,
    header:          Option<EtcaHeader>,
    metadata:        EtcaMetadata,
    decoded_headers: bool
}

impl<'a> EtcaDecoder<'a> {
    /// Create a decoder over a file's bytes with the default options
    pub fn new(data: &'a [u8]) -> EtcaDecoder<'a> {
        EtcaDecoder::new_with_options(data, DecompressorOptions::default())
    }

    /// Create a decoder that obeys the given restrictions
    ///
    /// E.g. can be used to lower the dimension limits to prevent OOM on
    /// untrusted files.
    pub fn new_with_options(data: &'a [u8], options: DecompressorOptions) -> EtcaDecoder<'a> {
        EtcaDecoder {
            stream: ByteReader::new(data),
            options,
            header: None,
            metadata: EtcaMetadata::new(),
            decoded_headers: false
        }
    }

    /// Parse the fixed header and the metadata block
    ///
    /// # Returns
    /// - `Ok(())`: header and metadata parsed, accessors are live
    /// - `Err`: the file was rejected; see [`EtcaErrors`]
    pub fn decode_headers(&mut self) -> Result<(), EtcaErrors> {
        if self.decoded_headers {
            return Ok(());
        }

        let mut header_bytes = [0; HEADER_SIZE];
        self.stream
            .read_exact_bytes(&mut header_bytes)
            .map_err(|_| EtcaErrors::TruncatedHeader(HEADER_SIZE, self.stream.remaining()))?;

        let header = EtcaHeader::from_bytes(&header_bytes)?;

        if header.width as usize > self.options.max_width() {
            return Err(EtcaErrors::TooLargeDimensions(
                self.options.max_width(),
                header.width as usize
            ));
        }
        if header.height as usize > self.options.max_height() {
            return Err(EtcaErrors::TooLargeDimensions(
                self.options.max_height(),
                header.height as usize
            ));
        }

        let metadata_size = header.metadata_size as usize;
        if self.stream.remaining() < metadata_size {
            return Err(EtcaErrors::TruncatedMetadata(
                metadata_size,
                self.stream.remaining()
            ));
        }

        if metadata_size > 0 {
            let mut metadata_bytes = vec![0; metadata_size];
            self.stream.read_exact_bytes(&mut metadata_bytes)?;
            self.metadata = EtcaMetadata::from_bytes(&metadata_bytes);
        }

        trace!("Image width: {:?}", header.width);
        trace!("Image height: {:?}", header.height);
        trace!("Compression mode: {:?}", header.mode);

        self.header = Some(header);
        self.decoded_headers = true;

        Ok(())
    }

    /// Reconstruct the image
    ///
    /// Decodes headers first if [`decode_headers`](Self::decode_headers)
    /// has not run. Past the header the decode is lenient: a damaged
    /// payload yields a partially black image of the declared size.
    pub fn decode(&mut self) -> Result<PixelBuffer, EtcaErrors> {
        if !self.decoded_headers {
            self.decode_headers()?;
        }
        // infallible: decode_headers sets it or errors out
        let header = self.header.ok_or(EtcaErrors::GenericStatic("headers not decoded"))?;

        let compressed = CompressedImage {
            width:   header.width,
            height:  header.height,
            options: CompressorOptions::default(),
            data:    self.stream.remaining_bytes().to_vec()
        };

        let mut decompressor = Decompressor::new(self.options);
        Ok(decompressor.decompress(&compressed))
    }

    /// Return the image dimensions, or `None` before header decoding
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.header.map(|h| (h.width, h.height))
    }

    /// Return the compression mode, or `None` before header decoding
    pub fn mode(&self) -> Option<CompressionMode> {
        self.header.map(|h| h.mode)
    }

    /// Return the parsed header, or `None` before header decoding
    pub fn header(&self) -> Option<EtcaHeader> {
        self.header
    }

    /// The metadata block; empty before header decoding
    pub fn metadata(&self) -> &EtcaMetadata {
        &self.metadata
    }
}
