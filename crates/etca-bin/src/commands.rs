/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use std::error::Error;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use clap::ArgMatches;
use etca::{CompressionMode, EtcaDecoder, EtcaEncoder, EtcaMetadata};
use etca_core::buffer::PixelBuffer;
use etca_core::options::{CompressorOptions, DecompressorOptions};
use etca_ppm::{PPMDecoder, PPMEncoder};
use log::info;
use serde_json::json;

pub fn compress(options: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let input = PathBuf::from(options.get_one::<OsString>("in").unwrap());
    let output = match options.get_one::<OsString>("out") {
        Some(path) => PathBuf::from(path),
        None => input.with_extension("etca")
    };

    let lossless = options.get_flag("lossless");
    let quality = *options.get_one::<f64>("quality").unwrap();

    let mut compressor_options = if lossless {
        CompressorOptions::new_lossless()
    } else {
        CompressorOptions::default().set_variance_threshold(quality / 255.0)
    };
    if let Some(max_depth) = options.get_one::<u8>("max-depth") {
        compressor_options = compressor_options.set_max_depth(*max_depth);
    }
    compressor_options = compressor_options.set_prefer_speed(options.get_flag("prefer-speed"));

    let image = read_ppm(&input)?;

    let mut metadata = EtcaMetadata::new();
    metadata.set(
        "compression_mode",
        if lossless { "lossless" } else { "lossy" }
    );
    if let Some(author) = options.get_one::<String>("author") {
        metadata.set("author", author);
    }

    info!("Compressing {input:?} to {output:?}");

    let mode = if lossless {
        CompressionMode::Lossless
    } else {
        CompressionMode::Lossy
    };
    let mut encoder = EtcaEncoder::new(&image, compressor_options)
        .set_mode(mode)
        .set_metadata(metadata);
    let file = encoder.encode()?;

    std::fs::write(&output, &file)?;

    let (width, height) = image.dimensions();
    let raw_size = (width as usize) * (height as usize) * 3;
    let tree_stats = encoder.tree_stats().unwrap();
    let entropy_stats = encoder.entropy_stats().unwrap();

    println!("Compressed {} -> {}", input.display(), output.display());
    println!(
        "  tree      : {} tiles, {} leaves, depth {}",
        tree_stats.tile_count, tree_stats.leaf_count, tree_stats.max_depth
    );
    println!(
        "  entropy   : {} ({} -> {} bytes)",
        entropy_stats.codec_used, entropy_stats.original_size, entropy_stats.compressed_size
    );
    println!(
        "  file      : {} bytes ({:.2}x smaller than raw RGB)",
        file.len(),
        raw_size as f64 / file.len().max(1) as f64
    );

    Ok(())
}

pub fn decompress(options: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let input = PathBuf::from(options.get_one::<OsString>("in").unwrap());
    let output = PathBuf::from(options.get_one::<OsString>("out").unwrap());

    let decompressor_options =
        DecompressorOptions::default().set_apply_interpolation(options.get_flag("smooth"));

    info!("Decompressing {input:?} to {output:?}");

    let data = std::fs::read(&input)?;
    let mut decoder = EtcaDecoder::new_with_options(&data, decompressor_options);
    let image = decoder.decode()?;

    let (width, height) = image.dimensions();
    let pixels = image.to_rgb_bytes();
    let ppm = PPMEncoder::new(&pixels, width, height).encode()?;

    std::fs::write(&output, &ppm)?;

    println!(
        "Decompressed {} -> {} ({}x{})",
        input.display(),
        output.display(),
        width,
        height
    );

    Ok(())
}

pub fn file_info(options: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let input = PathBuf::from(options.get_one::<OsString>("in").unwrap());

    let data = std::fs::read(&input)?;
    let mut decoder = EtcaDecoder::new(&data);
    decoder.decode_headers()?;

    let header = decoder.header().unwrap();
    let mode = match header.mode {
        CompressionMode::Lossy => "lossy",
        CompressionMode::Lossless => "lossless"
    };

    if options.get_flag("json") {
        let metadata: serde_json::Map<String, serde_json::Value> = decoder
            .metadata()
            .iter()
            .map(|(k, v)| (k.to_string(), json!(v)))
            .collect();

        let out = json!({
            "file": input.display().to_string(),
            "version": header.version,
            "mode": mode,
            "width": header.width,
            "height": header.height,
            "color_depth": header.color_depth,
            "metadata": metadata
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("File: {}", input.display());
    println!("Format version: {}", header.version);
    println!("Compression mode: {mode}");
    println!("Image dimensions: {} x {}", header.width, header.height);
    println!("Color depth: {}-bit", header.color_depth);

    if !decoder.metadata().is_empty() {
        println!("Metadata:");
        for (key, value) in decoder.metadata().iter() {
            println!("  {key} = {value}");
        }
    }

    Ok(())
}

fn read_ppm(path: &Path) -> Result<PixelBuffer, Box<dyn Error>> {
    let data = std::fs::read(path)?;
    let mut decoder = PPMDecoder::new(&data);
    let pixels = decoder.decode()?;
    let (width, height) = decoder.dimensions().unwrap();

    PixelBuffer::from_rgb_bytes(width, height, &pixels)
        .ok_or_else(|| "PPM payload does not match its dimensions".into())
}
