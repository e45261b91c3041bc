/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */
//! The color variance metric driving subdivision

use etca_core::buffer::PixelBuffer;

/// Normalized color variance of a buffer, in `[0, 1]`
///
/// Computed as the mean of the three per-channel standard deviations, each
/// divided by 255. A flat region scores 0, a half-black half-white checker
/// scores 0.5. An empty buffer scores 0.
pub fn variance(buffer: &PixelBuffer) -> f64 {
    let pixels = buffer.pixels();

    if pixels.is_empty() {
        return 0.0;
    }
    let count = pixels.len() as f64;

    let mut mean_r = 0.0;
    let mut mean_g = 0.0;
    let mut mean_b = 0.0;

    for pixel in pixels {
        mean_r += f64::from(pixel.r);
        mean_g += f64::from(pixel.g);
        mean_b += f64::from(pixel.b);
    }
    mean_r /= count;
    mean_g /= count;
    mean_b /= count;

    let mut var_r = 0.0;
    let mut var_g = 0.0;
    let mut var_b = 0.0;

    for pixel in pixels {
        let dr = f64::from(pixel.r) - mean_r;
        let dg = f64::from(pixel.g) - mean_g;
        let db = f64::from(pixel.b) - mean_b;

        var_r += dr * dr;
        var_g += dg * dg;
        var_b += db * db;
    }

    let sigma_r = (var_r / count).sqrt() / 255.0;
    let sigma_g = (var_g / count).sqrt() / 255.0;
    let sigma_b = (var_b / count).sqrt() / 255.0;

    (sigma_r + sigma_g + sigma_b) / 3.0
}

/// Whether a region's variance crosses the subdivision threshold
///
/// The inequality is strict; a region sitting exactly at the threshold
/// stays a leaf.
pub fn should_subdivide(buffer: &PixelBuffer, threshold: f64) -> bool {
    variance(buffer) > threshold
}

#[cfg(test)]
mod tests {
    use etca_core::color::Rgb;

    use super::*;

    #[test]
    fn uniform_region_has_zero_variance() {
        let mut buf = PixelBuffer::new(5, 5);
        buf.fill(Rgb::new(50, 100, 150));

        assert_eq!(variance(&buf), 0.0);
        // strict inequality: a zero threshold still does not split a
        // uniform region
        assert!(!should_subdivide(&buf, 0.0));
    }

    #[test]
    fn checker_scores_one_half() {
        let mut buf = PixelBuffer::new(2, 2);
        buf.set(0, 0, Rgb::BLACK);
        buf.set(1, 0, Rgb::new(255, 255, 255));
        buf.set(0, 1, Rgb::new(255, 255, 255));
        buf.set(1, 1, Rgb::BLACK);

        let v = variance(&buf);
        assert!((v - 0.5).abs() < 1e-9);
        assert!(should_subdivide(&buf, 0.1));
    }

    #[test]
    fn empty_buffer_scores_zero() {
        let buf = PixelBuffer::new(0, 3);
        assert_eq!(variance(&buf), 0.0);
    }

    #[test]
    fn threshold_boundary_is_exclusive() {
        let mut buf = PixelBuffer::new(2, 1);
        buf.set(0, 0, Rgb::BLACK);
        buf.set(1, 0, Rgb::new(255, 255, 255));

        let v = variance(&buf);
        assert!(!should_subdivide(&buf, v));
        assert!(should_subdivide(&buf, v - 1e-12));
    }
}
