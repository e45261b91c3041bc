/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */
//! An owned rectangular buffer of RGB samples
//!
//! The buffer is deliberately lenient: reads outside the rectangle return
//! black and writes outside it are dropped. Callers that walk a partition
//! tree rely on this when a child rectangle hangs over an odd-sized parent.

use alloc::vec;
use alloc::vec::Vec;

use crate::color::Rgb;

/// A width × height array of 24-bit RGB samples in row-major order
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PixelBuffer {
    width:  u32,
    height: u32,
    pixels: Vec<Rgb>
}

impl PixelBuffer {
    /// Create a buffer of the given dimensions filled with black
    pub fn new(width: u32, height: u32) -> PixelBuffer {
        PixelBuffer {
            width,
            height,
            pixels: vec![Rgb::BLACK; (width as usize) * (height as usize)]
        }
    }

    /// Build a buffer from interleaved `r g b` bytes in row-major order
    ///
    /// # Returns
    /// - `Some(buffer)`: `data` held exactly `width * height * 3` bytes
    /// - `None`: the length did not match the dimensions
    pub fn from_rgb_bytes(width: u32, height: u32, data: &[u8]) -> Option<PixelBuffer> {
        let expected = (width as usize).checked_mul(height as usize)?.checked_mul(3)?;

        if data.len() != expected {
            return None;
        }
        let pixels = data
            .chunks_exact(3)
            .map(|c| Rgb::new(c[0], c[1], c[2]))
            .collect();

        Some(PixelBuffer {
            width,
            height,
            pixels
        })
    }

    /// Return the samples as interleaved `r g b` bytes in row-major order
    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixels.len() * 3);

        for pixel in &self.pixels {
            out.extend_from_slice(&pixel.to_array());
        }
        out
    }

    /// Return `(width, height)`
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub const fn width(&self) -> u32 {
        self.width
    }

    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Borrow the samples in row-major order
    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    /// True if the buffer covers no pixels
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    #[inline(always)]
    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize) * (self.width as usize) + (x as usize)
    }

    /// Read the sample at `(x, y)`, or black if the position is outside
    /// the buffer
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Rgb {
        if x < self.width && y < self.height {
            self.pixels[self.index(x, y)]
        } else {
            Rgb::BLACK
        }
    }

    /// Write the sample at `(x, y)`; writes outside the buffer are dropped
    #[inline]
    pub fn set(&mut self, x: u32, y: u32, color: Rgb) {
        if x < self.width && y < self.height {
            let idx = self.index(x, y);
            self.pixels[idx] = color;
        }
    }

    /// Copy the region `[x, x + width) × [y, y + height)` into a fresh
    /// buffer
    ///
    /// The returned buffer is always exactly `width × height`; source
    /// positions outside this buffer read as black rather than shrinking
    /// the result.
    pub fn extract(&self, x: u32, y: u32, width: u32, height: u32) -> PixelBuffer {
        let mut region = PixelBuffer::new(width, height);

        for row in 0..height {
            for col in 0..width {
                let src_x = x.saturating_add(col);
                let src_y = y.saturating_add(row);

                if src_x < self.width && src_y < self.height {
                    region.set(col, row, self.get(src_x, src_y));
                }
            }
        }
        region
    }

    /// Arithmetic mean of each channel over all samples, truncated to `u8`
    ///
    /// An empty buffer yields black.
    pub fn mean(&self) -> Rgb {
        if self.pixels.is_empty() {
            return Rgb::BLACK;
        }
        let mut sum_r: u64 = 0;
        let mut sum_g: u64 = 0;
        let mut sum_b: u64 = 0;

        for pixel in &self.pixels {
            sum_r += u64::from(pixel.r);
            sum_g += u64::from(pixel.g);
            sum_b += u64::from(pixel.b);
        }
        let count = self.pixels.len() as u64;

        Rgb::new(
            (sum_r / count) as u8,
            (sum_g / count) as u8,
            (sum_b / count) as u8
        )
    }

    /// Set every sample to `color`
    pub fn fill(&mut self, color: Rgb) {
        self.pixels.fill(color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_access_is_lenient() {
        let mut buf = PixelBuffer::new(2, 2);
        buf.set(5, 5, Rgb::new(1, 2, 3));
        assert_eq!(buf.get(5, 5), Rgb::BLACK);
        assert_eq!(buf.get(0, 0), Rgb::BLACK);
    }

    #[test]
    fn extract_pads_with_black() {
        let mut buf = PixelBuffer::new(2, 2);
        buf.fill(Rgb::new(10, 20, 30));

        let region = buf.extract(1, 1, 3, 3);
        assert_eq!(region.dimensions(), (3, 3));
        assert_eq!(region.get(0, 0), Rgb::new(10, 20, 30));
        // everything past the parent's edge is black
        assert_eq!(region.get(1, 0), Rgb::BLACK);
        assert_eq!(region.get(2, 2), Rgb::BLACK);
    }

    #[test]
    fn mean_truncates_towards_zero() {
        let mut buf = PixelBuffer::new(2, 1);
        buf.set(0, 0, Rgb::new(0, 0, 1));
        buf.set(1, 0, Rgb::new(255, 2, 2));
        // (0 + 255) / 2 = 127.5 -> 127
        assert_eq!(buf.mean(), Rgb::new(127, 1, 1));
    }

    #[test]
    fn mean_of_empty_buffer_is_black() {
        let buf = PixelBuffer::new(0, 0);
        assert_eq!(buf.mean(), Rgb::BLACK);
    }

    #[test]
    fn rgb_bytes_round_trip() {
        let data = [1, 2, 3, 4, 5, 6];
        let buf = PixelBuffer::from_rgb_bytes(2, 1, &data).unwrap();
        assert_eq!(buf.get(1, 0), Rgb::new(4, 5, 6));
        assert_eq!(buf.to_rgb_bytes(), data);

        assert!(PixelBuffer::from_rgb_bytes(2, 2, &data).is_none());
    }
}
