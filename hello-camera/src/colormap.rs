//! Pseudocolor lookup tables

use image::{GrayImage, Rgb, RgbImage};

/// 256-entry intensity → RGB lookup table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Colormap {
    lut: [[u8; 3]; 256],
}

impl Colormap {
    /// Classic "jet": dark blue at 0 through cyan, yellow, to dark red at 255.
    pub fn jet() -> Self {
        let mut lut = [[0u8; 3]; 256];
        for (i, entry) in lut.iter_mut().enumerate() {
            let x = i as f32 / 255.0;
            *entry = [
                jet_channel(4.0 * x - 3.0),
                jet_channel(4.0 * x - 2.0),
                jet_channel(4.0 * x - 1.0),
            ];
        }
        Self { lut }
    }

    pub fn color(&self, intensity: u8) -> [u8; 3] {
        self.lut[intensity as usize]
    }

    /// Color of the lowest intensity
    pub fn low(&self) -> [u8; 3] {
        self.lut[0]
    }

    /// Color of the highest intensity
    pub fn high(&self) -> [u8; 3] {
        self.lut[255]
    }

    /// Map every pixel of a grayscale image through the table
    pub fn apply(&self, gray: &GrayImage) -> RgbImage {
        RgbImage::from_fn(gray.width(), gray.height(), |x, y| {
            Rgb(self.color(gray.get_pixel(x, y)[0]))
        })
    }
}

impl Default for Colormap {
    fn default() -> Self {
        Colormap::jet()
    }
}

fn jet_channel(offset: f32) -> u8 {
    let v = (1.5 - offset.abs()).clamp(0.0, 1.0);
    (v * 255.0).round() as u8
}
