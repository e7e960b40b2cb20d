//! # AQI Color Scale
//!
//! The color-coding of an air-quality reading: a piecewise-linear ramp
//! between anchor colors at each 50-point band boundary, clamped above 300.
//! Pure value logic; drawing belongs to the map surface.

use serde::{Deserialize, Serialize};

/// An RGB color with channels in `[0, 255]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }
}

const COLOR_0: Rgb = Rgb::new(139.0, 222.0, 92.0);
const COLOR_50: Rgb = Rgb::new(255.0, 254.0, 115.0);
const COLOR_100: Rgb = Rgb::new(223.0, 138.0, 70.0);
const COLOR_150: Rgb = Rgb::new(213.0, 69.0, 51.0);
const COLOR_200: Rgb = Rgb::new(127.0, 38.0, 74.0);
const COLOR_250: Rgb = Rgb::new(127.0, 38.0, 74.0);
const COLOR_300: Rgb = Rgb::new(104.0, 29.0, 39.0);

/// The color representing the given AQI reading.
pub fn color_for_aqi(aqi: u32) -> Rgb {
    if aqi < 50 {
        interpolate(0, 50, COLOR_0, COLOR_50, aqi)
    } else if aqi < 100 {
        interpolate(50, 100, COLOR_50, COLOR_100, aqi)
    } else if aqi < 150 {
        interpolate(100, 150, COLOR_100, COLOR_150, aqi)
    } else if aqi < 200 {
        interpolate(150, 200, COLOR_150, COLOR_200, aqi)
    } else if aqi < 250 {
        interpolate(200, 250, COLOR_200, COLOR_250, aqi)
    } else if aqi < 300 {
        interpolate(250, 300, COLOR_250, COLOR_300, aqi)
    } else {
        COLOR_300
    }
}

/// The color for text drawn on top of [`color_for_aqi`]: black on the
/// lighter bands, white once the scale darkens past 100.
pub fn text_color_for_aqi(aqi: u32) -> Rgb {
    if aqi <= 100 {
        Rgb::new(0.0, 0.0, 0.0)
    } else {
        Rgb::new(255.0, 255.0, 255.0)
    }
}

fn interpolate(low: u32, high: u32, low_color: Rgb, high_color: Rgb, value: u32) -> Rgb {
    let fraction = ((value - low) as f32 / (high - low) as f32).clamp(0.0, 1.0);
    Rgb::new(
        low_color.r + (high_color.r - low_color.r) * fraction,
        low_color.g + (high_color.g - low_color.g) * fraction,
        low_color.b + (high_color.b - low_color.b) * fraction,
    )
}
