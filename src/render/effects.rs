//! Raster effects for [`Pen::ch`].
//!
//! Each effect precomposes the incoming pen inside the rectangle handed to `ch`, rounded to
//! whole units, filters the pixels, and returns a fresh pen: the rounded rectangle filled with
//! the filtered image.

use super::blur::blur_sigma;
use super::composite::precompose;
use crate::foundation::color::Color;
use crate::foundation::core::{FrameRGBA, Rect};
use crate::foundation::error::{RunonError, RunonResult};
use crate::foundation::geometry::RectExt;
use crate::pen::Pen;
use crate::pen::attrs::{ImageFill, ImageSource};
use crate::pen::fx::Effect;
use std::str::FromStr;
use std::sync::Arc;

/// `rect` filled with `frame`, stretched to fit.
pub fn image_pen(frame: FrameRGBA, rect: Rect) -> Pen {
    Pen::from_rect(rect)
        .image(ImageFill {
            source: ImageSource::Pixels(Arc::new(frame)),
            rect,
            opacity: 1.0,
            pattern: false,
        })
        .no_fill()
}

/// Rasterize the pen at `scale` and hand it back as an image.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Precompose {
    /// Pixels per pen unit.
    pub scale: f64,
}

/// [`Precompose`] effect.
pub fn precompose_fx(scale: f64) -> Precompose {
    Precompose { scale }
}

impl Effect for Precompose {
    fn apply(&self, pen: Pen, rect: Rect) -> RunonResult<Pen> {
        let rect = rect.round_xywh();
        let frame = precompose(&pen, rect, self.scale, None, None)?;
        Ok(image_pen(frame, rect))
    }
}

/// Gaussian blur of the rasterized pen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Blur {
    /// Standard deviation in pen units.
    pub sigma: f64,
    /// Pixels per pen unit.
    pub scale: f64,
}

/// [`Blur`] effect at scale 1.
pub fn blur_fx(sigma: f64) -> Blur {
    Blur { sigma, scale: 1.0 }
}

impl Effect for Blur {
    fn apply(&self, pen: Pen, rect: Rect) -> RunonResult<Pen> {
        let rect = rect.round_xywh();
        let frame = precompose(&pen, rect, self.scale, None, None)?;
        let data = blur_sigma(&frame.data, frame.width, frame.height, self.sigma * self.scale)?;
        let blurred = FrameRGBA::from_premul(frame.width, frame.height, data)?;
        Ok(image_pen(blurred, rect))
    }
}

/// Blur, then a soft luminance threshold recoloured with `fill`.
///
/// Luminance at or below `cut - cut_width` becomes transparent, at or above
/// `cut + cut_width` fully `fill`, with a linear ramp in between.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Phototype {
    /// Blur standard deviation in pen units.
    pub blur: f64,
    /// Threshold centre, `0..=255`.
    pub cut: f64,
    /// Half width of the threshold ramp.
    pub cut_width: f64,
    /// Output colour.
    pub fill: Color,
}

impl Default for Phototype {
    fn default() -> Self {
        Self {
            blur: 5.0,
            cut: 127.0,
            cut_width: 3.0,
            fill: Color::WHITE,
        }
    }
}

/// [`Phototype`] effect.
pub fn phototype(blur: f64, cut: f64, cut_width: f64, fill: Color) -> Phototype {
    Phototype {
        blur,
        cut,
        cut_width,
        fill,
    }
}

impl Phototype {
    fn ramp(&self, luma: f64) -> f64 {
        let lo = self.cut - self.cut_width;
        let hi = self.cut + self.cut_width;
        if hi <= lo {
            return if luma > self.cut { 1.0 } else { 0.0 };
        }
        ((luma - lo) / (hi - lo)).clamp(0.0, 1.0)
    }
}

impl Effect for Phototype {
    fn apply(&self, pen: Pen, rect: Rect) -> RunonResult<Pen> {
        let rect = rect.round_xywh();
        let frame = precompose(&pen, rect, 1.0, None, None)?;
        let data = blur_sigma(&frame.data, frame.width, frame.height, self.blur)?;
        let fill = self.fill.to_rgba8_premul().to_array();
        let mut out = vec![0u8; data.len()];
        for (src, dst) in data.chunks_exact(4).zip(out.chunks_exact_mut(4)) {
            // Premultiplied channels give luminance over transparent black.
            let luma = 0.299 * f64::from(src[0]) + 0.587 * f64::from(src[1]) + 0.114 * f64::from(src[2]);
            let k = self.ramp(luma);
            for (d, s) in dst.iter_mut().zip(fill) {
                *d = (f64::from(s) * k).round() as u8;
            }
        }
        let frame = FrameRGBA::from_premul(frame.width, frame.height, out)?;
        Ok(image_pen(frame, rect))
    }
}

/// Error-diffusion kernel: `((dx, dy), weight)` pairs, origin at the current pixel, y down.
type Kernel = &'static [((i32, i32), f32)];

const FLOYD_STEINBERG: Kernel = &[
    ((1, 0), 7.0 / 16.0),
    ((-1, 1), 3.0 / 16.0),
    ((0, 1), 5.0 / 16.0),
    ((1, 1), 1.0 / 16.0),
];
const FALSE_FLOYD_STEINBERG: Kernel = &[((1, 0), 3.0 / 8.0), ((0, 1), 3.0 / 8.0), ((1, 1), 2.0 / 8.0)];
const ATKINSON: Kernel = &[
    ((1, 0), 1.0 / 8.0),
    ((2, 0), 1.0 / 8.0),
    ((-1, 1), 1.0 / 8.0),
    ((0, 1), 1.0 / 8.0),
    ((1, 1), 1.0 / 8.0),
    ((0, 2), 1.0 / 8.0),
];
const JARVIS_JUDICE_NINKE: Kernel = &[
    ((1, 0), 7.0 / 48.0),
    ((2, 0), 5.0 / 48.0),
    ((-2, 1), 3.0 / 48.0),
    ((-1, 1), 5.0 / 48.0),
    ((0, 1), 7.0 / 48.0),
    ((1, 1), 5.0 / 48.0),
    ((2, 1), 3.0 / 48.0),
    ((-2, 2), 1.0 / 48.0),
    ((-1, 2), 3.0 / 48.0),
    ((0, 2), 5.0 / 48.0),
    ((1, 2), 3.0 / 48.0),
    ((2, 2), 1.0 / 48.0),
];
const STUCKI: Kernel = &[
    ((1, 0), 8.0 / 42.0),
    ((2, 0), 4.0 / 42.0),
    ((-2, 1), 2.0 / 42.0),
    ((-1, 1), 4.0 / 42.0),
    ((0, 1), 8.0 / 42.0),
    ((1, 1), 4.0 / 42.0),
    ((2, 1), 2.0 / 42.0),
    ((-2, 2), 1.0 / 42.0),
    ((-1, 2), 2.0 / 42.0),
    ((0, 2), 4.0 / 42.0),
    ((1, 2), 2.0 / 42.0),
    ((2, 2), 1.0 / 42.0),
];
const BURKES: Kernel = &[
    ((1, 0), 8.0 / 32.0),
    ((2, 0), 4.0 / 32.0),
    ((-2, 1), 2.0 / 32.0),
    ((-1, 1), 4.0 / 32.0),
    ((0, 1), 8.0 / 32.0),
    ((1, 1), 4.0 / 32.0),
    ((2, 1), 2.0 / 32.0),
];
const SIERRA: Kernel = &[
    ((1, 0), 5.0 / 32.0),
    ((2, 0), 3.0 / 32.0),
    ((-2, 1), 2.0 / 32.0),
    ((-1, 1), 4.0 / 32.0),
    ((0, 1), 5.0 / 32.0),
    ((1, 1), 4.0 / 32.0),
    ((2, 1), 2.0 / 32.0),
    ((-1, 2), 2.0 / 32.0),
    ((0, 2), 3.0 / 32.0),
    ((1, 2), 2.0 / 32.0),
];
const TWO_ROW_SIERRA: Kernel = &[
    ((1, 0), 4.0 / 16.0),
    ((2, 0), 3.0 / 16.0),
    ((-2, 1), 1.0 / 16.0),
    ((-1, 1), 2.0 / 16.0),
    ((0, 1), 3.0 / 16.0),
    ((1, 1), 2.0 / 16.0),
    ((2, 1), 1.0 / 16.0),
];
const SIERRA_LITE: Kernel = &[((1, 0), 2.0 / 4.0), ((-1, 1), 1.0 / 4.0), ((0, 1), 1.0 / 4.0)];

/// Dithering algorithm.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DitherMethod {
    /// Floyd-Steinberg error diffusion.
    FloydSteinberg,
    /// Three-neighbour Floyd-Steinberg variant.
    FalseFloydSteinberg,
    /// Atkinson (diffuses 6/8 of the error).
    Atkinson,
    /// Jarvis, Judice and Ninke.
    JarvisJudiceNinke,
    /// Stucki.
    Stucki,
    /// Burkes.
    Burkes,
    /// Three-row Sierra.
    Sierra,
    /// Two-row Sierra.
    TwoRowSierra,
    /// Sierra Lite.
    SierraLite,
    /// Ordered dithering against a Bayer matrix of side 2, 4 or 8.
    Bayer(u8),
    /// Ordered dithering against a fixed 64x64 noise matrix.
    BlueNoise,
}

impl DitherMethod {
    fn kernel(self) -> Option<Kernel> {
        Some(match self {
            DitherMethod::FloydSteinberg => FLOYD_STEINBERG,
            DitherMethod::FalseFloydSteinberg => FALSE_FLOYD_STEINBERG,
            DitherMethod::Atkinson => ATKINSON,
            DitherMethod::JarvisJudiceNinke => JARVIS_JUDICE_NINKE,
            DitherMethod::Stucki => STUCKI,
            DitherMethod::Burkes => BURKES,
            DitherMethod::Sierra => SIERRA,
            DitherMethod::TwoRowSierra => TWO_ROW_SIERRA,
            DitherMethod::SierraLite => SIERRA_LITE,
            DitherMethod::Bayer(_) | DitherMethod::BlueNoise => return None,
        })
    }
}

impl FromStr for DitherMethod {
    type Err = RunonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "floyd-steinberg" => DitherMethod::FloydSteinberg,
            "false-floyd-steinberg" => DitherMethod::FalseFloydSteinberg,
            "atkinson" => DitherMethod::Atkinson,
            "jarvis-judice-ninke" => DitherMethod::JarvisJudiceNinke,
            "stucki" => DitherMethod::Stucki,
            "burkes" => DitherMethod::Burkes,
            "sierra" => DitherMethod::Sierra,
            "two-row-sierra" => DitherMethod::TwoRowSierra,
            "sierra-lite" => DitherMethod::SierraLite,
            "bayer" => DitherMethod::Bayer(4),
            "blue-noise" => DitherMethod::BlueNoise,
            other => {
                return Err(RunonError::validation(format!(
                    "dithering kernel '{other}' not supported"
                )));
            }
        })
    }
}

/// Two-level black and white dithering of the rasterized pen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Dither {
    method: DitherMethod,
    threshold: u8,
    scale: f64,
}

/// [`Dither`] effect.
///
/// `scale` is the size of one dither cell in pixels: `2` dithers at half resolution. Bayer
/// matrices other than 2, 4 and 8 are rejected.
pub fn dither(method: DitherMethod, threshold: u8, scale: f64) -> RunonResult<Dither> {
    if let DitherMethod::Bayer(n) = method
        && !matches!(n, 2 | 4 | 8)
    {
        return Err(RunonError::validation(format!(
            "bayer matrix size must be 2, 4 or 8, got {n}"
        )));
    }
    if !scale.is_finite() || scale <= 0.0 {
        return Err(RunonError::validation(format!(
            "dither scale must be finite and > 0, got {scale}"
        )));
    }
    Ok(Dither {
        method,
        threshold,
        scale,
    })
}

impl Effect for Dither {
    fn apply(&self, pen: Pen, rect: Rect) -> RunonResult<Pen> {
        let rect = rect.round_xywh();
        let frame = precompose(&pen, rect, 1.0 / self.scale, None, None)?;
        let (w, h) = (frame.width as usize, frame.height as usize);
        let mut gray: Vec<f32> = frame
            .data
            .chunks_exact(4)
            .map(|px| 0.299 * f32::from(px[0]) + 0.587 * f32::from(px[1]) + 0.114 * f32::from(px[2]))
            .collect();

        let bits: Vec<bool> = match self.method.kernel() {
            Some(kernel) => diffuse(&mut gray, w, h, kernel, f32::from(self.threshold)),
            None => {
                let matrix = match self.method {
                    DitherMethod::Bayer(n) => bayer_matrix(usize::from(n)),
                    _ => blue_noise_matrix(),
                };
                ordered(&gray, w, &matrix)
            }
        };

        let data = bits
            .iter()
            .flat_map(|&on| if on { [255; 4] } else { [0, 0, 0, 255] })
            .collect();
        let out = FrameRGBA::from_premul(frame.width, frame.height, data)?;
        Ok(image_pen(out, rect))
    }
}

/// Error diffusion in scan order; `true` is white.
fn diffuse(gray: &mut [f32], w: usize, h: usize, kernel: Kernel, threshold: f32) -> Vec<bool> {
    let mut out = vec![false; gray.len()];
    for y in 0..h {
        for x in 0..w {
            let i = y * w + x;
            let old = gray[i];
            let on = old > threshold;
            out[i] = on;
            let err = old - if on { 255.0 } else { 0.0 };
            for &((dx, dy), weight) in kernel {
                let nx = x as i64 + i64::from(dx);
                let ny = y as i64 + i64::from(dy);
                if nx < 0 || ny < 0 || nx >= w as i64 || ny >= h as i64 {
                    continue;
                }
                let j = ny as usize * w + nx as usize;
                gray[j] = (gray[j] + err * weight).clamp(0.0, 255.0);
            }
        }
    }
    out
}

/// Square threshold matrix with entries in `0..1`.
struct ThresholdMatrix {
    side: usize,
    values: Vec<f32>,
}

fn ordered(gray: &[f32], w: usize, m: &ThresholdMatrix) -> Vec<bool> {
    gray.iter()
        .enumerate()
        .map(|(i, &g)| {
            let (x, y) = (i % w, i / w);
            g > m.values[(y % m.side) * m.side + (x % m.side)] * 255.0
        })
        .collect()
}

/// Bayer index matrix of side `n` (a power of two), normalized by `n * n`.
fn bayer_matrix(n: usize) -> ThresholdMatrix {
    let mut side = 1;
    let mut idx = vec![0u32];
    while side < n {
        let next = side * 2;
        let mut grown = vec![0u32; next * next];
        for y in 0..side {
            for x in 0..side {
                let v = 4 * idx[y * side + x];
                grown[y * next + x] = v;
                grown[y * next + x + side] = v + 2;
                grown[(y + side) * next + x] = v + 3;
                grown[(y + side) * next + x + side] = v + 1;
            }
        }
        side = next;
        idx = grown;
    }
    let norm = (side * side) as f32;
    ThresholdMatrix {
        side,
        values: idx.into_iter().map(|v| v as f32 / norm).collect(),
    }
}

const BLUE_NOISE_SIDE: usize = 64;

/// Fixed pseudo-random 64x64 matrix (splitmix64, seed 42).
fn blue_noise_matrix() -> ThresholdMatrix {
    let mut state: u64 = 42;
    let values = (0..BLUE_NOISE_SIDE * BLUE_NOISE_SIDE)
        .map(|_| {
            state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
            let mut z = state;
            z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
            z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
            z ^= z >> 31;
            (z >> 40) as f32 / (1u64 << 24) as f32
        })
        .collect();
    ThresholdMatrix {
        side: BLUE_NOISE_SIDE,
        values,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/effects.rs"]
mod tests;
