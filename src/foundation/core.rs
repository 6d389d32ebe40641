use crate::foundation::error::{RunonError, RunonResult};

pub use kurbo::{Affine, BezPath, PathEl, Point, Rect, Vec2};

/// Absolute 0-based frame index in timeline space.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32,
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> RunonResult<Self> {
        if den == 0 {
            return Err(RunonError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(RunonError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Convert to floating-point FPS.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Duration of one frame in seconds.
    pub fn frame_duration_secs(self) -> f64 {
        f64::from(self.den) / f64::from(self.num)
    }

    /// Convert frame count to seconds.
    pub fn frames_to_secs(self, frames: u64) -> f64 {
        (frames as f64) * self.frame_duration_secs()
    }
}

/// Timing data shared by every frame of one animation.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Timeline {
    /// Number of frames; frame indices run `0..duration`.
    pub duration: u64,
    /// Declared frame rate.
    pub fps: Fps,
}

impl Timeline {
    /// Create a timeline; a zero duration is rejected.
    pub fn new(duration: u64, fps: Fps) -> RunonResult<Self> {
        if duration == 0 {
            return Err(RunonError::validation("Timeline duration must be > 0"));
        }
        Ok(Self { duration, fps })
    }

    /// Wrap an arbitrary (possibly negative) index into `0..duration`.
    pub fn wrap(&self, i: i64) -> FrameIndex {
        let d = self.duration as i64;
        FrameIndex(i.rem_euclid(d) as u64)
    }

    /// Progress of frame `i` in `[0, 1)`.
    pub fn progress(&self, i: FrameIndex) -> f64 {
        (i.0 as f64) / (self.duration as f64)
    }

    /// Iterate every frame of the timeline against `rect`.
    pub fn frames(&self, rect: Rect) -> impl Iterator<Item = Frame<'_>> {
        (0..self.duration).map(move |i| Frame {
            i: FrameIndex(i),
            timeline: self,
            rect,
        })
    }
}

/// One discrete animation instant, immutable for the duration of a render pass.
#[derive(Clone, Copy, Debug)]
pub struct Frame<'a> {
    /// 0-based frame index.
    pub i: FrameIndex,
    /// Timing data of the animation this frame belongs to.
    pub timeline: &'a Timeline,
    /// Target rectangle in pen space.
    pub rect: Rect,
}

impl Frame<'_> {
    /// Progress of this frame through its timeline, in `[0, 1)`.
    pub fn progress(&self) -> f64 {
        self.timeline.progress(self.i)
    }

    /// Seconds elapsed since the first frame.
    pub fn secs(&self) -> f64 {
        self.timeline.fps.frames_to_secs(self.i.0)
    }
}

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8Premul {
    /// Red channel premultiplied by alpha.
    pub r: u8,
    /// Green channel premultiplied by alpha.
    pub g: u8,
    /// Blue channel premultiplied by alpha.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8Premul {
    /// Fully transparent black.
    pub fn transparent() -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        }
    }

    /// Convert straight-alpha RGBA8 into premultiplied RGBA8.
    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }

        Self {
            r: premul(r, a),
            g: premul(g, a),
            b: premul(b, a),
            a,
        }
    }

    /// Channel array in `[r, g, b, a]` order.
    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Premultiplied RGBA8 pixel buffer, tightly packed and row-major with a top-left origin.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// `width * height * 4` premultiplied bytes.
    pub data: Vec<u8>,
}

impl FrameRGBA {
    /// Fully transparent frame.
    pub fn transparent(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; (width as usize) * (height as usize) * 4],
        }
    }

    /// Wrap premultiplied bytes, checking the buffer length.
    pub fn from_premul(width: u32, height: u32, data: Vec<u8>) -> RunonResult<Self> {
        let expected = (width as usize) * (height as usize) * 4;
        if data.len() != expected {
            return Err(RunonError::validation(format!(
                "pixel buffer has {} bytes, expected {expected} for {width}x{height}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Premultiply straight-alpha RGBA8 bytes.
    pub fn from_straight(width: u32, height: u32, mut data: Vec<u8>) -> RunonResult<Self> {
        for px in data.chunks_exact_mut(4) {
            let p = Rgba8Premul::from_straight_rgba(px[0], px[1], px[2], px[3]);
            px.copy_from_slice(&p.to_array());
        }
        Self::from_premul(width, height, data)
    }

    /// Pixel at `(x, y)`; `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        Some([
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ])
    }

    /// Straight-alpha copy of the pixel bytes, as image encoders expect.
    pub fn to_straight(&self) -> Vec<u8> {
        let mut out = self.data.clone();
        for px in out.chunks_exact_mut(4) {
            let a = u16::from(px[3]);
            if a == 0 {
                px[..3].fill(0);
                continue;
            }
            for c in &mut px[..3] {
                *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
            }
        }
        out
    }

    /// Stable 64-bit digest of size and pixels.
    pub fn fingerprint(&self) -> u64 {
        let mut h = crate::foundation::math::Fnv1a64::new_default();
        h.write_u32(self.width);
        h.write_u32(self.height);
        h.write_bytes(&self.data);
        h.finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
