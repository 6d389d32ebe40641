use crate::foundation::core::{Point, Rect, Rgba8Premul};
use crate::foundation::geometry::{Anchor, RectExt};
use serde::{Deserialize, Serialize};

/// Straight-alpha colour with channels in `0..=1`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Color {
    /// Red.
    pub r: f64,
    /// Green.
    pub g: f64,
    /// Blue.
    pub b: f64,
    /// Alpha.
    pub a: f64,
}

impl Color {
    /// Opaque black.
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);
    /// Opaque white.
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);
    /// Transparent black.
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);

    /// Build from unit channels.
    pub const fn rgba(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque colour from unit channels.
    pub const fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self::rgba(r, g, b, 1.0)
    }

    /// Opaque grey.
    pub const fn gray(l: f64) -> Self {
        Self::rgba(l, l, l, 1.0)
    }

    /// Build from 8-bit straight channels.
    pub fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::rgba(
            f64::from(r) / 255.0,
            f64::from(g) / 255.0,
            f64::from(b) / 255.0,
            f64::from(a) / 255.0,
        )
    }

    /// Hue in degrees, saturation and lightness in `0..=1`.
    pub fn hsl(h: f64, s: f64, l: f64) -> Self {
        hsla_to_rgba(h, s, l, 1.0)
    }

    /// Same colour with alpha replaced.
    pub fn with_alpha(self, a: f64) -> Self {
        Self { a, ..self }
    }

    /// Same colour with alpha multiplied by `k`.
    pub fn mul_alpha(self, k: f64) -> Self {
        Self {
            a: self.a * k,
            ..self
        }
    }

    /// Straight 8-bit channels `[r, g, b, a]`.
    pub fn to_rgba8(self) -> [u8; 4] {
        [
            unit_u8(self.r),
            unit_u8(self.g),
            unit_u8(self.b),
            unit_u8(self.a),
        ]
    }

    /// Premultiplied 8-bit representation.
    pub fn to_rgba8_premul(self) -> Rgba8Premul {
        let a = self.a.clamp(0.0, 1.0);
        Rgba8Premul {
            r: unit_u8(self.r.clamp(0.0, 1.0) * a),
            g: unit_u8(self.g.clamp(0.0, 1.0) * a),
            b: unit_u8(self.b.clamp(0.0, 1.0) * a),
            a: unit_u8(a),
        }
    }

    /// CSS `#rrggbbaa` form.
    pub fn to_hex(self) -> String {
        let [r, g, b, a] = self.to_rgba8();
        format!("#{r:02x}{g:02x}{b:02x}{a:02x}")
    }

    /// Rec. 601 luma of the straight channels.
    pub fn luminance(self) -> f64 {
        0.299 * self.r + 0.587 * self.g + 0.114 * self.b
    }
}

fn unit_u8(x: f64) -> u8 {
    (x.clamp(0.0, 1.0) * 255.0).round() as u8
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Hex(String),
            RgbaObj {
                r: f64,
                g: f64,
                b: f64,
                #[serde(default = "one")]
                a: f64,
            },
            HslaObj {
                h: f64,
                s: f64,
                l: f64,
                #[serde(default = "one")]
                a: f64,
            },
            Arr(Vec<f64>),
        }

        fn one() -> f64 {
            1.0
        }

        match Repr::deserialize(deserializer)? {
            Repr::Hex(s) => parse_hex(&s).map_err(serde::de::Error::custom),
            Repr::RgbaObj { r, g, b, a } => Ok(Self::rgba(r, g, b, a)),
            Repr::HslaObj { h, s, l, a } => Ok(hsla_to_rgba(h, s, l, a)),
            Repr::Arr(v) => match v.as_slice() {
                [r, g, b] => Ok(Self::rgb(*r, *g, *b)),
                [r, g, b, a] => Ok(Self::rgba(*r, *g, *b, *a)),
                _ => Err(serde::de::Error::custom(
                    "color array must be [r,g,b] or [r,g,b,a]",
                )),
            },
        }
    }
}

fn parse_hex(s: &str) -> Result<Color, String> {
    let s = s.trim();
    let s = s.strip_prefix('#').unwrap_or(s);

    fn hex_byte(pair: &str) -> Result<u8, String> {
        u8::from_str_radix(pair, 16).map_err(|_| format!("invalid hex byte \"{pair}\""))
    }

    if !s.is_ascii() {
        return Err("hex color must be ASCII".to_owned());
    }
    let (r, g, b, a) = match s.len() {
        6 => (
            hex_byte(&s[0..2])?,
            hex_byte(&s[2..4])?,
            hex_byte(&s[4..6])?,
            255,
        ),
        8 => (
            hex_byte(&s[0..2])?,
            hex_byte(&s[2..4])?,
            hex_byte(&s[4..6])?,
            hex_byte(&s[6..8])?,
        ),
        _ => return Err("hex color must be #RRGGBB or #RRGGBBAA".to_owned()),
    };
    Ok(Color::from_rgba8(r, g, b, a))
}

fn hsla_to_rgba(h: f64, s: f64, l: f64, a: f64) -> Color {
    let h = (h % 360.0 + 360.0) % 360.0 / 360.0;
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);

    if s == 0.0 {
        return Color::rgba(l, l, l, a);
    }

    fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
        if t < 0.0 {
            t += 1.0;
        }
        if t > 1.0 {
            t -= 1.0;
        }
        if t < 1.0 / 6.0 {
            return p + (q - p) * 6.0 * t;
        }
        if t < 0.5 {
            return q;
        }
        if t < 2.0 / 3.0 {
            return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
        }
        p
    }

    let q = if l < 0.5 {
        l * (1.0 + s)
    } else {
        l + s - l * s
    };
    let p = 2.0 * l - q;
    Color::rgba(
        hue_to_rgb(p, q, h + 1.0 / 3.0),
        hue_to_rgb(p, q, h),
        hue_to_rgb(p, q, h - 1.0 / 3.0),
        a,
    )
}

/// One gradient stop: colour at a point in pen space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    /// Stop colour.
    pub color: Color,
    /// Stop position in pen space.
    pub point: Point,
}

/// Multi-stop linear gradient; the first and last stop define the axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gradient {
    /// Ordered stops (at least two for a visible axis).
    pub stops: Vec<GradientStop>,
}

impl Gradient {
    /// Left-to-right gradient across `rect`.
    pub fn horizontal(rect: Rect, from: Color, to: Color) -> Self {
        Self::between(rect.point_at(Anchor::W), from, rect.point_at(Anchor::E), to)
    }

    /// Bottom-to-top gradient across `rect`.
    pub fn vertical(rect: Rect, from: Color, to: Color) -> Self {
        Self::between(rect.point_at(Anchor::S), from, rect.point_at(Anchor::N), to)
    }

    /// Two-stop gradient between explicit points.
    pub fn between(a: Point, from: Color, b: Point, to: Color) -> Self {
        Self {
            stops: vec![
                GradientStop {
                    color: from,
                    point: a,
                },
                GradientStop {
                    color: to,
                    point: b,
                },
            ],
        }
    }

    /// Colour at parameter `t` in `0..=1` along the stop list (evenly spaced offsets).
    pub fn sample(&self, t: f64) -> Color {
        match self.stops.as_slice() {
            [] => Color::TRANSPARENT,
            [only] => only.color,
            stops => {
                let t = t.clamp(0.0, 1.0) * (stops.len() - 1) as f64;
                let i = (t.floor() as usize).min(stops.len() - 2);
                let f = t - i as f64;
                let (a, b) = (stops[i].color, stops[i + 1].color);
                Color::rgba(
                    a.r + (b.r - a.r) * f,
                    a.g + (b.g - a.g) * f,
                    a.b + (b.b - a.b) * f,
                    a.a + (b.a - a.a) * f,
                )
            }
        }
    }
}

/// Fill source: flat colour or linear gradient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Fill {
    /// Solid colour.
    Solid(Color),
    /// Linear gradient.
    Gradient(Gradient),
}

impl From<Color> for Fill {
    fn from(c: Color) -> Self {
        Fill::Solid(c)
    }
}

impl From<Gradient> for Fill {
    fn from(g: Gradient) -> Self {
        Fill::Gradient(g)
    }
}

/// Separable and non-separable blend modes supported by every canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    /// Source over.
    #[default]
    Normal,
    /// Multiply.
    Multiply,
    /// Screen.
    Screen,
    /// Overlay.
    Overlay,
    /// Darken.
    Darken,
    /// Lighten.
    Lighten,
    /// Colour dodge.
    ColorDodge,
    /// Colour burn.
    ColorBurn,
    /// Soft light.
    SoftLight,
    /// Hard light.
    HardLight,
    /// Difference.
    Difference,
    /// Exclusion.
    Exclusion,
}

impl BlendMode {
    /// Name used by SVG `mix-blend-mode` and PDF `/BM`.
    pub fn css_name(self) -> &'static str {
        match self {
            BlendMode::Normal => "normal",
            BlendMode::Multiply => "multiply",
            BlendMode::Screen => "screen",
            BlendMode::Overlay => "overlay",
            BlendMode::Darken => "darken",
            BlendMode::Lighten => "lighten",
            BlendMode::ColorDodge => "color-dodge",
            BlendMode::ColorBurn => "color-burn",
            BlendMode::SoftLight => "soft-light",
            BlendMode::HardLight => "hard-light",
            BlendMode::Difference => "difference",
            BlendMode::Exclusion => "exclusion",
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/color.rs"]
mod tests;
