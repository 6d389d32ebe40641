//! SVG output canvas.
//!
//! Every draw call becomes one element carrying the current transform as a `matrix(...)`.
//! Gradients, clips, blur filters and embedded images are collected into `<defs>` and referenced
//! by id.

use super::canvas::{Canvas, Paint, PaintStyle, Shader, StateStack, StrokeParams};
use super::image_io::encode_png;
use super::text::text_element;
use crate::foundation::color::{BlendMode, Color};
use crate::foundation::core::{Affine, BezPath, FrameRGBA, Point, Rect};
use crate::foundation::error::RunonResult;
use anyhow::Context;
use base64::Engine as _;
use std::path::Path;
use std::sync::Arc;

/// Vector canvas that serializes to a standalone SVG document.
#[derive(Debug)]
pub struct SvgCanvas {
    width: u32,
    height: u32,
    defs: Vec<String>,
    body: Vec<String>,
    next_id: usize,
    state: StateStack<Option<String>>,
}

impl SvgCanvas {
    /// Empty document of `width x height` user units.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            defs: Vec::new(),
            body: Vec::new(),
            next_id: 0,
            state: StateStack::new(None),
        }
    }

    fn fresh_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}{}", self.next_id)
    }

    /// The finished document.
    pub fn finish(&self) -> String {
        let mut out = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = self.width,
            h = self.height
        );
        out.push('\n');
        if !self.defs.is_empty() {
            out.push_str("<defs>\n");
            for d in &self.defs {
                out.push_str(d);
                out.push('\n');
            }
            out.push_str("</defs>\n");
        }
        for el in &self.body {
            out.push_str(el);
            out.push('\n');
        }
        out.push_str("</svg>\n");
        out
    }

    /// Write [`SvgCanvas::finish`] to `path`, creating parent directories.
    pub fn write_file(&self, path: &Path) -> RunonResult<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create output directory '{}'", parent.display()))?;
        }
        std::fs::write(path, self.finish())
            .with_context(|| format!("write svg '{}'", path.display()))?;
        Ok(())
    }

    fn clip_attr(&self) -> String {
        match &self.state.clip {
            Some(id) => format!(r#" clip-path="url(#{id})""#),
            None => String::new(),
        }
    }

    /// Element-level paint source: `fill="..."`/`stroke="..."` plus its opacity.
    fn paint_source(&mut self, attr: &str, shader: &Shader) -> RunonResult<String> {
        Ok(match shader {
            Shader::Solid(c) => color_attrs(attr, *c),
            Shader::Linear { start, end, colors } => {
                let id = self.fresh_id("g");
                let n = colors.len().saturating_sub(1).max(1) as f64;
                let stops: String = colors
                    .iter()
                    .enumerate()
                    .map(|(i, c)| {
                        let [r, g, b, _] = c.to_rgba8();
                        format!(
                            r#"<stop offset="{}" stop-color="rgb({r},{g},{b})" stop-opacity="{}"/>"#,
                            i as f64 / n,
                            c.a
                        )
                    })
                    .collect();
                self.defs.push(format!(
                    r#"<linearGradient id="{id}" gradientUnits="userSpaceOnUse" x1="{}" y1="{}" x2="{}" y2="{}">{stops}</linearGradient>"#,
                    start.x, start.y, end.x, end.y
                ));
                format!(r#"{attr}="url(#{id})""#)
            }
            Shader::Image { image, rect, .. } => {
                let id = self.fresh_id("p");
                let href = png_data_uri(image)?;
                self.defs.push(format!(
                    r#"<pattern id="{id}" patternUnits="userSpaceOnUse" x="{x}" y="{y}" width="{w}" height="{h}"><image x="0" y="0" width="{w}" height="{h}" preserveAspectRatio="none" xlink:href="{href}"/></pattern>"#,
                    x = rect.x0,
                    y = rect.y0,
                    w = rect.width(),
                    h = rect.height(),
                ));
                format!(r#"{attr}="url(#{id})""#)
            }
        })
    }

    fn effect_attrs(&mut self, paint: &Paint) -> String {
        let mut out = String::new();
        if paint.alpha < 1.0 {
            out.push_str(&format!(r#" opacity="{}""#, paint.alpha.clamp(0.0, 1.0)));
        }
        if paint.blend != BlendMode::Normal {
            out.push_str(&format!(
                r#" style="mix-blend-mode:{}""#,
                paint.blend.css_name()
            ));
        }
        if let Some(sigma) = paint.blur
            && sigma > 0.0
        {
            let id = self.fresh_id("f");
            self.defs.push(format!(
                r#"<filter id="{id}" x="-50%" y="-50%" width="200%" height="200%"><feGaussianBlur stdDeviation="{sigma}"/></filter>"#
            ));
            out.push_str(&format!(r#" filter="url(#{id})""#));
        }
        if !paint.anti_alias {
            out.push_str(r#" shape-rendering="crispEdges""#);
        }
        out
    }
}

fn matrix_attr(t: Affine) -> String {
    if t == Affine::IDENTITY {
        return String::new();
    }
    let [a, b, c, d, e, f] = t.as_coeffs();
    format!(r#" transform="matrix({a} {b} {c} {d} {e} {f})""#)
}

fn color_attrs(attr: &str, c: Color) -> String {
    let [r, g, b, _] = c.to_rgba8();
    if c.a < 1.0 {
        format!(r#"{attr}="rgb({r},{g},{b})" {attr}-opacity="{}""#, c.a)
    } else {
        format!(r#"{attr}="rgb({r},{g},{b})""#)
    }
}

fn stroke_attrs(params: &StrokeParams) -> String {
    let mut out = format!(r#" stroke-width="{}" stroke-linejoin="miter""#, params.width);
    if let Some(m) = params.miter {
        out.push_str(&format!(r#" stroke-miterlimit="{m}""#));
    }
    if let Some(d) = &params.dash
        && !d.dashes.is_empty()
    {
        let list: Vec<String> = d.dashes.iter().map(|v| v.to_string()).collect();
        out.push_str(&format!(
            r#" stroke-dasharray="{}" stroke-dashoffset="{}""#,
            list.join(" "),
            d.offset
        ));
    }
    out
}

fn png_data_uri(frame: &FrameRGBA) -> RunonResult<String> {
    let png = encode_png(frame)?;
    Ok(format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(png)
    ))
}

impl Canvas for SvgCanvas {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn save(&mut self) {
        self.state.save();
    }

    fn restore(&mut self) {
        if !self.state.restore() {
            tracing::debug!("restore without matching save");
        }
    }

    fn transform(&self) -> Affine {
        self.state.transform
    }

    fn concat(&mut self, t: Affine) {
        self.state.transform *= t;
    }

    fn clip_path(&mut self, path: &BezPath) {
        let id = self.fresh_id("c");
        let parent = self.clip_attr();
        self.defs.push(format!(
            r#"<clipPath id="{id}"{parent}><path d="{}"{}/></clipPath>"#,
            path.to_svg(),
            matrix_attr(self.state.transform)
        ));
        self.state.clip = Some(id);
    }

    fn clear(&mut self, color: Color) {
        self.body.clear();
        self.body.push(format!(
            r#"<rect x="0" y="0" width="{}" height="{}" {}/>"#,
            self.width,
            self.height,
            color_attrs("fill", color)
        ));
    }

    fn draw_path(&mut self, path: &BezPath, paint: &Paint) -> RunonResult<()> {
        let geometry = match &paint.style {
            PaintStyle::Fill => format!(
                r#"{} stroke="none""#,
                self.paint_source("fill", &paint.shader)?
            ),
            PaintStyle::Stroke(params) => {
                if params.width <= 0.0 {
                    return Ok(());
                }
                format!(
                    r#"fill="none" {}{}"#,
                    self.paint_source("stroke", &paint.shader)?,
                    stroke_attrs(params)
                )
            }
        };
        let effects = self.effect_attrs(paint);
        let el = format!(
            r#"<path d="{}" {geometry}{effects}{}/>"#,
            path.to_svg(),
            matrix_attr(self.state.transform)
        );
        // Clip lives on a wrapper so it is evaluated in document space.
        self.body.push(match self.clip_attr() {
            c if c.is_empty() => el,
            c => format!("<g{c}>{el}</g>"),
        });
        Ok(())
    }

    fn draw_image(&mut self, image: &Arc<FrameRGBA>, dst: Rect, paint: &Paint) -> RunonResult<()> {
        let href = png_data_uri(image)?;
        let effects = self.effect_attrs(paint);
        let el = format!(
            r#"<image x="{}" y="{}" width="{}" height="{}" preserveAspectRatio="none" xlink:href="{href}"{effects}{}/>"#,
            dst.x0,
            dst.y0,
            dst.width(),
            dst.height(),
            matrix_attr(self.state.transform)
        );
        self.body.push(match self.clip_attr() {
            c if c.is_empty() => el,
            c => format!("<g{c}>{el}</g>"),
        });
        Ok(())
    }

    fn draw_text(&mut self, text: &str, origin: Point, size: f64, color: Color) -> RunonResult<()> {
        let el = text_element(text, origin.x, origin.y, size, color);
        let t = matrix_attr(self.state.transform);
        self.body.push(match self.clip_attr() {
            c if c.is_empty() => format!("<g{t}>{el}</g>"),
            c => format!("<g{c}><g{t}>{el}</g></g>"),
        });
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/svg.rs"]
mod tests;
