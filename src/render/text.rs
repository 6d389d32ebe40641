//! Placeholder text (error messages, overlays) rendered through `usvg`/`resvg`.
//!
//! Pens arrive with glyph outlines already resolved; this module only exists so canvases can
//! print short diagnostic strings.

use crate::foundation::color::Color;
use crate::foundation::core::FrameRGBA;
use crate::foundation::error::{RunonError, RunonResult};
use anyhow::Context;
use std::sync::{Arc, OnceLock};

/// Family requested for placeholder text.
pub const FONT_FAMILY: &str = "sans-serif";

fn font_db() -> Arc<usvg::fontdb::Database> {
    static DB: OnceLock<Arc<usvg::fontdb::Database>> = OnceLock::new();
    DB.get_or_init(|| {
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();
        tracing::debug!(faces = db.faces().count(), "loaded system fonts");
        Arc::new(db)
    })
    .clone()
}

/// Escape the XML special characters of `s`.
pub fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

/// `<text>` element with its baseline at `(x, y)`.
pub fn text_element(text: &str, x: f64, y: f64, size: f64, color: Color) -> String {
    let [r, g, b, _] = color.to_rgba8();
    format!(
        r#"<text x="{x}" y="{y}" font-family="{FONT_FAMILY}" font-size="{size}" fill="rgb({r},{g},{b})" fill-opacity="{}">{}</text>"#,
        color.a,
        xml_escape(text)
    )
}

/// Parse an SVG document with the shared system font database.
pub fn parse_svg(data: &[u8]) -> RunonResult<usvg::Tree> {
    let opts = usvg::Options {
        fontdb: font_db(),
        ..usvg::Options::default()
    };
    let tree = usvg::Tree::from_data(data, &opts).context("parse svg tree")?;
    Ok(tree)
}

/// Rasterize `tree` into a `width x height` premultiplied frame.
pub fn rasterize_svg(tree: &usvg::Tree, width: u32, height: u32) -> RunonResult<FrameRGBA> {
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| RunonError::render(format!("failed to allocate {width}x{height} pixmap")))?;
    let sx = width as f32 / tree.size().width();
    let sy = height as f32 / tree.size().height();
    resvg::render(
        tree,
        resvg::tiny_skia::Transform::from_scale(sx, sy),
        &mut pixmap.as_mut(),
    );
    FrameRGBA::from_premul(width, height, pixmap.data().to_vec())
}

/// Render one line of text into a transparent frame of the given size.
pub fn render_text(
    text: &str,
    x: f64,
    y: f64,
    size: f64,
    color: Color,
    width: u32,
    height: u32,
) -> RunonResult<FrameRGBA> {
    if width == 0 || height == 0 {
        return Ok(FrameRGBA::transparent(width, height));
    }
    let doc = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}">{}</svg>"#,
        text_element(text, x, y, size, color)
    );
    let tree = parse_svg(doc.as_bytes())?;
    rasterize_svg(&tree, width, height)
}

#[cfg(test)]
#[path = "../../tests/unit/render/text.rs"]
mod tests;
