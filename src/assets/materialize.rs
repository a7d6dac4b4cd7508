use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;

use crate::{
    assets::asset::{Asset, AssetSource, normalize_rel_path},
    foundation::error::{StoryError, StoryResult},
};

/// Absolute destination of `asset` under `root`.
pub fn destination(root: &Path, asset_path: &str) -> StoryResult<PathBuf> {
    Ok(root.join(normalize_rel_path(asset_path)?))
}

/// Produce the file for `asset` under `root`, replacing anything already there.
///
/// A missing font yields [`StoryError::MissingResource`] and writes nothing.
pub fn materialize(root: &Path, asset: &Asset) -> StoryResult<()> {
    let dest = destination(root, &asset.path)?;
    let (width, height, rgba) = match &asset.source {
        AssetSource::Solid {
            width,
            height,
            rgba,
        } => solid_pixels(*width, *height, *rgba)?,
        AssetSource::Text {
            text,
            font,
            size_px,
            rgba,
        } => text_pixels(root, text, font, *size_px, *rgba)?,
    };

    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create asset dir '{}'", parent.display()))?;
    }
    image::save_buffer_with_format(
        &dest,
        &rgba,
        width,
        height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write asset '{}'", dest.display()))?;
    Ok(())
}

fn solid_pixels(width: u32, height: u32, rgba: [u8; 4]) -> StoryResult<(u32, u32, Vec<u8>)> {
    if width == 0 || height == 0 {
        return Err(StoryError::validation("solid asset must be at least 1x1"));
    }
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba(rgba));
    Ok((width, height, img.into_raw()))
}

fn text_pixels(
    root: &Path,
    text: &str,
    font: &str,
    size_px: f32,
    rgba: [u8; 4],
) -> StoryResult<(u32, u32, Vec<u8>)> {
    if !size_px.is_finite() || size_px <= 0.0 {
        return Err(StoryError::validation(
            "text size_px must be finite and > 0",
        ));
    }
    let font_path = root.join(normalize_rel_path(font)?);
    if !font_path.is_file() {
        return Err(StoryError::missing_resource(format!(
            "font '{}' not found",
            font_path.display()
        )));
    }

    let mut db = usvg::fontdb::Database::new();
    db.load_font_file(&font_path)
        .with_context(|| format!("load font '{}'", font_path.display()))?;
    let family = db
        .faces()
        .find_map(|face| face.families.first().map(|(name, _)| name.clone()))
        .ok_or_else(|| {
            StoryError::missing_resource(format!(
                "font '{}' has no usable face",
                font_path.display()
            ))
        })?;

    // Generous canvas; transparent margins are cropped after rasterization.
    let chars = text.chars().count().max(1) as f32;
    let width = (size_px * (0.75 * chars + 1.0)).ceil() as u32;
    let height = (size_px * 1.6).ceil() as u32;
    let svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}"><text x="{pad}" y="{baseline}" font-family="{family}" font-size="{size_px}" fill="rgb({r},{g},{b})" fill-opacity="{alpha}">{body}</text></svg>"#,
        pad = size_px * 0.25,
        baseline = size_px * 1.15,
        family = escape_xml(&family),
        r = rgba[0],
        g = rgba[1],
        b = rgba[2],
        alpha = f32::from(rgba[3]) / 255.0,
        body = escape_xml(text),
    );

    let opts = usvg::Options {
        fontdb: Arc::new(db),
        ..Default::default()
    };
    let tree = usvg::Tree::from_str(&svg, &opts).context("parse text svg")?;
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| StoryError::validation("failed to allocate text pixmap"))?;
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::default(),
        &mut pixmap.as_mut(),
    );

    let mut data = pixmap.data().to_vec();
    unpremultiply_rgba8_in_place(&mut data);
    Ok(crop_transparent(width, height, data))
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 0 || a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
        }
    }
}

/// Crop to the bounding box of non-transparent pixels; fully transparent images become 1x1.
fn crop_transparent(width: u32, height: u32, data: Vec<u8>) -> (u32, u32, Vec<u8>) {
    let (w, h) = (width as usize, height as usize);
    let mut min_x = w;
    let mut min_y = h;
    let mut max_x = 0;
    let mut max_y = 0;
    for y in 0..h {
        for x in 0..w {
            if data[(y * w + x) * 4 + 3] != 0 {
                min_x = min_x.min(x);
                min_y = min_y.min(y);
                max_x = max_x.max(x);
                max_y = max_y.max(y);
            }
        }
    }
    if min_x > max_x || min_y > max_y {
        return (1, 1, vec![0; 4]);
    }

    let cw = max_x - min_x + 1;
    let ch = max_y - min_y + 1;
    let mut out = Vec::with_capacity(cw * ch * 4);
    for y in min_y..=max_y {
        let row = (y * w + min_x) * 4;
        out.extend_from_slice(&data[row..row + cw * 4]);
    }
    (cw as u32, ch as u32, out)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/materialize.rs"]
mod tests;
