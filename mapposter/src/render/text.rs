//! Glyph rasterization onto a pixmap.

use ab_glyph::{point, Font, FontArc, PxScale, ScaleFont};
use tiny_skia::{Pixmap, PremultipliedColorU8};

use crate::theme::Color;
use crate::typography::{HAlign, TextBlock, VAlign};

/// Points to pixels at `dpi`.
pub fn pt_to_px(pt: f32, dpi: u32) -> f32 {
    pt * dpi as f32 / 72.0
}

/// Advance width of `text` in pixels, including kerning.
pub fn measure(font: &FontArc, text: &str, px: f32) -> f32 {
    let scaled = font.as_scaled(PxScale::from(px));
    let mut width = 0.0;
    let mut prev = None;
    for c in text.chars() {
        let id = scaled.glyph_id(c);
        if let Some(prev) = prev {
            width += scaled.kern(prev, id);
        }
        width += scaled.h_advance(id);
        prev = Some(id);
    }
    width
}

/// Draws a text block anchored at its fractional poster position.
pub fn draw_text(pixmap: &mut Pixmap, font: &FontArc, block: &TextBlock, color: Color, dpi: u32) {
    let px = pt_to_px(block.size_pt, dpi);
    if px <= 0.0 || block.text.is_empty() {
        return;
    }
    let scale = PxScale::from(px);
    let scaled = font.as_scaled(scale);

    let width = pixmap.width() as f32;
    let height = pixmap.height() as f32;
    let anchor_x = block.x * width;
    let anchor_y = (1.0 - block.y) * height;

    let text_width = measure(font, &block.text, px);
    let mut caret = match block.h_align {
        HAlign::Center => anchor_x - text_width / 2.0,
        HAlign::Right => anchor_x - text_width,
    };
    // descent is negative in ab_glyph
    let baseline = match block.v_align {
        VAlign::Baseline => anchor_y,
        VAlign::Bottom => anchor_y + scaled.descent(),
    };

    let mut prev = None;
    for c in block.text.chars() {
        let id = scaled.glyph_id(c);
        if let Some(prev) = prev {
            caret += scaled.kern(prev, id);
        }
        let glyph = id.with_scale_and_position(scale, point(caret, baseline));
        caret += scaled.h_advance(id);
        prev = Some(id);

        let Some(outlined) = font.outline_glyph(glyph) else {
            continue;
        };
        let bounds = outlined.px_bounds();
        outlined.draw(|gx, gy, coverage| {
            let x = bounds.min.x as i32 + gx as i32;
            let y = bounds.min.y as i32 + gy as i32;
            blend_pixel(pixmap, x, y, color, coverage * block.alpha);
        });
    }
}

/// Source-over blend of one pixel.
fn blend_pixel(pixmap: &mut Pixmap, x: i32, y: i32, color: Color, alpha: f32) {
    if x < 0 || y < 0 || alpha <= 0.0 {
        return;
    }
    let (w, h) = (pixmap.width() as i32, pixmap.height() as i32);
    if x >= w || y >= h {
        return;
    }
    let idx = (y * w + x) as usize;
    let pixels = pixmap.pixels_mut();
    let dst = pixels[idx];

    let a = alpha.clamp(0.0, 1.0);
    let inv = 1.0 - a;
    let mix = |src: u8, dst: u8| (src as f32 * a + dst as f32 * inv).round().min(255.0) as u8;
    let out_a = (255.0 * a + dst.alpha() as f32 * inv).round().min(255.0) as u8;
    let r = mix(color.r, dst.red()).min(out_a);
    let g = mix(color.g, dst.green()).min(out_a);
    let b = mix(color.b, dst.blue()).min(out_a);

    if let Some(blended) = PremultipliedColorU8::from_rgba(r, g, b, out_a) {
        pixels[idx] = blended;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tiny_skia::Color as SkColor;

    #[test]
    fn test_pt_to_px() {
        assert_eq!(pt_to_px(72.0, 300), 300.0);
        assert_eq!(pt_to_px(1.0, 72), 1.0);
    }

    #[test]
    fn test_blend_over_opaque_background() {
        let mut pixmap = Pixmap::new(2, 2).unwrap();
        pixmap.fill(SkColor::from_rgba8(0, 0, 0, 255));

        blend_pixel(&mut pixmap, 1, 1, Color::WHITE, 0.5);
        let p = pixmap.pixel(1, 1).unwrap();
        assert_eq!(p.alpha(), 255);
        assert!((127..=128).contains(&p.red()));

        blend_pixel(&mut pixmap, 0, 0, Color::WHITE, 1.0);
        assert_eq!(pixmap.pixel(0, 0).unwrap().red(), 255);
    }

    #[test]
    fn test_blend_out_of_bounds_is_ignored() {
        let mut pixmap = Pixmap::new(2, 2).unwrap();
        blend_pixel(&mut pixmap, -1, 0, Color::WHITE, 1.0);
        blend_pixel(&mut pixmap, 2, 0, Color::WHITE, 1.0);
        assert!(pixmap.pixels().iter().all(|p| p.alpha() == 0));
    }
}
