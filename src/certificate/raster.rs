//! Certificate rasterization and saving

use super::font::{glyph, text_width, GLYPH_HEIGHT, GLYPH_WIDTH};
use super::{CertificateKind, CertificateView, LineRole};
use crate::error::UiError;
use image::{Rgb, RgbImage};
use std::path::{Path, PathBuf};

/// Turns a certificate view into encoded image bytes
pub trait Rasterizer: Send + Sync {
    fn rasterize(&self, view: &CertificateView) -> Result<Vec<u8>, UiError>;
}

/// Page size at scale 1
const BASE_WIDTH: u32 = 800;
const BASE_HEIGHT: u32 = 566;

const WHITE: Rgb<u8> = Rgb([0xff, 0xff, 0xff]);
const INK: Rgb<u8> = Rgb([0x33, 0x33, 0x33]);
const MUTED: Rgb<u8> = Rgb([0x66, 0x66, 0x66]);
const PARTICIPANT_ACCENT: Rgb<u8> = Rgb([0x1e, 0x3a, 0x8a]);
const WINNER_ACCENT: Rgb<u8> = Rgb([0xb4, 0x53, 0x09]);

/// Built-in JPEG rasterizer: bordered white page, bitmap text
#[derive(Debug, Clone, Copy)]
pub struct JpegRasterizer {
    pub scale: u32,
    pub quality: u8,
}

impl Default for JpegRasterizer {
    fn default() -> Self {
        Self {
            scale: 2,
            quality: 95,
        }
    }
}

impl JpegRasterizer {
    fn accent(kind: CertificateKind) -> Rgb<u8> {
        match kind {
            CertificateKind::Participant => PARTICIPANT_ACCENT,
            CertificateKind::Winner => WINNER_ACCENT,
        }
    }

    /// Draw the page into an RGB buffer
    pub fn paint(&self, view: &CertificateView) -> RgbImage {
        let s = self.scale.max(1);
        let (width, height) = (BASE_WIDTH * s, BASE_HEIGHT * s);
        let accent = Self::accent(view.kind);
        let mut canvas = RgbImage::from_pixel(width, height, WHITE);

        // Double frame
        frame(&mut canvas, 12 * s, 8 * s, accent);
        frame(&mut canvas, 26 * s, s, accent);

        let mut y = 60 * s;
        for (role, text) in view.body() {
            let (px, color, gap) = match role {
                LineRole::Title => (5 * s, accent, 22),
                LineRole::Subtitle => (3 * s, INK, 34),
                LineRole::Body => (2 * s, INK, 22),
                LineRole::Name => (5 * s, INK, 30),
                LineRole::Event => (4 * s, accent, 30),
            };
            let w = text_width(&text, px).min(width);
            draw_text(&mut canvas, (width - w) / 2, y, &text, px, color);
            if role == LineRole::Name {
                // Underline the recipient
                let line_y = y + (GLYPH_HEIGHT + 3) * px;
                fill(&mut canvas, (width - w) / 2, line_y, w, 2 * s, accent);
            }
            y += GLYPH_HEIGHT * px + gap * s;
        }

        // Footer: id left, organizer center, date right
        let footer_y = height - 90 * s;
        let margin = 60 * s;
        let small = 2 * s;
        draw_text(&mut canvas, margin, footer_y, "Certificate ID", small, MUTED);
        draw_text(&mut canvas, margin, footer_y + 22 * s, &view.certificate_id, small, INK);

        let sig_w = 200 * s;
        let sig_x = (width - sig_w) / 2;
        fill(&mut canvas, sig_x, footer_y - 6 * s, sig_w, 2 * s, INK);
        let organizer = "Event Organizer";
        let ow = text_width(organizer, small);
        draw_text(&mut canvas, (width - ow) / 2, footer_y, organizer, small, INK);

        let label = "Date of Issue";
        let lw = text_width(label, small);
        let dw = text_width(&view.issue_date, small);
        draw_text(&mut canvas, width.saturating_sub(margin + lw), footer_y, label, small, MUTED);
        draw_text(
            &mut canvas,
            width.saturating_sub(margin + dw),
            footer_y + 22 * s,
            &view.issue_date,
            small,
            INK,
        );

        canvas
    }
}

impl Rasterizer for JpegRasterizer {
    fn rasterize(&self, view: &CertificateView) -> Result<Vec<u8>, UiError> {
        let canvas = self.paint(view);
        let mut bytes = Vec::new();
        image::codecs::jpeg::JpegEncoder::new_with_quality(&mut bytes, self.quality).encode(
            canvas.as_raw(),
            canvas.width(),
            canvas.height(),
            image::ColorType::Rgb8.into(),
        )?;
        Ok(bytes)
    }
}

/// Write encoded bytes into `dir/filename`, creating the directory
pub fn save_certificate(dir: &Path, filename: &str, bytes: &[u8]) -> Result<PathBuf, UiError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(filename);
    std::fs::write(&path, bytes)?;
    tracing::info!(path = %path.display(), size = bytes.len(), "certificate saved");
    Ok(path)
}

/// Clipped rectangle fill
fn fill(canvas: &mut RgbImage, x: u32, y: u32, w: u32, h: u32, color: Rgb<u8>) {
    let x_end = (x + w).min(canvas.width());
    let y_end = (y + h).min(canvas.height());
    for py in y..y_end {
        for px in x..x_end {
            canvas.put_pixel(px, py, color);
        }
    }
}

/// Rectangular frame `inset` pixels from the edge, `thickness` wide
fn frame(canvas: &mut RgbImage, inset: u32, thickness: u32, color: Rgb<u8>) {
    let (w, h) = (canvas.width(), canvas.height());
    if w <= 2 * inset || h <= 2 * inset {
        return;
    }
    let inner_w = w - 2 * inset;
    let inner_h = h - 2 * inset;
    fill(canvas, inset, inset, inner_w, thickness, color);
    fill(canvas, inset, h - inset - thickness, inner_w, thickness, color);
    fill(canvas, inset, inset, thickness, inner_h, color);
    fill(canvas, w - inset - thickness, inset, thickness, inner_h, color);
}

fn draw_text(canvas: &mut RgbImage, x: u32, y: u32, text: &str, px: u32, color: Rgb<u8>) {
    let mut cursor = x;
    for c in text.chars() {
        let rows = glyph(c);
        for (row, bits) in rows.iter().enumerate() {
            for col in 0..GLYPH_WIDTH {
                if bits & (1 << (GLYPH_WIDTH - 1 - col)) != 0 {
                    fill(
                        canvas,
                        cursor + col * px,
                        y + row as u32 * px,
                        px,
                        px,
                        color,
                    );
                }
            }
        }
        cursor += (GLYPH_WIDTH + 1) * px;
        if cursor >= canvas.width() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::certificate::CertificateData;
    use chrono::Local;

    fn view(kind: &str) -> CertificateView {
        let data = CertificateData {
            name: Some("Jane Doe".to_string()),
            event: Some("Hack Night".to_string()),
            certificate_type: Some(kind.to_string()),
            ..Default::default()
        };
        CertificateView::build(&data, Local::now())
    }

    #[test]
    fn test_paint_dimensions_follow_scale() {
        let canvas = JpegRasterizer {
            scale: 1,
            quality: 80,
        }
        .paint(&view("participation"));
        assert_eq!((canvas.width(), canvas.height()), (BASE_WIDTH, BASE_HEIGHT));
        // Outer frame uses the participant accent
        assert_eq!(*canvas.get_pixel(14, 14), PARTICIPANT_ACCENT);
        assert_eq!(*canvas.get_pixel(0, 0), WHITE);
    }

    #[test]
    fn test_winner_accent() {
        let canvas = JpegRasterizer {
            scale: 1,
            quality: 80,
        }
        .paint(&view("winner"));
        assert_eq!(*canvas.get_pixel(14, 14), WINNER_ACCENT);
    }

    #[test]
    fn test_rasterize_produces_jpeg() {
        let bytes = JpegRasterizer {
            scale: 1,
            quality: 80,
        }
        .rasterize(&view("winner"))
        .unwrap();
        // JPEG SOI marker
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_save_certificate_writes_file() {
        let dir = std::env::temp_dir().join(format!("eventdesk-cert-{}", std::process::id()));
        let path = save_certificate(&dir, "test.jpg", &[1, 2, 3]).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), vec![1, 2, 3]);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
