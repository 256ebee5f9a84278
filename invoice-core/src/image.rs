//! Decoding of the header logo into data a PDF image XObject can carry.

use std::path::Path;

use crate::error::{InvoiceError, Result};
use crate::graphics::Rect;

/// Handle to an image owned by an `InvoiceDocument`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    DeviceRGB,
    DeviceGray,
}

impl ColorSpace {
    pub fn pdf_name(&self) -> &'static str {
        match self {
            ColorSpace::DeviceRGB => "DeviceRGB",
            ColorSpace::DeviceGray => "DeviceGray",
        }
    }
}

/// Decoded image ready for embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub format: ImageFormat,
    pub color_space: ColorSpace,
    /// 8-bit samples for PNG, the untouched file for JPEG (DCTDecode).
    pub data: Vec<u8>,
    /// Separate 8-bit alpha plane, when the source had one.
    pub alpha: Option<Vec<u8>>,
}

/// Sniff JPEG or PNG from magic bytes.
pub fn detect_format(data: &[u8]) -> Result<ImageFormat> {
    match data {
        [0xFF, 0xD8, ..] => Ok(ImageFormat::Jpeg),
        [0x89, b'P', b'N', b'G', ..] => Ok(ImageFormat::Png),
        _ => Err(InvoiceError::Image(
            "unsupported image format (expected JPEG or PNG)".to_string(),
        )),
    }
}

pub fn load_image(data: Vec<u8>) -> Result<ImageData> {
    match detect_format(&data)? {
        ImageFormat::Jpeg => parse_jpeg(data),
        ImageFormat::Png => parse_png(&data),
    }
}

pub fn load_image_file<P: AsRef<Path>>(path: P) -> Result<ImageData> {
    load_image(std::fs::read(path)?)
}

/// Load the optional header logo.
///
/// A missing file is the normal "no logo" case and yields `None` quietly.
/// An unreadable or undecodable file also yields `None`, with a warning.
pub fn load_logo(path: &Path) -> Option<ImageData> {
    if !path.is_file() {
        log::debug!("no logo at {}, skipping logo region", path.display());
        return None;
    }
    match load_image_file(path) {
        Ok(image) => Some(image),
        Err(e) => {
            log::warn!("ignoring logo {}: {}", path.display(), e);
            None
        }
    }
}

fn parse_jpeg(data: Vec<u8>) -> Result<ImageData> {
    let (width, height, components) = jpeg_dimensions(&data)?;
    let color_space = match components {
        1 => ColorSpace::DeviceGray,
        3 => ColorSpace::DeviceRGB,
        n => {
            return Err(InvoiceError::Image(format!(
                "unsupported JPEG component count {n} (expected 1 or 3)"
            )))
        }
    };
    Ok(ImageData {
        width,
        height,
        format: ImageFormat::Jpeg,
        color_space,
        data,
        alpha: None,
    })
}

/// Walk JPEG segments until a SOF0..SOF3 marker and read its frame header.
fn jpeg_dimensions(data: &[u8]) -> Result<(u32, u32, u8)> {
    let mut i = 2;
    while i + 3 < data.len() {
        if data[i] != 0xFF {
            i += 1;
            continue;
        }
        let marker = data[i + 1];
        match marker {
            0xC0..=0xC3 => {
                if i + 9 >= data.len() {
                    break;
                }
                let height = u16::from_be_bytes([data[i + 5], data[i + 6]]) as u32;
                let width = u16::from_be_bytes([data[i + 7], data[i + 8]]) as u32;
                return Ok((width, height, data[i + 9]));
            }
            0xFF | 0x00 => i += 1,
            0xD0..=0xD9 => i += 2,
            _ => {
                let seg_len = u16::from_be_bytes([data[i + 2], data[i + 3]]) as usize;
                i += 2 + seg_len;
            }
        }
    }
    Err(InvoiceError::Image("no SOF marker in JPEG data".to_string()))
}

fn parse_png(data: &[u8]) -> Result<ImageData> {
    let mut decoder = png::Decoder::new(data);
    // Palette and sub-byte images expand to 8-bit samples.
    decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
    let mut reader = decoder
        .read_info()
        .map_err(|e| InvoiceError::Image(format!("PNG decode error: {e}")))?;

    let mut buf = vec![0u8; reader.output_buffer_size()];
    let info = reader
        .next_frame(&mut buf)
        .map_err(|e| InvoiceError::Image(format!("PNG frame error: {e}")))?;
    buf.truncate(info.buffer_size());

    let (color_space, data, alpha) = match info.color_type {
        png::ColorType::Rgb => (ColorSpace::DeviceRGB, buf, None),
        png::ColorType::Grayscale => (ColorSpace::DeviceGray, buf, None),
        png::ColorType::Rgba => {
            let (rgb, alpha) = split_alpha(&buf, 4);
            (ColorSpace::DeviceRGB, rgb, Some(alpha))
        }
        png::ColorType::GrayscaleAlpha => {
            let (gray, alpha) = split_alpha(&buf, 2);
            (ColorSpace::DeviceGray, gray, Some(alpha))
        }
        other => {
            return Err(InvoiceError::Image(format!(
                "unsupported PNG color type {other:?}"
            )))
        }
    };

    Ok(ImageData {
        width: info.width,
        height: info.height,
        format: ImageFormat::Png,
        color_space,
        data,
        alpha,
    })
}

/// Split interleaved samples whose last channel is alpha.
fn split_alpha(buf: &[u8], channels: usize) -> (Vec<u8>, Vec<u8>) {
    let pixels = buf.len() / channels;
    let mut color = Vec::with_capacity(pixels * (channels - 1));
    let mut alpha = Vec::with_capacity(pixels);
    for px in buf.chunks_exact(channels) {
        color.extend_from_slice(&px[..channels - 1]);
        alpha.push(px[channels - 1]);
    }
    (color, alpha)
}

/// Scale an image into `bounds` preserving aspect ratio, centered.
pub fn fit_within(img_width: u32, img_height: u32, bounds: &Rect) -> Rect {
    let iw = img_width.max(1) as f64;
    let ih = img_height.max(1) as f64;
    let scale = (bounds.width / iw).min(bounds.height / ih);
    let width = iw * scale;
    let height = ih * scale;
    Rect {
        x: bounds.x + (bounds.width - width) / 2.0,
        y: bounds.y + (bounds.height - height) / 2.0,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_png(width: u32, height: u32, color: png::ColorType, pixels: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut out, width, height);
            encoder.set_color(color);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header().unwrap();
            writer.write_image_data(pixels).unwrap();
        }
        out
    }

    #[test]
    fn detects_formats() {
        assert_eq!(detect_format(&[0xFF, 0xD8, 0xFF, 0xE0]).unwrap(), ImageFormat::Jpeg);
        assert_eq!(
            detect_format(&[0x89, b'P', b'N', b'G', 0x0D]).unwrap(),
            ImageFormat::Png
        );
        assert!(detect_format(&[0, 1, 2, 3]).is_err());
        assert!(detect_format(&[]).is_err());
    }

    #[test]
    fn decodes_rgb_png() {
        let png = encode_png(2, 1, png::ColorType::Rgb, &[255, 0, 0, 0, 0, 255]);
        let img = load_image(png).unwrap();
        assert_eq!((img.width, img.height), (2, 1));
        assert_eq!(img.color_space, ColorSpace::DeviceRGB);
        assert_eq!(img.data, vec![255, 0, 0, 0, 0, 255]);
        assert!(img.alpha.is_none());
    }

    #[test]
    fn splits_rgba_alpha() {
        let png = encode_png(1, 2, png::ColorType::Rgba, &[1, 2, 3, 128, 4, 5, 6, 255]);
        let img = load_image(png).unwrap();
        assert_eq!(img.data, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(img.alpha, Some(vec![128, 255]));
    }

    #[test]
    fn reads_jpeg_frame_header() {
        // SOI, APP0 (len 4, 2 payload bytes), SOF0 8-bit 30x20 3 components.
        let jpeg = vec![
            0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x04, 0x00, 0x00, 0xFF, 0xC0, 0x00, 0x11, 0x08, 0x00,
            0x14, 0x00, 0x1E, 0x03, 0x00, 0x00,
        ];
        let img = load_image(jpeg).unwrap();
        assert_eq!((img.width, img.height), (30, 20));
        assert_eq!(img.color_space, ColorSpace::DeviceRGB);
        assert_eq!(img.format, ImageFormat::Jpeg);
    }

    #[test]
    fn fit_preserves_aspect_and_centers() {
        let placed = fit_within(200, 100, &Rect::new(40.0, 750.0, 60.0, 60.0));
        assert_eq!(placed.width, 60.0);
        assert_eq!(placed.height, 30.0);
        assert_eq!(placed.x, 40.0);
        assert_eq!(placed.y, 765.0);
    }

    #[test]
    fn missing_logo_is_none() {
        assert!(load_logo(Path::new("definitely/not/here.png")).is_none());
    }
}
