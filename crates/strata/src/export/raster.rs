//! Raster export: PNG and JPEG encodings of the rendered SVG.
//!
//! # Overview
//!
//! Exported items:
//! - [`RasterOptions`]: Scale, background, and JPEG quality knobs
//! - [`RasterError`]: What can go wrong between SVG text and encoded bytes
//! - [`svg_to_png`] / [`svg_to_jpeg`]: The conversions
//!
//! The pipeline re-parses the generated SVG with `usvg`, rasterizes it with
//! `resvg` into a `tiny-skia` pixmap, and encodes that. JPEG has no alpha
//! channel, so it additionally demands an explicitly opaque background; the
//! exporter refuses to guess one.

use image::{ExtendedColorType, codecs::jpeg::JpegEncoder};
use thiserror::Error;

use strata_core::color::Color;

/// Failures in the SVG-to-raster pipeline.
#[derive(Debug, Error)]
pub enum RasterError {
    /// The generated SVG did not parse back for rasterization.
    #[error("failed to parse generated SVG: {0}")]
    SvgParse(#[from] usvg::Error),

    /// The pixel buffer could not be allocated.
    #[error("failed to allocate a {width}x{height} pixmap")]
    PixmapAlloc { width: u32, height: u32 },

    /// PNG encoding failed.
    #[error("failed to encode PNG: {0}")]
    PngEncode(String),

    /// JPEG cannot represent transparency.
    #[error("JPEG export requires an opaque background color")]
    JpegOpaqueBackgroundRequired,

    /// The configured quality is outside the encoder's range.
    #[error("JPEG quality must be between 1 and 100, got {0}")]
    JpegQualityOutOfRange(u8),

    /// JPEG encoding failed.
    #[error("failed to encode JPEG: {0}")]
    JpegEncode(#[from] image::ImageError),
}

/// Options for rasterizing an SVG document.
#[derive(Debug, Clone)]
pub struct RasterOptions {
    /// Scale factor applied on top of the document's pixel size.
    pub scale: f32,
    /// Color filled under the artwork before rendering.
    pub background: Option<Color>,
    /// JPEG encoder quality, 1-100.
    pub jpeg_quality: u8,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            scale: 1.0,
            background: None,
            jpeg_quality: 90,
        }
    }
}

/// Renders SVG text to PNG bytes.
pub fn svg_to_png(svg: &str, options: &RasterOptions) -> Result<Vec<u8>, RasterError> {
    let pixmap = svg_to_pixmap(svg, options)?;
    pixmap
        .encode_png()
        .map_err(|err| RasterError::PngEncode(err.to_string()))
}

/// Renders SVG text to JPEG bytes.
///
/// # Errors
///
/// Returns [`RasterError::JpegOpaqueBackgroundRequired`] when the options
/// carry no background or a translucent one, and
/// [`RasterError::JpegQualityOutOfRange`] when the quality is 0 or above 100.
pub fn svg_to_jpeg(svg: &str, options: &RasterOptions) -> Result<Vec<u8>, RasterError> {
    if !options
        .background
        .is_some_and(|background| background.is_opaque())
    {
        return Err(RasterError::JpegOpaqueBackgroundRequired);
    }
    if options.jpeg_quality == 0 || options.jpeg_quality > 100 {
        return Err(RasterError::JpegQualityOutOfRange(options.jpeg_quality));
    }

    let pixmap = svg_to_pixmap(svg, options)?;
    let (width, height) = (pixmap.width(), pixmap.height());

    // tiny-skia renders premultiplied RGBA. Over an opaque background the
    // alpha channel is 255 everywhere, so the bytes can be dropped as-is.
    let rgba = pixmap.data();
    let mut rgb = vec![0u8; width as usize * height as usize * 3];
    for (src, dst) in rgba.chunks_exact(4).zip(rgb.chunks_exact_mut(3)) {
        dst[0] = src[0];
        dst[1] = src[1];
        dst[2] = src[2];
    }

    let mut out = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut out, options.jpeg_quality);
    encoder.encode(&rgb, width, height, ExtendedColorType::Rgb8)?;
    Ok(out)
}

fn svg_to_pixmap(svg: &str, options: &RasterOptions) -> Result<tiny_skia::Pixmap, RasterError> {
    let mut usvg_options = usvg::Options::default();
    usvg_options.fontdb_mut().load_system_fonts();

    let tree = usvg::Tree::from_str(svg, &usvg_options)?;
    let size = tree.size();
    let width = (size.width() * options.scale).ceil().max(1.0) as u32;
    let height = (size.height() * options.scale).ceil().max(1.0) as u32;

    let mut pixmap =
        tiny_skia::Pixmap::new(width, height).ok_or(RasterError::PixmapAlloc { width, height })?;

    if let Some(background) = options.background {
        pixmap.fill(tiny_skia_color(background));
    }

    resvg::render(
        &tree,
        tiny_skia::Transform::from_scale(options.scale, options.scale),
        &mut pixmap.as_mut(),
    );
    Ok(pixmap)
}

fn tiny_skia_color(color: Color) -> tiny_skia::Color {
    let [r, g, b, a] = color.to_srgb_components();
    // from_rgba refuses NaN components; a background fill falls back to
    // white instead of aborting the export.
    tiny_skia::Color::from_rgba(
        r.clamp(0.0, 1.0),
        g.clamp(0.0, 1.0),
        b.clamp(0.0, 1.0),
        a.clamp(0.0, 1.0),
    )
    .unwrap_or(tiny_skia::Color::WHITE)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL_SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="40" height="30" viewBox="0 0 40 30"><rect width="40" height="30" fill="black"/></svg>"#;

    fn png_dimensions(bytes: &[u8]) -> (u32, u32) {
        // IHDR is the first chunk: signature (8) + length (4) + type (4),
        // then width and height as big-endian u32s
        let width = u32::from_be_bytes([bytes[16], bytes[17], bytes[18], bytes[19]]);
        let height = u32::from_be_bytes([bytes[20], bytes[21], bytes[22], bytes[23]]);
        (width, height)
    }

    #[test]
    fn test_png_has_signature_and_document_size() {
        let bytes = svg_to_png(MINIMAL_SVG, &RasterOptions::default()).unwrap();
        assert!(bytes.starts_with(b"\x89PNG\r\n\x1a\n"));
        assert_eq!(png_dimensions(&bytes), (40, 30));
    }

    #[test]
    fn test_scale_multiplies_pixel_dimensions() {
        let options = RasterOptions {
            scale: 2.0,
            ..RasterOptions::default()
        };
        let bytes = svg_to_png(MINIMAL_SVG, &options).unwrap();
        assert_eq!(png_dimensions(&bytes), (80, 60));
    }

    #[test]
    fn test_jpeg_has_signature() {
        let options = RasterOptions {
            background: Some(Color::new("white").unwrap()),
            ..RasterOptions::default()
        };
        let bytes = svg_to_jpeg(MINIMAL_SVG, &options).unwrap();
        assert!(bytes.starts_with(&[0xFF, 0xD8, 0xFF]));
    }

    #[test]
    fn test_jpeg_without_background_is_rejected() {
        let err = svg_to_jpeg(MINIMAL_SVG, &RasterOptions::default()).unwrap_err();
        assert!(matches!(err, RasterError::JpegOpaqueBackgroundRequired));
    }

    #[test]
    fn test_jpeg_with_translucent_background_is_rejected() {
        let options = RasterOptions {
            background: Some(Color::new("white").unwrap().with_alpha(0.5)),
            ..RasterOptions::default()
        };
        let err = svg_to_jpeg(MINIMAL_SVG, &options).unwrap_err();
        assert!(matches!(err, RasterError::JpegOpaqueBackgroundRequired));
    }

    #[test]
    fn test_jpeg_quality_out_of_range_is_rejected() {
        for quality in [0, 101] {
            let options = RasterOptions {
                background: Some(Color::new("white").unwrap()),
                jpeg_quality: quality,
                ..RasterOptions::default()
            };
            let err = svg_to_jpeg(MINIMAL_SVG, &options).unwrap_err();
            assert!(matches!(err, RasterError::JpegQualityOutOfRange(q) if q == quality));
        }
    }

    #[test]
    fn test_garbage_svg_is_a_parse_error() {
        let err = svg_to_png("not an svg document", &RasterOptions::default()).unwrap_err();
        assert!(matches!(err, RasterError::SvgParse(_)));
    }
}
