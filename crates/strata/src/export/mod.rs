//! Export backends.
//!
//! A laid-out scene is painted onto an [`SvgSurface`], and the resulting
//! SVG document is either written out as text or handed to the raster
//! pipeline for PNG and JPEG encoding.

mod raster;
mod svg;

use std::path::Path;

pub use raster::{RasterError, RasterOptions, svg_to_jpeg, svg_to_png};
pub use svg::SvgSurface;

/// Output encodings the exporter can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// Lossless raster output.
    Png,
    /// Lossy raster output; requires an opaque background.
    Jpeg,
    /// The SVG document itself.
    Svg,
}

impl ImageFormat {
    /// Infers the format from a file extension, case-insensitively.
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "svg" => Some(Self::Svg),
            _ => None,
        }
    }

    /// Returns the canonical lowercase name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Svg => "svg",
        }
    }
}

impl std::str::FromStr for ImageFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "svg" => Ok(Self::Svg),
            other => Err(format!(
                "unknown image format `{other}`, valid values: png, jpeg, svg"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            ImageFormat::from_path(Path::new("diagram.png")),
            Some(ImageFormat::Png)
        );
        assert_eq!(
            ImageFormat::from_path(Path::new("out/figure.JPG")),
            Some(ImageFormat::Jpeg)
        );
        assert_eq!(
            ImageFormat::from_path(Path::new("figure.svg")),
            Some(ImageFormat::Svg)
        );
        assert_eq!(ImageFormat::from_path(Path::new("figure.webp")), None);
        assert_eq!(ImageFormat::from_path(Path::new("no_extension")), None);
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("png".parse::<ImageFormat>(), Ok(ImageFormat::Png));
        assert_eq!("JPEG".parse::<ImageFormat>(), Ok(ImageFormat::Jpeg));
        assert_eq!("jpg".parse::<ImageFormat>(), Ok(ImageFormat::Jpeg));
        assert!("webp".parse::<ImageFormat>().is_err());
    }
}
