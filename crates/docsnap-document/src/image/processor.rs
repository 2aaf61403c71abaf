// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor — decode captured stills, area-averaging resize, and
// encoding of finished scans. Operates on in-memory images using the `image`
// and `fast_image_resize` crates.

use docsnap_core::error::DocsnapError;
use docsnap_core::types::OutputFormat;
use fast_image_resize as fir;
use fir::images::{TypedImage, TypedImageRef};
use fir::pixels::U8x4;
use fir::{FilterType, ResizeAlg, ResizeOptions, Resizer};
use image::{DynamicImage, ImageFormat, ImageReader, RgbaImage};
use tracing::{debug, info, instrument};

/// JPEG quality used when accepted scans are saved as JPEG.
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// Image processing pipeline operating on a single in-memory image.
///
/// ```ignore
/// let rgba = ImageProcessor::open("photo.jpg")?.into_rgba8();
/// let png = ImageProcessor::from_rgba(rgba).encode(OutputFormat::Png)?;
/// ```
pub struct ImageProcessor {
    /// The current working image.
    image: DynamicImage,
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Load an image from a file path. The format is sniffed from the file
    /// contents, so a PNG saved under a `.jpg` name still decodes.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self, DocsnapError> {
        let img = ImageReader::open(path.as_ref())?
            .with_guessed_format()?
            .decode()
            .map_err(|err| {
                DocsnapError::ImageError(format!(
                    "failed to open {}: {}",
                    path.as_ref().display(),
                    err
                ))
            })?;
        info!(width = img.width(), height = img.height(), "Image loaded");
        Ok(Self { image: img })
    }

    /// Create a processor from raw encoded bytes (JPEG, PNG, etc.).
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self, DocsnapError> {
        let img = image::load_from_memory(data).map_err(|err| {
            DocsnapError::ImageError(format!("failed to decode image: {}", err))
        })?;
        debug!(
            width = img.width(),
            height = img.height(),
            "Image decoded from bytes"
        );
        Ok(Self { image: img })
    }

    /// Wrap a 4-channel 8-bit buffer.
    pub fn from_rgba(image: RgbaImage) -> Self {
        Self {
            image: DynamicImage::ImageRgba8(image),
        }
    }

    // -- Accessors ------------------------------------------------------------

    /// Current image width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Current image height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Consume the processor and return the image as 4-channel 8-bit RGBA,
    /// the layout the rectifier expects.
    pub fn into_rgba8(self) -> RgbaImage {
        match self.image {
            DynamicImage::ImageRgba8(rgba) => rgba,
            other => other.to_rgba8(),
        }
    }

    // -- Output ---------------------------------------------------------------

    /// Encode the current image in the given output format.
    pub fn encode(&self, format: OutputFormat) -> Result<Vec<u8>, DocsnapError> {
        match format {
            OutputFormat::Png => self.to_png_bytes(),
            OutputFormat::Jpeg => self.to_jpeg_bytes(DEFAULT_JPEG_QUALITY),
        }
    }

    /// Encode the current image as PNG bytes (lossless).
    pub fn to_png_bytes(&self) -> Result<Vec<u8>, DocsnapError> {
        encode_to_format(&self.image, ImageFormat::Png)
    }

    /// Encode the current image as JPEG bytes with the given quality (1-100).
    pub fn to_jpeg_bytes(&self, quality: u8) -> Result<Vec<u8>, DocsnapError> {
        let mut buffer = Vec::new();
        let rgb = self.image.to_rgb8();
        let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, quality);
        rgb.write_with_encoder(encoder).map_err(|err| {
            DocsnapError::ImageError(format!("JPEG encoding failed: {}", err))
        })?;
        Ok(buffer)
    }
}

/// Resample an RGBA buffer to `width` x `height` using a box convolution,
/// which averages every source pixel covered by a destination pixel when
/// shrinking.
pub fn resize_area(image: &RgbaImage, width: u32, height: u32) -> Result<RgbaImage, DocsnapError> {
    if image.width() == 0 || image.height() == 0 || width == 0 || height == 0 {
        return Err(DocsnapError::ImageError(format!(
            "cannot resize {}x{} to {}x{}",
            image.width(),
            image.height(),
            width,
            height
        )));
    }
    if image.dimensions() == (width, height) {
        return Ok(image.clone());
    }

    let src = TypedImageRef::<U8x4>::from_buffer(image.width(), image.height(), image.as_raw())
        .map_err(|err| DocsnapError::ImageError(format!("invalid source buffer: {}", err)))?;

    let mut buffer = vec![0u8; width as usize * height as usize * 4];
    {
        let mut dst = TypedImage::<U8x4>::from_buffer(width, height, &mut buffer)
            .map_err(|err| DocsnapError::ImageError(format!("invalid target buffer: {}", err)))?;
        let options = ResizeOptions::new()
            .resize_alg(ResizeAlg::Convolution(FilterType::Box))
            .use_alpha(false);
        Resizer::new()
            .resize_typed::<U8x4>(&src, &mut dst, &options)
            .map_err(|err| DocsnapError::ImageError(format!("resize failed: {}", err)))?;
    }

    RgbaImage::from_raw(width, height, buffer)
        .ok_or_else(|| DocsnapError::ImageError("resized buffer has wrong length".into()))
}

/// Encode a `DynamicImage` into the specified format, returning the raw bytes.
fn encode_to_format(image: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>, DocsnapError> {
    let mut buffer = Vec::new();
    let mut cursor = std::io::Cursor::new(&mut buffer);
    image.write_to(&mut cursor, format).map_err(|err| {
        DocsnapError::ImageError(format!("image encoding failed: {}", err))
    })?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn resize_area_averages_blocks() {
        // 4x2: left half black, right half white. Halving each axis gives
        // one black and one white pixel.
        let img = RgbaImage::from_fn(4, 2, |x, _| {
            if x < 2 {
                Rgba([0, 0, 0, 255])
            } else {
                Rgba([255, 255, 255, 255])
            }
        });
        let out = resize_area(&img, 2, 1).unwrap();
        assert_eq!(out.dimensions(), (2, 1));
        assert!(out.get_pixel(0, 0).0[0] < 10);
        assert!(out.get_pixel(1, 0).0[0] > 245);
    }

    #[test]
    fn resize_area_rejects_empty_target() {
        let img = RgbaImage::new(4, 4);
        assert!(resize_area(&img, 0, 4).is_err());
    }

    #[test]
    fn png_round_trip_keeps_dimensions() {
        let img = RgbaImage::from_pixel(7, 3, Rgba([10, 20, 30, 255]));
        let png = ImageProcessor::from_rgba(img).encode(OutputFormat::Png).unwrap();
        let decoded = ImageProcessor::from_bytes(&png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (7, 3));
    }

    #[test]
    fn open_sniffs_format_from_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.jpg");
        let img = RgbaImage::from_pixel(5, 4, Rgba([90, 90, 90, 255]));
        let png = ImageProcessor::from_rgba(img).to_png_bytes().unwrap();
        std::fs::write(&path, png).unwrap();

        let opened = ImageProcessor::open(&path).unwrap();
        assert_eq!((opened.width(), opened.height()), (5, 4));
    }

    #[test]
    fn garbage_bytes_are_an_image_error() {
        assert!(matches!(
            ImageProcessor::from_bytes(b"definitely not a jpeg"),
            Err(DocsnapError::ImageError(_))
        ));
    }
}
