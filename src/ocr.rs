//! The OCR engine seam and the image preparation that feeds it.
//!
//! Recognition itself is delegated to an external engine behind the
//! [`OcrEngine`] trait; the default implementation shells out to the
//! tesseract binary. Keeping the engine injectable lets tests run the
//! pipeline with a double instead of a real recognizer.

use std::{path::PathBuf, process::Command};

use image::GrayImage;
use imageproc::filter::gaussian_blur_f32;
use tracing::debug;

use crate::error::{Error, Result};

/// Gaussian sigma for the local mean of the adaptive threshold (the
/// conventional sigma for an 11-pixel block).
const THRESHOLD_SIGMA: f32 = 2.0;

/// Offset subtracted from the local mean before binarizing.
const THRESHOLD_OFFSET: i16 = 10;

/// An external text recognizer.
pub trait OcrEngine: Send + Sync {
    /// Recognize text in a prepared single-channel image.
    fn recognize(&self, image: &GrayImage) -> Result<String>;
}

/// Gaussian-weighted adaptive thresholding, inverse binary.
///
/// Each pixel is compared against its Gaussian-blurred neighborhood mean
/// minus a small offset; darker-than-surroundings pixels (ink) become white
/// and everything else black. This evens out uneven lighting before
/// recognition.
pub fn binarize(image: &GrayImage) -> GrayImage {
    let mean = gaussian_blur_f32(image, THRESHOLD_SIGMA);
    let mut out = GrayImage::new(image.width(), image.height());
    for (x, y, pixel) in out.enumerate_pixels_mut() {
        let value = i16::from(image.get_pixel(x, y)[0]);
        let local = i16::from(mean.get_pixel(x, y)[0]);
        pixel[0] = if value <= local - THRESHOLD_OFFSET {
            255
        } else {
            0
        };
    }
    out
}

/// OCR via the tesseract command-line binary.
#[derive(Debug, Clone)]
pub struct TesseractCommand {
    binary: PathBuf,
    language: String,
}

impl Default for TesseractCommand {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("tesseract"),
            language: "eng".to_string(),
        }
    }
}

impl TesseractCommand {
    pub fn new(binary: impl Into<PathBuf>, language: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            language: language.into(),
        }
    }
}

impl OcrEngine for TesseractCommand {
    fn recognize(&self, image: &GrayImage) -> Result<String> {
        let scratch = tempfile::tempdir()?;
        let input = scratch.path().join("page.png");
        image.save(&input)?;

        debug!(binary = %self.binary.display(), language = %self.language, "invoking tesseract");
        let output = Command::new(&self.binary)
            .arg(&input)
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .output()
            .map_err(|e| Error::engine("tesseract", e.to_string()))?;

        if !output.status.success() {
            return Err(Error::engine(
                "tesseract",
                String::from_utf8_lossy(&output.stderr).into_owned(),
            ));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use image::Luma;

    use super::*;

    #[test]
    fn binarize_output_is_strictly_binary() {
        let mut img = GrayImage::from_pixel(40, 40, Luma([200u8]));
        // A dark glyph-like blob on a light background.
        for y in 10..20 {
            for x in 10..20 {
                img.put_pixel(x, y, Luma([20u8]));
            }
        }
        let binary = binarize(&img);
        for pixel in binary.pixels() {
            assert!(pixel[0] == 0 || pixel[0] == 255);
        }
    }

    #[test]
    fn binarize_inverts_ink() {
        let mut img = GrayImage::from_pixel(40, 40, Luma([200u8]));
        for y in 10..20 {
            for x in 10..20 {
                img.put_pixel(x, y, Luma([20u8]));
            }
        }
        let binary = binarize(&img);
        // The blob interior edge stands out against its neighborhood.
        assert_eq!(binary.get_pixel(10, 10)[0], 255);
        // Far-away flat background stays black.
        assert_eq!(binary.get_pixel(35, 35)[0], 0);
    }

    #[test]
    fn flat_image_has_no_ink() {
        let img = GrayImage::from_pixel(20, 20, Luma([128u8]));
        let binary = binarize(&img);
        assert!(binary.pixels().all(|p| p[0] == 0));
    }

    #[test]
    fn missing_binary_is_an_engine_error() {
        let engine = TesseractCommand::new("/nonexistent/clearfile-tesseract", "eng");
        let img = GrayImage::from_pixel(40, 40, Luma([255u8]));
        let err = engine.recognize(&img).unwrap_err();
        assert!(matches!(err, Error::Engine { tool: "tesseract", .. }));
    }
}
