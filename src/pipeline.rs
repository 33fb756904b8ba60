//! Upload processing: normalize the image, attempt rectification, recognize
//! text, and derive keywords and coordinates for the persistence layer.

use std::sync::Arc;

use image::DynamicImage;
use serde::Serialize;
use tracing::debug;

use crate::{
    error::Result,
    geometry,
    keywords::{self, Dictionary, DEFAULT_KEYWORD_LIMIT},
    meta, rectify,
    scan::{source_for_mime, Scanner, Source},
};

/// The derived fields handed to the persistence collaborator after
/// processing one upload.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessedDocument {
    pub text: String,
    pub keywords: Vec<String>,
    /// (latitude, longitude) from camera metadata, when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<(f64, f64)>,
    /// Filled in by the caller once background enrichment resolves.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place: Option<String>,
}

/// The document-processing pipeline: mime dispatch, page straightening,
/// recognition, and keyword derivation.
pub struct Pipeline {
    scanner: Scanner,
    dictionary: Arc<dyn Dictionary>,
    keyword_limit: usize,
}

impl Pipeline {
    pub fn new(scanner: Scanner, dictionary: Arc<dyn Dictionary>) -> Self {
        Self {
            scanner,
            dictionary,
            keyword_limit: DEFAULT_KEYWORD_LIMIT,
        }
    }

    pub fn with_keyword_limit(mut self, limit: usize) -> Self {
        self.keyword_limit = limit;
        self
    }

    /// Process one upload into its derived fields.
    ///
    /// Photographic images are straightened first: the rectified page is
    /// used only when its paper-likeness lands in the acceptance window,
    /// otherwise recognition runs on the unmodified (but upright) image.
    /// An unknown mime type or an engine failure is fatal to this call;
    /// callers may still store the document with empty derived fields.
    pub fn process(&self, data: &[u8], mime: &str) -> Result<ProcessedDocument> {
        let text = match source_for_mime(mime) {
            Some(Source::Image) => {
                let decoded = image::load_from_memory(data)?;
                let upright = meta::normalize_orientation(data, decoded);
                let page = straighten(upright);
                self.scanner.recognize_image(&page)?
            }
            // Paginated and unknown mimes go through the dispatcher, which
            // owns the unsupported-format error.
            _ => self.scanner.scan(data, mime)?,
        };

        let keywords = keywords::keywords(&text, self.dictionary.as_ref(), self.keyword_limit);
        let coordinates = match source_for_mime(mime) {
            Some(Source::Image) => meta::extract_gps(data),
            _ => None,
        };

        Ok(ProcessedDocument {
            text,
            keywords,
            coordinates,
            place: None,
        })
    }
}

/// Use the rectified page when it looks like paper, the original otherwise.
fn straighten(upright: DynamicImage) -> DynamicImage {
    match rectify::rectify(&upright.to_rgb8()) {
        Some(r) if geometry::within_acceptance(r.likeness) => {
            debug!(likeness = r.likeness, "using rectified page");
            DynamicImage::ImageRgb8(r.image)
        }
        Some(r) => {
            debug!(
                likeness = r.likeness,
                "rectification outside acceptance window, keeping original"
            );
            upright
        }
        None => {
            debug!("no page outline found, keeping original");
            upright
        }
    }
}
