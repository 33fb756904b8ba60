//! OCR dispatch: route raw bytes to the right recognition strategy by mime
//! type, fanning multi-page documents out over the rayon worker pool.

use std::{
    path::{Path, PathBuf},
    process::Command,
    sync::Arc,
};

use image::DynamicImage;
use rayon::prelude::*;
use tracing::debug;

use crate::{
    error::{Error, Result},
    ocr::{self, OcrEngine},
};

/// How a mime type's content is recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// A single raster image.
    Image,
    /// A paginated document whose pages are rendered to images first.
    Paginated,
}

/// Resolve a declared mime type to a recognition strategy.
///
/// Matching is exact; close-but-wrong strings are rejected so the caller
/// gets an unsupported-format error rather than a silent misread.
pub fn source_for_mime(mime: &str) -> Option<Source> {
    match mime {
        "image/png" | "image/jpeg" | "image/tiff" | "image/bmp" => Some(Source::Image),
        "application/pdf" => Some(Source::Paginated),
        _ => None,
    }
}

/// Renders single pages of a paginated document to image files.
pub trait PageRenderer: Send + Sync {
    /// Number of pages in the document at `document`.
    fn page_count(&self, document: &Path) -> Result<usize>;

    /// Render one page (1-based) into `out_dir`, returning the image path.
    fn render_page(&self, document: &Path, page: usize, out_dir: &Path) -> Result<PathBuf>;
}

/// Fixed rendering resolution for page rasterization.
pub const RENDER_DPI: u32 = 300;

/// Page rendering via poppler's `pdftoppm` binary.
#[derive(Debug, Clone)]
pub struct PdfToPpm {
    binary: PathBuf,
    dpi: u32,
}

impl Default for PdfToPpm {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("pdftoppm"),
            dpi: RENDER_DPI,
        }
    }
}

impl PdfToPpm {
    pub fn new(binary: impl Into<PathBuf>, dpi: u32) -> Self {
        Self {
            binary: binary.into(),
            dpi,
        }
    }
}

impl PageRenderer for PdfToPpm {
    fn page_count(&self, document: &Path) -> Result<usize> {
        let doc = lopdf::Document::load(document)?;
        Ok(doc.get_pages().len())
    }

    fn render_page(&self, document: &Path, page: usize, out_dir: &Path) -> Result<PathBuf> {
        let prefix = out_dir.join(format!("page-{page}"));
        let output = Command::new(&self.binary)
            .arg("-r")
            .arg(self.dpi.to_string())
            .arg("-png")
            .arg("-f")
            .arg(page.to_string())
            .arg("-l")
            .arg(page.to_string())
            .arg("-singlefile")
            .arg(document)
            .arg(&prefix)
            .output()
            .map_err(|e| Error::engine("pdftoppm", e.to_string()))?;

        if !output.status.success() {
            return Err(Error::engine(
                "pdftoppm",
                String::from_utf8_lossy(&output.stderr).into_owned(),
            ));
        }

        let rendered = prefix.with_extension("png");
        if !rendered.exists() {
            return Err(Error::engine(
                "pdftoppm",
                format!("no output for page {page}"),
            ));
        }
        Ok(rendered)
    }
}

/// Dispatches raw upload bytes to the recognition strategy for their mime
/// type.
pub struct Scanner {
    engine: Arc<dyn OcrEngine>,
    renderer: Arc<dyn PageRenderer>,
}

impl Scanner {
    pub fn new(engine: Arc<dyn OcrEngine>, renderer: Arc<dyn PageRenderer>) -> Self {
        Self { engine, renderer }
    }

    /// Extract plain text from `data` according to its declared mime type.
    ///
    /// Unknown mime types are a hard error; everything else either yields
    /// text or propagates the underlying engine failure.
    pub fn scan(&self, data: &[u8], mime: &str) -> Result<String> {
        match source_for_mime(mime) {
            Some(Source::Image) => {
                let image = image::load_from_memory(data)?;
                self.recognize_image(&image)
            }
            Some(Source::Paginated) => self.scan_paginated(data),
            None => Err(Error::UnsupportedFormat {
                mime: mime.to_string(),
            }),
        }
    }

    /// Recognize a single already-decoded image.
    pub fn recognize_image(&self, image: &DynamicImage) -> Result<String> {
        let prepared = ocr::binarize(&image.to_luma8());
        self.engine.recognize(&prepared)
    }

    /// Render every page, recognize them in parallel, and join the texts in
    /// page order. The scratch directory lives exactly as long as this
    /// call, failures included.
    fn scan_paginated(&self, data: &[u8]) -> Result<String> {
        let scratch = tempfile::tempdir()?;
        let document = scratch.path().join("input.pdf");
        std::fs::write(&document, data)?;

        let pages = self.renderer.page_count(&document)?;
        debug!(pages, "recognizing paginated document");

        let texts = (1..=pages)
            .into_par_iter()
            .map(|page| {
                let rendered = self.renderer.render_page(&document, page, scratch.path())?;
                let image = image::open(&rendered)?;
                let text = self.recognize_image(&image)?;
                debug!(page, "page recognized");
                Ok(text)
            })
            .collect::<Result<Vec<String>>>()?;

        Ok(texts.join("\n"))
    }
}
