//! End-to-end pipeline exercise with test doubles standing in for the
//! external OCR engine and page renderer.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use image::{DynamicImage, GrayImage, Rgb, RgbImage};

use clearfile::{
    error::{Error, Result},
    keywords::WordList,
    ocr::OcrEngine,
    pipeline::Pipeline,
    scan::{PageRenderer, Scanner},
    search::{self, DocumentRecord, SearchFilter},
};

/// Always recognizes the same text, no matter the image.
struct FixedEngine(&'static str);

impl OcrEngine for FixedEngine {
    fn recognize(&self, _image: &GrayImage) -> Result<String> {
        Ok(self.0.to_string())
    }
}

/// Renders pages whose pixel width encodes the page number.
struct CountingRenderer {
    pages: usize,
}

impl PageRenderer for CountingRenderer {
    fn page_count(&self, _document: &Path) -> Result<usize> {
        Ok(self.pages)
    }

    fn render_page(&self, _document: &Path, page: usize, out_dir: &Path) -> Result<PathBuf> {
        let path = out_dir.join(format!("page-{page}.png"));
        GrayImage::new(page as u32, 1).save(&path)?;
        Ok(path)
    }
}

/// Echoes the encoded page number back as text.
struct PageEchoEngine;

impl OcrEngine for PageEchoEngine {
    fn recognize(&self, image: &GrayImage) -> Result<String> {
        Ok(format!("page {}", image.width()))
    }
}

fn dictionary() -> Arc<WordList> {
    Arc::new(WordList::from_words([
        "electricity",
        "usage",
        "power",
        "bill",
        "monthly",
    ]))
}

fn photo_with_page() -> Vec<u8> {
    // A bright paper-shaped rectangle on a dark background, so the
    // rectifier has something to find.
    let mut img = RgbImage::from_pixel(260, 300, Rgb([12, 12, 12]));
    for y in 40..238 {
        for x in 40..180 {
            img.put_pixel(x, y, Rgb([230, 230, 230]));
        }
    }
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(
            &mut std::io::Cursor::new(&mut bytes),
            image::ImageFormat::Png,
        )
        .unwrap();
    bytes
}

#[test]
fn photographed_page_flows_into_a_searchable_record() {
    let scanner = Scanner::new(
        Arc::new(FixedEngine(
            "Monthly electricity bill. Electricity usage was high.",
        )),
        Arc::new(CountingRenderer { pages: 0 }),
    );
    let pipeline = Pipeline::new(scanner, dictionary());

    let processed = pipeline.process(&photo_with_page(), "image/png").unwrap();
    assert!(processed.text.contains("electricity"));
    assert!(!processed.keywords.is_empty());
    assert!(processed.keywords.iter().all(|w| w.chars().count() >= 4));

    // The derived fields become a stored record the search engine can hit.
    let records = vec![DocumentRecord {
        title: "Power Bill".to_string(),
        text: processed.text,
        notebook: Some("Home".to_string()),
        location: None,
    }];

    let hits = search::search("electricty", &records, &SearchFilter::default());
    assert_eq!(hits.len(), 1);

    let work_only = SearchFilter {
        notebook: Some("Work"),
        location: None,
    };
    assert!(search::search("electricty", &records, &work_only).is_empty());
}

#[test]
fn paginated_document_preserves_page_order() {
    let scanner = Scanner::new(
        Arc::new(PageEchoEngine),
        Arc::new(CountingRenderer { pages: 4 }),
    );
    let pipeline = Pipeline::new(scanner, dictionary());

    let processed = pipeline.process(b"%PDF-fake", "application/pdf").unwrap();
    assert_eq!(processed.text, "page 1\npage 2\npage 3\npage 4");
    assert!(processed.coordinates.is_none());
}

#[test]
fn unsupported_mime_is_rejected_up_front() {
    let scanner = Scanner::new(
        Arc::new(FixedEngine("unused")),
        Arc::new(CountingRenderer { pages: 0 }),
    );
    let pipeline = Pipeline::new(scanner, dictionary());

    let err = pipeline.process(b"bytes", "text/html").unwrap_err();
    assert!(matches!(err, Error::UnsupportedFormat { ref mime } if mime == "text/html"));
}
