//! clearfile - turn photographed or scanned documents into searchable text.
//!
//! clearfile takes raw upload bytes plus a declared mime type, straightens
//! photographed pages with a perspective warp, runs them through an OCR
//! engine (multi-page documents fan out over a [rayon](https://docs.rs/rayon)
//! worker pool), distills the recognized text into a handful of keywords,
//! and answers free-text queries over stored records with fuzzy ranking.
//!
//! # Quick start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use clearfile::{
//!     keywords::WordList,
//!     ocr::TesseractCommand,
//!     pipeline::Pipeline,
//!     scan::{PdfToPpm, Scanner},
//!     search::{self, SearchFilter},
//! };
//!
//! let scanner = Scanner::new(
//!     Arc::new(TesseractCommand::default()),
//!     Arc::new(PdfToPpm::default()),
//! );
//! let dictionary = Arc::new(WordList::from_file("/usr/share/dict/words".as_ref()).unwrap());
//! let pipeline = Pipeline::new(scanner, dictionary);
//!
//! let data = std::fs::read("receipt.jpg").unwrap();
//! let record = pipeline.process(&data, "image/jpeg").unwrap();
//! println!("{}", record.text);
//!
//! let records = vec![];
//! let hits = search::search("power bill", &records, &SearchFilter::default());
//! for hit in hits {
//!     println!("{}", hit.title);
//! }
//! ```

pub mod error;
pub mod fuzz;
pub mod geocode;
pub mod geometry;
pub mod keywords;
pub mod meta;
pub mod ocr;
pub mod pipeline;
pub mod rectify;
pub mod scan;
pub mod search;

pub use error::{Error, Result};
pub use geocode::ReverseGeocoder;
pub use keywords::Dictionary;
pub use ocr::OcrEngine;
pub use pipeline::{Pipeline, ProcessedDocument};
pub use scan::{PageRenderer, Scanner};
pub use search::DocumentRecord;
