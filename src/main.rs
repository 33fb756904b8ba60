use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

pub mod cli;
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

use cli::{Cli, Command};
use error::Error;
use keywords::WordList;
use ocr::TesseractCommand;
use pipeline::Pipeline;
use scan::{PdfToPpm, Scanner};
use search::{DocumentRecord, SearchFilter};

fn init_tracing(verbose: u8) {
    let filter = if let Ok(env) = std::env::var("CLEARFILE_LOG") {
        EnvFilter::new(env)
    } else {
        match verbose {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn main() -> error::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Scan(args) => cmd_scan(&args)?,
        Command::Rectify(args) => cmd_rectify(&args)?,
        Command::Search(args) => cmd_search(&args)?,
        Command::Completions(args) => args.generate(),
    }

    Ok(())
}

fn cmd_scan(args: &cli::ScanArgs) -> error::Result<()> {
    let mime = match args.mime.as_deref() {
        Some(mime) => mime.to_string(),
        None => cli::mime_for_path(&args.path)
            .ok_or_else(|| Error::UnsupportedFormat {
                mime: format!("unknown extension: {}", args.path.display()),
            })?
            .to_string(),
    };

    let dictionary = Arc::new(WordList::from_file(&args.dictionary)?);
    let scanner = Scanner::new(
        Arc::new(TesseractCommand::new("tesseract", args.language.clone())),
        Arc::new(PdfToPpm::default()),
    );
    let pipeline = Pipeline::new(scanner, dictionary).with_keyword_limit(args.keywords);

    let data = std::fs::read(&args.path)?;
    let mut record = pipeline.process(&data, &mime)?;

    if args.locate {
        if let Some((lat, lon)) = record.coordinates {
            let geocoder = Arc::new(geocode::Nominatim::public_api()?);
            let task = geocode::spawn_reverse_geocode(geocoder, lat, lon);
            record.place = task.wait();
        }
    }

    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

fn cmd_rectify(args: &cli::RectifyArgs) -> error::Result<()> {
    let image = image::open(&args.path)?.to_rgb8();

    let corrected = if args.crop {
        rectify::crop_to_bounds(&image)
    } else {
        rectify::rectify(&image).map(|rectified| {
            if !geometry::within_acceptance(rectified.likeness) {
                eprintln!(
                    "warning: likeness {:.1} outside the acceptance window; \
                     the warp may not be trustworthy",
                    rectified.likeness
                );
            }
            rectified.image
        })
    };

    match corrected {
        Some(output) => {
            output.save(&args.output)?;
            eprintln!("wrote {}", args.output.display());
            Ok(())
        }
        None => Err(Error::NotFound {
            kind: "page outline",
            name: args.path.display().to_string(),
        }),
    }
}

fn cmd_search(args: &cli::SearchArgs) -> error::Result<()> {
    let contents = std::fs::read_to_string(&args.records)?;
    let records: Vec<DocumentRecord> = serde_json::from_str(&contents)?;

    let filter = SearchFilter {
        notebook: args.notebook.as_deref(),
        location: args.at.as_deref(),
    };
    let hits = search::search(&args.query, &records, &filter);

    if args.json {
        println!("{}", serde_json::to_string(&hits)?);
    } else if hits.is_empty() {
        println!("No results found.");
    } else {
        for hit in &hits {
            let summary = search::ellipsize(&hit.text, 50);
            match &hit.notebook {
                Some(notebook) => println!("[{notebook}] {} - {summary}", hit.title),
                None => println!("{} - {summary}", hit.title),
            }
        }
        println!("\n{} result(s)", hits.len());
    }
    Ok(())
}
