use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

#[derive(Debug, Parser)]
#[command(
    name = "clearfile",
    about = "Scan photographed documents into searchable text"
)]
pub struct Cli {
    /// Increase log verbosity (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run a document through the full pipeline and print the derived record
    Scan(ScanArgs),
    /// Perspective-correct a photographed page
    Rectify(RectifyArgs),
    /// Fuzzy-search a JSON snapshot of stored documents
    Search(SearchArgs),
    /// Generate shell completions
    #[command(hide = true)]
    Completions(CompletionsArgs),
}

// -- Scan --

#[derive(Debug, Parser)]
pub struct ScanArgs {
    /// Path to the document (image or PDF)
    pub path: PathBuf,

    /// Declared mime type; guessed from the extension when omitted
    #[arg(long)]
    pub mime: Option<String>,

    /// Word list for keyword validation, one word per line
    #[arg(long, default_value = "/usr/share/dict/words")]
    pub dictionary: PathBuf,

    /// Number of keywords to keep
    #[arg(short = 'k', long, default_value = "5")]
    pub keywords: usize,

    /// Recognition language passed to tesseract
    #[arg(short, long, default_value = "eng")]
    pub language: String,

    /// Resolve GPS coordinates to a place name (requires network)
    #[arg(long)]
    pub locate: bool,
}

// -- Rectify --

#[derive(Debug, Parser)]
pub struct RectifyArgs {
    /// Path to the photographed page
    pub path: PathBuf,

    /// Where to write the corrected image
    #[arg(short, long)]
    pub output: PathBuf,

    /// Crop to the page bounds and mask the background instead of warping
    #[arg(long)]
    pub crop: bool,
}

// -- Search --

#[derive(Debug, Parser)]
pub struct SearchArgs {
    /// The search query; empty browses everything
    pub query: String,

    /// JSON file holding the stored document snapshot
    #[arg(short, long)]
    pub records: PathBuf,

    /// Only match documents in this notebook
    #[arg(long)]
    pub notebook: Option<String>,

    /// Only match documents stored at this location
    #[arg(long)]
    pub at: Option<String>,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

// -- Completions --

#[derive(Debug, Parser)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

impl CompletionsArgs {
    /// Generate shell completions and print to stdout.
    pub fn generate(&self) {
        let mut cmd = Cli::command();
        clap_complete::generate(self.shell, &mut cmd, "clearfile", &mut std::io::stdout());
    }
}

/// Guess a mime type from a file extension.
pub fn mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "tif" | "tiff" => Some("image/tiff"),
        "bmp" => Some("image/bmp"),
        "pdf" => Some("application/pdf"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn parse_scan_defaults() {
        let cli = Cli::parse_from(["clearfile", "scan", "receipt.jpg"]);
        match cli.command {
            Command::Scan(args) => {
                assert_eq!(args.path, PathBuf::from("receipt.jpg"));
                assert_eq!(args.keywords, 5);
                assert_eq!(args.language, "eng");
                assert!(args.mime.is_none());
                assert!(!args.locate);
            }
            _ => panic!("expected scan command"),
        }
    }

    #[test]
    fn parse_search_with_filters() {
        let cli = Cli::parse_from([
            "clearfile", "search", "power bill", "--records", "db.json", "--notebook", "Home",
        ]);
        match cli.command {
            Command::Search(args) => {
                assert_eq!(args.query, "power bill");
                assert_eq!(args.notebook.as_deref(), Some("Home"));
                assert!(args.at.is_none());
            }
            _ => panic!("expected search command"),
        }
    }

    #[test]
    fn mime_guessing_covers_supported_extensions() {
        assert_eq!(mime_for_path(Path::new("a.JPG")), Some("image/jpeg"));
        assert_eq!(mime_for_path(Path::new("a.pdf")), Some("application/pdf"));
        assert_eq!(mime_for_path(Path::new("a.docx")), None);
        assert_eq!(mime_for_path(Path::new("noext")), None);
    }
}
