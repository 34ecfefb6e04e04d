//! unslide CLI - slide deck extraction tool

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use unslide::backend::{create_pdfium, PdfiumDecoder};
use unslide::render::{missing_placeholders, to_json};
use unslide::{
    detect_format_from_path, ExtractOptions, Extraction, JsonFormat, OutputLayout, PageSelection,
    SlideExtractor, TesseractConfig, TesseractEngine, DEFAULT_FLATTEN_THRESHOLD,
};

#[derive(Parser)]
#[command(name = "unslide")]
#[command(version)]
#[command(
    about = "Extract text and images from PDF slide decks, with OCR for scanned slides",
    long_about = None
)]
struct Cli {
    /// Input PDF file
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output directory
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    #[command(flatten)]
    ocr: OcrArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct OcrArgs {
    /// OCR language pack
    #[arg(long, global = true, env = "UNSLIDE_OCR_LANG", default_value = "eng")]
    lang: String,

    /// Path to the tesseract executable
    #[arg(
        long,
        global = true,
        env = "UNSLIDE_TESSERACT",
        default_value = "tesseract",
        value_name = "PATH"
    )]
    tesseract: PathBuf,

    /// Magnification for full-page OCR renders
    #[arg(long, global = true, default_value_t = 3.0)]
    ocr_zoom: f32,

    /// Magnification for cropped drawing regions
    #[arg(long, global = true, default_value_t = 2.0)]
    crop_zoom: f32,

    /// Skip the sparse-text OCR retry
    #[arg(long, global = true)]
    no_retry: bool,
}

impl OcrArgs {
    fn engine(&self) -> TesseractEngine {
        TesseractEngine::with_config(
            TesseractConfig::new()
                .with_binary(&self.tesseract)
                .with_language(&self.lang),
        )
    }

    fn options(&self, pages: Option<&str>) -> Result<ExtractOptions, Box<dyn std::error::Error>> {
        let selection = match pages {
            Some(p) => PageSelection::parse(p)?,
            None => PageSelection::All,
        };
        Ok(ExtractOptions::new()
            .with_ocr_zoom(self.ocr_zoom)
            .with_crop_zoom(self.crop_zoom)
            .with_fallback(!self.no_retry)
            .with_pages(selection))
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Extract text and images into a run directory
    Extract {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output directory (default: <timestamp>_<name> beside the input)
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Page range (e.g., "1-10", "1,3,5")
        #[arg(long)]
        pages: Option<String>,

        /// Print a JSON summary instead of the file listing
        #[arg(long)]
        json: bool,
    },

    /// Print the slide text stream to stdout
    Text {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Keep images in this directory (temporary if not specified)
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Page range (e.g., "1-10", "1,3,5")
        #[arg(long)]
        pages: Option<String>,
    },

    /// Check whether a deck has real images or flattened slides
    Check {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Page-area fraction at which an image counts as a whole slide
        #[arg(long, default_value_t = DEFAULT_FLATTEN_THRESHOLD)]
        threshold: f32,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Show version information
    Version,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Extract {
            input,
            output,
            pages,
            json,
        }) => cmd_extract(&input, output.as_deref(), pages.as_deref(), json, &cli.ocr),
        Some(Commands::Text {
            input,
            output,
            pages,
        }) => cmd_text(&input, output.as_deref(), pages.as_deref(), &cli.ocr),
        Some(Commands::Check {
            input,
            threshold,
            compact,
        }) => cmd_check(&input, threshold, compact),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: extract if input is provided
            if let Some(input) = cli.input {
                cmd_extract(&input, cli.output.as_deref(), None, false, &cli.ocr)
            } else {
                println!("{}", "Usage: unslide <FILE> [OUTPUT]".yellow());
                println!("       unslide --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

/// Open the deck and run the pipeline, writing images into `images_dir`.
fn run_pipeline(
    input: &Path,
    images_dir: &Path,
    options: ExtractOptions,
    ocr: &OcrArgs,
    progress: Option<&ProgressBar>,
) -> Result<Extraction, Box<dyn std::error::Error>> {
    let format = detect_format_from_path(input)?;
    log::debug!("{}: {}", input.display(), format);

    let pdfium = create_pdfium()?;
    let decoder = PdfiumDecoder::open(&pdfium, input)?;
    let extractor = SlideExtractor::with_options(ocr.engine(), options);

    let extraction = extractor.extract_with_progress(&decoder, images_dir, |done, total| {
        if let Some(pb) = progress {
            pb.set_length(total as u64);
            pb.set_position(done as u64);
        }
    })?;
    Ok(extraction)
}

fn cmd_extract(
    input: &Path,
    output: Option<&Path>,
    pages: Option<&str>,
    json: bool,
    ocr: &OcrArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = ocr.options(pages)?;
    let layout = match output {
        Some(dir) => OutputLayout::new(dir),
        None => OutputLayout::timestamped(input),
    };
    layout.prepare()?;

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} slides {msg}")?
            .progress_chars("#>-"),
    );
    if json {
        pb.set_draw_target(indicatif::ProgressDrawTarget::hidden());
    }

    let extraction = run_pipeline(input, &layout.images_dir(), options, ocr, Some(&pb))?;
    pb.finish_with_message("done");

    let text = extraction.text();
    let text_path = layout.write_text(&text)?;

    let written = layout.list_images()?;
    let missing = missing_placeholders(&text, written.iter().map(String::as_str));
    if !missing.is_empty() {
        eprintln!(
            "{} missing image file(s): {}",
            "Warning:".yellow().bold(),
            missing.join(", ")
        );
    }

    if json {
        println!("{}", to_json(&extraction.summary(), JsonFormat::Pretty)?);
        return Ok(());
    }

    let stats = &extraction.stats;
    println!("\n{}", "Output files:".green().bold());
    println!("  {} {}", "├─".dimmed(), text_path.display());
    println!(
        "  {} {} ({} images)",
        "└─".dimmed(),
        layout.images_dir().display(),
        extraction.images.len()
    );
    println!();
    println!("{}: {}", "Slides".bold(), stats.page_count);
    println!("{}: {}", "Text lines".bold(), stats.text_line_count);
    if stats.ocr_page_count > 0 {
        println!(
            "{}: {} lines on {} slides ({} retried)",
            "OCR".bold(),
            stats.ocr_line_count,
            stats.ocr_page_count,
            stats.fallback_pass_count
        );
    }
    if stats.images_reused > 0 {
        println!("{}: {}", "Reused images".bold(), stats.images_reused);
    }

    Ok(())
}

fn cmd_text(
    input: &Path,
    output: Option<&Path>,
    pages: Option<&str>,
    ocr: &OcrArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = ocr.options(pages)?;

    // Images land in a scratch directory unless the caller wants them
    let scratch;
    let images_dir = match output {
        Some(dir) => dir.to_path_buf(),
        None => {
            scratch = tempfile::TempDir::new()?;
            scratch.path().to_path_buf()
        }
    };

    let extraction = run_pipeline(input, &images_dir, options, ocr, None)?;
    print!("{}", extraction.text());

    Ok(())
}

fn cmd_check(
    input: &Path,
    threshold: f32,
    compact: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !(0.0..=1.0).contains(&threshold) {
        return Err(format!("threshold must be between 0 and 1, got {}", threshold).into());
    }

    let report = unslide::check_file(input, threshold)?;
    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };
    println!("{}", to_json(&report, format)?);

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "unslide".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Slide deck text and image extraction tool");
    println!();
    println!("OCR: tesseract (psm 6, retry with psm 11)");
    println!("License: MIT");
}
