use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use pageforge::operations::{
    add_page_numbers, add_watermark, compare_files, compress_file, crop_pages, extract_pages,
    merge_files, organize_pages, redact_areas, remove_pages, repair_file, rotate_pages,
    sign_document, split_to_files, CropBox, PageNumberOptions, PageNumberPosition, RedactArea,
    RotateOptions, WatermarkOptions,
};
use pageforge::PdfDocument;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "pageforge",
    about = "A native Rust PDF page-set transformation tool",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract pages into a new document
    Extract {
        /// Input PDF file
        input: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Pages to keep, e.g. "1,3,5-7"
        #[arg(short, long)]
        pages: String,
    },

    /// Remove pages, keeping the rest
    Remove {
        /// Input PDF file
        input: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Pages to delete, e.g. "2,4,6-8"
        #[arg(short, long)]
        pages: String,
    },

    /// Rebuild the document in an exact page order
    Organize {
        /// Input PDF file
        input: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Exact target layout, e.g. "3,1,2" (duplicates allowed)
        #[arg(long)]
        order: String,
    },

    /// Split a PDF into one file per page
    Split {
        /// Input PDF file
        input: PathBuf,

        /// Directory for the page-N.pdf files
        #[arg(short, long, default_value = "pages")]
        output_dir: PathBuf,
    },

    /// Merge multiple PDFs into one
    Merge {
        /// Input PDF files, merged in the given order
        files: Vec<PathBuf>,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Rotate pages in a PDF
    Rotate {
        /// Input PDF file
        input: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Rotation to add in degrees (multiple of 90, negative allowed)
        #[arg(short, long, default_value_t = 90)]
        degrees: i32,

        /// Pages to rotate, e.g. "1,3"; all pages when omitted
        #[arg(short, long)]
        pages: Option<String>,
    },

    /// Assign a crop box to every page
    Crop {
        /// Input PDF file
        input: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Lower-left x of the visible region
        #[arg(long, default_value_t = 50.0)]
        x: f64,

        /// Lower-left y of the visible region
        #[arg(long, default_value_t = 50.0)]
        y: f64,

        /// Width of the visible region
        #[arg(long, default_value_t = 500.0)]
        width: f64,

        /// Height of the visible region
        #[arg(long, default_value_t = 700.0)]
        height: f64,
    },

    /// Stamp sequential page numbers
    PageNumbers {
        /// Input PDF file
        input: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// top-left, top-center, top-right, bottom-left, bottom-center
        /// or bottom-right
        #[arg(short, long, default_value = "bottom-center")]
        position: String,

        /// Number stamped on the first page
        #[arg(short, long, default_value_t = 1)]
        start: i32,

        /// Font size in points
        #[arg(short, long, default_value_t = 12.0)]
        font_size: f64,
    },

    /// Stamp a centered watermark across every page
    Watermark {
        /// Input PDF file
        input: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Watermark text
        #[arg(short, long)]
        text: String,

        /// Stamp opacity between 0.0 and 1.0
        #[arg(long, default_value_t = 0.3)]
        opacity: f64,

        /// Font size in points
        #[arg(long, default_value_t = 50.0)]
        font_size: f64,

        /// Counter-clockwise rotation in degrees
        #[arg(long, default_value_t = 45.0)]
        rotation: f64,
    },

    /// Add a signature line to the last page
    Sign {
        /// Input PDF file
        input: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Signer name
        #[arg(short, long)]
        name: String,
    },

    /// Paint opaque boxes over page areas
    Redact {
        /// Input PDF file
        input: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// JSON array of areas, e.g.
        /// [{"page":0,"x":10,"y":20,"width":100,"height":30}]
        #[arg(short, long)]
        areas: String,
    },

    /// Compare two PDFs byte by byte
    Compare {
        /// First PDF file
        first: PathBuf,

        /// Second PDF file
        second: PathBuf,

        /// Emit the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Rebuild a damaged PDF
    Repair {
        /// Input PDF file
        input: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Compress streams and strip descriptive metadata
    Compress {
        /// Input PDF file
        input: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Show information about a PDF file
    Info {
        /// Input PDF file
        input: PathBuf,

        /// Emit the result as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pageforge=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match Cli::parse().command {
        Commands::Extract {
            input,
            output,
            pages,
        } => {
            let doc = PdfDocument::open(&input)?;
            let extracted = extract_pages(&doc, &pages)?;
            extracted.save(&output)?;
            println!(
                "✓ Extracted {} pages to {}",
                extracted.page_count(),
                output.display()
            );
        }

        Commands::Remove {
            input,
            output,
            pages,
        } => {
            let doc = PdfDocument::open(&input)?;
            let remaining = remove_pages(&doc, &pages)?;
            remaining.save(&output)?;
            println!(
                "✓ Removed pages; {} pages left in {}",
                remaining.page_count(),
                output.display()
            );
        }

        Commands::Organize {
            input,
            output,
            order,
        } => {
            let doc = PdfDocument::open(&input)?;
            let organized = organize_pages(&doc, &order)?;
            organized.save(&output)?;
            println!(
                "✓ Reorganized into {} pages in {}",
                organized.page_count(),
                output.display()
            );
        }

        Commands::Split { input, output_dir } => {
            let doc = PdfDocument::open(&input)?;
            let files = split_to_files(&doc, &output_dir)?;
            println!(
                "✓ Split into {} files under {}",
                files.len(),
                output_dir.display()
            );
        }

        Commands::Merge { files, output } => {
            merge_files(&files, &output)?;
            println!("✓ Merged {} files into {}", files.len(), output.display());
        }

        Commands::Rotate {
            input,
            output,
            degrees,
            pages,
        } => {
            if degrees % 90 != 0 {
                eprintln!("Error: rotation must be a multiple of 90 degrees");
                std::process::exit(1);
            }
            let mut doc = PdfDocument::open(&input)?;
            rotate_pages(&mut doc, &RotateOptions { degrees, pages })?;
            doc.save(&output)?;
            println!(
                "✓ Rotated pages {} degrees in {}",
                degrees,
                output.display()
            );
        }

        Commands::Crop {
            input,
            output,
            x,
            y,
            width,
            height,
        } => {
            let mut doc = PdfDocument::open(&input)?;
            crop_pages(
                &mut doc,
                &CropBox {
                    x,
                    y,
                    width,
                    height,
                },
            )?;
            doc.save(&output)?;
            println!("✓ Cropped {} pages in {}", doc.page_count(), output.display());
        }

        Commands::PageNumbers {
            input,
            output,
            position,
            start,
            font_size,
        } => {
            let mut doc = PdfDocument::open(&input)?;
            let options = PageNumberOptions {
                position: PageNumberPosition::from_name(&position),
                start,
                font_size,
            };
            add_page_numbers(&mut doc, &options)?;
            doc.save(&output)?;
            println!(
                "✓ Numbered {} pages in {}",
                doc.page_count(),
                output.display()
            );
        }

        Commands::Watermark {
            input,
            output,
            text,
            opacity,
            font_size,
            rotation,
        } => {
            let mut doc = PdfDocument::open(&input)?;
            let options = WatermarkOptions {
                opacity,
                font_size,
                rotation_degrees: rotation,
                ..WatermarkOptions::default()
            };
            add_watermark(&mut doc, &text, &options)?;
            doc.save(&output)?;
            println!(
                "✓ Watermarked {} pages in {}",
                doc.page_count(),
                output.display()
            );
        }

        Commands::Sign {
            input,
            output,
            name,
        } => {
            let mut doc = PdfDocument::open(&input)?;
            sign_document(&mut doc, &name)?;
            doc.save(&output)?;
            println!("✓ Signed {}", output.display());
        }

        Commands::Redact {
            input,
            output,
            areas,
        } => {
            let areas = parse_redact_areas(&areas)?;
            let mut doc = PdfDocument::open(&input)?;
            redact_areas(&mut doc, &areas)?;
            doc.save(&output)?;
            println!(
                "✓ Redacted {} areas in {}",
                areas.len(),
                output.display()
            );
        }

        Commands::Compare {
            first,
            second,
            json,
        } => {
            let result = compare_files(&first, &second)?;
            if json {
                println!(
                    "{}",
                    serde_json::json!({
                        "identical": result.identical,
                        "first": {
                            "pages": result.first.page_count,
                            "bytes": result.first.byte_length,
                        },
                        "second": {
                            "pages": result.second.page_count,
                            "bytes": result.second.byte_length,
                        },
                        "summary": result.summary,
                    })
                );
            } else {
                println!("{}", result.summary);
            }
        }

        Commands::Repair { input, output } => {
            repair_file(&input, &output)?;
            println!("✓ Repaired {} into {}", input.display(), output.display());
        }

        Commands::Compress { input, output } => {
            compress_file(&input, &output)?;
            let before = std::fs::metadata(&input)?.len();
            let after = std::fs::metadata(&output)?.len();
            println!(
                "✓ Compressed {} ({} -> {} bytes)",
                output.display(),
                before,
                after
            );
        }

        Commands::Info { input, json } => print_info(&input, json)?,
    }

    Ok(())
}

/// Decode the redact `--areas` argument. Missing fields fall back to the
/// library defaults, matching the documented area shape.
fn parse_redact_areas(raw: &str) -> Result<Vec<RedactArea>> {
    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(|e| anyhow!("invalid areas JSON: {e}"))?;
    let items = value
        .as_array()
        .ok_or_else(|| anyhow!("areas must be a JSON array"))?;

    let defaults = RedactArea::default();
    let mut areas = Vec::with_capacity(items.len());
    for item in items {
        if !item.is_object() {
            return Err(anyhow!("each area must be a JSON object"));
        }
        let number = |key: &str, fallback: f64| {
            item.get(key)
                .and_then(serde_json::Value::as_f64)
                .unwrap_or(fallback)
        };
        areas.push(RedactArea {
            page: item
                .get("page")
                .and_then(serde_json::Value::as_u64)
                .map(|p| p as usize)
                .unwrap_or(defaults.page),
            x: number("x", defaults.x),
            y: number("y", defaults.y),
            width: number("width", defaults.width),
            height: number("height", defaults.height),
        });
    }
    Ok(areas)
}

fn print_info(input: &Path, json: bool) -> Result<()> {
    let doc = PdfDocument::open(input)?;
    let metadata = doc.metadata();

    if json {
        let pages: Vec<serde_json::Value> = (0..doc.page_count())
            .map(|i| {
                let (width, height) = doc.page_size(i).unwrap_or((0.0, 0.0));
                let rotation = doc.page_rotation(i).unwrap_or(0);
                serde_json::json!({
                    "width": width,
                    "height": height,
                    "rotation": rotation,
                })
            })
            .collect();
        println!(
            "{}",
            serde_json::json!({
                "version": doc.version().to_string(),
                "pages": doc.page_count(),
                "title": metadata.title,
                "author": metadata.author,
                "subject": metadata.subject,
                "keywords": metadata.keywords,
                "creator": metadata.creator,
                "producer": metadata.producer,
                "page_details": pages,
            })
        );
        return Ok(());
    }

    println!("PDF Information for: {}", input.display());
    println!("==========================================");
    println!("PDF Version: {}", doc.version());
    println!("Pages: {}", doc.page_count());

    if let Some(title) = &metadata.title {
        println!("Title: {title}");
    }
    if let Some(author) = &metadata.author {
        println!("Author: {author}");
    }
    if let Some(subject) = &metadata.subject {
        println!("Subject: {subject}");
    }
    if let Some(keywords) = &metadata.keywords {
        println!("Keywords: {keywords}");
    }
    if let Some(creator) = &metadata.creator {
        println!("Creator: {creator}");
    }
    if let Some(producer) = &metadata.producer {
        println!("Producer: {producer}");
    }

    let shown = doc.page_count().min(3);
    if shown > 0 {
        println!("\nPage Information:");
        println!("-----------------");
        for i in 0..shown {
            let (width, height) = doc.page_size(i)?;
            let rotation = doc.page_rotation(i)?;
            if rotation != 0 {
                println!(
                    "Page {}: {:.0}x{:.0} pts, rotated {} degrees",
                    i + 1,
                    width,
                    height,
                    rotation
                );
            } else {
                println!("Page {}: {:.0}x{:.0} pts", i + 1, width, height);
            }
        }
        if doc.page_count() > shown {
            println!("... and {} more pages", doc.page_count() - shown);
        }
    }

    Ok(())
}
