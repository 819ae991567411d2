use std::path::PathBuf;

use clap::Parser;
use figcrop::cli::ExtractorArgs;
use figcrop::{ExtractError, FigureExtractor, PdfRenderer};

#[derive(Debug, Parser)]
#[command(about = "Crop captioned figures out of PDF papers as PNG files.")]
struct Args {
    /// PDF files to process
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Directory to write extracted figures into
    #[arg(short, long, default_value = "figures")]
    output_dir: PathBuf,

    #[command(flatten)]
    extractor: ExtractorArgs,
}

fn main() -> Result<(), ExtractError> {
    env_logger::init();
    let args = Args::parse();

    let renderer = PdfRenderer::new()?;
    let extractor = FigureExtractor::new(args.extractor.to_config());

    let mut total = 0usize;
    for input in &args.inputs {
        let document = match renderer.open(input) {
            Ok(document) => document,
            Err(err) => {
                eprintln!("Skipping {}: {err}", input.display());
                continue;
            }
        };
        let paths = extractor.extract_document(&document, &args.output_dir)?;
        for path in &paths {
            println!("{}", path.display());
        }
        total += paths.len();
    }

    eprintln!(
        "Extracted {total} figures from {} documents into {}",
        args.inputs.len(),
        args.output_dir.display()
    );
    Ok(())
}
