use std::fs;
use std::path::PathBuf;

use clap::Parser;
use figcrop::cli::ExtractorArgs;
use figcrop::fetch::{download_pdf_with_progress, resolve_paper_url};
use figcrop::{ExtractError, FigureExtractor, PdfRenderer};

#[derive(Debug, Parser)]
#[command(about = "Download papers by arXiv id or URL and extract their figures.")]
struct Args {
    /// arXiv identifiers (e.g. 2401.01234v2) or direct PDF URLs
    #[arg(required = true)]
    papers: Vec<String>,

    /// Directory for downloaded PDFs
    #[arg(long, default_value = "papers")]
    papers_dir: PathBuf,

    /// Directory to write extracted figures into
    #[arg(short, long, default_value = "figures")]
    output_dir: PathBuf,

    /// Keep downloaded PDFs after extraction
    #[arg(long)]
    keep_pdf: bool,

    #[command(flatten)]
    extractor: ExtractorArgs,
}

fn main() -> Result<(), ExtractError> {
    env_logger::init();
    let args = Args::parse();

    let renderer = PdfRenderer::new()?;
    let extractor = FigureExtractor::new(args.extractor.to_config());

    for paper in &args.papers {
        let url = resolve_paper_url(paper);
        let report = |done: u64, total: Option<u64>| match total {
            Some(total) => log::debug!("{url}: {done}/{total} bytes"),
            None => log::debug!("{url}: {done} bytes"),
        };
        let pdf_path = match download_pdf_with_progress(&url, &args.papers_dir, Some(report)) {
            Ok(path) => path,
            Err(err) => {
                eprintln!("Failed to download {url}: {err}");
                continue;
            }
        };

        match renderer.open(&pdf_path) {
            Ok(document) => {
                let paths = extractor.extract_document(&document, &args.output_dir)?;
                println!("{paper}: {} figures", paths.len());
                for path in &paths {
                    println!("  {}", path.display());
                }
            }
            Err(err) => eprintln!("Failed to open {}: {err}", pdf_path.display()),
        }

        if !args.keep_pdf {
            if let Err(err) = fs::remove_file(&pdf_path) {
                eprintln!("Could not delete {}: {err}", pdf_path.display());
            }
        }
    }
    Ok(())
}
