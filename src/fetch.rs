//! Paper download helpers.

use std::fs;
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use reqwest::blocking::Client;

use crate::error::{ExtractError, Result};

const ARXIV_PDF_BASE: &str = "https://arxiv.org/pdf";
const PDF_HEADER: &[u8] = b"%PDF-";

/// PDF URL for an arXiv identifier such as `2401.01234v2` or `cs/0112017`.
pub fn arxiv_pdf_url(id: &str) -> String {
    format!("{ARXIV_PDF_BASE}/{}", id.trim())
}

/// Local file name for a paper: the URL's last path segment (or the whole
/// identifier for old-style ids) with `.pdf` appended if missing.
pub fn paper_file_name(url_or_id: &str) -> Result<String> {
    let trimmed = url_or_id.trim().trim_end_matches('/');
    let stem = match trimmed.strip_prefix(ARXIV_PDF_BASE) {
        // old-style ids keep their archive prefix: cs/0112017 -> cs_0112017
        Some(id) => id.trim_start_matches('/').replace('/', "_"),
        None => trimmed
            .rsplit('/')
            .next()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ExtractError::MissingFilename(url_or_id.to_owned()))?
            .to_owned(),
    };
    if stem.is_empty() {
        return Err(ExtractError::MissingFilename(url_or_id.to_owned()));
    }
    if stem.to_ascii_lowercase().ends_with(".pdf") {
        Ok(stem)
    } else {
        Ok(format!("{stem}.pdf"))
    }
}

/// Accept either a full URL or a bare arXiv identifier.
pub fn resolve_paper_url(url_or_id: &str) -> String {
    let trimmed = url_or_id.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_owned()
    } else {
        arxiv_pdf_url(trimmed)
    }
}

/// Download a PDF into `output_dir`.
pub fn download_pdf(url: &str, output_dir: impl AsRef<Path>) -> Result<PathBuf> {
    download_pdf_with_progress(url, output_dir, None::<fn(u64, Option<u64>)>)
}

/// Download a PDF and report incremental progress through the provided callback.
///
/// The body is streamed into a `.part` file next to the target; the target
/// only appears once the transfer completed and the body looks like a PDF.
pub fn download_pdf_with_progress<F>(
    url: &str,
    output_dir: impl AsRef<Path>,
    progress: Option<F>,
) -> Result<PathBuf>
where
    F: FnMut(u64, Option<u64>),
{
    let dir = output_dir.as_ref();
    fs::create_dir_all(dir)?;
    let output_path = dir.join(paper_file_name(url)?);

    let client = Client::builder().gzip(true).brotli(true).build()?;
    let response = client.get(url).send()?.error_for_status()?;
    let total_size = response.content_length();
    let downloaded = save_body(response, total_size, &output_path, progress)?;

    log::debug!("downloaded {url} ({downloaded} bytes)");
    Ok(output_path)
}

/// Write `body` to `path` via a partial file that is removed on failure.
fn save_body<R, F>(body: R, total: Option<u64>, path: &Path, mut progress: Option<F>) -> Result<u64>
where
    R: Read,
    F: FnMut(u64, Option<u64>),
{
    let partial = path.with_extension("pdf.part");
    let result = stream_to_file(body, total, &partial, &mut progress).and_then(|written| {
        fs::rename(&partial, path)?;
        Ok(written)
    });
    if result.is_err() {
        match fs::remove_file(&partial) {
            Ok(()) => {}
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => log::warn!("could not remove {}: {err}", partial.display()),
        }
    }
    result
}

fn stream_to_file<R, F>(
    mut body: R,
    total: Option<u64>,
    path: &Path,
    progress: &mut Option<F>,
) -> Result<u64>
where
    R: Read,
    F: FnMut(u64, Option<u64>),
{
    let mut file = fs::File::create(path)?;
    let mut head = Vec::with_capacity(PDF_HEADER.len());
    let mut written = 0u64;
    let mut buffer = [0u8; 16 * 1024];
    loop {
        let read = match body.read(&mut buffer) {
            Ok(0) => break,
            Ok(read) => read,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(err.into()),
        };
        let missing = PDF_HEADER.len() - head.len();
        head.extend_from_slice(&buffer[..read.min(missing)]);

        file.write_all(&buffer[..read])?;
        written += read as u64;
        if let Some(report) = progress.as_mut() {
            report(written, total);
        }
    }
    if head != PDF_HEADER {
        return Err(ExtractError::NotPdf(path.display().to_string()));
    }
    Ok(written)
}
