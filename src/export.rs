//! Markdown export of a completed report.
//!
//! Reports land in `<output_dir>/<slug>_<YYYYMMDD_HHMMSS>.md`; a `_2`, `_3`,
//! ... suffix is added when that name is already taken. Writes go to a temp
//! file first and are renamed into place.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use tracing::{info, warn};

use crate::error::JobshiftError;
use crate::report::Report;

const FALLBACK_SLUG: &str = "job";

static NON_ALNUM_RE: OnceLock<Regex> = OnceLock::new();

fn non_alnum_re() -> &'static Regex {
    NON_ALNUM_RE.get_or_init(|| {
        Regex::new(r"[^\p{Alphabetic}\p{N}]+").expect("valid literal regex")
    })
}

/// Lowercase the title and collapse every run of non-alphanumerics into `_`.
/// Letters and digits from any script are kept.
pub fn slugify(job_title: &str) -> String {
    let lower = job_title.to_lowercase();
    let slug = non_alnum_re().replace_all(&lower, "_");
    let slug = slug.trim_matches('_');
    if slug.is_empty() {
        FALLBACK_SLUG.to_owned()
    } else {
        slug.to_owned()
    }
}

/// Destination path for `report` under `output_dir`.
pub fn report_path(output_dir: &Path, report: &Report) -> PathBuf {
    let stamp = report.started_at.format("%Y%m%d_%H%M%S");
    output_dir.join(format!("{}_{stamp}.md", slugify(&report.job_title)))
}

/// Render the report as a markdown document.
pub fn render_markdown(report: &Report, model: &str) -> String {
    let mut doc = format!(
        "# AI Augmentation Report: {title}\n\n\
         - Generated: {generated}\n\
         - Model: {model}\n",
        title = report.job_title,
        generated = report.started_at.to_rfc3339(),
    );

    for section in report.sections() {
        doc.push_str(&format!(
            "\n## {label}\n\n{text}\n",
            label = section.stage.label(),
            text = section.text.trim_end(),
        ));
    }

    doc
}

/// First of `path`, `<stem>_2.md`, `<stem>_3.md`, ... that does not exist yet.
fn unused_path(path: PathBuf) -> PathBuf {
    if !path.exists() {
        return path;
    }
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut n = 2u32;
    loop {
        let candidate = path.with_file_name(format!("{stem}_{n}.md"));
        if !candidate.exists() {
            return candidate;
        }
        n += 1;
    }
}

/// Write `report` as markdown under `output_dir`, creating the directory if
/// needed. Returns the path written.
pub fn save_report(
    report: &Report,
    output_dir: &Path,
    model: &str,
) -> Result<PathBuf, JobshiftError> {
    let path = unused_path(report_path(output_dir, report));
    let failed = |detail: String| JobshiftError::ExportFailed {
        path: path.clone(),
        detail,
    };

    fs::create_dir_all(output_dir)
        .map_err(|e| failed(format!("failed to create directory: {e}")))?;

    let doc = render_markdown(report, model);
    let tmp_path = path.with_extension("md.tmp");

    let write_result = (|| -> std::io::Result<()> {
        let mut f = fs::File::create(&tmp_path)?;
        f.write_all(doc.as_bytes())?;
        f.sync_all()?;
        Ok(())
    })();

    if let Err(e) = write_result {
        let _ = fs::remove_file(&tmp_path);
        return Err(failed(e.to_string()));
    }

    // Atomic rename; fall back to direct write on failure.
    if fs::rename(&tmp_path, &path).is_err() {
        warn!(path = %path.display(), "rename failed, writing report directly");
        let _ = fs::remove_file(&tmp_path);
        fs::write(&path, &doc).map_err(|e| failed(e.to_string()))?;
    }

    info!(path = %path.display(), bytes = doc.len(), "report saved");
    Ok(path)
}
