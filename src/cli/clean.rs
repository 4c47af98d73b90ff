//! Batch cleaning of an input directory.
//!
//! Pipeline per post, one at a time in path order:
//! read → [`transform`] → name from date prefix → write

use crate::{
    config::{CleanerConfig, ErrorPolicy},
    debug, log,
    logger::ProgressLine,
    transform::{CleanedDocument, transform},
    utils::plural_count,
};
use anyhow::{Context, Result, bail};
use std::{
    ffi::OsStr,
    fs,
    path::{Path, PathBuf},
};

/// Outcome of a batch run.
#[derive(Debug, Default)]
pub struct CleanReport {
    /// Output files, written or (in dry mode) planned
    pub written: Vec<PathBuf>,
    /// Number of outputs named with the `undated` prefix
    pub undated: usize,
    /// Inputs that failed, with their error
    pub failed: Vec<(PathBuf, String)>,
}

impl CleanReport {
    /// One-line summary: written, undated and failed counts.
    pub fn summary(&self, output: &Path, dry: bool) -> String {
        format!(
            "{} {} to {} ({} undated, {} failed)",
            if dry { "would write" } else { "wrote" },
            plural_count(self.written.len(), "post"),
            output.display(),
            self.undated,
            self.failed.len()
        )
    }
}

/// A post cleaned and named, ready to be written.
#[derive(Debug)]
pub struct CleanedPost {
    pub output_name: String,
    pub document: CleanedDocument,
}

/// Clean every `*.md` post of the configured input directory.
///
/// With [`ErrorPolicy::Abort`] the first failing post stops the run. With
/// [`ErrorPolicy::Skip`] failures are reported and the run fails at the end.
pub fn clean_posts(config: &CleanerConfig) -> Result<CleanReport> {
    let input = &config.paths.input;
    let output = &config.paths.output;

    log!("clean"; "input directory: {}", input.display());
    let posts = collect_posts(input)?;
    log!("clean"; "found {}", plural_count(posts.len(), "markdown file"));

    if !config.clean.dry {
        fs::create_dir_all(output)
            .with_context(|| format!("Failed to create output directory {}", output.display()))?;
    }

    let mut report = CleanReport::default();
    let progress = (!posts.is_empty()).then(|| ProgressLine::new(&[("posts", posts.len())]));

    for path in &posts {
        debug!("clean"; "processing {}", path.display());

        match clean_post(path, output, config.clean.dry) {
            Ok(post) => {
                if let Some(err) = &post.document.date_error {
                    log!("warning"; "{}: {}, saving as {}", display_name(path), err, post.output_name);
                }
                if post.document.date_prefix.is_none() {
                    report.undated += 1;
                }
                debug!("clean"; "saved {}", post.output_name);
                report.written.push(output.join(&post.output_name));
            }
            Err(err) => match config.clean.on_error {
                ErrorPolicy::Abort => return Err(err),
                ErrorPolicy::Skip => {
                    log!("error"; "{:#}", err);
                    report.failed.push((path.clone(), format!("{err:#}")));
                }
            },
        }

        if let Some(p) = &progress {
            p.inc("posts");
        }
    }

    if let Some(p) = progress {
        p.finish();
    }

    log!("clean"; "{}", report.summary(output, config.clean.dry));

    if !report.failed.is_empty() {
        bail!("{} could not be cleaned", plural_count(report.failed.len(), "post"));
    }

    Ok(report)
}

/// Read, clean and (unless `dry`) write one post into `output_dir`.
pub fn clean_post(path: &Path, output_dir: &Path, dry: bool) -> Result<CleanedPost> {
    let post = read_and_clean(path)?;

    if !dry {
        let target = output_dir.join(&post.output_name);
        fs::write(&target, &post.document.text)
            .with_context(|| format!("Failed to write {}", target.display()))?;
    }

    Ok(post)
}

/// Read and clean one post without writing it.
pub fn read_and_clean(path: &Path) -> Result<CleanedPost> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let content = String::from_utf8_lossy(&bytes);

    let file_name = display_name(path);
    let document = transform(&file_name, &content)?;

    let stem = path
        .file_stem()
        .map(OsStr::to_string_lossy)
        .unwrap_or_default();
    let output_name = document.output_file_name(&stem);

    Ok(CleanedPost {
        output_name,
        document,
    })
}

/// Markdown posts directly inside `dir`, sorted by path.
pub fn collect_posts(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("Failed to read directory {}", dir.display()))?;

    let mut posts = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.is_file() && path.extension() == Some(OsStr::new("md")) {
            posts.push(path);
        }
    }
    posts.sort();

    Ok(posts)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
