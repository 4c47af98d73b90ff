//! Preview of a single cleaned post.

use crate::{cli::clean::read_and_clean, log, logger};
use anyhow::{Result, bail};
use std::{
    io::{Write, stdout},
    path::Path,
};

/// Clean `file` and print the result to stdout; nothing is written.
pub fn show_post(file: &Path, verbose: bool) -> Result<()> {
    logger::set_verbose(verbose);

    if !file.is_file() {
        bail!("{} is not a file", file.display());
    }

    let post = read_and_clean(file)?;

    log!("show"; "would be saved as {}", post.output_name);
    if let Some(err) = &post.document.date_error {
        log!("warning"; "{}", err);
    }

    let mut out = stdout().lock();
    writeln!(out, "{}", post.document.text)?;
    out.flush()?;

    Ok(())
}
