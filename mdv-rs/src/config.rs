//! Resolved run configuration.
//!
//! [`RunConfig`] is what a document pass needs once command-line arguments
//! and environment have been interpreted: where to read, where to write, how
//! to decode and whether to report diagnostics.

use std::path::PathBuf;

use encoding_rs::{Encoding, UTF_8};
use log::warn;

use crate::cli::{derive_output_path, Cli, DEFAULT_SUFFIX};
use crate::document::resolve_encoding;
use crate::error::Result;

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub verbose: bool,
    pub encoding: &'static Encoding,
}

impl RunConfig {
    /// UTF-8, quiet, output next to the input with the default suffix.
    pub fn new(input: impl Into<PathBuf>) -> Self {
        let input = input.into();
        RunConfig {
            output: derive_output_path(&input, DEFAULT_SUFFIX),
            input,
            verbose: false,
            encoding: UTF_8,
        }
    }

    /// Fails only on an unknown encoding label.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        if cli.suffix_ignored() {
            warn!("ignoring output suffix '{}' as a forced output path is provided", cli.output_suffix);
        }
        Ok(RunConfig {
            input: cli.md_path.clone(),
            output: cli.output_path(),
            verbose: cli.verbose,
            encoding: resolve_encoding(&cli.encoding)?,
        })
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_encoding(mut self, encoding: &'static Encoding) -> Self {
        self.encoding = encoding;
        self
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
