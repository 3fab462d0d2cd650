//! Command-line argument parsing.
//!
//! Usage:
//!   mdv <md_path> [-s <suffix>] [-f <path>] [-v] [-e <encoding>]

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use clap::Parser;

/// Suffix appended to the input file stem when no output path is forced.
pub const DEFAULT_SUFFIX: &str = "parsed";

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "mdv", version)]
#[command(about = "Expand @variables, ~expressions and {name} references in a markdown file", long_about = None)]
pub struct Cli {
    /// Path to the markdown file
    pub md_path: PathBuf,

    /// Suffix for the output file (`<stem>_<suffix>.md` next to the input)
    #[arg(short = 's', long, alias = "output_suffix", default_value = DEFAULT_SUFFIX)]
    pub output_suffix: String,

    /// Write the output here instead of deriving a path from the input
    #[arg(short = 'f', long, alias = "forced_output_path")]
    pub forced_output_path: Option<PathBuf>,

    /// Report overwrites, self-references and expression fallbacks
    #[arg(short, long)]
    pub verbose: bool,

    /// Encoding for reading and writing files
    #[arg(short, long, env = "MDV_ENCODING", default_value = "utf-8")]
    pub encoding: String,
}

impl Cli {
    /// Where the rendered document goes.
    pub fn output_path(&self) -> PathBuf {
        match &self.forced_output_path {
            Some(path) => path.clone(),
            None => derive_output_path(&self.md_path, &self.output_suffix),
        }
    }

    /// True when a non-default suffix was given alongside a forced path.
    pub fn suffix_ignored(&self) -> bool {
        self.forced_output_path.is_some() && self.output_suffix != DEFAULT_SUFFIX
    }
}

/// `dir/notes.md` + `parsed` → `dir/notes_parsed.md`.
pub fn derive_output_path(md_path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(md_path.file_stem().unwrap_or_default());
    name.push("_");
    name.push(suffix);
    name.push(".md");
    md_path.with_file_name(name)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
