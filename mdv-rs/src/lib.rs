//! `mdv`: variables and expressions for markdown documents.
//!
//! A document is read line by line.  `@name=value` and `~name=expression`
//! lines define names and are dropped from the output; every other line is
//! copied through with `{name}` references replaced by current values.  See
//! [`script`] for the language and [`run`] for the whole file-to-file pass.

pub mod cli;
pub mod config;
pub mod document;
pub mod error;
pub mod script;

use log::debug;

pub use config::RunConfig;
pub use error::{Error, Result};
pub use script::{render_str, Interpreter, Value};

/// Render `config.input` into `config.output`.
///
/// Nothing is written unless the whole document renders.
pub fn run(config: &RunConfig) -> Result<()> {
    let lines = document::read_lines(&config.input, config.encoding)?;
    debug!("read {} line(s) from {}", lines.len(), config.input.display());

    let mut interp = Interpreter::with_verbose(config.verbose);
    let rendered = interp.process(&lines)?;

    document::write_output(&config.output, rendered, config.encoding)
}
