//! Reading source documents and writing rendered output.
//!
//! Both directions go through one `encoding_rs` encoding and both are
//! strict: malformed input or text the encoding cannot represent is an error,
//! never a silent replacement.  Output is written to a temporary file in the
//! destination directory and renamed into place, so a destination is either
//! fully written or untouched.

use std::borrow::Cow;
use std::fs;
use std::io::Write;
use std::path::Path;

use encoding_rs::{Encoding, REPLACEMENT, UTF_16BE, UTF_16LE};
use log::{debug, info};
use tempfile::NamedTempFile;

use crate::error::{Error, Result};

/// Look up an encoding by its WHATWG label (`utf-8`, `latin1`, `utf-16le`, …).
///
/// The `replacement` encoding (what labels such as `iso-2022-kr` map to) can
/// neither read nor write text and is rejected.
pub fn resolve_encoding(label: &str) -> Result<&'static Encoding> {
    match Encoding::for_label(label.trim().as_bytes()) {
        Some(enc) if enc != REPLACEMENT => Ok(enc),
        _ => Err(Error::UnknownEncoding(label.to_owned())),
    }
}

/// Split text into lines, keeping each line's terminator.
///
/// The last line has no terminator when the text does not end in `\n`.
pub fn split_lines(text: &str) -> Vec<String> {
    text.split_inclusive('\n').map(str::to_owned).collect()
}

/// Read and decode the document at `path`.
///
/// A byte order mark overrides `encoding`.  Malformed sequences are an
/// [`Error::Undecodable`].
pub fn read_lines(path: &Path, encoding: &'static Encoding) -> Result<Vec<String>> {
    if !path.exists() {
        return Err(Error::InputNotFound {
            path: path.to_path_buf(),
        });
    }
    let bytes = fs::read(path).map_err(|e| Error::io(path, e))?;

    let (text, used, had_errors) = encoding.decode(&bytes);
    if used != encoding {
        debug!("{}: byte order mark selects {}", path.display(), used.name());
    }
    if had_errors {
        return Err(Error::Undecodable {
            path: path.to_path_buf(),
            encoding: used.name(),
        });
    }
    Ok(split_lines(&text))
}

/// Encode `lines` and write them to `path`, creating missing parent
/// directories first.
///
/// Nothing is created when the text cannot be encoded.
pub fn write_output<S: AsRef<str>>(path: &Path, lines: &[S], encoding: &'static Encoding) -> Result<()> {
    let mut content = String::new();
    for line in lines {
        content.push_str(line.as_ref());
    }
    let bytes = encode(&content, encoding).ok_or_else(|| Error::Unencodable {
        path: path.to_path_buf(),
        encoding: encoding.name(),
    })?;

    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    if !dir.exists() {
        info!(
            "creating output directory {} for {}",
            dir.display(),
            path.display()
        );
        fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;
    }

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| Error::io(dir, e))?;
    tmp.write_all(&bytes).map_err(|e| Error::io(tmp.path(), e))?;
    tmp.as_file().sync_all().map_err(|e| Error::io(tmp.path(), e))?;
    tmp.persist(path).map_err(|e| Error::io(path, e.error))?;
    debug!("wrote {} byte(s) to {}", bytes.len(), path.display());
    Ok(())
}

/// Encode `text`, or `None` if some character has no representation.
///
/// `encoding_rs` only decodes UTF-16 (its encoder substitutes UTF-8), so both
/// byte orders are produced here, without a byte order mark.
fn encode<'a>(text: &'a str, encoding: &'static Encoding) -> Option<Cow<'a, [u8]>> {
    if encoding == UTF_16LE {
        return Some(text.encode_utf16().flat_map(u16::to_le_bytes).collect());
    }
    if encoding == UTF_16BE {
        return Some(text.encode_utf16().flat_map(u16::to_be_bytes).collect());
    }
    let (bytes, _, unmappable) = encoding.encode(text);
    (!unmappable).then_some(bytes)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
