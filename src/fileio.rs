//! File buffer adapter: whole-file reads/writes, derived output names, and
//! the printable-text preview heuristic.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub const ENCRYPTED_PREFIX: &str = "encrypted_";
pub const DECRYPTED_PREFIX: &str = "decrypted_";
pub const PREVIEW_LIMIT: usize = 512;
const PRINTABLE_THRESHOLD: f64 = 0.6;

pub fn read_buffer(path: &Path) -> Result<Vec<u8>> {
  fs::read(path).with_context(|| format!("failed to read {}", path.display()))
}

pub fn write_buffer(path: &Path, data: &[u8]) -> Result<()> {
  fs::write(path, data).with_context(|| format!("failed to write {}", path.display()))
}

fn file_name_of(path: &Path) -> String {
  path
    .file_name()
    .map(|n| n.to_string_lossy().into_owned())
    .unwrap_or_else(|| "output".into())
}

fn with_file_name(path: &Path, name: String) -> PathBuf {
  match path.parent() {
    Some(parent) if parent.as_os_str().is_empty() => PathBuf::from(name),
    Some(parent) => parent.join(name),
    None => PathBuf::from(name),
  }
}

pub fn encrypted_name(input: &Path) -> PathBuf {
  with_file_name(input, format!("{}{}", ENCRYPTED_PREFIX, file_name_of(input)))
}

/// Strips a leading `encrypted_` before prefixing, so an encrypt/decrypt
/// round trip yields `decrypted_<original>` rather than a stacked prefix.
pub fn decrypted_name(input: &Path) -> PathBuf {
  let name = file_name_of(input);
  let base = name.strip_prefix(ENCRYPTED_PREFIX).unwrap_or(&name);
  with_file_name(input, format!("{}{}", DECRYPTED_PREFIX, base))
}

pub fn human_size(bytes: u64) -> String {
  if bytes == 0 {
    return "0 Bytes".into();
  }
  const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
  let exp = ((bytes as f64).ln() / 1024f64.ln()).floor() as usize;
  let exp = exp.min(UNITS.len() - 1);
  let value = bytes as f64 / 1024f64.powi(exp as i32);
  let formatted = format!("{:.2}", value);
  let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
  format!("{} {}", trimmed, UNITS[exp])
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Preview {
  Text(String),
  Binary,
}

/// Decode the first bytes of a buffer for display. Buffers whose decoded
/// text falls under the printable-character ratio are reported as binary and
/// skip preview rendering.
pub fn preview(data: &[u8]) -> Preview {
  let snippet = &data[..data.len().min(PREVIEW_LIMIT)];
  let text = String::from_utf8_lossy(snippet);
  if text.is_empty() {
    return Preview::Binary;
  }
  let printable = text.chars().filter(|c| is_printable(*c)).count();
  let ratio = printable as f64 / text.chars().count() as f64;
  if ratio < PRINTABLE_THRESHOLD {
    return Preview::Binary;
  }
  let trimmed = text.trim();
  if trimmed.is_empty() {
    Preview::Text("(empty file)".into())
  } else {
    Preview::Text(trimmed.to_string())
  }
}

fn is_printable(c: char) -> bool {
  !matches!(c, '\u{00}'..='\u{08}' | '\u{0b}' | '\u{0c}' | '\u{0e}'..='\u{1f}')
}
