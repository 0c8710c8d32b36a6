//! Canonical JSON text and content digests.
//!
//! Every hash in the ledger is the SHA-256 hex digest of a JSON document
//! written with a fixed layout, so any verifier that emits the same bytes
//! reproduces the same hash:
//!
//! - [`Layout::Spaced`] writes `", "` between items and `": "` after keys on a
//!   single line (block headers, chain exports).
//! - [`Layout::Indented`] puts every item on its own line, indented by the
//!   given number of spaces per level (transaction contents).
//!
//! Both layouts escape DEL and non-ASCII characters as `\uXXXX` (surrogate pairs
//! above the BMP) and write floats in their shortest round-trip form, always
//! with a fractional part or an exponent (`50.0`, `1e+16`, `1.5e-05`).
//! Non-finite floats are written as `null` by `serde_json` itself.

use crate::error::{LedgerError, Result};
use serde::Serialize;
use serde_json::ser::Formatter;
use sha2::{Digest, Sha256};
use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Spaced,
    Indented(usize),
}

/// Serializes `value` into canonical JSON text.
pub fn to_canonical_string<T: Serialize + ?Sized>(value: &T, layout: Layout) -> Result<String> {
    let mut buf = Vec::with_capacity(128);
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, CanonicalFormatter::new(layout));
    value.serialize(&mut ser)?;
    // The formatter only ever emits ASCII.
    String::from_utf8(buf).map_err(|e| LedgerError::Serialization(e.to_string()))
}

/// SHA-256 of `bytes`, lower-case hex.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// SHA-256 hex digest of the canonical text of `value`.
pub fn digest<T: Serialize + ?Sized>(value: &T, layout: Layout) -> Result<String> {
    let text = to_canonical_string(value, layout)?;
    Ok(sha256_hex(text.as_bytes()))
}

struct CanonicalFormatter {
    layout: Layout,
    depth: usize,
    has_value: bool,
}

impl CanonicalFormatter {
    fn new(layout: Layout) -> Self {
        Self {
            layout,
            depth: 0,
            has_value: false,
        }
    }

    fn open<W: ?Sized + io::Write>(&mut self, writer: &mut W, bracket: &[u8]) -> io::Result<()> {
        self.depth += 1;
        self.has_value = false;
        writer.write_all(bracket)
    }

    fn close<W: ?Sized + io::Write>(&mut self, writer: &mut W, bracket: &[u8]) -> io::Result<()> {
        self.depth -= 1;
        if let Layout::Indented(width) = self.layout {
            if self.has_value {
                writer.write_all(b"\n")?;
                write_indent(writer, width * self.depth)?;
            }
        }
        writer.write_all(bracket)
    }

    fn separate<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        match self.layout {
            Layout::Spaced => {
                if !first {
                    writer.write_all(b", ")?;
                }
                Ok(())
            }
            Layout::Indented(width) => {
                let sep: &[u8] = if first { b"\n" } else { b",\n" };
                writer.write_all(sep)?;
                write_indent(writer, width * self.depth)
            }
        }
    }
}

fn write_indent<W: ?Sized + io::Write>(writer: &mut W, n: usize) -> io::Result<()> {
    for _ in 0..n {
        writer.write_all(b" ")?;
    }
    Ok(())
}

/// Shortest round-trip text of `value`, always with a fractional part or an
/// exponent.
pub(crate) fn format_float(value: f64) -> String {
    let abs = value.abs();
    if abs != 0.0 && !(1e-4..1e16).contains(&abs) {
        let sci = format!("{:e}", value);
        match sci.split_once('e') {
            Some((mantissa, exp)) => {
                let (sign, digits) = match exp.strip_prefix('-') {
                    Some(digits) => ('-', digits),
                    None => ('+', exp),
                };
                format!("{}e{}{:0>2}", mantissa, sign, digits)
            }
            None => sci,
        }
    } else {
        let plain = value.to_string();
        if plain.contains('.') {
            plain
        } else {
            format!("{}.0", plain)
        }
    }
}

impl Formatter for CanonicalFormatter {
    fn begin_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.open(writer, b"[")
    }

    fn end_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.close(writer, b"]")
    }

    fn begin_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        self.separate(writer, first)
    }

    fn end_array_value<W: ?Sized + io::Write>(&mut self, _writer: &mut W) -> io::Result<()> {
        self.has_value = true;
        Ok(())
    }

    fn begin_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.open(writer, b"{")
    }

    fn end_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.close(writer, b"}")
    }

    fn begin_object_key<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        self.separate(writer, first)
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b": ")
    }

    fn end_object_value<W: ?Sized + io::Write>(&mut self, _writer: &mut W) -> io::Result<()> {
        self.has_value = true;
        Ok(())
    }

    fn write_f64<W: ?Sized + io::Write>(&mut self, writer: &mut W, value: f64) -> io::Result<()> {
        writer.write_all(format_float(value).as_bytes())
    }

    fn write_string_fragment<W: ?Sized + io::Write>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()> {
        if fragment.bytes().all(|b| b < 0x7f) {
            return writer.write_all(fragment.as_bytes());
        }
        let mut units = [0u16; 2];
        for ch in fragment.chars() {
            if ch < '\u{7f}' {
                writer.write_all(&[ch as u8])?;
            } else {
                for unit in ch.encode_utf16(&mut units) {
                    write!(writer, "\\u{:04x}", unit)?;
                }
            }
        }
        Ok(())
    }
}
