//! Text encoding of saved accelerator overrides.
//!
//! One record per line: `path current default`, separated by whitespace.
//! Every field is percent-encoded, so spaces never leak into the separator.
//! An empty field (unset accelerator) is written as a lone `%`.

use std::io::{self, BufRead, Write};

use crate::error::{NemoError, Result};

use super::AccelBinding;

const EMPTY_FIELD: &str = "%";

pub fn escape(field: &str) -> String {
    if field.is_empty() {
        return EMPTY_FIELD.to_string();
    }
    urlencoding::encode(field).into_owned()
}

/// Inverse of [`escape`]. `None` on a broken escape or non UTF-8 result.
pub fn unescape(field: &str) -> Option<String> {
    if field == EMPTY_FIELD {
        return Some(String::new());
    }
    // urlencoding passes a stray '%' through; reject it instead.
    let bytes = field.as_bytes();
    for (i, b) in bytes.iter().enumerate() {
        if *b == b'%'
            && !(i + 2 < bytes.len()
                && bytes[i + 1].is_ascii_hexdigit()
                && bytes[i + 2].is_ascii_hexdigit())
        {
            return None;
        }
    }
    urlencoding::decode(field).ok().map(|s| s.into_owned())
}

pub fn format_record(binding: &AccelBinding) -> String {
    format!(
        "{} {} {}",
        escape(&binding.path),
        escape(&binding.current),
        escape(&binding.default)
    )
}

/// Parse one line. Blank lines yield `Ok(None)`.
pub fn parse_record(line: &str, line_no: usize) -> Result<Option<AccelBinding>> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.is_empty() {
        return Ok(None);
    }
    if fields.len() != 3 {
        return Err(NemoError::MalformedRecord { line: line_no, fields: fields.len() });
    }
    let decode = |idx: usize| {
        unescape(fields[idx]).ok_or(NemoError::Decode { line: line_no, field: idx + 1 })
    };
    Ok(Some(AccelBinding {
        path: decode(0)?,
        current: decode(1)?,
        default: decode(2)?,
    }))
}

/// Read every record. Fails on the first malformed line.
pub fn read_records<R: BufRead>(reader: R) -> Result<Vec<AccelBinding>> {
    let mut records = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if let Some(record) = parse_record(&line, idx + 1)? {
            records.push(record);
        }
    }
    Ok(records)
}

pub fn write_records<'a, W, I>(mut writer: W, records: I) -> io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a AccelBinding>,
{
    for record in records {
        writeln!(writer, "{}", format_record(record))?;
    }
    writer.flush()
}
