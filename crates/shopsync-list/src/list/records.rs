//! Record tokenizer and shop record types.
//!
//! All list files share one lexical shape, inherited from the client's
//! data-file family:
//! - `//` starts a comment running to end of line
//! - fields are whitespace-separated; string fields are double-quoted
//!   and may contain spaces
//! - a bare `end` line terminates the record section
//!
//! ```text
//! //index  category  name            price  currency
//! 10       1         "Small Potion"  250    0
//! end
//! ```

use crate::list::error::{ListLoadError, ListResult};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

lazy_static! {
    /// One field: a double-quoted string or a bare token.
    static ref FIELD_RE: Regex = Regex::new(r#""([^"]*)"|(\S+)"#).unwrap();
}

// ─── Tokenizer ───────────────────────────────────────────────────────

/// A tokenized record line, 1-based line number attached.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordLine {
    pub line_no: usize,
    pub fields: Vec<String>,
}

/// Strip a `//` comment, ignoring slashes inside quoted fields.
fn strip_comment(line: &str) -> &str {
    let bytes = line.as_bytes();
    let mut in_quotes = false;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'"' => in_quotes = !in_quotes,
            b'/' if !in_quotes && i + 1 < bytes.len() && bytes[i + 1] == b'/' => {
                return &line[..i];
            }
            _ => {}
        }
        i += 1;
    }
    line
}

/// Split decoded list text into record lines.
///
/// Comments and blank lines are skipped; a bare `end` terminates the
/// section and everything after it is ignored.
pub fn tokenize_records(text: &str) -> Vec<RecordLine> {
    let mut records = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let line = strip_comment(raw).trim();
        if line.is_empty() {
            continue;
        }
        if line == "end" {
            break;
        }
        let fields = FIELD_RE
            .captures_iter(line)
            .map(|caps| {
                caps.get(1)
                    .or_else(|| caps.get(2))
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_default()
            })
            .collect();
        records.push(RecordLine {
            line_no: idx + 1,
            fields,
        });
    }
    records
}

/// Parse one positional field, naming the line and field on failure.
pub fn parse_field<T: FromStr>(record: &RecordLine, idx: usize, what: &str) -> ListResult<T> {
    let raw = record.fields.get(idx).ok_or_else(|| {
        ListLoadError::malformed(format!(
            "line {}: missing {} (field {})",
            record.line_no,
            what,
            idx + 1
        ))
    })?;
    raw.parse::<T>().map_err(|_| {
        ListLoadError::malformed(format!(
            "line {}: {} '{}' is not valid",
            record.line_no, what, raw
        ))
    })
}

fn field_string(record: &RecordLine, idx: usize, what: &str) -> ListResult<String> {
    record.fields.get(idx).cloned().ok_or_else(|| {
        ListLoadError::malformed(format!(
            "line {}: missing {} (field {})",
            record.line_no,
            what,
            idx + 1
        ))
    })
}

// ─── Shop records ────────────────────────────────────────────────────

/// How a package is paid for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum CurrencyKind {
    /// Paid cash points.
    Cash,
    /// Earned gameplay points.
    Points,
    /// Event / promotional currency.
    Event,
}

impl CurrencyKind {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Cash),
            1 => Some(Self::Points),
            2 => Some(Self::Event),
            _ => None,
        }
    }
}

/// One shop category: `index "name" display_order`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ShopCategory {
    pub index: u32,
    pub name: String,
    pub display_order: u32,
}

impl ShopCategory {
    pub fn parse(record: &RecordLine) -> ListResult<Self> {
        Ok(Self {
            index: parse_field(record, 0, "category index")?,
            name: field_string(record, 1, "category name")?,
            display_order: parse_field(record, 2, "display order")?,
        })
    }
}

/// One purchasable package: `index category "name" price currency_code`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ShopPackage {
    pub index: u32,
    pub category: u32,
    pub name: String,
    pub price: u32,
    pub currency: CurrencyKind,
}

impl ShopPackage {
    pub fn parse(record: &RecordLine) -> ListResult<Self> {
        let code: u8 = parse_field(record, 4, "currency code")?;
        let currency = CurrencyKind::from_code(code).ok_or_else(|| {
            ListLoadError::malformed(format!(
                "line {}: currency code '{}' is not valid",
                record.line_no, code
            ))
        })?;
        Ok(Self {
            index: parse_field(record, 0, "package index")?,
            category: parse_field(record, 1, "category index")?,
            name: field_string(record, 2, "package name")?,
            price: parse_field(record, 3, "price")?,
            currency,
        })
    }
}

/// One item inside a package:
/// `index package "name" item_group item_index quantity`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ShopProduct {
    pub index: u32,
    pub package: u32,
    pub name: String,
    pub item_group: u16,
    pub item_index: u16,
    pub quantity: u16,
}

impl ShopProduct {
    pub fn parse(record: &RecordLine) -> ListResult<Self> {
        Ok(Self {
            index: parse_field(record, 0, "product index")?,
            package: parse_field(record, 1, "package index")?,
            name: field_string(record, 2, "product name")?,
            item_group: parse_field(record, 3, "item group")?,
            item_index: parse_field(record, 4, "item index")?,
            quantity: parse_field(record, 5, "quantity")?,
        })
    }
}
