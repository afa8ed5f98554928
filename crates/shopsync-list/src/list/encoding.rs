//! Encoding probe and decode for list files.
//!
//! List files arrive in one of two real-world shapes: UTF-8 with a BOM
//! (written by newer tooling) or BOM-less legacy ANSI (the original
//! Korean client data is CP949/EUC-KR). The probe only inspects leading
//! bytes; anything it cannot classify decodes via the legacy fallback,
//! so decoding itself never fails — only record parsing can.

use encoding_rs::{Encoding, EUC_KR, UTF_8};
use serde::{Deserialize, Serialize};

/// Legacy code page assumed for BOM-less files.
pub fn default_legacy_encoding() -> &'static Encoding {
    EUC_KR
}

/// Result of probing a file's leading bytes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum FileEncoding {
    /// UTF-8 BOM (`EF BB BF`).
    Utf8,
    /// No BOM — assume the legacy code page.
    Legacy,
    /// A BOM this pipeline does not handle natively (UTF-16 LE/BE).
    Unknown,
}

/// Probe the leading bytes of a list file.
pub fn detect_encoding(bytes: &[u8]) -> FileEncoding {
    if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) {
        return FileEncoding::Utf8;
    }
    // UTF-16 LE / BE BOMs
    if bytes.starts_with(&[0xFF, 0xFE]) || bytes.starts_with(&[0xFE, 0xFF]) {
        return FileEncoding::Unknown;
    }
    FileEncoding::Legacy
}

/// Decode a list file to text, returning the probe result alongside.
///
/// `Unknown` falls back to the legacy decode rather than erroring;
/// malformed sequences become replacement characters either way.
pub fn decode_list_text(bytes: &[u8], legacy: &'static Encoding) -> (String, FileEncoding) {
    let detected = detect_encoding(bytes);
    let text = match detected {
        FileEncoding::Utf8 => {
            let (cow, _, _) = UTF_8.decode(bytes);
            cow.into_owned()
        }
        FileEncoding::Legacy | FileEncoding::Unknown => {
            let (cow, _) = legacy.decode_without_bom_handling(bytes);
            cow.into_owned()
        }
    };
    (text, detected)
}
