//! Script-manifest parsing and glob expansion.
//!
//! A script manifest names the data files a client should hold, one per
//! record. Entries are either literal relative file names or glob
//! patterns; patterns are resolved against a remote directory listing.

use crate::list::error::{ListLoadError, ListResult};
use crate::list::records::tokenize_records;
use glob::Pattern;
use shopsync_transfer::transfer::{RemoteEntry, RemoteEntryKind};
use std::collections::HashSet;

pub const SCRIPT_LIST_FILE: &str = "scriptlist.txt";
pub const SCRIPT_VERSION_FILE: &str = "scriptversion.txt";

/// One manifest record.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptManifestEntry {
    /// A relative file name taken as-is.
    Literal(String),
    /// A glob resolved against the remote listing.
    Pattern(String),
}

fn is_glob(entry: &str) -> bool {
    entry.contains('*') || entry.contains('?') || entry.contains('[')
}

/// Parse a decoded script manifest.
pub fn parse_script_manifest(text: &str) -> ListResult<Vec<ScriptManifestEntry>> {
    let mut entries = Vec::new();
    for record in tokenize_records(text) {
        let name = record.fields.first().cloned().ok_or_else(|| {
            ListLoadError::malformed(format!("line {}: empty manifest entry", record.line_no))
        })?;
        if is_glob(&name) {
            // Validate eagerly so a bad pattern names its line.
            Pattern::new(&name).map_err(|e| {
                ListLoadError::malformed(format!(
                    "line {}: pattern '{}' is not valid: {}",
                    record.line_no, name, e
                ))
            })?;
            entries.push(ScriptManifestEntry::Pattern(name));
        } else {
            entries.push(ScriptManifestEntry::Literal(name));
        }
    }
    Ok(entries)
}

/// Expand manifest entries into an ordered, de-duplicated file set.
///
/// Literals keep manifest order; each pattern contributes its matches in
/// listing order. Only file entries participate in pattern matching.
pub fn expand_manifest(
    entries: &[ScriptManifestEntry],
    listing: &[RemoteEntry],
) -> ListResult<Vec<String>> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut files = Vec::new();

    for entry in entries {
        match entry {
            ScriptManifestEntry::Literal(name) => {
                if seen.insert(name.clone()) {
                    files.push(name.clone());
                }
            }
            ScriptManifestEntry::Pattern(raw) => {
                let pattern = Pattern::new(raw).map_err(|e| {
                    ListLoadError::malformed(format!("pattern '{}' is not valid: {}", raw, e))
                })?;
                for remote in listing {
                    if remote.kind != RemoteEntryKind::File {
                        continue;
                    }
                    if pattern.matches(&remote.name) && seen.insert(remote.name.clone()) {
                        files.push(remote.name.clone());
                    }
                }
            }
        }
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::list::error::ListLoadErrorKind;

    fn file(name: &str) -> RemoteEntry {
        RemoteEntry {
            name: name.into(),
            kind: RemoteEntryKind::File,
            size: 1,
            modified: None,
        }
    }

    #[test]
    fn test_parse_literals_and_patterns() {
        let text = "// shop scripts\nshopcategory.txt\nquest_*.txt\nend\n";
        let entries = parse_script_manifest(text).unwrap();
        assert_eq!(
            entries,
            vec![
                ScriptManifestEntry::Literal("shopcategory.txt".into()),
                ScriptManifestEntry::Pattern("quest_*.txt".into()),
            ]
        );
    }

    #[test]
    fn test_parse_rejects_bad_pattern() {
        let err = parse_script_manifest("quest_[.txt\nend\n").unwrap_err();
        assert_eq!(err.kind, ListLoadErrorKind::MalformedRecord);
        assert!(err.message.contains("line 1"));
    }

    #[test]
    fn test_expand_keeps_manifest_then_listing_order() {
        let entries = parse_script_manifest("intro.txt\nquest_*.txt\n").unwrap();
        let listing = vec![
            file("quest_01.txt"),
            file("quest_02.txt"),
            file("other.dat"),
        ];
        let files = expand_manifest(&entries, &listing).unwrap();
        assert_eq!(files, vec!["intro.txt", "quest_01.txt", "quest_02.txt"]);
    }

    #[test]
    fn test_expand_dedupes_overlap() {
        let entries = parse_script_manifest("quest_01.txt\nquest_*.txt\n").unwrap();
        let listing = vec![file("quest_01.txt"), file("quest_02.txt")];
        let files = expand_manifest(&entries, &listing).unwrap();
        assert_eq!(files, vec!["quest_01.txt", "quest_02.txt"]);
    }

    #[test]
    fn test_expand_ignores_directories() {
        let entries = parse_script_manifest("*\n").unwrap();
        let listing = vec![
            file("a.txt"),
            RemoteEntry {
                name: "nested".into(),
                kind: RemoteEntryKind::Directory,
                size: 0,
                modified: None,
            },
        ];
        let files = expand_manifest(&entries, &listing).unwrap();
        assert_eq!(files, vec!["a.txt"]);
    }

    #[test]
    fn test_expand_unmatched_pattern_is_empty_not_error() {
        let entries = parse_script_manifest("missing_*.txt\n").unwrap();
        let files = expand_manifest(&entries, &[]).unwrap();
        assert!(files.is_empty());
    }
}
