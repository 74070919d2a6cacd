//! Directory records in the listing probe's diagnostic stream
//!
//! The probe interleaves free-form progress text with one line per
//! directory entry:
//!
//! ```text
//! - DIR REC || Dirctry || target ID = 0x2f1a || file_size = 0 || name = Documents
//! - DIR REC || RegFile || target ID = 0x2f1b || file_size = 4182 || name = notes.txt
//! ```

use crate::{DirEntry, EntryKind};

/// Substring identifying a directory record
pub const DIR_RECORD_MARKER: &str = "- DIR REC";

pub const FIELD_DELIMITER: &str = "||";

/// Kind tag (second field) for subdirectories; any other tag is a file
pub const DIRECTORY_TAG: &str = "Dirctry";

const MIN_FIELDS: usize = 4;

/// Classification of one diagnostic line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingLine {
    Record(DirEntry),
    /// Not a directory record
    Ignored,
    /// Carries the marker but cannot be decoded
    Malformed { reason: &'static str },
}

pub fn parse_line(line: &str) -> ListingLine {
    if !line.contains(DIR_RECORD_MARKER) {
        return ListingLine::Ignored;
    }

    let fields: Vec<&str> = line.split(FIELD_DELIMITER).collect();
    if fields.len() < MIN_FIELDS {
        return ListingLine::Malformed {
            reason: "fewer than four fields",
        };
    }

    let kind = if fields[1].trim() == DIRECTORY_TAG {
        EntryKind::Directory
    } else {
        EntryKind::File
    };

    let last = fields[fields.len() - 1];
    let name = match last.rsplit_once('=') {
        Some((_, name)) => name.trim(),
        None => {
            return ListingLine::Malformed {
                reason: "final field has no `=`",
            }
        }
    };
    if name.is_empty() {
        return ListingLine::Malformed {
            reason: "empty name",
        };
    }

    ListingLine::Record(DirEntry {
        name: name.to_string(),
        kind,
    })
}

/// Render a record the way the listing probe prints it
pub fn format_record(entry: &DirEntry, target_id: u64, file_size: u64) -> String {
    let tag = match entry.kind {
        EntryKind::Directory => DIRECTORY_TAG,
        EntryKind::File => "RegFile",
    };
    format!(
        "{} {} {} {} target ID = {:#8x} {} file_size = {} {} name = {}",
        DIR_RECORD_MARKER,
        FIELD_DELIMITER,
        tag,
        FIELD_DELIMITER,
        target_id,
        FIELD_DELIMITER,
        file_size,
        FIELD_DELIMITER,
        entry.name
    )
}
