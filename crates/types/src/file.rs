//
// Copyright (c) 2026 TGStream Contributors
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: tgstream — stream files out of a chat backend over HTTP.
//

//! File metadata and the opaque file-location handle produced by the
//! upstream client and consumed by the transfer engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata the upstream attaches to a file message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMeta {
    pub name: Option<String>,
    pub ext: Option<String>,
    pub size: u64,
    pub mime_type: String,
}

/// Opaque handle to a file's bytes on a specific DC. Produced by the
/// upstream client (`get_input_location`); never inspected by the transfer
/// engine beyond reading `dc_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileLocation {
    pub dc_id: u8,
    /// Upstream-specific location bytes (document id, access hash,
    /// file reference, ...), opaque to everything in this workspace.
    pub opaque: Vec<u8>,
}

/// Resolve the display name for a file, matching the upstream's
/// `get_file_name`: the upstream-provided name if present, otherwise a
/// timestamp built from the message date and the upstream-provided
/// extension (possibly empty).
pub fn resolved_file_name(meta: &FileMeta, date: DateTime<Utc>) -> String {
    if let Some(name) = &meta.name {
        return name.clone();
    }
    let ext = meta.ext.as_deref().unwrap_or("");
    format!("{}{}", date.format("%Y-%m-%d_%H:%M:%S"), ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-07-28T12:34:56Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn uses_upstream_name_when_present() {
        let meta = FileMeta {
            name: Some("report.pdf".to_string()),
            ext: Some(".bin".to_string()),
            size: 10,
            mime_type: "application/pdf".to_string(),
        };
        assert_eq!(resolved_file_name(&meta, date()), "report.pdf");
    }

    #[test]
    fn falls_back_to_timestamp_with_extension() {
        let meta = FileMeta {
            name: None,
            ext: Some(".jpg".to_string()),
            size: 10,
            mime_type: "image/jpeg".to_string(),
        };
        assert_eq!(resolved_file_name(&meta, date()), "2026-07-28_12:34:56.jpg");
    }

    #[test]
    fn falls_back_to_timestamp_without_extension() {
        let meta = FileMeta {
            name: None,
            ext: None,
            size: 10,
            mime_type: "application/octet-stream".to_string(),
        };
        assert_eq!(resolved_file_name(&meta, date()), "2026-07-28_12:34:56");
    }
}
