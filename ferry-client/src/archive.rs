//! Zip packing for multi-object downloads

use std::collections::HashSet;
use std::io::{Cursor, Write};

use bytes::Bytes;
use ferry_core::domain::storage::base_name;
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::objects::DownloadedFile;

/// A zip archive held in memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Archive {
    /// Suggested file name, e.g. `collection.zip`
    pub file_name: String,
    /// Entry names inside the folder, in the order they were written
    pub entries: Vec<String>,
    pub bytes: Bytes,
}

/// Packs `files` under `folder/` inside a new zip archive
///
/// Entries are named after the last segment of each key. Clashing names get
/// a ` (n)` suffix before the extension.
pub fn pack(folder: &str, files: &[DownloadedFile]) -> Result<Archive, ZipError> {
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    writer.add_directory(format!("{}/", folder), options)?;

    let mut used = HashSet::new();
    let mut entries = Vec::with_capacity(files.len());
    for file in files {
        let name = unique_name(entry_name(&file.key), &mut used);
        writer.start_file(format!("{}/{}", folder, name), options)?;
        writer.write_all(&file.bytes)?;
        entries.push(name);
    }

    let cursor = writer.finish()?;
    Ok(Archive {
        file_name: format!("{}.zip", folder),
        entries,
        bytes: Bytes::from(cursor.into_inner()),
    })
}

fn entry_name(key: &str) -> String {
    match base_name(key) {
        "" => key.trim_end_matches('/').replace('/', "_"),
        name => name.to_string(),
    }
}

fn unique_name(name: String, used: &mut HashSet<String>) -> String {
    if used.insert(name.clone()) {
        return name;
    }

    let (stem, ext) = match name.rfind('.') {
        Some(dot) if dot > 0 => name.split_at(dot),
        _ => (name.as_str(), ""),
    };

    let mut n = 1;
    loop {
        let candidate = format!("{} ({}){}", stem, n, ext);
        if used.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}
