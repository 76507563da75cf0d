// src/core/cache.rs

use log::trace;
use std::{
    ffi::OsString,
    fs,
    io,
    path::{Path, PathBuf},
    time::SystemTime,
};

const HASH_TRUNCATE_LENGTH: usize = 16; // 16 bytes = 32 hex characters

/// The staleness stamp of a directory listing.
///
/// Two signatures are compared for equality; any difference means the cached
/// listing no longer describes the directory. The name digest catches changes
/// that land within the timestamp granularity of the filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectorySignature {
    /// Modification time of the directory itself.
    pub modified: Option<SystemTime>,
    /// Number of children.
    pub entry_count: usize,
    /// Truncated blake3 digest of the child names, hex encoded.
    pub names_hash: String,
}

/// One directory pass: the child paths in enumeration order and the signature
/// describing exactly that set.
#[derive(Debug)]
pub struct DirectorySnapshot {
    /// Child paths.
    pub entries: Vec<PathBuf>,
    /// Signature of `entries`.
    pub signature: DirectorySignature,
}

/// Reads a directory once, returning its children and their signature together.
pub fn snapshot_directory(path: &Path) -> io::Result<DirectorySnapshot> {
    let modified = fs::metadata(path)?.modified().ok();

    let mut names: Vec<OsString> = Vec::new();
    for entry in fs::read_dir(path)? {
        names.push(entry?.file_name());
    }

    let signature = signature_of(modified, &names);
    trace!(
        "Snapshot of '{}': {} entries, hash={}",
        path.display(),
        signature.entry_count,
        signature.names_hash
    );

    Ok(DirectorySnapshot {
        entries: names.iter().map(|name| path.join(name)).collect(),
        signature,
    })
}

/// Computes the live signature of a directory without building a listing.
pub fn calculate_signature(path: &Path) -> io::Result<DirectorySignature> {
    snapshot_directory(path).map(|snapshot| snapshot.signature)
}

fn signature_of(modified: Option<SystemTime>, names: &[OsString]) -> DirectorySignature {
    let mut hasher = blake3::Hasher::new();
    for name in names {
        hasher.update(name.to_string_lossy().as_bytes());
        hasher.update(&[0]);
    }
    let hash = hasher.finalize();
    let names_hash = hex::encode(hash.as_bytes().get(..HASH_TRUNCATE_LENGTH).unwrap_or_default());

    DirectorySignature {
        modified,
        entry_count: names.len(),
        names_hash,
    }
}
