// src/store.rs
//! Local key/value storage for ledgers and scope markers.
//!
//! `FileStore` keeps one file per key inside a directory (default `.store/`).
//! Keys too long for a file name (long scope keys) get a truncated name plus
//! a SHA-256 of the key, and the full key is kept on the file's first line.
//! `MemoryStore` is the same thing without a disk, for tests and previews.

use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
};

use sha2::{Digest, Sha256};

use crate::config::consts::STORE_EXT;

/// Longest file stem used as-is; 255 bytes is the usual file name limit.
const MAX_STEM: usize = 180;
/// Never produced by `encode_key`, so it marks a hashed name.
const HASH_MARK: char = '~';

pub trait KvStore {
    fn get(&self, key: &str) -> io::Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> io::Result<()>;
    /// Removing a missing key is not an error.
    fn remove(&mut self, key: &str) -> io::Result<()>;
    fn keys_with_prefix(&self, prefix: &str) -> io::Result<Vec<String>>;
}

/* ---------------- In memory ---------------- */

#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self { Self::default() }
    pub fn len(&self) -> usize { self.entries.len() }
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> io::Result<()> {
        self.entries.insert(s!(key), s!(value));
        Ok(())
    }

    fn remove(&mut self, key: &str) -> io::Result<()> {
        self.entries.remove(key);
        Ok(())
    }

    fn keys_with_prefix(&self, prefix: &str) -> io::Result<Vec<String>> {
        Ok(self.entries.keys().filter(|k| k.starts_with(prefix)).cloned().collect())
    }
}

/* ---------------- On disk ---------------- */

#[derive(Clone, Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// The directory is created lazily on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path { &self.dir }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.{STORE_EXT}", stem_for(key)))
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

fn stem_for(key: &str) -> String {
    let encoded = encode_key(key);
    if encoded.len() <= MAX_STEM {
        return encoded;
    }
    // room for the mark and 64 hex chars; never split a %XX escape
    let mut cut = MAX_STEM - 65;
    if let Some(p) = encoded[..cut].rfind('%') {
        if p + 3 > cut { cut = p; }
    }
    format!("{}{HASH_MARK}{}", &encoded[..cut], sha256_hex(key.as_bytes()))
}

fn is_hashed(stem: &str) -> bool {
    stem.contains(HASH_MARK)
}

impl KvStore for FileStore {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(text) if is_hashed(&stem_for(key)) => {
                Ok(Some(text.split_once('\n').map(|(_, v)| s!(v)).unwrap_or_default()))
            }
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        // write-then-rename so a crash never leaves half a ledger behind
        let tmp = path.with_extension(format!("{STORE_EXT}.tmp"));
        if is_hashed(&stem_for(key)) {
            fs::write(&tmp, join!(&encode_key(key), "\n", value))?;
        } else {
            fs::write(&tmp, value)?;
        }
        fs::rename(&tmp, &path)
    }

    fn remove(&mut self, key: &str) -> io::Result<()> {
        match fs::remove_file(self.path_for(key)) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }

    fn keys_with_prefix(&self, prefix: &str) -> io::Result<Vec<String>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if !path.is_file() { continue; }
            if path.extension().and_then(|s| s.to_str()) != Some(STORE_EXT) { continue; }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else { continue };
            let key = if is_hashed(stem) {
                let text = fs::read_to_string(&path)?;
                text.lines().next().and_then(decode_key)
            } else {
                decode_key(stem)
            };
            if let Some(key) = key {
                if key.starts_with(prefix) {
                    keys.push(key);
                }
            }
        }
        keys.sort();
        Ok(keys)
    }
}

/* ---------------- Key <-> file name ---------------- */

fn is_plain(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_')
}

/// Percent-encode everything outside `[A-Za-z0-9_-]` (the '.' too, so the
/// extension stays unambiguous).
pub fn encode_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for b in key.bytes() {
        if is_plain(b) {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{b:02X}"));
        }
    }
    out
}

pub fn decode_key(stem: &str) -> Option<String> {
    let bytes = stem.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = stem.get(i + 1..i + 3)?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}
