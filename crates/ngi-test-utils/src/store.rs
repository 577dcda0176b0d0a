//! In-memory asset store

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use ngi_assets::{AssetStore, Conflict, StoreError, Visibility, WriteConfig};
use ngi_fileid::{AddressingScheme, ContentHash, FileIdHelper, FileTuple, Filesystem, SchemeHelper, TupleResolution};
use parking_lot::Mutex;
use std::io::Read;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Bytes and metadata behind one file ID
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub data: Vec<u8>,
    pub hash: String,
    pub visibility: Visibility,
}

/// Store keeping every file in a concurrent map keyed by file ID
#[derive(Debug)]
pub struct MemoryStore {
    helper: SchemeHelper,
    files: DashMap<String, StoredFile>,
    grants: Mutex<Vec<(String, String)>>,
    writes: AtomicUsize,
    refuse_grants: bool,
}

impl MemoryStore {
    pub fn new(scheme: AddressingScheme) -> Self {
        Self {
            helper: scheme.helper(),
            files: DashMap::new(),
            grants: Mutex::new(Vec::new()),
            writes: AtomicUsize::new(0),
            refuse_grants: false,
        }
    }

    /// Store whose `grant` always fails
    #[must_use]
    pub fn refusing_grants(mut self) -> Self {
        self.refuse_grants = true;
        self
    }

    /// Store an original; its hash is computed from `data`
    pub fn upload(&self, filename: &str, data: &[u8], visibility: Visibility) -> FileTuple {
        self.set_from_string(data, filename, "", "", &WriteConfig::use_existing(visibility))
            .unwrap()
    }

    pub fn stored(&self, filename: &str, hash: &str, variant: &str) -> Option<StoredFile> {
        let file_id = self.helper.build_file_id(filename, hash, variant).ok()?;
        self.files.get(&file_id).map(|file| file.value().clone())
    }

    pub fn read(&self, filename: &str, hash: &str, variant: &str) -> Option<Vec<u8>> {
        self.stored(filename, hash, variant).map(|file| file.data)
    }

    /// Every stored file ID, sorted
    pub fn file_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.files.iter().map(|entry| entry.key().clone()).collect();
        ids.sort();
        ids
    }

    /// Number of writes that stored new bytes
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// (filename, hash) pairs granted so far, in order
    pub fn grants(&self) -> Vec<(String, String)> {
        self.grants.lock().clone()
    }

    /// Move an original and all of its variants to `visibility`
    ///
    /// Returns the number of files changed.
    pub fn set_visibility(&self, original: &FileTuple, resolver: &dyn TupleResolution, visibility: Visibility) -> usize {
        let mut changed = 0;
        for variant in resolver.find_variants(original, self) {
            if let Some(mut file) = self.files.get_mut(variant.file_id()) {
                if file.visibility != visibility {
                    file.visibility = visibility;
                    changed += 1;
                }
            }
        }
        changed
    }

    fn record_grant(&self, filename: &str, hash: &str) {
        self.grants.lock().push((filename.to_string(), hash.to_string()));
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(AddressingScheme::Hash)
    }
}

/// `folder/logo.png` -> `folder/logo-v2.png`
fn renamed(filename: &str, attempt: u32) -> String {
    let start = filename.rfind('/').map_or(0, |slash| slash + 1);
    match filename[start..].find('.') {
        Some(dot) => {
            let (stem, ext) = filename.split_at(start + dot);
            format!("{stem}-v{attempt}{ext}")
        }
        None => format!("{filename}-v{attempt}"),
    }
}

impl AssetStore for MemoryStore {
    fn exists(&self, filename: &str, hash: &str, variant: &str) -> bool {
        self.helper
            .build_file_id(filename, hash, variant)
            .is_ok_and(|file_id| self.files.contains_key(&file_id))
    }

    fn set_from_stream(
        &self,
        stream: &mut dyn Read,
        filename: &str,
        hash: &str,
        variant: &str,
        config: &WriteConfig,
    ) -> Result<FileTuple, StoreError> {
        let mut data = Vec::new();
        stream
            .read_to_end(&mut data)
            .map_err(|err| StoreError::io_error(filename, err))?;
        self.set_from_string(&data, filename, hash, variant, config)
    }

    fn set_from_string(
        &self,
        data: &[u8],
        filename: &str,
        hash: &str,
        variant: &str,
        config: &WriteConfig,
    ) -> Result<FileTuple, StoreError> {
        let hash = if hash.is_empty() {
            ContentHash::compute(data).to_hex()
        } else {
            hash.to_string()
        };

        let mut attempt = 1;
        loop {
            let candidate = if attempt == 1 {
                filename.to_string()
            } else {
                renamed(filename, attempt)
            };
            let file_id = self.helper.build_file_id(&candidate, &hash, variant)?;
            let tuple = FileTuple::new(candidate, hash.as_str(), variant).with_file_id(file_id.as_str());
            match self.files.entry(file_id) {
                Entry::Vacant(slot) => {
                    slot.insert(StoredFile {
                        data: data.to_vec(),
                        hash: hash.clone(),
                        visibility: config.visibility,
                    });
                    self.writes.fetch_add(1, Ordering::SeqCst);
                    return Ok(tuple);
                }
                Entry::Occupied(slot) => match config.conflict {
                    Conflict::UseExisting => return Ok(tuple.with_hash(slot.get().hash.as_str())),
                    Conflict::Error => return Err(StoreError::Conflict(slot.key().clone())),
                    Conflict::Rename => attempt += 1,
                },
            }
        }
    }

    fn grant(&self, filename: &str, hash: &str) -> Result<(), StoreError> {
        if self.refuse_grants {
            return Err(StoreError::GrantRefused {
                filename: filename.to_string(),
                reason: "grants disabled".to_string(),
            });
        }
        self.record_grant(filename, hash);
        Ok(())
    }

    fn url(&self, filename: &str, hash: &str, variant: &str, grant: bool) -> Option<String> {
        let file_id = self.helper.build_file_id(filename, hash, variant).ok()?;
        let visibility = self.files.get(&file_id)?.visibility;
        if grant && visibility == Visibility::Protected {
            self.record_grant(filename, hash);
        }
        Some(format!("/assets/{file_id}"))
    }
}

impl Filesystem for MemoryStore {
    fn has(&self, file_id: &str) -> bool {
        self.files.contains_key(file_id)
    }

    fn content_hash(&self, file_id: &str) -> Option<String> {
        self.files.get(file_id).map(|file| file.hash.clone())
    }

    fn list(&self, folder: &str) -> Vec<String> {
        let prefix = if folder.is_empty() {
            String::new()
        } else {
            format!("{}/", folder.trim_end_matches('/'))
        };
        self.file_ids()
            .into_iter()
            .filter(|file_id| file_id.starts_with(&prefix))
            .collect()
    }
}
