use crate::error::Result;
use serde::Deserialize;
use std::io::Read;

/// One metadata record returned by a folder listing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = ".tag", rename_all = "lowercase")]
pub enum Metadata {
    File(FileMetadata),
    Folder(FolderMetadata),
    Deleted(DeletedMetadata),
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FileMetadata {
    pub name: String,
    #[serde(default)]
    pub path_lower: Option<String>,
    #[serde(default)]
    pub path_display: Option<String>,
    pub size: u64,
}

impl FileMetadata {
    /// Canonical (lowercase) path, falling back to the display path.
    pub fn canonical_path(&self) -> Option<&str> {
        self.path_lower
            .as_deref()
            .or(self.path_display.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FolderMetadata {
    pub name: String,
    #[serde(default)]
    pub path_lower: Option<String>,
    #[serde(default)]
    pub path_display: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DeletedMetadata {
    pub name: String,
    #[serde(default)]
    pub path_lower: Option<String>,
}

/// A single page of a folder listing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ListFolderResult {
    pub entries: Vec<Metadata>,
    pub cursor: String,
    pub has_more: bool,
}

/// Remote file contents together with the size the service declared for them.
pub struct DownloadStream {
    pub size: u64,
    pub reader: Box<dyn Read + Send>,
}

impl std::fmt::Debug for DownloadStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadStream")
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

/// Operations the `get` command needs from the storage service.
pub trait StorageClient {
    fn list_folder(&self, path: &str, recursive: bool) -> Result<ListFolderResult>;

    fn list_folder_continue(&self, cursor: &str) -> Result<ListFolderResult>;

    fn download(&self, path: &str) -> Result<DownloadStream>;
}

impl<C: StorageClient + ?Sized> StorageClient for &C {
    fn list_folder(&self, path: &str, recursive: bool) -> Result<ListFolderResult> {
        (**self).list_folder(path, recursive)
    }

    fn list_folder_continue(&self, cursor: &str) -> Result<ListFolderResult> {
        (**self).list_folder_continue(cursor)
    }

    fn download(&self, path: &str) -> Result<DownloadStream> {
        (**self).download(path)
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use crate::error::DbxError;
    use std::cell::RefCell;
    use std::collections::{HashMap, HashSet};
    use std::io::Cursor;

    pub fn file(path: &str, size: u64) -> Metadata {
        Metadata::File(FileMetadata {
            name: crate::core::path::base_name(path).to_string(),
            path_lower: Some(path.to_lowercase()),
            path_display: Some(path.to_string()),
            size,
        })
    }

    pub fn folder(path: &str) -> Metadata {
        Metadata::Folder(FolderMetadata {
            name: crate::core::path::base_name(path).to_string(),
            path_lower: Some(path.to_lowercase()),
            path_display: Some(path.to_string()),
        })
    }

    /// In-memory storage service with scripted listing pages and file bodies.
    #[derive(Default)]
    pub struct MockClient {
        pages: Vec<Vec<Metadata>>,
        failing_page: Option<usize>,
        files: HashMap<String, Vec<u8>>,
        declared_sizes: HashMap<String, u64>,
        failing_downloads: HashSet<String>,
        pub listed: RefCell<Vec<(String, bool)>>,
        pub continued: RefCell<Vec<String>>,
        pub downloaded: RefCell<Vec<String>>,
    }

    impl MockClient {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_page(mut self, entries: Vec<Metadata>) -> Self {
            self.pages.push(entries);
            self
        }

        /// Make the listing call for page `index` (0 = initial) fail.
        pub fn failing_page(mut self, index: usize) -> Self {
            self.failing_page = Some(index);
            self
        }

        pub fn with_file(mut self, path: &str, contents: &[u8]) -> Self {
            self.files.insert(path.to_string(), contents.to_vec());
            self
        }

        pub fn with_declared_size(mut self, path: &str, size: u64) -> Self {
            self.declared_sizes.insert(path.to_string(), size);
            self
        }

        pub fn failing_download(mut self, path: &str) -> Self {
            self.failing_downloads.insert(path.to_string());
            self
        }

        fn page(&self, index: usize) -> Result<ListFolderResult> {
            if self.failing_page == Some(index) {
                return Err(DbxError::Api {
                    status: 409,
                    summary: format!("path/not_found/.. (page {index})"),
                });
            }
            let entries = self.pages.get(index).cloned().unwrap_or_default();
            Ok(ListFolderResult {
                entries,
                cursor: format!("cursor-{}", index + 1),
                has_more: index + 1 < self.pages.len(),
            })
        }
    }

    impl StorageClient for MockClient {
        fn list_folder(&self, path: &str, recursive: bool) -> Result<ListFolderResult> {
            self.listed.borrow_mut().push((path.to_string(), recursive));
            self.page(0)
        }

        fn list_folder_continue(&self, cursor: &str) -> Result<ListFolderResult> {
            self.continued.borrow_mut().push(cursor.to_string());
            let index = cursor
                .strip_prefix("cursor-")
                .and_then(|n| n.parse::<usize>().ok())
                .ok_or_else(|| DbxError::Api {
                    status: 409,
                    summary: "reset/".to_string(),
                })?;
            self.page(index)
        }

        fn download(&self, path: &str) -> Result<DownloadStream> {
            self.downloaded.borrow_mut().push(path.to_string());
            if self.failing_downloads.contains(path) {
                return Err(DbxError::Api {
                    status: 500,
                    summary: "internal_error".to_string(),
                });
            }
            let contents = self.files.get(path).cloned().ok_or_else(|| DbxError::Api {
                status: 409,
                summary: "path/not_found/".to_string(),
            })?;
            let size = self
                .declared_sizes
                .get(path)
                .copied()
                .unwrap_or(contents.len() as u64);
            Ok(DownloadStream {
                size,
                reader: Box::new(Cursor::new(contents)),
            })
        }
    }
}
