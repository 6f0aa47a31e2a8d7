use crate::core::client::{Metadata, StorageClient};
use crate::core::listing::ListingPages;
use crate::core::path;
use crate::error::{DbxError, Result};
use tracing::{debug, warn};

/// One remote file and the local name it should be written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferEntry {
    pub source: String,
    pub destination: String,
}

/// How the entries of a plan were derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanKind {
    /// One file whose destination is the command line argument itself.
    Single,
    /// Files found by listing a folder, each under its own sanitized name.
    Listing,
}

/// Ordered list of files to fetch for a single `get` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferPlan {
    kind: PlanKind,
    entries: Vec<TransferEntry>,
}

impl TransferPlan {
    pub fn single(source: &str, destination: &str) -> Self {
        Self {
            kind: PlanKind::Single,
            entries: vec![TransferEntry {
                source: source.to_string(),
                destination: destination.to_string(),
            }],
        }
    }

    fn listing() -> Self {
        Self {
            kind: PlanKind::Listing,
            entries: Vec::new(),
        }
    }

    pub fn kind(&self) -> PlanKind {
        self.kind
    }

    pub fn entries(&self) -> &[TransferEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn push(&mut self, entry: TransferEntry) {
        self.entries.push(entry);
    }
}

impl<'a> IntoIterator for &'a TransferPlan {
    type Item = &'a TransferEntry;
    type IntoIter = std::slice::Iter<'a, TransferEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Local file name for a remote path segment: whitespace becomes `_`.
/// Examples: "My Report.pdf" -> "My_Report.pdf", "a\tb c" -> "a_b_c"
pub fn destination_file_name(segment: &str) -> String {
    segment
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect()
}

/// Command level destination used when none is given on the command line.
pub fn default_destination(source: &str) -> String {
    if path::is_root(source) {
        ".".to_string()
    } else {
        path::base_name(source).to_string()
    }
}

/// Turn a validated source path into a transfer plan.
///
/// Without `recurse` the plan is the single `source -> destination` pair.
/// With `recurse` every file below `source` is listed, following
/// continuation pages, and each one is planned under its own sanitized
/// base name. Any listing failure aborts the whole plan.
pub fn build_plan<C: StorageClient + ?Sized>(
    client: &C,
    source: &str,
    destination: &str,
    recurse: bool,
) -> Result<TransferPlan> {
    if !recurse {
        if path::is_root(source) {
            return Err(DbxError::invalid_path(
                source,
                "the account root is a folder, use --recurse to download it",
            ));
        }
        return Ok(TransferPlan::single(source, destination));
    }

    let mut plan = TransferPlan::listing();

    for page in ListingPages::new(client, source, true) {
        let page = page.map_err(|e| listing_failed(source, e))?;

        for entry in page.entries {
            let Metadata::File(file) = entry else {
                continue;
            };

            let Some(remote_path) = file.canonical_path() else {
                warn!(name = %file.name, "skipping file without a path");
                continue;
            };

            let destination = destination_file_name(path::base_name(remote_path));
            debug!(source = remote_path, destination = %destination, "adding file to plan");
            plan.push(TransferEntry {
                source: remote_path.to_string(),
                destination,
            });
        }
    }

    if plan.is_empty() {
        return Err(DbxError::NothingToDownload {
            path: source.to_string(),
        });
    }

    Ok(plan)
}

fn listing_failed(source: &str, error: DbxError) -> DbxError {
    match error {
        DbxError::ListingFailed { .. } => error,
        other => DbxError::ListingFailed {
            path: source.to_string(),
            message: other.to_string(),
        },
    }
}
