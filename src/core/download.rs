use crate::core::client::{DownloadStream, StorageClient};
use crate::core::path;
use crate::core::plan::{PlanKind, TransferEntry, TransferPlan};
use crate::core::progress::{ProgressReader, TransferProgress};
use crate::error::{DbxError, Result};
use crate::utils::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const COPY_BUFFER_SIZE: usize = 64 * 1024;

#[derive(Debug)]
pub struct CompletedTransfer {
    pub source: String,
    pub output: PathBuf,
    pub bytes: u64,
}

#[derive(Debug)]
pub struct FailedTransfer {
    pub source: String,
    pub output: PathBuf,
    pub error: DbxError,
}

/// Outcome of executing a whole plan.
#[derive(Debug, Default)]
pub struct TransferReport {
    pub completed: Vec<CompletedTransfer>,
    pub failed: Vec<FailedTransfer>,
}

impl TransferReport {
    pub fn total(&self) -> usize {
        self.completed.len() + self.failed.len()
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn bytes(&self) -> u64 {
        self.completed.iter().map(|c| c.bytes).sum()
    }

    /// Overall outcome: an error if any entry failed.
    pub fn status(&self) -> Result<()> {
        if self.is_success() {
            return Ok(());
        }

        Err(DbxError::IncompleteTransfer {
            failed: self.failed.len(),
            total: self.total(),
        })
    }
}

enum CopyError {
    Read(io::Error),
    Write(io::Error),
}

pub struct Downloader<'a, C: StorageClient + ?Sized> {
    client: &'a C,
    show_progress: bool,
}

impl<'a, C: StorageClient + ?Sized> Downloader<'a, C> {
    pub fn new(client: &'a C) -> Self {
        Self {
            client,
            show_progress: true,
        }
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Download every entry of `plan` in order.
    ///
    /// `destination` is the command level destination argument; the local
    /// path of each entry is derived from it afresh. A failing entry is
    /// reported and skipped, the remaining entries still run.
    pub fn execute(&self, plan: &TransferPlan, destination: &str) -> TransferReport {
        let mut report = TransferReport::default();

        for entry in plan {
            let output = resolve_output_path(destination, plan.kind(), entry);
            println!("Downloading {} to {}", entry.source, output.display());

            match self.download_entry(entry, &output) {
                Ok(bytes) => report.completed.push(CompletedTransfer {
                    source: entry.source.clone(),
                    output,
                    bytes,
                }),
                Err(error) => {
                    debug!(source = %entry.source, error = %error, "download failed");
                    eprintln!("Error: {error}");
                    report.failed.push(FailedTransfer {
                        source: entry.source.clone(),
                        output,
                        error,
                    });
                }
            }
        }

        report
    }

    /// Fetch one remote file into `output`, returning the number of bytes written.
    pub fn download_entry(&self, entry: &TransferEntry, output: &Path) -> Result<u64> {
        // The remote stream and the local file are owned here and dropped on
        // every return path.
        let stream = self
            .client
            .download(&entry.source)
            .map_err(|e| DbxError::DownloadFailed {
                path: entry.source.clone(),
                message: e.to_string(),
            })?;
        let DownloadStream { size, reader } = stream;
        debug!(source = %entry.source, size, "download stream opened");

        let mut file = fs::create_output_file(output)?;

        let progress = TransferProgress::new(size, self.show_progress);
        let copied = {
            let mut reader =
                ProgressReader::new(reader, size, |done, total| progress.update(done, total));
            copy_stream(&mut reader, &mut file)
        };

        match copied {
            Ok(bytes) => {
                progress.finish();
                if bytes != size {
                    warn!(
                        source = %entry.source,
                        declared = size,
                        received = bytes,
                        "size mismatch"
                    );
                }
                Ok(bytes)
            }
            Err(e) => {
                progress.abandon();
                drop(file);
                fs::remove_partial_file(output);
                Err(match e {
                    CopyError::Read(e) => DbxError::DownloadFailed {
                        path: entry.source.clone(),
                        message: e.to_string(),
                    },
                    CopyError::Write(source) => DbxError::LocalWriteFailed {
                        path: output.to_path_buf(),
                        source,
                    },
                })
            }
        }
    }
}

/// Local path an entry is written to.
///
/// If `destination` names an existing directory the entry is placed inside
/// it, otherwise the entry's destination is used verbatim. Inside a
/// directory a single file keeps its remote base name and a listed file
/// uses its sanitized destination name.
pub fn resolve_output_path(destination: &str, kind: PlanKind, entry: &TransferEntry) -> PathBuf {
    let dir = Path::new(destination);
    if !fs::is_existing_dir(dir) {
        return PathBuf::from(&entry.destination);
    }

    match kind {
        PlanKind::Single => dir.join(path::base_name(&entry.source)),
        PlanKind::Listing => dir.join(&entry.destination),
    }
}

fn copy_stream<R: Read, W: Write>(
    reader: &mut R,
    writer: &mut W,
) -> std::result::Result<u64, CopyError> {
    let mut buf = vec![0u8; COPY_BUFFER_SIZE];
    let mut written = 0u64;

    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(CopyError::Read(e)),
        };
        writer.write_all(&buf[..n]).map_err(CopyError::Write)?;
        written += n as u64;
    }

    writer.flush().map_err(CopyError::Write)?;
    Ok(written)
}
