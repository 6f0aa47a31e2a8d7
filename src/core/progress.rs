use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::io::{self, Read};

const PROGRESS_TEMPLATE: &str = "Downloading {binary_bytes}/{binary_total_bytes}";

/// Reader adapter that reports `(bytes_read_so_far, total)` after every read.
pub struct ProgressReader<R, F> {
    inner: R,
    total: u64,
    transferred: u64,
    on_progress: F,
}

impl<R: Read, F: FnMut(u64, u64)> ProgressReader<R, F> {
    pub fn new(inner: R, total: u64, on_progress: F) -> Self {
        Self {
            inner,
            total,
            transferred: 0,
            on_progress,
        }
    }
}

impl<R: Read, F: FnMut(u64, u64)> Read for ProgressReader<R, F> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.transferred += n as u64;
        (self.on_progress)(self.transferred, self.total);
        Ok(n)
    }
}

/// Single line progress display for one file, drawn on stderr.
pub struct TransferProgress {
    bar: ProgressBar,
}

impl TransferProgress {
    pub fn new(total: u64, visible: bool) -> Self {
        let target = if visible {
            ProgressDrawTarget::stderr()
        } else {
            ProgressDrawTarget::hidden()
        };
        let bar = ProgressBar::with_draw_target(Some(total), target);
        if let Ok(style) = ProgressStyle::with_template(PROGRESS_TEMPLATE) {
            bar.set_style(style);
        }
        Self { bar }
    }

    pub fn update(&self, transferred: u64, total: u64) {
        // The declared size can be smaller than what the stream delivers.
        if transferred > total {
            self.bar.set_length(transferred);
        }
        self.bar.set_position(transferred);
    }

    pub fn finish(self) {
        self.bar.finish();
    }

    pub fn abandon(self) {
        self.bar.abandon();
    }
}
