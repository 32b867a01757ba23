//! Deferred calendar export and atomic file delivery.
//!
//! `schedule_export` hands back a `PendingExport` straight away and
//! assembles the file on a worker thread after a fixed delay, giving the
//! caller a window to show a busy indicator. There is no cancellation.
//! Keeping a single export in flight is left to the caller.

use crate::config::ExportConfig;
use crate::reminder::{render_ics, ReminderEvent};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tempfile::NamedTempFile;

/// A rendered reminder ready for delivery
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CalendarFile {
    pub filename: String,
    pub content: String,
}

impl CalendarFile {
    /// Write into `dir` under the file's own name
    pub fn write_to_dir(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(&self.filename);
        self.write_to(&path)?;
        Ok(path)
    }

    /// Write to `path` atomically
    ///
    /// The content goes to a temp file in the same directory, is synced,
    /// then renamed over any previous file.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&parent)?;

        let temp = NamedTempFile::new_in(&parent)?;
        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            writer.write_all(self.content.as_bytes())?;
            writer.flush()?;
        }
        temp.as_file().sync_all()?;
        temp.persist(path).map_err(|e| Error::Io(e.error))?;

        tracing::info!("Wrote calendar reminder to {:?}", path);
        Ok(())
    }
}

/// Completion token for a scheduled export
#[derive(Debug)]
pub struct PendingExport {
    handle: JoinHandle<CalendarFile>,
}

impl PendingExport {
    /// True once the file has been assembled and `wait` will not block
    pub fn is_ready(&self) -> bool {
        self.handle.is_finished()
    }

    /// Block until the file is assembled
    pub fn wait(self) -> Result<CalendarFile> {
        self.handle
            .join()
            .map_err(|_| Error::Export("calendar export task panicked".into()))
    }
}

/// Start assembling the reminder for `event` after the configured delay.
///
/// `stamp` is the creation moment written as DTSTAMP.
pub fn schedule_export(
    event: ReminderEvent,
    stamp: DateTime<Utc>,
    settings: &ExportConfig,
) -> PendingExport {
    let delay = Duration::from_millis(settings.delay_ms);
    let filename = settings.filename.clone();
    let product_id = settings.product_id.clone();

    tracing::debug!(
        "Scheduling calendar export for {} in {:?}",
        event.reorder_date,
        delay
    );

    let handle = thread::spawn(move || {
        if !delay.is_zero() {
            thread::sleep(delay);
        }
        let content = render_ics(&event, stamp, &product_id);
        tracing::debug!("Assembled calendar export ({} bytes)", content.len());
        CalendarFile { filename, content }
    });

    PendingExport { handle }
}
