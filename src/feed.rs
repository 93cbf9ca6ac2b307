//! Background text feed for the speech bubble.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::error::FeedError;
use crate::present::message::MessageSlot;

/// Produces the text to show, polled from a background thread.
pub trait TextSource: Send {
    fn fetch(&mut self) -> Result<String, FeedError>;

    /// Human-readable name for logs.
    fn describe(&self) -> String;
}

/// Bytes read from the end of the log on each poll.
const TAIL_WINDOW: u64 = 64 * 1024;

/// Shows the newest line of a log file.
pub struct LogTail {
    path: PathBuf,
    max_chars: usize,
}

impl LogTail {
    pub fn new(path: impl Into<PathBuf>, max_chars: usize) -> Self {
        Self {
            path: path.into(),
            max_chars,
        }
    }
}

impl TextSource for LogTail {
    fn fetch(&mut self) -> Result<String, FeedError> {
        let tail = read_tail(&self.path, TAIL_WINDOW).map_err(|source| FeedError::Io {
            path: self.path.clone(),
            source,
        })?;
        Ok(last_line(&String::from_utf8_lossy(&tail), self.max_chars))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// The last `window` bytes of the file, or all of it if shorter. A line
/// longer than the window comes back cut at its start.
fn read_tail(path: &Path, window: u64) -> io::Result<Vec<u8>> {
    let mut file = File::open(path)?;
    let len = file.metadata()?.len();
    let start = len.saturating_sub(window);
    file.seek(SeekFrom::Start(start))?;

    let mut tail = Vec::with_capacity((len - start) as usize);
    file.take(window).read_to_end(&mut tail)?;
    Ok(tail)
}

/// Last non-blank line, trimmed and cut to `max_chars` characters.
fn last_line(text: &str, max_chars: usize) -> String {
    let line = text
        .lines()
        .rev()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("");
    match line.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}…", &line[..cut]),
        None => line.to_owned(),
    }
}

/// Fetch once and publish. Failures are logged and leave the slot untouched.
pub fn poll_once(source: &mut dyn TextSource, slot: &MessageSlot) -> bool {
    match source.fetch() {
        Ok(text) => {
            let changed = slot.set(&text);
            if changed {
                log::debug!("message from {}: {:?}", source.describe(), text);
            }
            changed
        }
        Err(e) => {
            log::warn!("feed poll failed, retrying next interval: {e}");
            false
        }
    }
}

/// Poll `source` every `interval` for the life of the process.
pub fn spawn_poller(
    mut source: Box<dyn TextSource>,
    slot: MessageSlot,
    interval: Duration,
) -> std::io::Result<JoinHandle<()>> {
    log::info!("Polling {} every {:?}", source.describe(), interval);
    thread::Builder::new()
        .name("feed-poller".into())
        .spawn(move || loop {
            poll_once(source.as_mut(), &slot);
            thread::sleep(interval);
        })
}
