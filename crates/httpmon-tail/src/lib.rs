//! Poll-based tailer for an append-only log file.
//!
//! [`LogTailer`] remembers its byte offset into the file and, on each poll,
//! reads every complete line appended since the previous poll. Lines are
//! delivered in file order, each exactly once. A file that shrinks is
//! treated as rotated and re-read from the start.

use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tokio::time::{interval, Duration};

/// Errors that can occur while tailing the log file.
#[derive(Debug, thiserror::Error)]
pub enum TailError {
    /// The log file does not exist at startup.
    #[error("Tail: log file not found: {0}")]
    NotFound(PathBuf),

    /// An underlying filesystem error.
    #[error("Tail: I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience `Result` alias for tail operations.
pub type Result<T> = std::result::Result<T, TailError>;

/// Tracks a position in a growing log file and reads appended lines.
#[derive(Debug)]
pub struct LogTailer {
    path: PathBuf,
    position: u64,
}

impl LogTailer {
    /// Tails from the current end of the file, ignoring existing content.
    ///
    /// # Errors
    ///
    /// Returns [`TailError::NotFound`] if the file does not exist.
    pub fn from_end(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            return Err(TailError::NotFound(path));
        }
        let position = std::fs::metadata(&path)?.len();
        Ok(Self { path, position })
    }

    /// Tails from the beginning of the file, replaying existing content.
    ///
    /// # Errors
    ///
    /// Returns [`TailError::NotFound`] if the file does not exist.
    pub fn from_start(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            return Err(TailError::NotFound(path));
        }
        Ok(Self { path, position: 0 })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads every complete line appended since the last call.
    ///
    /// A trailing fragment without a newline is left in place and picked up
    /// on a later call once the writer finishes the line. A file smaller
    /// than the remembered offset has been rotated; reading restarts from
    /// offset zero.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be opened or read.
    pub fn read_new_lines(&mut self) -> Result<Vec<String>> {
        let file = File::open(&self.path)?;
        let file_size = file.metadata()?.len();

        if file_size < self.position {
            tracing::info!(
                path = %self.path.display(),
                "Log file shrank, assuming rotation and restarting from the beginning"
            );
            self.position = 0;
        }

        let mut reader = BufReader::new(file);
        reader.seek(SeekFrom::Start(self.position))?;

        let mut lines = Vec::new();
        let mut line = String::new();
        while reader.read_line(&mut line)? > 0 {
            if !line.ends_with('\n') {
                // Partial line still being written; retry next poll.
                break;
            }
            self.position = reader.stream_position()?;
            lines.push(line.trim_end_matches(['\r', '\n']).to_string());
            line.clear();
        }

        Ok(lines)
    }

    /// Polls the file every `poll_millis` milliseconds and sends each new
    /// line down `tx`, preserving file order. Returns when the receiving
    /// side closes.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if a poll fails to read the file.
    pub async fn run(mut self, tx: mpsc::Sender<String>, poll_millis: u64) -> Result<()> {
        let mut tick = interval(Duration::from_millis(poll_millis));
        loop {
            tick.tick().await;
            for line in self.read_new_lines()? {
                if tx.send(line).await.is_err() {
                    tracing::debug!("Line receiver closed, stopping tailer");
                    return Ok(());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_all(file: &mut std::fs::File, content: &str) {
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
    }

    #[test]
    fn missing_file_is_rejected_at_construction() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.log");
        assert!(matches!(
            LogTailer::from_end(&missing),
            Err(TailError::NotFound(_))
        ));
    }

    #[test]
    fn from_end_skips_existing_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("access.log");
        let mut file = std::fs::File::create(&path).unwrap();
        write_all(&mut file, "old line\n");

        let mut tailer = LogTailer::from_end(&path).unwrap();
        assert!(tailer.read_new_lines().unwrap().is_empty());

        write_all(&mut file, "new line\n");
        assert_eq!(tailer.read_new_lines().unwrap(), vec!["new line"]);
    }

    #[test]
    fn delivers_appended_lines_in_order_exactly_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("access.log");
        let mut file = std::fs::File::create(&path).unwrap();

        let mut tailer = LogTailer::from_start(&path).unwrap();
        write_all(&mut file, "one\ntwo\n");
        assert_eq!(tailer.read_new_lines().unwrap(), vec!["one", "two"]);

        write_all(&mut file, "three\n");
        assert_eq!(tailer.read_new_lines().unwrap(), vec!["three"]);
        assert!(tailer.read_new_lines().unwrap().is_empty());
    }

    #[test]
    fn partial_line_waits_for_its_newline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("access.log");
        let mut file = std::fs::File::create(&path).unwrap();

        let mut tailer = LogTailer::from_start(&path).unwrap();
        write_all(&mut file, "complete\nhalf");
        assert_eq!(tailer.read_new_lines().unwrap(), vec!["complete"]);

        write_all(&mut file, " done\n");
        assert_eq!(tailer.read_new_lines().unwrap(), vec!["half done"]);
    }

    #[test]
    fn shrunken_file_is_reread_from_the_start() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("access.log");
        let mut file = std::fs::File::create(&path).unwrap();

        let mut tailer = LogTailer::from_start(&path).unwrap();
        write_all(&mut file, "first generation\n");
        assert_eq!(
            tailer.read_new_lines().unwrap(),
            vec!["first generation"]
        );

        // Rotation: truncate and write fresh content.
        let mut file = std::fs::File::create(&path).unwrap();
        write_all(&mut file, "second\n");
        assert_eq!(tailer.read_new_lines().unwrap(), vec!["second"]);
    }

    #[tokio::test]
    async fn run_forwards_lines_over_the_channel() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("access.log");
        let mut file = std::fs::File::create(&path).unwrap();

        let tailer = LogTailer::from_end(&path).unwrap();
        let (tx, mut rx) = mpsc::channel(16);
        let handle = tokio::spawn(tailer.run(tx, 10));

        write_all(&mut file, "streamed line\n");
        let line = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap();
        assert_eq!(line.as_deref(), Some("streamed line"));

        drop(rx);
        // The tailer notices the closed receiver on its next delivery.
        write_all(&mut file, "after close\n");
        let result = tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
        assert!(result.is_ok());
    }
}
