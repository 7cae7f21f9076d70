//! Detection sources
//!
//! The tag detector itself runs outside this process. Its output reaches the
//! frame loop as newline-delimited JSON, one frame per line, either as a bare
//! array of detections or wrapped as `{"tags": [...]}`:
//!
//! ```json
//! [{"id": 0, "corners": [[0,0],[10,0],[10,10],[0,10]]}]
//! {"tags": [{"id": 7, "corners": [[90,90],[110,90],[110,110],[90,110]]}]}
//! ```

use std::collections::VecDeque;
use std::io::BufRead;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use swarm_core::Detection;

use crate::error::{RelayError, Result};

pub trait DetectionSource: Send {
    /// Next frame of detections; `Ok(None)` once the source is exhausted
    fn next_frame(&mut self) -> Result<Option<Vec<Detection>>>;
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FrameLine {
    Bare(Vec<Detection>),
    Wrapped { tags: Vec<Detection> },
}

/// Parse one line of detector output
pub fn parse_frame(line: &str) -> Result<Vec<Detection>> {
    let frame: FrameLine = serde_json::from_str(line)?;
    match frame {
        FrameLine::Bare(tags) | FrameLine::Wrapped { tags } => Ok(tags),
    }
}

// ============================================================================
// Replay
// ============================================================================

/// Recorded session loaded from a file
pub struct ReplaySource {
    path: PathBuf,
    frames: Vec<Vec<Detection>>,
    cursor: usize,
    looping: bool,
}

impl ReplaySource {
    /// Load every frame up front. A missing or unreadable file is an error;
    /// malformed lines are logged and skipped.
    pub fn open(path: impl AsRef<Path>, looping: bool) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let text = std::fs::read_to_string(&path).map_err(|e| {
            RelayError::Source(format!("cannot open replay {}: {e}", path.display()))
        })?;

        let mut frames = Vec::new();
        for (number, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match parse_frame(line) {
                Ok(frame) => frames.push(frame),
                Err(e) => {
                    tracing::warn!(line = number + 1, error = %e, "skipping malformed replay line")
                }
            }
        }
        tracing::info!(path = %path.display(), frames = frames.len(), looping, "replay loaded");

        Ok(Self { path, frames, cursor: 0, looping })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl DetectionSource for ReplaySource {
    fn next_frame(&mut self) -> Result<Option<Vec<Detection>>> {
        if self.cursor >= self.frames.len() {
            if !self.looping || self.frames.is_empty() {
                return Ok(None);
            }
            tracing::debug!("replay restarting");
            self.cursor = 0;
        }
        let frame = self.frames[self.cursor].clone();
        self.cursor += 1;
        Ok(Some(frame))
    }
}

// ============================================================================
// Live stream
// ============================================================================

/// Frames read as they arrive, typically from the detector piped into stdin
pub struct StreamSource<R> {
    reader: R,
    line: Vec<u8>,
}

impl<R: BufRead + Send> StreamSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, line: Vec::new() }
    }
}

impl<R: BufRead + Send> DetectionSource for StreamSource<R> {
    fn next_frame(&mut self) -> Result<Option<Vec<Detection>>> {
        loop {
            self.line.clear();
            if self.reader.read_until(b'\n', &mut self.line)? == 0 {
                return Ok(None);
            }
            let Ok(line) = std::str::from_utf8(&self.line) else {
                tracing::warn!("skipping non utf-8 detection frame");
                continue;
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match parse_frame(line) {
                Ok(frame) => return Ok(Some(frame)),
                Err(e) => tracing::warn!(error = %e, "skipping malformed detection frame"),
            }
        }
    }
}

// ============================================================================
// Scripted
// ============================================================================

/// Fixed frames held in memory
#[derive(Debug, Default)]
pub struct ScriptedSource {
    frames: VecDeque<Vec<Detection>>,
}

impl ScriptedSource {
    pub fn new(frames: impl IntoIterator<Item = Vec<Detection>>) -> Self {
        Self { frames: frames.into_iter().collect() }
    }
}

impl DetectionSource for ScriptedSource {
    fn next_frame(&mut self) -> Result<Option<Vec<Detection>>> {
        Ok(self.frames.pop_front())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    const CORNER: &str = r#"{"id": 0, "corners": [[0,0],[10,0],[10,10],[0,10]]}"#;

    #[test]
    fn test_parse_both_shapes() {
        let bare = parse_frame(&format!("[{CORNER}]")).unwrap();
        let wrapped = parse_frame(&format!(r#"{{"tags": [{CORNER}]}}"#)).unwrap();
        assert_eq!(bare, wrapped);
        assert_eq!(bare[0].id, 0);
        assert!(parse_frame("[]").unwrap().is_empty());
        assert!(parse_frame("{\"id\": 3}").is_err());
    }

    #[test]
    fn test_replay_skips_bad_lines_and_loops() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[{CORNER}]").unwrap();
        writeln!(file, "not json").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "[]").unwrap();

        let mut replay = ReplaySource::open(file.path(), true).unwrap();
        assert_eq!(replay.len(), 2);
        assert_eq!(replay.next_frame().unwrap().unwrap().len(), 1);
        assert_eq!(replay.next_frame().unwrap().unwrap().len(), 0);
        assert_eq!(replay.next_frame().unwrap().unwrap().len(), 1);
    }

    #[test]
    fn test_replay_without_loop_ends() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[]").unwrap();
        let mut replay = ReplaySource::open(file.path(), false).unwrap();
        assert!(replay.next_frame().unwrap().is_some());
        assert!(replay.next_frame().unwrap().is_none());
    }

    #[test]
    fn test_missing_replay_is_fatal() {
        let err = ReplaySource::open("/no/such/replay.jsonl", false).err().unwrap();
        assert!(matches!(err, RelayError::Source(_)));
    }

    #[test]
    fn test_empty_looping_replay_ends() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let mut replay = ReplaySource::open(file.path(), true).unwrap();
        assert!(replay.is_empty());
        assert!(replay.next_frame().unwrap().is_none());
    }

    #[test]
    fn test_stream_source() {
        let input = format!("[{CORNER}]\ngarbage\n\n{{\"tags\": []}}\n");
        let mut stream = StreamSource::new(Cursor::new(input));
        assert_eq!(stream.next_frame().unwrap().unwrap().len(), 1);
        assert_eq!(stream.next_frame().unwrap().unwrap().len(), 0);
        assert!(stream.next_frame().unwrap().is_none());
    }

    #[test]
    fn test_stream_source_skips_non_utf8_lines() {
        let mut input = b"\xff\xfe[]\n".to_vec();
        input.extend_from_slice(format!("[{CORNER}]\n").as_bytes());
        let mut stream = StreamSource::new(Cursor::new(input));
        assert_eq!(stream.next_frame().unwrap().unwrap().len(), 1);
        assert!(stream.next_frame().unwrap().is_none());
    }

    #[test]
    fn test_scripted_source() {
        let mut scripted =
            ScriptedSource::new(vec![vec![], vec![Detection::square(4, 0.0, 0.0, 1.0, 0.0)]]);
        assert!(scripted.next_frame().unwrap().unwrap().is_empty());
        assert_eq!(scripted.next_frame().unwrap().unwrap()[0].id, 4);
        assert!(scripted.next_frame().unwrap().is_none());
    }
}
