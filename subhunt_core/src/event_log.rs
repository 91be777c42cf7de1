//! Append-only, capacity-bounded event log.
//!
//! Agents append one line per attack from many tasks at once. Appends are
//! serialized by the log's own mutex, which is independent of the game state
//! lock: an agent releases the board before it touches the log.
//!
//! A record that would push the log past its capacity is dropped whole and
//! counted, so every stored line stays well-formed. Overflow is never an
//! error.

use crate::board::AttackOutcome;
use crate::error::{HuntError, Result};
use std::fs::File;
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use subhunt_env::{AgentId, Coord};
use tracing::warn;

/// Default capacity in bytes.
pub const DEFAULT_LOG_CAPACITY: usize = 10_000;

/// Line written once every agent has stopped.
pub const COMPLETION_LINE: &str = "Game over! All targets have been destroyed.";

/// One attack, as recorded in the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventRecord {
    pub agent: AgentId,
    pub outcome: AttackOutcome,
    pub coord: Coord,
}

impl EventRecord {
    pub fn new(agent: AgentId, outcome: AttackOutcome, coord: Coord) -> Self {
        Self { agent, outcome, coord }
    }

    /// Parses a line of the form `Agent <id>: <Hit|Miss|Repeat> at [<row>,<col>]`.
    pub fn parse(line: &str) -> Option<Self> {
        let rest = line.trim_end().strip_prefix("Agent ")?;
        let (id, rest) = rest.split_once(": ")?;
        let (outcome, rest) = rest.split_once(" at ")?;
        let inner = rest.strip_prefix('[')?.strip_suffix(']')?;
        let (row, col) = inner.split_once(',')?;

        Some(Self {
            agent: AgentId(id.parse().ok()?),
            outcome: outcome.parse().ok()?,
            coord: Coord::new(row.parse().ok()?, col.parse().ok()?),
        })
    }
}

impl std::fmt::Display for EventRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Agent {}: {} at {}", self.agent, self.outcome, self.coord)
    }
}

#[derive(Debug, Default)]
struct LogBuffer {
    text: String,
    dropped: u64,
}

/// File backing for a persistent log.
#[derive(Debug)]
struct LogFile {
    path: PathBuf,
    file: Mutex<File>,
}

/// The shared event log.
#[derive(Debug)]
pub struct EventLog {
    buffer: Mutex<LogBuffer>,
    capacity: usize,
    file: Option<LogFile>,
}

impl EventLog {
    /// Creates a log held only in memory.
    pub fn in_memory(capacity: usize) -> Self {
        Self {
            buffer: Mutex::new(LogBuffer::default()),
            capacity,
            file: None,
        }
    }

    /// Creates a log backed by a file at `path`.
    ///
    /// The file is created (or truncated) and sized to `capacity` up front,
    /// so a missing directory or a full disk fails here, before any agent
    /// starts. Contents reach the file on [`flush`](Self::flush).
    pub fn create(path: impl AsRef<Path>, capacity: usize) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path).map_err(|e| HuntError::log_storage(&path, e))?;
        file.set_len(capacity as u64)
            .map_err(|e| HuntError::log_storage(&path, e))?;

        Ok(Self {
            buffer: Mutex::new(LogBuffer::default()),
            capacity,
            file: Some(LogFile {
                path,
                file: Mutex::new(file),
            }),
        })
    }

    /// Appends raw text. Returns `false` if it was dropped for lack of room.
    pub fn append(&self, text: &str) -> bool {
        let mut buffer = self.buffer();
        if buffer.text.len() + text.len() > self.capacity {
            buffer.dropped += 1;
            warn!(
                bytes = text.len(),
                used = buffer.text.len(),
                capacity = self.capacity,
                "event log full, record dropped"
            );
            return false;
        }
        buffer.text.push_str(text);
        true
    }

    /// Appends `line` followed by a newline, as one unit.
    pub fn append_line(&self, line: impl std::fmt::Display) -> bool {
        self.append(&format!("{}\n", line))
    }

    /// Appends an attack record.
    pub fn record(&self, record: &EventRecord) -> bool {
        self.append_line(record)
    }

    /// Returns a copy of everything stored so far.
    pub fn snapshot(&self) -> String {
        self.buffer().text.clone()
    }

    /// Bytes currently stored.
    pub fn len(&self) -> usize {
        self.buffer().text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of appends dropped because the log was full.
    pub fn dropped(&self) -> u64 {
        self.buffer().dropped
    }

    /// Backing file path, if any.
    pub fn path(&self) -> Option<&Path> {
        self.file.as_ref().map(|f| f.path.as_path())
    }

    /// Writes the current contents to the backing file, trimmed to length.
    ///
    /// No-op for in-memory logs.
    pub fn flush(&self) -> Result<()> {
        let Some(log_file) = &self.file else {
            return Ok(());
        };

        let contents = self.snapshot();
        let mut file = log_file
            .file
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let io = |e: std::io::Error| HuntError::log_storage(&log_file.path, e);

        file.seek(SeekFrom::Start(0)).map_err(io)?;
        file.write_all(contents.as_bytes()).map_err(io)?;
        file.set_len(contents.len() as u64).map_err(io)?;
        file.flush().map_err(io)?;
        Ok(())
    }

    // A panic mid-append cannot leave the String half-written, so a poisoned
    // buffer is still consistent.
    fn buffer(&self) -> MutexGuard<'_, LogBuffer> {
        self.buffer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
