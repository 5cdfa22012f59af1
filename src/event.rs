//! Raw directory events as seen by the single-file watcher.

use notify::event::{EventKind, MetadataKind, ModifyKind, RenameMode};
use std::fmt;
use std::path::PathBuf;

/// Operation carried by a raw directory event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    /// A file appeared at the path (including being moved into place).
    Create,
    /// File contents were written.
    Write,
    /// The path was removed.
    Remove,
    /// The path was renamed away.
    Rename,
    /// Only metadata (permissions, timestamps) changed.
    Chmod,
}

impl Op {
    /// Whether this operation justifies calling the reload callback.
    pub fn triggers_reload(self) -> bool {
        matches!(self, Op::Create | Op::Write)
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Op::Create => "CREATE",
            Op::Write => "WRITE",
            Op::Remove => "REMOVE",
            Op::Rename => "RENAME",
            Op::Chmod => "CHMOD",
        };
        f.write_str(name)
    }
}

/// A single operation on a single path, produced by a directory notifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEvent {
    /// What happened.
    pub op: Op,
    /// The path it happened to.
    pub path: PathBuf,
}

impl RawEvent {
    /// Create a new raw event.
    pub fn new(op: Op, path: impl Into<PathBuf>) -> Self {
        Self {
            op,
            path: path.into(),
        }
    }

    /// Stable textual identity used to recognize duplicate deliveries.
    pub fn signature(&self) -> String {
        self.to_string()
    }

    /// Translate a `notify` event into raw events, one per affected path.
    ///
    /// Access and `Other` events carry no change and are dropped. A file
    /// renamed onto a path is reported as a creation at that path, which is
    /// how atomic replacement shows up. A modification time moving forward
    /// counts as a write: polling backends report content changes that way.
    pub fn from_notify(event: notify::Event) -> Vec<RawEvent> {
        let notify::Event { kind, paths, .. } = event;

        let op = match kind {
            EventKind::Create(_) => Op::Create,
            EventKind::Remove(_) => Op::Remove,
            EventKind::Modify(ModifyKind::Metadata(MetadataKind::WriteTime)) => Op::Write,
            EventKind::Modify(ModifyKind::Metadata(_)) => Op::Chmod,
            EventKind::Modify(ModifyKind::Name(mode)) => return from_rename(mode, paths),
            EventKind::Modify(_) | EventKind::Any => Op::Write,
            EventKind::Access(_) | EventKind::Other => return Vec::new(),
        };

        paths.into_iter().map(|path| RawEvent::new(op, path)).collect()
    }
}

fn from_rename(mode: RenameMode, paths: Vec<PathBuf>) -> Vec<RawEvent> {
    match mode {
        RenameMode::To => paths.into_iter().map(|p| RawEvent::new(Op::Create, p)).collect(),
        RenameMode::From => paths.into_iter().map(|p| RawEvent::new(Op::Rename, p)).collect(),
        // Only sent after the separate `From` and `To` halves.
        RenameMode::Both => Vec::new(),
        // No direction given: whichever side still exists is the destination.
        RenameMode::Any | RenameMode::Other => paths
            .into_iter()
            .map(|p| {
                let op = if p.exists() { Op::Create } else { Op::Rename };
                RawEvent::new(op, p)
            })
            .collect(),
    }
}

impl fmt::Display for RawEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.path, self.op)
    }
}
