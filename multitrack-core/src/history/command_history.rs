use chrono::{DateTime, Utc};

use super::command::{Command, Direction};
use crate::models::error::SessionError;
use crate::storage::track_store::TrackStore;

/// A recorded command and when it was first committed.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub command: Command,
    pub committed_at: DateTime<Utc>,
}

/// Undo/redo stacks of reversible track commands.
///
/// Recording a new command discards everything that could be redone.
/// Undo and redo move entries between the stacks unchanged.
#[derive(Debug, Default)]
pub struct CommandHistory {
    undo_stack: Vec<HistoryEntry>,
    redo_stack: Vec<HistoryEntry>,
    max_depth: Option<usize>,
}

impl CommandHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// History keeping at most `max_depth` undoable commands; the oldest are
    /// evicted first.
    pub fn with_limit(max_depth: Option<usize>) -> Self {
        Self {
            max_depth,
            ..Self::default()
        }
    }

    /// Push an already-applied command and invalidate the redo stack.
    pub fn record(&mut self, command: Command) {
        log::debug!("recorded '{}' on track {}", command.label(), command.track_id());
        self.undo_stack.push(HistoryEntry {
            command,
            committed_at: Utc::now(),
        });
        self.redo_stack.clear();

        if let Some(max) = self.max_depth {
            let excess = self.undo_stack.len().saturating_sub(max);
            if excess > 0 {
                self.undo_stack.drain(..excess);
            }
        }
    }

    /// Revert the most recent command. `Ok(None)` when there is nothing to undo.
    pub fn undo(&mut self, store: &mut TrackStore) -> Result<Option<Command>, SessionError> {
        self.replay(store, Direction::Reverse)
    }

    /// Re-apply the most recently undone command. `Ok(None)` when there is
    /// nothing to redo.
    pub fn redo(&mut self, store: &mut TrackStore) -> Result<Option<Command>, SessionError> {
        self.replay(store, Direction::Forward)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// The command `undo` would revert next.
    pub fn peek_undo(&self) -> Option<&Command> {
        self.undo_stack.last().map(|entry| &entry.command)
    }

    /// The command `redo` would re-apply next.
    pub fn peek_redo(&self) -> Option<&Command> {
        self.redo_stack.last().map(|entry| &entry.command)
    }

    /// Undoable entries, oldest first.
    pub fn undo_entries(&self) -> &[HistoryEntry] {
        &self.undo_stack
    }

    /// Redoable entries, next-to-redo last.
    pub fn redo_entries(&self) -> &[HistoryEntry] {
        &self.redo_stack
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    fn replay(
        &mut self,
        store: &mut TrackStore,
        direction: Direction,
    ) -> Result<Option<Command>, SessionError> {
        let (from, to) = match direction {
            Direction::Reverse => (&mut self.undo_stack, &mut self.redo_stack),
            Direction::Forward => (&mut self.redo_stack, &mut self.undo_stack),
        };
        let Some(entry) = from.pop() else {
            return Ok(None);
        };

        if let Err(e) = entry.command.run(store, direction) {
            log::error!(
                "history replay of '{}' ({:?}) failed: {}; discarding history",
                entry.command.label(),
                direction,
                e
            );
            self.clear();
            return Err(SessionError::HistoryCorrupted(format!(
                "{:?} '{}' failed: {}",
                direction,
                entry.command.label(),
                e
            )));
        }

        let command = entry.command.clone();
        to.push(entry);
        Ok(Some(command))
    }
}
