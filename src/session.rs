// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Editing session.
//!
//! An [`EditorSession`] owns everything mutable about editing one file: the
//! [`ContentBuffer`], the [`ViewState`], the [`UndoStack`], and the
//! [`StyleMap`] painted by highlight passes. The highlight engine itself stays
//! a pure function. The session only decides _when_ to call it and _which_
//! region to ask for.
//!
//! # Tiered Highlighting
//!
//! Small buffers are re-highlighted in full, synchronously, after every
//! change. Buffers at or above the configured size threshold use tiers:
//!
//! - __Open__: highlight the visible viewport right away, then highlight the
//!   whole buffer on a blocking worker and merge the result in later.
//! - __Edit__: shift painted styles to follow the edit, then wait for a short
//!   quiet period before re-highlighting the caret line. Each keystroke
//!   cancels and reschedules the single debounce timer.
//! - __End of editing__: re-highlight the viewport and schedule another full
//!   pass to correct anything the caret line pass missed.
//!
//! # Result Handoff
//!
//! Background work never touches session state. Workers send their results
//! over a channel, and the session applies them when the owner calls
//! [`EditorSession::poll`], [`EditorSession::next_event`], or
//! [`EditorSession::settle`]. Each result carries the buffer generation it was
//! scheduled under. Opening a file, editing, undoing, or changing the search
//! term bumps the generation, so a result that arrives after a newer change is
//! discarded instead of clobbering newer styling.

pub mod buffer;
pub mod styles;
pub mod undo;

pub use buffer::{ContentBuffer, ViewState};
pub use styles::StyleMap;
pub use undo::{TextEdit, UndoStack};

use crate::{
    config::HighlightOptions,
    syntax::{highlight, toggle_comment, HighlightPass},
};

use std::{ops::Range, path::Path};
use tokio::{
    runtime::Handle,
    sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender},
    task::JoinHandle,
};
use tracing::{debug, info, instrument};

/// Result of scheduled highlight work.
#[derive(Debug)]
enum SessionEvent {
    /// Debounce window after the last edit has passed.
    DebounceElapsed { generation: u64 },

    /// Background full buffer pass has finished.
    FullPass { generation: u64, pass: HighlightPass },
}

impl SessionEvent {
    fn generation(&self) -> u64 {
        match self {
            Self::DebounceElapsed { generation } => *generation,
            Self::FullPass { generation, .. } => *generation,
        }
    }
}

/// Task spawned under a buffer generation.
#[derive(Debug)]
struct Scheduled {
    generation: u64,
    task: JoinHandle<()>,
}

/// Editing session over a single buffer.
///
/// Scheduled work runs on the tokio runtime behind the [`Handle`] given at
/// construction. Dropping the session cancels all of it.
#[derive(Debug)]
pub struct EditorSession {
    options: HighlightOptions,
    runtime: Handle,
    buffer: ContentBuffer,
    view: ViewState,
    styles: StyleMap,
    undo: UndoStack,
    search: String,
    generation: u64,
    debounce: Option<Scheduled>,
    background: Option<Scheduled>,
    sender: UnboundedSender<SessionEvent>,
    receiver: UnboundedReceiver<SessionEvent>,
}

impl EditorSession {
    /// Construct new empty session.
    pub fn new(options: HighlightOptions, runtime: Handle) -> Self {
        let (sender, receiver) = unbounded_channel();
        Self {
            options,
            runtime,
            buffer: ContentBuffer::default(),
            view: ViewState::default(),
            styles: StyleMap::default(),
            undo: UndoStack::default(),
            search: String::new(),
            generation: 0,
            debounce: None,
            background: None,
            sender,
            receiver,
        }
    }

    /// Switch session to a new file.
    ///
    /// Any work scheduled for the previous buffer is cancelled, and its
    /// results will never be applied. Undo history and selection are reset.
    /// The number of visible lines is kept.
    #[instrument(skip(self, name, text), level = "debug")]
    pub fn open(&mut self, name: impl AsRef<Path>, text: impl Into<String>) {
        self.cancel();
        self.generation += 1;
        self.buffer = ContentBuffer::new(name, text);
        self.view = ViewState {
            visible_lines: self.view.visible_lines,
            ..ViewState::default()
        };
        self.styles.clear();
        self.undo.clear();

        info!(
            "open {:?} as {} ({} chars)",
            self.buffer.name().display(),
            self.buffer.content_type(),
            self.buffer.char_count()
        );

        if self.is_large() {
            self.viewport_pass();
            self.spawn_full_pass();
        } else {
            self.full_pass();
        }
    }

    /// Close current buffer, cancelling all scheduled work.
    pub fn close(&mut self) {
        self.cancel();
        self.generation += 1;
        self.buffer = ContentBuffer::default();
        self.view = ViewState {
            visible_lines: self.view.visible_lines,
            ..ViewState::default()
        };
        self.styles.clear();
        self.undo.clear();
    }

    /// Replace range of buffer with new text as a user edit.
    ///
    /// The edit is recorded for undo, and the caret lands after the inserted
    /// text.
    ///
    /// # Errors
    ///
    /// - Return [`SessionError::InvalidRange`] if range is outside the buffer
    ///   or splits a character.
    pub fn edit(&mut self, range: Range<usize>, replacement: &str) -> Result<()> {
        if !self.buffer.is_valid_range(&range) {
            return Err(SessionError::InvalidRange {
                start: range.start,
                end: range.end,
                len: self.buffer.len(),
            });
        }

        self.apply_edit(range, replacement);
        Ok(())
    }

    /// Revert last user edit.
    ///
    /// Return `false` if there was nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(edit) = self.undo.pop() else {
            return false;
        };

        let revert = edit.inverse();
        let range = revert.start..revert.start + revert.removed.len();
        self.buffer.replace(range.clone(), &revert.inserted);
        self.styles.splice(range, revert.inserted.len());

        let caret = revert.inserted_range().end;
        self.view.selection = caret..caret;
        self.after_change();
        true
    }

    /// Toggle line comments over the current selection as a user edit.
    ///
    /// Return `false` if nothing changed, e.g., the selection only covers
    /// blank lines.
    pub fn toggle_comment(&mut self) -> bool {
        let toggle = toggle_comment(
            self.buffer.text(),
            self.view.selection.clone(),
            self.buffer.content_type(),
        );
        if self.buffer.text()[toggle.range.clone()] == toggle.replacement {
            return false;
        }

        self.apply_edit(toggle.range, &toggle.replacement);
        self.view.selection = toggle.selection;
        true
    }

    /// Change search term overlaid on highlighting.
    pub fn set_search(&mut self, term: impl Into<String>) {
        let term = term.into();
        if term == self.search {
            return;
        }

        debug!("search for {term:?}");
        self.search = term;
        self.generation += 1;
        abort(&mut self.background);

        // INVARIANT: Caret line still needs its repaint after the quiet period.
        if self.debounce.is_some() {
            self.schedule_debounce();
        }

        if self.is_large() {
            self.viewport_pass();
            self.spawn_full_pass();
        } else {
            self.full_pass();
        }
    }

    /// Select range of buffer.
    ///
    /// Range is clamped to the buffer and to character boundaries.
    pub fn set_selection(&mut self, selection: Range<usize>) {
        let text = self.buffer.text();
        let end = floor_boundary(text, selection.end.min(text.len()));
        let start = floor_boundary(text, selection.start.min(end));
        self.view.selection = start..end;
    }

    /// Scroll view so `line` is the first visible line.
    pub fn scroll_to(&mut self, line: usize) {
        self.view.scroll_line = line;
        if self.is_large() {
            self.viewport_pass();
        }
    }

    /// Change number of visible lines.
    pub fn resize(&mut self, visible_lines: usize) {
        self.view.visible_lines = visible_lines;
        if self.is_large() {
            self.viewport_pass();
        }
    }

    /// Signal end of an editing burst, e.g., focus loss.
    ///
    /// Cancel pending debounce and repaint the viewport. Large buffers also
    /// get a new background full pass.
    pub fn end_editing(&mut self) {
        abort(&mut self.debounce);
        if self.is_large() {
            self.viewport_pass();
            if self.background.is_none() {
                self.spawn_full_pass();
            }
        } else {
            self.full_pass();
        }
    }

    /// Apply every scheduled result that has already arrived.
    ///
    /// Return number of results applied. Stale results are discarded and not
    /// counted.
    pub fn poll(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.receiver.try_recv() {
            if self.handle(event) {
                applied += 1;
            }
        }
        applied
    }

    /// Wait for next scheduled result and apply it.
    ///
    /// Return `false` without waiting if nothing is scheduled, or if the
    /// result that arrived was stale.
    pub async fn next_event(&mut self) -> bool {
        if !self.is_pending() {
            return false;
        }

        match self.receiver.recv().await {
            Some(event) => self.handle(event),
            None => false,
        }
    }

    /// Wait until all scheduled work for the current buffer is applied.
    pub async fn settle(&mut self) {
        while self.is_pending() {
            let Some(event) = self.receiver.recv().await else {
                break;
            };
            self.handle(event);
        }
    }

    /// Check if highlight work is scheduled for the current buffer.
    pub fn is_pending(&self) -> bool {
        self.debounce.is_some() || self.background.is_some()
    }

    /// Check if current buffer uses tiered highlighting.
    pub fn is_large(&self) -> bool {
        self.options.is_large(self.buffer.char_count())
    }

    pub fn buffer(&self) -> &ContentBuffer {
        &self.buffer
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn styles(&self) -> &StyleMap {
        &self.styles
    }

    pub fn search(&self) -> &str {
        self.search.as_str()
    }

    pub fn options(&self) -> &HighlightOptions {
        &self.options
    }

    /// Number of edits that can be undone.
    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    /// Current buffer generation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn apply_edit(&mut self, range: Range<usize>, replacement: &str) {
        let removed = self.buffer.replace(range.clone(), replacement);
        self.styles.splice(range.clone(), replacement.len());
        self.undo.push(TextEdit {
            start: range.start,
            removed,
            inserted: replacement.to_string(),
        });

        let caret = range.start + replacement.len();
        self.view.selection = caret..caret;
        self.after_change();
    }

    fn after_change(&mut self) {
        self.generation += 1;

        // INVARIANT: An in-flight full pass was computed from old text.
        abort(&mut self.background);
        if self.is_large() {
            self.schedule_debounce();
        } else {
            abort(&mut self.debounce);
            self.full_pass();
        }
    }

    fn handle(&mut self, event: SessionEvent) -> bool {
        match event {
            SessionEvent::DebounceElapsed { generation } if generation == self.generation => {
                self.debounce = None;
                self.caret_line_pass();
                true
            }
            SessionEvent::FullPass { generation, pass } if generation == self.generation => {
                self.background = None;
                debug!("merge background pass of {} ranges", pass.ranges.len());
                self.styles.apply(&pass);
                true
            }
            event => {
                let generation = event.generation();
                let slot = match event {
                    SessionEvent::DebounceElapsed { .. } => &mut self.debounce,
                    SessionEvent::FullPass { .. } => &mut self.background,
                };

                // Task that sent this is done, so it no longer counts as pending.
                if slot
                    .as_ref()
                    .is_some_and(|scheduled| scheduled.generation == generation)
                {
                    *slot = None;
                }

                debug!(
                    "discard stale result of generation {generation} (current {})",
                    self.generation
                );
                false
            }
        }
    }

    fn paint(&mut self, range: Range<usize>) {
        let pass = highlight(
            self.buffer.text(),
            self.buffer.content_type(),
            range,
            &self.search,
        );
        self.styles.apply(&pass);
    }

    fn full_pass(&mut self) {
        self.paint(0..self.buffer.len());
    }

    fn viewport_pass(&mut self) {
        let range = self
            .buffer
            .lines(self.view.scroll_line, self.view.visible_lines);
        self.paint(range);
    }

    fn caret_line_pass(&mut self) {
        let caret = self.view.caret().min(self.buffer.len());
        self.paint(caret..caret);
    }

    fn spawn_full_pass(&mut self) {
        abort(&mut self.background);

        let text = self.buffer.text().to_string();
        let content_type = self.buffer.content_type();
        let search = self.search.clone();
        let generation = self.generation;
        let sender = self.sender.clone();

        debug!("schedule background pass for generation {generation}");
        let task = self.runtime.spawn_blocking(move || {
            let pass = highlight(&text, content_type, 0..text.len(), &search);

            // Receiver only goes away with the session itself.
            let _ = sender.send(SessionEvent::FullPass { generation, pass });
        });
        self.background = Some(Scheduled { generation, task });
    }

    fn schedule_debounce(&mut self) {
        abort(&mut self.debounce);

        let delay = self.options.debounce();
        let generation = self.generation;
        let sender = self.sender.clone();
        let task = self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = sender.send(SessionEvent::DebounceElapsed { generation });
        });
        self.debounce = Some(Scheduled { generation, task });
    }

    fn cancel(&mut self) {
        abort(&mut self.debounce);
        abort(&mut self.background);
    }
}

impl Drop for EditorSession {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn abort(scheduled: &mut Option<Scheduled>) {
    if let Some(scheduled) = scheduled.take() {
        scheduled.task.abort();
    }
}

fn floor_boundary(text: &str, mut offset: usize) -> usize {
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

/// Editing session error types.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Edit range does not fit the buffer.
    #[error("edit range {start}..{end} is outside buffer of {len} bytes or splits a character")]
    InvalidRange { start: usize, end: usize, len: usize },
}

/// Friendly result alias :3
type Result<T, E = SessionError> = std::result::Result<T, E>;
