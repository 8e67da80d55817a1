//! `SelectLineFromDropdown`: pick one line of a text file per invocation.
//!
//! The file is re-read on every call, so edits between calls are picked up.
//! Lines excluded by `ignore_indices` are removed from the *selectable domain*
//! before any mode runs. Three modes keep a cursor between calls:
//!
//! | Mode | Cursor key (`extra`) | Advance rule |
//! |------|----------------------|--------------|
//! | `increment` / `decrement` | `ignore_indices` | ±1 over the domain, wrapping; reset when `line_index` changes |
//! | `custom_seq` | `custom_indices` + `ignore_indices` | next entry of the filtered custom list, wrapping |
//!
//! Cursors live in a [`SelectorStateStore`] owned by the [`LineSelector`], not
//! in process-wide state, so each selector (and each test) starts clean. The
//! store can be snapshotted to JSON and restored later.
//!
//! Failures never escape [`LineSelector::select`]; they come back as an
//! `[Error: ...]` string in the line slot.

use std::collections::{BTreeSet, HashMap};

use pipeline::{parse_index_set, parse_indices, FileName, Seed, SelectionMode};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::text_file::{error_text, InputDir, TextFileError};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a selection produced no line.
#[derive(Debug, Error)]
pub enum SelectError {
    #[error(transparent)]
    File(#[from] TextFileError),

    /// `ignore_indices` covers every line of the file.
    #[error("All lines are ignored")]
    AllIgnored { line_count: usize },

    /// Manual mode targeted an ignored line.
    #[error("Line {index} is ignored")]
    IndexIgnored { index: usize },

    /// No entry of `custom_indices` is in range and not ignored.
    #[error("No usable indices in custom sequence")]
    EmptyCustomSequence,
}

impl SelectError {
    /// Line count reported with the error. Only a fully ignored file reports
    /// its real count; every other failure reports zero.
    pub fn line_count(&self) -> usize {
        match self {
            Self::AllIgnored { line_count } => *line_count,
            _ => 0,
        }
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Identifies one persisted cursor.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StateKey {
    pub file: FileName,
    pub mode: SelectionMode,
    /// Mode-specific parameters that partition the cursor space.
    pub extra: String,
}

impl StateKey {
    pub fn for_request(request: &LineRequest) -> Self {
        let ignore = request.ignore_indices.trim();
        let extra = match request.mode {
            SelectionMode::Increment | SelectionMode::Decrement => ignore.to_string(),
            SelectionMode::CustomSeq => {
                format!("{}|{}", request.custom_indices.trim(), ignore)
            }
            SelectionMode::Manual | SelectionMode::Random | SelectionMode::CustomRandom => {
                String::new()
            }
        };
        Self {
            file: request.file.clone(),
            mode: request.mode,
            extra,
        }
    }
}

/// A persisted position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Cursor {
    /// Last returned line index, and the `line_index` input it was reached from.
    Line { index: usize, start: usize },
    /// Position inside the filtered custom sequence.
    Sequence { position: usize },
}

/// Cursors for the stateful selection modes, keyed by [`StateKey`].
#[derive(Debug, Clone, Default)]
pub struct SelectorStateStore {
    cursors: HashMap<StateKey, Cursor>,
}

impl SelectorStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &StateKey) -> Option<Cursor> {
        self.cursors.get(key).copied()
    }

    pub fn insert(&mut self, key: StateKey, cursor: Cursor) {
        self.cursors.insert(key, cursor);
    }

    pub fn remove(&mut self, key: &StateKey) -> Option<Cursor> {
        self.cursors.remove(key)
    }

    pub fn len(&self) -> usize {
        self.cursors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cursors.is_empty()
    }

    pub fn clear(&mut self) {
        self.cursors.clear();
    }

    /// Returns a serialisable copy of every cursor, ordered by key.
    pub fn snapshot(&self) -> StateSnapshot {
        let mut entries: Vec<_> = self
            .cursors
            .iter()
            .map(|(key, cursor)| StateEntry {
                key: key.clone(),
                cursor: *cursor,
            })
            .collect();
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        StateSnapshot { entries }
    }

    pub fn from_snapshot(snapshot: StateSnapshot) -> Self {
        Self {
            cursors: snapshot
                .entries
                .into_iter()
                .map(|e| (e.key, e.cursor))
                .collect(),
        }
    }
}

/// JSON form of a [`SelectorStateStore`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub entries: Vec<StateEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateEntry {
    pub key: StateKey,
    pub cursor: Cursor,
}

// ---------------------------------------------------------------------------
// Request / response
// ---------------------------------------------------------------------------

/// Inputs of one selector invocation.
#[derive(Debug, Clone)]
pub struct LineRequest {
    /// When false the call returns empty outputs and leaves state untouched.
    pub enabled: bool,
    pub file: FileName,
    pub mode: SelectionMode,
    /// Target for `manual`; start/reset position for `increment`/`decrement`.
    pub line_index: usize,
    /// Used by `random` and `custom_random`.
    pub seed: Seed,
    /// Index syntax; used by `custom_seq` and `custom_random`.
    pub custom_indices: String,
    /// Index syntax; excluded in every mode.
    pub ignore_indices: String,
}

impl LineRequest {
    pub fn new(file: FileName, mode: SelectionMode) -> Self {
        Self {
            enabled: true,
            file,
            mode,
            line_index: 0,
            seed: Seed::new(0),
            custom_indices: String::new(),
            ignore_indices: String::new(),
        }
    }

    pub fn with_line_index(mut self, line_index: usize) -> Self {
        self.line_index = line_index;
        self
    }

    pub fn with_seed(mut self, seed: Seed) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_custom_indices(mut self, custom: impl Into<String>) -> Self {
        self.custom_indices = custom.into();
        self
    }

    pub fn with_ignore_indices(mut self, ignore: impl Into<String>) -> Self {
        self.ignore_indices = ignore.into();
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// Outputs of one selector invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineSelection {
    /// The chosen line, or an `[Error: ...]` string.
    pub selected_line: String,
    pub line_count: usize,
    pub current_index: usize,
    /// Line-numbered rendering of the file; empty on error.
    pub preview: String,
}

impl LineSelection {
    fn disabled() -> Self {
        Self {
            selected_line: String::new(),
            line_count: 0,
            current_index: 0,
            preview: String::new(),
        }
    }

    fn failed(err: &SelectError) -> Self {
        Self {
            selected_line: error_text(err),
            line_count: err.line_count(),
            current_index: 0,
            preview: String::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Selector
// ---------------------------------------------------------------------------

/// The line selector node together with the cursors it has persisted.
#[derive(Debug, Clone)]
pub struct LineSelector {
    input: InputDir,
    state: SelectorStateStore,
}

impl LineSelector {
    pub fn new(input: InputDir) -> Self {
        Self::with_state(input, SelectorStateStore::new())
    }

    /// Creates a selector that resumes from previously persisted cursors.
    pub fn with_state(input: InputDir, state: SelectorStateStore) -> Self {
        Self { input, state }
    }

    pub fn state(&self) -> &SelectorStateStore {
        &self.state
    }

    pub fn into_state(self) -> SelectorStateStore {
        self.state
    }

    /// Runs one selection. Never fails; see the module docs.
    pub fn select(&mut self, request: &LineRequest) -> LineSelection {
        if !request.enabled {
            return LineSelection::disabled();
        }
        match self.try_select(request) {
            Ok(selection) => selection,
            Err(err) => {
                warn!(file = %request.file, mode = %request.mode, error = %err, "line selection failed");
                LineSelection::failed(&err)
            }
        }
    }

    fn try_select(&mut self, request: &LineRequest) -> Result<LineSelection, SelectError> {
        let lines = self.input.read_lines(&request.file)?;
        let line_count = lines.len();
        let ignored = parse_index_set(&request.ignore_indices);
        let domain: Vec<usize> = (0..line_count).filter(|i| !ignored.contains(i)).collect();
        if domain.is_empty() {
            return Err(SelectError::AllIgnored { line_count });
        }

        let index = match request.mode {
            SelectionMode::Manual => {
                let index = clamp(request.line_index, line_count);
                if ignored.contains(&index) {
                    return Err(SelectError::IndexIgnored { index });
                }
                index
            }
            SelectionMode::Random => pick(&domain, request.seed),
            SelectionMode::Increment | SelectionMode::Decrement => {
                self.step(request, &domain, line_count)
            }
            SelectionMode::CustomSeq => {
                let sequence = custom_sequence(request, line_count, &ignored)?;
                self.advance_sequence(request, &sequence)
            }
            SelectionMode::CustomRandom => {
                let sequence = custom_sequence(request, line_count, &ignored)?;
                pick(&sequence, request.seed)
            }
        };

        debug!(
            file = %request.file,
            mode = %request.mode,
            index,
            line_count,
            "line selected"
        );
        Ok(LineSelection {
            selected_line: lines[index].clone(),
            line_count,
            current_index: index,
            preview: render_preview(&lines, index, &ignored),
        })
    }

    fn step(&mut self, request: &LineRequest, domain: &[usize], line_count: usize) -> usize {
        let forward = request.mode == SelectionMode::Increment;
        let key = StateKey::for_request(request);
        let index = match self.state.get(&key) {
            Some(Cursor::Line { index, start }) if start == request.line_index => {
                if forward {
                    next_after(domain, index)
                } else {
                    prev_before(domain, index)
                }
            }
            _ => settle(domain, clamp(request.line_index, line_count), forward),
        };
        self.state.insert(
            key,
            Cursor::Line {
                index,
                start: request.line_index,
            },
        );
        index
    }

    fn advance_sequence(&mut self, request: &LineRequest, sequence: &[usize]) -> usize {
        let key = StateKey::for_request(request);
        let position = match self.state.get(&key) {
            Some(Cursor::Sequence { position }) => (position + 1) % sequence.len(),
            _ => 0,
        };
        self.state.insert(key, Cursor::Sequence { position });
        sequence[position]
    }
}

fn clamp(index: usize, line_count: usize) -> usize {
    index.min(line_count.saturating_sub(1))
}

/// Uniform choice from a non-empty slice with a generator built for this call.
fn pick(items: &[usize], seed: Seed) -> usize {
    let mut rng = StdRng::seed_from_u64(seed.as_u64());
    items[rng.gen_range(0..items.len())]
}

// `domain` is sorted ascending and non-empty in the helpers below.

fn next_after(domain: &[usize], index: usize) -> usize {
    domain
        .iter()
        .copied()
        .find(|&d| d > index)
        .unwrap_or(domain[0])
}

fn prev_before(domain: &[usize], index: usize) -> usize {
    domain
        .iter()
        .rev()
        .copied()
        .find(|&d| d < index)
        .unwrap_or(domain[domain.len() - 1])
}

/// `target` itself when selectable, otherwise the nearest selectable index in
/// the direction of travel.
fn settle(domain: &[usize], target: usize, forward: bool) -> usize {
    if domain.binary_search(&target).is_ok() {
        target
    } else if forward {
        next_after(domain, target)
    } else {
        prev_before(domain, target)
    }
}

fn custom_sequence(
    request: &LineRequest,
    line_count: usize,
    ignored: &BTreeSet<usize>,
) -> Result<Vec<usize>, SelectError> {
    let sequence: Vec<usize> = parse_indices(&request.custom_indices)
        .into_iter()
        .filter(|i| *i < line_count && !ignored.contains(i))
        .collect();
    if sequence.is_empty() {
        return Err(SelectError::EmptyCustomSequence);
    }
    Ok(sequence)
}

fn render_preview(lines: &[String], selected: usize, ignored: &BTreeSet<usize>) -> String {
    let width = lines.len().saturating_sub(1).to_string().len();
    lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let marker = if i == selected { ">" } else { " " };
            let suffix = if ignored.contains(&i) { "  [ignored]" } else { "" };
            format!("{marker} {i:>width$}: {line}{suffix}")
        })
        .collect::<Vec<_>>()
        .join("\n")
}
