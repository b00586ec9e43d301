//! Feed view state.
//!
//! ```text
//! AppState
//! ├── thread: ThreadRef          (what is being discussed)
//! ├── summary: Option<ThreadSummary> (item header + votes)
//! ├── engine: ThreadEngine       (tree, ranking, disclosure)
//! ├── selected / scroll_offset   (cursor over visible rows)
//! ├── composer: Option<Composer> (open while writing)
//! └── status: Option<StatusMessage>
//! ```

use candor_core::api::{ThreadRef, ThreadSummary};
use candor_core::thread::{CommentId, PageSizes, SortMode, ThreadEngine, VisibleRow};

/// Where a new comment will be attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyTarget {
    Root,
    Reply { parent: CommentId, author: String },
}

impl ReplyTarget {
    pub fn parent_id(&self) -> Option<CommentId> {
        match self {
            ReplyTarget::Root => None,
            ReplyTarget::Reply { parent, .. } => Some(parent.clone()),
        }
    }
}

/// Single-line comment input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Composer {
    pub target: ReplyTarget,
    pub text: String,
    /// A post is in flight; input is frozen until it resolves.
    pub submitting: bool,
}

impl Composer {
    pub fn new(target: ReplyTarget) -> Self {
        Self {
            target,
            text: String::new(),
            submitting: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
}

impl StatusMessage {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
        }
    }
}

pub struct AppState {
    pub thread: ThreadRef,
    pub summary: Option<ThreadSummary>,
    pub engine: ThreadEngine,
    /// Index into `engine.visible_rows()`.
    pub selected: usize,
    /// First visible row; only ever moved back to keep `selected` on screen.
    pub scroll_offset: usize,
    pub composer: Option<Composer>,
    pub status: Option<StatusMessage>,
    pub loading: bool,
    pub vote_in_flight: bool,
    pub should_quit: bool,
    pub viewport: (u16, u16),
    pub spinner_frame: usize,
}

impl AppState {
    pub fn new(thread: ThreadRef, sort_mode: SortMode, page_sizes: PageSizes) -> Self {
        Self {
            thread,
            summary: None,
            engine: ThreadEngine::new(Vec::new(), sort_mode, page_sizes),
            selected: 0,
            scroll_offset: 0,
            composer: None,
            status: None,
            loading: true,
            vote_in_flight: false,
            should_quit: false,
            viewport: (0, 0),
            spinner_frame: 0,
        }
    }

    pub fn visible_rows(&self) -> Vec<VisibleRow> {
        self.engine.visible_rows()
    }

    pub fn selected_row(&self) -> Option<VisibleRow> {
        self.visible_rows().into_iter().nth(self.selected)
    }

    /// Keeps `selected` inside the current row list.
    pub fn clamp_selection(&mut self) {
        let count = self.visible_rows().len();
        self.selected = self.selected.min(count.saturating_sub(1));
        self.scroll_offset = self.scroll_offset.min(self.selected);
    }

    /// Moves the cursor onto the row showing `id`, if it is visible.
    pub fn select_comment(&mut self, id: &CommentId) -> bool {
        let position = self
            .visible_rows()
            .iter()
            .position(|row| matches!(row, VisibleRow::Comment(c) if &c.id == id));
        match position {
            Some(index) => {
                self.selected = index;
                self.scroll_offset = self.scroll_offset.min(index);
                true
            }
            None => false,
        }
    }

    pub fn move_selection(&mut self, delta: isize) {
        let count = self.visible_rows().len();
        if count == 0 {
            self.selected = 0;
            return;
        }
        self.selected = self
            .selected
            .saturating_add_signed(delta)
            .min(count - 1);
        self.scroll_offset = self.scroll_offset.min(self.selected);
    }

    pub fn set_status(&mut self, status: StatusMessage) {
        self.status = Some(status);
    }
}
