//! Feed view reducer.
//!
//! All state mutations happen here. The runtime calls `update(app, event)`
//! and executes the returned effects.

use candor_core::api::ApiError;
use candor_core::thread::{Comment, CommentId, VisibleRow};
use candor_core::vote::VoteDirection;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::debug;

use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::state::{AppState, Composer, ReplyTarget, StatusMessage};

/// Shown when `r` is pressed on a comment at the depth limit.
pub const DEPTH_LIMIT_MESSAGE: &str = "reply depth limit reached";

pub fn update(app: &mut AppState, event: UiEvent) -> Vec<UiEffect> {
    match event {
        UiEvent::Tick => {
            if app.loading || app.vote_in_flight || is_submitting(app) {
                app.spinner_frame = app.spinner_frame.wrapping_add(1);
            }
            vec![]
        }
        UiEvent::Frame { width, height } => {
            app.viewport = (width, height);
            vec![]
        }
        UiEvent::Terminal(Event::Key(key)) if key.kind == KeyEventKind::Press => {
            handle_key(app, key)
        }
        UiEvent::Terminal(_) => vec![],
        UiEvent::ThreadLoaded(result) => {
            app.loading = false;
            match result {
                Ok((summary, comments)) => {
                    let selected_id = selected_comment_id(app);
                    app.summary = Some(summary);
                    app.engine.replace_comments(comments);
                    if !selected_id.is_some_and(|id| app.select_comment(&id)) {
                        app.clamp_selection();
                    }
                    app.status = None;
                }
                Err(e) => app.set_status(StatusMessage::error(format!("Load failed: {e}"))),
            }
            vec![]
        }
        UiEvent::CommentPosted(result) => {
            handle_comment_posted(app, result);
            vec![]
        }
        UiEvent::VoteCast { result, previous } => {
            app.vote_in_flight = false;
            match result {
                Ok(votes) => {
                    if let Some(summary) = app.summary.as_mut() {
                        summary.votes = votes;
                    }
                }
                Err(e) => {
                    if let Some(summary) = app.summary.as_mut() {
                        summary.votes = previous;
                    }
                    app.set_status(StatusMessage::error(format!("Vote failed: {e}")));
                }
            }
            vec![]
        }
    }
}

fn is_submitting(app: &AppState) -> bool {
    app.composer.as_ref().is_some_and(|c| c.submitting)
}

fn selected_comment_id(app: &AppState) -> Option<CommentId> {
    match app.selected_row()? {
        VisibleRow::Comment(row) => Some(row.id),
        _ => None,
    }
}

fn handle_key(app: &mut AppState, key: KeyEvent) -> Vec<UiEffect> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return vec![UiEffect::Quit];
    }

    if app.composer.is_some() {
        return handle_composer_key(app, key);
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => {
            app.should_quit = true;
            vec![UiEffect::Quit]
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.move_selection(1);
            vec![]
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.move_selection(-1);
            vec![]
        }
        KeyCode::Char('g') | KeyCode::Home => {
            app.selected = 0;
            app.scroll_offset = 0;
            vec![]
        }
        KeyCode::Char('G') | KeyCode::End => {
            app.selected = app.visible_rows().len().saturating_sub(1);
            vec![]
        }
        KeyCode::Enter | KeyCode::Char(' ') => {
            activate_selected(app);
            vec![]
        }
        KeyCode::Char('m') => {
            show_more_for_selected(app);
            vec![]
        }
        KeyCode::Char('s') => cycle_sort(app),
        KeyCode::Char('r') => {
            open_reply(app);
            vec![]
        }
        KeyCode::Char('c') => {
            app.composer = Some(Composer::new(ReplyTarget::Root));
            vec![]
        }
        KeyCode::Char('+') => vote(app, VoteDirection::Up),
        KeyCode::Char('-') => vote(app, VoteDirection::Down),
        KeyCode::Char('R') => {
            if app.loading {
                return vec![];
            }
            app.loading = true;
            app.set_status(StatusMessage::info("Reloading…"));
            vec![UiEffect::LoadThread]
        }
        _ => vec![],
    }
}

fn handle_composer_key(app: &mut AppState, key: KeyEvent) -> Vec<UiEffect> {
    let Some(composer) = app.composer.as_mut() else {
        return vec![];
    };
    if composer.submitting {
        return vec![];
    }

    match key.code {
        KeyCode::Esc => {
            app.composer = None;
            vec![]
        }
        KeyCode::Enter => {
            let content = composer.text.trim().to_string();
            if content.is_empty() {
                app.set_status(StatusMessage::error("Comment cannot be empty"));
                return vec![];
            }
            composer.submitting = true;
            let parent_id = composer.target.parent_id();
            vec![UiEffect::PostComment { content, parent_id }]
        }
        KeyCode::Backspace => {
            composer.text.pop();
            vec![]
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            composer.text.clear();
            vec![]
        }
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            composer.text.push(ch);
            vec![]
        }
        _ => vec![],
    }
}

fn activate_selected(app: &mut AppState) {
    match app.selected_row() {
        Some(VisibleRow::Comment(row)) => {
            app.engine.toggle_replies(&row.id);
        }
        Some(VisibleRow::MoreReplies { parent, .. }) => {
            app.engine.show_more_replies(&parent);
        }
        Some(VisibleRow::MoreRoots { .. }) => {
            app.engine.show_more_roots();
        }
        None => {}
    }
    app.clamp_selection();
}

fn show_more_for_selected(app: &mut AppState) {
    match app.selected_row() {
        Some(VisibleRow::Comment(row)) if row.reply_count > 0 => {
            app.engine.show_more_replies(&row.id);
        }
        Some(VisibleRow::MoreReplies { parent, .. }) => {
            app.engine.show_more_replies(&parent);
        }
        Some(VisibleRow::MoreRoots { .. }) => {
            app.engine.show_more_roots();
        }
        _ => {}
    }
    app.clamp_selection();
}

fn cycle_sort(app: &mut AppState) -> Vec<UiEffect> {
    let selected_id = selected_comment_id(app);
    let mode = app.engine.sort_mode().next();
    app.engine.set_sort_mode(mode);
    if !selected_id.is_some_and(|id| app.select_comment(&id)) {
        app.clamp_selection();
    }
    app.set_status(StatusMessage::info(format!("Sorted by {mode}")));
    vec![UiEffect::PersistSort { mode }]
}

fn open_reply(app: &mut AppState) {
    let Some(VisibleRow::Comment(row)) = app.selected_row() else {
        return;
    };
    if !row.can_reply {
        app.set_status(StatusMessage::error(DEPTH_LIMIT_MESSAGE));
        return;
    }
    let author = app
        .engine
        .comment(&row.id)
        .map(|c| c.display_author().to_string())
        .unwrap_or_default();
    app.composer = Some(Composer::new(ReplyTarget::Reply {
        parent: row.id,
        author,
    }));
}

fn vote(app: &mut AppState, direction: VoteDirection) -> Vec<UiEffect> {
    if app.vote_in_flight {
        return vec![];
    }
    let Some(summary) = app.summary.as_mut() else {
        return vec![];
    };

    let previous = summary.votes;
    summary.votes.apply(direction);
    app.vote_in_flight = true;
    debug!(%direction, "vote requested");
    vec![UiEffect::CastVote {
        direction,
        previous,
    }]
}

fn handle_comment_posted(app: &mut AppState, result: Result<Comment, ApiError>) {
    match result {
        Ok(comment) => {
            let id = comment.id.clone();
            app.engine.append(comment);
            app.engine.reveal(&id);
            app.composer = None;
            if !app.select_comment(&id) {
                app.clamp_selection();
            }
            app.set_status(StatusMessage::info("Comment posted"));
        }
        Err(e) => {
            if let Some(composer) = app.composer.as_mut() {
                composer.submitting = false;
            }
            app.set_status(StatusMessage::error(format!("Post failed: {e}")));
        }
    }
}

#[cfg(test)]
mod tests {
    use candor_core::api::{ApiErrorKind, ThreadRef, ThreadSummary};
    use candor_core::thread::{PageSizes, SortMode};
    use candor_core::vote::VoteState;
    use chrono::{DateTime, Duration, Utc};

    use super::*;

    fn comment(id: &str, parent: Option<&str>, minutes: i64) -> Comment {
        Comment {
            id: CommentId::from(id),
            parent_id: parent.map(CommentId::from),
            author_label: None,
            is_original_poster: false,
            created_at: DateTime::<Utc>::UNIX_EPOCH + Duration::minutes(minutes),
            content: format!("comment {id}"),
        }
    }

    fn summary() -> ThreadSummary {
        ThreadSummary {
            id: "42".into(),
            title: Some("Too many meetings".into()),
            content: String::new(),
            votes: VoteState {
                upvotes: 2,
                downvotes: 0,
                my_vote: None,
            },
        }
    }

    fn loaded(comments: Vec<Comment>) -> AppState {
        let mut app = AppState::new(
            ThreadRef::Feedback("42".into()),
            SortMode::Oldest,
            PageSizes::new(3, 2),
        );
        update(&mut app, UiEvent::ThreadLoaded(Ok((summary(), comments))));
        app
    }

    fn key(code: KeyCode) -> UiEvent {
        UiEvent::Terminal(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)))
    }

    fn chain(len: usize) -> Vec<Comment> {
        (0..len)
            .map(|i| {
                let id = format!("c{i}");
                let parent = (i > 0).then(|| format!("c{}", i - 1));
                comment(&id, parent.as_deref(), i as i64)
            })
            .collect()
    }

    #[test]
    fn test_load_populates_engine() {
        let app = loaded(vec![comment("a", None, 0), comment("b", None, 1)]);
        assert!(!app.loading);
        assert_eq!(app.visible_rows().len(), 2);
        assert!(app.summary.is_some());
    }

    #[test]
    fn test_load_failure_sets_error_status() {
        let mut app = AppState::new(
            ThreadRef::Feedback("1".into()),
            SortMode::Best,
            PageSizes::default(),
        );
        update(
            &mut app,
            UiEvent::ThreadLoaded(Err(ApiError::new(ApiErrorKind::Connect, "refused"))),
        );
        assert!(!app.loading);
        assert!(app.status.as_ref().is_some_and(|s| s.is_error));
    }

    #[test]
    fn test_enter_toggles_replies() {
        let mut app = loaded(vec![comment("a", None, 0), comment("b", Some("a"), 1)]);
        assert_eq!(app.visible_rows().len(), 1);

        update(&mut app, key(KeyCode::Enter));
        assert_eq!(app.visible_rows().len(), 2);

        update(&mut app, key(KeyCode::Char(' ')));
        assert_eq!(app.visible_rows().len(), 1);
    }

    #[test]
    fn test_more_roots_row_reveals_next_page() {
        let comments = (0..5).map(|i| comment(&format!("r{i}"), None, i)).collect();
        let mut app = loaded(comments);
        assert_eq!(app.visible_rows().len(), 4);

        app.selected = 3;
        update(&mut app, key(KeyCode::Enter));
        assert_eq!(app.visible_rows().len(), 5);
    }

    #[test]
    fn test_m_pages_replies() {
        let mut comments = vec![comment("a", None, 0)];
        comments.extend((1..=5).map(|i| comment(&format!("b{i}"), Some("a"), i)));
        let mut app = loaded(comments);

        update(&mut app, key(KeyCode::Char('m')));
        // a, two replies, "more" row
        assert_eq!(app.visible_rows().len(), 4);

        update(&mut app, key(KeyCode::Char('m')));
        assert_eq!(app.visible_rows().len(), 6);
    }

    #[test]
    fn test_selection_is_clamped() {
        let mut app = loaded(vec![comment("a", None, 0), comment("b", None, 1)]);
        update(&mut app, key(KeyCode::Char('j')));
        update(&mut app, key(KeyCode::Char('j')));
        update(&mut app, key(KeyCode::Char('j')));
        assert_eq!(app.selected, 1);
        update(&mut app, key(KeyCode::Char('k')));
        update(&mut app, key(KeyCode::Char('k')));
        assert_eq!(app.selected, 0);
    }

    #[test]
    fn test_sort_cycles_and_persists() {
        let mut app = loaded(vec![comment("a", None, 0), comment("b", None, 1)]);
        let effects = update(&mut app, key(KeyCode::Char('s')));

        assert_eq!(app.engine.sort_mode(), SortMode::Best);
        assert_eq!(
            effects,
            vec![UiEffect::PersistSort {
                mode: SortMode::Best
            }]
        );
    }

    #[test]
    fn test_sort_keeps_selected_comment() {
        let mut app = loaded(vec![comment("a", None, 0), comment("b", None, 1)]);
        update(&mut app, key(KeyCode::Char('j')));
        update(&mut app, key(KeyCode::Char('s')));
        update(&mut app, key(KeyCode::Char('s')));
        // Newest puts "b" first.
        assert_eq!(app.engine.sort_mode(), SortMode::Newest);
        assert_eq!(app.selected, 0);
    }

    #[test]
    fn test_reply_refused_at_depth_limit() {
        let mut app = loaded(chain(7));
        for _ in 0..6 {
            update(&mut app, key(KeyCode::Enter));
            update(&mut app, key(KeyCode::Char('j')));
        }
        let Some(VisibleRow::Comment(row)) = app.selected_row() else {
            panic!("expected a comment row");
        };
        assert_eq!(row.depth, 6);

        let effects = update(&mut app, key(KeyCode::Char('r')));
        assert!(effects.is_empty());
        assert!(app.composer.is_none());
        assert_eq!(
            app.status.as_ref().map(|s| s.text.as_str()),
            Some(DEPTH_LIMIT_MESSAGE)
        );
    }

    #[test]
    fn test_reply_flow_posts_and_appends() {
        let mut app = loaded(vec![comment("a", None, 0)]);
        update(&mut app, key(KeyCode::Char('r')));
        assert!(matches!(
            app.composer.as_ref().map(|c| &c.target),
            Some(ReplyTarget::Reply { .. })
        ));

        for ch in "hi there".chars() {
            update(&mut app, key(KeyCode::Char(ch)));
        }
        let effects = update(&mut app, key(KeyCode::Enter));
        assert_eq!(
            effects,
            vec![UiEffect::PostComment {
                content: "hi there".into(),
                parent_id: Some(CommentId::from("a")),
            }]
        );

        update(
            &mut app,
            UiEvent::CommentPosted(Ok(comment("new", Some("a"), 5))),
        );
        assert!(app.composer.is_none());
        assert_eq!(app.visible_rows().len(), 2);
        assert_eq!(app.selected, 1);
    }

    #[test]
    fn test_posted_reply_is_revealed_past_reply_page() {
        let mut comments = vec![comment("p", None, 0)];
        comments.extend((1..=4).map(|i| comment(&format!("b{i}"), Some("p"), i)));
        let mut app = loaded(comments);

        update(
            &mut app,
            UiEvent::CommentPosted(Ok(comment("mine", Some("p"), 10))),
        );

        assert!(matches!(
            app.selected_row(),
            Some(VisibleRow::Comment(row)) if row.id == CommentId::from("mine")
        ));
    }

    #[test]
    fn test_posted_root_is_revealed_past_root_page() {
        let comments = (0..4).map(|i| comment(&format!("r{i}"), None, i)).collect();
        let mut app = loaded(comments);

        update(
            &mut app,
            UiEvent::CommentPosted(Ok(comment("mine", None, 10))),
        );

        assert!(matches!(
            app.selected_row(),
            Some(VisibleRow::Comment(row)) if row.id == CommentId::from("mine")
        ));
    }

    #[test]
    fn test_post_after_racing_reload_is_not_duplicated() {
        let mut app = loaded(vec![comment("a", None, 0)]);
        update(
            &mut app,
            UiEvent::ThreadLoaded(Ok((
                summary(),
                vec![comment("a", None, 0), comment("new", None, 1)],
            ))),
        );
        update(
            &mut app,
            UiEvent::CommentPosted(Ok(comment("new", None, 1))),
        );

        assert_eq!(app.engine.comments().len(), 2);
        assert_eq!(app.visible_rows().len(), 2);
    }

    #[test]
    fn test_empty_composer_is_not_submitted() {
        let mut app = loaded(vec![]);
        update(&mut app, key(KeyCode::Char('c')));
        update(&mut app, key(KeyCode::Char(' ')));
        let effects = update(&mut app, key(KeyCode::Enter));

        assert!(effects.is_empty());
        assert!(app.composer.is_some());
    }

    #[test]
    fn test_failed_post_keeps_draft() {
        let mut app = loaded(vec![]);
        update(&mut app, key(KeyCode::Char('c')));
        update(&mut app, key(KeyCode::Char('x')));
        update(&mut app, key(KeyCode::Enter));
        update(
            &mut app,
            UiEvent::CommentPosted(Err(ApiError::new(ApiErrorKind::Timeout, "timed out"))),
        );

        let composer = app.composer.as_ref().unwrap();
        assert_eq!(composer.text, "x");
        assert!(!composer.submitting);
    }

    #[test]
    fn test_vote_is_optimistic_and_rolls_back() {
        let mut app = loaded(vec![]);
        let effects = update(&mut app, key(KeyCode::Char('+')));
        assert_eq!(app.summary.as_ref().unwrap().votes.upvotes, 3);
        assert!(app.vote_in_flight);

        let UiEffect::CastVote { previous, .. } = effects[0].clone() else {
            panic!("expected a vote effect");
        };
        update(
            &mut app,
            UiEvent::VoteCast {
                result: Err(ApiError::http_status(500, "")),
                previous,
            },
        );
        assert_eq!(app.summary.as_ref().unwrap().votes.upvotes, 2);
        assert!(!app.vote_in_flight);
    }

    #[test]
    fn test_server_vote_state_wins() {
        let mut app = loaded(vec![]);
        update(&mut app, key(KeyCode::Char('-')));
        update(
            &mut app,
            UiEvent::VoteCast {
                result: Ok(VoteState {
                    upvotes: 10,
                    downvotes: 4,
                    my_vote: Some(VoteDirection::Down),
                }),
                previous: VoteState::default(),
            },
        );
        assert_eq!(app.summary.as_ref().unwrap().votes.score(), 6);
    }

    #[test]
    fn test_quit_keys() {
        let mut app = loaded(vec![]);
        assert_eq!(update(&mut app, key(KeyCode::Char('q'))), vec![UiEffect::Quit]);
        assert!(app.should_quit);
    }
}
