//! Pure view functions for the feed.
//!
//! Functions here take `&AppState`, draw to a ratatui `Frame`, and never
//! mutate state or return effects.

use candor_core::thread::{CommentRow, MAX_DEPTH, VisibleRow};
use candor_core::vote::VoteDirection;
use chrono::{DateTime, Utc};
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

use crate::state::{AppState, ReplyTarget};
use crate::text::{format_age, truncate_with_ellipsis, wrap_text};

const HEADER_HEIGHT: u16 = 3;
const FOOTER_HEIGHT: u16 = 2;

/// Columns of indentation per nesting level.
const INDENT: usize = 2;

const SPINNER_FRAMES: &[&str] = &["◐", "◓", "◑", "◒"];

const HELP: &str =
    "j/k move · enter toggle · m more · s sort · r reply · c comment · +/- vote · R reload · q quit";

pub fn render(app: &AppState, frame: &mut Frame) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(HEADER_HEIGHT),
            Constraint::Min(1),
            Constraint::Length(FOOTER_HEIGHT),
        ])
        .split(frame.area());

    render_header(app, frame, chunks[0]);
    render_rows(app, frame, chunks[1], Utc::now());
    render_footer(app, frame, chunks[2]);
}

fn spinner(app: &AppState) -> &'static str {
    SPINNER_FRAMES[app.spinner_frame % SPINNER_FRAMES.len()]
}

fn render_header(app: &AppState, frame: &mut Frame, area: Rect) {
    let width = area.width.saturating_sub(2) as usize;

    let title = match &app.summary {
        Some(summary) => summary.headline().to_string(),
        None if app.loading => format!("{} Loading {}", spinner(app), app.thread),
        None => app.thread.to_string(),
    };

    let mut meta = Vec::new();
    if let Some(summary) = &app.summary {
        let votes = summary.votes;
        let up_style = vote_style(votes.my_vote == Some(VoteDirection::Up), Color::Green);
        let down_style = vote_style(votes.my_vote == Some(VoteDirection::Down), Color::Red);
        meta.push(Span::styled(format!("▲ {}", votes.upvotes), up_style));
        meta.push(Span::raw(" "));
        meta.push(Span::styled(format!("▼ {}", votes.downvotes), down_style));
        meta.push(Span::styled(
            format!("  score {}", votes.score()),
            Style::default().fg(Color::DarkGray),
        ));
        if app.vote_in_flight {
            meta.push(Span::raw(format!(" {}", spinner(app))));
        }
        meta.push(Span::raw("  │  "));
    }
    meta.push(Span::styled(
        format!(
            "{} comments · sort: {}",
            app.engine.comments().len(),
            app.engine.sort_mode()
        ),
        Style::default().fg(Color::DarkGray),
    ));

    let lines = vec![
        Line::from(Span::styled(
            truncate_with_ellipsis(&title, width),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(meta),
    ];

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(Style::default().fg(Color::DarkGray));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn vote_style(active: bool, color: Color) -> Style {
    if active {
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    }
}

fn render_rows(app: &AppState, frame: &mut Frame, area: Rect, now: DateTime<Utc>) {
    let rows = app.visible_rows();
    if rows.is_empty() {
        let message = if app.loading {
            "Loading comments…"
        } else {
            "No comments yet. Press c to start the discussion."
        };
        frame.render_widget(
            Paragraph::new(message).style(Style::default().fg(Color::DarkGray)),
            area,
        );
        return;
    }

    let width = area.width as usize;
    let items: Vec<ListItem> = rows
        .iter()
        .map(|row| ListItem::new(row_lines(app, row, width, now)))
        .collect();

    let list = List::new(items).highlight_style(Style::default().bg(Color::Rgb(40, 44, 52)));
    let mut list_state = ListState::default()
        .with_offset(app.scroll_offset)
        .with_selected(Some(app.selected));
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn row_lines(
    app: &AppState,
    row: &VisibleRow,
    width: usize,
    now: DateTime<Utc>,
) -> Vec<Line<'static>> {
    match row {
        VisibleRow::Comment(comment) => comment_lines(app, comment, width, now),
        VisibleRow::MoreReplies {
            depth, remaining, ..
        } => vec![more_line(
            depth * INDENT,
            format!("↳ show {remaining} more {}", plural(*remaining, "reply", "replies")),
        )],
        VisibleRow::MoreRoots { remaining } => vec![more_line(
            0,
            format!("↓ show {remaining} more {}", plural(*remaining, "comment", "comments")),
        )],
    }
}

fn plural(count: usize, one: &'static str, many: &'static str) -> &'static str {
    if count == 1 { one } else { many }
}

fn more_line(indent: usize, text: String) -> Line<'static> {
    Line::from(vec![
        Span::raw(" ".repeat(indent)),
        Span::styled(text, Style::default().fg(Color::Cyan)),
    ])
}

fn comment_lines(
    app: &AppState,
    row: &CommentRow,
    width: usize,
    now: DateTime<Utc>,
) -> Vec<Line<'static>> {
    let comment = &app.engine.get_ranked_tree().node(row.node).comment;
    let indent = " ".repeat(row.depth * INDENT);

    let marker = match (row.reply_count, row.expanded) {
        (0, _) => "•",
        (_, true) => "▾",
        (_, false) => "▸",
    };
    let author_style = if comment.is_original_poster {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };

    let mut header = vec![
        Span::raw(indent.clone()),
        Span::styled(format!("{marker} "), Style::default().fg(Color::DarkGray)),
        Span::styled(comment.display_author().to_string(), author_style),
        Span::styled(
            format!(" · {}", format_age(comment.created_at, now)),
            Style::default().fg(Color::DarkGray),
        ),
    ];
    if row.reply_count > 0 {
        header.push(Span::styled(
            format!(
                " · {} {}",
                row.reply_count,
                plural(row.reply_count, "reply", "replies")
            ),
            Style::default().fg(Color::DarkGray),
        ));
    }
    if !row.can_reply {
        header.push(Span::styled(
            format!(" · depth {MAX_DEPTH}, replies closed"),
            Style::default().fg(Color::DarkGray),
        ));
    }

    let body_indent = format!("{indent}  ");
    let body_width = width.saturating_sub(body_indent.len()).max(10);

    let mut lines = vec![Line::from(header)];
    lines.extend(
        wrap_text(&comment.content, body_width)
            .into_iter()
            .map(|text| Line::from(vec![Span::raw(body_indent.clone()), Span::raw(text)])),
    );
    lines
}

fn render_footer(app: &AppState, frame: &mut Frame, area: Rect) {
    let width = area.width as usize;
    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(Style::default().fg(Color::DarkGray));

    let line = if let Some(composer) = &app.composer {
        let label = match &composer.target {
            ReplyTarget::Root => "Comment".to_string(),
            ReplyTarget::Reply { author, .. } => format!("Reply to {author}"),
        };
        let cursor = if composer.submitting {
            format!(" {}", spinner(app))
        } else {
            "▌".to_string()
        };
        let prefix = format!("{label} › ");
        let available = width.saturating_sub(prefix.chars().count() + 2);
        Line::from(vec![
            Span::styled(prefix, Style::default().fg(Color::Cyan)),
            Span::raw(tail(&composer.text, available)),
            Span::raw(cursor),
        ])
    } else if let Some(status) = &app.status {
        let color = if status.is_error {
            Color::Red
        } else {
            Color::Green
        };
        Line::from(Span::styled(
            truncate_with_ellipsis(&status.text, width),
            Style::default().fg(color),
        ))
    } else {
        Line::from(Span::styled(
            truncate_with_ellipsis(HELP, width),
            Style::default().fg(Color::DarkGray),
        ))
    };

    frame.render_widget(Paragraph::new(line).block(block), area);
}

/// Last `max_chars` characters of `text`, so the cursor end stays visible.
fn tail(text: &str, max_chars: usize) -> String {
    let count = text.chars().count();
    text.chars().skip(count.saturating_sub(max_chars)).collect()
}
