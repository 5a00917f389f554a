use chrono::Local;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::app::{Model, ToastLevel};
use crate::editor::SurfaceKind;

/// Title, surface, character count and last-modified time.
pub fn status_line(model: &Model) -> String {
    let note = model.session.note();
    let dirty_indicator = if model.session.has_unsaved_changes() {
        " [modified]"
    } else {
        ""
    };
    let surface = match model.session.surface_kind() {
        SurfaceKind::Blocks => "blocks",
        SurfaceKind::Flat => "flat",
    };
    let modified = note.updated_at.with_timezone(&Local).format("%Y-%m-%d %H:%M");
    let preview_indicator = if model.preview_visible { " [preview]" } else { "" };
    format!(
        " {}{dirty_indicator}  ({}/{})  [{surface}]{preview_indicator}  {} chars  edited {modified}  ^S:save ^N:new ^P:preview ^Q:quit",
        note.title,
        model.current + 1,
        model.notes.len(),
        note.char_count(),
    )
}

pub fn render_status_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let status_bar = Paragraph::new(status_line(model))
        .style(Style::default().bg(Color::Magenta).fg(Color::White));
    frame.render_widget(status_bar, area);
}

pub fn render_prompt_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let Some(prompt) = &model.prompt else {
        return;
    };
    let text = format!("{}: {}  Enter: next  Esc: cancel", prompt.label(), prompt.input());
    let bar = Paragraph::new(text).style(Style::default().bg(Color::Blue).fg(Color::White));
    frame.render_widget(bar, area);
}

pub fn render_toast_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let Some((message, level)) = model.active_toast() else {
        return;
    };
    let (prefix, style) = match level {
        ToastLevel::Info => (
            "[info]",
            Style::default().bg(Color::DarkGray).fg(Color::White),
        ),
        ToastLevel::Warning => (
            "[warn]",
            Style::default().bg(Color::Yellow).fg(Color::Black),
        ),
        ToastLevel::Error => ("[error]", Style::default().bg(Color::Red).fg(Color::White)),
    };
    let toast = Paragraph::new(format!("{prefix} {message}")).style(style);
    frame.render_widget(toast, area);
}
