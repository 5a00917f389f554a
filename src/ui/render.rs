use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::app::Model;
use crate::document::BlockKind;
use crate::editor::ViewLine;

use super::style::{marker_style, style_for_block, style_for_preview_line, style_for_span};
use super::{EDITOR_WIDTH_PERCENT, PREVIEW_WIDTH_PERCENT, status};

/// Editor on the left, preview on the right.
pub fn split_main_columns(area: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(EDITOR_WIDTH_PERCENT),
            Constraint::Percentage(PREVIEW_WIDTH_PERCENT),
        ])
        .split(area)
}

pub fn render(model: &mut Model, frame: &mut Frame) {
    let area = frame.area();

    let footer_active = model.prompt.is_some() || model.active_toast().is_some();
    let footer_rows = 1 + u16::from(footer_active);
    let main_area = Rect {
        height: area.height.saturating_sub(footer_rows),
        ..area
    };
    let footer_area = Rect {
        y: area.y + area.height.saturating_sub(footer_rows),
        height: 1,
        ..area
    };
    let status_area = Rect {
        y: area.y + area.height.saturating_sub(1),
        height: 1,
        ..area
    };

    model.ensure_caret_visible();
    if model.preview_visible {
        let chunks = split_main_columns(main_area);
        render_editor(model, frame, chunks[0]);
        render_preview(model, frame, chunks[1]);
    } else {
        render_editor(model, frame, main_area);
    }

    if model.prompt.is_some() {
        status::render_prompt_bar(model, frame, footer_area);
    } else if footer_active {
        status::render_toast_bar(model, frame, footer_area);
    }
    status::render_status_bar(model, frame, status_area);
}

fn render_editor(model: &Model, frame: &mut Frame, area: Rect) {
    let rows = model.session.view();
    let gutter_width = usize::from(line_number_width(rows.len()));

    let content: Vec<Line> = rows
        .iter()
        .enumerate()
        .skip(model.scroll_offset)
        .take(usize::from(area.height))
        .map(|(idx, row)| {
            let mut spans = if row.decorated {
                block_prefix(row)
            } else {
                vec![Span::styled(
                    format!("{:>gutter_width$} ", idx + 1),
                    marker_style(),
                )]
            };
            let prefix_width: usize = spans.iter().map(|s| s.content.width()).sum();
            let text_width = usize::from(area.width).saturating_sub(prefix_width);
            spans.extend(row_spans(row, text_width));
            Line::from(spans)
        })
        .collect();

    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(content), area);
}

/// Indentation and the marker a block row draws in place of its Markdown
/// prefix.
fn block_prefix(row: &ViewLine) -> Vec<Span<'static>> {
    let marker = match row.kind {
        BlockKind::Paragraph => String::new(),
        BlockKind::Heading(level) => format!("{} ", "#".repeat(usize::from(level))),
        BlockKind::UnorderedList => "• ".to_string(),
        BlockKind::OrderedList => format!("{}. ", row.ordinal.unwrap_or(1)),
        BlockKind::Todo if row.checked => "☑ ".to_string(),
        BlockKind::Todo => "☐ ".to_string(),
        BlockKind::Quote => "│ ".to_string(),
        // The row text is the fence tag itself.
        BlockKind::CodeBlock => "```".to_string(),
    };
    let mut spans = Vec::with_capacity(2);
    if row.indent > 0 {
        spans.push(Span::raw(" ".repeat(row.indent)));
    }
    if !marker.is_empty() {
        spans.push(Span::styled(marker, marker_style()));
    }
    spans
}

/// Index of the first character to draw so the caret cell ends within
/// `width` terminal columns.
fn first_visible(chars: &[char], head: usize, width: usize) -> usize {
    let mut used = chars.get(head).map_or(1, |c| c.width().unwrap_or(0).max(1));
    let mut first = head.min(chars.len());
    while first > 0 {
        let w = chars[first - 1].width().unwrap_or(0);
        if used + w > width {
            break;
        }
        used += w;
        first -= 1;
    }
    first
}

/// Row text with the selection and caret cell highlighted. A caret past
/// `width` columns scrolls the row sideways.
fn row_spans(row: &ViewLine, width: usize) -> Vec<Span<'static>> {
    let base = style_for_block(row.kind);
    let text: String = row
        .text
        .chars()
        .map(|c| if c == '\n' { '↵' } else { c })
        .collect();
    let Some(caret) = row.caret else {
        return vec![Span::styled(text, base)];
    };
    let chars: Vec<char> = text.chars().collect();
    let caret = caret.clamped(chars.len());
    let skip = first_visible(&chars, caret.head, width);
    let chars = &chars[skip..];
    let len = chars.len();
    let (start, end, head) = (
        caret.start().saturating_sub(skip),
        caret.end() - skip,
        caret.head - skip,
    );
    let collect = |range: std::ops::Range<usize>| chars[range].iter().collect::<String>();
    let selected = base.add_modifier(Modifier::REVERSED);
    // One past the end shows a blank cell.
    let under = chars.get(head).map_or_else(|| " ".to_string(), char::to_string);
    let cursor = Span::styled(under, Style::default().bg(Color::White).fg(Color::Black));

    let mut spans = Vec::with_capacity(4);
    spans.push(Span::styled(collect(0..start), base));
    if head == end {
        spans.push(Span::styled(collect(start..end), selected));
        spans.push(cursor);
        spans.push(Span::styled(collect((end + 1).min(len)..len), base));
    } else {
        spans.push(cursor);
        spans.push(Span::styled(collect(start + 1..end), selected));
        spans.push(Span::styled(collect(end..len), base));
    }
    spans.retain(|span| !span.content.is_empty());
    spans
}

fn render_preview(model: &Model, frame: &mut Frame, area: Rect) {
    let lines: Vec<Line> = model
        .preview
        .iter()
        .map(|line| {
            let base = style_for_preview_line(line.style);
            let mut spans = Vec::with_capacity(line.spans.len() + 1);
            if !line.prefix.is_empty() {
                spans.push(Span::styled(line.prefix.clone(), marker_style()));
            }
            spans.extend(
                line.spans
                    .iter()
                    .map(|span| Span::styled(span.text.clone(), style_for_span(base, span.style))),
            );
            Line::from(spans).style(base)
        })
        .collect();

    let block = Block::default()
        .title("Preview")
        .borders(Borders::LEFT)
        .border_style(marker_style());
    let preview = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(Clear, area);
    frame.render_widget(preview, area);
}

/// Calculate the width needed for line numbers.
pub const fn line_number_width(total_lines: usize) -> u16 {
    if total_lines < 10 {
        1
    } else if total_lines < 100 {
        2
    } else if total_lines < 1_000 {
        3
    } else if total_lines < 10_000 {
        4
    } else if total_lines < 100_000 {
        5
    } else {
        6
    }
}

/// Caret-relative spans exposed for tests.
#[cfg(test)]
pub(super) fn caret_cells(text: &str, caret: crate::editor::Caret) -> Vec<(String, bool)> {
    let row = ViewLine {
        kind: BlockKind::Paragraph,
        text: text.to_string(),
        indent: 0,
        ordinal: None,
        checked: false,
        decorated: true,
        caret: Some(caret),
    };
    row_spans(&row, 80)
        .into_iter()
        .map(|span| (span.content.to_string(), span.style.bg == Some(Color::White)))
        .collect()
}
