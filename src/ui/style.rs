//! Colors for editor rows and preview lines.

use ratatui::style::{Color, Modifier, Style};

use crate::document::BlockKind;
use crate::preview::{LineStyle, SpanStyle};

/// Style for an editor row of the given block kind.
pub fn style_for_block(kind: BlockKind) -> Style {
    match kind {
        BlockKind::Heading(level) => heading_style(level),
        BlockKind::CodeBlock => code_style(),
        BlockKind::Quote => quote_style(),
        BlockKind::Paragraph
        | BlockKind::UnorderedList
        | BlockKind::OrderedList
        | BlockKind::Todo => Style::default(),
    }
}

/// Style for a whole preview line.
pub fn style_for_preview_line(style: LineStyle) -> Style {
    match style {
        LineStyle::Heading(level) => heading_style(level),
        LineStyle::Code => code_style(),
        LineStyle::Quote => quote_style(),
        LineStyle::Rule => Style::default()
            .fg(Color::Indexed(240))
            .add_modifier(Modifier::DIM),
        LineStyle::Body | LineStyle::Blank => Style::default(),
    }
}

/// Merge inline emphasis into a base line style.
pub fn style_for_span(base: Style, inline: SpanStyle) -> Style {
    let mut style = base;
    if inline.emphasis {
        style = style.add_modifier(Modifier::ITALIC);
    }
    if inline.strong {
        style = style.add_modifier(Modifier::BOLD);
    }
    if inline.strikethrough {
        style = style.add_modifier(Modifier::CROSSED_OUT);
    }
    if inline.link {
        style = style.add_modifier(Modifier::UNDERLINED).fg(Color::LightBlue);
    }
    if inline.code {
        style = style.fg(Color::Indexed(215)).bg(Color::Indexed(236));
    }
    style
}

/// Marker color drawn in the gutter for decorated rows.
pub const fn marker_style() -> Style {
    Style::new().fg(Color::DarkGray)
}

fn heading_style(level: u8) -> Style {
    // Headings - bold with distinct colors per level
    match level {
        1 => Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        2 => Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        3 => Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        4 => Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
        5 => Style::default()
            .fg(Color::Magenta)
            .add_modifier(Modifier::BOLD),
        _ => Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD),
    }
}

fn code_style() -> Style {
    Style::default()
        .fg(Color::Indexed(245))
        .add_modifier(Modifier::DIM)
}

fn quote_style() -> Style {
    Style::default()
        .fg(Color::Blue)
        .add_modifier(Modifier::ITALIC)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_levels_are_bold() {
        for level in 1..=6 {
            let style = style_for_block(BlockKind::Heading(level));
            assert!(style.add_modifier.contains(Modifier::BOLD), "level {level}");
        }
    }

    #[test]
    fn test_span_style_stacks_modifiers() {
        let inline = SpanStyle {
            strong: true,
            emphasis: true,
            ..SpanStyle::default()
        };
        let style = style_for_span(Style::default(), inline);
        assert!(style.add_modifier.contains(Modifier::BOLD | Modifier::ITALIC));
    }

    #[test]
    fn test_editor_and_preview_share_heading_style() {
        assert_eq!(
            style_for_block(BlockKind::Heading(2)),
            style_for_preview_line(LineStyle::Heading(2))
        );
    }
}
