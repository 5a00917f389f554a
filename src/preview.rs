//! Read-only Markdown preview.
//!
//! The preview takes the note's canonical text and lays it out as styled
//! lines. It never touches editing state.

use comrak::nodes::{AstNode, ListDelimType, ListType, NodeValue};
use comrak::{Arena, Options, parse_document};

/// Inline styling for a run of preview text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpanStyle {
    pub emphasis: bool,
    pub strong: bool,
    pub code: bool,
    pub strikethrough: bool,
    pub link: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewSpan {
    pub text: String,
    pub style: SpanStyle,
}

/// Block-level styling for a whole preview line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Heading(u8),
    Body,
    Quote,
    Code,
    Rule,
    Blank,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewLine {
    pub style: LineStyle,
    /// Quote bars, list markers and indentation drawn before the spans.
    pub prefix: String,
    pub spans: Vec<PreviewSpan>,
}

impl PreviewLine {
    fn new(style: LineStyle, prefix: &str, spans: Vec<PreviewSpan>) -> Self {
        Self {
            style,
            prefix: prefix.to_string(),
            spans,
        }
    }

    const fn blank() -> Self {
        Self {
            style: LineStyle::Blank,
            prefix: String::new(),
            spans: Vec::new(),
        }
    }

    /// Prefix and spans as plain text.
    pub fn text(&self) -> String {
        let mut text = self.prefix.clone();
        for span in &self.spans {
            text.push_str(&span.text);
        }
        text
    }
}

/// Turns canonical note text into a rendered view.
pub trait PreviewRenderer {
    fn render(&self, markdown: &str) -> Vec<PreviewLine>;
}

/// Preview renderer backed by comrak's CommonMark parser.
#[derive(Debug, Default, Clone, Copy)]
pub struct ComrakPreview;

impl PreviewRenderer for ComrakPreview {
    fn render(&self, markdown: &str) -> Vec<PreviewLine> {
        let _scope = crate::perf::scope("preview.render");
        let arena = Arena::new();
        let options = create_options();
        let root = parse_document(&arena, markdown, &options);

        let mut lines = Vec::new();
        for (i, child) in root.children().enumerate() {
            if i > 0 {
                lines.push(PreviewLine::blank());
            }
            render_block(child, "", "", &mut lines);
        }
        lines
    }
}

fn create_options() -> Options {
    let mut options = Options::default();
    options.extension.strikethrough = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options
}

/// Render one block node. `first` prefixes the block's first line and
/// `rest` every line after it, so list markers appear only once.
fn render_block<'a>(node: &'a AstNode<'a>, first: &str, rest: &str, lines: &mut Vec<PreviewLine>) {
    let start = lines.len();
    match &node.data.borrow().value {
        NodeValue::Heading(heading) => {
            lines.push(PreviewLine::new(
                LineStyle::Heading(heading.level),
                first,
                collect_spans(node),
            ));
        }
        NodeValue::Paragraph => {
            let spans = collect_spans(node);
            for (i, line) in split_spans_at_breaks(spans).into_iter().enumerate() {
                let prefix = if i == 0 { first } else { rest };
                lines.push(PreviewLine::new(LineStyle::Body, prefix, line));
            }
        }
        NodeValue::CodeBlock(code_block) => {
            let style = SpanStyle {
                code: true,
                ..SpanStyle::default()
            };
            for (i, line) in code_block.literal.trim_end_matches('\n').split('\n').enumerate() {
                let prefix = if i == 0 { first } else { rest };
                let span = PreviewSpan {
                    text: line.to_string(),
                    style,
                };
                lines.push(PreviewLine::new(LineStyle::Code, prefix, vec![span]));
            }
        }
        NodeValue::HtmlBlock(html) => {
            for (i, line) in html.literal.trim_end_matches('\n').split('\n').enumerate() {
                let prefix = if i == 0 { first } else { rest };
                let span = PreviewSpan {
                    text: line.to_string(),
                    style: SpanStyle::default(),
                };
                lines.push(PreviewLine::new(LineStyle::Body, prefix, vec![span]));
            }
        }
        NodeValue::ThematicBreak => {
            lines.push(PreviewLine::new(LineStyle::Rule, first, Vec::new()));
        }
        NodeValue::BlockQuote => {
            let first = format!("{first}│ ");
            let rest = format!("{rest}│ ");
            for (i, child) in node.children().enumerate() {
                let prefix = if i == 0 { &first } else { &rest };
                render_block(child, prefix, &rest, lines);
            }
            for line in &mut lines[start..] {
                if line.style == LineStyle::Body {
                    line.style = LineStyle::Quote;
                }
            }
        }
        NodeValue::List(list) => {
            let mut number = list.start;
            for (i, item) in node.children().enumerate() {
                let marker = match &item.data.borrow().value {
                    NodeValue::TaskItem(Some(_)) => "☑".to_string(),
                    NodeValue::TaskItem(None) => "☐".to_string(),
                    _ if list.list_type == ListType::Ordered => {
                        let delim = match list.delimiter {
                            ListDelimType::Paren => ')',
                            ListDelimType::Period => '.',
                        };
                        format!("{number}{delim}")
                    }
                    _ => "•".to_string(),
                };
                number += 1;
                let head = if i == 0 { first } else { rest };
                let item_first = format!("{head}{marker} ");
                let item_rest = format!("{rest}{}", " ".repeat(marker.chars().count() + 1));
                render_item(item, &item_first, &item_rest, lines);
            }
        }
        _ => {
            for child in node.children() {
                render_block(child, first, rest, lines);
            }
        }
    }
}

fn render_item<'a>(item: &'a AstNode<'a>, first: &str, rest: &str, lines: &mut Vec<PreviewLine>) {
    let mut used_first = false;
    for child in item.children() {
        let prefix = if used_first { rest } else { first };
        let before = lines.len();
        render_block(child, prefix, rest, lines);
        used_first |= lines.len() > before;
    }
    if !used_first {
        lines.push(PreviewLine::new(LineStyle::Body, first, Vec::new()));
    }
}

fn collect_spans<'a>(node: &'a AstNode<'a>) -> Vec<PreviewSpan> {
    let mut spans = Vec::new();
    for child in node.children() {
        collect_spans_recursive(child, SpanStyle::default(), &mut spans);
    }
    spans
}

fn collect_spans_recursive<'a>(node: &'a AstNode<'a>, style: SpanStyle, spans: &mut Vec<PreviewSpan>) {
    let mut nested = style;
    match &node.data.borrow().value {
        NodeValue::Text(text) => {
            spans.push(PreviewSpan {
                text: text.clone(),
                style,
            });
            return;
        }
        NodeValue::Code(code) => {
            spans.push(PreviewSpan {
                text: code.literal.clone(),
                style: SpanStyle { code: true, ..style },
            });
            return;
        }
        NodeValue::SoftBreak => {
            spans.push(PreviewSpan {
                text: " ".to_string(),
                style,
            });
            return;
        }
        NodeValue::LineBreak => {
            spans.push(PreviewSpan {
                text: "\n".to_string(),
                style,
            });
            return;
        }
        NodeValue::HtmlInline(html) => {
            spans.push(PreviewSpan {
                text: html.clone(),
                style,
            });
            return;
        }
        NodeValue::Emph => nested.emphasis = true,
        NodeValue::Strong => nested.strong = true,
        NodeValue::Strikethrough => nested.strikethrough = true,
        NodeValue::Link(_) => nested.link = true,
        _ => {}
    }
    for child in node.children() {
        collect_spans_recursive(child, nested, spans);
    }
}

/// Hard line breaks start a new preview line.
fn split_spans_at_breaks(spans: Vec<PreviewSpan>) -> Vec<Vec<PreviewSpan>> {
    let mut lines = vec![Vec::new()];
    for span in spans {
        if span.text == "\n" {
            lines.push(Vec::new());
        } else if let Some(line) = lines.last_mut() {
            line.push(span);
        }
    }
    lines
}
