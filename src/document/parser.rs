//! Line classification: note text into blocks.
//!
//! Each line is classified on its own, with no state carried between lines.
//! Rules are tried in a fixed order and the first match wins; anything that
//! matches nothing is a paragraph.

use std::sync::LazyLock;

use regex::Regex;

use super::types::{Block, BlockId, BlockKind};

static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6})(?: (.*))?$").expect("heading pattern"));
static TODO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\s*)- \[([ xX])\] (.*)$").expect("todo pattern"));
static LIST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\s*)([-*+]|\d+\.) (.*)$").expect("list pattern"));
static QUOTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*> (.*)$").expect("quote pattern"));
static FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^```(([^`\s]*)\s*)$").expect("fence pattern"));

/// Split `text` into lines and classify each one.
///
/// An empty document yields a single empty paragraph. Block identifiers are
/// the line positions, so re-parsing always produces fresh identifiers.
pub fn parse(text: &str) -> Vec<Block> {
    text.split('\n')
        .enumerate()
        .map(|(index, line)| classify_line(BlockId(index as u64), line))
        .collect()
}

/// Classify a single line. `content` is always the line itself.
pub fn classify_line(id: BlockId, line: &str) -> Block {
    let mut block = Block::paragraph(id, line);

    if let Some(caps) = HEADING.captures(line) {
        let level = caps[1].len();
        if let Some(kind) = BlockKind::heading(level) {
            block.kind = kind;
            block.display = caps.get(2).map_or("", |m| m.as_str()).to_string();
        }
    } else if let Some(caps) = TODO.captures(line) {
        block.kind = BlockKind::Todo;
        block.indent = caps[1].len();
        block.marker = Some("-".to_string());
        block.checked = !caps[2].trim().is_empty();
        block.display = caps[3].to_string();
    } else if let Some(caps) = LIST.captures(line) {
        let marker = &caps[2];
        block.kind = if marker.ends_with('.') {
            BlockKind::OrderedList
        } else {
            BlockKind::UnorderedList
        };
        block.indent = caps[1].len();
        block.marker = Some(marker.to_string());
        block.display = caps[3].to_string();
    } else if let Some(caps) = QUOTE.captures(line) {
        block.kind = BlockKind::Quote;
        block.display = caps[1].to_string();
    } else if let Some(caps) = FENCE.captures(line) {
        block.kind = BlockKind::CodeBlock;
        let language = &caps[2];
        block.language = (!language.is_empty()).then(|| language.to_string());
        block.display = caps[1].to_string();
    }

    block
}
