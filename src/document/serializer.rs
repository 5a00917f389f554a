//! Block templates: blocks back into canonical Markdown text.

use super::types::{Block, BlockKind};

/// Render the canonical line(s) for `block`.
///
/// `ordinal` is the 1-based number printed for ordered-list blocks and is
/// ignored for every other kind.
pub fn template(block: &Block, ordinal: usize) -> String {
    let indent = " ".repeat(block.indent);
    let text = block.display.as_str();
    match block.kind {
        BlockKind::Heading(level) => {
            let marker = "#".repeat(usize::from(level));
            if text.is_empty() {
                marker
            } else {
                format!("{marker} {text}")
            }
        }
        BlockKind::UnorderedList => format!("{indent}- {text}"),
        BlockKind::OrderedList => format!("{indent}{ordinal}. {text}"),
        BlockKind::Quote => format!("> {text}"),
        BlockKind::Todo => {
            let mark = if block.checked { 'x' } else { ' ' };
            format!("{indent}- [{mark}] {text}")
        }
        // The fence line alone; the display text is whatever follows the backticks.
        BlockKind::CodeBlock => format!("```{text}"),
        BlockKind::Paragraph => text.to_string(),
    }
}

/// Content for a block that has just become a code block: an opening fence,
/// one empty body line and the closing fence. Any earlier text is dropped.
pub fn code_entry(block: &Block) -> String {
    let language = block.language.as_deref().unwrap_or_default();
    format!("```{language}\n\n```")
}

/// The number an ordered-list block at `index` prints: its position among
/// the ordered-list blocks of the sequence, counting from 1.
///
/// This is not the block's index in the full sequence. Counting only
/// ordered-list blocks keeps markers contiguous from `1.` when other blocks
/// sit between the items.
pub fn ordinal_at(blocks: &[Block], index: usize) -> usize {
    blocks
        .iter()
        .take(index)
        .filter(|b| b.kind == BlockKind::OrderedList)
        .count()
        + 1
}

/// Regenerate `content` for the block at `index` from its display text.
///
/// A code block that still carries the body from [`code_entry`] only has its
/// fence line rewritten.
pub fn retemplate(blocks: &mut [Block], index: usize) {
    let ordinal = ordinal_at(blocks, index);
    if let Some(block) = blocks.get_mut(index) {
        let line = template(block, ordinal);
        block.content = match (block.kind, block.content.split_once('\n')) {
            (BlockKind::CodeBlock, Some((_, body))) => format!("{line}\n{body}"),
            _ => line,
        };
    }
}

/// Rewrite every ordered-list block so the markers run `1.`, `2.`, … in
/// sequence order, whatever other blocks sit between them.
pub fn renumber(blocks: &mut [Block]) {
    let mut ordinal = 0;
    for block in blocks.iter_mut() {
        if block.kind == BlockKind::OrderedList {
            ordinal += 1;
            block.content = template(block, ordinal);
        }
    }
}

/// Join the blocks' canonical content into the full note text.
pub fn serialize(blocks: &[Block]) -> String {
    blocks
        .iter()
        .map(|b| b.content.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::parse;
    use crate::document::types::BlockId;

    fn block(kind: BlockKind, display: &str) -> Block {
        let mut b = Block::paragraph(BlockId(0), display);
        b.set_kind(kind);
        b
    }

    #[test]
    fn test_heading_template() {
        assert_eq!(template(&block(BlockKind::Heading(2), "Title"), 1), "## Title");
    }

    #[test]
    fn test_empty_heading_is_bare_marker() {
        assert_eq!(template(&block(BlockKind::Heading(3), ""), 1), "###");
    }

    #[test]
    fn test_list_and_quote_templates() {
        assert_eq!(template(&block(BlockKind::UnorderedList, "a"), 1), "- a");
        assert_eq!(template(&block(BlockKind::OrderedList, "b"), 4), "4. b");
        assert_eq!(template(&block(BlockKind::Quote, "c"), 1), "> c");
    }

    #[test]
    fn test_indented_list_template() {
        let mut b = block(BlockKind::UnorderedList, "nested");
        b.indent = 2;
        assert_eq!(template(&b, 1), "  - nested");
    }

    #[test]
    fn test_todo_template() {
        let mut b = block(BlockKind::Todo, "task");
        assert_eq!(template(&b, 1), "- [ ] task");
        b.checked = true;
        assert_eq!(template(&b, 1), "- [x] task");
    }

    #[test]
    fn test_code_block_entry_has_empty_body() {
        let mut b = block(BlockKind::CodeBlock, "");
        assert_eq!(code_entry(&b), "```\n\n```");
        b.language = Some("rust".to_string());
        assert_eq!(code_entry(&b), "```rust\n\n```");
    }

    #[test]
    fn test_code_block_template_is_fence_line() {
        let b = block(BlockKind::CodeBlock, "rust");
        assert_eq!(template(&b, 1), "```rust");
    }

    #[test]
    fn test_parsed_fence_retemplates_to_itself() {
        let mut blocks = parse("```rust\nfn main() {}\n```");
        let before = serialize(&blocks);
        for i in 0..blocks.len() {
            retemplate(&mut blocks, i);
        }
        assert_eq!(serialize(&blocks), before);
    }

    #[test]
    fn test_retemplate_keeps_entered_code_body() {
        let mut blocks = vec![block(BlockKind::CodeBlock, "")];
        blocks[0].content = code_entry(&blocks[0]);
        blocks[0].display = "rust".to_string();
        retemplate(&mut blocks, 0);
        assert_eq!(blocks[0].content, "```rust\n\n```");
    }

    #[test]
    fn test_paragraph_is_verbatim() {
        assert_eq!(template(&block(BlockKind::Paragraph, "  as is "), 1), "  as is ");
    }

    #[test]
    fn test_renumber_ignores_parsed_markers() {
        let mut blocks = parse("7. a\ntext\n3. b\n# h\n99. c");
        renumber(&mut blocks);
        assert_eq!(serialize(&blocks), "1. a\ntext\n2. b\n# h\n3. c");
    }

    #[test]
    fn test_ordinal_counts_only_ordered_blocks() {
        let blocks = parse("1. a\n- b\n1. c");
        assert_eq!(ordinal_at(&blocks, 0), 1);
        assert_eq!(ordinal_at(&blocks, 2), 2);
    }

    #[test]
    fn test_serialize_joins_with_newlines() {
        let blocks = parse("one\n\nthree");
        assert_eq!(serialize(&blocks), "one\n\nthree");
    }
}
