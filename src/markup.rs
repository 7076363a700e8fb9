//! Conversion between the plain, line-oriented text the model returns and the
//! block markup used for rendering, plus the reverse direction for clipboard
//! copies.

/// One block element of a converted document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Paragraph(String),
    OrderedList(Vec<String>),
    UnorderedList(Vec<String>),
}

/// An ordered sequence of block elements, preserving source line order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkupDocument {
    blocks: Vec<Block>,
}

/// If `line` begins with an ordered-list marker (digits, a dot, whitespace),
/// return the item text after the marker.
fn strip_ordered_marker(line: &str) -> Option<&str> {
    let digits = line.len() - line.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return None;
    }
    let rest = &line[digits..];
    let rest = rest.strip_prefix('.')?;
    let trimmed = rest.trim_start();
    if trimmed.len() == rest.len() && !rest.is_empty() {
        // A dot not followed by whitespace ("3.14") is not a marker.
        return None;
    }
    Some(trimmed)
}

fn strip_unordered_marker(line: &str) -> Option<&str> {
    line.strip_prefix("* ").or_else(|| line.strip_prefix("- "))
}

impl MarkupDocument {
    /// Convert newline-delimited plain text into blocks.
    ///
    /// Each line is trimmed and classified: ordered-list item, unordered-list
    /// item, paragraph, or blank. Adjacent items of one list kind are grouped
    /// into a single list block; any other line closes the open list. Blank
    /// lines emit nothing. Never fails; empty input yields an empty document.
    pub fn from_plain_text(text: &str) -> Self {
        let mut blocks = Vec::new();
        let mut open_ul: Option<Vec<String>> = None;
        let mut open_ol: Option<Vec<String>> = None;

        for line in text.split('\n') {
            let trimmed = line.trim();
            let ol_item = strip_ordered_marker(trimmed);
            let ul_item = if ol_item.is_none() {
                strip_unordered_marker(trimmed)
            } else {
                None
            };

            if ul_item.is_none() {
                if let Some(items) = open_ul.take() {
                    blocks.push(Block::UnorderedList(items));
                }
            }
            if ol_item.is_none() {
                if let Some(items) = open_ol.take() {
                    blocks.push(Block::OrderedList(items));
                }
            }

            if let Some(item) = ol_item {
                open_ol.get_or_insert_with(Vec::new).push(item.to_string());
            } else if let Some(item) = ul_item {
                open_ul.get_or_insert_with(Vec::new).push(item.to_string());
            } else if !trimmed.is_empty() {
                blocks.push(Block::Paragraph(trimmed.to_string()));
            }
        }

        if let Some(items) = open_ul.take() {
            blocks.push(Block::UnorderedList(items));
        }
        if let Some(items) = open_ol.take() {
            blocks.push(Block::OrderedList(items));
        }

        MarkupDocument { blocks }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Render as HTML: `<p>` paragraphs, `<ul>`/`<ol>` lists of `<li>` items.
    pub fn to_html(&self) -> String {
        let mut html = String::new();
        for block in &self.blocks {
            match block {
                Block::Paragraph(text) => {
                    html.push_str("<p>");
                    html.push_str(text);
                    html.push_str("</p>");
                }
                Block::UnorderedList(items) => {
                    html.push_str("<ul>");
                    for item in items {
                        html.push_str("<li>");
                        html.push_str(item);
                        html.push_str("</li>");
                    }
                    html.push_str("</ul>");
                }
                Block::OrderedList(items) => {
                    html.push_str("<ol>");
                    for item in items {
                        html.push_str("<li>");
                        html.push_str(item);
                        html.push_str("</li>");
                    }
                    html.push_str("</ol>");
                }
            }
        }
        html
    }

    /// Best-effort inverse for copy-paste: one line per paragraph or item,
    /// unordered items prefixed with `* `, ordered items renumbered from 1.
    pub fn to_plain_text(&self) -> String {
        let mut lines = Vec::new();
        for block in &self.blocks {
            match block {
                Block::Paragraph(text) => lines.push(text.clone()),
                Block::UnorderedList(items) => {
                    for item in items {
                        lines.push(format!("* {item}"));
                    }
                }
                Block::OrderedList(items) => {
                    for (i, item) in items.iter().enumerate() {
                        lines.push(format!("{}. {item}", i + 1));
                    }
                }
            }
        }
        lines.join("\n")
    }
}

/// Convenience: plain text straight to HTML.
pub fn text_to_html(text: &str) -> String {
    MarkupDocument::from_plain_text(text).to_html()
}

/// Normalize model text for clipboard or TTS use: strips list markers into a
/// uniform plain-text form.
pub fn normalize_plain_text(text: &str) -> String {
    MarkupDocument::from_plain_text(text).to_plain_text()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_empty_document() {
        let doc = MarkupDocument::from_plain_text("");
        assert!(doc.is_empty());
        assert_eq!(doc.to_html(), "");
    }

    #[test]
    fn blank_lines_emit_nothing() {
        let doc = MarkupDocument::from_plain_text("\n   \n\t\n");
        assert!(doc.is_empty());
    }

    #[test]
    fn paragraphs_are_trimmed_and_kept_in_order() {
        let doc = MarkupDocument::from_plain_text("  first  \nsecond\n\nthird");
        assert_eq!(
            doc.blocks(),
            &[
                Block::Paragraph("first".into()),
                Block::Paragraph("second".into()),
                Block::Paragraph("third".into()),
            ]
        );
    }

    #[test]
    fn unordered_items_followed_by_paragraph() {
        let doc = MarkupDocument::from_plain_text("* one\n* two\nplain line");
        assert_eq!(
            doc.blocks(),
            &[
                Block::UnorderedList(vec!["one".into(), "two".into()]),
                Block::Paragraph("plain line".into()),
            ]
        );
        assert_eq!(doc.to_html(), "<ul><li>one</li><li>two</li></ul><p>plain line</p>");
    }

    #[test]
    fn ordered_only_input_groups_into_one_list() {
        let doc = MarkupDocument::from_plain_text("1. first\n2. second");
        assert_eq!(
            doc.blocks(),
            &[Block::OrderedList(vec!["first".into(), "second".into()])]
        );
        assert_eq!(doc.to_html(), "<ol><li>first</li><li>second</li></ol>");
    }

    #[test]
    fn dash_marker_is_unordered() {
        let doc = MarkupDocument::from_plain_text("- a\n- b");
        assert_eq!(doc.blocks(), &[Block::UnorderedList(vec!["a".into(), "b".into()])]);
    }

    #[test]
    fn multi_digit_ordered_markers() {
        let doc = MarkupDocument::from_plain_text("10. ten\n11. eleven");
        assert_eq!(
            doc.blocks(),
            &[Block::OrderedList(vec!["ten".into(), "eleven".into()])]
        );
    }

    #[test]
    fn decimal_number_is_a_paragraph() {
        let doc = MarkupDocument::from_plain_text("3.14 is pi");
        assert_eq!(doc.blocks(), &[Block::Paragraph("3.14 is pi".into())]);
    }

    #[test]
    fn switching_list_kind_closes_the_open_list() {
        let doc = MarkupDocument::from_plain_text("* a\n1. b\n* c");
        assert_eq!(
            doc.blocks(),
            &[
                Block::UnorderedList(vec!["a".into()]),
                Block::OrderedList(vec!["b".into()]),
                Block::UnorderedList(vec!["c".into()]),
            ]
        );
    }

    #[test]
    fn blank_line_closes_a_list() {
        let doc = MarkupDocument::from_plain_text("1. a\n\n2. b");
        assert_eq!(
            doc.blocks(),
            &[
                Block::OrderedList(vec!["a".into()]),
                Block::OrderedList(vec!["b".into()]),
            ]
        );
    }

    #[test]
    fn list_open_at_end_of_input_is_closed() {
        let doc = MarkupDocument::from_plain_text("intro\n* a\n* b");
        assert_eq!(
            doc.blocks(),
            &[
                Block::Paragraph("intro".into()),
                Block::UnorderedList(vec!["a".into(), "b".into()]),
            ]
        );
    }

    #[test]
    fn marker_with_empty_remainder_is_an_empty_item() {
        let doc = MarkupDocument::from_plain_text("1. ");
        assert_eq!(doc.blocks(), &[Block::OrderedList(vec![String::new()])]);
    }

    #[test]
    fn block_count_matches_non_blank_lines_without_lists() {
        let input = "one\ntwo\n\nthree\nfour";
        let doc = MarkupDocument::from_plain_text(input);
        let non_blank = input.lines().filter(|l| !l.trim().is_empty()).count();
        assert_eq!(doc.blocks().len(), non_blank);
    }

    #[test]
    fn round_trip_preserves_order_and_content() {
        let input = "Intro paragraph\n7. first\n9. second\n* bullet\nOutro";
        let text = MarkupDocument::from_plain_text(input).to_plain_text();
        // Ordered items are renumbered positionally; everything else survives.
        assert_eq!(text, "Intro paragraph\n1. first\n2. second\n* bullet\nOutro");
        // A second pass is a fixed point.
        assert_eq!(MarkupDocument::from_plain_text(&text).to_plain_text(), text);
    }

    #[test]
    fn normalize_plain_text_collapses_whitespace_lines() {
        assert_eq!(normalize_plain_text("  a  \n\n  * b \n"), "a\n* b");
    }
}
