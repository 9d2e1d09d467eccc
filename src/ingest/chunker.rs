//! Paragraph-based chunking with positional and section metadata.
//!
//! Boundaries come from blank lines, never from inside a paragraph, so a
//! retrieved chunk always reads as whole prose. Sizing uses the rough
//! four-characters-per-token estimate rather than a real tokenizer; the
//! target is a soft ceiling, since an oversized paragraph is kept intact.
//! Adjacent chunks share a word-level overlap so sentences near a boundary
//! stay visible to retrieval from both sides.

/// Default soft ceiling on the per-chunk token estimate.
pub const DEFAULT_TARGET_TOKENS: usize = 750;

/// Default number of trailing words repeated at the start of the next chunk.
pub const DEFAULT_OVERLAP_WORDS: usize = 100;

/// One retrieval-sized span of document text.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    /// Chunk text, trimmed of surrounding whitespace.
    pub content: String,
    /// Byte offset where the chunk's untrimmed text begins.
    pub start_index: usize,
    /// Byte offset just past the chunk's untrimmed text.
    pub end_index: usize,
    /// 1-based page the chunk starts on; `None` without page information.
    pub page_number: Option<u32>,
    /// First heading-like line found in the chunk, if any.
    pub section: Option<String>,
}

/// Splits extracted text into overlapping, metadata-tagged chunks.
#[derive(Debug, Clone)]
pub struct Chunker {
    target_tokens: usize,
    overlap_words: usize,
}

impl Default for Chunker {
    fn default() -> Self {
        Self::new(DEFAULT_TARGET_TOKENS, DEFAULT_OVERLAP_WORDS)
    }
}

impl Chunker {
    /// Create a chunker with an explicit token target and word overlap.
    pub fn new(target_tokens: usize, overlap_words: usize) -> Self {
        Self {
            target_tokens,
            overlap_words,
        }
    }

    /// Chunk `text`, attributing pages from ascending break offsets.
    ///
    /// Paragraphs are accumulated until the token estimate passes the
    /// target; the open chunk is then closed and the next one is seeded
    /// with its trailing words plus the paragraph that tipped the estimate.
    /// Deterministic: equal inputs yield equal output.
    pub fn chunk(&self, text: &str, page_breaks: &[usize]) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        let mut current = String::new();
        let mut current_index = 0usize;
        let mut chunk_start = 0usize;

        for paragraph in split_paragraphs(text) {
            let estimated_tokens = (current.len() + paragraph.len()) as f64 / 4.0;

            if estimated_tokens > self.target_tokens as f64 && !current.is_empty() {
                push_chunk(
                    &mut chunks,
                    &current,
                    chunk_start,
                    current_index,
                    page_breaks,
                );

                let mut seeded = last_words(&current, self.overlap_words);
                seeded.push(' ');
                seeded.push_str(paragraph);
                // The seed reaches backwards from the paragraph start; clamp
                // rather than underflow when the overlap covers everything.
                chunk_start = current_index.saturating_sub(seeded.len());
                current = seeded;
            } else {
                if !current.is_empty() {
                    current.push(' ');
                }
                current.push_str(paragraph);
            }

            current_index += paragraph.len() + 2;
        }

        if !current.is_empty() {
            push_chunk(
                &mut chunks,
                &current,
                chunk_start,
                current_index,
                page_breaks,
            );
        }

        chunks
    }
}

fn push_chunk(
    chunks: &mut Vec<Chunk>,
    raw: &str,
    start_index: usize,
    end_index: usize,
    page_breaks: &[usize],
) {
    let content = raw.trim();
    if content.is_empty() {
        return;
    }
    chunks.push(Chunk {
        content: content.to_string(),
        start_index,
        end_index,
        page_number: page_number_at(start_index, page_breaks),
        section: detect_section(raw),
    });
}

/// Split on blank-line boundaries: a newline, optional whitespace, and a
/// second newline. The boundary ends at the last newline of the whitespace
/// run, so indentation after a blank line stays with the next paragraph.
fn split_paragraphs(text: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut piece_start = 0usize;
    let mut chars = text.char_indices().peekable();

    while let Some((offset, ch)) = chars.next() {
        if ch != '\n' {
            continue;
        }
        let mut last_newline = offset;
        while let Some(&(next_offset, next_ch)) = chars.peek() {
            if !next_ch.is_whitespace() {
                break;
            }
            if next_ch == '\n' {
                last_newline = next_offset;
            }
            chars.next();
        }
        if last_newline > offset {
            pieces.push(&text[piece_start..offset]);
            piece_start = last_newline + 1;
        }
    }

    pieces.push(&text[piece_start..]);
    pieces
}

/// Last `count` space-separated words, preserving any interior newlines.
fn last_words(text: &str, count: usize) -> String {
    let words: Vec<&str> = text.split(' ').collect();
    let start = words.len().saturating_sub(count);
    words[start..].join(" ")
}

/// 1-based index of the first break strictly past `start_index`.
fn page_number_at(start_index: usize, page_breaks: &[usize]) -> Option<u32> {
    page_breaks
        .iter()
        .position(|&break_offset| start_index < break_offset)
        .map(|index| index as u32 + 1)
}

fn detect_section(text: &str) -> Option<String> {
    text.lines()
        .map(str::trim)
        .find(|line| is_heading(line))
        .map(str::to_string)
}

/// Heading shapes: `12. Title`, `Chapter 1:`, `Section A` (case-insensitive
/// keyword), each requiring whitespace and then a word character.
fn is_heading(line: &str) -> bool {
    let Some(rest) = heading_marker_rest(line) else {
        return false;
    };
    let body = rest.trim_start();
    body.len() < rest.len()
        && body
            .chars()
            .next()
            .is_some_and(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}

fn heading_marker_rest(line: &str) -> Option<&str> {
    let digits = line.chars().take_while(char::is_ascii_digit).count();
    if digits > 0 && line[digits..].starts_with('.') {
        return Some(&line[digits + 1..]);
    }
    for keyword in ["chapter", "section"] {
        if let Some(prefix) = line.get(..keyword.len())
            && prefix.eq_ignore_ascii_case(keyword)
        {
            return Some(&line[keyword.len()..]);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(range: std::ops::Range<usize>) -> Vec<String> {
        range.map(|index| format!("w{index:03}")).collect()
    }

    /// Nine 100-word paragraphs of 4-character words, blank-line separated.
    fn long_text() -> String {
        let paragraphs: Vec<String> = (0..9)
            .map(|paragraph| words(paragraph * 100..(paragraph + 1) * 100).join(" "))
            .collect();
        paragraphs.join("\n\n")
    }

    #[test]
    fn short_text_yields_single_chunk() {
        let chunks = Chunker::default().chunk("Para one.\n\nPara two.", &[]);

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "Para one. Para two.");
        assert_eq!(chunks[0].start_index, 0);
        assert_eq!(chunks[0].end_index, 22);
        assert_eq!(chunks[0].page_number, None);
        assert_eq!(chunks[0].section, None);
    }

    #[test]
    fn empty_and_whitespace_input_yield_no_chunks() {
        let chunker = Chunker::default();
        assert!(chunker.chunk("", &[]).is_empty());
        assert!(chunker.chunk("   \n  ", &[]).is_empty());
    }

    #[test]
    fn oversized_paragraph_is_never_split() {
        let text = "x".repeat(4000);
        let chunks = Chunker::default().chunk(&text, &[]);

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content.len(), 4000);
        assert_eq!(chunks[0].end_index, 4002);
    }

    #[test]
    fn long_text_produces_overlapping_chunks() {
        let chunks = Chunker::default().chunk(&long_text(), &[]);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].content, words(0..600).join(" "));
        assert_eq!(chunks[1].content, words(500..900).join(" "));

        // Trailing hundred words of the first chunk open the second.
        let tail = last_words(&chunks[0].content, DEFAULT_OVERLAP_WORDS);
        assert!(chunks[1].content.starts_with(&tail));

        assert_eq!(chunks[0].start_index, 0);
        assert_eq!(chunks[0].end_index, 3006);
        assert_eq!(chunks[1].start_index, 2007);
        assert_eq!(chunks[1].end_index, 4509);
    }

    #[test]
    fn chunking_is_deterministic() {
        let text = long_text();
        let chunker = Chunker::default();
        assert_eq!(chunker.chunk(&text, &[10, 500]), chunker.chunk(&text, &[10, 500]));
    }

    #[test]
    fn overlap_seed_start_clamps_at_zero() {
        // One giant unbroken paragraph overlaps entirely into the next chunk.
        let first = "y".repeat(5000);
        let text = format!("{first}\n\nA short follow-up paragraph.");
        let chunks = Chunker::default().chunk(&text, &[]);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].start_index, 0);
        assert_eq!(chunks[0].end_index, 5002);
        assert_eq!(chunks[1].start_index, 0);
        assert!(chunks[1].content.starts_with(&first));
    }

    #[test]
    fn content_is_trimmed_but_offsets_are_raw() {
        let chunks = Chunker::default().chunk("  Hello world.  \n\nNext.", &[]);

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "Hello world.   Next.");
        assert_eq!(chunks[0].start_index, 0);
        assert_eq!(chunks[0].end_index, 25);
    }

    #[test]
    fn section_detected_from_numbered_heading() {
        let text = "1. Introduction\nAn opening overview of the material.";
        let chunks = Chunker::default().chunk(text, &[]);

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].section.as_deref(), Some("1. Introduction"));
    }

    #[test]
    fn section_detected_on_oversized_input() {
        let text = format!("1. Introduction\n{}", long_text());
        let chunks = Chunker::default().chunk(&text, &[]);

        assert!(chunks.len() >= 2);
        assert_eq!(chunks[0].section.as_deref(), Some("1. Introduction"));
    }

    #[test]
    fn heading_shapes_match_expected_patterns() {
        assert!(is_heading("1. Introduction"));
        assert!(is_heading("12. 34"));
        assert!(is_heading("Chapter 1: Beginnings"));
        assert!(is_heading("section\t\tA"));
        assert!(!is_heading("Chapters 5 and 6 share themes"));
        assert!(!is_heading("1.5 Results improved"));
        assert!(!is_heading("1.Introduction"));
        assert!(!is_heading("No heading here"));
        assert!(!is_heading(""));
    }

    #[test]
    fn page_number_uses_first_break_past_start() {
        assert_eq!(page_number_at(0, &[10, 20]), Some(1));
        assert_eq!(page_number_at(9, &[10, 20]), Some(1));
        assert_eq!(page_number_at(10, &[10, 20]), Some(2));
        assert_eq!(page_number_at(25, &[10, 20]), None);
        assert_eq!(page_number_at(5, &[]), None);
    }

    #[test]
    fn chunks_carry_page_numbers_from_breaks() {
        let text = "Alpha content here.\nBeta content there.";
        let chunks = Chunker::default().chunk(text, &[19, 39]);

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].page_number, Some(1));
    }

    #[test]
    fn blank_line_variants_split_paragraphs() {
        assert_eq!(split_paragraphs("a\n\nb"), vec!["a", "b"]);
        assert_eq!(split_paragraphs("a\n \t \nb"), vec!["a", "b"]);
        assert_eq!(split_paragraphs("a\n\n\n\nb"), vec!["a", "b"]);
        assert_eq!(split_paragraphs("a\n\n  b"), vec!["a", "  b"]);
        assert_eq!(split_paragraphs("a\nb"), vec!["a\nb"]);
        assert_eq!(split_paragraphs("\n\na"), vec!["", "a"]);
        assert_eq!(split_paragraphs(""), vec![""]);
    }

    #[test]
    fn last_words_keeps_trailing_tokens() {
        assert_eq!(last_words("one two three", 2), "two three");
        assert_eq!(last_words("one two three", 10), "one two three");
        assert_eq!(last_words("solid", 3), "solid");
    }
}
