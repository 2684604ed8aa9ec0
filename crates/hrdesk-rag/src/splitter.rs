//! Recursive character splitter.
//!
//! Splits on the coarsest separator present in the text (paragraph, line,
//! word, then individual characters), recursing into any piece that is still
//! too long, and finally merges neighbouring pieces back into chunks of at
//! most `chunk_size` characters with up to `chunk_overlap` characters carried
//! over from the previous chunk. Separators stay attached to the start of the
//! piece that follows them, so joining pieces reproduces the source text.
//!
//! All lengths are counted in `char`s, not bytes.

use crate::error::RagError;
use crate::types::{Chunk, Page};

pub const DEFAULT_CHUNK_SIZE: usize = 1000;
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;
const DEFAULT_SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

#[derive(Debug, Clone)]
pub struct RecursiveTextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

impl Default for RecursiveTextSplitter {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl RecursiveTextSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self, RagError> {
        if chunk_size == 0 {
            return Err(RagError::Config("chunk_size must be greater than zero".into()));
        }
        if chunk_overlap > chunk_size {
            return Err(RagError::Config(format!(
                "chunk_overlap ({chunk_overlap}) is larger than chunk_size ({chunk_size})"
            )));
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
            ..Self::default()
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Split every page, keeping the page's source and index on each chunk.
    pub fn split_pages(&self, pages: &[Page]) -> Vec<Chunk> {
        pages
            .iter()
            .flat_map(|page| {
                self.split_text(&page.content)
                    .into_iter()
                    .map(move |content| Chunk {
                        content,
                        source: page.source.clone(),
                        page: page.page,
                    })
            })
            .collect()
    }

    pub fn split_text(&self, text: &str) -> Vec<String> {
        self.split_recursive(text, &self.separators)
    }

    fn split_recursive(&self, text: &str, separators: &[String]) -> Vec<String> {
        // The empty separator always matches, so this falls back to chars.
        let (separator, rest) = separators
            .iter()
            .position(|s| s.is_empty() || text.contains(s.as_str()))
            .map(|i| (separators[i].as_str(), &separators[i + 1..]))
            .unwrap_or(("", &[]));

        let mut chunks = Vec::new();
        let mut pending: Vec<&str> = Vec::new();

        for piece in split_keep_separator(text, separator) {
            if char_len(piece) < self.chunk_size {
                pending.push(piece);
                continue;
            }
            if !pending.is_empty() {
                chunks.extend(self.merge(&pending));
                pending.clear();
            }
            if rest.is_empty() {
                if let Some(piece) = non_empty_trimmed(piece) {
                    chunks.push(piece);
                }
            } else {
                chunks.extend(self.split_recursive(piece, rest));
            }
        }
        if !pending.is_empty() {
            chunks.extend(self.merge(&pending));
        }
        chunks
    }

    /// Greedily pack pieces into chunks, keeping a tail of the previous chunk
    /// (at most `chunk_overlap` chars) at the start of the next.
    fn merge(&self, pieces: &[&str]) -> Vec<String> {
        let mut out = Vec::new();
        let mut window: Vec<(&str, usize)> = Vec::new();
        let mut total = 0usize;

        for &piece in pieces {
            let len = char_len(piece);
            if total + len > self.chunk_size && !window.is_empty() {
                if let Some(chunk) = join_window(&window) {
                    out.push(chunk);
                }
                while total > self.chunk_overlap
                    || (total + len > self.chunk_size && total > 0)
                {
                    let (_, front) = window.remove(0);
                    total -= front;
                }
            }
            window.push((piece, len));
            total += len;
        }
        if let Some(chunk) = join_window(&window) {
            out.push(chunk);
        }
        out
    }
}

fn split_keep_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    if separator.is_empty() {
        return text
            .char_indices()
            .map(|(i, c)| &text[i..i + c.len_utf8()])
            .collect();
    }
    let mut out = Vec::new();
    let mut start = 0;
    for (idx, _) in text.match_indices(separator) {
        if idx > start {
            out.push(&text[start..idx]);
        }
        start = idx;
    }
    if start < text.len() {
        out.push(&text[start..]);
    }
    out
}

fn join_window(window: &[(&str, usize)]) -> Option<String> {
    let joined: String = window.iter().map(|(piece, _)| *piece).collect();
    non_empty_trimmed(&joined)
}

fn non_empty_trimmed(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_a_single_chunk() {
        let splitter = RecursiveTextSplitter::default();
        assert_eq!(splitter.split_text("  Annual leave policy.  "), vec!["Annual leave policy."]);
    }

    #[test]
    fn empty_or_blank_text_yields_nothing() {
        let splitter = RecursiveTextSplitter::default();
        assert!(splitter.split_text("").is_empty());
        assert!(splitter.split_text(" \n\n \n").is_empty());
    }

    #[test]
    fn paragraphs_are_packed_up_to_chunk_size() {
        let splitter = RecursiveTextSplitter::new(30, 0).unwrap();
        let text = "first paragraph\n\nsecond one\n\nthird paragraph here";
        let chunks = splitter.split_text(text);
        assert_eq!(chunks, vec!["first paragraph\n\nsecond one", "third paragraph here"]);
    }

    #[test]
    fn chunks_never_exceed_chunk_size() {
        let splitter = RecursiveTextSplitter::new(50, 10).unwrap();
        let text = "word ".repeat(200) + &"x".repeat(170);
        for chunk in splitter.split_text(&text) {
            assert!(chunk.chars().count() <= 50, "chunk too long: {}", chunk.len());
        }
    }

    #[test]
    fn consecutive_chunks_overlap() {
        let splitter = RecursiveTextSplitter::new(20, 8).unwrap();
        let text = "aa bb cc dd ee ff gg hh ii jj kk ll";
        let chunks = splitter.split_text(text);
        assert!(chunks.len() > 1);
        assert_eq!(chunks[0], "aa bb cc dd ee ff gg");
        assert_eq!(chunks[1], "ff gg hh ii jj kk");
        for pair in chunks.windows(2) {
            let first_word = pair[1].split(' ').next().unwrap();
            assert!(pair[0].contains(first_word), "{:?} does not overlap {:?}", pair[1], pair[0]);
        }
    }

    #[test]
    fn unbroken_text_falls_back_to_characters() {
        let splitter = RecursiveTextSplitter::new(10, 0).unwrap();
        let chunks = splitter.split_text(&"z".repeat(25));
        assert_eq!(chunks, vec!["z".repeat(10), "z".repeat(10), "z".repeat(5)]);
    }

    #[test]
    fn multibyte_text_is_measured_in_chars() {
        let splitter = RecursiveTextSplitter::new(4, 0).unwrap();
        let chunks = splitter.split_text("äöüßäöüß");
        assert_eq!(chunks, vec!["äöüß", "äöüß"]);
    }

    #[test]
    fn overlap_larger_than_size_is_rejected() {
        assert!(matches!(RecursiveTextSplitter::new(10, 11), Err(RagError::Config(_))));
        assert!(matches!(RecursiveTextSplitter::new(0, 0), Err(RagError::Config(_))));
    }

    #[test]
    fn split_pages_keeps_page_metadata() {
        let splitter = RecursiveTextSplitter::new(12, 0).unwrap();
        let pages = vec![Page {
            content: "one two three four".into(),
            source: "Handbook".into(),
            page: 3,
        }];
        let chunks = splitter.split_pages(&pages);
        assert!(chunks.len() >= 2);
        assert!(chunks.iter().all(|c| c.source == "Handbook" && c.page == 3));
    }

    #[test]
    fn separator_stays_with_following_piece() {
        assert_eq!(split_keep_separator("a\n\nb\n\nc", "\n\n"), vec!["a", "\n\nb", "\n\nc"]);
        assert_eq!(split_keep_separator("\n\nx", "\n\n"), vec!["\n\nx"]);
    }
}
