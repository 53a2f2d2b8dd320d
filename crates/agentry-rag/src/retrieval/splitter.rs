//! Text splitters
//!
//! Both splitters measure length in characters and merge small pieces into
//! chunks of at most `chunk_size`, carrying up to `chunk_overlap` characters
//! of trailing pieces into the next chunk.

use super::document::Document;
use crate::error::{RagError, RagResult};
use tracing::warn;

/// Splits text into chunks
pub trait TextSplitter: Send + Sync {
    /// Split one text
    fn split_text(&self, text: &str) -> Vec<String>;

    /// Split documents, copying each document's metadata onto its chunks
    fn split_documents(&self, documents: &[Document]) -> Vec<Document> {
        documents
            .iter()
            .flat_map(|doc| {
                self.split_text(&doc.content).into_iter().map(|chunk| Document {
                    content: chunk,
                    metadata: doc.metadata.clone(),
                })
            })
            .collect()
    }
}

fn check_sizes(chunk_size: usize, chunk_overlap: usize) -> RagResult<()> {
    if chunk_size == 0 {
        return Err(RagError::validation("chunk_size", "must be positive", "0"));
    }
    if chunk_overlap > chunk_size {
        return Err(RagError::validation(
            "chunk_overlap",
            "must not exceed chunk_size",
            format!("{} > {}", chunk_overlap, chunk_size),
        ));
    }
    Ok(())
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn split_on<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    if separator.is_empty() {
        text.char_indices()
            .map(|(i, c)| &text[i..i + c.len_utf8()])
            .collect()
    } else {
        text.split(separator).filter(|s| !s.is_empty()).collect()
    }
}

/// Greedy merge of `splits` into chunks joined by `separator`
fn merge_splits(splits: &[&str], separator: &str, chunk_size: usize, chunk_overlap: usize) -> Vec<String> {
    let sep_len = char_len(separator);
    let mut chunks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut total = 0usize;

    let join = |parts: &[&str]| -> Option<String> {
        let joined = parts.join(separator);
        let trimmed = joined.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    };

    for &piece in splits {
        let len = char_len(piece);
        let joiner = if current.is_empty() { 0 } else { sep_len };

        if total + len + joiner > chunk_size {
            if total > chunk_size {
                warn!(
                    size = total,
                    chunk_size, "Created a chunk longer than the configured chunk size"
                );
            }
            if !current.is_empty() {
                chunks.extend(join(&current));

                // Slide the window until it fits the overlap budget
                loop {
                    let joiner = if current.is_empty() { 0 } else { sep_len };
                    let too_long = total > 0 && total + len + joiner > chunk_size;
                    if current.is_empty() || (total <= chunk_overlap && !too_long) {
                        break;
                    }
                    let first = char_len(current[0]) + if current.len() > 1 { sep_len } else { 0 };
                    total = total.saturating_sub(first);
                    current.remove(0);
                }
            }
        }

        current.push(piece);
        total += len + if current.len() > 1 { sep_len } else { 0 };
    }

    chunks.extend(join(&current));
    chunks
}

/// Splits on a single separator, then merges pieces up to `chunk_size`
#[derive(Debug, Clone)]
pub struct CharacterTextSplitter {
    separator: String,
    chunk_size: usize,
    chunk_overlap: usize,
}

impl CharacterTextSplitter {
    /// Splitter on blank lines
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> RagResult<Self> {
        check_sizes(chunk_size, chunk_overlap)?;
        Ok(Self {
            separator: "\n\n".to_string(),
            chunk_size,
            chunk_overlap,
        })
    }

    /// Use a different separator
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }
}

impl TextSplitter for CharacterTextSplitter {
    fn split_text(&self, text: &str) -> Vec<String> {
        let splits = split_on(text, &self.separator);
        merge_splits(&splits, &self.separator, self.chunk_size, self.chunk_overlap)
    }
}

/// Splits on paragraph, line, word, then character boundaries as needed
#[derive(Debug, Clone)]
pub struct RecursiveCharacterTextSplitter {
    separators: Vec<String>,
    chunk_size: usize,
    chunk_overlap: usize,
}

impl RecursiveCharacterTextSplitter {
    /// Splitter with the default separators
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> RagResult<Self> {
        check_sizes(chunk_size, chunk_overlap)?;
        Ok(Self {
            separators: ["\n\n", "\n", " ", ""].iter().map(|s| s.to_string()).collect(),
            chunk_size,
            chunk_overlap,
        })
    }

    /// Replace the separator list, tried in order
    pub fn with_separators(mut self, separators: Vec<String>) -> Self {
        self.separators = separators;
        self
    }

    fn split_recursive(&self, text: &str, separators: &[String]) -> Vec<String> {
        let mut separator = separators.last().map(String::as_str).unwrap_or("");
        let mut remaining: &[String] = &[];

        for (i, candidate) in separators.iter().enumerate() {
            if candidate.is_empty() {
                separator = "";
                break;
            }
            if text.contains(candidate.as_str()) {
                separator = candidate.as_str();
                remaining = &separators[i + 1..];
                break;
            }
        }

        let mut chunks = Vec::new();
        let mut fitting: Vec<&str> = Vec::new();

        for piece in split_on(text, separator) {
            if char_len(piece) < self.chunk_size {
                fitting.push(piece);
                continue;
            }

            if !fitting.is_empty() {
                chunks.extend(merge_splits(&fitting, separator, self.chunk_size, self.chunk_overlap));
                fitting.clear();
            }

            if remaining.is_empty() {
                chunks.push(piece.to_string());
            } else {
                chunks.extend(self.split_recursive(piece, remaining));
            }
        }

        if !fitting.is_empty() {
            chunks.extend(merge_splits(&fitting, separator, self.chunk_size, self.chunk_overlap));
        }
        chunks
    }
}

impl TextSplitter for RecursiveCharacterTextSplitter {
    fn split_text(&self, text: &str) -> Vec<String> {
        self.split_recursive(text, &self.separators)
    }
}

/// Split markdown before every `\n##` heading
///
/// The first section is whatever precedes the first heading.
pub fn split_markdown_sections(text: &str) -> Vec<String> {
    let mut sections = Vec::new();
    let mut start = 0;

    for (pos, _) in text.match_indices("\n##") {
        if pos > start {
            sections.push(text[start..pos].to_string());
        }
        start = pos;
    }
    if start < text.len() {
        sections.push(text[start..].to_string());
    }
    sections
}
