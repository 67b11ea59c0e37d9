//! Text chunking strategies for large documents

use crate::config::ChunkStrategy;

/// Chunks text according to the specified strategy
///
/// Every chunk is at most `max_chunk_size` bytes and splits only fall on
/// UTF-8 character boundaries.
pub struct TextChunker {
    strategy: ChunkStrategy,
    max_chunk_size: usize,
}

impl TextChunker {
    /// Create a new text chunker
    pub fn new(strategy: ChunkStrategy, max_chunk_size: usize) -> Self {
        Self {
            strategy,
            max_chunk_size: max_chunk_size.max(1),
        }
    }

    /// Chunk the given text
    pub fn chunk(&self, text: &str) -> Vec<String> {
        if text.len() <= self.max_chunk_size {
            return vec![text.to_string()];
        }

        let chunks = match self.strategy {
            ChunkStrategy::ByParagraph => self.chunk_by_paragraph(text),
            ChunkStrategy::BySection => self.chunk_by_section(text),
            ChunkStrategy::BySentence => self.chunk_by_sentence(text),
        };

        chunks.into_iter().filter(|c| !c.trim().is_empty()).collect()
    }

    /// Chunk by paragraphs (double newlines)
    fn chunk_by_paragraph(&self, text: &str) -> Vec<String> {
        let paragraphs: Vec<&str> = text.split("\n\n").collect();
        self.combine_until_limit(paragraphs, "\n\n")
    }

    /// Chunk by sections (markdown headers or numbered sections)
    fn chunk_by_section(&self, text: &str) -> Vec<String> {
        let mut sections = Vec::new();
        let mut current_section = String::new();

        for line in text.lines() {
            let trimmed = line.trim_start();
            let is_section_header = trimmed.starts_with('#')
                || (trimmed.chars().next().is_some_and(|c| c.is_ascii_digit())
                    && trimmed.contains(". "));

            if is_section_header && !current_section.trim().is_empty() {
                sections.push(current_section.trim().to_string());
                current_section.clear();
            }

            current_section.push_str(line);
            current_section.push('\n');
        }

        if !current_section.trim().is_empty() {
            sections.push(current_section.trim().to_string());
        }

        if sections.len() <= 1 {
            self.chunk_by_paragraph(text)
        } else {
            self.combine_until_limit(sections, "\n\n")
        }
    }

    /// Chunk at sentence boundaries, keeping the terminating punctuation
    fn chunk_by_sentence(&self, text: &str) -> Vec<String> {
        let mut sentences = Vec::new();
        let mut start = 0;
        for (idx, c) in text.char_indices() {
            if matches!(c, '.' | '!' | '?') {
                let end = idx + c.len_utf8();
                sentences.push(text[start..end].trim());
                start = end;
            }
        }
        if start < text.len() {
            sentences.push(text[start..].trim());
        }

        let sentences: Vec<&str> = sentences.into_iter().filter(|s| !s.is_empty()).collect();
        if sentences.is_empty() {
            return self.split_at_limit(text);
        }

        self.combine_until_limit(sentences, " ")
    }

    /// Combine elements until they reach the size limit
    fn combine_until_limit<S: AsRef<str>>(&self, elements: Vec<S>, separator: &str) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut current_chunk = String::new();

        for element in elements {
            let element_str = element.as_ref().trim();
            if element_str.is_empty() {
                continue;
            }

            let needed = if current_chunk.is_empty() {
                element_str.len()
            } else {
                current_chunk.len() + separator.len() + element_str.len()
            };

            if needed <= self.max_chunk_size {
                if !current_chunk.is_empty() {
                    current_chunk.push_str(separator);
                }
                current_chunk.push_str(element_str);
                continue;
            }

            if !current_chunk.is_empty() {
                chunks.push(std::mem::take(&mut current_chunk));
            }

            if element_str.len() > self.max_chunk_size {
                chunks.extend(self.split_at_limit(element_str));
            } else {
                current_chunk.push_str(element_str);
            }
        }

        if !current_chunk.is_empty() {
            chunks.push(current_chunk);
        }

        chunks
    }

    /// Split text into pieces of at most `max_chunk_size` bytes
    fn split_at_limit(&self, text: &str) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut start = 0;

        while start < text.len() {
            let mut end = (start + self.max_chunk_size).min(text.len());
            while !text.is_char_boundary(end) {
                end -= 1;
            }
            // A single character wider than the limit still has to go somewhere
            if end == start {
                end = start
                    + text[start..]
                        .chars()
                        .next()
                        .map_or(text.len() - start, char::len_utf8);
            }
            chunks.push(text[start..end].to_string());
            start = end;
        }

        chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_chunking_needed_for_small_text() {
        let chunker = TextChunker::new(ChunkStrategy::ByParagraph, 100);
        let text = "Short text here.";
        assert_eq!(chunker.chunk(text), vec![text.to_string()]);
    }

    #[test]
    fn test_chunk_by_paragraph() {
        let chunker = TextChunker::new(ChunkStrategy::ByParagraph, 50);
        let text = "First paragraph here.\n\nSecond paragraph here.\n\nThird paragraph here.";
        let chunks = chunker.chunk(text);

        assert_eq!(
            chunks,
            vec![
                "First paragraph here.\n\nSecond paragraph here.".to_string(),
                "Third paragraph here.".to_string(),
            ]
        );
        for chunk in &chunks {
            assert!(chunk.len() <= 50);
        }
    }

    #[test]
    fn test_chunk_by_section_with_markdown() {
        let chunker = TextChunker::new(ChunkStrategy::BySection, 30);
        let text = "# Section 1\nContent one\n# Section 2\nContent two";
        let chunks = chunker.chunk(text);

        assert_eq!(chunks.len(), 2);
        assert!(chunks[0].contains("Section 1"));
        assert!(chunks[1].contains("Section 2"));
    }

    #[test]
    fn test_chunk_by_section_with_numbered() {
        let chunker = TextChunker::new(ChunkStrategy::BySection, 30);
        let text = "1. First section\nContent\n2. Second section\nMore content";
        let chunks = chunker.chunk(text);

        assert_eq!(chunks.len(), 2);
        assert!(chunks[1].starts_with("2. Second section"));
    }

    #[test]
    fn test_section_fallback_to_paragraph() {
        let chunker = TextChunker::new(ChunkStrategy::BySection, 20);
        let text = "Just text\n\nWith paragraphs\n\nBut no sections";
        let chunks = chunker.chunk(text);

        assert_eq!(chunks.len(), 3);
    }

    #[test]
    fn test_chunk_by_sentence() {
        let chunker = TextChunker::new(ChunkStrategy::BySentence, 45);
        let text = "First sentence here. Second sentence here! Third sentence here?";
        let chunks = chunker.chunk(text);

        assert_eq!(
            chunks,
            vec![
                "First sentence here. Second sentence here!".to_string(),
                "Third sentence here?".to_string(),
            ]
        );
    }

    #[test]
    fn test_empty_text() {
        let chunker = TextChunker::new(ChunkStrategy::ByParagraph, 100);
        assert_eq!(chunker.chunk(""), vec![String::new()]);
    }

    #[test]
    fn test_very_long_single_paragraph() {
        let chunker = TextChunker::new(ChunkStrategy::ByParagraph, 20);
        let text = "a".repeat(100);
        let chunks = chunker.chunk(&text);

        assert_eq!(chunks.len(), 5);
        assert!(chunks.iter().all(|c| c.len() == 20));
    }

    #[test]
    fn test_split_respects_char_boundaries() {
        let chunker = TextChunker::new(ChunkStrategy::ByParagraph, 5);
        // Each 'é' is two bytes
        let text = "éééééééééé";
        let chunks = chunker.chunk(text);

        assert_eq!(chunks.concat(), text);
        assert!(chunks.iter().all(|c| c.len() <= 5));
    }

    #[test]
    fn test_chunks_preserve_all_words() {
        let chunker = TextChunker::new(ChunkStrategy::ByParagraph, 40);
        let text =
            "Marie Curie was born in Warsaw.\n\nShe moved to Paris.\n\nShe married Pierre Curie.";
        let joined = chunker.chunk(text).join(" ");
        for word in text.split_whitespace() {
            assert!(joined.contains(word), "missing word {}", word);
        }
    }
}
