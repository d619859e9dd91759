/// Recursive character splitter
///
/// Splits on the first separator present in the text, recursing into pieces
/// that are still too long with the remaining separators, then greedily
/// merges the pieces back into chunks of at most `chunk_size` characters
/// that share up to `chunk_overlap` characters with their predecessor.
#[derive(Debug, Clone)]
pub struct RecursiveSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

impl Default for RecursiveSplitter {
    fn default() -> Self {
        Self::new(1000, 200)
    }
}

impl RecursiveSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size,
            chunk_overlap: chunk_overlap.min(chunk_size),
            separators: ["\n\n", "\n", " ", ""].iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn split(&self, text: &str) -> Vec<String> {
        self.split_with(text, &self.separators)
    }

    fn split_with(&self, text: &str, separators: &[String]) -> Vec<String> {
        let mut separator = separators.last().map(String::as_str).unwrap_or("");
        let mut remaining: &[String] = &[];
        for (i, candidate) in separators.iter().enumerate() {
            if candidate.is_empty() {
                separator = "";
                break;
            }
            if text.contains(candidate.as_str()) {
                separator = candidate;
                remaining = &separators[i + 1..];
                break;
            }
        }

        let mut chunks = Vec::new();
        let mut short: Vec<&str> = Vec::new();
        for piece in split_on(text, separator) {
            if char_len(piece) < self.chunk_size {
                short.push(piece);
                continue;
            }

            if !short.is_empty() {
                chunks.extend(self.merge(&short, separator));
                short.clear();
            }
            if remaining.is_empty() {
                chunks.push(piece.to_string());
            } else {
                chunks.extend(self.split_with(piece, remaining));
            }
        }

        if !short.is_empty() {
            chunks.extend(self.merge(&short, separator));
        }

        chunks
    }

    fn merge(&self, pieces: &[&str], separator: &str) -> Vec<String> {
        let separator_len = char_len(separator);
        let mut chunks = Vec::new();
        let mut current: Vec<&str> = Vec::new();
        let mut total = 0;

        for &piece in pieces {
            let len = char_len(piece);
            let joiner = if current.is_empty() { 0 } else { separator_len };

            if total + len + joiner > self.chunk_size && !current.is_empty() {
                push_chunk(&mut chunks, &current, separator);

                // Drop from the front until the kept tail fits the overlap
                while !current.is_empty()
                    && (total > self.chunk_overlap
                        || total + len + separator_len > self.chunk_size)
                {
                    let dropped = char_len(current[0])
                        + if current.len() > 1 { separator_len } else { 0 };
                    total -= dropped;
                    current.remove(0);
                }
            }

            let joiner = if current.is_empty() { 0 } else { separator_len };
            current.push(piece);
            total += len + joiner;
        }

        push_chunk(&mut chunks, &current, separator);
        chunks
    }
}

fn push_chunk(chunks: &mut Vec<String>, parts: &[&str], separator: &str) {
    let chunk = parts.join(separator);
    let chunk = chunk.trim();
    if !chunk.is_empty() {
        chunks.push(chunk.to_string());
    }
}

fn split_on<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    if separator.is_empty() {
        text.char_indices()
            .map(|(i, c)| &text[i..i + c.len_utf8()])
            .collect()
    } else {
        text.split(separator).filter(|piece| !piece.is_empty()).collect()
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_is_one_chunk() {
        let splitter = RecursiveSplitter::default();
        assert_eq!(splitter.split("Hello world"), vec!["Hello world"]);
    }

    #[test]
    fn test_empty_text() {
        assert!(RecursiveSplitter::default().split("").is_empty());
    }

    #[test]
    fn test_chunks_respect_size_and_overlap() {
        let splitter = RecursiveSplitter::new(10, 4);
        let chunks = splitter.split("aa bb cc dd ee ff gg");

        assert_eq!(chunks, vec!["aa bb cc", "cc dd ee", "ee ff gg"]);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 10);
        }
    }

    #[test]
    fn test_paragraphs_split_first() {
        let splitter = RecursiveSplitter::new(12, 0);
        let chunks = splitter.split("first para\n\nsecond one");
        assert_eq!(chunks, vec!["first para", "second one"]);
    }

    #[test]
    fn test_long_word_falls_back_to_characters() {
        let splitter = RecursiveSplitter::new(4, 0);
        assert_eq!(splitter.split("abcdefghij"), vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_multibyte_text() {
        let splitter = RecursiveSplitter::new(3, 0);
        assert_eq!(splitter.split("héllo"), vec!["hél", "lo"]);
    }
}
