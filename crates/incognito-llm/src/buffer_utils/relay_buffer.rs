/// Line buffer for relaying a chunked upstream body
///
/// Holds the bytes of the trailing, not yet terminated line. Splitting happens
/// on raw bytes so a multi-byte character cut in half by the network is only
/// decoded once its line is complete.
#[derive(Debug, Default)]
pub struct RelayBuffer {
    pending: Vec<u8>,
}

impl RelayBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pending: Vec::with_capacity(capacity),
        }
    }

    /// Feed one chunk, returning every line it completed
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        let (pending, lines) = transition(std::mem::take(&mut self.pending), chunk);
        self.pending = pending;
        lines
    }

    /// Consume the buffer, returning the unterminated tail if it holds text
    pub fn finish(self) -> Option<String> {
        normalize_line(&self.pending)
    }

    /// Bytes waiting for a line ending
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Pure step of the relay: `(pending, chunk) -> (pending', completed lines)`
///
/// `\n`, `\r` and `\r\n` all end a line. Lines are trimmed; blank lines are
/// dropped, so a `\r\n` cut between two chunks frames the same as a whole one.
/// `pending` never holds a terminator, so only the new bytes are scanned.
pub fn transition(mut pending: Vec<u8>, chunk: &[u8]) -> (Vec<u8>, Vec<String>) {
    let scan_from = pending.len();
    pending.extend_from_slice(chunk);

    let mut lines = Vec::new();
    let mut start = 0;

    for (offset, byte) in pending[scan_from..].iter().enumerate() {
        if is_line_end(*byte) {
            let idx = scan_from + offset;
            if let Some(line) = normalize_line(&pending[start..idx]) {
                lines.push(line);
            }
            start = idx + 1;
        }
    }

    let rest = pending.split_off(start);
    (rest, lines)
}

fn is_line_end(byte: u8) -> bool {
    byte == b'\n' || byte == b'\r'
}

fn normalize_line(bytes: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(bytes);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_basic() {
        let (pending, lines) = transition(Vec::new(), b"line1\nline2\n");
        assert_eq!(lines, vec!["line1", "line2"]);
        assert!(pending.is_empty());
    }

    #[test]
    fn test_partial_line() {
        let mut buffer = RelayBuffer::new();

        assert!(buffer.push(b"partial").is_empty());
        assert_eq!(buffer.len(), 7);

        assert_eq!(buffer.push(b" line\nnext"), vec!["partial line"]);
        assert_eq!(buffer.finish(), Some("next".to_string()));
    }

    #[test]
    fn test_blank_and_crlf_lines() {
        let (_, lines) = transition(Vec::new(), b"a\r\n\r\n\n  b  \n");
        assert_eq!(lines, vec!["a", "b"]);
    }

    #[test]
    fn test_bare_carriage_returns_end_lines() {
        let (pending, lines) = transition(Vec::new(), b"a\rb\r\nc\rd");
        assert_eq!(lines, vec!["a", "b", "c"]);
        assert_eq!(pending, b"d");
    }

    #[test]
    fn test_crlf_cut_between_chunks() {
        let mut buffer = RelayBuffer::new();
        assert_eq!(buffer.push(b"one\r"), vec!["one"]);
        assert!(buffer.push(b"\ntwo").is_empty());
        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.finish(), Some("two".to_string()));
    }

    #[test]
    fn test_split_multibyte_character() {
        let text = "héllo\n".as_bytes();
        let mut buffer = RelayBuffer::new();

        assert!(buffer.push(&text[..2]).is_empty());
        assert_eq!(buffer.push(&text[2..]), vec!["héllo"]);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_finish_whitespace_only() {
        let mut buffer = RelayBuffer::new();
        buffer.push(b"done\n   ");
        assert_eq!(buffer.finish(), None);
    }
}
