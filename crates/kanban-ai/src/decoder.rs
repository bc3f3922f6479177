//! Line framing for chunked event streams
//!
//! Network chunks arrive with arbitrary sizes and never line up with protocol
//! lines. [`FrameDecoder`] keeps a single carry-over buffer and hands out
//! complete lines only, with `\n` or `\r\n` stripped.

/// Reassembles complete protocol lines from arbitrarily chunked bytes.
///
/// The buffer holds raw bytes, so a multi-byte UTF-8 sequence split across two
/// chunks is only decoded once its line is complete.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buffer: Vec<u8>,
}

impl FrameDecoder {
    /// Create an empty decoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk to the carry-over buffer.
    pub fn push(&mut self, chunk: &[u8]) {
        self.buffer.extend_from_slice(chunk);
    }

    /// Pop the next complete line, terminator stripped.
    ///
    /// Returns `None` while the buffered bytes hold no `\n`.
    pub fn next_line(&mut self) -> Option<String> {
        let newline = self.buffer.iter().position(|&b| b == b'\n')?;
        let mut line: Vec<u8> = self.buffer.drain(..=newline).collect();
        line.pop();
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        Some(String::from_utf8_lossy(&line).into_owned())
    }

    /// Put a line back at the front of the buffer, terminator included, so the
    /// next [`next_line`](Self::next_line) returns it again.
    pub fn push_front(&mut self, line: &str) {
        let mut restored = Vec::with_capacity(line.len() + 1 + self.buffer.len());
        restored.extend_from_slice(line.as_bytes());
        restored.push(b'\n');
        restored.append(&mut self.buffer);
        self.buffer = restored;
    }

    /// Iterate over the complete lines currently buffered.
    pub fn lines(&mut self) -> Lines<'_> {
        Lines { decoder: self }
    }

    /// Whether at least one complete line is buffered
    pub fn has_complete_line(&self) -> bool {
        self.buffer.contains(&b'\n')
    }

    /// Number of buffered bytes not yet handed out
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Drop whatever is left in the buffer, returning the number of bytes
    /// dropped. A trailing line without a terminator is not a frame.
    pub fn discard_remainder(&mut self) -> usize {
        let dropped = self.buffer.len();
        self.buffer.clear();
        dropped
    }
}

/// Pull-based iterator over buffered lines, see [`FrameDecoder::lines`].
pub struct Lines<'a> {
    decoder: &'a mut FrameDecoder,
}

impl Iterator for Lines<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        self.decoder.next_line()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_chunks(chunks: &[&[u8]]) -> Vec<String> {
        let mut decoder = FrameDecoder::new();
        let mut lines = Vec::new();
        for chunk in chunks {
            decoder.push(chunk);
            lines.extend(decoder.lines());
        }
        lines
    }

    #[test]
    fn test_splits_lf_and_crlf() {
        let lines = decode_chunks(&[b"one\ntwo\r\nthree\n"]);
        assert_eq!(lines, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_holds_unterminated_line() {
        let mut decoder = FrameDecoder::new();
        decoder.push(b"data: par");
        assert_eq!(decoder.next_line(), None);
        assert_eq!(decoder.pending(), 9);

        decoder.push(b"tial\n");
        assert_eq!(decoder.next_line().as_deref(), Some("data: partial"));
        assert_eq!(decoder.pending(), 0);
    }

    #[test]
    fn test_crlf_split_between_cr_and_lf() {
        let lines = decode_chunks(&[b"alpha\r", b"\nbeta\r\n"]);
        assert_eq!(lines, vec!["alpha", "beta"]);
    }

    #[test]
    fn test_blank_lines_are_kept() {
        let lines = decode_chunks(&[b"a\n\n\r\nb\n"]);
        assert_eq!(lines, vec!["a", "", "", "b"]);
    }

    #[test]
    fn test_remainder_is_discarded_on_close() {
        let mut decoder = FrameDecoder::new();
        decoder.push(b"done\ntrailing");
        assert_eq!(decoder.lines().collect::<Vec<_>>(), vec!["done"]);
        assert_eq!(decoder.discard_remainder(), 8);
        assert_eq!(decoder.next_line(), None);
        assert_eq!(decoder.pending(), 0);
    }

    #[test]
    fn test_multibyte_char_split_across_chunks() {
        let text = "héllo ✓\n".as_bytes();
        // Split inside the two-byte 'é' and inside the three-byte check mark.
        let lines = decode_chunks(&[&text[..2], &text[2..8], &text[8..]]);
        assert_eq!(lines, vec!["héllo ✓"]);
    }

    #[test]
    fn test_rechunking_is_idempotent() {
        let stream: &[u8] = b": keep-alive\r\ndata: {\"a\":1}\n\ndata: [DONE]\r\ntail";
        let whole = decode_chunks(&[stream]);

        let byte_at_a_time: Vec<&[u8]> = stream.chunks(1).collect();
        assert_eq!(decode_chunks(&byte_at_a_time), whole);

        for size in 2..stream.len() {
            let chunks: Vec<&[u8]> = stream.chunks(size).collect();
            assert_eq!(decode_chunks(&chunks), whole, "chunk size {}", size);
        }
        assert_eq!(whole, vec![": keep-alive", "data: {\"a\":1}", "", "data: [DONE]"]);
    }

    #[test]
    fn test_push_front_restores_line() {
        let mut decoder = FrameDecoder::new();
        decoder.push(b"first\nsecond\nthi");
        let first = decoder.next_line().unwrap();
        decoder.push_front(&first);
        assert!(decoder.has_complete_line());

        decoder.push(b"rd\n");
        let lines: Vec<String> = decoder.lines().collect();
        assert_eq!(lines, vec!["first", "second", "third"]);
    }
}
