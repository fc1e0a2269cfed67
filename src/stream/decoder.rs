/// Decoded output of a single chunk.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Decoded {
    /// All text decoded from this chunk, including any unterminated tail.
    pub text: String,
    /// Lines completed by this chunk, without their terminators.
    pub lines: Vec<String>,
}

/// Incremental UTF-8 line decoder.
///
/// - Keeps an incomplete trailing UTF-8 sequence until the next chunk
/// - Buffers text after the last `\n` and prefixes it onto the next chunk
/// - Never emits the unterminated tail as a line
#[derive(Debug, Default)]
pub struct LineDecoder {
    pending: Vec<u8>,
    partial: String,
}

impl LineDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: &[u8]) -> Decoded {
        let text = self.decode_utf8(chunk);
        // The buffered tail has no `\n`; only the new text needs scanning.
        let mut from = self.partial.len();
        self.partial.push_str(&text);

        let mut lines = Vec::new();
        let mut line_start = 0;
        while let Some(off) = self.partial[from..].find('\n') {
            let end = from + off;
            let line = &self.partial[line_start..end];
            lines.push(line.strip_suffix('\r').unwrap_or(line).to_string());
            line_start = end + 1;
            from = line_start;
        }
        if line_start > 0 {
            self.partial.drain(..line_start);
        }

        Decoded { text, lines }
    }

    /// Ends the stream, returning the discarded unterminated fragment (if any).
    pub fn finish(self) -> Option<String> {
        if !self.pending.is_empty() {
            tracing::debug!(bytes = self.pending.len(), "dropping incomplete UTF-8 sequence at end of stream");
        }
        if self.partial.is_empty() {
            None
        } else {
            Some(self.partial)
        }
    }

    fn decode_utf8(&mut self, chunk: &[u8]) -> String {
        let owned;
        let mut input: &[u8] = if self.pending.is_empty() {
            chunk
        } else {
            self.pending.extend_from_slice(chunk);
            owned = std::mem::take(&mut self.pending);
            &owned
        };

        let mut out = String::with_capacity(input.len());
        loop {
            match std::str::from_utf8(input) {
                Ok(s) => {
                    out.push_str(s);
                    break;
                }
                Err(e) => {
                    let (valid, rest) = input.split_at(e.valid_up_to());
                    // `valid_up_to` marks a valid prefix.
                    out.push_str(std::str::from_utf8(valid).unwrap_or_default());
                    match e.error_len() {
                        Some(n) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            input = &rest[n..];
                        }
                        None => {
                            // Incomplete sequence at the end: wait for more bytes.
                            self.pending.extend_from_slice(rest);
                            break;
                        }
                    }
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_lines_and_buffers_tail() {
        let mut d = LineDecoder::new();
        let out = d.push(b"data: one\ndata: tw");
        assert_eq!(out.lines, vec!["data: one"]);
        assert_eq!(out.text, "data: one\ndata: tw");

        let out = d.push(b"o\n\n");
        assert_eq!(out.lines, vec!["data: two", ""]);
        assert_eq!(d.finish(), None);
    }

    #[test]
    fn multibyte_split_across_chunks_is_not_replaced() {
        let bytes = "data: héllo 😀\n".as_bytes();
        // Split inside the 4-byte emoji.
        let cut = bytes.len() - 3;
        let mut d = LineDecoder::new();
        let a = d.push(&bytes[..cut]);
        let b = d.push(&bytes[cut..]);
        assert!(a.lines.is_empty());
        assert!(!a.text.contains(char::REPLACEMENT_CHARACTER));
        assert_eq!(b.lines, vec!["data: héllo 😀"]);
        assert_eq!(format!("{}{}", a.text, b.text), "data: héllo 😀\n");
    }

    #[test]
    fn invalid_bytes_become_replacement_characters() {
        let mut d = LineDecoder::new();
        let out = d.push(b"a\xffb\n");
        assert_eq!(out.lines, vec!["a\u{fffd}b"]);
    }

    #[test]
    fn crlf_terminators_are_stripped() {
        let mut d = LineDecoder::new();
        let out = d.push(b"data: x\r");
        assert!(out.lines.is_empty());
        let out = d.push(b"\ndata: y\r\n");
        assert_eq!(out.lines, vec!["data: x", "data: y"]);
    }

    #[test]
    fn long_line_fed_byte_by_byte() {
        let len = 200_000;
        let mut d = LineDecoder::new();
        for _ in 0..len {
            assert!(d.push(b"x").lines.is_empty());
        }
        let out = d.push(b"\r\ndata: next\nda");
        assert_eq!(out.lines.len(), 2);
        assert_eq!(out.lines[0].len(), len);
        assert!(out.lines[0].bytes().all(|b| b == b'x'));
        assert_eq!(out.lines[1], "data: next");
        assert_eq!(d.finish().as_deref(), Some("da"));
    }

    #[test]
    fn unterminated_fragment_is_returned_by_finish() {
        let mut d = LineDecoder::new();
        let out = d.push(b"data: {\"type\":\"cont");
        assert!(out.lines.is_empty());
        assert_eq!(d.finish().as_deref(), Some("data: {\"type\":\"cont"));
    }
}
