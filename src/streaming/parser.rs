use bytes::BytesMut;

/// Marker prefixing every backend event line; the payload follows it.
pub const EVENT_MARKER: &str = "data:";

/// Placeholder payload the backend sends when it has no content.
pub const KEEP_ALIVE_SENTINEL: &str = "-1";

/// Stateful splitter for the backend's newline-delimited event stream.
///
/// Network chunks land in an internal buffer; every completed line that
/// starts with the event marker yields its trimmed payload, with blank
/// payloads and the keep-alive sentinel filtered out. Lines without the
/// marker are ignored.
pub struct EventLineParser {
    buffer: BytesMut,
}

impl EventLineParser {
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::with_capacity(8192),
        }
    }

    /// Feed new data and extract the payloads of all completed lines.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);

        let mut payloads = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line = self.buffer.split_to(pos + 1);
            if let Some(payload) = parse_line(&line[..line.len() - 1]) {
                payloads.push(payload);
            }
        }
        payloads
    }

    /// Flush the trailing line once the stream has ended. The backend may
    /// omit the final newline; that last line still counts.
    pub fn finish(&mut self) -> Option<String> {
        if self.buffer.is_empty() {
            return None;
        }
        let line = self.buffer.split_to(self.buffer.len());
        parse_line(&line)
    }
}

impl Default for EventLineParser {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_line(raw: &[u8]) -> Option<String> {
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    let line = String::from_utf8_lossy(raw);

    let payload = line.strip_prefix(EVENT_MARKER)?.trim();
    if payload.is_empty() || payload == KEEP_ALIVE_SENTINEL {
        return None;
    }
    Some(payload.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_line() {
        let mut parser = EventLineParser::new();
        assert_eq!(parser.feed(b"data: Hello\n"), vec!["Hello"]);
    }

    #[test]
    fn test_multiple_lines_in_one_chunk() {
        let mut parser = EventLineParser::new();
        assert_eq!(parser.feed(b"data: A\ndata: B\n"), vec!["A", "B"]);
    }

    #[test]
    fn test_line_split_across_feeds() {
        let mut parser = EventLineParser::new();
        assert!(parser.feed(b"da").is_empty());
        assert!(parser.feed(b"ta: Hel").is_empty());
        assert_eq!(parser.feed(b"lo\n"), vec!["Hello"]);
    }

    #[test]
    fn test_sentinel_and_blank_filtered() {
        let mut parser = EventLineParser::new();
        let payloads = parser.feed(b"data: A\ndata: -1\ndata:   \ndata: B\n");
        assert_eq!(payloads, vec!["A", "B"]);
    }

    #[test]
    fn test_sentinel_trimmed_before_compare() {
        let mut parser = EventLineParser::new();
        assert!(parser.feed(b"data:   -1  \n").is_empty());
    }

    #[test]
    fn test_non_marker_lines_ignored() {
        let mut parser = EventLineParser::new();
        let payloads = parser.feed(b"event: ping\n: comment\ndata: kept\n");
        assert_eq!(payloads, vec!["kept"]);
    }

    #[test]
    fn test_marker_must_start_the_line() {
        let mut parser = EventLineParser::new();
        assert!(parser.feed(b"  data: indented\n").is_empty());
    }

    #[test]
    fn test_no_space_after_marker() {
        let mut parser = EventLineParser::new();
        assert_eq!(parser.feed(b"data:tight\n"), vec!["tight"]);
    }

    #[test]
    fn test_crlf_line_endings() {
        let mut parser = EventLineParser::new();
        assert_eq!(parser.feed(b"data: A\r\ndata: B\r\n"), vec!["A", "B"]);
    }

    #[test]
    fn test_finish_flushes_unterminated_line() {
        let mut parser = EventLineParser::new();
        assert!(parser.feed(b"data: tail").is_empty());
        assert_eq!(parser.finish(), Some("tail".to_string()));
        assert_eq!(parser.finish(), None);
    }

    #[test]
    fn test_finish_filters_sentinel() {
        let mut parser = EventLineParser::new();
        assert!(parser.feed(b"data: -1").is_empty());
        assert_eq!(parser.finish(), None);
    }

    #[test]
    fn test_finish_on_empty_buffer() {
        let mut parser = EventLineParser::new();
        assert_eq!(parser.finish(), None);
    }

    #[test]
    fn test_payload_whitespace_trimmed() {
        let mut parser = EventLineParser::new();
        assert_eq!(parser.feed(b"data:  spaced out  \n"), vec!["spaced out"]);
    }
}
