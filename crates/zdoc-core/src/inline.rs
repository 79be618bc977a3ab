//! Inline parser for zdoc text
//!
//! Turns a line of markup into a flat run of [`Ele`]s. Nested styles are
//! flattened: every run carries the union of the styles enclosing it.
//! Greedy, left-to-right parsing with no backtracking; unmatched markers
//! stay literal.

use memchr::{memchr, memchr2, memchr3};

use crate::ast::{Ele, Style};

/// Parse inline elements from text content.
#[inline]
pub fn parse_inlines(text: &str) -> Vec<Ele> {
    if text.is_empty() {
        return Vec::new();
    }
    let style = Style::default();
    InlineParser::new(text, &style).parse()
}

struct InlineParser<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
    text_start: usize,
    style: &'a Style,
    /// Literal text not yet emitted (escapes make this differ from the input).
    pending: String,
    eles: Vec<Ele>,
}

impl<'a> InlineParser<'a> {
    #[inline]
    fn new(text: &'a str, style: &'a Style) -> Self {
        Self {
            text,
            bytes: text.as_bytes(),
            pos: 0,
            text_start: 0,
            style,
            pending: String::new(),
            eles: Vec::with_capacity(4),
        }
    }

    fn parse(mut self) -> Vec<Ele> {
        while self.pos < self.bytes.len() {
            let next_special = self.find_next_special();

            if next_special >= self.bytes.len() {
                break;
            }

            self.pos = next_special;

            let parsed = match self.bytes[self.pos] {
                b'\\' => self.try_parse_escape(),
                b'*' if self.peek_is(b'*') => self.try_parse_span(b"**", |s| s.bold = true),
                b'*' => self.try_parse_span(b"*", |s| s.italic = true),
                b'_' => self.try_parse_span(b"__", |s| s.underline = true),
                b'^' => self.try_parse_span(b"^", |s| s.sup = true),
                b',' => self.try_parse_span(b",,", |s| s.sub = true),
                b'~' => self.try_parse_span(b"~~", |s| s.strike = true),
                b'[' => self.try_parse_link(),
                b'{' => self.try_parse_color(),
                _ => false,
            };

            if !parsed {
                self.pos += 1;
            }
        }

        self.pos = self.bytes.len();
        self.flush_text();
        self.emit_pending();
        self.eles
    }

    #[inline(always)]
    fn find_next_special(&self) -> usize {
        let remaining = &self.bytes[self.pos..];

        let hits = [
            memchr3(b'*', b'_', b'[', remaining),
            memchr3(b'\\', b'~', b'^', remaining),
            memchr2(b',', b'{', remaining),
        ];

        hits.iter()
            .flatten()
            .min()
            .map_or(self.bytes.len(), |offset| self.pos + offset)
    }

    #[inline(always)]
    fn peek_is(&self, byte: u8) -> bool {
        self.bytes.get(self.pos + 1) == Some(&byte)
    }

    /// Move literal input between `text_start` and `pos` into the pending buffer.
    #[inline]
    fn flush_text(&mut self) {
        if self.text_start < self.pos {
            self.pending.push_str(&self.text[self.text_start..self.pos]);
        }
        self.text_start = self.pos;
    }

    fn emit_pending(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.pending);
        let ele = styled(Ele::text(text), self.style);
        self.eles.push(ele);
    }

    fn push_nested(&mut self, content: &str, style: &Style) {
        self.emit_pending();
        let inner = InlineParser::new(content, style).parse();
        self.eles.extend(inner);
    }

    #[inline]
    fn try_parse_escape(&mut self) -> bool {
        let Some(escaped) = self.text[self.pos + 1..].chars().next() else {
            return false;
        };
        self.flush_text();
        // The escaped character starts the next literal run.
        self.text_start = self.pos + 1;
        self.pos += 1 + escaped.len_utf8();
        true
    }

    /// Find a closing `delim` at or after `from` that is not preceded by a space.
    fn find_closing(&self, delim: &[u8], from: usize) -> Option<usize> {
        let first = delim[0];
        let mut search = from;

        while let Some(offset) = memchr(first, &self.bytes[search..]) {
            let at = search + offset;

            if self.bytes[at..].starts_with(delim) {
                // A doubled single-byte marker belongs to a longer delimiter.
                if delim.len() == 1 && self.bytes.get(at + 1) == Some(&first) {
                    search = at + 2;
                    continue;
                }
                if at > from && self.bytes[at - 1] != b' ' {
                    return Some(at);
                }
            }
            search = at + 1;
        }

        None
    }

    fn try_parse_span(&mut self, delim: &[u8], flag: fn(&mut Style)) -> bool {
        if !self.bytes[self.pos..].starts_with(delim) {
            return false;
        }

        let content_start = self.pos + delim.len();
        if content_start >= self.bytes.len() || self.bytes[content_start] == b' ' {
            return false;
        }

        let Some(close) = self.find_closing(delim, content_start) else {
            return false;
        };

        self.flush_text();

        let mut added = Style::default();
        flag(&mut added);
        let style = self.style.merge(&added);
        let text = self.text;
        self.push_nested(&text[content_start..close], &style);

        self.pos = close + delim.len();
        self.text_start = self.pos;
        true
    }

    /// `[[label|href]]`, `[[href]]`, `[[img:src]]`, `[[img:src|href]]`
    fn try_parse_link(&mut self) -> bool {
        if !self.peek_is(b'[') {
            return false;
        }

        let start = self.pos;
        let search_start = start + 2;
        let mut search_pos = search_start;

        let close = loop {
            let Some(offset) = memchr(b']', &self.bytes[search_pos..]) else {
                return false;
            };
            let at = search_pos + offset;
            if self.bytes.get(at + 1) == Some(&b']') {
                break at;
            }
            search_pos = at + 1;
        };

        let text = self.text;
        let content = text[search_start..close].trim();
        if content.is_empty() {
            return false;
        }

        self.flush_text();
        self.emit_pending();

        let ele = if let Some(image) = content.strip_prefix("img:") {
            match image.split_once('|') {
                Some((src, href)) => Ele::image(src.trim()).with_href(href.trim()),
                None => Ele::image(image.trim()),
            }
        } else {
            let (label, href) = match content.split_once('|') {
                Some((label, href)) => (label.trim(), href.trim()),
                None => (content, content),
            };
            styled(Ele::text(label).with_href(href), self.style)
        };
        self.eles.push(ele);

        self.pos = close + 2;
        self.text_start = self.pos;
        true
    }

    /// `{color|text}`
    fn try_parse_color(&mut self) -> bool {
        let start = self.pos + 1;
        let Some(pipe_offset) = memchr(b'|', &self.bytes[start..]) else {
            return false;
        };
        let pipe = start + pipe_offset;
        let text = self.text;
        let color = &text[start..pipe];
        if color.is_empty() || !color.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'#') {
            return false;
        }

        let Some(close_offset) = memchr(b'}', &self.bytes[pipe + 1..]) else {
            return false;
        };
        let close = pipe + 1 + close_offset;
        if close == pipe + 1 {
            return false;
        }

        self.flush_text();

        let added = Style {
            color: Some(color.to_string()),
            ..Style::default()
        };
        let style = self.style.merge(&added);
        self.push_nested(&text[pipe + 1..close], &style);

        self.pos = close + 1;
        self.text_start = self.pos;
        true
    }
}

fn styled(ele: Ele, style: &Style) -> Ele {
    if style.is_plain() {
        ele
    } else {
        ele.with_style(style.clone())
    }
}
