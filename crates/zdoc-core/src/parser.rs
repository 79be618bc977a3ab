//! Parser contract and the zdoc text block parser.
//!
//! A [`DocParser`] turns a byte stream into a [`Document`]. Failures abort
//! the whole parse; there is no partial-document recovery.
//!
//! [`TextParser`] reads the line-oriented zdoc text format:
//!
//! ```text
//! #title: Guide
//! #author: Ada <ada@example.com>
//! #index: 0,2
//!
//! # Intro
//! Some **bold** and [[a link|http://example.com]].
//!
//! - item
//!   1. nested ordered item
//!
//! | a | b |
//! @>include: chapters/one.zdoc
//! ```

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::ast::{
    Author, Block, CodeBlock, Document, Heading, IndexRange, List, ListItem, ListKind, Paragraph,
    Table, TableCell, TableRow,
};
use crate::error::ParseError;
use crate::include::{Include, Reference};
use crate::inline::parse_inlines;
use crate::lexer::{Lexer, Line};

/// Converts a source stream into a [`Document`].
///
/// Implementations consume the stream but never close it; the caller owns
/// its lifetime.
pub trait DocParser: Send + Sync {
    fn parse(&self, input: &mut dyn Read) -> Result<Document, ParseError>;

    /// Set the root that include locators are resolved against.
    ///
    /// Formats without includes can ignore it.
    fn set_root(&mut self, _root: &Path) {}
}

/// Parser for zdoc text sources.
///
/// Include locators are resolved against the parser's source root.
#[derive(Debug, Clone, Default)]
pub struct TextParser {
    root: PathBuf,
}

impl TextParser {
    /// Create a parser resolving includes relative to `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Parse already decoded input.
    pub fn parse_str(&self, input: &str) -> Result<Document, ParseError> {
        let includes: Arc<dyn DocParser> = Arc::new(self.clone());
        let mut lexer = Lexer::new(input);
        let mut doc = Document::default();

        let blocks = self.parse_blocks(&mut lexer, &mut doc, &includes)?;
        doc.root.children = nest_headings(blocks);

        log::debug!(
            "parsed {:?}: {} lines, {} top-level blocks",
            doc.title,
            lexer.line_number(),
            doc.root.children.len()
        );
        Ok(doc)
    }

    fn parse_blocks(
        &self,
        lexer: &mut Lexer,
        doc: &mut Document,
        includes: &Arc<dyn DocParser>,
    ) -> Result<Vec<Block>, ParseError> {
        let mut blocks = Vec::with_capacity(16);

        while !lexer.is_eof() {
            lexer.skip_blank_lines();

            let Some(&line) = lexer.peek_line() else {
                break;
            };

            match classify(&line) {
                LineKind::Blank => {
                    lexer.next_line();
                }
                LineKind::Directive { name, value } => {
                    lexer.next_line();
                    if let Some(block) = self.apply_directive(doc, name, value, line.number)? {
                        blocks.push(block);
                    }
                }
                LineKind::Fence(lang) => blocks.push(self.parse_code_block(lexer, lang)?),
                LineKind::Rule => {
                    lexer.next_line();
                    blocks.push(Block::Rule);
                }
                LineKind::Include(locator) => {
                    lexer.next_line();
                    if locator.is_empty() {
                        return Err(ParseError::invalid_syntax("include", line.number));
                    }
                    let reference = Reference::resolve(&self.root, locator);
                    blocks.push(Block::Include(Include::new(reference, Arc::clone(includes))));
                }
                LineKind::Heading { depth, text } => {
                    lexer.next_line();
                    blocks.push(Block::Heading(Heading::new(depth, parse_inlines(text))));
                }
                LineKind::TableRow(_) => blocks.push(self.parse_table(lexer)),
                LineKind::ListItem { .. } => blocks.push(self.parse_list(lexer)?),
                LineKind::Text(_) => blocks.push(self.parse_paragraph(lexer)),
            }
        }

        Ok(blocks)
    }

    /// Header directives update the document; `#index:` yields a TOC marker.
    fn apply_directive(
        &self,
        doc: &mut Document,
        name: &str,
        value: &str,
        line: usize,
    ) -> Result<Option<Block>, ParseError> {
        match name {
            "title" => doc.title = value.to_string(),
            "author" => doc.authors.push(parse_author(name, value, line)?),
            "verifier" => doc.verifiers.push(parse_author(name, value, line)?),
            "index" => return parse_index_range(value, line).map(|r| Some(Block::Toc(r))),
            _ => return Err(ParseError::unknown_directive(name, line)),
        }
        Ok(None)
    }

    fn parse_code_block(&self, lexer: &mut Lexer, lang: &str) -> Result<Block, ParseError> {
        let open = match lexer.next_line() {
            Some(line) => line.number,
            None => lexer.line_number(),
        };
        let lang = (!lang.is_empty()).then(|| lang.to_string());
        let mut text = String::new();

        loop {
            let Some(line) = lexer.next_line() else {
                return Err(ParseError::unclosed_delimiter("code block", open));
            };
            if line.trimmed() == "```" {
                break;
            }
            text.push_str(line.text);
            text.push('\n');
        }

        Ok(Block::CodeBlock(CodeBlock { lang, text }))
    }

    fn parse_table(&self, lexer: &mut Lexer) -> Block {
        let mut rows = Vec::with_capacity(8);

        while let Some(&line) = lexer.peek_line() {
            let LineKind::TableRow(row) = classify(&line) else {
                break;
            };
            lexer.next_line();

            if is_separator_row(row) {
                continue;
            }
            rows.push(parse_table_row(row));
        }

        Block::Table(Table { rows })
    }

    fn parse_list(&self, lexer: &mut Lexer) -> Result<Block, ParseError> {
        let mut entries: Vec<ListEntry> = Vec::with_capacity(8);
        let mut base_indent = None;

        while let Some(&line) = lexer.peek_line() {
            let LineKind::ListItem { kind, indent, text } = classify(&line) else {
                break;
            };
            lexer.next_line();

            let base = *base_indent.get_or_insert(indent);
            if indent < base {
                return Err(ParseError::invalid_syntax("list indentation", line.number));
            }
            let depth = u8::try_from((indent - base) / 2 + 1)
                .map_err(|_| ParseError::invalid_syntax("list indentation", line.number))?;

            entries.push(ListEntry {
                kind,
                depth,
                text,
                line: line.number,
            });
        }

        let mut pos = 0;
        let list = build_list(&entries, &mut pos, 1)?;
        Ok(Block::List(list))
    }

    fn parse_paragraph(&self, lexer: &mut Lexer) -> Block {
        let mut text = String::new();

        while let Some(&line) = lexer.peek_line() {
            let LineKind::Text(content) = classify(&line) else {
                break;
            };
            lexer.next_line();

            if !text.is_empty() {
                text.push(' ');
            }
            text.push_str(content);
        }

        Block::Paragraph(Paragraph {
            eles: parse_inlines(&text),
        })
    }
}

impl DocParser for TextParser {
    fn parse(&self, input: &mut dyn Read) -> Result<Document, ParseError> {
        let mut bytes = Vec::new();
        input.read_to_end(&mut bytes)?;
        let text = String::from_utf8(bytes)?;
        self.parse_str(&text)
    }

    fn set_root(&mut self, root: &Path) {
        self.root = root.to_path_buf();
    }
}

// =============================================================================
// Line classification
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind<'a> {
    Blank,
    /// Opening code fence with its (possibly empty) language tag.
    Fence(&'a str),
    Rule,
    Include(&'a str),
    Directive { name: &'a str, value: &'a str },
    Heading { depth: u8, text: &'a str },
    TableRow(&'a str),
    ListItem {
        kind: ListKind,
        indent: usize,
        text: &'a str,
    },
    Text(&'a str),
}

fn classify<'a>(line: &Line<'a>) -> LineKind<'a> {
    if line.is_blank() {
        return LineKind::Blank;
    }
    let trimmed = line.trimmed();

    if let Some(lang) = trimmed.strip_prefix("```") {
        return LineKind::Fence(lang.trim());
    }
    if trimmed.len() >= 3 && trimmed.bytes().all(|b| b == b'-') {
        return LineKind::Rule;
    }
    if let Some(locator) = trimmed.strip_prefix("@>include:") {
        return LineKind::Include(locator.trim());
    }
    if let Some(rest) = trimmed.strip_prefix('#') {
        if let Some((name, value)) = rest.split_once(':') {
            if !name.is_empty() && name.bytes().all(|b| b.is_ascii_alphabetic()) {
                return LineKind::Directive {
                    name,
                    value: value.trim(),
                };
            }
        }
        let depth = trimmed.bytes().take_while(|&b| b == b'#').count();
        let rest = &trimmed[depth..];
        if depth <= 6 && (rest.is_empty() || rest.starts_with(' ')) {
            return LineKind::Heading {
                depth: depth as u8,
                text: rest.trim(),
            };
        }
    }
    if trimmed.starts_with('|') {
        return LineKind::TableRow(trimmed);
    }
    if let Some((kind, text)) = list_marker(trimmed) {
        return LineKind::ListItem {
            kind,
            indent: line.indent(),
            text,
        };
    }

    LineKind::Text(trimmed)
}

fn list_marker(trimmed: &str) -> Option<(ListKind, &str)> {
    if let Some(text) = trimmed
        .strip_prefix("- ")
        .or_else(|| trimmed.strip_prefix("* "))
    {
        return Some((ListKind::Unordered, text.trim()));
    }

    let (number, text) = trimmed.split_once(". ")?;
    if !number.is_empty() && number.bytes().all(|b| b.is_ascii_digit()) {
        return Some((ListKind::Ordered, text.trim()));
    }
    None
}

// =============================================================================
// Block helpers
// =============================================================================

fn parse_author(directive: &str, value: &str, line: usize) -> Result<Author, ParseError> {
    let (name, email) = match value.split_once('<') {
        Some((name, rest)) => {
            let email = rest
                .strip_suffix('>')
                .ok_or_else(|| ParseError::invalid_metadata(directive, line))?;
            (name.trim(), Some(email.trim()))
        }
        None => (value, None),
    };

    if name.is_empty() {
        return Err(ParseError::invalid_metadata(directive, line));
    }

    let author = Author::new(name);
    Ok(match email {
        Some(email) if !email.is_empty() => author.with_email(email),
        _ => author,
    })
}

/// `max` or `min,max`
fn parse_index_range(value: &str, line: usize) -> Result<IndexRange, ParseError> {
    let invalid = || ParseError::invalid_syntax("#index:", line);
    let parse = |s: &str| s.trim().parse::<u8>().map_err(|_| invalid());

    let range = match value.split_once(',') {
        Some((min, max)) => IndexRange {
            min: parse(min)?,
            max: parse(max)?,
        },
        None => IndexRange {
            min: 0,
            max: parse(value)?,
        },
    };

    if range.min > range.max {
        return Err(invalid());
    }
    Ok(range)
}

fn is_separator_row(row: &str) -> bool {
    row.contains('-')
        && row
            .bytes()
            .all(|b| matches!(b, b'|' | b'-' | b':' | b' ' | b'\t'))
}

fn parse_table_row(row: &str) -> TableRow {
    let inner = row.strip_prefix('|').unwrap_or(row);
    let inner = inner.strip_suffix('|').unwrap_or(inner);

    let cells = inner
        .split('|')
        .map(|cell| TableCell {
            eles: parse_inlines(cell.trim()),
        })
        .collect();

    TableRow { cells }
}

struct ListEntry<'a> {
    kind: ListKind,
    depth: u8,
    text: &'a str,
    line: usize,
}

/// Collect the items of one nesting level starting at `entries[*pos]`.
fn build_list(entries: &[ListEntry], pos: &mut usize, depth: u8) -> Result<List, ParseError> {
    let kind = entries[*pos].kind;
    let mut items = Vec::new();

    while let Some(entry) = entries.get(*pos) {
        if entry.depth < depth {
            break;
        }
        if entry.depth > depth {
            return Err(ParseError::invalid_syntax("list indentation", entry.line));
        }
        *pos += 1;

        let mut item = ListItem {
            kind: entry.kind,
            depth,
            eles: parse_inlines(entry.text),
            children: Vec::new(),
        };
        // No level exists below u8::MAX, so items there never own a sublist.
        if let Some(nested) = depth.checked_add(1) {
            if entries.get(*pos).is_some_and(|next| next.depth == nested) {
                item.children
                    .push(Block::List(build_list(entries, pos, nested)?));
            }
        }
        items.push(item);
    }

    Ok(List { kind, items })
}

/// Move every block following a heading into that heading, until a heading
/// of the same or a shallower depth.
fn nest_headings(flat: Vec<Block>) -> Vec<Block> {
    let mut top = Vec::with_capacity(flat.len());
    let mut open: Vec<Heading> = Vec::new();

    for block in flat {
        match block {
            Block::Heading(heading) => {
                close_headings(&mut open, &mut top, heading.depth);
                open.push(heading);
            }
            block => match open.last_mut() {
                Some(parent) => parent.children.push(block),
                None => top.push(block),
            },
        }
    }
    close_headings(&mut open, &mut top, 0);

    top
}

fn close_headings(open: &mut Vec<Heading>, top: &mut Vec<Block>, depth: u8) {
    while matches!(open.last(), Some(h) if h.depth >= depth) {
        let Some(done) = open.pop() else {
            break;
        };
        match open.last_mut() {
            Some(parent) => parent.children.push(Block::Heading(done)),
            None => top.push(Block::Heading(done)),
        }
    }
}
