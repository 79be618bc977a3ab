//! Document tree types.
//!
//! A [`Document`] carries its metadata and a [`Root`] that owns the body
//! tree. Structural nodes are [`Block`]s, a closed tagged set; inline runs
//! of text are [`Ele`]s. The tree is fully owned: no node points back at its
//! parent, and content produced by expanding an include is a fresh tree.

use std::fmt;

use crate::include::Include;

/// A parsed document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    /// Document title (empty when the source declares none).
    pub title: String,
    /// Authors in declaration order.
    pub authors: Vec<Author>,
    /// Verifiers in declaration order.
    pub verifiers: Vec<Author>,
    /// Owner of the visible body.
    pub root: Root,
}

impl Document {
    /// Create an empty document with the given title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Top-level body blocks in document order.
    pub fn blocks(&self) -> &[Block] {
        &self.root.children
    }
}

/// Author or verifier entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub name: String,
    pub email: Option<String>,
}

impl Author {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// The root container. Its children form the entire visible body.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Root {
    pub children: Vec<Block>,
}

/// Block-level nodes.
///
/// Each variant only carries the fields meaningful for its kind, so a
/// table can never hold list items and a code block never holds inline
/// runs.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// Text paragraph with inline runs.
    Paragraph(Paragraph),
    /// Section heading owning the blocks that follow it.
    Heading(Heading),
    /// Ordered or unordered list.
    List(List),
    /// Table made of rows of cells.
    Table(Table),
    /// Raw code, never escaped.
    CodeBlock(CodeBlock),
    /// Horizontal rule.
    Rule,
    /// Table-of-contents marker.
    Toc(IndexRange),
    /// Deferred transclusion of another document.
    Include(Include),
}

impl Block {
    /// Short name of the block kind, used by outlines and statistics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Block::Paragraph(_) => "paragraph",
            Block::Heading(_) => "heading",
            Block::List(l) => match l.kind {
                ListKind::Ordered => "ordered-list",
                ListKind::Unordered => "unordered-list",
            },
            Block::Table(_) => "table",
            Block::CodeBlock(_) => "code",
            Block::Rule => "rule",
            Block::Toc(_) => "toc",
            Block::Include(_) => "include",
        }
    }
}

/// Text paragraph.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Paragraph {
    pub eles: Vec<Ele>,
}

/// Section heading.
#[derive(Debug, Clone, PartialEq)]
pub struct Heading {
    /// Heading depth (1-6).
    pub depth: u8,
    pub eles: Vec<Ele>,
    /// Content owned by this heading (following blocks, nested headings).
    pub children: Vec<Block>,
}

impl Heading {
    pub fn new(depth: u8, eles: Vec<Ele>) -> Self {
        Self {
            depth,
            eles,
            children: Vec::new(),
        }
    }

    /// Plain heading text: the raw text of every run, concatenated and trimmed.
    pub fn text(&self) -> String {
        plain_text(&self.eles).trim().to_string()
    }
}

/// List ordering style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    /// Numbered list.
    Ordered,
    /// Bulleted list.
    Unordered,
}

/// A list block containing items of one nesting level.
#[derive(Debug, Clone, PartialEq)]
pub struct List {
    /// Kind of the first item.
    pub kind: ListKind,
    pub items: Vec<ListItem>,
}

/// A single list item.
#[derive(Debug, Clone, PartialEq)]
pub struct ListItem {
    /// Each item identifies itself, independent of the enclosing list.
    pub kind: ListKind,
    /// 1-based nesting level; a nested item sits at its parent's depth + 1.
    pub depth: u8,
    pub eles: Vec<Ele>,
    /// Nested lists and paragraphs.
    pub children: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    pub rows: Vec<TableRow>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableCell {
    pub eles: Vec<Ele>,
}

/// Code block with its raw text.
#[derive(Debug, Clone, PartialEq)]
pub struct CodeBlock {
    /// Language tag from the opening fence, if any.
    pub lang: Option<String>,
    /// Raw content, each line terminated by `\n`.
    pub text: String,
}

/// Heading depth range for a table of contents (0-based, inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexRange {
    pub min: u8,
    pub max: u8,
}

/// An inline run: text plus optional style, link target or image source.
///
/// Style and href/src are independent. An ele with `src` is an image, and
/// `href` may turn either text or an image into a link.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Ele {
    pub text: String,
    pub style: Option<Style>,
    pub href: Option<String>,
    pub src: Option<String>,
}

impl Ele {
    /// Plain text run.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Image run.
    pub fn image(src: impl Into<String>) -> Self {
        Self {
            src: Some(src.into()),
            ..Self::default()
        }
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = Some(style);
        self
    }

    pub fn with_href(mut self, href: impl Into<String>) -> Self {
        self.href = Some(href.into());
        self
    }

    #[inline]
    pub fn is_image(&self) -> bool {
        self.src.is_some()
    }

    #[inline]
    pub fn has_href(&self) -> bool {
        self.href.is_some()
    }
}

/// Font attributes of an inline run.
///
/// No application order is stored here; renderers impose their own.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Style {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub sup: bool,
    pub sub: bool,
    pub strike: bool,
    pub color: Option<String>,
}

impl Style {
    /// True when no attribute is set.
    pub fn is_plain(&self) -> bool {
        !(self.bold || self.italic || self.underline || self.sup || self.sub || self.strike)
            && self.color.is_none()
    }

    /// Union of both styles; the inner color wins.
    pub fn merge(&self, inner: &Style) -> Style {
        Style {
            bold: self.bold || inner.bold,
            italic: self.italic || inner.italic,
            underline: self.underline || inner.underline,
            sup: self.sup || inner.sup,
            sub: self.sub || inner.sub,
            strike: self.strike || inner.strike,
            color: inner.color.clone().or_else(|| self.color.clone()),
        }
    }
}

fn plain_text(eles: &[Ele]) -> String {
    let mut out = String::new();
    for ele in eles {
        match &ele.src {
            Some(src) => {
                out.push_str("[img ");
                out.push_str(src);
                out.push(']');
            }
            None => out.push_str(&ele.text),
        }
    }
    out
}

// =============================================================================
// Outline
// =============================================================================

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Document {:?}", self.title)?;
        write_authors(f, "authors", &self.authors)?;
        write_authors(f, "verifiers", &self.verifiers)?;
        for block in self.blocks() {
            write_block(f, block, 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_block(f, self, 0)
    }
}

fn write_authors(f: &mut fmt::Formatter<'_>, label: &str, authors: &[Author]) -> fmt::Result {
    if authors.is_empty() {
        return Ok(());
    }
    let names: Vec<String> = authors
        .iter()
        .map(|a| match &a.email {
            Some(email) => format!("{} <{}>", a.name, email),
            None => a.name.clone(),
        })
        .collect();
    writeln!(f, "  {}: {}", label, names.join(", "))
}

fn write_block(f: &mut fmt::Formatter<'_>, block: &Block, indent: usize) -> fmt::Result {
    let prefix = "  ".repeat(indent);
    match block {
        Block::Paragraph(p) => writeln!(f, "{}paragraph: {}", prefix, plain_text(&p.eles)),
        Block::Heading(h) => {
            writeln!(f, "{}heading({}): {}", prefix, h.depth, h.text())?;
            for child in &h.children {
                write_block(f, child, indent + 1)?;
            }
            Ok(())
        }
        Block::List(l) => {
            writeln!(f, "{}{}", prefix, block.kind_name())?;
            for item in &l.items {
                let marker = match item.kind {
                    ListKind::Ordered => '#',
                    ListKind::Unordered => '*',
                };
                writeln!(f, "{}  {} {}", prefix, marker, plain_text(&item.eles))?;
                for child in &item.children {
                    write_block(f, child, indent + 2)?;
                }
            }
            Ok(())
        }
        Block::Table(t) => {
            writeln!(f, "{}table", prefix)?;
            for row in &t.rows {
                let cells: Vec<String> = row.cells.iter().map(|c| plain_text(&c.eles)).collect();
                writeln!(f, "{}  | {} |", prefix, cells.join(" | "))?;
            }
            Ok(())
        }
        Block::CodeBlock(c) => writeln!(
            f,
            "{}code ({} lines)",
            prefix,
            c.text.lines().count()
        ),
        Block::Rule => writeln!(f, "{}rule", prefix),
        Block::Toc(range) => writeln!(f, "{}toc {}..={}", prefix, range.min, range.max),
        Block::Include(include) => writeln!(f, "{}{}", prefix, include),
    }
}
