//! Google Code wiki dialect.
//!
//! Headings are `=` runs around a back-quoted title, list items use `*` and
//! `#`, tables use `||`, code is fenced by `{{{ }}}`. Inline styles nest in
//! a fixed order: bold, italic, underline, superscript, subscript,
//! strikethrough, color.

use memchr::memchr;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::ast::{Author, Block, Document, Ele, Heading, List, ListKind, Style, Table};
use crate::render::DocRender;

/// Markup-significant tokens neutralized by an inline quote.
static TOKENS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[_*<>{}]|\[|\]|,,|~~|\|\|").expect("valid token pattern")
});

/// Renders documents as Google Code wiki text.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoogleWikiRender;

impl GoogleWikiRender {
    pub fn new() -> Self {
        Self
    }
}

impl DocRender for GoogleWikiRender {
    type Output = String;

    fn render(&self, doc: &Document) -> String {
        let mut writer = WikiWriter::default();
        writer.document(doc);
        writer.out
    }

    fn extension(&self) -> &str {
        "wiki"
    }
}

/// Output buffer owned by a single render call.
#[derive(Default)]
struct WikiWriter {
    out: String,
}

impl WikiWriter {
    fn document(&mut self, doc: &Document) {
        self.out.push_str("#summary ");
        self.out.push_str(&doc.title);
        self.out.push('\n');

        self.out.push_str("=Top=\n");
        self.out.push_str("<p align=\"center\"><font size=6>* ");
        self.out.push_str(&doc.title);
        self.out.push_str(" *</font></p>\n");
        self.hr();

        self.out.push_str("<p align=\"right\">");
        self.authors("By", &doc.authors);
        self.authors("<br/>Verify By", &doc.verifiers);
        self.out.push_str("</p>\n");

        for block in doc.blocks() {
            self.block(block);
        }
    }

    fn authors(&mut self, prefix: &str, authors: &[Author]) {
        if authors.is_empty() {
            return;
        }
        self.out.push_str(&format!(
            " <font color=\"#AAA\" size=\"1\"> * {} * </font>  ",
            prefix
        ));
        for author in authors {
            self.out.push_str("  ");
            match &author.email {
                Some(email) => self.out.push_str(&format!(
                    "*{}* (<font color=\"#080\"> {} </font>)",
                    author.name, email
                )),
                None => self.out.push_str(&format!("*{}*", author.name)),
            }
        }
    }

    fn block(&mut self, block: &Block) {
        match block {
            Block::Table(table) => self.table(table),
            Block::Rule => self.hr(),
            Block::Toc(range) => {
                self.out.push_str(&format!(
                    "<wiki:toc max_depth=\"{}\"/>\n",
                    u16::from(range.max) + 1
                ));
            }
            Block::CodeBlock(code) => {
                self.out.push_str("{{{\n");
                self.out.push_str(&code.text);
                self.out.push_str("}}}\n\n");
            }
            Block::List(list) => self.list(list),
            Block::Heading(heading) => self.heading(heading),
            Block::Paragraph(p) => {
                self.content(&p.eles);
                self.out.push_str("\n\n");
            }
            Block::Include(include) => {
                log::warn!("unresolved {} rendered as an empty paragraph", include);
                self.out.push_str("\n\n");
            }
        }
    }

    fn table(&mut self, table: &Table) {
        for row in &table.rows {
            self.out.push_str("||");
            for cell in &row.cells {
                self.content(&cell.eles);
                self.out.push_str("||");
            }
            self.out.push('\n');
        }
        self.out.push('\n');
    }

    fn list(&mut self, list: &List) {
        for item in &list.items {
            self.indent(usize::from(item.depth.saturating_sub(1)));
            match item.kind {
                ListKind::Unordered => self.out.push_str("  * "),
                ListKind::Ordered => self.out.push_str("  # "),
            }
            self.content(&item.eles);
            self.out.push('\n');
            for child in &item.children {
                self.block(child);
            }
        }
    }

    fn heading(&mut self, heading: &Heading) {
        self.out.push_str("\n<p align=\"right\">[#Top]</p>\n");
        let marker = "=".repeat(usize::from(heading.depth));
        self.out.push_str(&marker);
        self.out.push('`');
        self.out.push_str(&heading.text());
        self.out.push('`');
        self.out.push_str(&marker);
        self.out.push('\n');
        for child in &heading.children {
            self.block(child);
        }
    }

    fn hr(&mut self) {
        self.out.push_str("----\n");
    }

    fn indent(&mut self, level: usize) {
        self.out.push_str(&"  ".repeat(level));
    }

    fn content(&mut self, eles: &[Ele]) {
        for ele in eles {
            self.out.push_str(ele_to_string(ele).trim());
        }
    }
}

/// Render one inline run.
///
/// Images and links short-circuit style wrapping: a linked run never shows
/// its style.
pub fn ele_to_string(ele: &Ele) -> String {
    let mut text = format!("{} ", ele.text);
    if memchr(b'`', text.as_bytes()).is_some() {
        text = ["{{{", text.as_str(), "}}}"].concat();
    } else if TOKENS.is_match(&text) {
        text = ["`", text.as_str(), "`"].concat();
    }

    if let Some(src) = &ele.src {
        return match &ele.href {
            Some(href) => format!("[{} {}]", href, src),
            None => src.clone(),
        };
    }

    if let Some(href) = &ele.href {
        return format!("[{} {}]", href, text);
    }

    match &ele.style {
        Some(style) => apply_style(text, style),
        None => text,
    }
}

fn apply_style(mut text: String, style: &Style) -> String {
    if style.bold {
        text = wrap_by_element(&text, "b");
    }
    if style.italic {
        text = wrap_by_element(&text, "i");
    }
    if style.underline {
        text = wrap_by_element(&text, "u");
    }
    if style.sup {
        text = wrap_by(&text, "^");
    }
    if style.sub {
        text = wrap_by(&text, ",,");
    }
    if style.strike {
        text = wrap_by(&text, "~~");
    }
    if let Some(color) = &style.color {
        text = format!("<font color=\"{}\">{}</font>", color, text);
    }
    text
}

fn wrap_by(text: &str, wrapper: &str) -> String {
    [wrapper, text, wrapper].concat()
}

fn wrap_by_element(text: &str, name: &str) -> String {
    format!("<{0}>{1}</{0}>", name, text)
}
