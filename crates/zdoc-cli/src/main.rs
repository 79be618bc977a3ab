//! zdoc CLI - Render, inspect and batch convert zdoc documents
//!
//! Usage:
//!   zdoc [OPTIONS] <COMMAND>
//!
//! Commands:
//!   render    Render a document as Google Code wiki text
//!   tree      Display the document tree
//!   stats     Show document statistics
//!   convert   Convert files from a source root into a destination root

mod config;

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde::Serialize;
use zdoc_core::ast::{Ele, ListItem, ListKind, Style};
use zdoc_core::{Author, Block, ConvertContext, DocRender, Document, GoogleWikiRender, TextParser};

use crate::config::FileConfig;

#[derive(Parser)]
#[command(name = "zdoc", version, about = "zdoc document renderer and converter")]
struct Cli {
    /// Show debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render a document as Google Code wiki text
    Render(RenderArgs),

    /// Display the document tree
    Tree(InspectArgs),

    /// Show document statistics
    Stats(InspectArgs),

    /// Convert files from a source root into a destination root
    Convert(ConvertArgs),
}

#[derive(clap::Args)]
struct RenderArgs {
    /// zdoc source file
    file: PathBuf,

    /// Root that include locators resolve against (default: the file's directory)
    #[arg(long)]
    src: Option<PathBuf>,

    /// Leave include leaves unexpanded
    #[arg(long)]
    keep_includes: bool,
}

#[derive(clap::Args)]
struct InspectArgs {
    /// zdoc source file
    file: PathBuf,

    /// Root that include locators resolve against (default: the file's directory)
    #[arg(long)]
    src: Option<PathBuf>,

    /// Output in JSON format
    #[arg(short, long)]
    json: bool,
}

#[derive(clap::Args)]
struct ConvertArgs {
    /// TOML config file (default: ./zdoc.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Source root
    #[arg(long)]
    src: Option<String>,

    /// Destination root
    #[arg(long)]
    dest: Option<String>,

    /// Index file name written under the destination root
    #[arg(long)]
    index: Option<String>,

    /// Files to convert, relative to the source root
    #[arg(required = true)]
    files: Vec<String>,

    /// Free-form arguments for the conversion context (after --)
    #[arg(last = true)]
    args: Vec<String>,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(err) = run(cli.command) {
        eprintln!("error: {:#}", err);
        process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };

    let _ = env_logger::builder()
        .filter_module("zdoc", level)
        .filter_module("zdoc_core", level)
        .parse_default_env()
        .try_init();
}

fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Render(args) => cmd_render(args),
        Command::Tree(args) => cmd_tree(args),
        Command::Stats(args) => cmd_stats(args),
        Command::Convert(args) => cmd_convert(args),
    }
}

/// Read and parse `file`, resolving includes against `src` or the file's directory.
fn load(file: &Path, src: Option<&Path>) -> anyhow::Result<(Document, String)> {
    let input = fs::read_to_string(file)
        .with_context(|| format!("failed to read '{}'", file.display()))?;

    let root = match src {
        Some(src) => src.to_path_buf(),
        None => file.parent().map(Path::to_path_buf).unwrap_or_default(),
    };
    let doc = TextParser::new(root)
        .parse_str(&input)
        .with_context(|| format!("failed to parse '{}'", file.display()))?;

    Ok((doc, input))
}

// =============================================================================
// Render Command
// =============================================================================

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let (mut doc, _) = load(&args.file, args.src.as_deref())?;

    if !args.keep_includes {
        let expanded = doc.resolve_includes_from(&args.file)?;
        log::debug!("expanded {} includes", expanded);
    }

    print!("{}", GoogleWikiRender.render(&doc));
    Ok(())
}

// =============================================================================
// Tree Command
// =============================================================================

fn cmd_tree(args: InspectArgs) -> anyhow::Result<()> {
    let (doc, _) = load(&args.file, args.src.as_deref())?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&convert_document(&doc))?);
    } else {
        print!("{}", doc);
    }
    Ok(())
}

// =============================================================================
// Stats Command
// =============================================================================

fn cmd_stats(args: InspectArgs) -> anyhow::Result<()> {
    let (doc, input) = load(&args.file, args.src.as_deref())?;
    let stats = DocumentStats::from_document(&doc, &input);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("Document Statistics");
    println!("-------------------");
    println!("Title:        {}", doc.title);
    println!("Authors:      {}", doc.authors.len());
    println!("Verifiers:    {}", doc.verifiers.len());
    println!();
    println!("Content:");
    println!("  Total blocks:   {}", stats.total_blocks);
    println!("  Headings:       {}", stats.headings);
    println!("  Paragraphs:     {}", stats.paragraphs);
    println!("  Code blocks:    {}", stats.code_blocks);
    println!("  Lists:          {}", stats.lists);
    println!("  List items:     {}", stats.list_items);
    println!("  Tables:         {}", stats.tables);
    println!("  Includes:       {}", stats.includes);
    println!();
    println!("Size:");
    println!("  Characters:     {}", stats.chars);
    println!("  Words (est.):   {}", stats.words);
    println!("  Lines:          {}", stats.lines);

    Ok(())
}

#[derive(Debug, Default, Serialize)]
struct DocumentStats {
    total_blocks: usize,
    headings: usize,
    paragraphs: usize,
    code_blocks: usize,
    lists: usize,
    list_items: usize,
    tables: usize,
    includes: usize,
    chars: usize,
    words: usize,
    lines: usize,
}

impl DocumentStats {
    fn from_document(doc: &Document, input: &str) -> Self {
        let mut stats = Self {
            chars: input.chars().count(),
            words: input.split_whitespace().count(),
            lines: input.lines().count(),
            ..Self::default()
        };

        stats.count_blocks(doc.blocks());
        stats
    }

    fn count_blocks(&mut self, blocks: &[Block]) {
        for block in blocks {
            self.total_blocks += 1;
            match block {
                Block::Heading(h) => {
                    self.headings += 1;
                    self.count_blocks(&h.children);
                }
                Block::Paragraph(_) => self.paragraphs += 1,
                Block::CodeBlock(_) => self.code_blocks += 1,
                Block::List(l) => {
                    self.lists += 1;
                    self.list_items += l.items.len();
                    for item in &l.items {
                        self.count_blocks(&item.children);
                    }
                }
                Block::Table(_) => self.tables += 1,
                Block::Include(_) => self.includes += 1,
                Block::Rule | Block::Toc(_) => {}
            }
        }
    }
}

// =============================================================================
// Convert Command
// =============================================================================

fn cmd_convert(args: ConvertArgs) -> anyhow::Result<()> {
    let config = FileConfig::discover(args.config.as_deref())?;

    let src = args.src.or(config.src).unwrap_or_else(|| ".".to_string());
    let Some(dest) = args.dest.or(config.dest) else {
        bail!("no destination root (use --dest or `dest` in the config file)");
    };

    let mut ctx: ConvertContext = ConvertContext::default();
    ctx.set_src(&src);
    ctx.set_dest(&dest);
    if let Some(index) = args.index.or(config.index) {
        ctx.set_index_file(index);
    }
    for arg in config.args.into_iter().chain(args.args) {
        ctx.add_arg(arg);
    }

    log::debug!(
        "src={} dest={} index={} args={:?}",
        ctx.src(),
        ctx.dest(),
        ctx.index_file(),
        ctx.args()
    );

    let converted = ctx.convert_all(args.files.iter().map(String::as_str))?;
    for doc in &converted {
        println!("{} -> {}", doc.source.display(), doc.output.display());
    }

    let index = ctx.write_index(&converted)?;
    println!("index: {}", index.display());
    Ok(())
}

// =============================================================================
// JSON Output
// =============================================================================

#[derive(Serialize)]
struct JsonDocument<'a> {
    title: &'a str,
    authors: Vec<JsonAuthor<'a>>,
    verifiers: Vec<JsonAuthor<'a>>,
    blocks: Vec<JsonBlock<'a>>,
}

#[derive(Serialize)]
struct JsonAuthor<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(tag = "type")]
enum JsonBlock<'a> {
    Paragraph {
        eles: Vec<JsonEle<'a>>,
    },
    Heading {
        depth: u8,
        eles: Vec<JsonEle<'a>>,
        children: Vec<JsonBlock<'a>>,
    },
    List {
        kind: &'a str,
        items: Vec<JsonListItem<'a>>,
    },
    Table {
        rows: Vec<Vec<Vec<JsonEle<'a>>>>,
    },
    CodeBlock {
        lang: Option<&'a str>,
        text: &'a str,
    },
    Rule,
    Toc {
        min: u8,
        max: u8,
    },
    Include {
        reference: String,
    },
}

#[derive(Serialize)]
struct JsonListItem<'a> {
    kind: &'a str,
    depth: u8,
    eles: Vec<JsonEle<'a>>,
    children: Vec<JsonBlock<'a>>,
}

#[derive(Serialize)]
struct JsonEle<'a> {
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    style: Option<JsonStyle<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    href: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    src: Option<&'a str>,
}

#[derive(Serialize)]
struct JsonStyle<'a> {
    bold: bool,
    italic: bool,
    underline: bool,
    sup: bool,
    sub: bool,
    strike: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    color: Option<&'a str>,
}

fn convert_document(doc: &Document) -> JsonDocument<'_> {
    JsonDocument {
        title: &doc.title,
        authors: doc.authors.iter().map(convert_author).collect(),
        verifiers: doc.verifiers.iter().map(convert_author).collect(),
        blocks: doc.blocks().iter().map(convert_block).collect(),
    }
}

fn convert_author(author: &Author) -> JsonAuthor<'_> {
    JsonAuthor {
        name: &author.name,
        email: author.email.as_deref(),
    }
}

fn list_kind(kind: ListKind) -> &'static str {
    match kind {
        ListKind::Ordered => "ordered",
        ListKind::Unordered => "unordered",
    }
}

fn convert_block(block: &Block) -> JsonBlock<'_> {
    match block {
        Block::Paragraph(p) => JsonBlock::Paragraph {
            eles: convert_eles(&p.eles),
        },
        Block::Heading(h) => JsonBlock::Heading {
            depth: h.depth,
            eles: convert_eles(&h.eles),
            children: h.children.iter().map(convert_block).collect(),
        },
        Block::List(l) => JsonBlock::List {
            kind: list_kind(l.kind),
            items: l.items.iter().map(convert_list_item).collect(),
        },
        Block::Table(t) => JsonBlock::Table {
            rows: t
                .rows
                .iter()
                .map(|row| row.cells.iter().map(|c| convert_eles(&c.eles)).collect())
                .collect(),
        },
        Block::CodeBlock(c) => JsonBlock::CodeBlock {
            lang: c.lang.as_deref(),
            text: &c.text,
        },
        Block::Rule => JsonBlock::Rule,
        Block::Toc(range) => JsonBlock::Toc {
            min: range.min,
            max: range.max,
        },
        Block::Include(include) => JsonBlock::Include {
            reference: include.reference().to_string(),
        },
    }
}

fn convert_list_item(item: &ListItem) -> JsonListItem<'_> {
    JsonListItem {
        kind: list_kind(item.kind),
        depth: item.depth,
        eles: convert_eles(&item.eles),
        children: item.children.iter().map(convert_block).collect(),
    }
}

fn convert_eles(eles: &[Ele]) -> Vec<JsonEle<'_>> {
    eles.iter()
        .map(|ele| JsonEle {
            text: &ele.text,
            style: ele.style.as_ref().map(convert_style),
            href: ele.href.as_deref(),
            src: ele.src.as_deref(),
        })
        .collect()
}

fn convert_style(style: &Style) -> JsonStyle<'_> {
    JsonStyle {
        bold: style.bold,
        italic: style.italic,
        underline: style.underline,
        sup: style.sup,
        sub: style.sub,
        strike: style.strike,
        color: style.color.as_deref(),
    }
}
