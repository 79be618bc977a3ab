//! Integration tests for the zdoc text parser

use std::path::Path;

use zdoc_core::ast::{IndexRange, List};
use zdoc_core::{Block, DocParser, Ele, ListKind, ParseErrorKind, Style, TextParser};

fn parse(input: &str) -> zdoc_core::Document {
    TextParser::default().parse_str(input).unwrap()
}

fn parse_err(input: &str) -> zdoc_core::ParseError {
    TextParser::default().parse_str(input).unwrap_err()
}

fn expect_list(block: &Block) -> &List {
    match block {
        Block::List(list) => list,
        other => panic!("Expected list, got {:?}", other),
    }
}

// ============================================================================
// Header Directive Tests
// ============================================================================

#[test]
fn test_parse_title() {
    let doc = parse("#title: Conversion Guide\n\nBody.");
    assert_eq!(doc.title, "Conversion Guide");
    assert_eq!(doc.blocks().len(), 1);
}

#[test]
fn test_parse_without_title() {
    let doc = parse("Just a paragraph.");
    assert_eq!(doc.title, "");
    assert!(doc.authors.is_empty());
    assert!(doc.verifiers.is_empty());
}

#[test]
fn test_parse_authors_and_verifiers() {
    let input = "#title: T\n#author: Ada <ada@example.com>\n#author: Bob\n#verifier: Cy <cy@example.com>\n";
    let doc = parse(input);

    assert_eq!(doc.authors.len(), 2);
    assert_eq!(doc.authors[0].name, "Ada");
    assert_eq!(doc.authors[0].email.as_deref(), Some("ada@example.com"));
    assert_eq!(doc.authors[1].name, "Bob");
    assert_eq!(doc.authors[1].email, None);

    assert_eq!(doc.verifiers.len(), 1);
    assert_eq!(doc.verifiers[0].name, "Cy");
    assert!(doc.blocks().is_empty());
}

#[test]
fn test_parse_author_with_empty_email() {
    let doc = parse("#author: Ada <>");
    assert_eq!(doc.authors[0].name, "Ada");
    assert_eq!(doc.authors[0].email, None);
}

#[test]
fn test_malformed_author() {
    let err = parse_err("#author: Ada <ada@example.com");
    assert_eq!(err.kind(), ParseErrorKind::InvalidMetadata);
    assert_eq!(err.line(), Some(1));

    let err = parse_err("#title: T\n#verifier:   ");
    assert_eq!(err.kind(), ParseErrorKind::InvalidMetadata);
    assert_eq!(err.line(), Some(2));
}

#[test]
fn test_unknown_directive() {
    let err = parse_err("#title: T\n\n#subtitle: nope");
    assert_eq!(err.kind(), ParseErrorKind::UnknownDirective);
    assert_eq!(err.line(), Some(3));
    assert!(err.to_string().contains("subtitle"));
}

#[test]
fn test_heading_with_colon_is_not_directive() {
    let doc = parse("# Note: read this");
    match &doc.blocks()[0] {
        Block::Heading(h) => assert_eq!(h.text(), "Note: read this"),
        other => panic!("Expected heading, got {:?}", other),
    }
}

// ============================================================================
// Table of Contents Tests
// ============================================================================

#[test]
fn test_index_max_only() {
    let doc = parse("#index: 2");
    assert_eq!(doc.blocks(), &[Block::Toc(IndexRange { min: 0, max: 2 })]);
}

#[test]
fn test_index_min_max() {
    let doc = parse("#index: 1, 3");
    assert_eq!(doc.blocks(), &[Block::Toc(IndexRange { min: 1, max: 3 })]);
}

#[test]
fn test_index_invalid() {
    assert_eq!(parse_err("#index: 3,1").kind(), ParseErrorKind::InvalidSyntax);
    assert_eq!(parse_err("#index: deep").kind(), ParseErrorKind::InvalidSyntax);
}

// ============================================================================
// Heading Tests
// ============================================================================

#[test]
fn test_heading_owns_following_blocks() {
    let doc = parse("# Intro\nhello\n\n---");
    assert_eq!(doc.blocks().len(), 1);

    match &doc.blocks()[0] {
        Block::Heading(h) => {
            assert_eq!(h.depth, 1);
            assert_eq!(h.text(), "Intro");
            assert_eq!(h.children.len(), 2);
            assert!(matches!(h.children[0], Block::Paragraph(_)));
            assert_eq!(h.children[1], Block::Rule);
        }
        other => panic!("Expected heading, got {:?}", other),
    }
}

#[test]
fn test_heading_nesting() {
    let doc = parse("intro\n# A\na\n## B\nb\n### C\n# D\nd");
    let blocks = doc.blocks();
    assert_eq!(blocks.len(), 3);
    assert!(matches!(blocks[0], Block::Paragraph(_)));

    let Block::Heading(a) = &blocks[1] else {
        panic!("Expected heading A");
    };
    assert_eq!(a.text(), "A");
    assert_eq!(a.children.len(), 2);

    let Block::Heading(b) = &a.children[1] else {
        panic!("Expected heading B");
    };
    assert_eq!(b.depth, 2);
    assert_eq!(b.children.len(), 2);
    assert!(matches!(&b.children[1], Block::Heading(c) if c.depth == 3 && c.children.is_empty()));

    let Block::Heading(d) = &blocks[2] else {
        panic!("Expected heading D");
    };
    assert_eq!(d.text(), "D");
    assert_eq!(d.children.len(), 1);
}

#[test]
fn test_heading_levels() {
    for level in 1..=6u8 {
        let input = format!("{} Heading", "#".repeat(level as usize));
        let doc = parse(&input);
        match &doc.blocks()[0] {
            Block::Heading(h) => assert_eq!(h.depth, level),
            other => panic!("Expected heading, got {:?}", other),
        }
    }
}

#[test]
fn test_heading_too_deep_is_text() {
    let doc = parse("####### seven");
    assert!(matches!(doc.blocks()[0], Block::Paragraph(_)));
}

#[test]
fn test_heading_text_joins_styled_runs() {
    let doc = parse("## Using **zdoc** today");
    match &doc.blocks()[0] {
        Block::Heading(h) => {
            assert_eq!(h.eles.len(), 3);
            assert_eq!(h.text(), "Using zdoc today");
        }
        other => panic!("Expected heading, got {:?}", other),
    }
}

// ============================================================================
// Paragraph and Rule Tests
// ============================================================================

#[test]
fn test_paragraph_joins_lines() {
    let doc = parse("first line\nsecond line\n\nnext paragraph");
    assert_eq!(doc.blocks().len(), 2);
    match &doc.blocks()[0] {
        Block::Paragraph(p) => assert_eq!(p.eles, vec![Ele::text("first line second line")]),
        other => panic!("Expected paragraph, got {:?}", other),
    }
}

#[test]
fn test_rule() {
    let doc = parse("above\n\n-----\n\nbelow");
    assert_eq!(doc.blocks().len(), 3);
    assert_eq!(doc.blocks()[1], Block::Rule);
}

#[test]
fn test_crlf_input() {
    let doc = parse("#title: T\r\n\r\n# Intro\r\nhello\r\n");
    assert_eq!(doc.title, "T");
    match &doc.blocks()[0] {
        Block::Heading(h) => {
            assert_eq!(h.text(), "Intro");
            assert_eq!(h.children.len(), 1);
        }
        other => panic!("Expected heading, got {:?}", other),
    }
}

// ============================================================================
// Inline Tests
// ============================================================================

#[test]
fn test_inline_styles() {
    let doc = parse("plain **bold** *it* __under__ ^up^ ,,down,, ~~gone~~");
    let Block::Paragraph(p) = &doc.blocks()[0] else {
        panic!("Expected paragraph");
    };

    let styled: Vec<(&str, Style)> = p
        .eles
        .iter()
        .filter_map(|e| e.style.clone().map(|s| (e.text.as_str(), s)))
        .collect();

    assert_eq!(styled.len(), 6);
    assert_eq!(styled[0], ("bold", Style { bold: true, ..Style::default() }));
    assert_eq!(styled[1], ("it", Style { italic: true, ..Style::default() }));
    assert_eq!(styled[2], ("under", Style { underline: true, ..Style::default() }));
    assert_eq!(styled[3], ("up", Style { sup: true, ..Style::default() }));
    assert_eq!(styled[4], ("down", Style { sub: true, ..Style::default() }));
    assert_eq!(styled[5], ("gone", Style { strike: true, ..Style::default() }));
    assert_eq!(p.eles[0], Ele::text("plain "));
}

#[test]
fn test_inline_nested_color() {
    let doc = parse("**a {red|b}**");
    let Block::Paragraph(p) = &doc.blocks()[0] else {
        panic!("Expected paragraph");
    };

    assert_eq!(p.eles.len(), 2);
    assert_eq!(p.eles[0].text, "a ");
    assert_eq!(p.eles[0].style, Some(Style { bold: true, ..Style::default() }));
    assert_eq!(p.eles[1].text, "b");
    assert_eq!(
        p.eles[1].style,
        Some(Style {
            bold: true,
            color: Some("red".to_string()),
            ..Style::default()
        })
    );
}

#[test]
fn test_inline_links_and_images() {
    let doc = parse("see [[the docs|http://x.org]] or [[http://y.org]] [[img:a.png]] [[img:b.png|http://z.org]]");
    let Block::Paragraph(p) = &doc.blocks()[0] else {
        panic!("Expected paragraph");
    };

    let linked: Vec<&Ele> = p.eles.iter().filter(|e| e.has_href() || e.is_image()).collect();
    assert_eq!(linked.len(), 4);
    assert_eq!(linked[0], &Ele::text("the docs").with_href("http://x.org"));
    assert_eq!(linked[1], &Ele::text("http://y.org").with_href("http://y.org"));
    assert_eq!(linked[2], &Ele::image("a.png"));
    assert_eq!(linked[3], &Ele::image("b.png").with_href("http://z.org"));
}

#[test]
fn test_inline_escape_and_unmatched_markers() {
    let doc = parse("\\*not italic\\* and 2 * 3");
    let Block::Paragraph(p) = &doc.blocks()[0] else {
        panic!("Expected paragraph");
    };
    assert_eq!(p.eles, vec![Ele::text("*not italic* and 2 * 3")]);
}

#[test]
fn test_inline_snake_case_is_literal() {
    let doc = parse("call snake_case_name, then stop");
    let Block::Paragraph(p) = &doc.blocks()[0] else {
        panic!("Expected paragraph");
    };
    assert_eq!(p.eles, vec![Ele::text("call snake_case_name, then stop")]);
}

// ============================================================================
// List Tests
// ============================================================================

#[test]
fn test_flat_unordered_list() {
    let doc = parse("- one\n- two\n* three");
    let list = expect_list(&doc.blocks()[0]);
    assert_eq!(list.kind, ListKind::Unordered);
    assert_eq!(list.items.len(), 3);
    assert!(list.items.iter().all(|i| i.depth == 1 && i.children.is_empty()));
}

#[test]
fn test_ordered_list() {
    let doc = parse("1. first\n2. second\n10. tenth");
    let list = expect_list(&doc.blocks()[0]);
    assert_eq!(list.kind, ListKind::Ordered);
    assert_eq!(list.items.len(), 3);
    assert_eq!(list.items[2].eles, vec![Ele::text("tenth")]);
}

#[test]
fn test_nested_list_depths() {
    let doc = parse("- a\n  - b\n    1. c\n- d");
    let list = expect_list(&doc.blocks()[0]);
    assert_eq!(list.items.len(), 2);

    let a = &list.items[0];
    assert_eq!(a.depth, 1);
    let nested = expect_list(&a.children[0]);
    let b = &nested.items[0];
    assert_eq!(b.depth, 2);
    assert_eq!(b.kind, ListKind::Unordered);

    let deepest = expect_list(&b.children[0]);
    assert_eq!(deepest.kind, ListKind::Ordered);
    assert_eq!(deepest.items[0].depth, 3);
    assert_eq!(deepest.items[0].kind, ListKind::Ordered);

    assert_eq!(list.items[1].depth, 1);
}

#[test]
fn test_mixed_item_kinds_keep_their_own_kind() {
    let doc = parse("- bullet\n1. number");
    let list = expect_list(&doc.blocks()[0]);
    assert_eq!(list.kind, ListKind::Unordered);
    assert_eq!(list.items[0].kind, ListKind::Unordered);
    assert_eq!(list.items[1].kind, ListKind::Ordered);
}

#[test]
fn test_list_indentation_jump() {
    let err = parse_err("- a\n      - b");
    assert_eq!(err.kind(), ParseErrorKind::InvalidSyntax);
    assert_eq!(err.line(), Some(2));
}

#[test]
fn test_list_dedent_below_first_item() {
    let err = parse_err("  - a\n- b");
    assert_eq!(err.kind(), ParseErrorKind::InvalidSyntax);
    assert_eq!(err.line(), Some(2));
}

#[test]
fn test_list_at_deepest_level() {
    let mut input = String::new();
    for level in 0..255 {
        input.push_str(&format!("{}- x\n", "  ".repeat(level)));
    }
    input.push_str(&format!("{}- y\n", "  ".repeat(254)));

    let doc = parse(&input);
    let mut list = expect_list(&doc.blocks()[0]);
    while let Some(child) = list.items[0].children.first() {
        list = expect_list(child);
    }

    assert_eq!(list.items.len(), 2);
    assert!(list.items.iter().all(|item| item.depth == u8::MAX));
    assert_eq!(list.items[1].eles, vec![Ele::text("y")]);
}

#[test]
fn test_list_deeper_than_supported() {
    let mut input = String::new();
    for level in 0..256 {
        input.push_str(&format!("{}- x\n", "  ".repeat(level)));
    }

    let err = parse_err(&input);
    assert_eq!(err.kind(), ParseErrorKind::InvalidSyntax);
    assert_eq!(err.line(), Some(256));
}

// ============================================================================
// Table Tests
// ============================================================================

#[test]
fn test_table() {
    let doc = parse("| Name | Value |\n|------|:-----:|\n| a | **1** |");
    let Block::Table(table) = &doc.blocks()[0] else {
        panic!("Expected table");
    };

    assert_eq!(table.rows.len(), 2);
    assert_eq!(table.rows[0].cells.len(), 2);
    assert_eq!(table.rows[0].cells[0].eles, vec![Ele::text("Name")]);
    assert_eq!(
        table.rows[1].cells[1].eles,
        vec![Ele::text("1").with_style(Style {
            bold: true,
            ..Style::default()
        })]
    );
}

// ============================================================================
// Code Block Tests
// ============================================================================

#[test]
fn test_code_block_keeps_raw_text() {
    let doc = parse("```rust\nfn main() {}\n\n    **not bold**\n```");
    let Block::CodeBlock(code) = &doc.blocks()[0] else {
        panic!("Expected code block");
    };
    assert_eq!(code.lang.as_deref(), Some("rust"));
    assert_eq!(code.text, "fn main() {}\n\n    **not bold**\n");
}

#[test]
fn test_code_block_without_lang() {
    let doc = parse("```\nx\n```");
    let Block::CodeBlock(code) = &doc.blocks()[0] else {
        panic!("Expected code block");
    };
    assert_eq!(code.lang, None);
    assert_eq!(code.text, "x\n");
}

#[test]
fn test_unclosed_code_block() {
    let err = parse_err("intro\n\n```\nfn main() {}");
    assert_eq!(err.kind(), ParseErrorKind::UnclosedDelimiter);
    assert_eq!(err.line(), Some(3));
}

// ============================================================================
// Include Tests
// ============================================================================

#[test]
fn test_include_is_a_leaf_resolved_against_root() {
    let doc = TextParser::new("docs")
        .parse_str("@>include: part\\one.zdoc")
        .unwrap();

    match &doc.blocks()[0] {
        Block::Include(include) => {
            assert_eq!(include.reference().path(), Path::new("docs/part/one.zdoc"));
            assert_eq!(include.to_string(), "@>include: docs/part/one.zdoc");
        }
        other => panic!("Expected include, got {:?}", other),
    }
}

#[test]
fn test_include_does_not_touch_filesystem() {
    // The referenced file does not exist; only expansion reads it.
    let doc = TextParser::new("/nonexistent")
        .parse_str("# Body\n@>include: missing.zdoc")
        .unwrap();
    let Block::Heading(h) = &doc.blocks()[0] else {
        panic!("Expected heading");
    };
    assert!(matches!(h.children[0], Block::Include(_)));
}

#[test]
fn test_include_without_locator() {
    assert_eq!(parse_err("@>include:").kind(), ParseErrorKind::InvalidSyntax);
}

// ============================================================================
// Stream Contract Tests
// ============================================================================

#[test]
fn test_parse_from_reader() {
    let mut input: &[u8] = b"#title: From Reader\n\ntext";
    let doc = TextParser::default().parse(&mut input).unwrap();
    assert_eq!(doc.title, "From Reader");
}

#[test]
fn test_parse_invalid_utf8() {
    let mut input: &[u8] = &[b'o', b'k', 0xff, 0xfe];
    let err = TextParser::default().parse(&mut input).unwrap_err();
    assert_eq!(err.kind(), ParseErrorKind::Encoding);
    assert_eq!(err.line(), None);
}

#[test]
fn test_empty_input() {
    let doc = parse("");
    assert_eq!(doc.title, "");
    assert!(doc.blocks().is_empty());
}

// ============================================================================
// Outline Tests
// ============================================================================

#[test]
fn test_outline_display() {
    let doc = parse("#title: Guide\n#author: Ada\n# Intro\nhello\n- item\n```\ncode\n```");
    let outline = doc.to_string();

    assert!(outline.starts_with("Document \"Guide\"\n"));
    assert!(outline.contains("  authors: Ada\n"));
    assert!(outline.contains("  heading(1): Intro\n"));
    assert!(outline.contains("    paragraph: hello\n"));
    assert!(outline.contains("    unordered-list\n"));
    assert!(outline.contains("      * item\n"));
    assert!(outline.contains("    code (1 lines)\n"));
}
