//! Integration tests for the conversion context

use std::fs;
use std::path::Path;

use tempfile::TempDir;
use zdoc_core::{
    BoundsError, ConvertContext, ConvertError, GoogleWikiRender, IncludeError, TextParser,
    DEFAULT_INDEX_FILE,
};

fn root_of(path: &Path) -> String {
    path.to_str().unwrap().to_string()
}

/// A context converting from `<tmp>/src` into `<tmp>/out`.
fn context(dir: &TempDir) -> ConvertContext {
    let src = dir.path().join("src");
    fs::create_dir_all(&src).unwrap();

    let mut ctx: ConvertContext = ConvertContext::default();
    ctx.set_src(&root_of(&src));
    ctx.set_dest(&root_of(&dir.path().join("out")));
    ctx
}

// ============================================================================
// Setting Tests
// ============================================================================

#[test]
fn test_src_normalization() {
    let mut ctx: ConvertContext = ConvertContext::default();

    ctx.set_src("a\\b");
    assert_eq!(ctx.src(), "a/b/");

    ctx.set_src("a/b/");
    assert_eq!(ctx.src(), "a/b/");

    let normalized = ctx.src().to_string();
    ctx.set_src(&normalized);
    assert_eq!(ctx.src(), normalized);
}

#[test]
fn test_dest_normalization() {
    let mut ctx: ConvertContext = ConvertContext::default();
    ctx.set_dest("c:\\out\\wiki");
    assert_eq!(ctx.dest(), "c:/out/wiki/");
}

#[test]
fn test_index_file_default() {
    let mut ctx: ConvertContext = ConvertContext::default();
    assert_eq!(ctx.index_file(), DEFAULT_INDEX_FILE);
    assert_eq!(ctx.index_file(), "index.xml");

    ctx.set_index_file("   ");
    assert_eq!(ctx.index_file(), "index.xml");

    ctx.set_index_file("");
    assert_eq!(ctx.index_file(), "index.xml");

    ctx.set_index_file("toc.xml");
    assert_eq!(ctx.index_file(), "toc.xml");
}

#[test]
fn test_args() {
    let mut ctx: ConvertContext = ConvertContext::default();
    assert_eq!(ctx.arg_count(), 0);
    assert_eq!(ctx.arg(0), Err(BoundsError { index: 0, len: 0 }));

    ctx.add_arg("draft");
    ctx.add_arg(String::from("--strict"));

    assert_eq!(ctx.arg_count(), 2);
    assert_eq!(ctx.arg(0), Ok("draft"));
    assert_eq!(ctx.arg(1), Ok("--strict"));
    assert_eq!(ctx.args(), &["draft".to_string(), "--strict".to_string()]);

    let err = ctx.arg(2).unwrap_err();
    assert_eq!(err, BoundsError { index: 2, len: 2 });
    assert_eq!(err.to_string(), "argument index 2 out of range (2 arguments)");
}

#[test]
fn test_parser_and_render_accessors() {
    let mut ctx = ConvertContext::new(TextParser::new("first"), GoogleWikiRender);
    assert_eq!(ctx.parser().root(), Path::new("first"));

    ctx.set_parser(TextParser::new("second"));
    assert_eq!(ctx.parser().root(), Path::new("second"));

    ctx.set_render(GoogleWikiRender::new());
    let _ = ctx.render();
}

#[test]
fn test_src_roots_the_parser() {
    let mut ctx: ConvertContext = ConvertContext::default();
    ctx.set_src("docs\\v1");
    assert_eq!(ctx.parser().root(), Path::new("docs/v1"));

    ctx.set_parser(TextParser::new("elsewhere"));
    assert_eq!(ctx.parser().root(), Path::new("docs/v1"));
}

#[test]
fn test_paths() {
    let mut ctx: ConvertContext = ConvertContext::default();
    ctx.set_src("in");
    ctx.set_dest("out");

    assert_eq!(ctx.source_path("a\\b.zdoc"), Path::new("in/a/b.zdoc"));
    assert_eq!(ctx.output_path("a/b.zdoc"), Path::new("out/a/b.wiki"));
    assert_eq!(ctx.index_path(), Path::new("out/index.xml"));
}

// ============================================================================
// Conversion Tests
// ============================================================================

#[test]
fn test_convert_file_with_include() {
    let dir = TempDir::new().unwrap();
    let ctx = context(&dir);
    fs::write(
        dir.path().join("src/guide.zdoc"),
        "#title: Guide\n#author: Ada\n\n# Intro\n@>include: part.zdoc",
    )
    .unwrap();
    fs::write(dir.path().join("src/part.zdoc"), "from the part").unwrap();

    let converted = ctx.convert("guide.zdoc").unwrap();
    assert_eq!(converted.title, "Guide");
    assert_eq!(converted.output, dir.path().join("out/guide.wiki"));

    let wiki = fs::read_to_string(&converted.output).unwrap();
    assert!(wiki.starts_with("#summary Guide\n"));
    assert!(wiki.contains("*Ada*"));
    assert!(wiki.ends_with("=`Intro`=\nfrom the part\n\n"));
}

#[test]
fn test_convert_resolves_includes_against_src() {
    let dir = TempDir::new().unwrap();
    let docs = dir.path().join("docs");
    fs::create_dir_all(&docs).unwrap();
    fs::write(docs.join("a.zdoc"), "#title: A\n\n@>include: b.zdoc").unwrap();
    fs::write(docs.join("b.zdoc"), "from b").unwrap();

    let mut ctx: ConvertContext = ConvertContext::default();
    ctx.set_src(&root_of(&docs));
    ctx.set_dest(&root_of(&dir.path().join("out")));

    let converted = ctx.convert("a.zdoc").unwrap();
    let wiki = fs::read_to_string(converted.output).unwrap();
    assert!(wiki.ends_with("from b\n\n"), "got: {}", wiki);
}

#[test]
fn test_convert_creates_nested_output_dirs() {
    let dir = TempDir::new().unwrap();
    let ctx = context(&dir);
    fs::create_dir_all(dir.path().join("src/sub")).unwrap();
    fs::write(dir.path().join("src/sub/page.zdoc"), "#title: Page").unwrap();

    let converted = ctx.convert("sub\\page.zdoc").unwrap();
    assert_eq!(converted.output, dir.path().join("out/sub/page.wiki"));
    assert!(converted.output.is_file());
}

#[test]
fn test_convert_missing_source() {
    let dir = TempDir::new().unwrap();
    let ctx = context(&dir);

    match ctx.convert("nope.zdoc") {
        Err(ConvertError::Read { path, .. }) => {
            assert_eq!(path, dir.path().join("src/nope.zdoc"));
        }
        other => panic!("Expected read error, got {:?}", other),
    }
}

#[test]
fn test_convert_parse_failure() {
    let dir = TempDir::new().unwrap();
    let ctx = context(&dir);
    fs::write(dir.path().join("src/bad.zdoc"), "#bogus: x").unwrap();

    assert!(matches!(
        ctx.convert("bad.zdoc"),
        Err(ConvertError::Parse { .. })
    ));
    assert!(!dir.path().join("out/bad.wiki").exists());
}

#[test]
fn test_convert_missing_include() {
    let dir = TempDir::new().unwrap();
    let ctx = context(&dir);
    fs::write(dir.path().join("src/doc.zdoc"), "@>include: gone.zdoc").unwrap();

    assert!(matches!(
        ctx.convert("doc.zdoc"),
        Err(ConvertError::Include(IncludeError::Open { .. }))
    ));
}

#[test]
fn test_convert_self_include_is_a_cycle() {
    let dir = TempDir::new().unwrap();
    let ctx = context(&dir);
    fs::write(dir.path().join("src/loop.zdoc"), "@>include: loop.zdoc").unwrap();

    assert!(matches!(
        ctx.convert("loop.zdoc"),
        Err(ConvertError::Include(IncludeError::Cycle { .. }))
    ));
}

#[test]
fn test_convert_all_and_index() {
    let dir = TempDir::new().unwrap();
    let mut ctx = context(&dir);
    ctx.set_index_file("docs.xml");
    fs::write(dir.path().join("src/a.zdoc"), "#title: A & B\n\ntext").unwrap();
    fs::write(dir.path().join("src/b.zdoc"), "#title: \"Quoted\"").unwrap();

    let converted = ctx.convert_all(["a.zdoc", "b.zdoc"]).unwrap();
    assert_eq!(converted.len(), 2);

    let index = ctx.write_index(&converted).unwrap();
    assert_eq!(index, dir.path().join("out/docs.xml"));

    let xml = fs::read_to_string(index).unwrap();
    assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<docs>\n"));
    assert!(xml.contains("  <doc path=\"a.wiki\" title=\"A &amp; B\"/>\n"));
    assert!(xml.contains("  <doc path=\"b.wiki\" title=\"&quot;Quoted&quot;\"/>\n"));
    assert!(xml.ends_with("</docs>\n"));
}

#[test]
fn test_convert_all_stops_at_first_failure() {
    let dir = TempDir::new().unwrap();
    let ctx = context(&dir);
    fs::write(dir.path().join("src/ok.zdoc"), "fine").unwrap();

    assert!(ctx.convert_all(["missing.zdoc", "ok.zdoc"]).is_err());
    assert!(!dir.path().join("out/ok.wiki").exists());
}
