//! Conversion context for batch runs.
//!
//! Holds the source and destination roots, the index file name, free-form
//! arguments, and the parser/render pair used for every file of a run.
//! Setters are meant to be called before the run starts.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use crate::error::{BoundsError, ConvertError};
use crate::parser::{DocParser, TextParser};
use crate::render::{DocRender, GoogleWikiRender};

/// Index file name used when none (or a blank one) is configured.
pub const DEFAULT_INDEX_FILE: &str = "index.xml";

/// One converted source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Converted {
    pub source: PathBuf,
    pub output: PathBuf,
    pub title: String,
}

/// Configuration and parser/render pairing for a conversion run.
#[derive(Debug, Clone)]
pub struct ConvertContext<P = TextParser, R = GoogleWikiRender> {
    src: String,
    dest: String,
    index_file: Option<String>,
    args: Vec<String>,
    parser: P,
    render: R,
}

impl<P: Default, R: Default> Default for ConvertContext<P, R> {
    fn default() -> Self {
        Self::new(P::default(), R::default())
    }
}

impl<P, R> ConvertContext<P, R> {
    pub fn new(parser: P, render: R) -> Self {
        Self {
            src: String::new(),
            dest: String::new(),
            index_file: None,
            args: Vec::new(),
            parser,
            render,
        }
    }

    /// Source root, `/`-separated with a trailing `/`.
    pub fn src(&self) -> &str {
        &self.src
    }

    /// Destination root, `/`-separated with a trailing `/`.
    pub fn dest(&self) -> &str {
        &self.dest
    }

    pub fn set_dest(&mut self, dest: &str) {
        self.dest = normalize_root(dest);
    }

    /// Index file name, [`DEFAULT_INDEX_FILE`] when unset or blank.
    pub fn index_file(&self) -> &str {
        match &self.index_file {
            Some(name) if !name.trim().is_empty() => name,
            _ => DEFAULT_INDEX_FILE,
        }
    }

    pub fn set_index_file(&mut self, name: impl Into<String>) {
        self.index_file = Some(name.into());
    }

    pub fn add_arg(&mut self, arg: impl Into<String>) {
        self.args.push(arg.into());
    }

    /// Positional argument, 0-based.
    pub fn arg(&self, index: usize) -> Result<&str, BoundsError> {
        self.args
            .get(index)
            .map(String::as_str)
            .ok_or(BoundsError {
                index,
                len: self.args.len(),
            })
    }

    pub fn arg_count(&self) -> usize {
        self.args.len()
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn parser(&self) -> &P {
        &self.parser
    }

    pub fn render(&self) -> &R {
        &self.render
    }

    pub fn set_render(&mut self, render: R) {
        self.render = render;
    }

    /// Location of `rel` under the source root.
    pub fn source_path(&self, rel: &str) -> PathBuf {
        PathBuf::from(format!("{}{}", self.src, normalize_rel(rel)))
    }

    /// Location of the index file under the destination root.
    pub fn index_path(&self) -> PathBuf {
        PathBuf::from(format!("{}{}", self.dest, self.index_file()))
    }
}

impl<P: DocParser, R> ConvertContext<P, R> {
    /// Set the source root. Include locators of every converted file
    /// resolve against it.
    pub fn set_src(&mut self, src: &str) {
        self.src = normalize_root(src);
        self.parser.set_root(Path::new(&self.src));
    }

    /// Replace the parser, rooting it at the current source root if one is set.
    pub fn set_parser(&mut self, mut parser: P) {
        if !self.src.is_empty() {
            parser.set_root(Path::new(&self.src));
        }
        self.parser = parser;
    }
}

impl<P, R> ConvertContext<P, R>
where
    P: DocParser,
    R: DocRender,
    R::Output: AsRef<[u8]>,
{
    /// Location of the rendered form of `rel` under the destination root.
    pub fn output_path(&self, rel: &str) -> PathBuf {
        let rel = Path::new(&normalize_rel(rel)).with_extension(self.render.extension());
        Path::new(&self.dest).join(rel)
    }

    /// Parse `rel`, expand its includes, render it and write the result.
    pub fn convert(&self, rel: &str) -> Result<Converted, ConvertError> {
        let source = self.source_path(rel);
        log::info!("converting {}", source.display());

        let mut doc = {
            let mut file = File::open(&source).map_err(|err| ConvertError::Read {
                path: source.clone(),
                source: err,
            })?;
            self.parser
                .parse(&mut file)
                .map_err(|err| ConvertError::Parse {
                    path: source.clone(),
                    source: err,
                })?
        };

        let included = doc.resolve_includes_from(&source)?;
        if included > 0 {
            log::debug!("{}: expanded {} includes", source.display(), included);
        }

        let output = self.output_path(rel);
        let write_err = |err| ConvertError::Write {
            path: output.clone(),
            source: err,
        };
        if let Some(parent) = output.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let rendered = self.render.render(&doc);
        fs::write(&output, rendered.as_ref()).map_err(write_err)?;

        Ok(Converted {
            source,
            output,
            title: doc.title,
        })
    }

    /// Convert every file in order, stopping at the first failure.
    pub fn convert_all<'a>(
        &self,
        rels: impl IntoIterator<Item = &'a str>,
    ) -> Result<Vec<Converted>, ConvertError> {
        rels.into_iter().map(|rel| self.convert(rel)).collect()
    }

    /// Write the index file listing converted documents.
    pub fn write_index(&self, converted: &[Converted]) -> Result<PathBuf, ConvertError> {
        let path = self.index_path();
        let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<docs>\n");
        for doc in converted {
            let output = doc.output.strip_prefix(&self.dest).unwrap_or(&doc.output);
            xml.push_str(&format!(
                "  <doc path=\"{}\" title=\"{}\"/>\n",
                escape_attr(&output.to_string_lossy().replace('\\', "/")),
                escape_attr(&doc.title)
            ));
        }
        xml.push_str("</docs>\n");

        let write_err = |err| ConvertError::Write {
            path: path.clone(),
            source: err,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        fs::write(&path, xml).map_err(write_err)?;
        log::info!("wrote index {} ({} documents)", path.display(), converted.len());
        Ok(path)
    }
}

fn normalize_root(root: &str) -> String {
    let root = root.replace('\\', "/");
    if root.ends_with('/') {
        root
    } else {
        root + "/"
    }
}

fn normalize_rel(rel: &str) -> String {
    rel.replace('\\', "/").trim_start_matches('/').to_string()
}

fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}
