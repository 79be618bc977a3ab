//! Deferred transclusion of other documents.
//!
//! An [`Include`] leaf is created while the including document is parsed,
//! with its [`Reference`] already resolved against the source root. The
//! embedded document is only read when the leaf is expanded, and every
//! expansion reads and parses the file again.

use std::fmt;
use std::fs::File;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use crate::ast::{Block, Document};
use crate::error::IncludeError;
use crate::parser::DocParser;

/// Normalized locator of another source document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Reference {
    path: PathBuf,
}

impl Reference {
    /// Resolve `locator` against `root`.
    ///
    /// Backslashes are treated as separators. Absolute locators are kept as
    /// they are, relative ones are joined to the root. `.` and `..`
    /// components are folded lexically.
    pub fn resolve(root: impl AsRef<Path>, locator: &str) -> Self {
        let normalized = locator.trim().replace('\\', "/");
        let locator = Path::new(&normalized);
        let joined = if locator.is_absolute() {
            locator.to_path_buf()
        } else {
            root.as_ref().join(locator)
        };
        Self {
            path: clean(&joined),
        }
    }

    /// Reference an already resolved path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: clean(&path.into()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.to_string_lossy().replace('\\', "/"))
    }
}

fn clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Include leaf: a reference plus the parser able to read it.
#[derive(Clone)]
pub struct Include {
    reference: Reference,
    parser: Arc<dyn DocParser>,
}

impl Include {
    pub fn new(reference: Reference, parser: Arc<dyn DocParser>) -> Self {
        Self { reference, parser }
    }

    pub fn reference(&self) -> &Reference {
        &self.reference
    }

    /// Read and parse the referenced document.
    ///
    /// The file is closed before returning, on success and on failure.
    pub fn expand(&self) -> Result<Document, IncludeError> {
        log::debug!("expanding include {}", self.reference);
        let mut file = File::open(self.reference.path()).map_err(|source| IncludeError::Open {
            reference: self.reference.clone(),
            source,
        })?;
        self.parser
            .parse(&mut file)
            .map_err(|source| IncludeError::Parse {
                reference: self.reference.clone(),
                source,
            })
    }
}

impl fmt::Debug for Include {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Include")
            .field("reference", &self.reference)
            .finish_non_exhaustive()
    }
}

impl PartialEq for Include {
    fn eq(&self, other: &Self) -> bool {
        self.reference == other.reference
    }
}

impl fmt::Display for Include {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@>include: {}", self.reference)
    }
}

impl Document {
    /// Replace every include leaf with the body of the document it points to.
    ///
    /// Expansion is recursive. Returns the number of leaves replaced.
    pub fn resolve_includes(&mut self) -> Result<usize, IncludeError> {
        let mut chain = Vec::new();
        resolve_blocks(&mut self.root.children, &mut chain)
    }

    /// Like [`Document::resolve_includes`], treating `origin` as the file this
    /// document was read from so that a self-include is reported as a cycle.
    pub fn resolve_includes_from(&mut self, origin: impl AsRef<Path>) -> Result<usize, IncludeError> {
        let mut chain = vec![Reference::new(origin.as_ref())];
        resolve_blocks(&mut self.root.children, &mut chain)
    }
}

fn resolve_blocks(blocks: &mut Vec<Block>, chain: &mut Vec<Reference>) -> Result<usize, IncludeError> {
    let mut replaced = 0;
    let mut i = 0;

    while i < blocks.len() {
        let expanded = match &mut blocks[i] {
            Block::Include(include) => Some(expand_in_chain(include, chain)?),
            Block::Heading(heading) => {
                replaced += resolve_blocks(&mut heading.children, chain)?;
                None
            }
            Block::List(list) => {
                for item in &mut list.items {
                    replaced += resolve_blocks(&mut item.children, chain)?;
                }
                None
            }
            _ => None,
        };

        match expanded {
            Some((body, nested)) => {
                replaced += nested + 1;
                let len = body.len();
                blocks.splice(i..=i, body);
                i += len;
            }
            None => i += 1,
        }
    }

    Ok(replaced)
}

fn expand_in_chain(
    include: &Include,
    chain: &mut Vec<Reference>,
) -> Result<(Vec<Block>, usize), IncludeError> {
    let reference = include.reference();
    if chain.contains(reference) {
        return Err(IncludeError::Cycle {
            reference: reference.clone(),
        });
    }

    let mut doc = include.expand()?;
    chain.push(reference.clone());
    let nested = resolve_blocks(&mut doc.root.children, chain);
    chain.pop();

    Ok((doc.root.children, nested?))
}
