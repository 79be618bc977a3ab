//! # zdoc core
//!
//! Document tree model, parse/render contracts, lazy include resolution and
//! the Google Code wiki renderer.
//!
//! ## Quick Start
//!
//! ```rust
//! use zdoc_core::{DocRender, GoogleWikiRender, TextParser};
//!
//! let input = "#title: Hello\n\n# Intro\nThis is a **paragraph**.";
//! let doc = TextParser::default().parse_str(input).unwrap();
//! let wiki = GoogleWikiRender.render(&doc);
//!
//! assert!(wiki.starts_with("#summary Hello\n"));
//! ```
//!
//! ## Includes
//!
//! `@>include: path` lines become [`Include`] leaves. Nothing is read while
//! parsing; [`Include::expand`] reads and parses the referenced file on every
//! call, and [`Document::resolve_includes`] splices expanded bodies into the
//! tree before rendering.

pub mod ast;
pub mod context;
pub mod error;
pub mod include;
pub mod inline;
pub mod lexer;
pub mod parser;
pub mod render;

pub use ast::{Author, Block, Document, Ele, ListKind, Style};
pub use context::{ConvertContext, Converted, DEFAULT_INDEX_FILE};
pub use error::{BoundsError, ConvertError, IncludeError, ParseError, ParseErrorKind};
pub use include::{Include, Reference};
pub use parser::{DocParser, TextParser};
pub use render::{DocRender, GoogleWikiRender};
