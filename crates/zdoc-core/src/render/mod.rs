//! Render contract and output dialects.
//!
//! A [`DocRender`] walks a [`Document`] and produces a dialect-specific
//! output value. Every call builds its own output; nothing is kept between
//! calls, so one render value can serve many documents.

use crate::ast::Document;

pub mod googlewiki;

pub use googlewiki::GoogleWikiRender;

/// Converts a document into an output representation.
pub trait DocRender {
    /// Output accumulator produced by one render call.
    type Output;

    fn render(&self, doc: &Document) -> Self::Output;

    /// File extension (without the dot) for rendered files.
    fn extension(&self) -> &str;
}
