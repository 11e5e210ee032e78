//! Content module - records fetched from the content store and rich-text rendering

mod model;
mod portable_text;
pub mod queries;

pub use model::{Author, Comment, PathEntry, Post, PostAuthor, PostSummary, Reference, Slug};
pub use portable_text::{Block, MarkDef, PortableTextRenderer, Span, TextBlock};
