//! JSON syntax trees with byte-offset spans.

mod line_index;
mod node;
mod parser;

pub use line_index::LineIndex;
pub use node::{NodeKind, Span, SyntaxNode};
pub use parser::{ParseError, parse, string_at};
