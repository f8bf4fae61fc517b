//! Strict JSON parsing on top of the tree-sitter JSON grammar.
//!
//! tree-sitter always produces a tree, recovering from errors. [`parse`]
//! rejects any tree containing an error or missing node so callers never see
//! a partial result. [`string_at`] keeps the recovered tree and is meant for
//! documents that are being edited.

use super::node::{Span, SyntaxNode};
use thiserror::Error;
use tree_sitter::{Node, Parser, Tree};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} at byte {offset}")]
pub struct ParseError {
    pub offset: usize,
    pub message: String,
}

impl ParseError {
    fn new(offset: usize, message: impl Into<String>) -> Self {
        Self {
            offset,
            message: message.into(),
        }
    }
}

fn parse_tree(text: &str) -> Result<Tree, ParseError> {
    let mut parser = Parser::new();
    let language: tree_sitter::Language = tree_sitter_json::LANGUAGE.into();
    parser
        .set_language(&language)
        .map_err(|e| ParseError::new(0, e.to_string()))?;
    parser
        .parse(text, None)
        .ok_or_else(|| ParseError::new(0, "parser produced no tree"))
}

/// Parse `text` as a single JSON value.
pub fn parse(text: &str) -> Result<SyntaxNode, ParseError> {
    let tree = parse_tree(text)?;
    let root = tree.root_node();

    if root.has_error() {
        let offset = first_error(root).unwrap_or(root.start_byte());
        return Err(ParseError::new(offset, "malformed JSON"));
    }

    let mut cursor = root.walk();
    let mut values = root
        .named_children(&mut cursor)
        .filter(|n| n.kind() != "comment");
    let value = values
        .next()
        .ok_or_else(|| ParseError::new(text.len(), "empty document"))?;
    if let Some(extra) = values.next() {
        return Err(ParseError::new(
            extra.start_byte(),
            "unexpected value after end of document",
        ));
    }

    lower(value, text)
}

fn first_error(node: Node) -> Option<usize> {
    if node.is_error() || node.is_missing() {
        return Some(node.start_byte());
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.has_error() || child.is_missing() {
            if let Some(offset) = first_error(child) {
                return Some(offset);
            }
        }
    }
    None
}

fn lower(node: Node, text: &str) -> Result<SyntaxNode, ParseError> {
    let span = Span::from(node.byte_range());
    let mut cursor = node.walk();

    match node.kind() {
        "object" => {
            let mut properties = Vec::new();
            for child in node.named_children(&mut cursor) {
                match child.kind() {
                    "pair" => properties.push(lower_pair(child, text)?),
                    "comment" => {}
                    other => {
                        return Err(ParseError::new(
                            child.start_byte(),
                            format!("unexpected {other} in object"),
                        ));
                    }
                }
            }
            Ok(SyntaxNode::Object { span, properties })
        }
        "array" => {
            let mut elements = Vec::new();
            for child in node.named_children(&mut cursor) {
                if child.kind() != "comment" {
                    elements.push(lower(child, text)?);
                }
            }
            Ok(SyntaxNode::Array { span, elements })
        }
        "string" => Ok(SyntaxNode::String {
            span,
            text: decode_string(&text[span.start..span.end])
                .ok_or_else(|| ParseError::new(span.start, "invalid string literal"))?,
        }),
        "number" => Ok(SyntaxNode::Number {
            span,
            text: text[span.start..span.end].to_string(),
        }),
        "true" | "false" | "null" => Ok(SyntaxNode::Literal {
            span,
            text: text[span.start..span.end].to_string(),
        }),
        other => Err(ParseError::new(
            span.start,
            format!("unexpected {other} node"),
        )),
    }
}

fn lower_pair(node: Node, text: &str) -> Result<SyntaxNode, ParseError> {
    let span = Span::from(node.byte_range());
    let key = node
        .child_by_field_name("key")
        .ok_or_else(|| ParseError::new(span.start, "property without key"))?;
    if key.kind() != "string" {
        return Err(ParseError::new(key.start_byte(), "property key must be a string"));
    }
    let value = node
        .child_by_field_name("value")
        .ok_or_else(|| ParseError::new(span.end, "property without value"))?;

    Ok(SyntaxNode::Property {
        span,
        key: Box::new(lower(key, text)?),
        value: Box::new(lower(value, text)?),
    })
}

/// Decode a quoted JSON string token, resolving escapes.
///
/// Unpaired UTF-16 surrogates are valid JSON but not valid Rust strings; they
/// decode to U+FFFD.
fn decode_string(token: &str) -> Option<String> {
    let inner = token.strip_prefix('"')?.strip_suffix('"')?;
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next()? {
            '"' => out.push('"'),
            '\\' => out.push('\\'),
            '/' => out.push('/'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'u' => {
                let unit = hex_unit(&mut chars)?;
                if (0xD800..0xDC00).contains(&unit) {
                    // A high surrogate only pairs with an immediately following `\uDC00..`.
                    let mut lookahead = chars.clone();
                    let low = match (lookahead.next(), lookahead.next()) {
                        (Some('\\'), Some('u')) => hex_unit(&mut lookahead)
                            .filter(|low| (0xDC00..0xE000).contains(low)),
                        _ => None,
                    };
                    match low {
                        Some(low) => {
                            chars = lookahead;
                            let code = 0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00);
                            out.push(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
                        }
                        None => out.push(char::REPLACEMENT_CHARACTER),
                    }
                } else {
                    out.push(char::from_u32(unit).unwrap_or(char::REPLACEMENT_CHARACTER));
                }
            }
            _ => return None,
        }
    }
    Some(out)
}

fn hex_unit(chars: &mut std::str::Chars<'_>) -> Option<u32> {
    let mut unit = 0;
    for _ in 0..4 {
        unit = unit * 16 + chars.next()?.to_digit(16)?;
    }
    Some(unit)
}

/// Find the string token containing `offset` in possibly malformed text.
///
/// Returns the token span and its decoded value. An unterminated string
/// yields its raw contents up to the point where the parser gave up.
pub fn string_at(text: &str, offset: usize) -> Option<(Span, String)> {
    let tree = parse_tree(text).ok()?;
    let end = (offset + 1).min(text.len());
    let mut node = tree.root_node().descendant_for_byte_range(offset, end)?;

    while node.kind() != "string" {
        node = node.parent()?;
    }
    if node.is_missing() {
        return None;
    }

    let span = Span::from(node.byte_range());
    if !span.contains(offset) {
        return None;
    }
    let token = &text[span.start..span.end];
    let value = decode_string(token).unwrap_or_else(|| {
        let inner = token.strip_prefix('"').unwrap_or(token);
        inner.strip_suffix('"').unwrap_or(inner).to_string()
    });
    Some((span, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::NodeKind;

    #[test]
    fn parses_scalars_and_spans() {
        let text = r#"[ "a", 12.5, true, null ]"#;
        let root = parse(text).unwrap();
        let SyntaxNode::Array { span, elements } = &root else {
            panic!("expected array, got {root:?}");
        };
        assert_eq!(*span, Span::new(0, text.len()));
        let kinds: Vec<_> = elements.iter().map(|e| e.kind()).collect();
        assert_eq!(
            kinds,
            vec![NodeKind::String, NodeKind::Number, NodeKind::Literal, NodeKind::Literal]
        );
        assert_eq!(elements[0].span(), Span::new(2, 5));
        assert_eq!(elements[1], SyntaxNode::Number { span: Span::new(7, 11), text: "12.5".into() });
    }

    #[test]
    fn decodes_escapes() {
        let root = parse(r#"["line\nbreak \"q\" é"]"#).unwrap();
        let SyntaxNode::Array { elements, .. } = root else {
            panic!("expected array");
        };
        assert_eq!(elements[0].as_str(), Some("line\nbreak \"q\" é"));
    }

    #[test]
    fn decodes_surrogates() {
        let root = parse(r#"[{"id":"a","type":"T","name":"\ud800"}]"#).unwrap();
        let SyntaxNode::Array { elements, .. } = &root else {
            panic!("expected array");
        };
        let name = elements[0].property("name").and_then(SyntaxNode::as_str);
        assert_eq!(name, Some("\u{fffd}"));

        let root = parse(r#"["\ud83d\udd2a", "\udd2a\ud83d", "\ud83dx"]"#).unwrap();
        let SyntaxNode::Array { elements, .. } = root else {
            panic!("expected array");
        };
        let values: Vec<_> = elements.iter().filter_map(SyntaxNode::as_str).collect();
        assert_eq!(values, vec!["🔪", "\u{fffd}\u{fffd}", "\u{fffd}x"]);
    }

    #[test]
    fn malformed_text_fails_without_tree() {
        for text in [r#"[{"id": "a",}"#, r#"{"a" 1}"#, "", "   ", "[1] [2]", r#"{1: 2}"#] {
            assert!(parse(text).is_err(), "expected failure for {text:?}");
        }
    }

    #[test]
    fn error_offset_points_into_text() {
        let text = r#"[{"id": "a"}, {"id": }]"#;
        let err = parse(text).unwrap_err();
        assert!(err.offset <= text.len());
        assert_eq!(err.message, "malformed JSON");
    }

    #[test]
    fn string_at_recovers_in_broken_documents() {
        let text = r#"[{"id": "knife", "type": }"#;
        let offset = text.find("knife").unwrap() + 2;
        let (span, value) = string_at(text, offset).unwrap();
        assert_eq!(value, "knife");
        assert_eq!(&text[span.start..span.end], "\"knife\"");

        let colon = text.find(':').unwrap();
        assert!(string_at(text, colon).is_none());

        let text = r#"["a","b"#;
        let quote = text.rfind('"').unwrap();
        let (_, value) = string_at(text, quote).unwrap();
        assert_eq!(value, "b");
    }
}
