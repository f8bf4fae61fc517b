use std::ops::Range;

/// Half-open byte range `[start, end)` into the originating text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }

    pub fn contains_span(&self, other: Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl From<Range<usize>> for Span {
    fn from(range: Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Object,
    Array,
    Property,
    String,
    Number,
    Literal,
}

/// A JSON syntax node.
///
/// Children are stored in source order and their spans nest inside the
/// parent's span. `Object::properties` only ever holds `Property` nodes and a
/// property key is always a `String` node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxNode {
    Object {
        span: Span,
        properties: Vec<SyntaxNode>,
    },
    Array {
        span: Span,
        elements: Vec<SyntaxNode>,
    },
    Property {
        span: Span,
        key: Box<SyntaxNode>,
        value: Box<SyntaxNode>,
    },
    /// `text` is the decoded value, without quotes or escapes.
    String { span: Span, text: String },
    Number { span: Span, text: String },
    /// `true`, `false` or `null`.
    Literal { span: Span, text: String },
}

impl SyntaxNode {
    pub fn span(&self) -> Span {
        match self {
            SyntaxNode::Object { span, .. }
            | SyntaxNode::Array { span, .. }
            | SyntaxNode::Property { span, .. }
            | SyntaxNode::String { span, .. }
            | SyntaxNode::Number { span, .. }
            | SyntaxNode::Literal { span, .. } => *span,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            SyntaxNode::Object { .. } => NodeKind::Object,
            SyntaxNode::Array { .. } => NodeKind::Array,
            SyntaxNode::Property { .. } => NodeKind::Property,
            SyntaxNode::String { .. } => NodeKind::String,
            SyntaxNode::Number { .. } => NodeKind::Number,
            SyntaxNode::Literal { .. } => NodeKind::Literal,
        }
    }

    /// Decoded text of a string node.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            SyntaxNode::String { text, .. } => Some(text),
            _ => None,
        }
    }

    pub fn children(&self) -> Vec<&SyntaxNode> {
        match self {
            SyntaxNode::Object { properties, .. } => properties.iter().collect(),
            SyntaxNode::Array { elements, .. } => elements.iter().collect(),
            SyntaxNode::Property { key, value, .. } => vec![key.as_ref(), value.as_ref()],
            _ => Vec::new(),
        }
    }

    /// Value of the first property named `key`, if this is an object.
    pub fn property(&self, key: &str) -> Option<&SyntaxNode> {
        let SyntaxNode::Object { properties, .. } = self else {
            return None;
        };
        properties.iter().find_map(|p| match p {
            SyntaxNode::Property { key: k, value, .. } if k.as_str() == Some(key) => {
                Some(value.as_ref())
            }
            _ => None,
        })
    }

    /// Deepest node whose span contains `offset`.
    pub fn node_at(&self, offset: usize) -> Option<&SyntaxNode> {
        if !self.span().contains(offset) {
            return None;
        }
        let mut current = self;
        'descend: loop {
            for child in current.children() {
                if child.span().contains(offset) {
                    current = child;
                    continue 'descend;
                }
            }
            return Some(current);
        }
    }

    /// Depth-first pre-order walk over this node and every value below it.
    /// Property keys are not values and are not visited.
    pub fn walk_values<'a>(&'a self, f: &mut impl FnMut(&'a SyntaxNode)) {
        f(self);
        match self {
            SyntaxNode::Object { properties, .. } => {
                for property in properties {
                    if let SyntaxNode::Property { value, .. } = property {
                        value.walk_values(f);
                    }
                }
            }
            SyntaxNode::Array { elements, .. } => {
                for element in elements {
                    element.walk_values(f);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parse;

    #[test]
    fn node_at_descends_to_leaf() {
        let text = r#"[{"id": "knife"}]"#;
        let root = parse(text).unwrap();

        let offset = text.find("knife").unwrap();
        let node = root.node_at(offset).unwrap();
        assert_eq!(node.as_str(), Some("knife"));

        let colon = text.find(':').unwrap();
        assert_eq!(root.node_at(colon).unwrap().kind(), NodeKind::Property);

        assert_eq!(root.node_at(0).unwrap().kind(), NodeKind::Array);
        assert!(root.node_at(text.len()).is_none());
    }

    #[test]
    fn walk_values_skips_keys() {
        let root = parse(r#"{"a": ["b", {"c": "d"}], "e": 1}"#).unwrap();
        let mut strings = Vec::new();
        root.walk_values(&mut |n| {
            if let Some(s) = n.as_str() {
                strings.push(s.to_string());
            }
        });
        assert_eq!(strings, vec!["b", "d"]);
    }

    #[test]
    fn property_returns_first_match() {
        let root = parse(r#"{"id": "a", "id": "b", "type": 3}"#).unwrap();
        assert_eq!(root.property("id").and_then(|v| v.as_str()), Some("a"));
        assert_eq!(root.property("type").map(|v| v.kind()), Some(NodeKind::Number));
        assert!(root.property("name").is_none());
    }

    #[test]
    fn children_nest_inside_parent() {
        fn check(node: &SyntaxNode) {
            let mut prev_end = node.span().start;
            for child in node.children() {
                assert!(node.span().contains_span(child.span()));
                assert!(child.span().start >= prev_end);
                prev_end = child.span().end;
                check(child);
            }
        }
        let root = parse(r#"[{"a": [1, true, null, "x"]}, {"b": {"c": -2.5e3}}]"#).unwrap();
        check(&root);
    }
}
