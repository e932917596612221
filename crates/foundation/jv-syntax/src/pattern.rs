//! Query patterns over resolved nodes

use crate::{KindPattern, NodeId};

/// A partially specified node used to query resolved trees
///
/// Absent constraints match anything. Evaluation lives in the matcher crate.
#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    /// Matches every node
    Any,
    /// Matches this exact node, or any identifier or property whose known value leads to it
    Node(NodeId),
    /// Matches by structure
    Shape(Box<ShapePattern>),
}

/// Structural constraints on a node
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShapePattern {
    /// Constraint on the node's kind and kind fields
    pub kind: Option<KindPattern>,
    /// Constraint on the node's known value
    pub value: Option<Pattern>,
    /// Properties that must each be matched by at least one property of the candidate
    pub properties: Option<Vec<Pattern>>,
}

impl Pattern {
    /// Pattern constraining only the node kind
    pub fn kind(kind: KindPattern) -> Self {
        Self::Shape(Box::new(ShapePattern {
            kind: Some(kind),
            ..ShapePattern::default()
        }))
    }

    /// Add a constraint on the known value
    ///
    /// `Any` and `Node` patterns are first turned into an unconstrained shape.
    #[must_use]
    pub fn with_value(self, value: Self) -> Self {
        let mut shape = self.into_shape();
        shape.value = Some(value);
        Self::Shape(Box::new(shape))
    }

    /// Add a constraint on the property list
    #[must_use]
    pub fn with_properties(self, properties: Vec<Self>) -> Self {
        let mut shape = self.into_shape();
        shape.properties = Some(properties);
        Self::Shape(Box::new(shape))
    }

    fn into_shape(self) -> ShapePattern {
        match self {
            Self::Shape(shape) => *shape,
            Self::Any | Self::Node(_) => ShapePattern::default(),
        }
    }
}

impl From<KindPattern> for Pattern {
    fn from(kind: KindPattern) -> Self {
        Self::kind(kind)
    }
}

impl From<NodeId> for Pattern {
    fn from(node: NodeId) -> Self {
        Self::Node(node)
    }
}
