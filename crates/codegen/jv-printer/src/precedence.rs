//! Operator precedence levels

use jv_syntax::{BinaryOperator, LogicalOperator, NodeKind};

/// Binding strength of an expression, weakest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Precedence {
    Sequence,
    Assignment,
    Conditional,
    Coalesce,
    LogicalOr,
    LogicalAnd,
    BitwiseOr,
    BitwiseXor,
    BitwiseAnd,
    Equality,
    Relational,
    Shift,
    Additive,
    Multiplicative,
    Exponentiation,
    Unary,
    Postfix,
    Call,
    New,
    Member,
    Primary,
}

impl Precedence {
    /// The next tighter level
    pub(crate) fn tighter(self) -> Self {
        match self {
            Self::Sequence => Self::Assignment,
            Self::Assignment => Self::Conditional,
            Self::Conditional => Self::Coalesce,
            Self::Coalesce => Self::LogicalOr,
            Self::LogicalOr => Self::LogicalAnd,
            Self::LogicalAnd => Self::BitwiseOr,
            Self::BitwiseOr => Self::BitwiseXor,
            Self::BitwiseXor => Self::BitwiseAnd,
            Self::BitwiseAnd => Self::Equality,
            Self::Equality => Self::Relational,
            Self::Relational => Self::Shift,
            Self::Shift => Self::Additive,
            Self::Additive => Self::Multiplicative,
            Self::Multiplicative => Self::Exponentiation,
            Self::Exponentiation => Self::Unary,
            Self::Unary => Self::Postfix,
            Self::Postfix => Self::Call,
            Self::Call => Self::New,
            Self::New => Self::Member,
            Self::Member | Self::Primary => Self::Primary,
        }
    }

    pub(crate) fn of_binary(operator: BinaryOperator) -> Self {
        match operator {
            BinaryOperator::Eq
            | BinaryOperator::NotEq
            | BinaryOperator::StrictEq
            | BinaryOperator::StrictNotEq => Self::Equality,
            BinaryOperator::Lt
            | BinaryOperator::LtEq
            | BinaryOperator::Gt
            | BinaryOperator::GtEq
            | BinaryOperator::In
            | BinaryOperator::Instanceof => Self::Relational,
            BinaryOperator::Shl | BinaryOperator::Shr | BinaryOperator::UShr => Self::Shift,
            BinaryOperator::Add | BinaryOperator::Sub => Self::Additive,
            BinaryOperator::Mul | BinaryOperator::Div | BinaryOperator::Rem => Self::Multiplicative,
            BinaryOperator::Exp => Self::Exponentiation,
            BinaryOperator::BitOr => Self::BitwiseOr,
            BinaryOperator::BitXor => Self::BitwiseXor,
            BinaryOperator::BitAnd => Self::BitwiseAnd,
        }
    }

    pub(crate) fn of_logical(operator: LogicalOperator) -> Self {
        match operator {
            LogicalOperator::And => Self::LogicalAnd,
            LogicalOperator::Or => Self::LogicalOr,
            LogicalOperator::Coalesce => Self::Coalesce,
        }
    }

    /// Level of an expression node as a whole
    pub(crate) fn of_kind(kind: &NodeKind) -> Self {
        match kind {
            NodeKind::SequenceExpression { .. } => Self::Sequence,
            NodeKind::AssignmentExpression { .. } | NodeKind::ArrowFunctionExpression { .. } => {
                Self::Assignment
            }
            NodeKind::ConditionalExpression { .. } => Self::Conditional,
            NodeKind::LogicalExpression { operator, .. } => Self::of_logical(*operator),
            NodeKind::BinaryExpression { operator, .. } => Self::of_binary(*operator),
            NodeKind::UnaryExpression { .. } | NodeKind::UpdateExpression { prefix: true, .. } => {
                Self::Unary
            }
            NodeKind::UpdateExpression { prefix: false, .. } => Self::Postfix,
            NodeKind::CallExpression { .. } => Self::Call,
            NodeKind::NewExpression { .. } => Self::New,
            NodeKind::MemberExpression { .. } => Self::Member,
            _ => Self::Primary,
        }
    }
}
