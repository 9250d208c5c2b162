//! Tagged expression nodes consumed by the compilers.
//!
//! These are the typed counterparts of the DynamoDB expression grammar:
//! [`Condition`] for condition, filter and key-condition expressions, and
//! [`UpdateAction`] for the per-attribute actions of an update expression.
//! Nodes are plain values: built by the functions in
//! [`builder`](super::builder), consumed once by a compiler and dropped.
//!
//! The module also provides [`collect_paths`] to gather the top-level
//! attributes a condition touches, used to keep key attributes out of a
//! query filter.

use std::collections::HashSet;
use std::fmt;

use dynoexpr_model::AttributeValue;

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// Equal (`=`).
    Eq,
    /// Not equal (`<>`).
    Ne,
    /// Less than (`<`).
    Lt,
    /// Less than or equal (`<=`).
    Le,
    /// Greater than (`>`).
    Gt,
    /// Greater than or equal (`>=`).
    Ge,
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Eq => write!(f, "="),
            Self::Ne => write!(f, "<>"),
            Self::Lt => write!(f, "<"),
            Self::Le => write!(f, "<="),
            Self::Gt => write!(f, ">"),
            Self::Ge => write!(f, ">="),
        }
    }
}

/// Logical operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    /// Logical AND.
    And,
    /// Logical OR.
    Or,
}

impl fmt::Display for LogicalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::And => write!(f, "AND"),
            Self::Or => write!(f, "OR"),
        }
    }
}

/// Built-in function names emitted by the compilers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionName {
    /// `attribute_exists(path)`
    AttributeExists,
    /// `attribute_not_exists(path)`
    AttributeNotExists,
    /// `attribute_type(path, type)`
    AttributeType,
    /// `begins_with(path, substr)`
    BeginsWith,
    /// `contains(path, operand)`
    Contains,
    /// `size(path)`
    Size,
    /// `if_not_exists(path, operand)`, update only.
    IfNotExists,
    /// `list_append(a, b)`, update only.
    ListAppend,
}

impl fmt::Display for FunctionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AttributeExists => write!(f, "attribute_exists"),
            Self::AttributeNotExists => write!(f, "attribute_not_exists"),
            Self::AttributeType => write!(f, "attribute_type"),
            Self::BeginsWith => write!(f, "begins_with"),
            Self::Contains => write!(f, "contains"),
            Self::Size => write!(f, "size"),
            Self::IfNotExists => write!(f, "if_not_exists"),
            Self::ListAppend => write!(f, "list_append"),
        }
    }
}

/// Type codes accepted by `attribute_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeType {
    /// `S`
    String,
    /// `SS`
    StringSet,
    /// `N`
    Number,
    /// `NS`
    NumberSet,
    /// `B`
    Binary,
    /// `BS`
    BinarySet,
    /// `BOOL`
    Boolean,
    /// `NULL`
    Null,
    /// `L`
    List,
    /// `M`
    Map,
}

impl AttributeType {
    /// The type code bound as the second `attribute_type` argument.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::String => "S",
            Self::StringSet => "SS",
            Self::Number => "N",
            Self::NumberSet => "NS",
            Self::Binary => "B",
            Self::BinarySet => "BS",
            Self::Boolean => "BOOL",
            Self::Null => "NULL",
            Self::List => "L",
            Self::Map => "M",
        }
    }
}

/// A value producer in a condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// A document path (`info.rating`, `tags[0]`).
    Path(String),
    /// `size(path)`.
    Size(String),
    /// A literal, bound through a value placeholder.
    Value(AttributeValue),
}

impl Operand {
    /// Short label used in error messages.
    pub(crate) fn describe(&self) -> &'static str {
        match self {
            Self::Path(_) => "attribute path",
            Self::Size(_) => "size()",
            Self::Value(_) => "literal value",
        }
    }
}

impl<T: Into<AttributeValue>> From<T> for Operand {
    fn from(value: T) -> Self {
        Self::Value(value.into())
    }
}

/// Condition expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// `left op right`.
    Compare {
        /// Left-hand operand.
        left: Operand,
        /// Comparison operator.
        op: CompareOp,
        /// Right-hand operand.
        right: Operand,
    },
    /// `operand BETWEEN lower AND upper`.
    Between {
        /// Value to test.
        operand: Operand,
        /// Lower bound (inclusive).
        lower: Operand,
        /// Upper bound (inclusive).
        upper: Operand,
    },
    /// `operand IN (values...)`.
    In {
        /// Value to search for.
        operand: Operand,
        /// Candidates.
        values: Vec<Operand>,
    },
    /// Sub-conditions joined by one operator.
    Logical {
        /// Joining operator.
        op: LogicalOp,
        /// Sub-conditions, in order.
        conditions: Vec<Condition>,
    },
    /// `NOT (condition)`.
    Not(Box<Condition>),
    /// `attribute_exists(path)` or, negated, `attribute_not_exists(path)`.
    Exists {
        /// Attribute path.
        path: String,
        /// Emit `attribute_not_exists` instead.
        negate: bool,
    },
    /// `attribute_type(path, type)`.
    TypeCheck {
        /// Attribute path.
        path: String,
        /// Expected type.
        attribute_type: AttributeType,
    },
    /// `begins_with(path, prefix)`.
    BeginsWith {
        /// Attribute path.
        path: String,
        /// Prefix, a literal or another attribute.
        prefix: Operand,
    },
    /// `contains(path, needle)`.
    Contains {
        /// Attribute path.
        path: String,
        /// Element or substring, a literal or another attribute.
        needle: Operand,
    },
}

/// Right-hand side of an arithmetic, list or set update.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOperand {
    /// A literal, bound through a value placeholder.
    Value(AttributeValue),
    /// Another attribute of the same item, optionally with a fallback used
    /// when that attribute does not exist (`if_not_exists`).
    Reference {
        /// Referenced attribute path.
        path: String,
        /// Fallback literal.
        default: Option<AttributeValue>,
    },
}

impl<T: Into<AttributeValue>> From<T> for UpdateOperand {
    fn from(value: T) -> Self {
        Self::Value(value.into())
    }
}

/// One action applied to one attribute path by an update expression.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateAction {
    /// `path = operand` (or `if_not_exists(...)` for a defaulted reference).
    Set(UpdateOperand),
    /// `path = path + operand`.
    Add(UpdateOperand),
    /// `path = path - operand`.
    Subtract(UpdateOperand),
    /// `path = list_append(path, operand)`.
    Append(UpdateOperand),
    /// `path = list_append(operand, path)`.
    Prepend(UpdateOperand),
    /// `REMOVE path`.
    Remove,
    /// `ADD path operand`.
    AddToSet(UpdateOperand),
    /// `DELETE path operand`.
    DeleteFromSet(UpdateOperand),
}

impl UpdateAction {
    /// The clause this action is emitted into.
    #[must_use]
    pub fn clause(&self) -> UpdateClause {
        match self {
            Self::Set(_) | Self::Add(_) | Self::Subtract(_) | Self::Append(_) | Self::Prepend(_) => {
                UpdateClause::Set
            }
            Self::Remove => UpdateClause::Remove,
            Self::AddToSet(_) => UpdateClause::Add,
            Self::DeleteFromSet(_) => UpdateClause::Delete,
        }
    }
}

/// The four update clauses, in the order they are emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum UpdateClause {
    /// `SET`
    Set,
    /// `REMOVE`
    Remove,
    /// `ADD`
    Add,
    /// `DELETE`
    Delete,
}

impl UpdateClause {
    /// All clauses in emission order.
    pub const ALL: [Self; 4] = [Self::Set, Self::Remove, Self::Add, Self::Delete];
}

impl fmt::Display for UpdateClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Set => write!(f, "SET"),
            Self::Remove => write!(f, "REMOVE"),
            Self::Add => write!(f, "ADD"),
            Self::Delete => write!(f, "DELETE"),
        }
    }
}

/// A parsed document path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributePath {
    /// The path elements in order. The first is always an attribute.
    pub elements: Vec<PathElement>,
}

impl AttributePath {
    /// The top-level attribute name.
    #[must_use]
    pub fn root(&self) -> Option<&str> {
        match self.elements.first() {
            Some(PathElement::Attribute(name)) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for AttributePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, elem) in self.elements.iter().enumerate() {
            match elem {
                PathElement::Attribute(name) if i > 0 => write!(f, ".{name}")?,
                PathElement::Attribute(name) => write!(f, "{name}")?,
                PathElement::Index(idx) => write!(f, "[{idx}]")?,
            }
        }
        Ok(())
    }
}

/// A single element in an attribute path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathElement {
    /// A named attribute.
    Attribute(String),
    /// A list index dereference (`[0]`).
    Index(usize),
}

// ---------------------------------------------------------------------------
// Collecting referenced attributes
// ---------------------------------------------------------------------------

/// Collect the top-level attribute of every path a condition references,
/// including paths inside `size()` and path operands.
///
/// Paths are taken up to the first `.` or `[`, so `info.rating` contributes
/// `info`. Used to reject query filters that touch key attributes.
#[allow(clippy::implicit_hasher)]
pub fn collect_paths(condition: &Condition, paths: &mut HashSet<String>) {
    match condition {
        Condition::Compare { left, right, .. } => {
            collect_paths_from_operand(left, paths);
            collect_paths_from_operand(right, paths);
        }
        Condition::Between {
            operand,
            lower,
            upper,
        } => {
            collect_paths_from_operand(operand, paths);
            collect_paths_from_operand(lower, paths);
            collect_paths_from_operand(upper, paths);
        }
        Condition::In { operand, values } => {
            collect_paths_from_operand(operand, paths);
            for value in values {
                collect_paths_from_operand(value, paths);
            }
        }
        Condition::Logical { conditions, .. } => {
            for inner in conditions {
                collect_paths(inner, paths);
            }
        }
        Condition::Not(inner) => collect_paths(inner, paths),
        Condition::Exists { path, .. } | Condition::TypeCheck { path, .. } => {
            insert_root(path, paths);
        }
        Condition::BeginsWith { path, prefix: other }
        | Condition::Contains {
            path,
            needle: other,
        } => {
            insert_root(path, paths);
            collect_paths_from_operand(other, paths);
        }
    }
}

fn collect_paths_from_operand(operand: &Operand, paths: &mut HashSet<String>) {
    match operand {
        Operand::Path(path) | Operand::Size(path) => insert_root(path, paths),
        Operand::Value(_) => {}
    }
}

fn insert_root(path: &str, paths: &mut HashSet<String>) {
    let end = path.find(['.', '[']).unwrap_or(path.len());
    paths.insert(path[..end].to_owned());
}
