//! Builder functions for conditions and updates.
//!
//! A [`Template`] maps attribute paths to [`Predicate`]s, and a literal used
//! where a predicate is expected means equality:
//!
//! ```
//! use dynoexpr_core::expression::builder::{Template, gt};
//! use dynoexpr_core::expression::{Condition, compile_condition};
//!
//! let condition: Condition = Template::new()
//!     .with("status", "active")
//!     .with("age", gt(18))
//!     .into();
//! let compiled = compile_condition(&condition).unwrap();
//! assert_eq!(compiled.expression, "#status = :v1 AND #age > :v2");
//! ```
//!
//! Templates normalize into an explicit `Logical AND` node when converted
//! into a [`Condition`], so the compiler never sees the sugar.
//!
//! An [`Update`] maps attribute paths to [`UpdateAction`]s in the same way; a
//! literal means "set to this value".

use std::ops::{BitAnd, BitOr, Not};

use dynoexpr_model::AttributeValue;

use super::ast::{
    AttributeType, CompareOp, Condition, LogicalOp, Operand, UpdateAction, UpdateOperand,
};

// ---------------------------------------------------------------------------
// Predicates
// ---------------------------------------------------------------------------

/// A condition waiting for the attribute path it applies to.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `path op right`.
    Compare {
        /// Comparison operator.
        op: CompareOp,
        /// Right-hand operand.
        right: Operand,
    },
    /// `path BETWEEN lower AND upper`.
    Between {
        /// Lower bound.
        lower: Operand,
        /// Upper bound.
        upper: Operand,
    },
    /// `path IN (...)`.
    In(Vec<Operand>),
    /// `attribute_exists(path)`.
    Exists,
    /// `attribute_not_exists(path)`.
    NotExists,
    /// `attribute_type(path, type)`.
    Type(AttributeType),
    /// `begins_with(path, prefix)`.
    BeginsWith(Operand),
    /// `contains(path, needle)`.
    Contains(Operand),
    /// `NOT (...)` around the inner predicate.
    Not(Box<Predicate>),
    /// Every inner predicate holds for the same path.
    All(Vec<Predicate>),
    /// At least one inner predicate holds for the same path.
    Any(Vec<Predicate>),
}

impl Predicate {
    /// Attach the predicate to an attribute path.
    pub fn on(self, path: impl Into<String>) -> Condition {
        let path = path.into();
        self.bind(&path)
    }

    fn bind(self, path: &str) -> Condition {
        let subject = || Operand::Path(path.to_owned());
        match self {
            Self::Compare { op, right } => Condition::Compare {
                left: subject(),
                op,
                right,
            },
            Self::Between { lower, upper } => Condition::Between {
                operand: subject(),
                lower,
                upper,
            },
            Self::In(values) => Condition::In {
                operand: subject(),
                values,
            },
            Self::Exists => Condition::Exists {
                path: path.to_owned(),
                negate: false,
            },
            Self::NotExists => Condition::Exists {
                path: path.to_owned(),
                negate: true,
            },
            Self::Type(attribute_type) => Condition::TypeCheck {
                path: path.to_owned(),
                attribute_type,
            },
            Self::BeginsWith(prefix) => Condition::BeginsWith {
                path: path.to_owned(),
                prefix,
            },
            Self::Contains(needle) => Condition::Contains {
                path: path.to_owned(),
                needle,
            },
            Self::Not(inner) => Condition::Not(Box::new(inner.bind(path))),
            Self::All(inner) => Condition::Logical {
                op: LogicalOp::And,
                conditions: inner.into_iter().map(|p| p.bind(path)).collect(),
            },
            Self::Any(inner) => Condition::Logical {
                op: LogicalOp::Or,
                conditions: inner.into_iter().map(|p| p.bind(path)).collect(),
            },
        }
    }
}

/// A bare literal is equality sugar.
impl<T: Into<AttributeValue>> From<T> for Predicate {
    fn from(value: T) -> Self {
        eq(value)
    }
}

fn compare(op: CompareOp, right: impl Into<Operand>) -> Predicate {
    Predicate::Compare {
        op,
        right: right.into(),
    }
}

/// `path = right`.
pub fn eq(right: impl Into<Operand>) -> Predicate {
    compare(CompareOp::Eq, right)
}

/// `path <> right`.
pub fn ne(right: impl Into<Operand>) -> Predicate {
    compare(CompareOp::Ne, right)
}

/// `path < right`.
pub fn lt(right: impl Into<Operand>) -> Predicate {
    compare(CompareOp::Lt, right)
}

/// `path <= right`.
pub fn le(right: impl Into<Operand>) -> Predicate {
    compare(CompareOp::Le, right)
}

/// `path > right`.
pub fn gt(right: impl Into<Operand>) -> Predicate {
    compare(CompareOp::Gt, right)
}

/// `path >= right`.
pub fn ge(right: impl Into<Operand>) -> Predicate {
    compare(CompareOp::Ge, right)
}

/// `path BETWEEN lower AND upper`.
pub fn between(lower: impl Into<Operand>, upper: impl Into<Operand>) -> Predicate {
    Predicate::Between {
        lower: lower.into(),
        upper: upper.into(),
    }
}

/// `path IN (values...)`.
pub fn is_in<I, T>(values: I) -> Predicate
where
    I: IntoIterator<Item = T>,
    T: Into<Operand>,
{
    Predicate::In(values.into_iter().map(Into::into).collect())
}

/// `attribute_exists(path)`.
#[must_use]
pub fn exists() -> Predicate {
    Predicate::Exists
}

/// `attribute_not_exists(path)`.
#[must_use]
pub fn not_exists() -> Predicate {
    Predicate::NotExists
}

/// `attribute_type(path, type)`.
#[must_use]
pub fn is_type(attribute_type: AttributeType) -> Predicate {
    Predicate::Type(attribute_type)
}

/// `begins_with(path, prefix)`.
pub fn begins_with(prefix: impl Into<Operand>) -> Predicate {
    Predicate::BeginsWith(prefix.into())
}

/// `contains(path, needle)`.
pub fn contains(needle: impl Into<Operand>) -> Predicate {
    Predicate::Contains(needle.into())
}

/// `NOT (predicate)`.
pub fn not(predicate: impl Into<Predicate>) -> Predicate {
    Predicate::Not(Box::new(predicate.into()))
}

/// All predicates must hold for the path.
pub fn all_of<I, P>(predicates: I) -> Predicate
where
    I: IntoIterator<Item = P>,
    P: Into<Predicate>,
{
    Predicate::All(predicates.into_iter().map(Into::into).collect())
}

/// At least one predicate must hold for the path.
pub fn any_of<I, P>(predicates: I) -> Predicate
where
    I: IntoIterator<Item = P>,
    P: Into<Predicate>,
{
    Predicate::Any(predicates.into_iter().map(Into::into).collect())
}

/// `size(path)` as an operand.
pub fn size(path: impl Into<String>) -> Operand {
    Operand::Size(path.into())
}

/// Another attribute as an operand.
pub fn attr(path: impl Into<String>) -> Operand {
    Operand::Path(path.into())
}

// ---------------------------------------------------------------------------
// Templates and condition combinators
// ---------------------------------------------------------------------------

/// Ordered mapping from attribute path to predicate. Several entries are an
/// implicit AND, in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Template {
    entries: Vec<(String, Predicate)>,
}

impl Template {
    /// Create an empty template.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry.
    #[must_use]
    pub fn with(mut self, path: impl Into<String>, predicate: impl Into<Predicate>) -> Self {
        self.entries.push((path.into(), predicate.into()));
        self
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the template has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, P: Into<Predicate>> FromIterator<(K, P)> for Template {
    fn from_iter<I: IntoIterator<Item = (K, P)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, p)| (k.into(), p.into()))
                .collect(),
        }
    }
}

impl From<Template> for Condition {
    fn from(template: Template) -> Self {
        let mut conditions: Vec<Condition> = template
            .entries
            .into_iter()
            .map(|(path, predicate)| predicate.bind(&path))
            .collect();
        if conditions.len() == 1 {
            conditions.remove(0)
        } else {
            Condition::Logical {
                op: LogicalOp::And,
                conditions,
            }
        }
    }
}

/// Build a [`Template`] from `path => predicate` pairs.
///
/// ```
/// use dynoexpr_core::template;
/// use dynoexpr_core::expression::builder::gt;
///
/// let t = template! { "status" => "active", "age" => gt(18) };
/// assert_eq!(t.len(), 2);
/// ```
#[macro_export]
macro_rules! template {
    ($($path:expr => $predicate:expr),* $(,)?) => {
        $crate::expression::builder::Template::new()
            $(.with($path, $predicate))*
    };
}

impl Condition {
    /// `left op right` with arbitrary operands, e.g. `size(a) > size(b)`.
    pub fn compare(left: impl Into<Operand>, op: CompareOp, right: impl Into<Operand>) -> Self {
        Self::Compare {
            left: left.into(),
            op,
            right: right.into(),
        }
    }

    /// AND of every condition, in order. An array of templates becomes an
    /// implicit AND this way.
    pub fn all<I, C>(conditions: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Condition>,
    {
        Self::Logical {
            op: LogicalOp::And,
            conditions: conditions.into_iter().map(Into::into).collect(),
        }
    }

    /// OR of every condition, in order.
    pub fn any<I, C>(conditions: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Condition>,
    {
        Self::Logical {
            op: LogicalOp::Or,
            conditions: conditions.into_iter().map(Into::into).collect(),
        }
    }

    fn join(self, op: LogicalOp, other: Condition) -> Self {
        match self {
            Self::Logical {
                op: existing,
                mut conditions,
            } if existing == op => {
                conditions.push(other);
                Self::Logical { op, conditions }
            }
            first => Self::Logical {
                op,
                conditions: vec![first, other],
            },
        }
    }
}

impl Not for Condition {
    type Output = Condition;

    fn not(self) -> Self::Output {
        Condition::Not(Box::new(self))
    }
}

impl<C: Into<Condition>> BitAnd<C> for Condition {
    type Output = Condition;

    fn bitand(self, rhs: C) -> Self::Output {
        self.join(LogicalOp::And, rhs.into())
    }
}

impl<C: Into<Condition>> BitOr<C> for Condition {
    type Output = Condition;

    fn bitor(self, rhs: C) -> Self::Output {
        self.join(LogicalOp::Or, rhs.into())
    }
}

// ---------------------------------------------------------------------------
// Updates
// ---------------------------------------------------------------------------

/// A bare literal is "set to this value".
impl<T: Into<AttributeValue>> From<T> for UpdateAction {
    fn from(value: T) -> Self {
        Self::Set(UpdateOperand::Value(value.into()))
    }
}

impl From<UpdateOperand> for UpdateAction {
    fn from(operand: UpdateOperand) -> Self {
        Self::Set(operand)
    }
}

/// Reference another attribute of the item.
pub fn reference(path: impl Into<String>) -> UpdateOperand {
    UpdateOperand::Reference {
        path: path.into(),
        default: None,
    }
}

/// Reference another attribute, falling back to `default` when it is absent.
pub fn reference_or(path: impl Into<String>, default: impl Into<AttributeValue>) -> UpdateOperand {
    UpdateOperand::Reference {
        path: path.into(),
        default: Some(default.into()),
    }
}

/// `SET path = operand`.
pub fn set(operand: impl Into<UpdateOperand>) -> UpdateAction {
    UpdateAction::Set(operand.into())
}

/// `SET path = path + delta`.
pub fn add(delta: impl Into<UpdateOperand>) -> UpdateAction {
    UpdateAction::Add(delta.into())
}

/// `SET path = path - delta`.
pub fn subtract(delta: impl Into<UpdateOperand>) -> UpdateAction {
    UpdateAction::Subtract(delta.into())
}

/// `SET path = list_append(path, items)`.
pub fn append(items: impl Into<UpdateOperand>) -> UpdateAction {
    UpdateAction::Append(items.into())
}

/// `SET path = list_append(items, path)`.
pub fn prepend(items: impl Into<UpdateOperand>) -> UpdateAction {
    UpdateAction::Prepend(items.into())
}

/// `REMOVE path`.
#[must_use]
pub fn remove() -> UpdateAction {
    UpdateAction::Remove
}

/// `ADD path items`.
pub fn add_to_set(items: impl Into<UpdateOperand>) -> UpdateAction {
    UpdateAction::AddToSet(items.into())
}

/// `DELETE path items`.
pub fn delete_from_set(items: impl Into<UpdateOperand>) -> UpdateAction {
    UpdateAction::DeleteFromSet(items.into())
}

/// Ordered mapping from attribute path to update action.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Update {
    actions: Vec<(String, UpdateAction)>,
}

impl Update {
    /// Create an empty update.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an action for `path`.
    #[must_use]
    pub fn with(mut self, path: impl Into<String>, action: impl Into<UpdateAction>) -> Self {
        self.actions.push((path.into(), action.into()));
        self
    }

    /// `SET path = operand`.
    #[must_use]
    pub fn set(self, path: impl Into<String>, operand: impl Into<UpdateOperand>) -> Self {
        self.with(path, set(operand))
    }

    /// `SET path = path + delta`.
    #[must_use]
    pub fn add(self, path: impl Into<String>, delta: impl Into<UpdateOperand>) -> Self {
        self.with(path, add(delta))
    }

    /// `SET path = path - delta`.
    #[must_use]
    pub fn subtract(self, path: impl Into<String>, delta: impl Into<UpdateOperand>) -> Self {
        self.with(path, subtract(delta))
    }

    /// `SET path = list_append(path, items)`.
    #[must_use]
    pub fn append(self, path: impl Into<String>, items: impl Into<UpdateOperand>) -> Self {
        self.with(path, append(items))
    }

    /// `SET path = list_append(items, path)`.
    #[must_use]
    pub fn prepend(self, path: impl Into<String>, items: impl Into<UpdateOperand>) -> Self {
        self.with(path, prepend(items))
    }

    /// `REMOVE path`.
    #[must_use]
    pub fn remove(self, path: impl Into<String>) -> Self {
        self.with(path, UpdateAction::Remove)
    }

    /// `ADD path items`.
    #[must_use]
    pub fn add_to_set(self, path: impl Into<String>, items: impl Into<UpdateOperand>) -> Self {
        self.with(path, add_to_set(items))
    }

    /// `DELETE path items`.
    #[must_use]
    pub fn delete_from_set(
        self,
        path: impl Into<String>,
        items: impl Into<UpdateOperand>,
    ) -> Self {
        self.with(path, delete_from_set(items))
    }

    /// The actions, in insertion order.
    #[must_use]
    pub fn actions(&self) -> &[(String, UpdateAction)] {
        &self.actions
    }

    /// Number of actions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Returns `true` if there are no actions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl<K: Into<String>, A: Into<UpdateAction>> FromIterator<(K, A)> for Update {
    fn from_iter<I: IntoIterator<Item = (K, A)>>(iter: I) -> Self {
        Self {
            actions: iter
                .into_iter()
                .map(|(k, a)| (k.into(), a.into()))
                .collect(),
        }
    }
}

impl IntoIterator for Update {
    type Item = (String, UpdateAction);
    type IntoIter = std::vec::IntoIter<(String, UpdateAction)>;

    fn into_iter(self) -> Self::IntoIter {
        self.actions.into_iter()
    }
}
