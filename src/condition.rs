//! Storage-agnostic condition tree over the virtual synonym column.
//!
//! A condition is a boolean expression whose leaves compare a single virtual
//! column against string operands. Providers rewrite the virtual column into
//! their native column reference via [`substitute_placeholder`]; that is the
//! only transformation a provider may perform — the logical structure of the
//! tree is immutable once built.

use serde::{Deserialize, Serialize};

use crate::record::StorageUnitDescriptor;

/// Comparison operators available on the virtual synonym column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConditionOperator {
    /// Exact match.
    Equals,

    /// The stored value starts with the operand.
    Prefix,

    /// The stored value contains the operand as a substring.
    Contains,
}

/// Column reference inside a condition leaf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnRef {
    /// The virtual synonym column, not yet bound to any storage.
    Placeholder,

    /// A storage-native column reference.
    Native(String),
}

/// A node in a condition tree: a comparison leaf or a conjunction of
/// sub-conditions, nested to arbitrary depth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionNode {
    /// A single comparison against one column.
    Leaf {
        /// Column the comparison applies to.
        column: ColumnRef,
        /// Comparison operator.
        operator: ConditionOperator,
        /// String operand compared against stored values.
        operand: String,
    },

    /// All child conditions must hold.
    Conjunction(Vec<ConditionNode>),
}

impl ConditionNode {
    /// Build a leaf over the virtual synonym column.
    pub fn leaf<S: Into<String>>(operator: ConditionOperator, operand: S) -> Self {
        ConditionNode::Leaf {
            column: ColumnRef::Placeholder,
            operator,
            operand: operand.into(),
        }
    }

    /// Build a conjunction of child conditions.
    pub fn conjunction(children: Vec<ConditionNode>) -> Self {
        ConditionNode::Conjunction(children)
    }

    /// Number of leaves in this tree.
    pub fn leaf_count(&self) -> usize {
        match self {
            ConditionNode::Leaf { .. } => 1,
            ConditionNode::Conjunction(children) => {
                children.iter().map(|child| child.leaf_count()).sum()
            }
        }
    }

    /// True if any leaf still references the virtual synonym column.
    pub fn has_placeholder(&self) -> bool {
        match self {
            ConditionNode::Leaf { column, .. } => *column == ColumnRef::Placeholder,
            ConditionNode::Conjunction(children) => {
                children.iter().any(|child| child.has_placeholder())
            }
        }
    }

    /// Rewrite every placeholder leaf through `f`, preserving the tree
    /// structure. Leaves already bound to a native column pass through
    /// unchanged. Returns `None` as soon as `f` declines a leaf: a provider
    /// must resolve every placeholder or decline the whole condition.
    pub fn map_leaves<F>(&self, f: &mut F) -> Option<ConditionNode>
    where
        F: FnMut(ConditionOperator, &str) -> Option<ConditionNode>,
    {
        match self {
            ConditionNode::Leaf {
                column: ColumnRef::Placeholder,
                operator,
                operand,
            } => f(*operator, operand),
            ConditionNode::Leaf { .. } => Some(self.clone()),
            ConditionNode::Conjunction(children) => {
                let mut mapped = Vec::with_capacity(children.len());
                for child in children {
                    mapped.push(child.map_leaves(f)?);
                }
                Some(ConditionNode::Conjunction(mapped))
            }
        }
    }
}

/// A condition with every placeholder bound to a native column, ready to be
/// handed to a storage backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryFragment {
    root: ConditionNode,
}

impl QueryFragment {
    /// Wrap an already-bound condition tree.
    ///
    /// Prefer [`substitute_placeholder`]; this exists for providers that bind
    /// columns leaf by leaf. Backends refuse fragments with a surviving
    /// placeholder.
    pub fn new(root: ConditionNode) -> Self {
        QueryFragment { root }
    }

    /// The bound condition tree.
    pub fn root(&self) -> &ConditionNode {
        &self.root
    }

    /// True if a placeholder survived substitution. Backends must refuse to
    /// execute such a fragment.
    pub fn has_placeholder(&self) -> bool {
        self.root.has_placeholder()
    }

    /// Evaluate this fragment against one stored value.
    ///
    /// Operator semantics are preserved exactly: equals is an exact match,
    /// prefix is "starts with", contains is a substring test. An empty
    /// conjunction holds trivially.
    pub fn matches(&self, value: &str) -> bool {
        Self::eval(&self.root, value)
    }

    fn eval(node: &ConditionNode, value: &str) -> bool {
        match node {
            ConditionNode::Leaf {
                operator, operand, ..
            } => match operator {
                ConditionOperator::Equals => value == operand,
                ConditionOperator::Prefix => value.starts_with(operand.as_str()),
                ConditionOperator::Contains => value.contains(operand.as_str()),
            },
            ConditionNode::Conjunction(children) => {
                children.iter().all(|child| Self::eval(child, value))
            }
        }
    }
}

/// Bind every remaining placeholder leaf of `node` to `native_column`.
///
/// This is the single place where storage-agnostic intent becomes a
/// storage-specific fragment; operators and tree structure are untouched.
pub fn substitute_placeholder(node: &ConditionNode, native_column: &str) -> QueryFragment {
    fn bind(node: &ConditionNode, native_column: &str) -> ConditionNode {
        match node {
            ConditionNode::Leaf {
                column: ColumnRef::Placeholder,
                operator,
                operand,
            } => ConditionNode::Leaf {
                column: ColumnRef::Native(native_column.to_string()),
                operator: *operator,
                operand: operand.clone(),
            },
            ConditionNode::Leaf { .. } => node.clone(),
            ConditionNode::Conjunction(children) => ConditionNode::Conjunction(
                children
                    .iter()
                    .map(|child| bind(child, native_column))
                    .collect(),
            ),
        }
    }

    QueryFragment {
        root: bind(node, native_column),
    }
}

/// Condition builder handed to extractors, bound to one storage unit and the
/// operator the active behavior queries with.
#[derive(Debug, Clone, Copy)]
pub struct ConditionBuilder<'a> {
    operator: ConditionOperator,
    unit: &'a StorageUnitDescriptor,
}

impl<'a> ConditionBuilder<'a> {
    /// Create a builder bound to `operator` and `unit`.
    pub fn new(operator: ConditionOperator, unit: &'a StorageUnitDescriptor) -> Self {
        ConditionBuilder { operator, unit }
    }

    /// Operator the behavior queries the virtual column with.
    pub fn operator(&self) -> ConditionOperator {
        self.operator
    }

    /// Storage unit this builder is scoped to.
    pub fn unit(&self) -> &StorageUnitDescriptor {
        self.unit
    }

    /// Build a virtual-column leaf comparing against `operand` with the bound
    /// operator.
    pub fn term<S: Into<String>>(&self, operand: S) -> ConditionNode {
        ConditionNode::leaf(self.operator, operand)
    }
}
