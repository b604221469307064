//! Backend-neutral condition expressions.
//!
//! Conditions arrive as plain JSON literals so request binders can build
//! filters declaratively, without importing translator internals:
//!
//! ```text
//! [field, value]              shorthand equality
//! [field, op, value]          explicit comparison, op in {"=", ">", ">=", "<", "<="}
//! {"and": [...]}, {"or": [...]}   group combinators, recursively
//! ```
//!
//! The literal shape is decoded exactly once, here, into a closed tagged
//! AST. Translation downstream is a total function over that AST; anything
//! the store cannot map is rejected at this boundary.

use bson::Bson;
use serde_json::Value;

use crate::error::StoreError;

/// Comparison operator of a leaf condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl CompareOp {
    /// Decode a wire operator token.
    pub fn parse(token: &str) -> Result<Self, StoreError> {
        match token {
            "=" => Ok(Self::Eq),
            ">" => Ok(Self::Gt),
            ">=" => Ok(Self::Gte),
            "<" => Ok(Self::Lt),
            "<=" => Ok(Self::Lte),
            other => Err(StoreError::unsupported_operator(other)),
        }
    }

    /// The backend's native operator token.
    #[must_use]
    pub fn native(self) -> &'static str {
        match self {
            Self::Eq => "$eq",
            Self::Gt => "$gt",
            Self::Gte => "$gte",
            Self::Lt => "$lt",
            Self::Lte => "$lte",
        }
    }
}

/// Logical combinator joining the operands of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    And,
    Or,
}

impl Combinator {
    fn from_key(key: &str) -> Option<Self> {
        match key {
            "and" => Some(Self::And),
            "or" => Some(Self::Or),
            _ => None,
        }
    }

    /// The backend's native combinator token.
    #[must_use]
    pub fn native(self) -> &'static str {
        match self {
            Self::And => "$and",
            Self::Or => "$or",
        }
    }
}

/// A single node of the condition AST.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Leaf comparison: `field <op> value`.
    Compare {
        field: String,
        op: CompareOp,
        value: Bson,
    },
    /// Ordered sub-conditions joined by a combinator.
    ///
    /// An empty operand list means "no constraint" and translates to the
    /// empty filter, never to an empty native combinator node.
    Group {
        combinator: Combinator,
        operands: Vec<Condition>,
    },
}

impl Condition {
    /// Shorthand equality leaf.
    pub fn eq(field: impl Into<String>, value: impl Into<Bson>) -> Self {
        Self::compare(field, CompareOp::Eq, value)
    }

    /// Explicit comparison leaf.
    pub fn compare(field: impl Into<String>, op: CompareOp, value: impl Into<Bson>) -> Self {
        Self::Compare {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    /// `and` group.
    #[must_use]
    pub fn and(operands: Vec<Condition>) -> Self {
        Self::Group {
            combinator: Combinator::And,
            operands,
        }
    }

    /// `or` group.
    #[must_use]
    pub fn or(operands: Vec<Condition>) -> Self {
        Self::Group {
            combinator: Combinator::Or,
            operands,
        }
    }

    /// Decode a single condition from its wire literal.
    pub fn from_wire(literal: &Value) -> Result<Self, StoreError> {
        match literal {
            Value::Array(parts) => Self::from_wire_array(parts),
            Value::Object(_) => Self::from_wire_group(literal),
            other => Err(StoreError::unsupported_condition(format!(
                "expected array or object, got {other}"
            ))),
        }
    }

    /// Decode a condition list (the usual `where` payload).
    pub fn list_from_wire(literal: &Value) -> Result<Vec<Self>, StoreError> {
        let Value::Array(items) = literal else {
            return Err(StoreError::unsupported_condition(
                "condition list must be an array",
            ));
        };
        items.iter().map(Self::from_wire).collect()
    }

    fn from_wire_array(parts: &[Value]) -> Result<Self, StoreError> {
        // The element count is a purely structural check: two elements are
        // shorthand equality, three are an explicit comparison.
        match parts {
            [field, value] => {
                let field = field_name(field)?;
                if is_group_literal(value) {
                    // A nested group may stand where a literal value would;
                    // comparisons and values are interchangeable here.
                    return Self::from_wire_group(value);
                }
                Ok(Self::eq(field, json_to_bson(value)))
            }
            [field, op, value] => {
                let field = field_name(field)?;
                let Value::String(op) = op else {
                    return Err(StoreError::unsupported_condition(
                        "comparison operator must be a string",
                    ));
                };
                Ok(Self::compare(field, CompareOp::parse(op)?, json_to_bson(value)))
            }
            _ => Err(StoreError::unsupported_condition(format!(
                "expected 2 or 3 elements, got {}",
                parts.len()
            ))),
        }
    }

    fn from_wire_group(literal: &Value) -> Result<Self, StoreError> {
        let Value::Object(entries) = literal else {
            return Err(StoreError::unsupported_condition(
                "group must be an object",
            ));
        };
        let mut groups = Vec::with_capacity(entries.len());
        for (key, operands) in entries {
            let Some(combinator) = Combinator::from_key(key) else {
                return Err(StoreError::unsupported_condition(format!(
                    "unknown combinator `{key}`"
                )));
            };
            let Value::Array(items) = operands else {
                return Err(StoreError::unsupported_condition(format!(
                    "`{key}` operands must be an array"
                )));
            };
            let operands = items
                .iter()
                .map(Self::from_wire)
                .collect::<Result<Vec<_>, _>>()?;
            groups.push(Self::Group {
                combinator,
                operands,
            });
        }
        // A multi-key object means every group must hold.
        if groups.len() == 1 {
            Ok(groups.remove(0))
        } else {
            Ok(Self::and(groups))
        }
    }
}

fn field_name(literal: &Value) -> Result<&str, StoreError> {
    literal.as_str().ok_or_else(|| {
        StoreError::unsupported_condition("condition field must be a string")
    })
}

fn is_group_literal(literal: &Value) -> bool {
    match literal {
        Value::Object(entries) => {
            !entries.is_empty() && entries.keys().all(|k| Combinator::from_key(k).is_some())
        }
        _ => false,
    }
}

/// Convert a JSON literal into its BSON value.
///
/// Integers stay integral; numbers outside the `i64` range fall back to
/// doubles.
#[must_use]
pub fn json_to_bson(literal: &Value) -> Bson {
    match literal {
        Value::Null => Bson::Null,
        Value::Bool(b) => Bson::Boolean(*b),
        Value::Number(n) => n.as_i64().map_or_else(
            || Bson::Double(n.as_f64().unwrap_or(f64::NAN)),
            Bson::Int64,
        ),
        Value::String(s) => Bson::String(s.clone()),
        Value::Array(items) => Bson::Array(items.iter().map(json_to_bson).collect()),
        Value::Object(entries) => {
            let mut doc = bson::Document::new();
            for (key, value) in entries {
                doc.insert(key, json_to_bson(value));
            }
            Bson::Document(doc)
        }
    }
}
