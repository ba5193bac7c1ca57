// SPDX-License-Identifier: PMPL-1.0-or-later
//! Condition fragments produced by handlers.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Binary comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
}

impl CompareOp {
    pub fn symbol(self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Neq => "<>",
            CompareOp::Lt => "<",
            CompareOp::Lte => "<=",
            CompareOp::Gt => ">",
            CompareOp::Gte => ">=",
        }
    }

    /// Whether an ordering between the operands satisfies this operator.
    /// An incomparable pair (`None`) satisfies nothing.
    pub fn holds(self, ordering: Option<Ordering>) -> bool {
        let Some(ordering) = ordering else {
            return false;
        };
        match self {
            CompareOp::Eq => ordering == Ordering::Equal,
            CompareOp::Neq => ordering != Ordering::Equal,
            CompareOp::Lt => ordering == Ordering::Less,
            CompareOp::Lte => ordering != Ordering::Greater,
            CompareOp::Gt => ordering == Ordering::Greater,
            CompareOp::Gte => ordering != Ordering::Less,
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Alias-qualified field reference, rendered `alias.field`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldRef {
    pub alias: String,
    pub field: String,
}

impl FieldRef {
    pub fn new(alias: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            field: field.into(),
        }
    }
}

/// Whether `name` can be rendered unquoted as an alias or field:
/// `[A-Za-z_][A-Za-z0-9_]*`.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.alias, self.field)
    }
}

/// One side of a comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operand {
    Field(FieldRef),
    /// Placeholder of a bound parameter, rendered `:name`.
    Param(String),
}

impl Operand {
    pub fn field(alias: impl Into<String>, field: impl Into<String>) -> Self {
        Operand::Field(FieldRef::new(alias, field))
    }

    pub fn param(name: impl Into<String>) -> Self {
        Operand::Param(name.into())
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Field(field) => write!(f, "{}", field),
            Operand::Param(name) => write!(f, ":{}", name),
        }
    }
}

/// A backend-native boolean expression.
///
/// Groups of more than one part always render inside parentheses, so a
/// nested `And` under an `Or` never depends on operator precedence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    /// Constant true, rendered `1 = 1`.
    True,
    Compare {
        left: Operand,
        op: CompareOp,
        right: Operand,
    },
    And(Vec<Condition>),
    Or(Vec<Condition>),
    Not(Box<Condition>),
}

impl Condition {
    pub fn compare(left: Operand, op: CompareOp, right: Operand) -> Self {
        Condition::Compare { left, op, right }
    }

    pub fn equals(left: Operand, right: Operand) -> Self {
        Self::compare(left, CompareOp::Eq, right)
    }

    pub fn and(parts: Vec<Condition>) -> Self {
        Condition::And(parts)
    }

    pub fn or(parts: Vec<Condition>) -> Self {
        Condition::Or(parts)
    }

    pub fn negate(inner: Condition) -> Self {
        Condition::Not(Box::new(inner))
    }

    /// Conjoin `other`, flattening into an existing top-level `And`.
    pub fn and_also(self, other: Condition) -> Self {
        match self {
            Condition::And(mut parts) => {
                parts.push(other);
                Condition::And(parts)
            }
            existing => Condition::And(vec![existing, other]),
        }
    }

    /// Placeholder names referenced anywhere in this condition, in order.
    pub fn parameter_names<'a>(&'a self) -> Vec<&'a str> {
        let mut names = Vec::new();
        self.walk(&mut |condition: &'a Condition| {
            if let Condition::Compare { left, right, .. } = condition {
                for operand in [left, right] {
                    if let Operand::Param(name) = operand {
                        names.push(name.as_str());
                    }
                }
            }
        });
        names
    }

    /// Field references anywhere in this condition, in order.
    pub fn field_refs<'a>(&'a self) -> Vec<&'a FieldRef> {
        let mut fields = Vec::new();
        self.walk(&mut |condition: &'a Condition| {
            if let Condition::Compare { left, right, .. } = condition {
                for operand in [left, right] {
                    if let Operand::Field(field) = operand {
                        fields.push(field);
                    }
                }
            }
        });
        fields
    }

    fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a Condition)) {
        visit(self);
        match self {
            Condition::And(parts) | Condition::Or(parts) => {
                for part in parts {
                    part.walk(visit);
                }
            }
            Condition::Not(inner) => inner.walk(visit),
            Condition::True | Condition::Compare { .. } => {}
        }
    }

    /// Render for a WHERE/ON clause: like `Display`, minus the parentheses
    /// around an outermost group.
    pub fn to_clause_string(&self) -> String {
        match self {
            Condition::And(parts) if parts.len() > 1 => join_parts(parts, " AND "),
            Condition::Or(parts) if parts.len() > 1 => join_parts(parts, " OR "),
            other => other.to_string(),
        }
    }
}

fn join_parts(parts: &[Condition], separator: &str) -> String {
    parts
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(separator)
}

fn fmt_group(
    f: &mut fmt::Formatter<'_>,
    parts: &[Condition],
    separator: &str,
    identity: &str,
) -> fmt::Result {
    match parts {
        [] => f.write_str(identity),
        [single] => write!(f, "{}", single),
        _ => write!(f, "({})", join_parts(parts, separator)),
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::True => f.write_str("1 = 1"),
            Condition::Compare { left, op, right } => write!(f, "{} {} {}", left, op, right),
            Condition::And(parts) => fmt_group(f, parts, " AND ", "1 = 1"),
            Condition::Or(parts) => fmt_group(f, parts, " OR ", "1 = 0"),
            Condition::Not(inner) => write!(f, "NOT({})", inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eq(alias: &str, field: &str, param: &str) -> Condition {
        Condition::equals(Operand::field(alias, field), Operand::param(param))
    }

    #[test]
    fn test_identifier_check() {
        assert!(is_identifier("article"));
        assert!(is_identifier("_unit_price2"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("2nd"));
        assert!(!is_identifier("id = 1 OR p.x"));
        assert!(!is_identifier("p.article"));
    }

    #[test]
    fn test_compare_rendering() {
        assert_eq!(eq("p", "article", "article_0").to_string(), "p.article = :article_0");
        let lt = Condition::compare(Operand::field("p", "price"), CompareOp::Lt, Operand::param("max"));
        assert_eq!(lt.to_string(), "p.price < :max");
    }

    #[test]
    fn test_groups_always_parenthesized() {
        let inner = Condition::and(vec![eq("a", "x", "p0"), eq("a", "y", "p1")]);
        let outer = Condition::or(vec![inner, eq("a", "z", "p2")]);
        assert_eq!(outer.to_string(), "((a.x = :p0 AND a.y = :p1) OR a.z = :p2)");
        assert_eq!(outer.to_clause_string(), "(a.x = :p0 AND a.y = :p1) OR a.z = :p2");
    }

    #[test]
    fn test_single_part_group_renders_bare() {
        assert_eq!(Condition::and(vec![eq("a", "x", "p0")]).to_string(), "a.x = :p0");
    }

    #[test]
    fn test_negation_not_simplified() {
        let double = Condition::negate(Condition::negate(eq("a", "x", "p0")));
        assert_eq!(double.to_string(), "NOT(NOT(a.x = :p0))");
    }

    #[test]
    fn test_and_also_flattens() {
        let c = eq("a", "x", "p0").and_also(eq("a", "y", "p1")).and_also(Condition::True);
        assert_eq!(c.to_clause_string(), "a.x = :p0 AND a.y = :p1 AND 1 = 1");
    }

    #[test]
    fn test_parameter_names_in_order() {
        let c = Condition::or(vec![eq("a", "x", "first"), Condition::negate(eq("b", "y", "second"))]);
        assert_eq!(c.parameter_names(), vec!["first", "second"]);
        let aliases: Vec<&str> = c.field_refs().iter().map(|f| f.alias.as_str()).collect();
        assert_eq!(aliases, vec!["a", "b"]);
    }

    #[test]
    fn test_operator_holds() {
        assert!(CompareOp::Lte.holds(Some(Ordering::Equal)));
        assert!(!CompareOp::Gt.holds(Some(Ordering::Equal)));
        assert!(!CompareOp::Neq.holds(None));
    }

    #[test]
    fn test_condition_json_roundtrip() {
        let c = Condition::negate(Condition::and(vec![eq("p", "article", "a_0"), Condition::True]));
        let json = serde_json::to_string(&c).unwrap();
        let parsed: Condition = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, c);
    }
}
