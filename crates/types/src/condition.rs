//! Guard conditions attached to activities through `when`.
//!
//! Conditions are boolean expressions over variable names. The supported syntax
//! is `&&`, `||`, prefix `!`, `==`/`!=` against JSON literals, and parentheses.
//! An outer `${{ ... }}` wrapper is accepted and stripped. An empty condition
//! parses to [`Condition::Always`].

use std::fmt;

use serde_json::Value as JsonValue;
use thiserror::Error;

/// Errors produced while parsing a condition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConditionError {
    #[error("operand cannot be empty")]
    EmptyOperand,
    #[error("expression cannot end with negation operator")]
    DanglingNegation,
    #[error("comparison expression must include both left and right operands")]
    MissingOperand,
    #[error("unsupported operator '{0}'; only '==', '!=', '&&', '||' and '!' are supported")]
    UnsupportedOperator(String),
    #[error("unsupported operand '{0}'; expected a variable name or a JSON literal")]
    InvalidOperand(String),
    #[error("unbalanced parentheses in '{0}'")]
    UnbalancedParentheses(String),
}

/// A side of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Variable(String),
    Literal(JsonValue),
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Variable(name) => f.write_str(name),
            Operand::Literal(literal) => write!(f, "{literal}"),
        }
    }
}

/// A parsed guard condition.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Condition {
    /// The condition of an activity without a guard.
    #[default]
    Always,
    Variable(String),
    Not(Box<Condition>),
    And(Vec<Condition>),
    Or(Vec<Condition>),
    Equals {
        left: Operand,
        right: Operand,
        negated: bool,
    },
}

impl Condition {
    /// Parses a condition; empty (or whitespace only) text is [`Condition::Always`].
    pub fn parse(raw_expression: &str) -> Result<Self, ConditionError> {
        let expression = normalize_condition_expression(raw_expression);
        if expression.is_empty() {
            return Ok(Condition::Always);
        }
        for operator in ["===", "!==", ">=", "<=", ">", "<"] {
            if find_top_level_operator(&expression, operator).is_some() {
                return Err(ConditionError::UnsupportedOperator(operator.to_string()));
            }
        }
        parse_condition_node(&expression)
    }

    pub fn is_always(&self) -> bool {
        matches!(self, Condition::Always)
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::And(_) | Condition::Or(_) | Condition::Equals { .. } => write!(f, "({self})"),
            _ => write!(f, "{self}"),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Always => f.write_str("true"),
            Condition::Variable(name) => f.write_str(name),
            Condition::Not(inner) => {
                f.write_str("!")?;
                inner.fmt_operand(f)
            }
            Condition::And(parts) => {
                for (index, part) in parts.iter().enumerate() {
                    if index > 0 {
                        f.write_str(" && ")?;
                    }
                    match part {
                        Condition::Or(_) => write!(f, "({part})")?,
                        _ => write!(f, "{part}")?,
                    }
                }
                Ok(())
            }
            Condition::Or(parts) => {
                for (index, part) in parts.iter().enumerate() {
                    if index > 0 {
                        f.write_str(" || ")?;
                    }
                    write!(f, "{part}")?;
                }
                Ok(())
            }
            Condition::Equals { left, right, negated } => {
                let operator = if *negated { "!=" } else { "==" };
                write!(f, "{left} {operator} {right}")
            }
        }
    }
}

/// Trims the expression and unwraps `${{ ... }}`.
fn normalize_condition_expression(raw_expression: &str) -> String {
    let trimmed = raw_expression.trim();
    if let Some(stripped) = trimmed.strip_prefix("${{") {
        let inner = stripped.trim();
        let inner = inner.strip_suffix("}}").unwrap_or(inner);
        inner.trim().to_string()
    } else {
        trimmed.to_string()
    }
}

fn parse_condition_node(expression: &str) -> Result<Condition, ConditionError> {
    let expression = expression.trim();
    if expression.is_empty() {
        return Err(ConditionError::EmptyOperand);
    }
    if !parentheses_balanced(expression) {
        return Err(ConditionError::UnbalancedParentheses(expression.to_string()));
    }

    if let Some(parts) = split_expression(expression, "||") {
        return parts
            .into_iter()
            .map(parse_condition_node)
            .collect::<Result<Vec<_>, _>>()
            .map(Condition::Or);
    }
    if let Some(parts) = split_expression(expression, "&&") {
        return parts
            .into_iter()
            .map(parse_condition_node)
            .collect::<Result<Vec<_>, _>>()
            .map(Condition::And);
    }

    let (negations, inner) = strip_leading_negations(expression);
    let inner = inner.trim();
    if inner.is_empty() {
        return Err(ConditionError::DanglingNegation);
    }
    if negations > 0 {
        let mut condition = parse_condition_node(inner)?;
        for _ in 0..negations {
            condition = Condition::Not(Box::new(condition));
        }
        return Ok(condition);
    }

    if let Some(grouped) = strip_enclosing_parentheses(inner) {
        return parse_condition_node(grouped);
    }

    for (operator, negated) in [("!=", true), ("==", false)] {
        if let Some(position) = find_top_level_operator(inner, operator) {
            let left_expression = inner[..position].trim();
            let right_expression = inner[position + operator.len()..].trim();
            if left_expression.is_empty() || right_expression.is_empty() {
                return Err(ConditionError::MissingOperand);
            }
            return Ok(Condition::Equals {
                left: parse_operand(left_expression)?,
                right: parse_operand(right_expression)?,
                negated,
            });
        }
    }

    match parse_operand(inner)? {
        Operand::Variable(name) => Ok(Condition::Variable(name)),
        Operand::Literal(JsonValue::Bool(true)) => Ok(Condition::Always),
        Operand::Literal(literal) => Err(ConditionError::InvalidOperand(literal.to_string())),
    }
}

fn parse_operand(expression: &str) -> Result<Operand, ConditionError> {
    let trimmed = expression.trim();
    if trimmed.is_empty() {
        return Err(ConditionError::EmptyOperand);
    }
    if looks_like_json_literal(trimmed)
        && let Ok(literal) = serde_json::from_str::<JsonValue>(trimmed)
    {
        return Ok(Operand::Literal(literal));
    }
    if is_variable_path(trimmed) {
        return Ok(Operand::Variable(trimmed.to_string()));
    }
    Err(ConditionError::InvalidOperand(trimmed.to_string()))
}

fn looks_like_json_literal(expression: &str) -> bool {
    let starts_like_number = expression
        .chars()
        .next()
        .map(|character| character == '-' || character.is_ascii_digit())
        .unwrap_or(false);
    expression.starts_with('[')
        || expression.starts_with('{')
        || expression.starts_with('"')
        || expression == "null"
        || expression == "true"
        || expression == "false"
        || starts_like_number
}

/// A dot-separated path of identifiers, such as `host.name`.
fn is_variable_path(expression: &str) -> bool {
    expression.split('.').all(|segment| {
        segment
            .chars()
            .next()
            .is_some_and(|character| character.is_ascii_alphabetic() || character == '_')
            && segment
                .chars()
                .all(|character| character.is_ascii_alphanumeric() || character == '_')
    })
}

fn split_expression<'a>(expression: &'a str, operator: &str) -> Option<Vec<&'a str>> {
    let mut parts = Vec::new();
    let mut start = 0usize;
    let length = expression.len();

    while start < length {
        if let Some(relative_index) = find_top_level_operator(&expression[start..], operator) {
            let absolute_index = start + relative_index;
            parts.push(expression[start..absolute_index].trim());
            start = absolute_index + operator.len();
            if start >= length {
                parts.push("");
            }
        } else {
            parts.push(expression[start..].trim());
            break;
        }
    }

    if parts.len() > 1 { Some(parts) } else { None }
}

fn strip_leading_negations(expression: &str) -> (usize, &str) {
    let mut count = 0usize;
    let mut remainder = expression.trim_start();
    while let Some(stripped) = remainder.strip_prefix('!') {
        if stripped.starts_with('=') {
            break;
        }
        count += 1;
        remainder = stripped.trim_start();
    }
    (count, remainder)
}

/// Returns the inside of `( ... )` when the parentheses enclose the whole expression.
fn strip_enclosing_parentheses(expression: &str) -> Option<&str> {
    let inner = expression.strip_prefix('(')?.strip_suffix(')')?;
    parentheses_balanced(inner).then_some(inner)
}

fn parentheses_balanced(expression: &str) -> bool {
    let mut depth = 0i32;
    let mut in_double_quote = false;
    for character in expression.chars() {
        match character {
            '"' => in_double_quote = !in_double_quote,
            '(' if !in_double_quote => depth += 1,
            ')' if !in_double_quote => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}

fn find_top_level_operator(expression: &str, operator: &str) -> Option<usize> {
    let mut in_single_quote = false;
    let mut in_double_quote = false;
    let mut depth = 0i32;

    for (index, character) in expression.char_indices() {
        match character {
            '\'' if !in_double_quote => {
                in_single_quote = !in_single_quote;
                continue;
            }
            '"' if !in_single_quote => {
                in_double_quote = !in_double_quote;
                continue;
            }
            '(' if !in_single_quote && !in_double_quote => {
                depth += 1;
                continue;
            }
            ')' if !in_single_quote && !in_double_quote => {
                if depth > 0 {
                    depth -= 1;
                }
                continue;
            }
            _ => {}
        }

        if !in_single_quote && !in_double_quote && depth == 0 && expression[index..].starts_with(operator) {
            return Some(index);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_condition_is_always_true() {
        assert_eq!(Condition::parse(""), Ok(Condition::Always));
        assert_eq!(Condition::parse("   "), Ok(Condition::Always));
        assert_eq!(Condition::parse("${{ }}"), Ok(Condition::Always));
    }

    #[test]
    fn parses_logical_operators_with_precedence() {
        let condition = Condition::parse("ready && !failed || override").expect("parse condition");
        assert_eq!(
            condition,
            Condition::Or(vec![
                Condition::And(vec![
                    Condition::Variable("ready".into()),
                    Condition::Not(Box::new(Condition::Variable("failed".into()))),
                ]),
                Condition::Variable("override".into()),
            ])
        );
        assert_eq!(condition.to_string(), "ready && !failed || override");
    }

    #[test]
    fn parentheses_group_subexpressions() {
        let condition = Condition::parse("${{ a && (b || c) }}").expect("parse condition");
        assert_eq!(condition.to_string(), "a && (b || c)");
        let negated = Condition::parse("!(a && b)").expect("parse negated group");
        assert_eq!(negated.to_string(), "!(a && b)");
    }

    #[test]
    fn parses_comparisons_against_literals() {
        let condition = Condition::parse("region == \"us\" && count != 0").expect("parse comparison");
        assert_eq!(
            condition,
            Condition::And(vec![
                Condition::Equals {
                    left: Operand::Variable("region".into()),
                    right: Operand::Literal(json!("us")),
                    negated: false,
                },
                Condition::Equals {
                    left: Operand::Variable("count".into()),
                    right: Operand::Literal(json!(0)),
                    negated: true,
                },
            ])
        );
        assert_eq!(condition.to_string(), "region == \"us\" && count != 0");
    }

    #[test]
    fn handles_utf8_string_literals_without_panicking() {
        let result = Condition::parse("name == \"café\" && region == \"us\"");
        assert!(result.is_ok(), "expected utf8 literal to parse without panic");
    }

    #[test]
    fn rejects_unsupported_syntax() {
        assert_eq!(Condition::parse("a > 1"), Err(ConditionError::UnsupportedOperator(">".into())));
        assert_eq!(Condition::parse("a === b"), Err(ConditionError::UnsupportedOperator("===".into())));
        assert_eq!(Condition::parse("!"), Err(ConditionError::DanglingNegation));
        assert_eq!(Condition::parse("a &&"), Err(ConditionError::EmptyOperand));
        assert_eq!(Condition::parse("== b"), Err(ConditionError::MissingOperand));
        assert!(matches!(Condition::parse("(a && b"), Err(ConditionError::UnbalancedParentheses(_))));
        assert!(matches!(Condition::parse("a b"), Err(ConditionError::InvalidOperand(_))));
        assert!(matches!(Condition::parse("hosts[0]"), Err(ConditionError::InvalidOperand(_))));
        assert_eq!(Condition::parse("host.ready"), Ok(Condition::Variable("host.ready".into())));
    }
}
