//! Search domain builder.
//!
//! Domains are polish-notation arrays: prefix operators apply to the
//! terms that follow, and top-level terms AND together by default, so
//! `[A, "|", B, C]` reads as `A AND (B OR C)`.

use serde::{Serialize, Serializer};
use serde_json::{Value, json};

/// A search domain under construction.
#[derive(Debug, Clone, Default)]
pub struct Domain(Vec<Value>);

/// A single `[field, operator, value]` term, for use with [`Domain::any`].
pub fn term(field: &str, op: &str, value: impl Serialize) -> Value {
    let value = serde_json::to_value(value).unwrap_or(Value::Null);
    json!([field, op, value])
}

impl Domain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn filter(mut self, field: &str, op: &str, value: impl Serialize) -> Self {
        self.0.push(term(field, op, value));
        self
    }

    pub fn eq(self, field: &str, value: impl Serialize) -> Self {
        self.filter(field, "=", value)
    }

    pub fn ne(self, field: &str, value: impl Serialize) -> Self {
        self.filter(field, "!=", value)
    }

    pub fn ge(self, field: &str, value: impl Serialize) -> Self {
        self.filter(field, ">=", value)
    }

    pub fn le(self, field: &str, value: impl Serialize) -> Self {
        self.filter(field, "<=", value)
    }

    /// Case-insensitive substring match.
    pub fn ilike(self, field: &str, value: &str) -> Self {
        self.filter(field, "ilike", value)
    }

    pub fn is_in(self, field: &str, values: impl Serialize) -> Self {
        self.filter(field, "in", values)
    }

    /// Datetime range covering `[start, end]` inclusive on `field`.
    pub fn between(self, field: &str, start: &str, end: &str) -> Self {
        self.ge(field, start).le(field, end)
    }

    /// OR-combine the given terms: `n - 1` `"|"` prefixes followed by
    /// the terms themselves.
    pub fn any(mut self, terms: Vec<Value>) -> Self {
        for _ in 1..terms.len() {
            self.0.push(Value::String("|".to_string()));
        }
        self.0.extend(terms);
        self
    }

    pub fn into_value(self) -> Value {
        Value::Array(self.0)
    }
}

impl Serialize for Domain {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl From<Domain> for Value {
    fn from(domain: Domain) -> Self {
        domain.into_value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terms_and_together() {
        let domain = Domain::new()
            .eq("employee_id", 7)
            .eq("check_out", false)
            .into_value();
        assert_eq!(
            domain,
            json!([["employee_id", "=", 7], ["check_out", "=", false]])
        );
    }

    #[test]
    fn any_emits_prefix_bars() {
        let domain = Domain::new()
            .any(vec![
                term("name", "ilike", "acme"),
                term("phone", "ilike", "acme"),
            ])
            .into_value();
        assert_eq!(
            domain,
            json!(["|", ["name", "ilike", "acme"], ["phone", "ilike", "acme"]])
        );
    }

    #[test]
    fn any_of_three_emits_two_bars() {
        let domain = Domain::new()
            .any(vec![
                term("state", "=", "approved"),
                term("state", "=", "checked_in"),
                term("state", "=", "checked_out"),
            ])
            .into_value();
        let rendered = serde_json::to_string(&domain).unwrap();
        assert_eq!(rendered.matches("\"|\"").count(), 2);
    }

    #[test]
    fn mixed_and_or() {
        let domain = Domain::new()
            .eq("sale_ok", true)
            .any(vec![term("name", "ilike", "bolt"), term("default_code", "ilike", "bolt")])
            .into_value();
        assert_eq!(
            domain,
            json!([
                ["sale_ok", "=", true],
                "|",
                ["name", "ilike", "bolt"],
                ["default_code", "ilike", "bolt"],
            ])
        );
    }

    #[test]
    fn between_is_inclusive_range() {
        let domain = Domain::new()
            .between("check_in", "2025-03-09 00:00:00", "2025-03-09 23:59:59")
            .into_value();
        assert_eq!(
            domain,
            json!([
                ["check_in", ">=", "2025-03-09 00:00:00"],
                ["check_in", "<=", "2025-03-09 23:59:59"],
            ])
        );
    }

    #[test]
    fn empty_domain_matches_everything() {
        let domain = Domain::new();
        assert!(domain.is_empty());
        assert_eq!(domain.into_value(), json!([]));
    }
}
