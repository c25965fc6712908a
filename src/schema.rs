//! Declarative per-field validation rules
//!
//! A [`Schema`] is an ordered list of [`FieldDef`]s, each holding its rules in
//! declaration order. Evaluating a field walks its rules and reports the
//! message of the first one that fails, so a field never carries more than one
//! error at a time.
use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use super::form::{FieldValue, Values};

// same shape browsers apply to <input type="email">
static EMAIL_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("email pattern failed to compile")
});

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    Required { message: String },
    MinLength { min: usize, message: String },
    Email { message: String },
    /// Value must equal the current value of another field
    Matches { field: String, message: String },
    Numeric { message: String },
    Date { message: String },
}

impl Rule {
    pub fn message(&self) -> &str {
        match self {
            Rule::Required { message }
            | Rule::MinLength { message, .. }
            | Rule::Email { message }
            | Rule::Matches { message, .. }
            | Rule::Numeric { message }
            | Rule::Date { message } => message,
        }
    }

    /// Shape rules let an empty value through, presence belongs to `Required`.
    pub fn check(&self, value: &FieldValue, values: &Values) -> bool {
        match self {
            Rule::Required { .. } => !value.is_empty(),
            Rule::MinLength { min, .. } => value.as_text().chars().count() >= *min,
            Rule::Email { .. } => value.is_empty() || EMAIL_SHAPE.is_match(&value.as_text()),
            Rule::Matches { field, .. } => {
                let other = values.get(field).map(FieldValue::as_text).unwrap_or_default();
                value.as_text() == other
            }
            Rule::Numeric { .. } => value.is_empty() || value.as_json_number().is_some(),
            Rule::Date { .. } => {
                value.is_empty() || NaiveDate::parse_from_str(&value.as_text(), DATE_FORMAT).is_ok()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    name: String,
    rules: Vec<Rule>,
}

impl FieldDef {
    /// A field with no rules is always valid
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            rules: vec![],
        }
    }
    pub fn required(mut self, message: &str) -> Self {
        self.rules.push(Rule::Required {
            message: message.into(),
        });
        self
    }
    pub fn min_length(mut self, min: usize, message: &str) -> Self {
        self.rules.push(Rule::MinLength {
            min,
            message: message.into(),
        });
        self
    }
    pub fn email(mut self, message: &str) -> Self {
        self.rules.push(Rule::Email {
            message: message.into(),
        });
        self
    }
    pub fn matches(mut self, field: &str, message: &str) -> Self {
        self.rules.push(Rule::Matches {
            field: field.into(),
            message: message.into(),
        });
        self
    }
    pub fn numeric(mut self, message: &str) -> Self {
        self.rules.push(Rule::Numeric {
            message: message.into(),
        });
        self
    }
    pub fn date(mut self, message: &str) -> Self {
        self.rules.push(Rule::Date {
            message: message.into(),
        });
        self
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }
    /// Message of the first failing rule, in declaration order
    pub fn evaluate(&self, value: &FieldValue, values: &Values) -> Option<String> {
        self.rules
            .iter()
            .find(|rule| !rule.check(value, values))
            .map(|rule| rule.message().to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    fields: Vec<FieldDef>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }
    /// Adds a field definition. Redefining a name replaces the earlier definition.
    pub fn field(mut self, def: FieldDef) -> Self {
        match self.fields.iter_mut().find(|f| f.name == def.name) {
            Some(existing) => *existing = def,
            None => self.fields.push(def),
        }
        self
    }
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }
    pub fn get(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }
    /// Validates one field against the full value set. A missing value is treated as empty text.
    pub fn validate_field(&self, name: &str, values: &Values) -> Option<String> {
        let def = self.get(name)?;
        let empty = FieldValue::default();
        let value = values.get(name).unwrap_or(&empty);

        def.evaluate(value, values)
    }
    /// Error map holding an entry for every failing field and nothing else
    pub fn validate(&self, values: &Values) -> BTreeMap<String, String> {
        self.fields
            .iter()
            .filter_map(|def| {
                self.validate_field(&def.name, values)
                    .map(|message| (def.name.clone(), message))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn password_schema() -> Schema {
        Schema::new()
            .field(
                FieldDef::new("password")
                    .min_length(8, "Password must be at least 8 characters")
                    .required("Password is required"),
            )
            .field(
                FieldDef::new("password_confirmation")
                    .matches("password", "Passwords must match")
                    .required("Password confirmation is required"),
            )
    }

    #[test]
    fn first_failing_rule_wins() {
        let schema = password_schema();
        let values = Values::new().with("password", "");

        assert_eq!(
            schema.validate_field("password", &values).as_deref(),
            Some("Password must be at least 8 characters")
        );
    }

    #[test]
    fn matches_reads_the_referenced_field() {
        let schema = password_schema();
        let values = Values::new()
            .with("password", "longenough1")
            .with("password_confirmation", "longenough2");

        assert_eq!(
            schema.validate_field("password_confirmation", &values).as_deref(),
            Some("Passwords must match")
        );

        let values = values.with("password_confirmation", "longenough1");
        assert!(schema.validate(&values).is_empty());
    }

    #[test]
    fn shape_rules_skip_empty_values() {
        let def = FieldDef::new("email")
            .email("Invalid email address")
            .required("Email is required");
        let values = Values::new();

        assert_eq!(
            def.evaluate(&FieldValue::default(), &values).as_deref(),
            Some("Email is required")
        );
        assert_eq!(
            def.evaluate(&"not-an-email".into(), &values).as_deref(),
            Some("Invalid email address")
        );
        assert_eq!(def.evaluate(&"a@b.com".into(), &values), None);
    }

    #[test]
    fn numeric_and_date_rules() {
        let values = Values::new();
        let numeric = Rule::Numeric {
            message: "nan".into(),
        };
        let date = Rule::Date {
            message: "bad date".into(),
        };

        assert!(numeric.check(&"42".into(), &values));
        assert!(numeric.check(&FieldValue::Number(0), &values));
        assert!(numeric.check(&"1.5".into(), &values));
        assert!(numeric.check(&"1e3".into(), &values));
        assert!(!numeric.check(&"4 2".into(), &values));
        assert!(!numeric.check(&"inf".into(), &values));
        assert!(date.check(&"2025-02-28".into(), &values));
        assert!(!date.check(&"2025-02-30".into(), &values));
    }

    #[test]
    fn redefining_a_field_replaces_it() {
        let schema = Schema::new()
            .field(FieldDef::new("a").required("first"))
            .field(FieldDef::new("a").required("second"));

        assert_eq!(schema.fields().len(), 1);
        assert_eq!(
            schema.validate_field("a", &Values::new()).as_deref(),
            Some("second")
        );
    }
}
