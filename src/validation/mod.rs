//! Declarative form validation.
//!
//! A `Schema` lists fields, each with an ordered set of `Rule`s, plus
//! cross-field `Refinement`s. Validation collects every failing rule; the UI
//! shows the first message recorded for a field.

use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

// ─── Input ────────────────────────────────────────────────────────────────────

/// Anything a schema can read field values from. Missing fields read as "".
pub trait FieldSource {
    fn value(&self, field: &str) -> Option<&str>;
}

impl FieldSource for HashMap<String, String> {
    fn value(&self, field: &str) -> Option<&str> {
        self.get(field).map(String::as_str)
    }
}

// ─── Rules ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    Required { message: String },
    /// Minimum length in characters.
    MinLen { min: usize, message: String },
    Email { message: String },
}

impl Rule {
    pub fn required(message: impl Into<String>) -> Self {
        Rule::Required { message: message.into() }
    }

    pub fn min_len(min: usize, message: impl Into<String>) -> Self {
        Rule::MinLen { min, message: message.into() }
    }

    pub fn email(message: impl Into<String>) -> Self {
        Rule::Email { message: message.into() }
    }

    pub fn passes(&self, value: &str) -> bool {
        match self {
            Rule::Required { .. }    => !value.is_empty(),
            Rule::MinLen { min, .. } => value.chars().count() >= *min,
            Rule::Email { .. }       => is_email(value),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Rule::Required { message }
            | Rule::MinLen { message, .. }
            | Rule::Email { message }     => message,
        }
    }
}

fn email_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9_+.\-]*[A-Za-z0-9_+\-]@([A-Za-z0-9][A-Za-z0-9\-]*\.)+[A-Za-z]{2,}$")
            .expect("email pattern compiles")
    })
}

pub fn is_email(value: &str) -> bool {
    !value.starts_with('.') && !value.contains("..") && email_pattern().is_match(value)
}

// ─── Fields and refinements ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct FieldSchema {
    pub name:  String,
    pub rules: Vec<Rule>,
}

impl FieldSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), rules: Vec::new() }
    }

    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }
}

/// Checks that run over the whole form once field rules are done.
#[derive(Debug, Clone, PartialEq)]
pub enum Refinement {
    /// `field` must equal `other`; failures are reported on `field`.
    Matches { field: String, other: String, message: String },
}

impl Refinement {
    pub fn matches(
        field: impl Into<String>,
        other: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Refinement::Matches { field: field.into(), other: other.into(), message: message.into() }
    }

    fn check(&self, input: &dyn FieldSource) -> Option<Issue> {
        match self {
            Refinement::Matches { field, other, message } => {
                let a = input.value(field).unwrap_or_default();
                let b = input.value(other).unwrap_or_default();
                (a != b).then(|| Issue { field: field.clone(), message: message.clone() })
            }
        }
    }
}

// ─── Schema ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    fields:      Vec<FieldSchema>,
    refinements: Vec<Refinement>,
}

impl Schema {
    pub fn new() -> Self { Self::default() }

    pub fn field(mut self, field: FieldSchema) -> Self {
        self.fields.push(field);
        self
    }

    pub fn refine(mut self, refinement: Refinement) -> Self {
        self.refinements.push(refinement);
        self
    }

    pub fn validate<S: FieldSource>(&self, input: &S) -> Result<(), ValidationErrors> {
        let mut issues = Vec::new();

        for field in &self.fields {
            let value = input.value(&field.name).unwrap_or_default();
            issues.extend(
                field.rules.iter()
                    .filter(|r| !r.passes(value))
                    .map(|r| Issue { field: field.name.clone(), message: r.message().to_owned() }),
            );
        }
        issues.extend(self.refinements.iter().filter_map(|r| r.check(input)));

        if issues.is_empty() { Ok(()) } else { Err(ValidationErrors { issues }) }
    }
}

// ─── Errors ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub field:   String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    issues: Vec<Issue>,
}

impl ValidationErrors {
    /// The message a form shows under `field`.
    pub fn first(&self, field: &str) -> Option<&str> {
        self.issues.iter().find(|i| i.field == field).map(|i| i.message.as_str())
    }

    pub fn messages<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.issues.iter().filter(move |i| i.field == field).map(|i| i.message.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Issue> { self.issues.iter() }
    pub fn len(&self) -> usize { self.issues.len() }
    pub fn is_empty(&self) -> bool { self.issues.is_empty() }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut seen: Vec<&str> = Vec::new();
        for issue in &self.issues {
            if seen.contains(&issue.field.as_str()) { continue; }
            if !seen.is_empty() { write!(f, "; ")?; }
            write!(f, "{}: {}", issue.field, issue.message)?;
            seen.push(&issue.field);
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn login_schema() -> Schema {
        Schema::new()
            .field(FieldSchema::new("user")
                .rule(Rule::min_len(3, "too short"))
                .rule(Rule::required("user is required")))
            .field(FieldSchema::new("mail").rule(Rule::email("bad mail")))
            .field(FieldSchema::new("pin"))
            .refine(Refinement::matches("pin2", "pin", "pins differ"))
    }

    #[test]
    fn valid_input_passes() {
        let ok = input(&[("user", "alice"), ("mail", "a@b.io"), ("pin", "1"), ("pin2", "1")]);
        assert_eq!(login_schema().validate(&ok), Ok(()));
    }

    #[test]
    fn every_failing_rule_is_recorded_in_order() {
        let errs = login_schema().validate(&input(&[])).unwrap_err();
        let user: Vec<&str> = errs.messages("user").collect();
        assert_eq!(user, ["too short", "user is required"]);
        assert_eq!(errs.first("user"), Some("too short"));
        assert_eq!(errs.first("mail"), Some("bad mail"));
        assert_eq!(errs.first("pin"), None);
        // Both pins missing read as equal.
        assert_eq!(errs.first("pin2"), None);
        assert_eq!(errs.len(), 3);
    }

    #[test]
    fn refinement_is_reported_on_its_field() {
        let errs = login_schema()
            .validate(&input(&[("user", "bob"), ("mail", "b@c.de"), ("pin", "1"), ("pin2", "2")]))
            .unwrap_err();
        assert_eq!(errs.len(), 1);
        assert_eq!(errs.first("pin2"), Some("pins differ"));
    }

    #[test]
    fn min_len_counts_characters() {
        assert!(Rule::min_len(2, "").passes("åß"));
        assert!(!Rule::min_len(3, "").passes("åß"));
    }

    #[test]
    fn email_shapes() {
        for ok in ["a@b.co", "first.last+tag@sub.example.org", "x_y-z@host-1.io"] {
            assert!(is_email(ok), "{ok}");
        }
        for bad in ["", "plain", "@b.co", "a@b", "a@b.c", ".a@b.co", "a..b@c.co", "a.@b.co", "a@-b.co", "a b@c.co"] {
            assert!(!is_email(bad), "{bad}");
        }
    }

    #[test]
    fn display_lists_first_message_per_field() {
        let errs = login_schema().validate(&input(&[("mail", "a@b.co")])).unwrap_err();
        assert_eq!(errs.to_string(), "user: too short");
    }
}
