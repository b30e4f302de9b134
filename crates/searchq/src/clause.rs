//! Filter clauses, the output of the pipeline.
//!
//! A [`Clause`] is one resolved filter condition: a [`Filter`] payload plus an
//! `exclude` flag set by negation. Clauses serialize to a map tagged by `kind`
//! (`Term`, `Field`, `GT`, `GTE`, `LT`, `LTE`, `Range`), with `exclude: true`
//! present only on negated clauses.

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, SecondsFormat, Timelike};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// A typed comparison or range bound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    /// A numeric literal such as `21` or `4.5`.
    Number(f64),
    /// A date literal such as `2024-01-01` or `2024-01-01T10:00:00+02:00`.
    ///
    /// Literals without an offset are taken as UTC; date-only literals are
    /// midnight UTC.
    Date(DateTime<FixedOffset>),
}

impl Value {
    /// Parses the text of a number literal.
    pub fn parse_number(text: &str) -> Option<f64> {
        text.parse::<f64>().ok().filter(|n| n.is_finite())
    }

    /// Parses the text of a date literal.
    ///
    /// Accepts `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM:SS`, and the latter followed by
    /// `Z` or a `±HH:MM` offset. Returns `None` for text that is shaped like a
    /// date but names no real calendar instant (`2024-02-30`).
    pub fn parse_date(text: &str) -> Option<DateTime<FixedOffset>> {
        if let Ok(datetime) = DateTime::parse_from_rfc3339(text) {
            return Some(datetime);
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S") {
            return Some(naive.and_utc().fixed_offset());
        }
        let date = NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()?;
        Some(date.and_hms_opt(0, 0, 0)?.and_utc().fixed_offset())
    }

    /// Returns the number, if this is a numeric value.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Date(_) => None,
        }
    }

    /// Returns the date-time, if this is a date value.
    pub fn as_date(&self) -> Option<DateTime<FixedOffset>> {
        match self {
            Value::Date(d) => Some(*d),
            Value::Number(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{n}"),
            Value::Date(d) => {
                let midnight = d.num_seconds_from_midnight() == 0;
                match (d.offset().local_minus_utc(), midnight) {
                    (0, true) => write!(f, "{}", d.format("%Y-%m-%d")),
                    (0, false) => write!(f, "{}", d.format("%Y-%m-%dT%H:%M:%SZ")),
                    _ => write!(f, "{}", d.format("%Y-%m-%dT%H:%M:%S%:z")),
                }
            }
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Number(n) => serializer.serialize_f64(*n),
            Value::Date(d) => serializer.serialize_str(&d.to_rfc3339_opts(SecondsFormat::Secs, true)),
        }
    }
}

/// Relational operator of a [`Filter::Compare`] clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    /// `field:>value`
    Gt,
    /// `field:>=value`
    Gte,
    /// `field:<value`
    Lt,
    /// `field:<=value`
    Lte,
}

impl CompareOp {
    /// The clause kind tag for this operator (`GT`, `GTE`, `LT`, `LTE`).
    pub fn kind(self) -> &'static str {
        match self {
            CompareOp::Gt => "GT",
            CompareOp::Gte => "GTE",
            CompareOp::Lt => "LT",
            CompareOp::Lte => "LTE",
        }
    }

    /// The operator as spelled in query text.
    pub fn symbol(self) -> &'static str {
        match self {
            CompareOp::Gt => ":>",
            CompareOp::Gte => ":>=",
            CompareOp::Lt => ":<",
            CompareOp::Lte => ":<=",
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// The payload of a clause.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// A bare search term.
    Term {
        /// The term text, unescaped.
        value: String,
    },

    /// `field` equals `value` exactly.
    Field {
        /// Field name.
        field: String,
        /// Expected value, unescaped.
        value: String,
    },

    /// Relational comparison of `field` against a typed value.
    Compare {
        /// The operator.
        op: CompareOp,
        /// Field name.
        field: String,
        /// The bound.
        value: Value,
    },

    /// Closed interval `from..to` on `field`.
    ///
    /// Both bounds are always present; one-sided ranges are built as
    /// [`Filter::Compare`] instead.
    Range {
        /// Field name.
        field: String,
        /// Lower bound, inclusive.
        from: Value,
        /// Upper bound, inclusive.
        to: Value,
    },
}

impl Filter {
    /// Creates a term filter.
    pub fn term(value: impl Into<String>) -> Self {
        Filter::Term {
            value: value.into(),
        }
    }

    /// Creates a field-equals filter.
    pub fn field(field: impl Into<String>, value: impl Into<String>) -> Self {
        Filter::Field {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Creates a comparison filter.
    pub fn compare(op: CompareOp, field: impl Into<String>, value: Value) -> Self {
        Filter::Compare {
            op,
            field: field.into(),
            value,
        }
    }

    /// Creates a closed range filter.
    pub fn range(field: impl Into<String>, from: Value, to: Value) -> Self {
        Filter::Range {
            field: field.into(),
            from,
            to,
        }
    }

    /// The kind tag: `Term`, `Field`, `GT`, `GTE`, `LT`, `LTE` or `Range`.
    pub fn kind(&self) -> &'static str {
        match self {
            Filter::Term { .. } => "Term",
            Filter::Field { .. } => "Field",
            Filter::Compare { op, .. } => op.kind(),
            Filter::Range { .. } => "Range",
        }
    }

    /// The field this filter applies to, or `None` for bare terms.
    pub fn field_name(&self) -> Option<&str> {
        match self {
            Filter::Term { .. } => None,
            Filter::Field { field, .. }
            | Filter::Compare { field, .. }
            | Filter::Range { field, .. } => Some(field),
        }
    }
}

/// One resolved filter condition.
#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    /// What to match.
    pub filter: Filter,
    /// Whether matches should be excluded rather than included.
    pub exclude: bool,
}

impl Clause {
    /// Creates an inclusive clause.
    pub fn new(filter: Filter) -> Self {
        Self {
            filter,
            exclude: false,
        }
    }

    /// Creates an excluding clause.
    pub fn excluded(filter: Filter) -> Self {
        Self {
            filter,
            exclude: true,
        }
    }

    /// The kind tag of the payload.
    pub fn kind(&self) -> &'static str {
        self.filter.kind()
    }
}

impl From<Filter> for Clause {
    fn from(filter: Filter) -> Self {
        Clause::new(filter)
    }
}

impl Serialize for Clause {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("kind", self.kind())?;
        match &self.filter {
            Filter::Term { value } => {
                map.serialize_entry("value", value)?;
            }
            Filter::Field { field, value } => {
                map.serialize_entry("field", field)?;
                map.serialize_entry("value", value)?;
            }
            Filter::Compare { field, value, .. } => {
                map.serialize_entry("field", field)?;
                map.serialize_entry("value", value)?;
            }
            Filter::Range { field, from, to } => {
                map.serialize_entry("field", field)?;
                map.serialize_entry("from", from)?;
                map.serialize_entry("to", to)?;
            }
        }
        if self.exclude {
            map.serialize_entry("exclude", &true)?;
        }
        map.end()
    }
}

/// Renders the clause back as query text that parses to an equal clause.
impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.exclude {
            f.write_str("-")?;
        }
        match &self.filter {
            Filter::Term { value } => write_term(f, value),
            Filter::Field { field, value } => {
                write!(f, "{field}:")?;
                write_term(f, value)
            }
            Filter::Compare { op, field, value } => write!(f, "{field}{op}{value}"),
            Filter::Range { field, from, to } => write!(f, "{field}:{from}..{to}"),
        }
    }
}

/// Renders a clause list as a single query string.
pub fn to_query(clauses: &[Clause]) -> String {
    clauses
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

fn write_term(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
    if needs_quoting(value) {
        let quoted = serde_json::to_string(value).map_err(|_| fmt::Error)?;
        f.write_str(&quoted)
    } else {
        f.write_str(value)
    }
}

/// Whether `value` would not read back as a single plain term.
fn needs_quoting(value: &str) -> bool {
    value.is_empty()
        || value == "NOT"
        || value.starts_with(['-', '*'])
        || value
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, ':' | '.' | '"' | '\\'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(text: &str) -> Value {
        Value::Date(Value::parse_date(text).unwrap())
    }

    #[test]
    fn test_parse_date_forms() {
        let day = Value::parse_date("2024-01-15").unwrap();
        assert_eq!(day.to_rfc3339(), "2024-01-15T00:00:00+00:00");

        let local = Value::parse_date("2024-01-15T10:30:00").unwrap();
        assert_eq!(local.to_rfc3339(), "2024-01-15T10:30:00+00:00");

        let zulu = Value::parse_date("2024-01-15T10:30:00Z").unwrap();
        assert_eq!(zulu, local);

        let offset = Value::parse_date("2024-01-15T10:30:00+02:00").unwrap();
        assert_eq!(offset.offset().local_minus_utc(), 2 * 3600);
    }

    #[test]
    fn test_parse_date_rejects_impossible_dates() {
        assert!(Value::parse_date("2024-02-30").is_none());
        assert!(Value::parse_date("2024-13-01").is_none());
        assert!(Value::parse_date("2024-01-01T25:00:00").is_none());
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(Value::parse_number("21"), Some(21.0));
        assert_eq!(Value::parse_number("4.5"), Some(4.5));
        assert_eq!(Value::parse_number("abc"), None);
    }

    #[test]
    fn test_kind_tags() {
        assert_eq!(Filter::term("x").kind(), "Term");
        assert_eq!(Filter::field("a", "b").kind(), "Field");
        assert_eq!(
            Filter::compare(CompareOp::Gte, "age", Value::Number(21.0)).kind(),
            "GTE"
        );
        assert_eq!(
            Filter::range("n", Value::Number(1.0), Value::Number(2.0)).kind(),
            "Range"
        );
    }

    #[test]
    fn test_serialize_term() {
        let json = serde_json::to_value(Clause::new(Filter::term("hello"))).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "Term", "value": "hello"}));
    }

    #[test]
    fn test_serialize_exclude_only_when_set() {
        let json = serde_json::to_value(Clause::excluded(Filter::field("status", "open"))).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"kind": "Field", "field": "status", "value": "open", "exclude": true})
        );

        let json = serde_json::to_string(&Clause::new(Filter::field("status", "open"))).unwrap();
        assert!(!json.contains("exclude"));
    }

    #[test]
    fn test_serialize_compare_number() {
        let clause = Clause::new(Filter::compare(CompareOp::Lt, "age", Value::Number(21.0)));
        let json = serde_json::to_value(clause).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"kind": "LT", "field": "age", "value": 21.0})
        );
    }

    #[test]
    fn test_serialize_range_dates() {
        let clause = Clause::new(Filter::range(
            "created",
            date("2020-01-01"),
            date("2021-01-01T12:00:00+01:00"),
        ));
        let json = serde_json::to_value(clause).unwrap();
        assert_eq!(json["from"], "2020-01-01T00:00:00Z");
        assert_eq!(json["to"], "2021-01-01T12:00:00+01:00");
    }

    #[test]
    fn test_display_value() {
        assert_eq!(Value::Number(21.0).to_string(), "21");
        assert_eq!(Value::Number(2.5).to_string(), "2.5");
        assert_eq!(date("2020-01-01").to_string(), "2020-01-01");
        assert_eq!(date("2020-01-01T08:00:00").to_string(), "2020-01-01T08:00:00Z");
        assert_eq!(
            date("2020-01-01T08:00:00-05:00").to_string(),
            "2020-01-01T08:00:00-05:00"
        );
    }

    #[test]
    fn test_display_clauses() {
        assert_eq!(Clause::excluded(Filter::field("status", "open")).to_string(), "-status:open");
        assert_eq!(
            Clause::new(Filter::compare(CompareOp::Gte, "age", Value::Number(21.0))).to_string(),
            "age:>=21"
        );
        assert_eq!(
            Clause::new(Filter::range("created", date("2020-01-01"), date("2021-01-01"))).to_string(),
            "created:2020-01-01..2021-01-01"
        );
    }

    #[test]
    fn test_display_quotes_reserved_terms() {
        assert_eq!(Clause::new(Filter::term("hello world")).to_string(), r#""hello world""#);
        assert_eq!(Clause::new(Filter::term("a:b")).to_string(), r#""a:b""#);
        assert_eq!(Clause::new(Filter::term("NOT")).to_string(), r#""NOT""#);
        assert_eq!(Clause::new(Filter::term("-x")).to_string(), r#""-x""#);
        assert_eq!(Clause::new(Filter::term(r#"say "hi""#)).to_string(), r#""say \"hi\"""#);
        assert_eq!(Clause::new(Filter::term("plain")).to_string(), "plain");
    }

    #[test]
    fn test_to_query_joins_with_spaces() {
        let clauses = vec![
            Clause::new(Filter::term("a")),
            Clause::excluded(Filter::term("b")),
        ];
        assert_eq!(to_query(&clauses), "a -b");
    }
}
