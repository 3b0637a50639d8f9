use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::cell::parse_date;
use crate::value::Row;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    Select,
    #[serde(alias = "multi_select")]
    MultiSelect,
    Search,
    Date,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOption {
    pub value: String,
    pub label: String,
}

impl FilterOption {
    pub fn new(value: &str) -> Self {
        Self {
            value: value.to_string(),
            label: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "type")]
    pub kind: FilterKind,
    #[serde(default)]
    pub options: Vec<FilterOption>,
    /// Searchable fields for `Search` filters. Empty means the field named by `id`.
    #[serde(default)]
    pub fields: Vec<String>,
}

impl FilterSpec {
    pub fn new(id: &str, kind: FilterKind) -> Self {
        Self {
            id: id.to_string(),
            label: id.to_string(),
            kind,
            options: Vec::new(),
            fields: Vec::new(),
        }
    }

    pub fn search(id: &str, fields: &[&str]) -> Self {
        let mut spec = Self::new(id, FilterKind::Search);
        spec.fields = fields.iter().map(|f| f.to_string()).collect();
        spec
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = label.to_string();
        self
    }

    pub fn with_options(mut self, options: Vec<FilterOption>) -> Self {
        self.options = options;
        self
    }

    /// Options from the distinct values of `id` in `rows`, in first-seen order.
    pub fn options_from_rows(rows: &[Row], id: &str) -> Vec<FilterOption> {
        let mut seen = HashSet::new();
        rows.iter()
            .filter_map(|row| row.text(id))
            .filter(|v| !v.is_empty())
            .filter(|v| seen.insert(v.clone()))
            .map(|v| FilterOption::new(&v))
            .collect()
    }

    fn search_fields(&self) -> Vec<String> {
        if self.fields.is_empty() {
            vec![self.id.clone()]
        } else {
            self.fields.clone()
        }
    }
}

/// Current value of one filter. Empty string or empty list means "no constraint".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Single(String),
    Many(Vec<String>),
}

impl FilterValue {
    pub fn is_empty(&self) -> bool {
        match self {
            FilterValue::Single(s) => s.is_empty(),
            FilterValue::Many(v) => v.is_empty(),
        }
    }

    pub fn values(&self) -> Vec<&str> {
        match self {
            FilterValue::Single(s) if s.is_empty() => Vec::new(),
            FilterValue::Single(s) => vec![s.as_str()],
            FilterValue::Many(v) => v.iter().map(String::as_str).collect(),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        FilterValue::Single(s.to_string())
    }
}

impl From<Vec<&str>> for FilterValue {
    fn from(v: Vec<&str>) -> Self {
        FilterValue::Many(v.into_iter().map(str::to_string).collect())
    }
}

pub type FilterValues = HashMap<String, FilterValue>;

/// A range of dates, inclusive at both ends. Either bound may be open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DateRange {
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
}

impl DateRange {
    /// `YYYY-MM-DD` (single day) or `FROM..TO`, where an empty side is an
    /// open bound. None when any non-empty part fails to parse.
    fn parse(s: &str) -> Option<Self> {
        match s.split_once("..") {
            Some((from, to)) => {
                let range = Self {
                    from: parse_bound(from)?,
                    to: parse_bound(to)?,
                };
                (range.from.is_some() || range.to.is_some()).then_some(range)
            }
            None => parse_date(s).map(|d| Self {
                from: Some(d),
                to: Some(d),
            }),
        }
    }

    fn contains(&self, date: NaiveDate) -> bool {
        self.from.map_or(true, |from| date >= from) && self.to.map_or(true, |to| date <= to)
    }
}

/// Some(None) for an empty (open) bound, None when the bound is malformed.
fn parse_bound(s: &str) -> Option<Option<NaiveDate>> {
    if s.trim().is_empty() {
        Some(None)
    } else {
        parse_date(s).map(Some)
    }
}

#[derive(Debug, Clone)]
enum Constraint {
    Equals { field: String, value: String },
    OneOf { field: String, values: HashSet<String> },
    Within { field: String, range: DateRange },
}

impl Constraint {
    fn matches(&self, row: &Row) -> bool {
        match self {
            Constraint::Equals { field, value } => {
                row.text(field).as_deref() == Some(value.as_str())
            }
            Constraint::OneOf { field, values } => {
                row.text(field).is_some_and(|v| values.contains(&v))
            }
            Constraint::Within { field, range } => row
                .text(field)
                .and_then(|v| parse_date(&v))
                .is_some_and(|d| range.contains(d)),
        }
    }
}

/// Conjunction of a search term and every active categorical constraint.
#[derive(Debug, Clone)]
pub struct RowPredicate {
    search_fields: Vec<String>,
    /// Lowercased search term; None when search imposes no constraint.
    search: Option<String>,
    constraints: Vec<Constraint>,
}

impl RowPredicate {
    pub fn matches(&self, row: &Row) -> bool {
        self.matches_search(row) && self.constraints.iter().all(|c| c.matches(row))
    }

    fn matches_search(&self, row: &Row) -> bool {
        let Some(term) = &self.search else {
            return true;
        };
        self.search_fields.iter().any(|field| {
            row.text(field)
                .is_some_and(|v| v.to_lowercase().contains(term.as_str()))
        })
    }

    /// Indices of matching rows, in input order.
    pub fn apply(&self, rows: &[Row]) -> Vec<usize> {
        rows.iter()
            .enumerate()
            .filter(|(_, row)| self.matches(row))
            .map(|(i, _)| i)
            .collect()
    }

    /// True when no constraint is active and every row matches.
    pub fn is_identity(&self) -> bool {
        self.search.is_none() && self.constraints.is_empty()
    }
}

pub fn build_predicate(specs: &[FilterSpec], values: &FilterValues, search: &str) -> RowPredicate {
    let search_spec = specs.iter().find(|s| s.kind == FilterKind::Search);
    let search_fields = search_spec.map(FilterSpec::search_fields).unwrap_or_default();
    let search = match search_spec {
        Some(_) if !search.is_empty() => Some(search.to_lowercase()),
        _ => None,
    };

    let constraints = specs
        .iter()
        .filter_map(|spec| {
            let value = values.get(&spec.id).filter(|v| !v.is_empty())?;
            constraint_for(spec, value)
        })
        .collect();

    RowPredicate {
        search_fields,
        search,
        constraints,
    }
}

fn constraint_for(spec: &FilterSpec, value: &FilterValue) -> Option<Constraint> {
    let field = spec.id.clone();
    match (spec.kind, value) {
        (FilterKind::Search, _) => None,
        (FilterKind::Select, FilterValue::Single(v)) => Some(Constraint::Equals {
            field,
            value: v.clone(),
        }),
        (FilterKind::Select | FilterKind::MultiSelect, v) => Some(Constraint::OneOf {
            field,
            values: v.values().into_iter().map(str::to_string).collect(),
        }),
        (FilterKind::Date, FilterValue::Single(v)) => {
            DateRange::parse(v).map(|range| Constraint::Within { field, range })
        }
        (FilterKind::Date, FilterValue::Many(_)) => None,
    }
}

pub fn filter_rows<'a>(
    rows: &'a [Row],
    specs: &[FilterSpec],
    values: &FilterValues,
    search: &str,
) -> Vec<&'a Row> {
    let predicate = build_predicate(specs, values, search);
    rows.iter().filter(|row| predicate.matches(row)).collect()
}

/// Number of non-search filter fields with a non-empty value. A multiselect
/// with three ticked options counts once.
pub fn active_filters_count(specs: &[FilterSpec], values: &FilterValues) -> usize {
    specs
        .iter()
        .filter(|spec| spec.kind != FilterKind::Search)
        .filter(|spec| values.get(&spec.id).is_some_and(|v| !v.is_empty()))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tickets() -> Vec<Row> {
        vec![
            Row::new()
                .with("id", "T1")
                .with("severity", "High")
                .with("status", "Open")
                .with("title", "Duplicate vendor master record")
                .with("created", "2024-02-01"),
            Row::new()
                .with("id", "T2")
                .with("severity", "High")
                .with("status", "Closed")
                .with("title", "Missing PO approval")
                .with("created", "2024-02-15"),
            Row::new()
                .with("id", "T3")
                .with("severity", "Medium")
                .with("status", "Open")
                .with("title", "Late VENDOR payment")
                .with("created", "2024-03-02"),
        ]
    }

    fn specs() -> Vec<FilterSpec> {
        vec![
            FilterSpec::search("q", &["id", "title"]),
            FilterSpec::new("severity", FilterKind::Select),
            FilterSpec::new("status", FilterKind::MultiSelect),
            FilterSpec::new("created", FilterKind::Date),
        ]
    }

    fn ids(rows: &[&Row]) -> Vec<String> {
        rows.iter().map(|r| r.text("id").unwrap()).collect()
    }

    #[test]
    fn test_select_filters_are_conjunctive() {
        let rows = tickets();
        let mut values = FilterValues::new();
        values.insert("severity".into(), "High".into());
        values.insert("status".into(), vec!["Open"].into());
        let result = filter_rows(&rows, &specs(), &values, "");
        assert_eq!(ids(&result), vec!["T1"]);
    }

    #[test]
    fn test_empty_values_impose_no_constraint() {
        let rows = tickets();
        let mut values = FilterValues::new();
        values.insert("severity".into(), "".into());
        values.insert("status".into(), FilterValue::Many(Vec::new()));
        let predicate = build_predicate(&specs(), &values, "");
        assert!(predicate.is_identity());
        assert_eq!(predicate.apply(&rows), vec![0, 1, 2]);
    }

    #[test]
    fn test_search_is_case_insensitive_over_any_field() {
        let rows = tickets();
        let values = FilterValues::new();
        assert_eq!(ids(&filter_rows(&rows, &specs(), &values, "vendor")), vec!["T1", "T3"]);
        assert_eq!(ids(&filter_rows(&rows, &specs(), &values, "t2")), vec!["T2"]);
        assert!(filter_rows(&rows, &specs(), &values, "nothing").is_empty());
    }

    #[test]
    fn test_search_ignored_without_search_spec() {
        let rows = tickets();
        let specs = vec![FilterSpec::new("severity", FilterKind::Select)];
        let result = filter_rows(&rows, &specs, &FilterValues::new(), "vendor");
        assert_eq!(result.len(), 3);
    }

    #[test]
    fn test_only_first_search_spec_is_honored() {
        let rows = tickets();
        let specs = vec![
            FilterSpec::search("q", &["id"]),
            FilterSpec::search("q2", &["title"]),
        ];
        let result = filter_rows(&rows, &specs, &FilterValues::new(), "vendor");
        assert!(result.is_empty());
    }

    #[test]
    fn test_search_defaults_to_id_field() {
        let rows = tickets();
        let specs = vec![FilterSpec::new("title", FilterKind::Search)];
        let result = filter_rows(&rows, &specs, &FilterValues::new(), "approval");
        assert_eq!(ids(&result), vec!["T2"]);
    }

    #[test]
    fn test_multiselect_membership() {
        let rows = tickets();
        let mut values = FilterValues::new();
        values.insert("status".into(), vec!["Open", "Closed"].into());
        assert_eq!(filter_rows(&rows, &specs(), &values, "").len(), 3);
        values.insert("status".into(), "Closed".into());
        assert_eq!(ids(&filter_rows(&rows, &specs(), &values, "")), vec!["T2"]);
    }

    #[test]
    fn test_date_filter_day_and_range() {
        let rows = tickets();
        let mut values = FilterValues::new();
        values.insert("created".into(), "2024-02-15".into());
        assert_eq!(ids(&filter_rows(&rows, &specs(), &values, "")), vec!["T2"]);

        values.insert("created".into(), "2024-02-10..".into());
        assert_eq!(ids(&filter_rows(&rows, &specs(), &values, "")), vec!["T2", "T3"]);

        values.insert("created".into(), "..2024-02-28".into());
        assert_eq!(ids(&filter_rows(&rows, &specs(), &values, "")), vec!["T1", "T2"]);

        // Unparseable filter value is no constraint
        values.insert("created".into(), "last quarter".into());
        assert_eq!(filter_rows(&rows, &specs(), &values, "").len(), 3);
    }

    #[test]
    fn test_malformed_range_bound_is_no_constraint() {
        let rows = tickets();
        let mut values = FilterValues::new();

        // February has no 30th; the whole range is dropped, not just its end
        values.insert("created".into(), "2024-02-10..2024-02-30".into());
        assert_eq!(filter_rows(&rows, &specs(), &values, "").len(), 3);

        values.insert("created".into(), "someday..2024-02-20".into());
        assert_eq!(filter_rows(&rows, &specs(), &values, "").len(), 3);

        values.insert("created".into(), "..".into());
        assert_eq!(filter_rows(&rows, &specs(), &values, "").len(), 3);

        // Well-formed bounds still narrow
        values.insert("created".into(), "2024-02-10..2024-02-20".into());
        assert_eq!(ids(&filter_rows(&rows, &specs(), &values, "")), vec!["T2"]);
    }

    #[test]
    fn test_unknown_filter_ids_are_ignored() {
        let rows = tickets();
        let mut values = FilterValues::new();
        values.insert("owner".into(), "nobody".into());
        assert_eq!(filter_rows(&rows, &specs(), &values, "").len(), 3);
    }

    #[test]
    fn test_adding_constraint_never_grows_result() {
        let rows = tickets();
        let specs = specs();
        let mut values = FilterValues::new();
        let mut previous = filter_rows(&rows, &specs, &values, "").len();
        for (id, value) in [
            ("status", FilterValue::from(vec!["Open"])),
            ("severity", FilterValue::from("High")),
            ("created", FilterValue::from("2024-03-02")),
        ] {
            values.insert(id.into(), value);
            let current = filter_rows(&rows, &specs, &values, "").len();
            assert!(current <= previous);
            previous = current;
        }
        assert_eq!(previous, 0);
    }

    #[test]
    fn test_active_filters_count_one_per_field() {
        let mut values = FilterValues::new();
        assert_eq!(active_filters_count(&specs(), &values), 0);
        values.insert("q".into(), "vendor".into());
        assert_eq!(active_filters_count(&specs(), &values), 0);
        values.insert("status".into(), vec!["Open", "Closed"].into());
        assert_eq!(active_filters_count(&specs(), &values), 1);
        values.insert("severity".into(), "High".into());
        assert_eq!(active_filters_count(&specs(), &values), 2);
        values.insert("severity".into(), "".into());
        assert_eq!(active_filters_count(&specs(), &values), 1);
    }

    #[test]
    fn test_options_from_rows_first_seen() {
        let options = FilterSpec::options_from_rows(&tickets(), "severity");
        let values: Vec<&str> = options.iter().map(|o| o.value.as_str()).collect();
        assert_eq!(values, vec!["High", "Medium"]);
    }

    #[test]
    fn test_filter_spec_from_toml() {
        let spec: FilterSpec = toml::from_str(
            r#"
            id = "status"
            label = "Status"
            type = "multiselect"
            options = [{ value = "Open", label = "Open" }]
            "#,
        )
        .unwrap();
        assert_eq!(spec.kind, FilterKind::MultiSelect);
        assert_eq!(spec.options.len(), 1);
        assert!(spec.fields.is_empty());
    }
}
