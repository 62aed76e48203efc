//! Composable query predicates.
//!
//! A [`Filter`] renders to exactly one SQL boolean fragment plus zero or
//! one named parameter. Filters are stateless builders: they never execute
//! SQL, and every rendered parameter carries a name that is unique per
//! filter instance, so several filters on the same column can share one
//! statement without colliding.
//!
//! Null handling is a documented policy, not an error path:
//! - an exact match on a null value renders `<col> is [not] null`;
//! - an empty membership list degrades to the same null check ("no value",
//!   not "match no rows");
//! - a null substring value degrades to the null check as well.

use uuid::Uuid;

use super::value::SqlValue;

/// A named parameter produced by one rendered filter.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlParam {
    /// Placeholder name without the leading `:`.
    pub name: String,
    pub value: SqlValue,
}

/// Result of rendering one filter: a boolean fragment and its parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedFilter {
    pub fragment: String,
    pub param: Option<SqlParam>,
}

#[derive(Debug, Clone, PartialEq)]
enum Match {
    /// Equality on a single value; null degrades to a null check.
    Exact(SqlValue),
    /// Membership in a list; empty degrades to a null check.
    AnyOf(Vec<SqlValue>),
    /// Substring (`like '%v%'`) or exact string match; null degrades to a
    /// null check.
    Text { value: Option<String>, exact: bool },
}

/// One composable predicate targeting a single column.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    column: String,
    alias: Option<String>,
    exclude: bool,
    mode: Match,
}

impl Filter {
    /// `<col> = value`, or `<col> is null` when the value is null.
    pub fn equals(column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        Self {
            column: column.into(),
            alias: None,
            exclude: false,
            mode: Match::Exact(value.into()),
        }
    }

    /// `<col> is null`.
    pub fn is_null(column: impl Into<String>) -> Self {
        Self::equals(column, SqlValue::Null)
    }

    /// `<col> in (values...)`; an empty list degrades to `<col> is null`.
    pub fn any_of(column: impl Into<String>, values: Vec<SqlValue>) -> Self {
        Self {
            column: column.into(),
            alias: None,
            exclude: false,
            mode: Match::AnyOf(values),
        }
    }

    /// Case-insensitive substring match: `<col> like '%value%'`.
    pub fn contains(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            alias: None,
            exclude: false,
            mode: Match::Text {
                value: Some(value.into()),
                exact: false,
            },
        }
    }

    /// Exact string match rendered through the text mode (`<col> = value`).
    pub fn text_exact(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            alias: None,
            exclude: false,
            mode: Match::Text {
                value: Some(value.into()),
                exact: true,
            },
        }
    }

    /// Negate the comparison: `<>`, `not in`, or `is not null`.
    pub fn excluded(mut self) -> Self {
        self.exclude = true;
        self
    }

    /// Qualify the column with a source alias (`a.name`).
    pub fn aliased(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// The unqualified target column name.
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Render the fragment and its parameter.
    ///
    /// Each call mints a fresh unique parameter name, so a filter can be
    /// reused across statements without collisions.
    pub fn render(&self) -> RenderedFilter {
        let target = match &self.alias {
            Some(alias) => format!("{alias}.{}", self.column),
            None => self.column.clone(),
        };

        match &self.mode {
            Match::Exact(value) if value.is_null() => self.null_check(&target),
            Match::Exact(value) => {
                let name = self.param_name();
                let op = if self.exclude { "<>" } else { "=" };
                RenderedFilter {
                    fragment: format!("{target} {op} :{name}"),
                    param: Some(SqlParam {
                        name,
                        value: value.clone(),
                    }),
                }
            }
            Match::AnyOf(values) if values.is_empty() => self.null_check(&target),
            Match::AnyOf(values) => {
                let name = self.param_name();
                let op = if self.exclude { "not in" } else { "in" };
                RenderedFilter {
                    fragment: format!("{target} {op} (:{name})"),
                    param: Some(SqlParam {
                        name,
                        value: SqlValue::Array(values.clone()),
                    }),
                }
            }
            Match::Text { value: None, .. } => self.null_check(&target),
            Match::Text {
                value: Some(text),
                exact,
            } => {
                let name = self.param_name();
                let (op, bound) = if *exact {
                    let op = if self.exclude { "<>" } else { "=" };
                    (op, text.clone())
                } else {
                    let op = if self.exclude { "not like" } else { "like" };
                    (op, format!("%{text}%"))
                };
                RenderedFilter {
                    fragment: format!("{target} {op} :{name}"),
                    param: Some(SqlParam {
                        name,
                        value: SqlValue::Text(bound),
                    }),
                }
            }
        }
    }

    fn null_check(&self, target: &str) -> RenderedFilter {
        let fragment = if self.exclude {
            format!("{target} is not null")
        } else {
            format!("{target} is null")
        };
        RenderedFilter {
            fragment,
            param: None,
        }
    }

    /// Column name plus a random hex suffix keeps names unique across
    /// instances and across repeated renders of one instance.
    fn param_name(&self) -> String {
        let suffix = Uuid::new_v4().simple().to_string();
        format!("{}_{}", self.column, &suffix[..8])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_equality_renders_is_null_without_param() {
        let rendered = Filter::is_null("completed_at").render();
        assert_eq!(rendered.fragment, "completed_at is null");
        assert!(rendered.param.is_none());
    }

    #[test]
    fn test_excluded_null_renders_is_not_null() {
        let rendered = Filter::is_null("completed_at").excluded().render();
        assert_eq!(rendered.fragment, "completed_at is not null");
        assert!(rendered.param.is_none());
    }

    #[test]
    fn test_equality_binds_one_named_param() {
        let rendered = Filter::equals("status", "todo").render();
        let param = rendered.param.unwrap();
        assert_eq!(rendered.fragment, format!("status = :{}", param.name));
        assert_eq!(param.value, SqlValue::Text("todo".to_string()));
    }

    #[test]
    fn test_excluded_equality_uses_not_equals() {
        let rendered = Filter::equals("position", 3i64).excluded().render();
        assert!(rendered.fragment.contains("<>"));
    }

    #[test]
    fn test_membership_binds_whole_array_as_one_param() {
        let values = vec![SqlValue::Integer(1), SqlValue::Integer(2)];
        let rendered = Filter::any_of("position", values.clone()).render();
        assert!(rendered.fragment.contains(" in ("));
        let param = rendered.param.unwrap();
        assert_eq!(param.value, SqlValue::Array(values));
    }

    #[test]
    fn test_excluded_membership_uses_not_in() {
        let rendered =
            Filter::any_of("position", vec![SqlValue::Integer(1)]).excluded().render();
        assert!(rendered.fragment.contains("not in"));
    }

    #[test]
    fn test_empty_membership_degrades_to_null_check() {
        // Documented policy: an empty list means "no value", not "no rows
        // match". Pinned here on purpose.
        let rendered = Filter::any_of("area_id", Vec::new()).render();
        assert_eq!(rendered.fragment, "area_id is null");
        assert!(rendered.param.is_none());
    }

    #[test]
    fn test_contains_wraps_value_in_wildcards() {
        let rendered = Filter::contains("title", "report").render();
        assert!(rendered.fragment.contains("like"));
        let param = rendered.param.unwrap();
        assert_eq!(param.value, SqlValue::Text("%report%".to_string()));
    }

    #[test]
    fn test_text_exact_uses_equality() {
        let rendered = Filter::text_exact("title", "report").render();
        assert!(rendered.fragment.contains("="));
        assert_eq!(
            rendered.param.unwrap().value,
            SqlValue::Text("report".to_string())
        );
    }

    #[test]
    fn test_null_text_degrades_to_null_check() {
        let filter = Filter {
            column: "notes".to_string(),
            alias: None,
            exclude: false,
            mode: Match::Text {
                value: None,
                exact: false,
            },
        };
        let rendered = filter.render();
        assert_eq!(rendered.fragment, "notes is null");
        assert!(rendered.param.is_none());
    }

    #[test]
    fn test_two_filters_on_same_column_get_distinct_names() {
        let a = Filter::equals("status", "todo").render();
        let b = Filter::equals("status", "done").render();
        assert_ne!(a.param.unwrap().name, b.param.unwrap().name);
    }

    #[test]
    fn test_alias_qualifies_target() {
        let rendered = Filter::is_null("name").aliased("a").render();
        assert_eq!(rendered.fragment, "a.name is null");
    }
}
