//! Typed row-select queries for the Supabase PostgREST API.
//!
//! A [`SelectQuery`] is a plain value: table, projection, conjunctive
//! predicates, an order chain, and an optional row window. It is rendered to
//! PostgREST query parameters only at the transport edge, so the composer and
//! its tests never deal with URL syntax.

use serde::Serialize;

/// A single predicate. Top-level predicates are ANDed together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Filter {
    /// `column = value`
    Eq { column: String, value: String },
    /// Case-insensitive substring match: `column ILIKE '%needle%'`.
    ILike { column: String, needle: String },
    /// Any of the inner predicates.
    Or { filters: Vec<Filter> },
}

impl Filter {
    pub fn eq(column: impl Into<String>, value: impl ToString) -> Self {
        Filter::Eq {
            column: column.into(),
            value: value.to_string(),
        }
    }

    pub fn ilike(column: impl Into<String>, needle: impl Into<String>) -> Self {
        Filter::ILike {
            column: column.into(),
            needle: needle.into(),
        }
    }

    /// `column.op.value` form used inside `or=(...)` lists.
    fn render_nested(&self) -> String {
        match self {
            Filter::Eq { column, value } => format!("{}.eq.{}", column, quote_value(value)),
            Filter::ILike { column, needle } => {
                format!("{}.ilike.{}", column, quote_value(&format!("*{}*", needle)))
            }
            Filter::Or { filters } => format!("or({})", render_list(filters)),
        }
    }

    /// `(key, value)` query parameter for a top-level predicate.
    fn render_param(&self) -> (String, String) {
        match self {
            Filter::Eq { column, value } => (column.clone(), format!("eq.{}", value)),
            Filter::ILike { column, needle } => (column.clone(), format!("ilike.*{}*", needle)),
            Filter::Or { filters } => ("or".to_string(), format!("({})", render_list(filters))),
        }
    }
}

fn render_list(filters: &[Filter]) -> String {
    filters
        .iter()
        .map(Filter::render_nested)
        .collect::<Vec<_>>()
        .join(",")
}

/// Values inside logical lists must be double-quoted when they contain
/// PostgREST reserved characters.
fn quote_value(value: &str) -> String {
    let reserved = value
        .chars()
        .any(|c| matches!(c, ',' | '.' | ':' | '(' | ')' | '"' | '\\') || c.is_whitespace());
    if !reserved {
        return value.to_string();
    }
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{}\"", escaped)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

/// Zero-based inclusive row window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RowRange {
    pub from: u64,
    pub to: u64,
}

impl RowRange {
    /// Window for a 1-based page. Page 0 is treated as page 1.
    pub fn for_page(page: u32, page_size: u32) -> Self {
        let page = u64::from(page.max(1));
        let size = u64::from(page_size.max(1));
        let from = (page - 1) * size;
        Self {
            from,
            to: from + size - 1,
        }
    }

    pub fn row_count(&self) -> u64 {
        self.to.saturating_sub(self.from) + 1
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectQuery {
    pub table: String,
    pub columns: String,
    pub filters: Vec<Filter>,
    pub order: Vec<Order>,
    pub range: Option<RowRange>,
    /// Ask the backend for the exact number of matching rows.
    pub count_exact: bool,
}

impl SelectQuery {
    pub fn table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: "*".to_string(),
            filters: Vec::new(),
            order: Vec::new(),
            range: None,
            count_exact: false,
        }
    }

    pub fn select(mut self, columns: impl Into<String>) -> Self {
        self.columns = columns.into();
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn eq(self, column: &str, value: impl ToString) -> Self {
        self.filter(Filter::eq(column, value))
    }

    pub fn ilike(self, column: &str, needle: impl Into<String>) -> Self {
        self.filter(Filter::ilike(column, needle))
    }

    pub fn or(self, filters: Vec<Filter>) -> Self {
        self.filter(Filter::Or { filters })
    }

    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        self.order.push(Order {
            column: column.to_string(),
            ascending,
        });
        self
    }

    pub fn range(mut self, range: RowRange) -> Self {
        self.range = Some(range);
        self
    }

    /// First `n` rows.
    pub fn limit(self, n: u64) -> Self {
        self.range(RowRange {
            from: 0,
            to: n.max(1) - 1,
        })
    }

    pub fn count_exact(mut self) -> Self {
        self.count_exact = true;
        self
    }

    /// Render as PostgREST query parameters.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![("select".to_string(), self.columns.clone())];
        params.extend(self.filters.iter().map(Filter::render_param));

        if !self.order.is_empty() {
            let order = self
                .order
                .iter()
                .map(|o| format!("{}.{}", o.column, if o.ascending { "asc" } else { "desc" }))
                .collect::<Vec<_>>()
                .join(",");
            params.push(("order".to_string(), order));
        }

        if let Some(range) = self.range {
            params.push(("offset".to_string(), range.from.to_string()));
            params.push(("limit".to_string(), range.row_count().to_string()));
        }

        params
    }
}

/// Parse the total from a `Content-Range` header such as `0-11/25` or `*/0`.
pub fn parse_content_range_total(header: &str) -> Option<u64> {
    let (_, total) = header.rsplit_once('/')?;
    total.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn param<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_row_range_for_page() {
        assert_eq!(RowRange::for_page(1, 12), RowRange { from: 0, to: 11 });
        assert_eq!(RowRange::for_page(3, 12), RowRange { from: 24, to: 35 });
        assert_eq!(RowRange::for_page(0, 12), RowRange { from: 0, to: 11 });
        assert_eq!(RowRange::for_page(2, 12).row_count(), 12);
    }

    #[test]
    fn test_render_eq_ilike_order_range() {
        let query = SelectQuery::table("jobs")
            .eq("status", "active")
            .ilike("location", "berlin")
            .order("featured", false)
            .order("created_at", false)
            .range(RowRange::for_page(2, 12))
            .count_exact();
        let params = query.to_params();

        assert_eq!(param(&params, "select"), Some("*"));
        assert_eq!(param(&params, "status"), Some("eq.active"));
        assert_eq!(param(&params, "location"), Some("ilike.*berlin*"));
        assert_eq!(param(&params, "order"), Some("featured.desc,created_at.desc"));
        assert_eq!(param(&params, "offset"), Some("12"));
        assert_eq!(param(&params, "limit"), Some("12"));
    }

    #[test]
    fn test_render_or_list_quotes_reserved_values() {
        let query = SelectQuery::table("jobs").or(vec![
            Filter::ilike("title", "engineer"),
            Filter::ilike("company", "a, b"),
        ]);
        let params = query.to_params();
        assert_eq!(
            param(&params, "or"),
            Some("(title.ilike.*engineer*,company.ilike.\"*a, b*\")")
        );
    }

    #[test]
    fn test_quote_value_escapes() {
        assert_eq!(quote_value("plain"), "plain");
        assert_eq!(quote_value("say \"hi\""), "\"say \\\"hi\\\"\"");
        assert_eq!(quote_value("node.js"), "\"node.js\"");
    }

    #[test]
    fn test_limit_without_count() {
        let params = SelectQuery::table("jobs").limit(3).to_params();
        assert_eq!(param(&params, "offset"), Some("0"));
        assert_eq!(param(&params, "limit"), Some("3"));
    }

    #[test]
    fn test_parse_content_range_total() {
        assert_eq!(parse_content_range_total("0-11/25"), Some(25));
        assert_eq!(parse_content_range_total("*/0"), Some(0));
        assert_eq!(parse_content_range_total("0-11/*"), None);
        assert_eq!(parse_content_range_total("garbage"), None);
    }
}
