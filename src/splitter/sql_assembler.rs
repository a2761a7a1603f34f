use serde::{Deserialize, Serialize};

/// Everything needed to render one group's standalone SELECT.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupQuery {
    pub name: String,
    /// Rendered SELECT items, owned columns first, carriers after them.
    pub columns: Vec<String>,
    /// FROM table, link prefix stripped.
    pub from: String,
    pub joins: Vec<String>,
    /// WHERE body; `None` renders the always-true predicate.
    pub criteria: Option<String>,
    /// True when `criteria` contains an OR connector.
    pub disjunctive: bool,
    pub trailing: Option<String>,
}

pub struct SqlAssembler;

impl SqlAssembler {
    pub fn assemble(query: &GroupQuery, always_true: &str) -> String {
        Self::assemble_with(query, query.criteria.as_deref(), always_true)
    }

    /// Renders `query` with `criteria` in place of its own WHERE body.
    pub fn assemble_with(query: &GroupQuery, criteria: Option<&str>, always_true: &str) -> String {
        let columns = match query.columns.is_empty() {
            true => always_true.to_string(),
            false => query.columns.join(", "),
        };

        let mut sql = format!("SELECT {} FROM {}", columns, query.from);
        for join in query.joins.iter() {
            sql.push(' ');
            sql.push_str(join);
        }

        sql.push_str(" WHERE ");
        sql.push_str(criteria.filter(|text| !text.is_empty()).unwrap_or(always_true));

        if let Some(trailing) = query.trailing.as_deref().filter(|text| !text.is_empty()) {
            sql.push(' ');
            sql.push_str(trailing);
        }

        sql
    }
}
