use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::trace;

use crate::splitter::{BindError, BridgingInstruction, GroupQuery, SqlAssembler};

/// Result of splitting one statement.
///
/// `queries` holds the standalone SQL of every group, `bridging` tells how
/// to feed a producer's key values into its consumers, `column_aliases` is
/// the order of the caller's SELECT list used to zip rows back together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitPlan {
    pub queries: IndexMap<String, String>,
    pub groups: IndexMap<String, GroupQuery>,
    pub bridging: Vec<BridgingInstruction>,
    pub column_aliases: Vec<String>,
    /// Groups in an order where every producer runs before its consumers.
    pub execution_order: Vec<String>,
    pub always_true: String,
}

impl SplitPlan {
    pub fn sql(&self, group: &str) -> Option<&str> {
        self.queries.get(group).map(String::as_str)
    }

    pub fn is_split(&self) -> bool {
        self.queries.len() > 1
    }

    /// Instructions whose values `group` has to wait for.
    pub fn consumed_by<'a>(&'a self, group: &'a str) -> impl Iterator<Item = &'a BridgingInstruction> + 'a {
        self.bridging.iter().filter(move |instruction| instruction.consuming_group == group)
    }

    /// Renders the SQL of `group` with one `consumer_field IN (...)` filter
    /// per bridge pair whose producer values are given, keyed by producer alias.
    pub fn bind(&self, group: &str, producer_values: &IndexMap<String, Vec<Value>>) -> Result<String, BindError> {
        let query = self.groups.get(group).ok_or_else(|| BindError::UnknownGroup(group.to_string()))?;

        let mut filters: Vec<String> = vec![];
        for instruction in self.consumed_by(group) {
            for pair in instruction.pairs.iter() {
                let Some(values) = producer_values.get(&pair.producer_alias) else {
                    continue;
                };

                let mut literals: Vec<String> = vec![];
                for value in values {
                    let literal = sql_literal(value).ok_or_else(|| BindError::UnsupportedValue {
                        group: group.to_string(),
                        alias: pair.producer_alias.clone(),
                    })?;
                    if !literals.contains(&literal) {
                        literals.push(literal);
                    }
                }

                let list = match literals.is_empty() {
                    true => "NULL".to_string(),
                    false => literals.join(", "),
                };
                trace!(group = %group, field = %pair.consumer_field, values = literals.len(), "bridge values bound");
                filters.push(format!("{} IN ({})", pair.consumer_field, list));
            }
        }

        if filters.is_empty() {
            return Ok(SqlAssembler::assemble(query, &self.always_true));
        }

        let mut parts: Vec<String> = vec![];
        if let Some(criteria) = query.criteria.as_deref() {
            match query.disjunctive {
                true => parts.push(format!("({})", criteria)),
                false => parts.push(criteria.to_string()),
            }
        }
        parts.extend(filters);

        let criteria = parts.join(" AND ");
        Ok(SqlAssembler::assemble_with(query, Some(&criteria), &self.always_true))
    }
}

fn sql_literal(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some("NULL".to_string()),
        Value::Bool(true) => Some("TRUE".to_string()),
        Value::Bool(false) => Some("FALSE".to_string()),
        Value::Number(number) => Some(number.to_string()),
        Value::String(text) => Some(format!("'{}'", text.replace('\\', "\\\\").replace('\'', "\\'"))),
        Value::Array(_) | Value::Object(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;
    use serde_json::{json, Value};

    use crate::{
        parser::ast::JoinKind,
        splitter::{BindError, BridgePair, BridgingInstruction, GroupQuery, SplitPlan, SqlAssembler},
    };

    fn plan(criteria: Option<&str>, disjunctive: bool) -> SplitPlan {
        let g1 = GroupQuery {
            name: "g1".to_string(),
            columns: vec!["t1.id".to_string()],
            from: "table1 t1".to_string(),
            joins: vec![],
            criteria: None,
            disjunctive: false,
            trailing: None,
        };
        let g2 = GroupQuery {
            name: "g2".to_string(),
            columns: vec!["t2.age".to_string(), "t2.id AS id".to_string()],
            from: "table2 t2".to_string(),
            joins: vec![],
            criteria: criteria.map(str::to_string),
            disjunctive,
            trailing: None,
        };

        let mut groups = IndexMap::new();
        let mut queries = IndexMap::new();
        for group in [g1, g2] {
            queries.insert(group.name.clone(), SqlAssembler::assemble(&group, "1"));
            groups.insert(group.name.clone(), group);
        }

        SplitPlan {
            queries,
            groups,
            bridging: vec![BridgingInstruction {
                producing_group: "g1".to_string(),
                consuming_group: "g2".to_string(),
                carrier_alias: "t2".to_string(),
                join_kind: JoinKind::Left,
                pairs: vec![BridgePair {
                    producer_alias: "id".to_string(),
                    consumer_field: "t2.id".to_string(),
                    consumer_alias: "id".to_string(),
                }],
            }],
            column_aliases: vec!["id".to_string(), "age".to_string()],
            execution_order: vec!["g1".to_string(), "g2".to_string()],
            always_true: "1".to_string(),
        }
    }

    fn values(items: Vec<Value>) -> IndexMap<String, Vec<Value>> {
        let mut map = IndexMap::new();
        map.insert("id".to_string(), items);
        map
    }

    #[test]
    pub fn test_bind_values() {
        let plan = plan(None, false);

        let sql = plan.bind("g2", &values(vec![json!(1), json!(2), json!(1), json!("a'b")])).expect("Failed to bind values");

        assert_eq!(sql, "SELECT t2.age, t2.id AS id FROM table2 t2 WHERE t2.id IN (1, 2, 'a\\'b')");
    }

    #[test]
    pub fn test_bind_keeps_criteria() {
        let plan = plan(Some("t2.age > 3 OR t2.age < 1"), true);

        let sql = plan.bind("g2", &values(vec![json!(7)])).expect("Failed to bind values");

        assert_eq!(sql, "SELECT t2.age, t2.id AS id FROM table2 t2 WHERE (t2.age > 3 OR t2.age < 1) AND t2.id IN (7)");
    }

    #[test]
    pub fn test_bind_empty_values() {
        let plan = plan(Some("t2.age > 3"), false);

        let sql = plan.bind("g2", &values(vec![])).expect("Failed to bind values");

        assert_eq!(sql, "SELECT t2.age, t2.id AS id FROM table2 t2 WHERE t2.age > 3 AND t2.id IN (NULL)");
    }

    #[test]
    pub fn test_bind_without_values() {
        let plan = plan(None, false);

        let sql = plan.bind("g1", &values(vec![json!(1)])).expect("Failed to bind values");

        assert_eq!(sql, plan.sql("g1").unwrap_or_default());
    }

    #[test]
    pub fn test_bind_errors() {
        let plan = plan(None, false);

        match plan.bind("g9", &IndexMap::new()) {
            Ok(_) => panic!(),
            Err(err) => assert_eq!(err, BindError::UnknownGroup("g9".to_string())),
        }

        match plan.bind("g2", &values(vec![json!([1, 2])])) {
            Ok(_) => panic!(),
            Err(err) => assert_eq!(err, BindError::UnsupportedValue { group: "g2".to_string(), alias: "id".to_string() }),
        }
    }
}
