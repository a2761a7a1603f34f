use indexmap::IndexMap;
use tracing::trace;

use crate::{
    parser::ast::{referenced_aliases, ColumnExpr},
    splitter::{owner_of, OwnershipError, TableGrouping},
};

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnPartition {
    /// Columns owned by each group; every group has an entry, possibly empty.
    pub columns: IndexMap<String, Vec<ColumnExpr>>,
    /// Visible names in SELECT order; the key for zipping per-group rows.
    pub aliases: Vec<String>,
}

impl ColumnPartition {
    pub fn group_columns(&self, group: &str) -> &[ColumnExpr] {
        self.columns.get(group).map(Vec::as_slice).unwrap_or_default()
    }
}

pub struct ColumnPartitioner;

impl ColumnPartitioner {
    pub fn partition(columns: &[ColumnExpr], grouping: &TableGrouping) -> Result<ColumnPartition, OwnershipError> {
        let mut partition = ColumnPartition {
            columns: grouping.groups.keys().map(|name| (name.clone(), vec![])).collect(),
            aliases: Vec::with_capacity(columns.len()),
        };

        for column in columns {
            let aliases = referenced_aliases(&column.raw_text);
            let owner = owner_of(&aliases, &column.raw_text, grouping)?
                .unwrap_or_else(|| grouping.primary().to_string());

            trace!(column = %column, group = %owner, "column partitioned");

            partition.aliases.push(column.visible_name());
            partition.columns.entry(owner).or_default().push(column.clone());
        }

        Ok(partition)
    }
}

#[cfg(test)]
mod tests {
    use crate::{parser::ast::Query, splitter::{AliasGroups, ColumnPartitioner, OwnershipError, TableGrouper}};

    #[test]
    pub fn test_partition_columns() {
        let text = "SELECT t1.id, t1.name AS nick, t2.age, NOW() AS ts, COUNT(t2.id) FROM table1 t1 LEFT JOIN table2 t2 ON t1.id = t2.id WHERE 1 = 1";
        let query = Query::try_from(text).expect("Failed to parse query");
        let grouping = TableGrouper::group(&query, &AliasGroups::new().with("t1", "g1").with("t2", "g2"))
            .expect("Failed to group tables");

        let partition = ColumnPartitioner::partition(&query.columns, &grouping).expect("Failed to partition columns");

        let g1: Vec<String> = partition.group_columns("g1").iter().map(|c| c.to_string()).collect();
        let g2: Vec<String> = partition.group_columns("g2").iter().map(|c| c.to_string()).collect();

        assert_eq!(g1, vec!["t1.id", "t1.name AS nick", "NOW() AS ts"]);
        assert_eq!(g2, vec!["t2.age", "COUNT(t2.id)"]);
        assert_eq!(partition.aliases, vec!["id", "nick", "age", "ts", "COUNT(t2.id)"]);
    }

    #[test]
    pub fn test_partition_rejects_cross_group_column() {
        let text = "SELECT CONCAT(t1.name, t2.age) AS info FROM table1 t1 LEFT JOIN table2 t2 ON t1.id = t2.id WHERE 1 = 1";
        let query = Query::try_from(text).expect("Failed to parse query");
        let grouping = TableGrouper::group(&query, &AliasGroups::new().with("t1", "g1").with("t2", "g2"))
            .expect("Failed to group tables");

        let result = ColumnPartitioner::partition(&query.columns, &grouping);

        match result {
            Ok(_) => panic!(),
            Err(OwnershipError::MixedGroups { expression, .. }) => assert_eq!(expression, "CONCAT(t1.name, t2.age)"),
            Err(_) => panic!(),
        }
    }

    #[test]
    pub fn test_partition_same_group_expression() {
        let text = "SELECT CONCAT(t1.name, t3.code) AS info FROM table1 t1 LEFT JOIN table3 t3 ON t1.id = t3.id WHERE 1 = 1";
        let query = Query::try_from(text).expect("Failed to parse query");
        let grouping = TableGrouper::group(&query, &AliasGroups::new().with("t1", "g1"))
            .expect("Failed to group tables");

        let partition = ColumnPartitioner::partition(&query.columns, &grouping).expect("Failed to partition columns");

        assert_eq!(partition.group_columns("g1").len(), 1);
        assert_eq!(partition.aliases, vec!["info"]);
    }
}
