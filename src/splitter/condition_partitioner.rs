use indexmap::IndexMap;
use tracing::trace;

use crate::{
    parser::ast::{referenced_aliases, render_conditions, ConditionExpr, Connector},
    splitter::{owner_of, OwnershipError, TableGrouping},
};

pub struct ConditionPartitioner;

impl ConditionPartitioner {
    /// Assigns every WHERE condition to the group owning its fields. A
    /// condition that touches no table goes to the primary group.
    pub fn partition(conditions: &[ConditionExpr], grouping: &TableGrouping) -> Result<IndexMap<String, Vec<ConditionExpr>>, OwnershipError> {
        let mut partition: IndexMap<String, Vec<ConditionExpr>> =
            grouping.groups.keys().map(|name| (name.clone(), vec![])).collect();
        let mut touched: Vec<String> = vec![];

        for condition in conditions {
            let expression = condition.to_string();

            let mut aliases = condition.field.referenced_aliases();
            for alias in referenced_aliases(&condition.value_text) {
                if !aliases.contains(&alias) {
                    aliases.push(alias);
                }
            }

            let owner = owner_of(&aliases, &expression, grouping)?
                .unwrap_or_else(|| grouping.primary().to_string());
            trace!(condition = %expression, group = %owner, "condition partitioned");

            if !touched.contains(&owner) {
                touched.push(owner.clone());
            }
            partition.entry(owner).or_default().push(condition.clone());
        }

        let disjunctive = conditions.iter().any(|condition| condition.connector == Connector::Or);
        if disjunctive && touched.len() > 1 {
            return Err(OwnershipError::MixedConnectors {
                expression: render_conditions(conditions).unwrap_or_default(),
                groups: touched,
            });
        }

        Ok(partition)
    }
}

#[cfg(test)]
mod tests {
    use crate::{parser::ast::{Connector, Query}, splitter::{AliasGroups, ConditionPartitioner, OwnershipError, TableGrouper, TableGrouping}};

    fn grouping(query: &Query) -> TableGrouping {
        TableGrouper::group(query, &AliasGroups::new().with("t1", "g1").with("t2", "g2")).expect("Failed to group tables")
    }

    #[test]
    pub fn test_partition_conditions() {
        let text = r#"SELECT t1.id FROM table1 t1 LEFT JOIN table2 t2 ON t1.id = t2.id
            WHERE t1.id > 2 AND t2.name LIKE 't1.x%' AND NOW() > '2020-01-01' AND t2.age IN (1, 2)"#;
        let query = Query::try_from(text).expect("Failed to parse query");

        let partition = ConditionPartitioner::partition(&query.conditions, &grouping(&query))
            .expect("Failed to partition conditions");

        let g1: Vec<String> = partition["g1"].iter().map(|c| c.to_string()).collect();
        let g2: Vec<String> = partition["g2"].iter().map(|c| c.to_string()).collect();

        assert_eq!(g1, vec!["t1.id > 2", "NOW() > '2020-01-01'"]);
        assert_eq!(g2, vec!["t2.name LIKE 't1.x%'", "t2.age IN (1, 2)"]);
    }

    #[test]
    pub fn test_partition_or_within_group() {
        let text = "SELECT t1.id FROM table1 t1 LEFT JOIN table2 t2 ON t1.id = t2.id WHERE t2.age > 3 OR t2.age < 1";
        let query = Query::try_from(text).expect("Failed to parse query");

        let partition = ConditionPartitioner::partition(&query.conditions, &grouping(&query))
            .expect("Failed to partition conditions");

        assert!(partition["g1"].is_empty());
        assert_eq!(partition["g2"].len(), 2);
        assert_eq!(partition["g2"][1].connector, Connector::Or);
    }

    #[test]
    pub fn test_partition_or_across_groups() {
        let text = "SELECT t1.id FROM table1 t1 LEFT JOIN table2 t2 ON t1.id = t2.id WHERE t1.id > 3 OR t2.age < 1";
        let query = Query::try_from(text).expect("Failed to parse query");

        let result = ConditionPartitioner::partition(&query.conditions, &grouping(&query));

        match result {
            Ok(_) => panic!(),
            Err(OwnershipError::MixedConnectors { expression, groups }) => {
                assert_eq!(expression, "t1.id > 3 OR t2.age < 1");
                assert_eq!(groups, vec!["g1".to_string(), "g2".to_string()]);
            },
            Err(_) => panic!(),
        }
    }

    #[test]
    pub fn test_partition_cross_group_condition() {
        let text = "SELECT t1.id FROM table1 t1 LEFT JOIN table2 t2 ON t1.id = t2.id WHERE t1.age > t2.age";
        let query = Query::try_from(text).expect("Failed to parse query");

        let result = ConditionPartitioner::partition(&query.conditions, &grouping(&query));

        match result {
            Ok(_) => panic!(),
            Err(err) => assert!(matches!(err, OwnershipError::MixedGroups { .. })),
        }
    }
}
