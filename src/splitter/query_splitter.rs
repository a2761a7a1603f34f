use indexmap::IndexMap;
use tracing::debug;

use crate::{
    parser::ast::{render_conditions, ConditionExpr, Connector, Query},
    splitter::{
        BridgePlan, BridgingResolver, ColumnPartition, ColumnPartitioner, ConditionPartitioner, GroupQuery, GroupResolver,
        SplitError, SplitPlan, SqlAssembler, TableGrouper, TableGrouping,
    },
    SplitterConfig,
};

/// Splits one SELECT over tables living on different connections into one
/// statement per connection group.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct QuerySplitter {
    pub config: SplitterConfig,
}

impl QuerySplitter {
    pub fn new(config: SplitterConfig) -> Self {
        Self { config }
    }

    pub fn split(&self, sql: &str, resolver: &dyn GroupResolver) -> Result<SplitPlan, SplitError> {
        let query = Query::try_from(sql)?;
        debug!(tables = query.joins.len() + 1, columns = query.columns.len(), "statement parsed");

        let grouping = TableGrouper::group(&query, resolver)?;
        let mut columns = ColumnPartitioner::partition(&query.columns, &grouping)?;
        let conditions = ConditionPartitioner::partition(&query.conditions, &grouping)?;
        let bridges = BridgingResolver::resolve(&grouping, &mut columns, &self.config)?;

        let groups = self.group_queries(&query, &grouping, &columns, &conditions, &bridges);
        let queries: IndexMap<String, String> = groups.iter()
            .map(|(name, group)| (name.clone(), SqlAssembler::assemble(group, &self.config.always_true)))
            .collect();

        debug!(groups = queries.len(), bridges = bridges.instructions.len(), "statement split");

        Ok(SplitPlan {
            queries,
            groups,
            bridging: bridges.instructions,
            column_aliases: columns.aliases,
            execution_order: bridges.execution_order,
            always_true: self.config.always_true.clone(),
        })
    }

    fn group_queries(
        &self,
        query: &Query,
        grouping: &TableGrouping,
        columns: &ColumnPartition,
        conditions: &IndexMap<String, Vec<ConditionExpr>>,
        bridges: &BridgePlan,
    ) -> IndexMap<String, GroupQuery> {
        let mut groups: IndexMap<String, GroupQuery> = IndexMap::new();

        for (index, (name, group)) in grouping.groups.iter().enumerate() {
            let owned = conditions.get(name).map(Vec::as_slice).unwrap_or_default();
            let relocated = bridges.relocated.get(name).map(Vec::as_slice).unwrap_or_default();
            let (criteria, disjunctive) = Self::criteria(owned, relocated);

            groups.insert(name.clone(), GroupQuery {
                name: name.clone(),
                columns: columns.group_columns(name).iter().map(|column| column.to_string()).collect(),
                from: group.head().to_string(),
                joins: bridges.joins.get(name).cloned().unwrap_or_default(),
                criteria,
                disjunctive,
                trailing: match index {
                    0 => query.trailing.clone(),
                    _ => None,
                },
            });
        }

        groups
    }

    /// WHERE body of a group: its own conditions, then the ON predicates
    /// moved in from a dropped join. An OR chain is parenthesized before
    /// anything is AND-ed to it.
    fn criteria(owned: &[ConditionExpr], relocated: &[ConditionExpr]) -> (Option<String>, bool) {
        let disjunctive = owned.iter().any(|condition| condition.connector == Connector::Or);
        let own = render_conditions(owned);
        let moved = render_conditions(relocated);

        match (own, moved) {
            (Some(own), Some(moved)) if disjunctive => (Some(format!("({}) AND {}", own, moved)), false),
            (Some(own), Some(moved)) => (Some(format!("{} AND {}", own, moved)), false),
            (Some(own), None) => (Some(own), disjunctive),
            (None, moved) => (moved, false),
        }
    }
}

/// Splits `sql` with the default configuration.
pub fn split(sql: &str, resolver: &dyn GroupResolver) -> Result<SplitPlan, SplitError> {
    QuerySplitter::default().split(sql, resolver)
}
