use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::{parser::ast::{JoinClause, Query, TableRef}, splitter::{GroupResolver, OwnershipError}};

/// Tables that are fetched together by one statement on one connection.
#[derive(Debug, Clone, PartialEq)]
pub struct TableGroup {
    pub name: String,
    /// First entry is the group's FROM table.
    pub tables: Vec<TableRef>,
    /// Join clauses whose table belongs to this group, in statement order.
    pub joins: Vec<JoinClause>,
}

impl TableGroup {
    pub fn head(&self) -> &TableRef {
        &self.tables[0]
    }

    pub fn is_head(&self, alias: &str) -> bool {
        self.head().alias == alias
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableGrouping {
    /// Groups in first-seen order.
    pub groups: IndexMap<String, TableGroup>,
    /// Every table alias of the statement and the group it landed in.
    pub alias_groups: IndexMap<String, String>,
    /// Aliases of joined tables in statement order.
    pub join_order: Vec<String>,
}

impl TableGrouping {
    pub fn group_of_alias(&self, alias: &str) -> Option<&str> {
        self.alias_groups.get(alias).map(String::as_str)
    }

    /// Group of the statement's FROM table.
    pub fn primary(&self) -> &str {
        self.groups.keys().next().map(String::as_str).unwrap_or_default()
    }

    pub fn group_names(&self) -> Vec<String> {
        self.groups.keys().cloned().collect()
    }

    pub fn join_for(&self, alias: &str) -> Option<(&TableGroup, &JoinClause)> {
        let group = self.groups.get(self.group_of_alias(alias)?)?;
        let join = group.joins.iter().find(|join| join.table.alias == alias)?;
        Some((group, join))
    }
}

pub struct TableGrouper;

impl TableGrouper {
    pub fn group(query: &Query, resolver: &dyn GroupResolver) -> Result<TableGrouping, OwnershipError> {
        let mut groups: IndexMap<String, TableGroup> = IndexMap::new();
        let mut alias_groups: IndexMap<String, String> = IndexMap::new();
        let mut join_order: Vec<String> = vec![];

        let base = &query.table;
        let base_group = resolver.group_of(base).unwrap_or_else(|| base.alias.clone());
        trace!(alias = %base.alias, group = %base_group, "base table grouped");

        alias_groups.insert(base.alias.clone(), base_group.clone());
        groups.insert(base_group.clone(), TableGroup {
            name: base_group.clone(),
            tables: vec![base.clone()],
            joins: vec![],
        });

        let mut previous = base_group;
        for join in query.joins.iter() {
            let alias = &join.table.alias;
            if alias_groups.contains_key(alias) {
                return Err(OwnershipError::DuplicateAlias(alias.clone()));
            }

            let name = resolver.group_of(&join.table).unwrap_or_else(|| previous.clone());
            trace!(alias = %alias, group = %name, "joined table grouped");

            let group = groups.entry(name.clone()).or_insert_with(|| TableGroup {
                name: name.clone(),
                tables: vec![],
                joins: vec![],
            });
            group.tables.push(join.table.clone());
            group.joins.push(join.clone());

            alias_groups.insert(alias.clone(), name.clone());
            join_order.push(alias.clone());
            previous = name;
        }

        debug!(groups = ?groups.keys().collect::<Vec<_>>(), "tables grouped");

        Ok(TableGrouping { groups, alias_groups, join_order })
    }
}
