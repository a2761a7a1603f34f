use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::{
    parser::ast::{ColumnExpr, ConditionExpr, EqualityPredicate, JoinKind, QualifiedField},
    splitter::{groups_of, BridgeResolutionError, ColumnPartition, SplitError, TableGrouping},
    SplitterConfig,
};

/// One join key moved from the producer's rows into the consumer's filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgePair {
    /// Name the key comes back under in the producer's rows.
    pub producer_alias: String,
    /// Consumer side expression filtered with `IN (...)`.
    pub consumer_field: String,
    /// Name the same key comes back under in the consumer's rows.
    pub consumer_alias: String,
}

/// "Filter `consuming_group` with the values `producing_group` returned."
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgingInstruction {
    pub producing_group: String,
    pub consuming_group: String,
    /// Consumer table alias the first pair was declared on.
    pub carrier_alias: String,
    pub join_kind: JoinKind,
    pub pairs: Vec<BridgePair>,
}

impl BridgingInstruction {
    fn push_pair(&mut self, pair: BridgePair) {
        if !self.pairs.contains(&pair) {
            self.pairs.push(pair);
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BridgePlan {
    pub instructions: Vec<BridgingInstruction>,
    /// Rendered JOIN clauses that stay inside each group.
    pub joins: IndexMap<String, Vec<String>>,
    /// ON predicates that moved into the WHERE clause of their group.
    pub relocated: IndexMap<String, Vec<ConditionExpr>>,
    pub execution_order: Vec<String>,
}

pub struct BridgingResolver<'a> {
    grouping: &'a TableGrouping,
    config: &'a SplitterConfig,
    instructions: Vec<BridgingInstruction>,
    joins: IndexMap<String, Vec<String>>,
    relocated: IndexMap<String, Vec<ConditionExpr>>,
}

impl<'a> BridgingResolver<'a> {
    pub fn resolve(grouping: &TableGrouping, columns: &mut ColumnPartition, config: &SplitterConfig) -> Result<BridgePlan, SplitError> {
        let mut resolver = BridgingResolver {
            grouping,
            config,
            instructions: vec![],
            joins: grouping.groups.keys().map(|name| (name.clone(), vec![])).collect(),
            relocated: grouping.groups.keys().map(|name| (name.clone(), vec![])).collect(),
        };

        for alias in grouping.join_order.iter() {
            resolver.resolve_join(alias, columns)?;
        }

        let execution_order = resolver.execution_order()?;
        debug!(instructions = resolver.instructions.len(), order = ?execution_order, "bridging resolved");

        Ok(BridgePlan {
            instructions: resolver.instructions,
            joins: resolver.joins,
            relocated: resolver.relocated,
            execution_order,
        })
    }

    fn resolve_join(&mut self, alias: &str, columns: &mut ColumnPartition) -> Result<(), SplitError> {
        let grouping = self.grouping;
        let Some((group, clause)) = grouping.join_for(alias) else {
            return Ok(());
        };

        let mut kept: Vec<EqualityPredicate> = vec![];
        for predicate in clause.on_predicates.iter() {
            let expression = predicate.to_string();
            let left_groups = groups_of(&predicate.left_field.referenced_aliases(), &expression, grouping)?;
            let right_groups = groups_of(&predicate.right_field.referenced_aliases(), &expression, grouping)?;

            let mut involved = left_groups.clone();
            for name in right_groups.iter() {
                if !involved.contains(name) {
                    involved.push(name.clone());
                }
            }

            if involved.len() < 2 {
                let owner = involved.pop().unwrap_or_else(|| group.name.clone());
                if owner == group.name && !group.is_head(alias) {
                    kept.push(predicate.clone());
                    continue;
                }

                let mut aliases = predicate.left_field.referenced_aliases();
                for name in predicate.right_field.referenced_aliases() {
                    if !aliases.contains(&name) {
                        aliases.push(name);
                    }
                }

                if !clause.moves_to_where(&aliases) {
                    return Err(BridgeResolutionError::PreservedSideFilter {
                        group: owner,
                        joined_group: group.name.clone(),
                        predicate: expression,
                    }.into());
                }

                trace!(predicate = %expression, group = %owner, "join predicate relocated to WHERE");
                let condition = ConditionExpr::new(
                    predicate.left_field.clone(),
                    &predicate.operator,
                    &predicate.right_field.to_string(),
                );
                self.relocated.entry(owner).or_default().push(condition);
                continue;
            }

            if !predicate.is_equality() {
                return Err(BridgeResolutionError::NonEquality {
                    producing_group: involved[0].clone(),
                    consuming_group: involved[1].clone(),
                    predicate: expression,
                }.into());
            }

            if left_groups.len() != 1 || !predicate.left_field.is_qualified() {
                return Err(BridgeResolutionError::NonScalarCarrier {
                    producing_group: involved[0].clone(),
                    consuming_group: involved[1].clone(),
                    expression: predicate.left_field.to_string(),
                }.into());
            }

            if right_groups.len() != 1 {
                return Err(BridgeResolutionError::NonScalarCarrier {
                    producing_group: left_groups[0].clone(),
                    consuming_group: involved[1].clone(),
                    expression: predicate.right_field.to_string(),
                }.into());
            }

            self.bridge(predicate, &left_groups[0], &right_groups[0], clause.join_kind, columns);
        }

        if group.is_head(alias) {
            trace!(alias = %alias, group = %group.name, "join clause became FROM table");
            return Ok(());
        }

        if clause.join_kind == JoinKind::Outer {
            return Err(BridgeResolutionError::FusedFullJoin {
                group: group.name.clone(),
                table: clause.table.to_string(),
            }.into());
        }

        let rendered = clause.render(&kept, &self.config.always_true);
        self.joins.entry(group.name.clone()).or_default().push(rendered);

        Ok(())
    }

    fn bridge(&mut self, predicate: &EqualityPredicate, producer: &str, consumer: &str, join_kind: JoinKind, columns: &mut ColumnPartition) {
        let producer_field = &predicate.left_field;
        let consumer_field = &predicate.right_field;

        let producer_alias = self.producer_column(producer, producer_field, columns);
        let consumer_alias = self.consumer_column(consumer, consumer_field, &producer_alias, columns);

        trace!(producer = %producer, consumer = %consumer, key = %producer_alias, "bridge added");

        let pair = BridgePair {
            producer_alias,
            consumer_field: consumer_field.to_string(),
            consumer_alias,
        };

        let existing = self.instructions.iter_mut()
            .find(|instruction| instruction.producing_group == producer && instruction.consuming_group == consumer);

        match existing {
            Some(instruction) => instruction.push_pair(pair),
            None => {
                let carrier_alias = consumer_field.referenced_aliases().into_iter().next()
                    .unwrap_or_else(|| consumer.to_string());
                self.instructions.push(BridgingInstruction {
                    producing_group: producer.to_string(),
                    consuming_group: consumer.to_string(),
                    carrier_alias,
                    join_kind,
                    pairs: vec![pair],
                });
            },
        }
    }

    /// Makes sure the producer selects `field` and returns the name it comes back under.
    fn producer_column(&self, producer: &str, field: &QualifiedField, columns: &mut ColumnPartition) -> String {
        let raw = field.to_string();
        let owned = columns.columns.entry(producer.to_string()).or_default();

        if let Some(column) = owned.iter().find(|column| column.raw_text == raw) {
            return column.visible_name();
        }

        let alias = self.config.carrier_alias(field.alias.as_deref().unwrap_or(producer), &field.name);
        owned.push(ColumnExpr::carrier(&raw, &alias));
        alias
    }

    /// Adds `field AS producer_alias` to the consumer unless that name is
    /// already taken by another expression.
    fn consumer_column(&self, consumer: &str, field: &QualifiedField, producer_alias: &str, columns: &mut ColumnPartition) -> String {
        let raw = field.to_string();
        let owned = columns.columns.entry(consumer.to_string()).or_default();

        let taken = owned.iter().find(|column| column.visible_name() == producer_alias);
        let alias = match taken {
            None => producer_alias.to_string(),
            Some(column) if column.raw_text == raw => return producer_alias.to_string(),
            Some(_) => match &field.alias {
                Some(table) => self.config.carrier_alias(table, &field.name),
                None => self.config.carrier_alias(consumer, producer_alias),
            },
        };

        if !owned.iter().any(|column| column.raw_text == raw && column.visible_name() == alias) {
            owned.push(ColumnExpr::carrier(&raw, &alias));
        }
        alias
    }

    /// Kahn's algorithm over the bridging graph; ready groups are taken in
    /// first-seen order.
    fn execution_order(&self) -> Result<Vec<String>, BridgeResolutionError> {
        let names = self.grouping.group_names();
        let mut in_degree: IndexMap<&str, usize> = names.iter().map(|name| (name.as_str(), 0)).collect();
        for instruction in self.instructions.iter() {
            *in_degree.entry(instruction.consuming_group.as_str()).or_default() += 1;
        }

        if names.len() > 1 {
            for name in names.iter() {
                let connected = self.instructions.iter()
                    .any(|instruction| &instruction.producing_group == name || &instruction.consuming_group == name);
                if !connected {
                    warn!(group = %name, "group is not bridged to any other group, rows cannot be matched");
                }
            }
        }

        let mut order: Vec<String> = Vec::with_capacity(names.len());
        while order.len() < in_degree.len() {
            let ready = in_degree.iter()
                .find(|(name, degree)| **degree == 0 && !order.iter().any(|done| done == **name))
                .map(|(name, _)| name.to_string());

            let Some(next) = ready else {
                return Err(self.cycle(&order));
            };

            for instruction in self.instructions.iter().filter(|instruction| instruction.producing_group == next) {
                if let Some(degree) = in_degree.get_mut(instruction.consuming_group.as_str()) {
                    *degree -= 1;
                }
            }
            order.push(next);
        }

        Ok(order)
    }

    fn cycle(&self, done: &[String]) -> BridgeResolutionError {
        let pending = |name: &str| !done.iter().any(|known| known == name);

        let edge = self.instructions.iter()
            .filter(|instruction| pending(&instruction.producing_group) && pending(&instruction.consuming_group))
            .min_by_key(|instruction| {
                self.grouping.groups.get_index_of(instruction.consuming_group.as_str()).unwrap_or(usize::MAX)
            });

        match edge {
            Some(instruction) => BridgeResolutionError::Cycle {
                first: instruction.consuming_group.clone(),
                second: instruction.producing_group.clone(),
            },
            None => BridgeResolutionError::Cycle { first: String::new(), second: String::new() },
        }
    }
}
