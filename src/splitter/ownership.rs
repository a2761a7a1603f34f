use crate::splitter::{OwnershipError, TableGrouping};

/// Distinct groups of the given aliases, in order of appearance.
pub fn groups_of(aliases: &[String], expression: &str, grouping: &TableGrouping) -> Result<Vec<String>, OwnershipError> {
    let mut groups: Vec<String> = vec![];
    for alias in aliases {
        let group = grouping.group_of_alias(alias).ok_or_else(|| OwnershipError::UnresolvedAlias {
            alias: alias.clone(),
            expression: expression.to_string(),
        })?;

        if !groups.iter().any(|known| known == group) {
            groups.push(group.to_string());
        }
    }
    Ok(groups)
}

/// The single group owning an expression, or `None` when it references no
/// table at all.
pub fn owner_of(aliases: &[String], expression: &str, grouping: &TableGrouping) -> Result<Option<String>, OwnershipError> {
    let mut groups = groups_of(aliases, expression, grouping)?;
    if groups.len() > 1 {
        return Err(OwnershipError::MixedGroups {
            expression: expression.to_string(),
            groups,
        });
    }
    Ok(groups.pop())
}
