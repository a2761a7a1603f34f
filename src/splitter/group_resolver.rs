use std::collections::HashMap;

use indexmap::IndexMap;

use crate::parser::ast::TableRef;

/// Tells the splitter which connection group a table lives on.
///
/// `None` means "no opinion": the table then stays with the table declared
/// just before it.
pub trait GroupResolver {
    fn group_of(&self, table: &TableRef) -> Option<String>;
}

/// Explicit `alias -> group` mapping supplied by the caller.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct AliasGroups {
    groups: IndexMap<String, String>,
    link_fallback: bool,
}

impl AliasGroups {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, alias: &str, group: &str) -> Self {
        self.insert(alias, group);
        self
    }

    /// Tables missing from the map fall back to their `link.` prefix.
    pub fn with_link_fallback(mut self) -> Self {
        self.link_fallback = true;
        self
    }

    pub fn insert(&mut self, alias: &str, group: &str) {
        self.groups.insert(alias.to_string(), group.to_string());
    }

    pub fn get(&self, alias: &str) -> Option<&str> {
        self.groups.get(alias).map(String::as_str)
    }

    pub fn aliases(&self) -> impl Iterator<Item = &String> {
        self.groups.keys()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for AliasGroups {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            groups: iter.into_iter().map(|(alias, group)| (alias.into(), group.into())).collect(),
            link_fallback: false,
        }
    }
}

impl GroupResolver for AliasGroups {
    fn group_of(&self, table: &TableRef) -> Option<String> {
        match self.groups.get(&table.alias) {
            Some(group) => Some(group.clone()),
            None if self.link_fallback => table.link.clone(),
            None => None,
        }
    }
}

/// Reads the group from connection qualified names: `crm.sales.customers`
/// lives on group `crm`.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct LinkPrefix;

impl GroupResolver for LinkPrefix {
    fn group_of(&self, table: &TableRef) -> Option<String> {
        table.link.clone()
    }
}

impl GroupResolver for IndexMap<String, String> {
    fn group_of(&self, table: &TableRef) -> Option<String> {
        self.get(&table.alias).cloned()
    }
}

impl GroupResolver for HashMap<String, String> {
    fn group_of(&self, table: &TableRef) -> Option<String> {
        self.get(&table.alias).cloned()
    }
}
