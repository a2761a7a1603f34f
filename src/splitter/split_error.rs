use thiserror::Error;

use crate::parser::ParseError;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SplitError {
    #[error(transparent)]
    Syntax(#[from] ParseError),

    #[error(transparent)]
    Ownership(#[from] OwnershipError),

    #[error(transparent)]
    Bridge(#[from] BridgeResolutionError),
}

/// An expression cannot be assigned to exactly one group.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OwnershipError {
    #[error("OwnershipError: '{expression}' combines fields from different groups ({})", .groups.join(", "))]
    MixedGroups { expression: String, groups: Vec<String> },

    #[error("OwnershipError: alias '{alias}' used in '{expression}' is not a table of the statement")]
    UnresolvedAlias { alias: String, expression: String },

    #[error("OwnershipError: alias '{0}' is declared by more than one table")]
    DuplicateAlias(String),

    #[error("OwnershipError: OR-combined conditions '{expression}' span groups ({})", .groups.join(", "))]
    MixedConnectors { expression: String, groups: Vec<String> },
}

/// A cross-group join cannot be turned into a bridging instruction.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BridgeResolutionError {
    #[error("BridgeResolutionError: '{expression}' is not a single column, cannot carry values from '{producing_group}' to '{consuming_group}'")]
    NonScalarCarrier { producing_group: String, consuming_group: String, expression: String },

    #[error("BridgeResolutionError: '{predicate}' between '{producing_group}' and '{consuming_group}' is not an equality")]
    NonEquality { producing_group: String, consuming_group: String, predicate: String },

    #[error("BridgeResolutionError: groups '{first}' and '{second}' depend on each other")]
    Cycle { first: String, second: String },

    #[error("BridgeResolutionError: '{predicate}' restricts the preserved side of the outer join into '{joined_group}', it cannot become a WHERE condition of '{group}'")]
    PreservedSideFilter { group: String, joined_group: String, predicate: String },

    #[error("BridgeResolutionError: FULL OUTER JOIN of '{table}' stays inside group '{group}', only a join across groups can be outer on both sides")]
    FusedFullJoin { group: String, table: String },
}

/// Rendering a consumer query with producer values failed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BindError {
    #[error("BindError: unknown group '{0}'")]
    UnknownGroup(String),

    #[error("BindError: value bound to '{alias}' for group '{group}' is not a scalar")]
    UnsupportedValue { group: String, alias: String },
}
