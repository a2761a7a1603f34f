pub mod parser;

pub mod config;
pub use config::*;

pub mod splitter;
pub use splitter::{
    split, AliasGroups, BindError, BridgePair, BridgeResolutionError, BridgingInstruction, GroupQuery,
    GroupResolver, LinkPrefix, OwnershipError, QuerySplitter, SplitError, SplitPlan,
};
