/// Splitter configuration.
///
/// - `carrier_prefix` starts every synthetic column alias the splitter adds
///   to move a join key from one group to another.
/// - `always_true` is rendered as the WHERE body of a group that owns no
///   condition, and as the ON body of a join that lost all its predicates.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitterConfig {
    /// Prefix of synthetic carrier aliases
    pub carrier_prefix: String,
    /// Predicate used where SQL needs one but the group has none
    pub always_true: String,
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self { carrier_prefix: "__bridge_".to_string(), always_true: "1".to_string() }
    }
}

impl SplitterConfig {
    /// Create default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a configuration with explicit `carrier_prefix` and `always_true`.
    pub fn from(carrier_prefix: &str, always_true: &str) -> Self {
        Self {
            carrier_prefix: carrier_prefix.to_string(),
            always_true: always_true.to_string(),
        }
    }

    /// Convenience: default configuration with another carrier prefix.
    pub fn with_carrier_prefix(carrier_prefix: &str) -> Self {
        Self {
            carrier_prefix: carrier_prefix.to_string(),
            ..Self::default()
        }
    }

    /// Synthetic alias for `alias.name`, e.g. `__bridge_t1_id`.
    pub fn carrier_alias(&self, alias: &str, name: &str) -> String {
        format!("{}{}_{}", self.carrier_prefix, alias, name)
    }
}
