use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

static FIELD_REF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|[^\w.$])([\p{L}_][\w$]*)\.(?:[\w$]+|\*)").expect("valid field reference pattern")
});

static QUALIFIED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([\p{L}_][\w$]*)\.([\w$]+|\*)$").expect("valid qualified field pattern")
});

static BARE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[\p{L}_][\w$]*$").expect("valid identifier pattern")
});

/// `[alias.]name`. Expressions that do not decompose (function calls,
/// literals, arithmetic) keep their whole text in `name` and have no alias.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub struct QualifiedField {
    pub alias: Option<String>,
    pub name: String,
}

impl QualifiedField {
    pub fn new(alias: Option<String>, name: String) -> Self {
        Self { alias, name }
    }

    pub fn from_text(text: &str) -> Self {
        let text = text.trim();
        if let Some(captures) = QUALIFIED.captures(text) {
            return Self::new(Some(captures[1].to_string()), captures[2].to_string());
        }

        Self::new(None, text.to_string())
    }

    /// True for `alias.name`, the only shape usable as a bridge key.
    pub fn is_qualified(&self) -> bool {
        self.alias.is_some()
    }

    /// True for a lone identifier such as `id`.
    pub fn is_bare_identifier(&self) -> bool {
        self.alias.is_none() && BARE.is_match(&self.name)
    }

    /// Table aliases referenced by this field, in order of appearance.
    pub fn referenced_aliases(&self) -> Vec<String> {
        match &self.alias {
            Some(alias) => vec![alias.clone()],
            None => referenced_aliases(&self.name),
        }
    }
}

impl fmt::Display for QualifiedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.alias {
            Some(alias) => write!(f, "{}.{}", alias, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Scans raw expression text for `alias.field` references and returns the
/// distinct aliases in order of appearance. Quoted literals are skipped.
pub fn referenced_aliases(text: &str) -> Vec<String> {
    let stripped = strip_literals(text);
    let mut aliases: Vec<String> = vec![];
    for captures in FIELD_REF.captures_iter(&stripped) {
        let alias = captures[1].to_string();
        if !aliases.contains(&alias) {
            aliases.push(alias);
        }
    }
    aliases
}

fn strip_literals(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for ch in text.chars() {
        match quote {
            Some(open) => {
                if escaped {
                    escaped = false;
                } else if ch == '\\' {
                    escaped = true;
                } else if ch == open {
                    quote = None;
                    result.push(ch);
                }
            },
            None => {
                if ch == '\'' || ch == '"' {
                    quote = Some(ch);
                }
                result.push(ch);
            },
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use crate::parser::ast::{referenced_aliases, QualifiedField};

    #[test]
    pub fn test_qualified_field() {
        let field = QualifiedField::from_text("t1.id");

        assert_eq!(field.alias.as_deref(), Some("t1"));
        assert_eq!(field.name, "id");
        assert!(field.is_qualified());
        assert_eq!(field.to_string(), "t1.id");
    }

    #[test]
    pub fn test_wildcard_field() {
        let field = QualifiedField::from_text("t2.*");

        assert_eq!(field.alias.as_deref(), Some("t2"));
        assert_eq!(field.name, "*");
    }

    #[test]
    pub fn test_bare_field() {
        let field = QualifiedField::from_text(" status ");

        assert!(!field.is_qualified());
        assert!(field.is_bare_identifier());
        assert_eq!(field.to_string(), "status");
    }

    #[test]
    pub fn test_function_field() {
        let field = QualifiedField::from_text("DATE_FORMAT(t1.created_at, '%Y')");

        assert!(!field.is_qualified());
        assert!(!field.is_bare_identifier());
        assert_eq!(field.referenced_aliases(), vec!["t1".to_string()]);
    }

    #[test]
    pub fn test_referenced_aliases_multiple() {
        let aliases = referenced_aliases("CONCAT(t1.name, '-', t2.age, t1.code)");

        assert_eq!(aliases, vec!["t1".to_string(), "t2".to_string()]);
    }

    #[test]
    pub fn test_referenced_aliases_skip_literals_and_numbers() {
        let aliases = referenced_aliases("ROUND(t1.price * 1.15, 2) + LENGTH('x.y')");

        assert_eq!(aliases, vec!["t1".to_string()]);
    }

    #[test]
    pub fn test_referenced_aliases_unicode() {
        let aliases = referenced_aliases("用户.名称");

        assert_eq!(aliases, vec!["用户".to_string()]);
    }
}
