use std::fmt;

use crate::parser::{ast::{QualifiedField, TextCollector}, ParseError, Phase, QueryParser};

/// One item of the SELECT list.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnExpr {
    pub raw_text: String,
    pub alias: Option<String>,
    /// Added by the splitter to move a join key between groups; never part
    /// of the caller visible row.
    pub carrier: bool,
}

impl ColumnExpr {
    pub fn new(raw_text: &str, alias: Option<String>) -> Self {
        Self {
            raw_text: raw_text.to_string(),
            alias,
            carrier: false,
        }
    }

    pub fn carrier(raw_text: &str, alias: &str) -> Self {
        Self {
            raw_text: raw_text.to_string(),
            alias: Some(alias.to_string()),
            carrier: true,
        }
    }

    pub fn field(&self) -> QualifiedField {
        QualifiedField::from_text(&self.raw_text)
    }

    /// Name the column comes back under: the explicit alias, else the field
    /// name of `alias.field`, else the raw text.
    pub fn visible_name(&self) -> String {
        if let Some(alias) = &self.alias {
            return alias.clone();
        }

        let field = self.field();
        if field.is_qualified() || field.is_bare_identifier() {
            return field.name;
        }

        self.raw_text.clone()
    }

    /// Parses the comma separated SELECT list up to `FROM`.
    pub fn parse_projection(parser: &mut QueryParser) -> Result<Vec<ColumnExpr>, ParseError> {
        let mut columns: Vec<ColumnExpr> = vec![];

        loop {
            parser.next_non_whitespace();
            let pivot = parser.position;

            let raw = TextCollector::collect_until(parser, &|parser, position| {
                if parser.char_at(position) == ',' {
                    return true;
                }
                if !parser.char_at(position).is_whitespace() {
                    return false;
                }
                let next = parser.skip_whitespace_from(position);
                parser.comparers.alias.compare_at(parser, next) || parser.comparers.from.compare_at(parser, next)
            })?;

            if raw.is_empty() {
                return ParseError::new("Invalid column", pivot, parser).err();
            }

            parser.next_non_whitespace();

            let mut alias: Option<String> = None;
            if parser.accept(|comparers| &comparers.alias) {
                parser.next_non_whitespace();
                alias = Some(TextCollector::collect_alias(parser)?);
                parser.next_non_whitespace();
            }

            columns.push(ColumnExpr::new(&raw, alias));

            if parser.current() == ',' {
                parser.next();
                continue;
            }

            let pivot = parser.position;
            if parser.check_next_phase() {
                break;
            }

            return ParseError::new("Invalid column", pivot, parser).err();
        }

        if parser.phase != Phase::Tables {
            return ParseError::new("Missing FROM clause", parser.position, parser).err();
        }

        Ok(columns)
    }
}

impl fmt::Display for ColumnExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.alias {
            Some(alias) => write!(f, "{} AS {}", self.raw_text, quote_alias(alias)),
            None => write!(f, "{}", self.raw_text),
        }
    }
}

/// Aliases made only of word characters are written as they are, anything
/// else is wrapped in backticks.
pub fn quote_alias(alias: &str) -> String {
    if !alias.is_empty() && alias.chars().all(TextCollector::is_word_char) {
        return alias.to_string();
    }

    format!("`{}`", alias.replace('`', "``"))
}
