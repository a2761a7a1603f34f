use std::fmt;

use serde::{Deserialize, Serialize};

use crate::parser::{ast::{QualifiedField, TextCollector}, ParseError, QueryParser, WordComparer};

/// How a condition attaches to the one before it.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Connector {
    #[default]
    And,
    Or,
}

impl fmt::Display for Connector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Connector::And => write!(f, "AND"),
            Connector::Or => write!(f, "OR"),
        }
    }
}

/// `field operator value` from the WHERE clause.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionExpr {
    pub connector: Connector,
    pub field: QualifiedField,
    pub operator: String,
    pub value_text: String,
}

impl ConditionExpr {
    pub fn new(field: QualifiedField, operator: &str, value_text: &str) -> Self {
        Self {
            connector: Connector::And,
            field,
            operator: operator.to_string(),
            value_text: value_text.to_string(),
        }
    }

    /// True for a predicate with no operator, e.g. the `1` of `WHERE 1`.
    pub fn is_bare(&self) -> bool {
        self.operator.is_empty()
    }

    /// Parses the condition chain after `WHERE` up to the trailing clause or the end.
    pub fn parse_criteria(parser: &mut QueryParser) -> Result<Vec<ConditionExpr>, ParseError> {
        let mut conditions: Vec<ConditionExpr> = vec![];

        loop {
            parser.next_non_whitespace();
            let pivot = parser.position;

            let connector = if parser.accept(|comparers| &comparers.and) {
                Connector::And
            } else if !conditions.is_empty() && parser.accept(|comparers| &comparers.or) {
                Connector::Or
            } else if conditions.is_empty() {
                Connector::And
            } else {
                return ParseError::new("Invalid condition", pivot, parser).err();
            };

            parser.next_non_whitespace();
            if parser.eof() {
                return ParseError::new("Missing condition", pivot, parser).err();
            }

            if parser.current() == '(' {
                return ParseError::new("Grouped conditions are not supported", parser.position, parser).err();
            }

            let mut condition = Self::parse_single(parser)?;
            condition.connector = connector;
            conditions.push(condition);

            if parser.check_next_phase() {
                break;
            }
        }

        Ok(conditions)
    }

    pub fn parse_single(parser: &mut QueryParser) -> Result<ConditionExpr, ParseError> {
        let pivot = parser.position;

        let field = TextCollector::collect_until(parser, &|parser, position| {
            let current = parser.char_at(position);
            current.is_whitespace() || current == '=' || current == '<' || current == '>' || current == '!'
        })?;

        if field.is_empty() {
            return ParseError::new("Invalid condition field", pivot, parser).err();
        }

        parser.next_non_whitespace();
        if parser.eof() || parser.starts_connector_at(parser.position) || parser.starts_trailing_at(parser.position) {
            // bare predicate such as `WHERE 1`
            return Ok(ConditionExpr::new(QualifiedField::from_text(&field), "", ""));
        }

        let operator_pivot = parser.position;
        let operator = Self::parse_operator(parser);
        if operator.is_empty() {
            return ParseError::new("Invalid condition operator", operator_pivot, parser).err();
        }

        parser.next_non_whitespace();
        let value_pivot = parser.position;
        let mut value_text = Self::collect_value(parser)?;

        if operator.ends_with("BETWEEN") {
            if !parser.accept(|comparers| &comparers.and) {
                return ParseError::new("Incomplete BETWEEN", parser.position, parser).err();
            }
            parser.next_non_whitespace();
            let upper = Self::collect_value(parser)?;
            value_text = format!("{} AND {}", value_text, upper);
        }

        if value_text.is_empty() {
            return ParseError::new("Missing condition value", value_pivot, parser).err();
        }

        Ok(ConditionExpr::new(QualifiedField::from_text(&field), &operator, &value_text))
    }

    /// Symbolic operators are kept as written; keyword operators are upper
    /// cased with single spaces.
    fn parse_operator(parser: &mut QueryParser) -> String {
        let pivot = parser.position;
        while matches!(parser.current(), '=' | '<' | '>' | '!') {
            parser.next();
        }
        if parser.position > pivot {
            return parser.text_from_pivot(pivot);
        }

        let matched = parser.comparers.keyword_operators().iter()
            .find_map(|comparer: &&WordComparer| comparer.matched(parser).map(|length| (comparer.word.iter().collect::<String>(), length)));

        match matched {
            Some((word, length)) => {
                parser.jump(length);
                word
            },
            None => String::new(),
        }
    }

    fn collect_value(parser: &mut QueryParser) -> Result<String, ParseError> {
        TextCollector::collect_until(parser, &|parser, position| {
            parser.starts_connector_at(position) ||
                (position > 0 && parser.text_v[position - 1].is_whitespace() && parser.starts_trailing_at(position))
        })
    }
}

impl fmt::Display for ConditionExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_bare() {
            return write!(f, "{}", self.field);
        }
        write!(f, "{} {} {}", self.field, self.operator, self.value_text)
    }
}

/// Joins conditions back into a WHERE body, keeping their connectors.
pub fn render_conditions(conditions: &[ConditionExpr]) -> Option<String> {
    let mut text = String::new();
    for (i, condition) in conditions.iter().enumerate() {
        if i > 0 {
            text.push_str(&format!(" {} ", condition.connector));
        }
        text.push_str(&condition.to_string());
    }

    match text.is_empty() {
        true => None,
        false => Some(text),
    }
}
