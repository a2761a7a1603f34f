use std::fmt;

use crate::parser::{ast::TextCollector, ParseError, QueryParser};

/// One physical table occurrence in FROM or JOIN.
///
/// A three part name `link.database.table` carries the connection it lives
/// on in `link`; the link is never rendered back into SQL.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRef {
    pub link: Option<String>,
    pub database: Option<String>,
    pub table: String,
    /// The declared alias, or the table name when none was given.
    pub alias: String,
    pub explicit_alias: bool,
}

impl TableRef {
    pub fn new(database: Option<&str>, table: &str, alias: Option<&str>) -> Self {
        Self {
            link: None,
            database: database.map(str::to_string),
            table: table.to_string(),
            alias: alias.unwrap_or(table).to_string(),
            explicit_alias: alias.is_some(),
        }
    }

    pub fn with_link(mut self, link: &str) -> Self {
        self.link = Some(link.to_string());
        self
    }

    /// Parses `[[link.]database.]table [[AS] alias]`. The cursor is left on
    /// the next clause keyword or on `ON`.
    pub fn parse(parser: &mut QueryParser) -> Result<TableRef, ParseError> {
        parser.next_non_whitespace();
        let pivot = parser.position;

        let mut parts: Vec<String> = vec![TextCollector::collect_word(parser)];
        while parser.current() == '.' {
            parser.next();
            parts.push(TextCollector::collect_word(parser));
        }

        if parts.iter().any(|part| part.is_empty()) || parts.len() > 3 {
            return ParseError::new("Invalid table name", pivot, parser).err();
        }

        let table = parts.pop().unwrap_or_default();
        let database = parts.pop();
        let link = parts.pop();

        let mut alias: Option<String> = None;
        let next_phase = parser.check_next_phase();
        if !next_phase && !parser.comparers.on.compare(parser) {
            parser.accept(|comparers| &comparers.alias);
            parser.next_non_whitespace();

            let alias_pivot = parser.position;
            let word = TextCollector::collect_word(parser);
            if word.is_empty() {
                return ParseError::new("Invalid table alias", alias_pivot, parser).err();
            }
            alias = Some(word);
        }

        let next_phase = next_phase || parser.check_next_phase();

        let pivot = parser.position;
        if next_phase || parser.comparers.on.compare(parser) {
            let mut table_ref = TableRef::new(database.as_deref(), &table, alias.as_deref());
            table_ref.link = link;
            return Ok(table_ref);
        }

        ParseError::new("Unexpected text after table", pivot, parser).err()
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(database) = &self.database {
            write!(f, "{}.", database)?;
        }
        write!(f, "{}", self.table)?;
        if self.explicit_alias {
            write!(f, " {}", self.alias)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::{ast::TableRef, Phase, QueryParser};

    #[test]
    pub fn test_table() {
        let mut parser = QueryParser::new("table1");

        let result = TableRef::parse(&mut parser).expect("Failed to parse table");

        assert_eq!(result.table, "table1");
        assert_eq!(result.alias, "table1");
        assert!(!result.explicit_alias);
        assert_eq!(result.to_string(), "table1");
        assert_eq!(parser.phase, Phase::EOF);
    }

    #[test]
    pub fn test_table_with_database_and_alias() {
        let mut parser = QueryParser::new("shop.orders o WHERE o.id = 1");

        let result = TableRef::parse(&mut parser).expect("Failed to parse table");

        assert_eq!(result.database.as_deref(), Some("shop"));
        assert_eq!(result.table, "orders");
        assert_eq!(result.alias, "o");
        assert_eq!(result.to_string(), "shop.orders o");
        assert_eq!(parser.phase, Phase::Criteria);
    }

    #[test]
    pub fn test_table_with_link() {
        let mut parser = QueryParser::new("crm.sales.customers AS c ON c.id = o.customer_id");

        let result = TableRef::parse(&mut parser).expect("Failed to parse table");

        assert_eq!(result.link.as_deref(), Some("crm"));
        assert_eq!(result.database.as_deref(), Some("sales"));
        assert_eq!(result.alias, "c");
        assert_eq!(result.to_string(), "sales.customers c");
        assert!(parser.comparers.on.compare(&parser));
    }

    #[test]
    pub fn test_table_followed_by_join() {
        let mut parser = QueryParser::new("table1 LEFT JOIN table2 t2 ON t1.id = t2.id");

        let result = TableRef::parse(&mut parser).expect("Failed to parse table");

        assert_eq!(result.alias, "table1");
        assert_eq!(parser.phase, Phase::Joins);
    }

    #[test]
    pub fn test_table_list_is_rejected() {
        let mut parser = QueryParser::new("table1 t1, table2 t2 WHERE 1");

        let result = TableRef::parse(&mut parser);

        match result {
            Ok(_) => panic!(),
            Err(err) => {
                assert_eq!(err.message, "Unexpected text after table");
                assert_eq!(err.start, 9);
                assert_eq!(err.text, ", table2 t2 WHERE 1");
            },
        }
    }

    #[test]
    pub fn test_table_too_many_parts() {
        let mut parser = QueryParser::new("a.b.c.d x");

        let result = TableRef::parse(&mut parser);

        match result {
            Ok(_) => panic!(),
            Err(err) => assert_eq!(err.message, "Invalid table name"),
        }
    }
}
