// SELECT t1.id, t1.name, t2.age
// FROM table1 t1
// LEFT JOIN table2 t2 ON t1.id = t2.id
// WHERE t1.id > 2
// ORDER BY t1.id DESC

use std::fmt;

use crate::parser::{ast::{ColumnExpr, ConditionExpr, JoinClause, TableRef}, ParseError, Phase, QueryParser};

/// Parse tree of one SELECT statement.
#[derive(Clone, PartialEq)]
pub struct Query {
    pub columns: Vec<ColumnExpr>,
    pub table: TableRef,
    pub joins: Vec<JoinClause>,
    pub conditions: Vec<ConditionExpr>,
    /// GROUP BY / HAVING / ORDER BY / LIMIT text, kept verbatim.
    pub trailing: Option<String>,
}

impl Query {
    pub fn parse(parser: &mut QueryParser) -> Result<Self, ParseError> {
        parser.next_non_whitespace();

        if !parser.accept(|comparers| &comparers.select) {
            return ParseError::new("Expected SELECT", parser.position, parser).err();
        }

        let columns = ColumnExpr::parse_projection(parser)?;

        parser.accept(|comparers| &comparers.from);
        let table = TableRef::parse(parser)?;

        let mut joins: Vec<JoinClause> = vec![];
        if parser.phase == Phase::Joins {
            joins = JoinClause::parse(parser)?;
        }

        if parser.phase != Phase::Criteria || !parser.accept(|comparers| &comparers.r#where) {
            return ParseError::new("Missing WHERE clause", parser.position, parser).err();
        }

        let conditions = ConditionExpr::parse_criteria(parser)?;

        let mut trailing: Option<String> = None;
        if parser.phase == Phase::Trailing {
            trailing = Some(parser.remainder().trim().to_string());
            parser.jump(parser.length);
            parser.phase = Phase::EOF;
        }

        Ok(Query {
            columns,
            table,
            joins,
            conditions,
            trailing,
        })
    }

    /// Every table of the statement in declaration order, FROM first.
    pub fn tables(&self) -> impl Iterator<Item = &TableRef> {
        std::iter::once(&self.table).chain(self.joins.iter().map(|join| &join.table))
    }
}

impl TryFrom<&str> for Query {
    type Error = ParseError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let mut parser = QueryParser::new(value);
        Query::parse(&mut parser)
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cols = self.columns.iter().map(|c| c.to_string()).collect::<Vec<_>>().join(", ");
        let joins = self.joins.iter().map(|j| j.render(&j.on_predicates, "1")).collect::<Vec<_>>().join(" ");
        let conds = self.conditions.iter().map(|c| format!("{:?}", c)).collect::<Vec<_>>().join(", ");

        write!(f, "Query(columns=[{}], table={}, joins=[{}], conditions=[{}], trailing={:?})",
               cols, self.table, joins, conds, self.trailing)
    }
}

impl fmt::Debug for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Query({})", self)
    }
}
