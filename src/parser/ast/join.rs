use std::fmt;

use serde::{Deserialize, Serialize};

use crate::parser::{ast::{QualifiedField, TableRef, TextCollector}, ParseError, Phase, QueryParser};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum JoinKind {
    Left,
    Right,
    Inner,
    Outer,
}

impl JoinKind {
    pub fn parse(parser: &mut QueryParser) -> Result<JoinKind, ParseError> {
        if parser.accept(|comparers| &comparers.left_outer_join) || parser.accept(|comparers| &comparers.left_join) {
            return Ok(JoinKind::Left);
        }

        if parser.accept(|comparers| &comparers.right_outer_join) || parser.accept(|comparers| &comparers.right_join) {
            return Ok(JoinKind::Right);
        }

        if parser.accept(|comparers| &comparers.inner_join) || parser.accept(|comparers| &comparers.join) {
            return Ok(JoinKind::Inner);
        }

        if parser.accept(|comparers| &comparers.full_outer_join) || parser.accept(|comparers| &comparers.full_join) ||
            parser.accept(|comparers| &comparers.outer_join) {
            return Ok(JoinKind::Outer);
        }

        ParseError::new("Invalid join type", parser.position, parser).err()
    }

    /// SQL spelling of the join. `Outer` has no MySQL spelling; the splitter
    /// only accepts it between tables of different groups.
    pub fn keyword(&self) -> &'static str {
        match self {
            JoinKind::Left => "LEFT JOIN",
            JoinKind::Right => "RIGHT JOIN",
            JoinKind::Inner => "INNER JOIN",
            JoinKind::Outer => "FULL OUTER JOIN",
        }
    }
}

/// `left op right` inside an ON clause. Only `=` can bridge two groups; any
/// other operator is kept verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct EqualityPredicate {
    pub left_field: QualifiedField,
    pub operator: String,
    pub right_field: QualifiedField,
}

impl EqualityPredicate {
    pub fn is_equality(&self) -> bool {
        self.operator == "="
    }

    pub fn is_operator_char(ch: char) -> bool {
        ch == '=' || ch == '<' || ch == '>' || ch == '!'
    }

    pub fn parse(parser: &mut QueryParser) -> Result<EqualityPredicate, ParseError> {
        parser.next_non_whitespace();
        let pivot = parser.position;

        let left = TextCollector::collect_until(parser, &|parser, position| {
            Self::is_operator_char(parser.char_at(position)) || parser.starts_connector_at(position) ||
                parser.starts_clause_at(position)
        })?;

        let operator_pivot = parser.position;
        while Self::is_operator_char(parser.current()) {
            parser.next();
        }
        let operator = parser.text_from_pivot(operator_pivot);

        if left.is_empty() || operator.is_empty() {
            return ParseError::new("Invalid join predicate", pivot, parser).err();
        }

        parser.next_non_whitespace();
        let right_pivot = parser.position;
        let right = TextCollector::collect_until(parser, &|parser, position| {
            parser.starts_connector_at(position) || parser.starts_clause_at(position)
        })?;

        if right.is_empty() {
            return ParseError::new("Invalid join predicate", right_pivot, parser).err();
        }

        Ok(EqualityPredicate {
            left_field: QualifiedField::from_text(&left),
            operator,
            right_field: QualifiedField::from_text(&right),
        })
    }
}

impl fmt::Display for EqualityPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.left_field, self.operator, self.right_field)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JoinClause {
    pub join_kind: JoinKind,
    pub table: TableRef,
    pub on_predicates: Vec<EqualityPredicate>,
}

impl JoinClause {
    /// Parses every consecutive JOIN clause. Expects the cursor on the first join keyword.
    pub fn parse(parser: &mut QueryParser) -> Result<Vec<JoinClause>, ParseError> {
        let mut joins: Vec<JoinClause> = vec![];
        while parser.phase == Phase::Joins {
            let join_kind = JoinKind::parse(parser)?;
            let table = TableRef::parse(parser)?;

            if !parser.accept(|comparers| &comparers.on) {
                return ParseError::new("Missing ON for join", parser.position, parser).err();
            }

            let mut on_predicates: Vec<EqualityPredicate> = vec![];
            loop {
                on_predicates.push(EqualityPredicate::parse(parser)?);

                parser.next_non_whitespace();
                if parser.accept(|comparers| &comparers.and) {
                    continue;
                }

                let pivot = parser.position;
                if parser.check_next_phase() {
                    // another JOIN keeps the phase at Joins, the outer loop picks it up
                    break;
                }

                if parser.comparers.or.compare(parser) {
                    return ParseError::new("OR is not supported in join conditions", pivot, parser).err();
                }

                return ParseError::new("Invalid join predicate", pivot, parser).err();
            }

            joins.push(JoinClause {
                join_kind,
                table,
                on_predicates,
            });
        }

        Ok(joins)
    }

    /// True when an ON predicate over `aliases` keeps the same rows as a
    /// WHERE condition: always for INNER, only on the nullable side otherwise.
    pub fn moves_to_where(&self, aliases: &[String]) -> bool {
        let joined = &self.table.alias;
        match self.join_kind {
            JoinKind::Inner => true,
            JoinKind::Left => !aliases.is_empty() && aliases.iter().all(|alias| alias == joined),
            JoinKind::Right => !aliases.is_empty() && aliases.iter().all(|alias| alias != joined),
            JoinKind::Outer => false,
        }
    }

    /// Renders the clause with the given predicates; an empty list renders `ON <always_true>`.
    pub fn render(&self, predicates: &[EqualityPredicate], always_true: &str) -> String {
        let on = match predicates.is_empty() {
            true => always_true.to_string(),
            false => predicates.iter().map(|p| p.to_string()).collect::<Vec<_>>().join(" AND "),
        };

        format!("{} {} ON {}", self.join_kind.keyword(), self.table, on)
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::{ast::{JoinClause, JoinKind}, Phase, QueryParser};

    #[test]
    pub fn test_left_join() {
        let text = "LEFT JOIN table2 t2 ON t1.id = t2.id WHERE t1.id > 2";

        let mut parser = QueryParser::new(text);
        assert!(parser.check_next_phase());

        let result = JoinClause::parse(&mut parser).expect("Failed to parse join");

        assert_eq!(result.len(), 1);
        let first = &result[0];
        assert_eq!(first.join_kind, JoinKind::Left);
        assert_eq!(first.table.table, "table2");
        assert_eq!(first.table.alias, "t2");
        assert_eq!(first.on_predicates.len(), 1);
        assert_eq!(first.on_predicates[0].left_field.to_string(), "t1.id");
        assert_eq!(first.on_predicates[0].right_field.to_string(), "t2.id");
        assert!(first.on_predicates[0].is_equality());
        assert_eq!(parser.phase, Phase::Criteria);
    }

    #[test]
    pub fn test_join_with_two_predicates() {
        let text = "INNER JOIN tableA a ON a.columnA = b.columnA AND a.columnB >= b.columnB";

        let mut parser = QueryParser::new(text);
        assert!(parser.check_next_phase());

        let result = JoinClause::parse(&mut parser).expect("Failed to parse join");

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].on_predicates.len(), 2);
        assert_eq!(result[0].on_predicates[1].operator, ">=");
        assert!(!result[0].on_predicates[1].is_equality());
        assert_eq!(parser.phase, Phase::EOF);
    }

    #[test]
    pub fn test_all_joins() {
        let text = r#"
        INNER JOIN tableA a ON a.id = b.id
        LEFT OUTER JOIN tableC c ON c.id = a.c_id
        right join tableD d ON d.id = c.d_id
        FULL JOIN tableE e ON e.id = a.e_id
        JOIN tableF f ON f.id = a.f_id
        "#;

        let mut parser = QueryParser::new(text);
        assert!(parser.check_next_phase());

        let result = JoinClause::parse(&mut parser).expect("Failed to parse join");

        let expect_aliases = ["a", "c", "d", "e", "f"];
        let expect_kinds = [JoinKind::Inner, JoinKind::Left, JoinKind::Right, JoinKind::Outer, JoinKind::Inner];

        assert_eq!(result.len(), 5);
        for (i, item) in result.iter().enumerate() {
            assert_eq!(item.table.alias, expect_aliases[i]);
            assert_eq!(item.join_kind, expect_kinds[i]);
        }
    }

    #[test]
    pub fn test_join_function_and_literal_sides() {
        let text = "LEFT JOIN table2 t2 ON LOWER(t1.code) = t2.code AND t2.kind = 'a = b' WHERE 1";

        let mut parser = QueryParser::new(text);
        assert!(parser.check_next_phase());

        let result = JoinClause::parse(&mut parser).expect("Failed to parse join");

        let predicates = &result[0].on_predicates;
        assert_eq!(predicates[0].left_field.to_string(), "LOWER(t1.code)");
        assert!(!predicates[0].left_field.is_qualified());
        assert_eq!(predicates[1].right_field.to_string(), "'a = b'");
    }

    #[test]
    pub fn test_join_missing_on() {
        let text = "LEFT JOIN table2 t2 WHERE t2.id = 1";

        let mut parser = QueryParser::new(text);
        assert!(parser.check_next_phase());

        let result = JoinClause::parse(&mut parser);

        match result {
            Ok(_) => panic!(),
            Err(err) => assert_eq!(err.message, "Missing ON for join"),
        }
    }

    #[test]
    pub fn test_join_or_rejected() {
        let text = "LEFT JOIN table2 t2 ON t1.id = t2.id OR t1.x = t2.x WHERE 1";

        let mut parser = QueryParser::new(text);
        assert!(parser.check_next_phase());

        let result = JoinClause::parse(&mut parser);

        match result {
            Ok(_) => panic!(),
            Err(err) => {
                assert_eq!(err.message, "OR is not supported in join conditions");
                assert!(err.text.starts_with("OR t1.x"));
            },
        }
    }

    #[test]
    pub fn test_moves_to_where_by_join_kind() {
        let text = r#"
        INNER JOIN ta a ON a.id = t.id
        LEFT JOIN tb b ON b.id = t.id
        RIGHT JOIN tc c ON c.id = t.id
        FULL JOIN td d ON d.id = t.id
        "#;

        let mut parser = QueryParser::new(text);
        assert!(parser.check_next_phase());

        let joins = JoinClause::parse(&mut parser).expect("Failed to parse join");
        let own = |alias: &str| vec![alias.to_string()];
        let base = vec!["t".to_string()];

        assert!(joins[0].moves_to_where(&own("a")));
        assert!(joins[0].moves_to_where(&base));

        assert!(joins[1].moves_to_where(&own("b")));
        assert!(!joins[1].moves_to_where(&base));
        assert!(!joins[1].moves_to_where(&[]));

        assert!(!joins[2].moves_to_where(&own("c")));
        assert!(joins[2].moves_to_where(&base));

        assert!(!joins[3].moves_to_where(&own("d")));
        assert!(!joins[3].moves_to_where(&base));
    }

    #[test]
    pub fn test_render_join() {
        let text = "LEFT JOIN shop.table2 t2 ON t1.id = t2.id";

        let mut parser = QueryParser::new(text);
        assert!(parser.check_next_phase());

        let result = JoinClause::parse(&mut parser).expect("Failed to parse join");
        let join = &result[0];

        assert_eq!(join.render(&join.on_predicates, "1"), "LEFT JOIN shop.table2 t2 ON t1.id = t2.id");
        assert_eq!(join.render(&[], "1"), "LEFT JOIN shop.table2 t2 ON 1");
    }
}
