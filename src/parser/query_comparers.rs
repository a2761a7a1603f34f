use crate::parser::WordComparer;

#[derive(Debug)]
pub struct QueryComparers {
    pub select: WordComparer,
    pub alias: WordComparer,
    pub from: WordComparer,
    pub inner_join: WordComparer,
    pub left_join: WordComparer,
    pub left_outer_join: WordComparer,
    pub right_join: WordComparer,
    pub right_outer_join: WordComparer,
    pub full_join: WordComparer,
    pub full_outer_join: WordComparer,
    pub outer_join: WordComparer,
    pub join: WordComparer,
    pub on: WordComparer,
    pub r#where: WordComparer,
    pub group_by: WordComparer,
    pub having: WordComparer,
    pub order_by: WordComparer,
    pub limit: WordComparer,
    pub and: WordComparer,
    pub or: WordComparer,
    pub is: WordComparer,
    pub is_not: WordComparer,
    pub r#in: WordComparer,
    pub not_in: WordComparer,
    pub like: WordComparer,
    pub not_like: WordComparer,
    pub regexp: WordComparer,
    pub not_regexp: WordComparer,
    pub between: WordComparer,
    pub not_between: WordComparer,
}

impl Default for QueryComparers {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryComparers {
    pub fn new() -> Self {
        Self {
            select: WordComparer::new("SELECT").with_whitespace_postfix(),
            alias: WordComparer::new("AS").with_whitespace_postfix().with_optional_postfix('\'').with_optional_postfix('"'),
            from: WordComparer::new("FROM").with_whitespace_postfix(),
            inner_join: WordComparer::new("INNER JOIN").with_whitespace_postfix(),
            left_join: WordComparer::new("LEFT JOIN").with_whitespace_postfix(),
            left_outer_join: WordComparer::new("LEFT OUTER JOIN").with_whitespace_postfix(),
            right_join: WordComparer::new("RIGHT JOIN").with_whitespace_postfix(),
            right_outer_join: WordComparer::new("RIGHT OUTER JOIN").with_whitespace_postfix(),
            full_join: WordComparer::new("FULL JOIN").with_whitespace_postfix(),
            full_outer_join: WordComparer::new("FULL OUTER JOIN").with_whitespace_postfix(),
            outer_join: WordComparer::new("OUTER JOIN").with_whitespace_postfix(),
            join: WordComparer::new("JOIN").with_whitespace_postfix(),
            on: WordComparer::new("ON").with_whitespace_postfix(),
            r#where: WordComparer::new("WHERE").with_whitespace_postfix().with_eof(),
            group_by: WordComparer::new("GROUP BY").with_whitespace_postfix(),
            having: WordComparer::new("HAVING").with_whitespace_postfix(),
            order_by: WordComparer::new("ORDER BY").with_whitespace_postfix(),
            limit: WordComparer::new("LIMIT").with_whitespace_postfix(),
            and: WordComparer::new("AND").with_whitespace_postfix(),
            or: WordComparer::new("OR").with_whitespace_postfix(),
            is: WordComparer::new("IS").with_whitespace_postfix(),
            is_not: WordComparer::new("IS NOT").with_whitespace_postfix(),
            r#in: WordComparer::new("IN").with_whitespace_postfix().with_delimiter('('),
            not_in: WordComparer::new("NOT IN").with_whitespace_postfix().with_delimiter('('),
            like: WordComparer::new("LIKE").with_whitespace_postfix(),
            not_like: WordComparer::new("NOT LIKE").with_whitespace_postfix(),
            regexp: WordComparer::new("REGEXP").with_whitespace_postfix(),
            not_regexp: WordComparer::new("NOT REGEXP").with_whitespace_postfix(),
            between: WordComparer::new("BETWEEN").with_whitespace_postfix(),
            not_between: WordComparer::new("NOT BETWEEN").with_whitespace_postfix(),
        }
    }

    /// Join keywords, longest spelling first.
    pub fn joins(&self) -> [&WordComparer; 9] {
        [
            &self.left_outer_join,
            &self.right_outer_join,
            &self.full_outer_join,
            &self.inner_join,
            &self.left_join,
            &self.right_join,
            &self.full_join,
            &self.outer_join,
            &self.join,
        ]
    }

    /// Keywords that open the opaque tail of the statement.
    pub fn trailing(&self) -> [&WordComparer; 4] {
        [&self.group_by, &self.having, &self.order_by, &self.limit]
    }

    /// Keyword operators, negated spellings first so `NOT IN` wins over a bare `NOT`.
    pub fn keyword_operators(&self) -> [&WordComparer; 10] {
        [
            &self.is_not,
            &self.not_in,
            &self.not_like,
            &self.not_regexp,
            &self.not_between,
            &self.is,
            &self.r#in,
            &self.like,
            &self.regexp,
            &self.between,
        ]
    }
}
