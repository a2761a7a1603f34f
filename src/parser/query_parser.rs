use crate::parser::{Phase, QueryComparers, WordComparer};

/// Character cursor over one statement.
///
/// Backticks are removed up front; everything after that works on plain
/// identifiers.
#[derive(Debug, Default)]
pub struct QueryParser {
    pub position: usize,
    pub length: usize,
    pub text_v: Vec<char>,
    pub phase: Phase,
    pub comparers: QueryComparers,
}

impl QueryParser {
    pub fn new(query: &str) -> Self {
        let text_v: Vec<char> = query.chars().filter(|ch| *ch != '`').collect();
        Self {
            position: 0,
            length: text_v.len(),
            text_v,
            comparers: QueryComparers::new(),
            ..Default::default()
        }
    }

    pub fn eof(&self) -> bool {
        self.position >= self.length
    }

    pub fn current(&self) -> char {
        self.char_at(self.position)
    }

    pub fn char_at(&self, position: usize) -> char {
        if position < self.length {
            return self.text_v[position];
        }

        '\0'
    }

    pub fn peek(&self, ahead: usize) -> char {
        self.char_at(self.position + ahead)
    }

    pub fn next(&mut self) {
        self.position += 1;
    }

    pub fn next_non_whitespace(&mut self) {
        while self.current().is_whitespace() {
            self.next();
        }
    }

    pub fn jump(&mut self, ahead: usize) {
        self.position = (self.position + ahead).min(self.length);
    }

    /// First non-whitespace position at or after `position`.
    pub fn skip_whitespace_from(&self, position: usize) -> usize {
        let mut position = position;
        while position < self.length && self.text_v[position].is_whitespace() {
            position += 1;
        }
        position
    }

    pub fn text_from_range(&self, start: usize, end: usize) -> String {
        let end = end.min(self.length);
        let start = start.min(end);
        self.text_v[start..end].iter().collect()
    }

    pub fn text_from_pivot(&self, pivot: usize) -> String {
        self.text_from_range(pivot, self.position)
    }

    pub fn remainder(&self) -> String {
        self.text_from_range(self.position, self.length)
    }

    /// Consumes the keyword picked from the comparers when it sits at the cursor.
    pub fn accept(&mut self, pick: fn(&QueryComparers) -> &WordComparer) -> bool {
        match pick(&self.comparers).matched(self) {
            Some(length) => {
                self.jump(length);
                true
            },
            None => false,
        }
    }

    pub fn starts_join_at(&self, position: usize) -> bool {
        self.comparers.joins().iter().any(|comparer| comparer.compare_at(self, position))
    }

    pub fn starts_trailing_at(&self, position: usize) -> bool {
        self.comparers.trailing().iter().any(|comparer| comparer.compare_at(self, position))
    }

    /// `AND` / `OR` preceded by whitespace at `position`.
    pub fn starts_connector_at(&self, position: usize) -> bool {
        position > 0 && self.text_v[position - 1].is_whitespace() &&
            (self.comparers.and.compare_at(self, position) || self.comparers.or.compare_at(self, position))
    }

    /// A clause keyword preceded by whitespace at `position`.
    pub fn starts_clause_at(&self, position: usize) -> bool {
        if position == 0 || !self.text_v[position - 1].is_whitespace() {
            return false;
        }

        self.comparers.from.compare_at(self, position) ||
            self.comparers.r#where.compare_at(self, position) ||
            self.starts_join_at(position) ||
            self.starts_trailing_at(position)
    }

    /// Skips whitespace and moves the phase forward when the cursor sits on
    /// the keyword of a later clause. The keyword itself is not consumed.
    pub fn check_next_phase(&mut self) -> bool {
        self.next_non_whitespace();

        if self.eof() {
            self.phase = Phase::EOF;
            return true;
        }

        if self.phase < Phase::Trailing && self.starts_trailing_at(self.position) {
            self.phase = Phase::Trailing;
            return true;
        }

        if self.phase < Phase::Criteria && self.comparers.r#where.compare(self) {
            self.phase = Phase::Criteria;
            return true;
        }

        if self.phase <= Phase::Joins && self.starts_join_at(self.position) {
            self.phase = Phase::Joins;
            return true;
        }

        if self.phase < Phase::Tables && self.comparers.from.compare(self) {
            self.phase = Phase::Tables;
            return true;
        }

        false
    }
}
