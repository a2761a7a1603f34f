use crate::parser::QueryParser;

/// Case-insensitive keyword matcher.
///
/// A space inside the word matches any run of whitespace in the text, so
/// `"GROUP BY"` also accepts `"group\n  by"`.
#[derive(Debug, Default)]
pub struct WordComparer {
    pub length: usize,
    pub word: Vec<char>,
    whitespace_postfix: bool,
    full_block_delimiter_postfix: bool,
    eof: bool,
    delimiter: Option<char>,
    optional_postfix: Vec<char>,
}

impl WordComparer {
    pub fn new(word: &str) -> Self {
        Self {
            length: word.chars().count(),
            word: word.to_uppercase().chars().collect(),
            whitespace_postfix: false,
            full_block_delimiter_postfix: false,
            eof: false,
            delimiter: None,
            optional_postfix: vec![],
        }
    }

    pub fn is_block_delimiter(ch: char) -> bool {
        ch.is_whitespace()
    }

    pub fn is_any_delimiter(ch: char) -> bool {
        ch == ',' || ch == '(' || ch == ')' || ch == '.' || Self::is_block_delimiter(ch)
    }

    /// Length of the text matched at `start`, or `None` when the word is not there.
    pub fn matched_at(&self, parser: &QueryParser, start: usize) -> Option<usize> {
        let mut position = start;
        for expected in self.word.iter() {
            if *expected == ' ' {
                if position >= parser.length || !parser.text_v[position].is_whitespace() {
                    return None;
                }
                while position < parser.length && parser.text_v[position].is_whitespace() {
                    position += 1;
                }
                continue;
            }

            if position >= parser.length || *expected != parser.text_v[position].to_uppercase().next().unwrap_or('\0') {
                return None;
            }
            position += 1;
        }

        let matched = position - start;

        if position >= parser.length {
            return if self.eof { Some(matched) } else { None };
        }

        if self.delimiter.is_none() && !self.full_block_delimiter_postfix && !self.whitespace_postfix &&
            self.optional_postfix.is_empty() {
            return Some(matched);
        }

        let next = parser.text_v[position];

        if self.delimiter == Some(next) {
            return Some(matched);
        }

        if self.full_block_delimiter_postfix && Self::is_any_delimiter(next) {
            return Some(matched);
        }

        if self.whitespace_postfix && Self::is_block_delimiter(next) {
            return Some(matched);
        }

        if self.optional_postfix.contains(&next) {
            return Some(matched);
        }

        None
    }

    pub fn matched(&self, parser: &QueryParser) -> Option<usize> {
        self.matched_at(parser, parser.position)
    }

    pub fn compare(&self, parser: &QueryParser) -> bool {
        self.matched(parser).is_some()
    }

    pub fn compare_at(&self, parser: &QueryParser, start: usize) -> bool {
        self.matched_at(parser, start).is_some()
    }

    pub fn with_eof(mut self) -> Self { self.eof = true; self }
    pub fn with_whitespace_postfix(mut self) -> Self { self.whitespace_postfix = true; self }
    pub fn with_any_delimiter_postfix(mut self) -> Self { self.full_block_delimiter_postfix = true; self }
    pub fn with_delimiter(mut self, delimiter: char) -> Self { self.delimiter = Some(delimiter); self }
    pub fn with_optional_postfix(mut self, value: char) -> Self { self.optional_postfix.push(value); self }
}
