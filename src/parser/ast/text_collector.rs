use crate::parser::{ParseError, QueryParser};

pub struct TextCollector;

/// Tells the collector to stop at the given position (only asked at paren depth 0, outside quotes).
pub type Boundary = dyn Fn(&QueryParser, usize) -> bool;

impl TextCollector {
    pub fn is_word_char(ch: char) -> bool {
        ch.is_alphanumeric() || ch == '_' || ch == '$'
    }

    /// Collects an identifier. Empty when the cursor is not on one.
    pub fn collect_word(parser: &mut QueryParser) -> String {
        let pivot = parser.position;
        while !parser.eof() && Self::is_word_char(parser.current()) {
            parser.next();
        }
        parser.text_from_pivot(pivot)
    }

    /// Collects an alias after `AS`: a quoted string or a run of word characters.
    /// Returns the alias without its quotes.
    pub fn collect_alias(parser: &mut QueryParser) -> Result<String, ParseError> {
        let pivot = parser.position;
        let current = parser.current();

        if current == '\'' || current == '"' {
            Self::skip_quoted(parser)?;
            let quoted = parser.text_from_pivot(pivot);
            let inner: String = quoted.chars().skip(1).take(quoted.chars().count() - 2).collect();
            return Ok(inner.replace(&format!("{current}{current}"), &current.to_string()));
        }

        while !parser.eof() {
            let current = parser.current();
            if !Self::is_word_char(current) && current != '(' && current != ')' && current != '（' && current != '）' {
                break;
            }
            parser.next();
        }

        let alias = parser.text_from_pivot(pivot);
        if alias.is_empty() {
            return ParseError::new("Invalid alias", pivot, parser).err();
        }

        Ok(alias)
    }

    /// Moves past a quoted literal starting at the cursor. Both backslash
    /// escapes and doubled quotes are honoured.
    pub fn skip_quoted(parser: &mut QueryParser) -> Result<(), ParseError> {
        let pivot = parser.position;
        let quote = parser.current();
        parser.next();

        loop {
            if parser.eof() {
                return ParseError::new("Unterminated quote", pivot, parser).err();
            }

            let current = parser.current();
            if current == '\\' {
                parser.jump(2);
                continue;
            }

            parser.next();
            if current == quote {
                if parser.current() == quote {
                    parser.next();
                    continue;
                }
                return Ok(());
            }
        }
    }

    /// Collects raw text up to the boundary, keeping quoted literals and
    /// parenthesised groups intact. The result is trimmed.
    pub fn collect_until(parser: &mut QueryParser, boundary: &Boundary) -> Result<String, ParseError> {
        let pivot = parser.position;
        let mut depth = 0usize;
        let mut open_at = pivot;

        while !parser.eof() {
            let current = parser.current();

            if current == '\'' || current == '"' {
                Self::skip_quoted(parser)?;
                continue;
            }

            if current == '(' {
                if depth == 0 {
                    open_at = parser.position;
                }
                depth += 1;
            } else if current == ')' {
                if depth == 0 {
                    return ParseError::new("Unbalanced parentheses", parser.position, parser).err();
                }
                depth -= 1;
            } else if depth == 0 && boundary(parser, parser.position) {
                break;
            }

            parser.next();
        }

        if depth > 0 {
            return ParseError::new("Unbalanced parentheses", open_at, parser).err();
        }

        Ok(parser.text_from_pivot(pivot).trim().to_string())
    }
}
