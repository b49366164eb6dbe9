//! Literal scanning for the lexer

use crate::diagnostic::codes;
use crate::lexer::Lexer;
use crate::token::{Token, TokenKind};

impl Lexer {
    /// Scan a string literal; the opening quote has been consumed
    pub(super) fn string(&mut self) -> Token {
        let mut value = String::new();
        let mut error_token = None;

        while !self.is_at_end() && self.peek() != '"' {
            if self.peek() == '\\' {
                self.advance();
                if self.is_at_end() {
                    return self.error_token(codes::UNTERMINATED_STRING, "Unterminated string literal");
                }

                let escape_char = self.advance();
                let escaped = match escape_char {
                    'n' => '\n',
                    'r' => '\r',
                    't' => '\t',
                    '\\' => '\\',
                    '"' => '"',
                    _ => {
                        // keep scanning to the closing quote, report the first bad escape
                        if error_token.is_none() {
                            error_token = Some(self.error_token(
                                codes::INVALID_ESCAPE,
                                &format!("Invalid escape sequence '\\{}'", escape_char),
                            ));
                        }
                        continue;
                    }
                };
                value.push(escaped);
            } else {
                value.push(self.advance());
            }
        }

        if self.is_at_end() {
            return self.error_token(codes::UNTERMINATED_STRING, "Unterminated string literal");
        }

        self.advance(); // closing "

        match error_token {
            Some(err) => err,
            None => self.make_token(TokenKind::String, &value),
        }
    }

    /// Scan a number literal (integer, decimal, or scientific notation)
    pub(super) fn number(&mut self) -> Token {
        let start = self.current - 1;

        while self.peek().is_ascii_digit() {
            self.advance();
        }

        if self.peek() == '.' && self.peek_next().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        if self.peek() == 'e' || self.peek() == 'E' {
            self.advance();
            if self.peek() == '+' || self.peek() == '-' {
                self.advance();
            }
            if !self.peek().is_ascii_digit() {
                return self.error_token(
                    codes::UNEXPECTED_CHAR,
                    "Invalid number: exponent requires digits",
                );
            }
            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        let lexeme: String = self.chars[start..self.current].iter().collect();
        self.make_token(TokenKind::Number, &lexeme)
    }

    /// Scan an identifier or keyword
    pub(super) fn identifier(&mut self) -> Token {
        let start = self.current - 1;

        while !self.is_at_end() && (self.peek().is_alphanumeric() || self.peek() == '_') {
            self.advance();
        }

        let lexeme: String = self.chars[start..self.current].iter().collect();
        let kind = TokenKind::is_keyword(&lexeme).unwrap_or(TokenKind::Identifier);

        self.make_token(kind, &lexeme)
    }
}

#[cfg(test)]
mod tests {
    use crate::diagnostic::codes;
    use crate::lexer::Lexer;
    use crate::token::TokenKind;
    use rstest::rstest;

    #[rstest]
    #[case("42", "42")]
    #[case("3.14", "3.14")]
    #[case("1e3", "1e3")]
    #[case("2.5E-2", "2.5E-2")]
    fn test_numbers(#[case] source: &str, #[case] lexeme: &str) {
        let (tokens, diagnostics) = Lexer::new(source).tokenize();
        assert!(diagnostics.is_empty());
        assert_eq!(tokens[0].kind, TokenKind::Number);
        assert_eq!(tokens[0].lexeme, lexeme);
    }

    #[test]
    fn test_trailing_dot_is_not_consumed() {
        let (tokens, diagnostics) = Lexer::new("1.").tokenize();
        assert_eq!(tokens[0].lexeme, "1");
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn test_string_escapes() {
        let (tokens, diagnostics) = Lexer::new(r#""a\n\t\"b\\""#).tokenize();
        assert!(diagnostics.is_empty());
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].lexeme, "a\n\t\"b\\");
    }

    #[test]
    fn test_unterminated_string() {
        let (tokens, diagnostics) = Lexer::new("\"open").tokenize();
        assert_eq!(tokens[0].kind, TokenKind::Error);
        assert_eq!(diagnostics[0].code, codes::UNTERMINATED_STRING);
    }

    #[test]
    fn test_invalid_escape_reported_once() {
        let (tokens, diagnostics) = Lexer::new(r#""\q\z" 1"#).tokenize();
        assert_eq!(tokens[0].kind, TokenKind::Error);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, codes::INVALID_ESCAPE);
        assert_eq!(tokens[1].kind, TokenKind::Number);
    }

    #[test]
    fn test_exponent_without_digits() {
        let (_, diagnostics) = Lexer::new("1e+").tokenize();
        assert_eq!(diagnostics.len(), 1);
    }
}
