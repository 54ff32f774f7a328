use crate::error::DocumentError;
use crate::excerpt::Source;
use crate::token::Token;

/// Byte characters that make up an unquoted lexeme: letters, digits, `_`, `:`, `.`, and `-`
/// (the last so that negative integers/floats are scanned as a single run, per §4.1).
fn is_run_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'_' | b':' | b'.' | b'-')
}

/// A hand-written byte-level tokenizer. Implements [`Iterator`] so the token stream is produced
/// lazily, on demand, without materializing the full token list up front — the input may be
/// hundreds of megabytes of text.
pub struct Lexer<'s> {
    bytes: &'s [u8],
    pos: usize,
    line: usize,
    source: Source<'s>,
    done: bool,
}

impl<'s> Lexer<'s> {
    pub fn new(text: &'s str) -> Self {
        Lexer { bytes: text.as_bytes(), pos: 0, line: 1, source: Source::new(text), done: false }
    }

    fn skip_whitespace(&mut self) {
        while self.pos < self.bytes.len() {
            match self.bytes[self.pos] {
                b' ' | b'\t' | b'\r' => self.pos += 1,
                b'\n' => {
                    self.line += 1;
                    self.pos += 1;
                }
                _ => break,
            }
        }
    }

    fn lex_stuck(&self, offset: usize) -> DocumentError {
        DocumentError::LexStuck {
            offset,
            line: self.source.line_at(offset),
            excerpt: self.source.excerpt_at(offset),
        }
    }

    /// Scan a `"`-delimited string starting at `self.pos` (which points at the opening quote).
    /// `\"` is the only recognized escape; any other backslash is a literal character. Returns
    /// the token with surrounding quotes stripped (escape sequences are left untouched, per the
    /// "not preserved beyond stripping" rule).
    fn scan_quoted_string(&mut self, start_line: usize) -> Result<Token, DocumentError> {
        let open = self.pos;
        self.pos += 1;
        let content_start = self.pos;
        loop {
            if self.pos >= self.bytes.len() {
                return Err(self.lex_stuck(open));
            }
            match self.bytes[self.pos] {
                b'\\' if self.bytes.get(self.pos + 1) == Some(&b'"') => self.pos += 2,
                b'"' => break,
                b'\n' => {
                    self.line += 1;
                    self.pos += 1;
                }
                _ => self.pos += 1,
            }
        }
        let content_end = self.pos;
        self.pos += 1; // closing quote
        let content = std::str::from_utf8(&self.bytes[content_start..content_end])
            .expect("quoted content is a slice of a valid &str");
        Ok(Token::string(content.to_string(), start_line))
    }

    fn scan_run(&mut self, start_line: usize) -> Result<Token, DocumentError> {
        let start = self.pos;
        while self.pos < self.bytes.len() && is_run_byte(self.bytes[self.pos]) {
            self.pos += 1;
        }
        if self.pos == start {
            return Err(self.lex_stuck(start));
        }
        let text = std::str::from_utf8(&self.bytes[start..self.pos])
            .map_err(|_| self.lex_stuck(start))?;
        Ok(classify_run(text, start_line))
    }
}

/// Classify a scanned run of identifier characters as a float, integer, or plain string, per
/// §4.1: a decimal point present means attempt a float parse (float wins over integer); its
/// absence means attempt an integer parse; either falling through leaves it a string.
fn classify_run(text: &str, line: usize) -> Token {
    if text.contains('.') {
        if let Ok(value) = text.parse::<f64>() {
            return Token::float(value, line);
        }
    } else if let Ok(value) = text.parse::<i64>() {
        return Token::integer(value, line);
    }
    Token::string(text.to_string(), line)
}

impl<'s> Iterator for Lexer<'s> {
    type Item = Result<Token, DocumentError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        self.skip_whitespace();
        let start_line = self.line;

        if self.pos >= self.bytes.len() {
            self.done = true;
            return Some(Ok(Token::eof(start_line)));
        }

        use crate::token::TokenKind;
        let result = match self.bytes[self.pos] {
            b'{' => {
                self.pos += 1;
                Ok(Token::structural(TokenKind::BraceOpen, start_line))
            }
            b'}' => {
                self.pos += 1;
                Ok(Token::structural(TokenKind::BraceClose, start_line))
            }
            b'=' => {
                self.pos += 1;
                Ok(Token::structural(TokenKind::Equal, start_line))
            }
            b'"' => self.scan_quoted_string(start_line),
            _ => self.scan_run(start_line),
        };
        if result.is_err() {
            self.done = true;
        } else if let Ok(token) = &result {
            tracing::debug!(kind = ?token.kind, line = token.line, "token");
        }
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenKind;

    fn kinds(text: &str) -> Vec<TokenKind> {
        Lexer::new(text).map(|t| t.unwrap().kind).collect()
    }

    #[test]
    fn structural_tokens() {
        assert_eq!(
            kinds("{ } ="),
            vec![TokenKind::BraceOpen, TokenKind::BraceClose, TokenKind::Equal, TokenKind::Eof]
        );
    }

    #[test]
    fn negative_numbers() {
        let mut lexer = Lexer::new("-12 -3.5");
        let a = lexer.next().unwrap().unwrap();
        assert_eq!(a.as_integer(), Some(-12));
        let b = lexer.next().unwrap().unwrap();
        assert_eq!(b.as_float(), Some(-3.5));
    }

    #[test]
    fn trailing_garbage_stays_a_string() {
        let mut lexer = Lexer::new("123abc");
        let t = lexer.next().unwrap().unwrap();
        assert_eq!(t.kind, TokenKind::String);
        assert_eq!(t.as_str(), Some("123abc"));
    }

    #[test]
    fn quoted_string_strips_quotes() {
        let mut lexer = Lexer::new(r#""hello world""#);
        let t = lexer.next().unwrap().unwrap();
        assert_eq!(t.as_str(), Some("hello world"));
    }

    #[test]
    fn quoted_string_with_escaped_quote_and_newline_is_one_token() {
        let text = "\"qstr \\\"with\\\" escaped quotes and \nnewline\"";
        let mut lexer = Lexer::new(text);
        let t = lexer.next().unwrap().unwrap();
        assert_eq!(t.line, 1);
        assert_eq!(t.kind, TokenKind::String);
        let eof = lexer.next().unwrap().unwrap();
        assert_eq!(eof.kind, TokenKind::Eof);
    }

    #[test]
    fn empty_block_across_linebreak_tracks_line_numbers() {
        let lines: Vec<usize> = Lexer::new("empty_with_linebreak={\n}")
            .map(|t| t.unwrap().line)
            .collect();
        assert_eq!(lines, vec![1, 1, 1, 2, 2]);
    }

    #[test]
    fn lex_stuck_on_unterminated_quote() {
        let mut lexer = Lexer::new("\"unterminated");
        match lexer.next().unwrap() {
            Err(DocumentError::LexStuck { offset, .. }) => assert_eq!(offset, 0),
            other => panic!("expected LexStuck, got {:?}", other),
        }
    }

    #[test]
    fn eof_is_terminal() {
        let mut lexer = Lexer::new("a=1");
        let mut last = None;
        for item in &mut lexer {
            last = Some(item.unwrap());
        }
        assert_eq!(last.unwrap().kind, TokenKind::Eof);
        assert!(lexer.next().is_none());
    }
}
