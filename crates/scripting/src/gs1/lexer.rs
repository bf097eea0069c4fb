//! GS1 Lexer and Tokenizer
//!
//! Lexical analysis for GS1 scripts. The lexer works on byte offsets so the
//! parser can rewind to a token start and re-read an argument as raw text.

use crate::error::{Result, ScriptError};

/// GS1 token types
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    Number(String),
    String(String),
    Identifier(String),

    // Keywords
    If,
    Else,
    While,
    For,
    Function,
    Return,
    Break,
    Continue,
    In,

    // Operators
    Plus,           // +
    Minus,          // -
    Star,           // *
    Slash,          // /
    Percent,        // %
    Caret,          // ^

    // Comparison
    Equal,          // ==
    NotEqual,       // !=
    Less,           // <
    Greater,        // >
    LessEqual,      // <= or =<
    GreaterEqual,   // >= or =>

    // Logical
    And,            // &&
    Or,             // ||
    Not,            // !

    // Assignment
    Assign,         // =
    PlusEqual,      // +=
    MinusEqual,     // -=
    StarEqual,      // *=
    SlashEqual,     // /=

    // Increment/Decrement
    Increment,      // ++
    Decrement,      // --

    // Delimiters
    LParen,         // (
    RParen,         // )
    LBrace,         // {
    RBrace,         // }
    LBracket,       // [
    RBracket,       // ]
    Semicolon,      // ;
    Comma,          // ,
    Dot,            // .
    Colon,          // :
    Question,       // ?

    /// `#`, only meaningful inside raw command arguments
    Hash,

    // End of file
    EOF,
}

/// GS1 lexer
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    line: usize,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer
    pub fn new(src: &'a str) -> Self {
        Self { src, pos: 0, line: 1 }
    }

    /// Current line (1-based)
    pub fn line(&self) -> usize {
        self.line
    }

    /// Current byte offset
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Rewind or skip to a byte offset previously returned by the lexer
    pub fn reset_to(&mut self, pos: usize, line: usize) {
        self.pos = pos.min(self.src.len());
        self.line = line;
    }

    /// Get the next token together with its start offset and line
    pub fn next_spanned(&mut self) -> Result<(Token, usize, usize)> {
        self.skip_trivia()?;
        let start = self.pos;
        let line = self.line;
        let token = self.next_token()?;
        Ok((token, start, line))
    }

    /// Get the next token
    pub fn next_token(&mut self) -> Result<Token> {
        self.skip_trivia()?;

        let ch = match self.ch() {
            None => return Ok(Token::EOF),
            Some(ch) => ch,
        };

        match ch {
            // Numbers, including `.5`
            '0'..='9' => Ok(self.read_number()),
            '.' if self.peek().map_or(false, |c| c.is_ascii_digit()) => Ok(self.read_number()),

            // Identifiers and keywords
            'a'..='z' | 'A'..='Z' | '_' => Ok(self.read_identifier()),

            // Strings
            '"' => self.read_string(),

            '+' => {
                self.advance();
                if self.eat('=') {
                    Ok(Token::PlusEqual)
                } else if self.eat('+') {
                    Ok(Token::Increment)
                } else {
                    Ok(Token::Plus)
                }
            }

            '-' => {
                self.advance();
                if self.eat('=') {
                    Ok(Token::MinusEqual)
                } else if self.eat('-') {
                    Ok(Token::Decrement)
                } else {
                    Ok(Token::Minus)
                }
            }

            '*' => {
                self.advance();
                if self.eat('=') {
                    Ok(Token::StarEqual)
                } else {
                    Ok(Token::Star)
                }
            }

            '/' => {
                self.advance();
                if self.eat('=') {
                    Ok(Token::SlashEqual)
                } else {
                    Ok(Token::Slash)
                }
            }

            '%' => { self.advance(); Ok(Token::Percent) }
            '^' => { self.advance(); Ok(Token::Caret) }

            '=' => {
                self.advance();
                if self.eat('=') {
                    Ok(Token::Equal)
                } else if self.eat('>') {
                    Ok(Token::GreaterEqual)
                } else if self.eat('<') {
                    Ok(Token::LessEqual)
                } else {
                    Ok(Token::Assign)
                }
            }

            '!' => {
                self.advance();
                if self.eat('=') {
                    Ok(Token::NotEqual)
                } else {
                    Ok(Token::Not)
                }
            }

            '<' => {
                self.advance();
                if self.eat('=') {
                    Ok(Token::LessEqual)
                } else {
                    Ok(Token::Less)
                }
            }

            '>' => {
                self.advance();
                if self.eat('=') {
                    Ok(Token::GreaterEqual)
                } else {
                    Ok(Token::Greater)
                }
            }

            '&' => {
                self.advance();
                self.eat('&');
                Ok(Token::And)
            }

            '|' => {
                self.advance();
                self.eat('|');
                Ok(Token::Or)
            }

            '(' => { self.advance(); Ok(Token::LParen) }
            ')' => { self.advance(); Ok(Token::RParen) }
            '{' => { self.advance(); Ok(Token::LBrace) }
            '}' => { self.advance(); Ok(Token::RBrace) }
            '[' => { self.advance(); Ok(Token::LBracket) }
            ']' => { self.advance(); Ok(Token::RBracket) }
            ';' => { self.advance(); Ok(Token::Semicolon) }
            ',' => { self.advance(); Ok(Token::Comma) }
            '.' => { self.advance(); Ok(Token::Dot) }
            ':' => { self.advance(); Ok(Token::Colon) }
            '?' => { self.advance(); Ok(Token::Question) }
            '#' => { self.advance(); Ok(Token::Hash) }

            _ => {
                let line = self.line;
                self.advance();
                Err(ScriptError::ParseError {
                    line,
                    message: format!("Unexpected character: {}", ch),
                })
            }
        }
    }

    /// Read a command argument as raw text
    ///
    /// Stops before a `,`, `;`, `)` or `}` that is not nested inside
    /// parentheses or quotes. Surrounding whitespace is trimmed.
    pub fn read_raw_argument(&mut self) -> String {
        let start = self.pos;
        let mut depth = 0usize;
        let mut in_string = false;

        while let Some(ch) = self.ch() {
            if in_string {
                if ch == '\\' {
                    self.advance();
                } else if ch == '"' {
                    in_string = false;
                }
                self.advance();
                continue;
            }

            match ch {
                '"' => in_string = true,
                '(' => depth += 1,
                ')' if depth > 0 => depth -= 1,
                ',' | ';' | ')' | '}' if depth == 0 => break,
                _ => {}
            }
            self.advance();
        }

        self.src[start..self.pos].trim().to_string()
    }

    /// Read a number literal, keeping its source text
    fn read_number(&mut self) -> Token {
        let start = self.pos;
        let mut seen_dot = false;

        while let Some(ch) = self.ch() {
            if ch.is_ascii_digit() {
                self.advance();
            } else if ch == '.' && !seen_dot && self.peek().map_or(true, |c| !c.is_ascii_alphabetic()) {
                seen_dot = true;
                self.advance();
            } else {
                break;
            }
        }

        Token::Number(self.src[start..self.pos].to_string())
    }

    /// Read an identifier or keyword
    fn read_identifier(&mut self) -> Token {
        let start = self.pos;

        while let Some(ch) = self.ch() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                self.advance();
            } else {
                break;
            }
        }

        let ident = &self.src[start..self.pos];
        match ident {
            "if" => Token::If,
            "else" => Token::Else,
            "while" => Token::While,
            "for" => Token::For,
            "function" => Token::Function,
            "return" => Token::Return,
            "break" => Token::Break,
            "continue" => Token::Continue,
            "in" => Token::In,
            _ => Token::Identifier(ident.to_string()),
        }
    }

    /// Read a string literal
    fn read_string(&mut self) -> Result<Token> {
        let line = self.line;
        self.advance(); // Skip opening quote

        let mut s = String::new();

        while let Some(ch) = self.ch() {
            if ch == '"' {
                self.advance();
                return Ok(Token::String(s));
            } else if ch == '\\' {
                self.advance();
                if let Some(escaped) = self.ch() {
                    match escaped {
                        'n' => s.push('\n'),
                        't' => s.push('\t'),
                        'r' => s.push('\r'),
                        _ => s.push(escaped),
                    }
                    self.advance();
                }
            } else {
                s.push(ch);
                self.advance();
            }
        }

        Err(ScriptError::Unterminated { what: "string", line })
    }

    /// Skip whitespace and comments
    fn skip_trivia(&mut self) -> Result<()> {
        loop {
            match self.ch() {
                Some(ch) if ch.is_whitespace() => self.advance(),
                Some('/') if self.peek() == Some('/') => {
                    while self.ch().map_or(false, |c| c != '\n') {
                        self.advance();
                    }
                }
                Some('/') if self.peek() == Some('*') => {
                    let line = self.line;
                    self.advance();
                    self.advance();
                    loop {
                        match self.ch() {
                            None => return Err(ScriptError::Unterminated { what: "comment", line }),
                            Some('*') if self.peek() == Some('/') => {
                                self.advance();
                                self.advance();
                                break;
                            }
                            Some(_) => self.advance(),
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn ch(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn peek(&self) -> Option<char> {
        let mut chars = self.src[self.pos..].chars();
        chars.next();
        chars.next()
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.ch() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Advance to the next character
    fn advance(&mut self) {
        if let Some(ch) = self.ch() {
            if ch == '\n' {
                self.line += 1;
            }
            self.pos += ch.len_utf8();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(src: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(src);
        let mut out = Vec::new();
        loop {
            let token = lexer.next_token().unwrap();
            if token == Token::EOF {
                return out;
            }
            out.push(token);
        }
    }

    #[test]
    fn test_numbers_keep_source_text() {
        assert_eq!(
            tokens("123 45.67 .5"),
            vec![
                Token::Number("123".into()),
                Token::Number("45.67".into()),
                Token::Number(".5".into()),
            ]
        );
    }

    #[test]
    fn test_keywords() {
        assert_eq!(
            tokens("if else while for function return break continue in"),
            vec![
                Token::If,
                Token::Else,
                Token::While,
                Token::For,
                Token::Function,
                Token::Return,
                Token::Break,
                Token::Continue,
                Token::In,
            ]
        );
    }

    #[test]
    fn test_legacy_comparison_operators() {
        assert_eq!(
            tokens("=> =< >= <= == ="),
            vec![
                Token::GreaterEqual,
                Token::LessEqual,
                Token::GreaterEqual,
                Token::LessEqual,
                Token::Equal,
                Token::Assign,
            ]
        );
    }

    #[test]
    fn test_comments_are_skipped() {
        let src = "a // line\n/* block\n comment */ b";
        assert_eq!(
            tokens(src),
            vec![Token::Identifier("a".into()), Token::Identifier("b".into())]
        );
    }

    #[test]
    fn test_line_tracking() {
        let mut lexer = Lexer::new("a\n\nb");
        lexer.next_token().unwrap();
        let (_, _, line) = lexer.next_spanned().unwrap();
        assert_eq!(line, 3);
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(
            tokens(r#""say \"hi\"""#),
            vec![Token::String("say \"hi\"".into())]
        );
    }

    #[test]
    fn test_unterminated_string() {
        let mut lexer = Lexer::new("\"abc");
        assert_eq!(
            lexer.next_token(),
            Err(ScriptError::Unterminated { what: "string", line: 1 })
        );
    }

    #[test]
    fn test_raw_argument() {
        let mut lexer = Lexer::new(" Hello #c(0), (a,b) ; rest");
        assert_eq!(lexer.read_raw_argument(), "Hello #c(0)");
        assert_eq!(lexer.next_token().unwrap(), Token::Comma);
        assert_eq!(lexer.read_raw_argument(), "(a,b)");
        assert_eq!(lexer.next_token().unwrap(), Token::Semicolon);
    }

    #[test]
    fn test_hash_token() {
        assert_eq!(tokens("#c"), vec![Token::Hash, Token::Identifier("c".into())]);
    }
}
