use std::fmt::Display;
use std::rc::Rc;

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum TokenKind {
    Illegal(Rc<str>),
    Ident(Rc<str>),
    Int(Rc<str>),
    String(Rc<str>),

    // Operators
    Assign,
    Plus,
    Minus,
    Bang,
    Asterisk,
    Slash,

    Equal,
    NotEqual,

    GreaterThan,
    LessThan,

    Comma,
    Colon,
    SemiColon,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,

    // Keywords
    Function,
    Macro,
    Let,
    True,
    False,
    If,
    Else,
    Return,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

fn keywords(ident: &str) -> Option<TokenKind> {
    match ident {
        "fn" => Some(TokenKind::Function),
        "macro" => Some(TokenKind::Macro),
        "let" => Some(TokenKind::Let),
        "true" => Some(TokenKind::True),
        "false" => Some(TokenKind::False),
        "if" => Some(TokenKind::If),
        "else" => Some(TokenKind::Else),
        "return" => Some(TokenKind::Return),
        _ => None,
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use TokenKind::*;
        match self {
            Illegal(val) => write!(f, "ILLEGAL({})", val),
            Ident(val) => write!(f, "IDENT({})", val),
            Int(val) => write!(f, "INT({})", val),
            String(val) => write!(f, "STRING({})", val),
            Assign => write!(f, "="),
            Plus => write!(f, "+"),
            Minus => write!(f, "-"),
            Bang => write!(f, "!"),
            Asterisk => write!(f, "*"),
            Slash => write!(f, "/"),
            Equal => write!(f, "=="),
            NotEqual => write!(f, "!="),
            GreaterThan => write!(f, ">"),
            LessThan => write!(f, "<"),
            Comma => write!(f, ","),
            Colon => write!(f, ":"),
            SemiColon => write!(f, ";"),
            LParen => write!(f, "("),
            RParen => write!(f, ")"),
            LBrace => write!(f, "{{"),
            RBrace => write!(f, "}}"),
            LBracket => write!(f, "["),
            RBracket => write!(f, "]"),
            Function => write!(f, "fn"),
            Macro => write!(f, "macro"),
            Let => write!(f, "let"),
            True => write!(f, "true"),
            False => write!(f, "false"),
            If => write!(f, "if"),
            Else => write!(f, "else"),
            Return => write!(f, "return"),
        }
    }
}

/// Splits source text into tokens. The iterator ends (`None`) at end of input;
/// it never fails, unknown characters come out as [`TokenKind::Illegal`].
#[derive(Clone)]
pub struct Tokenizer<'a> {
    input: &'a str,
    iter: std::iter::Peekable<std::str::CharIndices<'a>>,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        let iter = input.char_indices().peekable();
        Self { input, iter }
    }

    fn is_letter(ch: char) -> bool {
        ch.is_ascii_alphabetic() || ch == '_'
    }

    fn read_identifier(&mut self, start: usize) -> Token {
        while self
            .iter
            .next_if(|(_, ch)| Self::is_letter(*ch) || ch.is_ascii_digit())
            .is_some()
        {}

        let end = self.next_idx();
        let ident = &self.input[start..end];
        Token {
            kind: keywords(ident).unwrap_or_else(|| TokenKind::Ident(ident.into())),
            start,
            end,
        }
    }

    fn read_number(&mut self, start: usize) -> Token {
        while self.iter.next_if(|(_, ch)| ch.is_ascii_digit()).is_some() {}

        let end = self.next_idx();
        let ident = &self.input[start..end];

        Token {
            kind: TokenKind::Int(ident.into()),
            start,
            end,
        }
    }

    fn read_string(&mut self, start: usize) -> Token {
        let content_start = start + 1;
        let content_end = loop {
            match self.iter.next() {
                Some((idx, '"')) => break idx,
                None => {
                    return Token {
                        kind: TokenKind::Illegal("unterminated string".into()),
                        start,
                        end: self.next_idx(),
                    }
                }
                _ => {}
            }
        };

        Token {
            kind: TokenKind::String(self.input[content_start..content_end].into()),
            start,
            end: self.next_idx(),
        }
    }

    fn next_idx(&mut self) -> usize {
        self.iter
            .peek()
            .map(|(idx, _)| *idx)
            .unwrap_or(self.input.len())
    }

    fn single(&mut self, kind: TokenKind, start: usize) -> Token {
        Token {
            kind,
            start,
            end: self.next_idx(),
        }
    }

    /// Emits `double` if the next char is `second`, `single` otherwise.
    fn one_or_two(
        &mut self,
        start: usize,
        second: char,
        double: TokenKind,
        single: TokenKind,
    ) -> Token {
        if self.iter.next_if(|(_, ch)| *ch == second).is_some() {
            self.single(double, start)
        } else {
            self.single(single, start)
        }
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        while self.iter.next_if(|(_, ch)| ch.is_whitespace()).is_some() {}

        let (idx, ch) = self.iter.next()?;
        let tok = match ch {
            '=' => self.one_or_two(idx, '=', TokenKind::Equal, TokenKind::Assign),
            '!' => self.one_or_two(idx, '=', TokenKind::NotEqual, TokenKind::Bang),
            '+' => self.single(TokenKind::Plus, idx),
            '-' => self.single(TokenKind::Minus, idx),
            '*' => self.single(TokenKind::Asterisk, idx),
            '/' => self.single(TokenKind::Slash, idx),
            '<' => self.single(TokenKind::LessThan, idx),
            '>' => self.single(TokenKind::GreaterThan, idx),
            ',' => self.single(TokenKind::Comma, idx),
            ':' => self.single(TokenKind::Colon, idx),
            ';' => self.single(TokenKind::SemiColon, idx),
            '(' => self.single(TokenKind::LParen, idx),
            ')' => self.single(TokenKind::RParen, idx),
            '{' => self.single(TokenKind::LBrace, idx),
            '}' => self.single(TokenKind::RBrace, idx),
            '[' => self.single(TokenKind::LBracket, idx),
            ']' => self.single(TokenKind::RBracket, idx),
            '"' => self.read_string(idx),
            c if Tokenizer::is_letter(c) => self.read_identifier(idx),
            c if c.is_ascii_digit() => self.read_number(idx),
            _ => self.single(TokenKind::Illegal(ch.to_string().into()), idx),
        };
        Some(tok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        Tokenizer::new(input).map(|token| token.kind).collect()
    }

    #[test]
    fn test_delimiters_with_spans() {
        let input = "=+(){},;";
        let output = Tokenizer::new(input).collect::<Vec<_>>();

        let expected = [
            TokenKind::Assign,
            TokenKind::Plus,
            TokenKind::LParen,
            TokenKind::RParen,
            TokenKind::LBrace,
            TokenKind::RBrace,
            TokenKind::Comma,
            TokenKind::SemiColon,
        ];
        assert_eq!(output.len(), expected.len());
        for (i, (token, kind)) in output.into_iter().zip(expected).enumerate() {
            assert_eq!(
                token,
                Token {
                    kind,
                    start: i,
                    end: i + 1
                }
            );
        }
    }

    #[test]
    fn test_program() {
        let input = "let five = 5;
    let ten = 10;
    let add = fn(x, y) {
    x + y;
    };
    let result = add(five, ten);
    ";
        let expected_output = vec![
            TokenKind::Let,
            TokenKind::Ident("five".into()),
            TokenKind::Assign,
            TokenKind::Int("5".into()),
            TokenKind::SemiColon,
            TokenKind::Let,
            TokenKind::Ident("ten".into()),
            TokenKind::Assign,
            TokenKind::Int("10".into()),
            TokenKind::SemiColon,
            TokenKind::Let,
            TokenKind::Ident("add".into()),
            TokenKind::Assign,
            TokenKind::Function,
            TokenKind::LParen,
            TokenKind::Ident("x".into()),
            TokenKind::Comma,
            TokenKind::Ident("y".into()),
            TokenKind::RParen,
            TokenKind::LBrace,
            TokenKind::Ident("x".into()),
            TokenKind::Plus,
            TokenKind::Ident("y".into()),
            TokenKind::SemiColon,
            TokenKind::RBrace,
            TokenKind::SemiColon,
            TokenKind::Let,
            TokenKind::Ident("result".into()),
            TokenKind::Assign,
            TokenKind::Ident("add".into()),
            TokenKind::LParen,
            TokenKind::Ident("five".into()),
            TokenKind::Comma,
            TokenKind::Ident("ten".into()),
            TokenKind::RParen,
            TokenKind::SemiColon,
        ];

        assert_eq!(kinds(input), expected_output)
    }

    #[test]
    fn test_operators() {
        let input = "
    !-/*5;
    5 < 10 > 5;
    10 == 10;
    10 != 9;
    ";

        let expected_output = vec![
            TokenKind::Bang,
            TokenKind::Minus,
            TokenKind::Slash,
            TokenKind::Asterisk,
            TokenKind::Int("5".into()),
            TokenKind::SemiColon,
            TokenKind::Int("5".into()),
            TokenKind::LessThan,
            TokenKind::Int("10".into()),
            TokenKind::GreaterThan,
            TokenKind::Int("5".into()),
            TokenKind::SemiColon,
            TokenKind::Int("10".into()),
            TokenKind::Equal,
            TokenKind::Int("10".into()),
            TokenKind::SemiColon,
            TokenKind::Int("10".into()),
            TokenKind::NotEqual,
            TokenKind::Int("9".into()),
            TokenKind::SemiColon,
        ];

        assert_eq!(kinds(input), expected_output)
    }

    #[test]
    fn test_keywords() {
        let input = "if (5 < 10) {
    return true;
    } else {
    return false;
    }
    macro(x, y) { x + y; };";

        let expected_output = vec![
            TokenKind::If,
            TokenKind::LParen,
            TokenKind::Int("5".into()),
            TokenKind::LessThan,
            TokenKind::Int("10".into()),
            TokenKind::RParen,
            TokenKind::LBrace,
            TokenKind::Return,
            TokenKind::True,
            TokenKind::SemiColon,
            TokenKind::RBrace,
            TokenKind::Else,
            TokenKind::LBrace,
            TokenKind::Return,
            TokenKind::False,
            TokenKind::SemiColon,
            TokenKind::RBrace,
            TokenKind::Macro,
            TokenKind::LParen,
            TokenKind::Ident("x".into()),
            TokenKind::Comma,
            TokenKind::Ident("y".into()),
            TokenKind::RParen,
            TokenKind::LBrace,
            TokenKind::Ident("x".into()),
            TokenKind::Plus,
            TokenKind::Ident("y".into()),
            TokenKind::SemiColon,
            TokenKind::RBrace,
            TokenKind::SemiColon,
        ];

        assert_eq!(kinds(input), expected_output)
    }

    #[test]
    fn test_strings_and_collections() {
        let input = r#""foobar" "foo bar" [1, 2]; {"foo": "bar"}"#;
        let expected_output = vec![
            TokenKind::String("foobar".into()),
            TokenKind::String("foo bar".into()),
            TokenKind::LBracket,
            TokenKind::Int("1".into()),
            TokenKind::Comma,
            TokenKind::Int("2".into()),
            TokenKind::RBracket,
            TokenKind::SemiColon,
            TokenKind::LBrace,
            TokenKind::String("foo".into()),
            TokenKind::Colon,
            TokenKind::String("bar".into()),
            TokenKind::RBrace,
        ];

        assert_eq!(kinds(input), expected_output)
    }

    #[test]
    fn test_identifiers_with_digits() {
        assert_eq!(
            kinds("add_2 x1y"),
            vec![TokenKind::Ident("add_2".into()), TokenKind::Ident("x1y".into())]
        );
        assert_eq!(
            kinds("1x"),
            vec![TokenKind::Int("1".into()), TokenKind::Ident("x".into())]
        );
    }

    #[test]
    fn test_illegal() {
        assert_eq!(
            kinds("5 @ 3"),
            vec![
                TokenKind::Int("5".into()),
                TokenKind::Illegal("@".into()),
                TokenKind::Int("3".into()),
            ]
        );

        let unterminated = Tokenizer::new("\"abc").collect::<Vec<_>>();
        assert_eq!(
            unterminated,
            vec![Token {
                kind: TokenKind::Illegal("unterminated string".into()),
                start: 0,
                end: 4,
            }]
        );
    }

    #[test]
    fn test_string_span_includes_quotes() {
        let tokens = Tokenizer::new(" \"ab\" ").collect::<Vec<_>>();
        assert_eq!(
            tokens,
            vec![Token {
                kind: TokenKind::String("ab".into()),
                start: 1,
                end: 5,
            }]
        );
    }
}
