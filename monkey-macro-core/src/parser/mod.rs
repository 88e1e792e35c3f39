pub mod error;
pub mod expressions;
pub mod statements;

use crate::lexer::{Token, TokenKind};
pub use error::ParseError;
use statements::parse_statement;

pub struct Parser<'a> {
    pub iter: std::iter::Peekable<crate::lexer::Tokenizer<'a>>,
    errors: Vec<ParseError>,
}

impl<'a> Parser<'a> {
    pub fn new(tokenizer: crate::lexer::Tokenizer<'a>) -> Self {
        let iter = tokenizer.peekable();
        Self {
            iter,
            errors: Vec::new(),
        }
    }

    pub(crate) fn parse_ident(&mut self) -> Result<std::rc::Rc<str>, ParseError> {
        let token = self.iter.next();
        match token {
            Some(Token {
                kind: TokenKind::Ident(name),
                ..
            }) => Ok(name),
            _ => Err(ParseError::unexpected_other(
                error::Expected::Identifier,
                token,
            )),
        }
    }

    pub(crate) fn expect_token(&mut self, token_kind: TokenKind) -> Result<(), ParseError> {
        let token = self.iter.next();
        match token {
            Some(Token { kind, .. }) if kind == token_kind => Ok(()),
            _ => Err(ParseError::unexpected_token(token_kind, token)),
        }
    }

    /// Consumes a `;` if it is the next token.
    pub(crate) fn skip_semicolon(&mut self) {
        self.iter.next_if(|token| token.kind == TokenKind::SemiColon);
    }

    /// Records `error` and skips the rest of the failed statement, up to and
    /// including the next `;` at the same brace depth. Inside a block the
    /// closing `}` is left for the block to consume.
    ///
    /// Returns true when the enclosing block is already over: the offending
    /// token was its `}`, or the input ran out.
    pub(crate) fn recover(&mut self, error: ParseError, in_block: bool) -> bool {
        let culprit = error.token().map(|token| token.kind.clone());
        self.errors.push(error);

        let mut depth = 0usize;
        match culprit {
            None => return in_block,
            Some(TokenKind::SemiColon) => return false,
            Some(TokenKind::RBrace) if in_block => return true,
            Some(TokenKind::LBrace) => depth = 1,
            Some(_) => {}
        }

        while let Some(token) = self.iter.peek() {
            match token.kind {
                TokenKind::SemiColon if depth == 0 => {
                    self.iter.next();
                    break;
                }
                TokenKind::RBrace if depth == 0 && in_block => break,
                TokenKind::RBrace => depth = depth.saturating_sub(1),
                TokenKind::LBrace => depth += 1,
                _ => {}
            }
            self.iter.next();
        }
        false
    }

    /// Parses the whole input. Errors do not stop the parse: the failed
    /// statement is skipped and parsing resumes, so every syntax error in the
    /// input is reported.
    pub fn parse_program(&mut self) -> Result<crate::ast::Program, Vec<ParseError>> {
        let mut statements = Vec::new();

        while self.iter.peek().is_some() {
            match parse_statement(self) {
                Ok(statement) => {
                    statements.push(statement);
                    self.skip_semicolon();
                }
                Err(err) => {
                    self.recover(err, false);
                }
            }
        }
        if self.errors.is_empty() {
            Ok(crate::ast::Program { statements })
        } else {
            Err(std::mem::take(&mut self.errors))
        }
    }
}

/// Lexes and parses `input` in one go.
pub fn parse(input: &str) -> Result<crate::ast::Program, Vec<ParseError>> {
    Parser::new(crate::lexer::Tokenizer::new(input)).parse_program()
}

#[cfg(test)]
mod tests {
    use super::error::Expected;
    use super::*;
    use crate::ast::{Expression, Statement};

    fn test_parsing(tests: Vec<(&str, &str)>) {
        for (input, expected) in tests {
            let program = parse(input).unwrap();

            assert_eq!(program.to_string(), expected)
        }
    }

    #[test]
    fn test_let_and_return_statements() {
        let tests = vec![
            ("let x = 5;", "let x = 5;\n"),
            ("let y = true;", "let y = true;\n"),
            ("let foobar = y;", "let foobar = y;\n"),
            ("return 5;", "return 5;\n"),
            ("return x + y", "return (x + y);\n"),
            ("let a = 1 let b = 2", "let a = 1;\nlet b = 2;\n"),
        ];

        test_parsing(tests)
    }

    #[test]
    fn test_literals() {
        let program = parse("foobar; 5; true; \"hello world\";").unwrap();
        assert_eq!(
            program.statements,
            vec![
                Statement::Expression(Expression::Identifier(crate::ast::Identifier::new(
                    "foobar"
                ))),
                Statement::Expression(Expression::IntegerLiteral(5)),
                Statement::Expression(Expression::BooleanLiteral(true)),
                Statement::Expression(Expression::StringLiteral("hello world".to_owned())),
            ]
        );
    }

    #[test]
    fn test_operator_precedence() {
        let tests = vec![
            ("-a * b", "((-a) * b);\n"),
            ("!-a", "(!(-a));\n"),
            ("a + b + c", "((a + b) + c);\n"),
            ("a + b - c", "((a + b) - c);\n"),
            ("a * b * c", "((a * b) * c);\n"),
            ("a * b / c", "((a * b) / c);\n"),
            ("a + b / c", "(a + (b / c));\n"),
            (
                "a + b * c + d / e - f",
                "(((a + (b * c)) + (d / e)) - f);\n",
            ),
            ("3 + 4; -5 * 5", "(3 + 4);\n((-5) * 5);\n"),
            ("5 > 4 == 3 < 4", "((5 > 4) == (3 < 4));\n"),
            ("5 < 4 != 3 > 4", "((5 < 4) != (3 > 4));\n"),
            (
                "3 + 4 * 5 == 3 * 1 + 4 * 5",
                "((3 + (4 * 5)) == ((3 * 1) + (4 * 5)));\n",
            ),
            ("true == !false", "(true == (!false));\n"),
            ("1 + (2 + 3) + 4", "((1 + (2 + 3)) + 4);\n"),
            ("(5 + 5) * 2", "((5 + 5) * 2);\n"),
            ("2 / (5 + 5)", "(2 / (5 + 5));\n"),
            ("-(5 + 5)", "(-(5 + 5));\n"),
            ("!(true == true)", "(!(true == true));\n"),
            (
                "a * [1, 2, 3, 4][b * c] * d",
                "((a * ([1, 2, 3, 4][(b * c)])) * d);\n",
            ),
            (
                "add(a * b[2], b[1], 2 * [1, 2][1])",
                "add((a * (b[2])), (b[1]), (2 * ([1, 2][1])));\n",
            ),
        ];

        test_parsing(tests)
    }

    #[test]
    fn test_call_expression() {
        let tests = vec![
            ("a + add(b * c) + d", "((a + add((b * c))) + d);\n"),
            (
                "add(a, b, 1, 2 * 3, 4 + 5, add(6, 7 * 8))",
                "add(a, b, 1, (2 * 3), (4 + 5), add(6, (7 * 8)));\n",
            ),
            (
                "add(a + b + c * d / f + g)",
                "add((((a + b) + ((c * d) / f)) + g));\n",
            ),
            ("fn(x) { x }(5)", "fn(x) {x;}(5);\n"),
            ("f()", "f();\n"),
        ];

        test_parsing(tests)
    }

    #[test]
    fn test_conditional() {
        let tests = vec![
            ("if (x < y) { x }", "if (x < y) {x;};\n"),
            (
                "if (x < y) { x } else { y }",
                "if (x < y) {x;} else {y;};\n",
            ),
            (
                "if (x) { let a = 1; a } else { }",
                "if x {let a = 1;a;} else {};\n",
            ),
        ];

        test_parsing(tests)
    }

    #[test]
    fn test_function() {
        let tests = vec![
            (
                "let getName = fn(person) { person[\"name\"]; };",
                "let getName = fn(person) {(person[\"name\"]);};\n",
            ),
            ("fn() {};", "fn() {};\n"),
            ("fn(x, y, z) { x };", "fn(x, y, z) {x;};\n"),
            (
                "fn(x) { fn(y) { x + y } }",
                "fn(x) {fn(y) {(x + y);};};\n",
            ),
        ];

        test_parsing(tests)
    }

    #[test]
    fn test_macro_literal() {
        let program = parse("macro(x, y) { x + y; }").unwrap();
        assert_eq!(
            program.statements,
            vec![Statement::Expression(Expression::MacroLiteral {
                parameters: vec![
                    crate::ast::Identifier::new("x"),
                    crate::ast::Identifier::new("y")
                ],
                body: crate::ast::BlockStatement {
                    statements: vec![Statement::Expression(Expression::InfixOperation(
                        crate::ast::InfixOperationKind::Plus,
                        Box::new(Expression::Identifier(crate::ast::Identifier::new("x"))),
                        Box::new(Expression::Identifier(crate::ast::Identifier::new("y"))),
                    ))]
                }
            })]
        );
        assert_eq!(program.to_string(), "macro(x, y) {(x + y);};\n");
    }

    #[test]
    fn test_collections() {
        let tests = vec![
            ("[]", "[];\n"),
            ("[1, 2 * 2, 3 + 3]", "[1, (2 * 2), (3 + 3)];\n"),
            ("myArray[1 + 1]", "(myArray[(1 + 1)]);\n"),
            ("{}", "{};\n"),
            (
                "{\"one\": 1, \"two\": 2, \"three\": 3}",
                "{\"one\": 1, \"two\": 2, \"three\": 3};\n",
            ),
            (
                "{\"one\": 0 + 1, \"two\": 10 - 8, true: 15 / 5}",
                "{\"one\": (0 + 1), \"two\": (10 - 8), true: (15 / 5)};\n",
            ),
        ];

        test_parsing(tests)
    }

    #[test]
    fn test_missing_assign_is_a_single_error() {
        let errors = parse("let x 5;").unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0],
            ParseError::UnexpectedToken {
                expected: Expected::Token(TokenKind::Assign),
                got: Token {
                    kind: TokenKind::Int("5".into()),
                    start: 6,
                    end: 7
                }
            }
        );
        assert_eq!(
            errors[0].to_string(),
            "expected next token to be =, got INT(5) instead"
        );
    }

    #[test]
    fn test_errors_are_accumulated() {
        let errors = parse("let = 10; let x 5; let 838383; 1 + 2;").unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(matches!(
            errors[0],
            ParseError::UnexpectedToken {
                expected: Expected::Identifier,
                ..
            }
        ));
        assert!(matches!(
            errors[2],
            ParseError::UnexpectedToken {
                expected: Expected::Identifier,
                ..
            }
        ));
    }

    #[test]
    fn test_recovery_stays_inside_blocks() {
        let errors = parse("let f = fn() { let x 5; x }; f()").unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].to_string(),
            "expected next token to be =, got INT(5) instead"
        );

        let errors =
            parse("if (true) { let a 1; if (false) { let = 2; } b }; let c 3;").unwrap_err();
        assert_eq!(errors.len(), 3);

        let errors = parse("fn() { let x = }; 1 + ;").unwrap_err();
        let messages: Vec<_> = errors.iter().map(|err| err.to_string()).collect();
        assert_eq!(
            messages,
            vec![
                "no prefix parse function for } found",
                "no prefix parse function for ; found",
            ]
        );

        let errors = parse("fn() { let x").unwrap_err();
        assert_eq!(
            errors,
            vec![ParseError::PrematureEndOfInput {
                expected: Expected::Token(TokenKind::Assign)
            }]
        );
    }

    #[test]
    fn test_recovery_at_semicolon_keeps_next_statement() {
        let errors = parse("let x = ; let y 5;").unwrap_err();
        let messages: Vec<_> = errors.iter().map(|err| err.to_string()).collect();
        assert_eq!(
            messages,
            vec![
                "no prefix parse function for ; found",
                "expected next token to be =, got INT(5) instead",
            ]
        );

        // A skipped statement's own braces do not end the skip early.
        let errors = parse("let = fn() { 1; 2 }; let y 5;").unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_no_prefix_function() {
        let errors = parse("5 + @;").unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].to_string(),
            "no prefix parse function for ILLEGAL(@) found"
        );

        let errors = parse("let x = ;").unwrap_err();
        assert_eq!(
            errors[0].to_string(),
            "no prefix parse function for ; found"
        );
    }

    #[test]
    fn test_premature_end() {
        let errors = parse("add(1, 2").unwrap_err();
        assert_eq!(
            errors,
            vec![ParseError::PrematureEndOfInput {
                expected: Expected::Token(TokenKind::RParen)
            }]
        );
    }

    #[test]
    fn test_integer_overflow() {
        let errors = parse("99999999999999999999").unwrap_err();
        assert!(matches!(errors[0], ParseError::InvalidInteger { .. }));
    }
}
