use crate::ast::{Expression, Identifier, LetStatement, ReturnStatement, Statement};
use crate::lexer::TokenKind;
use crate::parser::expressions::{parse_expression, Precedence};
use crate::parser::{ParseError, Parser};

/// Dispatches on the leading keyword. Anything that is not `let` or `return`
/// is an expression statement. A trailing `;` is left for the caller.
pub fn parse_statement(parser: &mut Parser) -> Result<Statement, ParseError> {
    match parser.iter.peek().map(|token| &token.kind) {
        Some(TokenKind::Let) => parse_let_statement(parser).map(Statement::Let),
        Some(TokenKind::Return) => parse_return_statement(parser).map(Statement::Return),
        _ => parse_value(parser).map(Statement::Expression),
    }
}

fn parse_let_statement(parser: &mut Parser) -> Result<LetStatement, ParseError> {
    parser.expect_token(TokenKind::Let)?;
    let identifier = Identifier {
        name: parser.parse_ident()?,
    };
    parser.expect_token(TokenKind::Assign)?;

    Ok(LetStatement {
        identifier,
        value: parse_value(parser)?,
    })
}

fn parse_return_statement(parser: &mut Parser) -> Result<ReturnStatement, ParseError> {
    parser.expect_token(TokenKind::Return)?;

    Ok(ReturnStatement {
        value: parse_value(parser)?,
    })
}

fn parse_value(parser: &mut Parser) -> Result<Expression, ParseError> {
    parse_expression(parser, Precedence::Lowest)
}
