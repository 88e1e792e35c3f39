//! Whole-tree, post-order AST rewriting.
//!
//! [`modify`] first rewrites every child of a node, then hands the rebuilt
//! node to the modifier and returns whatever it produces. A modifier that
//! wants to leave a node alone returns it unchanged.
//!
//! The arguments of a `quote(...)` call are code rather than expressions, so
//! the rewrite does not enter them; the modifier still sees the call itself.

use thiserror::Error;

use crate::ast::{
    BlockStatement, Expression, Identifier, LetStatement, Node, NodeKind, Program,
    ReturnStatement, Statement,
};

#[derive(Debug, PartialEq, Clone, Error)]
pub enum ModifyError {
    #[error("cannot replace a {expected} with a {got}")]
    CategoryMismatch { expected: NodeKind, got: NodeKind },
}

pub fn modify<E, F>(node: Node, modifier: &mut F) -> Result<Node, E>
where
    F: FnMut(Node) -> Result<Node, E>,
    E: From<ModifyError>,
{
    let node = match node {
        Node::Program(program) => Node::Program(Program {
            statements: modify_statements(program.statements, modifier)?,
        }),
        Node::Statement(statement) => Node::Statement(modify_statement(statement, modifier)?),
        Node::Expression(expression) => {
            Node::Expression(modify_expression(expression, modifier)?)
        }
        Node::Block(block) => Node::Block(BlockStatement {
            statements: modify_statements(block.statements, modifier)?,
        }),
        Node::Identifier(identifier) => Node::Identifier(identifier),
    };

    modifier(node)
}

fn mismatch(expected: NodeKind, got: &Node) -> ModifyError {
    ModifyError::CategoryMismatch {
        expected,
        got: got.kind(),
    }
}

fn modify_statement<E, F>(statement: Statement, modifier: &mut F) -> Result<Statement, E>
where
    F: FnMut(Node) -> Result<Node, E>,
    E: From<ModifyError>,
{
    Ok(match statement {
        Statement::Let(LetStatement { identifier, value }) => Statement::Let(LetStatement {
            identifier,
            value: rewrite_expression(value, modifier)?,
        }),
        Statement::Return(ReturnStatement { value }) => Statement::Return(ReturnStatement {
            value: rewrite_expression(value, modifier)?,
        }),
        Statement::Expression(expression) => {
            Statement::Expression(rewrite_expression(expression, modifier)?)
        }
    })
}

fn modify_expression<E, F>(expression: Expression, modifier: &mut F) -> Result<Expression, E>
where
    F: FnMut(Node) -> Result<Node, E>,
    E: From<ModifyError>,
{
    use Expression::*;

    Ok(match expression {
        Identifier(_) | IntegerLiteral(_) | StringLiteral(_) | BooleanLiteral(_) => expression,
        ArrayLiteral(elements) => ArrayLiteral(rewrite_expressions(elements, modifier)?),
        HashLiteral(pairs) => {
            let mut new_pairs = Vec::with_capacity(pairs.len());
            for (key, value) in pairs {
                let key = rewrite_expression(key, modifier)?;
                let value = rewrite_expression(value, modifier)?;
                new_pairs.push((key, value));
            }
            HashLiteral(new_pairs)
        }
        PrefixOperation(kind, right) => {
            PrefixOperation(kind, Box::new(rewrite_expression(*right, modifier)?))
        }
        InfixOperation(kind, left, right) => InfixOperation(
            kind,
            Box::new(rewrite_expression(*left, modifier)?),
            Box::new(rewrite_expression(*right, modifier)?),
        ),
        IfExpression {
            condition,
            consequence,
            alternative,
        } => IfExpression {
            condition: Box::new(rewrite_expression(*condition, modifier)?),
            consequence: rewrite_block(consequence, modifier)?,
            alternative: alternative
                .map(|alternative| rewrite_block(alternative, modifier))
                .transpose()?,
        },
        FunctionLiteral { parameters, body } => FunctionLiteral {
            parameters: rewrite_identifiers(parameters, modifier)?,
            body: rewrite_block(body, modifier)?,
        },
        MacroLiteral { parameters, body } => MacroLiteral {
            parameters: rewrite_identifiers(parameters, modifier)?,
            body: rewrite_block(body, modifier)?,
        },
        CallExpression {
            function,
            arguments,
        } if is_quote(&function) => CallExpression {
            function,
            arguments,
        },
        CallExpression {
            function,
            arguments,
        } => CallExpression {
            function: Box::new(rewrite_expression(*function, modifier)?),
            arguments: rewrite_expressions(arguments, modifier)?,
        },
        IndexExpression { left, index } => IndexExpression {
            left: Box::new(rewrite_expression(*left, modifier)?),
            index: Box::new(rewrite_expression(*index, modifier)?),
        },
    })
}

fn is_quote(function: &Expression) -> bool {
    matches!(function, Expression::Identifier(identifier) if identifier.name.as_ref() == "quote")
}

fn modify_statements<E, F>(statements: Vec<Statement>, modifier: &mut F) -> Result<Vec<Statement>, E>
where
    F: FnMut(Node) -> Result<Node, E>,
    E: From<ModifyError>,
{
    statements
        .into_iter()
        .map(|statement| match modify(Node::Statement(statement), modifier)? {
            Node::Statement(statement) => Ok(statement),
            other => Err(mismatch(NodeKind::Statement, &other).into()),
        })
        .collect()
}

fn rewrite_expression<E, F>(expression: Expression, modifier: &mut F) -> Result<Expression, E>
where
    F: FnMut(Node) -> Result<Node, E>,
    E: From<ModifyError>,
{
    match modify(Node::Expression(expression), modifier)? {
        Node::Expression(expression) => Ok(expression),
        other => Err(mismatch(NodeKind::Expression, &other).into()),
    }
}

fn rewrite_expressions<E, F>(
    expressions: Vec<Expression>,
    modifier: &mut F,
) -> Result<Vec<Expression>, E>
where
    F: FnMut(Node) -> Result<Node, E>,
    E: From<ModifyError>,
{
    expressions
        .into_iter()
        .map(|expression| rewrite_expression(expression, modifier))
        .collect()
}

fn rewrite_block<E, F>(block: BlockStatement, modifier: &mut F) -> Result<BlockStatement, E>
where
    F: FnMut(Node) -> Result<Node, E>,
    E: From<ModifyError>,
{
    match modify(Node::Block(block), modifier)? {
        Node::Block(block) => Ok(block),
        other => Err(mismatch(NodeKind::Block, &other).into()),
    }
}

fn rewrite_identifiers<E, F>(
    identifiers: Vec<Identifier>,
    modifier: &mut F,
) -> Result<Vec<Identifier>, E>
where
    F: FnMut(Node) -> Result<Node, E>,
    E: From<ModifyError>,
{
    identifiers
        .into_iter()
        .map(
            |identifier| match modify(Node::Identifier(identifier), modifier)? {
                Node::Identifier(identifier) => Ok(identifier),
                other => Err(mismatch(NodeKind::Identifier, &other).into()),
            },
        )
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::InfixOperationKind;
    use crate::parser::parse;

    fn one() -> Expression {
        Expression::IntegerLiteral(1)
    }

    fn two() -> Expression {
        Expression::IntegerLiteral(2)
    }

    /// Turns every `1` into a `2`.
    fn turn_one_into_two(node: Node) -> Result<Node, ModifyError> {
        match node {
            Node::Expression(Expression::IntegerLiteral(1)) => {
                Ok(Node::Expression(Expression::IntegerLiteral(2)))
            }
            node => Ok(node),
        }
    }

    fn rewrite(input: &str) -> String {
        let program = parse(input).unwrap();
        modify(Node::Program(program), &mut turn_one_into_two)
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_modify_single_nodes() {
        assert_eq!(
            modify(Node::Expression(one()), &mut turn_one_into_two),
            Ok(Node::Expression(two()))
        );
        assert_eq!(
            modify(
                Node::Expression(Expression::InfixOperation(
                    InfixOperationKind::Plus,
                    Box::new(one()),
                    Box::new(two())
                )),
                &mut turn_one_into_two
            ),
            Ok(Node::Expression(Expression::InfixOperation(
                InfixOperationKind::Plus,
                Box::new(two()),
                Box::new(two())
            )))
        );
        assert_eq!(
            modify(Node::Statement(Statement::Expression(one())), &mut turn_one_into_two),
            Ok(Node::Statement(Statement::Expression(two())))
        );
    }

    #[test]
    fn test_modify_every_child_position() {
        let tests = vec![
            ("1 + 1", "(2 + 2);\n"),
            ("-1", "(-2);\n"),
            ("1[1]", "(2[2]);\n"),
            (
                "if (1) { 1 } else { 1 }",
                "if 2 {2;} else {2;};\n",
            ),
            ("return 1;", "return 2;\n"),
            ("let x = 1;", "let x = 2;\n"),
            ("fn(x) { 1 }", "fn(x) {2;};\n"),
            ("macro(x) { 1 }", "macro(x) {2;};\n"),
            ("[1, 1]", "[2, 2];\n"),
            ("{1: 1, 3: 1}", "{2: 2, 3: 2};\n"),
            ("f(1)(1)", "f(2)(2);\n"),
            ("quote(1) + f(1)", "(quote(1) + f(2));\n"),
            ("1; 3; 1", "2;\n3;\n2;\n"),
        ];

        for (input, expected) in tests {
            assert_eq!(rewrite(input), expected, "input: {}", input);
        }
    }

    #[test]
    fn test_untouched_nodes_are_preserved() {
        let program = parse("let a = fn(x, y) { if (x > y) { [x, {\"k\": y}] } };").unwrap();
        let rewritten = modify(Node::Program(program.clone()), &mut |node| {
            Ok::<_, ModifyError>(node)
        })
        .unwrap();
        assert_eq!(rewritten, Node::Program(program));
    }

    #[test]
    fn test_modifier_sees_children_before_parents() {
        let program = parse("1 + 2").unwrap();
        let mut visited = Vec::new();
        modify(Node::Program(program), &mut |node| {
            visited.push(node.to_string());
            Ok::<_, ModifyError>(node)
        })
        .unwrap();

        assert_eq!(visited, vec!["1", "2", "(1 + 2)", "(1 + 2);", "(1 + 2);\n"]);
    }

    #[test]
    fn test_quoted_arguments_reach_the_modifier_only_as_the_call() {
        let program = parse("quote(1, unquote(1))").unwrap();
        let mut visited = Vec::new();
        modify(Node::Program(program), &mut |node| {
            visited.push(node.to_string());
            Ok::<_, ModifyError>(node)
        })
        .unwrap();

        assert_eq!(
            visited,
            vec![
                "quote(1, unquote(1))",
                "quote(1, unquote(1));",
                "quote(1, unquote(1));\n",
            ]
        );
    }

    #[test]
    fn test_category_mismatch() {
        let program = parse("1").unwrap();
        let result = modify(Node::Program(program), &mut |node| match node {
            Node::Expression(_) => Ok(Node::Block(BlockStatement::default())),
            node => Ok(node),
        });

        assert_eq!(
            result,
            Err(ModifyError::CategoryMismatch {
                expected: NodeKind::Expression,
                got: NodeKind::Block,
            })
        );
    }

    #[test]
    fn test_errors_from_the_modifier_stop_the_rewrite() {
        #[derive(Debug, PartialEq)]
        enum Failure {
            Modify(ModifyError),
            Found(i64),
        }

        impl From<ModifyError> for Failure {
            fn from(value: ModifyError) -> Self {
                Failure::Modify(value)
            }
        }

        let program = parse("[1, 5, 7]").unwrap();
        let result = modify(Node::Program(program), &mut |node| match node {
            Node::Expression(Expression::IntegerLiteral(value)) if value > 3 => {
                Err(Failure::Found(value))
            }
            node => Ok(node),
        });

        assert_eq!(result, Err(Failure::Found(5)));
    }
}
