use gc::Gc;
use log::debug;
use monkey_macro_core::ast::{Expression, LetStatement, Node, NodeKind, Program, Statement};
use monkey_macro_core::modify::{modify, ModifyError};

use crate::environment::Environment;
use crate::evaluator::Evaluator;
use crate::object::{EvaluationError, Object, QuickReturn};

/// Moves every top-level `let name = macro(...) {...}` out of `program` and
/// into `env`. Macros defined anywhere else are left for the evaluator.
pub fn define_macros(program: &mut Program, env: &mut Environment) {
    let statements = std::mem::take(&mut program.statements);

    for statement in statements {
        match statement {
            Statement::Let(LetStatement {
                identifier,
                value: Expression::MacroLiteral { parameters, body },
            }) => {
                debug!("defining macro `{}`", identifier.name);
                let macro_ = Object::macro_(parameters, body, env.clone());
                env.set(identifier.name, macro_);
            }
            statement => program.statements.push(statement),
        }
    }
}

/// Replaces every call to a macro bound in `env` with the syntax the macro
/// returns. Arguments are expanded before the call that contains them.
pub fn expand_macros(
    program: Program,
    env: &Environment,
    evaluator: &mut Evaluator,
) -> Result<Program, EvaluationError> {
    let node = modify(Node::Program(program), &mut |node| {
        expand_macro_call(node, env, evaluator)
    })?;

    match node {
        Node::Program(program) => Ok(program),
        other => Err(ModifyError::CategoryMismatch {
            expected: NodeKind::Program,
            got: other.kind(),
        }
        .into()),
    }
}

/// The macro `node` calls and its unevaluated arguments, if `node` is a
/// call whose callee names a macro.
fn macro_call(node: &Node, env: &Environment) -> Option<(Gc<Object>, Vec<Expression>)> {
    let Node::Expression(Expression::CallExpression {
        function,
        arguments,
    }) = node
    else {
        return None;
    };
    let Expression::Identifier(identifier) = function.as_ref() else {
        return None;
    };
    let object = env.get(&identifier.name)?;

    matches!(object.as_ref(), Object::Macro(_)).then(|| (object, arguments.clone()))
}

fn expand_macro_call(
    node: Node,
    env: &Environment,
    evaluator: &mut Evaluator,
) -> Result<Node, EvaluationError> {
    let Some((object, arguments)) = macro_call(&node, env) else {
        return Ok(node);
    };
    let Object::Macro(macro_) = object.as_ref() else {
        return Ok(node);
    };

    if macro_.parameters.len() != arguments.len() {
        return Err(EvaluationError::WrongArgumentCount {
            expected: macro_.parameters.len(),
            actual: arguments.len(),
        });
    }

    let mut macro_env = Environment::new_enclosed(macro_.env.clone());
    for (parameter, argument) in macro_.parameters.iter().zip(arguments) {
        macro_env.set(
            parameter.name.clone(),
            Object::quote(Node::Expression(argument)),
        );
    }

    let evaluated = match evaluator.eval_block_statement(&macro_.body, &mut macro_env) {
        Ok(object) | Err(QuickReturn::Return(object)) => object,
        Err(QuickReturn::Error(err)) => return Err(err),
    };

    match evaluated.as_ref() {
        Object::Quote(quote) => {
            debug!("expanded `{}` into `{}`", node, quote.node);
            Ok(quote.node.clone())
        }
        _ => Err(EvaluationError::MacroReturnedNonQuote),
    }
}
