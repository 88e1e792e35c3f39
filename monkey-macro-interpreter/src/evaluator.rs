use std::collections::HashMap;
use std::io::Write;

use gc::Gc;
use log::trace;
use monkey_macro_core::ast;
use monkey_macro_core::ast::{Expression, InfixOperationKind, Node, PrefixOperationKind};
use monkey_macro_core::modify::modify;

use crate::builtins::Builtins;
use crate::environment::Environment;
use crate::object::{object_to_key, EvaluationError, HashPair, Object, QuickReturn};

/// Walks the AST and produces objects. Holds what every evaluation needs
/// besides the environment: the builtin table and where `puts` writes to.
pub struct Evaluator {
    builtins: Builtins,
    output: Box<dyn Write>,
}

impl Evaluator {
    pub fn new() -> Self {
        Self::with_output(Box::new(std::io::stdout()))
    }

    pub fn with_output(output: Box<dyn Write>) -> Self {
        Evaluator {
            builtins: Builtins::new(),
            output,
        }
    }

    pub fn eval_program(
        &mut self,
        program: &ast::Program,
        environment: &mut Environment,
    ) -> Result<Gc<Object>, EvaluationError> {
        let mut result = Ok(Object::null());
        for statement in &program.statements {
            match self.eval_statement(statement, environment) {
                Err(QuickReturn::Return(value)) => {
                    result = Ok(value);
                    break;
                }
                Err(QuickReturn::Error(error)) => {
                    result = Err(error);
                    break;
                }
                Ok(object) => result = Ok(object),
            };
        }

        // Output is flushed however the program ended; an evaluation error
        // wins over a failed flush.
        let flushed = self.output.flush();
        let value = result?;
        flushed.map_err(|err| EvaluationError::Output(err.to_string().into()))?;
        Ok(value)
    }

    pub(crate) fn eval_block_statement(
        &mut self,
        block: &ast::BlockStatement,
        environment: &mut Environment,
    ) -> Result<Gc<Object>, QuickReturn> {
        let mut result = Object::null();
        for statement in &block.statements {
            result = self.eval_statement(statement, environment)?;
        }
        Ok(result)
    }

    fn eval_statement(
        &mut self,
        statement: &ast::Statement,
        environment: &mut Environment,
    ) -> Result<Gc<Object>, QuickReturn> {
        match statement {
            ast::Statement::Expression(expression) => self.eval_expression(expression, environment),
            ast::Statement::Return(statement) => {
                let value = self.eval_expression(&statement.value, environment)?;
                Err(QuickReturn::Return(value))
            }
            ast::Statement::Let(statement) => {
                let value = self.eval_expression(&statement.value, environment)?;
                environment.set(statement.identifier.name.clone(), value.clone());
                Ok(value)
            }
        }
    }

    fn eval_expression(
        &mut self,
        expression: &Expression,
        environment: &mut Environment,
    ) -> Result<Gc<Object>, QuickReturn> {
        match expression {
            Expression::IntegerLiteral(value) => Ok(Object::integer(*value)),
            Expression::BooleanLiteral(value) => Ok(Object::boolean(*value)),
            Expression::StringLiteral(value) => Ok(Object::string(value.clone())),
            Expression::ArrayLiteral(elements) => {
                Ok(Object::array(self.eval_expressions(elements, environment)?))
            }
            Expression::HashLiteral(pairs) => self.eval_hash_literal(pairs, environment),
            Expression::Identifier(identifier) => self.eval_identifier(identifier, environment),
            Expression::PrefixOperation(kind, right) => {
                let right = self.eval_expression(right, environment)?;
                Ok(eval_prefix_operation(*kind, right)?)
            }
            Expression::InfixOperation(kind, left, right) => {
                let left = self.eval_expression(left, environment)?;
                let right = self.eval_expression(right, environment)?;
                Ok(eval_infix_operation(*kind, left, right)?)
            }
            Expression::IfExpression {
                condition,
                consequence,
                alternative,
            } => {
                let condition = self.eval_expression(condition, environment)?;
                if condition.is_truthy() {
                    self.eval_block_statement(consequence, environment)
                } else if let Some(alternative) = alternative {
                    self.eval_block_statement(alternative, environment)
                } else {
                    Ok(Object::null())
                }
            }
            Expression::FunctionLiteral { parameters, body } => Ok(Object::function(
                parameters.clone(),
                body.clone(),
                environment.clone(),
            )),
            Expression::MacroLiteral { parameters, body } => Ok(Object::macro_(
                parameters.clone(),
                body.clone(),
                environment.clone(),
            )),
            Expression::CallExpression {
                function,
                arguments,
            } if is_identifier(function, "quote") => self.eval_quote(arguments, environment),
            Expression::CallExpression {
                function,
                arguments,
            } => {
                let function = self.eval_expression(function, environment)?;
                self.eval_call(&function, arguments, environment)
            }
            Expression::IndexExpression { left, index } => {
                let left = self.eval_expression(left, environment)?;
                let index = self.eval_expression(index, environment)?;
                Ok(eval_index_expression(&left, &index)?)
            }
        }
    }

    fn eval_identifier(
        &self,
        identifier: &ast::Identifier,
        environment: &Environment,
    ) -> Result<Gc<Object>, QuickReturn> {
        environment
            .get(&identifier.name)
            .or_else(|| self.builtins.get(&identifier.name))
            .ok_or_else(|| EvaluationError::UnknownIdentifier(identifier.name.clone()).into())
    }

    fn eval_hash_literal(
        &mut self,
        pairs: &[(Expression, Expression)],
        environment: &mut Environment,
    ) -> Result<Gc<Object>, QuickReturn> {
        let mut hashmap = HashMap::new();
        for (key, value) in pairs {
            let key = self.eval_expression(key, environment)?;
            let hashed_key = object_to_key(&key)?;
            let value = self.eval_expression(value, environment)?;
            hashmap.insert(hashed_key, HashPair { key, value });
        }
        Ok(Object::hash(hashmap))
    }

    fn eval_call(
        &mut self,
        function: &Gc<Object>,
        arguments: &[Expression],
        environment: &mut Environment,
    ) -> Result<Gc<Object>, QuickReturn> {
        match function.as_ref() {
            Object::Function(function) => {
                if function.parameters.len() != arguments.len() {
                    return Err(EvaluationError::WrongArgumentCount {
                        expected: function.parameters.len(),
                        actual: arguments.len(),
                    }
                    .into());
                }
                let arguments = self.eval_expressions(arguments, environment)?;
                Ok(self.apply_function(function, arguments)?)
            }
            Object::Builtin(builtin) => {
                let arguments = self.eval_expressions(arguments, environment)?;
                trace!("calling builtin `{}`", builtin.name);
                Ok((builtin.func)(arguments, self.output.as_mut())?)
            }
            other => Err(EvaluationError::CallNonFunction(other.object_type()).into()),
        }
    }

    fn eval_expressions(
        &mut self,
        expressions: &[Expression],
        environment: &mut Environment,
    ) -> Result<Vec<Gc<Object>>, QuickReturn> {
        let mut result = Vec::with_capacity(expressions.len());
        for expression in expressions {
            result.push(self.eval_expression(expression, environment)?);
        }
        Ok(result)
    }

    /// Runs the body in a fresh scope enclosing the one the function was
    /// defined in. A `return` stops here and does not reach the caller.
    fn apply_function(
        &mut self,
        function: &crate::object::Function,
        arguments: Vec<Gc<Object>>,
    ) -> Result<Gc<Object>, EvaluationError> {
        trace!("calling function with {} arguments", arguments.len());
        let mut new_environment = Environment::new_enclosed(function.env.clone());
        for (parameter, argument) in function.parameters.iter().zip(arguments) {
            new_environment.set(parameter.name.clone(), argument);
        }
        match self.eval_block_statement(&function.body, &mut new_environment) {
            Ok(object) => Ok(object),
            Err(QuickReturn::Return(value)) => Ok(value),
            Err(QuickReturn::Error(err)) => Err(err),
        }
    }

    /// `quote(x)` returns `x` unevaluated, except that every `unquote(y)`
    /// inside it is replaced by the syntax for the value of `y`.
    fn eval_quote(
        &mut self,
        arguments: &[Expression],
        environment: &mut Environment,
    ) -> Result<Gc<Object>, QuickReturn> {
        let [argument] = arguments else {
            return Err(EvaluationError::WrongArgumentCount {
                expected: 1,
                actual: arguments.len(),
            }
            .into());
        };

        let node = modify(Node::Expression(argument.clone()), &mut |node| {
            self.eval_unquote_call(node, environment)
        })?;
        Ok(Object::quote(node))
    }

    fn eval_unquote_call(
        &mut self,
        node: Node,
        environment: &mut Environment,
    ) -> Result<Node, QuickReturn> {
        match node {
            Node::Expression(Expression::CallExpression {
                ref function,
                ref arguments,
            }) if arguments.len() == 1 && is_identifier(function, "unquote") => {
                let value = self.eval_expression(&arguments[0], environment)?;
                Ok(object_to_node(&value)?)
            }
            node => Ok(node),
        }
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

fn is_identifier(expression: &Expression, name: &str) -> bool {
    matches!(expression, Expression::Identifier(identifier) if identifier.name.as_ref() == name)
}

/// The syntax an unquoted value is spliced back in as.
fn object_to_node(object: &Gc<Object>) -> Result<Node, EvaluationError> {
    match object.as_ref() {
        Object::Integer(value) => Ok(Node::Expression(Expression::IntegerLiteral(*value))),
        Object::Boolean(value) => Ok(Node::Expression(Expression::BooleanLiteral(*value))),
        Object::String(value) => Ok(Node::Expression(Expression::StringLiteral(value.clone()))),
        Object::Quote(quote) => Ok(quote.node.clone()),
        other => Err(EvaluationError::Unquotable(other.object_type())),
    }
}

fn eval_prefix_operation(
    kind: PrefixOperationKind,
    right: Gc<Object>,
) -> Result<Gc<Object>, EvaluationError> {
    match (kind, right.as_ref()) {
        (PrefixOperationKind::Bang, _) => Ok(Object::boolean(!right.is_truthy())),
        (PrefixOperationKind::Minus, Object::Integer(value)) => {
            Ok(Object::integer(value.wrapping_neg()))
        }
        (PrefixOperationKind::Minus, other) => Err(EvaluationError::UnknownPrefixOperator {
            operator: kind.to_str(),
            right: other.object_type(),
        }),
    }
}

fn eval_infix_operation(
    kind: InfixOperationKind,
    left: Gc<Object>,
    right: Gc<Object>,
) -> Result<Gc<Object>, EvaluationError> {
    match (left.as_ref(), right.as_ref()) {
        (Object::Integer(left), Object::Integer(right)) => {
            eval_integer_infix_operation(kind, *left, *right)
        }
        (Object::String(left_value), Object::String(right_value)) => match kind {
            InfixOperationKind::Plus => Ok(Object::string(format!("{}{}", left_value, right_value))),
            InfixOperationKind::Equal => Ok(Object::boolean(left_value == right_value)),
            InfixOperationKind::NotEqual => Ok(Object::boolean(left_value != right_value)),
            _ => Err(unknown_infix_operator(kind, &left, &right)),
        },
        _ => match kind {
            InfixOperationKind::Equal => Ok(Object::boolean(same_object(&left, &right))),
            InfixOperationKind::NotEqual => Ok(Object::boolean(!same_object(&left, &right))),
            _ if left.object_type() != right.object_type() => Err(EvaluationError::TypeMismatch {
                left: left.object_type(),
                operator: kind.to_str(),
                right: right.object_type(),
            }),
            _ => Err(unknown_infix_operator(kind, &left, &right)),
        },
    }
}

fn unknown_infix_operator(kind: InfixOperationKind, left: &Object, right: &Object) -> EvaluationError {
    EvaluationError::UnknownInfixOperator {
        left: left.object_type(),
        operator: kind.to_str(),
        right: right.object_type(),
    }
}

/// Booleans and null compare by value, everything else by identity.
fn same_object(left: &Gc<Object>, right: &Gc<Object>) -> bool {
    match (left.as_ref(), right.as_ref()) {
        (Object::Boolean(left), Object::Boolean(right)) => left == right,
        (Object::Null, Object::Null) => true,
        _ => Gc::ptr_eq(left, right),
    }
}

fn eval_integer_infix_operation(
    kind: InfixOperationKind,
    left: i64,
    right: i64,
) -> Result<Gc<Object>, EvaluationError> {
    use InfixOperationKind::*;

    Ok(match kind {
        Plus => Object::integer(left.wrapping_add(right)),
        Minus => Object::integer(left.wrapping_sub(right)),
        Multiply => Object::integer(left.wrapping_mul(right)),
        Divide => {
            if right == 0 {
                return Err(EvaluationError::DivisionByZero);
            }
            Object::integer(left.wrapping_div(right))
        }
        LessThan => Object::boolean(left < right),
        GreaterThan => Object::boolean(left > right),
        Equal => Object::boolean(left == right),
        NotEqual => Object::boolean(left != right),
    })
}

fn eval_index_expression(
    left: &Gc<Object>,
    index: &Gc<Object>,
) -> Result<Gc<Object>, EvaluationError> {
    match (left.as_ref(), index.as_ref()) {
        (Object::Array(array), Object::Integer(index)) => Ok(usize::try_from(*index)
            .ok()
            .and_then(|index| array.borrow().get(index).cloned())
            .unwrap_or_else(Object::null)),
        (Object::Array(_), _) => Ok(Object::null()),
        (Object::Hash(hash), _) => {
            let hashed_index = object_to_key(index)?;
            Ok(hash
                .borrow()
                .get(&hashed_index)
                .map(|pair| pair.value.clone())
                .unwrap_or_else(Object::null))
        }
        (other, _) => Err(EvaluationError::IndexNotSupported(other.object_type())),
    }
}
