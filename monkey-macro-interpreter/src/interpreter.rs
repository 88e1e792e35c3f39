use std::io::Write;

use gc::Gc;
use monkey_macro_core::ast::Program;
use monkey_macro_core::parser::{parse, ParseError};
use thiserror::Error;

use crate::environment::Environment;
use crate::evaluator::Evaluator;
use crate::macro_expansion::{define_macros, expand_macros};
use crate::object::{EvaluationError, Object};

#[derive(Debug, PartialEq, Error)]
pub enum InterpreterError {
    #[error("{}", join_lines(.0))]
    Parse(Vec<ParseError>),
    #[error("Error: {0}")]
    Evaluation(#[from] EvaluationError),
}

fn join_lines(errors: &[ParseError]) -> String {
    errors
        .iter()
        .map(|error| error.to_string())
        .collect::<Vec<String>>()
        .join("\n")
}

/// One interpreter session. Global bindings and macro definitions survive
/// from one `run` to the next, which is what the REPL relies on.
pub struct Interpreter {
    environment: Environment,
    macro_environment: Environment,
    evaluator: Evaluator,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::with_output(Box::new(std::io::stdout()))
    }

    pub fn with_output(output: Box<dyn Write>) -> Self {
        Interpreter {
            environment: Environment::new(),
            macro_environment: Environment::new(),
            evaluator: Evaluator::with_output(output),
        }
    }

    /// Parses `source`, expands its macros and evaluates the result.
    pub fn run(&mut self, source: &str) -> Result<Gc<Object>, InterpreterError> {
        let program = self.expand(source)?;
        Ok(self
            .evaluator
            .eval_program(&program, &mut self.environment)?)
    }

    /// Parses `source` and expands its macros without evaluating anything
    /// else. Macro definitions found along the way are kept.
    pub fn expand(&mut self, source: &str) -> Result<Program, InterpreterError> {
        let mut program = parse(source).map_err(InterpreterError::Parse)?;
        define_macros(&mut program, &mut self.macro_environment);
        Ok(expand_macros(
            program,
            &self.macro_environment,
            &mut self.evaluator,
        )?)
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}
