use gc::Gc;
use monkey_macro_core::ast::Program;
use monkey_macro_interpreter::object::Object;
use monkey_macro_interpreter::{Interpreter, InterpreterError};

pub trait Evaluator {
    type Object;

    fn evaluate(&mut self, source: &str) -> Self::Object;
}

/// Keeps one session alive for the whole REPL, so bindings and macros from
/// earlier lines stay visible.
pub struct InterpreterEvaluator {
    interpreter: Interpreter,
}

impl InterpreterEvaluator {
    pub fn new() -> Self {
        Self {
            interpreter: Interpreter::new(),
        }
    }
}

impl Evaluator for InterpreterEvaluator {
    type Object = Result<Gc<Object>, InterpreterError>;

    fn evaluate(&mut self, source: &str) -> Self::Object {
        self.interpreter.run(source)
    }
}

pub struct ExpanderEvaluator {
    interpreter: Interpreter,
}

impl ExpanderEvaluator {
    pub fn new() -> Self {
        Self {
            interpreter: Interpreter::new(),
        }
    }
}

impl Evaluator for ExpanderEvaluator {
    type Object = Result<Program, InterpreterError>;

    fn evaluate(&mut self, source: &str) -> Self::Object {
        self.interpreter.expand(source)
    }
}
