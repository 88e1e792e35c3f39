pub mod builtins;
pub mod environment;
pub mod evaluator;
pub mod interpreter;
pub mod macro_expansion;
pub mod object;

pub use interpreter::{Interpreter, InterpreterError};
