pub mod ast;
pub mod lexer;
pub mod modify;
pub mod parser;
