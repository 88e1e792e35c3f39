use gc::Gc;
use monkey_macro_core::ast::Program;
use monkey_macro_interpreter::object::Object;
use monkey_macro_interpreter::InterpreterError;

pub trait Printer {
    type Object;

    fn print(&mut self, object: Self::Object);
}

fn print_error(err: InterpreterError) {
    match err {
        InterpreterError::Parse(errors) => {
            println!("Parsing errors:");
            for error in errors {
                println!("\t{}", error);
            }
        }
        err => println!("{}", err),
    }
}

pub struct ObjectPrinter {}

impl Printer for ObjectPrinter {
    type Object = Result<Gc<Object>, InterpreterError>;

    fn print(&mut self, object: Self::Object) {
        match object {
            Ok(obj) => println!("{}", obj),
            Err(err) => print_error(err),
        }
    }
}

pub struct ProgramPrinter {}

impl Printer for ProgramPrinter {
    type Object = Result<Program, InterpreterError>;

    fn print(&mut self, object: Self::Object) {
        match object {
            Ok(program) => print!("{}", program),
            Err(err) => print_error(err),
        }
    }
}
