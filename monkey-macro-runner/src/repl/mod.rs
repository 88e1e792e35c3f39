mod evaluator;
mod printer;
mod reader;

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::ops::ControlFlow;

use evaluator::{Evaluator, ExpanderEvaluator, InterpreterEvaluator};
use printer::{ObjectPrinter, Printer, ProgramPrinter};
use reader::{ReadOutput, Reader};

use crate::Mode;

struct Repl<E: Evaluator, P: Printer> {
    reader: Reader,
    evaluator: E,
    printer: P,
}

impl<O, E: Evaluator<Object = O>, P: Printer<Object = O>> Repl<E, P> {
    fn run(mut self) {
        loop {
            let input = self.reader.read();
            match input {
                ReadOutput::ControlFlow(ControlFlow::Break(())) => break,
                ReadOutput::ControlFlow(ControlFlow::Continue(())) => continue,
                ReadOutput::Value(source) => {
                    let result = self.evaluator.evaluate(&source);
                    self.printer.print(result)
                }
            }
        }
    }
}

pub fn start(mode: Mode) -> Result<(), ReadlineError> {
    let rl = DefaultEditor::new()?;

    match mode {
        Mode::Evaluate => Repl {
            reader: Reader::new(rl),
            evaluator: InterpreterEvaluator::new(),
            printer: ObjectPrinter {},
        }
        .run(),
        Mode::Expand => Repl {
            reader: Reader::new(rl),
            evaluator: ExpanderEvaluator::new(),
            printer: ProgramPrinter {},
        }
        .run(),
    };
    Ok(())
}
