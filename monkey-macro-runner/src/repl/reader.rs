use std::ops::ControlFlow;

use log::warn;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;

const PROMPT: &str = ">> ";

pub enum ReadOutput {
    ControlFlow(ControlFlow<()>),
    Value(String),
}

pub struct Reader {
    rl: Editor<(), DefaultHistory>,
}

impl Reader {
    pub fn new(rl: Editor<(), DefaultHistory>) -> Self {
        Self { rl }
    }

    pub fn read(&mut self) -> ReadOutput {
        let readline = self.rl.readline(PROMPT);

        match readline {
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                ReadOutput::ControlFlow(ControlFlow::Continue(())) // Clear line
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                ReadOutput::ControlFlow(ControlFlow::Break(()))
            }
            Err(err) => {
                println!("Error: {:?}", err);
                ReadOutput::ControlFlow(ControlFlow::Break(()))
            }
            Ok(line) if line.trim().is_empty() => ReadOutput::ControlFlow(ControlFlow::Continue(())),
            Ok(line) => {
                if let Err(err) = self.rl.add_history_entry(&line) {
                    warn!("could not add line to history: {}", err);
                }
                ReadOutput::Value(line)
            }
        }
    }
}
