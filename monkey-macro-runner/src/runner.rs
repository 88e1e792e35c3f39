use std::path::Path;
use std::process::ExitCode;

use log::info;
use monkey_macro_interpreter::Interpreter;

use crate::Mode;

pub fn execute_file(path: &Path, mode: Mode) -> ExitCode {
    let source = match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("could not read {}: {}", path.display(), err);
            return ExitCode::FAILURE;
        }
    };
    info!("running {}", path.display());

    match execute(&source, mode) {
        Ok(output) => {
            print!("{}", output);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{}", err);
            ExitCode::FAILURE
        }
    }
}

/// Runs `source` in a fresh session and returns what should be printed.
pub fn execute(
    source: &str,
    mode: Mode,
) -> Result<String, monkey_macro_interpreter::InterpreterError> {
    let mut interpreter = Interpreter::new();
    match mode {
        Mode::Evaluate => Ok(format!("{}\n", interpreter.run(source)?)),
        Mode::Expand => Ok(interpreter.expand(source)?.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execute() {
        let tests = vec![
            ("let add = fn(a, b) { a + b }; add(2, 3)", Mode::Evaluate, "5\n"),
            ("[1, 2][5]", Mode::Evaluate, "null\n"),
            (
                "let twice = macro(x) { quote(unquote(x) * 2) }; twice(4);",
                Mode::Expand,
                "(4 * 2);\n",
            ),
        ];

        for (source, mode, expected) in tests {
            assert_eq!(execute(source, mode).unwrap(), expected, "source: {}", source);
        }
    }

    #[test]
    fn test_execute_errors() {
        let err = execute("1 + true", Mode::Evaluate).unwrap_err();
        assert_eq!(err.to_string(), "Error: type mismatch: INTEGER + BOOLEAN");

        let err = execute("let x 5;", Mode::Expand).unwrap_err();
        assert_eq!(
            err.to_string(),
            "expected next token to be =, got INT(5) instead"
        );
    }
}
