use std::collections::HashMap;
use std::io::Write;

use gc::Gc;

use crate::object::{BuiltinFunction, BuiltinResult, EvaluationError, Object, ObjectType};

fn builtin_error(message: String) -> EvaluationError {
    EvaluationError::BuiltinFunctionError(message.into())
}

fn check_argument_count(args: &[Gc<Object>], expected: usize) -> Result<(), EvaluationError> {
    if args.len() != expected {
        return Err(builtin_error(format!(
            "wrong number of arguments. got={}, want={}",
            args.len(),
            expected
        )));
    }
    Ok(())
}

fn must_be_array(name: &str, object: &Object) -> EvaluationError {
    builtin_error(format!(
        "argument to `{}` must be {}, got {}",
        name,
        ObjectType::Array,
        object.object_type()
    ))
}

fn builtin_len(args: Vec<Gc<Object>>, _: &mut dyn Write) -> BuiltinResult {
    check_argument_count(&args, 1)?;
    match args[0].as_ref() {
        Object::String(s) => Ok(Object::integer(s.len() as i64)),
        Object::Array(arr) => Ok(Object::integer(arr.borrow().len() as i64)),
        other => Err(builtin_error(format!(
            "argument to `len` not supported, got {}",
            other.object_type()
        ))),
    }
}

fn builtin_first(args: Vec<Gc<Object>>, _: &mut dyn Write) -> BuiltinResult {
    check_argument_count(&args, 1)?;
    match args[0].as_ref() {
        Object::Array(arr) => Ok(arr.borrow().first().cloned().unwrap_or_else(Object::null)),
        other => Err(must_be_array("first", other)),
    }
}

fn builtin_last(args: Vec<Gc<Object>>, _: &mut dyn Write) -> BuiltinResult {
    check_argument_count(&args, 1)?;
    match args[0].as_ref() {
        Object::Array(arr) => Ok(arr.borrow().last().cloned().unwrap_or_else(Object::null)),
        other => Err(must_be_array("last", other)),
    }
}

/// Everything but the first element, as a new array.
fn builtin_rest(args: Vec<Gc<Object>>, _: &mut dyn Write) -> BuiltinResult {
    check_argument_count(&args, 1)?;
    match args[0].as_ref() {
        Object::Array(arr) => {
            let arr = arr.borrow();
            if arr.is_empty() {
                return Ok(Object::null());
            }
            Ok(Object::array(arr[1..].to_vec()))
        }
        other => Err(must_be_array("rest", other)),
    }
}

/// Returns a new array with `args[1]` appended; the input is left alone.
fn builtin_push(args: Vec<Gc<Object>>, _: &mut dyn Write) -> BuiltinResult {
    check_argument_count(&args, 2)?;
    match args[0].as_ref() {
        Object::Array(arr) => {
            let mut new_arr = arr.borrow().clone();
            new_arr.push(args[1].clone());
            Ok(Object::array(new_arr))
        }
        other => Err(must_be_array("push", other)),
    }
}

/// `update(arr, index, value)` overwrites one slot of `arr` in place and
/// returns the same array, so every alias sees the change.
fn builtin_update(args: Vec<Gc<Object>>, _: &mut dyn Write) -> BuiltinResult {
    check_argument_count(&args, 3)?;
    let Object::Array(arr) = args[0].as_ref() else {
        return Err(must_be_array("update", &args[0]));
    };
    let Object::Integer(index) = args[1].as_ref() else {
        return Err(builtin_error(format!(
            "argument to `update` must be an integer, got {}",
            args[1].object_type()
        )));
    };

    let length = arr.borrow().len();
    let slot = usize::try_from(*index).ok().filter(|slot| *slot < length);
    let Some(slot) = slot else {
        return Err(builtin_error(format!(
            "update index out of range, length of array = {}, got = {}",
            length, index
        )));
    };

    arr.borrow_mut()[slot] = args[2].clone();
    Ok(args[0].clone())
}

fn builtin_puts(args: Vec<Gc<Object>>, output: &mut dyn Write) -> BuiltinResult {
    for arg in &args {
        writeln!(output, "{}", arg)
            .map_err(|err| EvaluationError::Output(err.to_string().into()))?;
    }
    Ok(Object::null())
}

/// The fixed table of native functions, built once per interpreter and
/// consulted after the environment when an identifier is looked up.
#[derive(Debug, Clone)]
pub struct Builtins {
    functions: HashMap<&'static str, BuiltinFunction>,
}

impl Builtins {
    pub fn new() -> Self {
        let table: [(&'static str, fn(Vec<Gc<Object>>, &mut dyn Write) -> BuiltinResult); 7] = [
            ("len", builtin_len),
            ("first", builtin_first),
            ("last", builtin_last),
            ("rest", builtin_rest),
            ("push", builtin_push),
            ("update", builtin_update),
            ("puts", builtin_puts),
        ];
        let functions = table
            .into_iter()
            .map(|(name, func)| (name, BuiltinFunction { name, func }))
            .collect();
        Builtins { functions }
    }

    pub fn get(&self, name: &str) -> Option<Gc<Object>> {
        self.functions
            .get(name)
            .cloned()
            .map(Object::builtin_function)
    }
}

impl Default for Builtins {
    fn default() -> Self {
        Self::new()
    }
}
