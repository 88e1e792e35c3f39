use std::collections::HashMap;
use std::fmt::Display;

use gc::{Finalize, Gc, GcCell, Trace};
use monkey_macro_core::ast;
use monkey_macro_core::modify::ModifyError;
use thiserror::Error;

use crate::environment::Environment;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum ObjectType {
    Integer,
    Boolean,
    Null,
    String,
    Array,
    Hash,
    Function,
    Builtin,
    Quote,
    Macro,
}

#[derive(Debug, PartialEq, Trace, Finalize)]
pub enum Object {
    Integer(i64),
    Boolean(bool),
    String(String),
    Array(GcCell<Vec<Gc<Object>>>),
    Hash(GcCell<HashMap<HashKey, HashPair>>),
    Function(Function),
    Builtin(BuiltinFunction),
    Quote(Quote),
    Macro(Macro),
    Null,
}

impl Object {
    pub fn null() -> Gc<Object> {
        Gc::new(Object::Null)
    }
    pub fn boolean(value: bool) -> Gc<Object> {
        Gc::new(Object::Boolean(value))
    }
    pub fn integer(value: i64) -> Gc<Object> {
        Gc::new(Object::Integer(value))
    }
    pub fn string(value: String) -> Gc<Object> {
        Gc::new(Object::String(value))
    }
    pub fn array(array: Vec<Gc<Object>>) -> Gc<Object> {
        Gc::new(Object::Array(GcCell::new(array)))
    }
    pub fn hash(hash: HashMap<HashKey, HashPair>) -> Gc<Object> {
        Gc::new(Object::Hash(GcCell::new(hash)))
    }
    pub fn function(
        parameters: Vec<ast::Identifier>,
        body: ast::BlockStatement,
        env: Environment,
    ) -> Gc<Object> {
        Gc::new(Object::Function(Function {
            parameters,
            body,
            env,
        }))
    }
    pub fn macro_(
        parameters: Vec<ast::Identifier>,
        body: ast::BlockStatement,
        env: Environment,
    ) -> Gc<Object> {
        Gc::new(Object::Macro(Macro {
            parameters,
            body,
            env,
        }))
    }
    pub fn quote(node: ast::Node) -> Gc<Object> {
        Gc::new(Object::Quote(Quote { node }))
    }
    pub fn builtin_function(func: BuiltinFunction) -> Gc<Object> {
        Gc::new(Object::Builtin(func))
    }

    pub fn object_type(&self) -> ObjectType {
        match self {
            Object::Integer(_) => ObjectType::Integer,
            Object::Boolean(_) => ObjectType::Boolean,
            Object::String(_) => ObjectType::String,
            Object::Array(_) => ObjectType::Array,
            Object::Hash(_) => ObjectType::Hash,
            Object::Function(_) => ObjectType::Function,
            Object::Builtin(_) => ObjectType::Builtin,
            Object::Quote(_) => ObjectType::Quote,
            Object::Macro(_) => ObjectType::Macro,
            Object::Null => ObjectType::Null,
        }
    }

    /// Only `false` and `null` are falsy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Object::Boolean(false) | Object::Null)
    }

    /// The key this object is stored under in a hash, if it can be one.
    pub fn hash_key(&self) -> Option<HashKey> {
        let value = match self {
            Object::Integer(value) => *value as u64,
            Object::Boolean(value) => u64::from(*value),
            Object::String(value) => fnv1a(value.as_bytes()),
            _ => return None,
        };
        Some(HashKey {
            object_type: self.object_type(),
            value,
        })
    }
}

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ u64::from(*byte)).wrapping_mul(FNV_PRIME)
    })
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct HashKey {
    pub object_type: ObjectType,
    pub value: u64,
}

// Plain data, holds no `Gc` pointers.
impl Finalize for HashKey {}
unsafe impl Trace for HashKey {
    gc::unsafe_empty_trace!();
}

#[derive(Debug, PartialEq, Clone, Trace, Finalize)]
pub struct HashPair {
    pub key: Gc<Object>,
    pub value: Gc<Object>,
}

pub fn object_to_key(object: &Gc<Object>) -> Result<HashKey, EvaluationError> {
    object
        .hash_key()
        .ok_or_else(|| EvaluationError::InvalidHashKey(object.object_type()))
}

#[derive(Clone, Trace, Finalize)]
pub struct Function {
    #[unsafe_ignore_trace]
    pub parameters: Vec<ast::Identifier>,
    #[unsafe_ignore_trace]
    pub body: ast::BlockStatement,
    pub env: Environment,
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        self.parameters == other.parameters && self.body == other.body && self.env == other.env
    }
}

impl std::fmt::Debug for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Function")
            .field("parameters", &self.parameters.len())
            .field("env", &self.env)
            .finish()
    }
}

/// Same shape as [`Function`], but applied to unevaluated syntax during
/// macro expansion.
#[derive(Clone, Trace, Finalize)]
pub struct Macro {
    #[unsafe_ignore_trace]
    pub parameters: Vec<ast::Identifier>,
    #[unsafe_ignore_trace]
    pub body: ast::BlockStatement,
    pub env: Environment,
}

impl PartialEq for Macro {
    fn eq(&self, other: &Self) -> bool {
        self.parameters == other.parameters && self.body == other.body && self.env == other.env
    }
}

impl std::fmt::Debug for Macro {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Macro")
            .field("parameters", &self.parameters.len())
            .field("env", &self.env)
            .finish()
    }
}

#[derive(Debug, PartialEq, Clone, Trace, Finalize)]
pub struct Quote {
    #[unsafe_ignore_trace]
    pub node: ast::Node,
}

pub type BuiltinResult = Result<Gc<Object>, EvaluationError>;

#[derive(Clone, Trace, Finalize)]
pub struct BuiltinFunction {
    #[unsafe_ignore_trace]
    pub name: &'static str,
    #[allow(clippy::type_complexity)]
    #[unsafe_ignore_trace]
    pub func: fn(Vec<Gc<Object>>, &mut dyn std::io::Write) -> BuiltinResult,
}

impl PartialEq for BuiltinFunction {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.func as usize == other.func as usize
    }
}

impl std::fmt::Debug for BuiltinFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuiltinFunction")
            .field("name", &self.name)
            .finish()
    }
}

/// Anything that cuts evaluation short: a `return` unwinding to the nearest
/// function boundary, or an error unwinding all the way out.
#[derive(Debug, PartialEq)]
pub enum QuickReturn {
    Return(Gc<Object>),
    Error(EvaluationError),
}

impl From<EvaluationError> for QuickReturn {
    fn from(value: EvaluationError) -> Self {
        QuickReturn::Error(value)
    }
}

impl From<ModifyError> for QuickReturn {
    fn from(value: ModifyError) -> Self {
        QuickReturn::Error(value.into())
    }
}

#[derive(Debug, PartialEq, Clone, Error)]
pub enum EvaluationError {
    #[error("type mismatch: {left} {operator} {right}")]
    TypeMismatch {
        left: ObjectType,
        operator: &'static str,
        right: ObjectType,
    },
    #[error("unknown operator: {left} {operator} {right}")]
    UnknownInfixOperator {
        left: ObjectType,
        operator: &'static str,
        right: ObjectType,
    },
    #[error("unknown operator: {operator}{right}")]
    UnknownPrefixOperator {
        operator: &'static str,
        right: ObjectType,
    },
    #[error("division by zero")]
    DivisionByZero,
    #[error("identifier not found: {0}")]
    UnknownIdentifier(std::rc::Rc<str>),
    #[error("not a function: {0}")]
    CallNonFunction(ObjectType),
    #[error("wrong number of arguments: want={expected}, got={actual}")]
    WrongArgumentCount { expected: usize, actual: usize },
    #[error("{0}")]
    BuiltinFunctionError(std::rc::Rc<str>),
    #[error("index operator not supported: {0}")]
    IndexNotSupported(ObjectType),
    #[error("unusable as hash key: {0}")]
    InvalidHashKey(ObjectType),
    #[error("cannot unquote {0}")]
    Unquotable(ObjectType),
    #[error("we only support returning AST-nodes from macros")]
    MacroReturnedNonQuote,
    #[error("{0}")]
    Rewrite(#[from] ModifyError),
    #[error("failed to write output: {0}")]
    Output(std::rc::Rc<str>),
}

impl Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ObjectType::Integer => "INTEGER",
            ObjectType::Boolean => "BOOLEAN",
            ObjectType::Null => "NULL",
            ObjectType::String => "STRING",
            ObjectType::Array => "ARRAY",
            ObjectType::Hash => "HASH",
            ObjectType::Function => "FUNCTION",
            ObjectType::Builtin => "BUILTIN",
            ObjectType::Quote => "QUOTE",
            ObjectType::Macro => "MACRO",
        };
        write!(f, "{}", name)
    }
}

fn write_parameters(
    f: &mut std::fmt::Formatter<'_>,
    keyword: &str,
    parameters: &[ast::Identifier],
    body: &ast::BlockStatement,
) -> std::fmt::Result {
    let parameters = parameters
        .iter()
        .map(|id| id.name.as_ref())
        .collect::<Vec<&str>>()
        .join(", ");
    write!(f, "{}({}) {}", keyword, parameters, body)
}

/// The inspect form shown to users.
impl Display for Object {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Object::Integer(value) => write!(f, "{}", value),
            Object::Boolean(value) => write!(f, "{}", value),
            Object::String(value) => write!(f, "{}", value),
            Object::Null => write!(f, "null"),
            Object::Array(elements) => {
                write!(f, "[")?;
                for (i, element) in elements.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", element)?;
                }
                write!(f, "]")
            }
            Object::Hash(pairs) => {
                write!(f, "{{")?;
                for (i, pair) in pairs.borrow().values().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", pair.key, pair.value)?;
                }
                write!(f, "}}")
            }
            Object::Function(function) => {
                write_parameters(f, "fn", &function.parameters, &function.body)
            }
            Object::Macro(macro_) => write_parameters(f, "macro", &macro_.parameters, &macro_.body),
            Object::Builtin(_) => write!(f, "builtin function"),
            Object::Quote(quote) => write!(f, "QUOTE({})", quote.node),
        }
    }
}
