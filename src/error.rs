//! Defines error handling constructs for beans.
//!
//! Registry and invocation failures are reported as values to the immediate caller. Nothing here is fatal to
//! the process, and no error is logged by the crate itself.

use std::{borrow::Cow, error, fmt};

use crate::value::Type;

/// An error that can occur when registering & resolving beans by name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegistryError {
    /// A type is already registered under this name.
    DuplicateName(Cow<'static, str>),
    /// No type is registered under this name.
    UnknownName(String),
    /// The bean was resolved, but was not of the requested type.
    BadBeanType {
        /// Name the bean is registered under.
        name: String,
        /// The type that was requested.
        expected: &'static str,
        /// The registered type.
        actual: &'static str,
    },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::DuplicateName(name) => write!(f, "duplicate bean with name {name}"),
            RegistryError::UnknownName(name) => write!(f, "no bean with name {name}"),
            RegistryError::BadBeanType {
                name,
                expected,
                actual,
            } => write!(f, "bean {name} is a {actual}, not a {expected}"),
        }
    }
}

impl error::Error for RegistryError {}

/// An error that can occur when invoking a method on a bean by name.
///
/// Invocation either fully succeeds or fails before the method body runs.
#[derive(Clone, Debug, PartialEq)]
pub enum InvokeError {
    /// The bean has no method with this name.
    NoSuchMethod {
        /// Reported type name of the bean.
        bean: &'static str,
        /// The requested method name.
        method: String,
    },
    /// The number of arguments does not fit the method signature.
    Arity {
        /// The method name.
        method: &'static str,
        /// Declared parameter count, including a variadic tail parameter.
        expected: usize,
        /// Number of arguments supplied.
        got: usize,
        /// Whether the method takes a variadic tail.
        variadic: bool,
    },
    /// An argument could not be converted to the parameter type at its position.
    TypeMismatch {
        /// The method name.
        method: &'static str,
        /// Zero based argument position.
        position: usize,
        /// The type the method expects at this position.
        expected: Type,
        /// The runtime type of the argument, `None` for [`Value::Nil`](crate::Value::Nil).
        actual: Option<Type>,
    },
}

impl fmt::Display for InvokeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvokeError::NoSuchMethod { bean, method } => {
                write!(f, "no method {method} in bean {bean}")
            }
            InvokeError::Arity {
                method,
                expected,
                got,
                ..
            } => {
                if got < expected {
                    write!(f, "method {method} must have minimum {expected} params have {got}")
                } else {
                    write!(f, "method {method} must have {expected} params have {got}")
                }
            }
            InvokeError::TypeMismatch {
                method,
                position,
                expected,
                actual,
            } => match actual {
                Some(actual) => {
                    write!(f, "method {method}. param[{position}] must be {expected} have {actual}")
                }
                None => write!(f, "method {method}. param[{position}] must be {expected} have nil"),
            },
        }
    }
}

impl error::Error for InvokeError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arity_messages() {
        let too_few = InvokeError::Arity {
            method: "Greet",
            expected: 1,
            got: 0,
            variadic: false,
        };
        assert_eq!(too_few.to_string(), "method Greet must have minimum 1 params have 0");

        let too_many = InvokeError::Arity {
            method: "Greet",
            expected: 1,
            got: 2,
            variadic: false,
        };
        assert_eq!(too_many.to_string(), "method Greet must have 1 params have 2");
    }

    #[test]
    fn type_mismatch_names_position() {
        let err = InvokeError::TypeMismatch {
            method: "Greet",
            position: 0,
            expected: Type::Str,
            actual: Some(Type::I32),
        };
        assert_eq!(err.to_string(), "method Greet. param[0] must be String have i32");

        let nil = InvokeError::TypeMismatch {
            method: "Greet",
            position: 2,
            expected: Type::I64,
            actual: None,
        };
        assert_eq!(nil.to_string(), "method Greet. param[2] must be i64 have nil");
    }
}
