//! A minimal inversion-of-control container.
//!
//! Types are registered under names, and instances of them are resolved by name under one of two lifecycle
//! [`Scope`]s: a singleton shared for the lifetime of the container, or a fresh prototype on every request.
//! Methods of resolved beans can then be invoked by name with loosely-typed [`Value`] arguments, which are
//! converted to the method's declared parameter types before the call.
//!
//! ```
//! use beans::{args, bean, Scope, Value};
//!
//! #[derive(Default)]
//! struct Counter {
//!     n: i64,
//! }
//!
//! #[bean]
//! impl Counter {
//!     #[method(name = "Add")]
//!     fn add(&self, #[variadic] xs: Vec<i64>) -> i64 {
//!         self.n + xs.iter().sum::<i64>()
//!     }
//! }
//!
//! let beans = beans::BeanContainer::new();
//! beans.register("Counter", Counter::default())?;
//!
//! let counter = beans.resolve("Counter", Scope::Prototype)?;
//! assert_eq!(counter.invoke("Add", args![1, 2, 3])?, vec![Value::I64(6)]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! The process-wide container [`BEANS`] backs the free functions [`register`], [`resolve`] and
//! [`resolve_as`].
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(rust_2018_idioms)]
#![warn(missing_debug_implementations)]
#![deny(unused_must_use)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod bean;
pub mod error;
pub mod invoke;
pub mod registry;
pub mod value;

use std::{borrow::Cow, sync::Arc};

pub use bean::{Bean, BeanRef, Method};
#[cfg(feature = "macros")]
pub use beans_macros::{bean, Bean};
pub use error::{InvokeError, RegistryError};
pub use invoke::invoke;
pub use registry::{BeanContainer, BeanType, Scope, BEANS};
pub use value::{FromValue, GetType, IntoValue, Type, Value};

/// Registers the type of `exemplar` under `name` in the global container.
///
/// See [`BeanContainer::register`].
pub fn register<B: Bean + Default>(
    name: impl Into<Cow<'static, str>>,
    exemplar: B,
) -> Result<(), RegistryError> {
    BEANS.register(name, exemplar)
}

/// Resolves a bean by name from the global container.
///
/// See [`BeanContainer::resolve`].
pub fn resolve(name: &str, scope: Scope) -> Result<BeanRef, RegistryError> {
    BEANS.resolve(name, scope)
}

/// Resolves a bean by name from the global container as its concrete type.
///
/// See [`BeanContainer::resolve_as`].
pub fn resolve_as<B: Bean>(name: &str, scope: Scope) -> Result<Arc<B>, RegistryError> {
    BEANS.resolve_as(name, scope)
}

/// Builds a `Vec<Value>` of invocation arguments from Rust values.
///
/// ```
/// use beans::{args, Value};
///
/// assert_eq!(args![1, "two"], vec![Value::I32(1), Value::Str("two".to_string())]);
/// ```
#[macro_export]
macro_rules! args {
    ($( $arg:expr ),* $(,)?) => {
        ::std::vec![$( $crate::IntoValue::into_value($arg) ),*]
    };
}

#[doc(hidden)]
pub mod __private {
    use crate::{
        error::InvokeError,
        value::{FromValue, GetType, Value},
    };

    pub use once_cell::sync::Lazy;

    /// Arguments of a generated method call, converted to parameter types one at a time.
    #[derive(Debug)]
    pub struct Args {
        method: &'static str,
        expected: usize,
        got: usize,
        args: std::vec::IntoIter<Value>,
    }

    impl Args {
        /// Wraps the raw arguments of `method`, which declares `expected` parameters.
        pub fn new(method: &'static str, expected: usize, args: Vec<Value>) -> Self {
            Args {
                method,
                expected,
                got: args.len(),
                args: args.into_iter(),
            }
        }

        /// Takes the next argument as a `T`.
        pub fn next<T: FromValue + GetType>(&mut self) -> Result<T, InvokeError> {
            let position = self.got - self.args.len();
            let value = self.args.next().ok_or(InvokeError::Arity {
                method: self.method,
                expected: self.expected,
                got: self.got,
                variadic: false,
            })?;
            let actual = value.get_type();
            T::from_value(value).ok_or_else(|| InvokeError::TypeMismatch {
                method: self.method,
                position,
                expected: T::get_type(),
                actual,
            })
        }
    }
}
