//! The dispatch capability every container managed type implements.
//!
//! A [`Bean`] describes its dispatchable methods as a static table of [`Method`]s and routes calls by name
//! through [`Bean::call`]. Both are normally generated by the [`bean`](macro@crate::bean) attribute macro:
//!
//! ```
//! use beans::{bean, args, Bean, Value};
//!
//! #[derive(Default)]
//! struct Greeter;
//!
//! #[bean]
//! impl Greeter {
//!     #[method(name = "Greet")]
//!     fn greet(&self, name: String) -> String {
//!         format!("Hello, {name}")
//!     }
//! }
//!
//! let greeter: &dyn Bean = &Greeter;
//! let results = greeter.invoke("Greet", args!["Ada"]).unwrap();
//! assert_eq!(results, vec![Value::Str("Hello, Ada".to_string())]);
//! ```

use std::{any::Any, fmt, ptr, sync::Arc};

use itertools::Itertools;

use crate::{
    error::InvokeError,
    value::{Type, Value},
};

/// A shared reference to a type-erased bean.
pub type BeanRef = Arc<dyn Bean>;

/// A type whose instances can be managed by a [`BeanContainer`](crate::registry::BeanContainer) and have
/// methods invoked on them by name.
///
/// Manual implementations must keep [`methods`](Bean::methods) and [`call`](Bean::call) in agreement: every
/// method listed is callable, and `call` receives arguments already converted to the listed parameter types.
pub trait Bean: Any + Send + Sync {
    /// The type name reported in errors and logs.
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Returns `self` as [`Any`] for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Returns the shared `self` as [`Any`] for downcasting.
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;

    /// The dispatchable methods of this bean.
    fn methods(&self) -> &'static [Method] {
        &[]
    }

    /// Calls a method by name with arguments already converted to its parameter types.
    ///
    /// Prefer [`invoke`](crate::invoke::invoke), which validates and converts the arguments first.
    fn call(&self, method: &str, args: Vec<Value>) -> Result<Vec<Value>, InvokeError> {
        let _ = args;
        Err(InvokeError::NoSuchMethod {
            bean: self.type_name(),
            method: method.to_string(),
        })
    }
}

impl dyn Bean {
    /// Looks up a dispatchable method by its exact name.
    pub fn method(&self, name: &str) -> Option<&'static Method> {
        self.methods().iter().find(|method| method.name == name)
    }

    /// Invokes a method by name, converting the arguments to its parameter types.
    ///
    /// See [`invoke`](crate::invoke::invoke).
    pub fn invoke(&self, method: &str, args: Vec<Value>) -> Result<Vec<Value>, InvokeError> {
        crate::invoke::invoke(self, method, args)
    }

    /// Returns `true` if the bean is of type `T`.
    pub fn is<T: Bean>(&self) -> bool {
        self.as_any().is::<T>()
    }

    /// Returns a reference to the concrete bean if it is of type `T`.
    pub fn downcast_ref<T: Bean>(&self) -> Option<&T> {
        self.as_any().downcast_ref()
    }

    /// Returns the shared concrete bean if it is of type `T`.
    pub fn downcast_arc<T: Bean>(self: Arc<Self>) -> Result<Arc<T>, BeanRef> {
        if self.is::<T>() {
            Ok(self
                .into_any()
                .downcast()
                .unwrap_or_else(|_| unreachable!("type was checked")))
        } else {
            Err(self)
        }
    }
}

impl fmt::Debug for dyn Bean {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bean")
            .field("type", &self.type_name())
            .finish_non_exhaustive()
    }
}

/// Beans compare by identity.
impl PartialEq for dyn Bean {
    fn eq(&self, other: &Self) -> bool {
        ptr::addr_eq(self, other)
    }
}

/// Signature of a dispatchable bean method.
#[derive(Clone, Debug, PartialEq)]
pub struct Method {
    name: &'static str,
    params: Vec<Type>,
    variadic: bool,
    results: Vec<Type>,
}

impl Method {
    /// Describes a method taking a fixed number of parameters.
    pub fn new(name: &'static str, params: Vec<Type>, results: Vec<Type>) -> Self {
        Method {
            name,
            params,
            variadic: false,
            results,
        }
    }

    /// Describes a method whose last parameter, a [`Type::List`], takes a variadic tail of its elements.
    pub fn variadic(name: &'static str, params: Vec<Type>, results: Vec<Type>) -> Self {
        let variadic = matches!(params.last(), Some(Type::List(_)));
        Method {
            name,
            params,
            variadic,
            results,
        }
    }

    /// The method name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Number of declared parameters, counting a variadic tail as one.
    pub fn num_in(&self) -> usize {
        self.params.len()
    }

    /// Declared parameter types.
    pub fn params(&self) -> &[Type] {
        &self.params
    }

    /// Declared result types.
    pub fn results(&self) -> &[Type] {
        &self.results
    }

    /// Returns `true` if the last parameter takes a variadic tail.
    pub fn is_variadic(&self) -> bool {
        self.variadic
    }

    /// The type expected for the argument at `index`.
    ///
    /// Positions at or past the variadic parameter expect its element type.
    pub fn param_type(&self, index: usize) -> Option<&Type> {
        if self.variadic && index + 1 >= self.params.len() {
            return self.params.last().and_then(Type::elem);
        }
        self.params.get(index)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let last = self.params.len().saturating_sub(1);
        let params = self
            .params
            .iter()
            .enumerate()
            .map(|(i, ty)| match ty.elem() {
                Some(elem) if self.variadic && i == last => format!("...{elem}"),
                _ => ty.to_string(),
            })
            .join(", ");
        write!(f, "fn {}({params})", self.name)?;
        match self.results.as_slice() {
            [] => Ok(()),
            [result] => write!(f, " -> {result}"),
            results => write!(f, " -> ({})", results.iter().join(", ")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Plain;

    impl Bean for Plain {
        fn as_any(&self) -> &dyn Any {
            self
        }

        fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
            self
        }
    }

    #[test]
    fn variadic_positions_expect_the_element_type() {
        let add = Method::variadic(
            "Add",
            vec![Type::Str, Type::List(Box::new(Type::I64))],
            vec![Type::I64],
        );
        assert!(add.is_variadic());
        assert_eq!(add.num_in(), 2);
        assert_eq!(add.param_type(0), Some(&Type::Str));
        assert_eq!(add.param_type(1), Some(&Type::I64));
        assert_eq!(add.param_type(5), Some(&Type::I64));
        assert_eq!(add.to_string(), "fn Add(String, ...i64) -> i64");
    }

    #[test]
    fn fixed_methods_have_no_type_past_the_end() {
        let pair = Method::new("Pair", vec![Type::Bool], vec![Type::I8, Type::U8]);
        assert!(!pair.is_variadic());
        assert_eq!(pair.param_type(1), None);
        assert_eq!(pair.to_string(), "fn Pair(bool) -> (i8, u8)");
    }

    #[test]
    fn variadic_requires_a_list_parameter() {
        let method = Method::variadic("Bad", vec![Type::I64], vec![]);
        assert!(!method.is_variadic());
        assert_eq!(method.to_string(), "fn Bad(i64)");
    }

    #[test]
    fn default_bean_has_no_methods() {
        let bean: BeanRef = Arc::new(Plain);
        assert!(bean.methods().is_empty());
        assert!(bean.method("Anything").is_none());
        assert!(matches!(
            bean.call("Anything", vec![]),
            Err(InvokeError::NoSuchMethod { .. })
        ));
        assert!(bean.type_name().ends_with("Plain"));
    }

    #[test]
    fn downcasting_preserves_identity() {
        let bean: BeanRef = Arc::new(Plain);
        assert!(bean.is::<Plain>());
        assert!(bean.downcast_ref::<Plain>().is_some());

        let same = bean.clone();
        assert_eq!(bean, same);
        let plain = bean.clone().downcast_arc::<Plain>().unwrap();
        assert!(ptr::addr_eq(Arc::as_ptr(&plain), Arc::as_ptr(&bean)));
        assert_ne!(bean, Arc::new(Plain) as BeanRef);
    }
}
