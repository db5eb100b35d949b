//! Dynamic method invocation on beans.
//!
//! [`invoke`] looks a method up by name, checks the number of arguments against its signature, converts
//! each argument to the declared parameter type and only then calls the method. Any failure is reported
//! before the method body runs.

use tracing::trace;

use crate::{bean::Bean, error::InvokeError, value::Value};

/// Invokes the method `method` on `bean` with loosely-typed arguments.
///
/// - The method name must match exactly (case-sensitive), otherwise [`InvokeError::NoSuchMethod`].
/// - A method with `n` parameters takes exactly `n` arguments. A variadic method takes `n` or more, the
///   arguments from position `n - 1` on forming the variadic tail. Otherwise [`InvokeError::Arity`].
/// - Each argument must convert to the parameter type at its position (see [`Value::convert`]), otherwise
///   [`InvokeError::TypeMismatch`]. [`Value::Nil`] is never accepted.
///
/// Returns all values returned by the method, in order.
pub fn invoke(
    bean: &dyn Bean,
    method: &str,
    args: Vec<Value>,
) -> Result<Vec<Value>, InvokeError> {
    let signature = bean
        .methods()
        .iter()
        .find(|candidate| candidate.name() == method)
        .ok_or_else(|| InvokeError::NoSuchMethod {
            bean: bean.type_name(),
            method: method.to_string(),
        })?;

    let num_in = signature.num_in();
    let variadic = signature.is_variadic();
    let got = args.len();
    let arity_error = || InvokeError::Arity {
        method: signature.name(),
        expected: num_in,
        got,
        variadic,
    };
    if got < num_in || (!variadic && got != num_in) {
        return Err(arity_error());
    }

    let mut params = Vec::with_capacity(num_in);
    let mut tail = Vec::new();
    for (position, arg) in args.into_iter().enumerate() {
        let expected = signature.param_type(position).ok_or_else(arity_error)?;
        let actual = arg.get_type();
        let converted = arg
            .convert(expected)
            .ok_or_else(|| InvokeError::TypeMismatch {
                method: signature.name(),
                position,
                expected: expected.clone(),
                actual,
            })?;
        if variadic && position + 1 >= num_in {
            tail.push(converted);
        } else {
            params.push(converted);
        }
    }
    if variadic {
        params.push(Value::List(tail));
    }

    trace!(bean = bean.type_name(), %method, "invoking bean method");
    bean.call(signature.name(), params)
}

#[cfg(test)]
mod tests {
    use std::{any::Any, sync::Arc};

    use once_cell::sync::Lazy;

    use super::*;
    use crate::{
        bean::Method,
        value::{FromValue, Type},
    };

    /// Implements the dispatch by hand, the way the `bean` macro expands.
    #[derive(Default)]
    struct Calculator;

    static METHODS: Lazy<Vec<Method>> = Lazy::new(|| {
        vec![
            Method::new("Half", vec![Type::F64], vec![Type::F64]),
            Method::variadic(
                "Join",
                vec![Type::Str, Type::List(Box::new(Type::Str))],
                vec![Type::Str, Type::U64],
            ),
        ]
    });

    impl Bean for Calculator {
        fn as_any(&self) -> &dyn Any {
            self
        }

        fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
            self
        }

        fn methods(&self) -> &'static [Method] {
            &METHODS
        }

        fn call(&self, method: &str, args: Vec<Value>) -> Result<Vec<Value>, InvokeError> {
            let mut args = args.into_iter();
            match method {
                "Half" => {
                    let x = args.next().and_then(f64::from_value).unwrap();
                    Ok(vec![Value::F64(x / 2.0)])
                }
                "Join" => {
                    let sep = args.next().and_then(String::from_value).unwrap();
                    let parts = args.next().and_then(<Vec<String>>::from_value).unwrap();
                    let count = parts.len() as u64;
                    Ok(vec![Value::Str(parts.join(&sep)), Value::U64(count)])
                }
                _ => Err(InvokeError::NoSuchMethod {
                    bean: self.type_name(),
                    method: method.to_string(),
                }),
            }
        }
    }

    #[test]
    fn method_names_are_case_sensitive() {
        let err = invoke(&Calculator, "half", vec![Value::F64(1.0)]).unwrap_err();
        assert!(matches!(err, InvokeError::NoSuchMethod { method, .. } if method == "half"));
    }

    #[test]
    fn fixed_arity_is_exact() {
        let too_few = invoke(&Calculator, "Half", vec![]).unwrap_err();
        assert_eq!(
            too_few,
            InvokeError::Arity {
                method: "Half",
                expected: 1,
                got: 0,
                variadic: false,
            }
        );

        let too_many = invoke(&Calculator, "Half", vec![Value::F64(1.0), Value::F64(2.0)]);
        assert!(matches!(too_many, Err(InvokeError::Arity { got: 2, .. })));
    }

    #[test]
    fn arguments_are_widened_before_the_call() {
        let results = invoke(&Calculator, "Half", vec![Value::I32(5)]).unwrap();
        assert_eq!(results, vec![Value::F64(2.5)]);
    }

    #[test]
    fn variadic_tail_needs_one_element() {
        let args = vec![Value::Str("-".into()), Value::Str("a".into())];
        let results = invoke(&Calculator, "Join", args).unwrap();
        assert_eq!(results, vec![Value::Str("a".into()), Value::U64(1)]);

        let empty_tail = invoke(&Calculator, "Join", vec![Value::Str("-".into())]).unwrap_err();
        assert_eq!(
            empty_tail,
            InvokeError::Arity {
                method: "Join",
                expected: 2,
                got: 1,
                variadic: true,
            }
        );
        assert_eq!(empty_tail.to_string(), "method Join must have minimum 2 params have 1");

        let missing = invoke(&Calculator, "Join", vec![]).unwrap_err();
        assert!(matches!(missing, InvokeError::Arity { variadic: true, got: 0, .. }));
    }

    #[test]
    fn variadic_tail_is_collected() {
        let args = ["-", "a", "b", "c"]
            .into_iter()
            .map(|s| Value::Str(s.to_string()))
            .collect();
        let results = invoke(&Calculator, "Join", args).unwrap();
        assert_eq!(results, vec![Value::Str("a-b-c".into()), Value::U64(3)]);
    }

    #[test]
    fn mismatches_name_the_position() {
        let args = vec![
            Value::Str("-".into()),
            Value::Str("a".into()),
            Value::I64(1),
        ];
        let err = invoke(&Calculator, "Join", args).unwrap_err();
        assert_eq!(
            err,
            InvokeError::TypeMismatch {
                method: "Join",
                position: 2,
                expected: Type::Str,
                actual: Some(Type::I64),
            }
        );
    }

    #[test]
    fn nil_is_rejected() {
        let err = invoke(&Calculator, "Half", vec![Value::Nil]).unwrap_err();
        assert!(matches!(
            err,
            InvokeError::TypeMismatch {
                position: 0,
                actual: None,
                ..
            }
        ));
    }
}
