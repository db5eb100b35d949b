use std::{any::Any, sync::Arc};

use crate::bean::BeanRef;

use super::{Object, Value};

/// Conversion of a Rust value into a [`Value`].
pub trait IntoValue {
    /// Wraps `self` as a dynamic value.
    fn into_value(self) -> Value;
}

/// Conversion of a [`Value`] back into a Rust value.
///
/// This does no coercion: the value must already be of the exact variant for `Self`, as produced by
/// [`Value::convert`] with `Self`'s [`GetType`](super::GetType).
pub trait FromValue: Sized {
    /// Unwraps the value, or returns `None` if it is of another variant.
    fn from_value(value: Value) -> Option<Self>;
}

macro_rules! impl_scalar {
    ($( $ty:ty => $variant:ident ),* $(,)?) => {
        $(
            impl IntoValue for $ty {
                fn into_value(self) -> Value {
                    Value::$variant(self)
                }
            }

            impl FromValue for $ty {
                fn from_value(value: Value) -> Option<Self> {
                    match value {
                        Value::$variant(v) => Some(v),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_scalar! {
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    String => Str,
    BeanRef => Bean,
}

impl IntoValue for &str {
    fn into_value(self) -> Value {
        Value::Str(self.to_owned())
    }
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

impl FromValue for Value {
    fn from_value(value: Value) -> Option<Self> {
        Some(value)
    }
}

impl<T: IntoValue> IntoValue for Option<T> {
    fn into_value(self) -> Value {
        match self {
            Some(value) => value.into_value(),
            None => Value::Nil,
        }
    }
}

impl<T: IntoValue> IntoValue for Vec<T> {
    fn into_value(self) -> Value {
        Value::List(self.into_iter().map(IntoValue::into_value).collect())
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::List(items) => items.into_iter().map(T::from_value).collect(),
            _ => None,
        }
    }
}

impl<T: Any + Send + Sync> IntoValue for Arc<T> {
    fn into_value(self) -> Value {
        Value::Object(Object::from_arc(self))
    }
}

impl<T: Any + Send + Sync> FromValue for Arc<T> {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(object) => object.downcast().ok(),
            Value::Bean(bean) => bean.into_any().downcast().ok(),
            _ => None,
        }
    }
}
