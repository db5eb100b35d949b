//! Loosely-typed values passed to and returned from invoked bean methods.
//!
//! A [`Value`] carries its runtime type with it. Before a method runs, every argument is converted to the
//! method's declared [`Type`] with [`Value::convert`], which only performs conversions that cannot lose
//! information.

mod into;
mod ty;

use std::{
    any::{self, Any, TypeId},
    fmt,
    sync::Arc,
};

pub use into::{FromValue, IntoValue};
pub use ty::{GetType, Type};

use crate::bean::BeanRef;

/// A dynamically typed value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// No value. Never accepted as a method argument.
    Nil,
    /// A boolean.
    Bool(bool),
    /// A 1-byte signed integer.
    I8(i8),
    /// A 2-byte signed integer.
    I16(i16),
    /// A 4-byte signed integer.
    I32(i32),
    /// An 8-byte signed integer.
    I64(i64),
    /// A 1-byte unsigned integer.
    U8(u8),
    /// A 2-byte unsigned integer.
    U16(u16),
    /// A 4-byte unsigned integer.
    U32(u32),
    /// An 8-byte unsigned integer.
    U64(u64),
    /// A 4-byte floating point.
    F32(f32),
    /// An 8-byte floating point.
    F64(f64),
    /// An owned UTF-8 string.
    Str(String),
    /// A list of values.
    List(Vec<Value>),
    /// A container managed bean.
    Bean(BeanRef),
    /// Any other shared value.
    Object(Object),
}

impl Value {
    /// Wraps an arbitrary shared value.
    pub fn object<T: Any + Send + Sync>(value: T) -> Self {
        Value::Object(Object::new(value))
    }

    /// Returns `true` if this is [`Value::Nil`].
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// The runtime type of this value, or `None` for [`Value::Nil`].
    ///
    /// A list reports its element type when all elements agree, and [`Type::Any`] otherwise.
    pub fn get_type(&self) -> Option<Type> {
        Some(match self {
            Value::Nil => return None,
            Value::Bool(_) => Type::Bool,
            Value::I8(_) => Type::I8,
            Value::I16(_) => Type::I16,
            Value::I32(_) => Type::I32,
            Value::I64(_) => Type::I64,
            Value::U8(_) => Type::U8,
            Value::U16(_) => Type::U16,
            Value::U32(_) => Type::U32,
            Value::U64(_) => Type::U64,
            Value::F32(_) => Type::F32,
            Value::F64(_) => Type::F64,
            Value::Str(_) => Type::Str,
            Value::List(items) => {
                let mut types = items.iter().map(Value::get_type);
                let elem = match types.next() {
                    Some(Some(first)) if types.all(|ty| ty.as_ref() == Some(&first)) => first,
                    _ => Type::Any,
                };
                Type::List(Box::new(elem))
            }
            Value::Bean(bean) => Type::Object {
                id: Any::type_id(bean.as_any()),
                name: bean.type_name(),
            },
            Value::Object(object) => Type::Object {
                id: object.type_id,
                name: object.type_name,
            },
        })
    }

    /// Converts this value to the type `to`, if a lossless conversion exists.
    ///
    /// Identical types always convert. Numbers widen along the std `From` conversions. Lists convert
    /// element-wise. Beans convert to [`Type::Bean`] and to their own concrete type. [`Type::Any`] accepts
    /// everything but [`Value::Nil`], which never converts.
    pub fn convert(self, to: &Type) -> Option<Value> {
        match (self, to) {
            (Value::Nil, _) => None,
            (value, Type::Any) => Some(value),
            (Value::List(items), Type::List(elem)) => items
                .into_iter()
                .map(|item| item.convert(elem))
                .collect::<Option<Vec<_>>>()
                .map(Value::List),
            (Value::Bean(bean), Type::Bean) => Some(Value::Bean(bean)),
            (Value::Bean(bean), Type::Object { id, .. }) if Any::type_id(bean.as_any()) == *id => {
                Some(Value::Bean(bean))
            }
            (Value::Object(object), Type::Object { id, .. }) if object.type_id == *id => {
                Some(Value::Object(object))
            }
            (value, to) => widen(value, to),
        }
    }
}

macro_rules! widen {
    ($value:expr, $to:expr; $( $from:ident => [$( $into:ident ),*] ),* $(,)?) => {
        match ($value, $to) {
            $(
                (Value::$from(v), Type::$from) => Some(Value::$from(v)),
                $( (Value::$from(v), Type::$into) => Some(Value::$into(v.into())), )*
            )*
            _ => None,
        }
    };
}

fn widen(value: Value, to: &Type) -> Option<Value> {
    widen! { value, to;
        Bool => [],
        Str => [],
        I8 => [I16, I32, I64, F32, F64],
        I16 => [I32, I64, F32, F64],
        I32 => [I64, F64],
        I64 => [],
        U8 => [U16, U32, U64, I16, I32, I64, F32, F64],
        U16 => [U32, U64, I32, I64, F32, F64],
        U32 => [U64, I64, F64],
        U64 => [],
        F32 => [F64],
        F64 => [],
    }
}

/// A shared value of any `'static` type, compared by identity.
#[derive(Clone)]
pub struct Object {
    value: Arc<dyn Any + Send + Sync>,
    type_id: TypeId,
    type_name: &'static str,
}

impl Object {
    /// Wraps a value.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Object::from_arc(Arc::new(value))
    }

    /// Wraps an already shared value.
    pub fn from_arc<T: Any + Send + Sync>(value: Arc<T>) -> Self {
        Object {
            value,
            type_id: TypeId::of::<T>(),
            type_name: any::type_name::<T>(),
        }
    }

    /// Name of the wrapped type.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns a reference to the inner value if it is of type `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref()
    }

    /// Returns the shared inner value if it is of type `T`.
    pub fn downcast<T: Any + Send + Sync>(self) -> Result<Arc<T>, Self> {
        if self.type_id != TypeId::of::<T>() {
            return Err(self);
        }

        let Object {
            value,
            type_id,
            type_name,
        } = self;
        value.downcast().map_err(|value| Object {
            value,
            type_id,
            type_name,
        })
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object")
            .field("type", &self.type_name)
            .finish_non_exhaustive()
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.value, &other.value)
    }
}
