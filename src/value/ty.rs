use std::{
    any::{self, Any, TypeId},
    fmt,
    sync::Arc,
};

use crate::bean::BeanRef;

use super::Value;

/// The declared type of a method parameter or result.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Type {
    /// Accepts any value except [`Value::Nil`], unchanged.
    Any,
    /// A boolean.
    Bool,
    /// A 1-byte signed integer.
    I8,
    /// A 2-byte signed integer.
    I16,
    /// A 4-byte signed integer.
    I32,
    /// An 8-byte signed integer.
    I64,
    /// A 1-byte unsigned integer.
    U8,
    /// A 2-byte unsigned integer.
    U16,
    /// A 4-byte unsigned integer.
    U32,
    /// An 8-byte unsigned integer.
    U64,
    /// A 4-byte floating point.
    F32,
    /// An 8-byte floating point.
    F64,
    /// An owned UTF-8 string.
    Str,
    /// A list of elements of one type.
    List(Box<Type>),
    /// Any container managed bean.
    Bean,
    /// A concrete Rust type, shared behind an [`Arc`].
    Object {
        /// Type id of the concrete type.
        id: TypeId,
        /// Type name, for display only.
        name: &'static str,
    },
}

impl Type {
    /// The type describing `Arc<T>` arguments.
    pub fn object<T: Any>() -> Self {
        Type::Object {
            id: TypeId::of::<T>(),
            name: any::type_name::<T>(),
        }
    }

    /// The element type if this is a list.
    pub fn elem(&self) -> Option<&Type> {
        match self {
            Type::List(elem) => Some(elem),
            _ => None,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Any => write!(f, "Value"),
            Type::Bool => write!(f, "bool"),
            Type::I8 => write!(f, "i8"),
            Type::I16 => write!(f, "i16"),
            Type::I32 => write!(f, "i32"),
            Type::I64 => write!(f, "i64"),
            Type::U8 => write!(f, "u8"),
            Type::U16 => write!(f, "u16"),
            Type::U32 => write!(f, "u32"),
            Type::U64 => write!(f, "u64"),
            Type::F32 => write!(f, "f32"),
            Type::F64 => write!(f, "f64"),
            Type::Str => write!(f, "String"),
            Type::List(elem) => write!(f, "Vec<{elem}>"),
            Type::Bean => write!(f, "BeanRef"),
            Type::Object { name, .. } => write!(f, "Arc<{name}>"),
        }
    }
}

/// Rust types with a statically known [`Type`].
pub trait GetType {
    /// The declared type used when this Rust type appears in a method signature.
    fn get_type() -> Type;
}

macro_rules! impl_get_type {
    ($( $ty:ty => $variant:ident ),* $(,)?) => {
        $(
            impl GetType for $ty {
                fn get_type() -> Type {
                    Type::$variant
                }
            }
        )*
    };
}

impl_get_type! {
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
    Value => Any,
    BeanRef => Bean,
}

impl<T: GetType> GetType for Vec<T> {
    fn get_type() -> Type {
        Type::List(Box::new(T::get_type()))
    }
}

impl GetType for &str {
    fn get_type() -> Type {
        Type::Str
    }
}

/// `None` becomes [`Value::Nil`], so an optional result is declared as its inner type.
impl<T: GetType> GetType for Option<T> {
    fn get_type() -> Type {
        T::get_type()
    }
}

impl<T: Any + Send + Sync> GetType for Arc<T> {
    fn get_type() -> Type {
        Type::object::<T>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_nests_lists() {
        assert_eq!(<Vec<Vec<i64>>>::get_type().to_string(), "Vec<Vec<i64>>");
        assert_eq!(String::get_type().to_string(), "String");
        assert_eq!(<Value as GetType>::get_type(), Type::Any);
    }

    #[test]
    fn object_types_compare_by_type_id() {
        struct Config;
        struct Other;

        assert_eq!(<Arc<Config>>::get_type(), Type::object::<Config>());
        assert_ne!(<Arc<Config>>::get_type(), <Arc<Other>>::get_type());
        assert_eq!(<Arc<Config>>::get_type().elem(), None);
    }
}
