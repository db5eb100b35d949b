//! Bean registry for registering types under names and resolving instances of them.

use std::{
    any::{self, TypeId},
    borrow::Cow,
    collections::HashMap,
    fmt,
    str::FromStr,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::{
    bean::{Bean, BeanRef},
    error::RegistryError,
};

/// Global bean container, used by [`register`](crate::register) and [`resolve`](crate::resolve).
pub static BEANS: Lazy<BeanContainer> = Lazy::new(BeanContainer::new);

/// Lifecycle policy of a resolved bean.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// One shared instance per name, created on first request.
    #[default]
    Singleton,
    /// A new instance on every request.
    Prototype,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Singleton => write!(f, "singleton"),
            Scope::Prototype => write!(f, "prototype"),
        }
    }
}

/// Error parsing a [`Scope`] from a string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseScopeError(String);

impl fmt::Display for ParseScopeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown bean scope {}", self.0)
    }
}

impl std::error::Error for ParseScopeError {}

impl FromStr for Scope {
    type Err = ParseScopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "singleton" => Ok(Scope::Singleton),
            "prototype" => Ok(Scope::Prototype),
            _ => Err(ParseScopeError(s.to_string())),
        }
    }
}

/// The declared type of a registered bean.
///
/// Holds everything needed to construct zero-valued instances of it.
#[derive(Clone, Copy)]
pub struct BeanType {
    type_id: TypeId,
    type_name: &'static str,
    construct: fn() -> BeanRef,
}

impl BeanType {
    /// The bean type of `B`.
    pub fn of<B: Bean + Default>() -> Self {
        BeanType {
            type_id: TypeId::of::<B>(),
            type_name: any::type_name::<B>(),
            construct: construct::<B>,
        }
    }

    /// Type id of the concrete bean type.
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Name of the concrete bean type.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns `true` if this is the bean type of `B`.
    pub fn is<B: Bean>(&self) -> bool {
        self.type_id == TypeId::of::<B>()
    }

    /// Constructs a new zero-valued instance.
    pub fn instantiate(&self) -> BeanRef {
        (self.construct)()
    }
}

impl fmt::Debug for BeanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BeanType")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

impl PartialEq for BeanType {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for BeanType {}

fn construct<B: Bean + Default>() -> BeanRef {
    Arc::new(B::default())
}

#[derive(Debug, Default)]
struct Beans {
    types: HashMap<Cow<'static, str>, BeanType>,
    instances: HashMap<Cow<'static, str>, BeanRef>,
}

/// A bean container mapping names to bean types and cached singleton instances.
///
/// A single lock guards both maps, so registration and resolution may happen concurrently. Registrations and
/// singleton instances live as long as the container.
#[derive(Debug, Default)]
pub struct BeanContainer {
    beans: Mutex<Beans>,
}

impl BeanContainer {
    /// Creates a new empty bean container.
    pub fn new() -> Self {
        BeanContainer::default()
    }

    /// Creates a new empty bean container with room for at least `capacity` bean types.
    pub fn with_capacity(capacity: usize) -> Self {
        BeanContainer {
            beans: Mutex::new(Beans {
                types: HashMap::with_capacity(capacity),
                instances: HashMap::with_capacity(capacity),
            }),
        }
    }

    /// Registers the type of `exemplar` under `name`.
    ///
    /// Only the type is kept; the exemplar itself is dropped. Instances are constructed later with
    /// [`Default`]. Fails with [`RegistryError::DuplicateName`] if a type is already registered under `name`,
    /// leaving the existing registration intact.
    pub fn register<B: Bean + Default>(
        &self,
        name: impl Into<Cow<'static, str>>,
        exemplar: B,
    ) -> Result<(), RegistryError> {
        drop(exemplar);
        self.register_type(name, BeanType::of::<B>())
    }

    /// Registers a bean type under `name`.
    pub fn register_type(
        &self,
        name: impl Into<Cow<'static, str>>,
        bean_type: BeanType,
    ) -> Result<(), RegistryError> {
        let name = name.into();
        let mut beans = self.lock();
        if beans.types.contains_key(&name) {
            return Err(RegistryError::DuplicateName(name));
        }

        trace!(%name, type_name = bean_type.type_name, "bean registered");
        beans.types.insert(name, bean_type);
        Ok(())
    }

    /// Resolves a bean by name.
    ///
    /// With [`Scope::Prototype`] a new zero-valued instance is constructed on every call, and the singleton
    /// cache is neither consulted nor populated. With [`Scope::Singleton`] the cached instance is returned,
    /// constructing it on the first request; every later request returns the same instance.
    ///
    /// Singletons are constructed while the container is locked, so a bean's [`Default`] impl must not
    /// resolve beans from the same container.
    pub fn resolve(&self, name: &str, scope: Scope) -> Result<BeanRef, RegistryError> {
        match scope {
            Scope::Prototype => {
                let bean_type = self.bean_type(name)?;
                trace!(%name, %scope, "constructing bean");
                Ok(bean_type.instantiate())
            }
            Scope::Singleton => {
                let mut beans = self.lock();
                if let Some(bean) = beans.instances.get(name) {
                    return Ok(bean.clone());
                }

                // A cached instance implies a registration, so only a cache miss looks up the type.
                let (name, bean_type) = beans
                    .types
                    .get_key_value(name)
                    .map(|(name, bean_type)| (name.clone(), *bean_type))
                    .ok_or_else(|| RegistryError::UnknownName(name.to_string()))?;
                debug!(%name, %scope, type_name = bean_type.type_name, "constructing singleton bean");
                let bean = bean_type.instantiate();
                beans.instances.insert(name, bean.clone());
                Ok(bean)
            }
        }
    }

    /// Resolves a bean by name as its concrete type `B`.
    ///
    /// Fails with [`RegistryError::BadBeanType`] if the bean registered under `name` is not a `B`.
    pub fn resolve_as<B: Bean>(&self, name: &str, scope: Scope) -> Result<Arc<B>, RegistryError> {
        self.resolve(name, scope)?
            .downcast_arc()
            .map_err(|bean| RegistryError::BadBeanType {
                name: name.to_string(),
                expected: any::type_name::<B>(),
                actual: bean.type_name(),
            })
    }

    /// The bean type registered under `name`.
    pub fn bean_type(&self, name: &str) -> Result<BeanType, RegistryError> {
        self.lock()
            .types
            .get(name)
            .copied()
            .ok_or_else(|| RegistryError::UnknownName(name.to_string()))
    }

    /// Returns `true` if a bean type has been registered under `name`.
    pub fn contains_name(&self, name: &str) -> bool {
        self.lock().types.contains_key(name)
    }

    /// The registered bean names, in arbitrary order.
    pub fn names(&self) -> Vec<Cow<'static, str>> {
        self.lock().types.keys().cloned().collect()
    }

    /// The number of registered bean types.
    pub fn len(&self) -> usize {
        self.lock().types.len()
    }

    /// Returns `true` if no bean type has been registered.
    pub fn is_empty(&self) -> bool {
        self.lock().types.is_empty()
    }

    /// The number of singleton instances constructed so far.
    pub fn cached_len(&self) -> usize {
        self.lock().instances.len()
    }

    // The maps are never left half-updated, so a panic in a bean's `Default` cannot corrupt them.
    fn lock(&self) -> MutexGuard<'_, Beans> {
        self.beans.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
