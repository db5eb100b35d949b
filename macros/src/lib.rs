mod bean_methods;
mod derive_bean;

use bean_methods::BeanMethods;
use derive_bean::DeriveBean;
use proc_macro::TokenStream;
use quote::ToTokens;
use syn::parse_macro_input;

/// Attribute macro placed on the `impl` block of a bean to define its dispatchable methods.
///
/// Methods on the impl block are marked with `#[method]`, which takes an optional `name = "..."` to change
/// the name the method is invoked by. The default is the method's ident. A final parameter of type `Vec<T>`
/// marked `#[variadic]` makes the method take a variadic tail of `T`s.
///
/// Methods must take `&self`. A method returning `()` has no results, a method returning a tuple has one
/// result per element, and any other method has a single result.
///
/// The `#[bean(name = "...")]` attribute can be specified to change the bean's
/// [Bean::type_name](https://docs.rs/beans/latest/beans/bean/trait.Bean.html#method.type_name).
/// The default value is the bean's ident.
///
/// # Example
///
/// ```ignore
/// use beans::bean;
///
/// #[derive(Default)]
/// struct Counter {
///     n: i64,
/// }
///
/// #[bean]
/// impl Counter {
///     #[method(name = "Add")]
///     pub fn add(&self, #[variadic] xs: Vec<i64>) -> i64 {
///         self.n + xs.iter().sum::<i64>()
///     }
///
///     #[method]
///     pub fn split(&self, at: i64) -> (i64, i64) {
///         (self.n - at, at)
///     }
/// }
///
/// counter.invoke("Add", args![1, 2, 3])?;
/// ```
///
/// <details>
/// <summary>See expanded code</summary>
///
/// ```ignore
/// #[automatically_derived]
/// impl ::beans::bean::Bean for Counter {
///     fn type_name(&self) -> &'static str {
///         "Counter"
///     }
///
///     fn as_any(&self) -> &dyn ::std::any::Any {
///         self
///     }
///
///     fn into_any(self: ::std::sync::Arc<Self>) -> ::std::sync::Arc<dyn ::std::any::Any + Send + Sync> {
///         self
///     }
///
///     fn methods(&self) -> &'static [::beans::bean::Method] {
///         static METHODS: ::beans::__private::Lazy<::std::vec::Vec<::beans::bean::Method>> =
///             ::beans::__private::Lazy::new(|| ::std::vec![
///                 ::beans::bean::Method::variadic(
///                     "Add",
///                     ::std::vec![<Vec<i64> as ::beans::value::GetType>::get_type()],
///                     ::std::vec![<i64 as ::beans::value::GetType>::get_type()],
///                 ),
///                 ::beans::bean::Method::new(
///                     "split",
///                     ::std::vec![<i64 as ::beans::value::GetType>::get_type()],
///                     ::std::vec![
///                         <i64 as ::beans::value::GetType>::get_type(),
///                         <i64 as ::beans::value::GetType>::get_type(),
///                     ],
///                 ),
///             ]);
///         &METHODS
///     }
///
///     fn call(
///         &self,
///         method: &str,
///         args: ::std::vec::Vec<::beans::value::Value>,
///     ) -> ::std::result::Result<::std::vec::Vec<::beans::value::Value>, ::beans::error::InvokeError> {
///         match method {
///             "Add" => {
///                 let mut args = ::beans::__private::Args::new("Add", 1, args);
///                 let xs: Vec<i64> = args.next()?;
///                 let result = self.add(xs);
///                 Ok(::std::vec![::beans::value::IntoValue::into_value(result)])
///             }
///             "split" => {
///                 let mut args = ::beans::__private::Args::new("split", 1, args);
///                 let at: i64 = args.next()?;
///                 let (result0, result1) = self.split(at);
///                 Ok(::std::vec![
///                     ::beans::value::IntoValue::into_value(result0),
///                     ::beans::value::IntoValue::into_value(result1),
///                 ])
///             }
///             _ => Err(::beans::error::InvokeError::NoSuchMethod {
///                 bean: ::beans::bean::Bean::type_name(self),
///                 method: method.to_string(),
///             }),
///         }
///     }
/// }
/// ```
/// </details>
#[proc_macro_attribute]
pub fn bean(attr: TokenStream, item: TokenStream) -> TokenStream {
    let attrs = parse_macro_input!(attr with derive_bean::parse_bean_attrs);
    let mut bean_methods = parse_macro_input!(item as BeanMethods);
    bean_methods.set_name(attrs.name);
    TokenStream::from(bean_methods.into_token_stream())
}

/// Derive macro implementing the [Bean](https://docs.rs/beans/latest/beans/bean/trait.Bean.html) trait for
/// beans without dispatchable methods.
///
/// The `#[bean_name = "..."]` attribute can be specified to change the bean's
/// [Bean::type_name](https://docs.rs/beans/latest/beans/bean/trait.Bean.html#method.type_name).
/// The default value is the bean's ident.
///
/// Beans with methods use the [`macro@bean`] attribute on their impl block instead. Generic structs are
/// rejected.
///
/// # Example
///
/// ```ignore
/// use beans::Bean;
///
/// #[derive(Bean, Default)]
/// #[bean_name = "settings"]
/// struct Settings {
///     retries: u32,
/// }
/// ```
#[proc_macro_derive(Bean, attributes(bean_name))]
pub fn derive_bean(input: TokenStream) -> TokenStream {
    let derive_bean = parse_macro_input!(input as DeriveBean);
    TokenStream::from(derive_bean.into_token_stream())
}
