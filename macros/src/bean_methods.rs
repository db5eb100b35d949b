use std::collections::HashSet;

use proc_macro2::{Span, TokenStream};
use quote::{format_ident, quote, quote_spanned, ToTokens};
use syn::{
    ext::IdentExt,
    parse::{Parse, ParseStream, Parser},
    spanned::Spanned,
    FnArg, Ident, ImplItem, ImplItemFn, ItemImpl, LitStr, Meta, Pat, ReturnType, Type,
};

use crate::derive_bean::parse_bean_attrs;

pub struct BeanMethods {
    item_impl: ItemImpl,
    ident: Ident,
    name: Option<LitStr>,
    methods: Vec<BeanMethod>,
    errors: Option<syn::Error>,
}

struct BeanMethod {
    name: LitStr,
    fn_ident: Ident,
    params: Vec<(Ident, Type)>,
    variadic: bool,
    results: Results,
    span: Span,
}

enum Results {
    Unit,
    Single(Type),
    Tuple(Vec<Type>),
}

impl BeanMethods {
    pub fn set_name(&mut self, name: Option<LitStr>) {
        self.name = name;
    }

    fn extract_methods(item_impl: &mut ItemImpl) -> (Vec<BeanMethod>, Option<syn::Error>) {
        let mut errors = Vec::new();
        let mut seen = HashSet::new();
        let methods = item_impl
            .items
            .iter_mut()
            .filter_map(|item| match item {
                ImplItem::Fn(impl_item_fn) => {
                    let initial_error_count = errors.len();
                    let mut name = None;
                    let mut is_method = false;
                    impl_item_fn.attrs.retain(|attr| {
                        if !attr.path().is_ident("method") {
                            return true;
                        }
                        if is_method {
                            errors.push(syn::Error::new(
                                attr.span(),
                                "duplicate #[method] attribute",
                            ));
                            return false;
                        }
                        is_method = true;
                        match &attr.meta {
                            Meta::Path(_) => {}
                            Meta::List(list) => match parse_bean_attrs.parse2(list.tokens.clone()) {
                                Ok(attrs) => name = attrs.name,
                                Err(err) => errors.push(err),
                            },
                            Meta::NameValue(meta) => errors.push(syn::Error::new(
                                meta.span(),
                                "expected #[method] or #[method(name = \"...\")]",
                            )),
                        }
                        false
                    });
                    if !is_method {
                        return None;
                    }

                    let name = name.unwrap_or_else(|| {
                        let ident = &impl_item_fn.sig.ident;
                        LitStr::new(&ident.unraw().to_string(), ident.span())
                    });
                    if !seen.insert(name.value()) {
                        errors.push(syn::Error::new(
                            name.span(),
                            format!("duplicate bean method name `{}`", name.value()),
                        ));
                    }

                    let method = BeanMethod::extract(name, impl_item_fn, &mut errors);
                    if errors.len() > initial_error_count {
                        None
                    } else {
                        method
                    }
                }
                _ => None,
            })
            .collect();

        let error = if !errors.is_empty() {
            let mut iter = errors.into_iter();
            let first = iter.next().unwrap();
            Some(iter.fold(first, |mut errors, err| {
                errors.combine(err);
                errors
            }))
        } else {
            None
        };

        (methods, error)
    }

    fn expand_methods(&self) -> TokenStream {
        let descriptors = self.methods.iter().map(|method| {
            let BeanMethod {
                name,
                params,
                variadic,
                results,
                span,
                ..
            } = method;
            let constructor = if *variadic {
                quote! { variadic }
            } else {
                quote! { new }
            };
            let params = params.iter().map(|(_, ty)| get_type(ty));
            let results = match results {
                Results::Unit => vec![],
                Results::Single(ty) => vec![get_type(ty)],
                Results::Tuple(tys) => tys.iter().map(get_type).collect(),
            };

            quote_spanned! {*span=>
                ::beans::bean::Method::#constructor(
                    #name,
                    ::std::vec![#( #params ),*],
                    ::std::vec![#( #results ),*],
                )
            }
        });

        quote! {
            fn methods(&self) -> &'static [::beans::bean::Method] {
                static METHODS: ::beans::__private::Lazy<::std::vec::Vec<::beans::bean::Method>> =
                    ::beans::__private::Lazy::new(|| ::std::vec![#( #descriptors ),*]);
                &METHODS
            }
        }
    }

    fn expand_call(&self) -> TokenStream {
        let arms = self.methods.iter().map(|method| {
            let BeanMethod {
                name,
                fn_ident,
                params,
                results,
                span,
                ..
            } = method;
            let num_in = params.len();
            let idents: Vec<_> = params.iter().map(|(ident, _)| ident).collect();
            let tys = params.iter().map(|(_, ty)| ty);
            let call = quote! { self.#fn_ident(#( #idents ),*) };
            let body = match results {
                Results::Unit => quote! {
                    #call;
                    ::std::result::Result::Ok(::std::vec::Vec::new())
                },
                Results::Single(_) => quote! {
                    ::std::result::Result::Ok(::std::vec![::beans::value::IntoValue::into_value(#call)])
                },
                Results::Tuple(tys) => {
                    let results: Vec<_> = (0..tys.len()).map(|i| format_ident!("__result{i}")).collect();
                    quote! {
                        let (#( #results, )*) = #call;
                        ::std::result::Result::Ok(::std::vec![
                            #( ::beans::value::IntoValue::into_value(#results) ),*
                        ])
                    }
                }
            };

            quote_spanned! {*span=>
                #name => {
                    #[allow(unused_mut)]
                    let mut __args = ::beans::__private::Args::new(#name, #num_in, __args);
                    #( let #idents: #tys = __args.next()?; )*
                    #body
                }
            }
        });

        quote! {
            #[allow(unused_variables)]
            fn call(
                &self,
                __method: &str,
                __args: ::std::vec::Vec<::beans::value::Value>,
            ) -> ::std::result::Result<::std::vec::Vec<::beans::value::Value>, ::beans::error::InvokeError> {
                match __method {
                    #( #arms )*
                    _ => ::std::result::Result::Err(::beans::error::InvokeError::NoSuchMethod {
                        bean: ::beans::bean::Bean::type_name(self),
                        method: ::std::string::ToString::to_string(__method),
                    }),
                }
            }
        }
    }
}

impl BeanMethod {
    fn extract(
        name: LitStr,
        impl_item_fn: &mut ImplItemFn,
        errors: &mut Vec<syn::Error>,
    ) -> Option<Self> {
        let sig = &mut impl_item_fn.sig;
        if let Some(asyncness) = sig.asyncness {
            errors.push(syn::Error::new(
                asyncness.span(),
                "bean methods cannot be async",
            ));
        }
        if !sig.generics.params.is_empty() {
            errors.push(syn::Error::new(
                sig.generics.span(),
                "bean methods cannot be generic",
            ));
        }
        match sig.inputs.first() {
            Some(FnArg::Receiver(receiver))
                if receiver.reference.is_some() && receiver.mutability.is_none() => {}
            Some(FnArg::Receiver(receiver)) => {
                errors.push(syn::Error::new(
                    receiver.span(),
                    "bean methods must take &self",
                ));
            }
            Some(FnArg::Typed(_)) | None => {
                errors.push(syn::Error::new(
                    sig.span(),
                    "bean methods must take &self",
                ));
                return None;
            }
        }

        let last = sig.inputs.len().saturating_sub(1);
        let mut variadic = false;
        let mut params = Vec::new();
        for (i, input) in sig.inputs.iter_mut().enumerate() {
            let FnArg::Typed(pat_type) = input else {
                continue;
            };

            let before = pat_type.attrs.len();
            pat_type.attrs.retain(|attr| !attr.path().is_ident("variadic"));
            if pat_type.attrs.len() != before {
                if i != last {
                    errors.push(syn::Error::new(
                        pat_type.span(),
                        "only the last parameter can be variadic",
                    ));
                } else if !is_vec(&pat_type.ty) {
                    errors.push(syn::Error::new(
                        pat_type.ty.span(),
                        "variadic parameters must be of type Vec<T>",
                    ));
                } else {
                    variadic = true;
                }
            }

            if let Err(err) = validate_param(&pat_type.ty) {
                errors.push(err);
            }
            match pat_type.pat.as_ref() {
                Pat::Ident(pat_ident) => {
                    params.push((pat_ident.ident.clone(), pat_type.ty.as_ref().clone()))
                }
                pat => errors.push(syn::Error::new(
                    pat.span(),
                    "unsupported pattern - arguments must be named when used with the bean macro",
                )),
            }
        }

        let results = match &sig.output {
            ReturnType::Default => Results::Unit,
            ReturnType::Type(_, ty) => match ty.as_ref() {
                Type::Tuple(tuple) if tuple.elems.is_empty() => Results::Unit,
                Type::Tuple(tuple) => Results::Tuple(tuple.elems.iter().cloned().collect()),
                ty => Results::Single(ty.clone()),
            },
        };

        Some(BeanMethod {
            name,
            fn_ident: sig.ident.clone(),
            params,
            variadic,
            results,
            span: sig.span(),
        })
    }
}

impl ToTokens for BeanMethods {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        let item_impl = &self.item_impl;
        let self_ty = &item_impl.self_ty;
        let name = match &self.name {
            Some(s) => s.value(),
            None => self.ident.to_string(),
        };
        let methods = self.expand_methods();
        let call = self.expand_call();
        let errors = self.errors.clone().map(|err| err.into_compile_error());

        tokens.extend(quote! {
            #item_impl

            #[automatically_derived]
            impl ::beans::bean::Bean for #self_ty {
                fn type_name(&self) -> &'static str {
                    #name
                }

                fn as_any(&self) -> &dyn ::std::any::Any {
                    self
                }

                fn into_any(
                    self: ::std::sync::Arc<Self>,
                ) -> ::std::sync::Arc<dyn ::std::any::Any + ::std::marker::Send + ::std::marker::Sync> {
                    self
                }

                #methods

                #call
            }

            #errors
        });
    }
}

impl Parse for BeanMethods {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut item_impl: ItemImpl = input.parse()?;

        if let Some((_, path, _)) = &item_impl.trait_ {
            return Err(syn::Error::new(
                path.span(),
                "the bean macro must be placed on an inherent impl block",
            ));
        }
        if !item_impl.generics.params.is_empty() {
            return Err(syn::Error::new(
                item_impl.generics.span(),
                "bean impls cannot be generic",
            ));
        }

        let ident = match item_impl.self_ty.as_ref() {
            Type::Path(type_path) => type_path
                .path
                .segments
                .last()
                .as_ref()
                .ok_or_else(|| syn::Error::new(type_path.path.span(), "missing ident from path"))?
                .ident
                .clone(),
            _ => {
                return Err(syn::Error::new(
                    item_impl.self_ty.span(),
                    "expected a path or ident",
                ))
            }
        };
        let (methods, errors) = BeanMethods::extract_methods(&mut item_impl);

        Ok(BeanMethods {
            item_impl,
            ident,
            name: None,
            methods,
            errors,
        })
    }
}

fn get_type(ty: &Type) -> TokenStream {
    quote_spanned! {ty.span()=>
        <#ty as ::beans::value::GetType>::get_type()
    }
}

fn is_vec(ty: &Type) -> bool {
    match ty {
        Type::Path(type_path) => type_path
            .path
            .segments
            .last()
            .map(|segment| segment.ident == "Vec")
            .unwrap_or(false),
        Type::Group(group) => is_vec(&group.elem),
        Type::Paren(paren) => is_vec(&paren.elem),
        _ => false,
    }
}

fn validate_param(ty: &Type) -> syn::Result<()> {
    match ty {
        Type::ImplTrait(_) => Err(syn::Error::new(
            ty.span(),
            "impl trait types are not supported in bean methods",
        )),
        Type::Infer(_) => Err(syn::Error::new(
            ty.span(),
            "type cannot be inferred in bean methods",
        )),
        Type::Reference(_) => Err(syn::Error::new(
            ty.span(),
            "references cannot be used as bean method parameters",
        )),
        Type::Group(group) => validate_param(group.elem.as_ref()),
        Type::Paren(ty) => validate_param(&ty.elem),
        _ => Ok(()),
    }
}
