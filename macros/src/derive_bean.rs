use quote::{quote, ToTokens};
use syn::{
    custom_keyword,
    parse::{Parse, ParseStream},
    punctuated::Punctuated,
    spanned::Spanned,
    DeriveInput, Expr, ExprLit, Generics, Ident, Lit, LitStr, Meta, Token,
};

pub struct DeriveBean {
    name: Option<LitStr>,
    ident: Ident,
    generics: Generics,
}

impl ToTokens for DeriveBean {
    fn to_tokens(&self, tokens: &mut proc_macro2::TokenStream) {
        let Self {
            name,
            ident,
            generics,
        } = self;
        let name = match name {
            Some(s) => s.value(),
            None => ident.to_string(),
        };
        let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

        tokens.extend(quote! {
            #[automatically_derived]
            impl #impl_generics ::beans::bean::Bean for #ident #ty_generics #where_clause {
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
            }
        });
    }
}

impl Parse for DeriveBean {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let input: DeriveInput = input.parse()?;
        let ident = input.ident;
        let generics = input.generics;
        if !generics.params.is_empty() {
            return Err(syn::Error::new(
                generics.span(),
                "derived beans cannot be generic",
            ));
        }
        let mut name = None;
        for attr in input.attrs {
            if attr.path().is_ident("bean_name") {
                if name.is_some() {
                    return Err(syn::Error::new(attr.span(), "bean name already specified"));
                }
                match &attr.meta {
                    Meta::NameValue(meta) => match &meta.value {
                        Expr::Lit(ExprLit {
                            lit: Lit::Str(s), ..
                        }) => name = Some(s.clone()),
                        value => {
                            return Err(syn::Error::new(value.span(), "expected a string literal"))
                        }
                    },
                    meta => {
                        return Err(syn::Error::new(
                            meta.span(),
                            "expected #[bean_name = \"...\"]",
                        ))
                    }
                }
            }
        }

        Ok(DeriveBean {
            name,
            ident,
            generics,
        })
    }
}

#[derive(Default)]
pub struct BeanAttrs {
    pub name: Option<LitStr>,
}

/// Parses the arguments of `#[bean(...)]` and `#[method(...)]`, which only accept `name = "..."`.
pub fn parse_bean_attrs(input: ParseStream) -> syn::Result<BeanAttrs> {
    let attrs: Punctuated<(name, LitStr), Token![,]> =
        Punctuated::parse_terminated_with(input, |input| {
            let key: name = input.parse()?;
            let _: Token![=] = input.parse()?;
            let value: LitStr = input.parse()?;
            Ok((key, value))
        })?;

    let mut name = None;
    for (key, value) in attrs {
        if name.is_some() {
            return Err(syn::Error::new(key.span, "name already set"));
        }
        name = Some(value);
    }

    Ok(BeanAttrs { name })
}

custom_keyword!(name);
