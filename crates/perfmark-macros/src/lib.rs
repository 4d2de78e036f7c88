use proc_macro::TokenStream;
use quote::quote;
use syn::{ItemFn, LitStr, parse_macro_input};

/// Prints a report of every measurement taken by the global tracker when the
/// annotated function returns.
#[proc_macro_attribute]
pub fn main(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    let attrs = &input.attrs;
    let vis = &input.vis;
    let sig = &input.sig;
    let block = &input.block;

    let output = quote! {
        #(#attrs)*
        #vis #sig {
            let _perfmark = perfmark::ReportGuard::new(perfmark::Format::Table);

            #block
        }
    };

    output.into()
}

/// Measures every call of the annotated function against the global tracker.
///
/// The identifier defaults to `module_path!()::fn_name`; pass a string literal
/// to choose one explicitly: `#[perfmark::measure("AppLaunch")]`.
#[proc_macro_attribute]
pub fn measure(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    let attrs = &input.attrs;
    let vis = &input.vis;
    let sig = &input.sig;
    let block = &input.block;

    let identifier = if attr.is_empty() {
        let name = sig.ident.to_string();
        quote! { concat!(module_path!(), "::", #name) }
    } else {
        let lit = parse_macro_input!(attr as LitStr);
        quote! { #lit }
    };

    let output = if sig.asyncness.is_some() {
        quote! {
            #(#attrs)*
            #vis #sig {
                async {
                    let _perfmark_guard = perfmark::MeasureGuard::new(#identifier);
                    #block
                }.await
            }
        }
    } else {
        quote! {
            #(#attrs)*
            #vis #sig {
                let _perfmark_guard = perfmark::MeasureGuard::new(#identifier);
                #block
            }
        }
    };

    output.into()
}
