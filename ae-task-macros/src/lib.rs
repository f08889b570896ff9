//! Attribute macros for `ae-task`.
//!
//! Both turn an `async fn` into a plain function that drives its body on a
//! fresh [`Runtime`](https://docs.rs/ae-task/latest/ae_task/struct.Runtime.html).

mod args;
use args::RuntimeArgs;

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Error, ItemFn, parse_macro_input};

/// Runs `async fn main` on an `ae_task::Runtime`.
///
/// # Panics
///
/// The generated `main` panics if the runtime stalls.
#[proc_macro_attribute]
pub fn main(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as RuntimeArgs);
    let input = parse_macro_input!(item as ItemFn);

    let attrs = &input.attrs;
    let vis = &input.vis;
    let sig = &input.sig;
    let block = &input.block;

    if sig.asyncness.is_none() {
        return Error::new_spanned(
            sig.fn_token,
            "#[ae_task::main] must be used on an async function",
        )
        .to_compile_error()
        .into();
    }

    if sig.ident != "main" {
        return Error::new_spanned(&sig.ident, "#[ae_task::main] must be used on fn main")
            .to_compile_error()
            .into();
    }

    let output = &sig.output;
    let runtime = build_runtime(&args);

    quote! {
        #(#attrs)*
        #vis fn main() #output {
            #runtime
                .block_on(async move #block)
                .expect("ae_task runtime stalled in main")
        }
    }
    .into()
}

/// Runs an `async fn` test on its own `ae_task::Runtime`.
///
/// # Panics
///
/// The generated test panics if the runtime stalls.
#[proc_macro_attribute]
pub fn test(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as RuntimeArgs);
    let input = parse_macro_input!(item as ItemFn);

    let attrs = &input.attrs;
    let vis = &input.vis;
    let sig = &input.sig;
    let block = &input.block;

    if sig.asyncness.is_none() {
        return Error::new_spanned(
            sig.fn_token,
            "#[ae_task::test] must be used on an async function",
        )
        .to_compile_error()
        .into();
    }

    if !sig.inputs.is_empty() {
        return Error::new_spanned(&sig.inputs, "#[ae_task::test] functions take no arguments")
            .to_compile_error()
            .into();
    }

    let name = &sig.ident;
    let output = &sig.output;
    let runtime = build_runtime(&args);

    quote! {
        #[::core::prelude::v1::test]
        #(#attrs)*
        #vis fn #name() #output {
            #runtime
                .block_on(async move #block)
                .expect("ae_task runtime stalled in test")
        }
    }
    .into()
}

fn build_runtime(args: &RuntimeArgs) -> TokenStream2 {
    let event_interval = args
        .event_interval
        .as_ref()
        .map(|n| quote! { .event_interval(#n) });

    quote! {
        ::ae_task::RuntimeBuilder::new()
            #event_interval
            .build()
    }
}
