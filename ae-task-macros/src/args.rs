use syn::parse::{Parse, ParseStream};
use syn::punctuated::Punctuated;
use syn::{Error, Expr, ExprLit, Lit, LitInt, MetaNameValue, Token};

/// Arguments accepted by `#[ae_task::main]` and `#[ae_task::test]`.
///
/// ```text
/// #[ae_task::main(event_interval = 32)]
/// ```
#[derive(Default)]
pub(crate) struct RuntimeArgs {
    pub(crate) event_interval: Option<LitInt>,
}

impl Parse for RuntimeArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut args = RuntimeArgs::default();
        let pairs = Punctuated::<MetaNameValue, Token![,]>::parse_terminated(input)?;

        for pair in pairs {
            if !pair.path.is_ident("event_interval") {
                return Err(Error::new_spanned(
                    &pair.path,
                    "unknown argument, expected `event_interval`",
                ));
            }

            if args.event_interval.is_some() {
                return Err(Error::new_spanned(&pair.path, "`event_interval` set twice"));
            }

            let Expr::Lit(ExprLit {
                lit: Lit::Int(value),
                ..
            }) = &pair.value
            else {
                return Err(Error::new_spanned(
                    &pair.value,
                    "`event_interval` must be an integer literal",
                ));
            };

            if value.base10_parse::<usize>()? == 0 {
                return Err(Error::new_spanned(value, "`event_interval` must be > 0"));
            }

            args.event_interval = Some(value.clone());
        }

        Ok(args)
    }
}
