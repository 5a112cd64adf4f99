use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{parse_macro_input, FnArg, GenericArgument, ItemFn, PatType, PathArguments, Type};

enum ArgKind {
    Required,
    Optional,
    Settings,
}

fn is_f64(ty: &Type) -> bool {
    match ty {
        Type::Path(type_path) => type_path
            .path
            .segments
            .last()
            .map(|segment| segment.ident == "f64")
            .unwrap_or(false),
        _ => false,
    }
}

fn classify(ty: &Type, arg_name: &str, fn_name: &str) -> ArgKind {
    match ty {
        Type::Reference(_) => ArgKind::Settings,
        Type::Path(type_path) => {
            let Some(segment) = type_path.path.segments.last() else {
                panic!("Empty type path for '{}' in {}", arg_name, fn_name);
            };
            match segment.ident.to_string().as_str() {
                "f64" => ArgKind::Required,
                "Option" => match &segment.arguments {
                    PathArguments::AngleBracketed(generic)
                        if matches!(
                            generic.args.first(),
                            Some(GenericArgument::Type(inner)) if is_f64(inner)
                        ) =>
                    {
                        ArgKind::Optional
                    }
                    _ => panic!("Argument '{}' of {} must be Option<f64>", arg_name, fn_name),
                },
                other => panic!("Unsupported type {} for '{}' in {}", other, arg_name, fn_name),
            }
        }
        _ => panic!("Unsupported argument type for '{}' in {}", arg_name, fn_name),
    }
}

/// Turns a plain numeric function into a built-in dispatch target.
///
/// `f64` parameters are required positional arguments, trailing `Option<f64>`
/// parameters are optional ones, and a reference parameter receives the
/// evaluation settings. The generated function has the signature
/// `fn(args: &[f64], settings: &EvaluationSettings) -> Result<f64, EvalError>`
/// and a `<NAME>_ARITY: (usize, usize)` constant is emitted next to it, so both
/// names must be in scope where the attribute is used.
#[proc_macro_attribute]
pub fn calcexpr_fn(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    let fn_name = &input.sig.ident;
    let fn_args = &input.sig.inputs;
    let fn_body = &input.block;
    let fn_output = &input.sig.output;
    let fn_attrs = &input.attrs;
    let fn_name_str = fn_name.to_string();

    let mut arg_extractions = Vec::new();
    let mut position = 0usize;
    let mut required = 0usize;
    let mut seen_optional = false;

    for arg in fn_args.iter() {
        let FnArg::Typed(PatType { pat, ty, .. }) = arg else {
            panic!("{} cannot take self", fn_name_str);
        };
        let arg_name = match **pat {
            syn::Pat::Ident(ref ident) => &ident.ident,
            _ => panic!("Unsupported pattern"),
        };

        let extract_code = match classify(ty, &arg_name.to_string(), &fn_name_str) {
            ArgKind::Required => {
                if seen_optional {
                    panic!(
                        "Required argument '{}' follows an optional one in {}",
                        arg_name, fn_name_str
                    );
                }
                let index = position;
                position += 1;
                required += 1;
                quote! {
                    let #arg_name: f64 = args[#index];
                }
            }
            ArgKind::Optional => {
                seen_optional = true;
                let index = position;
                position += 1;
                quote! {
                    let #arg_name: Option<f64> = args.get(#index).copied();
                }
            }
            ArgKind::Settings => quote! {
                let #arg_name = settings;
            },
        };

        arg_extractions.push(extract_code);
    }

    let max_args = position;
    let arity_const = format_ident!("{}_ARITY", fn_name_str.to_uppercase());
    let expanded = quote! {
        pub const #arity_const: (usize, usize) = (#required, #max_args);

        #(#fn_attrs)*
        #[allow(unused_variables, unused_comparisons)]
        pub fn #fn_name(args: &[f64], settings: &EvaluationSettings) #fn_output {
            if args.len() < #required || args.len() > #max_args {
                return Err(EvalError::InvalidOperation(format!(
                    "{} expects {} to {} arguments, but got {}",
                    #fn_name_str,
                    #required,
                    #max_args,
                    args.len()
                )));
            }

            #(#arg_extractions)*

            #fn_body
        }
    };

    TokenStream::from(expanded)
}
