mod utils;

use proc_macro::{Delimiter, Group, TokenStream, TokenTree};

/// Awaits multiple futures concurrently and returns all results.
///
/// # Syntax
///
/// ```ignore
/// join!(fut1, fut2, fut3)
/// ```
///
/// - With zero futures, evaluates to `()`.
/// - With one future, awaits it and returns its output.
/// - With several, polls them all from a single `poll_fn` and resolves
///   with a tuple once every future has completed.
///
/// No separate task is allocated per future; everything runs within
/// the awaiting frame.
#[proc_macro]
pub fn join(input: TokenStream) -> TokenStream {
    let args = utils::split_args(input);
    let count = args.len();

    if count == 0 {
        return "()".parse().unwrap();
    }

    if count == 1 {
        let expr = utils::tokens_to_string(&args[0]);
        return format!("{{ {expr}.await }}").parse().unwrap();
    }

    let mut out = String::from("{\n");

    for (i, tokens) in args.iter().enumerate() {
        let expr = utils::tokens_to_string(tokens);
        out.push_str(&format!(
            "let mut __join_{i} = (::std::boxed::Box::pin({expr}), ::core::option::Option::None);\n"
        ));
    }

    out.push_str("::std::future::poll_fn(move |cx| {\n");
    out.push_str("    use ::std::future::Future;\n");
    out.push_str("    use ::std::task::Poll;\n");

    for i in 0..count {
        out.push_str(&format!(
            "    if __join_{i}.1.is_none() {{\n\
                     if let Poll::Ready(value) = __join_{i}.0.as_mut().poll(cx) {{\n\
                         __join_{i}.1 = ::core::option::Option::Some(value);\n\
                     }}\n\
                 }}\n"
        ));
    }

    let all_done = (0..count)
        .map(|i| format!("__join_{i}.1.is_some()"))
        .collect::<Vec<_>>()
        .join(" && ");

    out.push_str(&format!("    if {all_done} {{\n        Poll::Ready((\n"));

    for i in 0..count {
        out.push_str(&format!("            __join_{i}.1.take().unwrap(),\n"));
    }

    out.push_str("        ))\n    } else {\n        Poll::Pending\n    }\n");
    out.push_str("}).await\n}\n");

    out.parse().unwrap_or_else(|err| {
        format!("compile_error!(\"join macro error: {err}\");")
            .parse()
            .unwrap()
    })
}

/// Marks an async function as the runtime entry point.
///
/// Transforms an `async fn main` into a synchronous one that builds a
/// runtime and drives the body through `block_on`.
///
/// # Attributes
///
/// ```ignore
/// #[spindle::main]
/// async fn main() { ... }
///
/// #[spindle::main(worker_threads = 4)]
/// async fn main() { ... }
/// ```
#[proc_macro_attribute]
pub fn main(attr: TokenStream, item: TokenStream) -> TokenStream {
    let mut tokens: Vec<TokenTree> = item.into_iter().collect();

    let Some(async_pos) = tokens
        .iter()
        .position(|t| matches!(t, TokenTree::Ident(id) if id.to_string() == "async"))
    else {
        return "compile_error!(\"this function must be declared async\");"
            .parse()
            .unwrap();
    };
    tokens.remove(async_pos);

    let mut builder = String::from("::spindle::RuntimeBuilder::new()");

    for part in attr.to_string().split(',') {
        let part = part.trim();
        if let Some(value) = part.strip_prefix("worker_threads") {
            let value = value.trim_start_matches('=').trim();
            if let Ok(n) = value.parse::<usize>() {
                builder.push_str(&format!(".worker_threads({n})"));
            }
        }
    }

    builder.push_str(".build()");

    let Some(body_pos) = tokens
        .iter()
        .rposition(|t| matches!(t, TokenTree::Group(g) if g.delimiter() == Delimiter::Brace))
    else {
        return TokenStream::new();
    };

    let body = match &tokens[body_pos] {
        TokenTree::Group(g) => g.stream().to_string(),
        _ => unreachable!(),
    };

    let wrapped = format!(
        "{{
            let runtime = {builder};
            runtime.block_on(async move {{ {body} }})
        }}"
    );

    tokens[body_pos] = TokenTree::Group(Group::new(Delimiter::Brace, wrapped.parse().unwrap()));

    tokens.into_iter().collect()
}

/// Marks an async function as a test executed inside a runtime.
///
/// Removes the `async` keyword, wraps the body in `block_on` on a
/// freshly built runtime, and prepends `#[test]`.
///
/// # Example
///
/// ```ignore
/// #[spindle::test]
/// async fn my_async_test() {
///     // async test code
/// }
/// ```
#[proc_macro_attribute]
pub fn test(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let mut tokens: Vec<TokenTree> = item.into_iter().collect();

    if let Some(pos) = tokens
        .iter()
        .position(|t| matches!(t, TokenTree::Ident(id) if id.to_string() == "async"))
    {
        tokens.remove(pos);
    }

    let Some(body_pos) = tokens
        .iter()
        .rposition(|t| matches!(t, TokenTree::Group(g) if g.delimiter() == Delimiter::Brace))
    else {
        return TokenStream::new();
    };

    let body = match &tokens[body_pos] {
        TokenTree::Group(g) => g.stream().to_string(),
        _ => unreachable!(),
    };

    let wrapped = format!(
        "{{
            let runtime = ::spindle::RuntimeBuilder::new().build();
            runtime.block_on(async move {{ {body} }});
        }}"
    );

    tokens[body_pos] = TokenTree::Group(Group::new(Delimiter::Brace, wrapped.parse().unwrap()));

    let mut result: Vec<TokenTree> = "#[test]".parse::<TokenStream>().unwrap().into_iter().collect();
    result.extend(tokens);

    result.into_iter().collect()
}
