use proc_macro::{TokenStream, TokenTree};

/// Splits a macro input stream on top-level commas.
pub(crate) fn split_args(input: TokenStream) -> Vec<Vec<TokenTree>> {
    let mut args = Vec::new();
    let mut current = Vec::new();

    for token in input {
        match &token {
            TokenTree::Punct(p) if p.as_char() == ',' => {
                if !current.is_empty() {
                    args.push(current);
                    current = Vec::new();
                }
            }
            _ => current.push(token),
        }
    }

    if !current.is_empty() {
        args.push(current);
    }

    args
}

/// Renders a token slice back to source text.
///
/// Adjacent identifiers get a separating space so keyword sequences
/// like `async move` survive the round-trip.
pub(crate) fn tokens_to_string(tokens: &[TokenTree]) -> String {
    let mut out = String::new();
    let mut prev_was_ident = false;

    for token in tokens {
        let is_ident = matches!(token, TokenTree::Ident(_));

        if prev_was_ident && is_ident {
            out.push(' ');
        }

        out.push_str(&token.to_string());
        prev_was_ident = is_ident;
    }

    out
}
