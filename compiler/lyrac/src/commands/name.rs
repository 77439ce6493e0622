//! The `name` command: decode a textual declaration name.

use std::fmt::Write;

use lyra_parse::{parse_decl_name, ParsedDeclName};

/// Parse a declaration name like `Map.insert(key:value:)` and print its
/// parts. Exits with code 1 when the text is not a declaration name.
pub fn explain_name(text: &str) {
    let Some(name) = parse_decl_name(text) else {
        eprintln!("error: '{text}' is not a declaration name");
        eprintln!("Expected a form like 'foo', 'A.B.foo(bar:_:)' or 'getter:count()'");
        std::process::exit(1);
    };
    print!("{}", render_name(&name));
}

fn render_name(name: &ParsedDeclName<'_>) -> String {
    let mut out = String::new();
    if let Some(context) = name.context {
        let _ = writeln!(out, "context: {context}");
    }
    let _ = writeln!(out, "base: {}", name.base);

    let kind = if name.is_getter {
        "getter"
    } else if name.is_setter {
        "setter"
    } else if name.is_subscript {
        "subscript"
    } else if name.is_function_name {
        "function"
    } else {
        "plain name"
    };
    let _ = writeln!(out, "kind: {kind}");

    // Accessors carry a parameter list too even though the function
    // flag is cleared for them.
    if name.is_function_name || name.is_getter || name.is_setter {
        let mut labels = String::new();
        for label in &name.labels {
            labels.push_str(label.unwrap_or("_"));
            labels.push(':');
        }
        let _ = writeln!(out, "labels: ({labels})");
    }
    if let Some(index) = name.self_index {
        let _ = writeln!(out, "self parameter: position {index}");
    }

    out
}
