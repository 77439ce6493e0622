//! Compact textual declaration names.
//!
//! Cross-references and rename tooling address declarations with strings
//! like `foo(bar:)`, `Type.init(self:x:)` or `getter:count()`. This
//! module parses that format:
//!
//! ```text
//! name  := base | base '(' (label ':')* ')'
//! base  := [context '.'] identifier-or-operator
//! label := identifier | '_' | 'self'
//! ```
//!
//! Parsing is pure string slicing against one input buffer; it never
//! touches the token stream. A malformed name yields `None`, never a
//! partially filled result.

use lyra_lexer::{is_identifier, is_operator};

/// A declaration name parsed from its textual form.
///
/// Borrowed pieces point into the input string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedDeclName<'a> {
    /// Dot-separated type context, if the name had one.
    pub context: Option<&'a str>,
    /// The base identifier or operator.
    pub base: &'a str,
    /// One entry per parameter position; `None` is an explicit "no
    /// label" marker, written `_` or `self` in the textual form.
    pub labels: Vec<Option<&'a str>>,
    /// Position of the `self` parameter, for member names that mark one.
    /// The entry at this index is always a `None` label.
    pub self_index: Option<usize>,
    /// The name had a parameter list.
    pub is_function_name: bool,
    /// The name had a `getter:` prefix.
    pub is_getter: bool,
    /// The name had a `setter:` prefix.
    pub is_setter: bool,
    /// The base name was `subscript`.
    pub is_subscript: bool,
}

/// Parse a textual declaration name. Returns `None` if `name` does not
/// match the format.
pub fn parse_decl_name(name: &str) -> Option<ParsedDeclName<'_>> {
    if name.is_empty() {
        return None;
    }

    if !name.ends_with(')') {
        if is_operator(name) {
            return Some(plain(None, name));
        }
        let (context, base) = parse_base_name(name)?;
        return Some(plain(context, base));
    }

    let mut result = plain(None, "");
    result.is_function_name = true;

    let (mut base_text, params) = name.split_once('(')?;
    if let Some(rest) = base_text.strip_prefix("getter:") {
        result.is_getter = true;
        result.is_function_name = false;
        base_text = rest;
    } else if let Some(rest) = base_text.strip_prefix("setter:") {
        result.is_setter = true;
        result.is_function_name = false;
        base_text = rest;
    }
    result.is_subscript = base_text == "subscript";

    let (context, base) = parse_base_name(base_text)?;
    result.context = context;
    result.base = base;

    let params = params.strip_suffix(')')?;
    if params.is_empty() {
        return Some(result);
    }
    let params = params.strip_suffix(':')?;

    // `self` only names the receiver when the name is member-qualified;
    // as a free-function label it is an ordinary identifier.
    let is_member = context.is_some();
    for piece in params.split(':') {
        if !is_identifier(piece) {
            return None;
        }
        if piece == "_" {
            result.labels.push(None);
        } else if is_member && piece == "self" {
            if result.self_index.is_some() {
                return None;
            }
            result.self_index = Some(result.labels.len());
            result.labels.push(None);
        } else {
            result.labels.push(Some(piece));
        }
    }
    Some(result)
}

/// Split `text` into an optional dotted context and a base identifier.
///
/// A trailing dot reads the same as no dot at all, so `a.` parses as the
/// base `a`.
fn parse_base_name(text: &str) -> Option<(Option<&str>, &str)> {
    let (context, base) = match text.rsplit_once('.') {
        Some((head, "")) => (None, head),
        Some(("", _)) => return None,
        Some((head, tail)) => (Some(head), tail),
        None => (None, text),
    };
    if !valid_identifier(base) {
        return None;
    }
    if let Some(context) = context {
        if !context.split('.').all(valid_identifier) {
            return None;
        }
    }
    Some((context, base))
}

/// `_` is a valid identifier shape but reserved, so it cannot name a
/// declaration.
fn valid_identifier(text: &str) -> bool {
    is_identifier(text) && text != "_"
}

fn plain<'a>(context: Option<&'a str>, base: &'a str) -> ParsedDeclName<'a> {
    ParsedDeclName {
        context,
        base,
        labels: Vec::new(),
        self_index: None,
        is_function_name: false,
        is_getter: false,
        is_setter: false,
        is_subscript: false,
    }
}
