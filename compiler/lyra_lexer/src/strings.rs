//! String literal scanning and segmentation.
//!
//! String syntax:
//!
//! - `"..."` single-line, `"""..."""` multiline
//! - `#"..."#` raw, with any number of pounds; escapes then need the same
//!   pound run (`\#(`, `\#n`)
//! - `\(expr)` interpolation, with balanced parens and nested string
//!   literals allowed inside
//!
//! The scanner produces one [`TokenKind::StringLit`] token covering the
//! whole literal, delimiters included. [`string_segments`] later splits
//! the body back into literal and interpolation pieces; both sides share
//! [`interpolation_end`] so they agree on where each interpolation stops.

use lyra_ir::{Span, Token, TokenFlags, TokenKind};

use crate::{offset_u32, Lexer};

impl Lexer<'_> {
    /// Scan a string literal body. `self.pos` sits just past the opening
    /// quote; `pounds` is the raw-string delimiter length.
    ///
    /// On an unterminated single-line string the token ends before the
    /// newline that broke it.
    pub(crate) fn scan_string(&mut self, pounds: u8) -> (TokenKind, TokenFlags) {
        let pounds = u32::from(pounds);
        let mut flags = TokenFlags::EMPTY;

        let quotes = if self.byte_at(self.pos) == b'"' && self.byte_at(self.pos + 1) == b'"' {
            self.pos += 2;
            flags = flags.with(TokenFlags::MULTILINE_STRING);
            3
        } else {
            1
        };
        let multiline = quotes == 3;

        let bytes = self.source().as_bytes();
        let limit = self.limit();
        let mut terminated = false;

        'scan: while self.pos < limit {
            let rest = &bytes[self.pos as usize..limit as usize];
            let Some(offset) = memchr::memchr3(b'"', b'\\', b'\n', rest) else {
                self.pos = limit;
                break;
            };
            self.pos += offset_u32(offset);
            match bytes[self.pos as usize] {
                b'\n' if !multiline => break 'scan,
                b'\n' => self.pos += 1,
                b'"' => {
                    if is_close(bytes, self.pos, quotes, pounds, limit) {
                        self.pos += quotes + pounds;
                        terminated = true;
                        break 'scan;
                    }
                    self.pos += 1;
                }
                _ => {
                    // Backslash. In a raw string it only escapes when the
                    // pound run follows.
                    let mut after = self.pos + 1;
                    if pounds > 0 && !run_of(bytes, after, b'#', pounds, limit) {
                        self.pos += 1;
                        continue;
                    }
                    after += pounds;
                    if after < limit && bytes[after as usize] == b'(' {
                        flags = flags.with(TokenFlags::HAS_INTERPOLATION);
                        match interpolation_end(self.source(), after + 1, limit, multiline) {
                            InterpEnd::Closed(close) => self.pos = close + 1,
                            InterpEnd::Unterminated(stop) => {
                                self.pos = stop;
                                break 'scan;
                            }
                        }
                    } else {
                        self.pos = (after + 1).min(limit);
                    }
                }
            }
        }

        if !terminated {
            flags = flags.with(TokenFlags::UNTERMINATED);
        }
        (TokenKind::StringLit, flags)
    }
}

/// Where scanning for an interpolation's closing paren ended.
pub(crate) enum InterpEnd {
    /// Offset of the matching `)`.
    Closed(u32),
    /// Ran out of input; the offset is where scanning stopped.
    Unterminated(u32),
}

/// Find the `)` closing a string interpolation whose interior starts at
/// `start`. Nested parens and nested string literals are skipped over; a
/// newline ends the search when the enclosing string is single-line.
pub(crate) fn interpolation_end(
    source: &str,
    start: u32,
    limit: u32,
    multiline: bool,
) -> InterpEnd {
    let bytes = source.as_bytes();
    let mut depth = 1u32;
    let mut i = start;
    while i < limit {
        match bytes[i as usize] {
            b'(' => {
                depth += 1;
                i += 1;
            }
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return InterpEnd::Closed(i);
                }
                i += 1;
            }
            b'"' => i = skip_quoted(bytes, i, limit),
            b'\n' if !multiline => return InterpEnd::Unterminated(i),
            _ => i += 1,
        }
    }
    InterpEnd::Unterminated(limit)
}

/// Skip a string literal nested inside an interpolation. `start` sits at
/// the opening quote; the return value is just past the closing quote, or
/// at the newline or limit that ended the search. Always advances.
fn skip_quoted(bytes: &[u8], start: u32, limit: u32) -> u32 {
    let mut i = start;
    let mut run = 0u32;
    while i < limit && bytes[i as usize] == b'"' && run < 3 {
        run += 1;
        i += 1;
    }
    if run == 2 {
        // Empty string.
        return i;
    }
    let quotes = run;
    let multiline = quotes == 3;
    while i < limit {
        let rest = &bytes[i as usize..limit as usize];
        let Some(offset) = memchr::memchr3(b'"', b'\\', b'\n', rest) else {
            return limit;
        };
        i += offset_u32(offset);
        match bytes[i as usize] {
            b'\\' => i = (i + 2).min(limit),
            b'\n' if !multiline => return i,
            b'\n' => i += 1,
            _ => {
                let mut matched = 0u32;
                while matched < quotes
                    && i + matched < limit
                    && bytes[(i + matched) as usize] == b'"'
                {
                    matched += 1;
                }
                if matched == quotes {
                    return i + quotes;
                }
                i += matched.max(1);
            }
        }
    }
    limit
}

fn is_close(bytes: &[u8], pos: u32, quotes: u32, pounds: u32, limit: u32) -> bool {
    run_of(bytes, pos, b'"', quotes, limit) && run_of(bytes, pos + quotes, b'#', pounds, limit)
}

fn run_of(bytes: &[u8], start: u32, byte: u8, count: u32, limit: u32) -> bool {
    (0..count).all(|k| {
        let idx = start + k;
        idx < limit && bytes[idx as usize] == byte
    })
}

/// One piece of a string literal body.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StringSegment {
    /// Literal text between interpolations. May be empty.
    Literal(Span),
    /// The expression text between the parens of a `\(...)`.
    Interpolation(Span),
}

impl StringSegment {
    /// The source range the piece covers.
    pub fn span(self) -> Span {
        match self {
            StringSegment::Literal(span) | StringSegment::Interpolation(span) => span,
        }
    }
}

/// Split a string literal token into its literal and interpolation
/// pieces.
///
/// Delimiters are excluded: the pieces cover the body between the quotes.
/// Literal pieces around interpolations are kept even when empty, so a
/// body with N interpolations always yields N+1 literal pieces
/// interleaved with them.
pub fn string_segments(source: &str, token: &Token) -> Vec<StringSegment> {
    debug_assert!(token.is(TokenKind::StringLit));
    let bytes = source.as_bytes();
    let pounds = u32::from(token.delim_len);
    let quotes = if token.flags.has(TokenFlags::MULTILINE_STRING) {
        3
    } else {
        1
    };
    let multiline = quotes == 3;

    let body_start = (token.span.start + pounds + quotes).min(token.span.end);
    let body_end = if token.flags.has(TokenFlags::UNTERMINATED) {
        token.span.end
    } else {
        token.span.end.saturating_sub(quotes + pounds)
    }
    .max(body_start);

    let mut segments = Vec::new();
    let mut lit_start = body_start;
    let mut i = body_start;
    while i < body_end {
        let rest = &bytes[i as usize..body_end as usize];
        let Some(offset) = memchr::memchr(b'\\', rest) else {
            break;
        };
        let backslash = i + offset_u32(offset);
        let mut after = backslash + 1;
        if pounds > 0 && !run_of(bytes, after, b'#', pounds, body_end) {
            i = backslash + 1;
            continue;
        }
        after += pounds;
        if after < body_end && bytes[after as usize] == b'(' {
            segments.push(StringSegment::Literal(Span::new(lit_start, backslash)));
            let interior = after + 1;
            match interpolation_end(source, interior, body_end, multiline) {
                InterpEnd::Closed(close) => {
                    segments.push(StringSegment::Interpolation(Span::new(interior, close)));
                    lit_start = close + 1;
                    i = close + 1;
                }
                InterpEnd::Unterminated(_) => {
                    segments.push(StringSegment::Interpolation(Span::new(interior, body_end)));
                    lit_start = body_end;
                    i = body_end;
                }
            }
        } else {
            // Ordinary escape: skip the escaped byte so `\\(` does not
            // read as an interpolation.
            i = after + 1;
        }
    }
    segments.push(StringSegment::Literal(Span::new(lit_start, body_end)));
    segments
}
