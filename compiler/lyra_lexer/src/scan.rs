//! Token scanning.
//!
//! [`Lexer::next_token`] handles trivia and end-of-input; everything past
//! that lands in [`Lexer::scan_token`], which dispatches on the first byte
//! of the token.

use lyra_ir::{Span, Token, TokenFlags, TokenKind};

use crate::{is_ident_continue, is_ident_start, is_operator_byte, Lexer};

impl Lexer<'_> {
    pub(crate) fn scan_token(&mut self, flags: TokenFlags, comment_start: Option<u32>) -> Token {
        let start = self.pos;
        let byte = self.byte_at(start);

        let (kind, token_flags, delim_len) = match byte {
            b if is_ident_start(b) => (self.scan_identifier(), TokenFlags::EMPTY, 0),
            b'`' => {
                let (kind, extra) = self.scan_backtick_identifier();
                (kind, extra, 0)
            }
            b if b.is_ascii_digit() => (self.scan_number(), TokenFlags::EMPTY, 0),
            b'"' => {
                self.pos += 1;
                let (kind, extra) = self.scan_string(0);
                (kind, extra, 0)
            }
            b'#' => self.scan_pound(),
            b'(' => (self.single(TokenKind::LParen), TokenFlags::EMPTY, 0),
            b')' => (self.single(TokenKind::RParen), TokenFlags::EMPTY, 0),
            b'{' => (self.single(TokenKind::LBrace), TokenFlags::EMPTY, 0),
            b'}' => (self.single(TokenKind::RBrace), TokenFlags::EMPTY, 0),
            b'[' => (self.single(TokenKind::LBracket), TokenFlags::EMPTY, 0),
            b']' => (self.single(TokenKind::RBracket), TokenFlags::EMPTY, 0),
            b',' => (self.single(TokenKind::Comma), TokenFlags::EMPTY, 0),
            b':' => (self.single(TokenKind::Colon), TokenFlags::EMPTY, 0),
            b';' => (self.single(TokenKind::Semi), TokenFlags::EMPTY, 0),
            b'.' => (self.single(TokenKind::Dot), TokenFlags::EMPTY, 0),
            b if is_operator_byte(b) => (self.scan_operator(start), TokenFlags::EMPTY, 0),
            _ => {
                self.pos += utf8_char_width(byte).min(self.limit() - start);
                (TokenKind::Unknown, TokenFlags::EMPTY, 0)
            }
        };

        let flags = TokenFlags::from_bits(flags.bits() | token_flags.bits());
        let mut token = self.make_token(kind, Span::new(start, self.pos), flags, comment_start);
        token.delim_len = delim_len;
        token
    }

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.pos += 1;
        kind
    }

    fn scan_identifier(&mut self) -> TokenKind {
        let start = self.pos;
        while self.pos < self.limit() && is_ident_continue(self.byte_at(self.pos)) {
            self.pos += 1;
        }
        let text = &self.source()[start as usize..self.pos as usize];
        TokenKind::keyword_from_str(text).unwrap_or(TokenKind::Ident)
    }

    /// `` `name` `` lexes as an identifier, keywords included. The span
    /// covers the backticks.
    fn scan_backtick_identifier(&mut self) -> (TokenKind, TokenFlags) {
        self.pos += 1;
        let name_start = self.pos;
        while self.pos < self.limit() && is_ident_continue(self.byte_at(self.pos)) {
            self.pos += 1;
        }
        if self.pos > name_start && self.byte_at(self.pos) == b'`' {
            self.pos += 1;
            (TokenKind::Ident, TokenFlags::EMPTY)
        } else {
            (
                TokenKind::Unknown,
                TokenFlags::from_bits(TokenFlags::UNTERMINATED),
            )
        }
    }

    fn scan_number(&mut self) -> TokenKind {
        // Radix prefixes are integers, no float forms.
        if self.byte_at(self.pos) == b'0' {
            let radix = match self.byte_at(self.pos + 1) {
                b'x' | b'X' => Some(16),
                b'b' | b'B' => Some(2),
                b'o' | b'O' => Some(8),
                _ => None,
            };
            if let Some(radix) = radix {
                self.pos += 2;
                while self.pos < self.limit() && is_radix_digit(self.byte_at(self.pos), radix) {
                    self.pos += 1;
                }
                return TokenKind::IntLit;
            }
        }

        self.skip_digits();
        let mut is_float = false;

        // A dot only joins the number when a digit follows, so `1.foo`
        // stays an integer plus member access.
        if self.byte_at(self.pos) == b'.' && self.byte_at(self.pos + 1).is_ascii_digit() {
            is_float = true;
            self.pos += 1;
            self.skip_digits();
        }

        if matches!(self.byte_at(self.pos), b'e' | b'E') {
            let mut after = self.pos + 1;
            if matches!(self.byte_at(after), b'+' | b'-') {
                after += 1;
            }
            if self.byte_at(after).is_ascii_digit() {
                is_float = true;
                self.pos = after;
                self.skip_digits();
            }
        }

        if is_float {
            TokenKind::FloatLit
        } else {
            TokenKind::IntLit
        }
    }

    fn skip_digits(&mut self) {
        while self.pos < self.limit()
            && (self.byte_at(self.pos).is_ascii_digit() || self.byte_at(self.pos) == b'_')
        {
            self.pos += 1;
        }
    }

    /// `#` starts either a raw string (`#"..."#`, any number of pounds) or
    /// a conditional-compilation directive (`#if` and friends).
    fn scan_pound(&mut self) -> (TokenKind, TokenFlags, u8) {
        let mut pounds = 0u32;
        while self.byte_at(self.pos) == b'#' {
            pounds += 1;
            self.pos += 1;
        }

        if self.byte_at(self.pos) == b'"' {
            self.pos += 1;
            let delim = u8::try_from(pounds).unwrap_or(u8::MAX);
            let (kind, extra) = self.scan_string(delim);
            return (kind, extra, delim);
        }

        if pounds == 1 && is_ident_start(self.byte_at(self.pos)) {
            let name_start = self.pos;
            while self.pos < self.limit() && is_ident_continue(self.byte_at(self.pos)) {
                self.pos += 1;
            }
            let name = &self.source()[name_start as usize..self.pos as usize];
            let kind = match name {
                "if" => TokenKind::PoundIf,
                "else" => TokenKind::PoundElse,
                "elseif" => TokenKind::PoundElseif,
                "endif" => TokenKind::PoundEndif,
                _ => TokenKind::Unknown,
            };
            return (kind, TokenFlags::EMPTY, 0);
        }

        (TokenKind::Unknown, TokenFlags::EMPTY, 0)
    }

    fn scan_operator(&mut self, start: u32) -> TokenKind {
        while self.pos < self.limit() && is_operator_byte(self.byte_at(self.pos)) {
            // `//` and `/*` end the run: they open a comment.
            if self.byte_at(self.pos) == b'/'
                && matches!(self.byte_at(self.pos + 1), b'/' | b'*')
            {
                break;
            }
            self.pos += 1;
        }
        let text = &self.source()[start as usize..self.pos as usize];
        match text {
            "<" => TokenKind::LAngle,
            ">" => TokenKind::RAngle,
            "=" => TokenKind::Eq,
            "->" => TokenKind::Arrow,
            _ => TokenKind::Oper,
        }
    }
}

/// Byte length of the UTF-8 sequence starting with `byte`.
fn utf8_char_width(byte: u8) -> u32 {
    match byte {
        0x00..=0x7F => 1,
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        _ => 4,
    }
}

fn is_radix_digit(byte: u8, radix: u32) -> bool {
    match radix {
        16 => byte.is_ascii_hexdigit() || byte == b'_',
        8 => matches!(byte, b'0'..=b'7' | b'_'),
        2 => matches!(byte, b'0' | b'1' | b'_'),
        _ => byte.is_ascii_digit() || byte == b'_',
    }
}
