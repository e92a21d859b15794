//! Content-stream tokenizer.
//!
//! Every [`Token`] retains the exact byte slice it was read from — including
//! whitespace and comments — so [`render`] can reconstruct the original
//! input exactly when no token has been replaced. That's what lets the
//! rewriter touch only the operand/operator run of a matched color operator
//! and leave everything else byte-identical.

use super::{ContentError, ContentResult};

/// What kind of lexeme a [`Token`] represents. The token's `raw` field always
/// holds the literal bytes this was read from.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Number(f64),
    Name(String),
    String,
    HexString,
    Operator,
    ArrayStart,
    ArrayEnd,
    DictStart,
    DictEnd,
    Whitespace,
    Comment,
    /// The opaque payload of an inline image (`BI` image-dict `ID` sample
    /// data `EI`), kept as a single unparsed span so arbitrary binary sample
    /// bytes never get fed through the general-purpose lexer.
    InlineImageData,
}

/// A single lexeme plus the exact bytes it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub raw: &'a [u8],
}

impl<'a> Token<'a> {
    fn new(kind: TokenKind, raw: &'a [u8]) -> Self {
        Token { kind, raw }
    }

    pub fn is_operator(&self, op: &str) -> bool {
        matches!(&self.kind, TokenKind::Operator) && self.raw == op.as_bytes()
    }

    pub fn as_number(&self) -> Option<f64> {
        match self.kind {
            TokenKind::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_name(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Name(n) => Some(n.as_str()),
            _ => None,
        }
    }

    pub fn is_insignificant(&self) -> bool {
        matches!(self.kind, TokenKind::Whitespace | TokenKind::Comment)
    }
}

fn is_whitespace(b: u8) -> bool {
    matches!(b, b'\0' | b'\t' | b'\n' | b'\x0C' | b'\r' | b' ')
}

fn is_delimiter(b: u8) -> bool {
    matches!(
        b,
        b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%'
    )
}

/// Content stream tokenizer that preserves byte-exact round-tripping.
pub struct Tokenizer<'a> {
    input: &'a [u8],
    position: usize,
    /// Set right after emitting the `BI` operator token; the next token is
    /// the opaque inline-image payload instead of a normally-lexed token.
    after_bi: bool,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Tokenizer { input, position: 0, after_bi: false }
    }

    pub fn next_token(&mut self) -> ContentResult<Option<Token<'a>>> {
        if self.position >= self.input.len() {
            return Ok(None);
        }

        if self.after_bi {
            self.after_bi = false;
            let start = self.position;
            let end = self.find_ei_end();
            self.position = end;
            return Ok(Some(Token::new(TokenKind::InlineImageData, &self.input[start..end])));
        }

        let start = self.position;
        let ch = self.input[self.position];

        if is_whitespace(ch) {
            while self.position < self.input.len() && is_whitespace(self.input[self.position]) {
                self.position += 1;
            }
            return Ok(Some(Token::new(TokenKind::Whitespace, &self.input[start..self.position])));
        }

        if ch == b'%' {
            while self.position < self.input.len()
                && self.input[self.position] != b'\n'
                && self.input[self.position] != b'\r'
            {
                self.position += 1;
            }
            return Ok(Some(Token::new(TokenKind::Comment, &self.input[start..self.position])));
        }

        match ch {
            b'+' | b'-' | b'.' | b'0'..=b'9' => self.read_number(start),
            b'(' => self.read_literal_string(start),
            b'<' => {
                if self.peek_next() == Some(b'<') {
                    self.position += 2;
                    Ok(Some(Token::new(TokenKind::DictStart, &self.input[start..self.position])))
                } else {
                    self.read_hex_string(start)
                }
            }
            b'>' => {
                if self.peek_next() == Some(b'>') {
                    self.position += 2;
                    Ok(Some(Token::new(TokenKind::DictEnd, &self.input[start..self.position])))
                } else {
                    Err(ContentError::UnexpectedCloseAngle(start))
                }
            }
            b'[' => {
                self.position += 1;
                Ok(Some(Token::new(TokenKind::ArrayStart, &self.input[start..self.position])))
            }
            b']' => {
                self.position += 1;
                Ok(Some(Token::new(TokenKind::ArrayEnd, &self.input[start..self.position])))
            }
            b'/' => self.read_name(start),
            _ => {
                let token = self.read_operator(start)?;
                if let Some(t) = &token {
                    if t.raw == b"BI" {
                        self.after_bi = true;
                    }
                }
                Ok(token)
            }
        }
    }

    fn peek_next(&self) -> Option<u8> {
        self.input.get(self.position + 1).copied()
    }

    /// Finds the end of an inline image's opaque payload: the byte offset
    /// just past an `EI` that is delimited by whitespace on both sides.
    /// Falls back to consuming the rest of the input if no `EI` delimiter is
    /// found, since the payload is opaque by contract and never an error.
    fn find_ei_end(&self) -> usize {
        let mut i = self.position;
        while i + 1 < self.input.len() {
            if self.input[i] == b'E' && self.input[i + 1] == b'I' {
                let before_ok = i == self.position || is_whitespace(self.input[i - 1]);
                let after_ok = i + 2 >= self.input.len()
                    || is_whitespace(self.input[i + 2])
                    || is_delimiter(self.input[i + 2]);
                if before_ok && after_ok {
                    return i + 2;
                }
            }
            i += 1;
        }
        self.input.len()
    }

    fn read_number(&mut self, start: usize) -> ContentResult<Option<Token<'a>>> {
        if matches!(self.input[self.position], b'+' | b'-') {
            self.position += 1;
        }
        while self.position < self.input.len() {
            match self.input[self.position] {
                b'0'..=b'9' | b'.' => self.position += 1,
                _ => break,
            }
        }
        let raw = &self.input[start..self.position];
        let text = std::str::from_utf8(raw).map_err(|_| ContentError::InvalidNumber(start))?;
        let value = text.parse::<f64>().map_err(|_| ContentError::InvalidNumber(start))?;
        Ok(Some(Token::new(TokenKind::Number(value), raw)))
    }

    fn read_literal_string(&mut self, start: usize) -> ContentResult<Option<Token<'a>>> {
        self.position += 1;
        let mut depth = 1;
        let mut escape = false;
        while self.position < self.input.len() && depth > 0 {
            let ch = self.input[self.position];
            self.position += 1;
            if escape {
                escape = false;
                continue;
            }
            match ch {
                b'\\' => escape = true,
                b'(' => depth += 1,
                b')' => depth -= 1,
                _ => {}
            }
        }
        if depth != 0 {
            return Err(ContentError::UnterminatedString(start));
        }
        Ok(Some(Token::new(TokenKind::String, &self.input[start..self.position])))
    }

    fn read_hex_string(&mut self, start: usize) -> ContentResult<Option<Token<'a>>> {
        self.position += 1;
        loop {
            if self.position >= self.input.len() {
                return Err(ContentError::UnterminatedHexString(start));
            }
            let ch = self.input[self.position];
            match ch {
                b'>' => {
                    self.position += 1;
                    return Ok(Some(Token::new(TokenKind::HexString, &self.input[start..self.position])));
                }
                b'0'..=b'9' | b'A'..=b'F' | b'a'..=b'f' => self.position += 1,
                b' ' | b'\t' | b'\r' | b'\n' | b'\x0C' => self.position += 1,
                other => return Err(ContentError::InvalidHexDigit(self.position, other)),
            }
        }
    }

    fn read_name(&mut self, start: usize) -> ContentResult<Option<Token<'a>>> {
        self.position += 1;
        let body_start = self.position;
        while self.position < self.input.len() {
            let ch = self.input[self.position];
            if is_whitespace(ch) || is_delimiter(ch) {
                break;
            }
            self.position += 1;
        }
        let decoded = decode_name(&self.input[body_start..self.position]);
        Ok(Some(Token::new(TokenKind::Name(decoded), &self.input[start..self.position])))
    }

    fn read_operator(&mut self, start: usize) -> ContentResult<Option<Token<'a>>> {
        while self.position < self.input.len() {
            let ch = self.input[self.position];
            if is_whitespace(ch) || is_delimiter(ch) {
                break;
            }
            self.position += 1;
        }
        Ok(Some(Token::new(TokenKind::Operator, &self.input[start..self.position])))
    }
}

/// Decodes `#xx` hex escapes in a name's body. Malformed escapes are kept
/// literally rather than rejected — names are identifiers, not content, and
/// a lenient decode here just affects color-space lookup, never correctness
/// of the byte stream (the raw slice is always what gets re-emitted).
fn decode_name(bytes: &[u8]) -> String {
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'#' && i + 2 < bytes.len() {
            if let Ok(hex) = std::str::from_utf8(&bytes[i + 1..i + 3]) {
                if let Ok(value) = u8::from_str_radix(hex, 16) {
                    out.push(value);
                    i += 3;
                    continue;
                }
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Tokenizes an entire content stream.
pub fn tokenize(input: &[u8]) -> ContentResult<Vec<Token<'_>>> {
    let mut tokenizer = Tokenizer::new(input);
    let mut tokens = Vec::new();
    while let Some(token) = tokenizer.next_token()? {
        tokens.push(token);
    }
    Ok(tokens)
}

/// Reconstructs the byte stream a token sequence represents. Tokens emitted
/// unchanged by the rewriter round-trip exactly via their `raw` slice.
pub fn render(tokens: &[Token<'_>]) -> Vec<u8> {
    let mut out = Vec::with_capacity(tokens.iter().map(|t| t.raw.len()).sum());
    for token in tokens {
        out.extend_from_slice(token.raw);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_arbitrary_content_byte_for_byte() {
        let input = b"q 1 0 0 1 50 50 cm 2 w\n0 0 100 100 re S Q % trailing comment\n";
        let tokens = tokenize(input).unwrap();
        assert_eq!(render(&tokens), input.to_vec());
    }

    #[test]
    fn tokenizes_numbers() {
        let tokens = tokenize(b"123 -45 3.14 -0.5 .5").unwrap();
        let nums: Vec<_> = tokens.iter().filter_map(|t| t.as_number()).collect();
        assert_eq!(nums, vec![123.0, -45.0, 3.14, -0.5, 0.5]);
    }

    #[test]
    fn tokenizes_names_with_hex_escapes() {
        let tokens = tokenize(b"/Name#20with#20spaces").unwrap();
        assert_eq!(tokens[0].as_name(), Some("Name with spaces"));
        assert_eq!(tokens[0].raw, b"/Name#20with#20spaces");
    }

    #[test]
    fn preserves_literal_string_with_nested_parens_and_escapes() {
        let input = b"(Nested (paren) and \\) escape)";
        let tokens = tokenize(input).unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].raw, &input[..]);
    }

    #[test]
    fn unterminated_string_is_an_error() {
        assert!(tokenize(b"(unterminated").is_err());
    }

    #[test]
    fn whitespace_runs_collapse_to_one_token() {
        let tokens = tokenize(b"1  \t\n  2").unwrap();
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[1].kind, TokenKind::Whitespace);
    }

    #[test]
    fn inline_image_payload_is_kept_as_one_opaque_span() {
        let input: &[u8] = b"BI /W 2 /H 2 /BPC 8 /CS /RGB ID \xff\x00\xff\x00 EI Q";
        let tokens = tokenize(input).unwrap();
        assert!(tokens.iter().any(|t| t.is_operator("BI")));
        assert!(tokens.iter().any(|t| t.kind == TokenKind::InlineImageData));
        assert_eq!(render(&tokens), input.to_vec());
    }

    #[test]
    fn distinguishes_hex_string_from_dict_delimiters() {
        let tokens = tokenize(b"<< 48656C6C6F >> <48656C6C6F>").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::DictStart);
        let last = tokens.last().unwrap();
        assert_eq!(last.kind, TokenKind::HexString);
        assert_eq!(last.raw, b"<48656C6C6F>");
    }
}
