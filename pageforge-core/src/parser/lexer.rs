//! PDF tokenizer.
//!
//! Tokenizes container syntax according to ISO 32000-1 section 7.2. The
//! lexer works over the fully loaded file bytes, so positions are exact
//! byte offsets usable for seeking and error reporting.

use super::{ParseError, ParseResult};

/// PDF token types
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Boolean: true or false
    Boolean(bool),

    /// Integer number
    Integer(i64),

    /// Real number
    Real(f64),

    /// String (literal or hexadecimal), as raw bytes
    String(Vec<u8>),

    /// Name object (e.g., /Type)
    Name(String),

    /// Left square bracket [
    ArrayStart,

    /// Right square bracket ]
    ArrayEnd,

    /// Dictionary start <<
    DictStart,

    /// Dictionary end >>
    DictEnd,

    /// obj keyword
    Obj,

    /// endobj keyword
    EndObj,

    /// stream keyword
    Stream,

    /// endstream keyword
    EndStream,

    /// R keyword completing an indirect reference
    Ref,

    /// null keyword
    Null,

    /// xref keyword
    Xref,

    /// trailer keyword
    Trailer,

    /// startxref keyword
    StartXref,

    /// End of input
    Eof,
}

impl Token {
    /// Short description used in error messages
    pub fn describe(&self) -> String {
        match self {
            Token::Boolean(b) => format!("boolean {b}"),
            Token::Integer(i) => format!("integer {i}"),
            Token::Real(r) => format!("real {r}"),
            Token::String(_) => "string".to_string(),
            Token::Name(n) => format!("name /{n}"),
            Token::ArrayStart => "'['".to_string(),
            Token::ArrayEnd => "']'".to_string(),
            Token::DictStart => "'<<'".to_string(),
            Token::DictEnd => "'>>'".to_string(),
            Token::Obj => "'obj'".to_string(),
            Token::EndObj => "'endobj'".to_string(),
            Token::Stream => "'stream'".to_string(),
            Token::EndStream => "'endstream'".to_string(),
            Token::Ref => "'R'".to_string(),
            Token::Null => "'null'".to_string(),
            Token::Xref => "'xref'".to_string(),
            Token::Trailer => "'trailer'".to_string(),
            Token::StartXref => "'startxref'".to_string(),
            Token::Eof => "end of input".to_string(),
        }
    }
}

pub(crate) fn is_whitespace(b: u8) -> bool {
    matches!(b, b'\0' | b'\t' | b'\n' | b'\x0c' | b'\r' | b' ')
}

pub(crate) fn is_delimiter(b: u8) -> bool {
    matches!(
        b,
        b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%'
    )
}

pub(crate) fn is_regular(b: u8) -> bool {
    !is_whitespace(b) && !is_delimiter(b)
}

/// Tokenizer over loaded file bytes.
pub struct Lexer<'a> {
    data: &'a [u8],
    position: usize,
    token_buffer: Vec<Token>,
}

impl<'a> Lexer<'a> {
    /// Create a lexer reading from the start of the buffer
    pub fn new(data: &'a [u8]) -> Self {
        Self::new_at(data, 0)
    }

    /// Create a lexer starting at a byte offset
    pub fn new_at(data: &'a [u8], offset: usize) -> Self {
        Self {
            data,
            position: offset.min(data.len()),
            token_buffer: Vec::new(),
        }
    }

    /// Current byte offset (only meaningful with no pushed-back tokens)
    pub fn position(&self) -> usize {
        self.position
    }

    /// Move to an absolute byte offset, dropping pushed-back tokens
    pub fn set_position(&mut self, position: usize) {
        self.position = position.min(self.data.len());
        self.token_buffer.clear();
    }

    /// The underlying buffer
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Push a token back; it is returned by the next `next_token` call
    pub fn push_token(&mut self, token: Token) {
        self.token_buffer.push(token);
    }

    /// Get the next token
    pub fn next_token(&mut self) -> ParseResult<Token> {
        if let Some(token) = self.token_buffer.pop() {
            return Ok(token);
        }

        self.skip_whitespace_and_comments();

        let ch = match self.peek() {
            Some(ch) => ch,
            None => return Ok(Token::Eof),
        };

        match ch {
            b'/' => self.read_name(),
            b'(' => self.read_literal_string(),
            b'<' => {
                if self.peek_at(1) == Some(b'<') {
                    self.position += 2;
                    Ok(Token::DictStart)
                } else {
                    self.read_hex_string()
                }
            }
            b'>' => {
                if self.peek_at(1) == Some(b'>') {
                    self.position += 2;
                    Ok(Token::DictEnd)
                } else {
                    Err(self.syntax_error("expected '>>'"))
                }
            }
            b'[' => {
                self.position += 1;
                Ok(Token::ArrayStart)
            }
            b']' => {
                self.position += 1;
                Ok(Token::ArrayEnd)
            }
            b'+' | b'-' | b'.' | b'0'..=b'9' => self.read_number(),
            _ if is_regular(ch) => self.read_keyword(),
            _ => Err(self.syntax_error(&format!("unexpected character 0x{ch:02x}"))),
        }
    }

    /// Peek at the next token without consuming it
    pub fn peek_token(&mut self) -> ParseResult<Token> {
        let token = self.next_token()?;
        self.push_token(token.clone());
        Ok(token)
    }

    /// Consume one token, failing unless it equals `expected`
    pub fn expect_token(&mut self, expected: Token) -> ParseResult<()> {
        let found = self.next_token()?;
        if found == expected {
            Ok(())
        } else {
            Err(ParseError::UnexpectedToken {
                expected: expected.describe(),
                found: found.describe(),
            })
        }
    }

    /// Skip the end-of-line sequence that follows the `stream` keyword.
    ///
    /// The format requires CRLF or LF here; a bare CR is accepted too since
    /// damaged files are common.
    pub fn skip_stream_eol(&mut self) {
        match self.peek() {
            Some(b'\r') => {
                self.position += 1;
                if self.peek() == Some(b'\n') {
                    self.position += 1;
                }
            }
            Some(b'\n') => self.position += 1,
            _ => {}
        }
    }

    /// Find the next occurrence of `needle` at or after `from`
    pub fn find_from(&self, needle: &[u8], from: usize) -> Option<usize> {
        if needle.is_empty() || from >= self.data.len() {
            return None;
        }
        self.data[from..]
            .windows(needle.len())
            .position(|w| w == needle)
            .map(|p| p + from)
    }

    fn syntax_error(&self, message: &str) -> ParseError {
        ParseError::SyntaxError {
            position: self.position,
            message: message.to_string(),
        }
    }

    fn peek(&self) -> Option<u8> {
        self.data.get(self.position).copied()
    }

    fn peek_at(&self, ahead: usize) -> Option<u8> {
        self.data.get(self.position + ahead).copied()
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            while let Some(ch) = self.peek() {
                if is_whitespace(ch) {
                    self.position += 1;
                } else {
                    break;
                }
            }
            if self.peek() == Some(b'%') {
                while let Some(ch) = self.peek() {
                    self.position += 1;
                    if ch == b'\n' || ch == b'\r' {
                        break;
                    }
                }
            } else {
                return;
            }
        }
    }

    fn read_number(&mut self) -> ParseResult<Token> {
        let start = self.position;
        let mut seen_dot = false;

        if matches!(self.peek(), Some(b'+') | Some(b'-')) {
            self.position += 1;
        }
        while let Some(ch) = self.peek() {
            match ch {
                b'0'..=b'9' => self.position += 1,
                b'.' if !seen_dot => {
                    seen_dot = true;
                    self.position += 1;
                }
                _ => break,
            }
        }

        let text = std::str::from_utf8(&self.data[start..self.position])
            .map_err(|_| self.syntax_error("invalid number"))?;
        if text.is_empty() || text == "+" || text == "-" || text == "." {
            return Err(self.syntax_error("invalid number"));
        }

        if seen_dot {
            let value: f64 = normalize_real(text)
                .parse()
                .map_err(|_| self.syntax_error("invalid real number"))?;
            Ok(Token::Real(value))
        } else {
            let value: i64 = text
                .parse()
                .map_err(|_| self.syntax_error("integer out of range"))?;
            Ok(Token::Integer(value))
        }
    }

    fn read_name(&mut self) -> ParseResult<Token> {
        self.position += 1; // leading '/'
        let mut name = String::new();
        while let Some(ch) = self.peek() {
            if !is_regular(ch) {
                break;
            }
            self.position += 1;
            if ch == b'#' {
                let hi = self.peek().and_then(hex_value);
                let lo = self.peek_at(1).and_then(hex_value);
                match (hi, lo) {
                    (Some(hi), Some(lo)) => {
                        self.position += 2;
                        name.push((hi * 16 + lo) as char);
                    }
                    // Stray '#' without two hex digits is kept literally
                    _ => name.push('#'),
                }
            } else {
                name.push(ch as char);
            }
        }
        Ok(Token::Name(name))
    }

    fn read_literal_string(&mut self) -> ParseResult<Token> {
        self.position += 1; // leading '('
        let mut bytes = Vec::new();
        let mut depth = 1usize;

        while let Some(ch) = self.peek() {
            self.position += 1;
            match ch {
                b'(' => {
                    depth += 1;
                    bytes.push(ch);
                }
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(Token::String(bytes));
                    }
                    bytes.push(ch);
                }
                b'\\' => match self.peek() {
                    Some(b'n') => {
                        self.position += 1;
                        bytes.push(b'\n');
                    }
                    Some(b'r') => {
                        self.position += 1;
                        bytes.push(b'\r');
                    }
                    Some(b't') => {
                        self.position += 1;
                        bytes.push(b'\t');
                    }
                    Some(b'b') => {
                        self.position += 1;
                        bytes.push(0x08);
                    }
                    Some(b'f') => {
                        self.position += 1;
                        bytes.push(0x0c);
                    }
                    Some(c @ (b'(' | b')' | b'\\')) => {
                        self.position += 1;
                        bytes.push(c);
                    }
                    Some(b'\r') => {
                        // Line continuation: backslash + EOL is dropped
                        self.position += 1;
                        if self.peek() == Some(b'\n') {
                            self.position += 1;
                        }
                    }
                    Some(b'\n') => {
                        self.position += 1;
                    }
                    Some(d @ b'0'..=b'7') => {
                        let mut value = (d - b'0') as u16;
                        self.position += 1;
                        for _ in 0..2 {
                            match self.peek() {
                                Some(d @ b'0'..=b'7') => {
                                    value = value * 8 + (d - b'0') as u16;
                                    self.position += 1;
                                }
                                _ => break,
                            }
                        }
                        bytes.push((value & 0xff) as u8);
                    }
                    Some(other) => {
                        // Unknown escape: the backslash is ignored
                        self.position += 1;
                        bytes.push(other);
                    }
                    None => break,
                },
                _ => bytes.push(ch),
            }
        }

        Err(self.syntax_error("unterminated literal string"))
    }

    fn read_hex_string(&mut self) -> ParseResult<Token> {
        self.position += 1; // leading '<'
        let mut bytes = Vec::new();
        let mut pending: Option<u8> = None;

        while let Some(ch) = self.peek() {
            self.position += 1;
            if ch == b'>' {
                if let Some(hi) = pending {
                    // Odd digit count: the final digit is padded with zero
                    bytes.push(hi * 16);
                }
                return Ok(Token::String(bytes));
            }
            if is_whitespace(ch) {
                continue;
            }
            match hex_value(ch) {
                Some(v) => match pending.take() {
                    Some(hi) => bytes.push(hi * 16 + v),
                    None => pending = Some(v),
                },
                None => {
                    return Err(self.syntax_error("invalid character in hex string"));
                }
            }
        }

        Err(self.syntax_error("unterminated hex string"))
    }

    fn read_keyword(&mut self) -> ParseResult<Token> {
        let start = self.position;
        while let Some(ch) = self.peek() {
            if !is_regular(ch) {
                break;
            }
            self.position += 1;
        }
        let keyword = &self.data[start..self.position];

        match keyword {
            b"true" => Ok(Token::Boolean(true)),
            b"false" => Ok(Token::Boolean(false)),
            b"null" => Ok(Token::Null),
            b"obj" => Ok(Token::Obj),
            b"endobj" => Ok(Token::EndObj),
            b"stream" => Ok(Token::Stream),
            b"endstream" => Ok(Token::EndStream),
            b"R" => Ok(Token::Ref),
            b"xref" => Ok(Token::Xref),
            b"trailer" => Ok(Token::Trailer),
            b"startxref" => Ok(Token::StartXref),
            _ => Err(ParseError::SyntaxError {
                position: start,
                message: format!(
                    "unknown keyword: {}",
                    String::from_utf8_lossy(keyword)
                ),
            }),
        }
    }
}

/// `.5`, `4.` and `-.2` are valid reals in PDF but not for `str::parse`.
fn normalize_real(text: &str) -> String {
    let (sign, digits) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text.strip_prefix('+').unwrap_or(text)),
    };
    let mut normalized = String::from(sign);
    if digits.starts_with('.') {
        normalized.push('0');
    }
    normalized.push_str(digits);
    if normalized.ends_with('.') {
        normalized.push('0');
    }
    normalized
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_tokens(input: &[u8]) -> Vec<Token> {
        let mut lexer = Lexer::new(input);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token().unwrap();
            if token == Token::Eof {
                return tokens;
            }
            tokens.push(token);
        }
    }

    #[test]
    fn test_integers_and_reals() {
        assert_eq!(
            all_tokens(b"42 -17 +3 3.14 -.5 4. 0"),
            vec![
                Token::Integer(42),
                Token::Integer(-17),
                Token::Integer(3),
                Token::Real(3.14),
                Token::Real(-0.5),
                Token::Real(4.0),
                Token::Integer(0),
            ]
        );
    }

    #[test]
    fn test_names() {
        assert_eq!(
            all_tokens(b"/Type /Pages /A#42"),
            vec![
                Token::Name("Type".to_string()),
                Token::Name("Pages".to_string()),
                Token::Name("AB".to_string()),
            ]
        );
    }

    #[test]
    fn test_empty_name() {
        assert_eq!(all_tokens(b"/ /X"), vec![
            Token::Name(String::new()),
            Token::Name("X".to_string()),
        ]);
    }

    #[test]
    fn test_literal_string_with_escapes() {
        assert_eq!(
            all_tokens(b"(Hello \\(World\\))"),
            vec![Token::String(b"Hello (World)".to_vec())]
        );
        assert_eq!(
            all_tokens(b"(line\\nbreak)"),
            vec![Token::String(b"line\nbreak".to_vec())]
        );
        assert_eq!(
            all_tokens(b"(nested (parens) kept)"),
            vec![Token::String(b"nested (parens) kept".to_vec())]
        );
    }

    #[test]
    fn test_literal_string_octal_escape() {
        assert_eq!(
            all_tokens(b"(\\101\\102\\103)"),
            vec![Token::String(b"ABC".to_vec())]
        );
    }

    #[test]
    fn test_hex_string() {
        assert_eq!(
            all_tokens(b"<48656C6C6F>"),
            vec![Token::String(b"Hello".to_vec())]
        );
        // Odd digit count pads with zero
        assert_eq!(all_tokens(b"<48F>"), vec![Token::String(vec![0x48, 0xf0])]);
        // Whitespace inside is ignored
        assert_eq!(
            all_tokens(b"<48 65 6C>"),
            vec![Token::String(b"Hel".to_vec())]
        );
    }

    #[test]
    fn test_dict_and_array_delimiters() {
        assert_eq!(
            all_tokens(b"<< /Kids [1 0 R] >>"),
            vec![
                Token::DictStart,
                Token::Name("Kids".to_string()),
                Token::ArrayStart,
                Token::Integer(1),
                Token::Integer(0),
                Token::Ref,
                Token::ArrayEnd,
                Token::DictEnd,
            ]
        );
    }

    #[test]
    fn test_keywords() {
        assert_eq!(
            all_tokens(b"1 0 obj null true false endobj startxref"),
            vec![
                Token::Integer(1),
                Token::Integer(0),
                Token::Obj,
                Token::Null,
                Token::Boolean(true),
                Token::Boolean(false),
                Token::EndObj,
                Token::StartXref,
            ]
        );
    }

    #[test]
    fn test_comments_are_skipped() {
        assert_eq!(
            all_tokens(b"% a comment\n42 % trailing\n7"),
            vec![Token::Integer(42), Token::Integer(7)]
        );
    }

    #[test]
    fn test_push_token() {
        let mut lexer = Lexer::new(b"1 2");
        let first = lexer.next_token().unwrap();
        assert_eq!(first, Token::Integer(1));
        lexer.push_token(first);
        assert_eq!(lexer.next_token().unwrap(), Token::Integer(1));
        assert_eq!(lexer.next_token().unwrap(), Token::Integer(2));
    }

    #[test]
    fn test_peek_token_does_not_consume() {
        let mut lexer = Lexer::new(b"/Name");
        assert_eq!(lexer.peek_token().unwrap(), Token::Name("Name".to_string()));
        assert_eq!(lexer.next_token().unwrap(), Token::Name("Name".to_string()));
        assert_eq!(lexer.next_token().unwrap(), Token::Eof);
    }

    #[test]
    fn test_expect_token_mismatch() {
        let mut lexer = Lexer::new(b"42");
        let err = lexer.expect_token(Token::Obj).unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedToken { .. }));
    }

    #[test]
    fn test_unterminated_string_errors() {
        let mut lexer = Lexer::new(b"(never closed");
        assert!(matches!(
            lexer.next_token(),
            Err(ParseError::SyntaxError { .. })
        ));
    }

    #[test]
    fn test_unknown_keyword_errors() {
        let mut lexer = Lexer::new(b"bogus");
        assert!(matches!(
            lexer.next_token(),
            Err(ParseError::SyntaxError { .. })
        ));
    }

    #[test]
    fn test_skip_stream_eol() {
        let mut lexer = Lexer::new(b"stream\r\ndata");
        assert_eq!(lexer.next_token().unwrap(), Token::Stream);
        lexer.skip_stream_eol();
        assert_eq!(lexer.position(), 8);
    }

    #[test]
    fn test_find_from() {
        let lexer = Lexer::new(b"aa endstream bb endstream");
        assert_eq!(lexer.find_from(b"endstream", 0), Some(3));
        assert_eq!(lexer.find_from(b"endstream", 4), Some(16));
        assert_eq!(lexer.find_from(b"missing", 0), None);
    }
}
