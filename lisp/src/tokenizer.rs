use std::convert::TryFrom;

use shared::error::Error;

#[derive(Debug, PartialEq, Clone)]
enum RawTokenKind
{
    ParenLeft,
    ParenRight,
    // Already unescaped.
    String,
    // A run starting with a digit.
    Number,
    // Identifiers and reserved words.
    Word,
}

#[derive(Debug, PartialEq, Clone)]
struct RawToken
{
    src: String,
    kind: RawTokenKind,
    line: usize,
}

impl RawToken
{
    pub fn new(src: &str, kind: RawTokenKind, line: usize) -> Self
    {
        Self{ src: src.to_owned(), kind: kind, line: line }
    }

    pub fn withString(src: String, kind: RawTokenKind, line: usize) -> Self
    {
        Self{ src: src, kind: kind, line: line }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum TokenValue
{
    ParenLeft,
    ParenRight,
    Ident(String),
    Number(f64),
    String(String),
    Set,
    If,
    While,
    Defn,
    For,
}

impl TokenValue
{
    pub fn getIdentifier(&self) -> Option<&str>
    {
        if let Self::Ident(name) = self
        {
            Some(&name)
        }
        else
        {
            None
        }
    }

    /// Whether this is one of the special-form words.
    pub fn isReserved(&self) -> bool
    {
        match self
        {
            Self::Set | Self::If | Self::While | Self::Defn | Self::For => true,
            _ => false,
        }
    }

    fn reserved(word: &str) -> Option<Self>
    {
        match word
        {
            "set" => Some(Self::Set),
            "if" => Some(Self::If),
            "while" => Some(Self::While),
            "defn" => Some(Self::Defn),
            "for" => Some(Self::For),
            _ => None,
        }
    }
}

/// A lexeme together with its classification and the line it started
/// on. Literal tokens carry their value inside `TokenValue`.
#[derive(Debug, PartialEq, Clone)]
pub struct Token
{
    src: String,
    value: TokenValue,
    line: usize,
}

impl Token
{
    #[cfg(test)]
    pub fn new(src: &str, v: TokenValue) -> Self
    {
        Self{ src: String::from(src), value: v, line: 1 }
    }

    pub fn value(&self) -> &TokenValue
    {
        &self.value
    }

    pub fn src(&self) -> &str
    {
        &self.src
    }

    pub fn line(&self) -> usize
    {
        self.line
    }
}

impl TryFrom<RawToken> for Token
{
    type Error = Error;
    fn try_from(t: RawToken) -> Result<Self, Error>
    {
        let v: TokenValue = match t.kind
        {
            RawTokenKind::ParenLeft => TokenValue::ParenLeft,
            RawTokenKind::ParenRight => TokenValue::ParenRight,
            RawTokenKind::String => TokenValue::String(t.src.clone()),
            RawTokenKind::Number => TokenValue::Number(
                t.src.parse::<f64>().ok().filter(|x| x.is_finite()).ok_or_else(
                    || lexerr!(t.line, "'{}' is not a number", t.src))?),
            RawTokenKind::Word => TokenValue::reserved(&t.src).unwrap_or_else(
                || TokenValue::Ident(t.src.clone())),
        };
        Ok(Self{ src: t.src, value: v, line: t.line })
    }
}

fn isWhitespace(c: char) -> bool
{
    c == ' ' || c == '\t' || c == '\n' || c == '\r'
}

fn endsToken(c: char) -> bool
{
    c == '(' || c == ')' || isWhitespace(c)
}

fn escapeDigits(chars: &[char], start: usize, count: usize, radix: u32,
                line: usize) -> Result<u32, Error>
{
    let mut value = 0;
    for k in 0..count
    {
        let digit = chars.get(start + k).and_then(|c| c.to_digit(radix))
            .ok_or_else(|| lexerr!(line, "malformed escape sequence: \\{}",
                                   chars[start - 1..(start + k).min(chars.len())]
                                   .iter().collect::<String>()))?;
        value = value * radix + digit;
    }
    Ok(value)
}

/// Decode the escape whose letter is at `chars[i]` into `out`. Returns
/// how many characters after the backslash were consumed.
fn unescape(chars: &[char], i: usize, line: usize, out: &mut Vec<u8>)
            -> Result<usize, Error>
{
    let c = chars[i];
    let byte = match c
    {
        'a' => Some(0x07),
        'b' => Some(0x08),
        'f' => Some(0x0c),
        'n' => Some(b'\n'),
        'r' => Some(b'\r'),
        't' => Some(b'\t'),
        'v' => Some(0x0b),
        '\\' => Some(b'\\'),
        '"' => Some(b'"'),
        _ => None,
    };
    if let Some(b) = byte
    {
        out.push(b);
        return Ok(1);
    }

    match c
    {
        'x' =>
        {
            out.push(escapeDigits(chars, i + 1, 2, 16, line)? as u8);
            Ok(3)
        },
        '0'..='7' =>
        {
            let value = escapeDigits(chars, i, 3, 8, line)?;
            if value > 0xff
            {
                return Err(lexerr!(line, "octal escape value {} > 255", value));
            }
            out.push(value as u8);
            Ok(3)
        },
        'u' | 'U' =>
        {
            let width = if c == 'u' { 4 } else { 8 };
            let value = escapeDigits(chars, i + 1, width, 16, line)?;
            let decoded = std::char::from_u32(value).ok_or_else(
                || lexerr!(line, "escape \\{}{:x} is not a valid code point", c, value))?;
            pushChar(out, decoded);
            Ok(1 + width)
        },
        _ => Err(lexerr!(line, "invalid escape sequence: \\{}", c)),
    }
}

fn pushChar(out: &mut Vec<u8>, c: char)
{
    let mut buf = [0; 4];
    out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
}

fn tokenize0(src: &str) -> Result<Vec<RawToken>, Error>
{
    let mut result: Vec<RawToken> = Vec::new();
    let chars: Vec<char> = src.chars().collect();
    let mut line = 1;
    let mut i = 0;
    while i < chars.len()
    {
        let c = chars[i];

        if c == '('
        {
            result.push(RawToken::new("(", RawTokenKind::ParenLeft, line));
            i += 1;
        }
        else if c == ')'
        {
            result.push(RawToken::new(")", RawTokenKind::ParenRight, line));
            i += 1;
        }
        else if c.is_ascii_digit()
        {
            let start = i;
            while i < chars.len() && !endsToken(chars[i])
            {
                i += 1;
            }
            result.push(RawToken::withString(
                chars[start..i].iter().collect(), RawTokenKind::Number, line));
        }
        else if c == '"'
        {
            let mut buffer: Vec<u8> = Vec::new();
            i += 1;             // Opening quote.
            loop
            {
                if i >= chars.len()
                {
                    return Err(lexerr!(line, "unterminated string \"{}",
                                       String::from_utf8_lossy(&buffer)));
                }
                match chars[i]
                {
                    '"' => break,
                    '\n' => return Err(lexerr!(
                        line, "unterminated string \"{}", String::from_utf8_lossy(&buffer))),
                    '\\' =>
                    {
                        if i + 1 >= chars.len() || chars[i + 1] == '\n'
                        {
                            return Err(lexerr!(
                                line, "unterminated string \"{}",
                                String::from_utf8_lossy(&buffer)));
                        }
                        i += 1 + unescape(&chars, i + 1, line, &mut buffer)?;
                    },
                    other =>
                    {
                        pushChar(&mut buffer, other);
                        i += 1;
                    },
                }
            }
            i += 1;             // Closing quote.
            let text = String::from_utf8(buffer).map_err(
                |_| lexerr!(line, "string literal is not valid UTF-8"))?;
            result.push(RawToken::withString(text, RawTokenKind::String, line));
        }
        else if isWhitespace(c)
        {
            if c == '\n'
            {
                line += 1;
            }
            i += 1;
        }
        else
        {
            let start = i;
            while i < chars.len() && !endsToken(chars[i])
            {
                i += 1;
            }
            result.push(RawToken::withString(
                chars[start..i].iter().collect(), RawTokenKind::Word, line));
        }
    }
    Ok(result)
}

pub fn tokenize(src: &str) -> Result<Vec<Token>, Error>
{
    let result: Result<Vec<Token>, Error> = tokenize0(src)?.into_iter()
        .map(|rt| Token::try_from(rt)).collect();
    if let Ok(tokens) = &result
    {
        tracing::trace!(count = tokens.len(), "tokenized");
    }
    result
}
