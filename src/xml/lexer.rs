//! Tokenizer for the subset of XML used by topology files.
//!
//! Produces start tags (with attributes), end tags and text. The XML
//! declaration, processing instructions, comments and `<!DOCTYPE ...>` are
//! skipped; CDATA sections are returned as text.

use crate::xml::XmlError;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    StartTag {
        name: String,
        attributes: Vec<(String, String)>,
        self_closing: bool,
    },
    EndTag(String),
    Text(String),
    Eof,
}

/// Position of a token in the source, 1-based
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

pub struct Lexer {
    input: Vec<char>,
    position: usize,
    current_char: Option<char>,
    line: usize,
    column: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        let chars: Vec<char> = input.chars().collect();
        let current_char = chars.first().copied();
        Self {
            input: chars,
            position: 0,
            current_char,
            line: 1,
            column: 1,
        }
    }

    pub fn position(&self) -> Position {
        Position { line: self.line, column: self.column }
    }

    fn error(&self, message: impl Into<String>) -> XmlError {
        XmlError::Syntax {
            line: self.line,
            column: self.column,
            message: message.into(),
        }
    }

    fn advance(&mut self) {
        if self.current_char == Some('\n') {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        self.position += 1;
        self.current_char = self.input.get(self.position).copied();
    }

    fn starts_with(&self, prefix: &str) -> bool {
        prefix
            .chars()
            .enumerate()
            .all(|(i, c)| self.input.get(self.position + i) == Some(&c))
    }

    fn skip(&mut self, count: usize) {
        for _ in 0..count {
            self.advance();
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.current_char, Some(ch) if ch.is_whitespace()) {
            self.advance();
        }
    }

    /// Skip input up to and including `terminator`
    fn skip_until(&mut self, terminator: &str, what: &str) -> Result<(), XmlError> {
        while self.current_char.is_some() {
            if self.starts_with(terminator) {
                self.skip(terminator.chars().count());
                return Ok(());
            }
            self.advance();
        }
        Err(self.error(format!("Unterminated {}", what)))
    }

    fn read_until(&mut self, terminator: &str, what: &str) -> Result<String, XmlError> {
        let mut result = String::new();
        while let Some(ch) = self.current_char {
            if self.starts_with(terminator) {
                self.skip(terminator.chars().count());
                return Ok(result);
            }
            result.push(ch);
            self.advance();
        }
        Err(self.error(format!("Unterminated {}", what)))
    }

    fn read_name(&mut self) -> Result<String, XmlError> {
        let mut name = String::new();
        while let Some(ch) = self.current_char {
            if ch.is_alphanumeric() || matches!(ch, '_' | '-' | '.' | ':') {
                name.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        if name.is_empty() {
            return Err(self.error(format!("Expected a name, found {:?}", self.current_char)));
        }
        Ok(name)
    }

    fn read_attribute_value(&mut self) -> Result<String, XmlError> {
        let quote = match self.current_char {
            Some(q @ ('"' | '\'')) => q,
            other => return Err(self.error(format!("Expected quoted attribute value, found {:?}", other))),
        };
        self.advance();

        let mut raw = String::new();
        while let Some(ch) = self.current_char {
            if ch == quote {
                self.advance();
                return self.decode(&raw);
            }
            if ch == '<' {
                return Err(self.error("'<' is not allowed in attribute values"));
            }
            raw.push(ch);
            self.advance();
        }
        Err(self.error("Unterminated attribute value"))
    }

    /// Replace entity and character references
    fn decode(&self, raw: &str) -> Result<String, XmlError> {
        let mut result = String::with_capacity(raw.len());
        let mut rest = raw;
        while let Some(start) = rest.find('&') {
            result.push_str(&rest[..start]);
            let end = rest[start..]
                .find(';')
                .ok_or_else(|| self.error("Unterminated entity reference"))?;
            let entity = &rest[start + 1..start + end];
            let decoded = match entity {
                "amp" => '&',
                "lt" => '<',
                "gt" => '>',
                "quot" => '"',
                "apos" => '\'',
                _ => {
                    let code = if let Some(hex) = entity.strip_prefix("#x") {
                        u32::from_str_radix(hex, 16).ok()
                    } else if let Some(dec) = entity.strip_prefix('#') {
                        dec.parse::<u32>().ok()
                    } else {
                        None
                    };
                    code.and_then(char::from_u32)
                        .ok_or_else(|| self.error(format!("Unknown entity '&{};'", entity)))?
                }
            };
            result.push(decoded);
            rest = &rest[start + end + 1..];
        }
        result.push_str(rest);
        Ok(result)
    }

    fn read_start_tag(&mut self) -> Result<Token, XmlError> {
        let name = self.read_name()?;
        let mut attributes = Vec::new();

        loop {
            self.skip_whitespace();
            match self.current_char {
                Some('/') => {
                    self.advance();
                    if self.current_char != Some('>') {
                        return Err(self.error("Expected '>' after '/'"));
                    }
                    self.advance();
                    return Ok(Token::StartTag { name, attributes, self_closing: true });
                }
                Some('>') => {
                    self.advance();
                    return Ok(Token::StartTag { name, attributes, self_closing: false });
                }
                Some(_) => {
                    let key = self.read_name()?;
                    self.skip_whitespace();
                    if self.current_char != Some('=') {
                        return Err(self.error(format!("Expected '=' after attribute '{}'", key)));
                    }
                    self.advance();
                    self.skip_whitespace();
                    let value = self.read_attribute_value()?;
                    if attributes.iter().any(|(k, _)| *k == key) {
                        return Err(self.error(format!("Duplicate attribute '{}' on <{}>", key, name)));
                    }
                    attributes.push((key, value));
                }
                None => return Err(self.error(format!("Unterminated tag <{}>", name))),
            }
        }
    }

    pub fn next_token(&mut self) -> Result<Token, XmlError> {
        loop {
            match self.current_char {
                None => return Ok(Token::Eof),
                Some('<') => {
                    if self.starts_with("<!--") {
                        self.skip(4);
                        self.skip_until("-->", "comment")?;
                    } else if self.starts_with("<![CDATA[") {
                        self.skip(9);
                        return Ok(Token::Text(self.read_until("]]>", "CDATA section")?));
                    } else if self.starts_with("<?") {
                        self.skip(2);
                        self.skip_until("?>", "processing instruction")?;
                    } else if self.starts_with("<!") {
                        self.skip(2);
                        self.skip_until(">", "declaration")?;
                    } else if self.starts_with("</") {
                        self.skip(2);
                        let name = self.read_name()?;
                        self.skip_whitespace();
                        if self.current_char != Some('>') {
                            return Err(self.error(format!("Expected '>' to close </{}", name)));
                        }
                        self.advance();
                        return Ok(Token::EndTag(name));
                    } else {
                        self.advance();
                        return self.read_start_tag();
                    }
                }
                Some(_) => {
                    let mut raw = String::new();
                    while let Some(ch) = self.current_char {
                        if ch == '<' {
                            break;
                        }
                        raw.push(ch);
                        self.advance();
                    }
                    return Ok(Token::Text(self.decode(&raw)?));
                }
            }
        }
    }
}
