//! Reading [TypeDescriptor]s from type expressions such as `Dictionary<String, List<Int32>>`

use std::str::FromStr;

use super::TypeDescriptor;

/// Deepest generic argument nesting accepted in a type expression
pub const MAX_NESTING: usize = 128;

/// Error returned when a type expression can not be read
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseTypeError {
    #[error("expected a type name at offset {0}")]
    EmptyName(usize),
    #[error("unbalanced brackets at offset {0}")]
    Unbalanced(usize),
    #[error("unexpected input after the type expression at offset {0}")]
    TrailingInput(usize),
    #[error("generic arguments nested deeper than 128 levels at offset {0}")]
    TooDeep(usize),
}

impl FromStr for TypeDescriptor {
    type Err = ParseTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parser = Parser {
            input: s,
            pos: 0,
            nesting: 0,
        };
        let descriptor = parser.parse_type()?;
        parser.skip_whitespace();
        match parser.pos == s.len() {
            true => Ok(descriptor),
            false => Err(ParseTypeError::TrailingInput(parser.pos)),
        }
    }
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
    /// Argument lists currently open
    nesting: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump(&mut self, c: char) {
        self.pos += c.len_utf8();
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek().filter(|c| c.is_whitespace()) {
            self.bump(c);
        }
    }

    /// `head` or `head<type, type, ...>`
    fn parse_type(&mut self) -> Result<TypeDescriptor, ParseTypeError> {
        self.skip_whitespace();
        let start = self.pos;
        let head = self.parse_head()?;
        if head.is_empty() {
            return Err(ParseTypeError::EmptyName(start));
        }
        let name = simplify_paths(head);

        if self.peek() != Some('<') {
            return Ok(TypeDescriptor::simple(name));
        }
        if self.nesting == MAX_NESTING {
            return Err(ParseTypeError::TooDeep(self.pos));
        }
        self.bump('<');
        self.nesting += 1;

        let mut arguments = Vec::new();
        loop {
            arguments.push(self.parse_type()?);
            self.skip_whitespace();
            match self.peek() {
                Some(c @ ',') => self.bump(c),
                Some(c @ '>') => {
                    self.bump(c);
                    break;
                }
                _ => return Err(ParseTypeError::Unbalanced(self.pos)),
            }
        }

        self.nesting -= 1;
        Ok(TypeDescriptor::generic(name, arguments))
    }

    /// Everything up to the argument list or the end of the current argument.
    ///
    /// Brackets opened inside the head (tuples, slices, arrays, function pointers) are
    /// kept verbatim, generic arguments nested in them included.
    fn parse_head(&mut self) -> Result<&'a str, ParseTypeError> {
        let start = self.pos;
        let mut depth = 0usize;
        while let Some(c) = self.peek() {
            match c {
                '-' if self.input[self.pos..].starts_with("->") => {
                    self.pos += 2;
                    continue;
                }
                '<' | ',' | '>' if depth == 0 => break,
                '(' | '[' | '<' => depth += 1,
                ')' | ']' | '>' => {
                    depth = depth
                        .checked_sub(1)
                        .ok_or(ParseTypeError::Unbalanced(self.pos))?;
                }
                _ => {}
            }
            self.bump(c);
        }
        if depth != 0 {
            return Err(ParseTypeError::Unbalanced(self.pos));
        }
        Ok(self.input[start..self.pos].trim())
    }
}

/// Drop module paths from every path in `s`: `&alloc::string::String` becomes `&String`
pub(crate) fn simplify_paths(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut segment = String::new();
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c.is_alphanumeric() || c == '_' {
            segment.push(c);
            continue;
        }
        if c == ':' && chars.peek() == Some(&':') && !segment.is_empty() {
            chars.next();
            segment.clear();
            continue;
        }
        out.push_str(&segment);
        segment.clear();
        out.push(c);
    }
    out.push_str(&segment);
    out
}
