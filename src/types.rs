//! Neutral type descriptors.
//!
//! A `TypeDescriptor` is a raw type identity plus its ordered generic argument
//! bindings. Descriptors are cheap to clone and are used directly as memoization
//! keys, so equality, hashing and ordering all cover the full binding tree.

use crate::error::ResolutionError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Built-in single-element container.
pub const LIST: &str = "List";
/// Built-in single-element container with unique elements.
pub const SET: &str = "Set";
/// Built-in key/value container.
pub const MAP: &str = "Map";
/// Built-in optional wrapper; its element is always nullable.
pub const OPTION: &str = "Option";

/// Raw identity of a type, without generic bindings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RawType {
    /// A named type: primitives, containers and catalog definitions.
    Named(Arc<str>),
    /// A fixed-arity array; the element type is the single binding.
    Array(usize),
}

/// Type identity plus generic argument bindings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeDescriptor {
    raw: RawType,
    args: Arc<[TypeDescriptor]>,
}

impl TypeDescriptor {
    /// A named type without bindings.
    pub fn named(name: &str) -> Self {
        Self::generic(name, Vec::new())
    }

    /// A named type with the given bindings.
    pub fn generic(name: &str, args: Vec<TypeDescriptor>) -> Self {
        Self {
            raw: RawType::Named(Arc::from(name)),
            args: args.into(),
        }
    }

    pub fn array(element: TypeDescriptor, len: usize) -> Self {
        Self {
            raw: RawType::Array(len),
            args: vec![element].into(),
        }
    }

    pub fn list(element: TypeDescriptor) -> Self {
        Self::generic(LIST, vec![element])
    }

    pub fn set(element: TypeDescriptor) -> Self {
        Self::generic(SET, vec![element])
    }

    pub fn map(key: TypeDescriptor, value: TypeDescriptor) -> Self {
        Self::generic(MAP, vec![key, value])
    }

    pub fn option(element: TypeDescriptor) -> Self {
        Self::generic(OPTION, vec![element])
    }

    /// Parse a type expression such as `Map<string, List<Order>>` or `[u8; 4]`.
    pub fn parse(expr: &str) -> Result<Self, ResolutionError> {
        let mut parser = Parser { src: expr, pos: 0 };
        let ty = parser.parse_type()?;
        parser.skip_ws();
        if parser.pos != expr.len() {
            return Err(parser.error("trailing input"));
        }
        Ok(ty)
    }

    pub fn raw(&self) -> &RawType {
        &self.raw
    }

    /// Name of a named type; `None` for arrays.
    pub fn name(&self) -> Option<&str> {
        match &self.raw {
            RawType::Named(name) => Some(name),
            RawType::Array(_) => None,
        }
    }

    pub fn args(&self) -> &[TypeDescriptor] {
        &self.args
    }

    pub fn arg(&self, index: usize) -> Option<&TypeDescriptor> {
        self.args.get(index)
    }

    /// Replace bare named types that match a binding with the bound descriptor.
    ///
    /// Only unbound names (no generic args of their own) are treated as type
    /// parameters.
    pub fn substitute(&self, bindings: &BTreeMap<&str, &TypeDescriptor>) -> TypeDescriptor {
        if bindings.is_empty() {
            return self.clone();
        }
        if let (RawType::Named(name), true) = (&self.raw, self.args.is_empty()) {
            if let Some(bound) = bindings.get(name.as_ref()) {
                return (*bound).clone();
            }
        }
        TypeDescriptor {
            raw: self.raw.clone(),
            args: self
                .args
                .iter()
                .map(|arg| arg.substitute(bindings))
                .collect::<Vec<_>>()
                .into(),
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.raw {
            RawType::Array(len) => match self.args.first() {
                Some(element) => write!(f, "[{}; {}]", element, len),
                None => write!(f, "[?; {}]", len),
            },
            RawType::Named(name) => {
                f.write_str(name)?;
                if !self.args.is_empty() {
                    f.write_str("<")?;
                    for (i, arg) in self.args.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{}", arg)?;
                    }
                    f.write_str(">")?;
                }
                Ok(())
            }
        }
    }
}

impl FromStr for TypeDescriptor {
    type Err = ResolutionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for TypeDescriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TypeDescriptor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let expr = String::deserialize(deserializer)?;
        TypeDescriptor::parse(&expr).map_err(serde::de::Error::custom)
    }
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn error(&self, reason: &str) -> ResolutionError {
        ResolutionError::InvalidTypeExpression {
            expr: self.src.to_string(),
            reason: format!("{} at offset {}", reason, self.pos),
        }
    }

    fn skip_ws(&mut self) {
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn expect(&mut self, expected: char) -> Result<(), ResolutionError> {
        self.skip_ws();
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            Ok(())
        } else {
            Err(self.error(&format!("expected '{}'", expected)))
        }
    }

    fn parse_type(&mut self) -> Result<TypeDescriptor, ResolutionError> {
        self.skip_ws();
        if self.peek() == Some('[') {
            self.pos += 1;
            let element = self.parse_type()?;
            self.expect(';')?;
            let len = self.parse_len()?;
            self.expect(']')?;
            return Ok(TypeDescriptor::array(element, len));
        }

        let name = self.parse_ident()?;
        self.skip_ws();
        let mut args = Vec::new();
        if self.peek() == Some('<') {
            self.pos += 1;
            loop {
                args.push(self.parse_type()?);
                self.skip_ws();
                match self.peek() {
                    Some(',') => self.pos += 1,
                    Some('>') => {
                        self.pos += 1;
                        break;
                    }
                    _ => return Err(self.error("expected ',' or '>'")),
                }
            }
        }
        Ok(TypeDescriptor::generic(name, args))
    }

    fn parse_ident(&mut self) -> Result<&'a str, ResolutionError> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            let valid = if self.pos == start {
                c.is_alphabetic() || c == '_'
            } else {
                c.is_alphanumeric() || c == '_' || c == '.' || c == ':'
            };
            if !valid {
                break;
            }
            self.pos += c.len_utf8();
        }
        if self.pos == start {
            return Err(self.error("expected type name"));
        }
        let src = self.src;
        Ok(&src[start..self.pos])
    }

    fn parse_len(&mut self) -> Result<usize, ResolutionError> {
        self.skip_ws();
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.pos += 1;
        }
        self.src[start..self.pos]
            .parse()
            .map_err(|_| self.error("expected array length"))
    }
}
