//! Written type references.
//!
//! Both configuration strings (`System.Threading.Tasks.Task<TResult>`) and
//! type nodes from source (`Dictionary<string, Stream>?`) go through the
//! same small parser, so the resolver only deals with one shape.

use std::fmt;

/// A type as written, before resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeRef {
    /// Dotted name without generic arguments: `System.IO.Stream`, `Task`.
    pub name: String,
    /// Generic arguments of the last segment.
    pub args: Vec<TypeRef>,
    /// `T[]`, `T[,]`, ...
    pub array: bool,
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
            array: false,
        }
    }

    /// Parse a written type. Tuples and pointers are not modelled.
    pub fn parse(text: &str) -> Option<Self> {
        let mut parser = TypeParser {
            src: text.as_bytes(),
            pos: 0,
        };
        let parsed = parser.parse_type()?;
        parser.skip_ws();
        (parser.pos == parser.src.len()).then_some(parsed)
    }

    /// `var` in a declaration.
    pub fn is_implicit(&self) -> bool {
        self.name == "var" && self.args.is_empty() && !self.array
    }

    /// Number of generic arguments.
    pub fn arity(&self) -> usize {
        self.args.len()
    }

    /// First dotted segment and the rest, if qualified.
    pub fn split_first_segment(&self) -> Option<(&str, &str)> {
        self.name.split_once('.')
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.args.is_empty() {
            write!(f, "<")?;
            for (i, arg) in self.args.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", arg)?;
            }
            write!(f, ">")?;
        }
        if self.array {
            write!(f, "[]")?;
        }
        Ok(())
    }
}

/// Map C# keyword types to their framework names.
pub fn predefined(name: &str) -> Option<&'static str> {
    Some(match name {
        "object" => "System.Object",
        "string" => "System.String",
        "bool" => "System.Boolean",
        "byte" => "System.Byte",
        "sbyte" => "System.SByte",
        "char" => "System.Char",
        "short" => "System.Int16",
        "ushort" => "System.UInt16",
        "int" => "System.Int32",
        "uint" => "System.UInt32",
        "long" => "System.Int64",
        "ulong" => "System.UInt64",
        "float" => "System.Single",
        "double" => "System.Double",
        "decimal" => "System.Decimal",
        "void" => "System.Void",
        _ => return None,
    })
}

struct TypeParser<'a> {
    src: &'a [u8],
    pos: usize,
}

impl TypeParser<'_> {
    fn skip_ws(&mut self) {
        while self.pos < self.src.len() && self.src[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    fn eat(&mut self, byte: u8) -> bool {
        self.skip_ws();
        if self.src.get(self.pos) == Some(&byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_str(&mut self, s: &str) -> bool {
        self.skip_ws();
        if self.src[self.pos..].starts_with(s.as_bytes()) {
            self.pos += s.len();
            true
        } else {
            false
        }
    }

    fn ident(&mut self) -> Option<String> {
        self.skip_ws();
        if self.src.get(self.pos) == Some(&b'@') {
            self.pos += 1;
        }
        let start = self.pos;
        while let Some(&b) = self.src.get(self.pos) {
            if b.is_ascii_alphanumeric() || b == b'_' || b >= 0x80 {
                self.pos += 1;
            } else {
                break;
            }
        }
        if start == self.pos || self.src[start].is_ascii_digit() {
            return None;
        }
        std::str::from_utf8(&self.src[start..self.pos])
            .ok()
            .map(str::to_string)
    }

    fn parse_type(&mut self) -> Option<TypeRef> {
        self.eat_str("global::");
        let mut segments = Vec::new();
        let mut args = Vec::new();
        loop {
            segments.push(self.ident()?);
            if self.eat(b'<') {
                args.clear();
                loop {
                    args.push(self.parse_type()?);
                    if self.eat(b',') {
                        continue;
                    }
                    if self.eat(b'>') {
                        break;
                    }
                    return None;
                }
            }
            if self.eat_str("::") || self.eat(b'.') {
                continue;
            }
            break;
        }

        let mut array = false;
        loop {
            if self.eat(b'?') {
                continue;
            }
            if self.eat(b'[') {
                while !self.eat(b']') {
                    if self.pos >= self.src.len() {
                        return None;
                    }
                    self.pos += 1;
                }
                array = true;
                continue;
            }
            break;
        }

        Some(TypeRef {
            name: segments.join("."),
            args,
            array,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple() {
        let t = TypeRef::parse("MemoryStream").unwrap();
        assert_eq!(t.name, "MemoryStream");
        assert!(t.args.is_empty());
    }

    #[test]
    fn test_parse_qualified_generic() {
        let t = TypeRef::parse("System.Threading.Tasks.Task<System.IO.Stream>").unwrap();
        assert_eq!(t.name, "System.Threading.Tasks.Task");
        assert_eq!(t.args, vec![TypeRef::named("System.IO.Stream")]);
        assert_eq!(t.to_string(), "System.Threading.Tasks.Task<System.IO.Stream>");
    }

    #[test]
    fn test_parse_nested_generics_and_suffixes() {
        let t = TypeRef::parse("Dictionary<string, List<Stream>>?").unwrap();
        assert_eq!(t.name, "Dictionary");
        assert_eq!(t.arity(), 2);
        assert_eq!(t.args[1].args[0].name, "Stream");

        let arr = TypeRef::parse("byte[]").unwrap();
        assert!(arr.array);
    }

    #[test]
    fn test_parse_global_alias() {
        let t = TypeRef::parse("global::System.IDisposable").unwrap();
        assert_eq!(t.name, "System.IDisposable");
    }

    #[test]
    fn test_parse_rejects_tuples() {
        assert!(TypeRef::parse("(int, string)").is_none());
        assert!(TypeRef::parse("").is_none());
    }

    #[test]
    fn test_implicit() {
        assert!(TypeRef::parse("var").unwrap().is_implicit());
        assert!(!TypeRef::parse("Var").unwrap().is_implicit());
    }
}
