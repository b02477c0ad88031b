//! Values returned by contract functions and their textual rendering.

use std::fmt::{self, Write as _};

/// A value returned by a contract function, with its declared type.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TypedValue {
    String(String),
    Int64(i64),
    Uint64(u64),
    Bool(bool),
}

impl TypedValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            TypedValue::String(_) => "string",
            TypedValue::Int64(_) => "int64",
            TypedValue::Uint64(_) => "uint64",
            TypedValue::Bool(_) => "bool",
        }
    }
}

/// Renders as `(<value> <type>)`, strings quoted.
impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char('(')?;
        match self {
            TypedValue::String(s) => write_quoted(f, s)?,
            TypedValue::Int64(v) => write!(f, "{v}")?,
            TypedValue::Uint64(v) => write!(f, "{v}")?,
            TypedValue::Bool(v) => write!(f, "{v}")?,
        }
        write!(f, " {})", self.type_name())
    }
}

fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_char('"')?;
    for c in s.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            c => f.write_char(c)?,
        }
    }
    f.write_char('"')
}

/// Renders a function's results, one per line.
pub fn render_results(values: &[TypedValue]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_scalars() {
        assert_eq!(TypedValue::Int64(-10).to_string(), "(-10 int64)");
        assert_eq!(TypedValue::Uint64(3).to_string(), "(3 uint64)");
        assert_eq!(TypedValue::Bool(true).to_string(), "(true bool)");
    }

    #[test]
    fn test_render_string_escapes() {
        let v = TypedValue::String(r#"[{"a":"b\c"}]"#.to_owned());
        assert_eq!(v.to_string(), r#"("[{\"a\":\"b\\c\"}]" string)"#);
    }

    #[test]
    fn test_render_multiple() {
        let out = render_results(&[
            TypedValue::String("x".to_owned()),
            TypedValue::Bool(false),
        ]);
        assert_eq!(out, "(\"x\" string)\n(false bool)");
        assert_eq!(render_results(&[]), "");
    }
}
