//! Method signature parsing.
//!
//! Turns free-text signatures such as `OnItemCraft(ItemCraftTask task, BasePlayer)`
//! into a name plus an ordered parameter list. Every parsed parameter carries a
//! usable name: anonymous parameters get `param<N>` (1-based position).

use crate::error::ParseError;
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

#[derive(Debug, Clone, PartialEq, Eq)]
/// A single typed parameter.
pub struct Parameter {
    pub ty: String,
    pub name: String,
    /// True when the source text omitted the name and `param<N>` was filled in.
    pub synthesized: bool,
}

impl Parameter {
    pub fn new(ty: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            ty: ty.into(),
            name: name.into(),
            synthesized: false,
        }
    }

    /// Same type and same name.
    pub fn same_as(&self, other: &Parameter) -> bool {
        self.ty == other.ty && self.name == other.name
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Parsed method signature: name and positional parameters.
pub struct MethodSignature {
    pub name: String,
    pub parameters: Vec<Parameter>,
}

impl fmt::Display for MethodSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<String> = self
            .parameters
            .iter()
            .map(|p| format!("{} {}", p.ty, p.name))
            .collect();
        write!(f, "{}({})", self.name, params.join(", "))
    }
}

fn signature_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)^(?P<name>\w+)\s*\((?P<params>.*)\)$").expect("signature regex")
    })
}

/// Parse `Name(Type name, Type, ...)`.
///
/// Fails when the trimmed text is not an identifier followed by a
/// parenthesised list, or when any parameter is not `<type> [<name>]`.
/// An empty list yields zero parameters.
pub fn parse(text: &str) -> Result<MethodSignature, ParseError> {
    let trimmed = text.trim();
    let caps = signature_re()
        .captures(trimmed)
        .ok_or_else(|| ParseError::new("invalid method signature", trimmed))?;

    let name = caps["name"].to_string();
    let params = caps["params"].trim();

    let mut parameters = Vec::new();
    if !params.is_empty() {
        for (i, piece) in split_parameters(params).iter().enumerate() {
            parameters.push(parse_parameter(piece, i + 1)?);
        }
    }

    Ok(MethodSignature { name, parameters })
}

/// Hook name of a signature: everything before the first `(`, trimmed.
///
/// Works on text that does not parse as a full signature, which is what
/// removal rules are built from.
pub fn hook_name(text: &str) -> &str {
    text.split('(').next().unwrap_or(text).trim()
}

/// Split a parameter list on commas that sit outside any `<>`, `()` or `[]`.
pub fn split_parameters(params: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut depth: i32 = 0;

    for ch in params.chars() {
        if ch == ',' && depth == 0 {
            out.push(std::mem::take(&mut current));
            continue;
        }
        match ch {
            '<' | '(' | '[' => depth += 1,
            '>' | ')' | ']' => depth -= 1,
            _ => {}
        }
        current.push(ch);
    }
    if !current.trim().is_empty() {
        out.push(current);
    }
    out
}

fn parse_parameter(piece: &str, position: usize) -> Result<Parameter, ParseError> {
    let param = piece.trim();
    let invalid = || ParseError::new("invalid parameter in signature", param);

    let (ty, name) = split_type_and_name(param);
    if !is_type_token(ty) {
        return Err(invalid());
    }
    if !name.is_empty() && !name.chars().all(is_word_char) {
        return Err(invalid());
    }

    if name.is_empty() {
        Ok(Parameter {
            ty: ty.to_string(),
            name: format!("param{}", position),
            synthesized: true,
        })
    } else {
        Ok(Parameter::new(ty, name))
    }
}

/// The type ends at the first whitespace outside brackets; the rest is the name.
fn split_type_and_name(param: &str) -> (&str, &str) {
    let mut depth: i32 = 0;
    for (i, ch) in param.char_indices() {
        match ch {
            '<' | '(' | '[' => depth += 1,
            '>' | ')' | ']' => depth -= 1,
            c if c.is_whitespace() && depth == 0 => {
                return (&param[..i], param[i..].trim_start());
            }
            _ => {}
        }
    }
    (param, "")
}

/// Dotted identifier with optional generic arguments, array ranks and `?`.
fn is_type_token(ty: &str) -> bool {
    let mut chars = ty.chars();
    match chars.next() {
        Some(c) if is_word_char(c) => {}
        _ => return false,
    }
    let mut depth: i32 = 0;
    for ch in ty.chars() {
        match ch {
            '<' | '[' => depth += 1,
            '>' | ']' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            ',' if depth > 0 => {}
            c if c.is_whitespace() && depth > 0 => {}
            '.' | '?' => {}
            c if is_word_char(c) => {}
            _ => return false,
        }
    }
    depth == 0
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_named_parameters() {
        let sig = parse("OnPlayerChat(BasePlayer player, string message)").unwrap();
        assert_eq!(sig.name, "OnPlayerChat");
        assert_eq!(
            sig.parameters,
            vec![
                Parameter::new("BasePlayer", "player"),
                Parameter::new("string", "message")
            ]
        );
    }

    #[test]
    fn test_anonymous_parameters_get_positional_names() {
        let sig = parse("Baz(int, string)").unwrap();
        let names: Vec<&str> = sig.parameters.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["param1", "param2"]);
        assert!(sig.parameters.iter().all(|p| p.synthesized));
    }

    #[test]
    fn test_split_ignores_commas_inside_brackets() {
        let sig = parse("Qux(List<Foo,Bar> a, int[] b)").unwrap();
        assert_eq!(sig.parameters.len(), 2);
        assert_eq!(sig.parameters[0].ty, "List<Foo,Bar>");
        assert_eq!(sig.parameters[0].name, "a");
        assert_eq!(sig.parameters[1].ty, "int[]");
        assert_eq!(sig.parameters[1].name, "b");
    }

    #[test]
    fn test_nested_generics_and_spaces_inside_type() {
        let sig = parse("  OnLoot( Dictionary<string, List<Item>> loot , int[,] grid )  ").unwrap();
        assert_eq!(sig.parameters.len(), 2);
        assert_eq!(sig.parameters[0].ty, "Dictionary<string, List<Item>>");
        assert_eq!(sig.parameters[1].ty, "int[,]");
        assert_eq!(sig.parameters[1].name, "grid");
    }

    #[test]
    fn test_empty_parameter_list() {
        let sig = parse("Reset()").unwrap();
        assert_eq!(sig.name, "Reset");
        assert!(sig.parameters.is_empty());
        let spaced = parse("Reset ( )").unwrap();
        assert!(spaced.parameters.is_empty());
    }

    #[test]
    fn test_dotted_type_with_anonymous_name_mixed() {
        let sig = parse("OnEntity(UnityEngine.Vector3, BaseEntity entity)").unwrap();
        assert_eq!(sig.parameters[0].ty, "UnityEngine.Vector3");
        assert_eq!(sig.parameters[0].name, "param1");
        assert_eq!(sig.parameters[1].name, "entity");
        assert!(!sig.parameters[1].synthesized);
    }

    #[test]
    fn test_rejects_malformed_signature() {
        let err = parse("not a signature").unwrap_err();
        assert_eq!(err.offending_text, "not a signature");
        assert!(parse("Foo(int a").is_err());
    }

    #[test]
    fn test_rejects_malformed_parameter() {
        let err = parse("Foo(int a b)").unwrap_err();
        assert_eq!(err.offending_text, "int a b");
        assert!(parse("Foo(int a, , string b)").is_err());
        assert!(parse("Foo(List<int a)").is_err());
    }

    #[test]
    fn test_hook_name_and_display() {
        assert_eq!(hook_name("OnDoorKnocked(DoorKnocker, BasePlayer)"), "OnDoorKnocked");
        assert_eq!(hook_name(" Reset "), "Reset");
        let sig = parse("Baz(int, string s)").unwrap();
        assert_eq!(sig.to_string(), "Baz(int param1, string s)");
    }
}
