//! Prompt templates with `{field}` placeholders

use evalbench_core::{BenchError, BenchResult, Params};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Literal(String),
    Field(String),
}

/// A parsed prompt template.
///
/// `{name}` is replaced by the case field `name`; `{{` and `}}` produce
/// literal braces. Parsing happens once per task, rendering once per case.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptTemplate {
    segments: Vec<Segment>,
}

impl PromptTemplate {
    /// Parse a template. Unbalanced braces and empty placeholders are
    /// configuration errors of the task, not of a single case.
    pub fn parse(source: &str) -> BenchResult<Self> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = source.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    literal.push('{');
                }
                '{' => {
                    let mut name = String::new();
                    let mut closed = false;
                    for n in chars.by_ref() {
                        if n == '}' {
                            closed = true;
                            break;
                        }
                        if n == '{' {
                            return Err(BenchError::config("nested '{' in prompt template"));
                        }
                        name.push(n);
                    }
                    if !closed {
                        return Err(BenchError::config("unclosed '{' in prompt template"));
                    }
                    let name = name.trim();
                    if name.is_empty() {
                        return Err(BenchError::config(
                            "empty placeholder '{}' in prompt template",
                        ));
                    }
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Field(name.to_string()));
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    literal.push('}');
                }
                '}' => {
                    return Err(BenchError::config("single '}' in prompt template"));
                }
                other => literal.push(other),
            }
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }
        Ok(Self { segments })
    }

    /// Field names referenced by the template, in order of appearance
    pub fn fields(&self) -> Vec<&str> {
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Field(name) => Some(name.as_str()),
                Segment::Literal(_) => None,
            })
            .collect()
    }

    /// Substitute case fields into the template.
    ///
    /// Strings are inserted verbatim, other values as compact JSON.
    pub fn render(&self, fields: &Params) -> BenchResult<String> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field(name) => match fields.get(name) {
                    Some(Value::String(s)) => out.push_str(s),
                    Some(other) => out.push_str(&other.to_string()),
                    None => return Err(BenchError::missing_field(name.as_str())),
                },
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Params {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_render_substitutes_fields() {
        let template = PromptTemplate::parse("Cliente: {customer}\nNueva fecha: {new_date}\n").unwrap();
        let out = template
            .render(&fields(json!({"customer": "ACME", "new_date": "2024-03-22", "case_id": "1"})))
            .unwrap();
        assert_eq!(out, "Cliente: ACME\nNueva fecha: 2024-03-22\n");
        assert_eq!(template.fields(), vec!["customer", "new_date"]);
    }

    #[test]
    fn test_render_non_string_values() {
        let template = PromptTemplate::parse("{n} {flag} {items}").unwrap();
        let out = template
            .render(&fields(json!({"n": 3, "flag": true, "items": [1, 2]})))
            .unwrap();
        assert_eq!(out, "3 true [1,2]");
    }

    #[test]
    fn test_escaped_braces() {
        let template = PromptTemplate::parse("dict = {{'a': {value}}}").unwrap();
        let out = template.render(&fields(json!({"value": "1"}))).unwrap();
        assert_eq!(out, "dict = {'a': 1}");
    }

    #[test]
    fn test_missing_field_is_template_error() {
        let template = PromptTemplate::parse("Hola {name}").unwrap();
        let err = template.render(&fields(json!({"case_id": "1"}))).unwrap_err();
        match err {
            BenchError::Template { field, .. } => assert_eq!(field.as_deref(), Some("name")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_malformed_templates() {
        assert!(PromptTemplate::parse("abc {name").unwrap_err().is_configuration());
        assert!(PromptTemplate::parse("abc }").is_err());
        assert!(PromptTemplate::parse("abc {}").is_err());
        assert!(PromptTemplate::parse("{a{b}}").is_err());
    }

    #[test]
    fn test_template_without_placeholders() {
        let template = PromptTemplate::parse("Texto fijo").unwrap();
        assert_eq!(template.render(&Params::new()).unwrap(), "Texto fijo");
        assert!(template.fields().is_empty());
    }
}
