/// Placeholder templates: parsing, binding, and rendering.
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum TemplateError {
    #[error("template parse error: {0}")]
    Parse(String),
    #[error("no value bound for placeholder {{{0}}}")]
    MissingPlaceholder(String),
}

/// A segment of a parsed template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TemplateSegment {
    /// Literal text, emitted as-is.
    Literal(String),
    /// A named slot filled from the bindings: `{name}`.
    Slot(String),
}

/// A parsed template: a sequence of segments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub segments: Vec<TemplateSegment>,
}

impl Template {
    /// Parse a template string into a sequence of segments.
    ///
    /// Syntax:
    /// - `{slot}` → `Slot` (letters, digits and `_` only)
    /// - `{{` / `}}` → literal `{` / `}`
    /// - Everything else → `Literal`
    pub fn parse(input: &str) -> Result<Template, TemplateError> {
        let mut segments = Vec::new();
        let mut literal_buf = String::new();
        let chars: Vec<char> = input.chars().collect();
        let len = chars.len();
        let mut i = 0;

        while i < len {
            if chars[i] == '{' {
                if i + 1 < len && chars[i + 1] == '{' {
                    literal_buf.push('{');
                    i += 2;
                    continue;
                }

                if !literal_buf.is_empty() {
                    segments.push(TemplateSegment::Literal(std::mem::take(&mut literal_buf)));
                }

                let start = i + 1;
                let mut end = start;
                while end < len && chars[end] != '}' {
                    if chars[end] == '{' {
                        return Err(TemplateError::Parse(
                            "nested braces are not allowed".to_string(),
                        ));
                    }
                    end += 1;
                }
                if end == len {
                    return Err(TemplateError::Parse("unclosed brace".to_string()));
                }

                let name: String = chars[start..end].iter().collect();
                if name.is_empty() {
                    return Err(TemplateError::Parse("empty braces".to_string()));
                }
                if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                    return Err(TemplateError::Parse(format!(
                        "invalid slot name '{}'",
                        name
                    )));
                }

                segments.push(TemplateSegment::Slot(name));
                i = end + 1;
            } else if chars[i] == '}' {
                if i + 1 < len && chars[i + 1] == '}' {
                    literal_buf.push('}');
                    i += 2;
                    continue;
                }
                return Err(TemplateError::Parse(
                    "unmatched closing brace".to_string(),
                ));
            } else {
                literal_buf.push(chars[i]);
                i += 1;
            }
        }

        if !literal_buf.is_empty() {
            segments.push(TemplateSegment::Literal(literal_buf));
        }

        Ok(Template { segments })
    }

    /// Slot names referenced by this template, in order of appearance.
    pub fn slots(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            TemplateSegment::Slot(name) => Some(name.as_str()),
            TemplateSegment::Literal(_) => None,
        })
    }

    /// Render with `bindings`. Any unbound slot is an error.
    pub fn render(&self, bindings: &Bindings) -> Result<String, TemplateError> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                TemplateSegment::Literal(text) => out.push_str(text),
                TemplateSegment::Slot(name) => {
                    let value = bindings
                        .get(name)
                        .ok_or_else(|| TemplateError::MissingPlaceholder(name.clone()))?;
                    out.push_str(value);
                }
            }
        }
        Ok(out)
    }
}

/// Slot name → replacement text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bindings {
    values: HashMap<String, String>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.values.insert(name.into(), value.into());
        self
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.bind(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }
}

/// Parse and render in one step.
pub fn fill(template: &str, bindings: &Bindings) -> Result<String, TemplateError> {
    Template::parse(template)?.render(bindings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_literal_only() {
        let t = Template::parse("Hello, world.").unwrap();
        assert_eq!(
            t.segments,
            vec![TemplateSegment::Literal("Hello, world.".to_string())]
        );
    }

    #[test]
    fn parse_slots() {
        let t = Template::parse("{who} notices {change} and weighs {cost}.").unwrap();
        assert_eq!(t.segments.len(), 6);
        assert_eq!(t.segments[0], TemplateSegment::Slot("who".to_string()));
        assert_eq!(t.slots().collect::<Vec<_>>(), vec!["who", "change", "cost"]);
    }

    #[test]
    fn parse_escaped_braces() {
        let t = Template::parse("Use {{braces}} here.").unwrap();
        assert_eq!(
            t.segments,
            vec![TemplateSegment::Literal("Use {braces} here.".to_string())]
        );
    }

    #[test]
    fn parse_errors() {
        assert!(Template::parse("Bad {} here").is_err());
        assert!(Template::parse("Bad {outer{inner}} here").is_err());
        assert!(Template::parse("Bad {unclosed here").is_err());
        assert!(Template::parse("Bad } here").is_err());
        assert!(Template::parse("Bad {two words} here").is_err());
    }

    #[test]
    fn render_fills_slots() {
        let bindings = Bindings::new()
            .with("protagonist", "Avery")
            .with("setting", "a sun-warmed seaside village");
        let text = fill("Introduce {protagonist} in {setting}.", &bindings).unwrap();
        assert_eq!(text, "Introduce Avery in a sun-warmed seaside village.");
    }

    #[test]
    fn render_missing_slot_fails() {
        let bindings = Bindings::new().with("protagonist", "Avery");
        let err = fill("{protagonist} meets {ally}.", &bindings).unwrap_err();
        assert_eq!(err, TemplateError::MissingPlaceholder("ally".to_string()));
    }

    #[test]
    fn rebinding_overrides() {
        let mut bindings = Bindings::new();
        bindings.bind("tone", "warm").bind("tone", "dark");
        assert_eq!(bindings.get("tone"), Some("dark"));
        assert!(bindings.contains("tone"));
        assert!(!bindings.contains("mood"));
    }
}
