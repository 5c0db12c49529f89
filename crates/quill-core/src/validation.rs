//! Input validation and sanitization rules shared by the services.
//!
//! Every rule reports into a [`Validator`], which collects all failing fields
//! instead of stopping at the first one, so a client sees every problem with
//! its request in a single response.

use std::fmt;

use uuid::Uuid;

/// A single failing field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// All field failures of one request, in the order they were detected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self(vec![FieldError {
            field: field.into(),
            message: message.into(),
        }])
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    pub fn fields(&self) -> Vec<&str> {
        self.0.iter().map(|e| e.field.as_str()).collect()
    }

    pub fn into_inner(self) -> Vec<FieldError> {
        self.0
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        write!(f, "{}", parts.join(", "))
    }
}

/// Accumulates field errors while a request is being checked.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.to_string(),
            message: message.into(),
        });
    }

    /// Trim `value` and require at least `min` characters.
    pub fn min_chars(&mut self, field: &str, value: &str, min: usize) -> String {
        let trimmed = value.trim();
        if trimmed.chars().count() < min {
            self.push(field, format!("must be at least {min} characters long"));
        }
        trimmed.to_string()
    }

    /// Trim `value` and require at most `max` characters.
    pub fn max_chars(&mut self, field: &str, value: &str, max: usize) -> String {
        let trimmed = value.trim();
        if trimmed.chars().count() > max {
            self.push(field, format!("must be at most {max} characters long"));
        }
        trimmed.to_string()
    }

    /// Parse an optional integer query parameter within `[min, max]`.
    pub fn int_in_range(
        &mut self,
        field: &str,
        raw: Option<&str>,
        min: u64,
        max: Option<u64>,
        default: u64,
    ) -> u64 {
        let Some(raw) = raw else {
            return default;
        };

        let in_range = |n: u64| n >= min && max.is_none_or(|max| n <= max);
        match raw.trim().parse::<u64>() {
            Ok(n) if in_range(n) => n,
            _ => {
                let message = match max {
                    Some(max) => format!("must be an integer between {min} and {max}"),
                    None => format!("must be an integer of at least {min}"),
                };
                self.push(field, message);
                default
            }
        }
    }

    pub fn uuid(&mut self, field: &str, raw: &str) -> Option<Uuid> {
        match Uuid::parse_str(raw.trim()) {
            Ok(id) => Some(id),
            Err(_) => {
                self.push(field, "must be a valid identifier");
                None
            }
        }
    }

    /// Finish validation, returning `value` when no rule failed.
    pub fn finish<T>(self, value: T) -> Result<T, ValidationErrors> {
        if self.errors.is_empty() {
            Ok(value)
        } else {
            Err(ValidationErrors(self.errors))
        }
    }
}

/// Parse a path identifier, reporting a validation failure on the `id` field.
pub fn parse_id(raw: &str) -> Result<Uuid, ValidationErrors> {
    let mut v = Validator::new();
    let id = v.uuid("id", raw);
    v.finish(id.unwrap_or_default())
}

/// Escape HTML-significant characters the same way `validator.js` does.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '/' => out.push_str("&#x2F;"),
            '\\' => out.push_str("&#x5C;"),
            '`' => out.push_str("&#96;"),
            _ => out.push(c),
        }
    }
    out
}

/// Derive a slug: lowercase, every space replaced by a hyphen.
pub fn slugify(name: &str) -> String {
    name.to_lowercase().replace(' ', "-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collects_every_failing_field() {
        let mut v = Validator::new();
        v.min_chars("title", "ab", 3);
        v.min_chars("content", "short", 10);
        v.max_chars("excerpt", &"x".repeat(201), 200);

        let errors = v.finish(()).unwrap_err();
        assert_eq!(errors.fields(), vec!["title", "content", "excerpt"]);
    }

    #[test]
    fn test_min_chars_trims_before_counting() {
        let mut v = Validator::new();
        let title = v.min_chars("title", "   ab   ", 3);
        assert_eq!(title, "ab");
        assert!(v.finish(()).is_err());
    }

    #[test]
    fn test_int_in_range() {
        let mut v = Validator::new();
        assert_eq!(v.int_in_range("page", None, 1, None, 1), 1);
        assert_eq!(v.int_in_range("limit", Some("50"), 1, Some(50), 10), 50);
        assert!(v.finish(()).is_ok());

        let mut v = Validator::new();
        v.int_in_range("page", Some("0"), 1, None, 1);
        v.int_in_range("limit", Some("51"), 1, Some(50), 10);
        v.int_in_range("limit", Some("ten"), 1, Some(50), 10);
        assert_eq!(v.finish(()).unwrap_err().len(), 3);
    }

    #[test]
    fn test_parse_id() {
        let id = Uuid::new_v4();
        assert_eq!(parse_id(&id.to_string()).unwrap(), id);

        let errors = parse_id("not-an-id").unwrap_err();
        assert_eq!(errors.fields(), vec!["id"]);
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#x27;Jerry&#x27;&lt;&#x2F;b&gt;"
        );
        assert_eq!(escape_html("plain title"), "plain title");
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Tech Notes"), "tech-notes");
        assert_eq!(slugify("Rust  Tips"), "rust--tips");
    }
}
