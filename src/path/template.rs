//! Compiled path templates.

use std::fmt;

use crate::params::{ParamValue, Params};

use super::PathError;

/// Characters that cannot appear inside a substituted segment.
const FORBIDDEN_SEGMENT_CHARS: [char; 3] = ['/', '?', '#'];

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Literal(String),
    Param { name: String, optional: bool },
}

/// A URL path template parsed into literal and placeholder tokens.
///
/// Parsing never fails: any text that is not a placeholder is a literal.
/// Rendering fails when a required placeholder has no usable value.
///
/// # Example
///
/// ```
/// use reqflow::params::to_params;
/// use reqflow::path::PathTemplate;
///
/// let template = PathTemplate::compile("/user/:id/posts/:post?");
/// let path = template.render(&to_params([("id", 7)])).unwrap();
/// assert_eq!(path, "/user/7/posts");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    source: String,
    tokens: Vec<Token>,
}

impl PathTemplate {
    /// Parses a template string.
    #[must_use]
    pub fn compile(template: &str) -> Self {
        let mut tokens = Vec::new();
        let mut literal = String::new();
        let mut chars = template.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '\\' => literal.push(chars.next().unwrap_or('\\')),
                ':' if chars.peek().copied().is_some_and(is_name_char) => {
                    let mut name = String::new();
                    while let Some(next) = chars.next_if(|&next| is_name_char(next)) {
                        name.push(next);
                    }
                    let optional = chars.next_if_eq(&'?').is_some();

                    if !literal.is_empty() {
                        tokens.push(Token::Literal(std::mem::take(&mut literal)));
                    }
                    tokens.push(Token::Param { name, optional });
                }
                _ => literal.push(c),
            }
        }

        if !literal.is_empty() {
            tokens.push(Token::Literal(literal));
        }

        Self {
            source: template.to_owned(),
            tokens,
        }
    }

    /// Returns the original template string.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the placeholder names in template order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().filter_map(|token| match token {
            Token::Param { name, .. } => Some(name.as_str()),
            Token::Literal(_) => None,
        })
    }

    /// Substitutes every placeholder with its value from `params`.
    ///
    /// Keys in `params` without a matching placeholder are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`PathError::MissingParam`] if a required placeholder has no key,
    /// or [`PathError::InvalidParam`] if a value is null (for a required
    /// placeholder), empty, or contains `/`, `?` or `#`.
    pub fn render(&self, params: &Params) -> Result<String, PathError> {
        let mut path = String::with_capacity(self.source.len());

        for token in &self.tokens {
            match token {
                Token::Literal(text) => path.push_str(text),
                Token::Param { name, optional } => {
                    match params.get(name).filter(|value| !value.is_null()) {
                        Some(value) => path.push_str(&segment(name, value)?),
                        None if *optional => {
                            if path.ends_with('/') {
                                path.pop();
                            }
                        }
                        None => return Err(missing_or_null(name, params.get(name))),
                    }
                }
            }
        }

        Ok(path)
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

const fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn segment(name: &str, value: &ParamValue) -> Result<String, PathError> {
    let text = value.as_text().unwrap_or_default();

    if text.is_empty() {
        return Err(PathError::InvalidParam {
            name: name.to_owned(),
            reason: "value must not be empty".to_owned(),
        });
    }

    if let Some(bad) = text.chars().find(|c| FORBIDDEN_SEGMENT_CHARS.contains(c)) {
        return Err(PathError::InvalidParam {
            name: name.to_owned(),
            reason: format!("value {text:?} contains '{bad}'"),
        });
    }

    Ok(text)
}

fn missing_or_null(name: &str, value: Option<&ParamValue>) -> PathError {
    match value {
        Some(_) => PathError::InvalidParam {
            name: name.to_owned(),
            reason: "expected a string or number, got null".to_owned(),
        },
        None => PathError::MissingParam {
            name: name.to_owned(),
        },
    }
}
