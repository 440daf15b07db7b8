//! `{placeholder}` path templates and their regex form.

use thiserror::Error;

/// Regex fragment matching exactly one path segment.
pub const SEGMENT_CAPTURE: &str = "([^/]+)";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("Unclosed '{{' at position {0} in path template")]
    Unclosed(usize),
    #[error("Unexpected '}}' at position {0} in path template")]
    UnexpectedClose(usize),
    #[error("Nested '{{' at position {0} in path template")]
    Nested(usize),
    #[error("Empty placeholder at position {0} in path template")]
    EmptyPlaceholder(usize),
    #[error("Placeholder '{name}' at position {position} spans more than one path segment")]
    SpansSegments { name: String, position: usize },
}

/// One piece of a parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Placeholder(String),
}

/// Split a template into literal text and placeholders.
pub fn parse_path_template(template: &str) -> Result<Vec<Segment>, TemplateError> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut placeholder: Option<(usize, String)> = None;

    for (position, c) in template.char_indices() {
        let Some((start, name)) = placeholder.as_mut() else {
            match c {
                '{' => {
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    placeholder = Some((position, String::new()));
                }
                '}' => return Err(TemplateError::UnexpectedClose(position)),
                _ => literal.push(c),
            }
            continue;
        };

        match c {
            '{' => return Err(TemplateError::Nested(position)),
            '/' => {
                return Err(TemplateError::SpansSegments {
                    name: name.clone(),
                    position: *start,
                })
            }
            '}' => {
                if name.is_empty() {
                    return Err(TemplateError::EmptyPlaceholder(*start));
                }
                segments.push(Segment::Placeholder(std::mem::take(name)));
                placeholder = None;
            }
            _ => name.push(c),
        }
    }

    if let Some((start, _)) = placeholder {
        return Err(TemplateError::Unclosed(start));
    }
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}

/// Convert a template to a path regex, one capture group per placeholder.
///
/// `/users/{id}` becomes `/users/([^/]+)`. Regex metacharacters in literal
/// text are escaped, so `/v1.0/{id}` becomes `/v1\.0/([^/]+)`.
pub fn template_to_regex(template: &str) -> Result<String, TemplateError> {
    let segments = parse_path_template(template)?;
    let mut pattern = String::with_capacity(template.len() + 8);
    for segment in &segments {
        match segment {
            Segment::Literal(text) => escape_literal(text, &mut pattern),
            Segment::Placeholder(_) => pattern.push_str(SEGMENT_CAPTURE),
        }
    }
    Ok(pattern)
}

fn escape_literal(text: &str, out: &mut String) {
    for c in text.chars() {
        if matches!(
            c,
            '\\' | '.' | '+' | '*' | '?' | '(' | ')' | '|' | '[' | ']' | '^' | '$'
        ) {
            out.push('\\');
        }
        out.push(c);
    }
}
