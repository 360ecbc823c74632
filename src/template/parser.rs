//! # Template Parser
//!
//! Turns Mustache source into a tree of [`Node`]s.
//!
//! Section, inverted, closing, comment, partial and set-delimiter tags that sit
//! alone on a line are "standalone": the whole line, including its line
//! ending, is dropped from the output.

use crate::error::ParseError;
use std::mem;

const DEFAULT_OPEN: &str = "{{";
const DEFAULT_CLOSE: &str = "}}";

/// Parsed template element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Literal text
    Text(String),
    /// `{{name}}` (escaped) or `{{{name}}}` / `{{& name}}` (raw)
    Variable {
        name: String,
        escape: bool,
        line: usize,
    },
    /// `{{#name}}…{{/name}}` or `{{^name}}…{{/name}}`
    Section {
        name: String,
        inverted: bool,
        children: Vec<Node>,
        line: usize,
    },
    /// `{{> name}}`; `indent` is the whitespace before a standalone partial tag
    Partial {
        name: String,
        indent: String,
        line: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag<'t> {
    Variable(&'t str),
    Raw(&'t str),
    Section(&'t str),
    Inverted(&'t str),
    Close(&'t str),
    Comment,
    Partial(&'t str),
    Delimiters(&'t str),
}

impl Tag<'_> {
    fn can_stand_alone(self) -> bool {
        !matches!(self, Tag::Variable(_) | Tag::Raw(_))
    }
}

/// An open section waiting for its closing tag
struct OpenSection {
    name: String,
    inverted: bool,
    line: usize,
    parent: Vec<Node>,
}

/// Parse a template into nodes
pub fn parse(template: &str) -> Result<Vec<Node>, ParseError> {
    let mut open = DEFAULT_OPEN.to_string();
    let mut close = DEFAULT_CLOSE.to_string();
    let mut sections: Vec<OpenSection> = Vec::new();
    let mut nodes: Vec<Node> = Vec::new();
    let mut pos = 0;
    // Line of `counted`; advanced tag by tag so numbering stays linear
    let mut line = 1;
    let mut counted = 0;

    while let Some(offset) = template[pos..].find(open.as_str()) {
        let tag_start = pos + offset;
        line += template[counted..tag_start].matches('\n').count();
        counted = tag_start;
        let mut text = template[pos..tag_start].to_string();

        let after_open = tag_start + open.len();
        // Triple mustaches only exist with the default delimiters
        let triple = open == DEFAULT_OPEN
            && close == DEFAULT_CLOSE
            && template[after_open..].starts_with('{');
        let (content_start, closing) = if triple {
            (after_open + 1, format!("}}{close}"))
        } else {
            (after_open, close.clone())
        };

        let close_offset = template[content_start..]
            .find(closing.as_str())
            .ok_or(ParseError::UnclosedTag { line })?;
        let content = template[content_start..content_start + close_offset].trim();
        let tag_end = content_start + close_offset + closing.len();

        let tag = if triple {
            Tag::Raw(content)
        } else {
            classify(content)
        };

        // Standalone: only whitespace before the tag on its line, only
        // whitespace and a line ending (or EOF) after it
        let line_start = template[..tag_start].rfind('\n').map_or(0, |i| i + 1);
        let indent = &template[line_start..tag_start];
        let standalone_end = if tag.can_stand_alone() && is_blank(indent) {
            line_end(template, tag_end)
        } else {
            None
        };

        if standalone_end.is_some() {
            text.truncate(text.len() - indent.len());
        }
        if !text.is_empty() {
            nodes.push(Node::Text(text));
        }
        pos = standalone_end.unwrap_or(tag_end);

        match tag {
            Tag::Variable(name) | Tag::Raw(name) => {
                nodes.push(Node::Variable {
                    name: required_name(name, line)?,
                    escape: matches!(tag, Tag::Variable(_)),
                    line,
                });
            }
            Tag::Section(name) | Tag::Inverted(name) => {
                sections.push(OpenSection {
                    name: required_name(name, line)?,
                    inverted: matches!(tag, Tag::Inverted(_)),
                    line,
                    parent: mem::take(&mut nodes),
                });
            }
            Tag::Close(name) => {
                let name = required_name(name, line)?;
                let section = sections
                    .pop()
                    .ok_or_else(|| ParseError::UnexpectedClose {
                        name: name.clone(),
                        line,
                    })?;
                if section.name != name {
                    return Err(ParseError::MismatchedClose {
                        expected: section.name,
                        found: name,
                        line,
                    });
                }
                let children = mem::replace(&mut nodes, section.parent);
                nodes.push(Node::Section {
                    name: section.name,
                    inverted: section.inverted,
                    children,
                    line: section.line,
                });
            }
            Tag::Comment => {}
            Tag::Partial(name) => {
                nodes.push(Node::Partial {
                    name: required_name(name, line)?,
                    indent: if standalone_end.is_some() {
                        indent.to_string()
                    } else {
                        String::new()
                    },
                    line,
                });
            }
            Tag::Delimiters(spec) => {
                let (new_open, new_close) =
                    parse_delimiters(spec).ok_or(ParseError::InvalidDelimiters { line })?;
                open = new_open;
                close = new_close;
            }
        }
    }

    if pos < template.len() {
        nodes.push(Node::Text(template[pos..].to_string()));
    }

    if let Some(section) = sections.pop() {
        return Err(ParseError::UnclosedSection {
            name: section.name,
            line: section.line,
        });
    }

    Ok(nodes)
}

fn classify(content: &str) -> Tag<'_> {
    let rest = || content.get(1..).unwrap_or_default().trim();
    match content.chars().next() {
        Some('#') => Tag::Section(rest()),
        Some('^') => Tag::Inverted(rest()),
        Some('/') => Tag::Close(rest()),
        Some('!') => Tag::Comment,
        Some('>') => Tag::Partial(rest()),
        Some('&') => Tag::Raw(rest()),
        Some('=') => Tag::Delimiters(content),
        _ => Tag::Variable(content),
    }
}

fn required_name(name: &str, line: usize) -> Result<String, ParseError> {
    if name.is_empty() {
        Err(ParseError::EmptyTag { line })
    } else {
        Ok(name.to_string())
    }
}

/// `=<% %>=` → (`<%`, `%>`)
fn parse_delimiters(spec: &str) -> Option<(String, String)> {
    let inner = spec.strip_prefix('=')?.strip_suffix('=')?;
    let mut parts = inner.split_whitespace();
    let open = parts.next()?;
    let close = parts.next()?;
    if parts.next().is_some() || open.contains('=') || close.contains('=') {
        return None;
    }
    Some((open.to_string(), close.to_string()))
}

fn is_blank(s: &str) -> bool {
    s.chars().all(|c| c == ' ' || c == '\t')
}

/// Position just past the line ending that follows `from`, if only spaces
/// and tabs come before it. End of input counts as a line ending.
fn line_end(template: &str, from: usize) -> Option<usize> {
    let rest = &template[from..];
    let trimmed = rest.trim_start_matches([' ', '\t']);
    let at = from + (rest.len() - trimmed.len());
    if trimmed.is_empty() {
        Some(at)
    } else if trimmed.starts_with("\r\n") {
        Some(at + 2)
    } else if trimmed.starts_with('\n') {
        Some(at + 1)
    } else {
        None
    }
}
