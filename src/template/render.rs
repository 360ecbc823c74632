//! # Template Renderer
//!
//! Walks a parsed template against a [`SecretMap`].
//!
//! Lookups follow Mustache context rules: the innermost section value is
//! searched first, then each enclosing one, then the secrets themselves.
//! Dotted names resolve their first segment that way and the remaining
//! segments inside the value found.

use super::parser::{parse, Node};
use super::partials::{NoPartials, PartialSource};
use crate::constants::MAX_PARTIAL_DEPTH;
use crate::error::RenderError;
use crate::loader::SecretMap;
use serde_json::Value;
use std::borrow::Cow;
use std::fmt;

/// One level of the lookup stack
#[derive(Debug, Clone, Copy)]
enum Scope<'a> {
    Root(&'a SecretMap),
    Value(&'a Value),
}

impl<'a> Scope<'a> {
    fn get(&self, key: &str) -> Option<&'a Value> {
        match *self {
            Scope::Root(map) => map.get(key),
            Scope::Value(value) => value.as_object().and_then(|o| o.get(key)),
        }
    }
}

/// Mustache renderer with a missing-key policy and a partial source
pub struct Renderer {
    strict: bool,
    partials: Box<dyn PartialSource>,
}

impl fmt::Debug for Renderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Renderer")
            .field("strict", &self.strict)
            .finish_non_exhaustive()
    }
}

impl Renderer {
    /// Renderer without partials. `strict` turns missing keys into errors.
    pub fn new(strict: bool) -> Self {
        Self {
            strict,
            partials: Box::new(NoPartials),
        }
    }

    /// Resolve `{{> name}}` through `partials`
    #[must_use]
    pub fn with_partials(mut self, partials: impl PartialSource + 'static) -> Self {
        self.partials = Box::new(partials);
        self
    }

    /// Render `template` against `data`
    pub fn render(&self, template: &str, data: &SecretMap) -> Result<String, RenderError> {
        let nodes = parse(template)?;
        let mut stack = vec![Scope::Root(data)];
        let mut out = String::with_capacity(template.len());
        self.render_nodes(&nodes, &mut stack, &mut out, 0)?;
        Ok(out)
    }

    fn render_nodes<'a>(
        &self,
        nodes: &[Node],
        stack: &mut Vec<Scope<'a>>,
        out: &mut String,
        depth: usize,
    ) -> Result<(), RenderError> {
        for node in nodes {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Variable { name, escape, line } => match resolve(stack, name) {
                    Some(value) => {
                        let text = to_text(value);
                        if *escape {
                            escape_html(&text, out);
                        } else {
                            out.push_str(&text);
                        }
                    }
                    None => self.missing(name, *line)?,
                },
                Node::Section {
                    name,
                    inverted,
                    children,
                    line,
                } => {
                    let value = resolve(stack, name);
                    if value.is_none() {
                        self.missing(name, *line)?;
                    }

                    if *inverted {
                        if !value.is_some_and(is_truthy) {
                            self.render_nodes(children, stack, out, depth)?;
                        }
                        continue;
                    }

                    match value {
                        Some(Value::Array(items)) => {
                            for item in items {
                                self.render_scoped(item, children, stack, out, depth)?;
                            }
                        }
                        Some(value) if is_truthy(value) => {
                            self.render_scoped(value, children, stack, out, depth)?;
                        }
                        _ => {}
                    }
                }
                Node::Partial { name, indent, .. } => {
                    if depth >= MAX_PARTIAL_DEPTH {
                        return Err(RenderError::PartialDepth {
                            name: name.clone(),
                            depth: MAX_PARTIAL_DEPTH,
                        });
                    }
                    match self.partials.load(name) {
                        Some(source) => {
                            let partial = parse(&indent_lines(&source, indent))?;
                            self.render_nodes(&partial, stack, out, depth + 1)?;
                        }
                        None if self.strict => {
                            return Err(RenderError::MissingPartial { name: name.clone() });
                        }
                        None => {}
                    }
                }
            }
        }
        Ok(())
    }

    fn render_scoped<'a>(
        &self,
        value: &'a Value,
        nodes: &[Node],
        stack: &mut Vec<Scope<'a>>,
        out: &mut String,
        depth: usize,
    ) -> Result<(), RenderError> {
        stack.push(Scope::Value(value));
        let result = self.render_nodes(nodes, stack, out, depth);
        stack.pop();
        result
    }

    fn missing(&self, name: &str, line: usize) -> Result<(), RenderError> {
        if self.strict {
            Err(RenderError::MissingKey {
                name: name.to_string(),
                line,
            })
        } else {
            Ok(())
        }
    }
}

fn resolve<'a>(stack: &[Scope<'a>], name: &str) -> Option<&'a Value> {
    if name == "." {
        return match stack.last() {
            Some(Scope::Value(value)) => Some(*value),
            _ => None,
        };
    }

    let mut segments = name.split('.');
    let first = segments.next()?;
    let mut value = stack.iter().rev().find_map(|scope| scope.get(first))?;
    for segment in segments {
        value = value.as_object()?.get(segment)?;
    }
    Some(value)
}

/// Python-style truthiness: null, false, zero, "" and empty collections are falsy
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Scalars render the way Python's `str` prints them, so secrets written
/// for the pystache-based tool produce the same text
fn to_text(value: &Value) -> Cow<'_, str> {
    match value {
        Value::Null => Cow::Borrowed("None"),
        Value::String(s) => Cow::Borrowed(s),
        Value::Bool(true) => Cow::Borrowed("True"),
        Value::Bool(false) => Cow::Borrowed("False"),
        Value::Number(n) => Cow::Owned(n.to_string()),
        Value::Array(_) | Value::Object(_) => Cow::Owned(value.to_string()),
    }
}

fn escape_html(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
}

/// Prefix every line of a standalone partial with the tag's indentation
fn indent_lines<'s>(source: &'s str, indent: &str) -> Cow<'s, str> {
    if indent.is_empty() {
        return Cow::Borrowed(source);
    }
    let mut indented = String::with_capacity(source.len());
    for line in source.split_inclusive('\n') {
        indented.push_str(indent);
        indented.push_str(line);
    }
    Cow::Owned(indented)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    fn data(value: Value) -> SecretMap {
        match value {
            Value::Object(map) => map.into_iter().collect(),
            _ => panic!("test data must be an object"),
        }
    }

    fn render(template: &str, value: Value) -> String {
        Renderer::new(false).render(template, &data(value)).unwrap()
    }

    #[test]
    fn test_interpolation_escapes_html() {
        let out = render(
            "{{v}}|{{{v}}}|{{& v}}",
            json!({"v": "<a href=\"x\">Tom & Jerry's</a>"}),
        );
        assert_eq!(
            out,
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#x27;s&lt;/a&gt;|<a href=\"x\">Tom & Jerry's</a>|<a href=\"x\">Tom & Jerry's</a>"
        );
    }

    #[test]
    fn test_primitive_values() {
        let out = render(
            "{{port}} {{tls}} {{ratio}} [{{nothing}}]",
            json!({"port": 5432, "tls": false, "ratio": 0.5, "nothing": null}),
        );
        assert_eq!(out, "5432 False 0.5 [None]");
    }

    #[test]
    fn test_booleans_and_null_render_python_style() {
        let out = render(
            "debug={{debug}} verbose={{verbose}} opt=[{{opt}}]",
            json!({"debug": true, "verbose": false, "opt": null}),
        );
        assert_eq!(out, "debug=True verbose=False opt=[None]");
    }

    #[test]
    fn test_null_is_still_falsy_in_sections() {
        assert_eq!(render("{{#opt}}set{{/opt}}{{^opt}}unset{{/opt}}", json!({"opt": null})), "unset");
    }

    #[test]
    fn test_missing_key_lenient_renders_empty() {
        assert_eq!(render("a={{missing}};", json!({"x": "1"})), "a=;");
    }

    #[test]
    fn test_missing_key_strict_fails() {
        let err = Renderer::new(true)
            .render("line1\n{{missing}}", &data(json!({"x": "1"})))
            .unwrap_err();
        assert!(
            matches!(err, RenderError::MissingKey { ref name, line: 2 } if name == "missing"),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn test_strict_applies_to_sections() {
        let renderer = Renderer::new(true);
        let map = data(json!({"x": "1"}));
        assert!(renderer.render("{{#flag}}on{{/flag}}", &map).is_err());
        assert!(renderer.render("{{^flag}}off{{/flag}}", &map).is_err());
        assert_eq!(renderer.render("{{#x}}on{{/x}}", &map).unwrap(), "on");
    }

    #[test]
    fn test_sections_truthiness() {
        let template = "{{#v}}yes{{/v}}{{^v}}no{{/v}}";
        assert_eq!(render(template, json!({"v": "value"})), "yes");
        assert_eq!(render(template, json!({"v": ""})), "no");
        assert_eq!(render(template, json!({"v": false})), "no");
        assert_eq!(render(template, json!({"v": 0})), "no");
        assert_eq!(render(template, json!({"v": []})), "no");
        assert_eq!(render(template, json!({"v": null})), "no");
        assert_eq!(render(template, json!({})), "no");
        assert_eq!(render(template, json!({"v": true})), "yes");
    }

    #[test]
    fn test_list_iteration() {
        let out = render(
            "{{#hosts}}{{name}}:{{port}},{{/hosts}}",
            json!({"hosts": [{"name": "a", "port": 1}, {"name": "b", "port": 2}]}),
        );
        assert_eq!(out, "a:1,b:2,");

        let out = render("{{#ips}}[{{.}}]{{/ips}}", json!({"ips": ["10.0.0.1", "10.0.0.2"]}));
        assert_eq!(out, "[10.0.0.1][10.0.0.2]");
    }

    #[test]
    fn test_context_falls_back_to_outer_scope() {
        let out = render(
            "{{#db}}{{user}}@{{host}}{{/db}}",
            json!({"db": {"user": "alice"}, "host": "db.internal"}),
        );
        assert_eq!(out, "alice@db.internal");
    }

    #[test]
    fn test_dotted_names() {
        let map = json!({"db": {"primary": {"host": "p.internal"}}, "host": "outer"});
        assert_eq!(render("{{db.primary.host}}", map.clone()), "p.internal");
        assert_eq!(render("[{{db.replica.host}}]", map), "[]");
    }

    #[test]
    fn test_scalar_section_pushes_value() {
        assert_eq!(render("{{#user}}<{{.}}>{{/user}}", json!({"user": "alice"})), "<alice>");
    }

    #[test]
    fn test_standalone_section_lines() {
        let out = render(
            "[db]\n{{#tls}}\nsslmode=require\n{{/tls}}\nuser={{user}}\n",
            json!({"tls": true, "user": "alice"}),
        );
        assert_eq!(out, "[db]\nsslmode=require\nuser=alice\n");
    }

    #[test]
    fn test_partials() {
        let partials: HashMap<String, String> = [
            ("creds".to_string(), "user={{user}}\npass={{pass}}\n".to_string()),
        ]
        .into_iter()
        .collect();
        let renderer = Renderer::new(false).with_partials(partials);
        let out = renderer
            .render(
                "[db]\n  {{> creds}}\nend\n",
                &data(json!({"user": "alice", "pass": "s3cr3t"})),
            )
            .unwrap();
        assert_eq!(out, "[db]\n  user=alice\n  pass=s3cr3t\nend\n");
    }

    #[test]
    fn test_missing_partial() {
        let map = data(json!({"x": "1"}));
        assert_eq!(Renderer::new(false).render("a{{>nope}}b", &map).unwrap(), "ab");
        let err = Renderer::new(true).render("a{{>nope}}b", &map).unwrap_err();
        assert!(matches!(err, RenderError::MissingPartial { ref name } if name == "nope"));
    }

    #[test]
    fn test_recursive_partial_is_bounded() {
        let partials: HashMap<String, String> =
            [("loop".to_string(), "x{{> loop}}".to_string())].into_iter().collect();
        let err = Renderer::new(false)
            .with_partials(partials)
            .render("{{> loop}}", &data(json!({"x": "1"})))
            .unwrap_err();
        assert!(matches!(err, RenderError::PartialDepth { .. }));
    }

    #[test]
    fn test_parse_errors_fail_regardless_of_mode() {
        let err = Renderer::new(false)
            .render("{{#open}}never closed", &data(json!({"open": true})))
            .unwrap_err();
        assert!(matches!(err, RenderError::Parse(_)));
    }

    #[test]
    fn test_render_does_not_touch_inputs() {
        let map = data(json!({"user": "alice"}));
        let snapshot = map.clone();
        let template = String::from("{{user}}");
        let renderer = Renderer::new(true);
        let first = renderer.render(&template, &map).unwrap();
        let second = renderer.render(&template, &map).unwrap();
        assert_eq!(first, second);
        assert_eq!(map, snapshot);
        assert_eq!(template, "{{user}}");
    }
}
