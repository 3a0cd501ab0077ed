//! Template rendering: substituting `{{ $input.x }}`-style expressions in
//! a node's `params` against its [`ActionContext`].
//!
//! The renderer is an opaque dependency as far as the rest of the engine
//! is concerned — anything implementing [`TemplateRenderer`] can be
//! swapped in. [`SimpleTemplateRenderer`] is a minimal, non-canonical
//! implementation sufficient for the built-in actions and tests; a host
//! embedding a richer expression language (JSONPath, a scripting
//! engine) is expected to provide its own.

use prana_action::ActionContext;
use serde_json::{Map, Value};

/// A renderer turns a node's raw `params` (which may contain template
/// strings) into concrete values by evaluating them against a run's
/// [`ActionContext`].
pub trait TemplateRenderer: Send + Sync {
    /// Render every value in `params`. A single-expression string
    /// (`"{{ $input.x }}"` with nothing else) preserves the resolved
    /// value's type; a string with embedded expressions interpolates
    /// their stringified form into the surrounding text.
    fn render(&self, params: &Map<String, Value>, context: &ActionContext) -> Result<Map<String, Value>, String>;
}

/// A minimal dot-path template renderer: resolves `$input`, `$nodes`,
/// `$vars`, `$env`, and `$execution` references. No conditionals,
/// filters, or function calls — just path traversal.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleTemplateRenderer;

impl TemplateRenderer for SimpleTemplateRenderer {
    fn render(&self, params: &Map<String, Value>, context: &ActionContext) -> Result<Map<String, Value>, String> {
        let mut rendered = Map::with_capacity(params.len());
        for (key, value) in params {
            rendered.insert(key.clone(), render_value(value, context)?);
        }
        Ok(rendered)
    }
}

fn render_value(value: &Value, context: &ActionContext) -> Result<Value, String> {
    match value {
        Value::String(s) => render_string(s, context),
        Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(render_value(item, context)?);
            }
            Ok(Value::Array(out))
        }
        Value::Object(map) => {
            let mut out = Map::with_capacity(map.len());
            for (k, v) in map {
                out.insert(k.clone(), render_value(v, context)?);
            }
            Ok(Value::Object(out))
        }
        other => Ok(other.clone()),
    }
}

fn render_string(s: &str, context: &ActionContext) -> Result<Value, String> {
    let trimmed = s.trim();
    if let Some(expr) = whole_expression(trimmed) {
        return resolve_path(expr.trim(), context);
    }

    let mut output = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("{{") {
        let Some(end) = rest[start..].find("}}") else {
            output.push_str(rest);
            rest = "";
            break;
        };
        output.push_str(&rest[..start]);
        let expr = &rest[start + 2..start + end];
        let resolved = resolve_path(expr.trim(), context)?;
        output.push_str(&stringify(&resolved));
        rest = &rest[start + end + 2..];
    }
    output.push_str(rest);
    Ok(Value::String(output))
}

fn whole_expression(trimmed: &str) -> Option<&str> {
    let inner = trimmed.strip_prefix("{{")?.strip_suffix("}}")?;
    if inner.contains("}}") || inner.contains("{{") {
        None
    } else {
        Some(inner)
    }
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn resolve_path(expr: &str, context: &ActionContext) -> Result<Value, String> {
    let mut segments = expr.split('.');
    let root = segments
        .next()
        .ok_or_else(|| format!("empty template expression: {expr:?}"))?;

    let mut current = match root {
        "$input" => {
            let port = segments
                .next()
                .ok_or_else(|| format!("$input expression missing port: {expr:?}"))?;
            context
                .input
                .get(port)
                .cloned()
                .ok_or_else(|| format!("no input routed to port {port:?}"))?
        }
        "$nodes" => {
            let node_key = segments
                .next()
                .ok_or_else(|| format!("$nodes expression missing node key: {expr:?}"))?;
            let key = prana_core::NodeKey::new(node_key);
            let selector = segments.next();
            match selector {
                Some("context") => context
                    .node_contexts
                    .get(&key)
                    .cloned()
                    .ok_or_else(|| format!("no recorded context for node {node_key:?}"))?,
                Some("output") | None => context
                    .nodes
                    .get(&key)
                    .cloned()
                    .ok_or_else(|| format!("no recorded output for node {node_key:?}"))?,
                Some(other) => {
                    return Err(format!("unknown $nodes selector {other:?} in {expr:?}"));
                }
            }
        }
        "$vars" => Value::Object(context.vars.clone()),
        "$env" => Value::Object(context.env.clone()),
        "$execution" => {
            return resolve_execution_field(segments.next(), context);
        }
        other => return Err(format!("unknown template root {other:?} in {expr:?}")),
    };

    for segment in segments {
        current = navigate(&current, segment)?;
    }
    Ok(current)
}

fn resolve_execution_field(field: Option<&str>, context: &ActionContext) -> Result<Value, String> {
    let execution = &context.execution;
    match field {
        Some("current_node_key") => Ok(Value::String(execution.current_node_key.as_str().to_string())),
        Some("run_index") => Ok(Value::from(execution.run_index)),
        Some("execution_index") => Ok(Value::from(execution.execution_index)),
        Some("loopback") => Ok(Value::Bool(execution.loopback)),
        Some(other) => Err(format!("unknown $execution field {other:?}")),
        None => Err("$execution expression missing field".to_string()),
    }
}

fn navigate(value: &Value, segment: &str) -> Result<Value, String> {
    match value {
        Value::Object(map) => map
            .get(segment)
            .cloned()
            .ok_or_else(|| format!("no field {segment:?} on object")),
        Value::Array(items) => segment
            .parse::<usize>()
            .ok()
            .and_then(|index| items.get(index).cloned())
            .ok_or_else(|| format!("no index {segment:?} on array")),
        _ => Err(format!("cannot navigate into {value} with {segment:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prana_action::ExecutionContext;
    use prana_core::{ExecutionId, NodeKey};
    use std::collections::HashMap;

    fn ctx_with_input(main: Value) -> ActionContext {
        let mut input = indexmap::IndexMap::new();
        input.insert("main".to_string(), main);
        ActionContext {
            input,
            nodes: HashMap::new(),
            node_contexts: HashMap::new(),
            vars: Map::new(),
            env: Map::new(),
            execution: ExecutionContext {
                execution_id: ExecutionId::v4(),
                current_node_key: NodeKey::new("n1"),
                run_index: 0,
                execution_index: 0,
                loopback: false,
            },
        }
    }

    #[test]
    fn whole_expression_preserves_type() {
        let ctx = ctx_with_input(serde_json::json!({"value": 10}));
        let mut params = Map::new();
        params.insert("x".into(), Value::String("{{ $input.main.value }}".into()));
        let rendered = SimpleTemplateRenderer.render(&params, &ctx).unwrap();
        assert_eq!(rendered["x"], serde_json::json!(10));
    }

    #[test]
    fn string_interpolation_mixes_text_and_expression() {
        let ctx = ctx_with_input(serde_json::json!({"name": "world"}));
        let mut params = Map::new();
        params.insert("greeting".into(), Value::String("hello {{ $input.main.name }}!".into()));
        let rendered = SimpleTemplateRenderer.render(&params, &ctx).unwrap();
        assert_eq!(rendered["greeting"], serde_json::json!("hello world!"));
    }

    #[test]
    fn missing_port_is_an_error() {
        let ctx = ctx_with_input(serde_json::json!(1));
        let mut params = Map::new();
        params.insert("x".into(), Value::String("{{ $input.other }}".into()));
        assert!(SimpleTemplateRenderer.render(&params, &ctx).is_err());
    }

    #[test]
    fn literal_values_pass_through_untouched() {
        let ctx = ctx_with_input(Value::Null);
        let mut params = Map::new();
        params.insert("n".into(), serde_json::json!(42));
        params.insert("plain".into(), serde_json::json!("no templates here"));
        let rendered = SimpleTemplateRenderer.render(&params, &ctx).unwrap();
        assert_eq!(rendered["n"], serde_json::json!(42));
        assert_eq!(rendered["plain"], serde_json::json!("no templates here"));
    }

    #[test]
    fn execution_loopback_field() {
        let mut ctx = ctx_with_input(Value::Null);
        ctx.execution.loopback = true;
        let mut params = Map::new();
        params.insert("lb".into(), Value::String("{{ $execution.loopback }}".into()));
        let rendered = SimpleTemplateRenderer.render(&params, &ctx).unwrap();
        assert_eq!(rendered["lb"], serde_json::json!(true));
    }

    #[test]
    fn nested_object_values_are_rendered_recursively() {
        let ctx = ctx_with_input(serde_json::json!({"value": 5}));
        let mut params = Map::new();
        params.insert(
            "nested".into(),
            serde_json::json!({"inner": "{{ $input.main.value }}"}),
        );
        let rendered = SimpleTemplateRenderer.render(&params, &ctx).unwrap();
        assert_eq!(rendered["nested"]["inner"], serde_json::json!(5));
    }
}
