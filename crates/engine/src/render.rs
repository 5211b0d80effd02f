/*!
 * Copyright 2025 Release Workshop Ltd
 * Licensed under the Elastic License 2.0; you may not use this file except in compliance with the Elastic License 2.0.
 * See the LICENSE file in the project root for details.
 */

use serde_json::Value;
use tera::{Context, Tera};

use crate::error::{error_chain, PackagerError, PackagerResult};

/// Renders template text with package parameters.
pub trait TemplateRenderer: Send + Sync {
    /// Render `text`; `name` identifies the template in errors.
    fn render(&self, name: &str, text: &str, params: &Value) -> PackagerResult<String>;
}

/// Tera renderer with autoescaping disabled, since none of the outputs are HTML.
#[derive(Debug, Default, Clone, Copy)]
pub struct TeraRenderer;

impl TemplateRenderer for TeraRenderer {
    fn render(&self, name: &str, text: &str, params: &Value) -> PackagerResult<String> {
        let render_error = |e: tera::Error| PackagerError::TemplateRender {
            template: name.to_string(),
            message: error_chain(&e),
        };

        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);
        tera.add_raw_template(name, text).map_err(render_error)?;
        let context = Context::from_serialize(params).map_err(render_error)?;
        tera.render(name, &context).map_err(render_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_substitutes_params() {
        let params = json!({
            "api": {"name": "pubsub", "version": "v1", "modules": ["google/pubsub/v1/pubsub_pb"]},
            "dependencies": {"grpc": {"ruby": "~> 1.0"}}
        });
        let text = "{{ api.name }}-{{ api.version }} grpc {{ dependencies.grpc.ruby }}\n\
                    {% for module in api.modules %}require '{{ module }}'{% endfor %}";
        let rendered = TeraRenderer.render("gemspec.tera", text, &params).unwrap();
        assert_eq!(
            rendered,
            "pubsub-v1 grpc ~> 1.0\nrequire 'google/pubsub/v1/pubsub_pb'"
        );
    }

    #[test]
    fn test_render_does_not_escape() {
        let params = json!({"api": {"author": "Google <dev@google.com>"}});
        let rendered = TeraRenderer
            .render("README.md.tera", "{{ api.author }}", &params)
            .unwrap();
        assert_eq!(rendered, "Google <dev@google.com>");
    }

    #[test]
    fn test_missing_variable_fails() {
        let params = json!({"api": {"name": "pubsub"}});
        match TeraRenderer.render("setup.py.tera", "{{ api.unknown }}", &params) {
            Err(PackagerError::TemplateRender { template, message }) => {
                assert_eq!(template, "setup.py.tera");
                assert!(message.contains("api.unknown"), "message: {message}");
            }
            other => panic!("Expected TemplateRender, got {other:?}"),
        }
    }

    #[test]
    fn test_syntax_error_fails() {
        let result = TeraRenderer.render("broken.tera", "{% for x in %}", &json!({}));
        assert!(matches!(result, Err(PackagerError::TemplateRender { .. })));
    }
}
