//! Template rendering for computed returns.
//!
//! Uses Handlebars with a few helpers:
//! - yesno: Render a boolean as "Yes"/"No"
//! - default: Fall back when a value is missing
//! - join: Join an array with a separator
//! - upper: Uppercase a string

use async_trait::async_trait;
use handlebars::{handlebars_helper, no_escape, Handlebars};
use serde_json::Value;
use taxflow_returns::{ArtifactKind, ComputedReturn, DocumentRenderer};

use crate::templates::TemplatesFile;
use crate::RenderError;

handlebars_helper!(yesno: |v: bool| if v { "Yes" } else { "No" });
handlebars_helper!(upper: |s: str| s.to_uppercase());
handlebars_helper!(default_or: |value: Json, fallback: Json| {
    if value.is_null() { fallback.clone() } else { value.clone() }
});
handlebars_helper!(join: |items: array, sep: str| {
    items
        .iter()
        .map(|v| v.as_str().map(String::from).unwrap_or_else(|| v.to_string()))
        .collect::<Vec<_>>()
        .join(sep)
});

/// Compiled renderer with registered helpers
pub struct TemplateRenderer {
    handlebars: Handlebars<'static>,
    templates: TemplatesFile,
    extension: String,
}

impl TemplateRenderer {
    /// Create a new renderer from a templates file
    pub fn new(templates: TemplatesFile) -> Result<Self, RenderError> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(false);
        handlebars.register_escape_fn(no_escape);

        handlebars.register_helper("yesno", Box::new(yesno));
        handlebars.register_helper("upper", Box::new(upper));
        handlebars.register_helper("default", Box::new(default_or));
        handlebars.register_helper("join", Box::new(join));

        for (name, template) in &templates.templates {
            handlebars
                .register_template_string(name, &template.template)
                .map_err(|e| RenderError::Template(format!("{}: {}", name, e)))?;
        }

        Ok(Self {
            handlebars,
            templates,
            extension: "txt".to_string(),
        })
    }

    /// Load from a file path
    pub fn load(path: &str) -> Result<Self, RenderError> {
        Self::new(TemplatesFile::load(path)?)
    }

    pub fn builtin() -> Result<Self, RenderError> {
        Self::new(TemplatesFile::builtin())
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Render a named template with data
    pub fn render_named(&self, template_name: &str, data: &Value) -> Result<String, RenderError> {
        if self.templates.get(template_name).is_none() {
            return Err(RenderError::MissingTemplate(template_name.to_string()));
        }
        self.handlebars
            .render(template_name, data)
            .map_err(|e| RenderError::Render(e.to_string()))
    }

    pub fn list_templates(&self) -> Vec<&str> {
        self.templates.list_templates()
    }
}

#[async_trait]
impl DocumentRenderer for TemplateRenderer {
    async fn render(&self, kind: ArtifactKind, object: &ComputedReturn) -> anyhow::Result<Vec<u8>> {
        let name = kind.to_string();
        let text = self.render_named(&name, &object.0)?;
        tracing::debug!(template = %name, bytes = text.len(), "rendered document");
        Ok(text.into_bytes())
    }

    fn extension(&self) -> &str {
        &self.extension
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn renderer(template: &str) -> TemplateRenderer {
        let yaml = format!(
            "version: \"1.0\"\ntemplates:\n  primary:\n    template: \"{}\"\n",
            template.replace('"', "\\\"")
        );
        TemplateRenderer::new(TemplatesFile::from_yaml(&yaml).unwrap()).unwrap()
    }

    #[test]
    fn test_yesno_helper() {
        let r = renderer("Crypto: {{yesno crypto}}");
        let out = r.render_named("primary", &json!({ "crypto": true })).unwrap();
        assert_eq!(out, "Crypto: Yes");
    }

    #[test]
    fn test_default_helper() {
        let r = renderer("{{default name \"n/a\"}}");
        assert_eq!(r.render_named("primary", &json!({})).unwrap(), "n/a");
        assert_eq!(r.render_named("primary", &json!({ "name": "Doe" })).unwrap(), "Doe");
    }

    #[test]
    fn test_join_helper() {
        let r = renderer("{{join countries \", \"}}");
        let out = r
            .render_named("primary", &json!({ "countries": ["France", "Canada"] }))
            .unwrap();
        assert_eq!(out, "France, Canada");
    }

    #[test]
    fn test_no_html_escaping() {
        let r = renderer("{{name}}");
        let out = r.render_named("primary", &json!({ "name": "O'Brien & Sons" })).unwrap();
        assert_eq!(out, "O'Brien & Sons");
    }

    #[test]
    fn test_missing_template() {
        let r = renderer("x");
        assert!(matches!(
            r.render_named("secondary", &json!({})),
            Err(RenderError::MissingTemplate(_))
        ));
    }

    #[tokio::test]
    async fn test_builtin_secondary_document() {
        let r = TemplateRenderer::builtin().unwrap();
        let object = ComputedReturn(json!({
            "year": 2021,
            "surname": "Doe",
            "jurisdiction": "il",
            "lines": { "wages": "52000" }
        }));

        let bytes = r.render(ArtifactKind::Secondary, &object).await.unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("IL RETURN (2021)"));
        assert!(text.contains("Taxpayer: Doe"));
        assert!(text.contains("wages: 52000"));
        assert_eq!(r.extension(), "txt");
    }
}
