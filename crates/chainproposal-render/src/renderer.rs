//! Renderer trait and registry.

use crate::error::{RenderError, RendererRegistryError};
use crate::{json::JsonRenderer, markdown::MarkdownRenderer, text::TextRenderer};
use chainproposal_analyzer::AnalyzedProposal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

/// Report metadata supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenderRequest {
    pub domain: String,
    pub environment_name: String,
}

impl RenderRequest {
    pub fn new(domain: impl Into<String>, environment_name: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            environment_name: environment_name.into(),
        }
    }
}

/// An output format for analyzed proposals.
///
/// # Thread Safety
/// Renderers are shared through the registry and must be `Send + Sync`.
pub trait Renderer: Send + Sync {
    /// Unique, non-empty identifier (e.g. `"text"`).
    fn id(&self) -> &str;

    /// Stream the report into `sink`.
    fn render_to(
        &self,
        sink: &mut dyn Write,
        request: &RenderRequest,
        proposal: &AnalyzedProposal<'_>,
    ) -> Result<(), RenderError>;

    /// Render into a string.
    fn render(
        &self,
        request: &RenderRequest,
        proposal: &AnalyzedProposal<'_>,
    ) -> Result<String, RenderError> {
        let mut buf = Vec::new();
        self.render_to(&mut buf, request, proposal)?;
        Ok(String::from_utf8(buf)?)
    }
}

/// Renderers keyed by ID.
///
/// Filled at startup; a failed registration leaves the registry unchanged.
#[derive(Default)]
pub struct RendererRegistry {
    renderers: RwLock<BTreeMap<String, Arc<dyn Renderer>>>,
}

impl RendererRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with `text`, `markdown` and `json`.
    pub fn with_builtin() -> Self {
        let mut renderers: BTreeMap<String, Arc<dyn Renderer>> = BTreeMap::new();
        for renderer in [
            Arc::new(TextRenderer) as Arc<dyn Renderer>,
            Arc::new(MarkdownRenderer),
            Arc::new(JsonRenderer::default()),
        ] {
            renderers.insert(renderer.id().to_string(), renderer);
        }
        Self {
            renderers: RwLock::new(renderers),
        }
    }

    pub fn register(&self, renderer: Arc<dyn Renderer>) -> Result<(), RendererRegistryError> {
        let id = renderer.id();
        if id.is_empty() {
            return Err(RendererRegistryError::EmptyId);
        }
        let mut renderers = self.renderers.write().unwrap_or_else(PoisonError::into_inner);
        if renderers.contains_key(id) {
            return Err(RendererRegistryError::AlreadyRegistered { id: id.to_string() });
        }
        debug!(renderer = id, "registered renderer");
        renderers.insert(id.to_string(), renderer.clone());
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn Renderer>> {
        self.renderers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    /// Registered IDs in ascending order.
    pub fn list(&self) -> Vec<String> {
        self.renderers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }
}

impl std::fmt::Debug for RendererRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RendererRegistry")
            .field("renderers", &self.list())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Named(&'static str);

    impl Renderer for Named {
        fn id(&self) -> &str {
            self.0
        }

        fn render_to(
            &self,
            sink: &mut dyn Write,
            _request: &RenderRequest,
            _proposal: &AnalyzedProposal<'_>,
        ) -> Result<(), RenderError> {
            sink.write_all(self.0.as_bytes())?;
            Ok(())
        }
    }

    #[test]
    fn register_get_and_list() {
        let registry = RendererRegistry::new();
        registry.register(Arc::new(Named("plain"))).unwrap();
        assert_eq!(registry.get("plain").unwrap().id(), "plain");
        assert!(registry.get("other").is_none());
        assert_eq!(registry.list(), vec!["plain".to_string()]);
    }

    #[test]
    fn rejected_registrations_leave_registry_unchanged() {
        let registry = RendererRegistry::new();
        registry.register(Arc::new(Named("plain"))).unwrap();

        assert_eq!(
            registry.register(Arc::new(Named(""))).unwrap_err(),
            RendererRegistryError::EmptyId
        );
        assert_eq!(
            registry.register(Arc::new(Named("plain"))).unwrap_err(),
            RendererRegistryError::AlreadyRegistered { id: "plain".into() }
        );
        assert_eq!(registry.list(), vec!["plain".to_string()]);
    }

    #[test]
    fn builtin_renderers() {
        let registry = RendererRegistry::with_builtin();
        assert_eq!(registry.list(), vec!["json", "markdown", "text"]);
        assert_eq!(
            registry.register(Arc::new(TextRenderer)).unwrap_err(),
            RendererRegistryError::AlreadyRegistered { id: "text".into() }
        );
    }
}
