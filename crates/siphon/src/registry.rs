//! Ordered plugin table.

use siphon_error::{ResolveError, ResolveErrorKind, SiphonResult};
use siphon_interface::Plugin;
use std::cmp::Reverse;
use std::sync::Arc;

/// Plugins in match order, built once at startup.
///
/// Higher [`Plugin::priority`] is tried first; plugins with equal priority
/// keep their registration order. The first plugin whose `matches` accepts
/// a URL owns it.
///
/// # Example
///
/// ```
/// use async_trait::async_trait;
/// use siphon::PluginRegistry;
/// use siphon_core::{CanonicalReference, ParseOptions, ParseResult};
/// use siphon_error::SiphonResult;
/// use siphon_interface::Plugin;
///
/// struct Host(&'static str, i32);
///
/// #[async_trait]
/// impl Plugin for Host {
///     fn id(&self) -> &str { self.0 }
///     fn matches(&self, url: &str) -> bool { url.contains("ex.com") }
///     fn priority(&self) -> i32 { self.1 }
///     async fn parse(&self, r: &CanonicalReference, _: &ParseOptions) -> SiphonResult<ParseResult> {
///         Ok(ParseResult::images(r.as_str(), vec![]))
///     }
/// }
///
/// let registry = PluginRegistry::builder()
///     .register(Host("generic", 0))
///     .register(Host("special", 10))
///     .build();
/// assert_eq!(registry.ids(), vec!["special", "generic"]);
/// assert_eq!(registry.select("https://ex.com/1").unwrap().id(), "special");
/// ```
#[derive(Clone, Default)]
pub struct PluginRegistry {
    plugins: Vec<Arc<dyn Plugin>>,
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("plugins", &self.ids())
            .finish()
    }
}

impl PluginRegistry {
    /// Start a registry.
    pub fn builder() -> PluginRegistryBuilder {
        PluginRegistryBuilder::default()
    }

    /// First plugin accepting `url`.
    pub fn select(&self, url: &str) -> Option<Arc<dyn Plugin>> {
        self.plugins.iter().find(|p| p.matches(url)).cloned()
    }

    /// First plugin accepting `url`, or `UnsupportedPlatform`.
    pub fn select_or_fail(&self, url: &str) -> SiphonResult<Arc<dyn Plugin>> {
        self.select(url).ok_or_else(|| {
            tracing::debug!(url, "No plugin matches");
            ResolveError::new(ResolveErrorKind::UnsupportedPlatform(url.to_string())).into()
        })
    }

    /// Plugin ids in match order.
    pub fn ids(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.id()).collect()
    }

    /// Number of registered plugins.
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// True when no plugin is registered.
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

/// Collects plugins for a [`PluginRegistry`].
#[derive(Default)]
pub struct PluginRegistryBuilder {
    plugins: Vec<Arc<dyn Plugin>>,
}

impl PluginRegistryBuilder {
    /// Add a plugin.
    pub fn register(self, plugin: impl Plugin + 'static) -> Self {
        self.register_shared(Arc::new(plugin))
    }

    /// Add a plugin that is shared elsewhere.
    pub fn register_shared(mut self, plugin: Arc<dyn Plugin>) -> Self {
        self.plugins.push(plugin);
        self
    }

    /// Freeze the match order.
    pub fn build(mut self) -> PluginRegistry {
        // Stable: equal priorities keep registration order.
        self.plugins.sort_by_key(|p| Reverse(p.priority()));
        tracing::info!(plugins = self.plugins.len(), "Plugin registry built");
        PluginRegistry {
            plugins: self.plugins,
        }
    }
}
