//! Turning user input into a canonical reference and its owning plugin.

use crate::PluginRegistry;
use regex::Regex;
use siphon_cache::ReferenceCache;
use siphon_core::{CanonicalReference, UrlHash};
use siphon_error::{ResolveError, ResolveErrorKind, SiphonResult};
use siphon_interface::{CanonicalRules, Plugin, RedirectResolver};
use std::sync::{Arc, LazyLock};
use url::Url;

static URL_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s<>"'\]\)]+"#).ok());

/// Normalizes references so that equal content maps to equal keys.
///
/// Accepts a URL, free text containing a URL, or a hash token previously
/// produced for a reference.
#[derive(Clone)]
pub struct Canonicalizer {
    registry: Arc<PluginRegistry>,
    references: Arc<ReferenceCache>,
    redirects: Arc<dyn RedirectResolver>,
}

impl std::fmt::Debug for Canonicalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Canonicalizer")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl Canonicalizer {
    /// Create a canonicalizer over a plugin table and token cache.
    pub fn new(
        registry: Arc<PluginRegistry>,
        references: Arc<ReferenceCache>,
        redirects: Arc<dyn RedirectResolver>,
    ) -> Self {
        Self {
            registry,
            references,
            redirects,
        }
    }

    /// Make `reference` resolvable from its hash token.
    pub fn remember(&self, reference: &CanonicalReference) {
        self.references.insert(reference);
    }

    /// Canonical form of `reference` and the plugin that owns it.
    ///
    /// # Errors
    ///
    /// - `ReferenceNotFound` for a hash token with no live mapping
    /// - `UnsupportedPlatform` when there is no URL or no plugin accepts it
    /// - `Redirect` when a short link cannot be followed
    #[tracing::instrument(skip(self))]
    pub async fn canonicalize(
        &self,
        reference: &str,
    ) -> SiphonResult<(CanonicalReference, Arc<dyn Plugin>)> {
        let input = reference.trim();
        let url = match UrlHash::parse(input) {
            Some(token) => self
                .references
                .lookup(&token)
                .map(|r| r.as_str().to_string())
                .ok_or_else(|| {
                    ResolveError::new(ResolveErrorKind::ReferenceNotFound(input.to_string()))
                })?,
            None => extract_url(input).ok_or_else(|| {
                ResolveError::new(ResolveErrorKind::UnsupportedPlatform(input.to_string()))
            })?,
        };

        let mut plugin = self.registry.select_or_fail(&url)?;
        let mut url = url;
        if needs_redirect(&url, &plugin.canonical_rules()) {
            let target = self.redirects.resolve(&url).await?;
            tracing::debug!(from = %url, to = %target, "Followed redirect");
            url = target;
            plugin = self.registry.select_or_fail(&url)?;
        }

        let stripped = strip_query(&url, &plugin.canonical_rules().reserved_params)?;
        let plugin = self.registry.select_or_fail(&stripped)?;
        tracing::debug!(canonical = %stripped, plugin = plugin.id(), "Canonicalized");
        Ok((CanonicalReference::new(stripped), plugin))
    }
}

/// First http(s) URL in free text.
fn extract_url(text: &str) -> Option<String> {
    URL_PATTERN
        .as_ref()?
        .find(text)
        .map(|m| m.as_str().to_string())
}

fn needs_redirect(url: &str, rules: &CanonicalRules) -> bool {
    rules
        .redirect_triggers
        .iter()
        .any(|trigger| url.contains(trigger.as_str()))
}

/// Drop every query parameter not in `reserved`, keeping order and fragment.
fn strip_query(raw: &str, reserved: &[String]) -> SiphonResult<String> {
    let mut url = Url::parse(raw).map_err(|e| {
        ResolveError::new(ResolveErrorKind::UnsupportedPlatform(format!("{}: {}", raw, e)))
    })?;

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(name, _)| reserved.iter().any(|r| r == name))
        .map(|(name, value)| (name.into_owned(), value.into_owned()))
        .collect();

    if kept.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(kept);
    }
    Ok(url.to_string())
}
