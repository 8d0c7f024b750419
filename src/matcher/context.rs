//! Evaluation context.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use super::extract::Extractor;
use crate::error::Result;
use crate::tree::{query_all, Namespaces, Node, QueryOutcome};

type TranslateFn = dyn Fn(&str) -> Result<String> + Send + Sync;

static DEFAULT_EXTRACTOR: Extractor = Extractor::Text;

/// Settings shared by every step of an evaluation: the default extractor,
/// namespace bindings for prefixed selectors, and an optional selector
/// translator.
///
/// Contexts are immutable; every `with_*` method returns a new context that
/// shares the fields it does not change.
///
/// ```
/// use treematch::{Context, Extractor};
///
/// let base = Context::new().with_namespace("atom", "http://www.w3.org/2005/Atom");
/// let raw = base.with_extractor(Extractor::Identity);
/// assert_eq!(raw.namespaces().len(), 1);
/// assert!(matches!(base.extractor(), Extractor::Text));
/// ```
#[derive(Clone, Default)]
pub struct Context {
    extractor: Option<Extractor>,
    namespaces: Arc<Namespaces>,
    translator: Option<Arc<TranslateFn>>,
}

impl Context {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A context whose selectors are CSS, translated to `XPath` before every query.
    ///
    /// ```
    /// use treematch::{Context, Document, Matcher};
    ///
    /// let doc = Document::parse_html(r#"<ul><li class="x">A</li><li>B</li></ul>"#).unwrap();
    /// let value = Matcher::multi("li.x").invoke(doc.root(), Some(&Context::css())).unwrap();
    /// assert_eq!(value, treematch::Value::from(vec!["A"]));
    /// ```
    #[must_use]
    pub fn css() -> Self {
        Self::new().with_translator(crate::css::to_xpath)
    }

    /// Replaces the extractor applied to matched nodes.
    #[must_use]
    pub fn with_extractor(&self, extractor: impl Into<Extractor>) -> Self {
        Self {
            extractor: Some(extractor.into()),
            ..self.clone()
        }
    }

    /// Binds `prefix` to `uri` for prefixed names in selectors.
    #[must_use]
    pub fn with_namespace(&self, prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        let mut namespaces = Namespaces::clone(&self.namespaces);
        namespaces.insert(prefix.into(), uri.into());
        Self {
            namespaces: Arc::new(namespaces),
            ..self.clone()
        }
    }

    /// Binds several prefixes at once; later bindings win.
    #[must_use]
    pub fn with_namespaces<I, P, U>(&self, bindings: I) -> Self
    where
        I: IntoIterator<Item = (P, U)>,
        P: Into<String>,
        U: Into<String>,
    {
        let mut namespaces = Namespaces::clone(&self.namespaces);
        namespaces.extend(bindings.into_iter().map(|(p, u)| (p.into(), u.into())));
        Self {
            namespaces: Arc::new(namespaces),
            ..self.clone()
        }
    }

    /// Installs a function that rewrites every selector before it is run.
    #[must_use]
    pub fn with_translator<F>(&self, translator: F) -> Self
    where
        F: Fn(&str) -> Result<String> + Send + Sync + 'static,
    {
        Self {
            translator: Some(Arc::new(translator)),
            ..self.clone()
        }
    }

    /// Removes the selector translator, so selectors are `XPath` again.
    #[must_use]
    pub fn without_translator(&self) -> Self {
        Self {
            translator: None,
            ..self.clone()
        }
    }

    /// The extractor in effect; [`Extractor::Text`] unless replaced.
    #[must_use]
    pub fn extractor(&self) -> &Extractor {
        self.extractor.as_ref().unwrap_or(&DEFAULT_EXTRACTOR)
    }

    #[must_use]
    pub fn namespaces(&self) -> &Namespaces {
        &self.namespaces
    }

    #[must_use]
    pub fn has_translator(&self) -> bool {
        self.translator.is_some()
    }

    /// Rewrites `selector` with the translator, if one is installed.
    ///
    /// # Errors
    ///
    /// Propagates the translator's error for selectors it cannot handle.
    pub fn translate<'s>(&self, selector: &'s str) -> Result<Cow<'s, str>> {
        match &self.translator {
            Some(translate) => Ok(Cow::Owned(translate(selector)?)),
            None => Ok(Cow::Borrowed(selector)),
        }
    }

    /// Translates `selector` and runs it against `node` with this context's
    /// namespace bindings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSelector`](crate::Error::InvalidSelector) if
    /// the selector cannot be translated, compiled or evaluated.
    pub fn query_all<'d>(&self, node: Node<'d>, selector: &str) -> Result<QueryOutcome<'d>> {
        let xpath = self.translate(selector)?;
        query_all(node, &xpath, &self.namespaces)
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("extractor", self.extractor())
            .field("namespaces", &self.namespaces)
            .field("translator", &self.translator.as_ref().map(|_| ".."))
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::{Document, Error};

    #[test]
    fn test_with_extractor_leaves_original() {
        let base = Context::new();
        let raw = base.with_extractor(Extractor::Identity);
        assert!(matches!(base.extractor(), Extractor::Text));
        assert!(matches!(raw.extractor(), Extractor::Identity));
    }

    #[test]
    fn test_namespaces_are_shared_until_changed() {
        let base = Context::new().with_namespace("a", "urn:a");
        let derived = base.with_extractor(Extractor::Oneline);
        assert!(Arc::ptr_eq(&base.namespaces, &derived.namespaces));

        let extended = base.with_namespaces([("b", "urn:b")]);
        assert_eq!(base.namespaces().len(), 1);
        assert_eq!(extended.namespaces().len(), 2);
    }

    #[test]
    fn test_translate_without_translator() {
        let ctx = Context::new();
        assert!(matches!(ctx.translate("//a").unwrap(), Cow::Borrowed("//a")));
    }

    #[test]
    fn test_translator_errors_propagate() {
        let ctx = Context::new()
            .with_translator(|s: &str| Err(Error::invalid_selector(s, "nope")));
        let doc = Document::parse_xml("<r/>").unwrap();
        let err = ctx.query_all(doc.root(), "r").unwrap_err();
        assert!(matches!(err, Error::InvalidSelector { .. }));
    }

    #[test]
    fn test_css_context_queries() {
        let doc = Document::parse_xml("<r><a/><b/><a/></r>").unwrap();
        let ctx = Context::css();
        assert!(ctx.has_translator());
        match ctx.query_all(doc.root(), "r > a").unwrap() {
            QueryOutcome::Nodes(nodes) => assert_eq!(nodes.len(), 2),
            QueryOutcome::Scalar(v) => panic!("unexpected scalar {v:?}"),
        }
        assert!(!ctx.without_translator().has_translator());
    }
}
