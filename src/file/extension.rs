//! Extension sets for extension-agnostic lookups.

use std::borrow::Cow;

/// An ordered set of file extensions.
///
/// The order matters: when resolving `name` against a folder, the first
/// extension that has a matching file wins. When nothing matches, the first
/// extension is used to build the fallback path.
///
/// # Example
///
/// ```
/// use virtual_serve::file::Extension;
///
/// let scripts = Extension::new(["js", "mjs"]);
/// assert_eq!(scripts.primary(), Some("js"));
/// assert!(Extension::HTML.matches("HTM"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extension {
    extensions: Cow<'static, [Cow<'static, str>]>,
}

const HTML_SET: &[Cow<'static, str>] = &[Cow::Borrowed("html"), Cow::Borrowed("htm")];
const CSS_SET: &[Cow<'static, str>] = &[Cow::Borrowed("css")];
const JAVASCRIPT_SET: &[Cow<'static, str>] = &[Cow::Borrowed("js")];
const JSON_SET: &[Cow<'static, str>] = &[Cow::Borrowed("json")];
const TEXT_SET: &[Cow<'static, str>] = &[Cow::Borrowed("txt")];
const TEMPLATE_SET: &[Cow<'static, str>] =
    &[Cow::Borrowed("html"), Cow::Borrowed("htm"), Cow::Borrowed("txt")];

impl Extension {
    /// `.html`, `.htm`
    pub const HTML: Extension = Extension::preset(HTML_SET);
    /// `.css`
    pub const CSS: Extension = Extension::preset(CSS_SET);
    /// `.js`
    pub const JAVASCRIPT: Extension = Extension::preset(JAVASCRIPT_SET);
    /// `.json`
    pub const JSON: Extension = Extension::preset(JSON_SET);
    /// `.txt`
    pub const TEXT: Extension = Extension::preset(TEXT_SET);
    /// Page templates: `.html`, `.htm`, `.txt`
    pub const TEMPLATE: Extension = Extension::preset(TEMPLATE_SET);

    const fn preset(extensions: &'static [Cow<'static, str>]) -> Self {
        Self {
            extensions: Cow::Borrowed(extensions),
        }
    }

    /// Build a set from any list of extensions, without leading dots.
    ///
    /// Accepts literals as well as strings read at runtime.
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Cow<'static, str>>,
    {
        Self {
            extensions: Cow::Owned(extensions.into_iter().map(Into::into).collect()),
        }
    }

    /// Extensions in lookup order.
    pub fn extensions(&self) -> impl Iterator<Item = &str> {
        self.extensions.iter().map(|ext| ext.as_ref())
    }

    /// The extension used for the fallback path.
    pub fn primary(&self) -> Option<&str> {
        self.extensions.first().map(|ext| ext.as_ref())
    }

    /// Case-insensitive membership check.
    pub fn matches(&self, extension: &str) -> bool {
        self.extensions().any(|ext| ext.eq_ignore_ascii_case(extension))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        assert_eq!(Extension::HTML.extensions().collect::<Vec<_>>(), ["html", "htm"]);
        assert_eq!(Extension::CSS.primary(), Some("css"));
    }

    #[test]
    fn test_custom_order_preserved() {
        let ext = Extension::new(["js", "css"]);
        assert_eq!(ext.extensions().collect::<Vec<_>>(), ["js", "css"]);
        assert!(ext.matches("CSS"));
        assert!(!ext.matches("html"));
    }

    #[test]
    fn test_empty_set_has_no_primary() {
        assert_eq!(Extension::new(Vec::<String>::new()).primary(), None);
    }

    #[test]
    fn test_runtime_extensions() {
        let configured = String::from("md,markdown");
        let ext = Extension::new(configured.split(',').map(str::to_owned));
        assert_eq!(ext.primary(), Some("md"));
        assert!(ext.matches("MARKDOWN"));
        assert_eq!(ext, Extension::new(["md", "markdown"]));
    }
}
