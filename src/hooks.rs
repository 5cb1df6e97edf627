//! Extension points the host wires into its own event system.
//!
//! The host decides *when* an image reference is about to be emitted; this
//! module says *what* to call for each of those moments. [`Hook`] lists the
//! interception points by the event name the host fires, and [`Redirector`]
//! binds one configuration to the functions behind them.
//!
//! ```
//! use image_redirector::hooks::Redirector;
//! use image_redirector::types::RewriteConfig;
//!
//! let redirector = Redirector::new(
//!     RewriteConfig::new(true, "https://example.com"),
//!     "http://example.local",
//! );
//! assert_eq!(
//!     redirector.attachment_url("http://example.local/uploads/a.jpg"),
//!     "https://example.com/uploads/a.jpg"
//! );
//! ```

use crate::attributes::{rewrite_attachment_url, rewrite_attributes, rewrite_image_size};
use crate::scanner::{ContentScanner, PatternScanner};
use crate::types::{ImageAttributes, ImageSize, RewriteConfig};
use std::fmt;

/// A host interception point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hook {
    /// A single attachment URL.
    AttachmentUrl,
    /// An attachment's `(url, width, height, is_intermediate)` descriptor.
    AttachmentImageSrc,
    /// The attribute map of a rendered attachment `<img>`.
    AttachmentImageAttributes,
    /// Post body HTML.
    Content,
    /// Text widget HTML.
    WidgetText,
}

/// What a hook receives and returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookKind {
    Url,
    ImageSize,
    Attributes,
    Content,
}

impl Hook {
    /// Every hook, in the order a host should register them.
    pub const ALL: [Hook; 5] = [
        Hook::AttachmentUrl,
        Hook::AttachmentImageSrc,
        Hook::AttachmentImageAttributes,
        Hook::Content,
        Hook::WidgetText,
    ];

    /// The event name the host fires for this hook.
    pub fn event_name(self) -> &'static str {
        match self {
            Hook::AttachmentUrl => "wp_get_attachment_url",
            Hook::AttachmentImageSrc => "wp_get_attachment_image_src",
            Hook::AttachmentImageAttributes => "wp_get_attachment_image_attributes",
            Hook::Content => "the_content",
            Hook::WidgetText => "widget_text",
        }
    }

    pub fn kind(self) -> HookKind {
        match self {
            Hook::AttachmentUrl => HookKind::Url,
            Hook::AttachmentImageSrc => HookKind::ImageSize,
            Hook::AttachmentImageAttributes => HookKind::Attributes,
            Hook::Content | Hook::WidgetText => HookKind::Content,
        }
    }

    /// Look a hook up by its host event name.
    pub fn from_event_name(name: &str) -> Option<Hook> {
        Hook::ALL.into_iter().find(|h| h.event_name() == name)
    }
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.event_name())
    }
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            HookKind::Url => "url",
            HookKind::ImageSize => "image size",
            HookKind::Attributes => "attributes",
            HookKind::Content => "content",
        };
        f.write_str(label)
    }
}

/// One configuration bound to every hook.
///
/// Holds no mutable state, so one instance can serve concurrent requests.
/// Build a new one whenever the settings change.
#[derive(Debug, Clone)]
pub struct Redirector<S = PatternScanner> {
    config: RewriteConfig,
    local_base_url: String,
    scanner: S,
}

impl Redirector<PatternScanner> {
    pub fn new(config: RewriteConfig, local_base_url: impl Into<String>) -> Self {
        Self::with_scanner(config, local_base_url, PatternScanner)
    }
}

impl<S: ContentScanner> Redirector<S> {
    pub fn with_scanner(
        config: RewriteConfig,
        local_base_url: impl Into<String>,
        scanner: S,
    ) -> Self {
        Self {
            config,
            local_base_url: local_base_url.into(),
            scanner,
        }
    }

    pub fn config(&self) -> &RewriteConfig {
        &self.config
    }

    pub fn local_base_url(&self) -> &str {
        &self.local_base_url
    }

    /// Whether any of the hooks will change anything.
    pub fn should_redirect(&self) -> bool {
        self.config.should_redirect()
    }

    /// [`Hook::AttachmentUrl`]
    pub fn attachment_url(&self, url: &str) -> String {
        rewrite_attachment_url(url, &self.config, &self.local_base_url)
    }

    /// [`Hook::AttachmentImageSrc`]
    pub fn attachment_image_src(&self, image: Option<ImageSize>) -> Option<ImageSize> {
        rewrite_image_size(image, &self.config, &self.local_base_url)
    }

    /// [`Hook::AttachmentImageAttributes`]
    pub fn attachment_image_attributes(&self, attrs: ImageAttributes) -> ImageAttributes {
        rewrite_attributes(attrs, &self.config, &self.local_base_url)
    }

    /// [`Hook::Content`]
    pub fn content(&self, html: &str) -> String {
        self.scan(html)
    }

    /// [`Hook::WidgetText`]
    pub fn widget_text(&self, html: &str) -> String {
        self.scan(html)
    }

    fn scan(&self, html: &str) -> String {
        if !self.should_redirect() {
            return html.to_string();
        }
        self.scanner.scan(html, &self.config, &self.local_base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use std::sync::Mutex;

    /// Scanner that records what it was asked to scan.
    #[derive(Default)]
    struct RecordingScanner {
        calls: Mutex<Vec<String>>,
    }

    impl ContentScanner for RecordingScanner {
        fn scan(&self, content: &str, _config: &RewriteConfig, _local: &str) -> String {
            self.calls.lock().unwrap().push(content.to_string());
            content.to_uppercase()
        }
    }

    #[test]
    fn event_names_round_trip() {
        for hook in Hook::ALL {
            assert_eq!(Hook::from_event_name(hook.event_name()), Some(hook));
        }
        assert_eq!(Hook::from_event_name("the_excerpt"), None);
    }

    #[test]
    fn content_hooks_share_kind() {
        assert_eq!(Hook::Content.kind(), HookKind::Content);
        assert_eq!(Hook::WidgetText.kind(), HookKind::Content);
        assert_eq!(Hook::AttachmentImageSrc.kind(), HookKind::ImageSize);
    }

    #[test]
    fn display_is_event_name() {
        assert_eq!(Hook::Content.to_string(), "the_content");
    }

    #[test]
    fn redirector_routes_every_hook() {
        let r = Redirector::new(prod(), LOCAL);
        assert_eq!(r.attachment_url("/a.jpg"), on_prod("/a.jpg"));
        assert_eq!(
            r.attachment_image_src(Some(ImageSize("/a.jpg".into(), 1, 2, false))),
            Some(ImageSize(on_prod("/a.jpg"), 1, 2, false))
        );
        let attrs: ImageAttributes = [("src", "/a.jpg")].into_iter().collect();
        assert_eq!(
            r.attachment_image_attributes(attrs).get("src"),
            Some(on_prod("/a.jpg").as_str())
        );
        assert_eq!(
            r.content(r#"<img src="/a.jpg">"#),
            r#"<img src="https://prod.com/a.jpg">"#
        );
        assert_eq!(
            r.widget_text(r#"<img src="/w.jpg">"#),
            r#"<img src="https://prod.com/w.jpg">"#
        );
    }

    #[test]
    fn content_goes_through_the_scanner_seam() {
        let r = Redirector::with_scanner(prod(), LOCAL, RecordingScanner::default());
        assert_eq!(r.content("<p>x</p>"), "<P>X</P>");
        assert_eq!(r.widget_text("w"), "W");
        assert_eq!(*r.scanner.calls.lock().unwrap(), vec!["<p>x</p>", "w"]);
    }

    #[test]
    fn disabled_redirector_never_calls_the_scanner() {
        let r = Redirector::with_scanner(switched_off(), LOCAL, RecordingScanner::default());
        assert_eq!(r.content("<p>x</p>"), "<p>x</p>");
        assert!(r.scanner.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn redirector_is_shareable_across_threads() {
        let r = Redirector::new(prod(), LOCAL);
        std::thread::scope(|s| {
            for i in 0..4 {
                let r = &r;
                s.spawn(move || {
                    let html = format!(r#"<img src="/{i}.jpg">"#);
                    assert_eq!(
                        r.content(&html),
                        format!(r#"<img src="https://prod.com/{i}.jpg">"#)
                    );
                });
            }
        });
    }
}
