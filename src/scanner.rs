//! Finds image references in HTML/CSS text and rewrites them in place.
//!
//! ## Passes
//!
//! The pattern scanner makes two independent left-to-right passes over the
//! input:
//!
//! 1. **Tag pass**: every `<img ... src="..." ...>` tag. The `src` value is
//!    resolved and any `srcset` attribute in the same tag has each candidate
//!    URL resolved, descriptors preserved.
//! 2. **Background pass**: every `style="..."` attribute whose value declares
//!    `background-image: url(...)`. Every `url(...)` in that style value is
//!    resolved, whatever property it belongs to.
//!
//! The passes look at disjoint attributes (`src`/`srcset` vs `style`), so a
//! `style` on an `<img>` is only ever touched by the background pass.
//!
//! ## Not a parser
//!
//! Matching is done with regular expressions. Content filters get fragments
//! (an excerpt, a widget body, half a template) that an HTML parser would
//! "repair" on the way through. The scanner only acts on text it recognises
//! and leaves everything else byte-for-byte as it was:
//!
//! - a tag that does not match the expected shape is skipped entirely
//! - an attribute whose URLs all resolve to themselves is emitted verbatim
//! - a match never spans more than one tag (`[^>]` bounds every region)
//!
//! Quoted attribute values are not tracked by the tag pattern. A literal
//! `src="..."` inside another attribute's value (`alt='see src="/x.jpg"'`)
//! is taken as the tag's `src`, and the real `src` after it is left as is.
//!
//! Attribute values are entity-decoded before their URLs are resolved and
//! re-encoded afterwards with the quote character they were written with,
//! so `&amp;` in a query string is neither lost nor double-encoded.
//!
//! ## Swapping implementations
//!
//! Callers go through the [`ContentScanner`] trait. [`PatternScanner`] is the
//! only implementation; a tokenizer-based one can replace it without touching
//! the hooks that drive it.

use crate::resolver::{is_data_uri, resolve};
use crate::types::{RewriteConfig, SrcsetEntry};
use regex::{Captures, Regex};
use std::borrow::Cow;
use std::sync::LazyLock;
use tracing::debug;

/// Rewrites every image reference found in a blob of markup.
pub trait ContentScanner: Sync {
    /// Return `content` with every recognised image URL passed through
    /// [`resolve`]. Must return the input unchanged when
    /// `config.should_redirect()` is false.
    fn scan(&self, content: &str, config: &RewriteConfig, local_base_url: &str) -> String;
}

/// Regex-driven [`ContentScanner`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternScanner;

impl ContentScanner for PatternScanner {
    fn scan(&self, content: &str, config: &RewriteConfig, local_base_url: &str) -> String {
        scan_content(content, config, local_base_url)
    }
}

// `<img`, then the attributes before `src` (ending in whitespace so that
// `data-src` is not mistaken for `src`), the quoted `src` value, and the rest
// of the tag up to the first `>`.
static IMG_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)<(?P<tag>img)(?P<before>\s(?:[^>]*?\s)?)(?P<attr>src)=(?:"(?P<dq>[^"]+)"|'(?P<sq>[^']+)')(?P<after>[^>]*)>"#,
    )
    .expect("BUG: hardcoded <img> pattern is invalid")
});

static SRCSET_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(?P<lead>^|\s)(?P<attr>srcset)=(?:"(?P<dq>[^"]+)"|'(?P<sq>[^']+)')"#)
        .expect("BUG: hardcoded srcset pattern is invalid")
});

static STYLE_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(?P<lead>^|\s)(?P<attr>style)=(?:"(?P<dq>[^"]*)"|'(?P<sq>[^']*)')"#)
        .expect("BUG: hardcoded style pattern is invalid")
});

static BACKGROUND_IMAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)background-image\s*:\s*url\(")
        .expect("BUG: hardcoded background-image pattern is invalid")
});

static CSS_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)(?P<open>url\(\s*["']?)(?P<url>[^)"'\s]+)(?P<close>["']?\s*\))"#,
    )
    .expect("BUG: hardcoded url() pattern is invalid")
});

/// Rewrite every image reference in `content`.
///
/// When redirection is off the input is returned without running a single
/// pattern over it.
pub fn scan_content(content: &str, config: &RewriteConfig, local_base_url: &str) -> String {
    if !config.should_redirect() {
        return content.to_string();
    }

    let rewriter = Rewriter {
        config,
        local_base_url,
    };
    let content = rewriter.rewrite_img_tags(content);
    rewriter.rewrite_backgrounds(&content).into_owned()
}

/// Rewrite every candidate URL in a `srcset` value.
///
/// Entries are split on `,`, trimmed, resolved, and joined back with `", "`.
/// Descriptors (`800w`, `2x`) are kept as written. Empty entries left by stray
/// commas are dropped.
pub fn rewrite_srcset(srcset: &str, config: &RewriteConfig, local_base_url: &str) -> String {
    if !config.should_redirect() {
        return srcset.to_string();
    }

    Rewriter {
        config,
        local_base_url,
    }
    .rewrite_srcset_value(srcset)
}

/// Split a `srcset` value into its candidates.
///
/// Candidates are separated by commas. A `data:` URI carries a comma of its
/// own, so it runs up to the next whitespace instead.
///
/// ```
/// use image_redirector::scanner::parse_srcset;
///
/// let entries = parse_srcset("a.jpg 1x,  b.jpg 2x");
/// assert_eq!(entries[1].url, "b.jpg");
/// assert_eq!(entries[1].descriptor.as_deref(), Some("2x"));
/// ```
pub fn parse_srcset(srcset: &str) -> Vec<SrcsetEntry> {
    let mut entries = Vec::new();
    let mut rest = srcset;

    loop {
        rest = rest.trim_start_matches(|c: char| c == ',' || c.is_whitespace());
        if rest.is_empty() {
            break;
        }

        let (url, tail) = if is_data_uri(rest) {
            let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
            let (url, tail) = rest.split_at(end);
            (url.trim_end_matches(','), tail)
        } else {
            let end = rest
                .find(|c: char| c == ',' || c.is_whitespace())
                .unwrap_or(rest.len());
            rest.split_at(end)
        };

        let end = tail.find(',').unwrap_or(tail.len());
        let descriptor = tail[..end].trim();
        entries.push(SrcsetEntry {
            url: url.to_string(),
            descriptor: (!descriptor.is_empty()).then(|| descriptor.to_string()),
        });
        rest = &tail[end..];
    }

    entries
}

struct Rewriter<'a> {
    config: &'a RewriteConfig,
    local_base_url: &'a str,
}

impl Rewriter<'_> {
    fn url(&self, url: &str) -> String {
        let resolved = resolve(url, self.config, self.local_base_url);
        if resolved != url {
            debug!(from = url, to = %resolved, "rewrote image url");
        }
        resolved
    }

    fn rewrite_srcset_value(&self, srcset: &str) -> String {
        parse_srcset(srcset)
            .into_iter()
            .map(|entry| {
                SrcsetEntry {
                    url: self.url(&entry.url),
                    descriptor: entry.descriptor,
                }
                .to_string()
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn rewrite_img_tags<'t>(&self, content: &'t str) -> Cow<'t, str> {
        IMG_TAG.replace_all(content, |caps: &Captures| self.rewrite_img_tag(caps))
    }

    fn rewrite_img_tag(&self, caps: &Captures) -> String {
        let before = self.rewrite_srcset_attrs(&caps["before"]);
        let after = self.rewrite_srcset_attrs(&caps["after"]);
        let src = QuotedValue::from_captures(caps);
        let resolved = src.map(|url| self.url(url));

        if matches!(before, Cow::Borrowed(_))
            && matches!(after, Cow::Borrowed(_))
            && resolved.is_none()
        {
            return caps[0].to_string();
        }

        let src_attr = match resolved {
            Some(value) => format!("{}={}", &caps["attr"], value),
            None => format!("{}={}", &caps["attr"], src.raw()),
        };
        format!("<{}{}{}{}>", &caps["tag"], before, src_attr, after)
    }

    fn rewrite_srcset_attrs<'t>(&self, attrs: &'t str) -> Cow<'t, str> {
        SRCSET_ATTR.replace_all(attrs, |caps: &Captures| {
            let value = QuotedValue::from_captures(caps);
            match value.map(|srcset| self.rewrite_srcset_value(srcset)) {
                Some(rewritten) => format!("{}{}={}", &caps["lead"], &caps["attr"], rewritten),
                None => caps[0].to_string(),
            }
        })
    }

    fn rewrite_backgrounds<'t>(&self, content: &'t str) -> Cow<'t, str> {
        STYLE_ATTR.replace_all(content, |caps: &Captures| {
            let style = QuotedValue::from_captures(caps);
            let rewritten = style.map(|css| {
                if !BACKGROUND_IMAGE.is_match(css) {
                    return css.to_string();
                }
                CSS_URL
                    .replace_all(css, |url: &Captures| {
                        format!("{}{}{}", &url["open"], self.url(&url["url"]), &url["close"])
                    })
                    .into_owned()
            });
            match rewritten {
                Some(style) => format!("{}{}={}", &caps["lead"], &caps["attr"], style),
                None => caps[0].to_string(),
            }
        })
    }
}

/// A quoted attribute value as written in the markup.
#[derive(Clone, Copy)]
struct QuotedValue<'t> {
    raw: &'t str,
    quote: char,
}

impl<'t> QuotedValue<'t> {
    /// Build from the `dq`/`sq` alternation every attribute pattern uses.
    fn from_captures(caps: &Captures<'t>) -> Self {
        match (caps.name("dq"), caps.name("sq")) {
            (Some(m), _) => QuotedValue {
                raw: m.as_str(),
                quote: '"',
            },
            (None, Some(m)) => QuotedValue {
                raw: m.as_str(),
                quote: '\'',
            },
            // Every pattern here requires one of the two alternatives.
            (None, None) => QuotedValue { raw: "", quote: '"' },
        }
    }

    /// The value exactly as it appeared, quotes included.
    fn raw(&self) -> String {
        format!("{q}{}{q}", self.raw, q = self.quote)
    }

    /// Decode entities, apply `f`, and re-encode for the same quote style.
    ///
    /// Returns `None` when `f` leaves the decoded value unchanged, so the
    /// caller can keep the original bytes.
    fn map(&self, f: impl FnOnce(&str) -> String) -> Option<String> {
        let decoded = html_escape::decode_html_entities(self.raw);
        let rewritten = f(&decoded);
        if rewritten == decoded {
            return None;
        }
        let encoded = match self.quote {
            '\'' => html_escape::encode_single_quoted_attribute(&rewritten),
            _ => html_escape::encode_double_quoted_attribute(&rewritten),
        };
        Some(format!("{q}{encoded}{q}", q = self.quote))
    }
}
