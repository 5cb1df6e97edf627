//! Rewriters for the structured image references the host hands out.
//!
//! Each adapter changes only the field that holds a URL and passes every
//! other field through untouched.

use crate::resolver::resolve;
use crate::scanner::rewrite_srcset;
use crate::types::{ImageAttributes, ImageSize, RewriteConfig};

/// Rewrite an attachment's URL.
pub fn rewrite_attachment_url(url: &str, config: &RewriteConfig, local_base_url: &str) -> String {
    if !config.should_redirect() {
        return url.to_string();
    }
    resolve(url, config, local_base_url)
}

/// Rewrite the URL slot of an image-size descriptor.
///
/// The host passes `None` when it has no descriptor for the requested size;
/// that comes back as `None`.
pub fn rewrite_image_size(
    image: Option<ImageSize>,
    config: &RewriteConfig,
    local_base_url: &str,
) -> Option<ImageSize> {
    let mut image = image?;
    if config.should_redirect() {
        image.0 = resolve(&image.0, config, local_base_url);
    }
    Some(image)
}

/// Rewrite `src` and `srcset` in an attribute map. Other keys and the key
/// order are left alone.
pub fn rewrite_attributes(
    mut attrs: ImageAttributes,
    config: &RewriteConfig,
    local_base_url: &str,
) -> ImageAttributes {
    if !config.should_redirect() {
        return attrs;
    }

    if let Some(src) = attrs.get_mut("src") {
        *src = resolve(src, config, local_base_url);
    }
    if let Some(srcset) = attrs.get_mut("srcset") {
        *srcset = rewrite_srcset(srcset, config, local_base_url);
    }
    attrs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;

    #[test]
    fn attachment_url_is_resolved() {
        assert_eq!(
            rewrite_attachment_url("https://local.test/uploads/a.jpg", &prod(), LOCAL),
            on_prod("/uploads/a.jpg")
        );
    }

    #[test]
    fn attachment_url_disabled() {
        assert_eq!(
            rewrite_attachment_url("/uploads/a.jpg", &switched_off(), LOCAL),
            "/uploads/a.jpg"
        );
    }

    #[test]
    fn image_size_only_url_changes() {
        let image = ImageSize("/uploads/a-300x200.jpg".into(), 300, 200, true);
        assert_eq!(
            rewrite_image_size(Some(image), &prod(), LOCAL),
            Some(ImageSize(on_prod("/uploads/a-300x200.jpg"), 300, 200, true))
        );
    }

    #[test]
    fn image_size_absent_stays_absent() {
        assert_eq!(rewrite_image_size(None, &prod(), LOCAL), None);
    }

    #[test]
    fn image_size_disabled() {
        let image = ImageSize("/a.jpg".into(), 10, 10, false);
        assert_eq!(
            rewrite_image_size(Some(image.clone()), &switched_off(), LOCAL),
            Some(image)
        );
    }

    #[test]
    fn attributes_src_and_srcset() {
        let attrs: ImageAttributes = [
            ("class", "attachment-large"),
            ("src", "/a.jpg"),
            ("srcset", "/a.jpg 1024w,/a-300.jpg 300w"),
            ("alt", "/not-a-url-but-untouched"),
        ]
        .into_iter()
        .collect();

        let out = rewrite_attributes(attrs, &prod(), LOCAL);

        assert_eq!(out.get("src"), Some("https://prod.com/a.jpg"));
        assert_eq!(
            out.get("srcset"),
            Some("https://prod.com/a.jpg 1024w, https://prod.com/a-300.jpg 300w")
        );
        assert_eq!(out.get("alt"), Some("/not-a-url-but-untouched"));
        let keys: Vec<&str> = out.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["class", "src", "srcset", "alt"]);
    }

    #[test]
    fn attributes_without_src_are_unchanged() {
        let attrs: ImageAttributes = [("alt", "x"), ("sizes", "100vw")].into_iter().collect();
        assert_eq!(rewrite_attributes(attrs.clone(), &prod(), LOCAL), attrs);
    }

    #[test]
    fn attributes_disabled() {
        let attrs: ImageAttributes = [("src", "/a.jpg")].into_iter().collect();
        assert_eq!(
            rewrite_attributes(attrs.clone(), &switched_off(), LOCAL),
            attrs
        );
    }
}
