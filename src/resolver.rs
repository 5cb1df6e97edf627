//! Single-URL rewriting policy.
//!
//! Given one URL, the rewrite settings and the site's own base URL, decide
//! where the URL should point. Rules are tried in order and the first match
//! wins:
//!
//! | Input | Result |
//! |-------|--------|
//! | redirect disabled, or no production URL | unchanged |
//! | empty string or `data:` URI | unchanged |
//! | already starts with the production base | unchanged |
//! | protocol-relative (`//host/...`) | production base + path if `host` is ours, else unchanged |
//! | does not start with `http` | production base + `/` + path |
//! | starts with the local base URL, on a path boundary | production base + remainder |
//! | anything else (third-party host) | unchanged |
//!
//! The "is it absolute" check is a plain string-prefix test for `http`, not
//! a URI parse. Anything that does not start with it (and is not
//! protocol-relative) is treated as a path on the current site.
//!
//! Every rule is idempotent: feeding a rewritten URL back in matches the
//! production-base row.

use crate::types::RewriteConfig;

/// Rewrite `url` so it points at the production host.
///
/// `local_base_url` is the current site's own base URL (e.g.
/// `https://mysite.local`). It is only used to recognise absolute URLs that
/// still point at this site. Never fails; when in doubt the input comes back
/// unchanged.
pub fn resolve(url: &str, config: &RewriteConfig, local_base_url: &str) -> String {
    if !config.should_redirect() || url.is_empty() || is_data_uri(url) {
        return url.to_string();
    }

    let production = config.production_base();

    if url.starts_with(production) {
        return url.to_string();
    }

    let local = local_base_url.trim_end_matches('/');

    if let Some(rest) = url.strip_prefix("//") {
        return match strip_scheme(local).and_then(|host| strip_base(rest, host)) {
            Some(path) => format!("{production}{path}"),
            None => url.to_string(),
        };
    }

    if !url.starts_with("http") {
        let path = url.strip_prefix('/').unwrap_or(url);
        return format!("{production}/{path}");
    }

    if !local.is_empty() {
        if let Some(path) = strip_base(url, local) {
            return format!("{production}{path}");
        }
    }

    url.to_string()
}

/// Strip `base` from the front of `url`, but only on a path boundary so that
/// `https://site.test` does not claim `https://site.testing/...`.
fn strip_base<'a>(url: &'a str, base: &str) -> Option<&'a str> {
    url.strip_prefix(base)
        .filter(|rest| rest.is_empty() || rest.starts_with(['/', '?', '#']))
}

pub(crate) fn is_data_uri(url: &str) -> bool {
    url.get(..5)
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("data:"))
}

/// `https://host/path` → `host/path`. `None` if there is no scheme.
fn strip_scheme(url: &str) -> Option<&str> {
    url.split_once("://")
        .map(|(_, rest)| rest)
        .filter(|rest| !rest.is_empty())
}
