//! # Image Redirector
//!
//! Rewrites image references in HTML so that a local or staging copy of a
//! site loads its images from production. Useful when the database has been
//! copied down but the (large) uploads directory has not.
//!
//! ```text
//! /wp-content/uploads/2024/01/image.jpg
//!     → https://example.com/wp-content/uploads/2024/01/image.jpg
//! http://example.local/wp-content/uploads/a.jpg
//!     → https://example.com/wp-content/uploads/a.jpg
//! https://cdn.other.net/a.jpg
//!     → unchanged
//! ```
//!
//! This is a reference rewrite, not a proxy: nothing is fetched, and the
//! production host is never contacted.
//!
//! # Architecture
//!
//! Two layers, leaves first:
//!
//! ```text
//! resolver   one URL + settings → one URL
//! scanner    HTML/CSS text → same text with every image URL resolved
//! ```
//!
//! Everything else is plumbing around them. The host system owns the event
//! dispatch and the settings store; it calls into [`hooks::Redirector`]
//! whenever it is about to emit an image reference.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`resolver`] | Per-URL policy: relative join, local-host swap, pass-through |
//! | [`scanner`] | Finds `<img src>`, `srcset` and `background-image: url()` in markup |
//! | [`attributes`] | Attachment URL, image-size tuple and attribute-map adapters |
//! | [`hooks`] | Named extension points and the [`hooks::Redirector`] that serves them |
//! | [`types`] | Shared value types (`RewriteConfig`, `SrcsetEntry`, `ImageSize`, `ImageAttributes`) |
//! | [`config`] | `config.toml` loading, layering with CLI flags, validation |
//! | [`batch`] | Parallel in-place rewriting of HTML files |
//! | [`output`] | CLI output formatting |
//! | [`logging`] | `tracing` subscriber setup |
//!
//! # Design Decisions
//!
//! ## Never Fail, Never Break the Page
//!
//! These functions run inside a rendering pipeline. A rewrite that cannot be
//! done confidently is simply not done: the core has no error type and no
//! panics, and the smallest unit in doubt (one tag, one `srcset` entry, one
//! field) comes back unchanged while the rest of the input is still
//! processed. The worst case is an image that still points at the local
//! host.
//!
//! ## Patterns, Not a DOM
//!
//! Content filters see fragments, not documents. A real HTML parser would
//! normalise or "repair" the markup it does not touch; the regex scanner
//! leaves every byte outside a recognised image attribute exactly as it was.
//! It sits behind the [`scanner::ContentScanner`] trait so a tokenizer can
//! replace it later without changing any caller.
//!
//! ## Configuration Is Passed In
//!
//! No global state: every rewrite function takes a [`types::RewriteConfig`]
//! and the local base URL as arguments. A [`hooks::Redirector`] is a plain
//! value that can be shared across threads or rebuilt per request.

pub mod attributes;
pub mod batch;
pub mod config;
pub mod hooks;
pub mod logging;
pub mod output;
pub mod resolver;
pub mod scanner;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
