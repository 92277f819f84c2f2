//! URL and path manipulation utilities.
//!
//! This module provides the small URL primitives the link rewriter is built
//! on: protocol sniffing, query extraction from possibly-relative hrefs,
//! absolute URL resolution and in-archive media paths.

use lazy_static::lazy_static;
use regex::Regex;
use url::Url;

use super::constants::{DEFAULT_MEDIA_EXTENSION, MAX_MEDIA_FILENAME_LEN, URI_COMPONENT_MARKS};
use crate::error::RewriteError;

lazy_static! {
    // These patterns are hardcoded and syntactically valid.
    static ref SCHEME_RE: Regex = Regex::new(r"^([A-Za-z][A-Za-z0-9+.\-]*):")
        .expect("BUG: hardcoded scheme regex is invalid");

    /// `(dir/)(parent)(/)(NNNpx-)(stem)(.ext)(.ext)`: thumbnails live under a
    /// directory named after the original file, so either the parent segment
    /// or the file segment can carry the real name.
    static ref MEDIA_RE: Regex = Regex::new(
        r"^(.*/)([^/]+)(/)(\d+px-|)(.+?)(\.[A-Za-z0-9]{2,6}|)(\.[A-Za-z0-9]{2,6}|)$"
    )
    .expect("BUG: hardcoded media regex is invalid");
}

/// Extract the protocol of an href, lower-cased and with its trailing colon
/// (`"https:"`), or `None` for scheme-less hrefs.
///
/// # Errors
/// Returns [`RewriteError::MalformedUrl`] when the href carries a scheme but
/// does not parse as a URL.
pub fn href_protocol(href: &str) -> Result<Option<String>, RewriteError> {
    let Some(caps) = SCHEME_RE.captures(href) else {
        return Ok(None);
    };

    Url::parse(href).map_err(|e| RewriteError::MalformedUrl {
        href: href.to_string(),
        reason: e.to_string(),
    })?;

    Ok(Some(format!("{}:", caps[1].to_ascii_lowercase())))
}

/// Whether a protocol returned by [`href_protocol`] is `http:` or `https:`.
#[must_use]
pub fn is_http_protocol(protocol: &str) -> bool {
    matches!(protocol, "http:" | "https:")
}

/// Collect every value of a query parameter, in order of appearance.
///
/// Works on relative hrefs as well as absolute URLs. Values are
/// form-decoded (`+` is a space).
#[must_use]
pub fn query_values(href: &str, key: &str) -> Vec<String> {
    let without_fragment = href.split('#').next().unwrap_or_default();
    let Some((_, query)) = without_fragment.split_once('?') else {
        return Vec::new();
    };

    url::form_urlencoded::parse(query.as_bytes())
        .filter(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
        .collect()
}

/// Resolve an href against the site base URL.
pub fn get_full_url(href: &str, base_url: &Url) -> Result<String, url::ParseError> {
    base_url.join(href).map(String::from)
}

/// Relative path from the article `article_id` to `file_base` in `namespace`.
///
/// Articles live one directory below the archive root (`A/...`) plus one
/// level per `/` in their id.
#[must_use]
pub fn get_relative_file_path(article_id: &str, file_base: &str, namespace: &str) -> String {
    let slashes = article_id.matches('/').count();
    format!("{}{namespace}/{file_base}", "../".repeat(slashes + 1))
}

/// Percent-encode `text` as a URI component.
///
/// Besides `A-Z a-z 0-9 - _ . ~`, the marks in [`URI_COMPONENT_MARKS`] stay
/// unescaped.
#[must_use]
pub fn encode_uri_component(text: &str) -> String {
    let mut encoded = String::with_capacity(text.len());
    let mut buf = [0u8; 4];
    for ch in text.chars() {
        if URI_COMPONENT_MARKS.contains(&ch) {
            encoded.push(ch);
        } else {
            encoded.push_str(&urlencoding::encode(ch.encode_utf8(&mut buf)));
        }
    }
    encoded
}

/// Archive file name of a media URL.
///
/// Thumbnail prefixes (`220px-`) are dropped, the name is percent-encoded,
/// and names too long for common filesystems are replaced by a content hash
/// that keeps the extension.
///
/// # Errors
/// Returns [`RewriteError::UnresolvableMedia`] when the URL has no usable
/// file name.
pub fn get_media_base(href: &str) -> Result<String, RewriteError> {
    let unresolvable = |reason: &str| RewriteError::UnresolvableMedia {
        href: href.to_string(),
        reason: reason.to_string(),
    };

    let path = href
        .split(['?', '#'])
        .next()
        .unwrap_or_default();
    let decoded = urlencoding::decode(path).map_err(|e| unresolvable(&e.to_string()))?;

    let caps = MEDIA_RE
        .captures(&decoded)
        .ok_or_else(|| unresolvable("no file name in media URL"))?;

    // Thumbnails live in a directory named after the full file; a longer
    // directory name than the stem means the name is there.
    let parent_variant = &caps[2];
    let stem = &caps[5];
    let ext = if caps[6].is_empty() { DEFAULT_MEDIA_EXTENSION } else { &caps[6] };
    let file_variant = format!("{stem}{ext}{}", &caps[7]);
    let filename = if parent_variant.len() > stem.len() {
        parent_variant
    } else {
        file_variant.as_str()
    };

    let encoded = encode_uri_component(filename);
    if encoded.len() <= MAX_MEDIA_FILENAME_LEN {
        return Ok(encoded);
    }

    let kept_ext = filename.rfind('.').map_or("", |idx| &filename[idx..]);
    let hash = xxhash_rust::xxh3::xxh3_64(filename.as_bytes());
    log::trace!("Shortened media file name {filename} to hash {hash:016x}");
    Ok(format!("{hash:016x}{}", encode_uri_component(kept_ext)))
}
