//! Stream URL normalization and candidate protocol derivation.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::error::{CoreError, CoreResult};

/// Characters kept literal in a path: unreserved plus `/` and `%`.
const PATH_KEEP: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'/')
    .remove(b'%');

/// Characters kept literal in a query: unreserved plus `:`, `&` and `=`.
const QUERY_KEEP: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b':')
    .remove(b'&')
    .remove(b'=');

/// Percent-encodes the path and form-encodes the query of a URL that
/// contains non-ASCII characters. ASCII URLs are returned unchanged.
///
/// The scheme, host and fragment are left as they are.
pub fn normalize_url(url: &str) -> String {
    if url.is_ascii() {
        return url.to_string();
    }

    let (scheme, rest) = match url.split_once("://") {
        Some((scheme, rest)) => (Some(scheme), rest),
        None => (None, url),
    };
    let (rest, fragment) = match rest.split_once('#') {
        Some((rest, fragment)) => (rest, Some(fragment)),
        None => (rest, None),
    };
    let (rest, query) = match rest.split_once('?') {
        Some((rest, query)) => (rest, Some(query)),
        None => (rest, None),
    };
    let (netloc, path) = match (scheme, rest.find('/')) {
        (Some(_), Some(slash)) => rest.split_at(slash),
        (Some(_), None) => (rest, ""),
        (None, _) => ("", rest),
    };

    let mut fixed = String::with_capacity(url.len() * 3);
    if let Some(scheme) = scheme {
        fixed.push_str(scheme);
        fixed.push_str("://");
    }
    fixed.push_str(netloc);
    fixed.extend(utf8_percent_encode(path, PATH_KEEP));
    if let Some(query) = query.filter(|q| !q.is_empty()) {
        fixed.push('?');
        // '%' is always escaped here, so every %20 left came from a space
        let encoded = utf8_percent_encode(query, QUERY_KEEP).to_string();
        fixed.push_str(&encoded.replace("%20", "+"));
    }
    if let Some(fragment) = fragment.filter(|f| !f.is_empty()) {
        fixed.push('#');
        fixed.push_str(fragment);
    }
    fixed
}

/// Maps tunnelled variants onto their base protocol (`rtspt` -> `rtsp`,
/// `rtmpt` -> `rtmp`).
pub fn canonical_scheme(scheme: &str) -> String {
    scheme
        .to_ascii_lowercase()
        .replace("rtspt", "rtsp")
        .replace("rtmpt", "rtmp")
}

/// Candidate transports to race for a canonical scheme, in preference order.
pub fn candidate_schemes(scheme: &str) -> CoreResult<&'static [&'static str]> {
    match scheme {
        "rtmp" => Ok(&["rtmp"]),
        "http" => Ok(&["http", "mmsh"]),
        "mms" | "mmsh" | "mmst" | "rtsp" => Ok(&["rtsp", "mmsh"]),
        other => {
            log::warn!("Protocol {} not supported", other);
            Err(CoreError::UnsupportedProtocolScheme(other.to_string()))
        }
    }
}

/// Locator and input options to probe for one candidate transport.
///
/// rtmp gets librtmp's `live=1` hint appended to the URL and rtsp is forced
/// onto TCP, unless the caller already asked for something.
pub fn candidate_request(scheme: &str, rest: &str, input_options: &[String]) -> (String, Vec<String>) {
    let mut locator = format!("{scheme}://{rest}");
    let mut options = input_options.to_vec();
    match scheme {
        "rtmp" if !rest.contains("live=1") => locator.push_str(" live=1"),
        "rtsp" if !options.iter().any(|o| o == "-rtsp_transport") => {
            options.extend(["-rtsp_transport".to_string(), "tcp".to_string()]);
        }
        _ => {}
    }
    (locator, options)
}
