//! Extracting skylinks from user input and URLs.
//!
//! Accepted shapes, path style:
//!
//! ```text
//! <skylink>                       sia:<skylink>          sia://<skylink>
//! /<skylink>/path/to/file         https://portal.net/<skylink>/path?query#fragment
//! ```
//!
//! and subdomain style (`from_subdomain`), where the token is base32:
//!
//! ```text
//! https://<skylink>.portal.net/path?query
//! ```

use serde::{Deserialize, Serialize};
use url::Url;

use super::{BASE32_ENCODED_SKYLINK_SIZE, ParseError, Skylink, format::decode_token};

/// URI scheme for skylinks, e.g. `sia://<skylink>`.
pub const URI_SKYNET_PREFIX: &str = "sia:";

/// Options for [`parse_skylink`].
///
/// All options default to `false`, which accepts any path-style input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseSkylinkOptions {
    /// Read a base32 skylink from the first hostname label instead of the
    /// first path segment.
    pub from_subdomain: bool,
    /// Reject inputs with a path suffix or a query string.
    pub only_root: bool,
}

/// A skylink together with what followed it in the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSkylink {
    skylink: Skylink,
    path: Option<String>,
    query: Option<String>,
}

impl ParsedSkylink {
    /// Appends a path suffix. A missing leading `/` is added, trailing
    /// slashes are dropped and an empty path means none.
    pub fn with_path(mut self, path: &str) -> Self {
        let path = path.trim_start_matches('/').trim_end_matches('/');
        self.path = (!path.is_empty()).then(|| format!("/{path}"));
        self
    }

    /// Sets the query string, with or without its leading `?`.
    pub fn with_query(mut self, query: &str) -> Self {
        self.query = non_empty(Some(query.strip_prefix('?').unwrap_or(query)));
        self
    }

    pub fn skylink(&self) -> &Skylink {
        &self.skylink
    }

    pub fn into_skylink(self) -> Skylink {
        self.skylink
    }

    /// Path after the skylink, with a leading `/` and without trailing slashes.
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Query string without the leading `?`.
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// The base64 skylink followed by its path, e.g. `<skylink>/dir/file.txt`.
    pub fn skylink_with_path(&self) -> String {
        let mut out = self.skylink.to_base64();
        if let Some(path) = &self.path {
            out.push_str(path);
        }
        out
    }
}

impl From<Skylink> for ParsedSkylink {
    fn from(skylink: Skylink) -> Self {
        Self {
            skylink,
            path: None,
            query: None,
        }
    }
}

/// Extracts and validates the skylink in `input`.
///
/// Path-style inputs may carry the `sia:` scheme or any `scheme://authority`
/// prefix; the token after it may be base64 or base32. Fragments are
/// dropped.
pub fn parse_skylink(
    input: &str,
    options: &ParseSkylinkOptions,
) -> Result<ParsedSkylink, ParseError> {
    let parsed = if options.from_subdomain {
        parse_from_subdomain(input)
    } else {
        parse_from_path(input)
    };

    let parsed = match parsed {
        Ok(parsed) => parsed,
        Err(err) => {
            tracing::trace!(input, %err, "skylink parse failed");
            return Err(err);
        }
    };

    if options.only_root && (parsed.path.is_some() || parsed.query.is_some()) {
        tracing::debug!(input, "rejecting skylink with path or query");
        return Err(ParseError::DisallowedForm(input.to_owned()));
    }

    Ok(parsed)
}

fn parse_from_path(input: &str) -> Result<ParsedSkylink, ParseError> {
    let trimmed = input.trim();

    let (path_part, query) = if let Some(after) =
        strip_prefix_ignore_ascii_case(trimmed, URI_SKYNET_PREFIX)
    {
        split_query(after.strip_prefix("//").unwrap_or(after))
    } else {
        match Url::parse(trimmed) {
            Ok(url) if url.has_host() => split_query(after_authority(trimmed)),
            _ => split_query(trimmed),
        }
    };

    let path_part = path_part.strip_prefix('/').unwrap_or(&path_part);
    let path_part = path_part.trim_end_matches('/');

    let (token, path) = match path_part.split_once('/') {
        Some((token, path)) => (token, Some(format!("/{path}"))),
        None => (path_part, None),
    };
    if token.is_empty() {
        return Err(ParseError::NoSkylink(input.to_owned()));
    }

    Ok(ParsedSkylink {
        skylink: decode_token(token)?,
        path,
        query,
    })
}

fn parse_from_subdomain(input: &str) -> Result<ParsedSkylink, ParseError> {
    let trimmed = input.trim();
    let url = if trimmed.contains("://") {
        Url::parse(trimmed)
    } else {
        Url::parse(&format!("https://{trimmed}"))
    }
    .map_err(|_| ParseError::NoSkylink(input.to_owned()))?;

    let label = url
        .host_str()
        .and_then(|host| host.split('.').next())
        .unwrap_or_default();
    if label.len() != BASE32_ENCODED_SKYLINK_SIZE {
        return Err(ParseError::NoSkylink(input.to_owned()));
    }
    let skylink = decode_token(label)?;

    let (path_part, query) = split_query(after_authority(trimmed));
    let path_part = path_part.trim_end_matches('/');
    let path = (!path_part.is_empty()).then(|| path_part.to_owned());

    Ok(ParsedSkylink {
        skylink,
        path,
        query,
    })
}

fn strip_prefix_ignore_ascii_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &s[prefix.len()..])
}

/// The input after `scheme://authority`, exactly as written.
///
/// `Url::path` is normalized (percent-encoding, dot segments), so the path
/// suffix is taken from the raw text instead.
fn after_authority(s: &str) -> &str {
    let rest = s.split_once("://").map_or(s, |(_, rest)| rest);
    let end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    &rest[end..]
}

fn non_empty(query: Option<&str>) -> Option<String> {
    query.filter(|query| !query.is_empty()).map(str::to_owned)
}

/// Drops any fragment and splits off a non-empty query string.
fn split_query(s: &str) -> (String, Option<String>) {
    let s = s.split_once('#').map_or(s, |(before, _)| before);
    match s.split_once('?') {
        Some((path, query)) => (path.to_owned(), non_empty(Some(query))),
        None => (s.to_owned(), None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SKYLINK: &str = "XABvi7JtJbQSMAcDwnUnmp2FKDPjg8_tTTFP4BwMSxVdEg";
    const SKYLINK_BASE32: &str = "bg06v2tidkir84hg0s1s4t97jaeoaa1jse1svrad657u070c9calq4g";

    fn parse(input: &str) -> Result<ParsedSkylink, ParseError> {
        parse_skylink(input, &ParseSkylinkOptions::default())
    }

    fn subdomain() -> ParseSkylinkOptions {
        ParseSkylinkOptions {
            from_subdomain: true,
            ..Default::default()
        }
    }

    fn only_root() -> ParseSkylinkOptions {
        ParseSkylinkOptions {
            only_root: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_basic_forms() {
        let expected: Skylink = SKYLINK.parse().unwrap();
        let prefixes = [
            "",
            "/",
            "sia:",
            "sia://",
            "SIA://",
            "https://siasky.net/",
            "http://localhost:9980/",
            "HTTPS://siasky.net/",
            "https://user@siasky.net:443/",
        ];
        let suffixes = ["", "/", "//", "#foobar", "/#foobar", "?"];

        for prefix in prefixes {
            for suffix in suffixes {
                let input = format!("{prefix}{SKYLINK}{suffix}");
                let parsed = parse(&input).unwrap_or_else(|e| panic!("{input}: {e}"));
                assert_eq!(parsed.skylink(), &expected, "{input}");
                assert_eq!(parsed.path(), None, "{input}");
                assert_eq!(parsed.query(), None, "{input}");
            }
        }
    }

    #[test]
    fn test_path_and_query() {
        let parsed = parse(&format!("https://siasky.net/{SKYLINK}/foo/bar.txt")).unwrap();
        assert_eq!(parsed.path(), Some("/foo/bar.txt"));
        assert_eq!(parsed.query(), None);
        assert_eq!(parsed.skylink_with_path(), format!("{SKYLINK}/foo/bar.txt"));

        let parsed = parse(&format!("sia://{SKYLINK}/foo/bar/")).unwrap();
        assert_eq!(parsed.path(), Some("/foo/bar"));

        let parsed = parse(&format!("https://siasky.net/{SKYLINK}?foo=bar&fizz=buzz")).unwrap();
        assert_eq!(parsed.path(), None);
        assert_eq!(parsed.query(), Some("foo=bar&fizz=buzz"));

        let parsed = parse(&format!("{SKYLINK}/a.txt?x=1#frag")).unwrap();
        assert_eq!(parsed.path(), Some("/a.txt"));
        assert_eq!(parsed.query(), Some("x=1"));
    }

    #[test]
    fn test_path_suffix_is_kept_verbatim() {
        let bare = parse(&format!("{SKYLINK}/foo bar.txt")).unwrap();
        let url = parse(&format!("https://siasky.net/{SKYLINK}/foo bar.txt")).unwrap();
        assert_eq!(bare.path(), Some("/foo bar.txt"));
        assert_eq!(url.path(), bare.path());

        let parsed = parse(&format!("https://siasky.net/{SKYLINK}/a/../b")).unwrap();
        assert_eq!(parsed.path(), Some("/a/../b"));

        let parsed = parse_skylink(
            &format!("https://{SKYLINK_BASE32}.siasky.net/foo%20bar/x y"),
            &subdomain(),
        )
        .unwrap();
        assert_eq!(parsed.path(), Some("/foo%20bar/x y"));
    }

    #[test]
    fn test_dot_segments_do_not_reach_the_token() {
        for input in [
            format!("https://siasky.net/x/../{SKYLINK}"),
            format!("https://siasky.net/./{SKYLINK}"),
        ] {
            assert!(parse(&input).is_err(), "{input}");
        }
    }

    #[test]
    fn test_base32_token_in_path() {
        let parsed = parse(&format!("https://siasky.net/{SKYLINK_BASE32}/dir")).unwrap();
        assert_eq!(parsed.skylink().to_base64(), SKYLINK);
        assert_eq!(parsed.path(), Some("/dir"));
    }

    #[test]
    fn test_subdomain_forms() {
        let expected: Skylink = SKYLINK.parse().unwrap();
        let inputs = [
            format!("https://{SKYLINK_BASE32}.siasky.net"),
            format!("https://{SKYLINK_BASE32}.siasky.net/"),
            format!("{SKYLINK_BASE32}.siasky.net"),
            format!("http://{SKYLINK_BASE32}.localhost:9980/"),
            format!("HTTPS://{}.SIASKY.NET", SKYLINK_BASE32.to_uppercase()),
        ];
        for input in inputs {
            let parsed = parse_skylink(&input, &subdomain()).unwrap();
            assert_eq!(parsed.skylink(), &expected, "{input}");
            assert_eq!(parsed.path(), None, "{input}");
        }

        let parsed = parse_skylink(
            &format!("https://{SKYLINK_BASE32}.siasky.net/foo/bar?a=b"),
            &subdomain(),
        )
        .unwrap();
        assert_eq!(parsed.path(), Some("/foo/bar"));
        assert_eq!(parsed.query(), Some("a=b"));
    }

    #[test]
    fn test_subdomain_requires_base32_label() {
        for input in [
            format!("https://siasky.net/{SKYLINK}"),
            format!("https://{SKYLINK}.siasky.net"),
            "https://siasky.net".to_owned(),
        ] {
            assert_eq!(
                parse_skylink(&input, &subdomain()),
                Err(ParseError::NoSkylink(input.clone()))
            );
        }
    }

    #[test]
    fn test_only_root() {
        assert!(parse_skylink(&format!("sia:{SKYLINK}"), &only_root()).is_ok());
        assert!(parse_skylink(&format!("https://siasky.net/{SKYLINK}/"), &only_root()).is_ok());

        for input in [format!("{SKYLINK}/foo"), format!("{SKYLINK}?a=b")] {
            assert_eq!(
                parse_skylink(&input, &only_root()),
                Err(ParseError::DisallowedForm(input.clone()))
            );
        }
    }

    #[test]
    fn test_invalid_inputs() {
        assert_eq!(parse(""), Err(ParseError::NoSkylink(String::new())));
        assert_eq!(
            parse("https://siasky.net/"),
            Err(ParseError::NoSkylink("https://siasky.net/".to_owned()))
        );
        assert_eq!(parse("abc"), Err(ParseError::InvalidTokenLength(3)));
        // a portal host without scheme is not a skylink position
        assert!(parse(&format!("siasky.net/{SKYLINK}")).is_err());
        // one character too many
        assert_eq!(
            parse(&format!("{SKYLINK}a")),
            Err(ParseError::InvalidTokenLength(47))
        );
    }

    #[test]
    fn test_unsupported_version_in_text() {
        use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};

        let mut raw = [0u8; 34];
        raw[0] = 0b10;
        let token = URL_SAFE_NO_PAD.encode(raw);
        assert_eq!(parse(&token), Err(ParseError::UnsupportedVersion(3)));
    }

    #[test]
    fn test_options_deserialize_with_defaults() {
        let options: ParseSkylinkOptions = serde_json::from_str(r#"{"only_root": true}"#).unwrap();
        assert_eq!(
            options,
            ParseSkylinkOptions {
                from_subdomain: false,
                only_root: true
            }
        );
    }
}
