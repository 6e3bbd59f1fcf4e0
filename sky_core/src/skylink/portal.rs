//! Portal URLs for skylinks, the inverse of [`super::parse_skylink`].

use serde::{Deserialize, Serialize};
use url::Url;

use super::{ParseError, ParsedSkylink};

/// Query parameter asking a portal to serve content as a download.
const ATTACHMENT_QUERY: &str = "attachment=true";

/// Options for [`get_skylink_url_for_portal`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkylinkUrlOptions {
    /// Put the base32 skylink in a subdomain of the portal host instead of
    /// the base64 skylink in the path.
    pub subdomain: bool,
    /// Add `attachment=true` so the portal serves the content as a download.
    pub download: bool,
}

/// Builds the URL under which `portal_url` serves `skylink`, including its
/// path suffix and query.
///
/// Characters that are not valid in a URL path are percent-encoded.
pub fn get_skylink_url_for_portal(
    portal_url: &str,
    skylink: &ParsedSkylink,
    options: &SkylinkUrlOptions,
) -> Result<Url, ParseError> {
    let mut url = parse_portal_url(portal_url)?;
    let suffix = skylink.path().unwrap_or_default();

    if options.subdomain {
        let host = format!(
            "{}.{}",
            skylink.skylink().to_base32(),
            url.host_str().unwrap_or_default()
        );
        url.set_host(Some(&host))
            .map_err(|_| ParseError::InvalidPortalUrl(portal_url.to_owned()))?;
        url.set_path(suffix);
    } else {
        let base = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{base}/{}{suffix}", skylink.skylink().to_base64()));
    }

    let query = match (skylink.query(), options.download) {
        (Some(query), true) => Some(format!("{query}&{ATTACHMENT_QUERY}")),
        (Some(query), false) => Some(query.to_owned()),
        (None, true) => Some(ATTACHMENT_QUERY.to_owned()),
        (None, false) => None,
    };
    url.set_query(query.as_deref());
    url.set_fragment(None);

    Ok(url)
}

/// Parses a portal base URL such as `https://siasky.net`. It must have a host.
pub(crate) fn parse_portal_url(portal_url: &str) -> Result<Url, ParseError> {
    match Url::parse(portal_url.trim()) {
        Ok(url) if url.has_host() && !url.cannot_be_a_base() => Ok(url),
        _ => Err(ParseError::InvalidPortalUrl(portal_url.to_owned())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ParseSkylinkOptions, Skylink, parse_skylink};

    const SKYLINK: &str = "XABvi7JtJbQSMAcDwnUnmp2FKDPjg8_tTTFP4BwMSxVdEg";
    const SKYLINK_BASE32: &str = "bg06v2tidkir84hg0s1s4t97jaeoaa1jse1svrad657u070c9calq4g";
    const PORTAL: &str = "https://siasky.net";

    fn skylink() -> ParsedSkylink {
        SKYLINK.parse::<Skylink>().unwrap().into()
    }

    fn subdomain() -> SkylinkUrlOptions {
        SkylinkUrlOptions {
            subdomain: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_path_style_url() {
        let url = get_skylink_url_for_portal(PORTAL, &skylink(), &Default::default()).unwrap();
        assert_eq!(url.as_str(), format!("https://siasky.net/{SKYLINK}"));

        let linked = skylink().with_path("dir/file.txt").with_query("?a=b");
        let url = get_skylink_url_for_portal("https://siasky.net/", &linked, &Default::default())
            .unwrap();
        assert_eq!(
            url.as_str(),
            format!("https://siasky.net/{SKYLINK}/dir/file.txt?a=b")
        );
    }

    #[test]
    fn test_subdomain_style_url() {
        let url = get_skylink_url_for_portal(PORTAL, &skylink(), &subdomain()).unwrap();
        assert_eq!(url.as_str(), format!("https://{SKYLINK_BASE32}.siasky.net/"));

        let linked = skylink().with_path("/dir/file.txt/");
        let url = get_skylink_url_for_portal("http://localhost:9980", &linked, &subdomain())
            .unwrap();
        assert_eq!(
            url.as_str(),
            format!("http://{SKYLINK_BASE32}.localhost:9980/dir/file.txt")
        );
    }

    #[test]
    fn test_download_query() {
        let options = SkylinkUrlOptions {
            download: true,
            ..Default::default()
        };
        let url = get_skylink_url_for_portal(PORTAL, &skylink(), &options).unwrap();
        assert_eq!(url.query(), Some("attachment=true"));

        let linked = skylink().with_query("format=zip");
        let url = get_skylink_url_for_portal(PORTAL, &linked, &options).unwrap();
        assert_eq!(url.query(), Some("format=zip&attachment=true"));
    }

    #[test]
    fn test_urls_parse_back() {
        let linked = skylink().with_path("dir/file.txt").with_query("a=b&c=d");

        let url = get_skylink_url_for_portal(PORTAL, &linked, &Default::default()).unwrap();
        assert_eq!(
            parse_skylink(url.as_str(), &ParseSkylinkOptions::default()).unwrap(),
            linked
        );

        let url = get_skylink_url_for_portal(PORTAL, &linked, &subdomain()).unwrap();
        let options = ParseSkylinkOptions {
            from_subdomain: true,
            ..Default::default()
        };
        assert_eq!(parse_skylink(url.as_str(), &options).unwrap(), linked);
    }

    #[test]
    fn test_portal_url_needs_host() {
        for portal in ["", "siasky.net", "sia:foo", "not a url"] {
            assert_eq!(
                get_skylink_url_for_portal(portal, &skylink(), &Default::default()),
                Err(ParseError::InvalidPortalUrl(portal.to_owned())),
                "{portal}"
            );
        }
    }
}
