use anyhow::Result;
use sky_core::{ParseSkylinkOptions, ParsedSkylink, Skylink, parse_skylink};

pub fn run_parse(input: &str, options: &ParseSkylinkOptions) -> Result<()> {
    let parsed = parse_skylink(input, options)?;
    print!("{}", describe(&parsed));
    Ok(())
}

/// Human readable summary of a parsed skylink, one `key: value` per line.
fn describe(parsed: &ParsedSkylink) -> String {
    let skylink = parsed.skylink();
    let mut fields = vec![
        ("skylink", skylink.to_base64()),
        ("base32", skylink.to_base32()),
        ("version", skylink.version().to_string()),
    ];
    match skylink {
        Skylink::V1(v1) => {
            fields.push(("root", v1.merkle_root().to_string()));
            fields.push(("offset", v1.offset().to_string()));
            fields.push(("fetch", v1.fetch_size().to_string()));
        }
        Skylink::V2(v2) => fields.push(("entry id", v2.entry_id().to_string())),
    }
    if let Some(path) = parsed.path() {
        fields.push(("path", path.to_owned()));
    }
    if let Some(query) = parsed.query() {
        fields.push(("query", query.to_owned()));
    }

    fields
        .into_iter()
        .map(|(key, value)| format!("{:<10}{value}\n", format!("{key}:")))
        .collect()
}
