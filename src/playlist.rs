//! Pure line-oriented transducer from the site's channel-list text to M3U.
//!
//! The input has two meaningful line kinds: genre headers
//! (`<name>,#genre#`) that set the group for everything after them, and
//! entries (`<name>,<url>`). Anything else is dropped silently; a junk line
//! in the middle of the list must not abort the whole transform.

use std::borrow::Cow;

/// Group assigned to entries that appear before any genre header.
pub const DEFAULT_GROUP: &str = "Other";

const GENRE_SUFFIX: &str = ",#genre#";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelEntry {
    pub name: String,
    pub url: String,
    pub group: String,
}

/// Display name for a source genre. Well-known headers lose their
/// `频道` suffix; anything unrecognized passes through unchanged.
pub fn display_group(name: &str) -> &str {
    match name {
        "央视频道" => "央视",
        "卫视频道" => "卫视",
        "地方频道" => "地方",
        "体育频道" => "体育",
        "影视频道" => "影视",
        "少儿频道" => "少儿",
        other => other,
    }
}

/// Classifies each line, carrying the current group from one entry to the
/// next. Order is preserved; no entry is dropped once parsed.
pub fn parse_channels(text: &str) -> Vec<ChannelEntry> {
    let mut group = DEFAULT_GROUP.to_string();
    let mut entries = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(declared) = line.strip_suffix(GENRE_SUFFIX) {
            group = display_group(declared.trim()).to_string();
            continue;
        }
        let Some((name, url)) = line.split_once(',') else {
            continue;
        };
        if name.is_empty() || !(url.starts_with("http://") || url.starts_with("https://")) {
            continue;
        }
        entries.push(ChannelEntry {
            name: name.to_string(),
            url: url.to_string(),
            group: group.clone(),
        });
    }

    entries
}

/// Serializes entries as M3U: one `#EXTINF` attribute line per channel,
/// followed by the raw URL. Attribute values are quote-sanitized; the
/// display name after the comma stays verbatim.
pub fn render_m3u(entries: &[ChannelEntry]) -> String {
    let mut out = String::from("#EXTM3U\n");
    for entry in entries {
        let name = sanitize_attr(&entry.name);
        let group = sanitize_attr(&entry.group);
        out.push_str(&format!(
            "#EXTINF:-1 tvg-id=\"{id}\" tvg-name=\"{name}\" tvg-logo=\"{logo}\" group-title=\"{group}\",{display}\n{url}\n",
            id = tvg_id(&name),
            logo = logo_url(&name),
            display = entry.name,
            url = entry.url,
        ));
    }
    out
}

/// The whole transform, as a single deterministic function of the input.
pub fn transcode(text: &str) -> String {
    render_m3u(&parse_channels(text))
}

/// Double quotes would terminate the surrounding attribute early, so they
/// are stripped from attribute positions.
fn sanitize_attr(value: &str) -> Cow<'_, str> {
    if value.contains('"') {
        Cow::Owned(value.replace('"', ""))
    } else {
        Cow::Borrowed(value)
    }
}

fn tvg_id(name: &str) -> String {
    name.split_whitespace().collect()
}

fn logo_url(name: &str) -> String {
    format!("https://live.fanmingming.com/tv/{}.png", tvg_id(name))
}
