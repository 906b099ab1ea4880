//! Object-storage URL construction.
//!
//! Only spaces are escaped. Titles with other reserved characters (`#`, `?`,
//! `%`) produce URLs the storage backend may not resolve.

/// `base/relative`, spaces escaped
pub fn remote_video_url(base_uri: &str, relative: &str) -> String {
    escape_spaces(&join(&[base_uri, relative]))
}

/// `base/title/thumbnail`, spaces escaped; `None` when the content has no thumbnail
pub fn thumbnail_url(base_uri: &str, title: &str, thumbnail_path: Option<&str>) -> Option<String> {
    let thumbnail = thumbnail_path.filter(|path| !path.is_empty())?;
    Some(escape_spaces(&join(&[base_uri, title, thumbnail])))
}

fn join(parts: &[&str]) -> String {
    let mut url = String::new();
    for (i, part) in parts.iter().enumerate() {
        if i == 0 {
            url.push_str(part.trim_end_matches('/'));
        } else {
            url.push('/');
            url.push_str(part.trim_start_matches('/'));
        }
    }
    url
}

fn escape_spaces(url: &str) -> String {
    url.replace(' ', "%20")
}
