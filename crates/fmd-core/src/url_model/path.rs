//! Path segment lookup on parsed URLs.

/// The path segment immediately following the first `marker` segment.
///
/// Empty segments (doubled or trailing slashes) are skipped. Returns `None`
/// if `marker` is absent or is the last segment.
pub fn segment_after(url: &url::Url, marker: &str) -> Option<String> {
    let mut segments = url.path_segments()?.filter(|s| !s.is_empty());
    segments.find(|s| *s == marker)?;
    segments.next().map(str::to_string)
}
