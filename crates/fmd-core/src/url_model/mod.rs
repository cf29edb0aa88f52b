//! Mod references typed by users: a bare name or a portal page URL.
//!
//! `https://mods.factorio.com/mod/<name>` (with any trailing path or query)
//! resolves to `<name>`; anything not starting with `http` is taken as the
//! name itself.

mod path;

pub use path::segment_after;

/// Host serving the mod portal pages.
pub const PORTAL_HOST: &str = "mods.factorio.com";

#[derive(Debug, thiserror::Error)]
pub enum ModRefError {
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// Parsed fine but is not a portal mod page.
    #[error("could not find a mod name in {0}")]
    NotAModUrl(String),
    #[error("empty mod name")]
    Empty,
}

/// Mod name from a bare name or a portal URL.
pub fn mod_name_from_input(input: &str) -> Result<String, ModRefError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ModRefError::Empty);
    }
    if !input.starts_with("http") {
        return Ok(input.to_string());
    }
    let url = url::Url::parse(input)?;
    let on_portal = url
        .host_str()
        .map(|h| h.eq_ignore_ascii_case(PORTAL_HOST))
        .unwrap_or(false);
    if !on_portal {
        return Err(ModRefError::NotAModUrl(input.to_string()));
    }
    segment_after(&url, "mod").ok_or_else(|| ModRefError::NotAModUrl(input.to_string()))
}
