//! Dependency declaration parsing.
//!
//! Releases list their dependencies as short strings taken from the mod's
//! `info.json`, for example:
//!
//! - `"bar >= 2.0.0"`: required, version constrained
//! - `"? baz"` / `"(?) baz"`: optional (the latter hidden in the game UI)
//! - `"! qux"`: incompatible
//! - `"~ lib"`: required, does not affect load order
//!
//! Parsing is total: anything that cannot be understood as a comparator or
//! version literal degrades to an unconstrained filter rather than an error.

use std::fmt;

use crate::version::ModVersion;

/// Name of the root game package; it is never expanded as a dependency.
pub const BASE_MOD: &str = "base";

/// Version comparison operator in a dependency declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    Gt,
    Gte,
    Lt,
    Lte,
}

impl Comparator {
    /// Map the exact sign text to a comparator; anything else is `None`.
    fn from_sign(sign: &str) -> Option<Self> {
        match sign {
            ">" => Some(Comparator::Gt),
            ">=" => Some(Comparator::Gte),
            "<" => Some(Comparator::Lt),
            "<=" => Some(Comparator::Lte),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Comparator::Gt => ">",
            Comparator::Gte => ">=",
            Comparator::Lt => "<",
            Comparator::Lte => "<=",
        }
    }
}

/// Constraint on candidate release versions.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum VersionFilter {
    /// Every version matches.
    #[default]
    Any,
    /// `candidate <op> version` must hold.
    Compare(Comparator, ModVersion),
}

impl VersionFilter {
    pub fn matches(&self, candidate: &ModVersion) -> bool {
        match self {
            VersionFilter::Any => true,
            VersionFilter::Compare(op, bound) => match op {
                Comparator::Gt => candidate > bound,
                Comparator::Gte => candidate >= bound,
                Comparator::Lt => candidate < bound,
                Comparator::Lte => candidate <= bound,
            },
        }
    }

    pub fn is_any(&self) -> bool {
        matches!(self, VersionFilter::Any)
    }
}

impl fmt::Display for VersionFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionFilter::Any => write!(f, "any"),
            VersionFilter::Compare(op, v) => write!(f, "{} {}", op.as_str(), v),
        }
    }
}

/// Structured form of one dependency declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencySpec {
    pub name: String,
    pub required: bool,
    pub conflict: bool,
    pub filter: VersionFilter,
}

impl DependencySpec {
    /// Parse a raw declaration. Never fails.
    pub fn parse(code: &str) -> Self {
        let mut rest = code.trim();
        let mut required = true;
        let mut conflict = false;

        if let Some(r) = rest.strip_prefix('!') {
            conflict = true;
            required = false;
            rest = r.trim();
        } else if let Some(r) = rest.strip_prefix('?') {
            required = false;
            rest = r.trim();
        } else if let Some(r) = rest.strip_prefix("(?)") {
            required = false;
            rest = r.trim();
        } else if let Some(r) = rest.strip_prefix('~') {
            rest = r.trim();
        }

        let name_end = rest
            .char_indices()
            .find(|(_, c)| !(c.is_alphanumeric() || *c == '-' || *c == '_'))
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        let name = rest[..name_end].to_string();
        let remainder = rest[name_end..].trim();

        Self {
            name,
            required,
            conflict,
            filter: parse_filter(remainder),
        }
    }

    /// Whether the resolver should fetch this dependency.
    pub fn drives_fetch(&self) -> bool {
        self.required && !self.conflict && !self.name.is_empty() && self.name != BASE_MOD
    }
}

/// Parse `">= 1.2.3"`-style text; anything unrecognised is `Any`.
fn parse_filter(remainder: &str) -> VersionFilter {
    if remainder.is_empty() {
        return VersionFilter::Any;
    }
    let sign_len = remainder
        .char_indices()
        .find(|(_, c)| !matches!(c, '<' | '>' | '='))
        .map(|(i, _)| i)
        .unwrap_or(remainder.len());
    let (sign, literal) = remainder.split_at(sign_len);
    let literal = literal.trim();
    if literal.is_empty() {
        return VersionFilter::Any;
    }
    let Some(op) = Comparator::from_sign(sign) else {
        return VersionFilter::Any;
    };
    match ModVersion::parse(literal) {
        Ok(version) => VersionFilter::Compare(op, version),
        Err(_) => VersionFilter::Any,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> ModVersion {
        ModVersion::parse(s).unwrap()
    }

    #[test]
    fn bare_name_is_required() {
        let d = DependencySpec::parse("flib");
        assert_eq!(d.name, "flib");
        assert!(d.required);
        assert!(!d.conflict);
        assert!(d.filter.is_any());
    }

    #[test]
    fn bang_is_conflict_not_required() {
        let d = DependencySpec::parse("! bobplates");
        assert_eq!(d.name, "bobplates");
        assert!(d.conflict);
        assert!(!d.required);
        assert!(!d.drives_fetch());

        let tight = DependencySpec::parse("!baz");
        assert_eq!(tight.name, "baz");
        assert!(tight.conflict);
    }

    #[test]
    fn question_mark_is_optional() {
        let d = DependencySpec::parse("? some-mod >= 0.3.0");
        assert_eq!(d.name, "some-mod");
        assert!(!d.required);
        assert!(!d.conflict);
        assert!(!d.drives_fetch());
        assert!(d.filter.matches(&v("0.3.0")));
    }

    #[test]
    fn hidden_optional_prefix() {
        let d = DependencySpec::parse("(?) hidden_mod");
        assert_eq!(d.name, "hidden_mod");
        assert!(!d.required);
        assert!(!d.conflict);
    }

    #[test]
    fn tilde_prefix_is_required() {
        let d = DependencySpec::parse("~ stdlib >= 1.0.0");
        assert_eq!(d.name, "stdlib");
        assert!(d.required);
        assert!(d.drives_fetch());
    }

    #[test]
    fn gte_filter_boundaries() {
        let d = DependencySpec::parse("name>=1.2.3");
        assert_eq!(d.name, "name");
        assert!(d.filter.matches(&v("1.2.3")));
        assert!(!d.filter.matches(&v("1.2.2")));
        assert!(d.filter.matches(&v("2.0.0")));
    }

    #[test]
    fn strict_and_upper_bounds() {
        let gt = DependencySpec::parse("a > 1.0.0").filter;
        assert!(!gt.matches(&v("1.0.0")));
        assert!(gt.matches(&v("1.0.1")));

        let lt = DependencySpec::parse("a < 2.0.0").filter;
        assert!(lt.matches(&v("1.9.9")));
        assert!(!lt.matches(&v("2.0.0")));

        let lte = DependencySpec::parse("a <= 2.0.0").filter;
        assert!(lte.matches(&v("2.0.0")));
        assert!(!lte.matches(&v("2.0.1")));
    }

    #[test]
    fn short_version_literal() {
        let d = DependencySpec::parse("base >= 1.1");
        assert_eq!(d.name, "base");
        assert!(d.filter.matches(&v("1.1.0")));
        assert!(!d.filter.matches(&v("1.0.9")));
        assert!(!d.drives_fetch());
    }

    #[test]
    fn malformed_comparator_or_version_degrades_to_any() {
        assert!(DependencySpec::parse("a = 1.0.0").filter.is_any());
        assert!(DependencySpec::parse("a => 1.0.0").filter.is_any());
        assert!(DependencySpec::parse("a >= banana").filter.is_any());
        assert!(DependencySpec::parse("a >=").filter.is_any());
        assert!(DependencySpec::parse("a 1.0.0").filter.is_any());
    }

    #[test]
    fn empty_input_yields_empty_name() {
        let d = DependencySpec::parse("   ");
        assert_eq!(d.name, "");
        assert!(!d.drives_fetch());
    }

    #[test]
    fn filter_display() {
        assert_eq!(DependencySpec::parse("x >= 1.2.3").filter.to_string(), ">= 1.2.3");
        assert_eq!(VersionFilter::Any.to_string(), "any");
    }
}
