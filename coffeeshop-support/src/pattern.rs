//! Wildcard identifier patterns.
//!
//! A recipe identifier may carry a single `*` at its start or end:
//! - `EE_*` matches every identifier starting with `EE_`
//! - `*_Admin_Page` matches every identifier ending with `_Admin_Page`
//! - `*` matches everything (the default recipe)
//!
//! # Specificity
//! When several patterns match the same identifier, the one with the
//! longest literal part wins. Ties are broken by kind
//! (`Prefix > Suffix > Any`) and then by the literal itself, so the
//! choice never depends on registration order.

use std::cmp::Ordering;
use std::fmt;

/// The wildcard marker used in identifiers and path templates.
pub const WILDCARD: char = '*';

/// A parsed wildcard identifier.
///
/// # Examples
/// ```
/// use coffeeshop_support::pattern::WildcardPattern;
///
/// let models = WildcardPattern::parse("EEM_*").unwrap();
/// assert!(models.matches("EEM_Event"));
/// assert!(!models.matches("EE_Config"));
///
/// assert!(WildcardPattern::parse("EE_Config").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WildcardPattern {
    /// `literal*`
    Prefix(String),
    /// `*literal`
    Suffix(String),
    /// `*`
    Any,
}

impl WildcardPattern {
    /// Parses an identifier into a pattern.
    ///
    /// Returns `None` for plain identifiers and for identifiers whose
    /// wildcard sits anywhere other than the first or last position.
    pub fn parse(identifier: &str) -> Option<Self> {
        if identifier == "*" {
            return Some(Self::Any);
        }
        if let Some(prefix) = identifier.strip_suffix(WILDCARD) {
            if !prefix.contains(WILDCARD) {
                return Some(Self::Prefix(prefix.to_string()));
            }
            return None;
        }
        if let Some(suffix) = identifier.strip_prefix(WILDCARD) {
            if !suffix.contains(WILDCARD) {
                return Some(Self::Suffix(suffix.to_string()));
            }
        }
        None
    }

    /// Returns `true` if the identifier contains a wildcard marker at all.
    #[inline]
    pub fn is_wildcard(identifier: &str) -> bool {
        identifier.contains(WILDCARD)
    }

    /// Returns `true` if `candidate` matches this pattern.
    ///
    /// A candidate that is itself a wildcard never matches.
    pub fn matches(&self, candidate: &str) -> bool {
        if Self::is_wildcard(candidate) {
            return false;
        }
        match self {
            Self::Prefix(prefix) => candidate.starts_with(prefix.as_str()),
            Self::Suffix(suffix) => candidate.ends_with(suffix.as_str()),
            Self::Any => true,
        }
    }

    /// The literal (non-wildcard) part of the pattern.
    #[inline]
    pub fn literal(&self) -> &str {
        match self {
            Self::Prefix(literal) | Self::Suffix(literal) => literal,
            Self::Any => "",
        }
    }

    /// Number of literal characters; higher is more specific.
    #[inline]
    pub fn specificity(&self) -> usize {
        self.literal().chars().count()
    }

    fn kind_rank(&self) -> u8 {
        match self {
            Self::Prefix(_) => 2,
            Self::Suffix(_) => 1,
            Self::Any => 0,
        }
    }
}

/// Greater means more specific.
impl Ord for WildcardPattern {
    fn cmp(&self, other: &Self) -> Ordering {
        self.specificity()
            .cmp(&other.specificity())
            .then_with(|| self.kind_rank().cmp(&other.kind_rank()))
            // lexicographically smaller literal wins the final tie
            .then_with(|| other.literal().cmp(self.literal()))
    }
}

impl PartialOrd for WildcardPattern {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for WildcardPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Prefix(prefix) => write!(f, "{prefix}{WILDCARD}"),
            Self::Suffix(suffix) => write!(f, "{WILDCARD}{suffix}"),
            Self::Any => write!(f, "{WILDCARD}"),
        }
    }
}

/// Replaces every lone wildcard in a path template with `identifier`.
///
/// A run of two or more wildcards (`**`) is left for the locator.
///
/// ```
/// use coffeeshop_support::pattern::expand_template;
///
/// assert_eq!(
///     expand_template("core/*.core.php", "EE_Config"),
///     "core/EE_Config.core.php"
/// );
/// assert_eq!(
///     expand_template("core/**/*.core.php", "EE_Config"),
///     "core/**/EE_Config.core.php"
/// );
/// assert_eq!(expand_template("core/fixed.php", "EE_Config"), "core/fixed.php");
/// ```
pub fn expand_template(template: &str, identifier: &str) -> String {
    let mut expanded = String::with_capacity(template.len() + identifier.len());
    let mut rest = template;
    while let Some(at) = rest.find(WILDCARD) {
        expanded.push_str(&rest[..at]);
        let run = rest[at..].bytes().take_while(|&b| b == WILDCARD as u8).count();
        if run == 1 {
            expanded.push_str(identifier);
        } else {
            expanded.push_str(&rest[at..at + run]);
        }
        rest = &rest[at + run..];
    }
    expanded.push_str(rest);
    expanded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_prefix_suffix_any() {
        assert_eq!(
            WildcardPattern::parse("EE_*"),
            Some(WildcardPattern::Prefix("EE_".into()))
        );
        assert_eq!(
            WildcardPattern::parse("*_Admin_Page"),
            Some(WildcardPattern::Suffix("_Admin_Page".into()))
        );
        assert_eq!(WildcardPattern::parse("*"), Some(WildcardPattern::Any));
    }

    #[test]
    fn parse_rejects_plain_and_inner_wildcards() {
        assert!(WildcardPattern::parse("EE_Config").is_none());
        assert!(WildcardPattern::parse("EE_*_Model").is_none());
        assert!(WildcardPattern::parse("*EE*").is_none());
    }

    #[test]
    fn prefix_and_suffix_matching() {
        let prefix = WildcardPattern::parse("EE_Admin_Page*").unwrap();
        assert!(prefix.matches("EE_Admin_Page_CPT"));
        assert!(!prefix.matches("EE_Config"));

        let suffix = WildcardPattern::parse("*_Admin_Page").unwrap();
        assert!(suffix.matches("Transactions_Admin_Page"));
        assert!(!suffix.matches("Transactions_Admin"));
    }

    #[test]
    fn wildcard_candidates_never_match() {
        assert!(!WildcardPattern::Any.matches("EE_*"));
    }

    #[test]
    fn longer_literal_is_more_specific() {
        let short = WildcardPattern::parse("EE_*").unwrap();
        let long = WildcardPattern::parse("EE_Admin_Page*").unwrap();
        assert!(long > short);
        assert!(short > WildcardPattern::Any);
    }

    #[test]
    fn ties_are_deterministic() {
        let prefix = WildcardPattern::parse("EEM_*").unwrap();
        let suffix = WildcardPattern::parse("*_EEM").unwrap();
        assert!(prefix > suffix);

        let a = WildcardPattern::parse("AB*").unwrap();
        let b = WildcardPattern::parse("AC*").unwrap();
        let best = [b.clone(), a.clone()].into_iter().max().unwrap();
        assert_eq!(best, a);
    }

    #[test]
    fn display_round_trips_identifier() {
        for id in ["EE_*", "*_Admin_Page", "*"] {
            assert_eq!(WildcardPattern::parse(id).unwrap().to_string(), id);
        }
    }

    #[test]
    fn template_expansion() {
        assert_eq!(
            expand_template("interfaces/*.interfaces.php", "EEI_Base"),
            "interfaces/EEI_Base.interfaces.php"
        );
        assert_eq!(expand_template("*/*.php", "EEM_Event"), "EEM_Event/EEM_Event.php");
        assert_eq!(expand_template("**/*.php", "EEM_Event"), "**/EEM_Event.php");
        assert_eq!(expand_template("a***", "X"), "a***");
    }
}
