//! Structural path matching.
//!
//! # Responsibilities
//! - Evaluate a compiled pattern against the whole normalized path
//! - Split the result into positional and named captures
//!
//! # Design Decisions
//! - One anchored regex evaluation per route, never per segment
//! - Optional captures that did not participate yield an empty string
//! - A positional wildcard expands into one value per path segment

use std::collections::BTreeMap;
use std::fmt;

use crate::pattern::compiler::RoutePattern;

/// Values extracted by a successful match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Captures {
    /// Unnamed captures, left to right.
    pub positional: Vec<String>,
    /// Named captures.
    pub named: BTreeMap<String, String>,
}

/// Trait for matching a normalized path against a route condition.
pub trait Matcher: Send + Sync + fmt::Debug {
    /// Returns the extracted captures if the path matches.
    fn match_path(&self, path: &str) -> Option<Captures>;

    /// Human-readable form of the condition, used in logs and introspection.
    fn source(&self) -> &str;
}

impl Matcher for RoutePattern {
    fn match_path(&self, path: &str) -> Option<Captures> {
        let groups = self.regex().captures(path)?;

        let mut captures = Captures::default();
        for (i, capture) in self.captures().iter().enumerate() {
            let value = groups.get(i + 1).map_or("", |m| m.as_str());
            match &capture.name {
                Some(name) => {
                    captures.named.insert(name.clone(), value.to_string());
                }
                None if capture.is_wildcard() => {
                    captures.positional.extend(value.split('/').map(str::to_string));
                }
                None => captures.positional.push(value.to_string()),
            }
        }
        Some(captures)
    }

    fn source(&self) -> &str {
        RoutePattern::source(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::compile;

    fn positional(pattern: &str, path: &str) -> Option<Vec<String>> {
        compile(pattern).unwrap().match_path(path).map(|c| c.positional)
    }

    #[test]
    fn test_required_and_optional_captures() {
        let pattern = compile("page/(:p!)/(:p!)/(:p?)").unwrap();

        let two = pattern.match_path("page/a/b").unwrap();
        assert_eq!(two.positional, vec!["a", "b", ""]);

        let three = pattern.match_path("page/a/b/c").unwrap();
        assert_eq!(three.positional, vec!["a", "b", "c"]);

        assert!(pattern.match_path("page/a").is_none());
        assert!(pattern.match_path("page/a/b/c/d").is_none());
    }

    #[test]
    fn test_named_capture() {
        let pattern = compile("users/(<id>:n!)").unwrap();
        let captures = pattern.match_path("users/5").unwrap();
        assert!(captures.positional.is_empty());
        assert_eq!(captures.named.get("id").map(String::as_str), Some("5"));

        assert!(pattern.match_path("users/five").is_none());
        assert!(pattern.match_path("users/").is_none());
    }

    #[test]
    fn test_character_classes() {
        assert!(positional("t/(:n!)", "t/123").is_some());
        assert!(positional("t/(:n!)", "t/12a").is_none());
        assert!(positional("t/(:s!)", "t/abc").is_some());
        assert!(positional("t/(:s!)", "t/ab1").is_none());
        assert!(positional("t/(:a!)", "t/ab_1").is_some());
        assert!(positional("t/(:a!)", "t/ab-1").is_none());
        assert!(positional("t/(:p!)", "t/a-b.c?x=1&y=%20").is_some());
        assert!(positional("t/(:p!)", "t/a/b").is_none());
    }

    #[test]
    fn test_wildcard_spans_segments() {
        assert_eq!(
            positional("page/(:*!)", "page/any/nested/path"),
            Some(vec!["any".to_string(), "nested".to_string(), "path".to_string()])
        );
        assert!(positional("page/(:*!)", "page").is_none());

        let named = compile("files/(<rest>:*!)/edit").unwrap();
        let captures = named.match_path("files/a/b.txt/edit").unwrap();
        assert_eq!(captures.named.get("rest").map(String::as_str), Some("a/b.txt"));
    }

    #[test]
    fn test_literals_case_insensitive() {
        let pattern = compile("Admin/(<page>:a!)").unwrap();
        let captures = pattern.match_path("ADMIN/Dashboard").unwrap();
        assert_eq!(captures.named.get("page").map(String::as_str), Some("Dashboard"));
    }

    #[test]
    fn test_literal_metacharacters_escaped() {
        let pattern = compile("index.php/(:a!)").unwrap();
        assert!(pattern.match_path("index.php/home").is_some());
        assert!(pattern.match_path("indexxphp/home").is_none());
    }

    #[test]
    fn test_empty_pattern_matches_root() {
        let pattern = compile("/").unwrap();
        assert_eq!(pattern.match_path(""), Some(Captures::default()));
        assert!(pattern.match_path("home").is_none());
    }

    #[test]
    fn test_optional_name_without_separator() {
        let pattern = compile("user/(<name>:a?)").unwrap();
        let bare = pattern.match_path("user").unwrap();
        assert_eq!(bare.named.get("name").map(String::as_str), Some(""));
        let full = pattern.match_path("user/bob").unwrap();
        assert_eq!(full.named.get("name").map(String::as_str), Some("bob"));
    }

    #[test]
    fn test_leading_optional_capture() {
        let pattern = compile("(:p?)/x").unwrap();
        assert_eq!(pattern.match_path("x").map(|c| c.positional), Some(vec![String::new()]));
        assert_eq!(pattern.match_path("a/x").map(|c| c.positional), Some(vec!["a".to_string()]));
        assert!(pattern.match_path("ax").is_none());
        assert!(pattern.match_path("a/y").is_none());

        let chained = compile("(:p?)/(:p?)/x").unwrap();
        assert_eq!(chained.match_path("x").map(|c| c.positional), Some(vec![String::new(), String::new()]));
        assert_eq!(
            chained.match_path("a/b/x").map(|c| c.positional),
            Some(vec!["a".to_string(), "b".to_string()])
        );
    }

    #[test]
    fn test_case_folding_stays_ascii() {
        // U+212A KELVIN SIGN folds to `k` under Unicode rules.
        assert!(positional("t/(:s!)", "t/\u{212A}").is_none());
        assert!(positional("t/(:a!)", "t/\u{212A}").is_none());
        assert!(compile("kb").unwrap().match_path("\u{212A}b").is_none());
        assert!(compile("kb").unwrap().match_path("KB").is_some());
        assert!(positional("t/(:s!)", "t/K").is_some());
    }

    #[test]
    fn test_optional_path_safe_accepts_braces() {
        assert_eq!(positional("t/(:p?)", "t/{id}"), Some(vec!["{id}".to_string()]));
        assert_eq!(
            positional("t/(:*?)", "t/{a}/b"),
            Some(vec!["{a}".to_string(), "b".to_string()])
        );
        assert!(positional("t/(:p!)", "t/{id}").is_none());
    }

    #[test]
    fn test_non_ascii_literal() {
        let pattern = compile("café/(:n!)").unwrap();
        assert!(pattern.match_path("café/3").is_some());
        assert!(pattern.match_path("CAFé/3").is_some());
    }
}
