/// SQL LIKE pattern matching
///
/// `%` matches any run of characters, `_` exactly one character, and
/// `\%` / `\_` match a literal percent or underscore. The whole value must
/// match, not a substring.

use std::cell::RefCell;
use std::collections::HashMap;

use regex::Regex;

/// Compiled patterns kept per thread; cleared once it reaches this size
const CACHE_CAPACITY: usize = 64;

thread_local! {
    static COMPILED: RefCell<HashMap<String, LikeMatcher>> = RefCell::new(HashMap::new());
}

#[derive(Debug, Clone)]
pub struct LikeMatcher {
    regex: Regex,
}

impl LikeMatcher {
    pub fn compile(pattern: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(&Self::to_regex(pattern))?;
        Ok(Self { regex })
    }

    /// Like [`LikeMatcher::compile`], reusing an earlier compilation of the
    /// same pattern text. Invalid patterns are not cached.
    pub fn cached(pattern: &str) -> Result<Self, regex::Error> {
        if let Some(hit) = COMPILED.with_borrow(|cache| cache.get(pattern).cloned()) {
            return Ok(hit);
        }

        let matcher = Self::compile(pattern)?;
        COMPILED.with_borrow_mut(|cache| {
            if cache.len() >= CACHE_CAPACITY {
                cache.clear();
            }
            cache.insert(pattern.to_string(), matcher.clone());
        });
        Ok(matcher)
    }

    pub fn test(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }

    #[cfg(test)]
    pub(super) fn is_cached(pattern: &str) -> bool {
        COMPILED.with_borrow(|cache| cache.contains_key(pattern))
    }

    fn to_regex(pattern: &str) -> String {
        let mut body = String::with_capacity(pattern.len() * 2);
        let mut chars = pattern.chars().peekable();

        while let Some(ch) = chars.next() {
            match ch {
                '\\' if matches!(chars.peek(), Some('%' | '_')) => {
                    if let Some(wildcard) = chars.next() {
                        body.push_str(&regex::escape(&wildcard.to_string()));
                    }
                }
                '%' => body.push_str(".*"),
                '_' => body.push('.'),
                other => body.push_str(&regex::escape(&other.to_string())),
            }
        }

        // (?s) so wildcards also span newlines
        format!("^(?s:{body})$")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn like(value: &str, pattern: &str) -> bool {
        LikeMatcher::compile(pattern).unwrap().test(value)
    }

    #[test]
    fn test_percent_matches_any_suffix() {
        assert!(like("Alabama", "A%"));
        assert!(like("A", "A%"));
        assert!(!like("Kansas", "A%"));
        assert!(like("New York", "%York"));
        assert!(like("hello world", "%o%"));
    }

    #[test]
    fn test_underscore_matches_one_character() {
        assert!(like("AxB", "A_B"));
        assert!(!like("AB", "A_B"));
        assert!(!like("AxxB", "A_B"));
    }

    #[test]
    fn test_full_string_match_only() {
        assert!(!like("xAlabama", "Alabama"));
        assert!(!like("Alabamax", "Alabama"));
    }

    #[test]
    fn test_escaped_wildcards_are_literal() {
        assert!(like("100%", "100\\%"));
        assert!(!like("1000", "100\\%"));
        assert!(like("a_b", "a\\_b"));
        assert!(!like("axb", "a\\_b"));
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        assert!(like("a.b", "a.b"));
        assert!(!like("axb", "a.b"));
        assert!(like("(1+1)*[2]", "(1+1)*[2]"));
        assert!(like("C:\\temp", "C:\\temp"));
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        assert!(!like("alabama", "A%"));
    }

    #[test]
    fn test_cached_reuses_compiled_pattern() {
        let first = LikeMatcher::cached("Sou_h%").unwrap();
        assert!(first.test("South Dakota"));
        assert!(LikeMatcher::is_cached("Sou_h%"));

        let again = LikeMatcher::cached("Sou_h%").unwrap();
        assert_eq!(again.regex.as_str(), first.regex.as_str());
    }

    #[test]
    fn test_cache_stays_bounded() {
        for i in 0..(CACHE_CAPACITY * 3) {
            LikeMatcher::cached(&format!("p{i}%")).unwrap();
        }
        assert!(COMPILED.with_borrow(HashMap::len) <= CACHE_CAPACITY);
        assert!(LikeMatcher::cached("p0%").unwrap().test("p0 and more"));
    }
}
