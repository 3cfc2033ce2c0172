/// Translate a `*` wildcard into an anchored regular expression.
///
/// Every character other than `*` is escaped, so `a.b*` matches `a.b` and
/// `a.bc` but not `axb`. `*` matches any run of characters, newlines included.
#[must_use]
pub fn glob_to_regex(pattern: &str) -> String {
    let body = pattern.split('*').map(regex::escape).collect::<Vec<_>>().join(".*");
    format!("(?s)^{body}$")
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    fn is_match(glob: &str, name: &str) -> bool {
        Regex::new(&glob_to_regex(glob)).unwrap().is_match(name)
    }

    #[test]
    fn star_positions() {
        assert!(is_match("time*", "time"));
        assert!(is_match("time*", "timestamp"));
        assert!(!is_match("time*", "runtime"));
        assert!(!is_match("*id", "correlationId"));
        assert!(is_match("*Id", "correlationId"));
        assert!(is_match("a*c", "ac"));
        assert!(is_match("a*c", "abbbc"));
        assert!(is_match("*", ""));
        assert!(is_match("**", "anything"));
    }

    #[test]
    fn metacharacters_are_literal() {
        assert!(is_match("a.b", "a.b"));
        assert!(!is_match("a.b", "axb"));
        assert!(is_match("x-(1)+*", "x-(1)+tail"));
        assert!(!is_match("x?", "xy"));
    }

    #[test]
    fn no_star_is_whole_name() {
        assert!(is_match("time", "time"));
        assert!(!is_match("time", "times"));
        assert!(!is_match("time", "xtime"));
    }
}
