use std::cmp::min;
use syn::Path;

/// Check whether the trailing segments of `path` match `expect`.
///
/// Only the common suffix is compared, so `String`, `string::String` and
/// `std::string::String` all match `["std", "string", "String"]`.
pub fn matches_path(path: &Path, expect: &[&str]) -> bool {
    let len = min(path.segments.len(), expect.len());
    path.segments
        .iter()
        .rev()
        .take(len)
        .map(|v| &v.ident)
        .eq(expect.iter().rev().take(len))
}

pub fn separated_by<T, F>(
    out: &mut String,
    values: impl IntoIterator<Item = T>,
    mut f: F,
    separator: &str,
) where
    F: FnMut(&mut String, T),
{
    let mut len = out.len();
    for v in values {
        if out.len() > len {
            out.push_str(separator);
        }
        len = out.len();
        f(out, v);
    }
}

/// Whether `text` contains `keyword` as a standalone word, ignoring case.
pub fn contains_keyword(text: &str, keyword: &str) -> bool {
    text.split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .any(|word| word.eq_ignore_ascii_case(keyword))
}

/// Longest prefix of `text` not exceeding `max` bytes that ends on a char boundary.
pub fn prefix_at_most(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

#[macro_export]
macro_rules! truncate_long {
    ($query:expr) => {
        format_args!(
            "{}{}",
            $crate::prefix_at_most(&$query, 497).trim_end(),
            if $query.len() > 497 { "..." } else { "" },
        )
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword() {
        assert!(contains_keyword("where ID = :1", "WHERE"));
        assert!(contains_keyword("  WHERE(A = :1)", "WHERE"));
        assert!(!contains_keyword("NOWHERE = :1", "WHERE"));
        assert!(!contains_keyword("WHERE_ID = :1", "WHERE"));
    }

    #[test]
    fn prefix() {
        assert_eq!(prefix_at_most("SELECT", 3), "SEL");
        assert_eq!(prefix_at_most("SELECT", 30), "SELECT");
        assert_eq!(prefix_at_most("aé", 2), "a");
    }

    #[test]
    fn separated() {
        let mut out = String::from("(");
        separated_by(&mut out, ["A", "B", "C"], |out, v| out.push_str(v), ", ");
        assert_eq!(out, "(A, B, C");
    }
}
