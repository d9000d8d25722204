//! gtest-style case selection: `POSITIVE[-NEGATIVE]`.
//!
//! Both halves are `:`-separated lists of glob patterns where `*` matches any
//! run of characters and `?` matches exactly one.  A case runs when its
//! `Suite.Name` matches some positive pattern (an empty positive half matches
//! everything) and no negative pattern.
//!
//! ```text
//! EvdevDriverXKBTest.*            every keyboard case
//! *-*/fpit:*/penmount             everything except two legacy drivers
//! *.KeyboardLayout/??             keyboard layout cases for two-letter layouts
//! ```

/// A parsed case filter.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TestFilter {
    positive: Vec<String>,
    negative: Vec<String>,
}

impl TestFilter {
    /// A filter that selects every case.
    pub fn all() -> Self {
        Self::default()
    }

    /// Parses a filter expression.  Empty patterns are ignored.
    pub fn parse(expr: &str) -> Self {
        let (positive, negative) = match expr.split_once('-') {
            Some((pos, neg)) => (pos, neg),
            None => (expr, ""),
        };
        Self {
            positive: split_patterns(positive),
            negative: split_patterns(negative),
        }
    }

    /// Returns `true` if the case called `full_name` should run.
    pub fn matches(&self, full_name: &str) -> bool {
        let selected =
            self.positive.is_empty() || self.positive.iter().any(|p| glob_match(p, full_name));
        selected && !self.negative.iter().any(|p| glob_match(p, full_name))
    }
}

fn split_patterns(list: &str) -> Vec<String> {
    list.split(':')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// Wildcard match supporting `*` and `?`, with single-star backtracking.
fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();

    let (mut p, mut t) = (0, 0);
    let mut star: Option<(usize, usize)> = None;

    while t < text.len() {
        if p < pattern.len() && (pattern[p] == '?' || pattern[p] == text[t]) {
            p += 1;
            t += 1;
        } else if p < pattern.len() && pattern[p] == '*' {
            star = Some((p, t));
            p += 1;
        } else if let Some((star_p, star_t)) = star {
            // Let the last star swallow one more character and retry.
            p = star_p + 1;
            t = star_t + 1;
            star = Some((star_p, star_t + 1));
        } else {
            return false;
        }
    }

    pattern[p..].iter().all(|&c| c == '*')
}
