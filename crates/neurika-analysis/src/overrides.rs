//! Predefined answers that bypass the completion provider
//!
//! A rule answers a question when it is active and any of its keywords occurs
//! in the question, compared case-insensitively. Rules are tried in the order
//! given; callers pass them oldest first.

/// A stored question/answer override
pub trait OverrideRule {
    fn keywords(&self) -> &[String];

    fn is_active(&self) -> bool {
        true
    }

    /// Whether this rule answers `lowered_question` (already lower-cased)
    fn matches(&self, lowered_question: &str) -> bool {
        self.is_active()
            && self.keywords().iter().any(|keyword| {
                let keyword = keyword.trim();
                !keyword.is_empty() && lowered_question.contains(&keyword.to_lowercase())
            })
    }
}

pub fn find_override<'a, R: OverrideRule>(rules: &'a [R], question: &str) -> Option<&'a R> {
    let lowered = question.to_lowercase();
    rules.iter().find(|rule| rule.matches(&lowered))
}

/// Trim, lower-case and de-duplicate keywords, dropping empty ones.
///
/// First occurrence order is preserved.
pub fn normalize_keywords<I, S>(keywords: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for keyword in keywords {
        let keyword = keyword.as_ref().trim().to_lowercase();
        if !keyword.is_empty() && !out.contains(&keyword) {
            out.push(keyword);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Rule {
        id: u32,
        keywords: Vec<String>,
        active: bool,
    }

    impl Rule {
        fn new(id: u32, keywords: &[&str]) -> Self {
            Self {
                id,
                keywords: keywords.iter().map(|k| k.to_string()).collect(),
                active: true,
            }
        }
    }

    impl OverrideRule for Rule {
        fn keywords(&self) -> &[String] {
            &self.keywords
        }

        fn is_active(&self) -> bool {
            self.active
        }
    }

    #[test]
    fn test_keyword_substring_matches() {
        let rules = vec![Rule::new(1, &["revenue", "sales"])];
        let hit = find_override(&rules, "What were total sales?");
        assert_eq!(hit.map(|r| r.id), Some(1));
    }

    #[test]
    fn test_case_insensitive_both_ways() {
        let rules = vec![Rule::new(1, &["Churn Rate"])];
        assert!(find_override(&rules, "what is our CHURN RATE this quarter").is_some());
    }

    #[test]
    fn test_first_rule_in_order_wins() {
        let rules = vec![Rule::new(1, &["sales"]), Rule::new(2, &["total"])];
        let hit = find_override(&rules, "total sales");
        assert_eq!(hit.map(|r| r.id), Some(1));
    }

    #[test]
    fn test_inactive_rules_are_skipped() {
        let mut inactive = Rule::new(1, &["sales"]);
        inactive.active = false;
        let rules = vec![inactive, Rule::new(2, &["sales"])];
        assert_eq!(find_override(&rules, "sales?").map(|r| r.id), Some(2));
    }

    #[test]
    fn test_empty_keywords_never_match() {
        let rules = vec![Rule::new(1, &["", "   "])];
        assert!(find_override(&rules, "anything at all").is_none());
    }

    #[test]
    fn test_no_rules_no_match() {
        let rules: Vec<Rule> = Vec::new();
        assert!(find_override(&rules, "revenue").is_none());
    }

    #[test]
    fn test_normalize_keywords() {
        let got = normalize_keywords([" Revenue ", "sales", "REVENUE", "", "  "]);
        assert_eq!(got, vec!["revenue", "sales"]);
    }
}
