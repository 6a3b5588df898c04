//! Keyword dictionaries used by the policy classifier.

/// Terms that indicate policy or compliance language, in scan order.
pub static POLICY_KEYWORDS: &[&str] = &[
    "policy",
    "privacy",
    "security",
    "compliance",
    "procedure",
    "regulation",
    "gdpr",
    "hipaa",
    "data protection",
    "information",
    "personal information",
    "google",
    "collect",
    "use",
    "share",
    "cookies",
    "services",
];

/// Terms that mark a document as something other than a policy.
pub static DISQUALIFYING_KEYWORDS: &[&str] = &[
    "invoice",
    "receipt",
    "menu",
    "recipe",
    "story",
    "novel",
    "fiction",
];

/// Phrases that allow an early accept once the score threshold is met.
pub static ANCHOR_PHRASES: &[&str] = &["privacy policy", "data protection"];

pub const SUGGESTION: &str = "Please upload a document that contains policy-related terms such as \
privacy, security, compliance, data protection, procedures, or regulations.";

#[derive(Debug, Clone, Copy)]
pub struct KeywordSet {
    pub policy: &'static [&'static str],
    pub disqualifying: &'static [&'static str],
    pub anchors: &'static [&'static str],
}

impl KeywordSet {
    pub const fn new(
        policy: &'static [&'static str],
        disqualifying: &'static [&'static str],
        anchors: &'static [&'static str],
    ) -> Self {
        Self {
            policy,
            disqualifying,
            anchors,
        }
    }
}

impl Default for KeywordSet {
    fn default() -> Self {
        Self::new(POLICY_KEYWORDS, DISQUALIFYING_KEYWORDS, ANCHOR_PHRASES)
    }
}

/// 3 points for terms longer than 8 characters, 2 otherwise.
pub fn keyword_weight(keyword: &str) -> u32 {
    if keyword.chars().count() > 8 {
        3
    } else {
        2
    }
}
