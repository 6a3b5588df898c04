use tracing::debug;

use crate::models::{ClassificationVerdict, VerdictCode, VerdictDetails};
use crate::services::keywords::{keyword_weight, KeywordSet, SUGGESTION};
use crate::services::policy::{
    ACCEPT_CONFIDENCE_FACTOR, ACCEPT_SCORE, EARLY_ACCEPT_CONFIDENCE_FACTOR, EARLY_ACCEPT_SCORE,
    MAX_CONFIDENCE, MIN_CONTENT_CHARS,
};

/// Keyword-scoring heuristic deciding whether text reads like a policy.
///
/// Pure: the verdict depends only on the input text and the injected
/// keyword set.
#[derive(Debug, Clone, Default)]
pub struct PolicyClassifier {
    keywords: KeywordSet,
}

impl PolicyClassifier {
    pub fn new(keywords: KeywordSet) -> Self {
        Self { keywords }
    }

    pub fn classify(&self, text: &str) -> ClassificationVerdict {
        let normalized = text.to_lowercase();
        let content_length = normalized.chars().count();

        if content_length < MIN_CONTENT_CHARS {
            debug!(content_length, "Document too short");
            return ClassificationVerdict::rejected(
                VerdictCode::DocumentTooShort,
                format!(
                    "Document is too short to be a policy document ({} characters, minimum {})",
                    content_length, MIN_CONTENT_CHARS
                ),
                VerdictDetails {
                    content_length,
                    keyword_score: 0,
                    found_keywords: Vec::new(),
                    confidence: None,
                    suggestion: None,
                },
            );
        }

        let has_anchor = self
            .keywords
            .anchors
            .iter()
            .any(|phrase| normalized.contains(phrase));

        let mut score = 0u32;
        let mut found_keywords = Vec::new();

        for keyword in self.keywords.policy {
            if !normalized.contains(keyword) {
                continue;
            }
            score += keyword_weight(keyword);
            found_keywords.push(keyword.to_string());

            if score >= EARLY_ACCEPT_SCORE && has_anchor {
                debug!(score, keyword, "Early accept");
                return ClassificationVerdict::accepted(
                    "Document appears to be a valid policy document",
                    VerdictDetails {
                        content_length,
                        keyword_score: score,
                        found_keywords,
                        confidence: Some(confidence(score, EARLY_ACCEPT_CONFIDENCE_FACTOR)),
                        suggestion: None,
                    },
                );
            }
        }

        if let Some(keyword) = self
            .keywords
            .disqualifying
            .iter()
            .find(|keyword| normalized.contains(*keyword))
        {
            debug!(score, keyword, "Disqualifying keyword found");
            return ClassificationVerdict::rejected(
                VerdictCode::NotAPolicyDocument,
                format!(
                    "Document appears to be non-policy content (contains \"{}\")",
                    keyword
                ),
                VerdictDetails {
                    content_length,
                    keyword_score: score,
                    found_keywords,
                    confidence: None,
                    suggestion: None,
                },
            );
        }

        if score < ACCEPT_SCORE {
            debug!(score, "Insufficient policy language");
            return ClassificationVerdict::rejected(
                VerdictCode::InsufficientPolicyLanguage,
                "Document does not contain sufficient policy-related content",
                VerdictDetails {
                    content_length,
                    keyword_score: score,
                    found_keywords,
                    confidence: None,
                    suggestion: Some(SUGGESTION.to_string()),
                },
            );
        }

        ClassificationVerdict::accepted(
            "Document appears to be a valid policy document",
            VerdictDetails {
                content_length,
                keyword_score: score,
                found_keywords,
                confidence: Some(confidence(score, ACCEPT_CONFIDENCE_FACTOR)),
                suggestion: None,
            },
        )
    }
}

fn confidence(score: u32, factor: u32) -> u32 {
    score.saturating_mul(factor).min(MAX_CONFIDENCE)
}
