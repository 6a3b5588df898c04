use std::time::Instant;

use tracing::{debug, info, warn};

use crate::error::AppResult;
use crate::models::{ClassificationVerdict, DocumentSource};
use crate::services::classifier::PolicyClassifier;
use crate::services::extractor::extractor_for;
use crate::services::file_gate::FileGate;
use crate::services::policy::ValidationPolicy;

/// Gate, extract, classify.
///
/// `validate` returns `Err` only for gate rejections, which happen before
/// the document is read. Every later failure is folded into a rejecting
/// verdict.
pub struct ValidationPipeline {
    policy: ValidationPolicy,
    gate: FileGate,
    classifier: PolicyClassifier,
}

impl ValidationPipeline {
    pub fn new(policy: ValidationPolicy, classifier: PolicyClassifier) -> Self {
        let gate = FileGate::new(&policy);
        Self {
            policy,
            gate,
            classifier,
        }
    }

    pub async fn validate(&self, source: &dyn DocumentSource) -> AppResult<ClassificationVerdict> {
        let start = Instant::now();

        self.gate.check(source.mime_type(), source.size_bytes())?;

        let extraction = match extractor_for(source.mime_type(), &self.policy) {
            Ok(extractor) => {
                debug!(extractor = extractor.name(), file_name = source.name(), "Extracting text");
                extractor.extract(source).await
            }
            Err(e) => Err(e),
        };

        let verdict = match extraction {
            Ok(result) => self.classifier.classify(&result.text),
            Err(e) => {
                warn!(
                    file_name = source.name(),
                    error_code = e.error_code(),
                    error = %e,
                    "Extraction failed"
                );
                ClassificationVerdict::analysis_error(&e)
            }
        };

        info!(
            file_name = source.name(),
            mime_type = source.mime_type(),
            is_valid = verdict.is_valid,
            keyword_score = verdict.keyword_score(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Validation completed"
        );

        Ok(verdict)
    }

    pub fn gate(&self) -> &FileGate {
        &self.gate
    }

    pub fn policy(&self) -> &ValidationPolicy {
        &self.policy
    }
}

impl Default for ValidationPipeline {
    fn default() -> Self {
        Self::new(ValidationPolicy::default(), PolicyClassifier::default())
    }
}
