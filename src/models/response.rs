use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    PageScan,
    WholeDocument,
    PlainText,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    pub text: String,
    pub pages_read: usize,
    pub succeeded: bool,
    pub method: ExtractionMethod,
    pub processing_time_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictCode {
    Accepted,
    DocumentTooShort,
    NotAPolicyDocument,
    InsufficientPolicyLanguage,
    ExtractionError,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerdictDetails {
    pub content_length: usize,
    pub keyword_score: u32,
    pub found_keywords: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationVerdict {
    pub is_valid: bool,
    pub code: VerdictCode,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<VerdictDetails>,
}

impl ClassificationVerdict {
    pub fn accepted(reason: impl Into<String>, details: VerdictDetails) -> Self {
        Self {
            is_valid: true,
            code: VerdictCode::Accepted,
            reason: reason.into(),
            details: Some(details),
        }
    }

    pub fn rejected(code: VerdictCode, reason: impl Into<String>, details: VerdictDetails) -> Self {
        Self {
            is_valid: false,
            code,
            reason: reason.into(),
            details: Some(details),
        }
    }

    /// Verdict for a document whose text could not be obtained.
    pub fn analysis_error(message: impl std::fmt::Display) -> Self {
        Self {
            is_valid: false,
            code: VerdictCode::ExtractionError,
            reason: format!("Error analyzing document: {}", message),
            details: None,
        }
    }

    pub fn confidence(&self) -> Option<u32> {
        self.details.as_ref().and_then(|d| d.confidence)
    }

    pub fn keyword_score(&self) -> u32 {
        self.details.as_ref().map(|d| d.keyword_score).unwrap_or(0)
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateResponse {
    pub success: bool,
    pub data: ValidateData,
    pub processing_time_ms: u64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateData {
    pub file_name: String,
    pub mime_type: String,
    pub size_bytes: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_token: Option<u64>,
    pub applied: bool,
    pub verdict: ClassificationVerdict,
}

/// Error code and message of an upload the gate turned away.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GateRejection {
    pub code: String,
    pub message: String,
}

/// What the latest upload of a session ended with.
#[derive(Debug, Clone)]
pub enum SessionOutcome {
    Verdict(ClassificationVerdict),
    Rejected(GateRejection),
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionVerdictResponse {
    pub session_id: String,
    pub request_token: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verdict: Option<ClassificationVerdict>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection: Option<GateRejection>,
}

impl SessionVerdictResponse {
    pub fn new(session_id: String, request_token: u64, outcome: SessionOutcome) -> Self {
        let (verdict, rejection) = match outcome {
            SessionOutcome::Verdict(verdict) => (Some(verdict), None),
            SessionOutcome::Rejected(rejection) => (None, Some(rejection)),
        };
        Self {
            session_id,
            request_token,
            verdict,
            rejection,
        }
    }
}

impl ValidateResponse {
    pub fn new(data: ValidateData, processing_time_ms: u64) -> Self {
        Self {
            success: true,
            data,
            processing_time_ms,
        }
    }
}
