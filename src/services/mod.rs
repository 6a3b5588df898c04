pub mod classifier;
pub mod extractor;
pub mod file_gate;
pub mod keywords;
pub mod pipeline;
pub mod policy;
pub mod upload_session;

pub use classifier::PolicyClassifier;
pub use extractor::{extractor_for, PdfExtractor, PlainTextExtractor, TextExtractor};
pub use file_gate::FileGate;
pub use keywords::KeywordSet;
pub use pipeline::ValidationPipeline;
pub use policy::ValidationPolicy;
pub use upload_session::{RequestToken, SessionRegistry, UploadSession};
