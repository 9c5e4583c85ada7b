//! Data models for intake processing.

pub mod config;
pub mod crm;
pub mod fields;
pub mod page;
pub mod record;

pub use config::IntakeConfig;
pub use crm::CrmPayload;
pub use fields::{ExtractedFields, FieldName, FieldValue};
pub use page::RecognizedPage;
pub use record::CanonicalRecord;
