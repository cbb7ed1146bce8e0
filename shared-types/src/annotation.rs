use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Free-text note on a binding for one competence period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    pub id: i64,
    pub binding_id: i64,
    pub month: u32,
    #[serde(rename = "ano")]
    pub year: i32,
    pub text: String,
    pub created_at: i64,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CreateAnnotationRequest {
    pub month: u32,
    #[serde(rename = "ano")]
    pub year: i32,
    pub text: String,
}

#[derive(Debug, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationsResponse {
    pub annotations: Vec<Annotation>,
}

/// Metadata of a file kept in the file store on behalf of a binding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub id: i64,
    pub binding_id: i64,
    pub file_name: String,
    pub storage_key: String,
    pub content_type: Option<String>,
    pub created_at: i64,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CreateAttachmentRequest {
    pub file_name: String,
    /// Key of a file already placed in the store; generated when absent
    pub storage_key: Option<String>,
    pub content_type: Option<String>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentsResponse {
    pub attachments: Vec<Attachment>,
}

/// A dependent resource that could not be removed and needs manual cleanup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationIssue {
    pub id: i64,
    pub resource: String,
    pub resource_id: String,
    pub operation: String,
    pub error: String,
    pub created_at: i64,
}

#[derive(Debug, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationIssuesResponse {
    pub issues: Vec<ReconciliationIssue>,
}

/// Outcome of removing a binding and everything that hangs off it
#[derive(Debug, Clone, Default, PartialEq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RemovalReport {
    pub bindings: usize,
    pub annotations: usize,
    pub attachments: usize,
    pub deliveries: usize,
    pub issues: Vec<ReconciliationIssue>,
}

impl RemovalReport {
    pub fn merge(&mut self, other: RemovalReport) {
        self.bindings += other.bindings;
        self.annotations += other.annotations;
        self.attachments += other.attachments;
        self.deliveries += other.deliveries;
        self.issues.extend(other.issues);
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}
