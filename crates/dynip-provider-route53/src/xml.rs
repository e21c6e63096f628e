//! Route53 XML wire types
//!
//! Only the elements this provider reads or writes are modelled; everything
//! else in a response is ignored.

use dynip_core::{ChangeInfo, Error, ResourceRecordSet, Result};
use serde::{Deserialize, Serialize};

/// Route53 API namespace
pub const XMLNS: &str = "https://route53.amazonaws.com/doc/2013-04-01/";

/// `GET .../rrset` response body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListResourceRecordSetsResponse {
    #[serde(default)]
    pub resource_record_sets: ResourceRecordSets,
    #[serde(default)]
    pub is_truncated: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct ResourceRecordSets {
    #[serde(rename = "ResourceRecordSet", default)]
    pub items: Vec<XmlResourceRecordSet>,
}

/// `ResourceRecordSet` element, in schema order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XmlResourceRecordSet {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Type")]
    pub record_type: String,
    #[serde(rename = "SetIdentifier", default, skip_serializing_if = "Option::is_none")]
    pub set_identifier: Option<String>,
    #[serde(rename = "TTL", default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
    #[serde(rename = "ResourceRecords", default, skip_serializing_if = "Option::is_none")]
    pub resource_records: Option<ResourceRecords>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceRecords {
    #[serde(rename = "ResourceRecord", default)]
    pub items: Vec<ResourceRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceRecord {
    #[serde(rename = "Value")]
    pub value: String,
}

impl From<XmlResourceRecordSet> for ResourceRecordSet {
    fn from(set: XmlResourceRecordSet) -> Self {
        ResourceRecordSet {
            name: unescape_name(&set.name),
            record_type: set.record_type,
            ttl: set.ttl,
            values: set
                .resource_records
                .map(|records| records.items.into_iter().map(|r| r.value).collect())
                .unwrap_or_default(),
            set_identifier: set.set_identifier,
        }
    }
}

impl From<&ResourceRecordSet> for XmlResourceRecordSet {
    fn from(set: &ResourceRecordSet) -> Self {
        XmlResourceRecordSet {
            name: set.name.clone(),
            record_type: set.record_type.clone(),
            set_identifier: set.set_identifier.clone(),
            ttl: set.ttl,
            resource_records: Some(ResourceRecords {
                items: set
                    .values
                    .iter()
                    .map(|value| ResourceRecord {
                        value: value.clone(),
                    })
                    .collect(),
            }),
        }
    }
}

/// `POST .../rrset/` request body
#[derive(Debug, Serialize)]
#[serde(rename = "ChangeResourceRecordSetsRequest")]
pub struct ChangeResourceRecordSetsRequest {
    #[serde(rename = "@xmlns")]
    pub xmlns: &'static str,
    #[serde(rename = "ChangeBatch")]
    pub change_batch: ChangeBatch,
}

#[derive(Debug, Serialize)]
pub struct ChangeBatch {
    #[serde(rename = "Comment", skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(rename = "Changes")]
    pub changes: Changes,
}

#[derive(Debug, Serialize)]
pub struct Changes {
    #[serde(rename = "Change")]
    pub items: Vec<Change>,
}

#[derive(Debug, Serialize)]
pub struct Change {
    #[serde(rename = "Action")]
    pub action: &'static str,
    #[serde(rename = "ResourceRecordSet")]
    pub record: XmlResourceRecordSet,
}

impl ChangeResourceRecordSetsRequest {
    /// Single-change UPSERT batch for `record`
    pub fn upsert(record: &ResourceRecordSet, comment: impl Into<String>) -> Self {
        Self {
            xmlns: XMLNS,
            change_batch: ChangeBatch {
                comment: Some(comment.into()),
                changes: Changes {
                    items: vec![Change {
                        action: "UPSERT",
                        record: record.into(),
                    }],
                },
            },
        }
    }

    /// Serialize to an XML document
    pub fn to_xml(&self) -> Result<String> {
        let body = quick_xml::se::to_string(self)
            .map_err(|e| Error::provider("route53", format!("Failed to encode change batch: {e}")))?;
        Ok(format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{body}"))
    }
}

/// `POST .../rrset/` response body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ChangeResourceRecordSetsResponse {
    pub change_info: XmlChangeInfo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct XmlChangeInfo {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub submitted_at: Option<String>,
}

impl From<XmlChangeInfo> for ChangeInfo {
    fn from(info: XmlChangeInfo) -> Self {
        ChangeInfo {
            id: info.id,
            status: info.status,
            submitted_at: info.submitted_at,
        }
    }
}

/// Generic error body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ErrorDetail {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

/// Error body returned for rejected change batches
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InvalidChangeBatch {
    #[serde(default)]
    pub messages: Messages,
}

#[derive(Debug, Default, Deserialize)]
pub struct Messages {
    #[serde(rename = "Message", default)]
    pub items: Vec<String>,
}

/// Extract `(code, message)` from an error body, if it is one we know
pub fn parse_error(body: &str) -> Option<(String, String)> {
    if let Ok(response) = quick_xml::de::from_str::<ErrorResponse>(body) {
        return Some((response.error.code, response.error.message));
    }

    if let Ok(batch) = quick_xml::de::from_str::<InvalidChangeBatch>(body) {
        if !batch.messages.items.is_empty() {
            return Some((
                "InvalidChangeBatch".to_string(),
                batch.messages.items.join("; "),
            ));
        }
    }

    None
}

/// Undo Route53's `\DDD` octal escapes in record names (`\052` is `*`)
pub fn unescape_name(name: &str) -> String {
    let bytes = name.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'\\' && i + 4 <= bytes.len() {
            let digits = &bytes[i + 1..i + 4];
            if digits.iter().all(|b| (b'0'..=b'7').contains(b)) {
                let value = digits
                    .iter()
                    .fold(0u16, |acc, b| acc * 8 + u16::from(b - b'0'));
                if let Ok(byte) = u8::try_from(value) {
                    out.push(byte);
                    i += 4;
                    continue;
                }
            }
        }
        out.push(bytes[i]);
        i += 1;
    }

    String::from_utf8_lossy(&out).into_owned()
}
