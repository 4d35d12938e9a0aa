//! # Intake ingestion.
//!
//! Converts raw intake records (the camelCase JSON manifest rows) into
//! [`Document`]s. One document per record, input order preserved, nothing
//! merged or de-duplicated: duplicate ids are the caller's concern.
//!
//! ## Received timestamp
//! `receivedAt` is parsed as RFC 3339 (`2025-09-12T09:30:00+03:00`), then as a
//! naive `YYYY-MM-DDTHH:MM:SS[.fff]` or plain `YYYY-MM-DD` taken as UTC. When
//! it is absent or unparsable the ingestion wall-clock time is used instead.
//!
//! ## Example
//! ```rust
//! use signflow::{ingest, parse_manifest, WorkflowStatus};
//!
//! let records = parse_manifest(r#"[
//!     {"insurer": "LINK4", "employeeId": "EMP001", "documentFilename": "file.pdf",
//!      "receivedAt": "2025-09-12T09:30:00+03:00"}
//! ]"#).unwrap();
//!
//! let docs = ingest(records);
//! assert_eq!(docs[0].id, "EMP001-file.pdf");
//! assert_eq!(docs[0].workflow_status, WorkflowStatus::Pending);
//! ```

use std::io::Read;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::documents::document::Document;
use crate::error::{Error, Result};

/// Raw intake record as delivered by the external manifest.
///
/// Every field is optional on the wire; missing strings become empty. Unknown
/// fields (e.g. a legacy `status`) are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawRecord {
    pub insurer: String,
    pub document_type: String,
    pub employee_id: String,
    pub employee_name: String,
    pub document_filename: String,
    pub received_at: Option<String>,
    pub signature_requirement: String,
    pub delivery_channel: String,
    pub delivery_target: String,
    pub notes: String,
}

impl RawRecord {
    /// Minimal record: the two fields the document id is derived from.
    pub fn new(employee_id: impl Into<String>, document_filename: impl Into<String>) -> Self {
        Self {
            employee_id: employee_id.into(),
            document_filename: document_filename.into(),
            ..Self::default()
        }
    }
}

/// Ingests records, substituting the current time for missing timestamps.
pub fn ingest(records: impl IntoIterator<Item = RawRecord>) -> Vec<Document> {
    ingest_at(records, Utc::now())
}

/// Ingests records, substituting `now` for missing or unparsable timestamps.
pub fn ingest_at(records: impl IntoIterator<Item = RawRecord>, now: DateTime<Utc>) -> Vec<Document> {
    records
        .into_iter()
        .map(|record| into_document(record, now))
        .collect()
}

/// Parses a JSON array of intake records.
pub fn parse_manifest(json: &str) -> Result<Vec<RawRecord>> {
    Ok(serde_json::from_str(json)?)
}

/// Reads a JSON array of intake records.
///
/// Read failures surface as [`Error::Io`], bad content as [`Error::Manifest`].
pub fn load_manifest<R: Read>(reader: R) -> Result<Vec<RawRecord>> {
    serde_json::from_reader(reader).map_err(|e| {
        if e.is_io() {
            Error::Io(e.into())
        } else {
            Error::Manifest(e)
        }
    })
}

/// Parses an intake timestamp; see the module docs for accepted shapes.
pub fn parse_received_at(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn into_document(record: RawRecord, now: DateTime<Utc>) -> Document {
    let received = match record.received_at.as_deref() {
        Some(raw) if !raw.trim().is_empty() => parse_received_at(raw).unwrap_or_else(|| {
            warn!(
                employee_id = %record.employee_id,
                received_at = raw,
                "unparsable receivedAt, using ingestion time"
            );
            now
        }),
        _ => now,
    };

    let RawRecord {
        insurer,
        document_type,
        employee_id,
        employee_name,
        document_filename,
        signature_requirement,
        delivery_channel,
        delivery_target,
        notes,
        ..
    } = record;

    let mut doc = Document::new(employee_id, document_filename, received);
    doc.insurer = insurer;
    doc.document_type = document_type;
    doc.employee_name = employee_name;
    doc.signature_requirement = signature_requirement;
    doc.delivery_channel = delivery_channel;
    doc.delivery_target = delivery_target;
    doc.notes = notes;
    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::document::{StatusEntry, WorkflowStatus};
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_maps_record_to_pending_document() {
        let mut record = RawRecord::new("EMP001", "file.pdf");
        record.insurer = "LINK4".into();
        record.document_type = "PolicyRenewal".into();
        record.employee_name = "Alice".into();
        record.received_at = Some("2025-09-12T09:30:00+03:00".into());

        let docs = ingest_at([record], fixed_now());
        assert_eq!(docs.len(), 1);
        let doc = &docs[0];

        let expected = Utc.with_ymd_and_hms(2025, 9, 12, 6, 30, 0).unwrap();
        assert_eq!(doc.id, "EMP001-file.pdf");
        assert_eq!(doc.insurer, "LINK4");
        assert_eq!(doc.employee_name, "Alice");
        assert_eq!(doc.workflow_status, WorkflowStatus::Pending);
        assert_eq!(doc.received_date, expected);
        assert_eq!(
            doc.status_history,
            vec![StatusEntry {
                status: WorkflowStatus::Pending,
                at: expected
            }]
        );
        assert_eq!(doc.error_message, None);
    }

    #[test]
    fn test_missing_or_bad_timestamp_falls_back_to_now() {
        let mut bad = RawRecord::new("E2", "b.pdf");
        bad.received_at = Some("last tuesday".into());
        let mut blank = RawRecord::new("E3", "c.pdf");
        blank.received_at = Some("  ".into());

        let docs = ingest_at([RawRecord::new("E1", "a.pdf"), bad, blank], fixed_now());
        for doc in &docs {
            assert_eq!(doc.received_date, fixed_now());
            assert_eq!(doc.status_history[0].at, fixed_now());
        }
    }

    #[test]
    fn test_preserves_order_and_duplicates() {
        let records = vec![
            RawRecord::new("E2", "x.pdf"),
            RawRecord::new("E1", "y.pdf"),
            RawRecord::new("E2", "x.pdf"),
        ];
        let ids: Vec<String> = ingest_at(records, fixed_now())
            .into_iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(ids, vec!["E2-x.pdf", "E1-y.pdf", "E2-x.pdf"]);
    }

    #[test]
    fn test_parse_received_at_shapes() {
        assert_eq!(
            parse_received_at("2025-09-10T14:10:00Z"),
            Some(Utc.with_ymd_and_hms(2025, 9, 10, 14, 10, 0).unwrap())
        );
        assert_eq!(
            parse_received_at("2025-09-10T14:10:00"),
            Some(Utc.with_ymd_and_hms(2025, 9, 10, 14, 10, 0).unwrap())
        );
        assert_eq!(
            parse_received_at("2025-09-10"),
            Some(Utc.with_ymd_and_hms(2025, 9, 10, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_received_at("not a date"), None);
    }

    #[test]
    fn test_manifest_uses_camel_case_and_ignores_extra_fields() {
        let json = r#"[
            {
                "insurer": "Nationale",
                "documentType": "ClaimForm",
                "employeeId": "EMP102",
                "employeeName": "Damian Wrobel",
                "documentFilename": "20250910-ClaimForm-EMP102.pdf",
                "receivedAt": "2025-09-10T14:10:00+03:00",
                "signatureRequirement": "AES",
                "deliveryChannel": "API",
                "deliveryTarget": "https://sandbox.nationale.example/api/claim-form",
                "status": "pending",
                "notes": "sample"
            }
        ]"#;

        let records = parse_manifest(json).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].document_type, "ClaimForm");
        assert_eq!(records[0].delivery_channel, "API");

        let from_reader = load_manifest(json.as_bytes()).unwrap();
        assert_eq!(from_reader, records);
    }

    #[test]
    fn test_read_failure_is_io_error() {
        struct Unreadable;

        impl Read for Unreadable {
            fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
                Err(std::io::Error::other("disk gone"))
            }
        }

        let err = load_manifest(Unreadable).unwrap_err();
        assert_eq!(err.as_label(), "manifest_io");
        assert!(matches!(err, Error::Io(_)));

        let err = load_manifest("[{".as_bytes()).unwrap_err();
        assert_eq!(err.as_label(), "manifest_malformed");
    }

    #[test]
    fn test_malformed_manifest_is_an_error() {
        let err = parse_manifest("{\"not\": \"an array\"}").unwrap_err();
        assert_eq!(err.as_label(), "manifest_malformed");
    }
}
