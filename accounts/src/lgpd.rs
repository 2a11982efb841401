//! LGPD self-service portal payloads.
//!
//! Data subjects (members and visitors, but any signed-in user) can export
//! the personal data the church holds on them and file access, correction,
//! or deletion requests. Dates travel as `YYYY-MM-DD` strings and timestamps
//! as `YYYY-MM-DD HH24:MI` strings, formatted by the database.

use serde::{Deserialize, Serialize};

use crate::wire::User;

/// Kind of data-subject request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LgpdRequestKind {
    Access,
    Correction,
    Deletion,
}

impl LgpdRequestKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Correction => "correction",
            Self::Deletion => "deletion",
        }
    }

    /// Parse the stored value; `None` for anything unrecognised.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "access" => Some(Self::Access),
            "correction" => Some(Self::Correction),
            "deletion" => Some(Self::Deletion),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LgpdRequestStatus {
    Pending,
    Resolved,
}

/// A filed data-subject request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LgpdRequest {
    pub id: i64,
    pub user_id: i64,
    pub kind: LgpdRequestKind,
    pub status: LgpdRequestStatus,
    pub details: Option<String>,
    pub created_at: String,
    pub resolved_at: Option<String>,
}

/// Body of `POST /api/lgpd/requests`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLgpdRequest {
    pub kind: LgpdRequestKind,
    #[serde(default)]
    pub details: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberRecord {
    pub id: i64,
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub birth_date: Option<String>,
    pub address: Option<String>,
    pub joined_at: Option<String>,
    pub lgpd_consent_at: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitorRecord {
    pub id: i64,
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub first_visit_at: Option<String>,
    pub lgpd_consent_at: Option<String>,
}

/// Response of `GET /api/lgpd/my-data`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalDataExport {
    pub user: User,
    pub member: Option<MemberRecord>,
    pub visitor: Option<VisitorRecord>,
    pub requests: Vec<LgpdRequest>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_parse_matches_serde_names() {
        for kind in [LgpdRequestKind::Access, LgpdRequestKind::Correction, LgpdRequestKind::Deletion] {
            assert_eq!(LgpdRequestKind::parse(kind.as_str()), Some(kind));
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
        assert_eq!(LgpdRequestKind::parse("portability"), None);
    }

    #[test]
    fn new_request_details_default_to_none() {
        let parsed: NewLgpdRequest = serde_json::from_str(r#"{"kind":"deletion"}"#).unwrap();
        assert_eq!(parsed.kind, LgpdRequestKind::Deletion);
        assert!(parsed.details.is_none());
    }

    #[test]
    fn export_serializes_null_records() {
        let export = PersonalDataExport {
            user: User { id: 2, username: "visitante".into(), role: "visitor".into(), member_id: None, visitor_id: None },
            member: None,
            visitor: None,
            requests: Vec::new(),
        };
        let value = serde_json::to_value(export).unwrap();
        assert!(value["member"].is_null());
        assert_eq!(value["requests"], serde_json::json!([]));
    }
}
