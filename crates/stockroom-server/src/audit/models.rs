//! Audit data models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::str::FromStr;
use uuid::Uuid;

use super::error::AuditError;

/// Column-name to value snapshot of one entity row
pub type FieldMap = serde_json::Map<String, JsonValue>;

/// Longest `table_name` the audit table stores
pub const TABLE_NAME_MAX_LENGTH: usize = 100;

/// Longest `ip_address` the audit table stores (IPv6 text form)
pub const IP_ADDRESS_MAX_LENGTH: usize = 45;

/// Lifecycle transition that produced an audit record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuditEvent {
    Create,
    Update,
    Delete,
    Restore,
}

impl AuditEvent {
    pub const ALL: [AuditEvent; 4] = [Self::Create, Self::Update, Self::Delete, Self::Restore];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::Restore => "RESTORE",
        }
    }
}

impl std::fmt::Display for AuditEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AuditEvent {
    type Err = AuditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|event| event.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                AuditError::Validation(format!(
                    "Unknown audit event '{}'. Must be one of: CREATE, UPDATE, DELETE, RESTORE",
                    s
                ))
            })
    }
}

/// The actor behind a record, when that user still exists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorSummary {
    pub id: Uuid,
    pub username: String,
}

/// One persisted audit record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub id: Uuid,
    pub event: AuditEvent,
    /// Entity type, named after its table
    pub table_name: String,
    pub record_id: Uuid,
    pub old_values: Option<FieldMap>,
    pub new_values: Option<FieldMap>,
    pub user_id: Option<Uuid>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
    pub user: Option<ActorSummary>,
}

/// Audit record ready to be appended; `id` and `created_at` are assigned by
/// the database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAuditRecord {
    pub event: AuditEvent,
    pub table_name: String,
    pub record_id: Uuid,
    pub old_values: Option<FieldMap>,
    pub new_values: Option<FieldMap>,
    pub user_id: Option<Uuid>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl NewAuditRecord {
    pub fn validate(&self) -> Result<(), AuditError> {
        if self.table_name.trim().is_empty() {
            return Err(AuditError::Validation("table_name cannot be empty".to_string()));
        }
        if self.table_name.len() > TABLE_NAME_MAX_LENGTH {
            return Err(AuditError::Validation(format!(
                "table_name must be at most {} characters",
                TABLE_NAME_MAX_LENGTH
            )));
        }
        Ok(())
    }
}

/// Exact-match filters for audit queries; `None` leaves a field unrestricted
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AuditFilter {
    pub table_name: Option<String>,
    pub event: Option<AuditEvent>,
    pub user_id: Option<Uuid>,
    pub record_id: Option<Uuid>,
}

impl AuditFilter {
    pub fn for_table(table_name: impl Into<String>) -> Self {
        Self {
            table_name: Some(table_name.into()),
            ..Self::default()
        }
    }

    pub fn for_record(table_name: impl Into<String>, record_id: Uuid) -> Self {
        Self {
            table_name: Some(table_name.into()),
            record_id: Some(record_id),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), AuditError> {
        if let Some(table_name) = &self.table_name {
            if table_name.trim().is_empty() {
                return Err(AuditError::Validation("table_name filter cannot be empty".to_string()));
            }
            if table_name.len() > TABLE_NAME_MAX_LENGTH {
                return Err(AuditError::Validation(format!(
                    "table_name filter must be at most {} characters",
                    TABLE_NAME_MAX_LENGTH
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_serializes_uppercase() {
        assert_eq!(serde_json::to_value(AuditEvent::Restore).unwrap(), json!("RESTORE"));
        let event: AuditEvent = serde_json::from_value(json!("DELETE")).unwrap();
        assert_eq!(event, AuditEvent::Delete);
    }

    #[test]
    fn test_event_from_str_is_case_insensitive() {
        assert_eq!("update".parse::<AuditEvent>().unwrap(), AuditEvent::Update);
        assert_eq!(" Create ".parse::<AuditEvent>().unwrap(), AuditEvent::Create);
        assert!(matches!("archive".parse::<AuditEvent>(), Err(AuditError::Validation(_))));
    }

    #[test]
    fn test_filter_validation() {
        assert!(AuditFilter::default().validate().is_ok());
        assert!(AuditFilter::for_table("categories").validate().is_ok());
        assert!(AuditFilter::for_table("").validate().is_err());
        assert!(AuditFilter::for_table("x".repeat(101)).validate().is_err());
    }

    #[test]
    fn test_record_json_field_names() {
        let record = AuditRecord {
            id: Uuid::nil(),
            event: AuditEvent::Create,
            table_name: "categories".to_string(),
            record_id: Uuid::nil(),
            old_values: None,
            new_values: Some(FieldMap::from_iter([("name".to_string(), json!("Electronics"))])),
            user_id: None,
            ip_address: Some("127.0.0.1".to_string()),
            user_agent: None,
            created_at: DateTime::<Utc>::UNIX_EPOCH,
            user: None,
        };

        let body = serde_json::to_value(&record).unwrap();
        for key in [
            "id", "event", "table_name", "record_id", "old_values", "new_values", "user_id",
            "ip_address", "user_agent", "created_at", "user",
        ] {
            assert!(body.get(key).is_some(), "missing {key}");
        }
        assert_eq!(body["new_values"]["name"], json!("Electronics"));
        assert_eq!(body["old_values"], JsonValue::Null);
    }
}
