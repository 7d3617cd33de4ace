//! Tracked entity types and the changes they go through
//!
//! An entity type opts into auditing by implementing [`Tracked`]. Only
//! tracked types can be turned into a [`Change`], so an untracked type can
//! never reach the audit trail by accident.

use serde::Serialize;
use serde_json::Value as JsonValue;
use uuid::Uuid;

use super::context::AuditContext;
use super::error::AuditError;
use super::models::{AuditEvent, FieldMap, NewAuditRecord};

/// An entity type whose lifecycle is recorded in the audit trail
///
/// The snapshot is the serde form of the row as loaded from storage, so
/// secrets must be kept out of the type itself (e.g. `#[serde(skip)]` or
/// not selecting the column at all).
pub trait Tracked: Serialize {
    /// Entity type name stored as `table_name`
    const TABLE: &'static str;

    fn record_id(&self) -> Uuid;

    fn snapshot(&self) -> Result<FieldMap, AuditError> {
        match serde_json::to_value(self)? {
            JsonValue::Object(map) => Ok(map),
            other => Err(AuditError::Snapshot(format!(
                "{} row serialized to {} instead of an object",
                Self::TABLE,
                json_kind(&other)
            ))),
        }
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}

/// One lifecycle transition of a tracked entity, with its captured state
///
/// | event   | old_values | new_values |
/// |---------|------------|------------|
/// | CREATE  | -          | after      |
/// | UPDATE  | before     | after      |
/// | DELETE  | before     | -          |
/// | RESTORE | -          | after      |
#[derive(Debug, Clone, PartialEq)]
pub struct Change {
    pub event: AuditEvent,
    pub table_name: &'static str,
    pub record_id: Uuid,
    pub old_values: Option<FieldMap>,
    pub new_values: Option<FieldMap>,
}

impl Change {
    pub fn created<T: Tracked>(after: &T) -> Result<Self, AuditError> {
        Ok(Self {
            event: AuditEvent::Create,
            table_name: T::TABLE,
            record_id: after.record_id(),
            old_values: None,
            new_values: Some(after.snapshot()?),
        })
    }

    pub fn updated<T: Tracked>(before: &T, after: &T) -> Result<Self, AuditError> {
        if before.record_id() != after.record_id() {
            return Err(AuditError::Snapshot(format!(
                "{} update compared two different records ({} and {})",
                T::TABLE,
                before.record_id(),
                after.record_id()
            )));
        }

        Ok(Self {
            event: AuditEvent::Update,
            table_name: T::TABLE,
            record_id: after.record_id(),
            old_values: Some(before.snapshot()?),
            new_values: Some(after.snapshot()?),
        })
    }

    pub fn deleted<T: Tracked>(before: &T) -> Result<Self, AuditError> {
        Ok(Self {
            event: AuditEvent::Delete,
            table_name: T::TABLE,
            record_id: before.record_id(),
            old_values: Some(before.snapshot()?),
            new_values: None,
        })
    }

    pub fn restored<T: Tracked>(after: &T) -> Result<Self, AuditError> {
        Ok(Self {
            event: AuditEvent::Restore,
            table_name: T::TABLE,
            record_id: after.record_id(),
            old_values: None,
            new_values: Some(after.snapshot()?),
        })
    }

    /// Attach the request origin, producing the record to append
    pub fn into_record(self, ctx: &AuditContext) -> NewAuditRecord {
        NewAuditRecord {
            event: self.event,
            table_name: self.table_name.to_string(),
            record_id: self.record_id,
            old_values: self.old_values,
            new_values: self.new_values,
            user_id: ctx.actor_id,
            ip_address: ctx.origin_address.clone(),
            user_agent: ctx.origin_agent.clone(),
        }
    }
}
