//! The audit log of data changes, shown per month on the month detail page.

mod core;

pub use core::{
    AuditAction, AuditEntry, EntityKind, create_audit_log_table, get_audit_log_for_range,
    record_audit_event,
};
