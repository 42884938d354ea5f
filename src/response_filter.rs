//! Outbound payload filtering of financial fields.
//!
//! Filtering is an explicit post-processing call made by the handler after
//! the business result is produced; nothing intercepts serialization
//! implicitly.

use serde_json::Value;

use crate::identity::Role;

/// Keys stripped from payloads sent to non-admin roles.
pub const FINANCIAL_FIELDS: [&str; 6] = [
    "price",
    "cost",
    "total_amount",
    "amount_paid",
    "balance",
    "commission",
];

/// Strip financial fields from a payload for the given role.
///
/// Admin payloads pass through untouched. For other roles the financial
/// keys are removed from the top-level object and from every object element
/// of arrays, recursing through nested arrays. Objects nested inside other
/// objects are NOT descended into; callers serializing such shapes apply
/// the filter to them separately. The operation is idempotent: a filtered
/// payload filters to itself.
pub fn filter_response(payload: Value, role: Role) -> Value {
    if role.is_admin() {
        return payload;
    }
    strip(payload)
}

fn strip(value: Value) -> Value {
    match value {
        Value::Object(mut map) => {
            for key in FINANCIAL_FIELDS {
                map.remove(key);
            }
            Value::Object(map)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(strip).collect()),
        other => other,
    }
}
