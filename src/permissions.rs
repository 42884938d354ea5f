//! Static permission matrix and ownership checks.
//!
//! The matrix is an exhaustive function over `(Role, Entity, Operation)`,
//! not a runtime-mutable map, so every grant is visible in one place and
//! the compiler enforces totality. Unknown entity/operation strings resolve
//! to deny, never to an error.

use serde::{Deserialize, Serialize};

use crate::identity::Role;

/// Protected resource categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Entity {
    Customers,
    Orders,
    Users,
    FinancialData,
    Messages,
}

/// Operations that can be performed on an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
    Search,
}

impl Entity {
    /// All defined entities, for matrix-totality checks.
    pub const ALL: [Entity; 5] = [
        Entity::Customers,
        Entity::Orders,
        Entity::Users,
        Entity::FinancialData,
        Entity::Messages,
    ];

    /// String form used in audit records and error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Entity::Customers => "customers",
            Entity::Orders => "orders",
            Entity::Users => "users",
            Entity::FinancialData => "financial_data",
            Entity::Messages => "messages",
        }
    }

    /// Parse an entity name; `None` for anything undefined.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "customers" => Some(Entity::Customers),
            "orders" => Some(Entity::Orders),
            "users" => Some(Entity::Users),
            "financial_data" => Some(Entity::FinancialData),
            "messages" => Some(Entity::Messages),
            _ => None,
        }
    }

    /// True for entities an assistant sees only through an ownership
    /// filter (customers, orders, messages-via-assigned-customer).
    pub fn supports_ownership_scope(&self) -> bool {
        matches!(self, Entity::Customers | Entity::Orders | Entity::Messages)
    }
}

impl Operation {
    /// All defined operations, for matrix-totality checks.
    pub const ALL: [Operation; 5] = [
        Operation::Create,
        Operation::Read,
        Operation::Update,
        Operation::Delete,
        Operation::Search,
    ];

    /// String form used in audit records and error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::Read => "read",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::Search => "search",
        }
    }

    /// Parse an operation name; `None` for anything undefined.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "create" => Some(Operation::Create),
            "read" => Some(Operation::Read),
            "update" => Some(Operation::Update),
            "delete" => Some(Operation::Delete),
            "search" => Some(Operation::Search),
            _ => None,
        }
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Check whether `role` may perform `operation` on `entity`.
///
/// Admin is allowed every defined pair. Assistants work customers, orders
/// and messages but never delete them; users and financial data are
/// reserved for admin entirely.
pub fn is_allowed(role: Role, entity: Entity, operation: Operation) -> bool {
    match role {
        Role::Admin => true,
        Role::Assistant => match entity {
            Entity::Customers | Entity::Orders | Entity::Messages => !matches!(operation, Operation::Delete),
            Entity::Users | Entity::FinancialData => false,
        },
    }
}

/// String-level matrix check for callers holding raw request segments.
/// Unknown entity or operation names deny (fail closed); they are never
/// defaulted to admin-equivalent access.
pub fn is_allowed_str(role: Role, entity: &str, operation: &str) -> bool {
    match (Entity::parse(entity), Operation::parse(operation)) {
        (Some(entity), Some(operation)) => is_allowed(role, entity, operation),
        _ => false,
    }
}

/// Ownership check: admin always passes; an assistant only for resources
/// they created. Any future role denies.
pub fn check_ownership(role: Role, identity_id: &str, resource_owner_id: &str) -> bool {
    match role {
        Role::Admin => true,
        Role::Assistant => identity_id == resource_owner_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_is_allowed_every_defined_pair() {
        for entity in Entity::ALL {
            for operation in Operation::ALL {
                assert!(is_allowed(Role::Admin, entity, operation));
            }
        }
    }

    #[test]
    fn assistant_grants_are_a_strict_subset_of_admin() {
        for entity in Entity::ALL {
            for operation in Operation::ALL {
                if is_allowed(Role::Assistant, entity, operation) {
                    assert!(is_allowed(Role::Admin, entity, operation));
                }
            }
        }
    }

    #[test]
    fn assistant_never_deletes_customers_or_orders() {
        assert!(!is_allowed(Role::Assistant, Entity::Customers, Operation::Delete));
        assert!(!is_allowed(Role::Assistant, Entity::Orders, Operation::Delete));
    }

    #[test]
    fn assistant_has_no_access_to_users_or_financial_data() {
        for operation in Operation::ALL {
            assert!(!is_allowed(Role::Assistant, Entity::Users, operation));
            assert!(!is_allowed(Role::Assistant, Entity::FinancialData, operation));
        }
    }

    #[test]
    fn assistant_works_scoped_entities() {
        for entity in [Entity::Customers, Entity::Orders, Entity::Messages] {
            assert!(is_allowed(Role::Assistant, entity, Operation::Create));
            assert!(is_allowed(Role::Assistant, entity, Operation::Read));
            assert!(is_allowed(Role::Assistant, entity, Operation::Update));
            assert!(is_allowed(Role::Assistant, entity, Operation::Search));
        }
    }

    #[test]
    fn unknown_entity_or_operation_denies_for_all_roles() {
        assert!(!is_allowed_str(Role::Admin, "invoices", "read"));
        assert!(!is_allowed_str(Role::Admin, "orders", "approve"));
        assert!(!is_allowed_str(Role::Assistant, "invoices", "approve"));
        assert!(!is_allowed_str(Role::Assistant, "", ""));
    }

    #[test]
    fn known_strings_match_the_typed_matrix() {
        assert!(is_allowed_str(Role::Assistant, "orders", "read"));
        assert!(!is_allowed_str(Role::Assistant, "orders", "delete"));
        assert!(is_allowed_str(Role::Admin, "financial_data", "search"));
    }

    #[test]
    fn ownership_check_semantics() {
        assert!(check_ownership(Role::Admin, "u1", "u2"));
        assert!(check_ownership(Role::Assistant, "u1", "u1"));
        assert!(!check_ownership(Role::Assistant, "u1", "u2"));
    }

    #[test]
    fn ownership_scope_covers_assistant_workable_entities() {
        assert!(Entity::Customers.supports_ownership_scope());
        assert!(Entity::Orders.supports_ownership_scope());
        assert!(Entity::Messages.supports_ownership_scope());
        assert!(!Entity::Users.supports_ownership_scope());
        assert!(!Entity::FinancialData.supports_ownership_scope());
    }
}
