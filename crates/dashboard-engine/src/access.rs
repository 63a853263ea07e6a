//! The access-policy collaborator (§6), threaded explicitly rather than
//! read from an ambient slot (§9 "Global ambient state").

use dashboard_types::StructuredQuery;

/// The current user's permissions, passed explicitly into the
/// orchestrator and down into the card expander - never read from
/// ambient/thread-local state.
#[derive(Debug, Clone)]
pub struct CurrentUserPermissions(pub serde_json::Value);

/// `has_permissions(query, current_user_permissions) -> bool`, called
/// once per candidate query (§6, §7).
pub trait AccessPolicy {
    fn has_permissions(&self, query: &StructuredQuery, user_permissions: &CurrentUserPermissions) -> bool;
}

/// Permits everything - useful for tests and for callers with no
/// row/column-level policy to enforce.
pub struct AllowAll;

impl AccessPolicy for AllowAll {
    fn has_permissions(&self, _query: &StructuredQuery, _user_permissions: &CurrentUserPermissions) -> bool {
        true
    }
}
