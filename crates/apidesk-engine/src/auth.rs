//! Capability checks for publisher actions.
//!
//! [`is_restricted`] is a pure predicate over the scopes a user holds and
//! the API being acted on. The UI uses it to disable controls; the edit
//! session uses the resulting [`Access`] to refuse transitions.

use crate::api::ApiType;
use crate::config::UserProfile;

/// Scope for reading APIs.
pub const SCOPE_API_VIEW: &str = "apim:api_view";
/// Scope for creating and editing APIs.
pub const SCOPE_API_CREATE: &str = "apim:api_create";
/// Scope for publishing APIs and managing API products.
pub const SCOPE_API_PUBLISH: &str = "apim:api_publish";

/// The parts of an API that affect authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiAccess {
    pub api_type: ApiType,
}

/// Outcome of a capability check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allowed,
    Restricted,
}

impl Access {
    /// Evaluate `required` for `user` on an optional API.
    pub fn check(required: &[&str], user: &UserProfile, api: Option<ApiAccess>) -> Self {
        if is_restricted(required, user, api) {
            Self::Restricted
        } else {
            Self::Allowed
        }
    }

    pub fn is_allowed(self) -> bool {
        self == Self::Allowed
    }
}

/// Returns `true` when `user` may NOT perform an action requiring any of
/// `required` on `api`.
///
/// API products are managed by publishers only, whatever scopes the
/// action asks for. Otherwise one matching scope is enough.
pub fn is_restricted(required: &[&str], user: &UserProfile, api: Option<ApiAccess>) -> bool {
    if let Some(ApiAccess {
        api_type: ApiType::ApiProduct,
    }) = api
    {
        return !user.has_scope(SCOPE_API_PUBLISH);
    }
    !required.iter().any(|scope| user.has_scope(scope))
}
