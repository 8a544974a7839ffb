//! Operator identity from environment variables.
//!
//! The snapshot binary resolves its organization through the operator
//! identity configured in the `.env` file. There is no session layer;
//! whoever runs the binary is the operator.

/// Gets the operator identity from `OPERATOR_ID`, if configured.
///
/// Whitespace-only values are treated as absent so an empty assignment in
/// `.env` does not masquerade as an identity.
#[must_use]
pub fn get_operator_id() -> Option<String> {
    std::env::var("OPERATOR_ID")
        .ok()
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
}

/// Gets the display name for the operator's organization from
/// `OPERATOR_NAME`, if configured.
#[must_use]
pub fn get_operator_name() -> Option<String> {
    std::env::var("OPERATOR_NAME")
        .ok()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
}
