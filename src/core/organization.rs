//! Organization business logic.
//!
//! Every piece of data in the system hangs off an organization and every
//! query filters by it. Operators get one organization each, created
//! lazily on first contact.

use crate::{
    entities::{Organization, organization},
    errors::{Error, Result},
};
use sea_orm::{Set, prelude::*};

/// Name given to an organization created without an explicit one.
const DEFAULT_ORGANIZATION_NAME: &str = "Minha Organização";

/// Finds the operator's organization, creating it when missing.
///
/// Idempotent: calling twice with the same owner returns the same row.
///
/// # Errors
/// Returns [`Error::NotAuthenticated`] when `owner_id` is empty.
pub async fn ensure_organization(
    db: &DatabaseConnection,
    owner_id: &str,
    name: Option<String>,
) -> Result<organization::Model> {
    let owner_id = owner_id.trim();
    if owner_id.is_empty() {
        return Err(Error::NotAuthenticated);
    }

    if let Some(existing) = Organization::find()
        .filter(organization::Column::OwnerId.eq(owner_id))
        .one(db)
        .await?
    {
        return Ok(existing);
    }

    let now = chrono::Utc::now();
    let organization = organization::ActiveModel {
        name: Set(name.unwrap_or_else(|| DEFAULT_ORGANIZATION_NAME.to_string())),
        owner_id: Set(owner_id.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    organization.insert(db).await.map_err(Into::into)
}

/// Looks up the organization owned by `owner_id`.
///
/// # Errors
/// Returns [`Error::NotAuthenticated`] when `owner_id` is empty and
/// [`Error::OrganizationNotFound`] when the owner has no organization yet.
pub async fn get_organization_for_owner(
    db: &DatabaseConnection,
    owner_id: &str,
) -> Result<organization::Model> {
    let owner_id = owner_id.trim();
    if owner_id.is_empty() {
        return Err(Error::NotAuthenticated);
    }

    Organization::find()
        .filter(organization::Column::OwnerId.eq(owner_id))
        .one(db)
        .await?
        .ok_or_else(|| Error::OrganizationNotFound {
            owner_id: owner_id.to_string(),
        })
}
