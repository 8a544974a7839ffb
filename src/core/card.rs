//! Credit card business logic.
//!
//! Cards exist so purchases can say what they were paid with. They are
//! never hard-deleted once referenced; deactivation hides them from
//! pickers while keeping purchase history intact.

use crate::{
    entities::{CreditCard, credit_card},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};

/// Retrieves all active cards in the organization, ordered by name.
pub async fn get_active_cards(
    db: &DatabaseConnection,
    organization_id: i64,
) -> Result<Vec<credit_card::Model>> {
    CreditCard::find()
        .filter(credit_card::Column::OrganizationId.eq(organization_id))
        .filter(credit_card::Column::IsActive.eq(true))
        .order_by_asc(credit_card::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a specific card within the organization, active or not.
///
/// # Errors
/// Returns [`Error::CardNotFound`] when the card does not exist in the
/// organization.
pub async fn get_card_by_id(
    db: &DatabaseConnection,
    organization_id: i64,
    card_id: i64,
) -> Result<credit_card::Model> {
    CreditCard::find_by_id(card_id)
        .filter(credit_card::Column::OrganizationId.eq(organization_id))
        .one(db)
        .await?
        .ok_or(Error::CardNotFound { id: card_id })
}

/// Registers a card.
///
/// # Errors
/// Returns an error if the name is empty or whitespace-only, or the
/// database insert operation fails.
pub async fn create_card(
    db: &DatabaseConnection,
    organization_id: i64,
    name: String,
    last_four_digits: Option<String>,
) -> Result<credit_card::Model> {
    if name.trim().is_empty() {
        return Err(Error::EmptyField { field: "card name" });
    }

    let now = chrono::Utc::now();
    let card = credit_card::ActiveModel {
        organization_id: Set(organization_id),
        name: Set(name.trim().to_string()),
        last_four_digits: Set(last_four_digits),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    card.insert(db).await.map_err(Into::into)
}

/// Renames a card or corrects its digits.
pub async fn update_card(
    db: &DatabaseConnection,
    organization_id: i64,
    card_id: i64,
    name: String,
    last_four_digits: Option<String>,
) -> Result<credit_card::Model> {
    if name.trim().is_empty() {
        return Err(Error::EmptyField { field: "card name" });
    }

    let existing = get_card_by_id(db, organization_id, card_id).await?;

    let mut card: credit_card::ActiveModel = existing.into();
    card.name = Set(name.trim().to_string());
    card.last_four_digits = Set(last_four_digits);
    card.updated_at = Set(chrono::Utc::now());

    card.update(db).await.map_err(Into::into)
}

/// Deactivates a card, hiding it from active listings.
pub async fn deactivate_card(
    db: &DatabaseConnection,
    organization_id: i64,
    card_id: i64,
) -> Result<credit_card::Model> {
    let existing = get_card_by_id(db, organization_id, card_id).await?;

    let mut card: credit_card::ActiveModel = existing.into();
    card.is_active = Set(false);
    card.updated_at = Set(chrono::Utc::now());

    card.update(db).await.map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_create_card_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = create_card(&db, 1, "   ".to_string(), None).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::EmptyField { field: "card name" }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_deactivated_card_leaves_active_listing() -> Result<()> {
        let db = setup_test_db().await?;
        let org = create_test_organization(&db).await?;
        let itau = create_card(&db, org.id, "Itaú Personnalité".to_string(), Some("4321".to_string()))
            .await?;
        create_card(&db, org.id, "Nubank".to_string(), None).await?;

        assert_eq!(get_active_cards(&db, org.id).await?.len(), 2);

        let deactivated = deactivate_card(&db, org.id, itau.id).await?;
        assert!(!deactivated.is_active);

        let active = get_active_cards(&db, org.id).await?;
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].name, "Nubank");

        // Still reachable directly, history needs it
        let fetched = get_card_by_id(&db, org.id, itau.id).await?;
        assert_eq!(fetched.name, "Itaú Personnalité");

        Ok(())
    }

    #[tokio::test]
    async fn test_update_card() -> Result<()> {
        let db = setup_test_db().await?;
        let org = create_test_organization(&db).await?;
        let card = create_card(&db, org.id, "Nubank".to_string(), None).await?;

        let updated = update_card(
            &db,
            org.id,
            card.id,
            "Nubank Ultravioleta".to_string(),
            Some("8765".to_string()),
        )
        .await?;
        assert_eq!(updated.name, "Nubank Ultravioleta");
        assert_eq!(updated.last_four_digits.as_deref(), Some("8765"));

        Ok(())
    }

    #[tokio::test]
    async fn test_deactivate_unknown_card() -> Result<()> {
        let db = setup_test_db().await?;
        let org = create_test_organization(&db).await?;

        let result = deactivate_card(&db, org.id, 42).await;
        assert!(matches!(result.unwrap_err(), Error::CardNotFound { id: 42 }));

        Ok(())
    }
}
