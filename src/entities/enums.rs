//! String-backed enums shared by the entities.
//!
//! Stored values mirror the uppercase wire literals ("PURCHASE",
//! "HOTMILHAS", ...) so raw rows stay readable in SQL consoles.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Loyalty programs the desk operates accounts in.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum ProgramType {
    #[sea_orm(string_value = "LATAM")]
    Latam,
    #[sea_orm(string_value = "SMILES")]
    Smiles,
    #[sea_orm(string_value = "AZUL")]
    Azul,
    #[sea_orm(string_value = "LIVELO")]
    Livelo,
    #[sea_orm(string_value = "KM_PARCEIROS")]
    KmParceiros,
    #[sea_orm(string_value = "OTHER")]
    Other,
}

/// Ledger entry kinds. PURCHASE and SALE entries are always the paired
/// half of a business record; the rest stand alone.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum TransactionType {
    #[sea_orm(string_value = "PURCHASE")]
    Purchase,
    #[sea_orm(string_value = "SALE")]
    Sale,
    #[sea_orm(string_value = "TRANSFER_IN")]
    TransferIn,
    #[sea_orm(string_value = "TRANSFER_OUT")]
    TransferOut,
    #[sea_orm(string_value = "EXPIRATION")]
    Expiration,
    #[sea_orm(string_value = "ADJUSTMENT")]
    Adjustment,
}

/// Where a sale was brokered.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum SaleChannel {
    #[sea_orm(string_value = "HOTMILHAS")]
    Hotmilhas,
    #[sea_orm(string_value = "MAXMILHAS")]
    Maxmilhas,
    #[sea_orm(string_value = "DIRECT")]
    Direct,
    #[sea_orm(string_value = "OTHER")]
    Other,
}

/// Stored beneficiary status. Quarantine expiry is evaluated at read
/// time, so a stored QUARANTINE may present as ACTIVE once its
/// `quarantine_until` date has passed.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum BeneficiaryStatus {
    #[sea_orm(string_value = "ACTIVE")]
    Active,
    #[sea_orm(string_value = "INACTIVE")]
    Inactive,
    #[sea_orm(string_value = "QUARANTINE")]
    Quarantine,
}

impl std::fmt::Display for ProgramType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_value())
    }
}

impl std::fmt::Display for SaleChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_value())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_stored_values_match_wire_literals() {
        assert_eq!(ProgramType::KmParceiros.to_value(), "KM_PARCEIROS");
        assert_eq!(TransactionType::TransferOut.to_value(), "TRANSFER_OUT");
        assert_eq!(SaleChannel::Hotmilhas.to_value(), "HOTMILHAS");
        assert_eq!(BeneficiaryStatus::Quarantine.to_value(), "QUARANTINE");
    }

    #[test]
    fn test_display_uses_stored_value() {
        assert_eq!(ProgramType::Latam.to_string(), "LATAM");
        assert_eq!(SaleChannel::Direct.to_string(), "DIRECT");
    }
}
