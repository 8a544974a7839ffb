//! Error handling for the milheiro core.
//!
//! Every fallible operation in the crate returns [`Result`]. Validation
//! errors are raised before any write happens; [`Error::ConsistencyFailure`]
//! is reserved for paired ledger + business-record writes that could not
//! both commit (the surrounding transaction is rolled back, so no partial
//! state survives it).

use crate::entities::enums::ProgramType;
use thiserror::Error;

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for all milheiro operations.
#[derive(Error, Debug)]
pub enum Error {
    /// No operator identity was supplied when resolving an organization.
    #[error("not authenticated")]
    NotAuthenticated,

    /// No organization exists for the given operator identity.
    #[error("no organization registered for operator '{owner_id}'")]
    OrganizationNotFound { owner_id: String },

    /// Managed account lookup failed within the organization scope.
    #[error("managed account {id} not found")]
    AccountNotFound { id: i64 },

    /// Loyalty program lookup failed within the organization scope.
    #[error("loyalty program {id} not found")]
    ProgramNotFound { id: i64 },

    /// Purchase lookup failed within the organization scope.
    #[error("purchase {id} not found")]
    PurchaseNotFound { id: i64 },

    /// Sale lookup failed within the organization scope.
    #[error("sale {id} not found")]
    SaleNotFound { id: i64 },

    /// Beneficiary lookup failed within the organization scope.
    #[error("beneficiary {id} not found")]
    BeneficiaryNotFound { id: i64 },

    /// Credit card lookup failed within the organization scope.
    #[error("credit card {id} not found")]
    CardNotFound { id: i64 },

    /// A miles quantity was zero or negative where a positive is required.
    #[error("invalid miles amount: {amount}")]
    InvalidMiles { amount: i64 },

    /// A monetary value was negative or not finite.
    #[error("invalid monetary amount: {amount}")]
    InvalidMoney { amount: f64 },

    /// An installment count below one.
    #[error("invalid installment count: {count}")]
    InvalidInstallments { count: i32 },

    /// Balance adjustments of zero are meaningless and rejected.
    #[error("balance adjustment cannot be zero")]
    ZeroAdjustment,

    /// Slot counts that violate `0 <= used <= total`.
    #[error("invalid slot counts: {used} used of {total} total")]
    InvalidSlotCount { total: i32, used: i32 },

    /// A required text field was empty or whitespace-only.
    #[error("{field} cannot be empty")]
    EmptyField { field: &'static str },

    /// The referenced program is not held by the referenced account.
    #[error("loyalty program {program_id} does not belong to managed account {account_id}")]
    ProgramAccountMismatch { program_id: i64, account_id: i64 },

    /// One program per (account, program type); the pair already exists.
    #[error("managed account {account_id} already has a {program_type} program")]
    DuplicateProgram {
        account_id: i64,
        program_type: ProgramType,
    },

    /// CPFs are unique within an organization.
    #[error("CPF '{cpf}' is already registered in this organization")]
    DuplicateCpf { cpf: String },

    /// Managed accounts cannot be deleted while programs or beneficiaries
    /// reference them.
    #[error("managed account {id} still has loyalty programs or beneficiaries attached")]
    AccountInUse { id: i64 },

    /// Programs with purchase or sale history cannot be deleted.
    #[error("loyalty program {id} still has purchases or sales attached")]
    ProgramInUse { id: i64 },

    /// A paired ledger + business-record write could not both commit, or
    /// an existing pair was found with its ledger half missing.
    #[error("ledger consistency failure: {message}")]
    ConsistencyFailure { message: String },

    /// Database operation failed.
    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Configuration loading or validation failed.
    #[error("configuration error: {message}")]
    Config { message: String },
}

impl Error {
    /// Remaps a storage error raised while a paired write was open.
    ///
    /// Business operations call this on the second write of a pair: by that
    /// point validation has passed and the first write has been staged, so a
    /// database failure means the pair cannot commit together. Non-database
    /// errors pass through unchanged.
    pub(crate) fn into_consistency_failure(self) -> Self {
        match self {
            Error::Database(err) => Error::ConsistencyFailure {
                message: err.to_string(),
            },
            other => other,
        }
    }
}
