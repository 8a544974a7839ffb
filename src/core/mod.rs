/// Managed account registry and CPF uniqueness
pub mod account;

/// Beneficiary slot quotas and quarantine tracking
pub mod beneficiary;

/// Credit card registry for purchase payment tracking
pub mod card;

/// Miles ledger and the balance projection it drives
pub mod ledger;

/// Operator organization bootstrap and lookup
pub mod organization;

/// Loyalty program lifecycle and balance adjustments
pub mod program;

/// Purchases and their paired ledger entries
pub mod purchase;

/// Analytics, cash-flow projection, and snapshot formatting
pub mod report;

/// Sales, payment settlement, and their paired ledger entries
pub mod sale;
