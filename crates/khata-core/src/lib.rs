//! # khata-core: Pure Business Logic for Khata POS
//!
//! This crate is the **heart** of Khata POS. It contains all ledger rules
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                       Khata POS Architecture                        │
//! │                                                                     │
//! │  ┌───────────────────────────────────────────────────────────────┐  │
//! │  │                      apps/api (Axum)                          │  │
//! │  │   sign_in, record_sale, create_bill, reports, CSV export      │  │
//! │  └─────────────────────────────┬─────────────────────────────────┘  │
//! │                                │                                    │
//! │  ┌─────────────────────────────▼─────────────────────────────────┐  │
//! │  │              ★ khata-core (THIS CRATE) ★                      │  │
//! │  │                                                               │  │
//! │  │  ┌─────────┐ ┌─────────┐ ┌──────────┐ ┌──────────┐ ┌───────┐  │  │
//! │  │  │  types  │ │  money  │ │  ledger  │ │  report  │ │export │  │  │
//! │  │  │ Product │ │  Money  │ │  splits  │ │   KPIs   │ │  CSV  │  │  │
//! │  │  │  Sale…  │ │  paise  │ │bill math │ │ windows  │ │       │  │  │
//! │  │  └─────────┘ └─────────┘ └──────────┘ └──────────┘ └───────┘  │  │
//! │  │                                                               │  │
//! │  │  NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │  │
//! │  └─────────────────────────────┬─────────────────────────────────┘  │
//! │                                │                                    │
//! │  ┌─────────────────────────────▼─────────────────────────────────┐  │
//! │  │                   khata-db (Database Layer)                   │  │
//! │  │     SQLite repositories, migrations, transactional ledger     │  │
//! │  └───────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Ledger entities (Product, Sale, Bill, credits, ...)
//! - [`money`] - Money type with integer paise arithmetic (no floats!)
//! - [`ledger`] - Payment-split and bill math
//! - [`validation`] - Input validation (phone, email, quantities, amounts)
//! - [`report`] - Dashboard aggregation and report windows
//! - [`export`] - CSV rendering for downloadable reports
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same input, same output, no side effects
//! 2. **No I/O**: database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: all amounts are paise (i64); the sale invariant
//!    `paid + credit == total` holds exactly, never "within tolerance"
//! 4. **Explicit Errors**: all errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod export;
pub mod ledger;
pub mod money;
pub mod report;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use khata_core::Money` instead of
// `use khata_core::money::Money`

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;
