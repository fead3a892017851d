//! # khata-db: Database Layer for Khata POS
//!
//! SQLite storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                       Khata POS Data Flow                           │
//! │                                                                     │
//! │  HTTP handler (record_sale, create_bill, ...)                       │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  ┌───────────────────────────────────────────────────────────────┐  │
//! │  │                   khata-db (THIS CRATE)                       │  │
//! │  │                                                               │  │
//! │  │  ┌────────────┐  ┌──────────────┐  ┌────────────────────────┐ │  │
//! │  │  │  Database  │  │ Repositories │  │        Ledger          │ │  │
//! │  │  │ (pool.rs)  │  │ (reads +     │  │ (atomic multi-row      │ │  │
//! │  │  │            │  │  single-row  │  │  writes: sales, bills, │ │  │
//! │  │  │ SqlitePool │◄─│  inserts)    │  │  collections, ...)     │ │  │
//! │  │  └────────────┘  └──────────────┘  └────────────────────────┘ │  │
//! │  │         embedded migrations (migrations/sqlite)               │  │
//! │  └───────────────────────────────────────────────────────────────┘  │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  SQLite database file (WAL mode)                                    │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use khata_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("khata.db")).await?;
//!
//! let products = db.products().list_active().await?;
//! let sale = db.ledger().record_sale(draft).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod ledger;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use ledger::{
    BillDraft, CreditRequestDraft, Ledger, MarketCreditDraft, OrderDraft, SaleDraft,
};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::bill::BillRepository;
pub use repository::credit::CreditRepository;
pub use repository::credit_request::CreditRequestRepository;
pub use repository::market_credit::MarketCreditRepository;
pub use repository::order::OrderRepository;
pub use repository::pending_payment::PendingPaymentRepository;
pub use repository::product::ProductRepository;
pub use repository::sale::SaleRepository;
pub use repository::user::UserRepository;
