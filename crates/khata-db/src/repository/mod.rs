//! # Repository Layer
//!
//! One repository per aggregate, each holding a pool handle. Repositories
//! cover reads and single-row writes; anything that must touch several
//! tables at once (stock + sale + credit ledger, collections, decisions)
//! lives in [`crate::ledger`] instead.

pub mod bill;
pub mod credit;
pub mod credit_request;
pub mod market_credit;
pub mod order;
pub mod pending_payment;
pub mod product;
pub mod sale;
pub mod user;
