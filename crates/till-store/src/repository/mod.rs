//! # Repository Modules
//!
//! Each repository owns the SQL for one aggregate:
//! - `catalog` - categories, products, tax rules
//! - `sale` - finalized sales and their lines
//! - `shift` - shift lifecycle and cash reconciliation

pub mod catalog;
pub mod sale;
pub mod shift;
