//! Database query functions organized by domain.

pub mod commissions;
pub mod groups;
pub mod merchants;
pub mod payouts;
pub mod users;
