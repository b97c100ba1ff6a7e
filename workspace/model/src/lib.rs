//! SeaORM entities for the account store.

pub mod entities;
