//! Domain logic for the Waroeng Mograph preset catalog.
//!
//! Everything here is pure: field validation, upload acceptance rules and
//! the catalog filter engine. Persistence lives in `mograph-db`, HTTP in
//! `mograph-api`.

pub mod error;
pub mod filter;
pub mod preset;
pub mod types;
pub mod upload;
