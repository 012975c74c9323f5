//! admissions-core: Enrollment wizard state machine, validators, and steps.
//!
//! This crate defines the data model, the `DataStore` collaborator trait, the
//! field validators, and the step components that the wizard controller
//! drives. It performs no I/O of its own; every remote call goes through a
//! `DataStore` implementation supplied by the caller.

pub mod catalog;
pub mod error;
pub mod model;
pub mod observe;
pub mod order;
pub mod steps;
pub mod traits;
pub mod validate;
pub mod wizard;

#[cfg(test)]
pub(crate) mod testing;
