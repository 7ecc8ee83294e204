//! Business-logic services layered over the repositories.

pub mod orders;
pub mod payments;
