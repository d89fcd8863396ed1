pub mod domain;
pub mod error;
pub mod links;
pub mod protocol;
pub mod schedule;
