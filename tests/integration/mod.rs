//! Integration tests for query state synchronization

mod controller_lifecycle;
mod controller_ordering;
mod scenarios;
mod test_utils;

pub use test_utils::*;
