//! kds-types: domain model and ports for the kitchen display board.

pub mod domain;
pub mod ports;
