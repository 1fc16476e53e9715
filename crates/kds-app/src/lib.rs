//! kds-app: wiring for the kitchen display binary.

pub mod source;
