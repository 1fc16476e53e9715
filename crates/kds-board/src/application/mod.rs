pub mod alerts;
pub mod board;
