pub mod action;
pub mod event;
pub mod lane;
pub mod order;
pub mod timing;
