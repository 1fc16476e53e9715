pub mod order_source;
