pub mod endpoint;
pub mod strategy;
