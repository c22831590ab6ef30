pub mod expiry;
pub mod response;
