pub mod batch;
pub mod export;
pub mod extract;
pub mod query;
pub mod resolve;
