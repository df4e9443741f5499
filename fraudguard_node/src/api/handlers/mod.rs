pub mod compliance;
pub mod status;
pub mod transactions;
