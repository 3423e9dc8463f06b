pub mod emi;
pub mod schedule;
pub mod summary;
