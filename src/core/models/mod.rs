pub mod billing;
pub mod cost;
pub mod verdict;
