pub mod api;
pub mod extract;
