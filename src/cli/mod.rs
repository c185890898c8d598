pub mod check_cmd;
pub mod output;
