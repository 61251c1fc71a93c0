pub mod accounts;
pub mod maintenance;
