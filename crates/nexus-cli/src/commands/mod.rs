pub mod common;
pub mod create;
pub mod dashboard;
pub mod lists;
pub mod process;
