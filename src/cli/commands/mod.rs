mod command_result;
pub mod helper;
pub mod init;
pub mod purge;
pub mod selectors;

pub use command_result::*;
