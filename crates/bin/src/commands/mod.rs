pub mod commit;
mod common;
pub mod insert;
pub mod remove;
#[cfg(feature = "rpc")]
pub mod serve;
pub mod select;
pub mod update;
