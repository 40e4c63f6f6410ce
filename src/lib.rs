pub mod config;
pub mod dashboard;
pub mod error;
pub mod process;
pub mod sample;
pub mod storage;
pub mod upload;
