pub mod chat;
pub mod common;
pub mod config;
pub mod format;
pub mod forms;
pub mod navigation;
pub mod reviews;
pub mod search;
pub mod session;
pub mod storage;
