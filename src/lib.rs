//! Travel Digest Library
//!
//! Finds freshly funded travel and hospitality companies: fetches recent
//! funding rounds, enriches each company, classifies it by keyword and
//! keeps the newest matches.

pub mod client;
pub mod config;
pub mod filter;
pub mod normalize;
pub mod notify;
pub mod pipeline;
pub mod report;
pub mod sorter;
pub mod storage;
pub mod types;

pub use types::*;
