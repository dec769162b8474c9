pub mod client;

pub use client::HttpQuotaChecker;
