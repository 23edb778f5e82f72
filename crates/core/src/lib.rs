pub mod error;
pub mod export;
pub mod filters;
pub mod sharing;
pub mod signing;
pub mod storage;
pub mod tag_cloud;
pub mod types;
pub mod validation;
