pub mod prompt;
pub mod result;
pub mod shared_link;
pub mod tag;
pub mod user;
