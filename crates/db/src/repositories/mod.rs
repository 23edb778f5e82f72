//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod prompt_repo;
pub mod result_repo;
pub mod shared_link_repo;
pub mod tag_repo;
pub mod user_repo;

pub use prompt_repo::PromptRepo;
pub use result_repo::ResultRepo;
pub use shared_link_repo::SharedLinkRepo;
pub use tag_repo::TagRepo;
pub use user_repo::UserRepo;

/// Build an `ILIKE` pattern matching `needle` anywhere, with `%`, `_` and `\`
/// escaped so user input is matched literally.
pub(crate) fn contains_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[cfg(test)]
mod tests {
    use super::contains_pattern;

    #[test]
    fn wildcards_are_escaped() {
        assert_eq!(contains_pattern("50%_off"), r"%50\%\_off%");
        assert_eq!(contains_pattern("cat"), "%cat%");
    }
}
