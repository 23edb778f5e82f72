//! Shared query parameter types for API handlers.

use promptshelf_core::error::CoreError;
use promptshelf_core::filters::parse_date_range;
use promptshelf_core::storage::ResultKind;
use promptshelf_core::types::SortOrder;
use promptshelf_db::models::result::ResultQuery;
use serde::Deserialize;

/// Default lifetime of URLs in the signed history listing.
pub const DEFAULT_EXPIRY_MINUTES: u32 = 60;
/// Upper bound on `expiry_minutes` (one week).
pub const MAX_EXPIRY_MINUTES: u32 = 7 * 24 * 60;

/// Upload-history filters (`?q=&from=&to=&type=&order=&expiry_minutes=`).
///
/// `from`/`to` take `YYYY-MM-DD` or RFC 3339 and are inclusive.
#[derive(Debug, Default, Deserialize)]
pub struct HistoryParams {
    pub q: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<ResultKind>,
    #[serde(default)]
    pub order: SortOrder,
    /// Only used by the signed listing.
    pub expiry_minutes: Option<u32>,
}

impl HistoryParams {
    pub fn to_result_query(&self) -> Result<ResultQuery, CoreError> {
        let (from, to) = parse_date_range(self.from.as_deref(), self.to.as_deref())?;
        Ok(ResultQuery {
            search: self
                .q
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            from,
            to,
            kind: self.kind,
            order: self.order,
        })
    }

    /// Signed-URL lifetime in seconds, validated to `1..=MAX_EXPIRY_MINUTES`.
    pub fn expiry_secs(&self) -> Result<u64, CoreError> {
        let minutes = self.expiry_minutes.unwrap_or(DEFAULT_EXPIRY_MINUTES);
        if !(1..=MAX_EXPIRY_MINUTES).contains(&minutes) {
            return Err(CoreError::Validation(format!(
                "expiry_minutes must be between 1 and {MAX_EXPIRY_MINUTES}"
            )));
        }
        Ok(u64::from(minutes) * 60)
    }
}
