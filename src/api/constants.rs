//! Label constants shared by the API layer

/// Route label for requests that matched no registered route.
pub const UNMATCHED_ROUTE: &str = "unmatched";

/// Route label value for HTTP methods outside the standard set.
pub const OTHER_METHOD: &str = "OTHER";
