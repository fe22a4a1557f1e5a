//! Result type alias for Shastho

use super::errors::ShasthoError;

/// Result type alias for Shastho operations
///
/// # Examples
///
/// ```
/// use shastho::domain::result::Result;
/// use shastho::domain::errors::ShasthoError;
///
/// fn find_visit() -> Result<()> {
///     Err(ShasthoError::NotFound("Visit not found".to_string()))
/// }
/// assert!(find_visit().is_err());
/// ```
pub type Result<T> = std::result::Result<T, ShasthoError>;
