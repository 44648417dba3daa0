//! Result type alias for triadgen

use super::errors::TriadError;

/// Result type alias for triadgen operations
///
/// # Examples
///
/// ```
/// use triadgen::domain::result::Result;
/// use triadgen::domain::errors::TriadError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(TriadError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, TriadError>;
