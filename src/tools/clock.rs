//! Current local time

use super::ToolResult;
use crate::utils::now_timestamp;

/// The optional query is accepted for schema compatibility and ignored
pub fn current_time(_query: Option<&str>) -> ToolResult {
    ToolResult::success(format!("The current time is: {}", now_timestamp()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_time_format() {
        let result = current_time(Some("what time is it"));
        assert!(result.success);
        let stamp = result
            .output
            .strip_prefix("The current time is: ")
            .unwrap();
        assert!(chrono::NaiveDateTime::parse_from_str(stamp, "%Y-%m-%d %H:%M:%S").is_ok());
    }
}
