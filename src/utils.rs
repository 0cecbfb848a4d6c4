//! Utility functions for logging, LLM response handling and file system checks.

use std::error::Error;
use std::fs as stdfs;
use tokio::fs;
use tracing::{info, instrument};

/// Truncate a string for logging purposes.
///
/// Long strings are cut to `max` characters with an ellipsis and the number
/// of dropped bytes appended. Cuts always land on a character boundary.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log("a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((cut, _)) => format!("{}…(+{} bytes)", &s[..cut], s.len() - cut),
    }
}

/// Detect if a serde_json error indicates truncated/incomplete JSON.
///
/// When the model response is cut off (e.g., due to token limits), the
/// resulting JSON fails to parse with an EOF error, which is worth one
/// more request.
pub fn looks_truncated(e: &serde_json::Error) -> bool {
    use serde_json::error::Category;
    matches!(e.classify(), Category::Eof)
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if needed, then creates and removes a probe file.
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn ensure_writable_dir(path: &str) -> Result<(), Box<dyn Error>> {
    if let Err(e) = fs::create_dir_all(path).await {
        return Err(Box::new(e));
    }
    // Try a small sync write using std fs (simpler error surface)
    let probe_path = format!("{}/..__probe_write__", path.trim_end_matches('/'));
    match stdfs::File::create(&probe_path) {
        Ok(_) => {
            let _ = stdfs::remove_file(&probe_path);
            info!("Output directory is writable");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_for_log_short_string() {
        let s = "Olá, mundo!";
        assert_eq!(truncate_for_log(s, 100), "Olá, mundo!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 bytes)"));
    }

    #[test]
    fn test_truncate_for_log_multibyte_boundary() {
        let s = "ção".repeat(10);
        assert_eq!(truncate_for_log(&s, 2), "çã…(+46 bytes)");
    }

    #[test]
    fn test_looks_truncated() {
        let json_eof = r#"{"title": "value"#;
        let err = serde_json::from_str::<serde_json::Value>(json_eof).unwrap_err();
        assert!(looks_truncated(&err));

        let err = serde_json::from_str::<serde_json::Value>("{]").unwrap_err();
        assert!(!looks_truncated(&err));
    }

    #[tokio::test]
    async fn test_ensure_writable_dir_creates() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("a/b");
        ensure_writable_dir(target.to_str().unwrap()).await.unwrap();
        assert!(target.is_dir());
    }
}
