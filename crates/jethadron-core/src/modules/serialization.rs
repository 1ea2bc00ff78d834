use crate::domain::{AnalysisError, AnalysisResult};
use serde::Serialize;
use std::fs;
use std::path::Path;

pub fn normalize_text_artifact(content: &str) -> String {
    let mut normalized = content.replace("\r\n", "\n").replace('\r', "\n");
    if !normalized.is_empty() && !normalized.ends_with('\n') {
        normalized.push('\n');
    }
    normalized
}

pub fn to_json_artifact<T: Serialize + ?Sized>(value: &T) -> AnalysisResult<String> {
    let rendered = serde_json::to_string_pretty(value).map_err(|error| {
        AnalysisError::internal(
            "RUN.SUMMARY_SERIALIZE",
            format!("failed to serialize summary: {}", error),
        )
    })?;
    Ok(normalize_text_artifact(&rendered))
}

/// Writes `value` as pretty JSON with a trailing newline.
pub fn write_json_artifact<T: Serialize + ?Sized>(path: &Path, value: &T) -> AnalysisResult<()> {
    let content = to_json_artifact(value)?;
    fs::write(path, content).map_err(|error| {
        AnalysisError::io_system(
            "IO.OUTPUT_WRITE",
            format!("failed to write '{}': {}", path.display(), error),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::{normalize_text_artifact, write_json_artifact};
    use crate::domain::AnalysisErrorCategory;
    use std::collections::BTreeMap;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn normalize_text_artifact_uses_canonical_line_endings() {
        let normalized = normalize_text_artifact("alpha\r\nbeta\rgamma");
        assert_eq!(normalized, "alpha\nbeta\ngamma\n");
    }

    #[test]
    fn repeated_json_writes_produce_identical_bytes() {
        let temp = TempDir::new().expect("tempdir should be created");
        let path = temp.path().join("summary.json");
        let value = BTreeMap::from([("h_jet_pt", 3_u64), ("h_track_pt", 7_u64)]);

        write_json_artifact(&path, &value).expect("first write should succeed");
        let first = fs::read(&path).expect("artifact should be readable");
        write_json_artifact(&path, &value).expect("second write should succeed");
        let second = fs::read(&path).expect("artifact should be readable");

        assert_eq!(first, second);
        assert!(second.ends_with(b"}\n"));
    }

    #[test]
    fn missing_output_directory_is_an_io_error() {
        let temp = TempDir::new().expect("tempdir should be created");
        let path = temp.path().join("missing").join("summary.json");
        let error = write_json_artifact(&path, &1_u32).expect_err("parent does not exist");
        assert_eq!(error.category(), AnalysisErrorCategory::IoSystemError);
        assert_eq!(error.placeholder(), "IO.OUTPUT_WRITE");
    }
}
