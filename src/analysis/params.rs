//! Experiment parameter extraction from the trace directory layout.
//!
//! Traces are stored as `<root>/<failure probability>/<heuristic>/<run file>`,
//! so the parameters of a run are read straight off its path.

use std::path::{Component, Path};

use super::types::{Parameters, TraceError};

impl Parameters {
    /// Parse the parameters encoded in the folder hierarchy of `path`.
    ///
    /// A trailing component that is not a directory is the run index and is
    /// ignored.
    pub fn from_path(path: &Path) -> Result<Self, TraceError> {
        let mut parts: Vec<String> = path
            .components()
            .filter_map(|c| match c {
                Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();

        if !path.is_dir() {
            parts.pop();
        }

        let malformed = |reason: String| TraceError::MalformedPath {
            path: path.to_path_buf(),
            reason,
        };

        if parts.len() < 2 {
            return Err(malformed(format!(
                "expected <fprob>/<heuristic> above the run, found {} segment(s)",
                parts.len()
            )));
        }

        let heuristic = parts[parts.len() - 1].clone();
        let fprob_str = &parts[parts.len() - 2];
        let fprob: f64 = fprob_str
            .parse()
            .map_err(|_| malformed(format!("failure probability '{}' is not a number", fprob_str)))?;

        Ok(Parameters { fprob, heuristic })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_file_path() {
        let params = Parameters::from_path(Path::new("traces/0.25/random/run3")).unwrap();
        assert_eq!(params.fprob, 0.25);
        assert_eq!(params.heuristic, "random");
    }

    #[test]
    fn test_parse_directory_path() {
        let dir = tempfile::tempdir().unwrap();
        let heuristic_dir = dir.path().join("0.5").join("ortho");
        std::fs::create_dir_all(&heuristic_dir).unwrap();

        let params = Parameters::from_path(&heuristic_dir).unwrap();
        assert_eq!(params.fprob, 0.5);
        assert_eq!(params.heuristic, "ortho");
    }

    #[test]
    fn test_too_few_segments() {
        let err = Parameters::from_path(Path::new("random/run1")).unwrap_err();
        assert!(matches!(err, TraceError::MalformedPath { .. }));
    }

    #[test]
    fn test_non_numeric_fprob() {
        let err = Parameters::from_path(Path::new("traces/high/random/run1")).unwrap_err();
        assert!(err.to_string().contains("'high' is not a number"));
    }
}
