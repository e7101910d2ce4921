//! Single source of truth for the trace directory layout.
//!
//! This module defines WHERE artifacts live. It has no I/O, no validation,
//! no business logic. One file shows the entire output layout.
//!
//! ```text
//! <out_dir>/
//! ├── 001_q1_trace.json        # Sealed trace (resumability signal)
//! ├── 001_q1_trace.json.tmp    # In-flight write, never read back
//! ├── prover_files/
//! │   ├── 001_q1_prover.in     # Program handed to the prover
//! │   └── 001_q1_prover.out    # Raw prover transcript
//! └── baseline-cot/            # Baseline traces, same layout minus prover_files
//! ```

use std::path::{Path, PathBuf};

/// Suffix of a sealed trace file
pub const TRACE_SUFFIX: &str = "_trace.json";

/// Suffix of an in-flight trace write
pub const TEMP_SUFFIX: &str = ".tmp";

/// Sealed trace artifact: `<out_dir>/<qid>_trace.json`
pub fn trace_path(out_dir: &Path, qid: &str) -> PathBuf {
    out_dir.join(format!("{}{}", qid, TRACE_SUFFIX))
}

/// Temporary file a trace is written to before rename: `<out_dir>/<qid>_trace.json.tmp`
pub fn trace_temp_path(out_dir: &Path, qid: &str) -> PathBuf {
    out_dir.join(format!("{}{}{}", qid, TRACE_SUFFIX, TEMP_SUFFIX))
}

/// Recover the qid from a sealed trace file name
///
/// Returns None for temp files and anything that is not a trace.
pub fn qid_from_trace_file(file_name: &str) -> Option<&str> {
    file_name
        .strip_suffix(TRACE_SUFFIX)
        .filter(|qid| !qid.is_empty())
}

/// Prover artifacts directory: `<out_dir>/prover_files/`
pub fn prover_dir(out_dir: &Path) -> PathBuf {
    out_dir.join("prover_files")
}

/// Prover input artifact: `<out_dir>/prover_files/<qid>_prover.in`
pub fn prover_input_path(out_dir: &Path, qid: &str) -> PathBuf {
    prover_dir(out_dir).join(format!("{}_prover.in", qid))
}

/// Prover output artifact: `<out_dir>/prover_files/<qid>_prover.out`
pub fn prover_output_path(out_dir: &Path, qid: &str) -> PathBuf {
    prover_dir(out_dir).join(format!("{}_prover.out", qid))
}

/// Baseline trace directory: `<out_dir>/baseline-<strategy>/`
pub fn baseline_dir(out_dir: &Path, strategy: &str) -> PathBuf {
    out_dir.join(format!("baseline-{}", strategy))
}

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "react-prover.toml";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_baseline_dir() {
        assert_eq!(
            baseline_dir(Path::new("/runs/react"), "cot"),
            PathBuf::from("/runs/react/baseline-cot")
        );
    }

    #[test]
    fn test_trace_paths() {
        let out = Path::new("/runs/react");
        assert_eq!(
            trace_path(out, "001_q1"),
            PathBuf::from("/runs/react/001_q1_trace.json")
        );
        assert_eq!(
            trace_temp_path(out, "001_q1"),
            PathBuf::from("/runs/react/001_q1_trace.json.tmp")
        );
    }

    #[test]
    fn test_prover_paths() {
        let out = Path::new("/runs/react");
        assert_eq!(
            prover_input_path(out, "012_q3"),
            PathBuf::from("/runs/react/prover_files/012_q3_prover.in")
        );
        assert_eq!(
            prover_output_path(out, "012_q3"),
            PathBuf::from("/runs/react/prover_files/012_q3_prover.out")
        );
    }

    #[test]
    fn test_qid_from_trace_file() {
        assert_eq!(qid_from_trace_file("001_q1_trace.json"), Some("001_q1"));
        assert_eq!(qid_from_trace_file("001_q1_trace.json.tmp"), None);
        assert_eq!(qid_from_trace_file("_trace.json"), None);
        assert_eq!(qid_from_trace_file("notes.txt"), None);
    }
}
