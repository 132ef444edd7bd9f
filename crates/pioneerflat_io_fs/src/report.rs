//! Flatten report models and mutable report builder.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use crate::spec::SpecCopiedFile;

/// Aggregate counters and diagnostics for one `flatten_contents` run.
#[derive(Debug, Default, Clone)]
pub struct ReportFlatten {
    /// Regular files discovered under the source tree.
    pub cnt_scanned: u64,
    /// Files copied into the destination.
    pub cnt_copied: u64,
    /// Copies that needed a collision suffix.
    pub cnt_renamed: u64,
    /// Symlinks and special files left behind.
    pub cnt_skipped: u64,
    /// Summed size of the scanned files.
    pub n_bytes_required: u64,
    /// Destination free space measured before copying, if checked.
    pub n_bytes_free: Option<u64>,
    /// Destination directory was created by this run.
    pub if_created_destination: bool,
    /// Non-fatal traversal warnings.
    pub warnings: Vec<String>,
    /// Copies in the order they completed.
    pub copied: Vec<SpecCopiedFile>,
}

impl ReportFlatten {
    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// Machine-readable counters.
    pub fn to_dict(&self) -> BTreeMap<String, u64> {
        let mut dict_counts = BTreeMap::new();
        dict_counts.insert("cnt_scanned".to_string(), self.cnt_scanned);
        dict_counts.insert("cnt_copied".to_string(), self.cnt_copied);
        dict_counts.insert("cnt_renamed".to_string(), self.cnt_renamed);
        dict_counts.insert("cnt_skipped".to_string(), self.cnt_skipped);
        dict_counts.insert("cnt_warnings".to_string(), self.warning_count() as u64);
        dict_counts.insert("n_bytes_required".to_string(), self.n_bytes_required);
        dict_counts
    }

    /// Human-readable one-line summary.
    pub fn format(&self, prefix: &str) -> String {
        let dict_counts = self.to_dict();
        format!(
            "{prefix} scanned={} copied={} renamed={} skipped={} warnings={} bytes={}",
            dict_counts["cnt_scanned"],
            dict_counts["cnt_copied"],
            dict_counts["cnt_renamed"],
            dict_counts["cnt_skipped"],
            dict_counts["cnt_warnings"],
            dict_counts["n_bytes_required"]
        )
    }
}

impl fmt::Display for ReportFlatten {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format("[FLATTEN]"))
    }
}

/// Mutable accumulator for flatten statistics.
#[derive(Debug, Default, Clone)]
pub struct ReportFlattenBuilder {
    /// See [`ReportFlatten::cnt_scanned`].
    pub cnt_scanned: u64,
    /// See [`ReportFlatten::cnt_skipped`].
    pub cnt_skipped: u64,
    /// See [`ReportFlatten::cnt_renamed`].
    pub cnt_renamed: u64,
    /// See [`ReportFlatten::n_bytes_required`].
    pub n_bytes_required: u64,
    /// See [`ReportFlatten::n_bytes_free`].
    pub n_bytes_free: Option<u64>,
    /// See [`ReportFlatten::if_created_destination`].
    pub if_created_destination: bool,
    /// See [`ReportFlatten::warnings`].
    pub warnings: Vec<String>,
    /// See [`ReportFlatten::copied`].
    pub copied: Vec<SpecCopiedFile>,
}

impl ReportFlattenBuilder {
    /// Count one scanned regular file and its size.
    pub fn add_scanned(&mut self, n_bytes: u64) {
        self.cnt_scanned += 1;
        self.n_bytes_required = self.n_bytes_required.saturating_add(n_bytes);
    }

    pub fn add_skipped(&mut self) {
        self.cnt_skipped += 1;
    }

    /// Record one warning and forward it to the log.
    pub fn add_warning(&mut self, warning: String) {
        log::warn!("{warning}");
        self.warnings.push(warning);
    }

    /// Record one committed copy.
    pub fn add_copied(&mut self, path_file_src: PathBuf, path_file_dst: PathBuf, if_renamed: bool) {
        if if_renamed {
            self.cnt_renamed += 1;
        }
        self.copied.push(SpecCopiedFile {
            path_file_src,
            path_file_dst,
        });
    }

    /// Finalize builder into immutable report.
    pub fn build(self) -> ReportFlatten {
        ReportFlatten {
            cnt_scanned: self.cnt_scanned,
            cnt_copied: self.copied.len() as u64,
            cnt_renamed: self.cnt_renamed,
            cnt_skipped: self.cnt_skipped,
            n_bytes_required: self.n_bytes_required,
            n_bytes_free: self.n_bytes_free,
            if_created_destination: self.if_created_destination,
            warnings: self.warnings,
            copied: self.copied,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::{ReportFlatten, ReportFlattenBuilder};

    #[test]
    fn report_flatten_to_dict_and_format() {
        let report = ReportFlatten {
            cnt_scanned: 5,
            cnt_copied: 4,
            cnt_renamed: 2,
            cnt_skipped: 1,
            n_bytes_required: 50,
            n_bytes_free: Some(1000),
            if_created_destination: true,
            warnings: vec!["w".to_string()],
            copied: vec![],
        };

        let dict_counts = report.to_dict();
        assert_eq!(dict_counts["cnt_scanned"], 5);
        assert_eq!(dict_counts["cnt_copied"], 4);
        assert_eq!(dict_counts["cnt_renamed"], 2);
        assert_eq!(dict_counts["cnt_skipped"], 1);
        assert_eq!(dict_counts["cnt_warnings"], 1);

        let txt = report.format("[FLATTEN]");
        assert_eq!(
            txt,
            "[FLATTEN] scanned=5 copied=4 renamed=2 skipped=1 warnings=1 bytes=50"
        );
        assert_eq!(report.to_string(), txt);
    }

    #[test]
    fn builder_counts_copies_from_recorded_pairs() {
        let mut builder = ReportFlattenBuilder::default();
        builder.add_scanned(10);
        builder.add_scanned(15);
        builder.add_copied(PathBuf::from("a/1.txt"), PathBuf::from("out/1.txt"), false);
        builder.add_copied(PathBuf::from("b/1.txt"), PathBuf::from("out/1_2.txt"), true);

        let report = builder.build();
        assert_eq!(report.cnt_scanned, 2);
        assert_eq!(report.n_bytes_required, 25);
        assert_eq!(report.cnt_copied, 2);
        assert_eq!(report.cnt_renamed, 1);
        assert_eq!(report.copied[1].path_file_dst, PathBuf::from("out/1_2.txt"));
    }
}
