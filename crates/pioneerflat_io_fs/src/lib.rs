//! `pioneerflat_io_fs` v1:
//! Flattening copy engine for Pioneer `Contents` folders.
//!
//! Modules:
//! - `copy`   : validation, scan, space check and copy orchestration
//! - `spec`   : options/records/errors
//! - `report` : run-time report model
//! - `util`   : shared path, naming and metadata helpers

pub mod copy;
pub mod report;
pub mod spec;
mod util;

pub use copy::{
    check_free_space, flatten_contents, flatten_files, init_destination, scan_tree,
    validate_source,
};
pub use report::{ReportFlatten, ReportFlattenBuilder};
pub use spec::{
    FlattenError, LOG_TARGET_PROGRESS, NAME_DIR_CONTENTS, SpecCopiedFile, SpecFileEntry,
    SpecFlattenOptions,
};
