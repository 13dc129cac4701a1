#![allow(clippy::must_use_candidate)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod config;
pub mod drive_restore_opts;
pub mod failure_log;
pub mod recover;
pub mod restore;
pub mod revision;
