use anyhow::Error;
use gdrive_lib::drive_api::DriveApi;
use log::{debug, error, info};
use stack_string::format_sstr;

use crate::failure_log::FailureLog;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RestoreSummary {
    pub examined: usize,
    pub revisions_deleted: usize,
    pub renamed: usize,
    pub unrestored: usize,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DeleteSummary {
    pub deleted: usize,
    pub failed: usize,
}

/// Permanently delete every file named exactly `name`, e.g. ransom notes.
pub async fn delete_files_with_name(
    drive: &impl DriveApi,
    name: &str,
    dry_run: bool,
) -> Result<DeleteSummary, Error> {
    let mut summary = DeleteSummary::default();
    for f in drive.get_files_with_name(name).await? {
        let fileid = match f.id.as_ref() {
            Some(id) => id.as_str(),
            None => continue,
        };
        let fname = f.name.as_deref().unwrap_or(name);
        if dry_run {
            println!("Would delete file {} ({})", fname, fileid);
            summary.deleted += 1;
            continue;
        }
        match drive.delete_permanently(fileid).await {
            Ok(()) => {
                println!("Deleted file {}", fname);
                summary.deleted += 1;
            }
            Err(e) => {
                error!("failed to delete {} ({}): {}", fname, fileid, e);
                summary.failed += 1;
            }
        }
    }
    if dry_run {
        println!("Would delete {} files", summary.deleted);
    } else {
        println!("Deleted {} files", summary.deleted);
    }
    Ok(summary)
}

/// Undo the ransomware's last write on every file whose name contains `marker`.
///
/// Revisions whose original filename carries the marker are deleted so the file
/// falls back to the previous revision, then the marker is stripped from the name.
/// Files with a single revision have nothing to fall back to and go to `failure_log`.
pub async fn restore_locked_files(
    drive: &impl DriveApi,
    marker: &str,
    failure_log: &mut FailureLog,
    dry_run: bool,
) -> Result<RestoreSummary, Error> {
    let mut summary = RestoreSummary::default();
    let files = drive.get_files().await?;
    println!("Loaded file list ({} els).", files.len());

    for f in &files {
        let (fileid, fname) = match (f.id.as_ref(), f.name.as_ref()) {
            (Some(id), Some(name)) => (id.as_str(), name.as_str()),
            _ => continue,
        };
        if !fname.contains(marker) {
            continue;
        }
        summary.examined += 1;

        let revisions = match drive.get_revisions(fileid).await {
            Ok(revisions) => revisions,
            Err(e) => {
                error!("failed to list revisions for {}: {}", fname, e);
                failure_log
                    .record(&format_sstr!("Error list revisions for file: {fname}"))
                    .await?;
                summary.unrestored += 1;
                continue;
            }
        };
        if revisions.len() < 2 {
            debug!("{} has {} revisions", fname, revisions.len());
            failure_log.record(fname).await?;
            summary.unrestored += 1;
            continue;
        }

        let mut marked = 0;
        for rev in &revisions {
            let is_marked = rev
                .original_filename
                .as_ref()
                .map_or(false, |n| n.contains(marker));
            if !is_marked {
                continue;
            }
            let revisionid = match rev.id.as_ref() {
                Some(id) => id.as_str(),
                None => continue,
            };
            marked += 1;
            println!("Remove rev({}) for file: {}", revisionid, fname);
            if dry_run {
                continue;
            }
            match drive.delete_revision(fileid, revisionid).await {
                Ok(()) => summary.revisions_deleted += 1,
                Err(e) => {
                    error!("failed to delete revision {}: {}", revisionid, e);
                    failure_log
                        .record(&format_sstr!(
                            "Error delete revision {revisionid} for file: {fname}"
                        ))
                        .await?;
                }
            }
        }
        if marked == 0 {
            continue;
        }

        let new_name = fname.replace(marker, "");
        println!("Rename {} to {}", fname, new_name);
        if dry_run {
            continue;
        }
        match drive.rename(fileid, &new_name).await {
            Ok(()) => summary.renamed += 1,
            Err(e) => {
                error!("failed to rename {}: {}", fname, e);
                failure_log
                    .record(&format_sstr!("Error rename file from: {fname} to: {new_name}"))
                    .await?;
            }
        }
    }
    info!("{:?}", summary);
    Ok(summary)
}
