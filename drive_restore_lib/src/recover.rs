use anyhow::{format_err, Error};
use chrono::NaiveDateTime;
use gdrive_lib::{
    directory_tree::{build_directory_tree, create_directories, Directory},
    drive_api::DriveApi,
    drive_v3_types::File,
};
use log::{debug, error, info};
use stack_string::format_sstr;
use std::{
    collections::HashMap,
    io::Write,
    path::{Path, PathBuf},
};
use tokio::fs::create_dir_all;

use crate::revision::latest_revision_before;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadOutcome {
    Exists,
    Skipped,
    NoRevision,
    Downloaded,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RecoverSummary {
    pub directories: usize,
    pub downloaded: usize,
    pub existing: usize,
    pub skipped: usize,
    pub no_revision: usize,
    pub failed: usize,
}

impl RecoverSummary {
    fn count(&mut self, outcome: DownloadOutcome) {
        match outcome {
            DownloadOutcome::Exists => self.existing += 1,
            DownloadOutcome::Skipped => self.skipped += 1,
            DownloadOutcome::NoRevision => self.no_revision += 1,
            DownloadOutcome::Downloaded => self.downloaded += 1,
        }
    }
}

/// Mirror the remote folder structure below `root_path`.
pub async fn build_local_tree(drive: &impl DriveApi, root_path: &str) -> Result<Vec<Directory>, Error> {
    let root = Directory::root(drive.get_root_id().await?, root_path);
    let folders = drive.get_directories().await?;
    println!("Loaded directory list ({} els).", folders.len());

    let dirs = build_directory_tree(&root, &folders);
    create_dir_all(Path::new(root.path.as_str())).await?;
    let created = create_directories(&dirs).await?;
    println!("Created {} dirs", created);
    Ok(dirs)
}

fn directory_index(dirs: &[Directory]) -> HashMap<&str, &Directory> {
    dirs.iter().map(|d| (d.id(), d)).collect()
}

/// Local destination of `file`: its first parent's directory, or `root_path`
/// when that parent was not part of the restored tree.
pub fn local_path_for(
    dir_index: &HashMap<&str, &Directory>,
    root_path: &str,
    file: &File,
) -> Result<PathBuf, Error> {
    let name = file
        .name
        .as_ref()
        .ok_or_else(|| format_err!("No filename for {:?}", file.id))?;
    let dir = file
        .first_parent()
        .and_then(|p| dir_index.get(p))
        .map_or(root_path, |d| d.path.as_str());
    let name = name.replace('/', "_");
    Ok(PathBuf::from(format_sstr!("{dir}{name}").as_str()))
}

/// Download the newest revision of `file` older than `cutoff`, unless a local copy exists.
pub async fn download_file_revision_by_date(
    drive: &impl DriveApi,
    dir_index: &HashMap<&str, &Directory>,
    root_path: &str,
    file: &File,
    cutoff: NaiveDateTime,
) -> Result<DownloadOutcome, Error> {
    let fileid = file.id.as_ref().ok_or_else(|| format_err!("No ID"))?;
    let filepath = local_path_for(dir_index, root_path, file)?;

    if filepath.exists() {
        println!("File exists: {}", filepath.display());
        return Ok(DownloadOutcome::Exists);
    }
    if file.is_google_native() {
        println!(
            "Skip {} ({:?} has no downloadable revisions)",
            filepath.display(),
            file.mime_type
        );
        return Ok(DownloadOutcome::Skipped);
    }

    let revisions = drive.get_revisions(fileid).await?;
    debug!("{} revisions for {}", revisions.len(), fileid);
    match latest_revision_before(&revisions, cutoff) {
        Some(rev) => {
            let revisionid = rev.id.as_ref().ok_or_else(|| format_err!("No revision ID"))?;
            print!(
                "Rev.{} {}",
                rev.modified_time.as_deref().unwrap_or(""),
                filepath.display()
            );
            std::io::stdout().flush()?;
            drive
                .download_revision(fileid, revisionid, &filepath)
                .await?;
            println!(" End!");
            Ok(DownloadOutcome::Downloaded)
        }
        None => {
            println!("\nError get revision for file: {}\n", filepath.display());
            Ok(DownloadOutcome::NoRevision)
        }
    }
}

/// Rebuild the whole drive below `root_path` as it looked just before `cutoff`.
pub async fn recover_files_to_date(
    drive: &impl DriveApi,
    root_path: &str,
    cutoff: NaiveDateTime,
) -> Result<RecoverSummary, Error> {
    let dirs = build_local_tree(drive, root_path).await?;
    let dir_index = directory_index(&dirs);
    let root_path = Directory::root("", root_path).path;

    let files = drive.get_files().await?;
    println!("Loaded file list ({} els).", files.len());

    let mut summary = RecoverSummary {
        directories: dirs.len(),
        ..RecoverSummary::default()
    };
    for (i, file) in files.iter().enumerate() {
        print!("{:04} ", i + 1);
        match download_file_revision_by_date(drive, &dir_index, &root_path, file, cutoff).await {
            Ok(outcome) => summary.count(outcome),
            Err(e) => {
                println!();
                error!("failed to recover {:?}: {}", file.name, e);
                summary.failed += 1;
            }
        }
    }
    info!("{:?}", summary);
    Ok(summary)
}
