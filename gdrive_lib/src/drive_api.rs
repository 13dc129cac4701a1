use anyhow::Error;
use async_trait::async_trait;
use log::warn;
use stack_string::{format_sstr, StackString};
use std::{convert::TryFrom, path::Path};

use crate::{
    directory_info::DirectoryInfo,
    drive_v3_types::{File, Revision, FOLDER_MIME_TYPE},
};

pub const FOLDER_FIELDS: &str = "files(id, name, parents)";
pub const FILE_FIELDS: &str = "files(id, name, parents, mimeType)";

/// Escape a literal for use inside a single quoted Drive query string.
pub fn escape_query_value(value: &str) -> StackString {
    value.replace('\\', r"\\").replace('\'', r"\'").into()
}

/// The Drive operations the restore workflows are built from.
#[async_trait]
pub trait DriveApi: Send + Sync {
    /// Every page of `files.list` for `query`, `fields` selects the `files(..)` mask.
    async fn get_all_files(&self, query: &str, fields: &str) -> Result<Vec<File>, Error>;

    async fn get_root_id(&self) -> Result<StackString, Error>;

    async fn get_revisions(&self, fileid: &str) -> Result<Vec<Revision>, Error>;

    async fn download_revision(
        &self,
        fileid: &str,
        revisionid: &str,
        local: &Path,
    ) -> Result<(), Error>;

    async fn delete_revision(&self, fileid: &str, revisionid: &str) -> Result<(), Error>;

    async fn rename(&self, fileid: &str, new_name: &str) -> Result<(), Error>;

    async fn delete_permanently(&self, fileid: &str) -> Result<(), Error>;

    async fn get_directories(&self) -> Result<Vec<DirectoryInfo>, Error> {
        let query = format_sstr!("mimeType = '{FOLDER_MIME_TYPE}' and trashed = false");
        let folders = self.get_all_files(&query, FOLDER_FIELDS).await?;
        Ok(folders
            .iter()
            .filter_map(|f| match DirectoryInfo::try_from(f) {
                Ok(d) => Some(d),
                Err(e) => {
                    warn!("skipping folder {:?}: {}", f.id, e);
                    None
                }
            })
            .collect())
    }

    async fn get_files(&self) -> Result<Vec<File>, Error> {
        let query = format_sstr!("mimeType != '{FOLDER_MIME_TYPE}' and trashed = false");
        self.get_all_files(&query, FILE_FIELDS).await
    }

    async fn get_files_with_name(&self, name: &str) -> Result<Vec<File>, Error> {
        let query = format_sstr!(
            "name = '{}' and trashed = false",
            escape_query_value(name)
        );
        self.get_all_files(&query, "files(id, name)").await
    }
}

#[cfg(test)]
mod tests {
    use crate::drive_api::escape_query_value;

    #[test]
    fn test_escape_query_value() {
        assert_eq!(escape_query_value("plain.txt").as_str(), "plain.txt");
        assert_eq!(escape_query_value("it's").as_str(), r"it\'s");
        assert_eq!(escape_query_value(r"a\b").as_str(), r"a\\b");
    }
}
