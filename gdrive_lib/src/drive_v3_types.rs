//! Subset of the Drive v3 resources used by this workspace.
//!
//! Every field is optional: responses only carry what the `fields` mask asked for.

use serde_derive::{Deserialize, Serialize};

pub const DRIVE_SCOPE: &str = "https://www.googleapis.com/auth/drive";
pub const DRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v3/";
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";
pub const GOOGLE_APPS_MIME_PREFIX: &str = "application/vnd.google-apps.";

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct File {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parents: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trashed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_time: Option<String>,
}

impl File {
    pub fn first_parent(&self) -> Option<&str> {
        self.parents
            .as_ref()
            .and_then(|p| p.get(0))
            .map(String::as_str)
    }

    /// Docs, Sheets, Slides and friends: their content has no binary revisions to fetch.
    pub fn is_google_native(&self) -> bool {
        self.mime_type
            .as_ref()
            .map_or(false, |m| m.starts_with(GOOGLE_APPS_MIME_PREFIX))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct FileList {
    pub next_page_token: Option<String>,
    pub files: Option<Vec<File>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Revision {
    pub id: Option<String>,
    pub modified_time: Option<String>,
    pub original_filename: Option<String>,
    pub mime_type: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct RevisionList {
    pub next_page_token: Option<String>,
    pub revisions: Option<Vec<Revision>>,
}

#[cfg(test)]
mod tests {
    use anyhow::Error;

    use crate::drive_v3_types::{File, FileList, RevisionList};

    #[test]
    fn test_deserialize_file_list() -> Result<(), Error> {
        let body = r#"{
            "nextPageToken": "abc",
            "files": [
                {"id": "1", "name": "report.doc", "parents": ["p0"], "mimeType": "application/msword"},
                {"id": "2", "name": "Budget", "mimeType": "application/vnd.google-apps.spreadsheet"}
            ]
        }"#;
        let list: FileList = serde_json::from_str(body)?;
        assert_eq!(list.next_page_token.as_deref(), Some("abc"));
        let files = list.files.unwrap_or_default();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].first_parent(), Some("p0"));
        assert!(!files[0].is_google_native());
        assert_eq!(files[1].first_parent(), None);
        assert!(files[1].is_google_native());
        Ok(())
    }

    #[test]
    fn test_deserialize_revision_list() -> Result<(), Error> {
        let body = r#"{"revisions": [
            {"id": "r1", "modifiedTime": "2017-05-10T10:00:00.000Z", "originalFilename": "a.doc"}
        ]}"#;
        let list: RevisionList = serde_json::from_str(body)?;
        assert!(list.next_page_token.is_none());
        let revisions = list.revisions.unwrap_or_default();
        assert_eq!(revisions[0].original_filename.as_deref(), Some("a.doc"));
        Ok(())
    }

    #[test]
    fn test_rename_body_only_has_name() -> Result<(), Error> {
        let f = File {
            name: Some("a.doc".into()),
            ..File::default()
        };
        assert_eq!(serde_json::to_string(&f)?, r#"{"name":"a.doc"}"#);
        Ok(())
    }
}
