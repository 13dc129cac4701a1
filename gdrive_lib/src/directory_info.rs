use anyhow::{format_err, Error};
use stack_string::StackString;
use std::convert::TryFrom;

use crate::drive_v3_types::File;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryInfo {
    pub directory_id: StackString,
    pub directory_name: StackString,
    pub parentids: Vec<StackString>,
}

impl DirectoryInfo {
    pub fn new(
        directory_id: impl Into<StackString>,
        directory_name: impl Into<StackString>,
        parentids: impl IntoIterator<Item = impl Into<StackString>>,
    ) -> Self {
        Self {
            directory_id: directory_id.into(),
            directory_name: directory_name.into(),
            parentids: parentids.into_iter().map(Into::into).collect(),
        }
    }
}

impl TryFrom<&File> for DirectoryInfo {
    type Error = Error;

    fn try_from(item: &File) -> Result<Self, Self::Error> {
        let directory_id = item.id.as_ref().ok_or_else(|| format_err!("No ID"))?;
        let directory_name = item
            .name
            .as_ref()
            .ok_or_else(|| format_err!("No name for folder {}", directory_id))?;
        let parentids = item.parents.clone().unwrap_or_default();
        Ok(Self::new(
            directory_id.as_str(),
            directory_name.as_str(),
            parentids,
        ))
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Error;
    use std::convert::TryFrom;

    use crate::{directory_info::DirectoryInfo, drive_v3_types::File};

    #[test]
    fn test_from_file() -> Result<(), Error> {
        let f = File {
            id: Some("abc".into()),
            name: Some("Photos".into()),
            parents: Some(vec!["root0".into(), "other".into()]),
            ..File::default()
        };
        let d = DirectoryInfo::try_from(&f)?;
        assert_eq!(d.directory_id.as_str(), "abc");
        assert_eq!(d.directory_name.as_str(), "Photos");
        let parents: Vec<_> = d.parentids.iter().map(|p| p.as_str()).collect();
        assert_eq!(parents, vec!["root0", "other"]);
        Ok(())
    }

    #[test]
    fn test_from_file_without_name() {
        let f = File {
            id: Some("abc".into()),
            ..File::default()
        };
        assert!(DirectoryInfo::try_from(&f).is_err());
    }
}
