use anyhow::Error;
use log::debug;
use stack_string::{format_sstr, StackString};
use std::{collections::HashMap, path::Path};
use tokio::fs::create_dir_all;

use crate::directory_info::DirectoryInfo;

pub const PATH_SEPARATOR: char = '/';

/// A remote folder together with the local path it is restored to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directory {
    pub info: DirectoryInfo,
    pub path: StackString,
}

impl Directory {
    /// The anchor every other path hangs off. `path` always ends with a separator.
    pub fn root(root_id: impl Into<StackString>, path: &str) -> Self {
        let path = if path.ends_with(PATH_SEPARATOR) {
            path.into()
        } else {
            format_sstr!("{path}{PATH_SEPARATOR}")
        };
        Self {
            info: DirectoryInfo::new(root_id, "", Vec::<StackString>::new()),
            path,
        }
    }

    pub fn id(&self) -> &str {
        self.info.directory_id.as_str()
    }

    pub fn child(&self, info: DirectoryInfo) -> Self {
        let path = format_sstr!("{}{}{PATH_SEPARATOR}", self.path, info.directory_name);
        Self { info, path }
    }
}

/// Resolve the local path of every folder reachable from `root`.
///
/// Pre-order depth first, siblings in input order. A folder with several
/// parents is placed under whichever one is reached first and never again,
/// folders that cannot be reached from `root` are dropped.
pub fn build_directory_tree(root: &Directory, records: &[DirectoryInfo]) -> Vec<Directory> {
    let mut children: HashMap<&str, Vec<usize>> = HashMap::new();
    for (idx, record) in records.iter().enumerate() {
        for parentid in &record.parentids {
            children.entry(parentid.as_str()).or_default().push(idx);
        }
    }

    let mut consumed = vec![false; records.len()];
    let mut output: Vec<Directory> = Vec::with_capacity(records.len());
    // (record index, position of the anchor in `output`, `None` is the root)
    let mut stack: Vec<(usize, Option<usize>)> = Vec::new();

    if let Some(kids) = children.get(root.id()) {
        stack.extend(kids.iter().rev().map(|idx| (*idx, None)));
    }

    while let Some((idx, anchor)) = stack.pop() {
        if consumed[idx] {
            continue;
        }
        consumed[idx] = true;
        let record = &records[idx];
        let directory = match anchor {
            Some(pos) => output[pos].child(record.clone()),
            None => root.child(record.clone()),
        };
        output.push(directory);
        let position = output.len() - 1;
        if let Some(kids) = children.get(record.directory_id.as_str()) {
            stack.extend(
                kids.iter()
                    .rev()
                    .filter(|idx| !consumed[**idx])
                    .map(|idx| (*idx, Some(position))),
            );
        }
    }
    debug!(
        "resolved {} of {} folders under {}",
        output.len(),
        records.len(),
        root.path
    );
    output
}

/// Create every directory locally, returns how many were handled.
pub async fn create_directories(dirs: &[Directory]) -> Result<usize, Error> {
    let mut created = 0;
    for dir in dirs {
        create_dir_all(Path::new(dir.path.as_str())).await?;
        created += 1;
    }
    Ok(created)
}
