use anyhow::Error;
use log::debug;
use std::path::{Path, PathBuf};
use tokio::{
    fs::{File, OpenOptions},
    io::AsyncWriteExt,
};

pub const RUN_SEPARATOR: &str = "\n========================================\n";

/// Plain text list of files that need manual attention.
///
/// Appended to on every run, never truncated.
pub struct FailureLog {
    path: PathBuf,
    file: File,
    entries: usize,
}

impl FailureLog {
    /// Open `path` for appending and start a new run block.
    pub async fn open(path: &Path) -> Result<Self, Error> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await?;
        file.write_all(RUN_SEPARATOR.as_bytes()).await?;
        file.flush().await?;
        debug!("failure log {:?}", path);
        Ok(Self {
            path: path.to_path_buf(),
            file,
            entries: 0,
        })
    }

    pub async fn record(&mut self, line: &str) -> Result<(), Error> {
        self.file.write_all(line.as_bytes()).await?;
        self.file.write_all(b"\n").await?;
        self.file.flush().await?;
        self.entries += 1;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries(&self) -> usize {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Error;
    use tempdir::TempDir;
    use tokio::fs::read_to_string;

    use crate::failure_log::{FailureLog, RUN_SEPARATOR};

    #[tokio::test]
    async fn test_failure_log_appends_runs() -> Result<(), Error> {
        let t = TempDir::new("test_failure_log")?;
        let path = t.path().join("DontRestoredFiles.txt");

        let mut log = FailureLog::open(&path).await?;
        log.record("a.doc.CTB-Locker").await?;
        assert_eq!(log.entries(), 1);
        drop(log);

        let mut log = FailureLog::open(&path).await?;
        log.record("b.xls.CTB-Locker").await?;
        assert_eq!(log.path(), path.as_path());
        drop(log);

        let contents = read_to_string(&path).await?;
        assert_eq!(
            contents,
            format!(
                "{sep}a.doc.CTB-Locker\n{sep}b.xls.CTB-Locker\n",
                sep = RUN_SEPARATOR
            )
        );
        Ok(())
    }
}
