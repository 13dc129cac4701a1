use anyhow::{format_err, Error};
use chrono::NaiveDateTime;
use clap::Parser;
use gdrive_lib::gdrive_instance::GDriveInstance;
use stack_string::StackString;
use std::str::FromStr;

use crate::{
    config::Config,
    failure_log::FailureLog,
    recover::{build_local_tree, recover_files_to_date},
    restore::{delete_files_with_name, restore_locked_files},
    revision::parse_cutoff,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveRestoreCommands {
    Recover,
    Tree,
    Delete,
    Restore,
}

impl FromStr for DriveRestoreCommands {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "recover" | "r" => Ok(Self::Recover),
            "tree" | "t" => Ok(Self::Tree),
            "delete" | "d" => Ok(Self::Delete),
            "restore" => Ok(Self::Restore),
            _ => Err(format_err!("Parse failure")),
        }
    }
}

fn parse_commands_from_str(s: &str) -> Result<DriveRestoreCommands, String> {
    s.parse().map_err(|e| format!("{e}"))
}

fn parse_cutoff_from_str(s: &str) -> Result<NaiveDateTime, String> {
    parse_cutoff(s).map_err(|e| format!("{e}"))
}

#[derive(Parser, Debug, Clone)]
pub struct DriveRestoreOpts {
    #[clap(value_parser = parse_commands_from_str)]
    /// Available commands are "(r)ecover", "(t)ree", "(d)elete", "restore"
    pub command: DriveRestoreCommands,
    /// Cutoff for recover, files are restored as they were just before it
    /// (YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS)
    #[clap(short = 'd', long = "date", value_parser = parse_cutoff_from_str)]
    pub date: Option<NaiveDateTime>,
    /// Exact file name to delete
    #[clap(short = 'n', long = "name")]
    pub name: Option<StackString>,
    /// Marker appended to encrypted file names, overrides LOCKER_MARKER
    #[clap(short = 'm', long = "marker")]
    pub marker: Option<StackString>,
    /// Print what would change on the drive without changing it
    #[clap(long = "dry-run")]
    pub dry_run: bool,
}

impl DriveRestoreOpts {
    /// # Errors
    /// Return error if configuration, authentication or a drive listing fails
    pub async fn process_args() -> Result<(), Error> {
        let opts = Self::parse();
        let config = Config::init_config()?;
        opts.validate()?;

        let gdrive = GDriveInstance::new(
            &config.gdrive_token_path,
            &config.gdrive_secret_file,
            &config.gdrive_session_name,
        )
        .await?
        .with_page_size(config.page_size);

        opts.run(&config, &gdrive).await
    }

    pub fn validate(&self) -> Result<(), Error> {
        match self.command {
            DriveRestoreCommands::Recover if self.date.is_none() => {
                Err(format_err!("recover requires --date"))
            }
            DriveRestoreCommands::Delete if self.name.is_none() => {
                Err(format_err!("delete requires --name"))
            }
            _ => Ok(()),
        }
    }

    async fn run(&self, config: &Config, gdrive: &GDriveInstance) -> Result<(), Error> {
        let root_path = config.restore_root_str();
        match self.command {
            DriveRestoreCommands::Recover => {
                let cutoff = self.date.ok_or_else(|| format_err!("No cutoff date"))?;
                let summary = recover_files_to_date(gdrive, &root_path, cutoff).await?;
                println!("{:?}", summary);
            }
            DriveRestoreCommands::Tree => {
                build_local_tree(gdrive, &root_path).await?;
            }
            DriveRestoreCommands::Delete => {
                let name = self.name.as_ref().ok_or_else(|| format_err!("No name"))?;
                let summary = delete_files_with_name(gdrive, name, self.dry_run).await?;
                if summary.failed > 0 {
                    println!("{} files could not be deleted", summary.failed);
                }
            }
            DriveRestoreCommands::Restore => {
                let marker = self.marker.as_ref().unwrap_or(&config.locker_marker);
                let mut failure_log = FailureLog::open(&config.failure_log_path).await?;
                let summary =
                    restore_locked_files(gdrive, marker, &mut failure_log, self.dry_run).await?;
                println!("{:?}", summary);
                if failure_log.entries() > 0 {
                    println!(
                        "{} files need manual attention, see {:?}",
                        failure_log.entries(),
                        failure_log.path()
                    );
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Error;
    use clap::Parser;

    use crate::drive_restore_opts::{DriveRestoreCommands, DriveRestoreOpts};

    #[test]
    fn test_command_aliases() -> Result<(), Error> {
        assert_eq!(
            "r".parse::<DriveRestoreCommands>()?,
            DriveRestoreCommands::Recover
        );
        assert_eq!(
            "tree".parse::<DriveRestoreCommands>()?,
            DriveRestoreCommands::Tree
        );
        assert_eq!(
            "d".parse::<DriveRestoreCommands>()?,
            DriveRestoreCommands::Delete
        );
        assert!("unlock".parse::<DriveRestoreCommands>().is_err());
        Ok(())
    }

    #[test]
    fn test_parse_recover() -> Result<(), Error> {
        let opts = DriveRestoreOpts::try_parse_from(["drive-restore", "recover", "-d", "2017-05-12"])?;
        assert_eq!(opts.command, DriveRestoreCommands::Recover);
        assert_eq!(
            opts.date.map(|d| d.to_string()),
            Some("2017-05-12 00:00:00".to_string())
        );
        opts.validate()?;
        Ok(())
    }

    #[test]
    fn test_validate_missing_arguments() -> Result<(), Error> {
        let opts = DriveRestoreOpts::try_parse_from(["drive-restore", "recover"])?;
        assert!(opts.validate().is_err());
        let opts = DriveRestoreOpts::try_parse_from(["drive-restore", "delete"])?;
        assert!(opts.validate().is_err());
        let opts = DriveRestoreOpts::try_parse_from([
            "drive-restore",
            "delete",
            "-n",
            "README.TXT",
            "--dry-run",
        ])?;
        assert!(opts.dry_run);
        opts.validate()?;
        Ok(())
    }

    #[test]
    fn test_bad_date_rejected() {
        assert!(DriveRestoreOpts::try_parse_from(["drive-restore", "recover", "-d", "May 12"]).is_err());
    }
}
