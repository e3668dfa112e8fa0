//! Where artifacts are written to and restored from.

use std::fs;
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;

use tabvault_core::{ARTIFACT_SUFFIX, CoreError, artifact::is_artifact_name, artifact_file_name};

use crate::error::StoreResult;

/// Chooses artifact locations for backups and restores.
pub trait ArtifactLocator: Send + Sync {
    /// Path the backup of `table` is written to.
    fn backup_destination(&self, table: &str) -> StoreResult<PathBuf>;

    /// Artifact to restore: the named file, or a default choice when `None`.
    fn restore_source(&self, file_name: Option<&str>) -> StoreResult<PathBuf>;
}

/// Keeps every artifact in one directory.
///
/// Restores without a file name pick the most recently modified artifact.
#[derive(Debug, Clone)]
pub struct BackupDirectory {
    root: PathBuf,
}

impl BackupDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn newest_artifact(&self) -> StoreResult<PathBuf> {
        let not_found = || CoreError::ArtifactNotFound {
            path: self.root.join(format!("*{ARTIFACT_SUFFIX}")).display().to_string(),
        };

        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(_) => return Err(not_found().into()),
        };

        let mut newest: Option<(SystemTime, PathBuf)> = None;
        for entry in entries.flatten() {
            let path = entry.path();
            let Ok(metadata) = entry.metadata() else {
                continue;
            };
            if !metadata.is_file() || !is_artifact_name(&path) {
                continue;
            }
            let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
            if newest.as_ref().is_none_or(|(current, _)| modified > *current) {
                newest = Some((modified, path));
            }
        }

        newest.map(|(_, path)| path).ok_or_else(|| not_found().into())
    }
}

impl ArtifactLocator for BackupDirectory {
    fn backup_destination(&self, table: &str) -> StoreResult<PathBuf> {
        fs::create_dir_all(&self.root).map_err(|source| CoreError::Write {
            path: self.root.display().to_string(),
            source,
        })?;
        Ok(self.root.join(artifact_file_name(table)))
    }

    fn restore_source(&self, file_name: Option<&str>) -> StoreResult<PathBuf> {
        let Some(file_name) = file_name else {
            return self.newest_artifact();
        };

        let mut components = Path::new(file_name).components();
        let is_bare_name = matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        );
        if !is_bare_name {
            return Err(CoreError::InvalidArtifactName {
                name: file_name.to_string(),
            }
            .into());
        }

        let path = self.root.join(file_name);
        if !path.is_file() {
            return Err(CoreError::ArtifactNotFound {
                path: path.display().to_string(),
            }
            .into());
        }
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tabvault_core::ErrorKind;

    fn touch(path: &Path, modified: SystemTime) {
        let file = fs::File::create(path).unwrap();
        file.set_modified(modified).unwrap();
    }

    #[test]
    fn test_backup_destination_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let locator = BackupDirectory::new(dir.path().join("backups"));

        let path = locator.backup_destination("jobs").unwrap();
        assert_eq!(path, dir.path().join("backups").join("jobs_backup.avro"));
        assert!(dir.path().join("backups").is_dir());
    }

    #[test]
    fn test_newest_artifact_is_selected() {
        let dir = tempfile::tempdir().unwrap();
        let now = SystemTime::now();
        touch(&dir.path().join("jobs_backup.avro"), now - Duration::from_secs(60));
        touch(&dir.path().join("departments_backup.avro"), now);
        touch(&dir.path().join("notes.avro"), now + Duration::from_secs(60));

        let locator = BackupDirectory::new(dir.path());
        assert_eq!(
            locator.restore_source(None).unwrap(),
            dir.path().join("departments_backup.avro")
        );
    }

    #[test]
    fn test_empty_directory_has_no_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let error = BackupDirectory::new(dir.path())
            .restore_source(None)
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::ArtifactNotFound);
    }

    #[test]
    fn test_named_artifact() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("jobs_backup.avro"), SystemTime::now());
        let locator = BackupDirectory::new(dir.path());

        assert_eq!(
            locator.restore_source(Some("jobs_backup.avro")).unwrap(),
            dir.path().join("jobs_backup.avro")
        );

        let error = locator.restore_source(Some("hired_employees_backup.avro")).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::ArtifactNotFound);

        let error = locator.restore_source(Some("../jobs_backup.avro")).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InvalidArtifactName);
    }
}
