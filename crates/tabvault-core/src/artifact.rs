//! Artifact naming contract: `{table_identity}_backup.avro`.

use std::path::Path;

use crate::error::{CoreError, CoreResult};

/// Suffix every artifact file name carries.
pub const ARTIFACT_SUFFIX: &str = "_backup.avro";

/// File name of the artifact for a table identity.
pub fn artifact_file_name(table: &str) -> String {
    format!("{table}{ARTIFACT_SUFFIX}")
}

/// Derive the table identity from an artifact path's file name.
///
/// The identity is whatever precedes the suffix; it is not checked against the
/// catalog here.
///
/// ```rust
/// use std::path::Path;
/// use tabvault_core::table_identity_from_path;
///
/// assert_eq!(table_identity_from_path(Path::new("/backups/jobs_backup.avro")).unwrap(), "jobs");
/// assert!(table_identity_from_path(Path::new("jobs.avro")).is_err());
/// ```
pub fn table_identity_from_path(path: &Path) -> CoreResult<String> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();

    match name.strip_suffix(ARTIFACT_SUFFIX) {
        Some(identity) if !identity.is_empty() => Ok(identity.to_string()),
        _ => Err(CoreError::InvalidArtifactName {
            name: path.display().to_string(),
        }),
    }
}

/// Whether a path looks like an artifact by name alone.
pub fn is_artifact_name(path: &Path) -> bool {
    table_identity_from_path(path).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use rstest::rstest;

    #[rstest]
    #[case("jobs_backup.avro", "jobs")]
    #[case("/srv/backups/hired_employees_backup.avro", "hired_employees")]
    #[case("departments_backup.avro", "departments")]
    #[case("widgets_backup.avro", "widgets")]
    fn test_identity_from_valid_names(#[case] path: &str, #[case] expected: &str) {
        assert_eq!(table_identity_from_path(Path::new(path)).unwrap(), expected);
    }

    #[rstest]
    #[case("jobs.avro")]
    #[case("jobs_backup.avro.tmp")]
    #[case("_backup.avro")]
    #[case("jobs_backup.AVRO")]
    #[case("")]
    fn test_invalid_names(#[case] path: &str) {
        let error = table_identity_from_path(Path::new(path)).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InvalidArtifactName);
    }

    #[test]
    fn test_file_name_round_trip() {
        let name = artifact_file_name("jobs");
        assert_eq!(name, "jobs_backup.avro");
        assert_eq!(table_identity_from_path(Path::new(&name)).unwrap(), "jobs");
    }
}
