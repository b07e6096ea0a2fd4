use std::{
    fmt, fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use tracing::info;

use super::PlanDocument;

/// File system errors surfaced to front-end tooling.
#[derive(Debug)]
pub enum PlanIoError {
    Missing {
        path: PathBuf,
    },
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },
    Serialize {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl fmt::Display for PlanIoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanIoError::Missing { path } => {
                write!(f, "missing plan file: {}", path.display())
            }
            PlanIoError::Io { path, source } => {
                write!(f, "I/O error for {}: {}", path.display(), source)
            }
            PlanIoError::Corrupt { path, source } => {
                write!(f, "failed to parse {}: {}", path.display(), source)
            }
            PlanIoError::Serialize { path, source } => {
                write!(f, "failed to serialize {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for PlanIoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PlanIoError::Missing { .. } => None,
            PlanIoError::Io { source, .. } => Some(source),
            PlanIoError::Corrupt { source, .. } => Some(source),
            PlanIoError::Serialize { source, .. } => Some(source),
        }
    }
}

/// Read and parse a plan file. A parse failure reports the path; nothing is
/// mutated on any failure path, so the caller's model stays intact.
pub fn read_plan_file(path: impl AsRef<Path>) -> Result<PlanDocument, PlanIoError> {
    let path = path.as_ref();
    let data = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            return Err(PlanIoError::Missing {
                path: path.to_path_buf(),
            });
        }
        Err(err) => {
            return Err(PlanIoError::Io {
                path: path.to_path_buf(),
                source: err,
            });
        }
    };

    let doc: PlanDocument = serde_json::from_str(&data).map_err(|source| PlanIoError::Corrupt {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), objects = doc.objects.len(), "loaded plan file");
    Ok(doc)
}

/// Write a plan file as pretty JSON, creating parent directories when
/// needed.
pub fn write_plan_file(path: impl AsRef<Path>, doc: &PlanDocument) -> Result<(), PlanIoError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if let Err(err) = fs::create_dir_all(parent) {
            return Err(PlanIoError::Io {
                path: parent.to_path_buf(),
                source: err,
            });
        }
    }

    let payload = serde_json::to_string_pretty(doc).map_err(|source| PlanIoError::Serialize {
        path: path.to_path_buf(),
        source,
    })?;

    fs::write(path, payload).map_err(|source| PlanIoError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), objects = doc.objects.len(), "wrote plan file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::TerrainGrid;
    use crate::objects::ObjectSet;
    use tempfile::tempdir;

    #[test]
    fn file_round_trip() {
        let temp = tempdir().expect("temp dir");
        let path = temp.path().join("plans/garden.json");

        let doc = crate::plan::save(&TerrainGrid::new(10, 10), &ObjectSet::new());
        write_plan_file(&path, &doc).expect("writes through missing parents");
        let back = read_plan_file(&path).expect("reads back");
        assert_eq!(back, doc);
    }

    #[test]
    fn missing_and_corrupt_files_are_distinct_errors() {
        let temp = tempdir().expect("temp dir");
        let absent = temp.path().join("nope.json");
        assert!(matches!(
            read_plan_file(&absent),
            Err(PlanIoError::Missing { .. })
        ));

        let garbled = temp.path().join("garbled.json");
        fs::write(&garbled, "{\"version\": ").expect("write");
        assert!(matches!(
            read_plan_file(&garbled),
            Err(PlanIoError::Corrupt { .. })
        ));
    }
}
