//! Post-build cleanup of a standalone deployment bundle.
//!
//! The bundle ships a full `node_modules` tree. Image tooling and the
//! TypeScript compiler are never loaded at runtime, and the database client
//! carries WASM engines for every supported database when only PostgreSQL is
//! used.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use serde::Serialize;

/// Packages removed from `node_modules` unless overridden.
pub const DEFAULT_PACKAGES: &[&str] = &["sharp", "typescript"];

/// Database engines whose runtime files are dropped. PostgreSQL is kept.
const UNUSED_ENGINES: [&str; 4] = ["mysql", "sqlite", "sqlserver", "cockroachdb"];

const ENGINE_SUFFIXES: [&str; 2] = [".wasm-base64.js", ".wasm-base64.mjs"];

/// Errors from standalone bundle cleanup.
#[derive(thiserror::Error, Debug)]
pub enum PruneError {
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Invalid package name '{0}': expected 'name' or '@scope/name'")]
    InvalidPackage(String),
    #[error("Failed to remove {}: {source}", .path.display())]
    Remove {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// What to prune and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PruneOptions {
    /// The standalone bundle root, normally `<project>/.next/standalone`.
    pub standalone_dir: PathBuf,
    /// Package directories to delete from `node_modules`.
    pub packages: Vec<String>,
    /// Report what would be removed without touching the filesystem.
    pub dry_run: bool,
}

impl PruneOptions {
    /// Default options for a project rooted at `project_root`.
    pub fn for_project(project_root: &Path) -> Self {
        Self {
            standalone_dir: project_root.join(".next").join("standalone"),
            packages: DEFAULT_PACKAGES.iter().map(|p| p.to_string()).collect(),
            dry_run: false,
        }
    }

    pub fn with_packages(mut self, packages: Vec<String>) -> Self {
        self.packages = packages;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// Paths removed (or, on a dry run, that would have been removed).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PruneReport {
    pub removed: Vec<PathBuf>,
    pub dry_run: bool,
}

impl PruneReport {
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty()
    }
}

/// True for database-client runtime files that belong to an unused engine.
pub fn is_unused_engine(file_name: &str) -> bool {
    UNUSED_ENGINES.iter().any(|engine| file_name.contains(engine))
        && ENGINE_SUFFIXES.iter().any(|suffix| file_name.ends_with(suffix))
}

/// Check that `name` stays inside `node_modules`: a single plain component,
/// or `@scope/name`.
pub fn validate_package(name: &str) -> Result<(), PruneError> {
    let invalid = || PruneError::InvalidPackage(name.to_string());
    let parts: Vec<&str> = Path::new(name)
        .components()
        .map(|c| match c {
            Component::Normal(part) => part.to_str().ok_or_else(invalid),
            _ => Err(invalid()),
        })
        .collect::<Result<_, _>>()?;
    match parts.as_slice() {
        [single] if !single.starts_with('@') => Ok(()),
        [scope, pkg] if scope.len() > 1 && scope.starts_with('@') && !pkg.starts_with('@') => {
            Ok(())
        }
        _ => Err(invalid()),
    }
}

/// Prune the standalone bundle described by `opts`.
///
/// A missing bundle directory is not an error; the report is simply empty.
pub fn prune_standalone(opts: &PruneOptions) -> Result<PruneReport, PruneError> {
    for package in &opts.packages {
        validate_package(package)?;
    }

    let mut report = PruneReport {
        removed: Vec::new(),
        dry_run: opts.dry_run,
    };

    if !opts.standalone_dir.is_dir() {
        tracing::debug!(
            "No standalone bundle at {}, nothing to prune",
            opts.standalone_dir.display()
        );
        return Ok(report);
    }

    tracing::info!("Cleaning up {}...", opts.standalone_dir.display());
    let node_modules = opts.standalone_dir.join("node_modules");

    for package in &opts.packages {
        let path = node_modules.join(package);
        if path.exists() {
            tracing::info!("Removing {}...", package);
            remove(&path, opts.dry_run)?;
            report.removed.push(path);
        }
    }

    let runtime = node_modules.join("@prisma").join("client").join("runtime");
    if runtime.is_dir() {
        tracing::info!("Cleaning Prisma runtime...");
        let mut names: Vec<String> = fs::read_dir(&runtime)
            .map_err(|source| PruneError::Read {
                path: runtime.clone(),
                source,
            })?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| is_unused_engine(name))
            .collect();
        names.sort();

        for name in names {
            tracing::info!("Removing {}...", name);
            let path = runtime.join(&name);
            remove(&path, opts.dry_run)?;
            report.removed.push(path);
        }
    }

    Ok(report)
}

fn remove(path: &Path, dry_run: bool) -> Result<(), PruneError> {
    if dry_run {
        return Ok(());
    }
    let result = if path.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    match result {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(PruneError::Remove {
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unused_engine_matching() {
        assert!(is_unused_engine("query_engine_bg.mysql.wasm-base64.js"));
        assert!(is_unused_engine("query_engine_bg.sqlite.wasm-base64.mjs"));
        assert!(is_unused_engine("query_compiler_bg.sqlserver.wasm-base64.js"));
        assert!(is_unused_engine("query_engine_bg.cockroachdb.wasm-base64.mjs"));
    }

    #[test]
    fn kept_runtime_files() {
        assert!(!is_unused_engine("query_engine_bg.postgresql.wasm-base64.js"));
        assert!(!is_unused_engine("query_engine_bg.mysql.wasm"));
        assert!(!is_unused_engine("query_engine_bg.mysql.js"));
        assert!(!is_unused_engine("library.js"));
    }

    #[test]
    fn options_for_project() {
        let opts = PruneOptions::for_project(Path::new("/srv/app"));
        assert_eq!(opts.standalone_dir, Path::new("/srv/app/.next/standalone"));
        assert_eq!(opts.packages, vec!["sharp", "typescript"]);
        assert!(!opts.dry_run);

        let opts = opts.with_packages(vec!["esbuild".to_string()]).with_dry_run(true);
        assert_eq!(opts.packages, vec!["esbuild"]);
        assert!(opts.dry_run);
    }

    #[test]
    fn package_names_inside_node_modules() {
        assert!(validate_package("sharp").is_ok());
        assert!(validate_package("@img/sharp-linux-x64").is_ok());
    }

    #[test]
    fn package_names_escaping_node_modules() {
        for name in ["", "/etc", "../outside", "a/../../b", "./sharp", "@scope", "a/b", "@/x", "@a/@b"] {
            assert!(
                matches!(validate_package(name), Err(PruneError::InvalidPackage(_))),
                "{name:?} should be rejected"
            );
        }
    }

    #[test]
    fn missing_bundle_is_a_no_op() {
        let opts = PruneOptions::for_project(Path::new("/definitely/not/here"));
        let report = prune_standalone(&opts).unwrap();
        assert!(report.is_empty());
    }

    #[test]
    fn prune_error_display() {
        let err = PruneError::Remove {
            path: PathBuf::from("/x/sharp"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.to_string(), "Failed to remove /x/sharp: denied");
    }
}
