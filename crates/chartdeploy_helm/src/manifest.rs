//! Manifest assembly and persistence.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{HelmError, HelmResult};

const NAMESPACE_TEMPLATE: &str = "apiVersion: v1
kind: Namespace
metadata:
  name: {namespace}
  labels:
    istio-injection: disabled
";

/// Namespace document for `namespace`, with sidecar injection disabled.
pub fn namespace_manifest(namespace: &str) -> String {
    NAMESPACE_TEMPLATE.replace("{namespace}", namespace)
}

/// Prepend the Namespace document to the rendered chart.
///
/// The documents are separated by a blank line. A `---` marker is added when
/// the rendered text does not start with one, so the Namespace never merges
/// into the chart's first document.
pub fn assemble_manifest(namespace: &str, rendered: &str) -> String {
    let mut manifest = namespace_manifest(namespace);
    manifest.push('\n');
    if !rendered.trim_start().starts_with("---") {
        manifest.push_str("---\n");
    }
    manifest.push_str(rendered);
    manifest
}

/// Write `content` to `path`, replacing any existing file.
pub fn write_manifest(path: &Path, content: &str) -> HelmResult<()> {
    debug!("Writing manifest to {:?}", path);

    let persistence = |source| HelmError::Persistence {
        path: path.to_path_buf(),
        source,
    };

    fs::write(path, content).map_err(persistence)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o777)).map_err(persistence)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_namespace_manifest() {
        assert_eq!(
            namespace_manifest("test-ns"),
            "apiVersion: v1\nkind: Namespace\nmetadata:\n  name: test-ns\n  \
             labels:\n    istio-injection: disabled\n"
        );
    }

    #[test]
    fn test_assemble_keeps_existing_separator() {
        let rendered = "---\n# Source: app/templates/service.yaml\nkind: Service\n";
        let manifest = assemble_manifest("test-ns", rendered);

        assert!(manifest.starts_with(&namespace_manifest("test-ns")));
        assert!(manifest.ends_with(&format!("disabled\n\n{}", rendered)));
    }

    #[test]
    fn test_assemble_adds_separator() {
        let manifest = assemble_manifest("test-ns", "kind: Service\n");
        assert!(manifest.ends_with("disabled\n\n---\nkind: Service\n"));
    }

    #[test]
    fn test_write_overwrites() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test-ns-1.yaml");

        write_manifest(&path, "first").unwrap();
        write_manifest(&path, "second").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
    }

    #[cfg(unix)]
    #[test]
    fn test_write_sets_permissive_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("test-ns-1.yaml");
        write_manifest(&path, "kind: Namespace\n").unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o777);
    }

    #[test]
    fn test_write_into_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("test-ns-1.yaml");

        let err = write_manifest(&path, "x").unwrap_err();
        assert!(matches!(err, HelmError::Persistence { path: ref p, .. } if *p == path));
    }
}
