//! Values file resolution and `--set` overrides.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{HelmError, HelmResult};
use crate::workspace::absolutize;

/// Values handed to `helm template`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedValues {
    /// Absolute path of the values file, if one was requested
    pub values_file: Option<PathBuf>,
    /// `--set key=value` arguments, one pair per override
    pub set_args: Vec<String>,
}

/// Resolves a values reference and override map into template arguments.
pub struct ValuesResolver;

impl ValuesResolver {
    /// Resolve `reference` and build the override arguments.
    pub fn resolve(
        reference: &str,
        chart_dir: &Path,
        overrides: &BTreeMap<String, String>,
    ) -> HelmResult<ResolvedValues> {
        Ok(ResolvedValues {
            values_file: Self::resolve_file(reference, chart_dir)?,
            set_args: Self::set_args(overrides),
        })
    }

    /// Find the values file for `reference`.
    ///
    /// The reference is tried as given (absolute, or relative to the process
    /// working directory) and then relative to `chart_dir`. Only regular
    /// files qualify. An empty reference means no values file.
    pub fn resolve_file(reference: &str, chart_dir: &Path) -> HelmResult<Option<PathBuf>> {
        if reference.is_empty() {
            debug!("No values file requested");
            return Ok(None);
        }

        let literal = Path::new(reference);
        let found = if literal.is_file() {
            literal.to_path_buf()
        } else {
            let under_chart = chart_dir.join(reference);
            if !under_chart.is_file() {
                return Err(HelmError::ValuesNotFound {
                    reference: reference.to_string(),
                    chart_dir: chart_dir.to_path_buf(),
                });
            }
            under_chart
        };

        let resolved = absolutize(&found)?;
        debug!("Resolved values file {} to {:?}", reference, resolved);
        Ok(Some(resolved))
    }

    /// `--set key=value` arguments for each override.
    pub fn set_args(overrides: &BTreeMap<String, String>) -> Vec<String> {
        overrides
            .iter()
            .flat_map(|(key, value)| ["--set".to_string(), format!("{}={}", key, value)])
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_empty_reference_means_no_file() {
        let dir = tempdir().unwrap();
        let resolved = ValuesResolver::resolve_file("", dir.path()).unwrap();
        assert_eq!(resolved, None);
    }

    #[test]
    fn test_absolute_reference() {
        let dir = tempdir().unwrap();
        let values = dir.path().join("custom.yaml");
        fs::write(&values, "replicas: 2\n").unwrap();

        let resolved =
            ValuesResolver::resolve_file(values.to_str().unwrap(), Path::new("/nonexistent"))
                .unwrap();
        assert_eq!(resolved, Some(values));
    }

    #[test]
    fn test_reference_relative_to_chart_dir() {
        let chart = tempdir().unwrap();
        fs::write(chart.path().join("values-chartdeploy-test.yaml"), "a: b\n").unwrap();

        let resolved =
            ValuesResolver::resolve_file("values-chartdeploy-test.yaml", chart.path()).unwrap();
        assert_eq!(
            resolved,
            Some(chart.path().join("values-chartdeploy-test.yaml"))
        );
    }

    #[test]
    fn test_missing_reference_fails() {
        let chart = tempdir().unwrap();

        let err = ValuesResolver::resolve_file("values-missing.yaml", chart.path()).unwrap_err();
        match err {
            HelmError::ValuesNotFound {
                reference,
                chart_dir,
            } => {
                assert_eq!(reference, "values-missing.yaml");
                assert_eq!(chart_dir, chart.path());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_directory_reference_is_not_a_values_file() {
        let chart = tempdir().unwrap();
        fs::create_dir(chart.path().join("templates")).unwrap();

        let err = ValuesResolver::resolve_file("templates", chart.path()).unwrap_err();
        assert!(matches!(
            err,
            HelmError::ValuesNotFound { ref reference, .. } if reference == "templates"
        ));

        let dir_path = chart.path().join("templates");
        let err = ValuesResolver::resolve_file(dir_path.to_str().unwrap(), chart.path())
            .unwrap_err();
        assert!(matches!(err, HelmError::ValuesNotFound { .. }));
    }

    #[test]
    fn test_set_args() {
        let mut overrides = BTreeMap::new();
        overrides.insert("image.tag".to_string(), "v2".to_string());
        overrides.insert("global.hub".to_string(), "docker.io/istio".to_string());

        let args = ValuesResolver::set_args(&overrides);

        assert_eq!(
            args,
            vec![
                "--set",
                "global.hub=docker.io/istio",
                "--set",
                "image.tag=v2",
            ]
        );
    }

    #[test]
    fn test_resolve_combines_file_and_overrides() {
        let chart = tempdir().unwrap();
        fs::write(chart.path().join("values.yaml"), "").unwrap();
        let overrides = BTreeMap::from([("a".to_string(), "1".to_string())]);

        let resolved = ValuesResolver::resolve("values.yaml", chart.path(), &overrides).unwrap();

        assert!(resolved.values_file.unwrap().is_absolute());
        assert_eq!(resolved.set_args, vec!["--set", "a=1"]);
    }
}
