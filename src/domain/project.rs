//! Project identity and the resolved CI environment
//!
//! Architecture: Value Objects - the identifier and environment are built once and never mutated
//! - Resolution reads variables through an injected lookup, never through globals
//! - Every later stage receives the resolved `Environment` explicitly

use crate::domain::errors::{ScrutinizeError, ScrutinizeResult};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Variable carrying the Scrutinizer project identifier, e.g. `g/acme/widgets`
pub const PROJECT_VAR: &str = "SCRUTINIZER_PROJECT";
/// Optional override of the Go tool directory
pub const GOPATH_VAR: &str = "GOPATH";
/// Home directory used for the default tool directory
pub const HOME_VAR: &str = "HOME";

lazy_static! {
    static ref GITHUB_MARKER: Regex = Regex::new("^g").expect("static regex");
    static ref BITBUCKET_MARKER: Regex = Regex::new("^b").expect("static regex");
}

/// Fully expanded project identifier: `<domain>/<owner>/<project>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectIdentifier {
    pub domain: String,
    pub owner: String,
    pub project: String,
}

impl ProjectIdentifier {
    /// Expand the host marker and split into three parts.
    ///
    /// The markers are replaced blindly: `g` becomes `github.com` and then a
    /// leading `b` becomes `bitbucket.com`. An identifier that already starts
    /// with a hostname is expanded all the same (`github.com/x/y` turns into
    /// `github.comithub.com/x/y`).
    pub fn parse(raw: &str) -> ScrutinizeResult<Self> {
        let expanded = GITHUB_MARKER.replace(raw, "github.com");
        let expanded = BITBUCKET_MARKER.replace(&expanded, "bitbucket.com");

        let parts: Vec<&str> = expanded.split('/').collect();
        match parts.as_slice() {
            [domain, owner, project]
                if !domain.is_empty() && !owner.is_empty() && !project.is_empty() =>
            {
                Ok(Self {
                    domain: domain.to_string(),
                    owner: owner.to_string(),
                    project: project.to_string(),
                })
            }
            _ => Err(ScrutinizeError::malformed_project(raw)),
        }
    }

    /// The identifier joined back into a Go import path
    pub fn full(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ProjectIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.domain, self.owner, self.project)
    }
}

/// Everything the pipeline needs from the CI environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Environment {
    /// Resolved project
    pub project: ProjectIdentifier,
    /// Base directory of installed Go tools (GOPATH)
    pub tool_path: PathBuf,
}

impl Environment {
    /// Resolve from the process environment
    pub fn from_process() -> ScrutinizeResult<Self> {
        Self::resolve(|key| std::env::var(key).ok())
    }

    /// Resolve using the given variable lookup. Empty values count as unset.
    pub fn resolve<F>(lookup: F) -> ScrutinizeResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.is_empty());

        let raw = non_empty(PROJECT_VAR).ok_or_else(|| {
            ScrutinizeError::missing_env(
                PROJECT_VAR,
                "not running without scrutinizer environment",
            )
        })?;
        let project = ProjectIdentifier::parse(&raw)?;

        // Without HOME this still yields `/go`
        let tool_path = match non_empty(GOPATH_VAR) {
            Some(gopath) => PathBuf::from(gopath),
            None => PathBuf::from(format!("{}/go", lookup(HOME_VAR).unwrap_or_default())),
        };

        tracing::debug!(project = %project, tool_path = %tool_path.display(), "resolved environment");

        Ok(Self { project, tool_path })
    }

    /// Location of an installed tool binary: `<tool_path>/bin/<name>`
    pub fn tool_binary(&self, name: &str) -> PathBuf {
        self.tool_path.join("bin").join(name)
    }

    /// Checkout location of the project inside the tool directory, as a string
    /// so it can be matched literally inside reports
    pub fn project_source_path(&self) -> String {
        format!("{}/src/{}", self.tool_path.display(), self.project.full())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[rstest]
    #[case("g/acme/widgets", "github.com", "acme", "widgets")]
    #[case("b/acme/widgets", "bitbucket.com", "acme", "widgets")]
    #[case("gitlab.example/acme/widgets", "github.comitlab.example", "acme", "widgets")]
    #[case("example.org/acme/widgets", "example.org", "acme", "widgets")]
    fn test_parse_expands_markers(
        #[case] raw: &str,
        #[case] domain: &str,
        #[case] owner: &str,
        #[case] project: &str,
    ) {
        let id = ProjectIdentifier::parse(raw).unwrap();
        assert_eq!(id.domain, domain);
        assert_eq!(id.owner, owner);
        assert_eq!(id.project, project);
    }

    #[test]
    fn test_existing_hostname_is_expanded_blindly() {
        let id = ProjectIdentifier::parse("github.com/acme/widgets").unwrap();
        assert_eq!(id.domain, "github.comithub.com");
    }

    #[test]
    fn test_bitbucket_marker_does_not_apply_after_github_expansion() {
        let id = ProjectIdentifier::parse("g/acme/b").unwrap();
        assert_eq!(id.full(), "github.com/acme/b");
    }

    #[rstest]
    #[case("g/acme")]
    #[case("g/acme/widgets/extra")]
    #[case("g")]
    #[case("g//widgets")]
    #[case("g/acme/")]
    #[case("/acme/widgets")]
    fn test_parse_rejects_malformed(#[case] raw: &str) {
        let err = ProjectIdentifier::parse(raw).unwrap_err();
        assert!(matches!(err, ScrutinizeError::MalformedProject { .. }));
    }

    #[test]
    fn test_resolve_prefers_gopath() {
        let env = Environment::resolve(lookup(&[
            (PROJECT_VAR, "g/acme/widgets"),
            (GOPATH_VAR, "/opt/gopath"),
            (HOME_VAR, "/home/ci"),
        ]))
        .unwrap();

        assert_eq!(env.tool_path, PathBuf::from("/opt/gopath"));
        assert_eq!(env.project.full(), "github.com/acme/widgets");
        assert_eq!(env.tool_binary("gocov"), PathBuf::from("/opt/gopath/bin/gocov"));
        assert_eq!(env.project_source_path(), "/opt/gopath/src/github.com/acme/widgets");
    }

    #[test]
    fn test_resolve_defaults_tool_path_under_home() {
        let env = Environment::resolve(lookup(&[
            (PROJECT_VAR, "b/acme/widgets"),
            (GOPATH_VAR, ""),
            (HOME_VAR, "/home/ci"),
        ]))
        .unwrap();

        assert_eq!(env.tool_path, PathBuf::from("/home/ci/go"));
    }

    #[test]
    fn test_resolve_requires_project() {
        let err = Environment::resolve(lookup(&[(HOME_VAR, "/home/ci")])).unwrap_err();
        assert!(
            matches!(err, ScrutinizeError::MissingEnvironment { ref variable, .. } if variable == PROJECT_VAR)
        );

        let err =
            Environment::resolve(lookup(&[(HOME_VAR, "/home/ci"), (PROJECT_VAR, "")])).unwrap_err();
        assert!(matches!(err, ScrutinizeError::MissingEnvironment { .. }));
    }

    #[test]
    fn test_resolve_without_gopath_or_home() {
        let env = Environment::resolve(lookup(&[(PROJECT_VAR, "g/acme/widgets")])).unwrap();
        assert_eq!(env.tool_path, PathBuf::from("/go"));
        assert_eq!(env.project_source_path(), "/go/src/github.com/acme/widgets");
    }

    #[test]
    fn test_resolve_reports_project_before_tool_path() {
        let err = Environment::resolve(lookup(&[])).unwrap_err();
        assert!(
            matches!(err, ScrutinizeError::MissingEnvironment { ref variable, .. } if variable == PROJECT_VAR)
        );
    }

    #[test]
    fn test_full_matches_display() {
        let id = ProjectIdentifier::parse("b/acme/widgets").unwrap();
        assert_eq!(id.full(), id.to_string());
        assert_eq!(id.full(), "bitbucket.com/acme/widgets");
    }
}
