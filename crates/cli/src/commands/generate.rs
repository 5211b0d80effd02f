//! Generate command implementation

use crate::error::{CliError, CliResult};
use crate::ops::session::{build_config, print_report, run_session, SessionOptions};
use crate::utils::config;

pub struct Options {
    /// `<name>/<version>`; the name may itself contain `/`
    pub api: Option<String>,
    pub name: Option<String>,
    pub version: Option<String>,
    pub session: SessionOptions,
}

fn determine_api(options: &Options) -> CliResult<(String, String)> {
    if let Some(api) = &options.api {
        return match api.trim_matches('/').rsplit_once('/') {
            Some((name, version)) if !name.is_empty() && !version.is_empty() => {
                Ok((name.to_string(), version.to_string()))
            }
            _ => Err(CliError::Message(format!(
                "Invalid --api '{api}': expected <name>/<version>"
            ))),
        };
    }

    match (&options.name, &options.version) {
        (Some(name), Some(version)) => Ok((name.clone(), version.clone())),
        _ => Err(CliError::Message(
            "Either --api <name>/<version> or both --name and --version must be provided"
                .to_string(),
        )),
    }
}

pub fn run(options: &Options) -> i32 {
    match run_inner(options) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("✗ Package generation failed");
            eprintln!("  Error: {e}");
            1
        }
    }
}

fn run_inner(options: &Options) -> CliResult<()> {
    let (name, version) = determine_api(options)?;
    let project = config::read_project_config()?;
    let repo_config = build_config(&options.session, &project, false)?;

    let report = run_session(repo_config, |session| async move {
        Ok(session.build_packages(&name, &version).await?)
    })?;

    print_report(&report);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(api: Option<&str>, name: Option<&str>, version: Option<&str>) -> Options {
        Options {
            api: api.map(str::to_string),
            name: name.map(str::to_string),
            version: version.map(str::to_string),
            session: SessionOptions::default(),
        }
    }

    #[test]
    fn test_determine_api_from_api_flag() {
        let (name, version) = determine_api(&options(Some("pubsub/v1"), None, None)).unwrap();
        assert_eq!((name.as_str(), version.as_str()), ("pubsub", "v1"));
    }

    #[test]
    fn test_determine_api_with_nested_name() {
        let (name, version) =
            determine_api(&options(Some("logging/type/v2"), None, None)).unwrap();
        assert_eq!((name.as_str(), version.as_str()), ("logging/type", "v2"));
    }

    #[test]
    fn test_determine_api_from_name_and_version() {
        let (name, version) =
            determine_api(&options(None, Some("pubsub"), Some("v1"))).unwrap();
        assert_eq!((name.as_str(), version.as_str()), ("pubsub", "v1"));
    }

    #[test]
    fn test_determine_api_without_options() {
        assert!(determine_api(&options(None, None, None)).is_err());
        assert!(determine_api(&options(None, Some("pubsub"), None)).is_err());
        assert!(determine_api(&options(Some("pubsub"), None, None)).is_err());
    }
}
