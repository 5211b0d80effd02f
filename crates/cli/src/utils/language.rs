//! Target language selection

use crate::error::CliResult;
use crate::utils::config::ProjectConfig;
use protopack_engine::{parse_languages, Language};

/// Determine target languages with priority: CLI flag > Config file > All languages
pub fn determine_languages(
    cli_languages: Option<&str>,
    project: &ProjectConfig,
) -> CliResult<Vec<Language>> {
    if let Some(list) = cli_languages {
        return Ok(parse_languages(list)?);
    }

    if let Some(configured) = &project.languages {
        return Ok(parse_languages(&configured.join(","))?);
    }

    Ok(Language::ALL.to_vec())
}
