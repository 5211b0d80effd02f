//! Common protos command implementation

use crate::error::CliResult;
use crate::ops::session::{build_config, print_report, run_session, SessionOptions};
use crate::utils::config;

pub struct Options {
    pub session: SessionOptions,
}

pub fn run(options: &Options) -> i32 {
    match run_inner(options) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("✗ Common protos packaging failed");
            eprintln!("  Error: {e}");
            1
        }
    }
}

fn run_inner(options: &Options) -> CliResult<()> {
    let project = config::read_project_config()?;
    let repo_config = build_config(&options.session, &project, true)?;

    let report = run_session(repo_config, |session| async move {
        Ok(session.build_common_proto_packages().await?)
    })?;

    print_report(&report);
    Ok(())
}
