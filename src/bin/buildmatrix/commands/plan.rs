//! `buildmatrix plan` command

use anyhow::{Context, Result};

use buildmatrix::ops::plan_profile;
use buildmatrix::util::Config;

use crate::cli::PlanArgs;
use crate::commands::build_settings;

pub fn execute(config: &Config, args: PlanArgs) -> Result<()> {
    let build = build_settings(config, &args.matrix);
    let plan = plan_profile(
        &config.matrix,
        &config.libraries,
        args.matrix.profile,
        build.build_type(),
        build.thread_checks(),
    )?;

    if args.json {
        let json = serde_json::to_string_pretty(&plan).context("failed to serialize plan")?;
        println!("{}", json);
        return Ok(());
    }

    for job in &plan.jobs {
        println!("{:<45} {}", job.key(), job.library_names().join(", "));
    }
    for cell in &plan.skipped {
        let options = cell.options(build.build_type(), build.thread_checks());
        println!("{:<45} (skipped)", options.build_key(&cell.toolchain));
    }

    eprintln!(
        "{} job(s), {} skipped, {} librar{}",
        plan.jobs.len(),
        plan.skipped.len(),
        config.libraries.len(),
        if config.libraries.len() == 1 { "y" } else { "ies" }
    );

    Ok(())
}
