//! `buildmatrix list` command

use anyhow::Result;

use buildmatrix::matrix::enumerate;
use buildmatrix::util::Config;

use crate::cli::ListArgs;
use crate::commands::build_settings;

pub fn execute(config: &Config, args: ListArgs) -> Result<()> {
    let build = build_settings(config, &args.matrix);
    let cells = enumerate(&config.matrix, args.matrix.profile)?;

    for cell in &cells {
        let options = cell.options(build.build_type(), build.thread_checks());
        println!("{:<45} {}", options.build_key(&cell.toolchain), cell);
    }

    eprintln!(
        "{} cell(s) in the {} profile",
        cells.len(),
        args.matrix.profile
    );

    Ok(())
}
