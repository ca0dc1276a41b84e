//! `buildmatrix toolchain` command

use anyhow::Result;

use buildmatrix::builder::ToolchainLocator;
use buildmatrix::util::Config;

use crate::cli::ToolchainArgs;

pub fn execute(config: &Config, args: ToolchainArgs) -> Result<()> {
    let locator = ToolchainLocator::from_settings(&config.toolchain);

    println!("NDK roots:");
    if locator.roots().is_empty() {
        println!("  (none; set `[toolchain] ndk_roots` or ANDROID_HOME)");
    }
    for root in locator.roots() {
        println!("  {}", root.display());
    }
    println!();

    println!("Toolchains ({} profile):", args.profile);
    for entry in config.matrix.toolchains_for(args.profile) {
        match locator.find_ndk(&entry.version) {
            Ok(ndk) => println!("  {:<8} {}", entry.version, ndk.display()),
            Err(_) => println!("  {:<8} not found", entry.version),
        }
    }
    println!();

    println!("Tools:");
    match locator.cmake() {
        Ok(cmake) => println!("  cmake:  {}", cmake.display()),
        Err(_) => println!("  cmake:  not found"),
    }
    match locator.ninja() {
        Ok(ninja) => println!("  ninja:  {}", ninja.display()),
        Err(_) => println!("  ninja:  not found"),
    }
    if let Some(ref protobuf) = config.toolchain.protobuf {
        println!("  protoc: {}", protobuf.join("bin").display());
    }

    Ok(())
}
