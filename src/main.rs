use anyhow::Context;
use clap::Parser;
use gitlab_restore::{Cli, commands};

fn setup_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    commands::restore::restore(&cli).context(format!(
        "执行恢复失败（源路径：{}，输出路径：{}）",
        cli.gitlab_path.display(),
        cli.output_path.display()
    ))?;

    Ok(())
}
