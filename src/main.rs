use anyhow::Context;
use clap::Parser;

mod cli;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    match cli.command {
        cli::Command::Serve {
            host,
            port,
            data_dir,
        } => {
            let rt = tokio::runtime::Runtime::new().context("creating tokio runtime")?;
            rt.block_on(wheelhouse::api::serve(&host, port, &data_dir))
        }
        cli::Command::Sweep { data_dir, dry_run } => {
            wheelhouse::sweep::run_once(&data_dir, dry_run)
        }
        cli::Command::Screen { file, execute } => wheelhouse::screen::run(&file, execute),
        cli::Command::Token { user_id, data_dir } => wheelhouse::token::run(&user_id, &data_dir),
    }
}
