use std::path::PathBuf;
use std::process::ExitCode;

use lexicon::templating::MacroEngine;

use crate::config::Config;
use crate::flags::QuillCmd;

#[macro_use]
extern crate lexicon;

mod config;
mod flags;
mod render;
mod scaffold;

pub const CONFIG_FILE: &str = "quill.toml";

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

pub fn main() -> ExitCode {
    init_tracing();

    let flags = flags::Quill::from_env_or_exit();
    let project = flags.project.unwrap_or_else(|| PathBuf::from("."));
    let result = Config::discover::<MacroEngine>(&project)
        .and_then(|config| match flags.subcommand {
            QuillCmd::Scaffold(_) => scaffold::run(&config),
            QuillCmd::Render(cmd) => render::run(&config, &cmd.template, cmd.output.as_deref()),
            QuillCmd::Stats(_) => render::stats(&config),
        });

    if let Err(e) = result {
        eprintln!("error: {e}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
