#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

mod app;
mod cli;
mod config;
mod output;
mod protocol_runtime;

use app::App;
use cli::{
    cli_command_to_request, parse_cli_args, split_global_options, suggest_commands, CliAction,
    CliError, OutputFormat,
};
use config::load_config;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    std::process::exit(run(&args).await);
}

async fn run(args: &[String]) -> i32 {
    let (options, rest) = match split_global_options(args) {
        Ok(split) => split,
        Err(err) => return output::emit_cli_error(OutputFormat::Text, &err, &[]),
    };

    let action = match parse_cli_args(&rest) {
        Ok(action) => action,
        Err(err) => {
            let suggestions = match &err {
                CliError::UnknownCommand { cmd } => suggest_commands(cmd),
                _ => Vec::new(),
            };
            return output::emit_cli_error(options.output, &err, &suggestions);
        }
    };

    match action {
        CliAction::ShowHelp => {
            print_help();
            0
        }
        CliAction::ShowVersion => {
            println!("chainpost {}", env!("CARGO_PKG_VERSION"));
            0
        }
        CliAction::RunProtocol => {
            let mut app = match start_app(options.config).await {
                Ok(app) => app,
                Err(code) => return code,
            };
            match protocol_runtime::run_protocol_loop(&mut app).await {
                Ok(()) => 0,
                Err(err) => {
                    error!("Protocol loop failed: {err}");
                    err.exit_code()
                }
            }
        }
        CliAction::Command(command) => {
            let mut app = match start_app(options.config).await {
                Ok(app) => app,
                Err(code) => return code,
            };
            let request = cli_command_to_request(command);
            debug!("Running single command {}", request.cmd);
            let outcome = protocol_runtime::dispatch(&mut app, &request).await;
            output::emit_outcome(options.output, &outcome, app.session().session().snapshot())
        }
    }
}

async fn start_app(config_path: Option<std::path::PathBuf>) -> Result<App, i32> {
    let started = async {
        let config = load_config(config_path).await?;
        App::start(&config).await
    }
    .await;

    started.map_err(|err| {
        eprintln!("Error: {err}");
        err.exit_code()
    })
}

fn print_help() {
    println!("chainpost - social posts on a smart contract through a wallet provider");
    println!();
    println!("Usage: chainpost <command> [flags] [--json] [--config PATH]");
    println!("       chainpost            read JSON requests from stdin, one per line");
    println!();
    println!("Commands:");
    println!("  status                                  Session state");
    println!("  profile [--address A]                   Show a profile");
    println!("  update-profile --username U [--bio B]   Set your profile");
    println!("  create-post --content C                 Publish a post");
    println!("  like-post --post-id N                   Like a post");
    println!("  comment --post-id N --content C         Comment on a post");
    println!("  get-post --post-id N                    Show one post");
    println!("  feed [--limit N]                        Show recent posts (N <= 100)");
    println!("  switch-account --address A              Change the active account");
    println!("  switch-network --network-id N           Change the wallet network");
    println!("  help                                    Command list");
    println!();
    println!("Flags take '--flag value' or '--flag=value'. Use the second form for");
    println!("values that start with '--', e.g. --content=--gm.");
}
