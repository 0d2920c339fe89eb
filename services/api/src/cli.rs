use crate::demo::{run_demo, run_location_import, DemoArgs, LocationImportArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use society_care::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Society Care",
    about = "Run the society maintenance service or explore it from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Work with location reference data
    Locations {
        #[command(subcommand)]
        command: LocationsCommand,
    },
    /// Walk through the location picker, categories, properties and staff queue
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum LocationsCommand {
    /// Validate a location CSV export and summarise what it would import
    Import(LocationImportArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Locations {
            command: LocationsCommand::Import(args),
        } => run_location_import(args).await,
        Command::Demo(args) => run_demo(args).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["society-care-api"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn parses_location_import() {
        let cli = Cli::try_parse_from(["society-care-api", "locations", "import", "seed.csv", "--json"])
            .expect("parses");
        match cli.command {
            Some(Command::Locations {
                command: LocationsCommand::Import(args),
            }) => {
                assert_eq!(args.csv.to_str(), Some("seed.csv"));
                assert!(args.json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
