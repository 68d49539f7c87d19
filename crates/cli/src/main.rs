use anyhow::Context;
use clap::{Parser, Subcommand};
use library_kernel::settings::Settings;

#[derive(Parser)]
#[command(name = "library-cli", version, about = "Library service command line")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server
    Serve {
        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,
    },
    /// Print the merged OpenAPI document
    Openapi {
        #[arg(long)]
        pretty: bool,
    },
    /// Load and print the effective settings
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut settings = Settings::load().with_context(|| "failed to load library settings")?;

    match cli.command {
        Command::Serve { port } => {
            if let Some(port) = port {
                settings.server.port = port;
            }
            library_telemetry::init(&settings.telemetry)?;
            tracing::info!(env = ?settings.environment, "library-cli serving");
            library_app::run(settings).await
        }
        Command::Openapi { pretty } => {
            let registry = library_app::build_registry(&settings)?;
            let document = library_http::router::openapi_document(&registry);
            let rendered = if pretty {
                serde_json::to_string_pretty(&document)?
            } else {
                serde_json::to_string(&document)?
            };
            println!("{rendered}");
            Ok(())
        }
        Command::Config => {
            println!("{settings:#?}");
            Ok(())
        }
    }
}
