use anyhow::Context;
use clap::{Parser, Subcommand};
use shelf_kernel::settings::Settings;

#[derive(Parser, Debug)]
#[command(name = "shelf")]
#[command(about = "Shelf book catalogue CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP server
    Serve(ServeArgs),
    /// Apply pending database migrations and exit
    Migrate,
    /// Print the effective settings (password redacted)
    Config,
}

#[derive(clap::Args, Debug)]
struct ServeArgs {
    /// Override `server.port`
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load().with_context(|| "failed to load shelf settings")?;
    shelf_telemetry::init(&settings.telemetry)?;

    match cli.command {
        Commands::Serve(args) => {
            if let Some(port) = args.port {
                settings.server.port = port;
            }
            shelf_app::bootstrap::serve(settings).await?;
        }
        Commands::Migrate => {
            let applied = shelf_app::bootstrap::migrate(&settings).await?;
            tracing::info!(applied, "migrations complete");
        }
        Commands::Config => {
            let rendered = serde_json::to_string_pretty(&settings)
                .with_context(|| "failed to render settings")?;
            println!("{}", rendered);
        }
    }

    Ok(())
}
