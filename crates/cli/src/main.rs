use clap::{Parser, Subcommand};
use intake_core::config::{core_config_from_env_values, EnvValues};
use intake_core::gateway::gateway_from_env_values;
use intake_core::{IntakeService, SubmissionFilter, SubmissionStatus};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "intake")]
#[command(about = "Clinic patient-intake CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List submissions as dashboard rows
    List {
        /// Case-insensitive search over name, room, id and context
        #[arg(long)]
        search: Option<String>,
        /// Form date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
        /// Status wire value, e.g. inProgress or completed
        #[arg(long)]
        status: Option<String>,
    },
    /// Show one submission as display-ready JSON
    Show {
        /// Submission id
        id: u64,
    },
    /// Export matching submissions to CSV
    Export {
        /// Form date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
        /// Case-insensitive search over name, room, id and context
        #[arg(long)]
        search: Option<String>,
        /// Output path (defaults to Medical_Data_<date|All>.csv)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print the WhatsApp results message and deep link
    Whatsapp {
        /// Submission id
        id: u64,
    },
}

fn service_from_env() -> anyhow::Result<IntakeService> {
    let cfg = core_config_from_env_values(EnvValues::from_process_env())?;
    let gateway = gateway_from_env_values(
        std::env::var("INTAKE_GATEWAY_URL").ok(),
        std::env::var("INTAKE_GATEWAY_TOKEN").ok(),
        std::env::var("INTAKE_SEED_FILE").ok(),
    )
    .connect()?;
    Ok(IntakeService::new(Arc::new(cfg), gateway))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("intake_core=warn".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("Use 'intake --help' for commands");
        return Ok(());
    };

    let service = service_from_env()?;

    match command {
        Commands::List {
            search,
            date,
            status,
        } => {
            let filter = SubmissionFilter::new(search, date);
            let status = status.map(SubmissionStatus::from);
            match service.dashboard(&filter, status.as_ref()).await {
                Ok(rows) if rows.is_empty() => println!("No submissions found."),
                Ok(rows) => {
                    for row in rows {
                        println!(
                            "ID: {}, Name: {}, Room: {}, Date: {}, Status: {}",
                            row.id, row.name, row.room, row.date, row.status
                        );
                    }
                }
                Err(e) => eprintln!("Error listing submissions: {}", e),
            }
        }
        Commands::Show { id } => match service.view(id).await {
            Ok(view) => println!("{}", serde_json::to_string_pretty(&view)?),
            Err(e) => eprintln!("Error loading submission {}: {}", id, e),
        },
        Commands::Export { date, search, out } => {
            let filter = SubmissionFilter::new(search, date);
            match service.export(&filter).await {
                Ok(Some(csv)) => {
                    let path = out.unwrap_or_else(|| PathBuf::from(&csv.filename));
                    std::fs::write(&path, &csv.content)?;
                    println!("Exported submissions to {}", path.display());
                }
                Ok(None) => println!("No submissions to export."),
                Err(e) => eprintln!("Error exporting submissions: {}", e),
            }
        }
        Commands::Whatsapp { id } => match service.whatsapp(id).await {
            Ok(composed) => {
                println!("{}", composed.message);
                println!();
                match composed.link {
                    Some(link) => println!("Link: {}", link),
                    None => println!("Link: no usable WhatsApp number"),
                }
            }
            Err(e) => eprintln!("Error composing message for {}: {}", id, e),
        },
    }

    Ok(())
}
