//! Entry point: parse CLI and dispatch to command handlers.

use clap::Parser;
use ffl_metrics::{
    cli::{Commands, FflMetrics, ReportCmd},
    commands::{
        check_config::handle_check_config,
        compute_metrics::{handle_compute, ComputeParams},
        import_data::handle_import,
        init_db::handle_init_db,
        report::{handle_efficiency_report, handle_luck_report},
        score_week::{handle_score, ScoreParams},
        verify::handle_verify,
    },
    MetricsError, Result,
};

/// Log to stderr so command output on stdout stays clean.
fn init_tracing() -> Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("ffl_metrics=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber).map_err(|e| MetricsError::Other {
        message: format!("failed to set tracing subscriber: {}", e),
    })
}

/// Run the CLI.
fn main() -> Result<()> {
    init_tracing()?;
    let app = FflMetrics::parse();

    match app.command {
        Commands::InitDb { db } => handle_init_db(db.db)?,

        Commands::Import { file, db, verbose } => handle_import(file, db.db, verbose)?,

        Commands::CheckConfig { config, json } => handle_check_config(config.config, json)?,

        Commands::Compute {
            db,
            config,
            from_week,
            through_week,
            verbose,
        } => handle_compute(ComputeParams {
            db: db.db,
            config: config.config,
            from_week,
            through_week,
            verbose,
        })?,

        Commands::Score {
            db,
            config,
            week,
            player_name,
            json,
        } => handle_score(ScoreParams {
            db: db.db,
            config: config.config,
            week,
            player_name,
            as_json: json,
            verbose: false,
        })?,

        Commands::Verify { db } => handle_verify(db.db, false)?,

        Commands::Report { cmd } => match cmd {
            ReportCmd::Efficiency { db, week, json } => {
                handle_efficiency_report(db.db, week, json)?
            }
            ReportCmd::Luck {
                db,
                through_week,
                json,
            } => handle_luck_report(db.db, through_week, json)?,
        },
    }

    Ok(())
}
