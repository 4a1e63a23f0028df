use horizon_core::MapRenderer;
use horizon_daemon::{
    get_config_info, run_stream, setup_logger, ClickSession, ClickSettings, Cli, HtmlSnapshot,
    JsonLinesRenderer, OpenElevation, OutputFormat, Planner, TextRenderer,
};
use slog::{error, info, Logger};
use std::{io, sync::Arc};
use tokio::io::BufReader;

type Renderer = Box<dyn MapRenderer + Send>;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let cli = get_config_info()?;
    let logger = setup_logger(&cli);

    info!(logger, "Horizon daemon starting...");
    info!(logger, "  Elevation URL: {}", cli.elevation_url());
    info!(logger, "  Observer height: {} m", cli.observer_height_m());
    info!(logger, "  Cloud bands: {}", cli.bands().len());

    let source = Arc::new(OpenElevation::new(
        logger.clone(),
        cli.elevation_url(),
        cli.user_agent(),
        cli.timeout(),
        cli.max_retries(),
    )?);
    let planner = Planner::new(logger.clone(), source, ClickSettings::from(&cli));
    let mut session = ClickSession::new(logger.clone(), renderer(&cli, &logger));

    if let Some(click) = cli.click()? {
        // the overlay of a single click stays in place
        session.handle_click(&planner, click).await?;
        return Ok(());
    }

    info!(logger, "reading clicks from stdin, one 'lat,lon[,instant]' per line");
    let shutdown = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(logger, "error listening for shutdown signal: {}", err);
            std::future::pending::<()>().await;
        }
    };
    let input = BufReader::new(tokio::io::stdin());
    run_stream(logger.clone(), planner, &mut session, input, shutdown).await?;
    Ok(())
}

fn renderer(cli: &Cli, logger: &Logger) -> Renderer {
    let stdout: Renderer = match cli.format() {
        OutputFormat::Json => Box::new(JsonLinesRenderer::new(io::stdout())),
        OutputFormat::Text => Box::new(TextRenderer::new(io::stdout())),
    };
    match cli.html.as_deref() {
        Some(path) => {
            info!(logger, "  HTML map: {}", path);
            Box::new(HtmlSnapshot::new(logger.clone(), path, stdout))
        }
        None => stdout,
    }
}
