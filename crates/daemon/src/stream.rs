use anyhow::Error;
use horizon_core::MapRenderer;
use slog::{debug, error, info, warn, Logger};
use std::future::Future;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::task::JoinSet;

use crate::{parse_click, ClickSession, Planner};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StreamStats {
    pub clicks: u64,
    pub drawn: u64,
    pub failed: u64,
    pub skipped_lines: u64,
}

/// Read click events from `input` until it ends or `shutdown` resolves.
///
/// Every click is planned on its own task, so a slow elevation lookup does
/// not hold back later clicks. Plans are drawn in completion order: whichever
/// click finishes last owns the map. A click that fails to plan or to draw
/// is counted and logged, the stream goes on. Clicks still in flight at the
/// end of input are waited for, then the session is closed.
pub async fn run_stream<R, I, S>(
    logger: Logger,
    planner: Planner,
    session: &mut ClickSession<R>,
    input: I,
    shutdown: S,
) -> Result<StreamStats, Error>
where
    R: MapRenderer,
    I: AsyncBufRead + Unpin,
    S: Future<Output = ()>,
{
    let mut stats = StreamStats::default();
    let mut in_flight = JoinSet::new();
    let mut lines = input.lines();
    let mut input_open = true;
    tokio::pin!(shutdown);

    loop {
        if !input_open && in_flight.is_empty() {
            break;
        }

        tokio::select! {
            _ = &mut shutdown, if input_open => {
                info!(logger, "shutdown requested, waiting for {} clicks in flight", in_flight.len());
                input_open = false;
            }
            line = lines.next_line(), if input_open => match line {
                Ok(Some(line)) => match parse_click(&line) {
                    Ok(Some(click)) => {
                        stats.clicks += 1;
                        let seq = stats.clicks;
                        debug!(logger, "click {}: {},{}", seq, click.lat, click.lon);
                        let planner = planner.clone();
                        in_flight.spawn(async move { (seq, planner.plan(&click).await) });
                    }
                    Ok(None) => {}
                    Err(err) => {
                        stats.skipped_lines += 1;
                        warn!(logger, "skipping input line: {}", err);
                    }
                },
                Ok(None) => {
                    debug!(logger, "end of click input");
                    input_open = false;
                }
                Err(err) => {
                    error!(logger, "error reading click input: {}", err);
                    input_open = false;
                }
            },
            Some(joined) = in_flight.join_next() => match joined {
                Ok((seq, Ok(plan))) => match session.apply(&plan) {
                    Ok(_) => {
                        stats.drawn += 1;
                        debug!(logger, "click {} drawn", seq);
                    }
                    Err(err) => {
                        stats.failed += 1;
                        error!(logger, "click {} not drawn: {}", seq, err);
                    }
                },
                Ok((seq, Err(err))) => {
                    stats.failed += 1;
                    error!(logger, "click {}: {}", seq, err);
                }
                Err(err) => {
                    stats.failed += 1;
                    error!(logger, "click task failed: {}", err);
                }
            },
            else => break,
        }
    }

    session.close()?;
    info!(
        logger,
        "processed {} clicks: {} drawn, {} failed, {} lines skipped",
        stats.clicks,
        stats.drawn,
        stats.failed,
        stats.skipped_lines
    );
    Ok(stats)
}
