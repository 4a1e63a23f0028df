use horizon_daemon::{run_stream, ElevationError, StreamStats};
use tokio::io::BufReader;

use crate::helpers::{
    planner, session, session_with, test_logger, MockElevation, RecordingRenderer,
};

#[tokio::test]
async fn stream_draws_clicks_and_skips_bad_lines() {
    let mut source = MockElevation::new();
    source.expect_elevation().times(2).returning(|_, _| Ok(239.0));
    let mut session = session();

    let input = b"45.07,7.69,2024-03-20T12:00:00Z\n\
                  nonsense\n\
                  # a comment\n\
                  \n\
                  -33.87 151.21 2024-06-21T00:00:00Z\n";
    let stats = run_stream(
        test_logger(),
        planner(source),
        &mut session,
        BufReader::new(&input[..]),
        std::future::pending(),
    )
    .await
    .unwrap();

    assert_eq!(
        stats,
        StreamStats {
            clicks: 2,
            drawn: 2,
            failed: 0,
            skipped_lines: 1,
        }
    );
    // second draw replaced the first, close removed the second
    assert!(session.current().is_none());
    assert_eq!(session.renderer().draws(), 2);
    assert_eq!(session.renderer().removes(), 2);
}

#[tokio::test]
async fn stream_counts_failed_lookups() {
    let mut source = MockElevation::new();
    source
        .expect_elevation()
        .returning(|lat, _| {
            if lat > 50.0 {
                Err(ElevationError::NoData { lat, lon: 0.0 })
            } else {
                Ok(12.0)
            }
        });
    let mut session = session();

    let input = b"10,20\n60,20\n100,20\n";
    let stats = run_stream(
        test_logger(),
        planner(source),
        &mut session,
        BufReader::new(&input[..]),
        std::future::pending(),
    )
    .await
    .unwrap();

    // 100,20 parses but is not a valid latitude
    assert_eq!(stats.clicks, 3);
    assert_eq!(stats.drawn, 1);
    assert_eq!(stats.failed, 2);
    assert_eq!(session.renderer().draws(), 1);
    assert_eq!(session.renderer().removes(), 1);
}

#[tokio::test]
async fn shutdown_stops_reading_open_input() {
    let mut source = MockElevation::new();
    source.expect_elevation().times(0);
    let mut session = session();

    // the writer half stays alive, so the input never ends by itself
    let (_writer, reader) = tokio::io::duplex(64);
    let stats = run_stream(
        test_logger(),
        planner(source),
        &mut session,
        BufReader::new(reader),
        std::future::ready(()),
    )
    .await
    .unwrap();

    assert_eq!(stats, StreamStats::default());
    assert!(session.renderer().ops.is_empty());
}

#[tokio::test]
async fn stream_survives_a_failed_draw() {
    let mut source = MockElevation::new();
    source.expect_elevation().times(3).returning(|_, _| Ok(239.0));
    let mut session = session_with(RecordingRenderer {
        fail_draw: Some(2),
        ..Default::default()
    });

    let input = b"45.07,7.69\n41.9,12.5\n-33.87,151.21\n";
    let stats = run_stream(
        test_logger(),
        planner(source),
        &mut session,
        BufReader::new(&input[..]),
        std::future::pending(),
    )
    .await
    .unwrap();

    assert_eq!(stats.clicks, 3);
    assert_eq!(stats.drawn, 2);
    assert_eq!(stats.failed, 1);
    // the session still closes and removes the last overlay
    assert!(session.current().is_none());
    assert_eq!(session.renderer().draws(), 2);
    assert_eq!(session.renderer().removes(), 2);
}
