use horizon_core::Position;
use horizon_daemon::{Click, ElevationError};
use mockall::predicate::eq;
use time::macros::datetime;

use crate::helpers::{
    planner, session, session_with, MockElevation, Op, RecordingRenderer,
};

fn turin_click() -> Click {
    Click {
        lat: 45.07,
        lon: 7.69,
        at: Some(datetime!(2024-03-20 12:00 UTC)),
    }
}

#[tokio::test]
async fn click_draws_circles_labels_and_sun_lines() {
    let mut source = MockElevation::new();
    source
        .expect_elevation()
        .with(eq(45.07), eq(7.69))
        .times(1)
        .returning(|_, _| Ok(239.0));
    let planner = planner(source);
    let mut session = session();

    let drawn = session.handle_click(&planner, turin_click()).await.unwrap();

    assert_eq!(drawn, 12);
    assert_eq!(session.current().unwrap().len(), 12);
    assert_eq!(session.current().unwrap().lines.len(), 2);
    assert_eq!(session.renderer().draws(), 1);
    assert_eq!(session.renderer().removes(), 0);
}

#[tokio::test]
async fn click_coordinates_are_rounded_before_lookup() {
    let mut source = MockElevation::new();
    source
        .expect_elevation()
        .with(eq(45.07), eq(7.69))
        .times(1)
        .returning(|_, _| Ok(239.0));
    let planner = planner(source);

    let click = Click {
        lat: 45.0712,
        lon: 7.6889,
        at: Some(datetime!(2024-03-20 12:00 UTC)),
    };
    let plan = planner.plan(&click).await.unwrap();
    assert_eq!(plan.observer, Position { lat: 45.07, lon: 7.69 });
    assert_eq!(plan.panel.elevation_m, 239.0);
}

#[tokio::test]
async fn new_click_removes_previous_overlay_first() {
    let mut source = MockElevation::new();
    source.expect_elevation().times(2).returning(|_, _| Ok(100.0));
    let planner = planner(source);
    let mut session = session();

    session.handle_click(&planner, turin_click()).await.unwrap();
    let second = Click {
        lat: 41.9,
        lon: 12.5,
        at: Some(datetime!(2024-03-20 12:00 UTC)),
    };
    session.handle_click(&planner, second).await.unwrap();

    let ops = &session.renderer().ops;
    assert_eq!(ops.len(), 3);
    let Op::Draw { ids: first_ids, .. } = &ops[0] else {
        panic!("expected a draw, got {:?}", ops[0]);
    };
    assert_eq!(ops[1], Op::Remove(first_ids.clone()));
    let Op::Draw { observer, ids } = &ops[2] else {
        panic!("expected a draw, got {:?}", ops[2]);
    };
    assert_eq!(*observer, Position { lat: 41.9, lon: 12.5 });
    assert_eq!(session.current().unwrap().layers().collect::<Vec<_>>(), *ids);
}

#[tokio::test]
async fn failed_lookup_keeps_current_overlay() {
    let mut source = MockElevation::new();
    source
        .expect_elevation()
        .with(eq(45.07), eq(7.69))
        .returning(|_, _| Ok(239.0));
    source
        .expect_elevation()
        .with(eq(46.0), eq(8.0))
        .returning(|_, _| Err(ElevationError::Status(503)));
    let planner = planner(source);
    let mut session = session();

    session.handle_click(&planner, turin_click()).await.unwrap();
    let before: Vec<_> = session.current().unwrap().layers().collect();

    let err = session
        .handle_click(
            &planner,
            Click {
                lat: 46.0,
                lon: 8.0,
                at: None,
            },
        )
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "Failed to process click at 46,8: elevation service responded with status 503"
    );
    assert_eq!(session.renderer().ops.len(), 1);
    assert_eq!(session.current().unwrap().layers().collect::<Vec<_>>(), before);
}

#[tokio::test]
async fn invalid_click_never_reaches_the_service() {
    let mut source = MockElevation::new();
    source.expect_elevation().times(0);
    let planner = planner(source);
    let mut session = session();

    let click = Click {
        lat: 95.0,
        lon: 0.0,
        at: None,
    };
    assert!(session.handle_click(&planner, click).await.is_err());
    assert!(session.current().is_none());
    assert!(session.renderer().ops.is_empty());
}

#[tokio::test]
async fn polar_day_has_no_sun_lines() {
    let mut source = MockElevation::new();
    source.expect_elevation().returning(|_, _| Ok(10.0));
    let planner = planner(source);
    let mut session = session();

    let click = Click {
        lat: 78.22,
        lon: 15.65,
        at: Some(datetime!(2024-06-21 12:00 UTC)),
    };
    let drawn = session.handle_click(&planner, click).await.unwrap();
    assert_eq!(drawn, 10);
    assert!(session.current().unwrap().lines.is_empty());
}

#[tokio::test]
async fn close_removes_everything_drawn() {
    let mut source = MockElevation::new();
    source.expect_elevation().returning(|_, _| Ok(239.0));
    let planner = planner(source);
    let mut session = session();

    session.handle_click(&planner, turin_click()).await.unwrap();
    session.close().unwrap();
    assert!(session.current().is_none());

    let ops = session.into_renderer().ops;
    assert_eq!(ops.len(), 2);
    assert!(matches!(&ops[1], Op::Remove(ids) if ids.len() == 12));

    // closing an empty session is a no-op
    let mut session = crate::helpers::session();
    session.close().unwrap();
    assert!(session.renderer().ops.is_empty());
}

#[tokio::test]
async fn failed_remove_keeps_overlay_for_the_next_click() {
    let mut source = MockElevation::new();
    source.expect_elevation().returning(|_, _| Ok(239.0));
    let planner = planner(source);
    let mut session = session_with(RecordingRenderer {
        fail_remove: Some(1),
        ..Default::default()
    });

    session.handle_click(&planner, turin_click()).await.unwrap();
    let first: Vec<_> = session.current().unwrap().layers().collect();

    // the old overlay could not be removed, so nothing new is drawn
    assert!(session.handle_click(&planner, turin_click()).await.is_err());
    assert_eq!(session.current().unwrap().layers().collect::<Vec<_>>(), first);
    assert_eq!(session.renderer().draws(), 1);

    session.handle_click(&planner, turin_click()).await.unwrap();
    let third: Vec<_> = session.current().unwrap().layers().collect();
    session.close().unwrap();

    let ops = session.into_renderer().ops;
    assert_eq!(ops.len(), 4);
    assert_eq!(ops[1], Op::Remove(first));
    assert_eq!(ops[3], Op::Remove(third));
}

#[tokio::test]
async fn failed_draw_leaves_nothing_current() {
    let mut source = MockElevation::new();
    source.expect_elevation().returning(|_, _| Ok(239.0));
    let planner = planner(source);
    let mut session = session_with(RecordingRenderer {
        fail_draw: Some(2),
        ..Default::default()
    });

    session.handle_click(&planner, turin_click()).await.unwrap();
    let err = session
        .handle_click(&planner, turin_click())
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "renderer failed: broken pipe");
    assert!(session.current().is_none());
    assert_eq!(session.renderer().removes(), 1);
}
