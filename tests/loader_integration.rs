mod support;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use scroll_frame::events::{FrameEvent, LoadFrame};
use scroll_frame::tasks::loader::{self, load_frame, LoadOutcome, LoaderOptions, LoadStats};
use scroll_frame::{AssetLayout, FrameAddress, FrameIndex};
use support::MockSource;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

fn options(frame_count: usize) -> LoaderOptions {
    LoaderOptions {
        layout: AssetLayout::default(),
        frame_count,
        max_in_flight: 8,
        progress_log_interval: 50,
    }
}

async fn drain(mut rx: mpsc::Receiver<FrameEvent>) -> Vec<FrameEvent> {
    let mut events = Vec::new();
    while let Some(ev) = tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timeout waiting for loader events")
    {
        events.push(ev);
    }
    events
}

#[tokio::test]
async fn second_fallback_succeeds_after_primary_and_first_fallback_fail() {
    let source = MockSource::default().with("pv2-unscreen/unscreen-006.png", (4, 3));
    let address = FrameAddress::resolve(&AssetLayout::default(), FrameIndex(5));

    let outcome = load_frame(&source, &address).await;
    match outcome {
        LoadOutcome::Loaded {
            asset,
            path,
            fallback,
        } => {
            assert_eq!(path, PathBuf::from("pv2-unscreen/unscreen-006.png"));
            assert!(fallback);
            assert_eq!((asset.width(), asset.height()), (4, 3));
        }
        other => panic!("expected a loaded frame, got {other:?}"),
    }
    assert_eq!(
        source.calls(),
        vec![
            PathBuf::from("Images/0006.png"),
            PathBuf::from("0006.png"),
            PathBuf::from("pv2-unscreen/unscreen-006.png"),
        ],
        "attempts must stop at the first success"
    );
}

#[tokio::test]
async fn fallback_success_counts_once_and_duplicates_are_ignored() {
    let source = MockSource::default().with("pv2-unscreen/unscreen-006.png", (4, 3));
    let (load_tx, load_rx) = mpsc::channel(8);
    let (frame_tx, frame_rx) = mpsc::channel(8);
    let handle = tokio::spawn(loader::run(
        Arc::new(source.clone()),
        options(10),
        load_rx,
        frame_tx,
        CancellationToken::new(),
    ));

    for _ in 0..2 {
        load_tx
            .send(LoadFrame {
                index: FrameIndex(5),
                priority: true,
            })
            .await
            .unwrap();
    }
    drop(load_tx);

    let events = drain(frame_rx).await;
    let stats = handle.await.unwrap().unwrap();

    assert_eq!(stats, LoadStats { loaded: 1, errored: 0 });
    assert_eq!(events.len(), 1);
    match &events[0] {
        FrameEvent::Loaded { index, path, .. } => {
            assert_eq!(*index, FrameIndex(5));
            assert_eq!(path, &PathBuf::from("pv2-unscreen/unscreen-006.png"));
        }
        other => panic!("unexpected event {other:?}"),
    }
    assert_eq!(source.calls().len(), 3, "duplicate request must not refetch");
}

#[tokio::test]
async fn exhausted_chain_reports_failure() {
    let source = MockSource::default();
    let (load_tx, load_rx) = mpsc::channel(8);
    let (frame_tx, frame_rx) = mpsc::channel(8);
    let handle = tokio::spawn(loader::run(
        Arc::new(source.clone()),
        options(3),
        load_rx,
        frame_tx,
        CancellationToken::new(),
    ));

    load_tx
        .send(LoadFrame {
            index: FrameIndex(2),
            priority: false,
        })
        .await
        .unwrap();
    drop(load_tx);

    let events = drain(frame_rx).await;
    let stats = handle.await.unwrap().unwrap();

    assert!(matches!(
        events.as_slice(),
        [FrameEvent::Failed { index }] if *index == FrameIndex(2)
    ));
    assert_eq!(stats, LoadStats { loaded: 0, errored: 1 });
    assert_eq!(source.calls().len(), 5);
}

#[tokio::test]
async fn later_frames_may_finish_first() {
    let source = MockSource::default()
        .with("Images/0001.png", (2, 2))
        .with("Images/0002.png", (2, 2))
        .delayed("Images/0001.png", Duration::from_millis(200));
    let (load_tx, load_rx) = mpsc::channel(8);
    let (frame_tx, frame_rx) = mpsc::channel(8);
    let handle = tokio::spawn(loader::run(
        Arc::new(source),
        options(2),
        load_rx,
        frame_tx,
        CancellationToken::new(),
    ));

    for i in 0..2 {
        load_tx
            .send(LoadFrame {
                index: FrameIndex(i),
                priority: true,
            })
            .await
            .unwrap();
    }
    drop(load_tx);

    let order: Vec<FrameIndex> = drain(frame_rx)
        .await
        .into_iter()
        .map(|ev| match ev {
            FrameEvent::Loaded { index, .. } | FrameEvent::Failed { index } => index,
        })
        .collect();
    assert_eq!(order, vec![FrameIndex(1), FrameIndex(0)]);
    assert_eq!(handle.await.unwrap().unwrap().loaded, 2);
}

#[tokio::test]
async fn out_of_range_requests_are_dropped() {
    let source = MockSource::default().with("Images/0001.png", (1, 1));
    let (load_tx, load_rx) = mpsc::channel(8);
    let (frame_tx, frame_rx) = mpsc::channel(8);
    let handle = tokio::spawn(loader::run(
        Arc::new(source.clone()),
        options(1),
        load_rx,
        frame_tx,
        CancellationToken::new(),
    ));

    load_tx
        .send(LoadFrame {
            index: FrameIndex(1),
            priority: false,
        })
        .await
        .unwrap();
    drop(load_tx);

    assert!(drain(frame_rx).await.is_empty());
    assert_eq!(handle.await.unwrap().unwrap(), LoadStats::default());
    assert!(source.calls().is_empty());
}

#[tokio::test]
async fn cancel_stops_the_loader() {
    let source = MockSource::default().delayed("Images/0001.png", Duration::from_secs(30));
    let (load_tx, load_rx) = mpsc::channel(8);
    let (frame_tx, _frame_rx) = mpsc::channel(8);
    let cancel = CancellationToken::new();
    let handle = tokio::spawn(loader::run(
        Arc::new(source),
        options(1),
        load_rx,
        frame_tx,
        cancel.clone(),
    ));
    load_tx
        .send(LoadFrame {
            index: FrameIndex(0),
            priority: true,
        })
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    cancel.cancel();

    let stats = tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .expect("loader should exit promptly on cancel")
        .unwrap()
        .unwrap();
    assert_eq!(stats.settled(), 0);
}
