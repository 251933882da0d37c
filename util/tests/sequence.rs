use std::convert::Infallible;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};

use plainbytes_util::cancel::CancellationSignal;
use plainbytes_util::sequence::{
    for_each_async, for_each_with_signal_async, select_async, where_async, AsyncSequenceExt,
    SequenceError, SequenceState,
};

/// Asynchronous source over `items` that yields to the scheduler between elements
fn to_async<T: Send + 'static>(items: Vec<T>) -> BoxStream<'static, Result<T, Infallible>> {
    stream::iter(items)
        .then(|item| async move {
            tokio::task::yield_now().await;
            Ok(item)
        })
        .boxed()
}

/// Source that notes when it has been dropped
struct Tracked<S> {
    inner: S,
    released: Arc<AtomicBool>,
}

impl<S> Tracked<S> {
    fn new(inner: S) -> (Self, Arc<AtomicBool>) {
        let released = Arc::new(AtomicBool::new(false));
        let me = Self {
            inner,
            released: released.clone(),
        };
        (me, released)
    }
}

impl<S> Drop for Tracked<S> {
    fn drop(&mut self) {
        self.released.store(true, Ordering::Release);
    }
}

impl<S: futures::Stream + Unpin> futures::Stream for Tracked<S> {
    type Item = S::Item;

    fn poll_next(
        mut self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Option<Self::Item>> {
        self.inner.poll_next_unpin(cx)
    }
}

#[derive(Debug, PartialEq, Eq)]
struct Boom(u32);

#[tokio::test]
async fn for_each_visits_every_element_in_order() -> anyhow::Result<()> {
    let source: Vec<u32> = (0..10).collect();
    let mut results = Vec::new();

    to_async(source.clone())
        .for_each_async(&CancellationSignal::new(), |item| {
            results.push(item);
            async { Ok(()) }
        })
        .await?;

    assert_eq!(results, source);
    Ok(())
}

#[tokio::test]
async fn for_each_without_source_never_runs_the_action() {
    let mut calls = 0;
    let res = for_each_async(
        None::<BoxStream<'static, Result<u32, Infallible>>>,
        &CancellationSignal::new(),
        |_| {
            calls += 1;
            async { Ok(()) }
        },
    )
    .await;

    assert_eq!(res, Err(SequenceError::NullSource));
    assert_eq!(calls, 0);
}

#[tokio::test]
async fn for_each_stops_at_the_next_checkpoint_after_cancellation() {
    let signal = CancellationSignal::new();
    let (source, released) = Tracked::new(to_async((0..20).collect::<Vec<u32>>()));
    let mut seen = Vec::new();

    let res = for_each_async(Some(source), &signal, |item| {
        seen.push(item);
        if item == 3 {
            signal.request();
        }
        async { Ok(()) }
    })
    .await;

    assert!(res.as_ref().is_err_and(SequenceError::is_canceled));
    assert_eq!(seen, [0, 1, 2, 3]);
    assert!(released.load(Ordering::Acquire));
}

#[tokio::test]
async fn long_running_actions_observe_the_signal() {
    let signal = CancellationSignal::new();
    let canceler = signal.clone();
    tokio::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        canceler.request();
    });

    let interrupted = Arc::new(Mutex::new(Vec::new()));
    let res = for_each_with_signal_async(
        Some(to_async((0..5).collect::<Vec<u32>>())),
        &signal,
        |item, signal| {
            let interrupted = interrupted.clone();
            async move {
                tokio::select! {
                    _ = signal.requested() => interrupted.lock().unwrap().push(item),
                    _ = tokio::time::sleep(std::time::Duration::from_secs(30)) => {}
                }
                Ok(())
            }
        },
    )
    .await;

    assert_eq!(res, Err(SequenceError::Canceled));
    assert_eq!(*interrupted.lock().unwrap(), [0]);
}

#[tokio::test]
async fn actions_can_cancel_through_the_signal_they_receive() {
    let (source, released) = Tracked::new(to_async((0..20).collect::<Vec<u32>>()));
    let mut seen = Vec::new();

    let res = source
        .for_each_with_signal_async(&CancellationSignal::new(), |item, signal| {
            seen.push(item);
            if item == 4 {
                signal.request();
            }
            async { Ok(()) }
        })
        .await;

    assert_eq!(res, Err(SequenceError::Canceled));
    assert_eq!(seen, [0, 1, 2, 3, 4]);
    assert!(released.load(Ordering::Acquire));
}

#[tokio::test]
async fn for_each_passes_action_failures_through() {
    let mut calls = 0;
    let source = stream::iter(0..10u32).map(Ok::<_, Boom>);

    let res = source
        .for_each_async(&CancellationSignal::new(), |item| {
            calls += 1;
            async move {
                match item {
                    4 => Err(Boom(item)),
                    _ => Ok(()),
                }
            }
        })
        .await;

    assert_eq!(res, Err(SequenceError::Propagated(Boom(4))));
    assert_eq!(calls, 5);
}

#[tokio::test]
async fn for_each_passes_source_failures_through() {
    let source = stream::iter([Ok(0), Ok(1), Err(Boom(99)), Ok(3)]);
    let mut seen = Vec::new();

    let res = for_each_async(Some(source), &CancellationSignal::new(), |item| {
        seen.push(item);
        async { Ok(()) }
    })
    .await;

    assert_eq!(res.map_err(|e| e.propagated()), Err(Some(Boom(99))));
    assert_eq!(seen, [0, 1]);
}

#[tokio::test]
async fn linked_signals_cancel_together() {
    let shutdown = CancellationSignal::new();
    let local = CancellationSignal::new();
    let domain = CancellationSignal::linked([&shutdown, &local]);
    let mut seen = 0;

    let res = to_async((0..10).collect::<Vec<u32>>())
        .for_each_async(&domain, |item| {
            seen += 1;
            if item == 1 {
                shutdown.request();
            }
            async { Ok(()) }
        })
        .await;

    assert_eq!(res, Err(SequenceError::Canceled));
    assert_eq!(seen, 2);
    assert!(!local.is_requested());
}

#[tokio::test]
async fn select_projects_all_elements() -> anyhow::Result<()> {
    let source: Vec<u32> = (0..15).collect();
    let projected: Vec<String> = to_async(source)
        .select_async(&CancellationSignal::new(), |i| format!("#{i}"))
        .try_collect()
        .await?;

    let expected: Vec<String> = (0..15).map(|i| format!("#{i}")).collect();
    assert_eq!(projected, expected);
    Ok(())
}

#[tokio::test]
async fn select_without_source_reports_it_once() {
    let mut projected = select_async(
        None::<BoxStream<'static, Result<u32, Infallible>>>,
        &CancellationSignal::new(),
        |i| i,
    );

    assert_eq!(projected.next().await, Some(Err(SequenceError::NullSource)));
    assert_eq!(projected.next().await, None);
    assert_eq!(projected.state(), SequenceState::Failed);
}

#[tokio::test]
async fn canceled_select_ends_with_an_error_instead_of_truncating() {
    let signal = CancellationSignal::new();
    let (source, released) = Tracked::new(to_async((0..10).collect::<Vec<u32>>()));
    let mut projected = source.select_async(&signal, |i| i * 10);

    assert_eq!(projected.next().await, Some(Ok(0)));
    assert_eq!(projected.next().await, Some(Ok(10)));
    assert_eq!(projected.state(), SequenceState::Stepping);
    assert!(!released.load(Ordering::Acquire));

    signal.request();
    assert_eq!(projected.next().await, Some(Err(SequenceError::Canceled)));
    assert_eq!(projected.next().await, None);
    assert_eq!(projected.state(), SequenceState::Canceled);
    assert_eq!(projected.produced(), 2);
    // Released as soon as cancellation was observed, not when the stream goes away
    assert!(released.load(Ordering::Acquire));
}

#[tokio::test]
async fn try_select_stops_on_a_failing_transform() {
    let (source, released) = Tracked::new(stream::iter(0..10u32).map(Ok::<_, Boom>));
    let mut projected = source.try_select_async(&CancellationSignal::new(), |i| match i {
        2 => Err(Boom(i)),
        _ => Ok(i + 1),
    });

    assert_eq!(projected.next().await, Some(Ok(1)));
    assert_eq!(projected.next().await, Some(Ok(2)));
    assert_eq!(projected.next().await, Some(Err(SequenceError::Propagated(Boom(2)))));
    assert_eq!(projected.next().await, None);
    assert_eq!(projected.state(), SequenceState::Failed);
    assert!(released.load(Ordering::Acquire));
}

#[tokio::test]
async fn where_keeps_matching_elements_in_order() -> anyhow::Result<()> {
    let evens: Vec<u32> = to_async((0..30).collect::<Vec<u32>>())
        .where_async(&CancellationSignal::new(), |i| i % 2 == 0)
        .try_collect()
        .await?;

    assert!(evens.iter().all(|i| i % 2 == 0));
    assert_eq!(evens, (0..30).step_by(2).collect::<Vec<u32>>());
    Ok(())
}

#[tokio::test]
async fn where_without_source_reports_it_once() {
    let mut filtered = where_async(
        None::<BoxStream<'static, Result<u32, Infallible>>>,
        &CancellationSignal::new(),
        |_| true,
    );

    assert_eq!(filtered.next().await, Some(Err(SequenceError::NullSource)));
    assert_eq!(filtered.next().await, None);
}

#[tokio::test]
async fn where_checks_cancellation_for_rejected_elements() {
    let signal = CancellationSignal::new();
    let mut inspected = Vec::new();
    let mut filtered = to_async((0..10).collect::<Vec<u32>>()).where_async(&signal, |&i| {
        inspected.push(i);
        if i == 2 {
            signal.request();
        }
        i == 0
    });

    assert_eq!(filtered.next().await, Some(Ok(0)));
    assert_eq!(filtered.next().await, Some(Err(SequenceError::Canceled)));
    assert_eq!(filtered.next().await, None);
    drop(filtered);
    assert_eq!(inspected, [0, 1, 2]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn independent_sequences_run_concurrently() -> anyhow::Result<()> {
    let tasks: Vec<_> = (0..8u32)
        .map(|n| {
            tokio::spawn(async move {
                let signal = CancellationSignal::new();
                to_async((0..100 * n).collect::<Vec<u32>>())
                    .where_async(&signal, |i| i % 3 == 0)
                    .select_async(&signal, u64::from)
                    .try_fold(0u64, |acc, i| async move { Ok(acc + i) })
                    .await
            })
        })
        .collect();

    for (n, task) in (0..8u32).zip(tasks) {
        let sum = task.await?.map_err(|e| anyhow::anyhow!("{e:?}"))?;
        let expected: u64 = (0..100 * n).filter(|i| i % 3 == 0).map(u64::from).sum();
        assert_eq!(sum, expected);
    }
    Ok(())
}
