use std::time::Duration;

use campustrack::search::SearchDebouncer;

#[tokio::test]
async fn a_lone_submission_fires_after_the_delay() {
    let debouncer = SearchDebouncer::new(Duration::from_millis(20));
    let ticket = debouncer.submit();
    let result = debouncer.run(ticket, || async { "results" }).await;
    assert_eq!(result, Some("results"));
}

#[tokio::test]
async fn newer_input_supersedes_an_undebounced_one() {
    let debouncer = SearchDebouncer::new(Duration::from_millis(80));

    let first = debouncer.submit();
    let first_run = tokio::spawn({
        let debouncer = debouncer.clone();
        async move { debouncer.run(first, || async { "first" }).await }
    });

    // A second keystroke arrives well inside the first one's delay.
    tokio::time::sleep(Duration::from_millis(20)).await;
    let second = debouncer.submit();
    let second_result = debouncer.run(second, || async { "second" }).await;

    assert_eq!(first_run.await.expect("join"), None);
    assert_eq!(second_result, Some("second"));
}

#[tokio::test]
async fn a_stale_in_flight_response_is_dropped() {
    let debouncer = SearchDebouncer::new(Duration::from_millis(10));

    let first = debouncer.submit();
    let slow_run = tokio::spawn({
        let debouncer = debouncer.clone();
        async move {
            debouncer
                .run(first, || async {
                    // Response still in flight when the next input lands.
                    tokio::time::sleep(Duration::from_millis(120)).await;
                    "slow"
                })
                .await
        }
    });

    // Past the debounce delay, so the slow fetch has started.
    tokio::time::sleep(Duration::from_millis(50)).await;
    let _newer = debouncer.submit();

    assert_eq!(
        slow_run.await.expect("join"),
        None,
        "a response that comes back after newer input must not be applied"
    );
}
