use super::*;

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

#[test]
fn debounced_requests_coalesce_to_latest() {
    let t0 = Instant::now();
    let mut s = FrameScrubber::new(ms(150));
    s.request_debounced(1.0, t0);
    s.request_debounced(2.0, t0 + ms(100));
    s.request_debounced(3.0, t0 + ms(200));

    assert!(s.poll(t0 + ms(300)).is_none());
    let ticket = s.poll(t0 + ms(350)).unwrap();
    assert_eq!(ticket.timestamp, 3.0);
    assert_eq!(s.complete(ticket, t0 + ms(400)), FetchOutcome::Apply);
    assert!(s.is_idle());
}

#[test]
fn immediate_request_skips_debounce() {
    let t0 = Instant::now();
    let mut s = FrameScrubber::new(ms(150));
    s.request_immediate(5.0);
    assert_eq!(s.poll(t0).map(|t| t.timestamp), Some(5.0));
}

#[test]
fn single_in_flight_with_follow_up() {
    let t0 = Instant::now();
    let mut s = FrameScrubber::new(ms(150));
    s.request_immediate(1.0);
    let first = s.poll(t0).unwrap();

    s.request_immediate(2.0);
    assert!(s.poll(t0 + ms(10)).is_none());

    assert_eq!(s.complete(first, t0 + ms(20)), FetchOutcome::Superseded);
    let follow = s.poll(t0 + ms(20)).unwrap();
    assert_eq!(follow.timestamp, 2.0);
    assert_eq!(s.complete(follow, t0 + ms(30)), FetchOutcome::Apply);
    assert!(s.poll(t0 + ms(40)).is_none());
}

#[test]
fn debounced_request_during_flight_follows_up_immediately() {
    let t0 = Instant::now();
    let mut s = FrameScrubber::new(ms(150));
    s.request_immediate(1.0);
    let first = s.poll(t0).unwrap();
    s.request_debounced(4.0, t0 + ms(5));
    s.complete(first, t0 + ms(6));
    assert_eq!(s.poll(t0 + ms(6)).map(|t| t.timestamp), Some(4.0));
}

#[test]
fn stale_tickets_are_ignored() {
    let t0 = Instant::now();
    let mut s = FrameScrubber::new(ms(0));
    s.request_immediate(1.0);
    let first = s.poll(t0).unwrap();
    assert_eq!(s.complete(first, t0), FetchOutcome::Apply);
    assert_eq!(s.complete(first, t0), FetchOutcome::Superseded);
}

#[test]
fn failure_clears_flight_without_retry() {
    let t0 = Instant::now();
    let mut s = FrameScrubber::new(ms(150));
    s.request_immediate(1.0);
    let t = s.poll(t0).unwrap();
    s.fail(t);
    assert!(s.is_idle());
    assert!(s.poll(t0 + ms(500)).is_none());
}
