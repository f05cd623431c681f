//! End-to-end poll cycles against a mocked source and sink.

use crate::helpers::{
    build_request, key_address, sender_key, tx_json, MockSink, MockSource,
};
use alloy_primitives::{address, Address};
use mpc_guard_core::{ApprovalLoop, PolicyConfig, PolicyEngine, SignRequest};
use std::time::Duration;

const RECEIVER: Address = address!("1111111111111111111111111111111111111111");
const STRANGER: Address = address!("2222222222222222222222222222222222222222");

fn engine() -> PolicyEngine {
    PolicyEngine::new(PolicyConfig::new(key_address(&sender_key())).with_receivers([RECEIVER]))
}

fn good_request() -> SignRequest {
    build_request(&sender_key(), &tx_json(Some(RECEIVER), 5, &[]))
}

fn bad_request() -> SignRequest {
    build_request(&sender_key(), &tx_json(Some(STRANGER), 5, &[]))
}

fn foreign_request() -> SignRequest {
    let mut request = good_request();
    request.key = "0xforeign".to_string();
    request.msg_context[0] = "signtx".to_string();
    request
}

#[tokio::test]
async fn cycle_submits_verdicts_in_request_order() {
    let source = MockSource::new();
    let sink = MockSink::new();

    let mut first = good_request();
    first.key = "0xfirst".to_string();
    let mut second = bad_request();
    second.key = "0xsecond".to_string();
    let mut third = good_request();
    third.key = "0xthird".to_string();
    source.push_cycle(vec![first, second, third]);

    let approval = ApprovalLoop::new(source.clone(), sink.clone(), engine());
    assert_eq!(approval.run_cycle().await.unwrap(), 3);

    let submissions = sink.submissions();
    assert_eq!(submissions.len(), 3);
    assert_eq!(submissions[0].0, "0xfirst");
    assert!(submissions[0].1);
    assert_eq!(submissions[1].0, "0xsecond");
    assert!(!submissions[1].1);
    assert!(submissions[1].2.contains("not in the allowed list"));
    assert_eq!(submissions[2].0, "0xthird");
    assert!(submissions[2].1);
}

#[tokio::test]
async fn ignored_requests_are_never_submitted() {
    let source = MockSource::new();
    let sink = MockSink::new();
    source.push_cycle(vec![foreign_request(), good_request()]);

    let approval = ApprovalLoop::new(source.clone(), sink.clone(), engine());
    assert_eq!(approval.run_cycle().await.unwrap(), 1);

    let submissions = sink.submissions();
    assert_eq!(submissions.len(), 1);
    assert_ne!(submissions[0].0, "0xforeign");
}

#[tokio::test]
async fn sink_failure_skips_request_but_finishes_the_cycle() {
    let source = MockSource::new();
    let sink = MockSink::new();
    sink.set_failing(true);
    source.push_cycle(vec![good_request(), bad_request()]);

    let approval = ApprovalLoop::new(source.clone(), sink.clone(), engine());
    // the cycle itself succeeds even though nothing got through
    assert_eq!(approval.run_cycle().await.unwrap(), 0);
    assert!(sink.submissions().is_empty());

    sink.set_failing(false);
    source.push_cycle(vec![good_request()]);
    assert_eq!(approval.run_cycle().await.unwrap(), 1);
}

#[tokio::test]
async fn source_failure_surfaces_from_the_cycle() {
    let source = MockSource::new();
    let sink = MockSink::new();
    source.push_failure("connection refused");

    let approval = ApprovalLoop::new(source.clone(), sink.clone(), engine());
    assert!(approval.run_cycle().await.is_err());
    assert!(sink.submissions().is_empty());
}

#[tokio::test]
async fn empty_poll_is_a_quiet_cycle() {
    let source = MockSource::new();
    let sink = MockSink::new();
    let approval = ApprovalLoop::new(source, sink.clone(), engine());
    assert_eq!(approval.run_cycle().await.unwrap(), 0);
    assert!(sink.submissions().is_empty());
}

#[tokio::test]
async fn resubmitting_the_same_request_yields_the_same_verdict() {
    let source = MockSource::new();
    let sink = MockSink::new();
    source.push_cycle(vec![good_request(), bad_request()]);
    source.push_cycle(vec![good_request(), bad_request()]);

    let approval = ApprovalLoop::new(source.clone(), sink.clone(), engine());
    approval.run_cycle().await.unwrap();
    approval.run_cycle().await.unwrap();

    let submissions = sink.submissions();
    assert_eq!(submissions.len(), 4);
    assert_eq!(submissions[0], submissions[2]);
    assert_eq!(submissions[1], submissions[3]);
}

#[tokio::test(start_paused = true)]
async fn loop_survives_source_failures_and_keeps_polling() {
    let source = MockSource::new();
    let sink = MockSink::new();
    source.push_failure("connection refused");
    source.push_cycle(vec![good_request()]);

    let approval = ApprovalLoop::new(source.clone(), sink.clone(), engine())
        .with_interval(Duration::from_secs(5));
    let handle = tokio::spawn(async move { approval.run().await });

    // first cycle fails, second submits; virtual time, no real waiting
    tokio::time::sleep(Duration::from_secs(12)).await;
    handle.abort();

    let submissions = sink.submissions();
    assert_eq!(submissions.len(), 1);
    assert!(submissions[0].1);
}
