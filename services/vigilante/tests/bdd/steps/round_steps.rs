//! BDD step definitions for round feature

use std::sync::Arc;
use std::time::Duration;

use cucumber::{given, then, when};

use vigilante::alert::Alerter;
use vigilante::poller::Poller;
use vigilante::state::new_state_channel;
use vigilante::webhook::WebhookAlerter;

use crate::world::{url_for, Endpoint, RecordingAlerter, VigilanteWorld};

fn ensure_poller(world: &mut VigilanteWorld) -> &mut Poller {
    if world.poller.is_none() {
        let recording = Arc::new(RecordingAlerter::default());
        let mut alerters: Vec<Arc<dyn Alerter>> = vec![recording.clone()];
        if let Some(url) = &world.webhook_url {
            alerters.push(Arc::new(WebhookAlerter::new(
                url.clone(),
                world.http.clone(),
            )));
        }

        let (publisher, handle) = new_state_channel(100);
        let poller = Poller::new(
            world.services.clone(),
            world.http.clone(),
            alerters,
            Duration::from_millis(200),
            publisher,
        );
        world.recording_alerter = Some(recording);
        world.state = Some(handle);
        world.poller = Some(poller);
    }
    world.poller.as_mut().expect("poller just built")
}

#[given(expr = "a webhook that answers with status {int}")]
fn webhook_answers(world: &mut VigilanteWorld, status: u16) {
    world.http.set_webhook_status(status);
    world.webhook_url = Some("https://hooks.test/alert".to_string());
}

#[when("a check round runs")]
async fn run_round(world: &mut VigilanteWorld) {
    let summary = ensure_poller(world).run_round().await;
    world.last_round = Some(summary);
}

#[when(expr = "{int} check rounds run")]
async fn run_rounds(world: &mut VigilanteWorld, rounds: u32) {
    for _ in 0..rounds {
        let summary = ensure_poller(world).run_round().await;
        let stats = world.poller.as_ref().expect("no poller").stats();
        assert_eq!(stats.passed + stats.failed, stats.total);
        world.last_round = Some(summary);
    }
}

#[when(expr = "the service {string} starts responding with status {int}")]
fn service_changes(world: &mut VigilanteWorld, name: String, status: u16) {
    world.http.set(&url_for(&name), Endpoint::Status(status));
}

#[then(expr = "the round should have {int} passed and {int} failed")]
fn round_counts(world: &mut VigilanteWorld, passed: usize, failed: usize) {
    let round = world.last_round.as_ref().expect("no round ran");
    assert_eq!(round.passed(), passed);
    assert_eq!(round.failed(), failed);
}

#[then(expr = "the success rate should be {string}")]
fn success_rate(world: &mut VigilanteWorld, expected: String) {
    let round = world.last_round.as_ref().expect("no round ran");
    assert_eq!(format!("{:.1}", round.success_rate), expected);
}

#[then("the round should be all healthy")]
fn all_healthy(world: &mut VigilanteWorld) {
    let round = world.last_round.as_ref().expect("no round ran");
    assert!(round.all_healthy());
}

#[then("the round should not be all healthy")]
fn not_all_healthy(world: &mut VigilanteWorld) {
    let round = world.last_round.as_ref().expect("no round ran");
    assert!(!round.all_healthy());
}

#[then("passed plus failed should equal total")]
fn counters_consistent(world: &mut VigilanteWorld) {
    let stats = world.poller.as_ref().expect("no poller").stats();
    assert_eq!(stats.passed + stats.failed, stats.total);
}

#[then(expr = "the total should be {int}")]
fn total_is(world: &mut VigilanteWorld, total: u64) {
    let stats = world.poller.as_ref().expect("no poller").stats();
    assert_eq!(stats.total, total);
}

#[then(expr = "the history should hold {int} entries")]
fn history_len(world: &mut VigilanteWorld, len: usize) {
    let stats = world.poller.as_ref().expect("no poller").stats();
    assert_eq!(stats.history.len(), len);
}

#[then("the published snapshot should match the poller")]
fn snapshot_matches(world: &mut VigilanteWorld) {
    let stats = world.poller.as_ref().expect("no poller").stats();
    let snapshot = world.state.as_ref().expect("no state").borrow().clone();
    assert_eq!(snapshot.total, stats.total);
    assert_eq!(snapshot.passed, stats.passed);
    assert_eq!(snapshot.failed, stats.failed);
    assert_eq!(snapshot.history.len(), stats.history.len());
}
