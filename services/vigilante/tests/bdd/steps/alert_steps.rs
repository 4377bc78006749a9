//! BDD step definitions for alert feature

use cucumber::then;

use crate::world::VigilanteWorld;

#[then(expr = "the last round should have raised {int} alert(s)")]
fn round_alerts(world: &mut VigilanteWorld, count: usize) {
    let round = world.last_round.as_ref().expect("no round ran");
    assert_eq!(round.alerts_raised, count);
}

#[then(expr = "the alerter should have received {int} alert(s) for {string}")]
fn alerter_received(world: &mut VigilanteWorld, count: usize, service: String) {
    let alerter = world
        .recording_alerter
        .as_ref()
        .expect("no alerter configured");
    let received = alerter.received.lock().unwrap();
    assert_eq!(
        received.iter().filter(|s| **s == service).count(),
        count,
        "received: {:?}",
        received
    );
}

#[then(expr = "the webhook should have been called {int} time(s)")]
fn webhook_called(world: &mut VigilanteWorld, count: u32) {
    assert_eq!(world.http.webhook_posts(), count);
}

#[then(expr = "the {string} alert delivery should be recorded as {string}")]
fn delivery_recorded(world: &mut VigilanteWorld, alerter_type: String, outcome: String) {
    let stats = world.poller.as_ref().expect("no poller").stats();
    let record = stats
        .alerts
        .iter()
        .rev()
        .find(|r| r.alerter_type == alerter_type)
        .unwrap_or_else(|| panic!("no '{}' delivery recorded", alerter_type));
    match outcome.as_str() {
        "sent" => assert!(record.success, "{:?}", record),
        "failed" => {
            assert!(!record.success, "{:?}", record);
            assert!(record.error.is_some());
        }
        other => panic!("Unknown outcome: {}", other),
    }
}
