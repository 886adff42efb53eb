mod common;

use common::{create_test_store, step_data};
use onboard_core::{
    ActionKind, BillingCycle, Milestone, PaymentFailure, PaymentResult, ProgressStore,
    ProgressionStateMachine, StepId, Tier, ValidationResult,
};
use serde_json::json;

#[tokio::test]
async fn test_paid_flow_survives_reloads() {
    let (_temp_dir, store) = create_test_store().await;

    // Each request gets a fresh machine, the way a web handler would.
    let mut machine = ProgressionStateMachine::new("alice", store.clone());
    machine.resume().await.expect("Failed to resume");
    machine
        .submit_business_info(step_data(json!({"businessName": "Acme", "businessType": "LLC"})))
        .await
        .expect("Failed to submit business info");

    let mut machine = ProgressionStateMachine::new("alice", store.clone());
    machine.resume().await.expect("Failed to resume");
    assert_eq!(machine.current_state().unwrap(), StepId::SubscriptionSelection);
    machine
        .select_subscription(Tier::Enterprise, Some(BillingCycle::Annual))
        .await
        .expect("Failed to select plan");

    let mut machine = ProgressionStateMachine::new("alice", store.clone());
    machine.resume().await.expect("Failed to resume");
    assert_eq!(machine.next_action().unwrap().action, ActionKind::CompletePayment);
    machine.initiate_payment().await.expect("Failed to start payment");
    machine
        .handle_payment_failure(PaymentFailure::new("card_declined"))
        .await
        .expect("Failed to record payment failure");

    let mut machine = ProgressionStateMachine::new("alice", store.clone());
    let record = machine.resume().await.expect("Failed to resume");
    assert_eq!(record.current_step, StepId::PaymentPending);
    assert_eq!(record.last_payment_error.as_deref(), Some("card_declined"));
    machine.initiate_payment().await.expect("Failed to retry payment");
    machine
        .complete_payment(PaymentResult {
            payment_id: "pay_1".into(),
            subscription_id: Some("sub_1".into()),
        })
        .await
        .expect("Failed to complete payment");

    let record = store
        .load("alice")
        .await
        .expect("Failed to load")
        .expect("Record missing");
    assert!(record.is_complete());
    assert_eq!(record.selected_plan, Some(Tier::Enterprise));
    assert_eq!(record.billing_cycle, Some(BillingCycle::Annual));
    assert_eq!(record.payment_id.as_deref(), Some("pay_1"));
    assert_eq!(record.last_payment_error, None);
    assert_eq!(
        record.completed_steps,
        vec![Milestone::BusinessInfo, Milestone::Subscription, Milestone::Payment]
    );
    assert_eq!(record.step_data["businessName"], "Acme");
}

#[tokio::test]
async fn test_resume_without_record_writes_nothing() {
    let (_temp_dir, store) = create_test_store().await;

    let mut machine = ProgressionStateMachine::new("bob", store.clone());
    let record = machine.resume().await.expect("Failed to resume");

    assert_eq!(record.current_step, StepId::NotStarted);
    assert_eq!(machine.next_action().unwrap().action, ActionKind::Start);
    assert!(store.load("bob").await.unwrap().is_none());
}

#[tokio::test]
async fn test_principals_are_isolated() {
    let (_temp_dir, store) = create_test_store().await;

    let mut alice = ProgressionStateMachine::new("alice", store.clone());
    alice.resume().await.unwrap();
    alice
        .submit_business_info(step_data(json!({"businessName": "Acme", "businessType": "LLC"})))
        .await
        .unwrap();
    alice.select_subscription(Tier::Free, None).await.unwrap();

    let mut bob = ProgressionStateMachine::new("bob", store.clone());
    bob.resume().await.unwrap();

    assert!(alice.is_complete());
    assert_eq!(bob.current_state().unwrap(), StepId::NotStarted);
}

#[tokio::test]
async fn test_two_tabs_last_write_wins() {
    let (_temp_dir, store) = create_test_store().await;

    let mut setup = ProgressionStateMachine::new("alice", store.clone());
    setup.resume().await.unwrap();
    setup
        .submit_business_info(step_data(json!({"businessName": "Acme", "businessType": "LLC"})))
        .await
        .unwrap();

    let mut tab_a = ProgressionStateMachine::new("alice", store.clone());
    let mut tab_b = ProgressionStateMachine::new("alice", store.clone());
    tab_a.resume().await.unwrap();
    tab_b.resume().await.unwrap();

    tab_a
        .select_subscription(Tier::Professional, Some(BillingCycle::Monthly))
        .await
        .unwrap();
    tab_b.select_subscription(Tier::Free, None).await.unwrap();

    // No version check: tab B's stale view overwrote tab A's write.
    let mut reloaded = ProgressionStateMachine::new("alice", store.clone());
    reloaded.resume().await.unwrap();
    assert!(reloaded.is_complete());
    assert_eq!(reloaded.record().unwrap().selected_plan, Some(Tier::Free));
}

#[tokio::test]
async fn test_rejected_transition_is_not_persisted() {
    let (_temp_dir, store) = create_test_store().await;

    let mut machine = ProgressionStateMachine::new("carol", store.clone());
    machine.resume().await.unwrap();
    let result = machine
        .submit_business_info(step_data(json!({"businessName": "Acme"})))
        .await
        .unwrap();

    assert_eq!(
        result,
        ValidationResult::InvalidData {
            missing_fields: vec!["businessType".into()]
        }
    );
    assert!(store.load("carol").await.unwrap().is_none());
}

#[tokio::test]
async fn test_delete_resets_progress() {
    let (_temp_dir, store) = create_test_store().await;

    let mut machine = ProgressionStateMachine::new("dave", store.clone());
    machine.resume().await.unwrap();
    machine.enter_business_info().await.unwrap();

    assert!(store.delete("dave").await.unwrap());
    let record = machine.resume().await.unwrap();
    assert_eq!(record.current_step, StepId::NotStarted);
}
