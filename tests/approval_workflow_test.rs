//! End-to-end tests for the approval workflow: the full lifecycle through
//! escalation and renegotiation, required-field enforcement, terminal
//! immutability, conflict behavior under concurrent writers, and the
//! audit trail and event stream each transition leaves behind.

mod common;

use common::{item, offer, quotation_in, taxed_line, TestEngine};
use quotation_engine::errors::EngineError;
use quotation_engine::events::Event;
use quotation_engine::models::{Quotation, QuotationAction, QuotationStatus};
use quotation_engine::repositories::QuotationRepository;
use quotation_engine::services::TransitionPayload;
use rust_decimal_macros::dec;
use strum::IntoEnumIterator;
use uuid::Uuid;

fn negotiable_quotation(status: QuotationStatus) -> Quotation {
    let mut rice = item("Arroz 5kg", dec!(100));
    rice.last_approved_unit_price = Some(dec!(13.00));

    quotation_in(
        status,
        vec![rice],
        vec![offer(
            "Distribuidora Norte",
            dec!(50.00),
            vec![taxed_line("Arroz 5kg", dec!(10.00), dec!(10), dec!(0.50))],
        )],
    )
}

fn with_reason(reason: &str) -> TransitionPayload {
    TransitionPayload {
        reason: Some(reason.to_string()),
        ..Default::default()
    }
}

fn with_notes(notes: &str) -> TransitionPayload {
    TransitionPayload {
        notes: Some(notes.to_string()),
        ..Default::default()
    }
}

// ==================== Full lifecycle ====================

#[tokio::test]
async fn lifecycle_through_escalation_and_renegotiation() {
    let draft = negotiable_quotation(QuotationStatus::Draft);
    let buyer = draft.buyer_id;
    let supervisor = Uuid::new_v4();
    let mut engine = TestEngine::seeded_with(&draft).await;

    // Buyer submits the finished draft.
    let outcome = engine
        .service
        .attempt_transition(&draft, QuotationAction::Submit, buyer, Default::default())
        .await
        .unwrap();
    assert_eq!(outcome.status, QuotationStatus::AwaitingBuyerApproval);

    // Buyer escalates to the supervisor instead of settling.
    let snapshot = engine.stored(draft.id).await;
    let outcome = engine
        .service
        .attempt_transition(&snapshot, QuotationAction::Escalate, buyer, Default::default())
        .await
        .unwrap();
    assert_eq!(outcome.status, QuotationStatus::AwaitingSupervisorApproval);

    // Supervisor sends it back for better terms.
    let snapshot = engine.stored(draft.id).await;
    let outcome = engine
        .service
        .attempt_transition(
            &snapshot,
            QuotationAction::RequestRenegotiation,
            supervisor,
            with_notes("negociar o frete"),
        )
        .await
        .unwrap();
    assert_eq!(outcome.status, QuotationStatus::Renegotiation);

    let stored = engine.stored(draft.id).await;
    assert_eq!(stored.renegotiation_notes.as_deref(), Some("negociar o frete"));

    // The buyer lands a better price and resubmits; the summary in the
    // outcome reflects the edited offer, not the pre-renegotiation one.
    let mut renegotiated = stored.clone();
    renegotiated.offers[0].lines[0].unit_price = dec!(9.00);
    engine.repository.put(renegotiated.clone()).await.unwrap();

    let outcome = engine
        .service
        .attempt_transition(&renegotiated, QuotationAction::Resubmit, buyer, Default::default())
        .await
        .unwrap();
    assert_eq!(outcome.status, QuotationStatus::AwaitingSupervisorApproval);
    let summary = outcome.summary.unwrap();
    assert_eq!(summary.best_unit_total, dec!(900.00));
    // 9.00 × 1.10 + 0.50 = 10.40 taxed, plus 0.50 freight per unit.
    assert_eq!(summary.best_total, dec!(1090.00));

    // Supervisor approves; the savings record freezes the final figures.
    let snapshot = engine.stored(draft.id).await;
    let outcome = engine
        .service
        .attempt_transition(&snapshot, QuotationAction::Approve, supervisor, Default::default())
        .await
        .unwrap();
    assert_eq!(outcome.status, QuotationStatus::Approved);
    let savings = outcome.savings.unwrap();
    assert_eq!(savings.final_total, dec!(900.00));
    assert_eq!(savings.vs_last_approved.unwrap().absolute, dec!(400.00));

    // One audit record per applied transition, in order.
    let trail = engine.repository.audit_trail(draft.id);
    let actions: Vec<_> = trail.iter().map(|m| m.action).collect();
    assert_eq!(
        actions,
        vec![
            QuotationAction::Submit,
            QuotationAction::Escalate,
            QuotationAction::RequestRenegotiation,
            QuotationAction::Resubmit,
            QuotationAction::Approve,
        ]
    );
    assert_eq!(trail[2].renegotiation_notes.as_deref(), Some("negociar o frete"));
    assert!(trail[4].savings.is_some());

    // And one event per applied transition, in the same order.
    let mut kinds = Vec::new();
    while let Ok(event) = engine.events.try_recv() {
        kinds.push(match event {
            Event::QuotationSubmitted { .. } => "submitted",
            Event::QuotationEscalated { .. } => "escalated",
            Event::RenegotiationRequested { .. } => "renegotiation",
            Event::QuotationResubmitted { .. } => "resubmitted",
            Event::QuotationApproved { .. } => "approved",
            Event::QuotationRejected { .. } => "rejected",
        });
    }
    assert_eq!(
        kinds,
        vec!["submitted", "escalated", "renegotiation", "resubmitted", "approved"]
    );
}

#[tokio::test]
async fn buyer_can_reject_with_a_reason() {
    let quotation = negotiable_quotation(QuotationStatus::AwaitingBuyerApproval);
    let engine = TestEngine::seeded_with(&quotation).await;

    let outcome = engine
        .service
        .attempt_transition(
            &quotation,
            QuotationAction::Reject,
            quotation.buyer_id,
            with_reason("acima do orçamento do semestre"),
        )
        .await
        .unwrap();
    assert_eq!(outcome.status, QuotationStatus::Rejected);

    let stored = engine.stored(quotation.id).await;
    assert_eq!(stored.status, QuotationStatus::Rejected);
    assert_eq!(
        stored.rejection_reason.as_deref(),
        Some("acima do orçamento do semestre")
    );
}

// ==================== Required fields ====================

#[tokio::test]
async fn renegotiation_without_notes_changes_nothing() {
    let quotation = negotiable_quotation(QuotationStatus::AwaitingSupervisorApproval);
    let engine = TestEngine::seeded_with(&quotation).await;

    let err = engine
        .service
        .attempt_transition(
            &quotation,
            QuotationAction::RequestRenegotiation,
            Uuid::new_v4(),
            Default::default(),
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::MissingRequiredField {
            field: "renegotiation_notes",
            ..
        }
    ));

    let stored = engine.stored(quotation.id).await;
    assert_eq!(stored.status, QuotationStatus::AwaitingSupervisorApproval);
    assert!(engine.repository.audit_trail(quotation.id).is_empty());
}

#[tokio::test]
async fn rejection_without_reason_changes_nothing() {
    let quotation = negotiable_quotation(QuotationStatus::AwaitingSupervisorApproval);
    let engine = TestEngine::seeded_with(&quotation).await;

    for payload in [TransitionPayload::default(), with_reason("   ")] {
        let err = engine
            .service
            .attempt_transition(&quotation, QuotationAction::Reject, Uuid::new_v4(), payload)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::MissingRequiredField {
                field: "rejection_reason",
                ..
            }
        ));
    }

    let stored = engine.stored(quotation.id).await;
    assert_eq!(stored.status, QuotationStatus::AwaitingSupervisorApproval);
}

// ==================== Closure and terminal states ====================

#[tokio::test]
async fn terminal_quotations_refuse_every_action() {
    for status in [QuotationStatus::Approved, QuotationStatus::Rejected] {
        let quotation = negotiable_quotation(status);
        let engine = TestEngine::seeded_with(&quotation).await;

        for action in QuotationAction::iter() {
            let payload = TransitionPayload {
                reason: Some("motivo".into()),
                notes: Some("notas".into()),
            };
            let err = engine
                .service
                .attempt_transition(&quotation, action, quotation.buyer_id, payload)
                .await
                .unwrap_err();
            match err {
                EngineError::IllegalTransition {
                    current, allowed, ..
                } => {
                    assert_eq!(current, status);
                    assert!(allowed.is_empty());
                }
                other => panic!("unexpected error: {other}"),
            }

            let stored = engine.stored(quotation.id).await;
            assert_eq!(stored.status, status, "{action} mutated a terminal quotation");
        }
    }
}

#[tokio::test]
async fn illegal_transitions_name_the_allowed_alternatives() {
    let quotation = negotiable_quotation(QuotationStatus::AwaitingBuyerApproval);
    let engine = TestEngine::seeded_with(&quotation).await;

    let err = engine
        .service
        .attempt_transition(
            &quotation,
            QuotationAction::Resubmit,
            quotation.buyer_id,
            Default::default(),
        )
        .await
        .unwrap_err();
    match err {
        EngineError::IllegalTransition { allowed, .. } => {
            assert_eq!(
                allowed,
                vec![
                    QuotationAction::Approve,
                    QuotationAction::Reject,
                    QuotationAction::Escalate,
                ]
            );
        }
        other => panic!("unexpected error: {other}"),
    }
}

// ==================== Concurrency ====================

#[tokio::test]
async fn two_writers_one_quotation_one_winner() {
    let quotation = negotiable_quotation(QuotationStatus::AwaitingSupervisorApproval);
    let engine = TestEngine::seeded_with(&quotation).await;

    let approve = {
        let service = engine.service.clone();
        let snapshot = quotation.clone();
        tokio::spawn(async move {
            service
                .attempt_transition(
                    &snapshot,
                    QuotationAction::Approve,
                    Uuid::new_v4(),
                    Default::default(),
                )
                .await
        })
    };
    let renegotiate = {
        let service = engine.service.clone();
        let snapshot = quotation.clone();
        tokio::spawn(async move {
            service
                .attempt_transition(
                    &snapshot,
                    QuotationAction::RequestRenegotiation,
                    Uuid::new_v4(),
                    with_notes("rever prazos"),
                )
                .await
        })
    };

    let results = [approve.await.unwrap(), renegotiate.await.unwrap()];
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    for result in &results {
        if let Err(err) = result {
            assert!(matches!(err, EngineError::Conflict(_)), "got: {err}");
            assert!(err.is_retryable());
        }
    }

    // Exactly one transition landed, whichever won the race.
    assert_eq!(engine.repository.audit_trail(quotation.id).len(), 1);
}

#[tokio::test]
async fn stale_snapshot_is_rejected_as_conflict() {
    let quotation = negotiable_quotation(QuotationStatus::AwaitingBuyerApproval);
    let engine = TestEngine::seeded_with(&quotation).await;

    // Another actor approved while our caller still held the draft view.
    let mut stale = quotation.clone();
    stale.status = QuotationStatus::Draft;

    let err = engine
        .service
        .attempt_transition(
            &stale,
            QuotationAction::Submit,
            quotation.buyer_id,
            Default::default(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Conflict(_)));

    let stored = engine.stored(quotation.id).await;
    assert_eq!(stored.status, QuotationStatus::AwaitingBuyerApproval);
}

#[tokio::test]
async fn unknown_quotation_is_not_found() {
    let quotation = negotiable_quotation(QuotationStatus::Draft);
    let engine = TestEngine::seeded_with(&quotation).await;

    let mut unknown = quotation.clone();
    unknown.id = Uuid::new_v4();

    let err = engine
        .service
        .attempt_transition(
            &unknown,
            QuotationAction::Submit,
            quotation.buyer_id,
            Default::default(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
}
