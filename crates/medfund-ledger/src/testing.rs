//! Shared fixtures for the engine's unit tests.

use medfund_gate::ReviewDecision;
use medfund_store::InMemoryLedgerStore;
use medfund_types::{Amount, ApplicationId};

use crate::engine::Engine;
use crate::records::ApplicantIdentity;
use crate::requests::{IntakeRequest, ReviewRequest};

pub(crate) fn id(s: &str) -> ApplicationId {
    ApplicationId::new(s).unwrap()
}

pub(crate) fn intake(app: &str) -> IntakeRequest {
    IntakeRequest {
        application_id: id(app),
        identity: ApplicantIdentity {
            applicant_name: "lyx".into(),
            national_id: "500222199009214433".into(),
            hospital_code: "995".into(),
            department_code: "3".into(),
            civic_office_code: "8876".into(),
            clinic_card_number: "9988123519".into(),
            description_hash: "abcdabcdabcdabcdabcdabcdabcdabcd".into(),
        },
        requested_amount: Amount::parse("4000.32").unwrap(),
        attachments: Vec::new(),
    }
}

/// Engine holding one application awaiting hospital review.
pub(crate) fn pending_engine(app: &str) -> Engine<InMemoryLedgerStore> {
    let engine = Engine::with_defaults(InMemoryLedgerStore::new());
    engine.intake(intake(app)).unwrap();
    engine
}

/// Engine holding one application that is open for donations.
pub(crate) fn raising_engine(app: &str) -> Engine<InMemoryLedgerStore> {
    let engine = pending_engine(app);
    engine
        .hospital_verify(ReviewRequest {
            application_id: id(app),
            operator: "op1".into(),
            decision: ReviewDecision::Approve,
            approved_amount: Amount::parse("3500").unwrap(),
            attachments: Vec::new(),
        })
        .unwrap();
    engine
}
