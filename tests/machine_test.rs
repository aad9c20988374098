//! Conversation machine + state store integration tests.

use SocietyBot::state::machine::{
    self, Effect, Field, Flow, FlowInput, ProfileStep, RegistrationStep,
};
use SocietyBot::StateStore;

/// Drive one input through the machine and the store, the way handlers do.
fn step(store: &StateStore, user_id: i64, input: FlowInput) -> Effect {
    let flow = store.current(user_id).expect("active flow");
    let transition = machine::apply(flow, input);
    store.transition(user_id, transition.next);
    transition.effect
}

#[test]
fn cancel_mid_flow_leaves_no_residue() {
    let store = StateStore::new();
    let user_id = 123;

    store.start(user_id, Flow::new_registration());
    let effect = step(&store, user_id, FlowInput::EventChosen("کارگاه".to_string()));
    assert_eq!(effect, Effect::Prompt(Field::FullName));
    let effect = step(&store, user_id, FlowInput::Text("علی احمدی".to_string()));
    assert_eq!(effect, Effect::Prompt(Field::StudentId));

    // cancel discards everything
    let effect = step(&store, user_id, FlowInput::Cancel);
    assert_eq!(effect, Effect::AbortToMenu);
    assert_eq!(store.current(user_id), None);

    // a fresh start begins at event selection with no residual draft
    store.start(user_id, Flow::new_registration());
    assert_eq!(store.current(user_id), Some(Flow::new_registration()));
}

#[test]
fn commit_is_terminal_and_carries_the_record() {
    let store = StateStore::new();
    let user_id = 7;

    store.start(user_id, Flow::new_registration());
    step(&store, user_id, FlowInput::EventChosen("رویداد تست ۱".to_string()));
    step(&store, user_id, FlowInput::Text("علی احمدی".to_string()));
    step(&store, user_id, FlowInput::Text("40012345".to_string()));
    step(&store, user_id, FlowInput::Text("1234567891".to_string()));
    let effect = step(&store, user_id, FlowInput::Text("09123456789".to_string()));
    assert_eq!(effect, Effect::ShowSummary);

    let effect = step(&store, user_id, FlowInput::Confirm);
    match effect {
        Effect::CommitRegistration {
            event_name,
            applicant,
        } => {
            assert_eq!(event_name, "رویداد تست ۱");
            assert_eq!(applicant.full_name, "علی احمدی");
        }
        other => panic!("unexpected effect: {other:?}"),
    }
    assert_eq!(store.current(user_id), None);
}

#[test]
fn edit_loop_keeps_event_and_reenters_fields() {
    let store = StateStore::new();
    let user_id = 7;

    store.start(user_id, Flow::new_registration());
    step(&store, user_id, FlowInput::EventChosen("رویداد".to_string()));
    step(&store, user_id, FlowInput::Text("علی احمدی".to_string()));
    step(&store, user_id, FlowInput::Text("40012345".to_string()));
    step(&store, user_id, FlowInput::Text("1234567891".to_string()));
    step(&store, user_id, FlowInput::Text("09123456789".to_string()));

    let effect = step(&store, user_id, FlowInput::Edit);
    assert_eq!(effect, Effect::Prompt(Field::FullName));

    match store.current(user_id) {
        Some(Flow::Registration { step, draft }) => {
            assert_eq!(step, RegistrationStep::EnteringName);
            // earlier answers survive as overwritable defaults
            assert_eq!(draft.event_name.as_deref(), Some("رویداد"));
            assert_eq!(draft.phone_number.as_deref(), Some("09123456789"));
        }
        other => panic!("unexpected flow: {other:?}"),
    }

    // overwrite the name, walk the remaining fields again and confirm
    step(&store, user_id, FlowInput::Text("رضا رضایی".to_string()));
    step(&store, user_id, FlowInput::Text("40099999".to_string()));
    step(&store, user_id, FlowInput::Text("1234567891".to_string()));
    let effect = step(&store, user_id, FlowInput::Text("09111111111".to_string()));
    assert_eq!(effect, Effect::ShowSummary);

    let effect = step(&store, user_id, FlowInput::Confirm);
    match effect {
        Effect::CommitRegistration { applicant, .. } => {
            assert_eq!(applicant.full_name, "رضا رضایی");
            assert_eq!(applicant.student_id, "40099999");
        }
        other => panic!("unexpected effect: {other:?}"),
    }
}

#[test]
fn invalid_field_input_does_not_advance() {
    let store = StateStore::new();
    let user_id = 9;

    store.start(user_id, Flow::new_registration());
    step(&store, user_id, FlowInput::EventChosen("رویداد".to_string()));

    let effect = step(&store, user_id, FlowInput::Text("Ali".to_string()));
    assert_eq!(effect, Effect::RejectInput(Field::FullName));
    assert!(matches!(
        store.current(user_id),
        Some(Flow::Registration {
            step: RegistrationStep::EnteringName,
            ..
        })
    ));
}

#[test]
fn cancellation_reject_returns_to_profile_view() {
    let store = StateStore::new();
    let user_id = 5;

    store.start(user_id, Flow::new_profile());
    step(&store, user_id, FlowInput::StartCancellation);
    let effect = step(&store, user_id, FlowInput::CancelTarget(3));
    assert_eq!(effect, Effect::ShowCancellationConfirm(3));

    let effect = step(&store, user_id, FlowInput::RejectCancel);
    assert_eq!(effect, Effect::ShowProfile);
    assert_eq!(
        store.current(user_id),
        Some(Flow::Profile {
            step: ProfileStep::Viewing
        })
    );
}

#[test]
fn cancellation_accept_ends_the_flow() {
    let store = StateStore::new();
    let user_id = 5;

    store.start(user_id, Flow::new_profile());
    step(&store, user_id, FlowInput::StartCancellation);
    step(&store, user_id, FlowInput::CancelTarget(3));
    let effect = step(&store, user_id, FlowInput::ConfirmCancel(3));
    assert_eq!(effect, Effect::CommitCancellation(3));
    assert_eq!(store.current(user_id), None);
}

#[test]
fn starting_a_new_flow_replaces_an_abandoned_one() {
    let store = StateStore::new();
    let user_id = 11;

    // abandon a registration halfway
    store.start(user_id, Flow::new_registration());
    step(&store, user_id, FlowInput::EventChosen("رویداد".to_string()));
    step(&store, user_id, FlowInput::Text("علی احمدی".to_string()));

    // the user opens the contact flow instead; no draft leaks across
    store.start(user_id, Flow::new_contact());
    assert_eq!(store.current(user_id), Some(Flow::Contact));

    let effect = step(&store, user_id, FlowInput::Text("سلام، یک سوال دارم".to_string()));
    assert_eq!(
        effect,
        Effect::CommitMessage("سلام، یک سوال دارم".to_string())
    );
    assert_eq!(store.current(user_id), None);
}
