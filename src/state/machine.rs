//! Conversation state machine
//!
//! A pure transition function over typed flow states: current state ×
//! input kind → next state + effect. The machine validates and
//! normalizes field input and assembles the draft record, but performs
//! no I/O — handlers execute the returned [`Effect`] (render a prompt,
//! call the persistence gateway) and hand the next state to the store.
//!
//! One deliberate asymmetry: the eager already-registered check at event
//! selection needs the gateway, so it lives in the handler before the
//! `EventChosen` input is fed in. The gateway's duplicate check at commit
//! time remains the authoritative guard either way.

use crate::models::Applicant;
use crate::utils::digits::normalize_digits;
use crate::utils::validators;

/// Steps of the registration flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationStep {
    SelectingEvent,
    EnteringName,
    EnteringStudentId,
    EnteringNationalId,
    EnteringPhone,
    Confirming,
}

/// Steps of the profile / cancellation flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileStep {
    Viewing,
    SelectingTarget,
    ConfirmingCancellation { registration_id: i64 },
}

/// Accumulated registration input. Values are stored already validated
/// and digit-normalized; on the edit loop they survive as overwritable
/// defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationDraft {
    pub event_name: Option<String>,
    pub full_name: Option<String>,
    pub student_id: Option<String>,
    pub national_id: Option<String>,
    pub phone_number: Option<String>,
}

impl RegistrationDraft {
    /// The complete applicant record, if every field has been collected.
    pub fn applicant(&self) -> Option<Applicant> {
        Some(Applicant {
            full_name: self.full_name.clone()?,
            student_id: self.student_id.clone()?,
            national_id: self.national_id.clone()?,
            phone_number: self.phone_number.clone()?,
        })
    }
}

/// The per-user flow state held by the state store.
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    Registration {
        step: RegistrationStep,
        draft: RegistrationDraft,
    },
    Profile {
        step: ProfileStep,
    },
    Contact,
}

impl Flow {
    pub fn new_registration() -> Self {
        Flow::Registration {
            step: RegistrationStep::SelectingEvent,
            draft: RegistrationDraft::default(),
        }
    }

    pub fn new_profile() -> Self {
        Flow::Profile {
            step: ProfileStep::Viewing,
        }
    }

    pub fn new_contact() -> Self {
        Flow::Contact
    }
}

/// Classified user input, decoupled from the transport that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowInput {
    /// Free text at a field-entry step
    Text(String),
    /// An event picked from the selection keyboard
    EventChosen(String),
    /// Final confirmation of the assembled registration
    Confirm,
    /// Re-enter the personal fields from the summary
    Edit,
    /// Cancel signal, accepted at every step
    Cancel,
    /// Profile: open the cancellation list
    StartCancellation,
    /// Profile: a registration picked for cancellation
    CancelTarget(i64),
    /// Profile: cancellation confirmed
    ConfirmCancel(i64),
    /// Profile: cancellation rejected
    RejectCancel,
    /// Profile: back from the cancellation list
    BackToProfile,
    /// Profile: leave to the main menu
    BackToMenu,
}

/// Which field a prompt or rejection refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    FullName,
    StudentId,
    NationalId,
    Phone,
    Message,
}

/// What the handler must do after a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Ask for the given field
    Prompt(Field),
    /// Re-prompt the same field with a validation notice
    RejectInput(Field),
    /// Render the assembled draft for confirmation
    ShowSummary,
    /// Commit the complete record via the gateway
    CommitRegistration { event_name: String, applicant: Applicant },
    /// Render the cancellation list
    ShowCancellationList,
    /// Render the are-you-sure view for one registration
    ShowCancellationConfirm(i64),
    /// Cancel the registration via the gateway, then show the main menu
    CommitCancellation(i64),
    /// Re-render the profile view
    ShowProfile,
    /// Store the contact message via the gateway
    CommitMessage(String),
    /// Discard and show the main menu
    AbortToMenu,
    /// Input does not apply to the current step; do nothing
    Ignore,
}

/// Result of applying one input: the next flow state (`None` is
/// terminal — the store entry must be removed) and the effect to run.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub next: Option<Flow>,
    pub effect: Effect,
}

impl Transition {
    fn stay(flow: Flow, effect: Effect) -> Self {
        Transition {
            next: Some(flow),
            effect,
        }
    }

    fn end(effect: Effect) -> Self {
        Transition { next: None, effect }
    }
}

/// Apply one classified input to the current flow state.
pub fn apply(flow: Flow, input: FlowInput) -> Transition {
    // Cancel wins at every step of every flow and discards the draft.
    if input == FlowInput::Cancel {
        return Transition::end(Effect::AbortToMenu);
    }

    match flow {
        Flow::Registration { step, draft } => apply_registration(step, draft, input),
        Flow::Profile { step } => apply_profile(step, input),
        Flow::Contact => apply_contact(input),
    }
}

fn apply_registration(
    step: RegistrationStep,
    mut draft: RegistrationDraft,
    input: FlowInput,
) -> Transition {
    use RegistrationStep::*;

    match (step, input) {
        (SelectingEvent, FlowInput::EventChosen(name)) => {
            draft.event_name = Some(name);
            Transition::stay(
                Flow::Registration {
                    step: EnteringName,
                    draft,
                },
                Effect::Prompt(Field::FullName),
            )
        }
        (EnteringName, FlowInput::Text(text)) => {
            let text = text.trim();
            if validators::validate_full_name(text) {
                draft.full_name = Some(text.to_string());
                Transition::stay(
                    Flow::Registration {
                        step: EnteringStudentId,
                        draft,
                    },
                    Effect::Prompt(Field::StudentId),
                )
            } else {
                Transition::stay(
                    Flow::Registration {
                        step: EnteringName,
                        draft,
                    },
                    Effect::RejectInput(Field::FullName),
                )
            }
        }
        (EnteringStudentId, FlowInput::Text(text)) => {
            let text = text.trim();
            if validators::validate_student_id(text) {
                draft.student_id = Some(normalize_digits(text));
                Transition::stay(
                    Flow::Registration {
                        step: EnteringNationalId,
                        draft,
                    },
                    Effect::Prompt(Field::NationalId),
                )
            } else {
                Transition::stay(
                    Flow::Registration {
                        step: EnteringStudentId,
                        draft,
                    },
                    Effect::RejectInput(Field::StudentId),
                )
            }
        }
        (EnteringNationalId, FlowInput::Text(text)) => {
            let text = text.trim();
            if validators::validate_national_id(text) {
                draft.national_id = Some(normalize_digits(text));
                Transition::stay(
                    Flow::Registration {
                        step: EnteringPhone,
                        draft,
                    },
                    Effect::Prompt(Field::Phone),
                )
            } else {
                Transition::stay(
                    Flow::Registration {
                        step: EnteringNationalId,
                        draft,
                    },
                    Effect::RejectInput(Field::NationalId),
                )
            }
        }
        (EnteringPhone, FlowInput::Text(text)) => {
            let text = text.trim();
            if validators::validate_phone_number(text) {
                draft.phone_number = Some(normalize_digits(text));
                Transition::stay(
                    Flow::Registration {
                        step: Confirming,
                        draft,
                    },
                    Effect::ShowSummary,
                )
            } else {
                Transition::stay(
                    Flow::Registration {
                        step: EnteringPhone,
                        draft,
                    },
                    Effect::RejectInput(Field::Phone),
                )
            }
        }
        (Confirming, FlowInput::Confirm) => match (draft.event_name.clone(), draft.applicant()) {
            (Some(event_name), Some(applicant)) => Transition::end(Effect::CommitRegistration {
                event_name,
                applicant,
            }),
            // Incomplete draft at confirmation is unreachable through the
            // step sequence; discard rather than commit partial data.
            _ => Transition::end(Effect::AbortToMenu),
        },
        (Confirming, FlowInput::Edit) => Transition::stay(
            Flow::Registration {
                step: EnteringName,
                draft,
            },
            Effect::Prompt(Field::FullName),
        ),
        (step, _) => Transition::stay(Flow::Registration { step, draft }, Effect::Ignore),
    }
}

fn apply_profile(step: ProfileStep, input: FlowInput) -> Transition {
    use ProfileStep::*;

    match (step, input) {
        (Viewing, FlowInput::StartCancellation) | (SelectingTarget, FlowInput::StartCancellation) => {
            Transition::stay(
                Flow::Profile {
                    step: SelectingTarget,
                },
                Effect::ShowCancellationList,
            )
        }
        (Viewing, FlowInput::BackToMenu) => Transition::end(Effect::AbortToMenu),
        (SelectingTarget, FlowInput::CancelTarget(id)) => Transition::stay(
            Flow::Profile {
                step: ConfirmingCancellation {
                    registration_id: id,
                },
            },
            Effect::ShowCancellationConfirm(id),
        ),
        (SelectingTarget, FlowInput::BackToProfile) => {
            Transition::stay(Flow::Profile { step: Viewing }, Effect::ShowProfile)
        }
        (ConfirmingCancellation { .. }, FlowInput::ConfirmCancel(id)) => {
            Transition::end(Effect::CommitCancellation(id))
        }
        (ConfirmingCancellation { .. }, FlowInput::RejectCancel) => {
            Transition::stay(Flow::Profile { step: Viewing }, Effect::ShowProfile)
        }
        (_, FlowInput::BackToMenu) => Transition::end(Effect::AbortToMenu),
        (step, _) => Transition::stay(Flow::Profile { step }, Effect::Ignore),
    }
}

fn apply_contact(input: FlowInput) -> Transition {
    match input {
        FlowInput::Text(text) => {
            if validators::validate_message_text(&text) {
                Transition::end(Effect::CommitMessage(text.trim().to_string()))
            } else {
                Transition::stay(Flow::Contact, Effect::RejectInput(Field::Message))
            }
        }
        FlowInput::BackToMenu => Transition::end(Effect::AbortToMenu),
        _ => Transition::stay(Flow::Contact, Effect::Ignore),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at_step(step: RegistrationStep, draft: RegistrationDraft) -> Flow {
        Flow::Registration { step, draft }
    }

    #[test]
    fn test_full_registration_walk() {
        let flow = Flow::new_registration();

        let t = apply(flow, FlowInput::EventChosen("کارگاه تست ۱".to_string()));
        assert_eq!(t.effect, Effect::Prompt(Field::FullName));

        let t = apply(t.next.unwrap(), FlowInput::Text("علی احمدی".to_string()));
        assert_eq!(t.effect, Effect::Prompt(Field::StudentId));

        let t = apply(t.next.unwrap(), FlowInput::Text("۴۰۰۱۲۳۴۵".to_string()));
        assert_eq!(t.effect, Effect::Prompt(Field::NationalId));

        let t = apply(t.next.unwrap(), FlowInput::Text("1234567891".to_string()));
        assert_eq!(t.effect, Effect::Prompt(Field::Phone));

        let t = apply(t.next.unwrap(), FlowInput::Text("۰۹۱۲۳۴۵۶۷۸۹".to_string()));
        assert_eq!(t.effect, Effect::ShowSummary);

        let t = apply(t.next.unwrap(), FlowInput::Confirm);
        assert!(t.next.is_none());
        match t.effect {
            Effect::CommitRegistration {
                event_name,
                applicant,
            } => {
                assert_eq!(event_name, "کارگاه تست ۱");
                // digit input was normalized before storage
                assert_eq!(applicant.student_id, "40012345");
                assert_eq!(applicant.phone_number, "09123456789");
            }
            other => panic!("unexpected effect: {other:?}"),
        }
    }

    #[test]
    fn test_invalid_input_stays_on_step() {
        let draft = RegistrationDraft {
            event_name: Some("x".to_string()),
            ..Default::default()
        };
        let t = apply(
            at_step(RegistrationStep::EnteringName, draft.clone()),
            FlowInput::Text("Ali".to_string()),
        );
        assert_eq!(t.effect, Effect::RejectInput(Field::FullName));
        assert_eq!(
            t.next,
            Some(at_step(RegistrationStep::EnteringName, draft))
        );
    }

    #[test]
    fn test_cancel_discards_at_every_step() {
        let steps = [
            RegistrationStep::SelectingEvent,
            RegistrationStep::EnteringName,
            RegistrationStep::EnteringStudentId,
            RegistrationStep::EnteringNationalId,
            RegistrationStep::EnteringPhone,
            RegistrationStep::Confirming,
        ];
        for step in steps {
            let t = apply(at_step(step, RegistrationDraft::default()), FlowInput::Cancel);
            assert!(t.next.is_none(), "cancel must be terminal at {step:?}");
            assert_eq!(t.effect, Effect::AbortToMenu);
        }
    }

    #[test]
    fn test_edit_returns_to_name_with_draft_kept() {
        let draft = RegistrationDraft {
            event_name: Some("e".to_string()),
            full_name: Some("علی احمدی".to_string()),
            student_id: Some("40012345".to_string()),
            national_id: Some("1234567891".to_string()),
            phone_number: Some("09123456789".to_string()),
        };
        let t = apply(
            at_step(RegistrationStep::Confirming, draft.clone()),
            FlowInput::Edit,
        );
        assert_eq!(t.effect, Effect::Prompt(Field::FullName));
        assert_eq!(t.next, Some(at_step(RegistrationStep::EnteringName, draft)));
    }

    #[test]
    fn test_unrelated_input_is_ignored() {
        let t = apply(
            at_step(RegistrationStep::Confirming, RegistrationDraft::default()),
            FlowInput::Text("hello".to_string()),
        );
        assert_eq!(t.effect, Effect::Ignore);
    }

    #[test]
    fn test_cancellation_flow() {
        let t = apply(Flow::new_profile(), FlowInput::StartCancellation);
        assert_eq!(t.effect, Effect::ShowCancellationList);

        let t = apply(t.next.unwrap(), FlowInput::CancelTarget(7));
        assert_eq!(t.effect, Effect::ShowCancellationConfirm(7));

        // reject goes back to the profile view
        let rejected = apply(t.next.clone().unwrap(), FlowInput::RejectCancel);
        assert_eq!(rejected.effect, Effect::ShowProfile);
        assert_eq!(rejected.next, Some(Flow::new_profile()));

        // accept commits and is terminal
        let accepted = apply(t.next.unwrap(), FlowInput::ConfirmCancel(7));
        assert!(accepted.next.is_none());
        assert_eq!(accepted.effect, Effect::CommitCancellation(7));
    }

    #[test]
    fn test_contact_flow() {
        let t = apply(Flow::new_contact(), FlowInput::Text("کوتاه".to_string()));
        assert_eq!(t.effect, Effect::CommitMessage("کوتاه".to_string()));
        assert!(t.next.is_none());

        let t = apply(Flow::new_contact(), FlowInput::Text("هی".to_string()));
        assert_eq!(t.effect, Effect::RejectInput(Field::Message));
        assert_eq!(t.next, Some(Flow::Contact));
    }
}
