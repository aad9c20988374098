//! Text message router
//!
//! Classifies plain text into: a menu label (starts a feature, replacing
//! any leftover flow), input for the active conversation, or the "use
//! the menu" nudge.

use std::sync::Arc;

use teloxide::prelude::*;
use tracing::debug;

use crate::config::Settings;
use crate::database::Gateway;
use crate::handlers::commands::info;
use crate::handlers::flows;
use crate::middleware::MembershipGate;
use crate::models::EventCategory;
use crate::state::machine::FlowInput;
use crate::state::StateStore;
use crate::utils::errors::Result;
use crate::utils::keyboards::{
    main_keyboard, LABEL_ABOUT, LABEL_BACK_TO_MENU, LABEL_CANCEL_FLOW,
    LABEL_CANCEL_REGISTRATION, LABEL_CONTACT_ADMIN, LABEL_CONTACT_INFO, LABEL_EVENTS,
    LABEL_PROFILE, LABEL_REGISTER, LABEL_WORKSHOPS,
};

pub async fn handle_message(
    bot: Bot,
    msg: Message,
    settings: Arc<Settings>,
    gateway: Arc<Gateway>,
    store: Arc<StateStore>,
    gate: Arc<MembershipGate>,
) -> Result<()> {
    let Some(user) = msg.from.clone() else {
        return Ok(());
    };
    if !msg.chat.is_private() {
        return Ok(());
    }
    let Some(text) = msg.text() else {
        return Ok(());
    };

    let user_id = user.id.0 as i64;
    let chat_id = msg.chat.id;

    debug!(user_id, text, "Routing text message");

    // Menu labels take precedence; starting a feature replaces whatever
    // conversation was left behind.
    match text {
        LABEL_ABOUT => return info::send_about(&bot, chat_id, &settings).await,
        LABEL_EVENTS => {
            return info::send_event_list(&bot, chat_id, &gateway, EventCategory::Event).await
        }
        LABEL_WORKSHOPS => {
            return info::send_event_list(&bot, chat_id, &gateway, EventCategory::Workshop).await
        }
        LABEL_CONTACT_INFO => return info::send_contact_info(&bot, chat_id, &settings).await,
        LABEL_REGISTER => {
            return flows::start_registration(bot, chat_id, user_id, gateway, store, gate).await
        }
        LABEL_PROFILE => {
            return flows::start_profile(bot, chat_id, user, gateway, store, gate).await
        }
        LABEL_CONTACT_ADMIN => {
            return flows::start_contact(bot, chat_id, user_id, gateway, store, gate).await
        }
        _ => {}
    }

    // Input for an in-progress conversation
    if let Some(flow) = store.current(user_id) {
        let input = classify_text(text);
        return flows::drive_message(bot, chat_id, &user, flow, input, &gateway, &store).await;
    }

    // No flow, no label: nudge back to the menu
    bot.send_message(chat_id, "⚠️ لطفاً از دکمه‌های منو استفاده کنید.")
        .reply_markup(main_keyboard())
        .await?;
    Ok(())
}

/// Map flow-control labels onto machine inputs; everything else is field
/// input for the current step.
fn classify_text(text: &str) -> FlowInput {
    match text {
        LABEL_CANCEL_FLOW => FlowInput::Cancel,
        LABEL_BACK_TO_MENU => FlowInput::BackToMenu,
        LABEL_CANCEL_REGISTRATION => FlowInput::StartCancellation,
        other => FlowInput::Text(other.to_string()),
    }
}
