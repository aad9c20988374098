//! Callback query dispatcher
//!
//! Payloads follow the `<action>_<id-or-name>` shape. Exact actions are
//! matched first; prefixed payloads carry an event name or a numeric id.

use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::types::{CallbackQuery, ChatId, MessageId, ParseMode};
use tracing::{debug, warn};

use crate::config::Settings;
use crate::database::Gateway;
use crate::handlers::commands::admin;
use crate::handlers::flows;
use crate::middleware::MembershipGate;
use crate::state::machine::FlowInput;
use crate::state::StateStore;
use crate::utils::errors::Result;
use crate::utils::keyboards::membership_keyboard;

pub async fn handle_callback_query(
    bot: Bot,
    query: CallbackQuery,
    settings: Arc<Settings>,
    gateway: Arc<Gateway>,
    store: Arc<StateStore>,
    gate: Arc<MembershipGate>,
) -> Result<()> {
    let user = query.from.clone();
    let user_id = user.id.0 as i64;

    let Some(data) = query.data.clone() else {
        return Ok(());
    };

    // Answer first to clear the client's loading state.
    if let Err(e) = bot.answer_callback_query(query.id.clone()).await {
        warn!(user_id, error = %e, "Failed to answer callback query");
    }

    let Some(message) = query.message.as_ref() else {
        debug!(user_id, data = %data, "Callback without an accessible message");
        return Ok(());
    };
    let chat_id = message.chat().id;
    let message_id = message.id();

    debug!(user_id, data = %data, "Processing callback query");

    // Exact actions
    match data.as_str() {
        "check_membership" => {
            return handle_membership_check(bot, chat_id, message_id, user_id, gate).await;
        }
        "confirm_registration" => {
            return flows::drive_callback(
                bot, chat_id, message_id, &user, FlowInput::Confirm, &gateway, &store,
            )
            .await;
        }
        "edit_registration" => {
            return flows::drive_callback(
                bot, chat_id, message_id, &user, FlowInput::Edit, &gateway, &store,
            )
            .await;
        }
        "cancel_registration" => {
            return flows::drive_callback(
                bot, chat_id, message_id, &user, FlowInput::Cancel, &gateway, &store,
            )
            .await;
        }
        "cancel_cancellation" => {
            return flows::drive_callback(
                bot, chat_id, message_id, &user, FlowInput::RejectCancel, &gateway, &store,
            )
            .await;
        }
        "back_to_profile" => {
            return flows::drive_callback(
                bot, chat_id, message_id, &user, FlowInput::BackToProfile, &gateway, &store,
            )
            .await;
        }
        _ => {}
    }

    // Prefixed payloads
    if let Some(event_name) = data.strip_prefix("event_") {
        return flows::handle_event_selected(
            bot,
            chat_id,
            message_id,
            &user,
            event_name.to_string(),
            &gateway,
            &store,
        )
        .await;
    }

    if let Some(raw_id) = data.strip_prefix("cancel_reg_") {
        if let Ok(id) = raw_id.parse::<i64>() {
            return flows::drive_callback(
                bot,
                chat_id,
                message_id,
                &user,
                FlowInput::CancelTarget(id),
                &gateway,
                &store,
            )
            .await;
        }
    }

    if let Some(raw_id) = data.strip_prefix("confirm_cancel_") {
        if let Ok(id) = raw_id.parse::<i64>() {
            return flows::drive_callback(
                bot,
                chat_id,
                message_id,
                &user,
                FlowInput::ConfirmCancel(id),
                &gateway,
                &store,
            )
            .await;
        }
    }

    // Admin message-browser navigation: msg_<action>_<id>
    if let Some(rest) = data.strip_prefix("msg_") {
        if !admin::is_admin(&settings, user_id) {
            warn!(user_id, "Non-admin pressed an admin callback");
            return Ok(());
        }
        if let Some((action, raw_id)) = rest.rsplit_once('_') {
            if let Ok(id) = raw_id.parse::<i64>() {
                return admin::handle_message_nav(
                    bot, chat_id, message_id, user_id, action, id, &gateway,
                )
                .await;
            }
        }
    }

    warn!(user_id, data = %data, "Unknown callback action");
    Ok(())
}

/// Re-run the membership check from the join prompt and update it in
/// place.
async fn handle_membership_check(
    bot: Bot,
    chat_id: ChatId,
    message_id: MessageId,
    user_id: i64,
    gate: Arc<MembershipGate>,
) -> Result<()> {
    if gate.is_member(user_id).await {
        bot.edit_message_text(
            chat_id,
            message_id,
            "🎉 *تبریک\\! عضویت شما تایید شد\\!*\n\n\
             اکنون می‌توانید از تمام امکانات ربات استفاده کنید\\.\n\n\
             لطفاً از منوی زیر انتخاب کنید:",
        )
        .parse_mode(ParseMode::MarkdownV2)
        .await?;
    } else {
        bot.edit_message_text(
            chat_id,
            message_id,
            "❌ *متأسفانه هنوز در کانال عضو نیستید\\.*\n\n\
             لطفاً مراحل زیر را انجام دهید:\n\
             1\\. روی دکمه '✨ عضویت در کانال' کلیک کنید\n\
             2\\. در کانال عضو شوید\n\
             3\\. سپس روی '✅ تایید عضویت' کلیک کنید\n\n\
             پس از عضویت، امکانات ویژه ربات برای شما فعال خواهد شد\\.",
        )
        .parse_mode(ParseMode::MarkdownV2)
        .reply_markup(membership_keyboard(gate.channel_url()))
        .await?;
    }
    Ok(())
}
