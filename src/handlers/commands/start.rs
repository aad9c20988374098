//! /start and /cancel command handlers

use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::types::ParseMode;
use tracing::info;

use crate::config::Settings;
use crate::middleware::MembershipGate;
use crate::state::StateStore;
use crate::utils::errors::Result;
use crate::utils::keyboards::main_keyboard;
use crate::utils::markdown::escape_markdown;

/// Welcome message with the society branding; non-members additionally
/// get the channel call-to-action.
pub async fn handle_start(
    bot: Bot,
    msg: Message,
    settings: Arc<Settings>,
    gate: Arc<MembershipGate>,
) -> Result<()> {
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };
    let user_id = user.id.0 as i64;
    let chat_id = msg.chat.id;

    info!(user_id, "User started the bot");

    let is_member = gate.is_member(user_id).await;

    let mut text = format!(
        "👋 *به ربات {} خوش آمدید\\!*\n\n\
         🏛 {}\n\n\
         💫 *امکانات ربات:*\n\
         • 📅 مشاهده رویدادها و کارگاه‌ها\n\
         • 📝 ثبت‌نام در رویدادها\n\
         • 💬 ارتباط با مدیران\n\
         • 📞 اطلاعات تماس انجمن\n\n",
        escape_markdown(&settings.society.name),
        escape_markdown(&settings.society.university),
    );

    if !is_member {
        text.push_str(&format!(
            "🌟 *برای دسترسی به تمام امکانات، در کانال ما عضو شوید:*\n{}",
            escape_markdown(&settings.channel.url),
        ));
    }

    bot.send_message(chat_id, text)
        .parse_mode(ParseMode::MarkdownV2)
        .reply_markup(main_keyboard())
        .await?;
    Ok(())
}

/// Global cancel: discards any in-progress conversation and re-shows the
/// main menu.
pub async fn handle_cancel(bot: Bot, msg: Message, store: Arc<StateStore>) -> Result<()> {
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };
    let user_id = user.id.0 as i64;

    if store.clear(user_id) {
        info!(user_id, "Conversation cancelled via /cancel");
    }

    bot.send_message(msg.chat.id, "❌ عملیات لغو شد.")
        .reply_markup(main_keyboard())
        .await?;
    Ok(())
}
