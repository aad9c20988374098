//! Administrative command handlers
//!
//! Every handler here is reachable only after the dispatcher has checked
//! the sender against the configured admin ids.

use teloxide::prelude::*;
use teloxide::types::{ChatId, InlineKeyboardButton, InlineKeyboardMarkup, MessageId, ParseMode};
use tracing::{info, warn};

use crate::config::Settings;
use crate::database::Gateway;
use crate::models::{EventCategory, NewEvent, UserMessage};
use crate::state::StateStore;
use crate::utils::errors::Result;
use crate::utils::markdown::escape_markdown;

pub fn is_admin(settings: &Settings, user_id: i64) -> bool {
    settings.bot.admin_ids.contains(&user_id)
}

pub async fn handle_stats(
    bot: Bot,
    chat_id: ChatId,
    gateway: &Gateway,
    store: &StateStore,
) -> Result<()> {
    let stats = gateway.system_stats().await;
    let text = format!(
        "📊 آمار سیستم\n\n\
         📅 رویدادها: {}\n\
         📝 ثبت‌نام‌ها: {}\n\
         📬 پیام‌های خوانده‌نشده: {}\n\
         💬 گفتگوهای در جریان: {}",
        stats.events,
        stats.registrations,
        stats.unread_messages,
        store.active_count(),
    );
    bot.send_message(chat_id, text).await?;
    Ok(())
}

/// Open the message browser on the most recent message.
pub async fn handle_messages(bot: Bot, chat_id: ChatId, gateway: &Gateway) -> Result<()> {
    let latest = gateway.list_messages(None, 1).await;
    match latest.first() {
        Some(message) => {
            bot.send_message(chat_id, message_card(message))
                .parse_mode(ParseMode::MarkdownV2)
                .reply_markup(message_nav_keyboard(message.id))
                .await?;
        }
        None => {
            bot.send_message(chat_id, "📭 هیچ پیامی موجود نیست.").await?;
        }
    }
    Ok(())
}

/// Browser navigation callbacks: `msg_<action>_<id>`.
pub async fn handle_message_nav(
    bot: Bot,
    chat_id: ChatId,
    message_id: MessageId,
    admin_id: i64,
    action: &str,
    id: i64,
    gateway: &Gateway,
) -> Result<()> {
    match action {
        "next" => match gateway.next_message_id(id, None).await {
            Some(next_id) => show_card(&bot, chat_id, message_id, next_id, gateway).await,
            None => {
                bot.send_message(chat_id, "📭 پیام جدیدتری وجود ندارد.").await?;
                Ok(())
            }
        },
        "prev" => match gateway.previous_message_id(id, None).await {
            Some(prev_id) => show_card(&bot, chat_id, message_id, prev_id, gateway).await,
            None => {
                bot.send_message(chat_id, "📭 پیام قدیمی‌تری وجود ندارد.").await?;
                Ok(())
            }
        },
        "read" => {
            if let Err(err) = gateway.mark_message_read(id).await {
                warn!(message_id = id, error = %err, "Marking message read failed");
            }
            show_card(&bot, chat_id, message_id, id, gateway).await
        }
        "del" => {
            match gateway.delete_message(id).await {
                Ok(()) => {
                    info!(admin_id, message_id = id, "Message deleted by admin");
                    bot.edit_message_text(chat_id, message_id, "🗑 پیام حذف شد\\.")
                        .parse_mode(ParseMode::MarkdownV2)
                        .await?;
                }
                Err(err) => {
                    warn!(message_id = id, error = %err, "Deleting message failed");
                    bot.send_message(chat_id, "❌ حذف پیام ممکن نبود.").await?;
                }
            }
            Ok(())
        }
        other => {
            warn!(action = other, "Unknown message navigation action");
            Ok(())
        }
    }
}

async fn show_card(
    bot: &Bot,
    chat_id: ChatId,
    message_id: MessageId,
    id: i64,
    gateway: &Gateway,
) -> Result<()> {
    match gateway.message_by_id(id).await {
        Some(message) => {
            bot.edit_message_text(chat_id, message_id, message_card(&message))
                .parse_mode(ParseMode::MarkdownV2)
                .reply_markup(message_nav_keyboard(message.id))
                .await?;
        }
        None => {
            bot.edit_message_text(chat_id, message_id, "❌ پیام مورد نظر یافت نشد\\.")
                .parse_mode(ParseMode::MarkdownV2)
                .await?;
        }
    }
    Ok(())
}

fn message_card(message: &UserMessage) -> String {
    let mut text = format!(
        "📬 *پیام \\#{}* \\({}\\)\n\n\
         👤 *فرستنده:* {} \\(`{}`\\)\n\
         🗓 *تاریخ:* {}\n\n\
         📝 {}",
        message.id,
        escape_markdown(message.status.as_str()),
        escape_markdown(&message.user_full_name),
        message.user_id,
        escape_markdown(&message.created_at.format("%Y-%m-%d %H:%M").to_string()),
        escape_markdown(&message.message_text),
    );
    if let Some(reply) = &message.admin_reply {
        text.push_str(&format!("\n\n↩️ *پاسخ:* {}", escape_markdown(reply)));
    }
    text
}

fn message_nav_keyboard(id: i64) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![
            InlineKeyboardButton::callback("⬅️ قبلی", format!("msg_prev_{id}")),
            InlineKeyboardButton::callback("بعدی ➡️", format!("msg_next_{id}")),
        ],
        vec![
            InlineKeyboardButton::callback("✅ خوانده شد", format!("msg_read_{id}")),
            InlineKeyboardButton::callback("🗑 حذف", format!("msg_del_{id}")),
        ],
    ])
}

/// `/reply <id> <text>` — record the reply and forward it to the sender.
pub async fn handle_reply(
    bot: Bot,
    chat_id: ChatId,
    admin_id: i64,
    args: &str,
    gateway: &Gateway,
) -> Result<()> {
    let mut parts = args.trim().splitn(2, char::is_whitespace);
    let id = parts.next().and_then(|raw| raw.parse::<i64>().ok());
    let reply_text = parts.next().map(str::trim).unwrap_or_default();

    let (Some(id), false) = (id, reply_text.is_empty()) else {
        bot.send_message(chat_id, "استفاده: /reply <شناسه پیام> <متن پاسخ>")
            .await?;
        return Ok(());
    };

    match gateway.add_admin_reply(id, admin_id, reply_text).await {
        Ok(()) => {
            // forward the reply to the message's sender
            if let Some(message) = gateway.message_by_id(id).await {
                let forwarded = bot
                    .send_message(
                        ChatId(message.user_id),
                        format!("📬 پاسخ مدیر انجمن به پیام شما:\n\n{reply_text}"),
                    )
                    .await;
                if let Err(err) = forwarded {
                    warn!(message_id = id, error = %err, "Forwarding admin reply failed");
                }
            }
            bot.send_message(chat_id, "✅ پاسخ ثبت و ارسال شد.").await?;
        }
        Err(err) => {
            warn!(message_id = id, error = %err, "Recording admin reply failed");
            bot.send_message(chat_id, "❌ پیام مورد نظر یافت نشد.").await?;
        }
    }
    Ok(())
}

/// `/addevent name | description | date | time | location | capacity | category`
pub async fn handle_add_event(
    bot: Bot,
    chat_id: ChatId,
    args: &str,
    gateway: &Gateway,
) -> Result<()> {
    let fields: Vec<&str> = args.split('|').map(str::trim).collect();
    if fields.len() != 7 {
        bot.send_message(
            chat_id,
            "استفاده: /addevent نام | توضیحات | تاریخ | زمان | محل | ظرفیت | نوع (event/workshop)",
        )
        .await?;
        return Ok(());
    }

    let capacity = fields[5].parse::<i64>().ok().filter(|c| *c > 0);
    let category = EventCategory::parse(fields[6]);
    let (Some(capacity), Some(category)) = (capacity, category) else {
        bot.send_message(chat_id, "❌ ظرفیت باید عدد مثبت و نوع event یا workshop باشد.")
            .await?;
        return Ok(());
    };

    let event = NewEvent {
        name: fields[0].to_string(),
        description: fields[1].to_string(),
        date: fields[2].to_string(),
        time: fields[3].to_string(),
        location: fields[4].to_string(),
        capacity,
        category,
    };

    match gateway.create_event(event).await {
        Ok(created) => {
            bot.send_message(
                chat_id,
                format!("✅ رویداد '{}' با شناسه {} ایجاد شد.", created.name, created.id),
            )
            .await?;
        }
        Err(err) => {
            warn!(error = %err, "Creating event failed");
            bot.send_message(chat_id, "❌ رویداد با این نام قبلاً وجود دارد.")
                .await?;
        }
    }
    Ok(())
}

pub async fn handle_toggle_event(
    bot: Bot,
    chat_id: ChatId,
    id: i64,
    gateway: &Gateway,
) -> Result<()> {
    match gateway.toggle_event(id).await {
        Ok(active) => {
            let state = if active { "فعال" } else { "غیرفعال" };
            bot.send_message(chat_id, format!("✅ رویداد {id} اکنون {state} است."))
                .await?;
        }
        Err(err) => {
            warn!(event_id = id, error = %err, "Toggling event failed");
            bot.send_message(chat_id, "❌ رویداد با این شناسه یافت نشد.").await?;
        }
    }
    Ok(())
}

pub async fn handle_delete_event(
    bot: Bot,
    chat_id: ChatId,
    id: i64,
    gateway: &Gateway,
) -> Result<()> {
    use crate::utils::errors::GatewayError;

    match gateway.delete_event(id).await {
        Ok(()) => {
            bot.send_message(chat_id, format!("✅ رویداد {id} حذف شد.")).await?;
        }
        Err(GatewayError::HasActiveRegistrations { .. }) => {
            bot.send_message(chat_id, "❌ امکان حذف رویداد با ثبت‌نام‌های فعال وجود ندارد.")
                .await?;
        }
        Err(err) => {
            warn!(event_id = id, error = %err, "Deleting event failed");
            bot.send_message(chat_id, "❌ رویداد با این شناسه یافت نشد.").await?;
        }
    }
    Ok(())
}

pub async fn handle_all_events(bot: Bot, chat_id: ChatId, gateway: &Gateway) -> Result<()> {
    let events = gateway.list_all_events().await;
    if events.is_empty() {
        bot.send_message(chat_id, "📭 هیچ رویدادی ثبت نشده است.").await?;
        return Ok(());
    }

    let mut text = "📅 همه رویدادها:\n\n".to_string();
    for event in &events {
        let state = if event.active { "فعال" } else { "غیرفعال" };
        text.push_str(&format!(
            "#{} — {} ({})\n   {} | ظرفیت {}/{} | {}\n",
            event.id,
            event.name,
            event.category,
            event.date,
            event.registered_count,
            event.capacity,
            state,
        ));
    }
    bot.send_message(chat_id, text).await?;
    Ok(())
}

/// Latest registrations, newest first.
pub async fn handle_recent_registrations(
    bot: Bot,
    chat_id: ChatId,
    gateway: &Gateway,
) -> Result<()> {
    let registrations = gateway.recent_registrations(10).await;
    if registrations.is_empty() {
        bot.send_message(chat_id, "📭 هنوز ثبت‌نامی انجام نشده است.").await?;
        return Ok(());
    }

    let mut text = "📝 آخرین ثبت‌نام‌ها:\n\n".to_string();
    for reg in &registrations {
        text.push_str(&format!(
            "#{} — {} | {} | {}\n",
            reg.id,
            reg.full_name,
            reg.event_name,
            reg.registered_at.format("%Y-%m-%d %H:%M"),
        ));
    }
    bot.send_message(chat_id, text).await?;
    Ok(())
}
