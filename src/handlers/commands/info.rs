//! Informational renders: about, event/workshop listings, contact details

use teloxide::prelude::*;
use teloxide::types::{ChatId, ParseMode};

use crate::config::Settings;
use crate::database::Gateway;
use crate::models::EventCategory;
use crate::utils::errors::Result;
use crate::utils::markdown::escape_markdown;

pub async fn send_about(bot: &Bot, chat_id: ChatId, settings: &Settings) -> Result<()> {
    let text = format!(
        "📖 *درباره {}*\n\n\
         انجمن علمی مهندسی ساخت و تولید با هدف ارتقای سطح علمی و مهارتی دانشجویان فعالیت می‌کند\\.\n\n\
         🎯 *اهداف:*\n\
         • برگزاری کارگاه‌های آموزشی\n\
         • سازماندهی سمینارها و همایش‌ها\n\
         • ارتباط با صنعت\n\
         • پشتیبانی از پروژه‌های دانشجویی\n\n\
         🏛 {}\n\n\
         📢 *کانال ما:* {}",
        escape_markdown(&settings.society.name),
        escape_markdown(&settings.society.university),
        escape_markdown(&settings.channel.username),
    );
    bot.send_message(chat_id, text)
        .parse_mode(ParseMode::MarkdownV2)
        .await?;
    Ok(())
}

pub async fn send_contact_info(bot: &Bot, chat_id: ChatId, settings: &Settings) -> Result<()> {
    let text = format!(
        "📞 *راه‌های ارتباطی با {}:*\n\n\
         📍 آدرس: دانشکده مهندسی مکانیک، {}\n\
         📞 تلفن: {}\n\
         📧 ایمیل: {}\n\
         📢 کانال: {}\n\
         🕘 ساعات کاری: ۸\\-۱۶ به جز پنجشنبه‌ها",
        escape_markdown(&settings.society.name),
        escape_markdown(&settings.society.university),
        escape_markdown(&settings.society.contact_phone),
        escape_markdown(&settings.society.contact_email),
        escape_markdown(&settings.channel.username),
    );
    bot.send_message(chat_id, text)
        .parse_mode(ParseMode::MarkdownV2)
        .await?;
    Ok(())
}

/// Render the active events of one category, date-ascending.
pub async fn send_event_list(
    bot: &Bot,
    chat_id: ChatId,
    gateway: &Gateway,
    category: EventCategory,
) -> Result<()> {
    let events = gateway.list_events(Some(category)).await;

    if events.is_empty() {
        let empty_text = match category {
            EventCategory::Event => "📭 *در حال حاضر هیچ رویدادی برنامه‌ریزی نشده است\\.*",
            EventCategory::Workshop => "📭 *در حال حاضر هیچ کارگاهی برنامه‌ریزی نشده است\\.*",
        };
        bot.send_message(chat_id, empty_text)
            .parse_mode(ParseMode::MarkdownV2)
            .await?;
        return Ok(());
    }

    let mut text = match category {
        EventCategory::Event => "📅 *رویدادهای پیش رو:*\n\n".to_string(),
        EventCategory::Workshop => "🎓 *کارگاه‌های آموزشی:*\n\n".to_string(),
    };

    for event in &events {
        text.push_str(&format!(
            "✨ *{}*\n\
             📅 *تاریخ برگزاری:* {}\n\
             ⏰ *زمان:* {}\n\
             📍 *محل:* {}\n\
             👥 *ظرفیت:* {}\n\
             ✅ *ثبت‌نام‌شده:* {}\n\
             📝 *توضیحات:* {}\n\n",
            escape_markdown(&event.name),
            escape_markdown(&event.date),
            escape_markdown(&event.time),
            escape_markdown(&event.location),
            event.capacity,
            event.registered_count,
            escape_markdown(&event.description),
        ));
    }

    bot.send_message(chat_id, text)
        .parse_mode(ParseMode::MarkdownV2)
        .await?;
    Ok(())
}
