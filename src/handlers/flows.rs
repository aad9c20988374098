//! Conversation flow drivers
//!
//! Entry points start a flow in the state store behind the membership
//! gate; classified inputs run through the state machine; the resulting
//! [`Effect`] is executed here — rendering prompts and calling the
//! persistence gateway. The machine stays transport-free; this module is
//! where its effects meet teloxide.

use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::types::{ChatId, KeyboardRemove, MessageId, ParseMode, User};
use tracing::{debug, warn};

use crate::database::Gateway;
use crate::middleware::MembershipGate;
use crate::models::RegistrationDetails;
use crate::state::machine::{self, Effect, Field, Flow, FlowInput, ProfileStep};
use crate::state::StateStore;
use crate::utils::errors::{GatewayError, Result};
use crate::utils::keyboards::{
    cancel_keyboard, cancellation_confirm_keyboard, cancellation_keyboard,
    event_selection_keyboard, main_keyboard, profile_keyboard, registration_confirm_keyboard,
};
use crate::utils::markdown::escape_markdown;

/// Re-display the main menu so the user is never stranded mid-flow.
pub async fn send_main_menu(bot: &Bot, chat_id: ChatId) -> Result<()> {
    bot.send_message(chat_id, "🏠 به منوی اصلی بازگشتید:")
        .reply_markup(main_keyboard())
        .await?;
    Ok(())
}

// ---- flow entry points ---------------------------------------------------

/// Start the registration flow (gated).
pub async fn start_registration(
    bot: Bot,
    chat_id: ChatId,
    user_id: i64,
    gateway: Arc<Gateway>,
    store: Arc<StateStore>,
    gate: Arc<MembershipGate>,
) -> Result<()> {
    let bot2 = bot.clone();
    gate.guard(user_id, chat_id, "سیستم ثبت‌نام در رویدادها", move || async move {
        let events = gateway.list_events(None).await;
        if events.is_empty() {
            bot2.send_message(
                chat_id,
                "⚠️ در حال حاضر هیچ رویداد یا کارگاهی برای ثبت‌نام موجود نیست.",
            )
            .reply_markup(main_keyboard())
            .await?;
            return Ok(());
        }

        store.start(user_id, Flow::new_registration());
        bot2.send_message(
            chat_id,
            "📝 *ثبت‌نام در رویداد*\n\n\
             ⚠️ توجه: هر کاربر تنها یک بار می‌تواند در هر رویداد ثبت‌نام کند\\.\n\n\
             لطفاً یکی از رویدادهای زیر را انتخاب کنید:",
        )
        .parse_mode(ParseMode::MarkdownV2)
        .reply_markup(event_selection_keyboard(&events))
        .await?;
        Ok(())
    })
    .await
}

/// Start the profile view (gated); the cancellation sub-flow nests here.
pub async fn start_profile(
    bot: Bot,
    chat_id: ChatId,
    user: User,
    gateway: Arc<Gateway>,
    store: Arc<StateStore>,
    gate: Arc<MembershipGate>,
) -> Result<()> {
    let user_id = user.id.0 as i64;
    let bot2 = bot.clone();
    gate.guard(user_id, chat_id, "مشاهده پروفایل", move || async move {
        let registrations = gateway.user_registrations(user_id).await;
        store.start(user_id, Flow::new_profile());
        bot2.send_message(chat_id, profile_text(&user, &registrations))
            .parse_mode(ParseMode::MarkdownV2)
            .reply_markup(profile_keyboard(!registrations.is_empty()))
            .await?;
        Ok(())
    })
    .await
}

/// Start the contact-admin flow (gated), with the daily quota checked
/// eagerly so users are not asked to type a message that will be refused.
pub async fn start_contact(
    bot: Bot,
    chat_id: ChatId,
    user_id: i64,
    gateway: Arc<Gateway>,
    store: Arc<StateStore>,
    gate: Arc<MembershipGate>,
) -> Result<()> {
    let bot2 = bot.clone();
    gate.guard(user_id, chat_id, "سیستم تماس با مدیر", move || async move {
        if gateway.messages_sent_today(user_id).await >= gateway.daily_message_quota() {
            bot2.send_message(
                chat_id,
                "⚠️ *شما امروز پیام خود را ارسال کرده‌اید\\.*\n\
                 لطفاً فردا مجدداً تلاش کنید\\.\n\n\
                 با تشکر از صبر و شکیبایی شما 🙏",
            )
            .parse_mode(ParseMode::MarkdownV2)
            .reply_markup(main_keyboard())
            .await?;
            return Ok(());
        }

        store.start(user_id, Flow::new_contact());
        bot2.send_message(
            chat_id,
            "💬 *تماس با مدیر*\n\n\
             لطفاً پیام خود را برای مدیران انجمن ارسال کنید\\.\n\
             ⚠️ توجه: هر کاربر تنها می‌تواند ۱ پیام در روز ارسال کند\\.\n\n\
             پیام شما در اسرع وقت بررسی و پاسخ داده خواهد شد\\.\n\n\
             برای لغو دستور /cancel را وارد کنید\\.",
        )
        .parse_mode(ParseMode::MarkdownV2)
        .reply_markup(KeyboardRemove::new())
        .await?;
        Ok(())
    })
    .await
}

// ---- input driving -------------------------------------------------------

/// Feed one classified input from a plain message into the machine.
pub async fn drive_message(
    bot: Bot,
    chat_id: ChatId,
    user: &User,
    flow: Flow,
    input: FlowInput,
    gateway: &Gateway,
    store: &StateStore,
) -> Result<()> {
    // Opening the cancellation list only makes sense with something to
    // cancel; short-circuit here since the machine cannot ask the store.
    if input == FlowInput::StartCancellation
        && matches!(flow, Flow::Profile { step: ProfileStep::Viewing })
    {
        let user_id = user.id.0 as i64;
        let registrations = gateway.user_registrations(user_id).await;
        if registrations.is_empty() {
            bot.send_message(chat_id, "❌ شما هیچ ثبت‌نام فعالی ندارید\\.")
                .parse_mode(ParseMode::MarkdownV2)
                .reply_markup(profile_keyboard(false))
                .await?;
            return Ok(());
        }
    }

    let user_id = user.id.0 as i64;
    let was_text = matches!(input, FlowInput::Text(_));
    let transition = machine::apply(flow, input);
    store.transition(user_id, transition.next);

    // Free text at a keyboard-driven step: nothing to validate, so point
    // the user back at the buttons instead of staying silent.
    if was_text && transition.effect == Effect::Ignore {
        bot.send_message(chat_id, "⚠️ لطفاً از دکمه‌های منو استفاده کنید.")
            .await?;
        return Ok(());
    }

    execute(&bot, chat_id, user, transition.effect, None, gateway, store).await
}

/// Feed one classified input from a callback query into the machine; the
/// originating inline message is edited in place where that fits.
pub async fn drive_callback(
    bot: Bot,
    chat_id: ChatId,
    message_id: MessageId,
    user: &User,
    input: FlowInput,
    gateway: &Gateway,
    store: &StateStore,
) -> Result<()> {
    let user_id = user.id.0 as i64;
    let Some(flow) = store.current(user_id) else {
        debug!(user_id, "Callback for a conversation that is no longer active");
        return Ok(());
    };

    let transition = machine::apply(flow, input);
    store.transition(user_id, transition.next);
    execute(
        &bot,
        chat_id,
        user,
        transition.effect,
        Some(message_id),
        gateway,
        store,
    )
    .await
}

/// Event selection: the already-registered case aborts eagerly with a
/// distinct message before any field entry is wasted. The gateway's
/// commit-time duplicate check stays authoritative under races.
pub async fn handle_event_selected(
    bot: Bot,
    chat_id: ChatId,
    message_id: MessageId,
    user: &User,
    event_name: String,
    gateway: &Gateway,
    store: &StateStore,
) -> Result<()> {
    let user_id = user.id.0 as i64;

    if gateway.is_registered(user_id, &event_name).await {
        store.clear(user_id);
        bot.edit_message_text(
            chat_id,
            message_id,
            format!(
                "⚠️ شما قبلاً در رویداد '{}' ثبت‌نام کرده‌اید\\.\n\n\
                 هر کاربر می‌تواند تنها یک بار در هر رویداد ثبت‌نام کند\\.",
                escape_markdown(&event_name)
            ),
        )
        .parse_mode(ParseMode::MarkdownV2)
        .await?;
        send_main_menu(&bot, chat_id).await?;
        return Ok(());
    }

    let Some(flow) = store.current(user_id) else {
        debug!(user_id, "Event selected without an active registration flow");
        return Ok(());
    };

    let transition = machine::apply(flow, FlowInput::EventChosen(event_name.clone()));
    store.transition(user_id, transition.next);

    if transition.effect == Effect::Prompt(Field::FullName) {
        bot.edit_message_text(
            chat_id,
            message_id,
            format!("✅ *رویداد انتخاب شده: {}*", escape_markdown(&event_name)),
        )
        .parse_mode(ParseMode::MarkdownV2)
        .await?;
    }
    execute(
        &bot,
        chat_id,
        user,
        transition.effect,
        None,
        gateway,
        store,
    )
    .await
}

// ---- effect execution ----------------------------------------------------

async fn execute(
    bot: &Bot,
    chat_id: ChatId,
    user: &User,
    effect: Effect,
    edit: Option<MessageId>,
    gateway: &Gateway,
    store: &StateStore,
) -> Result<()> {
    let user_id = user.id.0 as i64;

    match effect {
        Effect::Ignore => Ok(()),

        Effect::Prompt(field) => {
            bot.send_message(chat_id, prompt_text(field))
                .reply_markup(cancel_keyboard())
                .await?;
            Ok(())
        }

        Effect::RejectInput(Field::Message) => {
            bot.send_message(
                chat_id,
                "⚠️ پیام باید حداقل 5 حرف باشد. لطفاً پیام معتبرتری ارسال کنید:",
            )
            .reply_markup(KeyboardRemove::new())
            .await?;
            Ok(())
        }

        Effect::RejectInput(field) => {
            bot.send_message(chat_id, reject_text(field))
                .reply_markup(cancel_keyboard())
                .await?;
            Ok(())
        }

        Effect::ShowSummary => {
            // the draft just advanced into the confirming step
            let Some(Flow::Registration { draft, .. }) = store.current(user_id) else {
                warn!(user_id, "Summary requested without a registration draft");
                return send_main_menu(bot, chat_id).await;
            };
            let summary = format!(
                "📋 *خلاصه اطلاعات ثبت‌نام*\n\n\
                 👤 *نام:* {}\n\
                 🎫 *شماره دانشجویی:* {}\n\
                 🆔 *شماره ملی:* {}\n\
                 📞 *شماره تماس:* {}\n\
                 🎯 *رویداد:* {}\n\n\
                 ⚠️ *آیا اطلاعات فوق صحیح است؟*",
                escape_markdown(draft.full_name.as_deref().unwrap_or("")),
                escape_markdown(draft.student_id.as_deref().unwrap_or("")),
                escape_markdown(draft.national_id.as_deref().unwrap_or("")),
                escape_markdown(draft.phone_number.as_deref().unwrap_or("")),
                escape_markdown(draft.event_name.as_deref().unwrap_or("")),
            );
            bot.send_message(chat_id, summary)
                .parse_mode(ParseMode::MarkdownV2)
                .reply_markup(registration_confirm_keyboard())
                .await?;
            Ok(())
        }

        Effect::CommitRegistration {
            event_name,
            applicant,
        } => {
            let text = match gateway.register(user_id, &event_name, &applicant).await {
                Ok(registration_id) => format!(
                    "🎉 *ثبت‌نام با موفقیت انجام شد\\!*\n\n\
                     📋 *جزئیات ثبت‌نام:*\n\
                     • 👤 نام: {}\n\
                     • 🎫 شماره دانشجویی: {}\n\
                     • 🆔 شماره ملی: {}\n\
                     • 📞 شماره تماس: {}\n\
                     • 🎯 رویداد: {}\n\n\
                     🔢 کد پیگیری: \\#{}\n\n\
                     با تشکر از ثبت‌نام شما 💫",
                    escape_markdown(&applicant.full_name),
                    escape_markdown(&applicant.student_id),
                    escape_markdown(&applicant.national_id),
                    escape_markdown(&applicant.phone_number),
                    escape_markdown(&event_name),
                    registration_id,
                ),
                Err(err) => format!("❌ خطا: {}", gateway_error_text(&err)),
            };
            send_or_edit(bot, chat_id, edit, text).await?;
            send_main_menu(bot, chat_id).await
        }

        Effect::ShowCancellationList => {
            let registrations = gateway.user_registrations(user_id).await;
            let text = cancellation_list_text(&registrations);
            bot.send_message(chat_id, text)
                .parse_mode(ParseMode::MarkdownV2)
                .reply_markup(cancellation_keyboard(&registrations))
                .await?;
            Ok(())
        }

        Effect::ShowCancellationConfirm(registration_id) => {
            match gateway.registration_details(registration_id, user_id).await {
                Some(details) => {
                    let text = cancellation_confirm_text(&details);
                    match edit {
                        Some(message_id) => {
                            bot.edit_message_text(chat_id, message_id, text)
                                .parse_mode(ParseMode::MarkdownV2)
                                .reply_markup(cancellation_confirm_keyboard(registration_id))
                                .await?;
                        }
                        None => {
                            bot.send_message(chat_id, text)
                                .parse_mode(ParseMode::MarkdownV2)
                                .reply_markup(cancellation_confirm_keyboard(registration_id))
                                .await?;
                        }
                    }
                    Ok(())
                }
                None => {
                    // the registration vanished between listing and picking
                    store.transition(user_id, Some(Flow::new_profile()));
                    send_or_edit(
                        bot,
                        chat_id,
                        edit,
                        "❌ ثبت‌نام مورد نظر یافت نشد\\.".to_string(),
                    )
                    .await?;
                    Ok(())
                }
            }
        }

        Effect::CommitCancellation(registration_id) => {
            let text = match gateway.cancel_registration(registration_id, user_id).await {
                Ok(()) => "✅ *انصراف از ثبت‌نام با موفقیت انجام شد\\!*".to_string(),
                Err(err) => format!("❌ خطا: {}", gateway_error_text(&err)),
            };
            send_or_edit(bot, chat_id, edit, text).await?;
            send_main_menu(bot, chat_id).await
        }

        Effect::ShowProfile => {
            let registrations = gateway.user_registrations(user_id).await;
            if let Some(message_id) = edit {
                bot.edit_message_text(chat_id, message_id, profile_text(user, &registrations))
                    .parse_mode(ParseMode::MarkdownV2)
                    .await?;
                bot.send_message(chat_id, "به پروفایل بازگشتید:")
                    .reply_markup(profile_keyboard(!registrations.is_empty()))
                    .await?;
            } else {
                bot.send_message(chat_id, profile_text(user, &registrations))
                    .parse_mode(ParseMode::MarkdownV2)
                    .reply_markup(profile_keyboard(!registrations.is_empty()))
                    .await?;
            }
            Ok(())
        }

        Effect::CommitMessage(text) => {
            let display_name = user.full_name();
            let reply = match gateway.add_message(user_id, &display_name, &text).await {
                Ok(message_id) => format!(
                    "✅ *پیام شما با موفقیت ارسال شد\\!*\n\n\
                     📋 کد پیگیری: \\#{}\n\
                     📝 پیام شما: {}\n\n\
                     با تشکر از ارتباط شما 🙏",
                    message_id,
                    escape_markdown(&text),
                ),
                Err(err) => format!("❌ خطا: {}", gateway_error_text(&err)),
            };
            bot.send_message(chat_id, reply)
                .parse_mode(ParseMode::MarkdownV2)
                .reply_markup(main_keyboard())
                .await?;
            Ok(())
        }

        Effect::AbortToMenu => {
            send_or_edit(bot, chat_id, edit, "❌ عملیات لغو شد\\.".to_string()).await?;
            send_main_menu(bot, chat_id).await
        }
    }
}

async fn send_or_edit(bot: &Bot, chat_id: ChatId, edit: Option<MessageId>, text: String) -> Result<()> {
    match edit {
        Some(message_id) => {
            bot.edit_message_text(chat_id, message_id, text)
                .parse_mode(ParseMode::MarkdownV2)
                .await?;
        }
        None => {
            bot.send_message(chat_id, text)
                .parse_mode(ParseMode::MarkdownV2)
                .await?;
        }
    }
    Ok(())
}

// ---- render helpers ------------------------------------------------------

fn prompt_text(field: Field) -> &'static str {
    match field {
        Field::FullName => "لطفاً نام و نام خانوادگی خود را وارد کنید:",
        Field::StudentId => "لطفاً شماره دانشجویی خود را وارد کنید:",
        Field::NationalId => "لطفاً شماره ملی خود را وارد کنید:",
        Field::Phone => "لطفاً شماره تماس خود را وارد کنید:",
        Field::Message => "لطفاً پیام خود را وارد کنید:",
    }
}

fn reject_text(field: Field) -> &'static str {
    match field {
        Field::FullName => "⚠️ نام و نام خانوادگی باید فقط شامل حروف فارسی باشد.\nمثال: علی احمدی",
        Field::StudentId => "⚠️ شماره دانشجویی باید حداقل 8 رقم باشد. لطفاً دوباره وارد کنید:",
        Field::NationalId => "⚠️ شماره ملی معتبر نیست. لطفاً دوباره وارد کنید:",
        Field::Phone => "⚠️ شماره تماس معتبر نیست. لطفاً شماره را به فرمت 09123456789 وارد کنید:",
        Field::Message => "⚠️ پیام باید حداقل 5 حرف باشد. لطفاً پیام معتبرتری ارسال کنید:",
    }
}

/// User-facing Persian text for each gateway failure. Transient storage
/// failures never leak detail; users get the generic retry message.
pub fn gateway_error_text(err: &GatewayError) -> &'static str {
    match err {
        GatewayError::EventNotFound { .. } => "رویداد یافت نشد\\.",
        GatewayError::CapacityExceeded { .. } => "ظرفیت رویداد تکمیل است\\.",
        GatewayError::DuplicateRegistration { .. } => {
            "شما قبلاً در این رویداد ثبت‌نام کرده‌اید\\."
        }
        GatewayError::DailyQuotaExceeded { .. } => {
            "شما امروز پیام خود را ارسال کرده‌اید\\. لطفاً فردا مجدداً تلاش کنید\\."
        }
        GatewayError::DuplicateEvent { .. } => "رویداد با این نام قبلاً وجود دارد\\.",
        GatewayError::HasActiveRegistrations { .. } => {
            "امکان حذف رویداد با ثبت‌نام‌های فعال وجود ندارد\\."
        }
        GatewayError::CapacityBelowRegistered => {
            "ظرفیت جدید نمی‌تواند کمتر از تعداد ثبت‌نام‌ها باشد\\."
        }
        GatewayError::RegistrationNotFound { .. } => {
            "ثبت‌نام یافت نشد یا شما مجوز حذف آن را ندارید\\."
        }
        GatewayError::MessageNotFound { .. } => "پیام مورد نظر یافت نشد\\.",
        GatewayError::Storage(_) => "خطای سیستم\\. لطفاً بعداً تلاش کنید\\.",
    }
}

fn profile_text(user: &User, registrations: &[RegistrationDetails]) -> String {
    let username = user
        .username
        .as_ref()
        .map(|u| format!("@{}", escape_markdown(u)))
        .unwrap_or_else(|| "❌ تنظیم نشده".to_string());

    let mut text = format!(
        "👤 *پروفایل کاربر*\n\n\
         🆔 *شناسه یکتا:* `{}`\n\
         📛 *نام:* {}\n\
         🔖 *نام کاربری:* {}\n\
         📅 *تعداد رویدادهای ثبت‌نام شده:* {}\n\n",
        user.id.0,
        escape_markdown(&user.full_name()),
        username,
        registrations.len(),
    );

    if registrations.is_empty() {
        text.push_str("📝 *شما هنوز در هیچ رویدادی ثبت‌نام نکرده‌اید*\n");
    } else {
        text.push_str("🎯 *رویدادهای ثبت‌نام شده:*\n");
        for (i, reg) in registrations.iter().enumerate() {
            let date = if reg.event_date.is_empty() {
                "نامشخص"
            } else {
                reg.event_date.as_str()
            };
            text.push_str(&format!(
                "{}\\. {} \\(📅 {}\\)\n",
                i + 1,
                escape_markdown(&reg.event_name),
                escape_markdown(date),
            ));
        }
        text.push_str("\n⚠️ *توجه:* برای انصراف از ثبت‌نام، از دکمه زیر استفاده کنید\\.\n");
    }
    text
}

fn cancellation_list_text(registrations: &[RegistrationDetails]) -> String {
    let mut text = "📋 *لیست ثبت‌نام‌های فعال:*\n\n".to_string();
    for (i, reg) in registrations.iter().enumerate() {
        let date = if reg.event_date.is_empty() {
            "نامشخص"
        } else {
            reg.event_date.as_str()
        };
        text.push_str(&format!(
            "{}\\. *{}*\n   \
             📅 *تاریخ برگزاری:* {}\n   \
             📝 *توضیحات:* {}\n   \
             🗓 *تاریخ ثبت‌نام:* {}\n   \
             👤 *نام:* {}\n   \
             🎫 *شماره دانشجویی:* {}\n   \
             📞 *شماره تماس ثبت‌شده:* {}\n\n",
            i + 1,
            escape_markdown(&reg.event_name),
            escape_markdown(date),
            escape_markdown(&reg.event_description),
            escape_markdown(&reg.registered_at.format("%Y-%m-%d").to_string()),
            escape_markdown(&reg.full_name),
            escape_markdown(&reg.student_id),
            escape_markdown(&reg.phone_number),
        ));
    }
    text.push_str("❌ برای انصراف از هر رویداد، روی دکمه مربوطه کلیک کنید\\.");
    text
}

fn cancellation_confirm_text(details: &RegistrationDetails) -> String {
    let time = if details.event_time.is_empty() {
        "زمان نامشخص"
    } else {
        details.event_time.as_str()
    };
    let location = if details.event_location.is_empty() {
        "مکان نامشخص"
    } else {
        details.event_location.as_str()
    };
    format!(
        "⚠️ *آیا از انصراف از ثبت‌نام زیر مطمئن هستید؟*\n\n\
         🎯 *رویداد:* {}\n\
         📝 *توضیحات:* {}\n\
         ⏰ *زمان برگزاری:* {}\n\
         📍 *محل برگزاری:* {}\n\
         📅 *تاریخ ثبت‌نام:* {}\n\
         👤 *نام:* {}\n\
         🎫 *شماره دانشجویی:* {}\n\n\
         ❌ *این عمل قابل بازگشت نیست\\!*",
        escape_markdown(&details.event_name),
        escape_markdown(&details.event_description),
        escape_markdown(time),
        escape_markdown(location),
        escape_markdown(&details.registered_at.format("%Y-%m-%d").to_string()),
        escape_markdown(&details.full_name),
        escape_markdown(&details.student_id),
    )
}
