//! Keyboard builders and menu labels
//!
//! The reply-keyboard labels double as the routing table for plain text
//! messages, so they live here as constants next to the keyboards that
//! show them.

use teloxide::types::{
    InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup,
};

use crate::models::{Event, RegistrationDetails};

// Main menu labels
pub const LABEL_ABOUT: &str = "📖 درباره انجمن";
pub const LABEL_EVENTS: &str = "📅 رویدادها";
pub const LABEL_WORKSHOPS: &str = "🎓 کارگاه‌ها";
pub const LABEL_CONTACT_INFO: &str = "📞 تماس با ما";
pub const LABEL_PROFILE: &str = "👤 مشاهده پروفایل";
pub const LABEL_CONTACT_ADMIN: &str = "💬 تماس با مدیر";
pub const LABEL_REGISTER: &str = "📝 ثبت‌نام در کارگاه‌ها و رویدادها";

// Flow labels
pub const LABEL_CANCEL_FLOW: &str = "❌ لغو ثبت‌نام";
pub const LABEL_BACK_TO_MENU: &str = "🔙 بازگشت به منو";
pub const LABEL_CANCEL_REGISTRATION: &str = "❌ انصراف از ثبت‌نام";

/// The persistent main menu.
pub fn main_keyboard() -> KeyboardMarkup {
    let mut markup = KeyboardMarkup::new(vec![
        vec![
            KeyboardButton::new(LABEL_ABOUT),
            KeyboardButton::new(LABEL_EVENTS),
        ],
        vec![
            KeyboardButton::new(LABEL_WORKSHOPS),
            KeyboardButton::new(LABEL_CONTACT_INFO),
        ],
        vec![
            KeyboardButton::new(LABEL_PROFILE),
            KeyboardButton::new(LABEL_CONTACT_ADMIN),
        ],
        vec![KeyboardButton::new(LABEL_REGISTER)],
    ]);
    markup.resize_keyboard = true;
    markup.is_persistent = true;
    markup
}

/// Cancel-only keyboard shown during the registration field steps.
pub fn cancel_keyboard() -> KeyboardMarkup {
    let mut markup = KeyboardMarkup::new(vec![vec![KeyboardButton::new(LABEL_CANCEL_FLOW)]]);
    markup.resize_keyboard = true;
    markup.one_time_keyboard = true;
    markup
}

/// Inline keyboard listing selectable events for registration.
pub fn event_selection_keyboard(events: &[Event]) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = events
        .iter()
        .map(|event| {
            vec![InlineKeyboardButton::callback(
                event.name.clone(),
                format!("event_{}", event.name),
            )]
        })
        .collect();
    rows.push(vec![InlineKeyboardButton::callback(
        LABEL_CANCEL_FLOW,
        "cancel_registration",
    )]);
    InlineKeyboardMarkup::new(rows)
}

/// Confirm / edit / cancel keyboard for the registration summary.
pub fn registration_confirm_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback(
            "✅ تأیید و ثبت نهایی",
            "confirm_registration",
        )],
        vec![InlineKeyboardButton::callback(
            "✏️ ویرایش اطلاعات",
            "edit_registration",
        )],
        vec![InlineKeyboardButton::callback(
            LABEL_CANCEL_FLOW,
            "cancel_registration",
        )],
    ])
}

/// Profile view keyboard; the cancellation entry only appears when the
/// user holds at least one registration.
pub fn profile_keyboard(has_registrations: bool) -> KeyboardMarkup {
    let rows = if has_registrations {
        vec![
            vec![KeyboardButton::new(LABEL_CANCEL_REGISTRATION)],
            vec![KeyboardButton::new(LABEL_BACK_TO_MENU)],
        ]
    } else {
        vec![vec![KeyboardButton::new(LABEL_BACK_TO_MENU)]]
    };
    let mut markup = KeyboardMarkup::new(rows);
    markup.resize_keyboard = true;
    markup.one_time_keyboard = true;
    markup
}

/// Inline keyboard listing the user's registrations for cancellation.
pub fn cancellation_keyboard(registrations: &[RegistrationDetails]) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = registrations
        .iter()
        .map(|reg| {
            let date = if reg.event_date.is_empty() {
                "نامشخص"
            } else {
                reg.event_date.as_str()
            };
            vec![InlineKeyboardButton::callback(
                format!("❌ انصراف از {} ({})", reg.event_name, date),
                format!("cancel_reg_{}", reg.id),
            )]
        })
        .collect();
    rows.push(vec![InlineKeyboardButton::callback(
        "🔙 بازگشت به پروفایل",
        "back_to_profile",
    )]);
    InlineKeyboardMarkup::new(rows)
}

/// Final yes/no keyboard for a cancellation.
pub fn cancellation_confirm_keyboard(registration_id: i64) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback(
            "✅ تایید انصراف",
            format!("confirm_cancel_{registration_id}"),
        )],
        vec![InlineKeyboardButton::callback(
            "❌ انصراف از انصراف",
            "cancel_cancellation",
        )],
    ])
}

/// Join-channel prompt with a verification callback.
pub fn membership_keyboard(channel_url: &str) -> InlineKeyboardMarkup {
    let join = match reqwest::Url::parse(channel_url) {
        Ok(url) => InlineKeyboardButton::url("✨ عضویت در کانال", url),
        // Unparseable URL in config; fall back to a callback-only prompt.
        Err(_) => InlineKeyboardButton::callback("✨ عضویت در کانال", "check_membership"),
    };
    InlineKeyboardMarkup::new(vec![
        vec![join],
        vec![InlineKeyboardButton::callback(
            "✅ تایید عضویت",
            "check_membership",
        )],
    ])
}
