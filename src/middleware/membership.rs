//! Channel-membership gate
//!
//! Every gated feature goes through [`MembershipGate::guard`]: a
//! sliding-window rate limit on the membership lookup, then the channel
//! membership check itself. Users who are not members get the join
//! prompt and the wrapped handler never runs. Lookup failures count as
//! not-a-member (fail closed).

use std::future::Future;
use std::time::Duration;

use teloxide::prelude::*;
use teloxide::types::{ChatId, ChatMemberStatus, ParseMode, UserId};
use tracing::{error, warn};

use crate::config::{ChannelConfig, Settings};
use crate::middleware::rate_limit::SlidingWindowLimiter;
use crate::utils::errors::Result;
use crate::utils::keyboards::membership_keyboard;
use crate::utils::markdown::escape_markdown;

#[derive(Debug, Clone)]
pub struct MembershipGate {
    bot: Bot,
    channel: ChannelConfig,
    limiter: SlidingWindowLimiter,
}

impl MembershipGate {
    pub fn new(bot: Bot, settings: &Settings) -> Self {
        Self {
            bot,
            channel: settings.channel.clone(),
            limiter: SlidingWindowLimiter::new(
                settings.limits.membership_checks,
                Duration::from_secs(settings.limits.membership_window_secs),
            ),
        }
    }

    /// Run `handler` only when the user passes the rate limit and is a
    /// member of the channel; otherwise answer with the appropriate
    /// prompt and return without invoking it.
    pub async fn guard<F, Fut>(
        &self,
        user_id: i64,
        chat_id: ChatId,
        feature_name: &str,
        handler: F,
    ) -> Result<()>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        if self.limiter.is_limited(user_id) {
            warn!(user_id, feature = feature_name, "Membership check rate-limited");
            self.bot
                .send_message(
                    chat_id,
                    "⏳ لطفاً بعداً تلاش کنید. محدودیت بررسی عضویت فعال شده است.",
                )
                .await?;
            return Ok(());
        }

        if !self.is_member(user_id).await {
            self.send_join_prompt(chat_id, feature_name).await?;
            return Ok(());
        }

        handler().await
    }

    /// Whether the user currently belongs to the configured channel.
    /// API failures are logged and treated as "not a member".
    pub async fn is_member(&self, user_id: i64) -> bool {
        let member = self
            .bot
            .get_chat_member(ChatId(self.channel.id), UserId(user_id as u64))
            .await;
        match member {
            Ok(member) => matches!(
                member.status(),
                ChatMemberStatus::Owner
                    | ChatMemberStatus::Administrator
                    | ChatMemberStatus::Member
            ),
            Err(e) => {
                error!(user_id, error = %e, "Channel membership lookup failed");
                false
            }
        }
    }

    /// The join-required prompt with the channel link and a verification
    /// button.
    pub async fn send_join_prompt(&self, chat_id: ChatId, feature_name: &str) -> Result<()> {
        let feature = escape_markdown(feature_name);
        let text = format!(
            "🌟 *دسترسی ویژه* 🌟\n\n\
             برای استفاده از {feature}، لطفاً در کانال انجمن عضو شوید\\.\n\n\
             📢 *مزایای عضویت:*\n\
             • 🔥 دسترسی به آخرین رویدادها\n\
             • 💫 امکان ثبت‌نام در کارگاه‌ها\n\
             • ✨ ارتباط مستقیم با مدیران\n\
             • 🎯 اطلاع‌رسانی فوری\n\n\
             پس از عضویت، روی *✅ تایید عضویت* کلیک کنید\\."
        );

        self.bot
            .send_message(chat_id, text)
            .parse_mode(ParseMode::MarkdownV2)
            .reply_markup(membership_keyboard(&self.channel.url))
            .await?;
        Ok(())
    }

    pub fn channel_url(&self) -> &str {
        &self.channel.url
    }
}
