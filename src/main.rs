//! SocietyBot Telegram Bot
//!
//! Main application entry point

use std::sync::Arc;

use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use teloxide::types::{BotCommand, CallbackQuery, Update};
use teloxide::utils::command::BotCommands as TeloxideBotCommands;
use tracing::{error, info, warn};

use SocietyBot::{
    config::Settings,
    database::{self, Gateway},
    handlers::{callbacks, commands::admin, commands::start, messages},
    health,
    middleware::MembershipGate,
    state::StateStore,
    utils::logging,
};

type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::new()?;
    settings.validate()?;

    // Initialize logging
    logging::init_logging(&settings.logging)?;

    info!("Starting SocietyBot...");

    // Liveness endpoint runs on its own task, fully independent of the bot
    if settings.health.enabled {
        let port = settings.health.port;
        tokio::spawn(async move {
            if let Err(e) = health::serve(port).await {
                error!(error = %e, "Health check server stopped");
            }
        });
    }

    // Initialize database
    info!("Connecting to database...");
    let pool = database::connection::create_pool(&settings.database).await?;
    database::connection::run_migrations(&pool).await?;
    database::seed::seed_events(&pool).await?;

    // Initialize bot (through the proxy when one is configured)
    let bot = build_bot(&settings)?;

    let commands = vec![
        BotCommand::new("start", "شروع کار با ربات"),
        BotCommand::new("cancel", "لغو عملیات جاری"),
    ];
    if let Err(e) = bot.set_my_commands(commands).await {
        warn!(error = %e, "Failed to set bot command menu");
    }

    // Initialize services
    let gateway = Arc::new(Gateway::new(pool, settings.limits.max_messages_per_day));
    let store = Arc::new(StateStore::new());
    let gate = Arc::new(MembershipGate::new(bot.clone(), &settings));
    let settings = Arc::new(settings);

    info!("Setting up bot handlers...");
    let handler = create_handler();

    let mut dispatcher = Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![settings, gateway, store, gate])
        .default_handler(|upd| async move {
            warn!("Unhandled update: {:?}", upd);
        })
        .enable_ctrlc_handler()
        .build();

    info!("SocietyBot is ready, starting polling...");
    dispatcher.dispatch().await;

    info!("SocietyBot has been shut down.");
    Ok(())
}

/// Build the bot client; SOCKS5/HTTP proxies are supported through the
/// reqwest client.
fn build_bot(settings: &Settings) -> anyhow::Result<Bot> {
    match &settings.bot.proxy_url {
        Some(proxy_url) => {
            info!(proxy = %proxy_url, "Using outbound proxy");
            let client = reqwest::Client::builder()
                .proxy(reqwest::Proxy::all(proxy_url.as_str())?)
                .build()?;
            Ok(Bot::with_client(&settings.bot.token, client))
        }
        None => Ok(Bot::new(&settings.bot.token)),
    }
}

/// Create the main update handler
fn create_handler() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
    use teloxide::dispatching::UpdateFilterExt;

    dptree::entry()
        .branch(
            Update::filter_message()
                .branch(
                    dptree::entry()
                        .filter_command::<BotCommands>()
                        .endpoint(handle_commands),
                )
                .branch(dptree::endpoint(handle_messages)),
        )
        .branch(Update::filter_callback_query().endpoint(handle_callbacks))
}

#[derive(TeloxideBotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "SocietyBot Commands")]
enum BotCommands {
    #[command(description = "شروع کار با ربات")]
    Start,
    #[command(description = "لغو عملیات جاری")]
    Cancel,
    #[command(description = "آمار سیستم (admin only)")]
    Stats,
    #[command(description = "مرور پیام‌های کاربران (admin only)")]
    Messages,
    #[command(description = "پاسخ به پیام کاربر (admin only)")]
    Reply(String),
    #[command(description = "افزودن رویداد (admin only)")]
    AddEvent(String),
    #[command(description = "تغییر وضعیت رویداد (admin only)")]
    ToggleEvent(i64),
    #[command(description = "حذف رویداد (admin only)")]
    DelEvent(i64),
    #[command(description = "فهرست همه رویدادها (admin only)")]
    AllEvents,
    #[command(description = "آخرین ثبت‌نام‌ها (admin only)")]
    Registrations,
}

impl BotCommands {
    fn is_admin_only(&self) -> bool {
        !matches!(self, BotCommands::Start | BotCommands::Cancel)
    }
}

/// Handle bot commands
async fn handle_commands(
    bot: Bot,
    msg: Message,
    cmd: BotCommands,
    settings: Arc<Settings>,
    gateway: Arc<Gateway>,
    store: Arc<StateStore>,
    gate: Arc<MembershipGate>,
) -> HandlerResult {
    let Some(user) = msg.from.clone() else {
        return Ok(());
    };
    let user_id = user.id.0 as i64;
    let chat_id = msg.chat.id;

    if cmd.is_admin_only() && !admin::is_admin(&settings, user_id) {
        warn!(user_id, "Non-admin attempted an admin command");
        bot.send_message(chat_id, "⛔️ این دستور مخصوص مدیران است.").await?;
        return Ok(());
    }

    let result = match cmd {
        BotCommands::Start => start::handle_start(bot, msg, settings, gate).await,
        BotCommands::Cancel => start::handle_cancel(bot, msg, store).await,
        BotCommands::Stats => admin::handle_stats(bot, chat_id, &gateway, &store).await,
        BotCommands::Messages => admin::handle_messages(bot, chat_id, &gateway).await,
        BotCommands::Reply(args) => {
            admin::handle_reply(bot, chat_id, user_id, &args, &gateway).await
        }
        BotCommands::AddEvent(args) => admin::handle_add_event(bot, chat_id, &args, &gateway).await,
        BotCommands::ToggleEvent(id) => {
            admin::handle_toggle_event(bot, chat_id, id, &gateway).await
        }
        BotCommands::DelEvent(id) => admin::handle_delete_event(bot, chat_id, id, &gateway).await,
        BotCommands::AllEvents => admin::handle_all_events(bot, chat_id, &gateway).await,
        BotCommands::Registrations => {
            admin::handle_recent_registrations(bot, chat_id, &gateway).await
        }
    };

    if let Err(e) = result {
        error!(user_id, error = %e, "Error handling command");
        return Err(e.into());
    }

    Ok(())
}

/// Handle regular messages
async fn handle_messages(
    bot: Bot,
    msg: Message,
    settings: Arc<Settings>,
    gateway: Arc<Gateway>,
    store: Arc<StateStore>,
    gate: Arc<MembershipGate>,
) -> HandlerResult {
    if let Err(e) = messages::handle_message(bot, msg, settings, gateway, store, gate).await {
        error!(error = %e, "Error handling message");
        return Err(e.into());
    }
    Ok(())
}

/// Handle callback queries
async fn handle_callbacks(
    bot: Bot,
    query: CallbackQuery,
    settings: Arc<Settings>,
    gateway: Arc<Gateway>,
    store: Arc<StateStore>,
    gate: Arc<MembershipGate>,
) -> HandlerResult {
    let user_id = query.from.id.0 as i64;
    if let Err(e) =
        callbacks::handle_callback_query(bot, query, settings, gateway, store, gate).await
    {
        error!(user_id, error = %e, "Error handling callback query");
        return Err(e.into());
    }
    Ok(())
}
