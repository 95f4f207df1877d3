use std::error::Error;
use std::sync::Arc;

use chrono::Utc;
use clap::{Parser, Subcommand};
use dotenvy::dotenv;

use ayi_market::chat::{ConversationStore, default_conversations};
use ayi_market::common::UserType;
use ayi_market::config::{self, AppConfig};
use ayi_market::format::{format_last_message_time, format_review_date};
use ayi_market::forms::{PhoneLoginForm, RegistrationForm};
use ayi_market::navigation::{NavigationGuard, Route, RouteGroup};
use ayi_market::reviews::{self, ReviewDraft};
use ayi_market::search::{self, Caregiver, CaregiverFilter};
use ayi_market::session::{MockCredentialService, SessionManager, SystemClock};
use ayi_market::storage::{ConversationDatabase, SqliteKeyValueStore};

type Manager = SessionManager<SqliteKeyValueStore, MockCredentialService>;

#[derive(Parser)]
#[command(
    name = "ayi_market",
    version,
    about = "Caregiver marketplace client: session and inbox"
)]
struct Cli {
    /// Path to JSON config file
    #[arg(long, default_value = config::DEFAULT_CONFIG_PATH, value_name = "FILE")]
    config: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Request an SMS verification code
    SendCode { phone: String },
    /// Log in with phone number and SMS code
    LoginCode { phone: String, code: String },
    /// Log in through WeChat
    LoginWechat,
    /// Log in with email and password
    LoginEmail { email: String, password: String },
    /// Create an account and log in
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm_password: String,
        #[arg(long, default_value = "employer")]
        user_type: UserType,
    },
    Logout,
    /// Show who is logged in
    Status,
    /// List conversations
    Conversations {
        #[arg(long)]
        unread: bool,
    },
    /// Show one conversation and mark it read
    History { id: String },
    /// Send a message to a conversation
    Send {
        id: String,
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Mark a conversation as read
    Read { id: String },
    /// Show one caregiver and their reviews
    Caregiver { id: String },
    /// Review a caregiver
    Review {
        caregiver_id: String,
        #[arg(long)]
        rating: Option<u8>,
        #[arg(long, default_value = "")]
        text: String,
    },
    /// Search the caregiver catalogue
    Caregivers {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        city: Option<String>,
        #[arg(long)]
        min_salary: Option<u32>,
        #[arg(long)]
        max_salary: Option<u32>,
        #[arg(long = "skill")]
        skills: Vec<String>,
        #[arg(long)]
        min_age: Option<u32>,
        #[arg(long)]
        max_age: Option<u32>,
    },
}

impl Command {
    fn group(&self) -> RouteGroup {
        match self {
            Self::SendCode { .. }
            | Self::LoginCode { .. }
            | Self::LoginWechat
            | Self::LoginEmail { .. }
            | Self::Register { .. } => RouteGroup::Auth,
            _ => RouteGroup::Protected,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();
    let app_config = config::load_config(&cli.config);

    let store = SqliteKeyValueStore::with_path(&app_config.database_path)?;
    let mut manager = SessionManager::new(store, MockCredentialService::new(), Arc::new(SystemClock))
        .with_session_duration(app_config.session_duration());
    manager.restore_session()?;

    let mut guard = NavigationGuard::new(manager.subscribe(), cli.command.group());
    if let Some(route) = guard.check() {
        match route {
            Route::Login => {
                println!("Not logged in. Use `login-code`, `login-email`, `login-wechat` or `register`.");
                return Ok(());
            }
            Route::Home => {
                let name = manager.current_user().map(|u| u.name.as_str()).unwrap_or_default();
                println!("Already logged in as {name}. Use `logout` first.");
                return Ok(());
            }
        }
    }

    let redirects = tokio::spawn(async move {
        while let Some(route) = guard.next_redirect().await {
            log::debug!("Navigation moved to {route}");
        }
    });

    let result = run(cli.command, &app_config, &mut manager);

    drop(manager);
    if let Err(err) = redirects.await {
        log::warn!("Navigation task ended abnormally: {err}");
    }
    result
}

fn run(command: Command, app_config: &AppConfig, manager: &mut Manager) -> Result<(), Box<dyn Error>> {
    match command {
        Command::SendCode { phone } => {
            manager.send_verification_code(&phone)?;
            println!("Verification code sent to {phone}");
        }
        Command::LoginCode { phone, code } => {
            let form = PhoneLoginForm {
                phone,
                code,
                code_sent: true,
            };
            manager.login_with_code(&form)?;
            print_welcome(manager);
        }
        Command::LoginWechat => {
            manager.login_with_wechat()?;
            print_welcome(manager);
        }
        Command::LoginEmail { email, password } => {
            manager.login_with_password(&email, &password)?;
            print_welcome(manager);
        }
        Command::Register {
            name,
            email,
            password,
            confirm_password,
            user_type,
        } => {
            let form = RegistrationForm {
                name,
                email,
                password,
                confirm_password,
                user_type,
            };
            manager.register(&form)?;
            print_welcome(manager);
        }
        Command::Logout => {
            manager.logout()?;
            println!("Logged out");
        }
        Command::Status => {
            if let Some(user) = manager.current_user() {
                println!("Logged in as {} ({})", user.name, user.id);
                if let Some(user_type) = user.user_type {
                    println!("Account type: {user_type:?}");
                }
                if let Some(stamped_at) = manager.session_timestamp() {
                    println!("Session refreshed at {stamped_at}");
                }
            }
        }
        Command::Conversations { unread } => {
            let store = open_conversations(app_config)?;
            let now = Utc::now();
            let listed = if unread {
                store.list_unread()
            } else {
                store.list_conversations()
            };
            for conversation in listed {
                println!(
                    "{} {:<2} {:<18} {:>9}  {}{}",
                    if conversation.is_read() { " " } else { "*" },
                    conversation.id(),
                    conversation.counterpart_name(),
                    format_last_message_time(conversation.last_message_timestamp(), now),
                    conversation.last_message_text(),
                    if conversation.is_online() { "  (online)" } else { "" }
                );
            }
            println!("{} unread", store.unread_count());
        }
        Command::History { id } => {
            let mut store = open_conversations(app_config)?;
            let Some(conversation) = store.get(&id) else {
                println!("No conversation {id}");
                return Ok(());
            };
            println!("Chat with {}", conversation.counterpart_name());
            for message in store.get_history(&id) {
                println!(
                    "[{}] {}: {}",
                    message.timestamp.format("%Y-%m-%d %H:%M"),
                    message.sender.as_str(),
                    message.text
                );
            }
            store.mark_read(&id, Utc::now())?;
        }
        Command::Send { id, text } => {
            let mut store = open_conversations(app_config)?;
            match store.compose(&id, &text.join(" "), Utc::now())? {
                Some(message) => println!("Sent {}", message.id),
                None => println!("Nothing sent"),
            }
            if !store.is_persistent() {
                log::info!("Conversation persistence is off; the message will not survive a restart");
            }
        }
        Command::Read { id } => {
            let mut store = open_conversations(app_config)?;
            store.mark_read(&id, Utc::now())?;
        }
        Command::Caregivers {
            search,
            category,
            city,
            min_salary,
            max_salary,
            skills,
            min_age,
            max_age,
        } => {
            let catalogue = load_catalogue(app_config)?;
            let age_range = match (min_age, max_age) {
                (None, None) => None,
                (low, high) => Some((
                    low.unwrap_or(search::AGE_LIMITS.0),
                    high.unwrap_or(search::AGE_LIMITS.1),
                )),
            };
            let filter = CaregiverFilter {
                search,
                category,
                min_salary,
                max_salary,
                skills,
                age_range,
                city,
            };
            for caregiver in filter.apply(&catalogue) {
                println!(
                    "{:<3} {} {}岁 {} {} ¥{}/月 ★{:.1}",
                    caregiver.id,
                    caregiver.name,
                    caregiver.age,
                    caregiver.city,
                    caregiver.specialty,
                    caregiver.monthly_salary,
                    caregiver.rating
                );
            }
        }
        Command::Caregiver { id } => {
            let catalogue = load_catalogue(app_config)?;
            let caregiver = search::find_caregiver(&catalogue, &id)?;
            println!(
                "{} ({}岁, {}) {} ¥{}/月",
                caregiver.name,
                caregiver.age,
                caregiver.hometown,
                caregiver.specialty,
                caregiver.monthly_salary
            );
            if !caregiver.short_bio.is_empty() {
                println!("{}", caregiver.short_bio);
            }
            if !caregiver.skills.is_empty() {
                println!("Skills: {}", caregiver.skills.join(", "));
            }

            let all_reviews = reviews::sample_reviews();
            let found = reviews::reviews_for(&all_reviews, &caregiver.id)?;
            match reviews::average_rating(&found) {
                Some(average) => println!("{} reviews, ★{average:.1}", found.len()),
                None => println!("No reviews yet"),
            }
            for review in found {
                println!(
                    "  ★{} {} on {}: {} ({} found this helpful)",
                    review.rating,
                    review.reviewer_name,
                    format_review_date(review.date),
                    review.text,
                    review.helpful_count
                );
            }
        }
        Command::Review {
            caregiver_id,
            rating,
            text,
        } => {
            let catalogue = load_catalogue(app_config)?;
            let caregiver = search::find_caregiver(&catalogue, &caregiver_id)?;
            let Some(reviewer) = manager.current_user() else {
                println!("Log in to leave a review");
                return Ok(());
            };
            let draft = ReviewDraft {
                caregiver_id: caregiver.id.clone(),
                rating,
                text,
            };
            let review = reviews::new_review(&draft, reviewer, Utc::now().date_naive())?;
            println!(
                "Reviewed {} ★{} on {}",
                caregiver.name,
                review.rating,
                format_review_date(review.date)
            );
        }
    }
    Ok(())
}

fn load_catalogue(app_config: &AppConfig) -> Result<Vec<Caregiver>, Box<dyn Error>> {
    Ok(match &app_config.caregivers_path {
        Some(path) => search::load_caregivers(path)?,
        None => search::sample_caregivers(),
    })
}

fn open_conversations(app_config: &AppConfig) -> Result<ConversationStore, Box<dyn Error>> {
    let seed = default_conversations(Utc::now());
    let store = if app_config.persist_conversations {
        let archive = ConversationDatabase::with_path(&app_config.database_path)?;
        ConversationStore::with_archive(seed, archive)?
    } else {
        ConversationStore::new(seed)
    };
    Ok(store.sort_by_recency(app_config.sort_conversations_by_recency))
}

fn print_welcome(manager: &Manager) {
    if let Some(user) = manager.current_user() {
        println!("Welcome, {}", user.name);
    }
}
