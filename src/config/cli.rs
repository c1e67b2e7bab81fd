use crate::utils::error::Result;
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_range, validate_url, Validate,
};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "sb-client")]
#[command(about = "Service booking client: services, slots, bookings and profile")]
#[command(version)]
pub struct CliConfig {
    /// 偏好儲存目錄（預設依平台決定）
    #[arg(long, global = true)]
    pub state_dir: Option<PathBuf>,

    /// TOML 設定檔路徑
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// 執行期設定（config.json 的檔案路徑或 URL）
    #[arg(long, global = true)]
    pub runtime_config: Option<String>,

    /// 本次執行使用的後端位址，不會保存
    #[arg(long, global = true)]
    pub api_base_url: Option<String>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON")]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Set, show or clear the backend URL
    Connect(ConnectArgs),
    /// Show or accept the legal documents
    Legal {
        #[command(subcommand)]
        action: Option<LegalAction>,
    },
    /// Show or change the color theme
    Theme { value: Option<String> },
    /// List active services
    Services {
        #[arg(long)]
        search: Option<String>,
    },
    /// Show one service
    Service { id: String },
    /// List time slots for a service
    Slots {
        service_id: String,
        /// YYYY-MM-DD, defaults to today
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        post: Option<String>,
    },
    /// Create a booking
    Book(BookArgs),
    /// List bookings
    Bookings {
        #[arg(long, default_value = "upcoming")]
        tab: String,
    },
    /// Cancel a pending or confirmed booking
    Cancel {
        id: String,
        #[arg(long, help = "Skip the confirmation prompt")]
        yes: bool,
    },
    /// Download the PDF act of a completed booking
    Act {
        id: String,
        #[arg(long, default_value = ".")]
        output: PathBuf,
    },
    /// Rate a completed booking
    Rate {
        id: String,
        #[arg(long)]
        rating: u8,
        #[arg(long)]
        comment: Option<String>,
    },
    /// Profile, cars and notifications
    Profile {
        #[command(subcommand)]
        action: Option<ProfileAction>,
    },
    /// Company news
    News {
        #[command(subcommand)]
        action: Option<NewsAction>,
    },
    /// Company details
    Company,
    /// Telegram login
    Telegram {
        #[command(subcommand)]
        action: TelegramAction,
    },
    /// Show connection, registration and consent status
    Status,
}

#[derive(Debug, Clone, Args)]
pub struct ConnectArgs {
    /// Backend URL entered manually
    #[arg(long, conflicts_with_all = ["qr", "clear"])]
    pub url: Option<String>,
    /// Text payload decoded from a QR code
    #[arg(long, conflicts_with = "clear")]
    pub qr: Option<String>,
    #[arg(long)]
    pub clear: bool,
}

#[derive(Debug, Clone, Args)]
pub struct BookArgs {
    pub service_id: String,
    /// YYYY-MM-DD, defaults to today
    #[arg(long)]
    pub date: Option<String>,
    #[arg(long)]
    pub post: Option<String>,
    /// HH:MM; without it the available slots are listed
    #[arg(long)]
    pub time: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum LegalAction {
    Show {
        /// privacy, consent, cookies or agreement
        doc: Option<String>,
    },
    Accept,
    Revoke,
}

#[derive(Debug, Clone, Subcommand)]
pub enum ProfileAction {
    Show,
    Edit {
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        telegram: Option<String>,
        #[arg(long)]
        vk: Option<String>,
    },
    Cars,
    SelectCar { id: String },
    Notifications,
    Read { id: String },
    Logout,
}

#[derive(Debug, Clone, Subcommand)]
pub enum NewsAction {
    List,
    Read { id: String },
}

#[derive(Debug, Clone, Subcommand)]
pub enum TelegramAction {
    Config,
    Login {
        /// JSON payload returned by the Telegram login widget
        #[arg(long)]
        payload: String,
    },
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        if let Some(url) = &self.api_base_url {
            validate_url("api_base_url", url)?;
        }
        if let Some(source) = &self.runtime_config {
            validate_non_empty_string("runtime_config", source)?;
        }
        if let Some(dir) = &self.state_dir {
            validate_path("state_dir", &dir.to_string_lossy())?;
        }
        if let Command::Rate { rating, .. } = &self.command {
            validate_range("rating", *rating, 1, 5)?;
        }
        Ok(())
    }
}
