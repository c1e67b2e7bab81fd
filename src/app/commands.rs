use crate::adapters::FilePreferenceStore;
use crate::api::BackendClient;
use crate::config::cli::{
    BookArgs, CliConfig, Command, ConnectArgs, LegalAction, NewsAction, ProfileAction,
    TelegramAction,
};
use crate::config::toml_config::{default_state_dir, ClientConfig, CONFIG_FILE};
use crate::core::navigation::{render_tab_bar, Route};
use crate::core::session::{Session, SessionOptions};
use crate::domain::ports::{BookingApi, PreferenceStore};
use crate::pages::{
    legal_banner, render_legal, BookingCreatePage, BookingTab, BookingsPage, CompanyPage,
    ConnectPage, LegalDoc, NewsPage, ProfilePage, ServiceDetailPage, ServicesPage,
};
use crate::state::Theme;
use crate::utils::error::{ClientError, Result};
use crate::utils::format::today;
use crate::utils::validation::Validate;
use chrono::{Local, NaiveDate};
use std::io::{BufRead, Write};
use std::sync::Arc;

pub const BOOKING_CREATED: &str = "Запись создана! Ожидайте подтверждения.";
pub const CANCEL_PROMPT: &str = "Отменить запись?";

fn load_config(cli: &CliConfig) -> Result<ClientConfig> {
    let config = match &cli.config {
        Some(path) => ClientConfig::from_file(path)?,
        None => ClientConfig::from_optional_file(CONFIG_FILE)?,
    };
    config.validate()?;
    Ok(config)
}

fn parse_date(value: Option<&str>) -> Result<NaiveDate> {
    match value {
        None => Ok(today()),
        Some(raw) => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
            ClientError::ValidationError {
                message: format!("Неверная дата '{}', ожидается ГГГГ-ММ-ДД", raw),
            }
        }),
    }
}

fn confirm(prompt: &str) -> Result<bool> {
    eprint!("{} [y/N] ", prompt);
    std::io::stderr().flush()?;
    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes" | "д" | "да"))
}

fn print_page(route: &Route, body: &str) {
    println!("{}", body);
    if let Some(bar) = render_tab_bar(&route.path()) {
        println!("\n{}", bar);
    }
}

/// 進入受保護的畫面並取得帶金鑰的客戶端
async fn open(session: &mut Session, route: Route) -> Result<(Route, BackendClient)> {
    let route = session.enter(route)?;
    let client = session.connect().await?;
    Ok((route, client))
}

/// 建立偏好儲存與啟動流程後執行子命令
pub async fn run(cli: CliConfig) -> Result<()> {
    let config = load_config(&cli)?;
    let state_dir = cli
        .state_dir
        .clone()
        .or_else(|| config.state_dir())
        .unwrap_or_else(default_state_dir);
    let store: Arc<dyn PreferenceStore> = Arc::new(FilePreferenceStore::open(&state_dir)?);
    tracing::debug!("Using state directory {}", state_dir.display());

    let mut options = SessionOptions::from_config(&config);
    options.api_base_url_override = cli.api_base_url.clone();
    if cli.runtime_config.is_some() {
        options.runtime_config = cli.runtime_config.clone();
    }

    let mut session = Session::bootstrap(store, options).await?;
    execute(&mut session, cli.command).await
}

pub async fn execute(session: &mut Session, command: Command) -> Result<()> {
    match command {
        Command::Connect(args) => connect(session, args),
        Command::Legal { action } => legal(session, action),
        Command::Theme { value } => {
            if let Some(value) = value {
                session.theme.set(value.parse::<Theme>()?)?;
            }
            println!("Тема: {}", session.theme.current());
            Ok(())
        }
        Command::Status => {
            status(session);
            Ok(())
        }
        Command::Services { search } => {
            let (route, client) = open(session, Route::Home).await?;
            let mut page = ServicesPage::new().with_search(search.as_deref().unwrap_or(""));
            page.load(&client).await;
            print_page(&route, &page.render());
            Ok(())
        }
        Command::Service { id } => {
            let (route, client) = open(session, Route::ServiceDetail(id.clone())).await?;
            let mut page = ServiceDetailPage::new(&id);
            page.load(&client).await;
            print_page(&route, &page.render());
            Ok(())
        }
        Command::Slots {
            service_id,
            date,
            post,
        } => {
            let args = BookArgs {
                service_id,
                date,
                post,
                time: None,
                notes: None,
            };
            book(session, args).await
        }
        Command::Book(args) => book(session, args).await,
        Command::Bookings { tab } => {
            let tab: BookingTab = tab.parse()?;
            let (route, client) = open(session, Route::Bookings).await?;
            let mut page = BookingsPage::new(tab);
            page.load(&client).await?;
            print_page(&route, &page.render(Local::now().naive_local()));
            Ok(())
        }
        Command::Cancel { id, yes } => {
            let (_, client) = open(session, Route::Bookings).await?;
            let mut page = BookingsPage::new(BookingTab::Upcoming);
            page.load(&client).await?;
            // 先確認記錄存在且可取消，再詢問
            page.check_cancellable(&id)?;
            if !yes && !confirm(CANCEL_PROMPT)? {
                println!("Отмена не выполнена");
                return Ok(());
            }
            page.cancel(&client, &id).await?;
            println!("Запись отменена");
            println!("{}", page.render(Local::now().naive_local()));
            Ok(())
        }
        Command::Act { id, output } => {
            let (_, client) = open(session, Route::Bookings).await?;
            let mut page = BookingsPage::new(BookingTab::Past);
            page.load(&client).await?;
            let path = page
                .download_act(&client, &id, &output)
                .await
                .map_err(|e| match e {
                    ClientError::ValidationError { .. }
                    | ClientError::NotFound { .. }
                    | ClientError::LoadFailed { .. } => e,
                    other => {
                        tracing::error!("Act download failed: {}", other);
                        ClientError::ValidationError {
                            message: "Ошибка загрузки акта".to_string(),
                        }
                    }
                })?;
            println!("Акт сохранён: {}", path.display());
            Ok(())
        }
        Command::Rate {
            id,
            rating,
            comment,
        } => {
            let (_, client) = open(session, Route::Bookings).await?;
            let mut page = BookingsPage::new(BookingTab::Past);
            page.load(&client).await?;
            page.rate(&client, &id, rating, comment.as_deref()).await?;
            println!("Спасибо за оценку!");
            Ok(())
        }
        Command::Profile { action } => profile(session, action.unwrap_or(ProfileAction::Show)).await,
        Command::News { action } => {
            let (route, client) = open(session, Route::News).await?;
            let mut page = NewsPage::new();
            page.load(&client).await;
            if let Some(NewsAction::Read { id }) = action {
                page.mark_read(&client, &id).await?;
            }
            print_page(&route, &page.render());
            Ok(())
        }
        Command::Company => {
            let (route, client) = open(session, Route::Company).await?;
            let mut page = CompanyPage::new();
            page.load(&client).await;
            print_page(&route, &page.render());
            Ok(())
        }
        Command::Telegram { action } => telegram(session, action).await,
    }
}

fn connect(session: &mut Session, args: ConnectArgs) -> Result<()> {
    let mut page = ConnectPage::new();
    if args.clear {
        session.backend.clear()?;
    } else if let Some(url) = args.url.as_deref() {
        page.submit_manual(&mut session.backend, url)?;
    } else if let Some(raw) = args.qr.as_deref() {
        page.submit_qr(&mut session.backend, raw)?;
    }
    println!("{}", page.render(&session.backend));
    if session.backend.is_connected() {
        if let Some(banner) = legal_banner(&session.legal) {
            eprintln!("{}", banner);
        }
    }
    Ok(())
}

fn legal(session: &mut Session, action: Option<LegalAction>) -> Result<()> {
    match action.unwrap_or(LegalAction::Show { doc: None }) {
        LegalAction::Show { doc } => {
            let doc = doc.as_deref().map(str::parse::<LegalDoc>).transpose()?;
            println!("{}", render_legal(&session.legal, doc));
        }
        LegalAction::Accept => {
            session.legal.accept()?;
            println!("{}", render_legal(&session.legal, None));
        }
        LegalAction::Revoke => {
            session.legal.revoke()?;
            println!("Согласие отозвано");
        }
    }
    Ok(())
}

fn status(session: &Session) {
    match session.backend.api_base_url() {
        Some(url) => println!("Сервер: {}", url),
        None => println!("Сервер: не подключено"),
    }
    println!(
        "Ключ доступа: {}",
        if session.auth.api_key().is_some() { "есть" } else { "нет" }
    );
    match session.legal.accepted_at() {
        Some(at) => println!("Документы приняты: {}", at),
        None => println!("Документы не приняты"),
    }
    println!("Тема: {}", session.theme.current());
}

async fn book(session: &mut Session, args: BookArgs) -> Result<()> {
    let date = parse_date(args.date.as_deref())?;
    let (route, client) = open(session, Route::BookingCreate(args.service_id.clone())).await?;
    let mut page = BookingCreatePage::new(&args.service_id, today());
    page.select_date(date)?;
    page.load(&client).await;
    if let Some(post) = args.post.as_deref() {
        page.select_post(post)?;
        page.load_slots(&client).await;
    }

    let Some(time) = args.time.as_deref() else {
        print_page(&route, &page.render());
        return Ok(());
    };
    page.select_time(time)?;
    page.notes = args.notes.unwrap_or_default();
    let booking = page.submit(&client).await?;
    println!("{}", BOOKING_CREATED);
    println!("[{}] {}", booking.id, booking.status.label());
    Ok(())
}

async fn profile(session: &mut Session, action: ProfileAction) -> Result<()> {
    if let ProfileAction::Logout = action {
        session.auth.logout()?;
        println!("Вы вышли из аккаунта");
        return Ok(());
    }

    let (route, client) = open(session, Route::Profile).await?;
    let mut page = ProfilePage::new();
    match action {
        ProfileAction::Show => {
            page.load(&client).await;
            page.load_notifications(&client).await;
            print_page(&route, &page.render());
        }
        ProfileAction::Edit {
            first_name,
            last_name,
            email,
            telegram,
            vk,
        } => {
            page.load(&client).await;
            let mut form = page.edit_form().ok_or_else(|| ClientError::NotFound {
                message: page.user.error().unwrap_or("Профиль не загружен").to_string(),
            })?;
            if let Some(v) = first_name {
                form.first_name = v;
            }
            if let Some(v) = last_name {
                form.last_name = v;
            }
            if let Some(v) = email {
                form.email = v;
            }
            if let Some(v) = telegram {
                form.telegram = v;
            }
            if let Some(v) = vk {
                form.vk = v;
            }
            page.save(&client, &form).await?;
            print_page(&route, &page.render());
        }
        ProfileAction::Cars => {
            page.load_cars(&client).await;
            println!("{}", page.render_cars());
        }
        ProfileAction::SelectCar { id } => {
            page.load_cars(&client).await;
            page.select_car(&client, &id).await?;
            print_page(&route, &page.render());
        }
        ProfileAction::Notifications => {
            page.load_notifications(&client).await;
            println!("{}", page.render_notifications());
        }
        ProfileAction::Read { id } => {
            page.mark_read(&client, &id).await?;
            println!("{}", page.render_notifications());
        }
        ProfileAction::Logout => {}
    }
    Ok(())
}

async fn telegram(session: &mut Session, action: TelegramAction) -> Result<()> {
    let (_, client) = open(session, Route::Profile).await?;
    match action {
        TelegramAction::Config => {
            let config = client.fetch_telegram_config().await?;
            println!("Telegram бот: @{}", config.bot_username);
        }
        TelegramAction::Login { payload } => {
            let auth_data: serde_json::Value = serde_json::from_str(&payload)?;
            let response = session.auth.login_with_telegram(&client, &auth_data).await?;
            println!("Вход выполнен: {} <{}>", response.name, response.email);
            if response.requires_verification {
                println!("Требуется подтверждение email");
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date(Some("2026-02-16")).unwrap(),
            NaiveDate::from_ymd_opt(2026, 2, 16).unwrap()
        );
        assert_eq!(parse_date(None).unwrap(), today());
        assert!(matches!(
            parse_date(Some("16.02.2026")),
            Err(ClientError::ValidationError { .. })
        ));
    }
}
