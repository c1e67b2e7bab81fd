use crate::core::loadable::{FetchGuard, Loadable};
use crate::domain::model::{CarFolder, Notification, Patch, SocialLinks, UpdateProfileRequest, User};
use crate::domain::ports::BookingApi;
use crate::utils::error::{ClientError, Result};
use crate::utils::format::{format_date, format_time};
use std::fmt::Write;

pub const DEFAULT_DISPLAY_NAME: &str = "Клиент";

pub fn display_name(user: &User) -> String {
    let joined = [user.first_name.trim(), user.last_name.trim()]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ");
    if joined.is_empty() {
        DEFAULT_DISPLAY_NAME.to_string()
    } else {
        joined
    }
}

/// 名稱首兩字大寫，作為無頭像時的縮寫
pub fn initials(name: &str) -> String {
    name.chars().take(2).collect::<String>().to_uppercase()
}

pub fn tier_label(tier: &str) -> &str {
    match tier {
        "client" => "Клиент",
        "regular" => "Постоянный клиент",
        "pride" => "Прайд",
        other => other,
    }
}

/// 裝置註冊產生的佔位電話不顯示
pub fn visible_phone(user: &User) -> Option<&str> {
    let phone = user.phone.trim();
    (!phone.is_empty() && !phone.starts_with("device:")).then_some(phone)
}

pub fn avatar_url(user: &User) -> Option<&str> {
    user.avatar_url
        .as_deref()
        .filter(|u| !u.is_empty())
        .or_else(|| user.profile_photo_url.as_deref().filter(|u| !u.is_empty()))
}

pub fn unread_count(notifications: &[Notification]) -> usize {
    notifications.iter().filter(|n| !n.read).count()
}

/// 編輯表單，初始值取自目前資料
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileEdit {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub telegram: String,
    pub vk: String,
}

impl ProfileEdit {
    pub fn from_user(user: &User) -> Self {
        let links = user.social_links.clone().unwrap_or_default();
        Self {
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone().unwrap_or_default(),
            telegram: links.telegram.unwrap_or_default(),
            vk: links.vk.unwrap_or_default(),
        }
    }

    /// 名字留空則不送出；email 與社群連結留空則清除
    pub fn to_request(&self) -> UpdateProfileRequest {
        let non_empty = |v: &str| {
            let v = v.trim();
            (!v.is_empty()).then(|| v.to_string())
        };
        UpdateProfileRequest {
            first_name: non_empty(&self.first_name),
            last_name: non_empty(&self.last_name),
            email: Patch::from_input(Some(self.email.as_str())),
            social_links: Some(SocialLinks {
                telegram: non_empty(&self.telegram),
                vk: non_empty(&self.vk),
                ..SocialLinks::default()
            }),
            ..UpdateProfileRequest::default()
        }
    }
}

#[derive(Debug, Default)]
pub struct ProfilePage {
    pub user: Loadable<User>,
    pub cars: Vec<CarFolder>,
    pub notifications: Vec<Notification>,
    guard: FetchGuard,
}

impl ProfilePage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn load(&mut self, api: &dyn BookingApi) {
        let ticket = self.guard.begin();
        self.user = Loadable::Loading;
        let result = api.fetch_profile().await;
        ticket.apply(&mut self.user, result);
    }

    pub fn edit_form(&self) -> Option<ProfileEdit> {
        self.user.value().map(ProfileEdit::from_user)
    }

    pub async fn save(&mut self, api: &dyn BookingApi, edit: &ProfileEdit) -> Result<()> {
        if self.user.value().is_none() {
            return Err(ClientError::NotFound {
                message: "Профиль не загружен".to_string(),
            });
        }
        let updated = api.update_profile(&edit.to_request()).await?;
        tracing::info!("Profile {} updated", updated.id);
        self.user = Loadable::Loaded(updated);
        Ok(())
    }

    /// 讀取失敗時視為空清單
    pub async fn load_cars(&mut self, api: &dyn BookingApi) {
        self.cars = api.fetch_cars().await.unwrap_or_else(|e| {
            tracing::warn!("Failed to load cars: {}", e);
            Vec::new()
        });
    }

    /// 以車款預覽圖作為頭像；沒有圖片時清除頭像
    pub async fn select_car(&mut self, api: &dyn BookingApi, car_id: &str) -> Result<()> {
        let car = self
            .cars
            .iter()
            .find(|c| c.id == car_id)
            .ok_or_else(|| ClientError::NotFound {
                message: format!("Автомобиль {} не найден", car_id),
            })?;
        let request = UpdateProfileRequest {
            profile_photo_url: match car.preview_url() {
                Some(url) => Patch::Set(url.to_string()),
                None => Patch::Clear,
            },
            ..UpdateProfileRequest::default()
        };
        let updated = api.update_profile(&request).await?;
        tracing::info!("Selected car {} as profile photo", car_id);
        self.user = Loadable::Loaded(updated);
        Ok(())
    }

    pub async fn load_notifications(&mut self, api: &dyn BookingApi) {
        self.notifications = api.fetch_notifications().await.unwrap_or_else(|e| {
            tracing::warn!("Failed to load notifications: {}", e);
            Vec::new()
        });
    }

    pub async fn mark_read(&mut self, api: &dyn BookingApi, id: &str) -> Result<()> {
        api.mark_notification_read(id).await?;
        self.load_notifications(api).await;
        Ok(())
    }

    pub fn unread_count(&self) -> usize {
        unread_count(&self.notifications)
    }

    pub fn render(&self) -> String {
        let user = match &self.user {
            Loadable::Idle | Loadable::Loading => return "Загрузка...".to_string(),
            Loadable::Failed(e) => return e.clone(),
            Loadable::Loaded(user) => user,
        };
        let name = display_name(user);
        let mut lines = Vec::new();
        match avatar_url(user) {
            Some(url) => lines.push(format!("{}  ({})", name, url)),
            None => lines.push(format!("[{}] {}", initials(&name), name)),
        }
        if let Some(phone) = visible_phone(user) {
            lines.push(phone.to_string());
        }
        if let Some(email) = user.email.as_deref().filter(|e| !e.is_empty()) {
            lines.push(email.to_string());
        }
        if let Some(tier) = user.client_tier.as_deref() {
            lines.push(tier_label(tier).to_string());
        }
        if let Some(points) = user.loyalty_points {
            lines.push(format!("Баллы: {}", points));
        }
        let unread = self.unread_count();
        if unread > 0 {
            lines.push(format!("Уведомления: {} непрочитанных", unread));
        }
        lines.join("\n")
    }

    pub fn render_notifications(&self) -> String {
        if self.notifications.is_empty() {
            return "Нет уведомлений".to_string();
        }
        let mut out = String::new();
        for n in &self.notifications {
            let marker = if n.read { " " } else { "•" };
            let _ = write!(
                out,
                "{} {} {}  [{}]\n  ",
                marker,
                format_date(&n.created_at),
                format_time(&n.created_at),
                n.id
            );
            if let Some(title) = n.title.as_deref().filter(|t| !t.is_empty()) {
                let _ = write!(out, "{}: ", title);
            }
            let _ = writeln!(out, "{}", n.body);
        }
        out.trim_end().to_string()
    }

    pub fn render_cars(&self) -> String {
        if self.cars.is_empty() {
            return "Нет доступных автомобилей".to_string();
        }
        self.cars
            .iter()
            .map(|c| match c.preview_url() {
                Some(url) => format!("{}  {}  [{}]", c.name, url, c.id),
                None => format!("{}  [{}]", c.name, c.id),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
