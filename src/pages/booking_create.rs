use crate::core::loadable::{FetchGuard, Loadable};
use crate::domain::model::{Booking, CreateBookingRequest, Post, Service, TimeSlot};
use crate::domain::ports::BookingApi;
use crate::utils::error::{ClientError, Result};
use crate::utils::format::{format_duration, format_price, to_date_string, to_iso_date_time};
use chrono::{Days, NaiveDate};

/// 可預約的天數（含今天往後）
pub const BOOKING_WINDOW_DAYS: u64 = 14;

pub struct BookingCreatePage {
    pub service_id: String,
    pub service: Loadable<Service>,
    pub posts: Vec<Post>,
    pub slots: Vec<TimeSlot>,
    pub selected_date: NaiveDate,
    pub selected_post_id: Option<String>,
    pub selected_slot: Option<TimeSlot>,
    pub notes: String,
    today: NaiveDate,
    guard: FetchGuard,
    slots_guard: FetchGuard,
}

impl BookingCreatePage {
    pub fn new(service_id: &str, today: NaiveDate) -> Self {
        Self {
            service_id: service_id.to_string(),
            service: Loadable::Idle,
            posts: Vec::new(),
            slots: Vec::new(),
            selected_date: today,
            selected_post_id: None,
            selected_slot: None,
            notes: String::new(),
            today,
            guard: FetchGuard::new(),
            slots_guard: FetchGuard::new(),
        }
    }

    pub fn min_date(&self) -> NaiveDate {
        self.today
    }

    pub fn max_date(&self) -> NaiveDate {
        self.today
            .checked_add_days(Days::new(BOOKING_WINDOW_DAYS))
            .unwrap_or(self.today)
    }

    /// 載入服務與啟用中的工位，預設選第一個工位，接著載入時段
    pub async fn load(&mut self, api: &dyn BookingApi) {
        let ticket = self.guard.begin();
        self.service = Loadable::Loading;
        let result = api.fetch_service(&self.service_id).await;
        if !ticket.is_current() {
            return;
        }
        self.service = match result {
            Ok(service) => Loadable::Loaded(service),
            Err(e) => {
                tracing::warn!("Failed to load service {}: {}", self.service_id, e);
                Loadable::Failed("Не удалось загрузить услугу".to_string())
            }
        };

        match api.fetch_posts().await {
            Ok(posts) => {
                self.posts = posts.into_iter().filter(|p| p.is_enabled).collect();
                if self.selected_post_id.is_none() {
                    self.selected_post_id = self.posts.first().map(|p| p.id.clone());
                }
            }
            Err(e) => tracing::warn!("Failed to load posts: {}", e),
        }

        self.load_slots(api).await;
    }

    pub async fn load_slots(&mut self, api: &dyn BookingApi) {
        let Some(post_id) = self.selected_post_id.clone() else {
            self.slots.clear();
            return;
        };
        let ticket = self.slots_guard.begin();
        let date = to_date_string(self.selected_date);
        let result = api.fetch_slots(&self.service_id, &date, &post_id).await;
        if !ticket.is_current() {
            return;
        }
        self.slots = result.unwrap_or_else(|e| {
            tracing::warn!("Failed to load slots for {}: {}", date, e);
            Vec::new()
        });
        // 原先選的時段若已不可用則取消選擇
        if let Some(selected) = &self.selected_slot {
            if !self.available_slots().iter().any(|s| s.time == selected.time) {
                self.selected_slot = None;
            }
        }
    }

    pub fn select_date(&mut self, date: NaiveDate) -> Result<()> {
        if date < self.min_date() || date > self.max_date() {
            return Err(ClientError::ValidationError {
                message: format!(
                    "Дата должна быть с {} по {}",
                    to_date_string(self.min_date()),
                    to_date_string(self.max_date())
                ),
            });
        }
        if date != self.selected_date {
            self.selected_slot = None;
        }
        self.selected_date = date;
        Ok(())
    }

    pub fn select_post(&mut self, post_id: &str) -> Result<()> {
        if !self.posts.iter().any(|p| p.id == post_id) {
            return Err(ClientError::ValidationError {
                message: format!("Пост {} недоступен", post_id),
            });
        }
        if self.selected_post_id.as_deref() != Some(post_id) {
            self.selected_slot = None;
        }
        self.selected_post_id = Some(post_id.to_string());
        Ok(())
    }

    pub fn available_slots(&self) -> Vec<&TimeSlot> {
        self.slots.iter().filter(|s| s.is_available).collect()
    }

    /// 依 "HH:MM"（或 "H:MM"）選擇可用時段
    pub fn select_time(&mut self, time: &str) -> Result<()> {
        let wanted = format!("{:0>5}", time.trim());
        let slot = self
            .available_slots()
            .into_iter()
            .find(|s| s.hhmm() == wanted)
            .cloned()
            .ok_or_else(|| ClientError::ValidationError {
                message: format!("Время {} недоступно", time.trim()),
            })?;
        self.selected_slot = Some(slot);
        Ok(())
    }

    pub fn build_request(&self) -> Result<CreateBookingRequest> {
        let service = self.service.value().ok_or_else(|| ClientError::NotFound {
            message: "Услуга не найдена".to_string(),
        })?;
        let slot = self
            .selected_slot
            .as_ref()
            .ok_or_else(|| ClientError::ValidationError {
                message: "Выберите время".to_string(),
            })?;
        let notes = self.notes.trim();

        Ok(CreateBookingRequest {
            service_id: service.id.clone(),
            date_time: to_iso_date_time(&to_date_string(self.selected_date), slot.hhmm()),
            post_id: self.selected_post_id.clone().filter(|id| !id.is_empty()),
            notes: (!notes.is_empty()).then(|| notes.to_string()),
        })
    }

    pub async fn submit(&self, api: &dyn BookingApi) -> Result<Booking> {
        let request = self.build_request()?;
        tracing::debug!("Creating booking at {}", request.date_time);
        let booking = api.create_booking(&request).await?;
        tracing::info!("Booking {} created", booking.id);
        Ok(booking)
    }

    pub fn render(&self) -> String {
        let service = match &self.service {
            Loadable::Idle | Loadable::Loading => return "Загрузка...".to_string(),
            Loadable::Failed(e) => return e.clone(),
            Loadable::Loaded(s) => s,
        };
        let mut lines = vec![
            service.name.clone(),
            format!(
                "{} · {}",
                format_price(service.price),
                format_duration(service.duration)
            ),
            format!(
                "Дата: {} (доступно {} — {})",
                to_date_string(self.selected_date),
                to_date_string(self.min_date()),
                to_date_string(self.max_date())
            ),
        ];
        if self.posts.len() > 1 {
            let names: Vec<String> = self
                .posts
                .iter()
                .map(|p| {
                    if self.selected_post_id.as_deref() == Some(p.id.as_str()) {
                        format!("[{}] ({})", p.name, p.id)
                    } else {
                        format!("{} ({})", p.name, p.id)
                    }
                })
                .collect();
            lines.push(format!("Пост: {}", names.join(", ")));
        }
        let available = self.available_slots();
        if available.is_empty() {
            lines.push("Нет свободных слотов".to_string());
        } else {
            let times: Vec<&str> = available.iter().map(|s| s.hhmm()).collect();
            lines.push(format!("Время: {}", times.join(" ")));
        }
        lines.join("\n")
    }
}
