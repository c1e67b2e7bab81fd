pub mod client;

pub use client::ApiClient;

use crate::domain::model::{
    Booking, CarFolder, ClientNewsItem, CompanyInfo, CreateBookingRequest, Notification, Post,
    RateBookingRequest, RegisterClientRequest, RegisterClientResponse, Service,
    TelegramLoginResponse, TelegramWidgetConfigResponse, TimeSlot, UpdateProfileRequest, User,
};
use crate::domain::ports::BookingApi;
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::de::IgnoredAny;

pub const DEFAULT_PLATFORM: &str = "web";
pub const DEFAULT_APP_VERSION: &str = "1.0";

/// 具體端點呼叫；`ApiClient` 加上註冊時要送出的平台資訊
pub struct BackendClient {
    http: ApiClient,
    platform: String,
    app_version: String,
}

impl BackendClient {
    pub fn new(http: ApiClient) -> Self {
        Self {
            http,
            platform: DEFAULT_PLATFORM.to_string(),
            app_version: DEFAULT_APP_VERSION.to_string(),
        }
    }

    pub fn with_client_info(mut self, platform: &str, app_version: &str) -> Self {
        self.platform = platform.to_string();
        self.app_version = app_version.to_string();
        self
    }

    pub fn http(&self) -> &ApiClient {
        &self.http
    }
}

#[async_trait]
impl BookingApi for BackendClient {
    async fn register_client(&self, device_id: &str) -> Result<RegisterClientResponse> {
        let req = RegisterClientRequest {
            device_id: device_id.to_string(),
            platform: self.platform.clone(),
            app_version: self.app_version.clone(),
        };
        self.http.post("/clients/register", Some(&req)).await
    }

    async fn fetch_services(&self) -> Result<Vec<Service>> {
        self.http.get("/services", &[]).await
    }

    async fn fetch_service(&self, id: &str) -> Result<Service> {
        self.http.get(&format!("/services/{}", id), &[]).await
    }

    async fn fetch_bookings(&self) -> Result<Vec<Booking>> {
        self.http.get("/bookings", &[]).await
    }

    async fn create_booking(&self, req: &CreateBookingRequest) -> Result<Booking> {
        self.http.post("/bookings", Some(req)).await
    }

    async fn cancel_booking(&self, id: &str) -> Result<()> {
        self.http.delete(&format!("/bookings/{}", id)).await
    }

    async fn fetch_booking_act(&self, id: &str) -> Result<Vec<u8>> {
        self.http.get_bytes(&format!("/bookings/{}/act", id)).await
    }

    async fn rate_booking(&self, id: &str, req: &RateBookingRequest) -> Result<Booking> {
        self.http
            .post(&format!("/bookings/{}/rating", id), Some(req))
            .await
    }

    async fn fetch_slots(
        &self,
        service_id: &str,
        date: &str,
        post_id: &str,
    ) -> Result<Vec<TimeSlot>> {
        self.http
            .get(
                "/slots",
                &[("service_id", service_id), ("date", date), ("post_id", post_id)],
            )
            .await
    }

    async fn fetch_posts(&self) -> Result<Vec<Post>> {
        self.http.get("/posts", &[]).await
    }

    async fn fetch_profile(&self) -> Result<User> {
        self.http.get("/profile", &[]).await
    }

    async fn update_profile(&self, req: &UpdateProfileRequest) -> Result<User> {
        self.http.put("/profile", Some(req)).await
    }

    async fn fetch_cars(&self) -> Result<Vec<CarFolder>> {
        self.http.get("/cars", &[]).await
    }

    async fn fetch_notifications(&self) -> Result<Vec<Notification>> {
        self.http.get("/notifications", &[]).await
    }

    async fn mark_notification_read(&self, id: &str) -> Result<()> {
        let _: IgnoredAny = self
            .http
            .post(&format!("/notifications/{}/read", id), None::<&()>)
            .await?;
        Ok(())
    }

    async fn fetch_news(&self) -> Result<Vec<ClientNewsItem>> {
        self.http.get("/news", &[]).await
    }

    async fn fetch_company(&self) -> Result<CompanyInfo> {
        self.http.get("/company", &[]).await
    }

    async fn fetch_telegram_config(&self) -> Result<TelegramWidgetConfigResponse> {
        self.http.get("/auth/telegram/config", &[]).await
    }

    async fn telegram_login(&self, auth_data: &serde_json::Value) -> Result<TelegramLoginResponse> {
        self.http.post("/auth/telegram/login", Some(auth_data)).await
    }
}
