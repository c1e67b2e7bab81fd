use crate::domain::model::{
    Booking, CarFolder, ClientNewsItem, CompanyInfo, CreateBookingRequest, Notification, Post,
    RateBookingRequest, RegisterClientResponse, Service, TelegramLoginResponse,
    TelegramWidgetConfigResponse, TimeSlot, UpdateProfileRequest, User,
};
use crate::utils::error::Result;
use async_trait::async_trait;

/// 單值字串的持久化偏好儲存（key 存在或不存在）
pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

#[async_trait]
pub trait BookingApi: Send + Sync {
    async fn register_client(&self, device_id: &str) -> Result<RegisterClientResponse>;

    async fn fetch_services(&self) -> Result<Vec<Service>>;
    async fn fetch_service(&self, id: &str) -> Result<Service>;

    async fn fetch_bookings(&self) -> Result<Vec<Booking>>;
    async fn create_booking(&self, req: &CreateBookingRequest) -> Result<Booking>;
    async fn cancel_booking(&self, id: &str) -> Result<()>;
    async fn fetch_booking_act(&self, id: &str) -> Result<Vec<u8>>;
    async fn rate_booking(&self, id: &str, req: &RateBookingRequest) -> Result<Booking>;

    async fn fetch_slots(&self, service_id: &str, date: &str, post_id: &str)
        -> Result<Vec<TimeSlot>>;
    async fn fetch_posts(&self) -> Result<Vec<Post>>;

    async fn fetch_profile(&self) -> Result<User>;
    async fn update_profile(&self, req: &UpdateProfileRequest) -> Result<User>;
    async fn fetch_cars(&self) -> Result<Vec<CarFolder>>;

    async fn fetch_notifications(&self) -> Result<Vec<Notification>>;
    async fn mark_notification_read(&self, id: &str) -> Result<()>;
    async fn fetch_news(&self) -> Result<Vec<ClientNewsItem>>;
    async fn fetch_company(&self) -> Result<CompanyInfo>;

    async fn fetch_telegram_config(&self) -> Result<TelegramWidgetConfigResponse>;
    async fn telegram_login(&self, auth_data: &serde_json::Value) -> Result<TelegramLoginResponse>;
}
