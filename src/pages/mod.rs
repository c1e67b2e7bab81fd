//! 各畫面的狀態與文字輸出

pub mod booking_create;
pub mod bookings;
pub mod company;
pub mod connect;
pub mod legal;
pub mod news;
pub mod profile;
pub mod service_detail;
pub mod services;

pub use booking_create::BookingCreatePage;
pub use bookings::{BookingTab, BookingsPage};
pub use company::CompanyPage;
pub use connect::ConnectPage;
pub use legal::{legal_banner, render_legal, LegalDoc};
pub use news::NewsPage;
pub use profile::{ProfileEdit, ProfilePage};
pub use service_detail::ServiceDetailPage;
pub use services::ServicesPage;
