use crate::core::loadable::{FetchGuard, Loadable};
use crate::domain::model::{Booking, BookingStatus, RateBookingRequest};
use crate::domain::ports::BookingApi;
use crate::utils::error::{ClientError, Result};
use crate::utils::format::{format_date, format_price, format_time, parse_local_datetime};
use crate::utils::validation::validate_range;
use chrono::NaiveDateTime;
use std::fmt::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BookingTab {
    #[default]
    Upcoming,
    Past,
    Cancelled,
}

impl BookingTab {
    pub fn label(&self) -> &'static str {
        match self {
            BookingTab::Upcoming => "Предстоящие",
            BookingTab::Past => "Прошедшие",
            BookingTab::Cancelled => "Отменённые",
        }
    }

    pub fn empty_message(&self) -> &'static str {
        match self {
            BookingTab::Upcoming => "Нет предстоящих записей",
            BookingTab::Past => "Нет прошедших записей",
            BookingTab::Cancelled => "Нет отменённых записей",
        }
    }
}

impl FromStr for BookingTab {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "upcoming" => Ok(BookingTab::Upcoming),
            "past" => Ok(BookingTab::Past),
            "cancelled" | "canceled" => Ok(BookingTab::Cancelled),
            other => Err(ClientError::ValidationError {
                message: format!("Unknown tab '{}', expected upcoming, past or cancelled", other),
            }),
        }
    }
}

/// 時間無法解析時退回字串比較
fn is_upcoming(booking: &Booking, now: NaiveDateTime) -> bool {
    match parse_local_datetime(&booking.date_time) {
        Some(at) => at >= now,
        None => booking.date_time.as_str() >= now.format("%Y-%m-%dT%H:%M:%S").to_string().as_str(),
    }
}

pub fn filter_bookings(bookings: &[Booking], tab: BookingTab, now: NaiveDateTime) -> Vec<&Booking> {
    bookings
        .iter()
        .filter(|b| {
            let cancelled = b.status == BookingStatus::Cancelled;
            match tab {
                BookingTab::Upcoming => !cancelled && is_upcoming(b, now),
                BookingTab::Past => !cancelled && !is_upcoming(b, now),
                BookingTab::Cancelled => cancelled,
            }
        })
        .collect()
}

pub fn act_file_name(booking_id: &str) -> String {
    format!("akt-{}.pdf", booking_id)
}

#[derive(Debug, Default)]
pub struct BookingsPage {
    pub bookings: Loadable<Vec<Booking>>,
    pub tab: BookingTab,
    guard: FetchGuard,
}

impl BookingsPage {
    pub fn new(tab: BookingTab) -> Self {
        Self {
            tab,
            ..Self::default()
        }
    }

    /// 失敗時畫面保留錯誤訊息，並把原始錯誤返回給呼叫端
    pub async fn load(&mut self, api: &dyn BookingApi) -> Result<()> {
        let ticket = self.guard.begin();
        // 重新整理時保留舊資料，讓畫面不閃爍
        if self.bookings.value().is_none() {
            self.bookings = Loadable::Loading;
        }
        match api.fetch_bookings().await {
            Ok(list) => {
                ticket.apply(&mut self.bookings, Ok(list));
                Ok(())
            }
            Err(e) => {
                if ticket.is_current() {
                    self.bookings = Loadable::Failed(e.user_friendly_message());
                }
                Err(e)
            }
        }
    }

    async fn reload(&mut self, api: &dyn BookingApi) {
        if let Err(e) = self.load(api).await {
            tracing::warn!("Failed to reload bookings: {}", e);
        }
    }

    pub fn visible(&self, now: NaiveDateTime) -> Vec<&Booking> {
        match self.bookings.value() {
            Some(all) => filter_bookings(all, self.tab, now),
            None => Vec::new(),
        }
    }

    /// 列表讀取失敗時返回該錯誤訊息，而非「找不到」
    fn find(&self, id: &str) -> Result<&Booking> {
        let all = match &self.bookings {
            Loadable::Loaded(all) => all,
            Loadable::Failed(message) => {
                return Err(ClientError::LoadFailed {
                    message: message.clone(),
                })
            }
            Loadable::Idle | Loadable::Loading => {
                return Err(ClientError::LoadFailed {
                    message: "Записи не загружены".to_string(),
                })
            }
        };
        all.iter()
            .find(|b| b.id == id)
            .ok_or_else(|| ClientError::NotFound {
                message: format!("Запись {} не найдена", id),
            })
    }

    /// 只有待確認 / 已確認的預約可取消
    pub fn check_cancellable(&self, id: &str) -> Result<&Booking> {
        let booking = self.find(id)?;
        if !booking.status.is_cancellable() {
            return Err(ClientError::ValidationError {
                message: format!("Запись в статусе «{}» нельзя отменить", booking.status.label()),
            });
        }
        Ok(booking)
    }

    /// 取消成功後重新載入列表
    pub async fn cancel(&mut self, api: &dyn BookingApi, id: &str) -> Result<()> {
        self.check_cancellable(id)?;
        api.cancel_booking(id).await?;
        tracing::info!("Booking {} cancelled", id);
        self.reload(api).await;
        Ok(())
    }

    /// 下載已完成預約的 PDF 憑證並寫入目錄
    pub async fn download_act(
        &self,
        api: &dyn BookingApi,
        id: &str,
        output_dir: &Path,
    ) -> Result<PathBuf> {
        let booking = self.find(id)?;
        if booking.status != BookingStatus::Completed {
            return Err(ClientError::ValidationError {
                message: "Акт доступен только для завершённых записей".to_string(),
            });
        }
        let pdf = api.fetch_booking_act(id).await?;
        std::fs::create_dir_all(output_dir)?;
        let path = output_dir.join(act_file_name(id));
        std::fs::write(&path, &pdf)?;
        tracing::info!("Saved act for booking {} ({} bytes)", id, pdf.len());
        Ok(path)
    }

    pub async fn rate(
        &mut self,
        api: &dyn BookingApi,
        id: &str,
        rating: u8,
        comment: Option<&str>,
    ) -> Result<()> {
        validate_range("rating", rating, 1, 5)?;
        let booking = self.find(id)?;
        if booking.status != BookingStatus::Completed {
            return Err(ClientError::ValidationError {
                message: "Оценить можно только завершённую запись".to_string(),
            });
        }
        let request = RateBookingRequest {
            rating,
            comment: comment
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string),
        };
        api.rate_booking(id, &request).await?;
        tracing::info!("Booking {} rated {}", id, rating);
        self.reload(api).await;
        Ok(())
    }

    pub fn render(&self, now: NaiveDateTime) -> String {
        let mut out = format!("Мои записи — {}\n", self.tab.label());
        match &self.bookings {
            Loadable::Idle | Loadable::Loading => out.push_str("Загрузка записей..."),
            Loadable::Failed(e) => out.push_str(e),
            Loadable::Loaded(_) => {
                let visible = self.visible(now);
                if visible.is_empty() {
                    out.push_str(self.tab.empty_message());
                }
                for b in visible {
                    let _ = write!(
                        out,
                        "\n{}  {} · {}  {}  {}  [{}]",
                        b.service_name,
                        format_date(&b.date_time),
                        format_time(&b.date_time),
                        b.status.label(),
                        format_price(b.price),
                        b.id
                    );
                    if let Some(rating) = b.rating {
                        let _ = write!(out, "  {}", "★".repeat(rating.min(5) as usize));
                    }
                }
            }
        }
        out.trim_end().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn booking(id: &str, date_time: &str, status: BookingStatus) -> Booking {
        Booking {
            id: id.to_string(),
            service_id: "s1".to_string(),
            service_name: "Мойка".to_string(),
            user_id: "u1".to_string(),
            user_name: None,
            post_id: None,
            date_time: date_time.to_string(),
            status,
            price: 1500.0,
            duration: 60,
            notes: None,
            created_at: String::new(),
            in_progress_started_at: None,
            rating: None,
            rating_comment: None,
        }
    }

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 2, 15)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn ids(list: Vec<&Booking>) -> Vec<&str> {
        list.into_iter().map(|b| b.id.as_str()).collect()
    }

    #[test]
    fn test_tabs_partition_bookings() {
        let bookings = vec![
            booking("future", "2026-02-16T10:00:00", BookingStatus::Confirmed),
            booking("now", "2026-02-15T12:00:00", BookingStatus::Pending),
            booking("past", "2026-02-14T10:00:00", BookingStatus::Completed),
            booking("cancelled", "2026-02-20T10:00:00", BookingStatus::Cancelled),
        ];
        assert_eq!(
            ids(filter_bookings(&bookings, BookingTab::Upcoming, now())),
            vec!["future", "now"]
        );
        assert_eq!(
            ids(filter_bookings(&bookings, BookingTab::Past, now())),
            vec!["past"]
        );
        assert_eq!(
            ids(filter_bookings(&bookings, BookingTab::Cancelled, now())),
            vec!["cancelled"]
        );
    }

    #[test]
    fn test_tab_parse() {
        assert_eq!("PAST".parse::<BookingTab>().unwrap(), BookingTab::Past);
        assert_eq!(
            "canceled".parse::<BookingTab>().unwrap(),
            BookingTab::Cancelled
        );
        assert!("later".parse::<BookingTab>().is_err());
    }

    #[test]
    fn test_render_empty_tab() {
        let mut page = BookingsPage::new(BookingTab::Cancelled);
        page.bookings = Loadable::Loaded(vec![booking(
            "b1",
            "2026-02-16T10:00:00",
            BookingStatus::Pending,
        )]);
        assert!(page.render(now()).ends_with("Нет отменённых записей"));
    }

    #[test]
    fn test_failed_list_is_reported_instead_of_not_found() {
        let mut page = BookingsPage::new(BookingTab::Upcoming);
        page.bookings = Loadable::Failed("Invalid API key".to_string());
        let err = page.check_cancellable("b1").unwrap_err();
        assert!(matches!(err, ClientError::LoadFailed { .. }));
        assert_eq!(err.to_string(), "Invalid API key");

        page.bookings = Loadable::Loaded(vec![
            booking("b1", "2026-02-16T10:00:00", BookingStatus::Completed),
        ]);
        assert!(matches!(
            page.check_cancellable("b1"),
            Err(ClientError::ValidationError { .. })
        ));
        assert!(matches!(
            page.check_cancellable("b2"),
            Err(ClientError::NotFound { .. })
        ));
    }

    #[test]
    fn test_act_file_name() {
        assert_eq!(act_file_name("abc"), "akt-abc.pdf");
    }
}
