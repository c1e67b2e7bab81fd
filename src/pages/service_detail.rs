use crate::core::loadable::{FetchGuard, Loadable};
use crate::domain::model::Service;
use crate::domain::ports::BookingApi;
use crate::utils::format::{format_duration, format_price};

#[derive(Debug)]
pub struct ServiceDetailPage {
    pub id: String,
    pub service: Loadable<Service>,
    guard: FetchGuard,
}

impl ServiceDetailPage {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            service: Loadable::Idle,
            guard: FetchGuard::new(),
        }
    }

    pub async fn load(&mut self, api: &dyn BookingApi) {
        let ticket = self.guard.begin();
        self.service = Loadable::Loading;
        let result = api.fetch_service(&self.id).await;
        ticket.apply(&mut self.service, result);
    }

    pub fn render(&self) -> String {
        match &self.service {
            Loadable::Idle | Loadable::Loading => "Загрузка...".to_string(),
            Loadable::Failed(e) => format!("Услуга не найдена: {}", e),
            Loadable::Loaded(s) => {
                let mut lines = vec![s.name.clone()];
                if !s.category.is_empty() {
                    lines.push(s.category.clone());
                }
                lines.push(format!(
                    "{} · {}",
                    format_price(s.price),
                    format_duration(s.duration)
                ));
                if !s.description.is_empty() {
                    lines.push(String::new());
                    lines.push(s.description.clone());
                }
                lines.push(String::new());
                lines.push(format!("Записаться: sb-client book {}", s.id));
                lines.join("\n")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_loaded_service() {
        let mut page = ServiceDetailPage::new("s1");
        page.service = Loadable::Loaded(Service {
            id: "s1".to_string(),
            name: "Полировка".to_string(),
            description: "Абразивная полировка кузова".to_string(),
            price: 7999.6,
            duration: 150,
            category: "Детейлинг".to_string(),
            image_url: None,
            is_active: true,
        });
        let text = page.render();
        assert!(text.starts_with("Полировка\nДетейлинг\n8000 ₽ · 2 ч 30 мин"));
        assert!(text.ends_with("sb-client book s1"));
    }
}
