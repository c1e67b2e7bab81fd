use crate::core::loadable::{FetchGuard, Loadable};
use crate::domain::model::CompanyInfo;
use crate::domain::ports::BookingApi;

/// 只列出有值的欄位，依固定順序
pub fn company_fields(info: &CompanyInfo) -> Vec<(&'static str, &str)> {
    [
        ("Телефон", &info.phone),
        ("Доп. телефон", &info.phone_extra),
        ("Email", &info.email),
        ("Сайт", &info.website),
        ("Адрес", &info.address),
        ("Юр. адрес", &info.legal_address),
        ("ИНН", &info.inn),
        ("ОГРН/ОГРНИП", &info.ogrn),
        ("КПП", &info.kpp),
        ("Руководитель", &info.director_name),
    ]
    .into_iter()
    .filter_map(|(label, value)| {
        value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|v| (label, v))
    })
    .collect()
}

#[derive(Debug, Default)]
pub struct CompanyPage {
    pub info: Loadable<CompanyInfo>,
    guard: FetchGuard,
}

impl CompanyPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn load(&mut self, api: &dyn BookingApi) {
        let ticket = self.guard.begin();
        self.info = Loadable::Loading;
        let result = api.fetch_company().await;
        if let Err(e) = &result {
            tracing::warn!("Failed to load company info: {}", e);
        }
        ticket.apply(&mut self.info, result);
    }

    pub fn render(&self) -> String {
        match &self.info {
            Loadable::Idle | Loadable::Loading => "Загрузка...".to_string(),
            Loadable::Failed(e) if !e.trim().is_empty() => e.clone(),
            Loadable::Failed(_) => "Не удалось загрузить данные компании".to_string(),
            Loadable::Loaded(info) => {
                let mut lines = vec![info
                    .name
                    .as_deref()
                    .filter(|n| !n.trim().is_empty())
                    .unwrap_or("О компании")
                    .to_string()];
                lines.extend(
                    company_fields(info)
                        .into_iter()
                        .map(|(label, value)| format!("{}: {}", label, value)),
                );
                lines.join("\n")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_filled_fields_are_listed() {
        let info = CompanyInfo {
            name: Some("Автомойка «Блеск»".to_string()),
            phone: Some("+7 900 000-00-00".to_string()),
            inn: Some("7701234567".to_string()),
            kpp: Some("  ".to_string()),
            ..CompanyInfo::default()
        };
        let fields = company_fields(&info);
        assert_eq!(
            fields,
            vec![("Телефон", "+7 900 000-00-00"), ("ИНН", "7701234567")]
        );

        let mut page = CompanyPage::new();
        page.info = Loadable::Loaded(info);
        assert_eq!(
            page.render(),
            "Автомойка «Блеск»\nТелефон: +7 900 000-00-00\nИНН: 7701234567"
        );
    }

    #[test]
    fn test_render_shows_backend_error() {
        let mut page = CompanyPage::new();
        page.info = Loadable::Failed("Forbidden".to_string());
        assert_eq!(page.render(), "Forbidden");

        page.info = Loadable::Failed(" ".to_string());
        assert_eq!(page.render(), "Не удалось загрузить данные компании");
    }
}
