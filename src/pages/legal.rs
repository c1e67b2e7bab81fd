use crate::state::{LegalState, LEGAL_VERSION};
use crate::utils::error::{ClientError, Result};
use crate::utils::format::format_short_date;
use std::str::FromStr;

pub const LEGAL_BANNER: &str =
    "Для работы сервиса нужно принять документы (Политика, Согласие, Соглашение).";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LegalDoc {
    #[default]
    Privacy,
    Consent,
    Cookies,
    Agreement,
}

pub const LEGAL_DOCS: [LegalDoc; 4] = [
    LegalDoc::Privacy,
    LegalDoc::Consent,
    LegalDoc::Cookies,
    LegalDoc::Agreement,
];

impl LegalDoc {
    pub fn key(&self) -> &'static str {
        match self {
            LegalDoc::Privacy => "privacy",
            LegalDoc::Consent => "consent",
            LegalDoc::Cookies => "cookies",
            LegalDoc::Agreement => "agreement",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            LegalDoc::Privacy => "Политика обработки персональных данных",
            LegalDoc::Consent => "Согласие на обработку персональных данных",
            LegalDoc::Cookies => "Cookies и локальное хранилище",
            LegalDoc::Agreement => "Пользовательское соглашение",
        }
    }

    pub fn summary(&self) -> &'static str {
        match self {
            LegalDoc::Privacy => {
                "Политика составлена во исполнение требований Федерального закона №152-ФЗ \
                 «О персональных данных». Данные используются для записи на услуги, уведомлений \
                 и поддержки: имя, телефон, email, сведения о записях, идентификатор устройства."
            }
            LegalDoc::Consent => {
                "Пользователь даёт согласие на обработку персональных данных в целях оказания \
                 услуг. Согласие может быть отозвано в любой момент."
            }
            LegalDoc::Cookies => {
                "Приложение хранит на устройстве адрес сервера, ключ доступа, идентификатор \
                 устройства, тему оформления и отметку о принятии документов."
            }
            LegalDoc::Agreement => {
                "Соглашение определяет порядок записи на услуги, отмены записей и \
                 использования сервиса."
            }
        }
    }
}

impl FromStr for LegalDoc {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self> {
        LEGAL_DOCS
            .iter()
            .copied()
            .find(|doc| doc.key() == s.trim().to_ascii_lowercase())
            .ok_or_else(|| ClientError::ValidationError {
                message: format!("Unknown legal document '{}'", s),
            })
    }
}

/// 未同意時顯示的提示；已同意返回 None
pub fn legal_banner(legal: &LegalState) -> Option<&'static str> {
    (!legal.accepted()).then_some(LEGAL_BANNER)
}

pub fn render_legal(legal: &LegalState, doc: Option<LegalDoc>) -> String {
    let mut lines = vec![format!("Документы (редакция {})", LEGAL_VERSION)];
    match doc {
        Some(doc) => {
            lines.push(String::new());
            lines.push(doc.title().to_string());
            lines.push(doc.summary().to_string());
        }
        None => {
            for doc in LEGAL_DOCS {
                lines.push(format!("- {} ({})", doc.title(), doc.key()));
            }
        }
    }
    lines.push(String::new());
    match legal.accepted_at() {
        Some(at) => lines.push(format!("Принято: {}", format_short_date(at))),
        None => lines.push(LEGAL_BANNER.to_string()),
    }
    lines.join("\n")
}
