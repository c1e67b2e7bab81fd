//! 路由、底部分頁列與依後端 / 法律狀態的路由守衛

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    ServiceDetail(String),
    BookingCreate(String),
    Bookings,
    Profile,
    News,
    Company,
    Connect,
    Legal,
    Agreement,
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::ServiceDetail(id) => format!("/services/{}", id),
            Route::BookingCreate(id) => format!("/services/{}/book", id),
            Route::Bookings => "/bookings".to_string(),
            Route::Profile => "/profile".to_string(),
            Route::News => "/news".to_string(),
            Route::Company => "/company".to_string(),
            Route::Connect => "/connect".to_string(),
            Route::Legal => "/legal".to_string(),
            Route::Agreement => "/agreement".to_string(),
        }
    }

    /// 未知路徑返回 None（呼叫端導回首頁）
    pub fn parse(path: &str) -> Option<Route> {
        let trimmed = path.trim().trim_end_matches('/');
        let segments: Vec<&str> = trimmed.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            [] => Some(Route::Home),
            ["services", id] => Some(Route::ServiceDetail(id.to_string())),
            ["services", id, "book"] => Some(Route::BookingCreate(id.to_string())),
            ["bookings"] => Some(Route::Bookings),
            ["profile"] => Some(Route::Profile),
            ["news"] => Some(Route::News),
            ["company"] => Some(Route::Company),
            ["connect"] => Some(Route::Connect),
            ["legal"] => Some(Route::Legal),
            ["agreement"] => Some(Route::Agreement),
            _ => None,
        }
    }

    /// 未連線時仍可進入的頁面
    pub fn is_public(&self) -> bool {
        matches!(self, Route::Connect | Route::Legal | Route::Agreement)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    Allow(Route),
    Redirect(Route),
    /// 需先同意法律文件
    LegalRequired,
}

pub fn guard(route: Route, connected: bool, legal_accepted: bool) -> RouteDecision {
    if !connected {
        return if route.is_public() {
            RouteDecision::Allow(route)
        } else {
            RouteDecision::Redirect(Route::Connect)
        };
    }
    if route == Route::Connect {
        return RouteDecision::Redirect(Route::Home);
    }
    if !legal_accepted && !route.is_public() {
        return RouteDecision::LegalRequired;
    }
    RouteDecision::Allow(route)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavTab {
    pub path: &'static str,
    pub label: &'static str,
    pub icon: &'static str,
}

pub const NAV_TABS: [NavTab; 3] = [
    NavTab {
        path: "/",
        label: "Услуги",
        icon: "🏠",
    },
    NavTab {
        path: "/bookings",
        label: "Записи",
        icon: "📅",
    },
    NavTab {
        path: "/profile",
        label: "Профиль",
        icon: "👤",
    },
];

pub fn nav_visible(path: &str) -> bool {
    !path.starts_with("/connect")
}

pub fn is_tab_active(tab: &NavTab, path: &str) -> bool {
    if tab.path == "/" {
        path == "/" || path.starts_with("/services")
    } else {
        path.starts_with(tab.path)
    }
}

/// 文字版分頁列，目前分頁以方括號標示
pub fn render_tab_bar(path: &str) -> Option<String> {
    if !nav_visible(path) {
        return None;
    }
    let tabs: Vec<String> = NAV_TABS
        .iter()
        .map(|tab| {
            if is_tab_active(tab, path) {
                format!("[{} {}]", tab.icon, tab.label)
            } else {
                format!(" {} {} ", tab.icon, tab.label)
            }
        })
        .collect();
    Some(tabs.join(" | "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trips_known_paths() {
        for route in [
            Route::Home,
            Route::ServiceDetail("s1".to_string()),
            Route::BookingCreate("s1".to_string()),
            Route::Bookings,
            Route::Connect,
        ] {
            assert_eq!(Route::parse(&route.path()), Some(route));
        }
        assert_eq!(Route::parse("/unknown/x"), None);
    }

    #[test]
    fn test_unconnected_redirects_to_connect() {
        assert_eq!(
            guard(Route::Bookings, false, true),
            RouteDecision::Redirect(Route::Connect)
        );
        assert_eq!(
            guard(Route::Legal, false, false),
            RouteDecision::Allow(Route::Legal)
        );
        assert_eq!(
            guard(Route::Connect, false, false),
            RouteDecision::Allow(Route::Connect)
        );
    }

    #[test]
    fn test_connected_skips_connect_page() {
        assert_eq!(
            guard(Route::Connect, true, true),
            RouteDecision::Redirect(Route::Home)
        );
    }

    #[test]
    fn test_legal_gate_blocks_data_routes() {
        assert_eq!(guard(Route::Home, true, false), RouteDecision::LegalRequired);
        assert_eq!(
            guard(Route::Agreement, true, false),
            RouteDecision::Allow(Route::Agreement)
        );
        assert_eq!(
            guard(Route::Profile, true, true),
            RouteDecision::Allow(Route::Profile)
        );
    }

    #[test]
    fn test_tab_activity() {
        let home = &NAV_TABS[0];
        assert!(is_tab_active(home, "/"));
        assert!(is_tab_active(home, "/services/abc/book"));
        assert!(!is_tab_active(home, "/bookings"));
        assert!(is_tab_active(&NAV_TABS[1], "/bookings"));
    }

    #[test]
    fn test_tab_bar_hidden_on_connect() {
        assert_eq!(render_tab_bar("/connect"), None);
        let bar = render_tab_bar("/profile").unwrap();
        assert!(bar.contains("[👤 Профиль]"));
    }
}
