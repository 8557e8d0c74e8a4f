//! Telegram host detection.
//!
//! The shell passes `Telegram.WebApp.initData` and `Telegram.WebApp.platform`
//! through. Outside Telegram the SDK script still loads but leaves `initData`
//! empty and reports the platform as `unknown`.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEnvironment {
    Telegram,
    Browser,
}

impl HostEnvironment {
    pub fn detect(init_data: &str, platform: &str) -> Self {
        let platform = platform.trim();
        if init_data.trim().is_empty() || platform.is_empty() || platform == "unknown" {
            HostEnvironment::Browser
        } else {
            HostEnvironment::Telegram
        }
    }

    pub fn is_telegram(self) -> bool {
        self == HostEnvironment::Telegram
    }
}
