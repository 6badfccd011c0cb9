//! What the subsystem needs from its host application.

use std::path::PathBuf;

/// Placeholder in logical roots replaced by the application-data directory.
pub const APPDATA_PLACEHOLDER: &str = "<appdata>";

const APP_DIR_NAME: &str = "Sikulix";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsFamily {
    Windows,
    MacOs,
    Linux,
}

impl OsFamily {
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            OsFamily::Windows
        } else if cfg!(target_os = "macos") {
            OsFamily::MacOs
        } else {
            OsFamily::Linux
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OsFamily::Windows => "windows",
            OsFamily::MacOs => "mac",
            OsFamily::Linux => "linux",
        }
    }

    /// Logical root of the bundled native libraries for this OS.
    pub fn native_libs_root(&self) -> String {
        format!("/sikulixlibs/{}/libs64", self.as_str())
    }
}

pub trait Host: Send + Sync {
    fn app_data_dir(&self) -> PathBuf;

    fn os_family(&self) -> OsFamily {
        OsFamily::current()
    }
}

/// Host backed by the platform's standard directories.
#[derive(Debug, Default, Clone)]
pub struct SystemHost;

impl Host for SystemHost {
    fn app_data_dir(&self) -> PathBuf {
        let standard = match OsFamily::current() {
            // Roaming application data on Windows, Application Support on macOS
            OsFamily::Windows | OsFamily::MacOs => dirs::data_dir().map(|d| d.join(APP_DIR_NAME)),
            OsFamily::Linux => dirs::home_dir().map(|h| h.join(format!(".{}", APP_DIR_NAME))),
        };
        standard.unwrap_or_else(|| PathBuf::from(".").join("SikulixAppData"))
    }
}

/// Host with a fixed application-data directory.
#[derive(Debug, Clone)]
pub struct FixedHost {
    pub app_data: PathBuf,
    pub os: OsFamily,
}

impl FixedHost {
    pub fn new(app_data: impl Into<PathBuf>) -> Self {
        Self {
            app_data: app_data.into(),
            os: OsFamily::current(),
        }
    }
}

impl Host for FixedHost {
    fn app_data_dir(&self) -> PathBuf {
        self.app_data.clone()
    }

    fn os_family(&self) -> OsFamily {
        self.os
    }
}
