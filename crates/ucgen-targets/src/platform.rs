//! Platform kinds and `Auto` resolution.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The execution platform a deployment unit is generated for.
///
/// `Auto` is never generated for directly: [`PlatformKind::resolve`] maps it
/// to a concrete kind before any generator is selected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformKind {
    /// Native POSIX host.
    #[serde(alias = "posix")]
    Native,
    #[serde(alias = "free-rtos")]
    FreeRtos,
    #[serde(alias = "esp-idf")]
    EspIdf,
    Zephyr,
    #[serde(alias = "pico")]
    Rp2040,
    Riot,
    /// Defer to the application-wide platform.
    #[default]
    Auto,
}

impl PlatformKind {
    /// Platform used when every level of the configuration says `Auto`.
    pub const FALLBACK: PlatformKind = PlatformKind::Native;

    /// Every concrete (non-`Auto`) platform kind, in declaration order.
    pub const CONCRETE: [PlatformKind; 6] = [
        PlatformKind::Native,
        PlatformKind::FreeRtos,
        PlatformKind::EspIdf,
        PlatformKind::Zephyr,
        PlatformKind::Rp2040,
        PlatformKind::Riot,
    ];

    /// Parse a platform kind from a string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "native" | "posix" => Some(Self::Native),
            "freertos" | "free-rtos" => Some(Self::FreeRtos),
            "espidf" | "esp-idf" => Some(Self::EspIdf),
            "zephyr" => Some(Self::Zephyr),
            "rp2040" | "pico" => Some(Self::Rp2040),
            "riot" => Some(Self::Riot),
            "auto" => Some(Self::Auto),
            _ => None,
        }
    }

    /// Manifest spelling of this kind.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Native => "native",
            Self::FreeRtos => "freertos",
            Self::EspIdf => "espidf",
            Self::Zephyr => "zephyr",
            Self::Rp2040 => "rp2040",
            Self::Riot => "riot",
            Self::Auto => "auto",
        }
    }

    /// Value of the `PLATFORM` variable understood by the runtime's build support script.
    pub fn build_system_name(&self) -> &'static str {
        match self {
            Self::Native | Self::Auto => "POSIX",
            Self::FreeRtos => "FREERTOS",
            Self::EspIdf => "ESP_IDF",
            Self::Zephyr => "ZEPHYR",
            Self::Rp2040 => "PICO",
            Self::Riot => "RIOT",
        }
    }

    /// Resolve `Auto` against a fallback, which is itself resolved to
    /// [`PlatformKind::FALLBACK`] when it is `Auto`.
    pub fn resolve(self, fallback: PlatformKind) -> PlatformKind {
        match (self, fallback) {
            (Self::Auto, Self::Auto) => Self::FALLBACK,
            (Self::Auto, concrete) => concrete,
            (concrete, _) => concrete,
        }
    }

    /// Whether this kind still needs resolving.
    pub fn is_auto(&self) -> bool {
        matches!(self, Self::Auto)
    }
}

impl fmt::Display for PlatformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
