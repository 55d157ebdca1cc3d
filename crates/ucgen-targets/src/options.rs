//! Resolved target options relevant to artifact generation.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::platform::PlatformKind;

/// An option value together with whether the user set it explicitly.
///
/// Deserializing always marks the value as user-set; values that come from
/// `Default` are computed defaults. Generators use the flag to tell user
/// intent apart from defaults (e.g. when picking a default board).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tracked<T> {
    /// The effective value.
    pub value: T,
    /// Whether the value was set explicitly by the user.
    pub user_set: bool,
}

impl<T> Tracked<T> {
    /// A value the user set explicitly.
    pub fn user(value: T) -> Self {
        Self {
            value,
            user_set: true,
        }
    }

    /// A computed default.
    pub fn computed(value: T) -> Self {
        Self {
            value,
            user_set: false,
        }
    }

    /// Whether this value is a computed default.
    pub fn is_unset(&self) -> bool {
        !self.user_set
    }

    /// The value, only if the user set it.
    pub fn user_value(&self) -> Option<&T> {
        self.user_set.then_some(&self.value)
    }
}

impl<T: Serialize> Serialize for Tracked<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.value.serialize(serializer)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Tracked<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        T::deserialize(deserializer).map(Tracked::user)
    }
}

/// Logging verbosity, ordered from least to most verbose.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Log,
    Debug,
}

impl LogLevel {
    /// Upper-case name, as used in `LF_LOG_LEVEL_<NAME>`.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Error => "ERROR",
            Self::Warn => "WARN",
            Self::Info => "INFO",
            Self::Log => "LOG",
            Self::Debug => "DEBUG",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Network technology used between federates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// TCP over IPv4.
    #[default]
    #[serde(alias = "tcp")]
    Ethernet,
    /// IPv6 over IEEE 802.15.4 (6LoWPAN).
    #[serde(alias = "6lowpan")]
    Sicslowpan,
}

impl TransportKind {
    /// Whether this transport is the constrained IPv6 kind that needs allocated addresses.
    pub fn is_constrained(&self) -> bool {
        matches!(self, Self::Sicslowpan)
    }

    /// Manifest spelling of this transport.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ethernet => "ethernet",
            Self::Sicslowpan => "sicslowpan",
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Target options as resolved upstream. Never partially constructed: every
/// field carries either a user value or a computed default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct TargetOptions {
    /// Application-wide platform.
    #[serde(skip_serializing_if = "Tracked::is_unset")]
    pub platform: Tracked<PlatformKind>,
    /// Board identifier understood by the RTOS build tooling.
    #[serde(skip_serializing_if = "Tracked::is_unset")]
    pub board: Tracked<Option<String>>,
    /// Logging verbosity of the generated program.
    #[serde(skip_serializing_if = "Tracked::is_unset")]
    pub logging: Tracked<LogLevel>,
    /// Inter-federate transport.
    #[serde(skip_serializing_if = "Tracked::is_unset")]
    pub net_interface: Tracked<TransportKind>,
    /// Skip invoking the native toolchain after generation.
    #[serde(skip_serializing_if = "Tracked::is_unset")]
    pub no_compile: Tracked<bool>,
}

impl TargetOptions {
    /// Options for a platform chosen by the user, everything else defaulted.
    pub fn for_platform(platform: PlatformKind) -> Self {
        Self {
            platform: Tracked::user(platform),
            ..Self::default()
        }
    }

    /// Set the board explicitly.
    pub fn with_board(mut self, board: impl Into<String>) -> Self {
        self.board = Tracked::user(Some(board.into()));
        self
    }

    /// Set the transport explicitly.
    pub fn with_transport(mut self, transport: TransportKind) -> Self {
        self.net_interface = Tracked::user(transport);
        self
    }

    /// Set the logging level explicitly.
    pub fn with_logging(mut self, level: LogLevel) -> Self {
        self.logging = Tracked::user(level);
        self
    }

    /// Board name, if present and non-blank.
    pub fn board_name(&self) -> Option<&str> {
        self.board
            .value
            .as_deref()
            .map(str::trim)
            .filter(|b| !b.is_empty())
    }

    /// Application-wide platform with `Auto` resolved.
    pub fn resolved_platform(&self) -> PlatformKind {
        self.platform.value.resolve(PlatformKind::Auto)
    }
}
