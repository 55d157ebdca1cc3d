//! Federate descriptors and the deployment context.

use std::net::{IpAddr, Ipv6Addr};

use serde::{Deserialize, Serialize};

use crate::options::{TargetOptions, TransportKind};
use crate::platform::PlatformKind;

/// Sizing hints computed by the reaction-graph analysis upstream.
///
/// Only substituted into generated text, never interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SizingHints {
    /// Number of events the event queue must hold.
    pub events: usize,
    /// Number of reactions the reaction queue must hold.
    pub reactions: usize,
}

impl SizingHints {
    pub fn new(events: usize, reactions: usize) -> Self {
        Self { events, reactions }
    }
}

/// An explicit network interface declared for a federate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NetInterfaceBinding {
    /// Address in textual form, as written by the user.
    pub address: String,
    /// Transport the interface is used with.
    #[serde(default)]
    pub transport: TransportKind,
}

impl NetInterfaceBinding {
    pub fn new(address: impl Into<String>, transport: TransportKind) -> Self {
        Self {
            address: address.into(),
            transport,
        }
    }

    /// Whether the address looks like IPv6 text (it may still be malformed).
    pub fn is_ipv6_shaped(&self) -> bool {
        match self.address.trim().parse::<IpAddr>() {
            Ok(ip) => ip.is_ipv6(),
            Err(_) => self.address.contains(':'),
        }
    }

    /// The address parsed as IPv6, if it is well-formed IPv6.
    pub fn ipv6(&self) -> Option<Ipv6Addr> {
        self.address.trim().parse().ok()
    }
}

/// One federate of a federation, as handed over by semantic analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FederateDescriptor {
    /// Name, unique within the federation.
    pub name: String,
    /// Platform assigned to this federate, possibly `Auto`.
    #[serde(default)]
    pub platform: PlatformKind,
    /// Board override for this federate only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub board: Option<String>,
    /// Explicit interface bindings, in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<NetInterfaceBinding>,
    /// Position in the federation. Filled with the declaration index when
    /// the manifest leaves it out.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ordinal: Option<usize>,
    /// Per-federate sizing hints; the project-wide hints apply when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sizing: Option<SizingHints>,
}

impl FederateDescriptor {
    /// A federate with `Auto` platform and no overrides.
    pub fn new(name: impl Into<String>, ordinal: usize) -> Self {
        Self {
            name: name.into(),
            platform: PlatformKind::Auto,
            board: None,
            interfaces: Vec::new(),
            ordinal: Some(ordinal),
            sizing: None,
        }
    }

    pub fn with_platform(mut self, platform: PlatformKind) -> Self {
        self.platform = platform;
        self
    }

    pub fn with_board(mut self, board: impl Into<String>) -> Self {
        self.board = Some(board.into());
        self
    }

    pub fn with_interface(mut self, binding: NetInterfaceBinding) -> Self {
        self.interfaces.push(binding);
        self
    }

    /// Platform of this federate with `Auto` falling back to the target-wide platform.
    pub fn resolve_platform(&self, options: &TargetOptions) -> PlatformKind {
        self.platform.resolve(options.platform.value)
    }

    /// Board override, if present and non-blank.
    pub fn board_name(&self) -> Option<&str> {
        self.board.as_deref().map(str::trim).filter(|b| !b.is_empty())
    }

    /// Raw text of every IPv6-shaped explicit address, in declaration order.
    pub fn ipv6_shaped_addresses(&self) -> impl Iterator<Item = &str> {
        self.interfaces
            .iter()
            .filter(|b| b.is_ipv6_shaped())
            .map(|b| b.address.trim())
    }

    /// The first well-formed IPv6 address this federate declares.
    pub fn explicit_ipv6(&self) -> Option<Ipv6Addr> {
        self.interfaces.iter().find_map(NetInterfaceBinding::ipv6)
    }
}

/// Whether a deployment unit is a standalone application or one federate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentContext<'a> {
    /// Single, non-distributed application.
    Standalone,
    /// One federate of a federation.
    Federated(&'a FederateDescriptor),
}

impl<'a> DeploymentContext<'a> {
    /// The federate, if federated.
    pub fn federate(&self) -> Option<&'a FederateDescriptor> {
        match *self {
            Self::Standalone => None,
            Self::Federated(fed) => Some(fed),
        }
    }

    pub fn is_federated(&self) -> bool {
        matches!(self, Self::Federated(_))
    }

    /// Project name of this unit: the main reactor name, suffixed with the
    /// federate name when federated.
    pub fn project_name(&self, main_name: &str) -> String {
        match self {
            Self::Standalone => main_name.to_string(),
            Self::Federated(fed) => format!("{main_name}_{}", fed.name),
        }
    }

    /// Platform of this unit with `Auto` resolved.
    pub fn resolve_platform(&self, options: &TargetOptions) -> PlatformKind {
        match self {
            Self::Standalone => options.resolved_platform(),
            Self::Federated(fed) => fed.resolve_platform(options),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn federate_auto_uses_target_platform() {
        let options = TargetOptions::for_platform(PlatformKind::Zephyr);
        let fed = FederateDescriptor::new("f0", 0);
        assert_eq!(fed.resolve_platform(&options), PlatformKind::Zephyr);

        let pinned = FederateDescriptor::new("f1", 1).with_platform(PlatformKind::Riot);
        assert_eq!(pinned.resolve_platform(&options), PlatformKind::Riot);
    }

    #[test]
    fn project_name_by_context() {
        let fed = FederateDescriptor::new("sensor", 0);
        assert_eq!(DeploymentContext::Standalone.project_name("Main"), "Main");
        assert_eq!(DeploymentContext::Federated(&fed).project_name("Main"), "Main_sensor");
    }

    #[test]
    fn explicit_ipv6_skips_ipv4_bindings() {
        let fed = FederateDescriptor::new("f0", 0)
            .with_interface(NetInterfaceBinding::new("127.0.0.1", TransportKind::Ethernet))
            .with_interface(NetInterfaceBinding::new("FD01::9", TransportKind::Sicslowpan));
        assert_eq!(fed.explicit_ipv6(), Some("fd01::9".parse().unwrap()));
        assert_eq!(fed.ipv6_shaped_addresses().collect::<Vec<_>>(), vec!["FD01::9"]);
    }

    #[test]
    fn malformed_ipv6_is_still_shaped() {
        let binding = NetInterfaceBinding::new("fd01::zz", TransportKind::Sicslowpan);
        assert!(binding.is_ipv6_shaped());
        assert!(binding.ipv6().is_none());
        assert!(!NetInterfaceBinding::new("10.0.0.1", TransportKind::Ethernet).is_ipv6_shaped());
    }

    #[test]
    fn standalone_has_no_federate() {
        assert!(DeploymentContext::Standalone.federate().is_none());
        assert!(!DeploymentContext::Standalone.is_federated());
    }
}
