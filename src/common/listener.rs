// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//

use std::{fmt::Display, ops::RangeInclusive};

use gateway_api::apis::standard::gateways::GatewayListeners;
use serde::Deserialize;
use thiserror::Error;

/// Ports a listener or a data plane listen may use.
pub const PORT_RANGE: RangeInclusive<i32> = 1..=65535;

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Ord, Hash, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProtocolType {
    Http,
    Https,
    Tcp,
    Tls,
    Udp,
}

impl ProtocolType {
    /// Listeners of these protocols are told apart by hostname when they share a port.
    pub fn is_hostname_routed(self) -> bool {
        matches!(self, ProtocolType::Http | ProtocolType::Https | ProtocolType::Tls)
    }

    /// All listeners on a port must either be HTTP, or be HTTPS/TLS. TCP and UDP never share.
    pub fn shares_port_with(self, other: ProtocolType) -> bool {
        match (self, other) {
            (ProtocolType::Http, ProtocolType::Http) => true,
            (ProtocolType::Https | ProtocolType::Tls, ProtocolType::Https | ProtocolType::Tls) => true,
            _ => false,
        }
    }
}

impl TryFrom<&str> for ProtocolType {
    type Error = ListenerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Ok(match value.to_uppercase().as_str() {
            "HTTP" => Self::Http,
            "HTTPS" => Self::Https,
            "TCP" => Self::Tcp,
            "TLS" => Self::Tls,
            "UDP" => Self::Udp,
            _ => {
                return Err(ListenerError::UnknownProtocol(value.to_owned()));
            },
        })
    }
}

impl Display for ProtocolType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut e = format! {"{self:?}"};
        e.make_ascii_uppercase();
        write!(f, "{e}")
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Listener {
    name: String,
    protocol: ProtocolType,
    port: i32,
    hostname: Option<String>,
}

impl Listener {
    pub fn new(name: &str, protocol: ProtocolType, port: i32, hostname: Option<&str>) -> Self {
        Self { name: name.to_owned(), protocol, port, hostname: hostname.map(ToOwned::to_owned) }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn protocol(&self) -> ProtocolType {
        self.protocol
    }

    pub fn port(&self) -> i32 {
        self.port
    }

    pub fn hostname(&self) -> Option<&str> {
        self.hostname.as_deref()
    }

    /// A missing hostname matches whatever no other listener on the port matches; it is keyed as "".
    pub fn effective_hostname(&self) -> &str {
        self.hostname().unwrap_or_default()
    }
}

impl Display for Listener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}:{} {}", self.name, self.protocol, self.port, self.effective_hostname())
    }
}

impl TryFrom<&GatewayListeners> for Listener {
    type Error = ListenerError;

    fn try_from(gateway_listener: &GatewayListeners) -> std::result::Result<Self, Self::Error> {
        let protocol = ProtocolType::try_from(gateway_listener.protocol.as_str())?;
        if !PORT_RANGE.contains(&gateway_listener.port) {
            return Err(ListenerError::InvalidPort(gateway_listener.name.clone(), gateway_listener.port));
        }

        Ok(Self {
            name: gateway_listener.name.clone(),
            protocol,
            port: gateway_listener.port,
            hostname: gateway_listener.hostname.clone(),
        })
    }
}

#[derive(Error, Debug, PartialEq, PartialOrd)]
pub enum ListenerError {
    #[error("Unknown protocol {0}")]
    UnknownProtocol(String),
    #[error("Listener {0} has invalid port {1}")]
    InvalidPort(String, i32),
}
