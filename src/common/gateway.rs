// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//

use std::fmt::Display;

use gateway_api::apis::standard::gateways::{Gateway as KubeGateway, GatewayStatusListeners};
use itertools::Itertools;
use thiserror::Error;

use super::{Listener, ResourceKey};

/// Snapshot of a Gateway as needed to compute listener statuses: the desired listeners in spec order
/// and whatever status the previous reconciliation left behind.
#[derive(Clone, Debug)]
pub struct Gateway {
    resource_key: ResourceKey,
    generation: i64,
    listeners: Vec<Listener>,
    listener_statuses: Vec<GatewayStatusListeners>,
}

impl PartialEq for Gateway {
    fn eq(&self, other: &Self) -> bool {
        self.resource_key == other.resource_key
    }
}

impl Gateway {
    pub fn name(&self) -> &str {
        &self.resource_key.name
    }

    pub fn namespace(&self) -> &str {
        &self.resource_key.namespace
    }

    pub fn key(&self) -> &ResourceKey {
        &self.resource_key
    }

    pub fn generation(&self) -> i64 {
        self.generation
    }

    pub fn listeners(&self) -> &[Listener] {
        &self.listeners
    }

    pub fn listener_statuses(&self) -> &[GatewayStatusListeners] {
        &self.listener_statuses
    }
}

impl TryFrom<&KubeGateway> for Gateway {
    type Error = GatewayError;

    fn try_from(gateway: &KubeGateway) -> std::result::Result<Self, Self::Error> {
        let resource_key = ResourceKey::from(gateway);

        let (listeners, listener_validation_errors): (Vec<_>, Vec<_>) =
            gateway.spec.listeners.iter().map(|l| Listener::try_from(l).map_err(|e| format!("{}: {e}", l.name))).partition_result();
        if !listener_validation_errors.is_empty() {
            return Err(GatewayError::ConversionProblem(format!("Misconfigured listeners {}", listener_validation_errors.join(", "))));
        }

        Ok(Self {
            resource_key,
            generation: gateway.metadata.generation.unwrap_or_default(),
            listeners,
            listener_statuses: gateway.status.as_ref().and_then(|s| s.listeners.clone()).unwrap_or_default(),
        })
    }
}

#[derive(Error, Debug, PartialEq, PartialOrd)]
pub enum GatewayError {
    #[error("Conversion problem {0}")]
    ConversionProblem(String),
}

impl Display for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Gateway {}.{} generation = {} listeners = {} ", self.namespace(), self.name(), self.generation, self.listeners.len())
    }
}
