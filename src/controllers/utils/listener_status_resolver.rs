// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//

use std::collections::{hash_map::Entry, BTreeSet, HashMap, HashSet};

use gateway_api::apis::standard::gateways::{GatewayStatusListeners, GatewayStatusListenersSupportedKinds};
use k8s_openapi::{
    apimachinery::pkg::apis::meta::v1::{Condition, Time},
    chrono::Utc,
};
use tracing::debug;

use crate::common::{
    ConditionType, ConflictReason, DataPlaneListen, DetachedReason, Gateway, Listener, ListenerCondition, ListenerConditions, ProtocolType,
    CONDITION_FALSE, DEFAULT_GROUP_NAME,
};

pub const SUPPORTED_ROUTE_KINDS: [&str; 4] = ["HTTPRoute", "TCPRoute", "TLSRoute", "UDPRoute"];

pub fn supported_kinds() -> Vec<GatewayStatusListenersSupportedKinds> {
    SUPPORTED_ROUTE_KINDS
        .iter()
        .map(|kind| GatewayStatusListenersSupportedKinds { group: Some(DEFAULT_GROUP_NAME.to_owned()), kind: (*kind).to_owned() })
        .collect()
}

/// Ports the data plane listens on, per protocol.
struct PortOccupancy {
    protocols: HashMap<ProtocolType, BTreeSet<i32>>,
}

impl PortOccupancy {
    fn new(data_plane_listens: &[DataPlaneListen]) -> Self {
        let mut protocols: HashMap<ProtocolType, BTreeSet<i32>> = HashMap::new();
        for listen in data_plane_listens {
            protocols.entry(listen.protocol).or_default().insert(listen.port);
        }
        Self { protocols }
    }

    fn detachment(&self, listener: &Listener) -> Option<DetachedReason> {
        match self.protocols.get(&listener.protocol()) {
            None => Some(DetachedReason::UnsupportedProtocol),
            Some(ports) if ports.is_empty() => Some(DetachedReason::UnsupportedProtocol),
            Some(ports) if !ports.contains(&listener.port()) => Some(DetachedReason::PortUnavailable),
            Some(_) => None,
        }
    }
}

struct PortClaim<'a> {
    protocol: ProtocolType,
    owner: &'a str,
}

/// A listener that asked for a port during this resolution.
struct PortContender<'a> {
    index: usize,
    name: &'a str,
    protocol: ProtocolType,
    seeded: bool,
}

impl PortContender<'_> {
    fn excludes(&self, name: &str, protocol: ProtocolType) -> bool {
        self.name != name && !self.protocol.shares_port_with(protocol)
    }
}

/// Claims the Gateway's own listeners make on ports and on (port, hostname) pairs during one resolution.
#[derive(Default)]
struct PortAssignments<'a> {
    ports: HashMap<i32, PortClaim<'a>>,
    hostnames: HashMap<(i32, &'a str), &'a str>,
    contenders: HashMap<i32, Vec<PortContender<'a>>>,
}

impl<'a> PortAssignments<'a> {
    fn seed(&mut self, index: usize, listener: &'a Listener) {
        self.ports.entry(listener.port()).or_insert(PortClaim { protocol: listener.protocol(), owner: listener.name() });
        self.contenders.entry(listener.port()).or_default().push(PortContender {
            index,
            name: listener.name(),
            protocol: listener.protocol(),
            seeded: true,
        });
        if listener.protocol().is_hostname_routed() {
            self.hostnames.entry((listener.port(), listener.effective_hostname())).or_insert(listener.name());
        }
    }

    /// Returns the conflict raised by `listener`, together with the indices of earlier, not seeded
    /// listeners on the same port that the conflict implicates as well.
    ///
    /// A seeded listener only answers to the seeded owner of its port. Any other listener conflicts with
    /// every listener on the port it cannot share with, seeded or not, so the outcome does not depend on order.
    fn claim(&mut self, index: usize, listener: &'a Listener, seeded: bool) -> (Option<ConflictReason>, Vec<usize>) {
        let port = listener.port();
        let protocol = listener.protocol();
        let name = listener.name();

        let owner = self.ports.entry(port).or_insert(PortClaim { protocol, owner: name });
        let contenders = self.contenders.entry(port).or_default();

        let (conflicted, implicated) = if seeded {
            (owner.owner != name && !owner.protocol.shares_port_with(protocol), vec![])
        } else {
            let implicated: Vec<usize> =
                contenders.iter().filter(|contender| !contender.seeded && contender.excludes(name, protocol)).map(|contender| contender.index).collect();
            (contenders.iter().any(|contender| contender.excludes(name, protocol)), implicated)
        };
        if !seeded {
            contenders.push(PortContender { index, name, protocol, seeded });
        }

        if conflicted {
            return (Some(ConflictReason::Protocol), implicated);
        }
        if !protocol.is_hostname_routed() {
            return (None, implicated);
        }

        match self.hostnames.entry((port, listener.effective_hostname())) {
            Entry::Vacant(entry) => {
                entry.insert(name);
                (None, implicated)
            },
            Entry::Occupied(entry) if *entry.get() != name => (Some(ConflictReason::Hostname), implicated),
            Entry::Occupied(_) => (None, implicated),
        }
    }
}

fn is_not_conflicted(status: &GatewayStatusListeners) -> bool {
    let conflicted = ConditionType::Conflicted.to_string();
    status.conditions.iter().any(|c| c.type_ == conflicted && c.status == CONDITION_FALSE)
}

/// Computes one listener status per spec listener from the Gateway's desired listeners, its previous
/// listener statuses and the listens the data plane actually has.
pub struct ListenerStatusResolver<'a> {
    gateway: &'a Gateway,
    data_plane_listens: &'a [DataPlaneListen],
    now: Time,
}

impl<'a> ListenerStatusResolver<'a> {
    pub fn new(gateway: &'a Gateway, data_plane_listens: &'a [DataPlaneListen]) -> Self {
        Self { gateway, data_plane_listens, now: Time(Utc::now()) }
    }

    #[must_use]
    pub fn with_time(mut self, now: Time) -> Self {
        self.now = now;
        self
    }

    pub fn resolve(self) -> Vec<GatewayStatusListeners> {
        let gateway = self.gateway;
        let listeners = gateway.listeners();
        let occupancy = PortOccupancy::new(self.data_plane_listens);

        let previous_statuses: HashMap<&str, &GatewayStatusListeners> =
            gateway.listener_statuses().iter().map(|status| (status.name.as_str(), status)).collect();

        // Listeners that were conflict free last time claim first so that they keep their port and hostname.
        let mut assignments = PortAssignments::default();
        let mut seeded = HashSet::new();
        for (index, listener) in listeners.iter().enumerate() {
            if previous_statuses.get(listener.name()).is_some_and(|status| is_not_conflicted(status)) {
                assignments.seed(index, listener);
                seeded.insert(listener.name());
            }
        }

        let mut conflicts: Vec<Option<ConflictReason>> = vec![None; listeners.len()];
        for (index, listener) in listeners.iter().enumerate() {
            let (conflict, implicated) = assignments.claim(index, listener, seeded.contains(listener.name()));
            conflicts[index] = conflict;
            for implicated_index in implicated {
                conflicts[implicated_index] = Some(ConflictReason::Protocol);
            }
        }

        listeners
            .iter()
            .zip(conflicts)
            .map(|(listener, conflict)| {
                let conditions = Self::listener_conditions(conflict, occupancy.detachment(listener));
                debug!("{} listener {listener} conditions {conditions:?}", gateway.key());
                let previous_status = previous_statuses.get(listener.name());
                let previous_conditions: &[Condition] = previous_status.map(|status| status.conditions.as_slice()).unwrap_or_default();

                GatewayStatusListeners {
                    name: listener.name().to_owned(),
                    attached_routes: previous_status.map_or(0, |status| status.attached_routes),
                    supported_kinds: supported_kinds(),
                    conditions: conditions
                        .iter()
                        .map(|condition| condition.to_condition(gateway.generation(), previous_conditions, &self.now))
                        .collect(),
                }
            })
            .collect()
    }

    fn listener_conditions(conflict: Option<ConflictReason>, detachment: Option<DetachedReason>) -> ListenerConditions {
        let mut conditions = ListenerConditions::new();
        conditions.replace(conflict.map_or(ListenerCondition::NotConflicted, ListenerCondition::Conflicted));
        if let Some(reason) = detachment {
            conditions.replace(ListenerCondition::Detached(reason));
        }

        if conflict.is_none() && detachment.is_none() {
            conditions.replace(ListenerCondition::Ready);
        } else {
            conditions.replace(ListenerCondition::NotReady);
        }
        conditions
    }
}
