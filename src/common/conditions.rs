// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//

use std::{collections::BTreeSet, fmt::Display};

use k8s_openapi::apimachinery::pkg::apis::meta::v1::{Condition, Time};

pub const CONDITION_TRUE: &str = "True";
pub const CONDITION_FALSE: &str = "False";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConditionType {
    Conflicted,
    Detached,
    Ready,
    Scheduled,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConditionReason {
    ProtocolConflict,
    HostnameConflict,
    NoConflicts,
    UnsupportedProtocol,
    PortUnavailable,
    Ready,
    Pending,
    Scheduled,
    ListenersNotReady,
}

impl Display for ConditionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl Display for ConditionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConflictReason {
    Protocol,
    Hostname,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DetachedReason {
    UnsupportedProtocol,
    PortUnavailable,
}

/// Per-listener assertion. Equality and ordering only look at the condition type, so a
/// `ListenerConditions` set holds at most one condition of each type and `replace` updates it.
#[derive(Clone, Copy, Debug)]
pub enum ListenerCondition {
    Conflicted(ConflictReason),
    NotConflicted,
    Detached(DetachedReason),
    Ready,
    NotReady,
}

pub type ListenerConditions = BTreeSet<ListenerCondition>;

impl ListenerCondition {
    pub fn discriminant(&self) -> u8 {
        match self {
            ListenerCondition::Conflicted(_) | ListenerCondition::NotConflicted => 0,
            ListenerCondition::Detached(_) => 1,
            ListenerCondition::Ready | ListenerCondition::NotReady => 2,
        }
    }

    pub fn resolved_type(&self) -> (&'static str, ConditionType, ConditionReason, &'static str) {
        match self {
            ListenerCondition::Conflicted(ConflictReason::Protocol) => (
                CONDITION_TRUE,
                ConditionType::Conflicted,
                ConditionReason::ProtocolConflict,
                "the listener shares its port with a listener of an incompatible protocol",
            ),
            ListenerCondition::Conflicted(ConflictReason::Hostname) => (
                CONDITION_TRUE,
                ConditionType::Conflicted,
                ConditionReason::HostnameConflict,
                "another listener already uses the same hostname on this port",
            ),
            ListenerCondition::NotConflicted => (CONDITION_FALSE, ConditionType::Conflicted, ConditionReason::NoConflicts, ""),
            ListenerCondition::Detached(DetachedReason::UnsupportedProtocol) => (
                CONDITION_TRUE,
                ConditionType::Detached,
                ConditionReason::UnsupportedProtocol,
                "no data plane listen with the requested protocol is configured",
            ),
            ListenerCondition::Detached(DetachedReason::PortUnavailable) => (
                CONDITION_TRUE,
                ConditionType::Detached,
                ConditionReason::PortUnavailable,
                "no data plane listen with the requested protocol is configured for the requested port",
            ),
            ListenerCondition::Ready => {
                (CONDITION_TRUE, ConditionType::Ready, ConditionReason::Ready, "the listener is ready and available for routing")
            },
            ListenerCondition::NotReady => {
                (CONDITION_FALSE, ConditionType::Ready, ConditionReason::Pending, "the listener is not ready and cannot route requests")
            },
        }
    }

    pub fn to_condition(&self, observed_generation: i64, previous_conditions: &[Condition], now: &Time) -> Condition {
        let (status, type_, reason, message) = self.resolved_type();
        ConditionTemplate { status, type_, reason, message }.to_condition(observed_generation, previous_conditions, now)
    }
}

impl PartialOrd for ListenerCondition {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ListenerCondition {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.discriminant().cmp(&other.discriminant())
    }
}

impl Eq for ListenerCondition {}

impl PartialEq for ListenerCondition {
    fn eq(&self, other: &Self) -> bool {
        self.discriminant() == other.discriminant()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GatewayCondition {
    Scheduled,
    Ready,
    ListenersNotReady,
}

impl GatewayCondition {
    pub fn resolved_type(&self) -> (&'static str, ConditionType, ConditionReason, &'static str) {
        match self {
            GatewayCondition::Scheduled => {
                (CONDITION_TRUE, ConditionType::Scheduled, ConditionReason::Scheduled, "the gateway has been scheduled by the controller")
            },
            GatewayCondition::Ready => (CONDITION_TRUE, ConditionType::Ready, ConditionReason::Ready, "all listeners are ready"),
            GatewayCondition::ListenersNotReady => {
                (CONDITION_FALSE, ConditionType::Ready, ConditionReason::ListenersNotReady, "one or more listeners are not ready")
            },
        }
    }

    pub fn to_condition(&self, observed_generation: i64, previous_conditions: &[Condition], now: &Time) -> Condition {
        let (status, type_, reason, message) = self.resolved_type();
        ConditionTemplate { status, type_, reason, message }.to_condition(observed_generation, previous_conditions, now)
    }
}

struct ConditionTemplate {
    status: &'static str,
    type_: ConditionType,
    reason: ConditionReason,
    message: &'static str,
}

impl ConditionTemplate {
    /// The transition time of a previous condition of the same type is kept when neither status nor reason moved.
    fn to_condition(&self, observed_generation: i64, previous_conditions: &[Condition], now: &Time) -> Condition {
        let type_ = self.type_.to_string();
        let reason = self.reason.to_string();
        let last_transition_time = previous_conditions
            .iter()
            .find(|c| c.type_ == type_ && c.status == self.status && c.reason == reason)
            .map_or_else(|| now.clone(), |c| c.last_transition_time.clone());

        Condition {
            last_transition_time,
            message: self.message.to_owned(),
            observed_generation: Some(observed_generation),
            reason,
            status: self.status.to_owned(),
            type_,
        }
    }
}

/// Whether `conditions` holds a condition with the given type, status and reason.
pub fn has_condition(conditions: &[Condition], type_: ConditionType, status: &str, reason: ConditionReason) -> bool {
    find_condition(conditions, type_, status, reason).is_some()
}

pub fn find_condition<'a>(conditions: &'a [Condition], type_: ConditionType, status: &str, reason: ConditionReason) -> Option<&'a Condition> {
    let type_ = type_.to_string();
    let reason = reason.to_string();
    conditions.iter().find(|c| c.type_ == type_ && c.status == status && c.reason == reason)
}

/// Replaces the condition of the same type, or appends it when there is none.
pub fn set_condition(conditions: &mut Vec<Condition>, new_condition: Condition) {
    if let Some(condition) = conditions.iter_mut().find(|c| c.type_ == new_condition.type_) {
        *condition = new_condition;
    } else {
        conditions.push(new_condition);
    }
}
