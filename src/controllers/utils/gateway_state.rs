// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//

use std::collections::BTreeMap;

use gateway_api::apis::standard::{
    gatewayclasses::GatewayClass,
    gateways::{GatewayStatus, GatewayStatusListeners},
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{Condition, Time};

use crate::common::{
    find_condition, has_condition, set_condition, ConditionReason, ConditionType, GatewayCondition, KubeGateway, ResourceKey, ResourceKeyError,
    CONDITION_TRUE,
};

/// Upper bound the Gateway API schema puts on `status.conditions`.
pub const MAX_CONDITIONS: usize = 8;
pub const UNMANAGED_GATEWAY_ANNOTATION: &str = "gateway-status-reconciler.io/gateway-unmanaged";

fn gateway_conditions(gateway: &KubeGateway) -> &[Condition] {
    gateway.status.as_ref().and_then(|status| status.conditions.as_deref()).unwrap_or_default()
}

/// Scheduling is never revoked, so the generation is not looked at.
pub fn is_scheduled(gateway: &KubeGateway) -> bool {
    has_condition(gateway_conditions(gateway), ConditionType::Scheduled, CONDITION_TRUE, ConditionReason::Scheduled)
}

/// Ready only counts when it was computed for the current generation.
pub fn is_ready(gateway: &KubeGateway) -> bool {
    find_condition(gateway_conditions(gateway), ConditionType::Ready, CONDITION_TRUE, ConditionReason::Ready)
        .is_some_and(|condition| condition.observed_generation == gateway.metadata.generation)
}

pub fn extract_unmanaged_gateway_mode<'a>(annotations: &'a BTreeMap<String, String>, annotation: &str) -> Option<&'a str> {
    annotations.get(annotation).map(String::as_str)
}

pub fn is_in_class_and_unmanaged(gateway_class: &GatewayClass, gateway: &KubeGateway, controller_name: &str, annotation: &str) -> bool {
    let annotations = gateway.metadata.annotations.as_ref();
    let unmanaged = annotations.and_then(|annotations| extract_unmanaged_gateway_mode(annotations, annotation)).is_some();
    unmanaged && gateway_class.spec.controller_name == controller_name
}

/// The annotation either names the publish service as `namespace/name` or, when set to `true` or left empty,
/// defers to the configured default.
pub fn publish_service_from_annotation(value: &str, default_publish_service: Option<&str>) -> Result<Option<ResourceKey>, ResourceKeyError> {
    let reference = match value.trim() {
        "" | "true" => default_publish_service,
        reference => Some(reference),
    };
    reference.map(ResourceKey::from_namespaced_name).transpose()
}

pub fn prune_status_conditions(mut gateway: KubeGateway) -> KubeGateway {
    if let Some(conditions) = gateway.status.as_mut().and_then(|status| status.conditions.as_mut()) {
        let excess = conditions.len().saturating_sub(MAX_CONDITIONS);
        conditions.drain(..excess);
    }
    gateway
}

#[derive(Debug, PartialEq, Eq)]
pub enum ReconcileDecision {
    /// The class belongs to the named controller.
    ForeignClass(String),
    Managed,
    AlreadyReady,
    Proceed { publish_service: Option<ResourceKey> },
}

/// Decides whether a Gateway needs its status computed, before anything is fetched from the data plane.
pub fn reconcile_decision(
    gateway_class: &GatewayClass,
    gateway: &KubeGateway,
    controller_name: &str,
    annotation: &str,
    default_publish_service: Option<&str>,
) -> Result<ReconcileDecision, ResourceKeyError> {
    if gateway_class.spec.controller_name != controller_name {
        return Ok(ReconcileDecision::ForeignClass(gateway_class.spec.controller_name.clone()));
    }
    if !is_in_class_and_unmanaged(gateway_class, gateway, controller_name, annotation) {
        return Ok(ReconcileDecision::Managed);
    }

    let unmanaged_mode = gateway.metadata.annotations.as_ref().and_then(|annotations| extract_unmanaged_gateway_mode(annotations, annotation));
    let publish_service = publish_service_from_annotation(unmanaged_mode.unwrap_or_default(), default_publish_service)?;
    if is_ready(gateway) {
        return Ok(ReconcileDecision::AlreadyReady);
    }
    Ok(ReconcileDecision::Proceed { publish_service })
}

fn is_listener_ready(listener_status: &GatewayStatusListeners) -> bool {
    has_condition(&listener_status.conditions, ConditionType::Ready, CONDITION_TRUE, ConditionReason::Ready)
}

pub fn update_gateway_status(mut gateway: KubeGateway, listener_statuses: Vec<GatewayStatusListeners>, now: &Time) -> KubeGateway {
    let generation = gateway.metadata.generation.unwrap_or_default();
    let scheduled = is_scheduled(&gateway);
    let all_listeners_ready = listener_statuses.iter().all(is_listener_ready);

    let mut status = gateway.status.take().unwrap_or_else(GatewayStatus::default);
    let previous_conditions = status.conditions.take().unwrap_or_default();

    let scheduled_condition = if scheduled {
        find_condition(&previous_conditions, ConditionType::Scheduled, CONDITION_TRUE, ConditionReason::Scheduled).cloned()
    } else {
        Some(GatewayCondition::Scheduled.to_condition(generation, &previous_conditions, now))
    };
    let readiness = if all_listeners_ready { GatewayCondition::Ready } else { GatewayCondition::ListenersNotReady };
    let own_conditions: Vec<_> = scheduled_condition.into_iter().chain([readiness.to_condition(generation, &previous_conditions, now)]).collect();

    // Conditions set by others give way first, oldest at the front.
    let is_own = |condition: &Condition| own_conditions.iter().any(|own| own.type_ == condition.type_);
    let others = previous_conditions.iter().filter(|&condition| !is_own(condition)).count();
    let mut excess = (others + own_conditions.len()).saturating_sub(MAX_CONDITIONS);
    let mut conditions = previous_conditions;
    conditions.retain(|condition| {
        if excess > 0 && !is_own(condition) {
            excess -= 1;
            false
        } else {
            true
        }
    });
    for condition in own_conditions {
        set_condition(&mut conditions, condition);
    }

    status.listeners = Some(listener_statuses);
    status.conditions = Some(conditions);
    gateway.status = Some(status);
    gateway.metadata.managed_fields = None;
    prune_status_conditions(gateway)
}

#[cfg(test)]
mod tests {
    use k8s_openapi::chrono::{TimeZone, Utc};

    use super::*;
    use crate::common::{
        test::{gateway_class, kube_gateway, outcome, triple, CONTROLLER_NAME},
        ListenerCondition,
    };

    fn at(seconds: i64) -> Time {
        Time(Utc.timestamp_opt(seconds, 0).unwrap())
    }

    fn gateway_with_conditions(generation: i64, conditions: &str) -> KubeGateway {
        kube_gateway(&format!(
            r"
apiVersion: gateway.networking.k8s.io/v1
kind: Gateway
metadata:
  name: kong
  namespace: kong
  generation: {generation}
  annotations:
    {UNMANAGED_GATEWAY_ANNOTATION}: 'true'
spec:
  gatewayClassName: kong
  listeners: []
status:
  conditions:
{conditions}"
        ))
    }

    fn condition(type_: &str, status: &str, reason: &str, generation: i64) -> String {
        format!(
            "  - type: {type_}\n    status: '{status}'\n    reason: {reason}\n    message: ''\n    observedGeneration: {generation}\n    lastTransitionTime: '2024-01-01T00:00:00Z'\n"
        )
    }

    fn numbered_conditions(count: usize) -> String {
        (0..count).map(|i| condition(&format!("Custom{i}"), "True", "Set", 1)).collect()
    }

    fn condition_types(gateway: &KubeGateway) -> Vec<String> {
        gateway_conditions(gateway).iter().map(|c| c.type_.clone()).collect()
    }

    #[test]
    fn prune_keeps_last_eight_in_order() {
        let gateway = prune_status_conditions(gateway_with_conditions(1, &numbered_conditions(12)));
        let expected: Vec<_> = (4..12).map(|i| format!("Custom{i}")).collect();
        assert_eq!(condition_types(&gateway), expected);

        let gateway = prune_status_conditions(gateway);
        assert_eq!(condition_types(&gateway), expected);
    }

    #[test]
    fn prune_leaves_short_lists_alone() {
        let gateway = gateway_with_conditions(1, &numbered_conditions(5));
        let before = condition_types(&gateway);
        let gateway = prune_status_conditions(gateway);
        assert_eq!(condition_types(&gateway), before);
        assert_eq!(before.len(), 5);
    }

    #[test]
    fn stale_ready_is_not_ready() {
        let gateway = gateway_with_conditions(4, &condition("Ready", "True", "Ready", 3));
        assert!(!is_ready(&gateway));
        let gateway = gateway_with_conditions(3, &condition("Ready", "True", "Ready", 3));
        assert!(is_ready(&gateway));
        let gateway = gateway_with_conditions(3, &condition("Ready", "False", "ListenersNotReady", 3));
        assert!(!is_ready(&gateway));
    }

    #[test]
    fn scheduled_ignores_generation() {
        let gateway = gateway_with_conditions(7, &condition("Scheduled", "True", "Scheduled", 1));
        assert!(is_scheduled(&gateway));
        let gateway = gateway_with_conditions(7, &condition("Scheduled", "False", "Scheduled", 7));
        assert!(!is_scheduled(&gateway));
        let gateway = gateway_with_conditions(7, &condition("Scheduled", "True", "Pending", 7));
        assert!(!is_scheduled(&gateway));
    }

    #[test]
    fn unmanaged_gateway_of_own_class() {
        let gateway = gateway_with_conditions(1, &numbered_conditions(1));
        let own = gateway_class("kong", CONTROLLER_NAME);
        let foreign = gateway_class("kong", "example.com/other-controller");
        assert!(is_in_class_and_unmanaged(&own, &gateway, CONTROLLER_NAME, UNMANAGED_GATEWAY_ANNOTATION));
        assert!(!is_in_class_and_unmanaged(&foreign, &gateway, CONTROLLER_NAME, UNMANAGED_GATEWAY_ANNOTATION));
        assert!(!is_in_class_and_unmanaged(&own, &gateway, CONTROLLER_NAME, "example.com/some-other-annotation"));

        let mut managed = gateway;
        managed.metadata.annotations = None;
        assert!(!is_in_class_and_unmanaged(&own, &managed, CONTROLLER_NAME, UNMANAGED_GATEWAY_ANNOTATION));
    }

    #[test]
    fn publish_service_resolution() {
        assert_eq!(publish_service_from_annotation("true", Some("kong/kong-proxy")).unwrap(), Some(ResourceKey::from_namespaced_name("kong/kong-proxy").unwrap()));
        assert_eq!(publish_service_from_annotation("", None).unwrap(), None);
        let key = publish_service_from_annotation("infra/proxy", Some("kong/kong-proxy")).unwrap().unwrap();
        assert_eq!((key.namespace.as_str(), key.name.as_str()), ("infra", "proxy"));
        assert!(publish_service_from_annotation("infra/proxy/extra", None).is_err());
        assert!(publish_service_from_annotation("proxy", None).is_err());
    }

    #[test]
    fn reconcile_decision_branches() {
        let own = gateway_class("kong", CONTROLLER_NAME);
        let foreign = gateway_class("kong", "example.com/other-controller");
        let decide = |class: &GatewayClass, gateway: &KubeGateway| {
            reconcile_decision(class, gateway, CONTROLLER_NAME, UNMANAGED_GATEWAY_ANNOTATION, Some("kong/kong-proxy"))
        };

        let pending = gateway_with_conditions(2, &numbered_conditions(1));
        assert_eq!(decide(&foreign, &pending), Ok(ReconcileDecision::ForeignClass("example.com/other-controller".to_owned())));
        assert_eq!(
            decide(&own, &pending),
            Ok(ReconcileDecision::Proceed { publish_service: Some(ResourceKey::from_namespaced_name("kong/kong-proxy").unwrap()) })
        );

        let mut managed = pending.clone();
        managed.metadata.annotations = None;
        assert_eq!(decide(&own, &managed), Ok(ReconcileDecision::Managed));
        assert_eq!(decide(&foreign, &managed), Ok(ReconcileDecision::ForeignClass("example.com/other-controller".to_owned())));

        let mut malformed = pending.clone();
        malformed.metadata.annotations = Some(BTreeMap::from([(UNMANAGED_GATEWAY_ANNOTATION.to_owned(), "infra/proxy/extra".to_owned())]));
        assert_eq!(decide(&own, &malformed), Err(ResourceKeyError::NotNamespacedName("infra/proxy/extra".to_owned())));

        let mut explicit = pending;
        explicit.metadata.annotations = Some(BTreeMap::from([(UNMANAGED_GATEWAY_ANNOTATION.to_owned(), "infra/proxy".to_owned())]));
        assert_eq!(
            decide(&own, &explicit),
            Ok(ReconcileDecision::Proceed { publish_service: Some(ResourceKey::from_namespaced_name("infra/proxy").unwrap()) })
        );
        assert_eq!(
            reconcile_decision(&own, &explicit, CONTROLLER_NAME, "example.com/some-other-annotation", None),
            Ok(ReconcileDecision::Managed)
        );
    }

    #[test]
    fn ready_gateway_is_skipped_until_its_generation_moves() {
        let own = gateway_class("kong", CONTROLLER_NAME);
        let ready = gateway_with_conditions(3, &condition("Ready", "True", "Ready", 3));
        assert_eq!(reconcile_decision(&own, &ready, CONTROLLER_NAME, UNMANAGED_GATEWAY_ANNOTATION, None), Ok(ReconcileDecision::AlreadyReady));

        let stale = gateway_with_conditions(4, &condition("Ready", "True", "Ready", 3));
        assert_eq!(
            reconcile_decision(&own, &stale, CONTROLLER_NAME, UNMANAGED_GATEWAY_ANNOTATION, None),
            Ok(ReconcileDecision::Proceed { publish_service: None })
        );

        let mut malformed = ready;
        malformed.metadata.annotations = Some(BTreeMap::from([(UNMANAGED_GATEWAY_ANNOTATION.to_owned(), "proxy".to_owned())]));
        assert!(reconcile_decision(&own, &malformed, CONTROLLER_NAME, UNMANAGED_GATEWAY_ANNOTATION, None).is_err());
    }

    #[test]
    fn status_assembly_schedules_and_reports_readiness() {
        let gateway = gateway_with_conditions(2, &numbered_conditions(0));
        let ready_listener = GatewayStatusListeners {
            name: "web".to_owned(),
            attached_routes: 0,
            supported_kinds: vec![],
            conditions: vec![ListenerCondition::NotConflicted.to_condition(2, &[], &at(1)), ListenerCondition::Ready.to_condition(2, &[], &at(1))],
        };
        let gateway = update_gateway_status(gateway, vec![ready_listener.clone()], &at(5));
        assert!(is_scheduled(&gateway));
        assert!(is_ready(&gateway));
        assert_eq!(outcome(gateway_conditions(&gateway)), vec![triple("Ready", "True", "Ready"), triple("Scheduled", "True", "Scheduled")]);
        assert!(gateway.metadata.managed_fields.is_none());

        let pending_listener = GatewayStatusListeners {
            name: "web-tls".to_owned(),
            conditions: vec![ListenerCondition::NotReady.to_condition(2, &[], &at(1))],
            ..ready_listener.clone()
        };
        let gateway = update_gateway_status(gateway, vec![ready_listener, pending_listener], &at(9));
        assert!(!is_ready(&gateway));
        assert_eq!(outcome(gateway_conditions(&gateway)), vec![
            triple("Ready", "False", "ListenersNotReady"),
            triple("Scheduled", "True", "Scheduled")
        ]);
        let scheduled = find_condition(gateway_conditions(&gateway), ConditionType::Scheduled, CONDITION_TRUE, ConditionReason::Scheduled).unwrap();
        assert_eq!(scheduled.last_transition_time, at(5));
        assert_eq!(gateway.status.as_ref().and_then(|s| s.listeners.as_ref()).map(Vec::len), Some(2));
    }

    #[test]
    fn status_assembly_respects_condition_limit() {
        let gateway = gateway_with_conditions(1, &numbered_conditions(MAX_CONDITIONS));
        let gateway = update_gateway_status(gateway, vec![], &at(1));
        let types = condition_types(&gateway);
        assert_eq!(types.len(), MAX_CONDITIONS);
        assert_eq!(types[MAX_CONDITIONS - 2..], ["Scheduled".to_owned(), "Ready".to_owned()]);
    }

    #[test]
    fn condition_limit_never_drops_existing_scheduled() {
        let conditions = condition("Scheduled", "True", "Scheduled", 1) + &numbered_conditions(MAX_CONDITIONS);
        let gateway = update_gateway_status(gateway_with_conditions(2, &conditions), vec![], &at(50));
        let types = condition_types(&gateway);
        assert_eq!(types.len(), MAX_CONDITIONS);
        assert_eq!(types[0], "Scheduled");
        assert_eq!(types[1..MAX_CONDITIONS - 1], (2..MAX_CONDITIONS).map(|i| format!("Custom{i}")).collect::<Vec<_>>()[..]);
        assert_eq!(types[MAX_CONDITIONS - 1], "Ready");
        assert!(is_scheduled(&gateway));
        assert!(is_ready(&gateway));

        let scheduled = find_condition(gateway_conditions(&gateway), ConditionType::Scheduled, CONDITION_TRUE, ConditionReason::Scheduled).unwrap();
        assert_eq!(scheduled.last_transition_time, Time(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()));
        assert_eq!(scheduled.observed_generation, Some(1));
    }
}
