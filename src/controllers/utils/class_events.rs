// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//

use gateway_api::apis::standard::gatewayclasses::GatewayClass;
use kube::{core::DynamicObject, ResourceExt};
use thiserror::Error;
use tracing::{debug, error};

use crate::common::{KubeGateway, ObjectInfo, ResourceKey};

const GATEWAY_CLASS_KIND: &str = "GatewayClass";

#[derive(Clone, Debug)]
pub enum WatchEvent<K> {
    Create(K),
    Update { old: K, new: K },
    Delete(K),
    Generic(K),
}

impl<K> WatchEvent<K> {
    pub fn objects(&self) -> Vec<&K> {
        match self {
            WatchEvent::Create(object) | WatchEvent::Delete(object) | WatchEvent::Generic(object) => vec![object],
            WatchEvent::Update { old, new } => vec![old, new],
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PayloadError {
    #[error("expected a GatewayClass but got {0}")]
    NotGatewayClass(String),
    #[error("GatewayClass {0} has no controller name")]
    MissingControllerName(String),
}

/// Anything a GatewayClass watch can hand over.
pub trait ClassPayload {
    fn controller_name(&self) -> Result<&str, PayloadError>;
    fn object_info(&self) -> ObjectInfo;
}

impl ClassPayload for GatewayClass {
    fn controller_name(&self) -> Result<&str, PayloadError> {
        Ok(&self.spec.controller_name)
    }

    fn object_info(&self) -> ObjectInfo {
        ObjectInfo::from_resource(self)
    }
}

impl ClassPayload for DynamicObject {
    fn controller_name(&self) -> Result<&str, PayloadError> {
        let kind = self.types.as_ref().map(|types| types.kind.as_str()).unwrap_or_default();
        if kind != GATEWAY_CLASS_KIND {
            return Err(PayloadError::NotGatewayClass(if kind.is_empty() { "an object without type information".to_owned() } else { kind.to_owned() }));
        }

        self.data
            .pointer("/spec/controllerName")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| PayloadError::MissingControllerName(self.name_any()))
    }

    fn object_info(&self) -> ObjectInfo {
        ObjectInfo::from_dynamic(self)
    }
}

/// True when the old or the new class of the event belongs to `controller_name`. Payloads that are not
/// GatewayClasses are logged and ignored.
pub fn is_class_event_relevant<K: ClassPayload>(controller_name: &str, event: &WatchEvent<K>) -> bool {
    event.objects().into_iter().any(|object| match object.controller_name() {
        Ok(name) => name == controller_name,
        Err(e) => {
            error!("Ignoring class event for {} {e}", object.object_info());
            false
        },
    })
}

/// Gateways referencing `gateway_class`, in input order.
pub fn requests_for_class<'a>(gateway_class: &GatewayClass, gateways: impl IntoIterator<Item = &'a KubeGateway>) -> Vec<ResourceKey> {
    let class_name = gateway_class.name_any();
    let requests: Vec<_> = gateways.into_iter().filter(|gateway| gateway.spec.gateway_class_name == class_name).map(ResourceKey::from).collect();
    debug!("GatewayClass {class_name} requests reconciliation of {} gateways", requests.len());
    requests
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::test::{gateway_class, kube_gateway, CONTROLLER_NAME};

    fn dynamic(m: &str) -> DynamicObject {
        serde_yaml::from_str(m).unwrap()
    }

    fn gateway(name: &str, namespace: &str, class_name: &str) -> KubeGateway {
        kube_gateway(&format!(
            r"
apiVersion: gateway.networking.k8s.io/v1
kind: Gateway
metadata:
  name: {name}
  namespace: {namespace}
spec:
  gatewayClassName: {class_name}
  listeners: []
"
        ))
    }

    #[test]
    fn event_objects() {
        let own = gateway_class("kong", CONTROLLER_NAME);
        let other = gateway_class("other", "example.com/other-controller");
        assert_eq!(WatchEvent::Create(own.clone()).objects().len(), 1);
        assert_eq!(WatchEvent::Delete(own.clone()).objects().len(), 1);
        assert_eq!(WatchEvent::Generic(own.clone()).objects().len(), 1);
        let update = WatchEvent::Update { old: own, new: other };
        let names: Vec<_> = update.objects().into_iter().map(ResourceExt::name_any).collect();
        assert_eq!(names, vec!["kong", "other"]);
    }

    #[test]
    fn typed_class_events() {
        let own = gateway_class("kong", CONTROLLER_NAME);
        let other = gateway_class("other", "example.com/other-controller");

        assert!(is_class_event_relevant(CONTROLLER_NAME, &WatchEvent::Create(own.clone())));
        assert!(!is_class_event_relevant(CONTROLLER_NAME, &WatchEvent::Delete(other.clone())));
        assert!(is_class_event_relevant(CONTROLLER_NAME, &WatchEvent::Update { old: other.clone(), new: own.clone() }));
        assert!(is_class_event_relevant(CONTROLLER_NAME, &WatchEvent::Update { old: own, new: other.clone() }));
        assert!(!is_class_event_relevant(CONTROLLER_NAME, &WatchEvent::Update { old: other.clone(), new: other }));
    }

    #[test]
    fn dynamic_class_events() {
        let own = dynamic(&format!(
            r"
apiVersion: gateway.networking.k8s.io/v1
kind: GatewayClass
metadata:
  name: kong
spec:
  controllerName: {CONTROLLER_NAME}
"
        ));
        let config_map = dynamic(
            r"
apiVersion: v1
kind: ConfigMap
metadata:
  name: settings
  namespace: kong
data:
  controllerName: example.com/gateway-controller
",
        );
        let incomplete = dynamic(
            r"
apiVersion: gateway.networking.k8s.io/v1
kind: GatewayClass
metadata:
  name: broken
spec: {}
",
        );

        assert_eq!(own.controller_name(), Ok(CONTROLLER_NAME));
        assert_eq!(config_map.controller_name(), Err(PayloadError::NotGatewayClass("ConfigMap".to_owned())));
        assert_eq!(incomplete.controller_name(), Err(PayloadError::MissingControllerName("broken".to_owned())));

        assert!(is_class_event_relevant(CONTROLLER_NAME, &WatchEvent::Generic(own.clone())));
        assert!(!is_class_event_relevant(CONTROLLER_NAME, &WatchEvent::Generic(config_map.clone())));
        assert!(!is_class_event_relevant(CONTROLLER_NAME, &WatchEvent::Create(incomplete)));
        assert!(is_class_event_relevant(CONTROLLER_NAME, &WatchEvent::Update { old: config_map, new: own }));
    }

    #[test]
    fn class_fans_out_to_its_gateways() {
        let class = gateway_class("kong", CONTROLLER_NAME);
        let gateways = [gateway("b", "team-b", "kong"), gateway("x", "team-x", "other"), gateway("a", "team-a", "kong")];
        let requests = requests_for_class(&class, &gateways);
        assert_eq!(requests, vec![ResourceKey::namespaced("b", "team-b"), ResourceKey::namespaced("a", "team-a")]);

        let unused = gateway_class("unused", CONTROLLER_NAME);
        assert!(requests_for_class(&unused, &gateways).is_empty());
    }
}
