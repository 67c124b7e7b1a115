// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//

use std::sync::Arc;

use futures::{future::BoxFuture, FutureExt, StreamExt};
use gateway_api::apis::standard::gatewayclasses::GatewayClass;
use k8s_openapi::{apimachinery::pkg::apis::meta::v1::Time, chrono::Utc};
use kube::{
    api::{Patch, PatchParams},
    runtime::{controller::Action, reflector::ObjectRef, watcher::Config, Controller},
    Api, Client, Resource,
};
use tracing::{debug, info, warn};
use typed_builder::TypedBuilder;
use uuid::Uuid;

use super::{
    utils::{
        is_class_event_relevant, reconcile_decision, requests_for_class, update_gateway_status, ListenerStatusResolver, ReconcileDecision,
        WatchEvent,
    },
    ControllerError, RECONCILE_ERROR_WAIT, RECONCILE_LONG_WAIT,
};
use crate::common::{DataPlaneListens, Gateway, KubeGateway};

type Result<T, E = ControllerError> = std::result::Result<T, E>;

#[derive(TypedBuilder)]
pub struct GatewayControllerContext {
    controller_name: String,
    client: Client,
    unmanaged_annotation: String,
    #[builder(default)]
    publish_service: Option<String>,
    data_plane: Arc<dyn DataPlaneListens + Send + Sync>,
}

#[derive(TypedBuilder)]
pub struct GatewayController {
    ctx: Arc<GatewayControllerContext>,
}

impl GatewayController {
    pub fn get_controller(&self) -> BoxFuture<'static, ()> {
        let client = self.ctx.client.clone();
        let controller_name = self.ctx.controller_name.clone();
        let controller = Controller::new(Api::<KubeGateway>::all(client.clone()), Config::default());
        let store = controller.store();

        controller
            .watches(Api::<GatewayClass>::all(client), Config::default(), move |gateway_class| {
                // The watch hands over only the current class, never an old/new pair. A class that moved away
                // from this controller is therefore not fanned out.
                if !is_class_event_relevant(&controller_name, &WatchEvent::Generic(gateway_class.clone())) {
                    return vec![];
                }
                let gateways = store.state();
                requests_for_class(&gateway_class, gateways.iter().map(Arc::as_ref))
                    .into_iter()
                    .map(|key| ObjectRef::new(&key.name).within(&key.namespace))
                    .collect()
            })
            .run(Self::reconcile_gateway, Self::error_policy, Arc::clone(&self.ctx))
            .for_each(|_| futures::future::ready(()))
            .boxed()
    }

    #[allow(clippy::needless_pass_by_value)]
    fn error_policy<T>(_object: Arc<T>, err: &ControllerError, _ctx: Arc<GatewayControllerContext>) -> Action {
        match err {
            ControllerError::PatchFailed | ControllerError::InvalidPayload(_) => Action::requeue(RECONCILE_LONG_WAIT),
            ControllerError::UnknownGatewayClass(_) | ControllerError::BackendError => Action::requeue(RECONCILE_ERROR_WAIT),
        }
    }

    async fn reconcile_gateway(resource: Arc<KubeGateway>, ctx: Arc<GatewayControllerContext>) -> Result<Action> {
        let Some(name) = resource.meta().name.clone() else {
            return Err(ControllerError::InvalidPayload("Resource name is not provided".to_owned()));
        };

        let Some(maybe_id) = resource.metadata.uid.clone() else {
            return Err(ControllerError::InvalidPayload("Uid must be present".to_owned()));
        };

        let Ok(id) = Uuid::parse_str(&maybe_id) else {
            return Err(ControllerError::InvalidPayload("Uid in wrong format".to_owned()));
        };

        let gateway_class_name = &resource.spec.gateway_class_name;
        let log_context = LogContext {
            controller_name: &ctx.controller_name,
            gateway_class_name,
            id,
            name: &name,
            version: resource.meta().resource_version.clone(),
        };

        let gateway_class = match Api::<GatewayClass>::all(ctx.client.clone()).get_opt(gateway_class_name).await {
            Ok(Some(gateway_class)) => gateway_class,
            Ok(None) => {
                warn!("{log_context} Unknown gateway class name {gateway_class_name}");
                return Err(ControllerError::UnknownGatewayClass(gateway_class_name.clone()));
            },
            Err(e) => {
                warn!("{log_context} Can't fetch gateway class {gateway_class_name} {e:?}");
                return Err(ControllerError::BackendError);
            },
        };

        let decision = reconcile_decision(&gateway_class, &resource, &ctx.controller_name, &ctx.unmanaged_annotation, ctx.publish_service.as_deref())
            .map_err(|e| {
                warn!("{log_context} Invalid publish service {e}");
                ControllerError::InvalidPayload(e.to_string())
            })?;
        match decision {
            ReconcileDecision::ForeignClass(owner) => {
                debug!("{log_context} Gateway class is owned by {owner}");
                return Ok(Action::await_change());
            },
            ReconcileDecision::Managed => {
                debug!("{log_context} Gateway is not in unmanaged mode");
                return Ok(Action::await_change());
            },
            ReconcileDecision::AlreadyReady => {
                debug!("{log_context} Gateway is ready for its current generation");
                return Ok(Action::requeue(RECONCILE_LONG_WAIT));
            },
            ReconcileDecision::Proceed { publish_service: Some(publish_service) } => debug!("{log_context} Publish service {publish_service}"),
            ReconcileDecision::Proceed { publish_service: None } => (),
        }

        let data_plane_listens = ctx.data_plane.listens().await.map_err(|e| {
            warn!("{log_context} {e}");
            ControllerError::BackendError
        })?;
        debug!("{log_context} Data plane listens {}", data_plane_listens.iter().map(ToString::to_string).collect::<Vec<_>>().join(", "));

        let gateway = Gateway::try_from(resource.as_ref()).map_err(|e| {
            warn!("{log_context} {e}");
            ControllerError::InvalidPayload(e.to_string())
        })?;

        let now = Time(Utc::now());
        let listener_statuses = ListenerStatusResolver::new(&gateway, &data_plane_listens).with_time(now.clone()).resolve();
        let updated_gateway = update_gateway_status(resource.as_ref().clone(), listener_statuses, &now);

        let api = Api::<KubeGateway>::namespaced(ctx.client.clone(), gateway.namespace());
        match api.patch_status(&name, &PatchParams::apply(&ctx.controller_name).force(), &Patch::Apply(&updated_gateway)).await {
            Ok(_) => {
                info!("{log_context} Status updated for {gateway}");
                Ok(Action::requeue(RECONCILE_LONG_WAIT))
            },
            Err(e) => {
                warn!("{log_context} Status patch failed {e:?}");
                Err(ControllerError::PatchFailed)
            },
        }
    }
}

struct LogContext<'a> {
    controller_name: &'a str,
    gateway_class_name: &'a str,
    id: Uuid,
    name: &'a str,
    version: Option<String>,
}

impl std::fmt::Display for LogContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "reconcile_gateway: controller_name: {} gateway_class_name: {} id: {}, name: {} version: {:?}",
            self.controller_name, self.gateway_class_name, self.id, self.name, self.version
        )
    }
}
