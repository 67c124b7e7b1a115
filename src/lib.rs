// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//

use std::sync::Arc;

use kube::Client;
use tracing::info;

pub mod common;
pub mod configuration;
pub mod controllers;

pub use configuration::Configuration;

use crate::{
    common::StaticDataPlaneListens,
    controllers::gateway::{GatewayController, GatewayControllerContext},
};

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Result<T> = std::result::Result<T, Error>;

pub async fn start(configuration: Configuration) -> Result<()> {
    info!("Gateway status reconciler started {}", configuration.controller_name);
    let client = Client::try_default().await?;

    let data_plane = StaticDataPlaneListens::new(configuration.data_plane.listens.clone());
    let gateway_controller = GatewayController::builder()
        .ctx(Arc::new(
            GatewayControllerContext::builder()
                .client(client)
                .controller_name(configuration.controller_name.clone())
                .unmanaged_annotation(configuration.unmanaged_annotation().to_owned())
                .publish_service(configuration.publish_service.clone())
                .data_plane(Arc::new(data_plane))
                .build(),
        ))
        .build();

    info!("Gateway controller...started");
    gateway_controller.get_controller().await;
    info!("Gateway controller...stopped");
    Ok(())
}
