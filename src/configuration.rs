// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//

use serde::Deserialize;
use thiserror::Error;
use typed_builder::TypedBuilder;

use crate::{
    common::{DataPlaneListen, ResourceKey, PORT_RANGE},
    controllers::utils::UNMANAGED_GATEWAY_ANNOTATION,
    Result,
};

#[derive(Clone, Debug, Default, TypedBuilder, Deserialize)]
pub struct DataPlaneConfiguration {
    #[serde(default)]
    #[builder(default)]
    pub listens: Vec<DataPlaneListen>,
}

#[derive(Debug, TypedBuilder, Deserialize)]
pub struct Configuration {
    pub controller_name: String,
    #[builder(default)]
    pub unmanaged_annotation: Option<String>,
    /// `namespace/name` of the proxy Service used when the unmanaged annotation does not name one.
    #[builder(default)]
    pub publish_service: Option<String>,
    #[serde(default)]
    #[builder(default)]
    pub data_plane: DataPlaneConfiguration,
}

#[derive(Error, Debug)]
enum ConfigurationError {
    #[error("controller name must be not empty")]
    ControllerName,
    #[error("unmanaged annotation must be not empty")]
    UnmanagedAnnotation,
    #[error("publish service must be in 'namespace/name' format but got {0}")]
    PublishService(String),
    #[error("data plane listen {0} has a port outside of 1-65535")]
    DataPlaneListen(String),
}

impl Configuration {
    pub fn validate(&self) -> Result<()> {
        if self.controller_name.is_empty() {
            return Err(ConfigurationError::ControllerName.into());
        }
        if self.unmanaged_annotation.as_deref().is_some_and(str::is_empty) {
            return Err(ConfigurationError::UnmanagedAnnotation.into());
        }
        if let Some(publish_service) = &self.publish_service {
            if ResourceKey::from_namespaced_name(publish_service).is_err() {
                return Err(ConfigurationError::PublishService(publish_service.clone()).into());
            }
        }
        if let Some(listen) = self.data_plane.listens.iter().find(|listen| !PORT_RANGE.contains(&listen.port)) {
            return Err(ConfigurationError::DataPlaneListen(listen.to_string()).into());
        }
        Ok(())
    }

    pub fn unmanaged_annotation(&self) -> &str {
        self.unmanaged_annotation.as_deref().unwrap_or(UNMANAGED_GATEWAY_ANNOTATION)
    }
}
