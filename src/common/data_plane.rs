// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//

use std::fmt::Display;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use typed_builder::TypedBuilder;

use super::ProtocolType;

/// One (protocol, port) pair the proxy is actually configured to accept.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, TypedBuilder, Deserialize)]
pub struct DataPlaneListen {
    pub protocol: ProtocolType,
    pub port: i32,
}

impl Display for DataPlaneListen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.protocol, self.port)
    }
}

#[derive(Error, Debug)]
pub enum DataPlaneError {
    #[error("data plane listens are not available {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait DataPlaneListens {
    async fn listens(&self) -> Result<Vec<DataPlaneListen>, DataPlaneError>;
}

/// Serves the listen set the data plane was deployed with.
#[derive(Clone, Debug)]
pub struct StaticDataPlaneListens {
    listens: Vec<DataPlaneListen>,
}

impl StaticDataPlaneListens {
    pub fn new(listens: Vec<DataPlaneListen>) -> Self {
        Self { listens }
    }
}

#[async_trait]
impl DataPlaneListens for StaticDataPlaneListens {
    async fn listens(&self) -> Result<Vec<DataPlaneListen>, DataPlaneError> {
        Ok(self.listens.clone())
    }
}
