// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//

mod conditions;
mod data_plane;
mod gateway;
mod listener;
mod object_info;
mod resource_key;

pub use conditions::{
    find_condition, has_condition, set_condition, ConditionReason, ConditionType, ConflictReason, DetachedReason, GatewayCondition,
    ListenerCondition, ListenerConditions, CONDITION_FALSE, CONDITION_TRUE,
};
pub use data_plane::{DataPlaneError, DataPlaneListen, DataPlaneListens, StaticDataPlaneListens};
pub use gateway::{Gateway, GatewayError};
pub use gateway_api::apis::standard::gateways::Gateway as KubeGateway;
pub use listener::{Listener, ListenerError, ProtocolType, PORT_RANGE};
pub use object_info::ObjectInfo;
pub use resource_key::{ResourceKey, ResourceKeyError, DEFAULT_GROUP_NAME};
