// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//

mod class_events;
mod gateway_state;
mod listener_status_resolver;

pub use class_events::{is_class_event_relevant, requests_for_class, ClassPayload, PayloadError, WatchEvent};
pub use gateway_state::{
    extract_unmanaged_gateway_mode, is_in_class_and_unmanaged, is_ready, is_scheduled, prune_status_conditions, publish_service_from_annotation,
    reconcile_decision, update_gateway_status, ReconcileDecision, MAX_CONDITIONS, UNMANAGED_GATEWAY_ANNOTATION,
};
pub use listener_status_resolver::{supported_kinds, ListenerStatusResolver, SUPPORTED_ROUTE_KINDS};
