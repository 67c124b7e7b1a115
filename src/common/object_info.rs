// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//

use std::{collections::BTreeMap, fmt::Display};

use kube::{
    core::{DynamicObject, GroupVersion, GroupVersionKind},
    Resource, ResourceExt,
};

/// Flattened description of a cluster object, detached from the object itself.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ObjectInfo {
    pub name: String,
    pub namespace: String,
    pub annotations: BTreeMap<String, String>,
    pub group_version_kind: Option<GroupVersionKind>,
}

impl ObjectInfo {
    pub fn from_resource<K>(object: &K) -> Self
    where
        K: Resource<DynamicType = ()>,
    {
        Self {
            name: object.name_any(),
            namespace: object.namespace().unwrap_or_default(),
            annotations: object.annotations().clone(),
            group_version_kind: Some(GroupVersionKind::gvk(&K::group(&()), &K::version(&()), &K::kind(&()))),
        }
    }

    pub fn from_dynamic(object: &DynamicObject) -> Self {
        let group_version_kind = object
            .types
            .as_ref()
            .and_then(|types| types.api_version.parse::<GroupVersion>().ok().map(|group_version| group_version.with_kind(&types.kind)));

        Self {
            name: object.name_any(),
            namespace: object.namespace().unwrap_or_default(),
            annotations: object.annotations().clone(),
            group_version_kind,
        }
    }
}

impl Display for ObjectInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.group_version_kind {
            Some(gvk) => write!(f, "{}/{} {} {}.{}", gvk.group, gvk.version, gvk.kind, self.namespace, self.name),
            None => write!(f, "<unknown kind> {}.{}", self.namespace, self.name),
        }
    }
}
