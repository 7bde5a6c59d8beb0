// Copyright 2025 Sushanth (https://github.com/sushanthpy)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Tree flattening for outline rendering.
//!
//! The profile tree is walked in pre-order and every node becomes a
//! [`DisplayItem`] carrying its tier, its formatted score, an optional chart
//! link and its header/subheader/leaf classification. Hidden tiers are
//! dropped last, so they still count towards their descendants' tiers.

use serde::{Deserialize, Serialize};

use crate::format::format_percentage;
use crate::policy::DisplayPolicy;
use crate::profile::ProfileNode;

/// Per-request inputs of [`flatten`].
#[derive(Debug, Clone, Copy)]
pub struct FlattenContext<'a> {
    pub policy: &'a DisplayPolicy,
    /// Public base URL chart links are built on, e.g. `http://localhost:3000`.
    pub base_url: &'a str,
    pub session_id: &'a str,
}

impl<'a> FlattenContext<'a> {
    pub fn new(policy: &'a DisplayPolicy, base_url: &'a str, session_id: &'a str) -> Self {
        Self {
            policy,
            base_url,
            session_id,
        }
    }

    /// `{base}/getGraph/{id}?sessionId={session}`
    pub fn graph_url(&self, id: &str) -> String {
        format!(
            "{}/getGraph/{}?sessionId={}",
            self.base_url.trim_end_matches('/'),
            id,
            self.session_id
        )
    }
}

/// One row of the flattened outline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayItem {
    pub id: String,
    pub name: String,
    /// Formatted score, absent when the node has none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// 1-based tier.
    pub depth: u32,
    pub has_children: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graph_url: Option<String>,
    pub show_graph: bool,
    pub is_header: bool,
    pub is_subheader: bool,
    pub is_leaf: bool,
}

impl DisplayItem {
    fn from_node(node: &ProfileNode, depth: u32, ctx: &FlattenContext<'_>) -> Self {
        let has_children = node.has_children_field();
        let tiers = &ctx.policy.tiers;
        let graph_url = ctx
            .policy
            .is_chartable(&node.id)
            .then(|| ctx.graph_url(&node.id));

        Self {
            id: node.id.clone(),
            name: node.name.clone(),
            value: node.percentage.map(format_percentage),
            depth,
            has_children,
            show_graph: graph_url.is_some(),
            graph_url,
            is_header: tiers.is_header(depth),
            is_subheader: tiers.is_subheader(depth, has_children),
            is_leaf: tiers.is_leaf(depth, has_children),
        }
    }
}

/// Pre-order walk of `children` and all their descendants, paired with each
/// node's 1-based tier.
pub fn preorder(children: &[ProfileNode]) -> Vec<(u32, &ProfileNode)> {
    let mut out = Vec::new();
    walk(children, 1, &mut out);
    out
}

fn walk<'t>(nodes: &'t [ProfileNode], depth: u32, out: &mut Vec<(u32, &'t ProfileNode)>) {
    for node in nodes {
        out.push((depth, node));
        walk(node.children(), depth + 1, out);
    }
}

/// Flatten the root's children into display order.
///
/// The root itself is never emitted. An empty slice gives an empty outline.
pub fn flatten(children: &[ProfileNode], ctx: &FlattenContext<'_>) -> Vec<DisplayItem> {
    preorder(children)
        .into_iter()
        .map(|(depth, node)| DisplayItem::from_node(node, depth, ctx))
        .filter(|item| !ctx.policy.tiers.is_hidden(item.depth))
        .collect()
}
