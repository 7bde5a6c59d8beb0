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

//! Subtree lookup and chart data.
//!
//! A chart shows the children of one trait as doughnut slices. The trait is
//! addressed by id; wrapper nodes with a single payload child resolve to
//! that child, so `needs` charts the individual needs rather than the one
//! grouping node under it.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::format::format_ratio;
use crate::profile::ProfileNode;

const DEFAULT_COLORS: [&str; 6] = [
    "#F7464A", "#46BFBD", "#FDB45C", "#949FB1", "#4D5360", "#7D4F6D",
];

const DEFAULT_HIGHLIGHTS: [&str; 6] = [
    "#FF5A5E", "#5AD3D1", "#FFC870", "#A8B3C5", "#616774", "#9D6F8D",
];

/// Colors for one slice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteEntry {
    pub color: String,
    pub highlight: String,
}

/// Static styling handed to the client-side chart library untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartOptions {
    pub segment_show_stroke: bool,
    pub segment_stroke_color: String,
    pub segment_stroke_width: u32,
    pub percentage_inner_cutout: u32,
    pub animation_steps: u32,
    pub animation_easing: String,
    pub animate_rotate: bool,
    pub animate_scale: bool,
    pub responsive: bool,
    pub tooltip_template: String,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            segment_show_stroke: true,
            segment_stroke_color: "#fff".to_string(),
            segment_stroke_width: 2,
            percentage_inner_cutout: 50,
            animation_steps: 100,
            animation_easing: "easeOutBounce".to_string(),
            animate_rotate: true,
            animate_scale: false,
            responsive: true,
            tooltip_template: "<%if (label){%><%=label%>: <%}%><%= value %>%".to_string(),
        }
    }
}

/// Palettes plus options. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartStyle {
    colors: Vec<String>,
    highlights: Vec<String>,
    options: ChartOptions,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            colors: DEFAULT_COLORS.iter().map(|c| c.to_string()).collect(),
            highlights: DEFAULT_HIGHLIGHTS.iter().map(|c| c.to_string()).collect(),
            options: ChartOptions::default(),
        }
    }
}

impl ChartStyle {
    /// Custom palettes. Returns `None` if either palette is empty.
    pub fn with_palettes(colors: Vec<String>, highlights: Vec<String>) -> Option<Self> {
        if colors.is_empty() || highlights.is_empty() {
            return None;
        }
        Some(Self {
            colors,
            highlights,
            options: ChartOptions::default(),
        })
    }

    pub fn options(&self) -> &ChartOptions {
        &self.options
    }

    /// Colors for the slice at `index`; palettes repeat.
    pub fn entry(&self, index: usize) -> PaletteEntry {
        PaletteEntry {
            color: self.colors[index % self.colors.len()].clone(),
            highlight: self.highlights[index % self.highlights.len()].clone(),
        }
    }
}

/// One doughnut slice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSlice {
    /// Score times 100 with two decimals, no percent sign.
    pub value: String,
    pub color: String,
    pub highlight: String,
    pub label: String,
}

/// Slices plus the fixed options bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub slices: Vec<ChartSlice>,
    pub options: ChartOptions,
    /// Ids of children left out because they carried no score.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<String>,
}

/// Find the first node with `target` id in pre-order over `children`.
///
/// A match with exactly one child resolves to that child. A miss is `None`.
pub fn locate<'t>(target: &str, children: &'t [ProfileNode]) -> Option<&'t ProfileNode> {
    let found = find(target, children)?;
    match found.children() {
        [only] => Some(only),
        _ => Some(found),
    }
}

fn find<'t>(target: &str, nodes: &'t [ProfileNode]) -> Option<&'t ProfileNode> {
    for node in nodes {
        if node.id == target {
            return Some(node);
        }
        if let Some(hit) = find(target, node.children()) {
            return Some(hit);
        }
    }
    None
}

/// Build chart slices from `node`'s children.
///
/// Children without a percentage are skipped and reported in
/// [`ChartData::skipped`]. Colors follow the child's position among all
/// children, skipped ones included.
pub fn chart_data(node: &ProfileNode, style: &ChartStyle) -> ChartData {
    let mut slices = Vec::with_capacity(node.children().len());
    let mut skipped = Vec::new();

    for (index, child) in node.children().iter().enumerate() {
        let Some(percentage) = child.percentage else {
            skipped.push(child.id.clone());
            continue;
        };
        let PaletteEntry { color, highlight } = style.entry(index);
        slices.push(ChartSlice {
            value: format_ratio(percentage),
            color,
            highlight,
            label: child.name.clone(),
        });
    }

    if !skipped.is_empty() {
        warn!(
            node = %node.id,
            skipped = ?skipped,
            "Chart children without a percentage were left out"
        );
    }

    ChartData {
        slices,
        options: style.options().clone(),
        skipped,
    }
}
