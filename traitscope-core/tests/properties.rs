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

//! Property tests for the outline and chart transformations.

use proptest::prelude::*;
use traitscope_core::{
    chart_data, flatten, locate, preorder, ChartStyle, DisplayPolicy, FlattenContext, ProfileNode,
};

fn arb_children() -> impl Strategy<Value = Option<Vec<ProfileNode>>> {
    let leaf = (prop::option::of(0.0f64..=1.0), any::<bool>()).prop_map(|(p, empty)| {
        let mut node = ProfileNode::new("", "leaf");
        node.percentage = p;
        if empty {
            node.children = Some(vec![]);
        }
        node
    });

    let node = leaf.prop_recursive(5, 64, 4, |inner| {
        (
            prop::option::of(0.0f64..=1.0),
            prop::collection::vec(inner, 0..4),
        )
            .prop_map(|(p, children)| {
                let mut node = ProfileNode::new("", "branch");
                node.percentage = p;
                node.children = Some(children);
                node
            })
    });

    prop::option::of(prop::collection::vec(node, 0..5))
}

/// Give every node a unique id `n{k}` in pre-order.
fn relabel(nodes: &mut [ProfileNode], next: &mut usize) {
    for node in nodes {
        node.id = format!("n{}", next);
        *next += 1;
        if let Some(children) = node.children.as_mut() {
            relabel(children, next);
        }
    }
}

fn arb_tree() -> impl Strategy<Value = Vec<ProfileNode>> {
    arb_children().prop_map(|children| {
        let mut children = children.unwrap_or_default();
        relabel(&mut children, &mut 0);
        children
    })
}

fn policy() -> DisplayPolicy {
    DisplayPolicy::with_chartable_ids(["n0", "n3", "n7", "n11"])
}

proptest! {
    #[test]
    fn flatten_is_idempotent(tree in arb_tree()) {
        let policy = policy();
        let ctx = FlattenContext::new(&policy, "http://example.test", "s1");
        prop_assert_eq!(flatten(&tree, &ctx), flatten(&tree, &ctx));
    }

    #[test]
    fn flatten_never_emits_tier_two(tree in arb_tree()) {
        let policy = policy();
        let ctx = FlattenContext::new(&policy, "http://example.test", "s1");
        let items = flatten(&tree, &ctx);
        prop_assert!(items.iter().all(|i| i.depth != 2));
    }

    #[test]
    fn header_is_exclusive(tree in arb_tree()) {
        let policy = policy();
        let ctx = FlattenContext::new(&policy, "http://example.test", "s1");
        for item in flatten(&tree, &ctx) {
            prop_assert!(!(item.is_header && item.is_subheader));
            prop_assert!(!(item.is_header && item.is_leaf));
            prop_assert!(!(item.is_subheader && item.is_leaf));
        }
    }

    #[test]
    fn flatten_preserves_preorder(tree in arb_tree()) {
        let policy = policy();
        let ctx = FlattenContext::new(&policy, "http://example.test", "s1");
        let expected: Vec<String> = preorder(&tree)
            .into_iter()
            .filter(|(depth, _)| *depth != 2)
            .map(|(_, node)| node.id.clone())
            .collect();
        let actual: Vec<String> = flatten(&tree, &ctx).into_iter().map(|i| i.id).collect();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn values_mirror_percentages(tree in arb_tree()) {
        let policy = policy();
        let ctx = FlattenContext::new(&policy, "http://example.test", "s1");
        let nodes = preorder(&tree);
        for item in flatten(&tree, &ctx) {
            let (_, node) = nodes.iter().find(|(_, n)| n.id == item.id).unwrap();
            prop_assert_eq!(item.value.is_some(), node.percentage.is_some());
            if let Some(value) = item.value {
                prop_assert!(value.ends_with('%'));
                prop_assert!(!value.contains("NaN"));
                let digits = value.trim_end_matches('%');
                prop_assert_eq!(digits.split('.').nth(1).map(str::len), Some(2));
            }
        }
    }

    #[test]
    fn graph_links_follow_allow_list(tree in arb_tree()) {
        let policy = policy();
        let ctx = FlattenContext::new(&policy, "http://example.test", "sess-9");
        for item in flatten(&tree, &ctx) {
            prop_assert_eq!(item.show_graph, policy.is_chartable(&item.id));
            prop_assert_eq!(item.show_graph, item.graph_url.is_some());
            if let Some(url) = item.graph_url {
                prop_assert!(url.contains(&item.id));
                prop_assert!(url.ends_with("?sessionId=sess-9"));
            }
        }
    }

    #[test]
    fn locate_finds_every_node(tree in arb_tree()) {
        for (_, node) in preorder(&tree) {
            let found = locate(&node.id, &tree).unwrap();
            match node.children() {
                [only] => prop_assert_eq!(&found.id, &only.id),
                _ => prop_assert_eq!(&found.id, &node.id),
            }
        }
        prop_assert!(locate("missing", &tree).is_none());
    }

    #[test]
    fn chart_slices_cover_scored_children(tree in arb_tree()) {
        let style = ChartStyle::default();
        for (_, node) in preorder(&tree) {
            let data = chart_data(node, &style);
            let scored = node.children().iter().filter(|c| c.percentage.is_some()).count();
            prop_assert_eq!(data.slices.len(), scored);
            prop_assert_eq!(data.slices.len() + data.skipped.len(), node.children().len());
        }
    }
}
