//! Property-based invariant tests for the window tree.
//!
//! Arbitrary sequences of reparent, restack, create and destroy operations
//! must leave the tree consistent:
//!
//! 1. Every live window is listed exactly once, as a top-level window or in
//!    its parent's children.
//! 2. Sibling navigation agrees in both directions.
//! 3. No window is its own ancestor.
//! 4. Destroying a window removes its whole subtree.

use horizon_casement_core::{
    DefaultBehavior, Rect, RuntimeConfig, UiRuntime, WindowId, WindowParams, ZOrder,
};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum Op {
    Reparent { node: usize, parent: Option<usize> },
    Restack { node: usize, order: u8, sibling: usize },
    Create { parent: Option<usize> },
    Destroy { node: usize },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (any::<usize>(), proptest::option::of(any::<usize>()))
            .prop_map(|(node, parent)| Op::Reparent { node, parent }),
        4 => (any::<usize>(), 0u8..3, any::<usize>())
            .prop_map(|(node, order, sibling)| Op::Restack { node, order, sibling }),
        2 => proptest::option::of(any::<usize>()).prop_map(|parent| Op::Create { parent }),
        1 => any::<usize>().prop_map(|node| Op::Destroy { node }),
    ]
}

fn pick(ids: &[WindowId], index: usize) -> Option<WindowId> {
    if ids.is_empty() {
        None
    } else {
        Some(ids[index % ids.len()])
    }
}

fn build(count: usize) -> (UiRuntime, Vec<WindowId>) {
    let mut ui = UiRuntime::new(RuntimeConfig::default());
    let mut ids = Vec::with_capacity(count);
    for i in 0..count {
        let parent = if i % 3 == 0 { None } else { ids.last().copied() };
        let params = match parent {
            Some(parent) => WindowParams::child(parent, i as u32, Rect::from_xywh(0, 0, 20, 20)),
            None => WindowParams::top_level(Rect::from_xywh(0, 0, 100, 100)),
        };
        if let Some(id) = ui.create_window(params, DefaultBehavior) {
            ids.push(id);
        }
    }
    (ui, ids)
}

fn apply(ui: &mut UiRuntime, ids: &mut Vec<WindowId>, op: &Op) {
    match *op {
        Op::Reparent { node, parent } => {
            if let Some(node) = pick(ids, node) {
                let parent = parent.and_then(|p| pick(ids, p));
                ui.reparent(node, parent);
            }
        }
        Op::Restack {
            node,
            order,
            sibling,
        } => {
            if let Some(node) = pick(ids, node) {
                let order = match order {
                    0 => ZOrder::Top,
                    1 => ZOrder::Bottom,
                    _ => match pick(ids, sibling) {
                        Some(sibling) => ZOrder::After(sibling),
                        None => ZOrder::Top,
                    },
                };
                ui.restack(node, order);
            }
        }
        Op::Create { parent } => {
            let parent = parent.and_then(|p| pick(ids, p));
            let params = match parent {
                Some(parent) => WindowParams::child(parent, 0, Rect::from_xywh(5, 5, 10, 10)),
                None => WindowParams::top_level(Rect::from_xywh(0, 0, 50, 50)),
            };
            if let Some(id) = ui.create_window(params, DefaultBehavior) {
                ids.push(id);
            }
        }
        Op::Destroy { node } => {
            if let Some(node) = pick(ids, node) {
                ui.destroy_window(node);
            }
        }
    }
    ids.retain(|&id| ui.is_window(id));
}

// ═════════════════════════════════════════════════════════════════════════
// 1–2. Linkage stays consistent
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn links_consistent_after_random_ops(
        count in 1usize..12,
        ops in proptest::collection::vec(op_strategy(), 0..64),
    ) {
        let (mut ui, mut ids) = build(count);
        prop_assert!(ui.verify_links());
        for op in &ops {
            apply(&mut ui, &mut ids, op);
            prop_assert!(ui.verify_links(), "links broken after {:?}", op);
        }
        prop_assert_eq!(ui.window_count(), ids.len());
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Sibling navigation walks every list front to back
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn sibling_walk_matches_children(
        count in 1usize..12,
        ops in proptest::collection::vec(op_strategy(), 0..32),
    ) {
        let (mut ui, mut ids) = build(count);
        for op in &ops {
            apply(&mut ui, &mut ids, op);
        }
        for &id in &ids {
            let children = ui.children(id);
            let mut walked = Vec::new();
            let mut cursor = ui.first_child(id);
            while let Some(child) = cursor {
                walked.push(child);
                cursor = ui.next_sibling(child);
            }
            prop_assert_eq!(&walked, &children);
            if let Some(first) = children.first() {
                prop_assert_eq!(ui.prev_sibling(*first), None);
            }
        }
        if let Some(&head) = ui.top_level_windows().first() {
            prop_assert_eq!(ui.prev_sibling(head), None);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. No cycles
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn no_window_is_its_own_ancestor(
        count in 1usize..12,
        ops in proptest::collection::vec(op_strategy(), 0..48),
    ) {
        let (mut ui, mut ids) = build(count);
        for op in &ops {
            apply(&mut ui, &mut ids, op);
        }
        for &id in &ids {
            let ancestors = ui.ancestors(id);
            prop_assert!(!ancestors.contains(&id), "{:?} is its own ancestor", id);
            prop_assert!(ancestors.len() < ids.len());
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Destroy removes the subtree
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn destroy_removes_subtree(
        count in 2usize..12,
        ops in proptest::collection::vec(op_strategy(), 0..32),
        victim in any::<usize>(),
    ) {
        let (mut ui, mut ids) = build(count);
        for op in &ops {
            apply(&mut ui, &mut ids, op);
        }
        let Some(victim) = pick(&ids, victim) else {
            return Ok(());
        };
        let subtree = ui.descendants(victim);
        prop_assert!(ui.destroy_window(victim));
        prop_assert!(!ui.destroy_window(victim));
        prop_assert!(!ui.is_window(victim));
        for id in subtree {
            prop_assert!(!ui.is_window(id));
        }
        prop_assert!(ui.verify_links());
    }
}
