use crate::coords::{ColorRgba, Rect};
use crate::transform::Transform3d;

use super::id::ViewId;

/// What a view displays.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewContent {
    /// Plain container (background color only).
    Plain,
    /// Named content, used by hosts and demos to tell views apart.
    Label(String),
    /// Proxy mirroring `region` of `source` (the whole source when `None`).
    Snapshot { source: ViewId, region: Option<Rect> },
}

/// One view and its local properties.
#[derive(Debug, Clone)]
pub struct ViewNode {
    pub frame: Rect,
    pub transform: Transform3d,
    pub alpha: f32,
    pub corner_radius: f32,
    pub hidden: bool,
    pub clips_to_bounds: bool,
    pub background: Option<ColorRgba>,
    pub content: ViewContent,
    parent: Option<ViewId>,
    children: Vec<ViewId>,
}

impl ViewNode {
    fn new(frame: Rect, content: ViewContent) -> Self {
        Self {
            frame,
            transform: Transform3d::IDENTITY,
            alpha: 1.0,
            corner_radius: 0.0,
            hidden: false,
            clips_to_bounds: false,
            background: None,
            content,
            parent: None,
            children: Vec::new(),
        }
    }

    #[inline]
    pub fn parent(&self) -> Option<ViewId> {
        self.parent
    }

    #[inline]
    pub fn children(&self) -> &[ViewId] {
        &self.children
    }

    /// Returns `true` for proxies created by [`ViewTree::snapshot`].
    #[inline]
    pub fn is_snapshot(&self) -> bool {
        matches!(self.content, ViewContent::Snapshot { .. })
    }
}

struct Slot {
    generation: u32,
    node: Option<ViewNode>,
}

/// Arena of views addressed by generational [`ViewId`] handles.
///
/// Destroyed slots are recycled through a free list; the generation bump
/// makes every outstanding handle to the old view dead.
#[derive(Default)]
pub struct ViewTree {
    slots: Vec<Slot>,
    free_list: Vec<u32>,
}

impl ViewTree {
    pub fn new() -> Self {
        Self::default()
    }

    // ── allocation ────────────────────────────────────────────────────────

    /// Creates a detached plain view.
    pub fn create(&mut self, frame: Rect) -> ViewId {
        self.create_with(frame, ViewContent::Plain)
    }

    /// Creates a detached view with a label.
    pub fn create_labeled(&mut self, frame: Rect, label: impl Into<String>) -> ViewId {
        self.create_with(frame, ViewContent::Label(label.into()))
    }

    fn create_with(&mut self, frame: Rect, content: ViewContent) -> ViewId {
        let node = ViewNode::new(frame, content);
        if let Some(idx) = self.free_list.pop() {
            let slot = &mut self.slots[idx as usize];
            slot.generation = slot.generation.wrapping_add(1);
            slot.node = Some(node);
            ViewId { idx, generation: slot.generation }
        } else {
            let idx = self.slots.len() as u32;
            self.slots.push(Slot { generation: 0, node: Some(node) });
            ViewId { idx, generation: 0 }
        }
    }

    /// Creates a detached proxy of `source`, optionally limited to `region`
    /// (expressed in the source's own coordinate space).
    ///
    /// The proxy's frame is the source frame, or `region` sized at the origin.
    /// Returns `None` when `source` is dead.
    pub fn snapshot(&mut self, source: ViewId, region: Option<Rect>) -> Option<ViewId> {
        let src = self.get(source)?;
        let frame = match region {
            Some(r) => Rect::from_size(r.size),
            None => src.frame,
        };
        let background = src.background;
        let id = self.create_with(frame, ViewContent::Snapshot { source, region });
        if let Some(node) = self.get_mut(id) {
            node.background = background;
        }
        Some(id)
    }

    /// Destroys `id` and its whole subtree, detaching it from its parent.
    pub fn destroy(&mut self, id: ViewId) -> bool {
        if !self.is_alive(id) {
            return false;
        }
        self.remove_from_parent(id);

        let mut stack = vec![id];
        while let Some(cur) = stack.pop() {
            let slot = &mut self.slots[cur.idx as usize];
            if let Some(node) = slot.node.take() {
                stack.extend(node.children);
                self.free_list.push(cur.idx);
            }
        }
        true
    }

    // ── lookup ────────────────────────────────────────────────────────────

    #[inline]
    pub fn is_alive(&self, id: ViewId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: ViewId) -> Option<&ViewNode> {
        let slot = self.slots.get(id.idx as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_ref()
    }

    pub fn get_mut(&mut self, id: ViewId) -> Option<&mut ViewNode> {
        let slot = self.slots.get_mut(id.idx as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_mut()
    }

    /// Number of live views.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.node.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn parent(&self, id: ViewId) -> Option<ViewId> {
        self.get(id)?.parent
    }

    pub fn children(&self, id: ViewId) -> &[ViewId] {
        self.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Position of `id` among its parent's children.
    pub fn index_in_parent(&self, id: ViewId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|c| *c == id)
    }

    /// Returns `true` if `ancestor` is `id` or one of its ancestors.
    pub fn is_ancestor(&self, ancestor: ViewId, id: ViewId) -> bool {
        let mut cur = Some(id);
        while let Some(c) = cur {
            if c == ancestor {
                return true;
            }
            cur = self.parent(c);
        }
        false
    }

    // ── topology ──────────────────────────────────────────────────────────

    /// Appends `child` as the topmost child of `parent`.
    pub fn add_child(&mut self, parent: ViewId, child: ViewId) -> bool {
        let end = self.children(parent).len();
        self.insert_child(parent, child, end)
    }

    /// Inserts `child` into `parent` at `index` (clamped to the child count).
    ///
    /// A child already attached elsewhere is detached first. Attaching a view
    /// under its own descendant is rejected.
    pub fn insert_child(&mut self, parent: ViewId, child: ViewId, index: usize) -> bool {
        if !self.is_alive(parent) || !self.is_alive(child) || self.is_ancestor(child, parent) {
            log::debug!("rejected insert of {child:?} into {parent:?}");
            return false;
        }
        self.remove_from_parent(child);

        let Some(p) = self.get_mut(parent) else {
            return false;
        };
        let at = index.min(p.children.len());
        p.children.insert(at, child);

        if let Some(c) = self.get_mut(child) {
            c.parent = Some(parent);
        }
        true
    }

    /// Detaches `child`, returning its former parent and index.
    pub fn remove_from_parent(&mut self, child: ViewId) -> Option<(ViewId, usize)> {
        let parent = self.parent(child)?;
        let index = self.index_in_parent(child)?;
        if let Some(p) = self.get_mut(parent) {
            p.children.remove(index);
        }
        if let Some(c) = self.get_mut(child) {
            c.parent = None;
        }
        Some((parent, index))
    }

    // ── properties ────────────────────────────────────────────────────────

    pub fn frame(&self, id: ViewId) -> Option<Rect> {
        self.get(id).map(|n| n.frame)
    }

    pub fn transform(&self, id: ViewId) -> Option<Transform3d> {
        self.get(id).map(|n| n.transform)
    }

    pub fn alpha(&self, id: ViewId) -> Option<f32> {
        self.get(id).map(|n| n.alpha)
    }

    pub fn corner_radius(&self, id: ViewId) -> Option<f32> {
        self.get(id).map(|n| n.corner_radius)
    }

    pub fn set_frame(&mut self, id: ViewId, frame: Rect) -> bool {
        self.update(id, |n| n.frame = frame)
    }

    pub fn set_transform(&mut self, id: ViewId, transform: Transform3d) -> bool {
        self.update(id, |n| n.transform = transform)
    }

    pub fn set_alpha(&mut self, id: ViewId, alpha: f32) -> bool {
        self.update(id, |n| n.alpha = alpha.clamp(0.0, 1.0))
    }

    pub fn set_corner_radius(&mut self, id: ViewId, radius: f32) -> bool {
        self.update(id, |n| n.corner_radius = radius.max(0.0))
    }

    pub fn set_hidden(&mut self, id: ViewId, hidden: bool) -> bool {
        self.update(id, |n| n.hidden = hidden)
    }

    pub fn set_clips_to_bounds(&mut self, id: ViewId, clips: bool) -> bool {
        self.update(id, |n| n.clips_to_bounds = clips)
    }

    pub fn set_background(&mut self, id: ViewId, color: Option<ColorRgba>) -> bool {
        self.update(id, |n| n.background = color)
    }

    fn update(&mut self, id: ViewId, f: impl FnOnce(&mut ViewNode)) -> bool {
        match self.get_mut(id) {
            Some(node) => {
                f(node);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(x: f32, y: f32, w: f32, h: f32) -> Rect { Rect::new(x, y, w, h) }

    // ── allocation ────────────────────────────────────────────────────────

    #[test]
    fn destroyed_handle_is_stale_after_reuse() {
        let mut tree = ViewTree::new();
        let a = tree.create(r(0.0, 0.0, 10.0, 10.0));
        assert!(tree.destroy(a));
        let b = tree.create(r(0.0, 0.0, 5.0, 5.0));
        assert_eq!(a.index(), b.index());
        assert!(!tree.is_alive(a));
        assert!(tree.is_alive(b));
        assert!(!tree.set_alpha(a, 0.5));
    }

    #[test]
    fn destroy_removes_subtree() {
        let mut tree = ViewTree::new();
        let root = tree.create(r(0.0, 0.0, 100.0, 100.0));
        let mid = tree.create(r(0.0, 0.0, 50.0, 50.0));
        let leaf = tree.create(r(0.0, 0.0, 5.0, 5.0));
        tree.add_child(root, mid);
        tree.add_child(mid, leaf);

        tree.destroy(mid);
        assert!(tree.is_alive(root));
        assert!(!tree.is_alive(leaf));
        assert!(tree.children(root).is_empty());
        assert_eq!(tree.len(), 1);
    }

    // ── topology ──────────────────────────────────────────────────────────

    #[test]
    fn insert_at_index_and_remove_reports_position() {
        let mut tree = ViewTree::new();
        let root = tree.create(r(0.0, 0.0, 100.0, 100.0));
        let a = tree.create(Rect::default());
        let b = tree.create(Rect::default());
        let c = tree.create(Rect::default());
        tree.add_child(root, a);
        tree.add_child(root, c);
        tree.insert_child(root, b, 1);

        assert_eq!(tree.children(root), &[a, b, c]);
        assert_eq!(tree.index_in_parent(b), Some(1));
        assert_eq!(tree.remove_from_parent(b), Some((root, 1)));
        assert_eq!(tree.children(root), &[a, c]);
        assert_eq!(tree.parent(b), None);
    }

    #[test]
    fn reattaching_moves_child_between_parents() {
        let mut tree = ViewTree::new();
        let p1 = tree.create(Rect::default());
        let p2 = tree.create(Rect::default());
        let c = tree.create(Rect::default());
        tree.add_child(p1, c);
        tree.add_child(p2, c);
        assert!(tree.children(p1).is_empty());
        assert_eq!(tree.parent(c), Some(p2));
    }

    #[test]
    fn cycle_is_rejected() {
        let mut tree = ViewTree::new();
        let a = tree.create(Rect::default());
        let b = tree.create(Rect::default());
        tree.add_child(a, b);
        assert!(!tree.add_child(b, a));
        assert!(!tree.add_child(a, a));
    }

    #[test]
    fn insert_index_is_clamped() {
        let mut tree = ViewTree::new();
        let root = tree.create(Rect::default());
        let a = tree.create(Rect::default());
        assert!(tree.insert_child(root, a, 42));
        assert_eq!(tree.index_in_parent(a), Some(0));
    }

    // ── snapshot ──────────────────────────────────────────────────────────

    #[test]
    fn snapshot_of_region_is_sized_to_region() {
        let mut tree = ViewTree::new();
        let src = tree.create(r(0.0, 40.0, 390.0, 800.0));
        let proxy = tree.snapshot(src, Some(r(0.0, 0.0, 16.0, 800.0))).unwrap();
        let node = tree.get(proxy).unwrap();
        assert!(node.is_snapshot());
        assert_eq!(node.frame, r(0.0, 0.0, 16.0, 800.0));
        assert_eq!(node.parent(), None);
    }

    #[test]
    fn snapshot_of_dead_source_is_none() {
        let mut tree = ViewTree::new();
        let src = tree.create(Rect::default());
        tree.destroy(src);
        assert!(tree.snapshot(src, None).is_none());
    }

    // ── properties ────────────────────────────────────────────────────────

    #[test]
    fn alpha_and_radius_are_clamped() {
        let mut tree = ViewTree::new();
        let v = tree.create(Rect::default());
        tree.set_alpha(v, 1.5);
        tree.set_corner_radius(v, -3.0);
        assert_eq!(tree.alpha(v), Some(1.0));
        assert_eq!(tree.corner_radius(v), Some(0.0));
    }
}
