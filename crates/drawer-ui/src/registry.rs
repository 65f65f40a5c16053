//! Process-wide presentation state.
//!
//! [`PresentationRegistry`] replaces ambient globals: it owns the root
//! screen, the feature configuration, the stack depth counter and an arena
//! of [`PresentationNode`]s addressed by generational [`NodeId`]s.
//!
//! Presenter resolution walks back-references iteratively, bounded by the
//! number of live nodes and guarded by a visited set, so a mis-wired chain
//! degrades to the root instead of looping.

use std::collections::HashSet;
use std::fmt;
use std::rc::{Rc, Weak};

use drawer_engine::view::ViewId;

use crate::config::DrawerConfig;
use crate::coordinator::PresentationCoordinator;
use crate::geometry::ChainRole;
use crate::gesture::GestureArbitrator;
use crate::interaction::InteractiveTransition;
use crate::screen::{Screen, ScreenId, ScreenRef};

// ── NodeId ────────────────────────────────────────────────────────────────

/// Generational handle to a [`PresentationNode`].
///
/// A handle goes stale once its node is removed; a reused slot carries a
/// bumped generation.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct NodeId {
    idx: u32,
    generation: u32,
}

impl NodeId {
    #[inline]
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self { idx, generation }
    }

    #[inline]
    pub const fn index(self) -> u32 {
        self.idx
    }

    #[inline]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({}@gen{})", self.idx, self.generation)
    }
}

// ── DepthCounter ──────────────────────────────────────────────────────────

/// Number of completed, not yet dismissed presentations.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct DepthCounter(usize);

impl DepthCounter {
    #[inline]
    pub fn get(self) -> usize {
        self.0
    }

    pub fn increment(&mut self) -> usize {
        self.0 += 1;
        self.0
    }

    pub fn decrement(&mut self) -> usize {
        match self.0.checked_sub(1) {
            Some(v) => self.0 = v,
            None => log::warn!("depth decrement below zero ignored"),
        }
        self.0
    }
}

// ── PresentationNode ──────────────────────────────────────────────────────

/// One active presented screen.
pub struct PresentationNode {
    id: NodeId,
    presented: ScreenRef,
    /// The screen directly beneath, whatever its capabilities.
    presenting: Weak<Screen>,
    presenter: Option<Weak<Screen>>,
    grand_presenter: Option<Weak<Screen>>,
    full_screen: bool,
    backing: bool,
    /// Full-window view holding the dimming overlay, edge proxies and the presented view.
    container: ViewId,
    pub coordinator: PresentationCoordinator,
    pub interaction: InteractiveTransition,
    pub arbitrator: GestureArbitrator,
}

impl PresentationNode {
    #[inline]
    pub fn id(&self) -> NodeId {
        self.id
    }

    #[inline]
    pub fn presented(&self) -> &ScreenRef {
        &self.presented
    }

    pub fn presenting(&self) -> Option<ScreenRef> {
        self.presenting.upgrade()
    }

    pub fn presenter(&self) -> Option<ScreenRef> {
        self.presenter.as_ref().and_then(Weak::upgrade)
    }

    pub fn grand_presenter(&self) -> Option<ScreenRef> {
        self.grand_presenter.as_ref().and_then(Weak::upgrade)
    }

    #[inline]
    pub fn is_full_screen(&self) -> bool {
        self.full_screen
    }

    #[inline]
    pub fn uses_backing_snapshots(&self) -> bool {
        self.backing
    }

    #[inline]
    pub fn container(&self) -> ViewId {
        self.container
    }
}

impl fmt::Debug for PresentationNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PresentationNode")
            .field("id", &self.id)
            .field("presented", &self.presented.name())
            .field("presenter", &self.presenter().map(|s| s.name().to_owned()))
            .field("grand_presenter", &self.grand_presenter().map(|s| s.name().to_owned()))
            .field("full_screen", &self.full_screen)
            .field("phase", &self.coordinator.phase())
            .finish()
    }
}

// ── Chain ─────────────────────────────────────────────────────────────────

/// An ancestor taking part in a node's transition, with every view that
/// must move in lockstep with it.
#[derive(Debug, Clone)]
pub struct ChainMember {
    pub screen: ScreenRef,
    pub role: ChainRole,
    pub views: Vec<ViewId>,
}

impl ChainMember {
    #[inline]
    pub fn is_root(&self) -> bool {
        self.role == ChainRole::Root
    }

    /// Root and full-screen ancestors gain rounded corners only while receded.
    #[inline]
    pub fn rounds_when_receded(&self) -> bool {
        self.role != ChainRole::Card
    }
}

/// Presenter and grandpresenter of one node, resolved for a single phase step.
#[derive(Debug, Clone, Default)]
pub struct Chain {
    pub presenter: Option<ChainMember>,
    pub grand: Option<ChainMember>,
}

// ── PresentationRegistry ──────────────────────────────────────────────────

struct Slot {
    generation: u32,
    node: Option<PresentationNode>,
}

pub struct PresentationRegistry {
    root: ScreenRef,
    config: DrawerConfig,
    depth: DepthCounter,
    slots: Vec<Slot>,
    free_list: Vec<u32>,
    /// Live nodes, bottom to top.
    order: Vec<NodeId>,
}

impl PresentationRegistry {
    pub fn new(root: ScreenRef, config: DrawerConfig) -> Self {
        Self {
            root,
            config,
            depth: DepthCounter::default(),
            slots: Vec::new(),
            free_list: Vec::new(),
            order: Vec::new(),
        }
    }

    #[inline]
    pub fn root(&self) -> &ScreenRef {
        &self.root
    }

    #[inline]
    pub fn config(&self) -> &DrawerConfig {
        &self.config
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.depth.get()
    }

    /// Live nodes, bottom to top.
    pub fn order(&self) -> &[NodeId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn top(&self) -> Option<NodeId> {
        self.order.last().copied()
    }

    /// The screen new presentations go on top of.
    pub fn top_screen(&self) -> ScreenRef {
        self.top()
            .and_then(|id| self.get(id))
            .map(|n| n.presented.clone())
            .unwrap_or_else(|| self.root.clone())
    }

    pub fn is_alive(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: NodeId) -> Option<&PresentationNode> {
        let slot = self.slots.get(id.idx as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_ref()
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut PresentationNode> {
        let slot = self.slots.get_mut(id.idx as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_mut()
    }

    /// Node and depth counter borrowed together, for completion handlers.
    pub fn node_and_depth(&mut self, id: NodeId) -> Option<(&mut PresentationNode, &mut DepthCounter)> {
        let slot = self.slots.get_mut(id.idx as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let node = slot.node.as_mut()?;
        Some((node, &mut self.depth))
    }

    /// Node whose presented screen is `screen`.
    pub fn node_of(&self, screen: ScreenId) -> Option<&PresentationNode> {
        self.order
            .iter()
            .filter_map(|id| self.get(*id))
            .find(|n| n.presented.id() == screen)
    }

    pub fn is_presented(&self, screen: ScreenId) -> bool {
        self.node_of(screen).is_some()
    }

    // ── resolution ────────────────────────────────────────────────────────

    /// Nearest screen at or below `from` that can take part in the drawer
    /// chain, falling back to the root.
    pub fn nearest_dismissable(&self, from: Option<ScreenRef>) -> ScreenRef {
        let mut visited = HashSet::new();
        let mut current = from;
        // Every step moves one node down the stack.
        for _ in 0..=self.order.len() {
            let Some(screen) = current else {
                break;
            };
            if !visited.insert(screen.id()) {
                log::warn!("presentation chain loops at {:?}; using root", screen.id());
                break;
            }
            if screen.is_dismissable() {
                return screen;
            }
            current = self.node_of(screen.id()).and_then(PresentationNode::presenting);
        }
        self.root.clone()
    }

    /// Presenter and grandpresenter for a screen presented on top of `presenting`.
    ///
    /// The grandpresenter is dropped when it resolves to the presenter itself.
    pub fn resolve_chain(&self, presenting: &ScreenRef) -> (ScreenRef, Option<ScreenRef>) {
        let presenter = self.nearest_dismissable(Some(presenting.clone()));
        let below = self.node_of(presenter.id()).and_then(PresentationNode::presenting);
        let grand = self.nearest_dismissable(below);
        let grand = (grand.id() != presenter.id()).then_some(grand);
        (presenter, grand)
    }

    pub fn role_of(&self, screen: &Screen) -> ChainRole {
        if screen.id() == self.root.id() {
            return ChainRole::Root;
        }
        match self.node_of(screen.id()) {
            Some(n) if n.full_screen => ChainRole::FullScreenCard,
            Some(_) => ChainRole::Card,
            None if screen.is_full_screen() => ChainRole::FullScreenCard,
            None => ChainRole::Card,
        }
    }

    /// Proxy currently standing in for `screen`'s view, if any node substituted it.
    pub fn proxy_for(&self, screen: ScreenId) -> Option<ViewId> {
        let view = self.find_screen(screen)?.view();
        self.order
            .iter()
            .filter_map(|id| self.get(*id))
            .filter(|n| n.coordinator.snapshots().substitution().is_some_and(|s| s.true_view == view))
            .find_map(|n| n.coordinator.snapshots().presenter_proxy())
    }

    fn find_screen(&self, screen: ScreenId) -> Option<ScreenRef> {
        if self.root.id() == screen {
            return Some(self.root.clone());
        }
        self.node_of(screen).map(|n| n.presented.clone())
    }

    /// Presenter and grandpresenter of `id` with the views that mirror them.
    ///
    /// A member's views are its real view, the side edges of the node that
    /// presented it and, for the grandpresenter, the proxy the presenter's
    /// node substituted for it. The node's own proxy is not included.
    pub fn chain(&self, id: NodeId) -> Chain {
        let Some(node) = self.get(id) else {
            return Chain::default();
        };
        let member = |screen: ScreenRef, with_proxy_from: Option<&PresentationNode>| {
            let mut views = vec![screen.view()];
            if let Some(owner) = self.node_of(screen.id()) {
                views.extend(owner.coordinator.snapshots().side_edges());
            }
            if let Some(n) = with_proxy_from {
                let snaps = n.coordinator.snapshots();
                if snaps.substitution().is_some_and(|s| s.true_view == screen.view()) {
                    views.extend(snaps.presenter_proxy());
                }
            }
            ChainMember { role: self.role_of(&screen), screen, views }
        };

        let presenter = node.presenter();
        let presenter_node = presenter.as_ref().and_then(|p| self.node_of(p.id()));
        Chain {
            grand: node.grand_presenter().map(|g| member(g, presenter_node)),
            presenter: presenter.map(|p| member(p, None)),
        }
    }

    // ── mutation ──────────────────────────────────────────────────────────

    /// Registers `presented` on top of the current stack.
    ///
    /// Returns `None` when the screen is the root or already presented.
    pub fn insert(&mut self, presented: ScreenRef, container: ViewId) -> Option<NodeId> {
        if presented.id() == self.root.id() || self.is_presented(presented.id()) {
            log::warn!("{:?} is already on screen; not presenting it again", presented.name());
            return None;
        }
        let presenting = self.top_screen();
        let (presenter, grand) = self.resolve_chain(&presenting);

        let id = match self.free_list.pop() {
            Some(idx) => {
                let slot = &mut self.slots[idx as usize];
                slot.generation = slot.generation.wrapping_add(1);
                NodeId::new(idx, slot.generation)
            }
            None => {
                self.slots.push(Slot { generation: 0, node: None });
                NodeId::new((self.slots.len() - 1) as u32, 0)
            }
        };

        let node = PresentationNode {
            id,
            full_screen: presented.is_full_screen(),
            backing: presented.uses_backing_snapshots(),
            presenting: Rc::downgrade(&presenting),
            presenter: Some(Rc::downgrade(&presenter)),
            grand_presenter: grand.as_ref().map(Rc::downgrade),
            container,
            coordinator: PresentationCoordinator::new(id),
            interaction: InteractiveTransition::new(self.config.gestures.completion_epsilon),
            arbitrator: GestureArbitrator::new(self.config.gestures),
            presented,
        };
        log::debug!(
            "node {id:?}: {} over {} (grand {:?})",
            node.presented.name(),
            presenter.name(),
            grand.as_ref().map(|g| g.name().to_owned())
        );
        self.slots[id.idx as usize].node = Some(node);
        self.order.push(id);
        Some(id)
    }

    /// Removes a node, staling its id.
    pub fn remove(&mut self, id: NodeId) -> Option<PresentationNode> {
        let slot = self.slots.get_mut(id.idx as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let node = slot.node.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free_list.push(id.idx);
        self.order.retain(|n| *n != id);
        log::debug!("node {id:?} removed");
        Some(node)
    }
}
