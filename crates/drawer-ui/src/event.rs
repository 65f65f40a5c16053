use drawer_engine::coords::Viewport;

use crate::gesture::GestureKind;
use crate::registry::NodeId;
use crate::screen::ScreenId;

/// Observable outcomes of the drawer stack, drained by the host.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawerEvent {
    PresentationBegan { node: NodeId, screen: ScreenId, animated: bool },
    PresentationEnded { node: NodeId, completed: bool },
    DismissalBegan { node: NodeId, interactive: bool },
    DismissalEnded { node: NodeId, completed: bool },
    /// Stack depth after a completed presentation or dismissal.
    DepthChanged(usize),
    /// A gesture could not start or a request arrived while another
    /// transition was running.
    GestureRejected { node: NodeId, kind: GestureKind },
    RequestRejected { reason: &'static str },
    /// A resize arrived mid-transition and will be applied once it ends.
    ResizeDeferred(Viewport),
    DelayedAnimationFired { node: NodeId },
    /// The node was dismissed before its delayed animation could run.
    DelayedAnimationSkipped { node: NodeId },
}

impl DrawerEvent {
    pub fn node(&self) -> Option<NodeId> {
        match self {
            DrawerEvent::PresentationBegan { node, .. }
            | DrawerEvent::PresentationEnded { node, .. }
            | DrawerEvent::DismissalBegan { node, .. }
            | DrawerEvent::DismissalEnded { node, .. }
            | DrawerEvent::GestureRejected { node, .. }
            | DrawerEvent::DelayedAnimationFired { node }
            | DrawerEvent::DelayedAnimationSkipped { node } => Some(*node),
            DrawerEvent::DepthChanged(_) | DrawerEvent::RequestRejected { .. } | DrawerEvent::ResizeDeferred(_) => None,
        }
    }
}
