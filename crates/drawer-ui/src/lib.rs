//! Drawer UI — stacked modal presentation on top of `drawer-engine`.
//!
//! Each presented screen slides up as a rounded card. The screen it covers
//! recedes (scaled down and rounded), and the one below that recedes a
//! little further. Cards are dismissed by a downward swipe that cooperates
//! with any scrollable nested inside them.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use drawer_ui::prelude::*;
//!
//! let mut views = ViewTree::new();
//! let root = Screen::new("home", views.create(Rect::default())).into_ref();
//! let mut stack = DrawerStack::new(views, root, Viewport::new(390.0, 844.0), DrawerConfig::default());
//!
//! let card = Screen::new("card", stack.views_mut().create(Rect::default()))
//!     .with_dismissable(Rc::new(MySheet))
//!     .into_ref();
//! let node = stack.present(card, true);
//!
//! // Every frame:
//! stack.tick(dt);
//! for event in stack.take_events() {
//!     log::info!("{event:?}");
//! }
//! ```
//!
//! Pan samples recognised on a presented screen go to
//! [`DrawerStack::handle_pan`](stack::DrawerStack::handle_pan), which decides
//! whether the nested scrollable or the dismissal owns them.

pub mod animator;
pub mod config;
pub mod coordinator;
pub mod event;
pub mod geometry;
pub mod gesture;
pub mod interaction;
pub mod navigation;
pub mod registry;
pub mod screen;
pub mod scroll;
pub mod snapshot;
pub mod stack;
pub mod transition;

pub use stack::DrawerStack;

/// The types a host needs to build screens and drive a stack.
pub mod prelude {
    pub use crate::config::{ConfigError, DrawerConfig, DrawerMetrics, FeatureFlags, GestureThresholds};
    pub use crate::coordinator::NodePhase;
    pub use crate::event::DrawerEvent;
    pub use crate::geometry::{ChainRole, GeometryModel};
    pub use crate::gesture::{resolve_candidates, EdgeSide, GestureKind};
    pub use crate::navigation::{NavDirection, NavOutcome, NavigationStack};
    pub use crate::registry::NodeId;
    pub use crate::screen::{
        NestedScrollable, Presentable, Screen, ScreenId, ScreenRef, ScrollDismissable, StatusBarControl,
        StatusBarFlag,
    };
    pub use crate::scroll::ScrollState;
    pub use crate::stack::{DrawerStack, PanDisposition};

    pub use drawer_engine::animation::{Curve, PropertyAnimation, ViewProps};
    pub use drawer_engine::coords::{ColorRgba, Rect, Vec2, Viewport};
    pub use drawer_engine::input::{PanPhase, PanSample};
    pub use drawer_engine::view::{ViewId, ViewTree};
}
