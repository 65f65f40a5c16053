//! Screens and the capabilities the presentation core talks to.
//!
//! A [`Screen`] pairs a root view with optional capability handles, resolved
//! once when the screen is built:
//!
//! - [`Presentable`]: lifecycle hooks around presentation and dismissal
//! - [`ScrollDismissable`]: marks the screen as a drawer that can be swiped
//!   away, and exposes its nested scrollable for gesture arbitration
//! - [`StatusBarControl`]: the "use light content" flag
//!
//! Every hook has a no-op default; absent capabilities are simply skipped.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use drawer_engine::animation::PropertyAnimation;
use drawer_engine::coords::{Rect, Vec2};
use drawer_engine::view::{ViewId, ViewTree};

static NEXT_SCREEN_ID: AtomicU64 = AtomicU64::new(1);

// ── ScreenId ──────────────────────────────────────────────────────────────

/// Unique identifier of a screen, allocated at construction.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ScreenId(u64);

impl ScreenId {
    fn next() -> Self {
        ScreenId(NEXT_SCREEN_ID.fetch_add(1, Ordering::Relaxed))
    }
}

// ── capabilities ──────────────────────────────────────────────────────────

/// Lifecycle hooks invoked around presentation and dismissal.
pub trait Presentable {
    fn on_will_present(&self) {}

    /// Called every frame of an animated presentation with its fraction.
    fn on_presentation_tick(&self, fraction: f32) {
        let _ = fraction;
    }

    fn on_did_present(&self, completed: bool) {
        let _ = completed;
    }

    fn on_will_dismiss(&self) {}

    fn on_dismissal_tick(&self, fraction: f32) {
        let _ = fraction;
    }

    fn on_did_dismiss(&self, completed: bool) {
        let _ = completed;
    }
}

/// Host scroll view embedded in a dismissable screen.
///
/// Offsets follow the usual convention: a scrollable with a top inset of
/// `n` rests at offset `-n`, and content scrolls up as the offset grows.
pub trait NestedScrollable {
    /// Frame in the owning screen's coordinate space.
    fn frame(&self) -> Rect;
    fn content_offset(&self) -> f32;
    fn set_content_offset(&self, offset: f32);
    fn bounces(&self) -> bool;
    fn set_bounces(&self, bounces: bool);
    fn is_scroll_enabled(&self) -> bool;
    fn set_scroll_enabled(&self, enabled: bool);
}

/// A presented screen that can be dismissed by swiping, possibly while it
/// hosts a nested scrollable.
pub trait ScrollDismissable {
    fn nested_scrollable(&self) -> Option<Rc<dyn NestedScrollable>> {
        None
    }

    /// Resting inset of the nested scrollable (its at-rest offset is the negation).
    fn scroll_top_offset(&self) -> f32 {
        0.0
    }

    fn is_at_top(&self) -> bool {
        match self.nested_scrollable() {
            Some(s) => s.content_offset() <= -self.scroll_top_offset(),
            None => true,
        }
    }

    fn has_refresh_indicator(&self) -> bool {
        false
    }

    /// `point` is in the screen's coordinate space.
    fn touch_is_outside_scrollable(&self, point: Vec2) -> bool {
        match self.nested_scrollable() {
            Some(s) => !s.frame().contains(point),
            None => true,
        }
    }

    fn is_full_screen_presentation(&self) -> bool {
        false
    }

    /// Keep ancestor proxies alive for the whole time this screen is presented.
    fn uses_backing_snapshots(&self) -> bool {
        false
    }

    /// Animations to run shortly after the screen appears.
    ///
    /// Returned animations are started from the current view state and run
    /// on a spring; an empty list means there is nothing to run.
    fn presentation_animation(&self, views: &ViewTree) -> Vec<PropertyAnimation> {
        let _ = views;
        Vec::new()
    }
}

/// Status-bar appearance owned by a screen.
pub trait StatusBarControl {
    fn uses_light_content(&self) -> bool;
    fn set_uses_light_content(&self, light: bool);
}

/// Plain [`StatusBarControl`] backed by a cell.
#[derive(Debug, Default)]
pub struct StatusBarFlag(Cell<bool>);

impl StatusBarFlag {
    pub fn new(light: bool) -> Self {
        Self(Cell::new(light))
    }
}

impl StatusBarControl for StatusBarFlag {
    fn uses_light_content(&self) -> bool {
        self.0.get()
    }

    fn set_uses_light_content(&self, light: bool) {
        self.0.set(light);
    }
}

// ── Screen ────────────────────────────────────────────────────────────────

/// A presentable unit of UI: a root view plus its capabilities.
pub struct Screen {
    id: ScreenId,
    name: String,
    view: ViewId,
    presentable: Option<Rc<dyn Presentable>>,
    dismissable: Option<Rc<dyn ScrollDismissable>>,
    status_bar: Option<Rc<dyn StatusBarControl>>,
}

/// Shared handle; presenters are referenced weakly from presentation nodes.
pub type ScreenRef = Rc<Screen>;

impl Screen {
    pub fn new(name: impl Into<String>, view: ViewId) -> Self {
        Self {
            id: ScreenId::next(),
            name: name.into(),
            view,
            presentable: None,
            dismissable: None,
            status_bar: None,
        }
    }

    pub fn with_presentable(mut self, hooks: Rc<dyn Presentable>) -> Self {
        self.presentable = Some(hooks);
        self
    }

    pub fn with_dismissable(mut self, dismissable: Rc<dyn ScrollDismissable>) -> Self {
        self.dismissable = Some(dismissable);
        self
    }

    pub fn with_status_bar(mut self, status_bar: Rc<dyn StatusBarControl>) -> Self {
        self.status_bar = Some(status_bar);
        self
    }

    pub fn into_ref(self) -> ScreenRef {
        Rc::new(self)
    }

    #[inline]
    pub fn id(&self) -> ScreenId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn view(&self) -> ViewId {
        self.view
    }

    pub fn dismissable(&self) -> Option<&dyn ScrollDismissable> {
        self.dismissable.as_deref()
    }

    #[inline]
    pub fn is_dismissable(&self) -> bool {
        self.dismissable.is_some()
    }

    pub fn is_full_screen(&self) -> bool {
        self.dismissable().is_some_and(|d| d.is_full_screen_presentation())
    }

    pub fn uses_backing_snapshots(&self) -> bool {
        self.dismissable().is_some_and(|d| d.uses_backing_snapshots())
    }

    /// Light-content flag; screens without the capability report dark content.
    pub fn light_status_bar(&self) -> bool {
        self.status_bar.as_ref().is_some_and(|s| s.uses_light_content())
    }

    pub fn set_light_status_bar(&self, light: bool) {
        if let Some(s) = &self.status_bar {
            s.set_uses_light_content(light);
        }
    }

    /// Runs `f` against the lifecycle hooks, if the screen has any.
    pub fn notify(&self, f: impl FnOnce(&dyn Presentable)) {
        if let Some(hooks) = &self.presentable {
            f(hooks.as_ref());
        }
    }
}

impl fmt::Debug for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Screen")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("view", &self.view)
            .field("dismissable", &self.dismissable.is_some())
            .finish()
    }
}
