//! Demo screens and the app that drives a [`DrawerStack`] from runtime input.
//!
//! Keys:
//! - `Enter` presents a card, `Space` a full-screen card
//! - `Escape` dismisses the top card
//! - `ArrowRight` / `ArrowLeft` push and pop pages on the root screen
//!
//! Pans on a card go through the stack's arbitration; when the card's table
//! keeps the touch the demo scrolls the table itself.

use std::rc::Rc;

use drawer_engine::core::{App, AppControl, FrameCtx};
use drawer_engine::input::{InputEvent, Key, KeyState, PanPhase, PanSample, TrackedGesture};
use drawer_ui::prelude::*;

/// Inset of the table below the card's header.
const TABLE_TOP_INSET: f32 = 84.0;
const ROW_HEIGHT: f32 = 44.0;

// ── screens ───────────────────────────────────────────────────────────────

/// Card content: a table, optionally with a refresh indicator.
struct TableScreen {
    view: ViewId,
    scroll: Rc<ScrollState>,
    refresh: bool,
    full_screen: bool,
}

impl ScrollDismissable for TableScreen {
    fn nested_scrollable(&self) -> Option<Rc<dyn NestedScrollable>> {
        Some(self.scroll.clone())
    }

    fn scroll_top_offset(&self) -> f32 {
        TABLE_TOP_INSET
    }

    fn has_refresh_indicator(&self) -> bool {
        self.refresh
    }

    fn is_full_screen_presentation(&self) -> bool {
        self.full_screen
    }

    /// Settles the card's content in from slightly transparent.
    fn presentation_animation(&self, views: &ViewTree) -> Vec<PropertyAnimation> {
        let Some(from) = ViewProps::read(views, self.view, &ViewProps::new().alpha(1.0)) else {
            return Vec::new();
        };
        vec![PropertyAnimation::between(self.view, from.alpha(0.85), ViewProps::new().alpha(1.0))]
    }
}

/// Card without a nested scrollable.
struct PlainScreen;

impl ScrollDismissable for PlainScreen {}

struct Hooks {
    name: String,
}

impl Presentable for Hooks {
    fn on_did_present(&self, completed: bool) {
        log::debug!("{}: did present (completed: {completed})", self.name);
    }

    fn on_did_dismiss(&self, completed: bool) {
        log::debug!("{}: did dismiss (completed: {completed})", self.name);
    }
}

// ── app ───────────────────────────────────────────────────────────────────

#[derive(Debug, Copy, Clone)]
struct CardPan {
    node: NodeId,
    kind: GestureKind,
    last_ty: f32,
    table_scrolls: bool,
}

pub struct DemoApp {
    stack: DrawerStack,
    nav: NavigationStack,
    config: DrawerConfig,
    /// Pan that began on a card: target node, dismissal recognizer, last
    /// translation, and whether the card's table may scroll alongside.
    pan: Option<CardPan>,
    edge_pop: bool,
    tables: Vec<(NodeId, Rc<ScrollState>)>,
    presented: usize,
    events: usize,
}

impl DemoApp {
    pub fn new(config: DrawerConfig, window: Viewport) -> Self {
        let mut views = ViewTree::new();
        let root_view = views.create_labeled(window.bounds(), "root");
        let first_page = views.create_labeled(Rect::default(), "page 0");
        let nav = NavigationStack::new(&mut views, root_view, first_page, false, config.gestures.edge_width);
        let root = Screen::new("root", root_view)
            .with_status_bar(Rc::new(StatusBarFlag::new(false)))
            .into_ref();
        let stack = DrawerStack::new(views, root, window, config);

        Self {
            stack,
            nav,
            config,
            pan: None,
            edge_pop: false,
            tables: Vec::new(),
            presented: 0,
            events: 0,
        }
    }

    /// Events drained so far.
    pub fn events_seen(&self) -> usize {
        self.events
    }

    pub fn stack(&self) -> &DrawerStack {
        &self.stack
    }

    fn make_card(&mut self, full_screen: bool) -> (ScreenRef, Option<Rc<ScrollState>>) {
        self.presented += 1;
        let name = format!("card {}", self.presented);
        let flags = self.config.flags;
        let frame = self.stack.geometry().presented_frame(full_screen);
        let view = self.stack.views_mut().create_labeled(frame, name.clone());
        let screen = Screen::new(name.clone(), view)
            .with_presentable(Rc::new(Hooks { name }))
            .with_status_bar(Rc::new(StatusBarFlag::new(false)));

        if !flags.present_scrollable {
            return (screen.with_dismissable(Rc::new(PlainScreen)).into_ref(), None);
        }
        let table_frame = Rect::new(0.0, 0.0, frame.width(), frame.height());
        let rows = flags.row_count as f32 * ROW_HEIGHT;
        let scroll = Rc::new(ScrollState::new(table_frame, rows).top_inset(TABLE_TOP_INSET));
        let table = TableScreen {
            view,
            scroll: scroll.clone(),
            refresh: flags.use_refresh_control,
            full_screen,
        };
        (screen.with_dismissable(Rc::new(table)).into_ref(), Some(scroll))
    }

    fn on_key(&mut self, key: Key) {
        match key {
            Key::Enter | Key::Space => {
                let full_screen = key == Key::Space || self.config.flags.use_fullscreen;
                let (card, table) = self.make_card(full_screen);
                match self.stack.present(card, true) {
                    Some(id) => {
                        self.tables.retain(|(n, _)| self.stack.node(*n).is_some());
                        self.tables.extend(table.map(|t| (id, t)));
                    }
                    None => log::info!("present ignored"),
                }
            }
            Key::Escape => {
                self.stack.dismiss_top(true);
            }
            Key::ArrowRight => {
                let page = self.stack.views_mut().create(Rect::default());
                self.nav.push(self.stack.views_mut(), page, true);
            }
            Key::ArrowLeft => {
                self.nav.pop(self.stack.views_mut(), true);
            }
            _ => {}
        }
    }

    fn on_pan(&mut self, sample: &PanSample, width: f32) {
        if sample.phase == PanPhase::Began {
            let kind = GestureKind::classify(sample.start, width, self.config.gestures.edge_width);
            self.pan = self.stack.top_node().map(|node| CardPan {
                node,
                kind,
                last_ty: 0.0,
                table_scrolls: self.table_scrolls_with(node, kind),
            });
            self.edge_pop = self.pan.is_none() && kind == GestureKind::EdgePan(EdgeSide::Left);
        }

        if self.edge_pop {
            self.nav.handle_edge_pan(self.stack.views_mut(), sample);
            if matches!(sample.phase, PanPhase::Ended | PanPhase::Cancelled) {
                self.edge_pop = false;
            }
            return;
        }

        let Some(pan) = self.pan else {
            return;
        };
        let disposition = self.stack.handle_pan(pan.node, pan.kind, sample);
        if disposition == PanDisposition::Yielded && pan.table_scrolls {
            // The table keeps the touch: scroll it natively.
            if let Some((_, table)) = self.tables.iter().find(|(n, _)| *n == pan.node) {
                table.drag_by(sample.translation.y - pan.last_ty);
                if sample.phase == PanPhase::Ended {
                    table.settle();
                }
            }
        }
        self.pan = match sample.phase {
            PanPhase::Ended | PanPhase::Cancelled => None,
            _ => Some(CardPan { last_ty: sample.translation.y, ..pan }),
        };
    }

    /// Whether `node`'s table scroll survives arbitration against a
    /// dismissal pan of `kind`: edge pans block it, free pans run alongside.
    fn table_scrolls_with(&self, node: NodeId, kind: GestureKind) -> bool {
        if !self.tables.iter().any(|(n, _)| *n == node) {
            return false;
        }
        let winners = resolve_candidates(&[kind, GestureKind::NestedScroll]);
        winners.contains(&GestureKind::NestedScroll)
            && winners
                .iter()
                .all(|w| *w == GestureKind::NestedScroll || w.recognizes_simultaneously_with(GestureKind::NestedScroll))
    }

    fn drain_events(&mut self) {
        for event in self.stack.take_events() {
            self.events += 1;
            match &event {
                DrawerEvent::DepthChanged(depth) => log::info!("depth {depth}"),
                DrawerEvent::GestureRejected { .. } | DrawerEvent::RequestRejected { .. } => {
                    log::warn!("{event:?}")
                }
                _ => log::info!("{event:?}"),
            }
        }
    }
}

impl App for DemoApp {
    fn on_input(&mut self, event: &InputEvent) -> AppControl {
        match event {
            InputEvent::Key { key, state: KeyState::Pressed } => self.on_key(*key),
            InputEvent::Resized(size) => {
                self.stack.resize(*size);
            }
            _ => {}
        }
        AppControl::Continue
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_>) -> AppControl {
        let width = ctx.viewport().width;
        for gesture in &ctx.input_frame.gestures {
            match gesture {
                TrackedGesture::Pan(sample) => self.on_pan(sample, width),
                TrackedGesture::Tap(point) => {
                    self.stack.tap(*point);
                }
            }
        }

        self.stack.tick(ctx.time.dt);
        if let Some(out) = self.nav.tick(self.stack.views_mut(), ctx.time.dt) {
            log::info!("page {:?} settled (completed: {})", out.direction, out.completed);
        }
        self.drain_events();
        AppControl::Continue
    }
}
