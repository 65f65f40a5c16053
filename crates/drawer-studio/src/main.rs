mod demo;

use std::time::Duration;

use anyhow::{Context, Result};
use drawer_engine::coords::{Vec2, Viewport};
use drawer_engine::input::Key;
use drawer_engine::logging::{init_logging, LoggingConfig};
use drawer_engine::runtime::{InputScript, Runtime, RuntimeConfig};
use drawer_ui::config::DrawerConfig;

use demo::DemoApp;

/// Environment variable naming a TOML file that replaces the bundled config.
const CONFIG_ENV: &str = "DRAWER_CONFIG";

/// Time left after the last scripted event for transitions to finish.
const SETTLE: Duration = Duration::from_secs(2);

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    println!();
    println!("  ╔════════════════════════════════════════╗");
    println!("  ║          DRAWER STUDIO  v0.1           ║");
    println!("  ║   headless run  ·  scripted gestures   ║");
    println!("  ╚════════════════════════════════════════╝");
    println!();

    let config = load_config()?;
    let viewport = RuntimeConfig::default().viewport;
    let script = script(viewport);
    let runtime = RuntimeConfig {
        title: "drawer-studio".to_string(),
        viewport,
        max_duration: script.end() + SETTLE,
        touch_slop: config.gestures.touch_slop,
        ..RuntimeConfig::default()
    };
    let mut app = DemoApp::new(config, viewport);

    let summary = Runtime::run(runtime, script, &mut app).context("demo run failed")?;
    println!(
        "  {} frames, {} input events, {} drawer events, final depth {}",
        summary.frames,
        summary.events,
        app.events_seen(),
        app.stack().depth()
    );
    Ok(())
}

fn load_config() -> Result<DrawerConfig> {
    match std::env::var(CONFIG_ENV) {
        Ok(path) => DrawerConfig::load(&path).with_context(|| format!("loading {CONFIG_ENV}={path}")),
        Err(_) => DrawerConfig::from_toml_str(include_str!("../drawer.toml")).context("bundled drawer.toml"),
    }
}

/// Presents, swipes, cancels, rotates and pages through the stack.
fn script(window: Viewport) -> InputScript {
    let mid = window.width / 2.0;
    InputScript::new()
        // ── present, then swipe away ──────────────────────────────────────
        .key(200, Key::Enter)
        .drag(1_200, Vec2::new(mid, 130.0), Vec2::new(mid, 700.0), 320)
        // ── two cards; a short drag springs back ──────────────────────────
        .key(2_400, Key::Enter)
        .key(3_200, Key::Space)
        .drag(4_200, Vec2::new(mid, 200.0), Vec2::new(mid, 260.0), 480)
        // ── rotation while idle, then mid-transition ──────────────────────
        .resize(5_400, Viewport::new(window.height, window.width))
        .key(6_000, Key::Escape)
        .resize(6_100, window)
        // ── dimming tap dismisses the last card ───────────────────────────
        .tap(7_200, Vec2::new(mid, 20.0))
        // ── page push and edge pop on the root ────────────────────────────
        .key(8_200, Key::ArrowRight)
        .drag(9_000, Vec2::new(4.0, 400.0), Vec2::new(300.0, 400.0), 240)
        .key(10_000, Key::Escape)
}
