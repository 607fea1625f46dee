//! pagekit - headless page behaviours for server-rendered sites
//!
//! Replays a scenario (a page fixture plus a sequence of events and waits)
//! against the behaviours and prints the resulting page.

mod app;
mod config;
mod page;
mod state;
mod transport;
mod ui;

use anyhow::{bail, Context, Result};
use app::App;
use config::SiteConfig;
use page::{HeadlessPage, Page, Scenario, ScenarioStep};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use transport::SimulatedTransport;

/// One animation frame
const FRAME: Duration = Duration::from_millis(16);
/// Upper bound on how long to let timers settle after the last step
const SETTLE_LIMIT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pagekit=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let mut args = std::env::args().skip(1);
    let Some(scenario_path) = args.next().map(PathBuf::from) else {
        bail!("usage: pagekit <scenario.json> [config.json]");
    };
    let config = match args.next() {
        Some(path) => SiteConfig::load_from(Path::new(&path))
            .with_context(|| format!("failed to load config from {path}"))?,
        None => SiteConfig::load()?,
    };
    let scenario = Scenario::load(&scenario_path)
        .with_context(|| format!("failed to load scenario {}", scenario_path.display()))?;

    let transport = SimulatedTransport::new(config.timings.submit_latency());
    let mut app = App::new(scenario.page.build(), transport, config)?;
    app.init();

    run_scenario(&mut app, &scenario.steps).await?;
    print_report(&app);

    Ok(())
}

async fn run_scenario(
    app: &mut App<HeadlessPage, SimulatedTransport>,
    steps: &[ScenarioStep],
) -> Result<()> {
    for step in steps {
        match step {
            ScenarioStep::Wait { wait_ms } => {
                run_frames(app, Duration::from_millis(*wait_ms), false).await;
            }
            ScenarioStep::Event(event) => {
                let event = event.apply(app.page_mut())?;
                tracing::debug!("Dispatching {event:?}");
                let prevented = app.dispatch(event);
                if prevented {
                    tracing::debug!("Default action prevented");
                }
                app.tick(Instant::now());
            }
        }
    }

    // Let pending timers and submissions run out
    run_frames(app, SETTLE_LIMIT, true).await;
    Ok(())
}

/// Tick once per frame for `span`, stopping early on idle if asked to
async fn run_frames(
    app: &mut App<HeadlessPage, SimulatedTransport>,
    span: Duration,
    until_idle: bool,
) {
    let deadline = Instant::now() + span;
    loop {
        let now = Instant::now();
        app.tick(now);
        if now >= deadline || (until_idle && app.is_idle()) {
            break;
        }
        tokio::time::sleep(FRAME.min(deadline - now)).await;
    }
}

fn print_report(app: &App<HeadlessPage, SimulatedTransport>) {
    let page = app.page();
    println!("{}", page.outer_html(page.body()));

    for notification in app.notifications().active() {
        println!("notification [{}] {}", notification.severity, notification.message);
    }
    for url in page.history() {
        println!("history {url}");
    }
    for url in page.navigations() {
        println!("navigate {url}");
    }
}
