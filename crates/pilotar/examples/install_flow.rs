//! Install/launch/uninstall journey driven against the mock surface.
//!
//! Shows the intended shape of a scenario: selectors templated by the
//! scenario author, a default-timeout wait for fast UI settling, an
//! explicit long timeout for the install itself, and diagnostic
//! screenshots that never decide the run's outcome.
//!
//! Run with `cargo run --example install_flow`; narration goes to stderr
//! via `tracing`, the report summary to stdout.

use pilotar::mock::MockChannel;
use pilotar::{DirStore, Dispatcher, PollSpec, Scenario, ScenarioRunner, Selector};
use std::time::Duration;

const GAME_NAME: &str = "Sample Game";
const GAME_ID: u64 = 1234;

fn scripted_surface() -> MockChannel {
    let mut surface = MockChannel::new();

    // Elements the scenario clicks or reads.
    surface.set_text("#search", "");
    surface.set_text(
        format!(".results-container .game-search-result[data-game-id='{GAME_ID}']"),
        GAME_NAME,
    );
    surface.set_text("#modal-force-close", "Force close");
    surface.set_text("#sidebar section[data-tab='downloads']", "Downloads");
    surface.set_text(
        format!(".download-row-item.finished[data-game-id='{GAME_ID}'] .row--title"),
        GAME_NAME,
    );
    surface.set_text(".downloads-clear-all", "Clear all");
    surface.set_text(".no-active-downloads", "No active downloads");
    surface.set_text(".manage-game", "Manage");
    surface.set_text(".manage-cave", "Manage install");
    surface.set_text(".manage-uninstall", "Uninstall");

    // The main action button transitions as the install progresses; each
    // polled query observes the next state, and the final state repeats.
    surface.script_text(
        format!(".main-action[data-game-id='{GAME_ID}']"),
        [
            "Install",
            "Installing 12%",
            "Installing 64%",
            "Launch",
            "Running",
            "Running",
            "Launch",
            "Launch",
            "Install",
        ],
    );

    surface
}

fn install_flow() -> Scenario<MockChannel> {
    let main_action = Selector::new(format!(".main-action[data-game-id='{GAME_ID}']"));
    let search = Selector::new("#search");
    let game_result = Selector::new(format!(
        ".results-container .game-search-result[data-game-id='{GAME_ID}']"
    ));
    let download_row = Selector::new(format!(
        ".download-row-item.finished[data-game-id='{GAME_ID}'] .row--title"
    ));

    let action = main_action;
    let a1 = action.clone();
    let a2 = action.clone();
    let a3 = action.clone();
    let a4 = action.clone();
    let a5 = action;

    Scenario::new("install flow")
        .step("searching for known game", move |d| {
            d.click(&search)?;
            d.set_value(&search, GAME_NAME)
        })
        .step("opening it", move |d| d.click(&game_result))
        .step("installing it", move |d| {
            d.wait_for_text(&a1, "Install")?;
            d.click(&a1)
        })
        .step("launching it", move |d| {
            // Install may take a while; give it its own budget instead of
            // raising the global default.
            d.wait_for_text_with_timeout(&a2, "Launch", Duration::from_secs(30))?;
            d.click(&a2)
        })
        .step("force-closing it", move |d| {
            d.wait_for_text(&a3, "Running")?;
            d.click(&a3)?;
            d.click(&Selector::new("#modal-force-close"))
        })
        .step("making sure it's closed", move |d| {
            d.wait_for_text(&a4, "Launch")
        })
        .step("switching to downloads tab", |d| {
            d.click(&Selector::new("#sidebar section[data-tab='downloads']"))
        })
        .step("making sure our download shows up as finished", move |d| {
            d.wait_for_text(&download_row, GAME_NAME)
        })
        .snapshot("finished download")
        .step("clearing downloads", |d| {
            d.click(&Selector::new(".downloads-clear-all"))
        })
        .step("making sure downloads list is empty now", |d| {
            d.wait_for_visible(&Selector::new(".no-active-downloads"))
        })
        .step("uninstalling it", move |d| {
            d.click(&Selector::new(".manage-game"))?;
            d.click(&Selector::new(".manage-cave"))?;
            d.click(&Selector::new(".manage-uninstall"))?;
            d.wait_for_text(&a5, "Install")
        })
}

fn main() {
    pilotar::trace::init();

    let dispatcher = Dispatcher::new(scripted_surface())
        .with_store(DirStore::new(std::env::temp_dir().join("pilotar-install-flow")))
        .with_defaults(
            PollSpec::new()
                .with_timeout(Duration::from_secs(5))
                .with_interval(Duration::from_millis(50)),
        );

    let mut runner = ScenarioRunner::new(dispatcher);
    let report = runner.run(install_flow());

    println!("{}", report.summary());
    if !report.is_completed() {
        std::process::exit(1);
    }
}
