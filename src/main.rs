//! Entry point for the **hyprsnap** daemon.
//!
//! Binds the HTTP listener, starts the dispatcher thread, registers the
//! global shortcuts, serves HTTP on a background thread and then waits for
//! SIGINT/SIGTERM, releasing every shortcut before exiting.

use hyprsnap::applier::WindowApplier;
use hyprsnap::config::Config;
use hyprsnap::dispatcher::{DispatchHandle, Dispatcher};
use hyprsnap::http::listener::RequestListener;
use hyprsnap::hyprland::ipc;
use hyprsnap::hyprland::shortcuts::{HyprlandShortcutEvents, HyprlandShortcuts};
use hyprsnap::hyprland::wm::HyprlandWm;
use hyprsnap::shortcuts::{BindingTable, ShortcutRegistry};
use hyprsnap::shutdown::{Shutdown, ShutdownReason, TERMINATION_SIGNALS};
use hyprsnap::traits::ActionSource;
use std::sync::mpsc::Sender;
use log::{error, info, warn};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Resolve the config directory (`$XDG_CONFIG_HOME/hyprsnap`).
fn config_dir() -> std::path::PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME").unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        format!("{}/.config", home)
    });
    std::path::PathBuf::from(base).join("hyprsnap")
}

/// Try to load the config from `$XDG_CONFIG_HOME/hyprsnap/config.json`,
/// falling back to compiled-in defaults.
fn load_config() -> Config {
    let path = config_dir().join("config.json");
    match Config::load(&path) {
        Ok(cfg) => {
            info!("loaded config from {}", path.display());
            cfg
        }
        Err(e) => {
            info!("no config file ({}), using defaults", e);
            Config::default()
        }
    }
}

fn is_version_flag(arg: &str) -> bool {
    matches!(arg, "--version" | "-v" | "-V")
}

fn print_help(config: &Config) {
    println!("hyprsnap v{} - window snapping for Hyprland", VERSION);
    println!();
    println!("Usage:");
    println!("  hyprsnap              Start the daemon");
    println!("  hyprsnap --version    Display version information");
    println!("  hyprsnap --help       Display this help message");
    println!();
    println!("Shortcuts ({} + key):", config.shortcuts.modifiers);
    for b in &config.shortcuts.bindings {
        println!("  {:<20}{}", b.key, b.action);
    }
    println!();
    println!("HTTP API:");
    println!("  POST http://{}/snap/{{action}}", config.server.bind_addr());
    println!("  Actions: left, right, top, bottom, maximize, center");
}

//  Main

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| is_version_flag(a)) {
        println!("hyprsnap v{}", VERSION);
        return;
    }

    let config = load_config();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help(&config);
        return;
    }

    run_daemon(config);
}

fn run_daemon(config: Config) {
    if !ipc::instance_available() {
        warn!("HYPRLAND_INSTANCE_SIGNATURE is not set: windows cannot be moved and shortcuts cannot be registered");
        warn!("start hyprsnap from within a Hyprland session (e.g. exec-once = hyprsnap)");
    }

    // Bind first: an unusable port is the one fatal startup error.
    let listener = match RequestListener::bind(config.server.bind_addr()) {
        Ok(l) => l,
        Err(e) => {
            error!("failed to bind {}: {}", config.server.bind_addr(), e);
            std::process::exit(1);
        }
    };

    let shutdown = Shutdown::new();
    if let Err(e) = shutdown.watch_signals(&TERMINATION_SIGNALS) {
        warn!("failed to install signal handlers, shortcuts will not be released on exit: {}", e);
    }

    let (dispatcher, handle) = Dispatcher::new(
        WindowApplier::new(HyprlandWm::new()),
        config.dispatcher.queue_capacity,
    );
    if let Err(e) = dispatcher.spawn() {
        error!("failed to start dispatcher: {}", e);
        std::process::exit(1);
    }

    let mut registry = ShortcutRegistry::new(HyprlandShortcuts::new());
    let combos = config.shortcuts.combos();
    let registered = registry.register_all(&combos);
    if registered < combos.len() {
        warn!("{} of {} shortcut(s) could not be registered", combos.len() - registered, combos.len());
    }
    if !registry.is_empty() {
        spawn_shortcut_events(registry.bindings(), handle.clone());
    }

    if let Err(e) = spawn_listener(listener, handle, shutdown.notifier()) {
        error!("failed to start listener thread: {}", e);
        let _ = shutdown
            .notifier()
            .send(ShutdownReason::SourceFailed(e.to_string()));
    } else {
        info!("hyprsnap running");
    }

    let reason = shutdown.wait();
    registry.unregister_all();
    std::process::exit(reason.exit_code());
}

//  Helpers

fn spawn_listener(
    mut listener: RequestListener,
    sink: DispatchHandle,
    stop: Sender<ShutdownReason>,
) -> std::io::Result<()> {
    std::thread::Builder::new()
        .name("hyprsnap-listener".into())
        .spawn(move || {
            let reason = match listener.run(sink) {
                Ok(()) => "request listener stopped".to_string(),
                Err(e) => format!("request listener error: {}", e),
            };
            error!("{}", reason);
            let _ = stop.send(ShutdownReason::SourceFailed(reason));
        })?;
    Ok(())
}

fn spawn_shortcut_events(bindings: BindingTable, sink: DispatchHandle) {
    let spawned = std::thread::Builder::new()
        .name("hyprsnap-shortcuts".into())
        .spawn(move || {
            let mut source = HyprlandShortcutEvents::new(bindings);
            if let Err(e) = source.run(sink) {
                error!("shortcut event source error: {}", e);
            }
        });
    if let Err(e) = spawned {
        error!("failed to start shortcut event thread: {}", e);
    }
}
