//! wg-monitor entry point: resolve configuration and files, derive the
//! server name, then hand off to the cycle loop.

use std::collections::BTreeSet;
use std::process::exit;
use std::time::Duration;

use clap::Parser;
use common::compose::display_name;
use common::lang::Catalog;
use common::now_unix;
use common::schedule::ReminderSchedule;
use tokio::time::sleep;

use wg_monitor::cli::{exit as code, Opts};
use wg_monitor::ctx::{wg_tool, DispatchMode, MonitorCtx};
use wg_monitor::dispatch::Dispatcher;
use wg_monitor::files::{self, ListError};
use wg_monitor::probe::{self, ProbeError};
use wg_monitor::runloop;

#[tokio::main]
async fn main() {
    let opts = match Opts::try_parse() {
        Ok(opts) => opts,
        Err(e) => {
            // clap's own exit code differs from ours; print its message
            // and map the failure onto the stable code.
            let _ = e.print();
            exit(if e.use_stderr() { code::CLI } else { code::OK });
        }
    };
    exit(run(opts).await);
}

async fn run(opts: Opts) -> i32 {
    let catalog = Catalog::builtin();
    if opts.list_languages {
        for language in catalog.visible_languages() {
            println!("{language}");
        }
        return code::OK;
    }
    let Some(translation) = catalog.get(&opts.lang) else {
        eprintln!(
            "[MON] unknown language {:?}; available: {}",
            opts.lang,
            catalog.visible_languages().join(", ")
        );
        return code::UNKNOWN_LANGUAGE;
    };

    if opts.reminders.len() != 5 {
        eprintln!(
            "[MON] --reminders needs exactly 5 delays, got {}",
            opts.reminders.len()
        );
        return code::CLI;
    }
    let mut reminders = [0u64; 5];
    reminders.copy_from_slice(&opts.reminders);

    // Peer list is always required.
    let dirs = files::search_dirs();
    let dir_refs: Vec<&std::path::Path> = dirs.iter().map(|p| p.as_path()).collect();
    let Some(peer_path) = files::locate(
        opts.peer_file.as_deref(),
        &opts.interface,
        files::PEERS_BASE,
        files::PEERS_EXT,
        &dir_refs,
    ) else {
        eprintln!(
            "[MON] no peer list found for {} (looked for --peer-file, ./{}{}, ./{}, {}/...)",
            opts.interface,
            opts.interface,
            files::PEERS_EXT,
            files::PEERS_BASE,
            files::ETC_DIR
        );
        return code::MISSING_FILES;
    };
    let peer_list = match files::read_peer_list(&peer_path) {
        Ok(list) => list,
        Err(e) => return report_list_error(e),
    };
    for line in &peer_list.rejected {
        eprintln!("[MON] {}: ignoring invalid peer entry {line:?}", peer_path.display());
    }
    let peers: BTreeSet<String> = peer_list.entries.into_iter().collect();
    println!(
        "[MON] watching {} peer(s) on {} (list: {})",
        peers.len(),
        opts.interface,
        peer_path.display()
    );

    // URLs are required whenever the mode uses them.
    let mode = match (&opts.command, opts.both) {
        (Some(_), true) => DispatchMode::Both,
        (Some(_), false) => DispatchMode::Command,
        (None, _) => DispatchMode::Urls,
    };
    let urls = if matches!(mode, DispatchMode::Urls | DispatchMode::Both) {
        let Some(url_path) = files::locate(
            opts.url_file.as_deref(),
            &opts.interface,
            files::URLS_BASE,
            files::URLS_EXT,
            &dir_refs,
        ) else {
            eprintln!(
                "[MON] no notification URL list found for {} and no --command given",
                opts.interface
            );
            return code::MISSING_FILES;
        };
        match files::read_url_list(&url_path) {
            Ok(list) => list.entries,
            Err(e) => return report_list_error(e),
        }
    } else {
        Vec::new()
    };

    ctrlc_handler();

    // First contact with the tool doubles as the startup health check:
    // it surfaces a missing tool, lost privileges or an absent interface
    // before the loop starts.
    let tool = wg_tool();
    let server_key = loop {
        match probe::own_public_key(&tool, &opts.interface).await {
            Ok(key) => break key,
            Err(ProbeError::NeedElevation) => {
                if opts.elevated {
                    eprintln!("[MON] wg still refuses after sudo; giving up");
                    return code::PERMISSIONS;
                }
                return reexec_with_sudo();
            }
            Err(ProbeError::NoSuchInterface(iface)) if opts.wait_for_interface => {
                eprintln!("[MON] interface {iface} does not exist yet; waiting");
                sleep(Duration::from_secs(10)).await;
            }
            Err(ProbeError::NoSuchInterface(iface)) => {
                eprintln!(
                    "[MON] interface {iface} does not exist (use --wait-for-interface to wait for it)"
                );
                return code::FAILURE;
            }
            Err(ProbeError::ToolMissing(path)) => {
                eprintln!("[MON] {path} not found; point the WG environment variable at the wg tool");
                return code::TOOL_MISSING;
            }
            Err(ProbeError::NetworkFailure) => {
                eprintln!("[MON] wg cannot talk to the kernel (address family unsupported)");
                return code::NETWORK;
            }
            Err(ProbeError::Generic(msg)) => {
                eprintln!("[MON] wg failed at startup: {msg}");
                return code::EXCEPTION;
            }
        }
    };
    let server_name = display_name(&server_key, translation);
    let subject = translation.subject.replace("$serverName", &server_name);

    let ctx = MonitorCtx {
        interface: opts.interface,
        tool,
        interval: Duration::from_secs(opts.interval),
        lost_after: Duration::from_secs(opts.timeout),
        schedule: ReminderSchedule::from_secs(reminders),
        peers,
        progress: opts.progress,
        monitor_start: now_unix(),
    };
    let dispatcher = match Dispatcher::new(
        mode,
        opts.command,
        urls,
        opts.ca_bundle.as_deref(),
        subject,
        opts.dry_run,
    ) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("[MON] {e:#}");
            return code::EXCEPTION;
        }
    };

    println!("[MON] reporting as {server_name}");
    match runloop::run(&ctx, translation, &server_name, &dispatcher).await {
        ProbeError::ToolMissing(path) => {
            eprintln!("[MON] {path} disappeared mid-run");
            code::TOOL_MISSING
        }
        ProbeError::NeedElevation => {
            eprintln!("[MON] wg revoked our privileges mid-run");
            code::PERMISSIONS
        }
        ProbeError::NetworkFailure => code::NETWORK,
        other => {
            eprintln!("[MON] fatal: {other}");
            code::EXCEPTION
        }
    }
}

fn report_list_error(e: ListError) -> i32 {
    eprintln!("[MON] {e}");
    match e {
        ListError::NotUtf8(_) => code::NOT_UTF8,
        ListError::Empty(_) => code::EMPTY_FILE,
        ListError::Io(_, _) => code::FAILURE,
    }
}

fn ctrlc_handler() {
    let result = ctrlc::set_handler(|| {
        println!("[MON] terminated");
        exit(code::OK);
    });
    if let Err(e) = result {
        eprintln!("[MON] could not install SIGINT handler: {e}");
    }
}

/// Replace this process with a sudo invocation of the same argv plus the
/// internal marker, so the probe can open the device. Only reached when
/// wg reported "Operation not permitted" on the first contact.
fn reexec_with_sudo() -> i32 {
    use std::os::unix::process::CommandExt;

    eprintln!("[MON] wg needs elevated privileges; re-executing under sudo");
    let args: Vec<String> = std::env::args().collect();
    let err = std::process::Command::new("sudo")
        .args(&args)
        .arg("--elevated")
        .exec();
    // exec only returns on failure.
    eprintln!("[MON] sudo re-exec failed: {err}");
    code::PERMISSIONS
}
