//! The orchestrator: probe, step, sort, plan, dispatch, sleep.

use std::time::Duration;

use common::compose::{self, compose_body};
use common::lang::Translation;
use common::now_unix;
use common::registry::PeerRegistry;
use common::schedule::ReportScheduler;
use tokio::time::sleep;

use crate::ctx::MonitorCtx;
use crate::dispatch::Dispatcher;
use crate::probe::{self, HandshakeRow, ProbeError};

/// Retry cadence while the interface is gone.
const INTERFACE_RETRY: Duration = Duration::from_secs(10);

/// Run cycles until a fatal probe classification. Mid-run, a vanished
/// interface is waited out and transient failures skip the cycle; only
/// a missing tool or lost privileges end the loop.
pub async fn run(
    ctx: &MonitorCtx,
    translation: &Translation,
    server_name: &str,
    dispatcher: &Dispatcher,
) -> ProbeError {
    let mut registry = PeerRegistry::new();
    let mut scheduler = ReportScheduler::new(ctx.schedule.clone());
    let mut cycle: u64 = 0;

    loop {
        let rows = match probe::latest_handshakes(&ctx.tool, &ctx.interface).await {
            Ok(rows) => rows,
            Err(ProbeError::NoSuchInterface(_)) => {
                // Registry and scheduler state survive the wait; the
                // first probe after the interface returns is this
                // cycle's probe.
                match wait_for_interface(ctx).await {
                    Ok(rows) => rows,
                    Err(fatal) => return fatal,
                }
            }
            Err(fatal @ (ProbeError::NeedElevation | ProbeError::ToolMissing(_))) => return fatal,
            Err(transient) => {
                eprintln!("[MON] probe failed: {transient}; skipping cycle");
                sleep(ctx.interval).await;
                continue;
            }
        };
        apply_rows(&mut registry, rows);

        let now = now_unix();
        let outcome = registry.step_peers(&ctx.peers, now, ctx.monitor_start, ctx.lost_after);
        if ctx.progress {
            print_progress(&registry, ctx);
        }

        let buckets = registry.sorted();
        let plan = scheduler.plan(now, cycle, outcome.changed_any, buckets.all_present());
        let success = if plan.report {
            let body = compose_body(translation, server_name, &buckets, &registry, cycle).join("\n");
            let ok = dispatcher.send(&body, cycle, &buckets).await;
            if !ok {
                eprintln!("[MON] report delivery failed");
            }
            ok
        } else {
            false
        };
        scheduler.record(now, success, plan, outcome.only_returns, buckets.all_present());

        cycle += 1;
        sleep(ctx.interval).await;
    }
}

/// Fold probe rows into the registry.
pub fn apply_rows(registry: &mut PeerRegistry, rows: Vec<HandshakeRow>) {
    for row in rows {
        match row {
            HandshakeRow::Seen { key, secs } => registry.note_handshake(&key, secs),
            HandshakeRow::NeverSeen { key } => registry.note_never_seen(&key),
        }
    }
}

/// Block until the interface exists again, probing every 10 seconds.
/// Only a missing tool or lost privileges abort the wait.
async fn wait_for_interface(ctx: &MonitorCtx) -> Result<Vec<HandshakeRow>, ProbeError> {
    eprintln!(
        "[MON] interface {} is gone; retrying every {}s",
        ctx.interface,
        INTERFACE_RETRY.as_secs()
    );
    loop {
        sleep(INTERFACE_RETRY).await;
        match probe::latest_handshakes(&ctx.tool, &ctx.interface).await {
            Ok(rows) => {
                eprintln!("[MON] interface {} is back", ctx.interface);
                return Ok(rows);
            }
            Err(ProbeError::NoSuchInterface(_)) => continue,
            Err(fatal @ (ProbeError::NeedElevation | ProbeError::ToolMissing(_))) => {
                return Err(fatal)
            }
            Err(transient) => {
                eprintln!("[MON] probe failed while waiting: {transient}");
                continue;
            }
        }
    }
}

fn print_progress(registry: &PeerRegistry, ctx: &MonitorCtx) {
    for peer in registry.peers() {
        if !ctx.peers.contains(&peer.key) {
            continue;
        }
        match peer.latest_handshake {
            Some(secs) if !peer.never_seen => println!(
                "[MON] {}: {}, last handshake {}",
                peer.key,
                peer.state.label(),
                compose::format_timestamp(secs)
            ),
            _ => println!("[MON] {}: {}, never seen", peer.key, peer.state.label()),
        }
    }
}
