//! wg-monitor: watches the last-handshake ages of WireGuard peers and
//! phones home when sites drop off the mesh.

pub mod cli;
pub mod ctx;
pub mod dispatch;
pub mod files;
pub mod probe;
pub mod runloop;
