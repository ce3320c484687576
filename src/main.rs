mod attr;
mod config;
mod error;
mod fs;
mod handle_table;
mod listing;
mod pathmap;
mod reader;
mod store;
mod util;
mod zk;

use attr::MissingNodePolicy;
use clap::Parser;
use config::Config;
use error::ProjectionError;
use fs::ZkFs;
use fuse3::MountOptions;
use fuse3::path::Session;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::signal::unix::{SignalKind, signal};
use zk::ZkStore;

/// Exit status when the store cannot be reached at startup.
const EXIT_CONNECT_FAILED: i32 = 2;

#[derive(Parser, Debug)]
#[command(name = "zkfs-rs")]
#[command(about = "Read-only FUSE3 view of a ZooKeeper tree; each node's data is exposed as .node")]
struct Cli {
    /// Mount point for the virtual filesystem.
    mountpoint: PathBuf,

    /// Comma-separated ZooKeeper endpoints, e.g. zk1:2181,zk2:2181.
    endpoints: String,

    /// Allow other users to access the mount (passes allow_other to FUSE).
    #[arg(long, default_value_t = false)]
    allow_other: bool,

    /// Permit mounting on a non-empty directory.
    #[arg(long, default_value_t = false)]
    nonempty: bool,

    /// Attribute and entry TTL handed to the kernel, in milliseconds.
    #[arg(long, default_value_t = 1000)]
    attr_ttl_ms: u64,

    /// Give up connecting to the store after this many milliseconds.
    #[arg(long, default_value_t = 10_000)]
    connect_timeout_ms: u64,

    /// Report ENOENT when stat of a .node file cannot fetch its node, instead
    /// of an empty file.
    #[arg(long, default_value_t = false)]
    strict_attr: bool,
}

fn unmount(mountpoint: &Path) -> nix::Result<()> {
    nix::mount::umount(mountpoint)
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let missing_node = if cli.strict_attr {
        MissingNodePolicy::Strict
    } else {
        MissingNodePolicy::Lenient
    };
    let config = Config::new(
        cli.mountpoint,
        &cli.endpoints,
        Duration::from_millis(cli.attr_ttl_ms),
        Duration::from_millis(cli.connect_timeout_ms),
        missing_node,
    )?;

    let store = match ZkStore::connect(&config.endpoints, config.connect_timeout).await {
        Ok(store) => store,
        Err(err) => {
            log::error!("{:#}", anyhow::Error::from(ProjectionError::Connection(err)));
            std::process::exit(EXIT_CONNECT_FAILED);
        }
    };
    log::info!("connected to {}", config.endpoints.join(","));

    let fs = ZkFs::new(Arc::new(store), config.attr_ttl, config.missing_node);

    let mut mount_opts = MountOptions::default();
    mount_opts.fs_name("zkfs-rs");
    mount_opts.read_only(true);
    mount_opts.allow_other(cli.allow_other);
    mount_opts.nonempty(cli.nonempty);

    let session = Session::new(mount_opts);
    let handle = session.mount(fs, &config.mountpoint).await?;
    log::info!("mounted at {}", config.mountpoint.display());

    let mut mount_task = tokio::spawn(handle);
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    // A failed unmount (e.g. busy mount) leaves the filesystem serving until
    // the next signal.
    loop {
        tokio::select! {
            res = &mut mount_task => {
                res??;
                return Ok(());
            }
            _ = sigint.recv() => (),
            _ = sigterm.recv() => (),
        }

        match unmount(&config.mountpoint) {
            Ok(()) => {
                log::info!("unmounted {}", config.mountpoint.display());
                break;
            }
            Err(err) => log::warn!(
                "unmount of {} failed: {err}; retrying on next signal",
                config.mountpoint.display()
            ),
        }
    }

    mount_task.await??;
    Ok(())
}
