mod commands;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use crate::commands::{GrabOptions, grab_cmd};
use grabbox::config::{Scope, Settings, UnpackerKind, get_settings_path};

/// Download a box and unpack it into an LXC container
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Args {
    /// The archive to use. Setting this option will suppress the download.
    #[arg(long, conflicts_with = "url")]
    archive: Option<PathBuf>,

    /// The url of the box
    #[arg(long)]
    url: Option<String>,

    /// The name of the box
    #[arg(long)]
    name: Option<String>,

    /// Directory containers are created in
    #[arg(long)]
    lxc_path: Option<PathBuf>,

    /// Unpack with the system `tar` instead of the builtin reader
    #[arg(long)]
    external: bool,

    /// Unpack over an existing container
    #[arg(long)]
    force: bool,

    /// Create a privileged container (requires root)
    #[arg(long, conflicts_with = "user")]
    system: bool,

    /// Create an unprivileged container for the current user
    #[arg(long, conflicts_with = "system")]
    user: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let scope = if args.user && !args.system {
        Scope::User
    } else {
        Scope::System
    };

    let mut settings = Settings::load(&get_settings_path()?)?;
    if args.lxc_path.is_some() {
        settings.lxc_path = args.lxc_path;
    }
    if args.external {
        settings.unpacker = UnpackerKind::External;
    }

    let lxc_path = settings.lxc_path(scope)?;

    let options = GrabOptions {
        archive: args.archive,
        url: args.url,
        name: args.name,
        force: args.force,
    };

    grab_cmd(&lxc_path, scope, settings.unpacker, options).await
}
