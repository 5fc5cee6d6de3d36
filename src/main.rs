use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{ArgAction, ArgGroup, Parser};
use nix::unistd::Pid;
use procbeat::{
    Config, DetachPolicy, HookCommand, Inspect, LogWriter, ProcessDescriptor, PromptSelector,
    Resolver, RestartPolicy, Subscribe, Supervisor, SystemInspector,
};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// procbeat - restart a running process whenever it dies
#[derive(Parser, Debug)]
#[command(name = "procbeat")]
#[command(version, about, long_about = None)]
#[command(group(ArgGroup::new("target").required(true).args(["pid", "name"])))]
struct Cli {
    /// Pid of the process to supervise
    #[arg(long)]
    pid: Option<i32>,

    /// Name (case-insensitive substring) of the process to supervise; prompts when several match
    #[arg(long)]
    name: Option<String>,

    /// Liveness poll interval in milliseconds
    #[arg(long, default_value_t = 100)]
    interval: u64,

    /// Command run after every death, before the restart (split on spaces)
    #[arg(long = "cmd")]
    hook: Option<String>,

    /// Restart the process after it dies
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    restart: bool,

    /// Place restarted processes in their own session / process group
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    detach: bool,

    /// Never replay the command line into the process's terminal; re-spawn it instead
    #[arg(long)]
    no_inject: bool,
}

impl Cli {
    fn config(&self) -> Config {
        Config {
            interval: Duration::from_millis(self.interval),
            hook: self.hook.as_deref().and_then(HookCommand::parse),
            restart: RestartPolicy::from_flag(self.restart),
            detach: DetachPolicy {
                enabled: self.detach,
                inject: !self.no_inject,
            },
            ..Config::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let cfg = cli.config();
    let inspector: Arc<dyn Inspect> = Arc::new(SystemInspector::default());
    let target = resolve(&cli, Arc::clone(&inspector)).await?;

    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let exit = Supervisor::builder(cfg)
        .with_subscribers(subs)
        .with_inspector(inspector)
        .build()
        .run(target)
        .await
        .map_err(|e| {
            let context = if e.is_injection_failure() {
                "terminal replay of the command line failed"
            } else {
                "supervision stopped"
            };
            anyhow::Error::new(e).context(context)
        })?;

    tracing::info!(?exit, "run finished");
    Ok(())
}

/// Resolves the target on the blocking pool: inspection runs external tools and the
/// name lookup reads the selection from stdin.
async fn resolve(cli: &Cli, inspector: Arc<dyn Inspect>) -> Result<ProcessDescriptor> {
    let pid = cli.pid;
    let name = cli.name.clone();
    tokio::task::spawn_blocking(move || {
        let resolver = Resolver::new(inspector);
        match (pid, name) {
            (Some(pid), _) => resolver
                .resolve_by_pid(Pid::from_raw(pid))
                .with_context(|| format!("resolving pid {pid}")),
            (None, Some(name)) => resolver
                .resolve_by_name(&name, &PromptSelector)
                .with_context(|| format!("resolving process named {name:?}")),
            (None, None) => anyhow::bail!("either --pid or --name is required"),
        }
    })
    .await
    .context("resolver task failed")?
}
