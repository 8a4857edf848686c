use clap::Parser;
use gauntlet_core::FlowController;
use std::path::PathBuf;

mod outbox;
mod settings;
mod term;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,

    /// Force a seed instead of random
    #[arg(short, long)]
    seed: Option<u64>,

    /// TOML file with flow settings
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .init();

    let settings = match &args.config {
        Some(path) => settings::Settings::load(path)?,
        None => settings::Settings::default(),
    };
    let seed = args.seed.or(settings.seed).unwrap_or_else(rand::random);
    log::debug!("seed: {}", seed);

    let mut config = settings.flow;
    config.seed = seed;
    let notifier = outbox::OutboxNotifier::new(settings.outbox);
    let flow = FlowController::with_notifier(config, notifier);

    log::debug!("App started");
    term::Terminal::new(flow).run(std::io::stdin().lock(), std::io::stdout().lock())
}
