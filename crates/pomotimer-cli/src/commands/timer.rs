use clap::Subcommand;
use pomotimer_core::{Config, HistoryRepository, Result, TimerScreen, TimerSession, TimerView};
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "commands: s=start p=pause r=reset k=skip q=quit";

#[derive(Subcommand)]
pub enum TimerAction {
    /// Run the timer in the foreground, reading commands from stdin
    Run {
        /// Start counting down immediately
        #[arg(long)]
        auto_start: bool,
    },
    /// Print the configured session lengths as JSON
    Plan,
}

fn render(view: &TimerView) {
    let status = if view.is_running { "running" } else { "paused" };
    println!("[{}] {} ({status})", view.phase.label(), view.display);
}

async fn run_interactive(auto_start: bool) -> Result<()> {
    let config = Config::load()?;
    let repo = HistoryRepository::open_default()?;
    let mut screen = TimerScreen::new(TimerSession::new(config.plan()), repo);
    screen.set_observer(render);

    println!("{HELP}");
    if auto_start {
        screen.start();
    }
    render(&screen.view());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let event = match line.trim() {
            "s" | "start" => screen.start(),
            "p" | "pause" => screen.pause(),
            "r" | "reset" => screen.reset(),
            "k" | "skip" => screen.skip(),
            "q" | "quit" => break,
            "" => continue,
            other => {
                eprintln!("unknown command '{other}'; {HELP}");
                continue;
            }
        };
        if let Some(event) = event {
            tracing::debug!(?event, "timer event");
        }
        render(&screen.view());
    }

    screen.shutdown();
    let summary = screen.summary();
    println!(
        "logged today: {} session(s), {} min",
        summary.today_sessions,
        summary.today_secs / 60
    );
    Ok(())
}

pub fn run(action: TimerAction) -> Result<()> {
    match action {
        TimerAction::Run { auto_start } => {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            runtime.block_on(run_interactive(auto_start))
        }
        TimerAction::Plan => {
            let plan = Config::load()?.plan();
            println!("{}", serde_json::to_string_pretty(&plan)?);
            Ok(())
        }
    }
}
