use std::io::BufRead;

use clap::{Parser, Subcommand};
use heapviz::{
    errors::as_io_error,
    options::CommonOptions,
    plan::{BuildStyle, Operation, plan},
    presentation::Presentation,
    session::{Controller, HeapSession, RunOutcome},
    terminal::{Command, TerminalView, parse_command},
};
use tokio::sync::mpsc;

/// Binary heap visualiser
#[derive(Debug, Parser)]
#[command(name = "heapviz")]
#[command(about = "Watch, or practise, heap construction, removal and heapsort.", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Build a heap from random values
    Build {
        /// How the heap is built
        #[arg(long, value_enum, default_value_t = BuildStyle::BottomUp)]
        style: BuildStyle,

        /// Pick the swaps yourself instead of watching them
        #[arg(long)]
        manual: bool,

        #[command(flatten)]
        common: CommonOptions,
    },

    /// Remove the root of a heap
    Remove {
        /// Pick the swaps yourself instead of watching them
        #[arg(long)]
        manual: bool,

        #[command(flatten)]
        common: CommonOptions,
    },

    /// Sort by removing the root until the heap is empty
    Sort {
        /// Pick the swaps yourself instead of watching them
        #[arg(long)]
        manual: bool,

        #[command(flatten)]
        common: CommonOptions,
    },
}

/// Lines from stdin, read on a thread of their own so a pending read never holds up exit.
fn spawn_input() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(16);
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.blocking_send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    log::error!("reading stdin: {}", e);
                    break;
                }
            }
        }
    });
    rx
}

async fn animate(session: &mut HeapSession, op: Operation, view: &TerminalView) -> RunOutcome {
    let controls = session.controls();
    let mut input = spawn_input();
    let listener = tokio::spawn(async move {
        while let Some(line) = input.recv().await {
            match parse_command(&line) {
                Some(Command::TogglePause) => {
                    log::info!("{}", controls.toggle_pause());
                }
                Some(Command::Speed(speed)) => {
                    if let Err(e) = controls.set_speed(speed) {
                        log::warn!("{}", e);
                    }
                }
                Some(Command::Stop) => controls.stop(),
                _ => log::warn!("unrecognised command '{}' (p, s <factor> or q)", line),
            }
        }
    });
    let outcome = session.start(op, Controller::Auto, view).await;
    listener.abort();
    outcome
}

async fn practise(session: &mut HeapSession, op: Operation, view: &TerminalView) -> RunOutcome {
    let outcome = session.start(op, Controller::Manual, view).await;
    if outcome != RunOutcome::Practising {
        return outcome;
    }
    println!("enter node indices two at a time, q to give up");
    let mut input = spawn_input();
    while session.practice().is_some() {
        let Some(line) = input.recv().await else {
            break;
        };
        match parse_command(&line) {
            Some(Command::Select(i)) if i >= 1 && i <= session.store().capacity() => {
                session.select(i, view).await;
            }
            Some(Command::Stop) => break,
            _ => log::warn!(
                "expected a node index between 1 and {}",
                session.store().capacity()
            ),
        }
    }
    outcome
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .init();

    let cli = Cli::parse();

    let (op, manual, common) = match cli.command {
        Commands::Build {
            style,
            manual,
            common,
        } => (Operation::Build(style), manual, common),
        Commands::Remove { manual, common } => (Operation::Remove, manual, common),
        Commands::Sort { manual, common } => (Operation::HeapSort, manual, common),
    };

    let mut session = HeapSession::new(&common).map_err(as_io_error)?;
    if op == Operation::Remove && !session.store().is_heap(session.mode()) {
        let built = plan(
            session.store(),
            session.mode(),
            Operation::Build(BuildStyle::BottomUp),
        );
        session
            .load(built.heap.values().to_vec())
            .map_err(as_io_error)?;
        log::info!("removing from the built heap");
    }
    log::info!("{}-heap: {}", session.mode(), session.store());

    let view = TerminalView::new(session.controls());
    view.refresh(session.store());

    let outcome = if manual {
        practise(&mut session, op, &view).await
    } else {
        animate(&mut session, op, &view).await
    };
    log::info!("{} finished ({:?}): {}", op, outcome, session.store());

    Ok(())
}
