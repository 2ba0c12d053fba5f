use std::{
    io::{self, Write},
    sync::Arc,
    thread,
    time::Duration,
};

use clap::{Parser, Subcommand};
use petri_exec::{
    logger::{LogLevel, Logger},
    net::{cancel::CancelToken, PetriNet},
    nets::{
        alternator::{self, AlternatorPlace},
        multiplicator::{self, MultiplicatorPlace},
    },
    threading::thread_pool::ThreadPool,
};

#[derive(Parser, Debug)]
#[command(name = "petri-exec")]
#[command(version = "0.1")]
#[command(about = "Run the example nets on the concurrent Petri net engine", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    #[arg(short, long, default_value_t = LogLevel::Info)]
    log_level: LogLevel,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Three processes passing the critical section around for a while.
    Alternator {
        #[arg(short, long, default_value_t = 2000)]
        millis: u64,
    },
    /// Multiply two numbers with a pool of workers racing on one net.
    Multiply {
        a: usize,
        b: usize,

        #[arg(short, long, default_value_t = 4)]
        workers: usize,

        /// Print the final marking as JSON instead of just the product.
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let logger = Logger::new(args.log_level, "petri-exec".to_string());

    match args.command {
        Command::Alternator { millis } => run_alternator(&logger, millis),
        Command::Multiply {
            a,
            b,
            workers,
            json,
        } => run_multiplicator(&logger, args.log_level, a, b, workers, json),
    }
}

fn run_alternator(logger: &Logger, millis: u64) -> anyhow::Result<()> {
    let net = Arc::new(alternator::new_net());
    let transitions = alternator::all_transitions();

    let markings = net.reachable(&transitions);
    logger.info(&format!("{} reachable markings", markings.len()));
    if markings
        .iter()
        .any(|m| m.tokens(&AlternatorPlace::Exe) > 1)
    {
        anyhow::bail!("safety violated: a reachable marking holds more than one Exe token");
    }

    let tokens: Vec<CancelToken> = (0..3).map(|_| CancelToken::new()).collect();
    let mut handles = vec![];
    for (index, token) in tokens.iter().enumerate() {
        let net = Arc::clone(&net);
        let token = token.clone();
        let name = ["A", "B", "C"][index];
        let transitions = alternator::process_transitions(index);

        handles.push(thread::spawn(move || {
            let mut rounds = 0usize;
            loop {
                // enter the critical section
                if net.fire_cancellable(&transitions, &token).is_err() {
                    break;
                }
                print!("{name}.");
                let _ = io::stdout().flush();
                // and leave it again
                if net.fire_cancellable(&transitions, &token).is_err() {
                    break;
                }
                rounds += 1;
            }
            (name, rounds)
        }));
    }

    thread::sleep(Duration::from_millis(millis));
    for token in &tokens {
        token.cancel();
    }

    println!();
    for handle in handles {
        match handle.join() {
            Ok((name, rounds)) => logger.info(&format!("process {name} completed {rounds} rounds")),
            Err(_) => logger.error("a process panicked"),
        }
    }

    logger.info(&format!("final marking: {}", net.marking()));
    Ok(())
}

fn run_multiplicator(
    logger: &Logger,
    log_level: LogLevel,
    a: usize,
    b: usize,
    workers: usize,
    json: bool,
) -> anyhow::Result<()> {
    let net = Arc::new(PetriNet::with_logger(
        multiplicator::initial_marking(a, b),
        true,
        Logger::new(log_level, "decision-loop".to_string()),
    ));
    let shared = multiplicator::worker_transitions();
    let end = multiplicator::end_transitions();

    let pool = ThreadPool::new(workers);
    let tokens: Vec<CancelToken> = (0..workers).map(|_| CancelToken::new()).collect();
    for (id, token) in tokens.iter().enumerate() {
        let net = Arc::clone(&net);
        let token = token.clone();
        let transitions = shared.clone();

        pool.spawn(move || {
            let mut fired = 0usize;
            while net.fire_cancellable(&transitions, &token).is_ok() {
                fired += 1;
            }
            (id, fired)
        });
    }

    // blocks until the workers have driven the net to quiescence
    net.fire(&end)?;

    for token in &tokens {
        token.cancel();
    }
    for (id, fired) in pool.join() {
        logger.debug(&format!("worker {id} fired {fired} transitions"));
    }

    let result = net.marking();
    if json {
        println!("{}", result.to_json()?);
    } else {
        logger.info(&format!("final marking: {result}"));
        println!("{}", result.tokens(&MultiplicatorPlace::Res));
    }
    Ok(())
}
