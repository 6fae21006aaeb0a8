mod line_planning;
mod os_signal_termination;
mod result;

use std::io::Write;
use std::time::Duration;

use clap::Parser;
use line_planning::assemble;
use line_planning::cheapest_plan;
use line_planning::LineTask;
use log::error;
use log::info;
use log::warn;
use log::Level;
use log::LevelFilter;
use os_signal_termination::OsSignal;
use result::StagewiseResult;
use stagewise_core::convert_case::Case;
use stagewise_core::solutions::Introspection;
use stagewise_core::statistics::configure_statistic_logging;
use stagewise_core::statistics::log_statistic;
use stagewise_core::statistics::log_statistic_postfix;
use stagewise_core::statistics::StatisticSink;
use stagewise_core::termination::Combinator;
use stagewise_core::termination::ComputeBudget;
use stagewise_core::termination::TimeBudget;
use stagewise_core::Pipeline;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The positions at which a plan may start. Can be given multiple times.
    #[arg(long = "start", required = true, allow_hyphen_values = true)]
    starts: Vec<i64>,

    /// The positions at which a plan may end. Can be given multiple times.
    #[arg(long = "goal", required = true, allow_hyphen_values = true)]
    goals: Vec<i64>,

    /// The largest distance which can be covered by a single move.
    #[arg(long = "step", default_value_t = 1)]
    step: i64,

    /// A position which no move may cross. Can be given multiple times.
    #[arg(long = "obstacle", allow_hyphen_values = true)]
    obstacles: Vec<i64>,

    /// The maximum number of stage computations; by default the pipeline runs until it is
    /// exhausted.
    #[arg(long = "compute-budget")]
    compute_budget: Option<u64>,

    /// The time budget for the pipeline, in milliseconds.
    #[arg(short = 't', long = "time-limit")]
    time_limit: Option<u64>,

    /// Enables log message output from the engine
    ///
    /// Possible values: bool
    #[arg(short = 'v', long = "verbose", verbatim_doc_comment)]
    verbose: bool,

    /// Enables logging of statistics from the stages
    ///
    /// Possible values: bool
    #[arg(short = 's', long = "log-statistics", verbatim_doc_comment)]
    log_statistics: bool,

    /// Retains the failing solutions of every stage and reports how many there were.
    ///
    /// Possible values: bool
    #[arg(long = "introspection", verbatim_doc_comment)]
    introspection: bool,

    /// If `--verbose` is enabled removes the timestamp information from the log messages
    ///
    /// Possible values: bool
    #[arg(long = "omit-timestamp", verbatim_doc_comment)]
    omit_timestamp: bool,

    /// If `--verbose` is enabled removes the call site information from the log messages.
    ///
    /// Call site is the file and line from where the log message was emitted.
    ///
    /// Possible values: bool
    #[arg(long = "omit-call-site", verbatim_doc_comment)]
    omit_call_site: bool,
}

fn configure_logging(
    verbose: bool,
    log_statistics: bool,
    omit_timestamp: bool,
    omit_call_site: bool,
) {
    if log_statistics {
        let _ = configure_statistic_logging(StatisticSink::new("c STAT").with_casing(Case::Camel));
    }

    let level_filter = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };

    env_logger::Builder::new()
        .format(move |buf, record| {
            write!(buf, "c ")?;

            if record.level() != Level::Info && !omit_timestamp {
                write!(buf, "{} ", buf.timestamp())?;
            }

            write!(buf, "{} ", record.level())?;

            if record.level() != Level::Info && !omit_call_site {
                write!(
                    buf,
                    "[{}:{}] ",
                    record.file().unwrap_or("unknown"),
                    record.line().unwrap_or(0)
                )?;
            }

            writeln!(buf, "{}", record.args())
        })
        .filter_level(level_filter)
        .target(env_logger::Target::Stdout)
        .init();

    info!("Logging successfully configured");
}

fn main() {
    match run() {
        Ok(()) => {}
        Err(e) => {
            error!("Execution failed, error: {}", e);
            std::process::exit(1);
        }
    }
}

fn run() -> StagewiseResult<()> {
    let args = Args::parse();

    configure_logging(
        args.verbose,
        args.log_statistics,
        args.omit_timestamp,
        args.omit_call_site,
    );

    if cfg!(feature = "debug-checks") {
        warn!("Extreme assertions are enabled; the engine will be slower than usual");
    }

    let task = LineTask::new(args.starts, args.goals, args.step, args.obstacles)?;

    let mut pipeline = Pipeline::new("line");
    let stages = assemble(&mut pipeline, task);
    if args.introspection {
        pipeline.set_introspection(Some(Introspection::new("line")));
    }
    pipeline.initialise()?;

    let termination = Combinator::new(
        OsSignal::install()?,
        Combinator::new(
            args.time_limit
                .map(|milliseconds| TimeBudget::starting_now(Duration::from_millis(milliseconds))),
            args.compute_budget.map(ComputeBudget::new),
        ),
    );
    let num_computes = pipeline.run(termination)?;

    match cheapest_plan(&pipeline, stages) {
        Some(plan) => println!("plan {plan}"),
        None => println!("no plan"),
    }

    if args.introspection {
        for &stage in pipeline.stage_ids() {
            if let Some(data) = pipeline.stage_data(stage) {
                println!(
                    "c {} retained {} failures",
                    data.name(),
                    data.solutions().failures().len()
                );
            }
        }
    }

    log_statistic("numComputes", num_computes);
    pipeline.log_statistics();
    log_statistic_postfix();

    Ok(())
}
