mod viewer;

use sandfall::compact_log::CompactLogWriter;
use sandfall::config::Config;
use sandfall::drop_log::DropLog;
use sandfall::save_state::SaveState;
use sandfall::scan::load_scan;
use sandfall::render::render_progress;
use sandfall::{simulate, solve_both, BuildOptions, MarginPolicy, Simulator};
use std::path::Path;

const USAGE: &str = "\
Usage: sandfall [INPUT] [OPTIONS]

Options:
  --part1             no floor: count units until one falls out
  --part2             floor two rows below the lowest rock
  --floor N           floor offset (negative = no floor)
  --both              run part one and part two side by side
                      (part two keeps a positive --floor, otherwise uses 2;
                      cannot be combined with --verbose, --log, --save,
                      --view or --resume)
  --source-x X        column sand is poured from (default 500)
  --fixed-margin N    widen floor grids by exactly N columns per side
  --verbose           print the grid after every drop
  --log               write drop_log.json and drop_log.bin
  --save PATH         save the final grid as JSON
  --resume PATH       continue a run saved with --save (no INPUT needed)
  --view              animate the run in a window
  --config PATH       read settings from PATH instead of config.toml
  --help              show this message";

#[derive(Debug, Default, PartialEq)]
struct Args {
    input: Option<String>,
    floor_offset: Option<i32>,
    both: bool,
    source_x: Option<i32>,
    fixed_margin: Option<i32>,
    verbose: bool,
    log: bool,
    save: Option<String>,
    resume: Option<String>,
    view: bool,
    config: Option<String>,
    help: bool,
}

fn parse_args(args: &[String]) -> Result<Args, String> {
    let mut parsed = Args::default();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--part1" => parsed.floor_offset = Some(-1),
            "--part2" => parsed.floor_offset = Some(2),
            "--floor" => parsed.floor_offset = Some(parse_value(arg, iter.next())?),
            "--both" => parsed.both = true,
            "--source-x" => parsed.source_x = Some(parse_value(arg, iter.next())?),
            "--fixed-margin" => parsed.fixed_margin = Some(parse_value(arg, iter.next())?),
            "--verbose" | "-v" => parsed.verbose = true,
            "--log" => parsed.log = true,
            "--save" => parsed.save = Some(require(arg, iter.next())?.clone()),
            "--resume" => parsed.resume = Some(require(arg, iter.next())?.clone()),
            "--view" => parsed.view = true,
            "--config" => parsed.config = Some(require(arg, iter.next())?.clone()),
            "--help" | "-h" => parsed.help = true,
            other if other.starts_with('-') => return Err(format!("Unknown option '{}'", other)),
            other => {
                if parsed.input.is_some() {
                    return Err(format!("Unexpected argument '{}'", other));
                }
                parsed.input = Some(other.to_string());
            }
        }
    }

    if parsed.both {
        let conflicts = [
            ("--verbose", parsed.verbose),
            ("--log", parsed.log),
            ("--save", parsed.save.is_some()),
            ("--view", parsed.view),
            ("--resume", parsed.resume.is_some()),
        ];
        if let Some((flag, _)) = conflicts.iter().find(|(_, set)| *set) {
            return Err(format!("--both cannot be combined with {}", flag));
        }
    }

    Ok(parsed)
}

fn require<'a>(flag: &str, value: Option<&'a String>) -> Result<&'a String, String> {
    value.ok_or_else(|| format!("{} needs a value", flag))
}

fn parse_value(flag: &str, value: Option<&String>) -> Result<i32, String> {
    let value = require(flag, value)?;
    value
        .parse()
        .map_err(|_| format!("{} expects an integer, got '{}'", flag, value))
}

fn build_options(args: &Args, config: &Config) -> BuildOptions {
    let mut options = config.simulation.build_options();
    if let Some(floor_offset) = args.floor_offset {
        options.floor_offset = floor_offset;
    }
    if let Some(source_x) = args.source_x {
        options.source_x = source_x;
    }
    if let Some(margin) = args.fixed_margin {
        options.margin = MarginPolicy::Fixed(margin);
    }
    options
}

/// Options for the `--both` runs: part one has no floor, part two keeps a
/// positive floor offset and falls back to 2
fn both_parts(options: BuildOptions) -> (BuildOptions, BuildOptions) {
    let part_one = BuildOptions { floor_offset: -1, ..options };
    let floor_offset = if options.floor_offset > 0 { options.floor_offset } else { 2 };
    let part_two = BuildOptions { floor_offset, ..options };
    (part_one, part_two)
}

/// Load a snapshot and drop units until the run ends
fn resume(path: &str, verbose: bool) -> sandfall::Result<Simulator> {
    let state = SaveState::load_from_file(path)?;
    let mut sim = state.restore_simulator()?;
    println!("Resuming after {} drops ({} settled)", sim.drop_count(), sim.settled_count());
    sim.run_with(|sim, _| {
        if verbose {
            print!("{}", render_progress(sim));
        }
    })?;
    Ok(sim)
}

fn save(sim: &Simulator, path: &str) -> sandfall::Result<()> {
    SaveState::from_simulator(sim).save_to_file(path)?;
    println!("Saved grid to {}", path);
    Ok(())
}

fn run(args: Args) -> sandfall::Result<()> {
    let config = match &args.config {
        Some(path) => Config::load_from(Path::new(path))?,
        None => Config::load(),
    };

    let verbose = args.verbose || config.simulation.verbose;

    if let Some(path) = &args.resume {
        let sim = resume(path, verbose)?;
        println!("{}", sim.settled_count());
        if let Some(path) = &args.save {
            save(&sim, path)?;
        }
        return Ok(());
    }

    let input = args.input.clone().unwrap_or_else(|| config.input.path.clone());
    let polylines = load_scan(Path::new(&input))?;
    let options = build_options(&args, &config);

    if args.view {
        viewer::run(&config, polylines, options)?;
        return Ok(());
    }

    if args.both {
        let (part_one, part_two) = both_parts(options);
        let (one, two) = solve_both(&polylines, &part_one, &part_two)?;
        println!("Part one: {}", one);
        println!("Part two: {}", two);
        return Ok(());
    }

    let logging = args.log || config.logging.enable_drop_log;
    let mut log = DropLog::new();

    let sim = simulate(&polylines, &options, verbose, logging.then_some(&mut log))?;
    println!("{}", sim.settled_count());

    if logging {
        log.save_to_file(&config.logging.drop_log_path)?;

        let mut writer = CompactLogWriter::new();
        for event in log.get_events() {
            writer.write_event(event);
        }
        writer.save_to_file(&config.logging.compact_log_path)?;

        let stats = writer.get_stats();
        println!("\n{}", log.summary());
        println!(
            "Drop log written to {} and {} ({} bytes, {:.2} bytes/event)",
            config.logging.drop_log_path,
            config.logging.compact_log_path,
            stats.binary_size,
            stats.avg_bytes_per_entry()
        );
    }

    if let Some(path) = &args.save {
        save(&sim, path)?;
    }

    Ok(())
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let args = match parse_args(&args) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{}\n\n{}", e, USAGE);
            std::process::exit(2);
        }
    };

    if args.help {
        println!("{}", USAGE);
        return;
    }

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
