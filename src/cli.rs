use anyhow::{Context, Result, anyhow};
use pico_args::Arguments;
use std::{env, fs::File, io::BufReader, path::PathBuf};

use gesturectl::{GestureDetector, GestureLog, Profile, TimerQueue, input, trace};

use crate::live;

pub fn run() -> Result<()> {
    let mut pargs = Arguments::from_env();

    // No args -> general help
    if env::args().len() == 1 {
        print_help();
        return Ok(());
    }

    if pargs.contains("-h") || pargs.contains("--help") {
        print_help();
        return Ok(());
    }

    let profile_path: Option<PathBuf> = pargs.opt_value_from_str("--profile")?;
    let subcmd: Option<String> = pargs.free_from_str().ok();

    match subcmd.as_deref() {
        Some("help") => {
            let topic: Option<String> = pargs.free_from_str().ok();
            match topic {
                Some(t) => print_subcmd_help(&t),
                None => print_help(),
            }
            Ok(())
        }

        Some("replay") => {
            let json = pargs.contains("--json");
            let path: PathBuf = pargs
                .free_from_str()
                .map_err(|_| anyhow!("usage: gesturectl replay <trace.jsonl> [--json]"))?;
            let profile = load_profile(profile_path)?;
            let file = File::open(&path)
                .with_context(|| format!("failed to open {}", path.display()))?;
            let frames = trace::read_trace(BufReader::new(file))
                .with_context(|| format!("failed to read {}", path.display()))?;

            let log = GestureLog::new();
            let mut detector =
                GestureDetector::new(profile.gestures, TimerQueue::new(), log.on_down())
                    .with_scale_listener(log.scale_listener());
            let events = trace::replay(&mut detector, &log, &frames);
            for e in &events {
                if json {
                    println!("{}", serde_json::to_string(e)?);
                } else {
                    println!("{e}");
                }
            }
            Ok(())
        }

        Some("live") => {
            let device: Option<PathBuf> = pargs.opt_value_from_str("--device")?;
            let profile = load_profile(profile_path)?;
            live::run_live(profile, device)
        }

        Some("devices") => {
            let devices = input::discover_multitouch();
            if devices.is_empty() {
                println!("no multitouch devices detected");
            }
            for d in devices {
                println!("{}\t{}", d.path, d.name);
            }
            Ok(())
        }

        Some("config") => {
            let profile = load_profile(profile_path)?;
            println!("{}", serde_json::to_string_pretty(&profile)?);
            Ok(())
        }

        Some(other) => {
            eprintln!("unknown subcommand: {other}\n");
            print_help();
            Ok(())
        }

        None => {
            print_help();
            Ok(())
        }
    }
}

fn load_profile(path: Option<PathBuf>) -> Result<Profile> {
    let profile = Profile::resolve(path.as_deref())?;
    log::debug!("profile {:?}: {:?}", profile.meta.name, profile.gestures);
    Ok(profile)
}

fn print_help() {
    println!(
        r#"gesturectl — multi-pointer gesture recognizer

USAGE:
  gesturectl help [command]                  Show general or command-specific help
  gesturectl replay <trace.jsonl> [--json]   Replay a recorded motion trace
  gesturectl live [--device <path>]          Recognize gestures from a touch device
  gesturectl devices                         List multitouch devices
  gesturectl config                          Print the effective configuration

OPTIONS:
  --profile <path>                           Profile TOML (default: ~/.config/gesturectl/profile.toml,
                                             falling back to the built-in profile)

Set RUST_LOG=debug to trace every recognized gesture.
"#
    );
}

fn print_subcmd_help(cmd: &str) {
    match cmd {
        "replay" => println!(
            "usage: gesturectl replay <trace.jsonl> [--json] [--profile <path>]\n\
             Feeds one JSON motion frame per line through the recognizer on a virtual clock\n\
             and prints every gesture, firing pending timers after the last frame."
        ),
        "live" => println!(
            "usage: gesturectl live [--device /dev/input/eventN] [--profile <path>]\n\
             Reads the first multitouch device (or the given one) until interrupted."
        ),
        "devices" => println!("usage: gesturectl devices\nLists detected multitouch devices."),
        "config" => println!(
            "usage: gesturectl config [--profile <path>]\nPrints the resolved profile as JSON."
        ),
        _ => {
            eprintln!("unknown command: {cmd}\n");
            print_help();
        }
    }
}
