use gdlsoar::{compile, CompilerConfig, GoalPolicy, Preamble, RolePolicy};
use std::process::ExitCode;

const USAGE: &str = "usage: gdlsoar [options] <game.kif>

Options:
  --game <name>          state name asserted by every production (default: game)
  --preamble <which>     'selection' (default) or 'header'
  --lenient-goals        warn instead of failing on a ruleset with no goal rules
  --strict-roles         fail on duplicate role definitions
  --json                 print a JSON summary instead of the production text
  -h, --help             show this help";

fn main() -> ExitCode {
    let mut config = CompilerConfig::default();
    let mut input: Option<String> = None;
    let mut json = false;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--game" => match args.next() {
                Some(name) => config.game_name = name,
                None => return fail_usage("--game needs a value"),
            },
            "--preamble" => match args.next().as_deref() {
                Some("selection") => config.preamble = Preamble::SelectionSpace,
                Some("header") => config.preamble = Preamble::Header,
                _ => return fail_usage("--preamble needs 'selection' or 'header'"),
            },
            "--lenient-goals" => config.goal_policy = GoalPolicy::Warn,
            "--strict-roles" => config.role_policy = RolePolicy::Fatal,
            "--json" => json = true,
            "-h" | "--help" => {
                println!("{}", USAGE);
                return ExitCode::SUCCESS;
            }
            _ if input.is_none() && !arg.starts_with('-') => input = Some(arg),
            _ => return fail_usage(&format!("unexpected argument '{}'", arg)),
        }
    }

    let path = match input {
        Some(path) => path,
        None => return fail_usage("no input file"),
    };
    let source = match std::fs::read_to_string(&path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("gdlsoar: {}: {}", path, err);
            return ExitCode::from(1);
        }
    };

    match compile(&source, &config) {
        Ok(output) => {
            for warning in &output.warnings {
                eprintln!("warning: {}", warning);
            }
            if json {
                let report = gdlsoar::json::report(&output, &config);
                match serde_json::to_string_pretty(&report) {
                    Ok(text) => println!("{}", text),
                    Err(err) => {
                        eprintln!("gdlsoar: {}", err);
                        return ExitCode::from(1);
                    }
                }
            } else {
                print!("{}", output.text);
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("gdlsoar: {}", err);
            ExitCode::from(1)
        }
    }
}

fn fail_usage(reason: &str) -> ExitCode {
    eprintln!("gdlsoar: {}\n{}", reason, USAGE);
    ExitCode::from(2)
}
