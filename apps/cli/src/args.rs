use std::env;

#[derive(Debug, Default, PartialEq)]
pub struct CliArgs {
    pub port: Option<u16>,
    /// Run a single cycle, print its report and exit.
    pub once: bool,
    /// Serve the API without the periodic scheduler.
    pub no_schedule: bool,
}

pub fn parse_args() -> Result<CliArgs, String> {
    parse_from(env::args().skip(1))
}

fn parse_from(args: impl IntoIterator<Item = String>) -> Result<CliArgs, String> {
    let mut args = args.into_iter();
    let mut parsed = CliArgs::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--port" => {
                let value = args
                    .next()
                    .ok_or_else(|| "missing value for --port".to_string())?;
                let port = value
                    .parse::<u16>()
                    .map_err(|_| format!("invalid port value: {value}"))?;
                parsed.port = Some(port);
            }
            "--once" => {
                parsed.once = true;
            }
            "--no-schedule" => {
                parsed.no_schedule = true;
            }
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            _ => {
                return Err(format!("unknown argument: {arg}"));
            }
        }
    }

    Ok(parsed)
}

pub fn print_help() {
    println!(
        "youknow: browsing-history analytics\n\n\
Usage:\n  youknow [--port <port>] [--once] [--no-schedule]\n\n\
Options:\n  --port <port>   Override the configured port for this run only\n  --once          Run one pipeline cycle, print the report and exit\n  --no-schedule   Serve the API but only run cycles on refresh\n  -h, --help      Show this help message\n\n\
Logging is controlled by RUST_LOG (default youknow=info,youknow_app=info,ingest=info).\n"
    );
}
