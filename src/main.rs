use clap::Parser;

use aarlo::cli::{self, Args};
use aarlo::config::{Config, Environment, Options};
use aarlo::error::AppError;
use aarlo::logging;

fn main() {
    // Load .env file before anything else; a missing file is fine
    let _ = dotenv::dotenv();

    // Bad arguments are usage errors; help and version exit cleanly
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            std::process::exit(if e.use_stderr() { 1 } else { 0 });
        }
    };
    logging::init(args.verbose);

    match run(args) {
        Ok(()) => {}
        Err(e) if e.is_reported() => println!("{}", e),
        Err(e) => {
            eprintln!("FATAL-ERROR:{}", e);
            std::process::exit(e.exit_code());
        }
    }
}

fn run(args: Args) -> Result<(), AppError> {
    let file = Config::load(args.config.as_deref())?;
    let options = Options::resolve(args.overrides(), Environment::from_process(), file);
    log::debug!("storage dir {}", options.storage_dir.display());

    let runtime = tokio::runtime::Runtime::new()?;
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    runtime.block_on(cli::run(&args.command, &options, stdin.lock(), &mut out))
}
