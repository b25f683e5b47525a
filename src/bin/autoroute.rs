use autoroute::cli::{run_cli, Cli};
use autoroute::logging::{init_logging_with_config, LogConfig};
use clap::error::ErrorKind;
use clap::Parser;

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.exit()
        }
        Err(err) => {
            let rendered = err.render().to_string();
            println!("{}", rendered.lines().next().unwrap_or_default());
            std::process::exit(1);
        }
    };

    if let Err(err) = init_logging_with_config(&LogConfig::from_env()) {
        eprintln!("warning: {err:#}");
    }

    let mut stdout = std::io::stdout();
    let code = match run_cli(&cli, &mut stdout) {
        Ok(true) => 0,
        Ok(false) => 1,
        Err(err) => {
            println!("{err:#}");
            1
        }
    };
    std::process::exit(code);
}
