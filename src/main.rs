use std::{env, io, process};

use hostlookup::{cli, Resolver};
use log::LevelFilter;

fn main() -> io::Result<()> {
    env_logger::Builder::new()
        .filter_level(LevelFilter::Error)
        .parse_default_env()
        .init();

    let args = env::args().skip(1).collect::<Vec<_>>();
    let resolver = Resolver::builder().apply_env().build();
    let code = cli::main(&args, &resolver, &mut io::stdout(), &mut io::stderr())?;
    drop(resolver);
    process::exit(code);
}
