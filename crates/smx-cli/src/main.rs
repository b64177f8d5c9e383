mod cli;
mod commands;
mod logger;

use cli::{DisasmParams, InfoParams, LiftParams, build_cli, verbosity};

fn main() {
    let matches = build_cli().get_matches();

    if let Some((_, m)) = matches.subcommand() {
        logger::init(verbosity(m));
    }

    match matches.subcommand() {
        Some(("info", m)) => {
            let params = InfoParams::from_matches(m);
            commands::info::run(params.into());
        }
        Some(("disasm", m)) => {
            let params = DisasmParams::from_matches(m);
            commands::disasm::run(params.into());
        }
        Some(("lift", m)) => {
            let params = LiftParams::from_matches(m);
            commands::lift::run(params.into());
        }
        _ => unreachable!("clap should have caught this"),
    }
}
