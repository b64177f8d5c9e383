//! Command builders for the CLI.

use clap::Command;

use super::args::*;

/// Args every command takes.
fn with_common_args(cmd: Command) -> Command {
    cmd.arg(file_arg())
        .arg(max_image_size_arg())
        .arg(color_arg())
        .arg(verbose_arg())
}

/// Build the complete CLI with all subcommands.
pub fn build_cli() -> Command {
    Command::new("smx")
        .about("Inspect, disassemble and lift SourcePawn SMX plugins")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(info_command())
        .subcommand(disasm_command())
        .subcommand(lift_command())
}

/// Container header, sections, segments and symbol tables.
pub fn info_command() -> Command {
    let cmd = Command::new("info")
        .about("Show container metadata")
        .after_help(
            r#"EXAMPLES:
  smx info plugin.smx            # header, sections, symbols
  smx info plugin.smx --json     # the same as JSON"#,
        )
        .arg(json_arg());
    with_common_args(cmd)
}

/// Code listing.
pub fn disasm_command() -> Command {
    let cmd = Command::new("disasm")
        .about("Disassemble the code segment")
        .after_help(
            r#"EXAMPLES:
  smx disasm plugin.smx                    # whole code segment
  smx disasm plugin.smx -f OnPluginStart   # one function"#,
        )
        .arg(function_arg());
    with_common_args(cmd)
}

/// IL listing.
pub fn lift_command() -> Command {
    let cmd = Command::new("lift")
        .about("Lift functions to register-transfer IL")
        .after_help(
            r#"EXAMPLES:
  smx lift plugin.smx                      # every function
  smx lift plugin.smx --function main      # one function"#,
        )
        .arg(function_arg());
    with_common_args(cmd)
}
