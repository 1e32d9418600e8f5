use std::io;

use clap::Command;
use clap_complete::{Shell, generate};

pub(crate) fn command_completions(shell: Shell, command: &mut Command) {
    let name = command.get_name().to_owned();
    generate(shell, command, name, &mut io::stdout());
}
