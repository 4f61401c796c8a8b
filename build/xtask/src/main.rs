// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use anyhow::Result;
use clap::Parser;

mod bmgr;
mod boards;
mod config;
mod select;

#[derive(Parser)]
#[clap(
    max_term_width = 80,
    about = "extra tasks to help you work on the agent firmware"
)]
enum Xtask {
    /// Selects the hardware board used by the firmware build.
    ///
    /// Records the chosen board in
    /// `components/gen_bmgr_codes/agent_board_name.txt` and runs the ESP
    /// Board Manager code generator to produce the board configuration.
    SelectBoard {
        /// Name of the board (e.g. `echoear_core_board_v1_2`), matched
        /// case-insensitively against the entries in `components/boards/`.
        #[clap(short, long)]
        board: Option<String>,

        /// List all available boards, without selecting anything.
        #[clap(short, long)]
        list: bool,
    },
}

fn main() -> Result<()> {
    let env = env_logger::Env::default().filter_or("RUST_LOG", "info");

    env_logger::init_from_env(env);

    let xtask = Xtask::parse();

    match xtask {
        Xtask::SelectBoard { board, list } => {
            let project_dir = std::env::current_dir()?;
            let cfg = config::ProjectConfig::new(&project_dir)?;
            select::run(&cfg, board, list)?;
        }
    }

    Ok(())
}
