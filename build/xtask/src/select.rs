// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `select-board` flow: validate the requested board, record it, and
//! run the ESP Board Manager code generator.

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{bail, Context, Result};
use termcolor::{Color, ColorSpec, WriteColor};

use crate::bmgr;
use crate::boards::{self, BoardEntry};
use crate::config::ProjectConfig;

pub fn run(
    cfg: &ProjectConfig,
    board: Option<String>,
    list: bool,
) -> Result<()> {
    if list {
        print_boards(&boards::list_boards(&cfg.boards_dir)?);
        return Ok(());
    }

    let board = match board {
        Some(board) => board,
        None => bail!(
            "board name is required. Use: `cargo xtask select-board \
             --board <board_name>` or `cargo xtask select-board --list`"
        ),
    };

    let entries = boards::list_boards(&cfg.boards_dir)?;
    let entry = boards::find_board(&board, &entries)?;
    let board_path =
        boards::validate_board_path(&cfg.boards_dir.join(&entry.name))?;

    fs::create_dir_all(&cfg.gen_codes_dir).with_context(|| {
        format!("could not create {}", cfg.gen_codes_dir.display())
    })?;

    // First write, so downstream tooling can observe the selection even if
    // generation fails below.
    write_board_name_file(&entry.name, &cfg.board_name_file)?;

    bmgr::ensure_script(cfg)?;

    if entry.from_bmgr {
        bmgr::generate(cfg, &entry.bmgr_name, None)?;
    } else {
        boards::check_custom_board_files(&board_path)?;
        bmgr::generate(cfg, &entry.name, Some(&board_path))?;
    }

    // The generator purges components/gen_bmgr_codes, taking the first
    // write with it; write the marker again so it survives a successful
    // run.
    write_board_name_file(&entry.name, &cfg.board_name_file)?;

    print_success(&format!("Successfully selected board: {}", entry.name))?;

    Ok(())
}

/// Writes `<board_name>\n` to the marker file. The parent directory may
/// have been removed by the generator, so it is recreated first.
fn write_board_name_file(board_name: &str, output_file: &Path) -> Result<()> {
    if let Some(parent) = output_file.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("could not create {}", parent.display()))?;
    }
    fs::write(output_file, format!("{}\n", board_name)).with_context(|| {
        format!(
            "failed to write board name file {}",
            output_file.display()
        )
    })?;
    log::info!("wrote board name to {}", output_file.display());
    Ok(())
}

fn print_boards(boards: &[BoardEntry]) {
    if boards.is_empty() {
        println!("No boards found.");
        return;
    }

    println!("Available boards:");
    println!();

    for board in boards {
        let origin = if board.from_bmgr {
            "ESP Board Manager"
        } else {
            "Custom"
        };
        if board.from_bmgr && board.bmgr_name != board.name {
            println!(
                "  {} ({}, bmgr: {})",
                board.name, origin, board.bmgr_name
            );
        } else {
            println!("  {} ({})", board.name, origin);
        }
    }
}

fn print_success(message: &str) -> Result<()> {
    let color_choice = if atty::is(atty::Stream::Stdout) {
        termcolor::ColorChoice::Auto
    } else {
        termcolor::ColorChoice::Never
    };
    let mut out = termcolor::StandardStream::stdout(color_choice);
    out.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
    writeln!(out, "{}", message)?;
    out.reset()?;
    Ok(())
}
