// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Discovery and validation of board definitions under
//! `components/boards/`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::config::USE_FROM_BMGR_FILE;

const BOARD_DEVICES_BASE: &str = "board_devices";
const BOARD_PERIPHERALS_BASE: &str = "board_peripherals";
const YAML_EXTENSIONS: [&str; 2] = ["yaml", "yml"];

/// A board definition discovered under the boards directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoardEntry {
    /// Directory name under the boards root.
    pub name: String,

    /// Name handed to the ESP Board Manager; defaults to the directory
    /// name, overridden by a `bmgr_board_name:` line in the marker file.
    pub bmgr_name: String,

    /// Whether the definition comes from the ESP Board Manager registry.
    pub from_bmgr: bool,
}

/// Enumerates the boards under `boards_dir`, sorted by directory name.
///
/// A missing or non-directory boards root yields an empty list. A board is
/// registry-sourced iff its directory contains
/// `.use_from_esp_board_manager`; a failure to read that file degrades to
/// "no alias" rather than aborting.
pub fn list_boards(boards_dir: &Path) -> Result<Vec<BoardEntry>> {
    let mut boards = Vec::new();

    if !boards_dir.is_dir() {
        return Ok(boards);
    }

    let entries = fs::read_dir(boards_dir).with_context(|| {
        format!("could not read boards directory {}", boards_dir.display())
    })?;

    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let name = match entry.file_name().into_string() {
            Ok(name) => name,
            // A board that can't be named on the command line can't be
            // selected either.
            Err(_) => continue,
        };

        let marker = entry.path().join(USE_FROM_BMGR_FILE);
        let from_bmgr = marker.exists();

        let mut bmgr_name = name.clone();
        if from_bmgr {
            if let Ok(contents) = fs::read_to_string(&marker) {
                if let Some(alias) = parse_bmgr_board_name(&contents) {
                    bmgr_name = alias.to_string();
                }
            }
        }

        boards.push(BoardEntry {
            name,
            bmgr_name,
            from_bmgr,
        });
    }

    boards.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(boards)
}

/// Extracts the registry board name from the contents of
/// `.use_from_esp_board_manager`: the first line of the form
/// `bmgr_board_name: <value>`, taking the first whitespace-delimited token
/// of the value. Lines without a colon, other keys, and empty values are
/// ignored.
pub fn parse_bmgr_board_name(contents: &str) -> Option<&str> {
    for line in contents.lines() {
        let (key, value) = match line.split_once(':') {
            Some(kv) => kv,
            None => continue,
        };
        if key.trim() != "bmgr_board_name" {
            continue;
        }
        if let Some(token) = value.split_whitespace().next() {
            return Some(token);
        }
    }
    None
}

/// Looks up `name` among the enumerated boards, case-insensitively,
/// returning the canonical entry.
pub fn find_board<'a>(
    name: &str,
    boards: &'a [BoardEntry],
) -> Result<&'a BoardEntry> {
    if let Some(board) = boards
        .iter()
        .find(|b| b.name.eq_ignore_ascii_case(name))
    {
        return Ok(board);
    }
    bail!(board_name_suggestion(name, boards))
}

fn board_name_suggestion(name: &str, boards: &[BoardEntry]) -> String {
    // Suggest only for very small differences; a high number can result in
    // inaccurate suggestions for short queries.
    const MAX_DISTANCE: usize = 3;

    let mut scored: Vec<_> = boards
        .iter()
        .filter_map(|b| {
            let distance = strsim::damerau_levenshtein(name, &b.name);
            if distance <= MAX_DISTANCE {
                Some((distance, &b.name))
            } else {
                None
            }
        })
        .collect();
    scored.sort();

    let mut out = format!("'{}' is not a valid board name.", name);
    if let Some((_, s)) = scored.first() {
        out.push_str(&format!(" Did you mean '{}'?", s));
    }
    out.push_str(
        "\nDid you add the board configuration to \
         `components/boards/<board_name>`?",
    );
    if boards.is_empty() {
        out.push_str("\nNo boards are currently defined.");
    } else {
        let choices = boards
            .iter()
            .map(|b| b.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        out.push_str(&format!("\nAvailable boards: {}", choices));
    }
    out
}

/// Checks that a board directory exists and normalizes it to an absolute
/// path.
pub fn validate_board_path(board_path: &Path) -> Result<PathBuf> {
    if !board_path.exists() {
        bail!("board path does not exist: {}", board_path.display());
    }
    if !board_path.is_dir() {
        bail!("board path is not a directory: {}", board_path.display());
    }
    dunce::canonicalize(board_path).with_context(|| {
        format!("could not canonicalize board path {}", board_path.display())
    })
}

fn find_yaml_file(dir: &Path, base: &str) -> Option<PathBuf> {
    for ext in YAML_EXTENSIONS {
        let path = dir.join(format!("{}.{}", base, ext));
        if path.exists() {
            return Some(path);
        }
    }
    None
}

/// Checks that a custom board directory carries its device and peripheral
/// definitions. Every missing file is reported in a single error.
pub fn check_custom_board_files(board_path: &Path) -> Result<()> {
    let mut missing = Vec::new();
    if find_yaml_file(board_path, BOARD_DEVICES_BASE).is_none() {
        missing.push("board_devices.yaml");
    }
    if find_yaml_file(board_path, BOARD_PERIPHERALS_BASE).is_none() {
        missing.push("board_peripherals.yaml");
    }

    if !missing.is_empty() {
        bail!(
            "required files not found in board path '{}'. Missing: {}",
            board_path.display(),
            missing.join(", ")
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use tempfile::TempDir;

    #[test]
    fn parse_alias_first_match() {
        let contents = indoc! {"
            bmgr_board_name: foo_v2
            other: stuff
        "};
        assert_eq!(parse_bmgr_board_name(contents), Some("foo_v2"));
    }

    #[test]
    fn parse_alias_skips_unrelated_lines() {
        let contents = indoc! {"
            a line with no colon
            vendor: espressif
            bmgr_board_name: echoear_core_board_v1_2
            bmgr_board_name: second_match_ignored
        "};
        assert_eq!(
            parse_bmgr_board_name(contents),
            Some("echoear_core_board_v1_2")
        );
    }

    #[test]
    fn parse_alias_takes_first_token_of_value() {
        assert_eq!(
            parse_bmgr_board_name("bmgr_board_name: foo trailing junk"),
            Some("foo")
        );
    }

    #[test]
    fn parse_alias_tolerates_whitespace_around_key() {
        assert_eq!(
            parse_bmgr_board_name("  bmgr_board_name :   spaced_v1  "),
            Some("spaced_v1")
        );
    }

    #[test]
    fn parse_alias_missing_or_empty() {
        assert_eq!(parse_bmgr_board_name(""), None);
        assert_eq!(parse_bmgr_board_name("no token here"), None);
        assert_eq!(parse_bmgr_board_name("bmgr_board_name:"), None);
        assert_eq!(parse_bmgr_board_name("bmgr_board_name:   "), None);
        assert_eq!(parse_bmgr_board_name("not_bmgr_board_name: x"), None);
    }

    #[test]
    fn list_boards_sorted_with_origin_flags() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();

        fs::create_dir(root.join("zeta_board")).unwrap();
        fs::create_dir(root.join("alpha_board")).unwrap();
        fs::create_dir(root.join("echoear")).unwrap();
        fs::write(
            root.join("echoear").join(USE_FROM_BMGR_FILE),
            "bmgr_board_name: echoear_core_board_v1_2\n",
        )
        .unwrap();
        // Stray files are not boards.
        fs::write(root.join("README.md"), "not a board\n").unwrap();

        let boards = list_boards(root).unwrap();
        assert_eq!(
            boards,
            vec![
                BoardEntry {
                    name: "alpha_board".to_string(),
                    bmgr_name: "alpha_board".to_string(),
                    from_bmgr: false,
                },
                BoardEntry {
                    name: "echoear".to_string(),
                    bmgr_name: "echoear_core_board_v1_2".to_string(),
                    from_bmgr: true,
                },
                BoardEntry {
                    name: "zeta_board".to_string(),
                    bmgr_name: "zeta_board".to_string(),
                    from_bmgr: false,
                },
            ]
        );
    }

    #[test]
    fn list_boards_alias_defaults_to_directory_name() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("plain");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join(USE_FROM_BMGR_FILE), "vendor: espressif\n").unwrap();

        let boards = list_boards(tmp.path()).unwrap();
        assert_eq!(boards[0].bmgr_name, "plain");
        assert!(boards[0].from_bmgr);
    }

    #[test]
    fn list_boards_missing_root_is_empty() {
        let tmp = TempDir::new().unwrap();
        let boards = list_boards(&tmp.path().join("nope")).unwrap();
        assert!(boards.is_empty());
    }

    fn entry(name: &str) -> BoardEntry {
        BoardEntry {
            name: name.to_string(),
            bmgr_name: name.to_string(),
            from_bmgr: false,
        }
    }

    #[test]
    fn find_board_is_case_insensitive() {
        let boards = vec![entry("demo_board")];
        let found = find_board("DEMO_Board", &boards).unwrap();
        assert_eq!(found.name, "demo_board");
    }

    #[test]
    fn find_board_unknown_lists_choices() {
        let boards = vec![entry("alpha_board"), entry("beta_board")];
        let err = find_board("gamma_board", &boards).unwrap_err();
        let msg = format!("{}", err);
        assert!(msg.contains("'gamma_board' is not a valid board name."));
        assert!(msg.contains("alpha_board, beta_board"));
    }

    #[test]
    fn find_board_suggests_near_miss() {
        let boards = vec![entry("demo_board")];
        let err = find_board("demo_bord", &boards).unwrap_err();
        assert!(format!("{}", err).contains("Did you mean 'demo_board'?"));
    }

    #[test]
    fn validate_board_path_rejects_missing_and_files() {
        let tmp = TempDir::new().unwrap();

        let err = validate_board_path(&tmp.path().join("gone")).unwrap_err();
        assert!(format!("{}", err).contains("does not exist"));

        let file = tmp.path().join("file");
        fs::write(&file, "x").unwrap();
        let err = validate_board_path(&file).unwrap_err();
        assert!(format!("{}", err).contains("not a directory"));

        let dir = tmp.path().join("board");
        fs::create_dir(&dir).unwrap();
        let resolved = validate_board_path(&dir).unwrap();
        assert!(resolved.is_absolute());
    }

    #[test]
    fn custom_board_files_accept_either_extension() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("board_devices.yml"), "").unwrap();
        fs::write(tmp.path().join("board_peripherals.yaml"), "").unwrap();
        check_custom_board_files(tmp.path()).unwrap();
    }

    #[test]
    fn custom_board_files_report_only_whats_missing() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("board_devices.yaml"), "").unwrap();

        let err = check_custom_board_files(tmp.path()).unwrap_err();
        let msg = format!("{}", err);
        assert!(msg.contains("Missing: board_peripherals.yaml"));
        assert!(!msg.contains("board_devices"));
    }

    #[test]
    fn custom_board_files_report_all_missing() {
        let tmp = TempDir::new().unwrap();
        let err = check_custom_board_files(tmp.path()).unwrap_err();
        assert!(format!("{}", err)
            .contains("Missing: board_devices.yaml, board_peripherals.yaml"));
    }
}
