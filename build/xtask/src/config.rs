// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// File recording the selected board name, read back by later build steps.
pub const BOARD_NAME_FILE: &str = "agent_board_name.txt";

/// Per-board marker whose presence means the board definition comes from
/// the ESP Board Manager registry rather than this project.
pub const USE_FROM_BMGR_FILE: &str = ".use_from_esp_board_manager";

/// Registry name of the ESP Board Manager component.
pub const BMGR_COMPONENT: &str = "espressif__esp_board_manager";

/// The code generation script shipped inside the component.
pub const BMGR_SCRIPT: &str = "gen_bmgr_config_codes.py";

/// `ProjectConfig` contains every path and environment lookup the board
/// selection needs, resolved once and passed by reference, to avoid handing
/// a bunch of individual arguments to functions.
pub struct ProjectConfig {
    /// Project root; subprocesses run with this as their working directory.
    pub project_dir: PathBuf,

    /// Directory scanned for board definitions,
    /// `<project>/components/boards`.
    pub boards_dir: PathBuf,

    /// Output directory for generated board code,
    /// `<project>/components/gen_bmgr_codes`.
    pub gen_codes_dir: PathBuf,

    /// The board-name marker file inside `gen_codes_dir`.
    pub board_name_file: PathBuf,

    /// The generator script under the project's managed components.
    pub bmgr_script: PathBuf,

    /// Interpreter used to run the generator and `idf.py`.
    pub python: PathBuf,

    /// ESP-IDF installation root, from `IDF_PATH`.
    pub idf_path: Option<PathBuf>,
}

impl ProjectConfig {
    pub fn new(project_dir: &Path) -> Result<Self> {
        let project_dir = dunce::canonicalize(project_dir).with_context(|| {
            format!(
                "could not resolve project directory {}",
                project_dir.display()
            )
        })?;

        let boards_dir = project_dir.join("components").join("boards");
        let gen_codes_dir = project_dir.join("components").join("gen_bmgr_codes");
        let board_name_file = gen_codes_dir.join(BOARD_NAME_FILE);
        let bmgr_script = project_dir
            .join("managed_components")
            .join(BMGR_COMPONENT)
            .join(BMGR_SCRIPT);

        let python = match env::var("AGENT_PYTHON") {
            Ok(path) => PathBuf::from(path),
            _ => PathBuf::from("python3"),
        };

        let idf_path = env::var_os("IDF_PATH").map(PathBuf::from);

        Ok(Self {
            project_dir,
            boards_dir,
            gen_codes_dir,
            board_name_file,
            bmgr_script,
            python,
            idf_path,
        })
    }
}
