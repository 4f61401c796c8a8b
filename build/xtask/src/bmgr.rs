// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Invocation of the ESP Board Manager code generator.

use std::path::Path;
use std::process::Command;

use anyhow::{anyhow, bail, Context, Result};

use crate::config::{ProjectConfig, BMGR_SCRIPT};

/// Confirms the generator script is installed.
///
/// If it is missing, runs `idf.py reconfigure` once so the build tool can
/// fetch managed components, then re-checks. Still missing afterwards is
/// fatal.
pub fn ensure_script(cfg: &ProjectConfig) -> Result<()> {
    if cfg.bmgr_script.exists() {
        return Ok(());
    }

    log::info!(
        "ESP Board Manager not found. Running `idf.py reconfigure` to \
         initialize..."
    );

    let idf_path = cfg.idf_path.as_ref().ok_or_else(|| {
        anyhow!(
            "IDF_PATH is not set; cannot run `idf.py reconfigure` to \
             install the ESP Board Manager"
        )
    })?;

    let idf_py = idf_path.join("tools").join("idf.py");
    let status = Command::new(&cfg.python)
        .arg(&idf_py)
        .arg("reconfigure")
        .current_dir(&cfg.project_dir)
        .status()
        .with_context(|| format!("failed to run {}", idf_py.display()))?;

    if !status.success() {
        bail!(
            "failed to initialize ESP Board Manager. Please run \
             `idf.py reconfigure`."
        );
    }

    if !cfg.bmgr_script.exists() {
        bail!(
            "{} not found: {}. Please ensure the ESP Board Manager \
             component is properly installed.",
            BMGR_SCRIPT,
            cfg.bmgr_script.display()
        );
    }

    Ok(())
}

/// Runs the code generation script for `board_name`. Custom boards pass
/// their definition directory via `-c`.
pub fn generate(
    cfg: &ProjectConfig,
    board_name: &str,
    board_path: Option<&Path>,
) -> Result<()> {
    let mut cmd = Command::new(&cfg.python);
    cmd.arg(&cfg.bmgr_script).arg("-b").arg(board_name);

    match board_path {
        Some(path) => {
            cmd.arg("-c").arg(path);
            log::info!(
                "running {} for custom board: {}",
                BMGR_SCRIPT,
                board_name
            );
        }
        None => {
            log::info!("running {} for board: {}", BMGR_SCRIPT, board_name);
        }
    }

    cmd.current_dir(&cfg.project_dir);

    let status = cmd
        .status()
        .with_context(|| format!("failed to run {} ({:?})", BMGR_SCRIPT, cmd))?;

    if !status.success() {
        match status.code() {
            Some(code) => {
                bail!("failed to run {}. Exit code: {}", BMGR_SCRIPT, code)
            }
            None => bail!("{} was terminated by a signal", BMGR_SCRIPT),
        }
    }

    Ok(())
}
