//! Hand-off to the external playlist generator.
//!
//! The generator is run with the saved config path as its last argument.
//! Only when it succeeds are its results copied to the output directory.

use crate::config::GeneratorSettings;
use crate::error::{AppError, Result};
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Run the generator and wait for it.
///
/// A non-zero exit becomes [`AppError::Generator`] carrying the captured
/// standard error.
pub fn run_generator(settings: &GeneratorSettings, config_path: &Path) -> Result<()> {
    fs::create_dir_all(&settings.work_dir)?;

    info!(
        "Running {} {} {}",
        settings.program,
        settings.args.join(" "),
        config_path.display()
    );

    let output = Command::new(&settings.program)
        .args(&settings.args)
        .arg(config_path)
        .stdin(Stdio::null())
        .output()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::Generator {
                    code: None,
                    stderr: format!("{} not found", settings.program),
                }
            } else {
                AppError::Generator {
                    code: None,
                    stderr: format!("Failed to run {}: {}", settings.program, e),
                }
            }
        })?;

    if output.status.success() {
        debug!("Generator finished: {}", output.status);
        Ok(())
    } else {
        Err(AppError::Generator {
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Name a generator output gets in the output directory.
pub fn published_name(file_name: &str) -> String {
    file_name.replace("selected", "output")
}

/// Copy the generator results and the config to the output directory, then
/// remove the work directory.
///
/// Missing outputs are skipped. Returns the paths written.
pub fn publish(settings: &GeneratorSettings, config_path: &Path) -> Result<Vec<PathBuf>> {
    let work_dir = Path::new(&settings.work_dir);
    let output_dir = Path::new(&settings.output_dir);
    fs::create_dir_all(output_dir)?;

    let mut written = Vec::new();
    for name in &settings.outputs {
        let src = work_dir.join(name);
        if !src.is_file() {
            debug!("Generator did not produce {}", name);
            continue;
        }
        let dst = output_dir.join(published_name(name));
        fs::copy(&src, &dst)?;
        written.push(dst);
    }

    if let Some(name) = config_path.file_name() {
        let dst = output_dir.join(name);
        fs::copy(config_path, &dst)?;
        written.push(dst);
    }

    if let Err(e) = fs::remove_dir_all(work_dir) {
        warn!("Could not remove {}: {}", work_dir.display(), e);
    }

    Ok(written)
}

/// Run the generator, then publish its results.
///
/// A failing generator stops here: nothing is published and the config
/// is left as saved.
pub fn generate(settings: &GeneratorSettings, config_path: &Path) -> Result<Vec<PathBuf>> {
    run_generator(settings, config_path)?;
    let written = publish(settings, config_path)?;
    info!("Published {} files to {}", written.len(), settings.output_dir);
    Ok(written)
}
