//! Installation of the hook scripts that hand control to the `config-warden` binary.

use std::fs;
use std::path::{Path, PathBuf};

use super::HookKind;
use crate::vcs::Backend;
use crate::InstallError;

/// The directory git runs hooks from, as an absolute path.
pub fn hooks_dir(backend: &dyn Backend) -> Result<PathBuf, InstallError> {
    let dir = backend.git(&["rev-parse", "--path-format=absolute", "--git-path", "hooks"])?;
    Ok(PathBuf::from(dir))
}

/// The script git runs for `kind`; it replaces itself with `program`.
pub fn script(program: &Path, kind: HookKind) -> String {
    format!(
        "#!/bin/sh\n# Installed by config-warden.\nexec {} {kind} \"$@\"\n",
        shell_quote(&program.to_string_lossy())
    )
}

/// Write one script per [`HookKind`] into the hooks directory and return their paths.
///
/// Nothing is written if any script exists already, unless `force` is set.
pub fn install(backend: &dyn Backend, program: &Path, force: bool) -> Result<Vec<PathBuf>, InstallError> {
    let dir = hooks_dir(backend)?;
    let paths: Vec<PathBuf> = HookKind::ALL.iter().map(|kind| dir.join(kind.name())).collect();
    if !force {
        if let Some(existing) = paths.iter().find(|path| path.exists()) {
            return Err(InstallError::Exists { path: existing.clone() });
        }
    }

    fs::create_dir_all(&dir).map_err(|source| InstallError::Io {
        path: dir.clone(),
        source,
    })?;
    for (kind, path) in HookKind::ALL.into_iter().zip(&paths) {
        fs::write(path, script(program, kind)).map_err(|source| InstallError::Io {
            path: path.clone(),
            source,
        })?;
        make_executable(path)?;
        tracing::info!(hook = %kind, path = %path.display(), "installed hook");
    }
    Ok(paths)
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<(), InstallError> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).map_err(|source| InstallError::Io {
        path: path.to_owned(),
        source,
    })
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<(), InstallError> {
    Ok(())
}

fn shell_quote(text: &str) -> String {
    format!("'{}'", text.replace('\'', r"'\''"))
}
