//! Stable exit codes for the `migrate` binary.
//!
//! When the migration tool itself fails, its own exit code is propagated
//! unchanged and none of the codes below apply.

use crate::io::process::SpawnError;

/// Migrations applied.
pub const OK: i32 = 0;
/// Failed before the migration tool ran (root resolution, config, spawn, output).
pub const INVALID: i32 = 1;
/// The interpreter could not be found, matching the shell's "command not found".
pub const NOT_FOUND: i32 = 127;
/// Added to the signal number when the migration tool was killed by a signal.
pub const SIGNAL_BASE: i32 = 128;

/// Map a fatal runner error to its exit code.
///
/// Only a missing interpreter maps to [`NOT_FOUND`]; every other failure,
/// including missing directories or files, is [`INVALID`].
pub fn for_error(err: &anyhow::Error) -> i32 {
    let not_found = err
        .chain()
        .filter_map(|cause| cause.downcast_ref::<SpawnError>())
        .any(SpawnError::is_not_found);
    if not_found { NOT_FOUND } else { INVALID }
}

/// Exit status byte for a propagated code.
///
/// Process statuses keep only the low byte, like a shell. A non-zero code
/// whose low byte is zero becomes [`INVALID`] so a failure never reads as
/// success.
pub fn to_exit_byte(code: i32) -> u8 {
    let byte = (code & 0xff) as u8;
    if byte == 0 && code != OK {
        INVALID as u8
    } else {
        byte
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;
    use crate::io::config::load_config;
    use crate::io::root::project_root_for;
    use anyhow::{Context, anyhow};

    fn spawn_error(kind: io::ErrorKind) -> anyhow::Error {
        anyhow::Error::from(SpawnError {
            command: "python manage.py migrate core".to_string(),
            source: io::Error::from(kind),
        })
    }

    #[test]
    fn missing_interpreter_maps_to_127() {
        assert_eq!(for_error(&spawn_error(io::ErrorKind::NotFound)), NOT_FOUND);
        let wrapped = spawn_error(io::ErrorKind::NotFound).context("apply migrations");
        assert_eq!(for_error(&wrapped), NOT_FOUND);
    }

    #[test]
    fn other_spawn_failures_map_to_invalid() {
        assert_eq!(
            for_error(&spawn_error(io::ErrorKind::PermissionDenied)),
            INVALID
        );
        assert_eq!(for_error(&anyhow!("bad config")), INVALID);
    }

    #[test]
    fn missing_project_root_maps_to_invalid() {
        let temp = tempfile::tempdir().expect("tempdir");
        let exe = temp.path().join("gone").join("migrate");

        let err = project_root_for(&exe).expect_err("should fail");
        assert_eq!(for_error(&err), INVALID);
    }

    #[test]
    fn plain_not_found_io_error_maps_to_invalid() {
        let err = Err::<(), _>(io::Error::from(io::ErrorKind::NotFound))
            .context("change directory to /srv/gone")
            .unwrap_err();
        assert_eq!(for_error(&err), INVALID);
    }

    #[test]
    fn unreadable_config_maps_to_invalid() {
        let temp = tempfile::tempdir().expect("tempdir");
        // A directory passes the exists() check but cannot be read as a file.
        let path = temp.path().join("migrate.toml");
        std::fs::create_dir_all(&path).expect("mkdir");

        let err = load_config(&path).expect_err("should fail");
        assert_eq!(for_error(&err), INVALID);
    }

    #[test]
    fn exit_byte_keeps_low_byte() {
        assert_eq!(to_exit_byte(OK), 0);
        assert_eq!(to_exit_byte(3), 3);
        assert_eq!(to_exit_byte(NOT_FOUND), 127);
        assert_eq!(to_exit_byte(256 + 2), 2);
    }

    #[test]
    fn exit_byte_never_turns_failure_into_success() {
        assert_eq!(to_exit_byte(256), INVALID as u8);
        assert_eq!(to_exit_byte(512), INVALID as u8);
        assert_eq!(to_exit_byte(-256), INVALID as u8);
    }
}
