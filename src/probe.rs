use crate::error::ProbeError;
use log::debug;
use std::ffi::OsString;
use std::path::Path;
use std::process::Command;

/// Anything that can tell how long a media file plays, in seconds.
pub trait DurationSource {
    fn duration_secs(&self, path: &Path) -> Result<f64, ProbeError>;
}

/// Probes durations by running `ffprobe` against each file.
#[derive(Debug, Clone)]
pub struct Ffprobe {
    program: OsString,
}

impl Ffprobe {
    /// Uses `program` instead of the `ffprobe` found on `PATH`.
    pub fn with_program(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn program_name(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }
}

impl Default for Ffprobe {
    fn default() -> Self {
        Self::with_program("ffprobe")
    }
}

impl DurationSource for Ffprobe {
    fn duration_secs(&self, path: &Path) -> Result<f64, ProbeError> {
        let mut cmd = Command::new(&self.program);
        cmd.args([
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ])
        .arg(path);
        debug!("Running {:?}", cmd);

        let output = cmd.output().map_err(|source| ProbeError::Spawn {
            program: self.program_name(),
            path: path.to_path_buf(),
            source,
        })?;
        if !output.status.success() {
            return Err(ProbeError::Failed {
                program: self.program_name(),
                path: path.to_path_buf(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let duration = parse_duration(path, &output.stdout)?;
        debug!("Duration of {:?}: {}s", path, duration);
        Ok(duration)
    }
}

/// Parses ffprobe's bare duration output. Surrounding whitespace is allowed,
/// anything else that is not a finite, non-negative number is rejected.
pub fn parse_duration(path: &Path, stdout: &[u8]) -> Result<f64, ProbeError> {
    let invalid = || ProbeError::InvalidOutput {
        path: path.to_path_buf(),
        output: String::from_utf8_lossy(stdout).trim().to_string(),
    };
    let text = std::str::from_utf8(stdout).map_err(|_| invalid())?;
    match text.trim().parse::<f64>() {
        Ok(secs) if secs.is_finite() && secs >= 0.0 => Ok(secs),
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> Result<f64, ProbeError> {
        parse_duration(Path::new("clip.mp4"), s.as_bytes())
    }

    #[test]
    fn accepts_trimmed_float() {
        assert_eq!(parse("125.000000\n").unwrap(), 125.0);
        assert_eq!(parse("  0.5  ").unwrap(), 0.5);
        assert_eq!(parse("3600").unwrap(), 3600.0);
    }

    #[test]
    fn rejects_trailing_garbage() {
        assert!(matches!(
            parse("12.5 seconds"),
            Err(ProbeError::InvalidOutput { .. })
        ));
        assert!(parse("12.5\nduration=3").is_err());
    }

    #[test]
    fn rejects_empty_and_not_available() {
        assert!(parse("").is_err());
        assert!(parse("\n").is_err());
        assert!(parse("N/A\n").is_err());
    }

    #[test]
    fn rejects_negative_and_non_finite() {
        assert!(parse("-1.0").is_err());
        assert!(parse("inf").is_err());
        assert!(parse("NaN").is_err());
    }

    #[test]
    fn rejects_invalid_utf8() {
        let err = parse_duration(Path::new("clip.mp4"), &[0xff, 0xfe, b'1']).unwrap_err();
        assert!(matches!(err, ProbeError::InvalidOutput { .. }));
    }

    #[cfg(unix)]
    fn fake_ffprobe(dir: &Path, body: &str) -> std::path::PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let script = dir.join("ffprobe");
        std::fs::write(&script, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        script
    }

    #[cfg(unix)]
    #[test]
    fn reads_duration_from_process_output() {
        let dir = tempfile::tempdir().unwrap();
        let probe = Ffprobe::with_program(fake_ffprobe(dir.path(), "echo ' 125.0 '"));
        assert_eq!(probe.duration_secs(Path::new("clip.mp4")).unwrap(), 125.0);
    }

    #[cfg(unix)]
    #[test]
    fn garbage_process_output_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let probe = Ffprobe::with_program(fake_ffprobe(dir.path(), "echo 'N/A'"));
        let err = probe.duration_secs(Path::new("clip.mp4")).unwrap_err();
        assert!(matches!(err, ProbeError::InvalidOutput { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn non_zero_exit_is_failed() {
        let probe = Ffprobe::with_program("false");
        let err = probe.duration_secs(Path::new("clip.mp4")).unwrap_err();
        assert!(matches!(err, ProbeError::Failed { code: Some(1), .. }));
    }

    #[cfg(unix)]
    #[test]
    fn failed_keeps_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let script = fake_ffprobe(dir.path(), "echo 'moov atom not found' >&2; exit 1");
        let err = Ffprobe::with_program(script)
            .duration_secs(Path::new("clip.mp4"))
            .unwrap_err();
        match err {
            ProbeError::Failed { stderr, .. } => assert_eq!(stderr, "moov atom not found"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_program_is_spawn_error() {
        let probe = Ffprobe::with_program("definitely-not-a-real-ffprobe-binary");
        let err = probe.duration_secs(Path::new("clip.mp4")).unwrap_err();
        assert!(matches!(err, ProbeError::Spawn { .. }));
    }
}
