use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum ProbeError {
    #[error("failed to run {program} for {path}: {source}")]
    Spawn {
        program: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} exited with code {code:?} for {path}: {stderr}")]
    Failed {
        program: String,
        path: PathBuf,
        code: Option<i32>,
        stderr: String,
    },
    #[error("error parsing duration for {path}: {output:?} is not a valid number of seconds")]
    InvalidOutput { path: PathBuf, output: String },
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("cannot access {path}: {source}")]
    PathAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("error reading directory {path}: {source}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
    #[error(transparent)]
    Probe(#[from] ProbeError),
    #[error("unsupported video format: {path}")]
    UnsupportedFormat { path: PathBuf },
    #[error("file name is not valid UTF-8: {path}")]
    InvalidFileName { path: PathBuf },
    #[error("failed to rename {from} to {to}: {source}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
