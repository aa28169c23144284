use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum IterateError {
    #[error("Cannot run an empty command")]
    EmptyCommand,

    #[error("Failed to launch `{command}`: {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    #[error("Stage {stage} is out of range (0\u{2013}{max})")]
    StageOutOfRange { stage: usize, max: usize },

    #[error("No MAAS API key given. Pass --maas-key or set MAAS_API_KEY")]
    MissingApiKey,

    #[error("Failed to write run report {path}: {source}")]
    ReportWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to read run report {path}: {detail}")]
    ReportRead { path: PathBuf, detail: String },

    #[error("Failed to parse config file {path}: {detail}")]
    ConfigParse { path: PathBuf, detail: String },

    #[error("Failed to open log file {path}: {source}")]
    LogFile {
        path: PathBuf,
        source: std::io::Error,
    },
}
