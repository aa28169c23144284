use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// The provisioning sequence, in stage order.
pub const COMMAND_LIST: [&str; 6] = [
    "rm -rf *.retry",
    "python maas --kill",
    "python maas --reset",
    "ansible-playbook k8s-base.yaml",
    "ansible-playbook k8s-common.yaml",
    "ansible-playbook k8s-kube-system.yaml",
];

/// A tokenized command: program followed by its arguments.
///
/// Strings are split on single spaces only. There is no quoting, so an
/// argument can never contain a space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    tokens: Vec<String>,
}

impl CommandLine {
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn program(&self) -> Option<&str> {
        self.tokens.first().map(String::as_str)
    }

    pub fn args(&self) -> &[String] {
        self.tokens.get(1..).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty() || self.tokens.iter().all(|t| t.is_empty())
    }
}

impl From<&str> for CommandLine {
    fn from(cmd: &str) -> Self {
        Self {
            tokens: cmd.split(' ').map(str::to_string).collect(),
        }
    }
}

impl From<String> for CommandLine {
    fn from(cmd: String) -> Self {
        Self::from(cmd.as_str())
    }
}

impl From<Vec<String>> for CommandLine {
    fn from(tokens: Vec<String>) -> Self {
        Self { tokens }
    }
}

impl From<&[&str]> for CommandLine {
    fn from(tokens: &[&str]) -> Self {
        Self {
            tokens: tokens.iter().map(|t| t.to_string()).collect(),
        }
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tokens.join(" "))
    }
}

/// Builds the default command list.
pub fn default_commands() -> Vec<CommandLine> {
    COMMAND_LIST.iter().map(|c| CommandLine::from(*c)).collect()
}

/// Timing, output and status of one executed command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    #[serde(with = "start_format")]
    pub start: DateTime<Utc>,
    pub log: Vec<String>,
    pub return_code: i32,
    pub elapsed: f64,
}

/// Command string -> result, in the order commands were first run.
///
/// Inserting an existing key replaces its value but keeps its position.
pub type RunReport = IndexMap<String, RunResult>;

/// Render a start timestamp: RFC 3339, UTC, microsecond precision.
///
/// The report file and the console summary both use this.
pub fn format_start(start: DateTime<Utc>) -> String {
    start.to_rfc3339_opts(SecondsFormat::Micros, true)
}

mod start_format {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        start: &DateTime<Utc>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_start(*start))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn result(rc: i32) -> RunResult {
        RunResult {
            start: Utc.with_ymd_and_hms(2024, 5, 1, 10, 20, 30).unwrap(),
            log: vec!["out".to_string(), String::new()],
            return_code: rc,
            elapsed: 1.25,
        }
    }

    #[test]
    fn tokenizes_on_single_spaces() {
        let cmd = CommandLine::from("echo hello");
        assert_eq!(cmd.tokens(), ["echo", "hello"]);
        assert_eq!(cmd.program(), Some("echo"));
        assert_eq!(cmd.args(), ["hello"]);
    }

    #[test]
    fn doubled_spaces_keep_empty_tokens() {
        let cmd = CommandLine::from("echo  hi");
        assert_eq!(cmd.tokens(), ["echo", "", "hi"]);
        assert_eq!(cmd.to_string(), "echo  hi");
    }

    #[test]
    fn pre_tokenized_input_is_used_as_is() {
        let cmd = CommandLine::from(vec!["printf".to_string(), "a b".to_string()]);
        assert_eq!(cmd.tokens(), ["printf", "a b"]);
        assert_eq!(cmd.args(), ["a b"]);
    }

    #[test]
    fn empty_string_is_empty_command() {
        assert!(CommandLine::from("").is_empty());
        assert!(CommandLine::from(Vec::<String>::new()).is_empty());
        assert!(!CommandLine::from("true").is_empty());
    }

    #[test]
    fn default_list_has_six_commands_in_order() {
        let commands = default_commands();
        assert_eq!(commands.len(), 6);
        assert_eq!(commands[0].to_string(), "rm -rf *.retry");
        assert_eq!(commands[5].to_string(), "ansible-playbook k8s-kube-system.yaml");
    }

    #[test]
    fn report_last_write_wins_in_first_position() {
        let mut report = RunReport::new();
        report.insert("a".into(), result(0));
        report.insert("b".into(), result(0));
        report.insert("a".into(), result(3));

        assert_eq!(report.len(), 2);
        let keys: Vec<&str> = report.keys().map(String::as_str).collect();
        assert_eq!(keys, ["a", "b"]);
        assert_eq!(report["a"].return_code, 3);
    }

    #[test]
    fn report_serializes_as_ordered_object() {
        let mut report = RunReport::new();
        report.insert("zeta".into(), result(0));
        report.insert("alpha".into(), result(2));

        let json = serde_json::to_string(&report).unwrap();
        assert!(json.find("zeta").unwrap() < json.find("alpha").unwrap());

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let entry = &value["alpha"];
        assert!(entry["start"].is_string());
        assert!(entry["log"].is_array());
        assert_eq!(entry["return_code"], 2);
        assert_eq!(entry["elapsed"], 1.25);
        assert_eq!(entry["start"], "2024-05-01T10:20:30.000000Z");
    }

    #[test]
    fn start_keeps_microseconds_only() {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 10, 20, 30).unwrap()
            + chrono::TimeDelta::nanoseconds(471_729_704);
        assert_eq!(format_start(start), "2024-05-01T10:20:30.471729Z");

        let mut report = RunReport::new();
        report.insert("x".into(), RunResult { start, ..result(0) });
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["x"]["start"], format_start(start));
    }

    #[test]
    fn report_reads_back_in_order() {
        let json = r#"{"b":{"start":"2024-05-01T10:20:30Z","log":[""],"return_code":0,"elapsed":0.5},
                       "a":{"start":"2024-05-01T10:20:31Z","log":["x"],"return_code":1,"elapsed":0.1}}"#;
        let report: RunReport = serde_json::from_str(json).unwrap();
        let keys: Vec<&str> = report.keys().map(String::as_str).collect();
        assert_eq!(keys, ["b", "a"]);
        assert_eq!(report["a"].return_code, 1);
    }
}
