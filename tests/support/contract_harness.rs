use assert_cmd::Command;
use serde_json::Value;
use std::path::PathBuf;
use tempfile::TempDir;

#[derive(Debug, Clone)]
pub struct ScenarioResult {
    pub outputs: Vec<Value>,
    pub exit_code: Option<i32>,
}

impl ScenarioResult {
    pub fn last(&self) -> Result<&Value, String> {
        self.outputs
            .last()
            .ok_or_else(|| "expected at least one response envelope".to_string())
    }
}

/// Runs the binary in a scratch working directory so the project config of
/// whoever runs the tests is never picked up.
#[derive(Debug)]
pub struct ProtocolScenarioHarness {
    binary_path: PathBuf,
    workdir: TempDir,
}

impl ProtocolScenarioHarness {
    pub fn new() -> Result<Self, String> {
        let workdir = TempDir::new().map_err(|e| format!("failed to create workdir: {e}"))?;
        Ok(Self {
            binary_path: PathBuf::from(assert_cmd::cargo::cargo_bin!("chainpost")),
            workdir,
        })
    }

    /// Writes `.chainpost/config.toml` in the scratch directory.
    pub fn with_config(self, content: &str) -> Result<Self, String> {
        let dir = self.workdir.path().join(".chainpost");
        std::fs::create_dir_all(&dir).map_err(|e| format!("failed to create config dir: {e}"))?;
        std::fs::write(dir.join("config.toml"), content)
            .map_err(|e| format!("failed to write config: {e}"))?;
        Ok(self)
    }

    pub fn command(&self) -> Command {
        let mut cmd = Command::new(&self.binary_path);
        cmd.current_dir(self.workdir.path()).env_remove("RUST_LOG");
        cmd
    }

    pub fn run_protocol(&self, lines: &[&str]) -> Result<ScenarioResult, String> {
        let input = lines.iter().map(|line| format!("{line}\n")).collect::<String>();
        let output = self
            .command()
            .write_stdin(input)
            .output()
            .map_err(|e| format!("failed to run binary: {e}"))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let outputs = stdout
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                serde_json::from_str::<Value>(line)
                    .map_err(|err| format!("expected JSON response envelope, got '{line}': {err}"))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ScenarioResult {
            outputs,
            exit_code: output.status.code(),
        })
    }
}

pub fn assert_protocol_envelope(output: &Value) -> Result<(), String> {
    match (output.get("ok"), output.get("t"), output.get("ms")) {
        (Some(_), Some(timestamp), Some(duration))
            if timestamp.is_number() && duration.is_number() =>
        {
            Ok(())
        }
        _ => Err(format!(
            "missing or invalid protocol envelope fields in response: {output}"
        )),
    }
}
