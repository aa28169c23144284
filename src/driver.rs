use tracing::info;

use crate::errors::IterateError;
use crate::runner::Execute;
use crate::types::{CommandLine, RunReport};

/// The commands stage `stage` runs: indices `0..=stage`.
pub fn select_stage(commands: &[CommandLine], stage: usize) -> Result<&[CommandLine], IterateError> {
    if stage >= commands.len() {
        return Err(IterateError::StageOutOfRange {
            stage,
            max: commands.len().saturating_sub(1),
        });
    }
    Ok(&commands[..=stage])
}

/// Run every command of `stage` in order, collecting their results.
///
/// The first launch failure aborts the run and is returned; commands after it
/// never execute.
pub fn run_stage<E: Execute>(
    commands: &[CommandLine],
    stage: usize,
    executor: &mut E,
) -> Result<RunReport, IterateError> {
    let selected = select_stage(commands, stage)?;
    let names: Vec<String> = selected.iter().map(|c| c.to_string()).collect();
    info!(
        "Starting to run process for stage {} with commands: {:?}",
        stage, names
    );

    let mut report = RunReport::new();
    for (command, name) in selected.iter().zip(names) {
        let result = executor.execute(command)?;
        report.insert(name, result);
    }
    Ok(report)
}
