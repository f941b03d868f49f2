use std::io::{self, BufRead};

/// Targets from positional arguments, or from `input` when there are none.
///
/// Stdin lines are trimmed and blank ones skipped.
pub fn read_targets<R: BufRead>(args: Vec<String>, input: R) -> io::Result<Vec<String>> {
    if !args.is_empty() {
        tracing::info!(count = args.len(), "faver.intake.arguments");
        return Ok(args);
    }

    tracing::info!("faver.intake.stdin");
    let mut targets = Vec::new();
    for line in input.lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        tracing::debug!(line = %trimmed, "faver.intake.line");
        targets.push(trimmed.to_string());
    }
    Ok(targets)
}
