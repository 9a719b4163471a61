use anyhow::{bail, Result};

use super::Command;
use crate::workflow::{TransitionTable, WorkflowState};

pub struct RulesCommand {
    pub json: bool,
    pub check: bool,
    pub from: String,
}

impl RulesCommand {
    pub fn new(json: bool, check: bool, from: String) -> Self {
        Self { json, check, from }
    }
}

impl Command for RulesCommand {
    async fn execute(&self) -> Result<()> {
        let table = TransitionTable::reference();
        let start = WorkflowState::parse(&self.from)?;
        let report = table.report(start);

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            println!("📜 TRANSITION TABLE ({} rules)", report.rule_count);
            println!("==========================");
            for rule in table.rules() {
                println!("   {}", rule);
            }
            println!();
            println!("🏁 Terminal states: {}", join(&report.terminal_states));
            println!(
                "🚫 Unreachable from {}: {}",
                report.start,
                join(&report.unreachable_states)
            );
            if report.conflicts.is_empty() {
                println!("✅ No conflicting rules");
            } else {
                for conflict in &report.conflicts {
                    println!("⚠️  Conflict: {}", conflict);
                }
            }
        }

        if self.check {
            if let Err(e) = table.validate() {
                bail!(e);
            }
        }
        Ok(())
    }
}

fn join(states: &[WorkflowState]) -> String {
    if states.is_empty() {
        return "none".to_string();
    }
    states
        .iter()
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
