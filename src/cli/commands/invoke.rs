use anyhow::Result;
use std::io::{IsTerminal, Write};

use super::{with_dispatcher, Command, Target};
use crate::dispatch::{EntryPoint, Response};
use crate::workflow::Transition;

/// Run one dispatcher operation against the file store
pub struct InvokeCommand {
    pub target: Target,
    pub entry_point: EntryPoint,
    pub function: String,
    pub args: Vec<String>,
}

impl InvokeCommand {
    pub fn new(target: Target, entry_point: EntryPoint, function: String, args: Vec<String>) -> Self {
        Self {
            target,
            entry_point,
            function,
            args,
        }
    }

    /// `marine-flow init <state>`
    pub fn init(target: Target, state: String) -> Self {
        Self::new(target, EntryPoint::Invoke, "init".to_string(), vec![state])
    }
}

impl Command for InvokeCommand {
    async fn execute(&self) -> Result<()> {
        let response = with_dispatcher(&self.target, |dispatcher| async move {
            let instance = &self.target.instance;
            let result = match self.entry_point {
                EntryPoint::Invoke => {
                    dispatcher
                        .invoke(instance, &self.function, &self.args)
                        .await
                }
                EntryPoint::Query => {
                    dispatcher
                        .query(instance, &self.function, &self.args)
                        .await
                }
            };
            dispatcher.metrics().log_stats();
            let response = result?;
            Ok::<_, anyhow::Error>(response)
        })
        .await?;

        report(&self.target, &response)
    }
}

fn report(target: &Target, response: &Response) -> Result<()> {
    if let Some(outcome) = &response.transition {
        match outcome {
            Transition::Moved { from, event, to } => {
                eprintln!("✅ [{}] {} -> ({}) -> {}", target.instance, from, event, to)
            }
            Transition::Unchanged { state, event } => eprintln!(
                "⏸️  [{}] {} does not apply to {}; state unchanged",
                target.instance, event, state
            ),
            Transition::Ambiguous { .. } => {}
        }
    }

    if let Some(payload) = &response.payload {
        let mut stdout = std::io::stdout().lock();
        let terminal = stdout.is_terminal();
        write_payload(&mut stdout, payload, terminal)?;
        stdout.flush()?;
    }
    Ok(())
}

/// Payload bytes exactly as stored; a trailing newline is added only for a
/// terminal.
fn write_payload(out: &mut impl Write, payload: &[u8], terminal: bool) -> Result<()> {
    out.write_all(payload)?;
    if terminal {
        out.write_all(b"\n")?;
    }
    Ok(())
}
