use anyhow::Result;

use super::{with_dispatcher, Command, Target};

pub struct StatusCommand {
    pub target: Target,
}

impl StatusCommand {
    pub fn new(target: Target) -> Self {
        Self { target }
    }
}

impl Command for StatusCommand {
    async fn execute(&self) -> Result<()> {
        with_dispatcher(&self.target, |dispatcher| async move {
            let controller = dispatcher.controller();
            let instance = &self.target.instance;

            let state = controller.current_state(instance).await?;
            let rules = controller.available_events(instance).await?;

            println!("🚢 WORKFLOW STATUS: {}", instance);
            println!("==========================");
            println!("   📍 State: {}", state);
            match state.holder() {
                Some(participant) => println!("   👤 Waiting on: {}", participant),
                None if state.is_final() => println!("   🏁 Workflow complete"),
                None => println!("   👤 Waiting on: anyone"),
            }
            println!();

            if rules.is_empty() {
                println!("📋 No events apply from this state");
                return Ok::<(), anyhow::Error>(());
            }

            println!("📋 AVAILABLE EVENTS:");
            for rule in rules {
                println!("   {} ({}) -> {}", rule.event, rule.event.actor(), rule.to);
            }
            let conflicts = controller.table().conflicts();
            for conflict in conflicts.iter().filter(|c| c.from == state) {
                println!("   ⚠️  {} has conflicting targets and will be refused", conflict.event);
            }
            Ok::<(), anyhow::Error>(())
        })
        .await
    }
}
