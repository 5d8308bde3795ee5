//! Check command - builds the workflow registry and prints its shape

use std::fmt::Write as _;

use tracing::info;

use crate::domain::workflow::WorkflowRegistry;
use crate::infrastructure::messenger::CONSOLE_PLATFORM;

/// Validate every workflow and list them with their steps
pub async fn run() -> anyhow::Result<()> {
    let config = super::bootstrap();

    let channel = crate::create_console_channel(&config, CONSOLE_PLATFORM);
    let registry = crate::create_registry(&config, channel.router.clone())?;
    let store = config.storage.state_store_config()?;

    info!(
        workflows = registry.len(),
        backend = ?store.backend(),
        "Workflow registry is valid"
    );
    print!("{}", describe(&registry));

    Ok(())
}

/// Human readable listing, default workflow first marked with `*`
fn describe(registry: &WorkflowRegistry) -> String {
    let mut out = String::new();

    for workflow in registry.iter() {
        let marker = if workflow.id() == registry.default_workflow_id() {
            "*"
        } else {
            " "
        };
        let _ = writeln!(out, "{} {} ({})", marker, workflow.id(), workflow.name());

        for step in workflow.step_ids() {
            let initial = if step == workflow.initial_step() {
                " [initial]"
            } else {
                ""
            };
            let _ = writeln!(out, "    - {}{}", step, initial);
        }

        let chains = workflow.chain_targets();
        if !chains.is_empty() {
            let targets: Vec<&str> = chains.iter().map(|id| id.as_str()).collect();
            let _ = writeln!(out, "    chains to: {}", targets.join(", "));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AppConfig;

    #[test]
    fn test_describe_lists_workflows_and_steps() {
        let config = AppConfig::default();
        let channel = crate::create_console_channel(&config, "console");
        let registry = crate::create_registry(&config, channel.router.clone()).unwrap();

        let listing = describe(&registry);

        assert!(listing.starts_with("* onboarding (Onboarding)\n    - welcome [initial]\n"));
        assert!(listing.contains("  menu (Main menu)\n"));
        assert!(listing.contains("    - select_order [initial]\n"));
        assert!(listing.contains("    chains to: menu, onboarding\n"));
    }
}
