//! Plan command implementation - dry run of an upgrade or rollback

use anyhow::{Context, Result};
use sl_core::{Direction, MigrationPlan};

use crate::cli::{GlobalArgs, PlanArgs};
use crate::commands::common::{self, open_runner};

/// Execute the plan command
pub(crate) fn execute(args: &PlanArgs, global: &GlobalArgs) -> Result<()> {
    let (_project, runner) = open_runner(global)?;

    let plan = if args.rollback {
        let Some(target) = args.to else {
            anyhow::bail!("--rollback requires --to");
        };
        runner.plan_rollback(target)
    } else {
        let target = match args.to {
            Some(target) => target,
            None => runner
                .latest_catalog_version()
                .context("The catalog declares no migrations")?,
        };
        runner.plan_upgrade(target)
    };
    let plan = match plan {
        Ok(plan) => plan,
        Err(err) => return Err(common::migration_failed(&err)),
    };

    if args.json {
        return common::print_json(&plan);
    }
    print_plan(&plan);
    Ok(())
}

fn print_plan(plan: &MigrationPlan) {
    if plan.is_empty() {
        println!("Nothing to do: schema is at {}", plan.from);
        return;
    }

    println!(
        "Plan: {} {} -> {} ({} version(s))\n",
        plan.direction,
        plan.from,
        plan.to,
        plan.versions.len()
    );

    let mut unresolved = 0;
    for version in &plan.versions {
        println!("  {}  {}", version.version, version.description);
        if version.steps.is_empty() && plan.direction == Direction::Rollback {
            println!("      (no rollback steps, skipped)");
        }
        for step in &version.steps {
            if step.resolved {
                println!("      - {}", step.name);
            } else {
                unresolved += 1;
                println!("      - {}  (no action registered, would be skipped)", step.name);
            }
        }
    }

    let total = plan.step_names().len();
    println!("\n{total} step(s), {unresolved} unresolved");
}
