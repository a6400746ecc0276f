//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `planit_core` linkage.
//! - Exercise one add/list round on a throwaway registry.

use planit_core::{Category, NewTask, RegistryConfig, SystemClock, TaskRegistry};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("planit_core ping={}", planit_core::ping());
    println!("planit_core version={}", planit_core::core_version());
    println!(
        "planit_core default_log_level={}",
        planit_core::default_log_level().as_str()
    );

    match smoke_check_registry() {
        Ok(summary) => {
            println!("{summary}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("planit_core registry smoke check failed: {err}");
            ExitCode::FAILURE
        }
    }
}

fn smoke_check_registry() -> Result<String, planit_core::RegistryError> {
    let today = planit_core::today(&SystemClock)?;
    let registry = TaskRegistry::new(RegistryConfig::default())?;
    registry.add_task(NewTask::new(today, "smoke check").in_category(Category::Work))?;

    let sections = registry.day_sections(today)?;
    let counts = registry.task_counts(None)?;
    Ok(format!(
        "planit_core day={} sections={} tasks_today={}",
        today.get(),
        sections.len(),
        counts.get(&today).copied().unwrap_or(0)
    ))
}
