use super::*;
use std::cell::Cell;
use std::rc::Rc;

#[test]
fn test_execute_registered_step() {
    let calls = Rc::new(Cell::new(0));
    let counter = Rc::clone(&calls);
    let registry = StepRegistry::new().with("bump", move || {
        counter.set(counter.get() + 1);
        Ok(())
    });
    let executor = StepExecutor::new(registry);

    let outcome = executor.execute(&StepName::new("bump")).unwrap();
    assert_eq!(outcome, StepOutcome::Applied);
    assert_eq!(calls.get(), 1);
}

#[test]
fn test_unknown_step_is_not_fatal() {
    let executor = StepExecutor::new(StepRegistry::new());
    let outcome = executor.execute(&StepName::new("missing")).unwrap();
    assert_eq!(outcome, StepOutcome::NotFound);
}

#[test]
fn test_failure_carries_step_name() {
    let registry = StepRegistry::new().with("explode", || Err("disk full".into()));
    let executor = StepExecutor::new(registry);

    let err = executor.execute(&StepName::new("explode")).unwrap_err();
    assert_eq!(err.step, "explode");
    assert_eq!(err.source.to_string(), "disk full");
    assert!(err.to_string().contains("[S001] Step 'explode' failed: disk full"));
}

#[test]
fn test_register_replaces_previous_action() {
    let hits = Rc::new(Cell::new(0));
    let first = Rc::clone(&hits);
    let second = Rc::clone(&hits);
    let registry = StepRegistry::new()
        .with("step", move || {
            first.set(first.get() + 1);
            Ok(())
        })
        .with("step", move || {
            second.set(second.get() + 100);
            Ok(())
        });
    assert_eq!(registry.len(), 1);

    StepExecutor::new(registry)
        .execute(&StepName::new("step"))
        .unwrap();
    assert_eq!(hits.get(), 100);
}

#[test]
fn test_blank_registration_is_ignored() {
    let registry = StepRegistry::new().with("  ", || Ok(()));
    assert!(registry.is_empty());
}

struct Fixed(bool);

impl StepAction for Fixed {
    fn run(&self) -> Result<(), StepFailure> {
        if self.0 {
            Ok(())
        } else {
            Err("fixed failure".into())
        }
    }
}

#[test]
fn test_struct_actions_and_sorted_names() {
    let mut registry = StepRegistry::new();
    registry
        .register(StepName::new("zeta"), Fixed(true))
        .register(StepName::new("alpha"), Fixed(false));

    let names: Vec<&str> = registry.names().into_iter().map(|n| n.as_str()).collect();
    assert_eq!(names, vec!["alpha", "zeta"]);
    assert!(registry.contains("zeta"));

    let executor = StepExecutor::new(registry);
    assert!(executor.execute(&StepName::new("zeta")).is_ok());
    assert!(executor.execute(&StepName::new("alpha")).is_err());
}
