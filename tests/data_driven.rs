//! Repetición data-driven: aislamiento de fallos por fila y desactivación
//! temporal de la regla de omisión tras fallo.

mod support;

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::json;
use support::{new_log, Recorder};
use verdict_core::{step_operations, DataDrivenRunner, DataTableRow, InterceptedLibrary,
                   StepEventBus, StepFault, StepValue, TestResult};

/// Una instancia por fila, poblada con los valores de esa fila.
struct AccountRow {
    balance: i64,
    withdrawal: i64,
}

fn rows(data: &[(i64, i64)]) -> Vec<DataTableRow<AccountRow>> {
    data.iter()
        .map(|&(balance, withdrawal)| {
            DataTableRow::new(AccountRow { balance, withdrawal },
                              vec![json!(balance), json!(withdrawal)])
        })
        .collect()
}

fn withdraw(row: &mut AccountRow) -> Result<i64, StepFault> {
    if row.withdrawal > row.balance {
        return Err(StepFault::assertion(format!("cannot withdraw {} from {}",
                                                row.withdrawal, row.balance)));
    }
    row.balance -= row.withdrawal;
    Ok(row.balance)
}

#[test]
fn every_row_runs_even_when_an_earlier_row_fails() {
    support::init_logging();
    let bus = StepEventBus::handle();
    bus.borrow_mut().test_started("withdrawals");

    let table = step_operations! {
        "withdraw" { title: "Withdraw {1} from a balance of {0}" },
    };
    let mut runner = DataDrivenRunner::new("Account", bus.clone(), table,
                                           rows(&[(100, 30), (10, 50), (80, 20)]));

    let invoked = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&invoked);
    let results = runner.invoke("withdraw", move |row| {
                            *counter.borrow_mut() += 1;
                            withdraw(row)
                        })
                        .expect("valid state");

    assert_eq!(*invoked.borrow(), 3, "rows after the failing one still ran");
    assert_eq!(results,
               vec![StepValue::Real(70), StepValue::Empty, StepValue::Real(60)]);

    let tally = bus.borrow().tally();
    assert_eq!(tally.failures(), 1, "failure tally equals the failing rows");
    assert_eq!(tally.success, 2);

    let outcome = bus.borrow_mut().test_finished().expect("active test");
    assert_eq!(outcome.result, TestResult::Failure);
}

#[test]
fn failure_tally_equals_the_number_of_failing_rows() {
    let bus = StepEventBus::handle();
    bus.borrow_mut().test_started("withdrawals");

    let mut runner = DataDrivenRunner::new("Account", bus.clone(), step_operations! {},
                                           rows(&[(10, 50), (100, 30), (5, 6), (0, 1)]));
    runner.invoke("withdraw", withdraw).expect("valid state");

    assert_eq!(bus.borrow().tally().failures(), 3);
    assert_eq!(bus.borrow().tally().success, 1);
}

#[test]
fn the_skip_rule_is_masked_while_the_runner_is_active_and_restored_after() {
    let log = new_log();
    let bus = StepEventBus::handle();
    bus.borrow_mut().register_listener(Recorder::new(&log));
    bus.borrow_mut().test_started("withdrawals");

    let mut runner = DataDrivenRunner::new("Account", bus.clone(), step_operations! {},
                                           rows(&[(10, 50), (100, 30)]));
    runner.invoke("withdraw", withdraw).expect("valid state");

    // Dentro del runner la fila 2 ejecutó en real pese al fallo de la fila 1.
    assert!(log.borrow().iter().any(|e| e.starts_with("step_finished:Withdraw")));

    // Fuera del runner la regla normal vuelve a aplicar.
    assert!(bus.borrow().a_step_has_failed());
    let mut account = InterceptedLibrary::new("Account",
                                              AccountRow { balance: 100, withdrawal: 10 },
                                              bus.clone(),
                                              step_operations! {});
    account.call("close_account", vec![], |_| Ok(())).expect("valid state");
    assert!(log.borrow().contains(&"step_ignored:Close account".to_string()));
}

#[test]
fn row_descriptions_render_the_row_values() {
    let log = new_log();
    let bus = StepEventBus::handle();
    bus.borrow_mut().register_listener(Recorder::new(&log));
    bus.borrow_mut().test_started("withdrawals");

    let table = step_operations! {
        "withdraw" { title: "Withdraw {1} from a balance of {0}" },
    };
    let mut runner = DataDrivenRunner::new("Account", bus.clone(), table, rows(&[(100, 30)]));
    runner.invoke("withdraw", withdraw).expect("valid state");

    assert!(log.borrow()
               .contains(&"step_started:Withdraw 30 from a balance of 100".to_string()));
}
