// Execution contract of Suite::run across the three function shapes.
use harness_core::suite::FnShape;
use harness_core::{RunError, Suite, SuiteConfig, SuiteEvent, SuiteFn, SuiteResult};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

// --- helpers ---

fn suite_with(func: SuiteFn) -> Suite {
    Suite::new(SuiteConfig::new().title("suite").func(func))
}

/// Records every lifecycle event in order.
fn record_events(suite: &Suite) -> Rc<RefCell<Vec<String>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    for event in [SuiteEvent::WillRun, SuiteEvent::DidRun] {
        let log = Rc::clone(&log);
        suite.on(event, move |_| log.borrow_mut().push(event.to_string()));
    }
    log
}

fn shapes(fail: bool) -> Vec<SuiteFn> {
    let outcome = move || {
        if fail {
            Err(RunError::new("nope"))
        } else {
            Ok(())
        }
    };
    vec![
        SuiteFn::sync(move |_| outcome()),
        SuiteFn::future(move |_| async move {
            tokio::task::yield_now().await;
            outcome()
        }),
        SuiteFn::callback(move |_, done| done.complete(outcome().err())),
    ]
}

fn explode(message: &str) -> Result<(), RunError> {
    panic!("{}", message)
}

fn explode_before_awaiting(_: &Suite) -> std::future::Ready<Result<(), RunError>> {
    panic!("eager boom")
}

// --- resolution and results ---

#[tokio::test]
async fn run_resolves_to_the_suite() {
    let suite = suite_with(SuiteFn::sync(|_| Ok(())));
    let ran = suite.run().await;
    assert_eq!(ran, suite);
}

#[tokio::test]
async fn run_records_a_passing_result() {
    let suite = suite_with(SuiteFn::sync(|_| Ok(())));
    suite.run().await;
    assert_eq!(suite.result(), Some(SuiteResult::passed()));
}

#[tokio::test]
async fn func_is_called_on_the_context() {
    let seen: Rc<RefCell<Option<Suite>>> = Rc::new(RefCell::new(None));
    let sink = Rc::clone(&seen);
    let suite = suite_with(SuiteFn::sync(move |this| {
        *sink.borrow_mut() = Some(this.clone());
        Ok(())
    }));
    suite.run().await;
    assert_eq!(seen.borrow().clone(), Some(suite.context()));
    assert_eq!(suite.context(), suite);
}

#[tokio::test]
async fn func_is_called_on_a_configured_context() {
    let context = Suite::new(SuiteConfig::new().title("ctx"));
    let seen = Rc::new(RefCell::new(String::new()));
    let sink = Rc::clone(&seen);
    let suite = suite_with(SuiteFn::sync(move |this| {
        *sink.borrow_mut() = this.title();
        Ok(())
    }));
    suite.set_context(&context);
    suite.run().await;
    assert_eq!(*seen.borrow(), "ctx");
}

// --- events ---

#[tokio::test]
async fn emits_will_run_then_did_run_around_the_func() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let in_func = Rc::clone(&log);
    let suite = suite_with(SuiteFn::sync(move |_| {
        in_func.borrow_mut().push("func".to_string());
        Ok(())
    }));
    for event in [SuiteEvent::WillRun, SuiteEvent::DidRun] {
        let log = Rc::clone(&log);
        suite.on(event, move |_| log.borrow_mut().push(event.to_string()));
    }

    suite.run().await;
    assert_eq!(*log.borrow(), vec!["will-run", "func", "did-run"]);
}

#[tokio::test]
async fn events_fire_exactly_once_per_run_whatever_the_outcome() {
    for fail in [false, true] {
        for func in shapes(fail) {
            let suite = suite_with(func);
            let log = record_events(&suite);
            suite.run().await;
            assert_eq!(*log.borrow(), vec!["will-run", "did-run"]);
        }
    }
}

#[tokio::test]
async fn did_run_listeners_see_the_result() {
    let suite = suite_with(SuiteFn::sync(|_| Err(RunError::new("bad"))));
    let passed = Rc::new(Cell::new(None));
    let sink = Rc::clone(&passed);
    suite.on(SuiteEvent::DidRun, move |s| {
        sink.set(s.result().map(|r| r.passed));
    });
    suite.run().await;
    assert_eq!(passed.get(), Some(false));
}

// --- function shapes ---

#[tokio::test]
async fn callback_completion_can_be_deferred() {
    let calls = Rc::new(Cell::new(0));
    let counter = Rc::clone(&calls);
    let suite = suite_with(SuiteFn::callback(move |_, done| {
        counter.set(counter.get() + 1);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            done.ok();
        });
    }));
    assert_eq!(suite.func().map(|f| f.shape()), Some(FnShape::Callback));

    suite.run().await;
    assert_eq!(calls.get(), 1);
    assert_eq!(suite.result(), Some(SuiteResult::passed()));
}

#[tokio::test]
async fn callback_may_complete_from_another_thread() {
    let suite = suite_with(SuiteFn::callback(|_, done| {
        std::thread::spawn(move || done.fail("from a thread"));
    }));
    suite.run().await;
    assert_eq!(
        suite.result(),
        Some(SuiteResult::failed(RunError::new("from a thread")))
    );
}

#[tokio::test]
async fn future_is_awaited() {
    let calls = Rc::new(Cell::new(0));
    let counter = Rc::clone(&calls);
    let suite = suite_with(SuiteFn::future(move |_| {
        let counter = Rc::clone(&counter);
        async move {
            tokio::time::sleep(Duration::from_millis(1)).await;
            counter.set(counter.get() + 1);
            Ok(())
        }
    }));
    suite.run().await;
    assert_eq!(calls.get(), 1);
    assert!(suite.result().unwrap().passed);
}

#[tokio::test]
async fn all_shapes_converge_on_the_same_result() {
    for func in shapes(false) {
        let suite = suite_with(func);
        suite.run().await;
        assert_eq!(suite.result(), Some(SuiteResult::passed()));
    }
    for func in shapes(true) {
        let suite = suite_with(func);
        suite.run().await;
        assert_eq!(
            suite.result(),
            Some(SuiteResult::failed(RunError::new("nope")))
        );
    }
}

// --- failures stay local ---

#[tokio::test]
async fn panics_are_recorded_not_propagated() {
    let sync = suite_with(SuiteFn::sync(|_| panic!("sync boom")));
    let future = suite_with(SuiteFn::future(|_| async { explode("async boom") }));
    let eager = suite_with(SuiteFn::future(explode_before_awaiting));
    let callback = suite_with(SuiteFn::callback(|_, _done| panic!("callback boom")));

    for (suite, message) in [
        (sync, "sync boom"),
        (future, "async boom"),
        (eager, "eager boom"),
        (callback, "callback boom"),
    ] {
        let ran = suite.run().await;
        let result = ran.result().unwrap();
        assert!(!result.passed);
        assert_eq!(result.error, Some(RunError::Panicked(message.to_string())));
    }
}

#[tokio::test]
async fn dropped_completion_signal_fails_the_suite() {
    let suite = suite_with(SuiteFn::callback(|_, done| drop(done)));
    suite.run().await;
    assert_eq!(
        suite.result(),
        Some(SuiteResult::failed(RunError::Abandoned))
    );
}

#[tokio::test]
async fn failing_sibling_does_not_stop_iteration() {
    let root = Suite::new(SuiteConfig::new().title("root"));
    Suite::new(
        SuiteConfig::new()
            .title("fails")
            .parent(&root)
            .func(SuiteFn::sync(|_| Err(RunError::new("first")))),
    );
    Suite::new(
        SuiteConfig::new()
            .title("passes")
            .parent(&root)
            .func(SuiteFn::sync(|_| Ok(()))),
    );

    let mut outcomes = Vec::new();
    for child in root.children() {
        let ran = child.run().await;
        outcomes.push((ran.full_title(), ran.result().unwrap().passed));
    }
    assert_eq!(
        outcomes,
        vec![
            ("root fails".to_string(), false),
            ("root passes".to_string(), true)
        ]
    );
}

// --- suites without a function ---

#[tokio::test]
async fn suite_without_func_is_skipped_but_still_emits() {
    let root = Suite::root();
    let pending = Suite::new(SuiteConfig::new().title("todo").parent(&root));
    assert!(pending.pending());
    let log = record_events(&pending);

    pending.run().await;
    assert_eq!(*log.borrow(), vec!["will-run", "did-run"]);
    assert_eq!(pending.result(), Some(SuiteResult::skipped()));
    assert_eq!(pending.property("skipped"), Some(true.into()));
}

#[tokio::test]
async fn rerun_replaces_the_result() {
    let attempts = Rc::new(Cell::new(0));
    let counter = Rc::clone(&attempts);
    let suite = suite_with(SuiteFn::sync(move |_| {
        counter.set(counter.get() + 1);
        if counter.get() == 1 {
            Err(RunError::new("flaky"))
        } else {
            Ok(())
        }
    }));
    assert!(!suite.run().await.result().unwrap().passed);
    assert!(suite.run().await.result().unwrap().passed);
}
