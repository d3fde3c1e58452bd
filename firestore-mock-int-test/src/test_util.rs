use firestore_mock::errors::FirestoreResult;
use firestore_mock::{Firestore, NotifyPolicy};
use std::backtrace::Backtrace;
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// Runs a test between a setup and a teardown step.
///
/// The teardown runs even when the test fails. The store is in memory and
/// deliveries are deterministic, so a failure is reported on the first
/// attempt without retrying.
pub fn run_test<T, B, A>(before: B, test: T, after: A)
where
    T: Fn(TestContext) -> FirestoreResult<()> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
    B: Fn() -> FirestoreResult<TestContext> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
    A: Fn(TestContext) -> FirestoreResult<()> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
{
    let start_time = Instant::now();
    let result = std::panic::catch_unwind(|| {
        let backtrace = Backtrace::capture();
        match before() {
            Ok(ctx) => match test(ctx.clone()) {
                Ok(_) => after(ctx).map_err(|e| (format!("After run failed: {:?}", e), backtrace.to_string())),
                Err(e) => {
                    let _ = after(ctx);
                    Err((format!("Test failed: {:?}", e), backtrace.to_string()))
                }
            },
            Err(e) => Err((format!("Before run failed: {:?}", e), backtrace.to_string())),
        }
    });

    let (error, backtrace) = match result {
        Ok(Ok(_)) => return,
        Ok(Err((error, backtrace))) => (error, backtrace),
        Err(panic_err) => {
            let message = if let Some(s) = panic_err.downcast_ref::<&str>() {
                s.to_string()
            } else if let Some(s) = panic_err.downcast_ref::<String>() {
                s.clone()
            } else {
                "Unknown panic".to_string()
            };
            (format!("Panic: {}", message), Backtrace::capture().to_string())
        }
    };

    eprintln!("\n==================== TEST FAILED ====================");
    eprintln!("Failed after {:?}", start_time.elapsed());
    eprintln!("Error: {}", error);
    if !backtrace.is_empty() && !backtrace.contains("disabled") {
        eprintln!("\nBacktrace:\n{}", backtrace);
    }
    eprintln!("=====================================================\n");
    panic!("Test failed. Error: {}", error);
}

#[derive(Clone)]
pub struct TestContext {
    db: Firestore,
}

impl TestContext {
    pub fn new(db: Firestore) -> Self {
        Self { db }
    }

    pub fn db(&self) -> Firestore {
        self.db.clone()
    }
}

/// A fresh store with the default (over-notifying) listener policy.
pub fn create_test_context() -> FirestoreResult<TestContext> {
    let db = Firestore::builder().app_name("int-test").open()?;
    Ok(TestContext::new(db))
}

/// A fresh store whose query listeners skip unchanged results.
pub fn create_strict_test_context() -> FirestoreResult<TestContext> {
    let db = Firestore::builder()
        .app_name("int-test-strict")
        .notify_policy(NotifyPolicy::OnResultChange)
        .open()?;
    Ok(TestContext::new(db))
}

pub fn cleanup(ctx: TestContext) -> FirestoreResult<()> {
    let db = ctx.db();
    if db.is_terminated() {
        return Ok(());
    }
    db.terminate().wait()
}

/// Collects every value delivered to a listener callback.
pub struct Recorder<S> {
    items: Arc<Mutex<Vec<S>>>,
}

impl<S> Clone for Recorder<S> {
    fn clone(&self) -> Self {
        Recorder {
            items: self.items.clone(),
        }
    }
}

impl<S> Default for Recorder<S> {
    fn default() -> Self {
        Recorder {
            items: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl<S: Clone + Send + 'static> Recorder<S> {
    pub fn new() -> Self {
        Recorder::default()
    }

    /// A callback appending each delivered value.
    pub fn callback(&self) -> impl Fn(S) + Send + Sync + 'static {
        let items = self.items.clone();
        move |item: S| items.lock().unwrap().push(item)
    }

    pub fn len(&self) -> usize {
        self.items.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn all(&self) -> Vec<S> {
        self.items.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<S> {
        self.items.lock().unwrap().last().cloned()
    }
}
