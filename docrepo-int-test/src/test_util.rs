use docrepo::context::StoreContext;
use docrepo::errors::{ErrorKind, RepoError, RepoResult};
use docrepo::repository::{Entity, Repository};
use docrepo_identity::IdentityContext;
use std::backtrace::Backtrace;
use std::future::Future;
use std::thread;
use std::time::{Duration, Instant};

/// Runs a test with retry logic and error handling.
/// `after` runs whether or not the test body succeeded.
pub fn run_test<T, B, A>(before: B, test: T, after: A)
where
    T: Fn(TestContext) -> RepoResult<()> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
    B: Fn() -> RepoResult<TestContext> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
    A: Fn(TestContext) -> RepoResult<()> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
{
    const MAX_RETRIES: u32 = 3;
    let mut last_error: Option<String> = None;
    let mut last_backtrace: Option<String> = None;

    for attempt in 1..=MAX_RETRIES {
        let start_time = Instant::now();

        let result = std::panic::catch_unwind(|| {
            let backtrace = Backtrace::capture();
            match before() {
                Ok(ctx) => match test(ctx.clone()) {
                    Ok(_) => match after(ctx.clone()) {
                        Ok(_) => Ok(()),
                        Err(e) => Err((format!("After run failed: {:?}", e), backtrace.to_string())),
                    },
                    Err(e) => {
                        let _ = after(ctx.clone());
                        Err((format!("Test failed: {:?}", e), backtrace.to_string()))
                    }
                },
                Err(e) => Err((format!("Before run failed: {:?}", e), backtrace.to_string())),
            }
        });

        let elapsed = start_time.elapsed();

        match result {
            Ok(Ok(_)) => return,
            Ok(Err((e, bt))) => {
                last_error = Some(e.clone());
                last_backtrace = Some(bt);
                if attempt < MAX_RETRIES {
                    eprintln!(
                        "\n========== Test Attempt {}/{} Failed (took {:?}) ==========",
                        attempt, MAX_RETRIES, elapsed
                    );
                    eprintln!("Error: {}", e);
                    eprintln!("Retrying in {}ms...\n", 100 * attempt);
                    thread::sleep(Duration::from_millis(100 * attempt as u64));
                }
            }
            Err(panic_err) => {
                let err_msg = if let Some(s) = panic_err.downcast_ref::<&str>() {
                    s.to_string()
                } else if let Some(s) = panic_err.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "Unknown panic".to_string()
                };

                let message = format!("Panic: {}", err_msg);
                last_backtrace = Some(Backtrace::capture().to_string());

                if attempt < MAX_RETRIES {
                    eprintln!(
                        "\n========== Test Attempt {}/{} Panicked (took {:?}) ==========",
                        attempt, MAX_RETRIES, elapsed
                    );
                    eprintln!("{}", message);
                    eprintln!("Retrying in {}ms...\n", 100 * attempt);
                    thread::sleep(Duration::from_millis(100 * attempt as u64));
                }
                last_error = Some(message);
            }
        }
    }

    eprintln!("\n==================== TEST FAILED ====================");
    eprintln!("Failed after {} attempts", MAX_RETRIES);
    eprintln!("Last error: {}", last_error.as_deref().unwrap_or("Unknown"));
    if let Some(bt) = &last_backtrace {
        if !bt.is_empty() && !bt.contains("disabled") {
            eprintln!("\nBacktrace:\n{}", bt);
        }
    }
    eprintln!("=====================================================\n");

    panic!(
        "Test failed after {} attempts. Last error: {}",
        MAX_RETRIES,
        last_error.unwrap_or_default()
    );
}

/// A store context on a database of its own.
#[derive(Clone)]
pub struct TestContext {
    connection_string: String,
    context: StoreContext,
}

impl TestContext {
    pub fn new(connection_string: String, context: StoreContext) -> Self {
        Self {
            connection_string,
            context,
        }
    }

    pub fn connection_string(&self) -> &str {
        &self.connection_string
    }

    pub fn context(&self) -> StoreContext {
        self.context.clone()
    }

    pub fn repository<T: Entity>(&self) -> RepoResult<Repository<T>> {
        self.context.repository()
    }

    pub fn identity(&self) -> RepoResult<IdentityContext> {
        IdentityContext::new(&self.context)
    }
}

pub fn random_database() -> String {
    format!("test_{}", uuid::Uuid::new_v4().simple())
}

pub fn create_test_context() -> RepoResult<TestContext> {
    let connection_string = format!("memory://local/{}", random_database());
    let context = StoreContext::open(&connection_string)?;
    Ok(TestContext::new(connection_string, context))
}

/// Drops every collection of the test database and closes it.
pub fn cleanup(ctx: TestContext) -> RepoResult<()> {
    let store = ctx.context().store().clone();
    if store.is_closed()? {
        return Ok(());
    }

    for name in store.collection_names()? {
        if let Err(e) = store.drop_collection(&name) {
            log::warn!("Failed to drop collection {}: {:?}", name, e);
        }
    }
    ctx.context().close()
}

/// Drives `future` to completion on a fresh single-threaded runtime.
pub fn block_on<F: Future>(future: F) -> RepoResult<F::Output> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| RepoError::new(&format!("Failed to start runtime: {}", e), ErrorKind::InternalError))?;
    Ok(runtime.block_on(future))
}
