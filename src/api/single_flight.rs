use crate::api::FetchError;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tokio::task::AbortHandle;
use tracing::debug;

/// At most one in-flight request per resource key. Starting a request for a
/// key aborts the one already running for it; that caller gets
/// `FetchError::Superseded`.
#[derive(Default)]
pub struct SingleFlight {
    in_flight: Mutex<HashMap<String, (u64, AbortHandle)>>,
    next_ticket: AtomicU64,
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn run<T, F>(&self, key: &str, request: F) -> Result<T, FetchError>
    where
        F: Future<Output = Result<T, FetchError>> + Send + 'static,
        T: Send + 'static,
    {
        let ticket = self.next_ticket.fetch_add(1, Ordering::Relaxed);
        let handle = tokio::spawn(request);

        let previous = self
            .entries()
            .insert(key.to_string(), (ticket, handle.abort_handle()));
        if let Some((_, earlier)) = previous {
            debug!(target: "api", "Superseding in-flight request for '{}'", key);
            earlier.abort();
        }

        let guard = FlightGuard {
            flight: self,
            key,
            ticket,
        };
        let outcome = handle.await;
        drop(guard);

        match outcome {
            Ok(result) => result,
            Err(e) if e.is_cancelled() => Err(FetchError::Superseded),
            Err(e) => Err(FetchError::Task(e.to_string())),
        }
    }

    pub fn is_in_flight(&self, key: &str) -> bool {
        self.entries().contains_key(key)
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, (u64, AbortHandle)>> {
        // The map stays consistent even if a holder panicked
        self.in_flight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Clears the key's entry when its `run` finishes or is dropped early. A
/// dropped caller also aborts its request.
struct FlightGuard<'a> {
    flight: &'a SingleFlight,
    key: &'a str,
    ticket: u64,
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        let mut entries = self.flight.entries();
        if entries.get(self.key).map_or(false, |(t, _)| *t == self.ticket) {
            if let Some((_, handle)) = entries.remove(self.key) {
                handle.abort();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_newer_request_supersedes_older() {
        let flight = Arc::new(SingleFlight::new());

        let slow = {
            let flight = flight.clone();
            tokio::spawn(async move {
                flight
                    .run("assets", async {
                        tokio::time::sleep(Duration::from_secs(5)).await;
                        Ok::<_, FetchError>("old")
                    })
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(flight.is_in_flight("assets"));

        let fresh = flight.run("assets", async { Ok("new") }).await.unwrap();
        assert_eq!(fresh, "new");

        let stale = slow.await.unwrap();
        assert!(matches!(stale, Err(FetchError::Superseded)));
        assert!(!flight.is_in_flight("assets"));
    }

    #[tokio::test]
    async fn test_different_keys_do_not_interfere() {
        let flight = SingleFlight::new();
        let (a, b) = tokio::join!(
            flight.run("tickets", async {
                tokio::time::sleep(Duration::from_millis(20)).await;
                Ok::<_, FetchError>(1)
            }),
            flight.run("invoices", async { Ok::<_, FetchError>(2) }),
        );
        assert_eq!(a.unwrap(), 1);
        assert_eq!(b.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_errors_pass_through() {
        let flight = SingleFlight::new();
        let err = flight
            .run("x", async {
                Err::<(), _>(FetchError::Http {
                    status: 500,
                    body: "boom".to_string(),
                })
            })
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Http { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_dropped_caller_clears_entry() {
        let flight = SingleFlight::new();
        let timed_out = tokio::time::timeout(
            Duration::from_millis(20),
            flight.run("sites", async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok::<_, FetchError>(())
            }),
        )
        .await;

        assert!(timed_out.is_err());
        assert!(!flight.is_in_flight("sites"));
    }
}
