//! `ResourceFetcher` - single-subscription fetcher with stale-result discard.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::descriptor::ResourceDescriptor;
use super::error::FetchError;
use super::state::FetchState;
use super::transport::ResourceTransport;

/// Fetches the resource a consumer is currently pointed at.
///
/// Every published state is tagged with a generation number. Changing the
/// descriptor or detaching bumps the generation and aborts the outstanding
/// request task, so a slow response for an old descriptor can never
/// overwrite the state of a newer one.
///
/// `P` is the payload type the JSON body is decoded into.
#[derive(Debug)]
pub struct ResourceFetcher<T, P = Value> {
    /// Transport executing the requests.
    transport: Arc<T>,
    /// Published state; also the lock that orders generation checks.
    state: Arc<watch::Sender<FetchState<P>>>,
    /// Generation of the most recently published state.
    generation: Arc<AtomicU64>,
    /// Request currently owned by this subscription.
    in_flight: Option<InFlight>,
}

/// An issued request and the task executing it.
#[derive(Debug)]
struct InFlight {
    descriptor: ResourceDescriptor,
    handle: JoinHandle<()>,
}

impl<T, P> ResourceFetcher<T, P>
where
    T: ResourceTransport + Sync + 'static,
    P: DeserializeOwned + Send + Sync + 'static,
{
    /// Creates an idle fetcher over `transport`.
    #[must_use]
    pub fn new(transport: Arc<T>) -> Self {
        let (state, _) = watch::channel(FetchState::Idle);
        Self {
            transport,
            state: Arc::new(state),
            generation: Arc::new(AtomicU64::new(0)),
            in_flight: None,
        }
    }

    /// Points the subscription at `descriptor` and returns a state receiver.
    ///
    /// - `None` or an invalid descriptor publishes
    ///   [`FetchError::InvalidDescriptor`] before returning, without a request.
    /// - An unconfigured transport publishes [`FetchError::MissingConfiguration`]
    ///   before returning, without a request.
    /// - The same descriptor as an outstanding request reuses that request.
    /// - Otherwise any outstanding request is aborted, `Loading` is published
    ///   and a new request is spawned.
    ///
    /// # Panics
    ///
    /// Panics if a request has to be spawned outside a Tokio runtime.
    pub fn subscribe(
        &mut self,
        descriptor: Option<ResourceDescriptor>,
    ) -> watch::Receiver<FetchState<P>> {
        if let (Some(next), Some(current)) = (&descriptor, &self.in_flight)
            && *next == current.descriptor
            && !current.handle.is_finished()
        {
            tracing::debug!(descriptor = %next, "Request already in flight");
            return self.state.subscribe();
        }

        self.cancel_in_flight();

        let Some(descriptor) = descriptor else {
            self.publish(FetchState::Failure(FetchError::InvalidDescriptor(
                String::from("no resource selected"),
            )));
            return self.state.subscribe();
        };

        if let Err(reason) = descriptor.validate() {
            tracing::debug!(descriptor = %descriptor, %reason, "Rejecting descriptor");
            self.publish(FetchState::Failure(FetchError::InvalidDescriptor(reason)));
            return self.state.subscribe();
        }

        if let Err(e) = self.transport.ensure_configured() {
            tracing::warn!(descriptor = %descriptor, error = %e, "Transport not configured");
            self.publish(FetchState::Failure(e));
            return self.state.subscribe();
        }

        let issued = self.publish(FetchState::Loading);
        tracing::debug!(descriptor = %descriptor, generation = issued, "Issuing request");

        let handle = tokio::spawn(Self::run(
            Arc::clone(&self.transport),
            Arc::clone(&self.state),
            Arc::clone(&self.generation),
            descriptor.clone(),
            issued,
        ));
        self.in_flight = Some(InFlight { descriptor, handle });

        self.state.subscribe()
    }

    /// Executes one request and applies its outcome if still current.
    async fn run(
        transport: Arc<T>,
        state: Arc<watch::Sender<FetchState<P>>>,
        generation: Arc<AtomicU64>,
        descriptor: ResourceDescriptor,
        issued: u64,
    ) {
        let outcome = transport.fetch(&descriptor).await.and_then(|body| {
            serde_json::from_value::<P>(body).map_err(|e| FetchError::Malformed(e.to_string()))
        });

        let applied = state.send_if_modified(|current| {
            if generation.load(Ordering::Acquire) != issued {
                return false;
            }
            *current = FetchState::from(outcome);
            true
        });

        if applied {
            tracing::debug!(descriptor = %descriptor, generation = issued, "Request settled");
        } else {
            tracing::debug!(
                descriptor = %descriptor,
                generation = issued,
                "Discarding stale response"
            );
        }
    }

    /// Cancels any outstanding request and returns to `Idle`.
    pub fn detach(&mut self) {
        self.cancel_in_flight();
        self.publish(FetchState::Idle);
    }

    /// Returns a receiver for the current subscription.
    #[must_use]
    pub fn receiver(&self) -> watch::Receiver<FetchState<P>> {
        self.state.subscribe()
    }

    /// Returns the descriptor of the most recently issued request.
    #[must_use]
    pub fn descriptor(&self) -> Option<&ResourceDescriptor> {
        self.in_flight.as_ref().map(|f| &f.descriptor)
    }

    /// Replaces the published state and returns its generation.
    fn publish(&self, next: FetchState<P>) -> u64 {
        let mut issued = 0;
        self.state.send_modify(|current| {
            issued = self
                .generation
                .fetch_add(1, Ordering::AcqRel)
                .wrapping_add(1);
            *current = next;
        });
        issued
    }

    fn cancel_in_flight(&mut self) {
        if let Some(in_flight) = self.in_flight.take()
            && !in_flight.handle.is_finished()
        {
            tracing::debug!(descriptor = %in_flight.descriptor, "Cancelling superseded request");
            in_flight.handle.abort();
        }
    }
}

impl<T, P> ResourceFetcher<T, P>
where
    T: ResourceTransport + Sync + 'static,
    P: DeserializeOwned + Clone + Send + Sync + 'static,
{
    /// Returns a copy of the current state.
    #[must_use]
    pub fn state(&self) -> FetchState<P> {
        self.state.borrow().clone()
    }

    /// Waits until the current subscription settles.
    ///
    /// Returns immediately with `Idle` if nothing is subscribed.
    pub async fn settled(&self) -> FetchState<P> {
        let mut rx = self.state.subscribe();
        let waited = rx
            .wait_for(|state| state.is_settled() || matches!(state, FetchState::Idle))
            .await
            .map(|state| state.clone());
        waited.unwrap_or_else(|_| self.state())
    }
}

impl<T, P> Drop for ResourceFetcher<T, P> {
    fn drop(&mut self) {
        if let Some(in_flight) = self.in_flight.take() {
            self.generation.fetch_add(1, Ordering::AcqRel);
            in_flight.handle.abort();
        }
    }
}
