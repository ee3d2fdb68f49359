use std::collections::VecDeque;
use std::sync::Arc;

use futures_util::future::join_all;
use serde_json::Value;
use tokio::sync::{oneshot, Mutex};
use tracing::{debug, info, instrument, warn};

use crate::config::{HOME_ROUTE, LOGIN_ROUTE};
use crate::entities::{
    extract_field, GraphqlError, GraphqlRequest, LoginCredentials, OutboundRequest, TokenPair,
};
use crate::error::Error;
use crate::operations;
use crate::ports::{AuthErrorPredicate, GraphqlTransport, Navigator, TokenStore};

/// An operation parked until the in-flight refresh settles
struct PendingOperation {
    request: GraphqlRequest,
    responder: oneshot::Sender<Result<Value, Error>>,
}

/// In-flight flag plus the operations queued behind it.
///
/// Both live under one lock so the check-then-set in [`AuthenticatedPipeline::send`]
/// cannot interleave with another operation's auth failure.
#[derive(Default)]
struct RefreshState {
    in_flight: bool,
    pending: VecDeque<PendingOperation>,
}

/// Sends GraphQL operations with the stored bearer token and recovers from
/// expired sessions.
///
/// On an auth failure the pipeline refreshes the token pair once, replays
/// every operation that failed in the meantime in arrival order, and falls
/// back to a login redirect when the refresh is impossible. Clones share the
/// same refresh state.
pub struct AuthenticatedPipeline<T: ?Sized, S: ?Sized, N: ?Sized> {
    transport: Arc<T>,
    token_store: Arc<S>,
    navigator: Arc<N>,
    auth_errors: Arc<dyn AuthErrorPredicate>,
    login_route: Arc<str>,
    home_route: Arc<str>,
    refresh: Arc<Mutex<RefreshState>>,
}

impl<T: ?Sized, S: ?Sized, N: ?Sized> Clone for AuthenticatedPipeline<T, S, N> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            token_store: Arc::clone(&self.token_store),
            navigator: Arc::clone(&self.navigator),
            auth_errors: Arc::clone(&self.auth_errors),
            login_route: Arc::clone(&self.login_route),
            home_route: Arc::clone(&self.home_route),
            refresh: Arc::clone(&self.refresh),
        }
    }
}

impl<T, S, N> AuthenticatedPipeline<T, S, N>
where
    T: GraphqlTransport + ?Sized + 'static,
    S: TokenStore + ?Sized + 'static,
    N: Navigator + ?Sized + 'static,
{
    pub fn new(
        transport: Arc<T>,
        token_store: Arc<S>,
        navigator: Arc<N>,
        auth_errors: Arc<dyn AuthErrorPredicate>,
    ) -> Self {
        Self {
            transport,
            token_store,
            navigator,
            auth_errors,
            login_route: Arc::from(LOGIN_ROUTE),
            home_route: Arc::from(HOME_ROUTE),
            refresh: Arc::new(Mutex::new(RefreshState::default())),
        }
    }

    /// Override the redirect targets (defaults: `/login` and `/`)
    pub fn with_routes(mut self, login_route: &str, home_route: &str) -> Self {
        self.login_route = Arc::from(login_route);
        self.home_route = Arc::from(home_route);
        self
    }

    pub fn token_store(&self) -> &Arc<S> {
        &self.token_store
    }

    pub fn navigator(&self) -> &Arc<N> {
        &self.navigator
    }

    pub fn login_route(&self) -> &str {
        &self.login_route
    }

    /// Whether a refresh call is currently outstanding
    pub async fn is_refreshing(&self) -> bool {
        self.refresh.lock().await.in_flight
    }

    /// Execute an operation.
    ///
    /// Transport errors and non-auth GraphQL errors are returned unchanged.
    /// Auth errors are absorbed when the refresh succeeds: the caller gets the
    /// result of the replayed operation instead. When the refresh fails the
    /// caller gets its original auth error back.
    #[instrument(skip(self, request), fields(operation = %request.display_name()))]
    pub async fn send(&self, request: GraphqlRequest) -> Result<Value, Error> {
        let access_token = self.token_store.access_token().await?;
        let outbound = OutboundRequest::new(request, access_token.as_deref());

        let errors = match self.transport.execute(&outbound).await?.into_result() {
            Err(Error::GraphQl(errors)) => errors,
            other => return other,
        };

        if !errors.iter().any(|e| self.auth_errors.is_auth_error(e)) {
            return Err(Error::GraphQl(errors));
        }

        let sent_with_token = access_token.is_some();
        self.park(outbound.request, errors, sent_with_token).await
    }

    /// Queue the operation behind a refresh, starting one if none is running.
    ///
    /// An operation that carried a token the store no longer holds belongs to
    /// a session that has already been closed, and the redirect for it has
    /// already happened. Its error goes straight back to the caller.
    async fn park(
        &self,
        request: GraphqlRequest,
        errors: Vec<GraphqlError>,
        sent_with_token: bool,
    ) -> Result<Value, Error> {
        let (responder, settled) = oneshot::channel();
        let operation = PendingOperation { request, responder };

        {
            let mut state = self.refresh.lock().await;
            if !state.in_flight
                && sent_with_token
                && matches!(self.token_store.access_token().await, Ok(None))
            {
                debug!("session already closed, not refreshing");
                return Err(Error::GraphQl(errors));
            }

            if state.in_flight {
                state.pending.push_back(operation);
                debug!(queued = state.pending.len(), "refresh in flight, operation queued");
            } else {
                state.in_flight = true;
                debug!("session expired, starting token refresh");
                // Detached so the cycle settles even if this caller goes away.
                let pipeline = self.clone();
                tokio::spawn(async move { pipeline.refresh_and_replay(operation).await });
            }
        }

        match settled.await {
            Ok(result) => result,
            // Abandoned: the refresh failed and the queue was discarded.
            Err(_) => Err(Error::GraphQl(errors)),
        }
    }

    async fn refresh_and_replay(&self, trigger: PendingOperation) {
        match self.refresh_tokens().await {
            Ok(tokens) => {
                let queued = self.finish_cycle().await;
                info!(replayed = queued.len() + 1, "token refreshed, replaying operations");

                // join_all polls in order, so replays are issued in queue order
                // with the triggering operation last.
                let replays = queued
                    .into_iter()
                    .chain(std::iter::once(trigger))
                    .map(|operation| self.replay(operation, &tokens.access_token));
                join_all(replays).await;
            }
            Err(e) => {
                warn!(error = %e, "token refresh failed, signing out");

                if let Err(e) = self.token_store.remove_tokens().await {
                    warn!(error = %e, "failed to clear stored tokens");
                }

                let discarded = self.finish_cycle().await;
                self.navigator.navigate(&self.login_route);

                // Dropping the responders hands every caller its own auth error.
                debug!(discarded = discarded.len() + 1, "dropping queued operations");
                drop(discarded);
                drop(trigger);
            }
        }
    }

    /// Fetch a new token pair with the stored refresh token and persist it.
    async fn refresh_tokens(&self) -> Result<TokenPair, Error> {
        let refresh_token = self
            .token_store
            .refresh_token()
            .await?
            .ok_or_else(|| Error::Authentication("no refresh token stored".to_string()))?;

        let outbound = OutboundRequest::new(operations::refresh_token(&refresh_token), None);
        let data = self.transport.execute(&outbound).await?.into_result()?;
        let tokens: TokenPair = extract_field(data, "refreshToken")?;

        self.token_store.set_tokens(&tokens).await?;
        Ok(tokens)
    }

    /// Take the queue and clear the in-flight flag in one step.
    async fn finish_cycle(&self) -> VecDeque<PendingOperation> {
        let mut state = self.refresh.lock().await;
        state.in_flight = false;
        std::mem::take(&mut state.pending)
    }

    /// Re-issue once with the new token; the outcome is final for the caller.
    async fn replay(&self, operation: PendingOperation, access_token: &str) {
        let outbound = OutboundRequest::new(operation.request, Some(access_token));
        let result = match self.transport.execute(&outbound).await {
            Ok(response) => response.into_result(),
            Err(e) => Err(e),
        };

        if operation.responder.send(result).is_err() {
            debug!(
                operation = %outbound.request.display_name(),
                "replayed operation has no listener"
            );
        }
    }

    /// Exchange credentials for a token pair and store it.
    ///
    /// The store is only written on success.
    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<(), Error> {
        let data = self.send(operations::login(credentials)).await?;
        let tokens: TokenPair = extract_field(data, "login")
            .map_err(|e| Error::Authentication(format!("login returned no tokens: {}", e)))?;

        self.token_store.set_tokens(&tokens).await?;
        info!("logged in");
        Ok(())
    }

    /// Sign out locally no matter what the server says, then go home.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        match self.token_store.access_token().await {
            Ok(Some(_)) => {
                if let Err(e) = self.send(operations::logout()).await {
                    debug!(error = %e, "logout mutation failed, ignoring");
                }
            }
            Ok(None) => debug!("no stored session, skipping logout mutation"),
            Err(e) => warn!(error = %e, "failed to read stored token"),
        }

        if let Err(e) = self.token_store.remove_tokens().await {
            warn!(error = %e, "failed to clear stored tokens");
        }

        self.navigator.navigate(&self.home_route);
    }
}
