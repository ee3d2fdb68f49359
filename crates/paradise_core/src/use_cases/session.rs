use tokio::sync::RwLock;
use tracing::{info, instrument, warn};

use crate::entities::{extract_field, LoginCredentials, Session, User};
use crate::error::Error;
use crate::operations;
use crate::ports::{GraphqlTransport, Navigator, TokenStore};
use crate::use_cases::GraphqlClient;

/// Tracks who is signed in on top of a [`GraphqlClient`].
pub struct SessionUseCase<T: ?Sized, S: ?Sized, N: ?Sized> {
    client: GraphqlClient<T, S, N>,
    session: RwLock<Session>,
}

impl<T, S, N> SessionUseCase<T, S, N>
where
    T: GraphqlTransport + ?Sized + 'static,
    S: TokenStore + ?Sized + 'static,
    N: Navigator + ?Sized + 'static,
{
    pub fn new(client: GraphqlClient<T, S, N>) -> Self {
        Self {
            client,
            session: RwLock::new(Session::anonymous()),
        }
    }

    pub fn client(&self) -> &GraphqlClient<T, S, N> {
        &self.client
    }

    pub async fn current(&self) -> Session {
        self.session.read().await.clone()
    }

    /// Rebuild the session from the stored token.
    ///
    /// No token means anonymous without a network call. A failing `me` query
    /// clears the stored tokens.
    #[instrument(skip(self))]
    pub async fn restore(&self) -> Result<Session, Error> {
        if self.client.pipeline().token_store().access_token().await?.is_none() {
            return Ok(self.replace(Session::anonymous()).await);
        }

        let user = match self.fetch_user().await {
            Ok(user) => user,
            Err(e) => {
                warn!(error = %e, "could not load current user, clearing session");
                self.client.pipeline().token_store().remove_tokens().await?;
                return Ok(self.replace(Session::anonymous()).await);
            }
        };

        info!(user = %user.uuid, "session restored");
        Ok(self.replace(Session::authenticated(user)).await)
    }

    /// Log in and load the user behind the new tokens
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<Session, Error> {
        self.client.pipeline().login(credentials).await?;
        let session = self.restore().await?;

        if !session.is_authenticated() {
            return Err(Error::Authentication(
                "logged in but the user could not be loaded".to_string(),
            ));
        }
        Ok(session)
    }

    pub async fn logout(&self) {
        self.client.pipeline().logout().await;
        self.replace(Session::anonymous()).await;
    }

    async fn fetch_user(&self) -> Result<User, Error> {
        let data = self.client.query(operations::me()).await?;
        extract_field(data, "me")
    }

    async fn replace(&self, session: Session) -> Session {
        *self.session.write().await = session.clone();
        session
    }
}
