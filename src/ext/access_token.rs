//! Access-token contract; token acquisition and refresh stay with the caller.

// self
use crate::{_prelude::*, error::BoxError, secret::Secret};

/// Boxed future returned by [`AccessTokenProvider::access_token`].
pub type AccessTokenFuture<'a> =
	Pin<Box<dyn Future<Output = Result<Secret, BoxError>> + 'a + Send>>;

/// Supplies the application access token sent as the `access_token` query parameter.
///
/// The client asks for a token on every attempt, so implementations decide whether to cache.
/// Any async closure returning `Result<String, E>` implements the trait.
pub trait AccessTokenProvider
where
	Self: Send + Sync,
{
	/// Resolves the current access token.
	fn access_token(&self) -> AccessTokenFuture<'_>;
}
impl<F, Fut, E> AccessTokenProvider for F
where
	F: Send + Sync + Fn() -> Fut,
	Fut: 'static + Send + Future<Output = Result<String, E>>,
	E: Into<BoxError>,
{
	fn access_token(&self) -> AccessTokenFuture<'_> {
		let fut = self();

		Box::pin(async move { fut.await.map(Secret::new).map_err(Into::into) })
	}
}

/// Provider returning the same token forever; useful for scripts and tests.
#[derive(Clone, Debug)]
pub struct StaticAccessToken(Secret);
impl StaticAccessToken {
	/// Wraps a fixed token.
	pub fn new(token: impl Into<Secret>) -> Self {
		Self(token.into())
	}
}
impl AccessTokenProvider for StaticAccessToken {
	fn access_token(&self) -> AccessTokenFuture<'_> {
		let token = self.0.clone();

		Box::pin(async move { Ok(token) })
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[tokio::test]
	async fn closures_act_as_providers() {
		let provider = || async { Ok::<_, std::io::Error>("TOKEN".to_owned()) };
		let token = provider.access_token().await.expect("Closure provider should succeed.");

		assert_eq!(token.expose(), "TOKEN");
	}

	#[tokio::test]
	async fn closure_errors_are_boxed() {
		let provider =
			|| async { Err::<String, _>(std::io::Error::other("token service down")) };
		let err = provider.access_token().await.expect_err("Closure provider should fail.");

		assert_eq!(err.to_string(), "token service down");
	}

	#[tokio::test]
	async fn static_provider_repeats_its_token() {
		let provider = StaticAccessToken::new("FIXED");

		for _ in 0..2 {
			let token = provider.access_token().await.expect("Static provider never fails.");

			assert_eq!(token.expose(), "FIXED");
		}
	}
}
