// self
use crate::{
	_prelude::*,
	client::PaymentClient,
	http::GatewayHttpClient,
	payload::{Fields, Identity},
	reply::BalanceResult,
	schema::Operation,
};

impl<C> PaymentClient<C>
where
	C: ?Sized + GatewayHttpClient,
{
	/// Reads the user's current balance.
	pub async fn get_balance(&self, identity: &Identity) -> Result<BalanceResult> {
		self.observe(Operation::GetBalance, "get_balance", async {
			let reply =
				self.dispatcher().dispatch(Operation::GetBalance, identity, &Fields::new()).await?;

			reply.into_typed().map_err(|source| Error::UnexpectedReply {
				operation: Operation::GetBalance.as_str(),
				source,
			})
		})
		.await
	}
}
