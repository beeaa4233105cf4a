// self
use crate::{
	_prelude::*,
	client::PaymentClient,
	http::GatewayHttpClient,
	payload::{Identity, PresentParams},
	reply::PresentResult,
	schema::Operation,
};

impl<C> PaymentClient<C>
where
	C: ?Sized + GatewayHttpClient,
{
	/// Grants `params.present_counts` units to the user.
	///
	/// Shares the bill-number discipline of [`PaymentClient::pay`].
	pub async fn present(
		&self,
		identity: &Identity,
		params: PresentParams,
	) -> Result<PresentResult> {
		self.observe(Operation::Present, "present", async {
			params.validate()?;

			let bill_no = self.next_bill_no().await?;
			let fields = params.fields(&bill_no)?;
			let reply = self.dispatcher().dispatch(Operation::Present, identity, &fields).await?;
			let mut result: PresentResult = reply.into_typed().map_err(|source| {
				Error::UnexpectedReply { operation: Operation::Present.as_str(), source }
			})?;

			if result.bill_no.is_empty() {
				result.bill_no = bill_no;
			}

			Ok(result)
		})
		.await
	}
}
