// self
use crate::{
	_prelude::*,
	client::PaymentClient,
	http::GatewayHttpClient,
	payload::{Identity, PayParams},
	reply::PayResult,
	schema::Operation,
};

impl<C> PaymentClient<C>
where
	C: ?Sized + GatewayHttpClient,
{
	/// Deducts `params.amt` units from the user's balance.
	///
	/// One bill number is generated per call and reused by every retry, so a deduction that
	/// already landed comes back as [`ErrCode::BillExists`] instead of charging twice.
	///
	/// [`ErrCode::BillExists`]: crate::reply::ErrCode::BillExists
	pub async fn pay(&self, identity: &Identity, params: PayParams) -> Result<PayResult> {
		self.observe(Operation::Pay, "pay", async {
			params.validate()?;

			let bill_no = self.next_bill_no().await?;
			let fields = params.fields(&bill_no)?;
			let reply = self.dispatcher().dispatch(Operation::Pay, identity, &fields).await?;
			let mut result: PayResult = reply.into_typed().map_err(|source| {
				Error::UnexpectedReply { operation: Operation::Pay.as_str(), source }
			})?;

			if result.bill_no.is_empty() {
				result.bill_no = bill_no;
			}

			Ok(result)
		})
		.await
	}
}
