use error_stack::ResultExt;
use google_sheets4::oauth2::{self, authenticator::Authenticator};
use google_sheets4::{hyper, hyper_rustls};

use crate::domain::transfer::TransferError;
use crate::infrastructure::config::sheets_config::SpreadsheetConfig;

pub async fn auth(
    config: &SpreadsheetConfig,
    client: hyper::Client<hyper_rustls::HttpsConnector<hyper::client::HttpConnector>>,
) -> error_stack::Result<
    Authenticator<hyper_rustls::HttpsConnector<hyper::client::HttpConnector>>,
    TransferError,
> {
    let secret: oauth2::ServiceAccountKey = oauth2::read_service_account_key(&config.priv_key)
        .await
        .change_context(TransferError::Authentication)
        .attach_printable_lazy(|| format!("service account key not readable: {}", config.priv_key))?;

    oauth2::ServiceAccountAuthenticator::with_client(secret, client.clone())
        .build()
        .await
        .change_context(TransferError::Authentication)
}
