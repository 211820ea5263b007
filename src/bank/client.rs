use anyhow::{Context, Result};
use log::info;
use reqwest::Client;
use rust_decimal::Decimal;

use super::types::{Account, AccountValidation, AccountsPayload, Balance, TransactionHistory};
use crate::auth::{self, AuthToken, Claim, Credentials};
use crate::config::TransferConfig;
use crate::error::TransferError;
use crate::http::{Execution, HttpClient, RetryPolicy};
use crate::runtime::Runtime;
use crate::transfer::{AccountId, TransferReceipt, TransferRequest, TransferResult, report};

/// Client for the banking API: one configuration, one connection pool.
pub struct BankClient<R: Runtime> {
    config: TransferConfig,
    http: HttpClient<R>,
}

impl<R: Runtime> BankClient<R> {
    /// Builds a client with its own connection pool.
    pub fn new(config: TransferConfig, runtime: R) -> Result<Self> {
        let client = config
            .build_client()
            .context("Failed to build HTTP client")?;
        Ok(Self::with_client(config, client, runtime))
    }

    /// Builds a client on top of an existing pool, e.g. one shared between several clients.
    pub fn with_client(config: TransferConfig, client: Client, runtime: R) -> Self {
        let http = HttpClient::new(client, runtime, RetryPolicy::from_config(&config));
        Self { config, http }
    }

    pub fn config(&self) -> &TransferConfig {
        &self.config
    }

    pub fn runtime(&self) -> &R {
        self.http.runtime()
    }

    #[tracing::instrument(skip(self, credentials))]
    pub async fn authenticate(&self, credentials: &Credentials, claim: Claim) -> Result<AuthToken, TransferError> {
        auth::fetch_token(&self.http, &self.config, credentials, claim).await
    }

    /// Validates and sends a transfer. Never returns an error: every
    /// failure, including local validation, becomes a
    /// [`TransferResult::Failure`].
    #[tracing::instrument(skip(self, token))]
    pub async fn transfer(
        &self,
        from_account: &str,
        to_account: &str,
        amount: Decimal,
        token: Option<&AuthToken>,
    ) -> TransferResult {
        let request = match TransferRequest::new(from_account, to_account, amount) {
            Ok(request) => request,
            Err(error) => {
                return report(from_account, to_account, amount, Execution::rejected(error));
            }
        };

        info!(
            "Initiating transfer: {} -> {}, amount: {}",
            request.from_account(),
            request.to_account(),
            request.amount()
        );

        let url = self.config.endpoint("/transfer");
        let execution = self
            .http
            .execute::<TransferReceipt, _>("transfer", token.map(AuthToken::secret), |client| {
                client.post(&url).json(&request)
            })
            .await;

        report(from_account, to_account, amount, execution)
    }

    #[tracing::instrument(skip(self, token))]
    pub async fn list_accounts(&self, token: Option<&AuthToken>) -> Result<Vec<Account>, TransferError> {
        let url = self.config.endpoint("/accounts");
        let payload = self
            .http
            .execute::<AccountsPayload, _>("list accounts", token.map(AuthToken::secret), |client| {
                client.get(&url)
            })
            .await
            .into_result()?;
        Ok(payload.into_accounts())
    }

    #[tracing::instrument(skip(self, token))]
    pub async fn validate_account(
        &self,
        account: &str,
        token: Option<&AuthToken>,
    ) -> Result<AccountValidation, TransferError> {
        let account = parse_account(account)?;
        let url = self.config.endpoint(&format!("/accounts/validate/{}", account));
        self.http
            .execute("validate account", token.map(AuthToken::secret), |client| {
                client.get(&url)
            })
            .await
            .into_result()
    }

    #[tracing::instrument(skip(self, token))]
    pub async fn balance(&self, account: &str, token: Option<&AuthToken>) -> Result<Balance, TransferError> {
        let account = parse_account(account)?;
        let url = self.config.endpoint(&format!("/accounts/balance/{}", account));
        self.http
            .execute("account balance", token.map(AuthToken::secret), |client| {
                client.get(&url)
            })
            .await
            .into_result()
    }

    /// Most recent transactions, newest first as the server orders them.
    /// The endpoint requires a bearer token.
    #[tracing::instrument(skip(self, token))]
    pub async fn transaction_history(
        &self,
        limit: u32,
        token: &AuthToken,
    ) -> Result<TransactionHistory, TransferError> {
        let url = self.config.endpoint("/transactions/history");
        let limit = limit.to_string();
        self.http
            .execute("transaction history", Some(token.secret()), |client| {
                client.get(&url).query(&[("limit", limit.as_str())])
            })
            .await
            .into_result()
    }
}

fn parse_account(account: &str) -> Result<AccountId, TransferError> {
    account
        .parse::<AccountId>()
        .map_err(|e| TransferError::Validation(vec![e]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigOverrides;
    use crate::error::ErrorKind;
    use crate::runtime::MockRuntime;
    use mockito::Matcher;
    use serde_json::json;

    fn bank_client(url: &str, runtime: MockRuntime, max_retries: u32) -> BankClient<MockRuntime> {
        let config = TransferConfig::default()
            .apply(&ConfigOverrides {
                api_url: Some(url.to_string()),
                max_retries: Some(max_retries.to_string()),
                backoff_factor: Some("0.5".to_string()),
                ..Default::default()
            })
            .unwrap();
        BankClient::new(config, runtime).unwrap()
    }

    const RECEIPT: &str = r#"{
        "transactionId": "tx-1",
        "status": "SUCCESS",
        "message": "Transfer completed successfully",
        "fromAccount": "ACC1000",
        "toAccount": "ACC1001",
        "amount": 100.0
    }"#;

    #[tokio::test]
    async fn test_transfer_success() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("POST", "/transfer")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(json!({
                "fromAccount": "ACC1000",
                "toAccount": "ACC1001",
                "amount": 100.0
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(RECEIPT)
            .expect(1)
            .create_async()
            .await;

        let client = bank_client(&url, MockRuntime::new(), 3);
        let result = client
            .transfer("ACC1000", "ACC1001", Decimal::from(100), None)
            .await;

        mock.assert_async().await;
        let receipt = result.receipt().unwrap();
        assert_eq!(receipt.transaction_id, "tx-1");
        assert_eq!(receipt.amount, Decimal::from(100));
    }

    #[tokio::test]
    async fn test_transfer_echoes_request_fields() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let _m = server
            .mock("POST", "/transfer")
            .with_status(200)
            .with_body(
                r#"{"transactionId":"tx-9","status":"SUCCESS","fromAccount":"ACC1042","toAccount":"ACC1099","amount":12.34}"#,
            )
            .create_async()
            .await;

        let amount: Decimal = "12.34".parse().unwrap();
        let client = bank_client(&url, MockRuntime::new(), 3);
        let result = client.transfer("ACC1042", "ACC1099", amount, None).await;

        let receipt = result.receipt().unwrap();
        assert_eq!(receipt.from_account, "ACC1042");
        assert_eq!(receipt.to_account, "ACC1099");
        assert_eq!(receipt.amount, amount);
    }

    #[tokio::test]
    async fn test_transfer_validation_failure_makes_no_request() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("POST", "/transfer")
            .expect(0)
            .create_async()
            .await;

        let client = bank_client(&url, MockRuntime::new(), 3);
        let cases = [
            ("ACC1000", "ACC1001", Decimal::ZERO),
            ("ACC1000", "ACC1001", Decimal::from(-5)),
            ("ACC1000", "ACC1000", Decimal::from(10)),
            ("ACC10", "ACC1001", Decimal::from(10)),
            ("ACC1000", "account-2", Decimal::from(10)),
        ];
        for (from, to, amount) in cases {
            let result = client.transfer(from, to, amount, None).await;
            let failure = result.failure().unwrap();
            assert_eq!(failure.kind, ErrorKind::Validation);
            assert!(!failure.errors.is_empty());
        }

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_transfer_api_rejection_is_decoded() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("POST", "/transfer")
            .with_status(400)
            .with_body(
                r#"{"status":"FAILED","message":"Transfer failed","errors":["Insufficient funds in account ACC1000"]}"#,
            )
            .expect(1)
            .create_async()
            .await;

        let client = bank_client(&url, MockRuntime::new(), 3);
        let result = client
            .transfer("ACC1000", "ACC1001", Decimal::from(1_000_000), None)
            .await;

        mock.assert_async().await;
        let failure = result.failure().unwrap();
        assert_eq!(failure.kind, ErrorKind::NonTransientHttp);
        assert_eq!(failure.message, "Transfer failed");
        assert_eq!(
            failure.errors,
            vec!["Insufficient funds in account ACC1000".to_string()]
        );
    }

    #[tokio::test]
    async fn test_transfer_sends_bearer_token_when_present() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("POST", "/transfer")
            .match_header("authorization", "Bearer jwt-xyz")
            .with_status(200)
            .with_body(RECEIPT)
            .create_async()
            .await;

        let client = bank_client(&url, MockRuntime::new(), 3);
        let token = AuthToken::new("jwt-xyz", Claim::Transfer);
        let result = client
            .transfer("ACC1000", "ACC1001", Decimal::from(100), Some(&token))
            .await;

        mock.assert_async().await;
        assert!(result.is_success());
    }

    #[tokio::test]
    async fn test_transfer_gives_up_after_budget() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("POST", "/transfer")
            .with_status(502)
            .expect(3)
            .create_async()
            .await;

        let mut runtime = MockRuntime::new();
        runtime.expect_sleep().times(2).returning(|_| ());
        let client = bank_client(&url, runtime, 2);
        let result = client
            .transfer("ACC1000", "ACC1001", Decimal::from(100), None)
            .await;

        mock.assert_async().await;
        let failure = result.failure().unwrap();
        assert_eq!(failure.kind, ErrorKind::TransientHttp);
        assert_eq!(failure.http_status, Some(502));
    }

    #[tokio::test]
    async fn test_list_accounts_bare_array() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("GET", "/accounts")
            .with_status(200)
            .with_body(r#"[{"accountId": "ACC1000", "balance": 5000.0}, {"id": "ACC1001"}]"#)
            .expect(1)
            .create_async()
            .await;

        let client = bank_client(&url, MockRuntime::new(), 0);
        let accounts = client.list_accounts(None).await.unwrap();

        mock.assert_async().await;
        assert_eq!(accounts.len(), 2);
        assert_eq!(accounts[0].account_id, "ACC1000");
        assert_eq!(accounts[0].balance, Some(Decimal::from(5000)));
        assert_eq!(accounts[1].account_id, "ACC1001");
        assert_eq!(accounts[1].balance, None);
    }

    #[tokio::test]
    async fn test_list_accounts_wrapped_object() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let _m = server
            .mock("GET", "/accounts")
            .with_status(200)
            .with_body(r#"{"accounts": [{"accountId": "ACC1002", "balance": 1}]}"#)
            .create_async()
            .await;

        let client = bank_client(&url, MockRuntime::new(), 0);
        let accounts = client.list_accounts(None).await.unwrap();

        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].account_id, "ACC1002");
        assert_eq!(accounts[0].balance, Some(Decimal::ONE));
    }

    #[tokio::test]
    async fn test_validate_account() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("GET", "/accounts/validate/ACC1000")
            .with_status(200)
            .with_body(r#"{"accountId": "ACC1000", "valid": true}"#)
            .create_async()
            .await;

        let client = bank_client(&url, MockRuntime::new(), 0);
        let validation = client.validate_account("ACC1000", None).await.unwrap();

        mock.assert_async().await;
        assert!(validation.valid);
        assert_eq!(validation.account_id, "ACC1000");
    }

    #[tokio::test]
    async fn test_validate_account_rejects_malformed_id_locally() {
        let client = bank_client("http://127.0.0.1:1", MockRuntime::new(), 0);
        let err = client.validate_account("ACC1", None).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_balance() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("GET", "/accounts/balance/ACC1001")
            .match_header("authorization", "Bearer enq")
            .with_status(200)
            .with_body(r#"{"accountId": "ACC1001", "balance": 250.75}"#)
            .create_async()
            .await;

        let client = bank_client(&url, MockRuntime::new(), 0);
        let token = AuthToken::new("enq", Claim::Enquiry);
        let balance = client.balance("ACC1001", Some(&token)).await.unwrap();

        mock.assert_async().await;
        assert_eq!(balance.balance, "250.75".parse::<Decimal>().unwrap());
    }

    #[tokio::test]
    async fn test_balance_not_found() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let _m = server
            .mock("GET", "/accounts/balance/ACC9999")
            .with_status(404)
            .with_body(r#"{"error": "Account not found"}"#)
            .create_async()
            .await;

        let client = bank_client(&url, MockRuntime::new(), 3);
        let err = client.balance("ACC9999", None).await.unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.kind(), ErrorKind::NonTransientHttp);
    }

    #[tokio::test]
    async fn test_transaction_history() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("GET", "/transactions/history")
            .match_query(Matcher::UrlEncoded("limit".into(), "5".into()))
            .match_header("authorization", "Bearer hist")
            .with_status(200)
            .with_body(
                r#"{"transactions": [
                    {"transactionId": "tx-1", "fromAccount": "ACC1000", "toAccount": "ACC1001",
                     "amount": 100, "status": "SUCCESS", "timestamp": "2025-11-01T10:00:00Z"},
                    {"transactionId": "tx-2", "fromAccount": "ACC1001", "toAccount": "ACC1002",
                     "amount": 2.5}
                ]}"#,
            )
            .create_async()
            .await;

        let client = bank_client(&url, MockRuntime::new(), 0);
        let token = AuthToken::new("hist", Claim::Enquiry);
        let history = client.transaction_history(5, &token).await.unwrap();

        mock.assert_async().await;
        assert_eq!(history.transactions.len(), 2);
        assert_eq!(history.transactions[0].status.as_deref(), Some("SUCCESS"));
        assert_eq!(history.transactions[1].amount, "2.5".parse::<Decimal>().unwrap());
        assert_eq!(history.transactions[1].timestamp, None);
    }
}
