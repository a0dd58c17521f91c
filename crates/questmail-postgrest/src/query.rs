//! Table request builder.

use reqwest::Method;
use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::client::PostgrestClient;
use crate::error::{Error, ErrorBody, Result};

/// Sort direction for `order`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    /// Oldest first.
    Ascending,
    /// Newest first.
    Descending,
}

impl Order {
    /// Wire suffix for the `order` query parameter.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }
}

/// One request against one table.
///
/// Built by [`PostgrestClient::from`], finished with [`Query::fetch`] (decode
/// the response body) or [`Query::execute`] (ignore it).
#[derive(Debug)]
pub struct Query<'a> {
    client: &'a PostgrestClient,
    table: String,
    method: Method,
    params: Vec<(String, String)>,
    prefer: Vec<&'static str>,
    bearer: Option<String>,
    singular: bool,
    representation: bool,
    body: Option<Value>,
}

impl<'a> Query<'a> {
    pub(crate) fn new(client: &'a PostgrestClient, table: String) -> Self {
        Self {
            client,
            table,
            method: Method::GET,
            params: Vec::new(),
            prefer: Vec::new(),
            bearer: None,
            singular: false,
            representation: false,
            body: None,
        }
    }

    /// Authenticates the request with a user access token.
    ///
    /// Without this the request runs as the anonymous role (bearer is the
    /// project API key).
    #[must_use]
    pub fn auth(mut self, access_token: impl Into<String>) -> Self {
        self.bearer = Some(access_token.into());
        self
    }

    /// Selects columns. On a read this is the whole query; after a write it
    /// asks the gateway to return the affected rows.
    #[must_use]
    pub fn select(mut self, columns: impl Into<String>) -> Self {
        self.params.push(("select".to_string(), columns.into()));
        self.representation = true;
        self
    }

    /// Inserts one row.
    #[must_use]
    pub fn insert(mut self, row: Value) -> Self {
        self.method = Method::POST;
        self.body = Some(row);
        self
    }

    /// Inserts or updates one row, merging on the given conflict column.
    #[must_use]
    pub fn upsert(mut self, row: Value, on_conflict: &str) -> Self {
        self.method = Method::POST;
        self.body = Some(row);
        self.prefer.push("resolution=merge-duplicates");
        self.params
            .push(("on_conflict".to_string(), on_conflict.to_string()));
        self
    }

    /// Patches the filtered rows.
    #[must_use]
    pub fn update(mut self, patch: Value) -> Self {
        self.method = Method::PATCH;
        self.body = Some(patch);
        self
    }

    /// Deletes the filtered rows.
    #[must_use]
    pub fn delete(mut self) -> Self {
        self.method = Method::DELETE;
        self
    }

    /// Filters on column equality.
    #[must_use]
    pub fn eq(mut self, column: &str, value: impl std::fmt::Display) -> Self {
        self.params.push((column.to_string(), format!("eq.{value}")));
        self
    }

    /// Filters on column membership in a value list.
    #[must_use]
    pub fn in_list<I, V>(mut self, column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: std::fmt::Display,
    {
        let list = values
            .into_iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(",");
        self.params.push((column.to_string(), format!("in.({list})")));
        self
    }

    /// Filters on a disjunction of conditions, e.g.
    /// `and(recipient.eq.X,folder.eq.trash),and(sender.eq.X,folder.eq.trash)`.
    #[must_use]
    pub fn or(mut self, conditions: impl AsRef<str>) -> Self {
        self.params
            .push(("or".to_string(), format!("({})", conditions.as_ref())));
        self
    }

    /// Orders the result by a column.
    #[must_use]
    pub fn order(mut self, column: &str, direction: Order) -> Self {
        self.params
            .push(("order".to_string(), format!("{column}.{}", direction.as_str())));
        self
    }

    /// Limits the number of returned rows.
    #[must_use]
    pub fn limit(mut self, count: usize) -> Self {
        self.params.push(("limit".to_string(), count.to_string()));
        self
    }

    /// Asks for a single object instead of an array. The request fails when
    /// the filter does not match exactly one row.
    #[must_use]
    pub fn single(mut self) -> Self {
        self.singular = true;
        self
    }

    /// Runs the request and decodes the response body.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the gateway reports an error,
    /// or the body does not decode as `T`.
    pub async fn fetch<T: DeserializeOwned>(self) -> Result<T> {
        let response = self.send().await?;
        Ok(response.json().await?)
    }

    /// Runs the request, ignoring the response body.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the gateway reports an error.
    pub async fn execute(self) -> Result<()> {
        self.send().await?;
        Ok(())
    }

    async fn send(self) -> Result<reqwest::Response> {
        let url = self.build_url()?;
        debug!(table = %self.table, method = %self.method, "postgrest request");

        let mut request = self
            .client
            .http_client()
            .request(self.method.clone(), url)
            .header("apikey", self.client.api_key())
            .bearer_auth(self.bearer.as_deref().unwrap_or(self.client.api_key()));

        if self.singular {
            request = request.header(ACCEPT, "application/vnd.pgrst.object+json");
        }

        let mut prefer = self.prefer.clone();
        if self.representation && self.method != Method::GET {
            prefer.push("return=representation");
        }
        if !prefer.is_empty() {
            request = request.header("Prefer", prefer.join(","));
        }

        if let Some(body) = &self.body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(match serde_json::from_str::<ErrorBody>(&text) {
                Ok(body) => body.into_error(status.as_u16()),
                Err(_) => Error::Api {
                    status: status.as_u16(),
                    message: text,
                },
            });
        }

        Ok(response)
    }

    fn build_url(&self) -> Result<Url> {
        let mut url = self.client.table_url(&self.table)?;
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &self.params {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client() -> PostgrestClient {
        PostgrestClient::new("https://project.example.co", "anon-key").unwrap()
    }

    mod filter_tests {
        use super::*;

        // Reserved characters are percent-encoded on the wire; compare the
        // decoded pairs.
        fn pairs(url: &Url) -> Vec<(String, String)> {
            url.query_pairs()
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect()
        }

        #[test]
        fn test_eq_filter() {
            let c = client();
            let q = c.from("mails").select("*").eq("folder", "inbox");
            let url = q.build_url().unwrap();
            assert_eq!(url.query(), Some("select=*&folder=eq.inbox"));
        }

        #[test]
        fn test_in_filter() {
            let c = client();
            let q = c.from("attachments").select("*").in_list("mail_id", ["a", "b", "c"]);
            let url = q.build_url().unwrap();
            let expected = ("mail_id".to_string(), "in.(a,b,c)".to_string());
            assert!(pairs(&url).contains(&expected));
        }

        #[test]
        fn test_or_filter_wraps_conditions() {
            let c = client();
            let q = c.from("mails").select("id").or(
                "and(recipient.eq.u1,folder.eq.trash),and(sender.eq.u1,folder.eq.trash)",
            );
            let url = q.build_url().unwrap();
            let expected = (
                "or".to_string(),
                "(and(recipient.eq.u1,folder.eq.trash),and(sender.eq.u1,folder.eq.trash))"
                    .to_string(),
            );
            assert!(pairs(&url).contains(&expected));
        }

        #[test]
        fn test_order_and_limit() {
            let c = client();
            let q = c
                .from("chat_messages")
                .select("*")
                .order("created_at", Order::Descending)
                .limit(50);
            let url = q.build_url().unwrap();
            assert_eq!(
                url.query(),
                Some("select=*&order=created_at.desc&limit=50")
            );
        }

        #[test]
        fn test_order_ascending() {
            assert_eq!(Order::Ascending.as_str(), "asc");
            assert_eq!(Order::Descending.as_str(), "desc");
        }
    }

    mod write_tests {
        use super::*;

        #[test]
        fn test_insert_sets_post() {
            let c = client();
            let q = c.from("mails").insert(json!({"subject": "Hi"}));
            assert_eq!(q.method, Method::POST);
            assert!(q.body.is_some());
            assert!(!q.representation);
        }

        #[test]
        fn test_insert_with_select_wants_representation() {
            let c = client();
            let q = c.from("mails").insert(json!({"subject": "Hi"})).select("*").single();
            assert_eq!(q.method, Method::POST);
            assert!(q.representation);
            assert!(q.singular);
        }

        #[test]
        fn test_upsert_prefers_merge() {
            let c = client();
            let q = c
                .from("online_users")
                .upsert(json!({"user_id": "u1"}), "user_id");
            assert_eq!(q.method, Method::POST);
            assert_eq!(q.prefer, vec!["resolution=merge-duplicates"]);
            let url = q.build_url().unwrap();
            assert_eq!(url.query(), Some("on_conflict=user_id"));
        }

        #[test]
        fn test_update_sets_patch() {
            let c = client();
            let q = c.from("mails").update(json!({"read": true})).eq("id", "m1");
            assert_eq!(q.method, Method::PATCH);
            let url = q.build_url().unwrap();
            assert_eq!(url.query(), Some("id=eq.m1"));
        }

        #[test]
        fn test_delete_sets_method() {
            let c = client();
            let q = c.from("attachments").delete().eq("mail_id", "m1");
            assert_eq!(q.method, Method::DELETE);
        }
    }

    mod auth_tests {
        use super::*;

        #[test]
        fn test_default_bearer_is_api_key() {
            let c = client();
            let q = c.from("mails").select("*");
            assert!(q.bearer.is_none());
        }

        #[test]
        fn test_auth_overrides_bearer() {
            let c = client();
            let q = c.from("mails").select("*").auth("token-abc");
            assert_eq!(q.bearer.as_deref(), Some("token-abc"));
        }
    }
}
