//! Directory API client over Microsoft Graph.
//!
//! Channel listing and private-channel creation still live on the beta
//! surface; public-channel creation and owner listing are v1.0.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use groupbot_core::error::{GroupBotError, Result};
use groupbot_core::traits::DirectoryApi;
use groupbot_core::types::{ChannelInfo, ChannelSpec, CreatedChannel, TeamOwner};

/// Graph API client. One instance is shared across the bot; reqwest pools
/// connections internally.
pub struct GraphClient {
    http: reqwest::Client,
    base_url: String,
}

impl GraphClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, token: &str, url: &str) -> Result<T> {
        let response = self
            .http
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| GroupBotError::Graph(format!("GET {url} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GroupBotError::Graph(format!(
                "GET {url} returned {status}: {body}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| GroupBotError::Graph(format!("invalid response from {url}: {e}")))
    }

    async fn post_json<B: Serialize, T: for<'de> Deserialize<'de>>(
        &self,
        token: &str,
        url: &str,
        body: &B,
    ) -> Result<T> {
        let response = self
            .http
            .post(url)
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .map_err(|e| GroupBotError::Graph(format!("POST {url} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GroupBotError::Graph(format!(
                "POST {url} returned {status}: {body}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| GroupBotError::Graph(format!("invalid response from {url}: {e}")))
    }
}

#[async_trait]
impl DirectoryApi for GraphClient {
    async fn list_channels(&self, token: &str, group_id: &str) -> Result<Vec<ChannelInfo>> {
        let url = format!("{}/beta/teams/{group_id}/channels", self.base_url);
        let listing: ChannelListing = self.get_json(token, &url).await?;
        tracing::info!(
            group_id,
            count = listing.value.len(),
            "listed team channels"
        );
        Ok(listing
            .value
            .into_iter()
            .map(|c| ChannelInfo {
                id: c.id.unwrap_or_default(),
                display_name: c.display_name,
                membership_type: c.membership_type,
            })
            .collect())
    }

    async fn create_public_channel(
        &self,
        token: &str,
        group_id: &str,
        display_name: &str,
        description: &str,
    ) -> Result<CreatedChannel> {
        let url = format!("{}/v1.0/teams/{group_id}/channels", self.base_url);
        let body = PublicChannelRequest {
            display_name,
            description,
        };
        let created: ChannelResponse = self.post_json(token, &url, &body).await?;
        tracing::info!(channel = %created.display_name, "created public channel");
        Ok(CreatedChannel {
            id: created.id,
            display_name: created.display_name,
        })
    }

    async fn create_private_channel(
        &self,
        token: &str,
        group_id: &str,
        spec: &ChannelSpec,
    ) -> Result<CreatedChannel> {
        let url = format!("{}/beta/teams/{group_id}/channels", self.base_url);
        let body = PrivateChannelRequest::from_spec(spec, &self.base_url);
        let created: ChannelResponse = self.post_json(token, &url, &body).await?;
        tracing::info!(channel = %created.display_name, "created private channel");
        Ok(CreatedChannel {
            id: created.id,
            display_name: created.display_name,
        })
    }

    async fn list_owners(&self, token: &str, group_id: &str) -> Result<Vec<TeamOwner>> {
        let url = format!("{}/v1.0/groups/{group_id}/owners", self.base_url);
        let listing: OwnerListing = self.get_json(token, &url).await?;
        Ok(listing
            .value
            .into_iter()
            .map(|o| TeamOwner {
                id: o.id,
                display_name: o.display_name.unwrap_or_default(),
            })
            .collect())
    }
}

// Wire types.

#[derive(Serialize)]
struct PublicChannelRequest<'a> {
    #[serde(rename = "displayName")]
    display_name: &'a str,
    description: &'a str,
}

#[derive(Serialize)]
struct PrivateChannelRequest<'a> {
    #[serde(rename = "@odata.type")]
    odata_type: &'static str,
    #[serde(rename = "membershipType")]
    membership_type: &'static str,
    #[serde(rename = "displayName")]
    display_name: &'a str,
    description: &'a str,
    members: Vec<ChannelMemberRequest>,
}

impl<'a> PrivateChannelRequest<'a> {
    fn from_spec(spec: &'a ChannelSpec, base_url: &str) -> Self {
        Self {
            odata_type: "#Microsoft.Teams.Core.channel",
            membership_type: spec.channel_type.membership_type(),
            display_name: &spec.display_name,
            description: &spec.description,
            members: spec
                .members
                .iter()
                .map(|m| ChannelMemberRequest {
                    odata_type: "#microsoft.graph.aadUserConversationMember",
                    user_bind: format!("{base_url}/beta/users('{}')", m.object_id),
                    roles: vec![m.role.as_str()],
                })
                .collect(),
        }
    }
}

#[derive(Serialize)]
struct ChannelMemberRequest {
    #[serde(rename = "@odata.type")]
    odata_type: &'static str,
    #[serde(rename = "user@odata.bind")]
    user_bind: String,
    roles: Vec<&'static str>,
}

#[derive(Deserialize)]
struct ChannelResponse {
    id: String,
    #[serde(rename = "displayName")]
    display_name: String,
}

#[derive(Deserialize)]
struct ChannelListing {
    value: Vec<ChannelListEntry>,
}

#[derive(Deserialize)]
struct ChannelListEntry {
    #[serde(default)]
    id: Option<String>,
    #[serde(rename = "displayName")]
    display_name: String,
    #[serde(rename = "membershipType", default = "default_membership")]
    membership_type: String,
}

fn default_membership() -> String {
    "standard".into()
}

#[derive(Deserialize)]
struct OwnerListing {
    value: Vec<OwnerEntry>,
}

#[derive(Deserialize)]
struct OwnerEntry {
    id: String,
    #[serde(rename = "displayName", default)]
    display_name: Option<String>,
}
