//! Invitation e-mail through a Resend-compatible HTTP API

use crate::config::MailConfig;
use neurika_common::types::TeamRole;
use reqwest::Client;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Mail API error: {status} - {message}")]
    Api { status: u16, message: String },
}

#[derive(Debug, Clone)]
pub struct Mailer {
    http: Client,
    api_key: String,
    base_url: String,
    from: String,
    app_base_url: String,
}

/// Everything needed to render one invitation
#[derive(Debug, Clone)]
pub struct Invitation<'a> {
    pub email: &'a str,
    pub role: TeamRole,
    pub token: Uuid,
    pub message: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct SendEmail<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: String,
}

pub const INVITATION_SUBJECT: &str = "You've been invited to join Neurika";

fn role_description(role: TeamRole) -> &'static str {
    match role {
        TeamRole::Reader => "View only access",
        TeamRole::Editor => "Can edit and comment",
        TeamRole::Admin => "Full access",
    }
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

impl Mailer {
    /// `None` when no API key is configured
    pub fn from_config(http: Client, config: &MailConfig) -> Option<Self> {
        let api_key = config.resend_api_key.clone()?;
        Some(Self {
            http,
            api_key,
            base_url: config.resend_base_url.trim_end_matches('/').to_string(),
            from: config.from.clone(),
            app_base_url: config.app_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn invitation_link(&self, token: Uuid) -> String {
        format!("{}/auth?invite={}", self.app_base_url, token)
    }

    pub fn render_invitation(&self, invitation: &Invitation<'_>) -> String {
        let link = self.invitation_link(invitation.token);
        let note = invitation
            .message
            .map(|m| format!("<blockquote>{}</blockquote>", escape_html(m)))
            .unwrap_or_default();

        format!(
            "<h1>You're invited to Neurika</h1>\
             <p>You have been invited to join the team as <strong>{role}</strong> ({desc}).</p>\
             {note}\
             <p><a href=\"{link}\">Accept invitation</a></p>\
             <p>This invitation expires in 7 days.</p>",
            role = invitation.role,
            desc = role_description(invitation.role),
            note = note,
            link = link,
        )
    }

    #[tracing::instrument(skip(self, invitation), fields(email = %invitation.email, role = %invitation.role))]
    pub async fn send_invitation(&self, invitation: &Invitation<'_>) -> Result<(), MailError> {
        let body = SendEmail {
            from: &self.from,
            to: [invitation.email],
            subject: INVITATION_SUBJECT,
            html: self.render_invitation(invitation),
        };

        let resp = self
            .http
            .post(format!("{}/emails", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let message = resp.text().await.unwrap_or_default();
            return Err(MailError::Api { status, message });
        }

        tracing::info!("Invitation e-mail sent");
        Ok(())
    }
}
