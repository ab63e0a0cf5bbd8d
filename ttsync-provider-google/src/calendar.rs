//! Google Calendar as a ttsync calendar service.

use anyhow::{Context, Result};
use async_trait::async_trait;
use google_calendar::Client;
use google_calendar::types::{MinAccessRole, OrderBy, SendUpdates};
use ttsync_core::date_range::DateRange;
use ttsync_core::error::{TtSyncError, TtSyncResult};
use ttsync_core::remote::{CalendarService, EventPage, RemoteEvent};

use crate::convert::{FromGoogle, ToGoogle};
use crate::session::Session;

/// One Google calendar, found by name in the signed-in account.
pub struct GoogleCalendar {
    client: Client,
    calendar_id: String,
}

impl GoogleCalendar {
    /// Sign in as `account` (or the only stored account) and look up the
    /// calendar called `name`.
    pub async fn connect(account: Option<&str>, name: &str) -> Result<Self> {
        let account = Session::resolve_account(account)?;
        let session = Session::load_valid(&account).await?;
        let client = session.client()?;

        let calendars = client
            .calendar_list()
            .list_all(MinAccessRole::default(), false, false)
            .await
            .context("Failed to fetch calendars")?;

        let calendar_id = calendars
            .body
            .into_iter()
            .find(|c| c.summary == name && !c.id.is_empty())
            .map(|c| c.id)
            .with_context(|| format!("No calendar named '{}' in {}", name, account))?;

        tracing::debug!(account = %account, calendar = name, "connected to Google Calendar");

        Ok(GoogleCalendar {
            client,
            calendar_id,
        })
    }
}

fn remote_error(e: anyhow::Error) -> TtSyncError {
    TtSyncError::Remote(format!("{:#}", e))
}

#[async_trait]
impl CalendarService for GoogleCalendar {
    /// The client pages internally, so the whole listing is one page.
    async fn list_events(
        &self,
        range: &DateRange,
        _page_token: Option<&str>,
    ) -> TtSyncResult<EventPage> {
        let response = self
            .client
            .events()
            .list_all(
                &self.calendar_id,
                "",
                0,
                OrderBy::default(),
                &[],
                "",
                &[],
                false,
                false,
                false,
                &range.to_rfc3339(),
                &range.from_rfc3339(),
                "",
                "",
            )
            .await
            .context("Failed to fetch events")
            .map_err(remote_error)?;

        let events = response
            .body
            .into_iter()
            .filter(|e| e.status != "cancelled")
            .map(RemoteEvent::from_google)
            .collect();

        Ok(EventPage {
            events,
            next_page_token: None,
        })
    }

    async fn insert(&self, event: &RemoteEvent) -> TtSyncResult<String> {
        let mut google_event = event.to_google();
        google_event.id = String::new();

        let response = self
            .client
            .events()
            .insert(
                &self.calendar_id,
                0,
                0,
                false,
                SendUpdates::None,
                false,
                &google_event,
            )
            .await
            .with_context(|| format!("Failed to create event: {}", event.summary))
            .map_err(remote_error)?;

        Ok(response.body.id)
    }

    async fn update(&self, id: &str, event: &RemoteEvent) -> TtSyncResult<()> {
        let mut google_event = event.to_google();
        google_event.id = id.to_string();

        self.client
            .events()
            .update(
                &self.calendar_id,
                id,
                0,
                0,
                false,
                SendUpdates::None,
                false,
                &google_event,
            )
            .await
            .with_context(|| format!("Failed to update event: {}", event.summary))
            .map_err(remote_error)?;

        Ok(())
    }

    async fn delete(&self, id: &str) -> TtSyncResult<()> {
        let result = self
            .client
            .events()
            .delete(&self.calendar_id, id, false, SendUpdates::None)
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) => {
                let error_str = e.to_string();
                if error_str.contains("410") || error_str.contains("Gone") {
                    tracing::debug!(remote_id = id, "event already deleted");
                    Ok(())
                } else {
                    Err(e)
                        .with_context(|| format!("Failed to delete event: {}", id))
                        .map_err(remote_error)
                }
            }
        }
    }
}
