use crate::diff::{DiffKind, SeriesDiff};
use crate::error::TtSyncResult;
use crate::event::{EncodeContext, EventSeries};
use crate::remote::{CalendarService, RemoteEvent};
use crate::sync::{CorruptEvent, OutcomeStatus, SyncOutcome, SyncReport};

#[derive(Debug, Clone, Copy, Default)]
pub struct SyncOptions {
    /// Decide and log every call without sending any.
    pub dry_run: bool,
}

/// Applies changes to a calendar service, one call at a time.
///
/// A failed call is recorded and the next change still runs. Nothing is
/// retried.
pub struct SyncDriver<'a> {
    service: &'a dyn CalendarService,
    context: &'a EncodeContext,
    options: SyncOptions,
}

/// What the driver decided to do for one change.
enum Call {
    Insert(RemoteEvent),
    Update(String, RemoteEvent),
    Delete(String),
}

impl<'a> SyncDriver<'a> {
    pub fn new(
        service: &'a dyn CalendarService,
        context: &'a EncodeContext,
        options: SyncOptions,
    ) -> Self {
        SyncDriver {
            service,
            context,
            options,
        }
    }

    /// Delete remote events that could not be decoded.
    ///
    /// Their dates are unknown, so they can only be replaced: the diff
    /// recreates whatever the timetable still holds.
    pub async fn purge_corrupt(&self, corrupt: &[CorruptEvent]) -> SyncReport {
        let mut report = SyncReport::default();

        for entry in corrupt {
            let label = format!("{} ({})", entry.event.summary, entry.reason);
            let outcome = match entry.event.id.as_deref() {
                Some(id) => self.run(DiffKind::Delete, &label, Call::Delete(id.to_string())).await,
                None => self.skip(DiffKind::Delete, &label, None, "corrupt event has no remote id"),
            };
            report.push(outcome);
        }

        report
    }

    pub async fn apply(&self, diffs: impl IntoIterator<Item = SeriesDiff>) -> SyncReport {
        let mut report = SyncReport::default();
        for diff in diffs {
            report.push(self.apply_one(diff).await);
        }
        report
    }

    async fn apply_one(&self, diff: SeriesDiff) -> SyncOutcome {
        match diff {
            SeriesDiff::Create(series) => {
                let label = series.to_string();
                match self.encode(&series, None) {
                    Ok(event) => self.run(DiffKind::Create, &label, Call::Insert(event)).await,
                    Err(e) => self.fail(DiffKind::Create, &label, None, e.to_string()),
                }
            }
            SeriesDiff::Delete(series) => {
                let label = series.to_string();
                match series.remote_id {
                    Some(id) => self.run(DiffKind::Delete, &label, Call::Delete(id)).await,
                    None => self.skip(DiffKind::Delete, &label, None, "series has no remote id"),
                }
            }
            SeriesDiff::Update { from, to } => {
                let label = to.to_string();
                let Some(id) = from.remote_id else {
                    return self.skip(
                        DiffKind::Update,
                        &label,
                        None,
                        "remote series has no remote id",
                    );
                };

                if to.is_dead() {
                    return self.run(DiffKind::Delete, &label, Call::Delete(id)).await;
                }

                match self.encode(&to, Some(&id)) {
                    Ok(event) => self.run(DiffKind::Update, &label, Call::Update(id, event)).await,
                    Err(e) => self.fail(DiffKind::Update, &label, Some(id), e.to_string()),
                }
            }
        }
    }

    fn encode(&self, series: &EventSeries, remote_id: Option<&str>) -> TtSyncResult<RemoteEvent> {
        let mut event = RemoteEvent::from_series(series, self.context)?;
        event.id = remote_id.map(str::to_string);
        Ok(event)
    }

    /// Make (or, in a dry run, only announce) one remote call.
    async fn run(&self, action: DiffKind, series: &str, call: Call) -> SyncOutcome {
        let target = match &call {
            Call::Insert(_) => None,
            Call::Update(id, _) | Call::Delete(id) => Some(id.clone()),
        };

        if self.options.dry_run {
            return self.record(action, series, target, OutcomeStatus::DryRun);
        }

        let result = match &call {
            Call::Insert(event) => self.service.insert(event).await.map(Some),
            Call::Update(id, event) => self.service.update(id, event).await.map(|_| None),
            Call::Delete(id) => self.service.delete(id).await.map(|_| None),
        };

        match result {
            Ok(created) => self.record(action, series, created.or(target), OutcomeStatus::Applied),
            Err(e) => self.fail(action, series, target, e.to_string()),
        }
    }

    fn skip(
        &self,
        action: DiffKind,
        series: &str,
        remote_id: Option<String>,
        reason: &str,
    ) -> SyncOutcome {
        self.record(action, series, remote_id, OutcomeStatus::Skipped(reason.to_string()))
    }

    fn fail(
        &self,
        action: DiffKind,
        series: &str,
        remote_id: Option<String>,
        error: String,
    ) -> SyncOutcome {
        self.record(action, series, remote_id, OutcomeStatus::Failed(error))
    }

    /// Log the attempt and turn it into an outcome.
    fn record(
        &self,
        action: DiffKind,
        series: &str,
        remote_id: Option<String>,
        status: OutcomeStatus,
    ) -> SyncOutcome {
        let id = remote_id.as_deref().unwrap_or("-");
        match &status {
            OutcomeStatus::Failed(_) => tracing::error!(
                action = action.as_str(),
                series,
                remote_id = id,
                outcome = %status,
                "remote call failed"
            ),
            OutcomeStatus::Skipped(_) => tracing::warn!(
                action = action.as_str(),
                series,
                remote_id = id,
                outcome = %status,
                "remote call skipped"
            ),
            OutcomeStatus::Applied | OutcomeStatus::DryRun => tracing::info!(
                action = action.as_str(),
                series,
                remote_id = id,
                outcome = %status,
                dry_run = self.options.dry_run,
                "remote call"
            ),
        }

        SyncOutcome {
            action,
            series: series.to_string(),
            remote_id,
            status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::BuildingDirectory;
    use crate::date_range::DateRange;
    use crate::diff::{DiffCounts, changes};
    use crate::error::TtSyncError;
    use crate::event::{EventInstance, EventView, TimeSlot};
    use crate::remote::EventPage;
    use crate::sync::decode_remote;
    use async_trait::async_trait;
    use chrono::{Duration, NaiveDate, NaiveTime, Weekday};
    use chrono_tz::Tz;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeSet;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    const LONDON: Tz = chrono_tz::Europe::London;

    #[derive(Debug, Clone, PartialEq)]
    enum Recorded {
        Insert(String),
        Update(String, RemoteEvent),
        Delete(String),
    }

    /// In-memory calendar that records every mutation.
    #[derive(Default)]
    struct MockCalendar {
        calls: Mutex<Vec<Recorded>>,
        stored: Mutex<Vec<RemoteEvent>>,
        failing_ids: Vec<String>,
    }

    impl MockCalendar {
        fn failing(ids: &[&str]) -> Self {
            MockCalendar {
                failing_ids: ids.iter().map(|s| s.to_string()).collect(),
                ..Default::default()
            }
        }

        fn calls(&self) -> Vec<Recorded> {
            self.calls.lock().unwrap().clone()
        }

        /// Events created so far, as the calendar would list them.
        fn stored(&self) -> Vec<RemoteEvent> {
            self.stored.lock().unwrap().clone()
        }

        fn check(&self, id: &str) -> TtSyncResult<()> {
            if self.failing_ids.iter().any(|f| f == id) {
                return Err(TtSyncError::Remote(format!("{} is unavailable", id)));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl CalendarService for MockCalendar {
        async fn list_events(
            &self,
            _range: &DateRange,
            _page_token: Option<&str>,
        ) -> TtSyncResult<EventPage> {
            Ok(EventPage::default())
        }

        async fn insert(&self, event: &RemoteEvent) -> TtSyncResult<String> {
            let mut calls = self.calls.lock().unwrap();
            calls.push(Recorded::Insert(event.summary.clone()));
            let id = format!("new-{}", calls.len());

            let mut stored = event.clone();
            stored.id = Some(id.clone());
            self.stored.lock().unwrap().push(stored);
            Ok(id)
        }

        async fn update(&self, id: &str, event: &RemoteEvent) -> TtSyncResult<()> {
            self.check(id)?;
            self.calls
                .lock()
                .unwrap()
                .push(Recorded::Update(id.to_string(), event.clone()));
            Ok(())
        }

        async fn delete(&self, id: &str) -> TtSyncResult<()> {
            self.check(id)?;
            self.calls
                .lock()
                .unwrap()
                .push(Recorded::Delete(id.to_string()));
            Ok(())
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn series(code: &str, dates: &[NaiveDate]) -> EventSeries {
        let slot = TimeSlot::new(
            Weekday::Mon,
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            Duration::hours(1),
        );
        let instance = EventInstance::new([code], "Algorithms", ["A1"], ["Dr A"], "Lecture", slot);
        EventSeries::new(instance, dates.iter().copied())
    }

    fn context() -> EncodeContext {
        EncodeContext::new(LONDON, BuildingDirectory::default())
    }

    #[tokio::test]
    async fn test_update_pushes_new_dates() {
        let calendar = MockCalendar::default();
        let context = context();
        let driver = SyncDriver::new(&calendar, &context, SyncOptions::default());
        let remote = series("CS101", &[date(2024, 1, 8)]).with_remote_id("evt-1");
        let local = series("CS101", &[date(2024, 1, 8), date(2024, 1, 15)]);

        let diffs = changes(vec![remote], vec![local]).expect("Should diff");
        let report = driver.apply(diffs).await;

        assert!(report.is_success());
        let calls = calendar.calls();
        assert_eq!(calls.len(), 1);
        let Recorded::Update(id, event) = &calls[0] else {
            panic!("Should have updated, got {:?}", calls[0]);
        };
        assert_eq!(id, "evt-1");
        assert_eq!(
            event.occurrences().expect("Should decode pushed event"),
            BTreeSet::from([date(2024, 1, 8), date(2024, 1, 15)])
        );
    }

    #[tokio::test]
    async fn test_orphaned_remote_series_is_deleted_once() {
        let calendar = MockCalendar::default();
        let context = context();
        let driver = SyncDriver::new(&calendar, &context, SyncOptions::default());
        let remote = series("CS999", &[date(2024, 1, 8)]).with_remote_id("evt-9");

        let diffs = changes(vec![remote], vec![]).expect("Should diff");
        driver.apply(diffs).await;

        assert_eq!(calendar.calls(), vec![Recorded::Delete("evt-9".into())]);
    }

    #[tokio::test]
    async fn test_dead_update_becomes_delete() {
        let calendar = MockCalendar::default();
        let context = context();
        let driver = SyncDriver::new(&calendar, &context, SyncOptions::default());
        let diff = SeriesDiff::Update {
            from: series("CS101", &[date(2024, 1, 8)]).with_remote_id("evt-1"),
            to: series("CS101", &[]),
        };

        let report = driver.apply([diff]).await;

        assert_eq!(calendar.calls(), vec![Recorded::Delete("evt-1".into())]);
        assert_eq!(report.outcomes[0].action, DiffKind::Delete);
    }

    #[tokio::test]
    async fn test_unresolvable_changes_are_skipped() {
        let calendar = MockCalendar::default();
        let context = context();
        let driver = SyncDriver::new(&calendar, &context, SyncOptions::default());
        let diffs = vec![
            SeriesDiff::Delete(series("CS101", &[date(2024, 1, 8)])),
            SeriesDiff::Update {
                from: series("CS102", &[date(2024, 1, 8)]),
                to: series("CS102", &[date(2024, 1, 15)]),
            },
        ];

        let report = driver.apply(diffs).await;

        assert!(calendar.calls().is_empty());
        assert!(report.is_success());
        assert_eq!(report.skipped().count(), 2);
    }

    #[tokio::test]
    async fn test_failure_does_not_stop_later_changes() {
        let calendar = MockCalendar::failing(&["evt-1"]);
        let context = context();
        let driver = SyncDriver::new(&calendar, &context, SyncOptions::default());
        let diffs = vec![
            SeriesDiff::Delete(series("CS101", &[date(2024, 1, 8)]).with_remote_id("evt-1")),
            SeriesDiff::Delete(series("CS102", &[date(2024, 1, 8)]).with_remote_id("evt-2")),
            SeriesDiff::Create(series("CS103", &[date(2024, 1, 8)])),
        ];

        let report = driver.apply(diffs).await;

        assert!(!report.is_success());
        assert_eq!(report.failures().count(), 1);
        assert_eq!(
            calendar.calls(),
            vec![
                Recorded::Delete("evt-2".into()),
                Recorded::Insert("Algorithms - CS103".into()),
            ]
        );
        assert_eq!(report.outcomes[2].remote_id.as_deref(), Some("new-2"));
    }

    #[tokio::test]
    async fn test_dry_run_makes_no_calls() {
        let calendar = MockCalendar::default();
        let context = context();
        let driver = SyncDriver::new(&calendar, &context, SyncOptions { dry_run: true });
        let diffs = vec![
            SeriesDiff::Create(series("CS101", &[date(2024, 1, 8)])),
            SeriesDiff::Delete(series("CS102", &[date(2024, 1, 8)]).with_remote_id("evt-2")),
        ];

        let report = driver.apply(diffs).await;

        assert!(calendar.calls().is_empty());
        assert_eq!(
            report.counts(),
            DiffCounts {
                created: 1,
                updated: 0,
                deleted: 1
            }
        );
        assert_eq!(report.outcomes[0].remote_id, None);
    }

    #[tokio::test]
    async fn test_corrupt_events_with_ids_are_purged() {
        let calendar = MockCalendar::default();
        let context = context();
        let driver = SyncDriver::new(&calendar, &context, SyncOptions::default());
        let broken = |id: Option<&str>| RemoteEvent {
            id: id.map(str::to_string),
            summary: "Broken".into(),
            ..Default::default()
        };

        let snapshot = decode_remote([broken(Some("evt-1")), broken(None)], LONDON);
        let report = driver.purge_corrupt(&snapshot.corrupt).await;

        assert_eq!(calendar.calls(), vec![Recorded::Delete("evt-1".into())]);
        assert_eq!(report.skipped().count(), 1);
    }

    #[tokio::test]
    async fn test_second_run_after_creating_everything_changes_nothing() {
        let calendar = MockCalendar::default();
        let context = context();
        let driver = SyncDriver::new(&calendar, &context, SyncOptions::default());
        let drop_in = EventInstance::new(
            Vec::<String>::new(),
            "Careers Fair",
            ["A1"],
            Vec::<String>::new(),
            "",
            TimeSlot::new(
                Weekday::Wed,
                NaiveTime::from_hms_opt(13, 0, 0).unwrap(),
                Duration::hours(2),
            ),
        );
        let local = vec![
            EventSeries::new(drop_in, [date(2024, 1, 10), date(2024, 1, 24)]),
            series("CS101", &[date(2024, 1, 8)]),
            // Clocks change on 2024-03-31 and 2024-10-27.
            series(
                "CS102",
                &[
                    date(2024, 3, 25),
                    date(2024, 4, 1),
                    date(2024, 10, 21),
                    date(2024, 10, 28),
                ],
            ),
        ];

        let first = driver
            .apply(changes(vec![], local.clone()).expect("Should diff"))
            .await;
        assert!(first.is_success());
        assert_eq!(first.counts().created, 3);

        let snapshot = decode_remote(calendar.stored(), LONDON);
        assert!(snapshot.corrupt.is_empty(), "{:?}", snapshot.corrupt);
        let second: Vec<_> = changes(snapshot.series, local)
            .expect("Should diff")
            .collect();

        assert!(second.is_empty(), "{:?}", second);
    }

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl Write for Capture {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_every_attempt_logs_one_line() {
        let capture = Capture::default();
        let writer = capture.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_max_level(tracing::Level::INFO)
            .with_writer(move || writer.clone())
            .finish();
        let guard = tracing::subscriber::set_default(subscriber);

        let calendar = MockCalendar::default();
        let context = context();
        let driver = SyncDriver::new(&calendar, &context, SyncOptions { dry_run: true });
        driver
            .apply(vec![
                SeriesDiff::Create(series("CS101", &[date(2024, 1, 8)])),
                SeriesDiff::Delete(series("CS102", &[date(2024, 1, 8)]).with_remote_id("evt-2")),
                SeriesDiff::Delete(series("CS103", &[date(2024, 1, 8)])),
            ])
            .await;
        drop(guard);

        let output = String::from_utf8(capture.0.lock().unwrap().clone()).unwrap();
        let lines: Vec<&str> = output.lines().filter(|l| l.contains("remote call")).collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("action=\"create\""));
        assert!(lines[0].contains("outcome=dry-run"));
        assert!(lines[1].contains("remote_id=\"evt-2\""));
        assert!(lines[2].contains("skipped"));
    }
}
