use crate::cli::{Cli, Command, SettingsAction, Toggle};
use crate::error::Error;
use crate::render::{self, HistoryTable, SettingsView, SnapshotView};
use crate::signals::{SignalEvent, wait_for_signal};
use anyhow::{Context, anyhow};
use chrono::Local;
use config::{Config, SettingsStore};
use flume::bounded;
use history::{HistoryStore, NewRecord, RecordOutcome, Recorder};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use telemetry::{
    FixedSource, FromRaw, JsonFileSource, SettingsHealth, TelemetrySnapshot, TelemetrySource,
};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Everything a command needs: settings, telemetry and history.
pub struct App {
    settings: SettingsStore,
    source: Box<dyn TelemetrySource>,
    settings_health: Option<JsonFileSource>,
    recorder: Recorder,
}

impl App {
    pub async fn open(cli: &Cli) -> Result<Self, Error> {
        let settings = match &cli.conffile {
            Some(path) => SettingsStore::open(path)?,
            None => SettingsStore::in_memory(Config::new()),
        };
        debug!(config = ?settings.config(), "settings loaded");

        let source: Box<dyn TelemetrySource> = match &cli.raw {
            Some(path) => Box::new(JsonFileSource::new(path)),
            None => Box::new(FixedSource(None)),
        };

        let database = cli
            .database
            .clone()
            .or_else(|| settings.config().persistence.database_path.clone());
        let store = HistoryStore::open(database.as_deref()).await?;
        let recorder = Recorder::new(store, settings.recording());

        Ok(Self {
            settings,
            source,
            settings_health: cli.settings_health.as_ref().map(JsonFileSource::new),
            recorder,
        })
    }

    pub fn config(&self) -> &Config {
        self.settings.config()
    }

    fn store(&self) -> &HistoryStore {
        self.recorder.store()
    }

    /// Read and decode the current telemetry with the configured rounding.
    pub fn snapshot(&self) -> Option<TelemetrySnapshot> {
        self.source
            .raw_telemetry()
            .map(|raw| telemetry::decode(&raw, self.settings.rounding()))
    }

    fn settings_health(&self) -> Option<SettingsHealth> {
        if !self.config().display.show_settings_battery_info {
            return None;
        }
        self.settings_health
            .as_ref()
            .and_then(|source| source.raw_telemetry())
            .map(|raw| SettingsHealth::from_raw(&raw))
    }

    pub async fn run(&mut self, command: Command, out: &mut impl Write) -> anyhow::Result<()> {
        match command {
            Command::Show { json } => self.show(json, out).await,
            Command::Record { manual } => self.record(manual, out).await,
            Command::Add {
                cycle_count,
                health,
                date,
            } => self.add(cycle_count, health, date, out).await,
            Command::History { json } => self.history(json, out).await,
            Command::Delete { id } => self.delete(id, out).await,
            Command::Clear { yes } => self.clear(yes, out).await,
            Command::Export { dir } => self.export(dir, out).await,
            Command::Settings { action } => self.settings(action, out),
            Command::Watch { interval } => self.watch(interval, out).await,
        }
    }

    async fn show(&self, json: bool, out: &mut impl Write) -> anyhow::Result<()> {
        let snapshot = self.snapshot().ok_or(Error::NoTelemetry)?;
        if json {
            writeln!(out, "{}", serde_json::to_string_pretty(&snapshot)?)?;
            return Ok(());
        }
        self.render_home(&snapshot, out).await
    }

    async fn render_home(&self, snapshot: &TelemetrySnapshot, out: &mut impl Write) -> anyhow::Result<()> {
        let latest = if self.config().recording.show_history_in_home {
            self.store().fetch_latest().await
        } else {
            None
        };
        let settings_health = self.settings_health();
        let view = SnapshotView {
            snapshot,
            config: self.config(),
            settings_health: settings_health.as_ref(),
            latest: latest.as_ref(),
        };
        write!(out, "{view}")?;
        Ok(())
    }

    async fn record(&self, manual: bool, out: &mut impl Write) -> anyhow::Result<()> {
        let snapshot = self.snapshot().ok_or(Error::NoTelemetry)?;
        let outcome = self.recorder.record_snapshot(manual, &snapshot).await;
        writeln!(out, "{}", render::outcome(&outcome))?;
        if outcome == RecordOutcome::Failed {
            return Err(anyhow!("recording failed"));
        }
        Ok(())
    }

    async fn add(
        &self,
        cycle_count: i64,
        health: String,
        date: Option<i64>,
        out: &mut impl Write,
    ) -> anyhow::Result<()> {
        let mut record = NewRecord::hand_entered(cycle_count, health);
        if let Some(date) = date {
            record = record.with_create_date(date);
        }
        if !self.store().insert(record).await {
            return Err(anyhow!("failed to add record"));
        }
        writeln!(out, "Record added.")?;
        Ok(())
    }

    async fn history(&self, json: bool, out: &mut impl Write) -> anyhow::Result<()> {
        let records = self.store().fetch_all().await;
        if json {
            writeln!(out, "{}", serde_json::to_string_pretty(&records)?)?;
            return Ok(());
        }
        let table = HistoryTable {
            records: &records,
            config: self.config(),
            tz: &Local,
        };
        write!(out, "{table}")?;
        Ok(())
    }

    async fn delete(&self, id: i64, out: &mut impl Write) -> anyhow::Result<()> {
        if !self.store().delete_by_id(id).await {
            return Err(anyhow!("no record #{id}"));
        }
        writeln!(out, "Deleted record #{id}.")?;
        Ok(())
    }

    async fn clear(&self, yes: bool, out: &mut impl Write) -> anyhow::Result<()> {
        if !yes {
            writeln!(out, "Refusing to clear history without --yes.")?;
            return Ok(());
        }
        if !self.store().delete_all().await {
            return Err(anyhow!("failed to clear history"));
        }
        writeln!(out, "History cleared.")?;
        Ok(())
    }

    async fn export(&self, dir: Option<PathBuf>, out: &mut impl Write) -> anyhow::Result<()> {
        let dir = dir.unwrap_or_else(|| self.config().persistence.export_dir());
        let path = self
            .store()
            .export_csv(&dir)
            .await
            .with_context(|| format!("failed to export history to {}", dir.display()))?;
        writeln!(out, "{}", path.display())?;
        Ok(())
    }

    fn settings(&mut self, action: Option<SettingsAction>, out: &mut impl Write) -> anyhow::Result<()> {
        match action.unwrap_or(SettingsAction::Show) {
            SettingsAction::Show => {}
            SettingsAction::Rounding { policy } => self.settings.set_rounding(policy)?,
            SettingsAction::Frequency { mode } => self.settings.set_record_frequency(mode)?,
            SettingsAction::ToggleRecording => {
                self.settings.toggle_recording()?;
            }
            SettingsAction::Set { option, value } => {
                let settings = &mut self.settings;
                match option {
                    Toggle::AutoRefresh => settings.set_auto_refresh(value)?,
                    Toggle::ForceShowChargingData => settings.set_force_show_charging_data(value)?,
                    Toggle::ShowSettingsBatteryInfo => {
                        settings.set_show_settings_battery_info(value)?
                    }
                    Toggle::ShowHistoryInHome => settings.set_show_history_in_home(value)?,
                    Toggle::ShowDesignCapacity => settings.set_show_design_capacity(value)?,
                }
            }
        }
        self.recorder.set_config(self.settings.recording());
        if self.settings.path().is_none() {
            debug!("no configuration file; change lasts for this run only");
        }
        write!(out, "{}", SettingsView(self.config()))?;
        Ok(())
    }

    /// Re-read the configuration file and hand the new recording settings to
    /// the recorder.
    pub fn reload(&mut self) -> Result<(), Error> {
        self.settings.reload()?;
        self.recorder.set_config(self.settings.recording());
        info!(recording = ?self.settings.recording(), "configuration reloaded");
        Ok(())
    }

    /// One refresh: read, record, redraw.
    async fn refresh(&self, manual: bool, out: &mut impl Write) -> anyhow::Result<()> {
        let Some(snapshot) = self.snapshot() else {
            writeln!(out, "{}", Error::NoTelemetry)?;
            return Ok(());
        };
        let outcome = self.recorder.record_snapshot(manual, &snapshot).await;
        if manual || outcome.is_recorded() {
            writeln!(out, "{}", render::outcome(&outcome))?;
        }
        self.render_home(&snapshot, out).await?;
        writeln!(out)?;
        out.flush()?;
        Ok(())
    }

    fn refresh_interval(&self, interval: Option<Duration>) -> Duration {
        refresh_period(interval, self.config().display.refresh_interval)
    }

    async fn watch(&mut self, interval: Option<Duration>, out: &mut impl Write) -> anyhow::Result<()> {
        let (events_tx, events_rx) = bounded(8);
        let signals = tokio::spawn(async move { wait_for_signal(&events_tx).await });

        let mut period = self.refresh_interval(interval);
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(?period, "watching battery");

        // One reading up front even when auto refresh is off.
        if !self.config().display.auto_refresh {
            self.refresh(false, out).await?;
        }

        let result = loop {
            tokio::select! {
                _ = ticker.tick(), if self.config().display.auto_refresh => {
                    if let Err(err) = self.refresh(false, out).await {
                        break Err(err);
                    }
                }
                event = events_rx.recv_async() => {
                    let Ok(event) = event else {
                        break Err(anyhow!("signal listener stopped"));
                    };
                    debug!(?event, "Received signal event");
                    match event {
                        SignalEvent::Capture => {
                            if let Err(err) = self.refresh(true, out).await {
                                break Err(err);
                            }
                        }
                        SignalEvent::Reload => {
                            if let Err(err) = self.reload() {
                                warn!(%err, "keeping previous configuration");
                                continue;
                            }
                            let next = self.refresh_interval(interval);
                            if next != period {
                                period = next;
                                ticker = tokio::time::interval(period);
                                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                                info!(?period, "refresh interval changed");
                            }
                        }
                    }
                }
                res = tokio::signal::ctrl_c() => {
                    break res.map_err(|err| anyhow::Error::from(Error::SignalHandler(err)));
                }
            }
        };

        signals.abort();
        match signals.await {
            Ok(Err(err)) => Err(err.into()),
            _ => result,
        }
    }
}

/// The watch period: the `--interval` flag, else the configured interval.
/// A configured zero falls back to the default.
fn refresh_period(flag: Option<Duration>, configured: Duration) -> Duration {
    if let Some(flag) = flag {
        return flag;
    }
    if configured.is_zero() {
        let fallback = config::Display::default().refresh_interval;
        warn!(?fallback, "refresh_interval must be positive; using default");
        return fallback;
    }
    configured
}
