//! Background tasks: periodic webhook pushes and quote cache sweeps.
//!
//! Both loops share one cancellation token and skip their first tick, so
//! nothing runs at startup. Failures are logged and recorded in
//! [`SchedulerStatus`]; they never stop a loop.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use trmnl_core::{AppError, SchedulerConfig};
use trmnl_quotes::QuoteService;

use crate::pipeline::WeatherPipeline;
use crate::view::TrmnlView;

/// Scheduled pushes fetch one forecast day so tomorrow's range is filled.
const SCHEDULED_FORECAST_DAYS: u32 = 1;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SchedulerStatus {
    pub enabled: bool,
    pub interval_minutes: u32,
    pub default_location: String,
    pub last_run: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub runs: u64,
}

/// Loop periods. `None` disables a loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerPeriods {
    pub update: Option<Duration>,
    pub sweep: Option<Duration>,
}

impl SchedulerPeriods {
    pub fn from_config(config: &SchedulerConfig) -> Self {
        let minutes = |m: u32| (m > 0).then(|| Duration::from_secs(u64::from(m) * 60));
        Self {
            update: minutes(config.update_interval_minutes).filter(|_| config.enabled),
            sweep: minutes(config.quote_refresh_minutes),
        }
    }
}

pub struct Scheduler {
    pipeline: Arc<WeatherPipeline>,
    periods: SchedulerPeriods,
    status: Arc<Mutex<SchedulerStatus>>,
}

impl Scheduler {
    pub fn new(
        pipeline: Arc<WeatherPipeline>,
        config: &SchedulerConfig,
        default_location: &str,
    ) -> Self {
        Self::with_periods(
            pipeline,
            SchedulerPeriods::from_config(config),
            config.update_interval_minutes,
            default_location,
        )
    }

    pub fn with_periods(
        pipeline: Arc<WeatherPipeline>,
        periods: SchedulerPeriods,
        interval_minutes: u32,
        default_location: &str,
    ) -> Self {
        let status = SchedulerStatus {
            enabled: periods.update.is_some(),
            interval_minutes,
            default_location: default_location.to_string(),
            ..SchedulerStatus::default()
        };

        Self {
            pipeline,
            periods,
            status: Arc::new(Mutex::new(status)),
        }
    }

    /// Spawn the enabled loops on the current runtime.
    pub fn start(self) -> SchedulerHandle {
        let token = CancellationToken::new();
        let mut tasks = Vec::new();

        match self.periods.update {
            Some(period) => {
                tracing::info!(
                    "Scheduled updates every {:?} for {}",
                    period,
                    self.status.lock().default_location
                );
                tasks.push(tokio::spawn(update_loop(
                    self.pipeline.clone(),
                    self.status.clone(),
                    period,
                    token.clone(),
                )));
            }
            None => tracing::info!("Scheduled updates disabled"),
        }

        match (self.periods.sweep, self.pipeline.quotes()) {
            (Some(period), Some(quotes)) => {
                tracing::info!("Quote cache sweep every {:?}", period);
                tasks.push(tokio::spawn(sweep_loop(quotes.clone(), period, token.clone())));
            }
            _ => tracing::debug!("Quote cache sweep not started"),
        }

        SchedulerHandle {
            pipeline: self.pipeline,
            status: self.status,
            token,
            tasks,
        }
    }
}

pub struct SchedulerHandle {
    pipeline: Arc<WeatherPipeline>,
    status: Arc<Mutex<SchedulerStatus>>,
    token: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl SchedulerHandle {
    pub fn status(&self) -> SchedulerStatus {
        self.status.lock().clone()
    }

    /// Run one update for the default location now.
    pub async fn trigger_now(&self) -> Result<TrmnlView, AppError> {
        tracing::info!("Manual update triggered");
        run_update(&self.pipeline, &self.status).await
    }

    /// Cancel both loops and wait for them to finish.
    pub async fn shutdown(self) {
        self.token.cancel();
        for task in self.tasks {
            if let Err(e) = task.await {
                tracing::warn!("Scheduler task ended abnormally: {}", e);
            }
        }
        tracing::info!("Scheduler stopped");
    }
}

async fn update_loop(
    pipeline: Arc<WeatherPipeline>,
    status: Arc<Mutex<SchedulerStatus>>,
    period: Duration,
    token: CancellationToken,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval.tick().await; // Consume initial tick

    loop {
        tokio::select! {
            _ = token.cancelled() => {
                tracing::debug!("Update loop stopping");
                break;
            }
            _ = interval.tick() => {
                // Errors are already recorded in the status
                let _ = run_update(&pipeline, &status).await;
            }
        }
    }
}

async fn sweep_loop(quotes: Arc<QuoteService>, period: Duration, token: CancellationToken) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval.tick().await; // Consume initial tick

    loop {
        tokio::select! {
            _ = token.cancelled() => {
                tracing::debug!("Sweep loop stopping");
                break;
            }
            _ = interval.tick() => {
                quotes.sweep();
            }
        }
    }
}

async fn run_update(
    pipeline: &WeatherPipeline,
    status: &Mutex<SchedulerStatus>,
) -> Result<TrmnlView, AppError> {
    let location = status.lock().default_location.clone();
    let result = pipeline.push(&location, SCHEDULED_FORECAST_DAYS).await;

    let mut status = status.lock();
    status.last_run = Some(Utc::now());
    status.runs += 1;
    match &result {
        Ok(_) => {
            tracing::info!("Scheduled update sent for {}", location);
            status.last_error = None;
        }
        Err(e) => {
            tracing::error!("Scheduled update for {} failed: {}", location, e);
            status.last_error = Some(e.to_string());
        }
    }
    drop(status);

    result
}
