//! TRMNL delivery: view model, webhook, pipeline and scheduler.

pub mod pipeline;
pub mod scheduler;
pub mod view;
pub mod webhook;

pub use pipeline::WeatherPipeline;
pub use scheduler::{Scheduler, SchedulerHandle, SchedulerPeriods, SchedulerStatus};
pub use view::{aqi_status, uv_status, QuoteView, TrmnlView};
pub use webhook::TrmnlWebhook;
