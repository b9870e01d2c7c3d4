//! # Rollcall Analytics
//!
//! Attendance aggregation engine behind the analytics endpoint.
//!
//! One batch of attendance events, fetched once per request from an
//! [`AttendanceSource`], is reduced independently into time-series,
//! late-arrival, pattern, streak, department, risk-level and summary views.
//! Every bucketed view derives keys with the same [`BucketKeyDeriver`] and is
//! densified by the same [`FillPlan`], so they always report one bucket set.
//! Complete bundles are cached per filter signature by [`AnalyticsCache`].

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod aggregator;
pub mod bucket;
pub mod cache;
pub mod department;
pub mod fill;
pub mod filter;
pub mod range;
pub mod risk;
pub mod service;
pub mod source;
pub mod streak;
pub mod summary;
pub mod types;

pub use aggregator::{moving_average, AggregationManager, BucketedReducer, DataAggregator};
pub use bucket::{BucketKey, BucketKeyDeriver, Granularity, StatusCounts};
pub use cache::{AnalyticsCache, CacheConfig, CacheStats};
pub use fill::FillPlan;
pub use filter::{AnalyticsFilter, AnalyticsQuery, RiskLevel, TimeRange};
pub use range::{Clock, FixedClock, ResolvedRange, SystemClock};
pub use service::{AnalyticsService, AnalyticsSettings};
pub use source::{AttendanceSource, Dataset, InMemorySource, RecordQuery};
pub use types::*;
