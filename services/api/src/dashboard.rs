//! Dashboard Data Sources
//!
//! Aggregate call metrics and call recordings are served from a pluggable
//! [`DashboardSource`]. No call history is persisted by this service, so the
//! bundled [`MockDashboardSource`] returns representative fixed data.

use crate::models::{CallRecording, CallVolumePoint, DashboardMetrics, LanguageShare};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{Duration, Utc};

/// A backing store for the dashboard endpoints.
#[async_trait]
pub trait DashboardSource: Send + Sync {
    async fn metrics(&self) -> Result<DashboardMetrics>;

    async fn recordings(&self) -> Result<Vec<CallRecording>>;
}

/// Fixed sample data for development and demos.
pub struct MockDashboardSource;

#[async_trait]
impl DashboardSource for MockDashboardSource {
    async fn metrics(&self) -> Result<DashboardMetrics> {
        let call_volume_data = [
            ("Mon", 45, 120),
            ("Tue", 52, 135),
            ("Wed", 38, 98),
            ("Thu", 61, 156),
            ("Fri", 55, 142),
            ("Sat", 28, 78),
            ("Sun", 33, 89),
        ]
        .into_iter()
        .map(|(name, calls, duration)| CallVolumePoint {
            name: name.to_string(),
            calls,
            duration,
        })
        .collect();

        let language_distribution = [("English", 65), ("Hindi", 20), ("Bengali", 10), ("Others", 5)]
            .into_iter()
            .map(|(name, value)| LanguageShare {
                name: name.to_string(),
                value,
            })
            .collect();

        Ok(DashboardMetrics {
            total_calls: 1247,
            active_sessions: 12,
            avg_response_time: 1.8,
            success_rate: 94.2,
            call_volume_data,
            language_distribution,
        })
    }

    async fn recordings(&self) -> Result<Vec<CallRecording>> {
        let now = Utc::now();
        Ok(vec![
            CallRecording {
                id: "1".to_string(),
                timestamp: now - Duration::hours(2),
                duration: 245,
                language: "English".to_string(),
                status: "completed".to_string(),
                participant_id: "user_123".to_string(),
                transcription: Some("Hello, I need help with my account...".to_string()),
                sentiment: Some("neutral".to_string()),
                audio_url: None,
            },
            CallRecording {
                id: "2".to_string(),
                timestamp: now - Duration::hours(3),
                duration: 180,
                language: "Hindi".to_string(),
                status: "completed".to_string(),
                participant_id: "user_456".to_string(),
                transcription: Some("मुझे अपने बिल के बारे में जानकारी चाहिए...".to_string()),
                sentiment: Some("positive".to_string()),
                audio_url: None,
            },
        ])
    }
}
