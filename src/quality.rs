// Connection quality grading. Pure functions over a snapshot; no state.

use serde::{Deserialize, Serialize};

use crate::models::NetworkState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionQuality {
    Excellent,
    Good,
    Fair,
    Poor,
    Disconnected,
}

/// Presentation hint for a status icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Happy,
    Neutral,
    Sad,
}

impl ConnectionQuality {
    /// Rules are checked in order; the first match wins.
    pub fn classify(state: &NetworkState) -> Self {
        if !state.is_connected {
            return ConnectionQuality::Disconnected;
        }

        let rssi = state.wifi.rssi;
        let packet_loss = state.internet.packet_loss;
        let latency = state.internet.latency;

        if packet_loss > 10.0 || rssi < -80 {
            ConnectionQuality::Poor
        } else if rssi < -70 || latency > 100.0 || packet_loss > 5.0 {
            ConnectionQuality::Fair
        } else if rssi < -60 {
            ConnectionQuality::Good
        } else {
            ConnectionQuality::Excellent
        }
    }

    pub fn mood(&self) -> Mood {
        match self {
            ConnectionQuality::Excellent | ConnectionQuality::Good => Mood::Happy,
            ConnectionQuality::Fair => Mood::Neutral,
            ConnectionQuality::Poor | ConnectionQuality::Disconnected => Mood::Sad,
        }
    }

    /// CSS-style colour name.
    pub fn color(&self) -> &'static str {
        match self {
            ConnectionQuality::Excellent | ConnectionQuality::Good => "green",
            ConnectionQuality::Fair => "yellow",
            ConnectionQuality::Poor => "orange",
            ConnectionQuality::Disconnected => "red",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ConnectionQuality::Excellent => "Excellent",
            ConnectionQuality::Good => "Good",
            ConnectionQuality::Fair => "Fair",
            ConnectionQuality::Poor => "Poor",
            ConnectionQuality::Disconnected => "Disconnected",
        }
    }
}

/// Grade of the radio signal alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalQuality {
    Excellent,
    Good,
    Fair,
    Weak,
    Poor,
}

impl SignalQuality {
    pub fn from_rssi(rssi: i32) -> Self {
        match rssi {
            r if r >= -50 => SignalQuality::Excellent,
            -60..=-51 => SignalQuality::Good,
            -70..=-61 => SignalQuality::Fair,
            -80..=-71 => SignalQuality::Weak,
            _ => SignalQuality::Poor,
        }
    }

    pub fn advice(&self) -> &'static str {
        match self {
            SignalQuality::Excellent => {
                "Your signal is excellent. You should experience optimal performance."
            }
            SignalQuality::Good => "Your signal is good. Performance should be reliable.",
            SignalQuality::Fair => "Your signal is fair. Consider moving closer to your router.",
            SignalQuality::Weak => {
                "Your signal is weak. Try moving closer to your router or reducing interference."
            }
            SignalQuality::Poor => "Your signal is very weak. Connection may be unreliable.",
        }
    }
}

/// Grade of a round-trip latency in ms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LatencyQuality {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl LatencyQuality {
    pub fn from_latency(latency_ms: f64) -> Self {
        if latency_ms < 20.0 {
            LatencyQuality::Excellent
        } else if latency_ms < 50.0 {
            LatencyQuality::Good
        } else if latency_ms < 100.0 {
            LatencyQuality::Fair
        } else {
            LatencyQuality::Poor
        }
    }
}
