use serde::{Deserialize, Serialize};

/// Advertised name of the reference device.
pub const DEFAULT_DEVICE_NAME: &str = "CRANE 3-S_F67F";
/// Characteristic that accepts command frames on the reference device.
pub const DEFAULT_WRITE_CHANNEL: &str = "d44bc439-abfd-45a2-b575-925416129600";
/// Characteristic that emits telemetry notifications on the reference device.
pub const DEFAULT_NOTIFY_CHANNEL: &str = "d44bc439-abfd-45a2-b575-925416129601";

/// Identifiers the wireless stack uses to bind a transport to a device.
///
/// Opaque to the protocol core: they are carried for the adapter that opens
/// the link and surfaced in diagnostics, never interpreted here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelBinding {
    /// Advertised device name used during discovery.
    pub device_name: String,
    /// Write channel identifier.
    pub write_channel: String,
    /// Notify channel identifier.
    pub notify_channel: String,
}

impl Default for ChannelBinding {
    fn default() -> Self {
        Self {
            device_name: DEFAULT_DEVICE_NAME.to_string(),
            write_channel: DEFAULT_WRITE_CHANNEL.to_string(),
            notify_channel: DEFAULT_NOTIFY_CHANNEL.to_string(),
        }
    }
}
