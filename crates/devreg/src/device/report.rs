//! Plain-text device report.

use super::models::Device;

/// A rendered report ready for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceReport {
    pub filename: String,
    pub body: String,
}

impl DeviceReport {
    pub fn new(device: &Device) -> Self {
        let body = format!(
            "ID: {}\nName: {}\nLocation: {}\nType: {}\nModel: {}\nSerial Number: {}\nOwner: {}\n",
            device.id,
            device.name,
            device.location,
            device.device_type,
            device.model,
            device.serial_number,
            device.owner,
        );

        Self {
            filename: format!("{}.txt", device.name),
            body,
        }
    }

    /// `Content-Disposition` value for an attachment download.
    ///
    /// Non-ASCII names get an RFC 5987 `filename*` parameter next to an
    /// ASCII fallback.
    pub fn content_disposition(&self) -> String {
        let fallback: String = self
            .filename
            .chars()
            .map(|c| if c.is_ascii() && !c.is_ascii_control() { c } else { '_' })
            .collect();
        let quoted = fallback.replace('\\', "\\\\").replace('"', "\\\"");

        if self.filename.is_ascii() {
            format!("attachment; filename=\"{quoted}\"")
        } else {
            format!(
                "attachment; filename=\"{quoted}\"; filename*=UTF-8''{}",
                urlencoding::encode(&self.filename)
            )
        }
    }
}
