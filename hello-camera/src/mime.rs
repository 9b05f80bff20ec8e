//! MIME types a caller may request from a camera

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MimeType {
    Jpeg,
    Png,
    RawRgba,
    RawDepth,
    Pcd,
    /// Empty request string; the camera picks its native format
    #[default]
    Unspecified,
    Other(String),
}

impl MimeType {
    pub fn parse(raw: &str) -> Self {
        // Hosts may append "+lazy" to ask for deferred encoding
        let base = raw.trim().trim_end_matches("+lazy");
        match base {
            "" => MimeType::Unspecified,
            "image/jpeg" => MimeType::Jpeg,
            "image/png" => MimeType::Png,
            "image/vnd.viam.rgba" => MimeType::RawRgba,
            "image/vnd.viam.dep" => MimeType::RawDepth,
            "pointcloud/pcd" => MimeType::Pcd,
            other => MimeType::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            MimeType::Jpeg => "image/jpeg",
            MimeType::Png => "image/png",
            MimeType::RawRgba => "image/vnd.viam.rgba",
            MimeType::RawDepth => "image/vnd.viam.dep",
            MimeType::Pcd => "pointcloud/pcd",
            MimeType::Unspecified => "",
            MimeType::Other(s) => s,
        }
    }
}

impl From<String> for MimeType {
    fn from(raw: String) -> Self {
        MimeType::parse(&raw)
    }
}

impl From<MimeType> for String {
    fn from(mime: MimeType) -> Self {
        mime.as_str().to_string()
    }
}

impl fmt::Display for MimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
