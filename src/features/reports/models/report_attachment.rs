use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Media file attached to a report, kept in submission order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MediaAttachment {
    pub file_id: String,
    pub display_name: String,
    /// Location of the binary in the media store
    pub location: String,
}

/// Recorded voice statement accompanying a report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct VoiceReport {
    /// Location of the audio in the media store
    pub location: String,
}
