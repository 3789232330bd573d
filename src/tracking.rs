use std::fmt::{Display, Formatter};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use smartstring::alias::String as SmartString;
use crate::error::{FileDataError, Result};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum TrackingType { Insert, Delete }

impl TrackingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackingType::Insert => "insert",
            TrackingType::Delete => "delete",
        }
    }
}

impl Display for TrackingType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who made a tracked change, when, and whether it was an insert or a delete.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTrackingProps", into = "RawTrackingProps")]
pub struct TrackingProps {
    pub kind: TrackingType,
    pub user_id: SmartString,
    pub ts: DateTime<Utc>,
}

/// Marker used on retains to strip tracking from a span without tracking anything new.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub struct ClearTrackingProps;

/// What a retain component does to the tracked changes it passes over.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTrackingProps", into = "RawTrackingProps")]
pub enum TrackingDirective {
    Track(TrackingProps),
    Clear(ClearTrackingProps),
}

/// Wire form shared by tracking props and the clear marker. `{type: "none"}` is the clear marker,
/// anything else must carry a user id and timestamp.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTrackingProps {
    #[serde(rename = "type")]
    pub kind: SmartString,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<SmartString>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ts: Option<String>,
}

pub(crate) fn format_ts(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub(crate) fn parse_ts(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|_| FileDataError::InvalidTimestamp(s.to_string()))
}

impl TrackingProps {
    pub fn new(kind: TrackingType, user_id: &str, ts: DateTime<Utc>) -> Self {
        TrackingProps { kind, user_id: user_id.into(), ts }
    }

    /// Tracking from the same user of the same kind can be glued together.
    pub fn can_merge(&self, other: &TrackingProps) -> bool {
        self.kind == other.kind && self.user_id == other.user_id
    }

    /// Merged props keep the later of the two timestamps.
    pub fn merged_with(&self, other: &TrackingProps) -> TrackingProps {
        TrackingProps {
            kind: self.kind,
            user_id: self.user_id.clone(),
            ts: self.ts.max(other.ts),
        }
    }

    pub fn to_raw(&self) -> RawTrackingProps {
        RawTrackingProps {
            kind: self.kind.as_str().into(),
            user_id: Some(self.user_id.clone()),
            ts: Some(format_ts(&self.ts)),
        }
    }

    pub fn from_raw(raw: RawTrackingProps) -> Result<Self> {
        let kind = match raw.kind.as_str() {
            "insert" => TrackingType::Insert,
            "delete" => TrackingType::Delete,
            other => return Err(FileDataError::UnknownTrackingType(other.to_string())),
        };
        let user_id = raw.user_id
            .ok_or_else(|| FileDataError::UnknownTrackingType(format!("{} without userId", raw.kind)))?;
        let ts = raw.ts
            .ok_or_else(|| FileDataError::InvalidTimestamp(String::new()))?;

        Ok(TrackingProps { kind, user_id, ts: parse_ts(&ts)? })
    }
}

impl ClearTrackingProps {
    pub fn to_raw(&self) -> RawTrackingProps {
        RawTrackingProps { kind: "none".into(), user_id: None, ts: None }
    }
}

impl TrackingDirective {
    pub fn is_clear(&self) -> bool {
        matches!(self, TrackingDirective::Clear(_))
    }

    /// The props to track the span with, if any.
    pub fn props(&self) -> Option<&TrackingProps> {
        match self {
            TrackingDirective::Track(props) => Some(props),
            TrackingDirective::Clear(_) => None,
        }
    }

    pub fn to_raw(&self) -> RawTrackingProps {
        match self {
            TrackingDirective::Track(props) => props.to_raw(),
            TrackingDirective::Clear(clear) => clear.to_raw(),
        }
    }

    pub fn from_raw(raw: RawTrackingProps) -> Result<Self> {
        if raw.kind == "none" {
            Ok(TrackingDirective::Clear(ClearTrackingProps))
        } else {
            TrackingProps::from_raw(raw).map(TrackingDirective::Track)
        }
    }
}

impl From<TrackingProps> for TrackingDirective {
    fn from(props: TrackingProps) -> Self {
        TrackingDirective::Track(props)
    }
}

impl From<ClearTrackingProps> for TrackingDirective {
    fn from(clear: ClearTrackingProps) -> Self {
        TrackingDirective::Clear(clear)
    }
}

impl TryFrom<RawTrackingProps> for TrackingProps {
    type Error = FileDataError;
    fn try_from(raw: RawTrackingProps) -> Result<Self> { TrackingProps::from_raw(raw) }
}

impl From<TrackingProps> for RawTrackingProps {
    fn from(props: TrackingProps) -> Self { props.to_raw() }
}

impl TryFrom<RawTrackingProps> for TrackingDirective {
    type Error = FileDataError;
    fn try_from(raw: RawTrackingProps) -> Result<Self> { TrackingDirective::from_raw(raw) }
}

impl From<TrackingDirective> for RawTrackingProps {
    fn from(directive: TrackingDirective) -> Self { directive.to_raw() }
}
