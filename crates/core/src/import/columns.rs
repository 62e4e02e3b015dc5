//! Header-to-field dictionaries.
//!
//! Source spreadsheets label the same column many ways, in English and
//! Mongolian. Each channel also has a few specific columns that land in the
//! generic `metric_1..3` / `sub_channel` slots.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Media channel declared for an uploaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    /// Television.
    #[serde(rename = "TV")]
    Tv,
    /// Out-of-home (billboards).
    #[serde(rename = "OOH")]
    Ooh,
    /// Radio.
    #[serde(rename = "FM")]
    Fm,
    /// Online.
    Digital,
    /// Newspapers and magazines.
    Print,
    /// Events and activations.
    Event,
    /// Anything else; no channel-specific columns.
    Other,
}

impl Channel {
    /// Every channel.
    pub const ALL: [Self; 7] = [
        Self::Tv,
        Self::Ooh,
        Self::Fm,
        Self::Digital,
        Self::Print,
        Self::Event,
        Self::Other,
    ];

    /// Returns the canonical display name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Tv => "TV",
            Self::Ooh => "OOH",
            Self::Fm => "FM",
            Self::Digital => "Digital",
            Self::Print => "Print",
            Self::Event => "Event",
            Self::Other => "Other",
        }
    }

    /// Parses a channel name, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical budget item field a header can map to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    /// Budget code.
    BudgetCode,
    /// Campaign name.
    CampaignName,
    /// Vendor or agency.
    Vendor,
    /// Planned amount.
    AmountPlanned,
    /// Start date.
    StartDate,
    /// End date.
    EndDate,
    /// Free-text description.
    Description,
    /// Responsible specialist (username).
    Specialist,
    /// Channel-specific sub-channel (TV station, venue, platform).
    SubChannel,
    /// First channel-specific metric.
    #[serde(rename = "metric_1")]
    Metric1,
    /// Second channel-specific metric.
    #[serde(rename = "metric_2")]
    Metric2,
    /// Third channel-specific metric.
    #[serde(rename = "metric_3")]
    Metric3,
}

impl Field {
    /// Fields every upload must provide.
    pub const REQUIRED: [Self; 3] = [Self::BudgetCode, Self::CampaignName, Self::AmountPlanned];

    /// Returns the canonical field name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::BudgetCode => "budget_code",
            Self::CampaignName => "campaign_name",
            Self::Vendor => "vendor",
            Self::AmountPlanned => "amount_planned",
            Self::StartDate => "start_date",
            Self::EndDate => "end_date",
            Self::Description => "description",
            Self::Specialist => "specialist",
            Self::SubChannel => "sub_channel",
            Self::Metric1 => "metric_1",
            Self::Metric2 => "metric_2",
            Self::Metric3 => "metric_3",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

use Field::{
    AmountPlanned, BudgetCode, CampaignName, Description, EndDate, Metric1, Metric2, Metric3,
    Specialist, StartDate, SubChannel, Vendor,
};

const COMMON: &[(&str, Field)] = &[
    ("budget code", BudgetCode),
    ("budgetcode", BudgetCode),
    ("budget_code", BudgetCode),
    ("төсвийн код", BudgetCode),
    ("төсвийн_код", BudgetCode),
    ("код", BudgetCode),
    ("campaign name", CampaignName),
    ("campaign", CampaignName),
    ("campaign_name", CampaignName),
    ("кампанит ажил", CampaignName),
    ("кампанит", CampaignName),
    ("нэр", CampaignName),
    ("vendor", Vendor),
    ("company", Vendor),
    ("supplier", Vendor),
    ("agency", Vendor),
    ("компани", Vendor),
    ("нийлүүлэгч", Vendor),
    ("агентлаг", Vendor),
    ("amount", AmountPlanned),
    ("amount_planned", AmountPlanned),
    ("planned amount", AmountPlanned),
    ("budget", AmountPlanned),
    ("total", AmountPlanned),
    ("cost", AmountPlanned),
    ("нийт дүн", AmountPlanned),
    ("дүн", AmountPlanned),
    ("төсөв", AmountPlanned),
    ("нийт", AmountPlanned),
    ("зардал", AmountPlanned),
    ("start date", StartDate),
    ("start_date", StartDate),
    ("from", StartDate),
    ("from date", StartDate),
    ("эхлэх огноо", StartDate),
    ("эхлэх", StartDate),
    ("end date", EndDate),
    ("end_date", EndDate),
    ("to", EndDate),
    ("to date", EndDate),
    ("дуусах огноо", EndDate),
    ("дуусах", EndDate),
    ("description", Description),
    ("note", Description),
    ("notes", Description),
    ("comment", Description),
    ("тайлбар", Description),
    ("тэмдэглэл", Description),
    ("specialist", Specialist),
    ("responsible", Specialist),
    ("мэргэжилтэн", Specialist),
    ("хариуцагч", Specialist),
    ("sub channel", SubChannel),
    ("sub_channel", SubChannel),
    ("metric_1", Metric1),
    ("metric_2", Metric2),
    ("metric_3", Metric3),
];

const TV: &[(&str, Field)] = &[
    ("duration", Metric1),
    ("spot length", Metric1),
    ("хугацаа", Metric1),
    ("секунд", Metric1),
    ("frequency", Metric2),
    ("spots", Metric2),
    ("airings", Metric2),
    ("давтамж", Metric2),
    ("тоо", Metric2),
    ("grp", Metric3),
    ("rating", Metric3),
    ("channel name", SubChannel),
    ("tv channel", SubChannel),
    ("суваг", SubChannel),
];

const OOH: &[(&str, Field)] = &[
    ("size", Metric1),
    ("dimensions", Metric1),
    ("хэмжээ", Metric1),
    ("quantity", Metric2),
    ("qty", Metric2),
    ("count", Metric2),
    ("тоо хэмжээ", Metric2),
    ("ширхэг", Metric2),
    ("location", SubChannel),
    ("address", SubChannel),
    ("байршил", SubChannel),
    ("хаяг", SubChannel),
];

const FM: &[(&str, Field)] = &[
    ("duration", Metric1),
    ("length", Metric1),
    ("хугацаа", Metric1),
    ("frequency", Metric2),
    ("spots per day", Metric2),
    ("давтамж", Metric2),
    ("station", SubChannel),
    ("radio", SubChannel),
    ("станц", SubChannel),
];

const DIGITAL: &[(&str, Field)] = &[
    ("impressions", Metric1),
    ("views", Metric1),
    ("харагдалт", Metric1),
    ("clicks", Metric2),
    ("click", Metric2),
    ("дарах", Metric2),
    ("platform", SubChannel),
    ("media", SubChannel),
    ("платформ", SubChannel),
];

const PRINT: &[(&str, Field)] = &[
    ("size", Metric1),
    ("хэмжээ", Metric1),
    ("insertions", Metric2),
    ("issues", Metric2),
    ("тоо", Metric2),
    ("publication", SubChannel),
    ("сонин", SubChannel),
    ("сэтгүүл", SubChannel),
];

const EVENT: &[(&str, Field)] = &[
    ("attendees", Metric1),
    ("capacity", Metric1),
    ("оролцогчид", Metric1),
    ("days", Metric2),
    ("өдөр", Metric2),
    ("venue", SubChannel),
    ("location", SubChannel),
    ("байршил", SubChannel),
];

fn channel_map(channel: Channel) -> &'static [(&'static str, Field)] {
    match channel {
        Channel::Tv => TV,
        Channel::Ooh => OOH,
        Channel::Fm => FM,
        Channel::Digital => DIGITAL,
        Channel::Print => PRINT,
        Channel::Event => EVENT,
        Channel::Other => &[],
    }
}

/// Lower-case, trim, and collapse runs of whitespace to one space.
#[must_use]
pub fn normalize_header(header: &str) -> String {
    header
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Map a header cell to a canonical field. Channel entries win over common ones.
#[must_use]
pub fn map_header(header: &str, channel: Channel) -> Option<Field> {
    let key = normalize_header(header);
    if key.is_empty() {
        return None;
    }
    let lookup = |table: &[(&str, Field)]| {
        table
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, field)| *field)
    };
    lookup(channel_map(channel)).or_else(|| lookup(COMMON))
}

/// Display labels for the generic per-channel columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricLabels {
    /// Label for `metric_1`.
    pub metric_1: Option<&'static str>,
    /// Label for `metric_2`.
    pub metric_2: Option<&'static str>,
    /// Label for `metric_3`.
    pub metric_3: Option<&'static str>,
    /// Label for `sub_channel`.
    pub sub_channel: Option<&'static str>,
}

/// Labels a grid should show for `metric_1..3` and `sub_channel`.
#[must_use]
pub const fn metric_labels(channel: Channel) -> MetricLabels {
    let (metric_1, metric_2, metric_3, sub_channel) = match channel {
        Channel::Tv => (
            Some("Duration (sec)"),
            Some("Frequency (spots)"),
            Some("GRP"),
            Some("TV Channel"),
        ),
        Channel::Fm => (
            Some("Duration (sec)"),
            Some("Frequency (spots)"),
            None,
            Some("Radio Station"),
        ),
        Channel::Ooh => (Some("Size"), Some("Quantity"), None, Some("Location")),
        Channel::Digital => (Some("Impressions"), Some("Clicks"), None, Some("Platform")),
        Channel::Print => (Some("Ad Size"), Some("Insertions"), None, Some("Publication")),
        Channel::Event => (Some("Attendees"), Some("Days"), None, Some("Venue")),
        Channel::Other => (None, None, None, None),
    };
    MetricLabels {
        metric_1,
        metric_2,
        metric_3,
        sub_channel,
    }
}
