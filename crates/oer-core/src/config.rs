//! Runtime configuration.
//!
//! Loaded from TOML once at startup and passed explicitly through
//! [`RequestContext`](crate::context::RequestContext). Textual settings
//! (required fields, license replacements, release dates) are parsed into
//! typed views; `from_toml_str` rejects anything those views cannot read.

use chrono::{DateTime, Datelike, Days, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::errors::{OerError, Result};
use crate::release::profile::ApplicationProfile;

/// Prefix of required-field entries that name a classification plugin
pub const CLASSIFICATION_PREFIX: &str = "oerclassification_";

/// A configurable release requirement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequiredField {
    Description,
    Context,
    Tags,
    Language,
    Resourcetype,
    Classification(String),
}

impl RequiredField {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "description" => Some(RequiredField::Description),
            "context" => Some(RequiredField::Context),
            "tags" => Some(RequiredField::Tags),
            "language" => Some(RequiredField::Language),
            "resourcetype" => Some(RequiredField::Resourcetype),
            other => other
                .strip_prefix(CLASSIFICATION_PREFIX)
                .filter(|plugin| !plugin.is_empty())
                .map(|plugin| RequiredField::Classification(plugin.to_string())),
        }
    }

    /// Key under which the field is reported in requirement results
    pub fn key(&self) -> String {
        match self {
            RequiredField::Description => "description".into(),
            RequiredField::Context => "context".into(),
            RequiredField::Tags => "tags".into(),
            RequiredField::Language => "language".into(),
            RequiredField::Resourcetype => "resourcetype".into(),
            RequiredField::Classification(plugin) => format!("{}{}", CLASSIFICATION_PREFIX, plugin),
        }
    }
}

/// Parse the ordered comma-separated required-field list.
///
/// Unknown names are dropped with a warning.
pub fn parse_required_fields(raw: &str) -> Vec<RequiredField> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .filter_map(|name| {
            let parsed = RequiredField::parse(name);
            if parsed.is_none() {
                tracing::warn!(field = name, "ignoring unknown required field");
            }
            parsed
        })
        .collect()
}

/// Parse `shortname=>replacement` lines.
///
/// # Errors
///
/// `OerError::Config` for a non-empty line without `=>`.
pub fn parse_license_replacements(raw: &str) -> Result<BTreeMap<String, String>> {
    let mut map = BTreeMap::new();
    for line in raw.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let (from, to) = line.split_once("=>").ok_or_else(|| OerError::Config {
            reason: format!("license replacement line without '=>': {}", line),
        })?;
        map.insert(from.trim().to_string(), to.trim().to_string());
    }
    Ok(map)
}

/// How often the release job runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseFrequency {
    #[default]
    Daily,
    Weekly,
    Monthly,
    Custom,
}

/// A day of the year written `DD.MM`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CustomDate {
    pub day: u32,
    pub month: u32,
}

impl CustomDate {
    /// # Errors
    ///
    /// `OerError::Config` unless the input is `DD.MM` with a plausible day and month.
    pub fn parse(raw: &str) -> Result<Self> {
        let invalid = || OerError::Config {
            reason: format!("release date must be DD.MM: {}", raw),
        };
        let (day, month) = raw.trim().split_once('.').ok_or_else(invalid)?;
        let day: u32 = day.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        // 2024 is a leap year, so 29.02 is accepted here
        NaiveDate::from_ymd_opt(2024, month, day).ok_or_else(invalid)?;
        Ok(Self { day, month })
    }

    /// The date in `year`; `None` for 29.02 in a common year
    pub fn in_year(&self, year: i32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(year, self.month, self.day)
    }
}

/// Raw `[release]` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReleaseConfig {
    pub frequency: ReleaseFrequency,
    pub custom_dates: Vec<String>,
    pub hour: u32,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            frequency: ReleaseFrequency::Daily,
            custom_dates: Vec::new(),
            hour: 2,
        }
    }
}

/// Parsed release schedule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseSchedule {
    pub frequency: ReleaseFrequency,
    pub custom_dates: Vec<CustomDate>,
    pub hour: u32,
}

impl ReleaseSchedule {
    /// Whether a release should run at `now` given the last completed run.
    ///
    /// A run is due once the start of the current period (day, ISO week,
    /// month or latest custom date, each at `hour`) has passed and no run
    /// happened since.
    pub fn is_due(&self, now: DateTime<Utc>, last_run: Option<DateTime<Utc>>) -> bool {
        match self.period_start(now) {
            Some(start) if now >= start => last_run.map_or(true, |last| last < start),
            _ => false,
        }
    }

    fn period_start(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let today = now.date_naive();
        let date = match self.frequency {
            ReleaseFrequency::Daily => today,
            ReleaseFrequency::Weekly => {
                let back = u64::from(today.weekday().num_days_from_monday());
                today.checked_sub_days(Days::new(back))?
            }
            ReleaseFrequency::Monthly => today.with_day(1)?,
            ReleaseFrequency::Custom => self
                .custom_dates
                .iter()
                .filter_map(|d| d.in_year(today.year()))
                .filter(|d| *d <= today)
                .max()?,
        };
        let at = date.and_hms_opt(self.hour, 0, 0)?;
        Some(Utc.from_utc_datetime(&at))
    }
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OerConfig {
    /// Ordered, comma-separated extra release requirements
    pub required_fields: String,
    /// Enabled classification plugins; requirements on others are ignored
    pub classification_plugins: Vec<String>,
    /// Include course custom fields in course metadata
    pub course_customfields: bool,
    /// Minimum visibility a custom field needs to be included
    pub customfield_visibility: i64,
    /// `shortname` or `category:shortname` entries to leave out
    pub customfield_ignore: Vec<String>,
    pub license_replacement: String,
    pub release: ReleaseConfig,
    pub application_profile: String,
    pub platform: String,
    pub instance_host: String,
    pub public_base_url: String,
}

impl Default for OerConfig {
    fn default() -> Self {
        Self {
            required_fields: String::new(),
            classification_plugins: Vec::new(),
            course_customfields: false,
            customfield_visibility: 2,
            customfield_ignore: Vec::new(),
            license_replacement: String::new(),
            release: ReleaseConfig::default(),
            application_profile: ApplicationProfile::Current.version().to_string(),
            platform: "moodle".to_string(),
            instance_host: "localhost".to_string(),
            public_base_url: "http://localhost".to_string(),
        }
    }
}

impl OerConfig {
    /// # Errors
    ///
    /// `OerError::Config` when the TOML is invalid or a textual setting does not parse.
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let config: OerConfig = toml::from_str(input).map_err(|e| OerError::Config {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// `OerError::Config` if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let input = std::fs::read_to_string(path).map_err(|e| OerError::Config {
            reason: format!("cannot read {}: {}", path.display(), e),
        })?;
        Self::from_toml_str(&input)
    }

    /// # Errors
    ///
    /// `OerError::Config` naming the first setting that does not parse.
    pub fn validate(&self) -> Result<()> {
        parse_license_replacements(&self.license_replacement)?;
        self.release_schedule()?;
        self.application_profile()?;
        if self.release.hour > 23 {
            return Err(OerError::Config {
                reason: format!("release hour out of range: {}", self.release.hour),
            });
        }
        Ok(())
    }

    /// Configured requirements, minus classifications of disabled plugins.
    pub fn required_fields(&self) -> Vec<RequiredField> {
        parse_required_fields(&self.required_fields)
            .into_iter()
            .filter(|field| match field {
                RequiredField::Classification(plugin) => {
                    let enabled = self.classification_plugins.iter().any(|p| p == plugin);
                    if !enabled {
                        tracing::warn!(
                            field = field.key().as_str(),
                            "ignoring requirement of disabled classification plugin"
                        );
                    }
                    enabled
                }
                _ => true,
            })
            .collect()
    }

    /// # Errors
    ///
    /// See [`parse_license_replacements`].
    pub fn license_replacements(&self) -> Result<BTreeMap<String, String>> {
        parse_license_replacements(&self.license_replacement)
    }

    /// # Errors
    ///
    /// `OerError::Config` for a malformed custom date.
    pub fn release_schedule(&self) -> Result<ReleaseSchedule> {
        let custom_dates = self
            .release
            .custom_dates
            .iter()
            .map(|d| CustomDate::parse(d))
            .collect::<Result<Vec<_>>>()?;
        Ok(ReleaseSchedule {
            frequency: self.release.frequency,
            custom_dates,
            hour: self.release.hour,
        })
    }

    /// # Errors
    ///
    /// `OerError::Config` for an unsupported profile version.
    pub fn application_profile(&self) -> Result<ApplicationProfile> {
        ApplicationProfile::parse(&self.application_profile).ok_or_else(|| OerError::Config {
            reason: format!("unsupported application profile: {}", self.application_profile),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_required_fields_keep_order_and_drop_unknown() {
        let fields = parse_required_fields("tags, bogus ,description,oerclassification_oefos");
        assert_eq!(
            fields,
            vec![
                RequiredField::Tags,
                RequiredField::Description,
                RequiredField::Classification("oefos".into())
            ]
        );
        assert_eq!(fields[2].key(), "oerclassification_oefos");
    }

    #[test]
    fn test_classification_requirement_needs_enabled_plugin() {
        let disabled = OerConfig {
            required_fields: "tags,oerclassification_oefos".into(),
            ..OerConfig::default()
        };
        assert_eq!(disabled.required_fields(), vec![RequiredField::Tags]);

        let enabled = OerConfig {
            classification_plugins: vec!["oefos".into()],
            ..disabled
        };
        assert_eq!(
            enabled.required_fields(),
            vec![RequiredField::Tags, RequiredField::Classification("oefos".into())]
        );
    }

    #[test]
    fn test_license_replacement_lines() {
        let map = parse_license_replacements("cc-4.0=>CC BY 4.0\n\n public => PD ").unwrap();
        assert_eq!(map.get("cc-4.0").map(String::as_str), Some("CC BY 4.0"));
        assert_eq!(map.get("public").map(String::as_str), Some("PD"));
        assert!(parse_license_replacements("cc-4.0 CC BY").is_err());
    }

    #[test]
    fn test_from_toml() {
        let config = OerConfig::from_toml_str(
            r#"
required_fields = "description,tags"
platform = "moodle"
instance_host = "https://lms.example.org"

[release]
frequency = "custom"
custom_dates = ["01.03", "15.09"]
hour = 4
"#,
        )
        .unwrap();
        assert_eq!(config.required_fields().len(), 2);
        let schedule = config.release_schedule().unwrap();
        assert_eq!(schedule.frequency, ReleaseFrequency::Custom);
        assert_eq!(schedule.custom_dates.len(), 2);
        assert_eq!(config.application_profile().unwrap(), ApplicationProfile::Current);
    }

    #[test]
    fn test_invalid_custom_date_rejected() {
        let result = OerConfig::from_toml_str("[release]\ncustom_dates = [\"31.02\"]\n");
        assert!(matches!(result, Err(OerError::Config { .. })));
    }

    #[test]
    fn test_daily_schedule() {
        let schedule = ReleaseSchedule {
            frequency: ReleaseFrequency::Daily,
            custom_dates: vec![],
            hour: 2,
        };
        assert!(!schedule.is_due(at(2024, 5, 10, 1), None));
        assert!(schedule.is_due(at(2024, 5, 10, 3), None));
        assert!(schedule.is_due(at(2024, 5, 10, 3), Some(at(2024, 5, 9, 2))));
        assert!(!schedule.is_due(at(2024, 5, 10, 5), Some(at(2024, 5, 10, 3))));
    }

    #[test]
    fn test_weekly_schedule_starts_monday() {
        let schedule = ReleaseSchedule {
            frequency: ReleaseFrequency::Weekly,
            custom_dates: vec![],
            hour: 0,
        };
        // 2024-05-13 is a Monday
        let last = Some(at(2024, 5, 13, 1));
        assert!(!schedule.is_due(at(2024, 5, 19, 12), last));
        assert!(schedule.is_due(at(2024, 5, 20, 1), last));
    }

    #[test]
    fn test_custom_schedule() {
        let schedule = ReleaseSchedule {
            frequency: ReleaseFrequency::Custom,
            custom_dates: vec![CustomDate::parse("01.03").unwrap()],
            hour: 2,
        };
        assert!(!schedule.is_due(at(2024, 2, 20, 12), None));
        assert!(schedule.is_due(at(2024, 3, 1, 2), None));
        assert!(!schedule.is_due(at(2024, 6, 1, 2), Some(at(2024, 3, 1, 2))));
    }
}
