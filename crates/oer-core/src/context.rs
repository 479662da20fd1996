use oer_core_types::Correlation;

use crate::config::OerConfig;
use crate::model::LicenseRegistry;

/// Everything an operation needs besides its arguments and the database
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub correlation: Correlation,
    /// User performing the operation; 0 for scheduled jobs
    pub current_user_id: i64,
    pub config: OerConfig,
    pub licenses: LicenseRegistry,
}

impl RequestContext {
    pub fn new(config: OerConfig) -> Self {
        Self {
            correlation: Correlation::new(),
            current_user_id: 0,
            config,
            licenses: LicenseRegistry::default(),
        }
    }

    pub fn with_user(mut self, user_id: i64) -> Self {
        self.current_user_id = user_id;
        self
    }

    pub fn with_licenses(mut self, licenses: LicenseRegistry) -> Self {
        self.licenses = licenses;
        self
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new(OerConfig::default())
    }
}
