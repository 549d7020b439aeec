//! Domain Errors - constraint compilation failures
//!
//! Contains ONLY compiler errors, not infrastructure errors. Nothing in the
//! domain layer catches or downgrades these; the submission orchestrator
//! translates them into a user-facing status.

use chrono::NaiveDate;
use thiserror::Error;

/// Errors raised while validating a bundle, compiling its payload or
/// resolving warehouse surrogate ids
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Bundle shape: at least one brand is required
    #[error("Bundle contains no brands")]
    EmptyBrandList,

    /// Bundle shape: brands are keyed by name, duplicates would alias ordinals
    #[error("Duplicate brand in bundle: {0}")]
    DuplicateBrand(String),

    /// Bundle shape: duplicate channel label
    #[error("Duplicate channel in bundle: {0}")]
    DuplicateChannel(String),

    /// Bundle shape: multibrand channel outside the channel list
    #[error("Multibrand channel '{0}' is not one of the bundle channels")]
    UnknownMultibrandChannel(String),

    /// Bundle shape: envelope rule for a channel outside the channel list
    #[error("Envelope rule references channel '{0}' which is not one of the bundle channels")]
    UnknownEnvelopeChannel(String),

    /// Bundle shape: segment envelope for a brand outside the brand list
    #[error("Segment envelope references brand '{0}' which is not in the bundle")]
    UnknownEnvelopeBrand(String),

    /// Bundle shape: min/max bound invariant violated
    #[error("Invalid envelope rule for {context}: min={min}, max={max} (need 0 <= min <= max)")]
    InvalidEnvelopeRule { context: String, min: i64, max: i64 },

    /// Bundle shape: capacity must be a finite non-negative number
    #[error("Invalid daily capacity for channel '{channel}': {value}")]
    InvalidCapacity { channel: String, value: f64 },

    /// Bundle shape: brand distribution percentages
    #[error("Invalid brand distribution: {0}")]
    InvalidBrandDistribution(String),

    /// Bundle shape: two channels produce the same interaction key
    #[error("Interaction key {key} produced by both '{first}' and '{second}'")]
    InteractionKeyCollision {
        key: String,
        first: String,
        second: String,
    },

    /// Bundle shape: the same envelope cell entered twice
    #[error("Duplicate envelope rule for {key} on channel '{channel}'")]
    DuplicateEnvelopeRule { channel: String, key: String },

    /// Lookup miss: cycle range text in neither ISO nor "Month Year" form
    #[error("Could not parse cycle range: {0}")]
    UnparsableCycleRange(String),

    /// Lookup miss: single date in neither ISO nor "Month Year" form
    #[error("Could not parse date: {0}")]
    UnparsableDate(String),

    /// Lookup miss: channel label has no DS_CHANNEL row
    #[error("Channel '{0}' not found in channel reference table")]
    ChannelNotFound(String),

    /// Lookup miss: brand name has no DS_BRAND row
    #[error("Brand '{0}' not found in brand reference table")]
    BrandNotFound(String),

    /// Lookup miss: marker brand + indication has no DS_BRAND row
    #[error("No brand id found for {brand} with indication '{indication}'")]
    BrandIndicationNotFound { brand: String, indication: String },

    /// Lookup miss: no sales-line row for the brand/team/mode triple
    #[error("No sales line id found for brand_id={brand_id}, sales_line={sales_line}, occp_type={occp_type}")]
    SalesLineNotFound {
        brand_id: String,
        sales_line: String,
        occp_type: String,
    },

    /// Lookup miss: no master fact row for the sales-line/channel pair
    #[error("No fact id found for sales_table_id '{sales_table_id}' and channel_id '{channel_id}'")]
    FactNotFound {
        sales_table_id: String,
        channel_id: String,
    },

    /// Lookup miss: no time-dimension row for the calendar month
    #[error("No matching cycle id for {input} ({date})")]
    TimeWindowNotFound { input: String, date: NaiveDate },

    /// Configuration: proration divides by the cycle length
    #[error("Cycle length must be at least one month")]
    ZeroLengthCycle,

    /// Configuration: a brand reached key construction without an ordinal
    #[error("Brand '{0}' has no assigned ordinal label")]
    UnassignedOrdinal(String),

    /// Configuration: stored run identifier is malformed
    #[error("Invalid run identifier: {0}")]
    InvalidRunId(String),

    /// Configuration: payload could not be rendered as JSON
    #[error("Payload encoding failed: {0}")]
    PayloadEncoding(String),

    /// Configuration: the reference-data collaborator failed to deliver
    #[error("Reference data unavailable: {0}")]
    ReferenceDataUnavailable(String),
}

/// Domain result type
pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    /// Malformed bundle content that slipped past upstream validation
    pub fn is_input_shape_error(&self) -> bool {
        matches!(
            self,
            DomainError::EmptyBrandList
                | DomainError::DuplicateBrand(_)
                | DomainError::DuplicateChannel(_)
                | DomainError::UnknownMultibrandChannel(_)
                | DomainError::UnknownEnvelopeChannel(_)
                | DomainError::UnknownEnvelopeBrand(_)
                | DomainError::InvalidEnvelopeRule { .. }
                | DomainError::InvalidCapacity { .. }
                | DomainError::InvalidBrandDistribution(_)
                | DomainError::InteractionKeyCollision { .. }
                | DomainError::DuplicateEnvelopeRule { .. }
        )
    }

    /// Reference-table lookups that found no row, or whose key did not parse
    pub fn is_lookup_miss(&self) -> bool {
        matches!(
            self,
            DomainError::ChannelNotFound(_)
                | DomainError::BrandNotFound(_)
                | DomainError::BrandIndicationNotFound { .. }
                | DomainError::SalesLineNotFound { .. }
                | DomainError::FactNotFound { .. }
                | DomainError::TimeWindowNotFound { .. }
                | DomainError::UnparsableCycleRange(_)
                | DomainError::UnparsableDate(_)
        )
    }

    /// Arithmetic or configuration errors
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            DomainError::ZeroLengthCycle
                | DomainError::UnassignedOrdinal(_)
                | DomainError::InvalidRunId(_)
                | DomainError::PayloadEncoding(_)
                | DomainError::ReferenceDataUnavailable(_)
        )
    }

    /// Get error category for status reporting
    pub fn category(&self) -> ErrorCategory {
        if self.is_input_shape_error() {
            ErrorCategory::InputShape
        } else if self.is_lookup_miss() {
            ErrorCategory::LookupMiss
        } else {
            ErrorCategory::Configuration
        }
    }
}

/// Categories of domain errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Bundle data that should have been rejected upstream
    InputShape,
    /// Reference row not found
    LookupMiss,
    /// Arithmetic or configuration problem
    Configuration,
}

impl ErrorCategory {
    /// Status string reported to the caller of a submission
    pub fn status(&self) -> &'static str {
        match self {
            ErrorCategory::InputShape => "INVALID_INPUT",
            ErrorCategory::LookupMiss => "REFERENCE_LOOKUP_FAILED",
            ErrorCategory::Configuration => "CONFIGURATION_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categorization() {
        let shape = DomainError::DuplicateBrand("TOUJEO".to_string());
        assert!(shape.is_input_shape_error());
        assert_eq!(shape.category(), ErrorCategory::InputShape);

        let miss = DomainError::ChannelNotFound("FAX".to_string());
        assert!(miss.is_lookup_miss());
        assert_eq!(miss.category(), ErrorCategory::LookupMiss);

        for unparsable in [
            DomainError::UnparsableCycleRange("Q1".to_string()),
            DomainError::UnparsableDate("someday".to_string()),
        ] {
            assert!(!unparsable.is_input_shape_error());
            assert_eq!(unparsable.category(), ErrorCategory::LookupMiss);
        }

        let config = DomainError::ZeroLengthCycle;
        assert!(config.is_configuration_error());
        assert_eq!(config.category(), ErrorCategory::Configuration);
        assert_eq!(config.category().status(), "CONFIGURATION_ERROR");
    }

    #[test]
    fn test_lookup_messages_name_the_identifier() {
        let error = DomainError::BrandIndicationNotFound {
            brand: "DUPIXENT".to_string(),
            indication: "ASTHMA".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("DUPIXENT"));
        assert!(message.contains("ASTHMA"));

        let error = DomainError::SalesLineNotFound {
            brand_id: "B7".to_string(),
            sales_line: "IT_Diab_PM".to_string(),
            occp_type: "MONOBRAND".to_string(),
        };
        assert!(error.to_string().contains("IT_Diab_PM"));
    }
}
