//! ChannelMapper - canonical names for free-text channel labels
//!
//! The same user-facing label is spelled two ways downstream: as an
//! underscore token inside payload interaction keys, and as the spaced,
//! consent-qualified label stored in the DS_CHANNEL reference table.

/// Payload tokens for labels whose canonical form is not just the
/// upper-cased label
const PAYLOAD_TOKENS: &[(&str, &str)] = &[
    ("F2F", "FACE_TO_FACE"),
    ("REMOTE", "REMOTE_MEETING"),
    ("WHATSAPP/INSTANT MESSAGE", "WHATSAPP"),
    ("RTE-OPEN", "TRIGGERED_EMAIL"),
    ("RTE-SENT", "TRIGGERED_EMAIL"),
];

/// DS_CHANNEL labels, keyed by the upper-cased UI label
const WAREHOUSE_LABELS: &[(&str, &str)] = &[
    ("F2F", "FACE TO FACE"),
    ("REMOTE", "REMOTE"),
    ("PHONE", "PHONE"),
    ("MEETINGS", "MEETINGS"),
    ("VIRTUAL MEETINGS", "VIRTUAL MEETINGS"),
    ("VIRTUAL_MEETINGS", "VIRTUAL MEETINGS"),
    ("WHATSAPP/INSTANT MESSAGE", "WHATSAPP/INSTANT MESSAGE"),
    ("WHATSAPP/INSTANT_MESSAGE", "WHATSAPP/INSTANT MESSAGE"),
    ("RTE-OPEN", "RTE"),
    ("RTE-SENT", "RTE"),
];

const RTE_LABEL: &str = "RTE";
pub const RTE_WITH_CONSENT: &str = "RTE WITH CONSENT";
pub const RTE_WITHOUT_CONSENT: &str = "RTE WITHOUT CONSENT";

/// Stateless channel label lookups
pub struct ChannelMapper;

impl ChannelMapper {
    /// Upper-cased, trimmed form used as the lookup key for both tables
    pub fn normalize(label: &str) -> String {
        label.trim().to_uppercase()
    }

    /// Payload token, e.g. `F2F` -> `FACE_TO_FACE`, `Virtual Meetings` ->
    /// `VIRTUAL_MEETINGS`
    pub fn canonical_token(label: &str) -> String {
        let normalized = Self::normalize(label);
        let token = PAYLOAD_TOKENS
            .iter()
            .find(|(raw, _)| *raw == normalized)
            .map(|(_, token)| (*token).to_string())
            .unwrap_or(normalized);
        token.replace(' ', "_")
    }

    /// Bare interaction key `REP_<token>`
    pub fn bare_key(label: &str) -> String {
        format!("REP_{}", Self::canonical_token(label))
    }

    /// DS_CHANNEL label. RTE channels are qualified by the e-consent flag
    /// before any id lookup happens.
    pub fn warehouse_label(label: &str, e_consent: bool) -> String {
        let normalized = Self::normalize(label);
        let mapped = WAREHOUSE_LABELS
            .iter()
            .find(|(raw, _)| *raw == normalized)
            .map(|(_, mapped)| *mapped)
            .unwrap_or(normalized.as_str());

        if mapped == RTE_LABEL {
            if e_consent {
                RTE_WITH_CONSENT.to_string()
            } else {
                RTE_WITHOUT_CONSENT.to_string()
            }
        } else {
            mapped.to_string()
        }
    }

    /// Case-insensitive, underscore-insensitive label equality
    pub fn same_channel(a: &str, b: &str) -> bool {
        Self::canonical_token(a) == Self::canonical_token(b)
    }
}
